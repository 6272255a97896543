// Toast center: stacked notifications in the bottom-right corner of the main
// window, plus the indexer-error report builder feeding the detailed ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use eframe::egui;
use lazy_static::lazy_static;

use crate::types::ToastLevel;
use crate::ui_constants::{badge, toast};

// Issue links target this project except for FlareSolverr failures, which
// belong upstream.
const GITHUB_REPO: &str = "trawl-app/trawl";
const FLARESOLVERR_REPO: &str = "FlareSolverr/FlareSolverr";

/// Whole constructed issue URL must stay within this many characters, so the
/// error body gets cut to whatever the base URL leaves over.
const ISSUE_URL_BUDGET: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastLink {
    pub label: String,
    pub url: String,
}

pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub icon: &'static str,
    pub message: String,
    pub detail: Option<String>,
    pub links: Vec<ToastLink>,
    pub auto_hide: bool,
    pub created: Instant,
}

static TOAST_COUNT: AtomicU64 = AtomicU64::new(0);

lazy_static! {
    static ref TOASTS: Mutex<Vec<Toast>> = Mutex::new(Vec::new());
}

/// Append an auto-hiding toast.
pub fn notify(message: impl Into<String>, level: ToastLevel, icon: &'static str) {
    notify_opts(message, level, icon, true, None, Vec::new());
}

pub fn notify_opts(
    message: impl Into<String>,
    level: ToastLevel,
    icon: &'static str,
    auto_hide: bool,
    detail: Option<String>,
    links: Vec<ToastLink>,
) {
    let toast = Toast {
        id: TOAST_COUNT.fetch_add(1, Ordering::Relaxed).wrapping_add(1),
        level,
        icon,
        message: message.into(),
        detail,
        links,
        auto_hide,
        created: Instant::now(),
    };
    if let Ok(mut queue) = TOASTS.lock() {
        queue.push(toast);
    }
}

pub fn clear_notify() {
    if let Ok(mut queue) = TOASTS.lock() {
        queue.clear();
    }
}

pub fn len() -> usize {
    if let Ok(queue) = TOASTS.lock() {
        queue.len()
    } else {
        0
    }
}

fn level_colors(level: ToastLevel) -> (egui::Color32, egui::Color32) {
    match level {
        ToastLevel::Success => (badge::SUCCESS, badge::TEXT),
        ToastLevel::Danger => (badge::DANGER, badge::TEXT),
        ToastLevel::Warning => (badge::WARNING, badge::TEXT_DARK),
        ToastLevel::Info => (badge::INFO, badge::TEXT),
    }
}

/// Render the toast stack, drop expired/closed toasts and keep repainting
/// while an auto-hide toast is still pending.
pub fn draw_toasts(ctx: &egui::Context) {
    if len() == 0 {
        return;
    }
    let mut any_auto_hide = false;
    if let Ok(mut toasts) = TOASTS.lock() {
        let ttl = Duration::from_secs(toast::TTL_SECS);
        toasts.retain(|t| !(t.auto_hide && t.created.elapsed() >= ttl));
        if toasts.is_empty() {
            return;
        }
        any_auto_hide = toasts.iter().any(|t| t.auto_hide);

        let mut closed: Option<u64> = None;
        egui::Area::new("toast_stack".into())
            .anchor(
                egui::Align2::RIGHT_BOTTOM,
                egui::Vec2::new(-toast::MARGIN, -toast::MARGIN),
            )
            .interactable(true)
            .show(ctx, |ui| {
                for t in toasts.iter() {
                    let (fill, text_color) = level_colors(t.level);
                    egui::Frame::none()
                        .fill(fill)
                        .rounding(egui::Rounding::same(6.0))
                        .inner_margin(egui::Margin::symmetric(10.0, 8.0))
                        .show(ui, |ui| {
                            ui.set_width(toast::WIDTH);
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(format!("{} {}", t.icon, t.message))
                                        .color(text_color),
                                );
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::TOP),
                                    |ui| {
                                        if ui.small_button("✖").clicked() {
                                            closed = Some(t.id);
                                        }
                                    },
                                );
                            });
                            if let Some(detail) = &t.detail {
                                ui.label(
                                    egui::RichText::new(detail).color(text_color).strong(),
                                );
                            }
                            for link in &t.links {
                                ui.hyperlink_to(&link.label, &link.url);
                            }
                        });
                    ui.add_space(toast::GAP);
                }
            });
        if let Some(id) = closed {
            toasts.retain(|t| t.id != id);
        }
    }
    if any_auto_hide {
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}

/// Prebuilt pieces of an indexer failure toast. Kept apart from the queue so
/// the URL budget and FlareSolverr routing stay testable.
#[derive(Debug, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub truncated_error: String,
    pub links: Vec<ToastLink>,
}

pub fn build_error_report(indexer_id: &str, error_message: &str, error_event: &str) -> ErrorReport {
    let (repo, target) = if error_message.contains("FlareSolverr") {
        (FLARESOLVERR_REPO, "FlareSolverr")
    } else {
        (GITHUB_REPO, "this indexer")
    };
    let title = urlencoding::encode(&format!("[{indexer_id}] ({error_event})")).into_owned();
    let issue_url =
        format!("https://github.com/{repo}/issues/new?template=bug_report.yml&title={title}");

    let budget = ISSUE_URL_BUDGET.saturating_sub(issue_url.len());
    let truncated_error: String = error_message.chars().take(budget).collect();

    let links = if error_message.contains("FlareSolverr is not configured") {
        vec![
            ToastLink {
                label: "Instructions to install and configure FlareSolverr.".to_string(),
                url: format!("https://github.com/{GITHUB_REPO}#configuring-flaresolverr"),
            },
            ToastLink {
                label: "Troubleshooting frequent errors with FlareSolverr.".to_string(),
                url: format!(
                    "https://github.com/{GITHUB_REPO}/wiki/Troubleshooting#error-connecting-to-flaresolverr-server"
                ),
            },
        ]
    } else {
        vec![ToastLink {
            label: format!("Click here to open an issue on GitHub for {target}."),
            url: format!("{issue_url}&body={}", urlencoding::encode(&truncated_error)),
        }]
    };

    ErrorReport {
        message: format!("An error occurred while {error_event} this indexer"),
        truncated_error,
        links,
    }
}

/// Danger toast for a failed indexer operation. An empty message degrades to
/// a one-line generic toast; otherwise the toast is sticky and carries the
/// error text plus report link(s).
pub fn notify_indexer_error(indexer_id: &str, error_message: &str, error_event: &str) {
    if error_message.is_empty() {
        notify(
            format!(
                "An error occurred while {error_event} indexers, please take a look at indexers with failed test for more information."
            ),
            ToastLevel::Danger,
            "⚠",
        );
        return;
    }
    let report = build_error_report(indexer_id, error_message, error_event);
    notify_opts(
        report.message,
        ToastLevel::Danger,
        "⚠",
        false,
        Some(report.truncated_error),
        report.links,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_targets_project_repo_by_default() {
        let report = build_error_report("alpha", "connection refused", "testing");
        assert_eq!(report.links.len(), 1);
        let link = &report.links[0];
        assert!(link.url.starts_with("https://github.com/trawl-app/trawl/issues/new"));
        assert!(link.url.contains("template=bug_report.yml"));
        assert!(link.label.contains("this indexer"));
        assert_eq!(report.truncated_error, "connection refused");
    }

    #[test]
    fn flaresolverr_errors_route_upstream() {
        let report = build_error_report("alpha", "FlareSolverr rejected the challenge", "testing");
        assert!(report.links[0]
            .url
            .starts_with("https://github.com/FlareSolverr/FlareSolverr/issues/new"));
        assert!(report.links[0].label.contains("FlareSolverr"));
    }

    #[test]
    fn unconfigured_flaresolverr_gets_help_links_instead() {
        let report =
            build_error_report("alpha", "FlareSolverr is not configured on this host", "testing");
        assert_eq!(report.links.len(), 2);
        assert!(report.links[0].url.ends_with("#configuring-flaresolverr"));
        assert!(report.links[1].url.contains("/wiki/Troubleshooting"));
    }

    #[test]
    fn error_body_respects_url_budget() {
        let long = "x".repeat(5000);
        let report = build_error_report("alpha", &long, "testing");
        let base_len = "https://github.com/trawl-app/trawl/issues/new?template=bug_report.yml&title="
            .len()
            + urlencoding::encode("[alpha] (testing)").len();
        assert_eq!(report.truncated_error.chars().count(), 2000 - base_len);
    }

    #[test]
    fn truncation_is_char_boundary_safe() {
        let long = "雪".repeat(5000);
        let report = build_error_report("alpha", &long, "testing");
        assert!(report.truncated_error.chars().count() <= 2000);
        assert!(report.truncated_error.chars().all(|c| c == '雪'));
    }

    #[test]
    fn queue_appends_and_clears() {
        clear_notify();
        notify("one", ToastLevel::Success, "✔");
        notify("two", ToastLevel::Info, "ℹ");
        assert_eq!(len(), 2);
        clear_notify();
        assert_eq!(len(), 0);
    }
}
