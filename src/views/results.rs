use eframe::egui::{self, pos2, Color32, RichText, Rounding, Sense, Stroke, Vec2};
use regex::Regex;

use crate::api::{IndexerSearchSummary, Release};
use crate::app::clipboard;
use crate::app::posters::PosterState;
use crate::ui_constants::{badge, spacing, table, RESULTS_PAGE_SIZE};
use crate::util::{escape_regex, format_date, format_file_size};
use crate::views::badges;

/// One column's dropdown filter: the picked value compiled into a regex.
/// Exact columns anchor the pattern, the rest match substrings.
pub struct ColumnFilter {
    pub value: Option<String>,
    regex: Option<Regex>,
    exact: bool,
}

impl ColumnFilter {
    pub fn new(exact: bool) -> Self {
        Self {
            value: None,
            regex: None,
            exact,
        }
    }

    /// Select a value; `None` clears back to "Show all".
    pub fn set(&mut self, value: Option<&str>) {
        self.value = value.map(str::to_string);
        self.regex = value.and_then(|v| {
            let pattern = if self.exact {
                format!("^{}$", escape_regex(v))
            } else {
                escape_regex(v)
            };
            Regex::new(&pattern).ok()
        });
    }

    pub fn matches(&self, cell: &str) -> bool {
        match &self.regex {
            Some(re) => re.is_match(cell),
            None => true,
        }
    }
}

/// Filter state for the results table, held by the app across frames.
pub struct TableFilters {
    pub tracker: ColumnFilter,
    pub category: ColumnFilter,
}

impl Default for TableFilters {
    fn default() -> Self {
        Self {
            tracker: ColumnFilter::new(true),
            category: ColumnFilter::new(false),
        }
    }
}

impl TableFilters {
    pub fn clear(&mut self) {
        self.tracker.set(None);
        self.category.set(None);
    }
}

/// Per-indexer failures from the last search, shown above the table.
pub fn draw_search_summaries(ui: &mut egui::Ui, summaries: &[IndexerSearchSummary]) {
    for s in summaries.iter().filter(|s| s.error.is_some()) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("⚠").color(badge::DANGER));
            ui.label(
                RichText::new(format!(
                    "{}: {}",
                    s.name,
                    s.error.as_deref().unwrap_or("")
                ))
                .color(badge::DANGER)
                .small(),
            );
        });
    }
}

/// Results table with the filter bar on top. Returns the number of rows
/// that passed the filters so the caller can paginate.
pub fn draw_results(
    ui: &mut egui::Ui,
    releases: &[Release],
    filters: &mut TableFilters,
    posters: &mut PosterState,
    page: usize,
) -> usize {
    let trackers = distinct_values(releases, |r| &r.tracker);
    let categories = distinct_values(releases, |r| &r.category_desc);

    ui.horizontal(|ui| {
        if let Some(pick) = column_dropdown(
            ui,
            "tracker",
            "All trackers",
            filters.tracker.value.as_deref(),
            &trackers,
        ) {
            filters.tracker.set(pick.as_deref());
        }
        if let Some(pick) = column_dropdown(
            ui,
            "category",
            "All categories",
            filters.category.value.as_deref(),
            &categories,
        ) {
            filters.category.set(pick.as_deref());
        }
    });
    ui.add_space(spacing::SMALL);

    let filtered: Vec<&Release> = releases
        .iter()
        .filter(|r| filters.tracker.matches(&r.tracker) && filters.category.matches(&r.category_desc))
        .collect();
    let total = filtered.len();

    let start = (page * RESULTS_PAGE_SIZE).min(total);
    let end = (start + RESULTS_PAGE_SIZE).min(total);

    egui::Grid::new("results_grid")
        .striped(true)
        .min_row_height(table::ROW_HEIGHT)
        .spacing(Vec2::new(spacing::MEDIUM, 2.0))
        .show(ui, |ui| {
            ui.strong("Published");
            ui.strong("Tracker");
            ui.strong("Title");
            ui.strong("Category");
            ui.strong("Size");
            ui.strong("Seeds");
            ui.strong("Peers");
            ui.strong("");
            ui.end_row();

            for release in &filtered[start..end] {
                draw_release_row(ui, release, posters);
                ui.end_row();
            }
        });

    total
}

fn draw_release_row(ui: &mut egui::Ui, release: &Release, posters: &mut PosterState) {
    ui.label(format_date(&release.publish_date, "YYYY-MM-DD HH:mm"));
    ui.label(&release.tracker);

    ui.horizontal(|ui| {
        let title = clipped_title(&release.title);
        let resp = match release.details.as_deref() {
            Some(url) => ui.hyperlink_to(&title, url),
            None => ui.label(&title),
        };
        if release.poster.is_some() || release.description.is_some() {
            resp.on_hover_ui(|ui| title_tooltip(ui, release, posters));
        }
        badges::draw_release_labels(ui, release);
    });

    ui.label(&release.category_desc);
    ui.label(format_file_size(release.size as f64));
    ui.label(release.seeders.map_or_else(|| "-".to_string(), |v| v.to_string()));
    ui.label(release.peers.map_or_else(|| "-".to_string(), |v| v.to_string()));

    ui.horizontal(|ui| {
        if let Some(magnet) = release.magnet_uri.as_deref() {
            if ui
                .small_button("🧲")
                .on_hover_text("Copy magnet link")
                .clicked()
            {
                clipboard::copy_to_clipboard(ui.ctx(), magnet.to_string());
            }
        }
        if let Some(link) = release.link.as_deref() {
            ui.hyperlink_to("⬇", link.to_string()).on_hover_text("Download");
        }
    });
}

/// Poster plus description under the hovered title. The texture is
/// scheduled lazily, so the first frames show a spinner.
fn title_tooltip(ui: &mut egui::Ui, release: &Release, posters: &mut PosterState) {
    ui.set_max_width(table::POSTER_WIDTH + 120.0);
    ui.label(RichText::new(&release.title).strong());
    if let Some(poster) = release.poster.as_deref() {
        posters.schedule(ui.ctx(), &release.guid, poster);
        if let Some(tex) = posters.textures.get(&release.guid) {
            let size = tex.size_vec2();
            let scale = (table::POSTER_WIDTH / size.x).min(1.0);
            let (rect, _) = ui.allocate_exact_size(size * scale, Sense::hover());
            let uv = egui::Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
            ui.painter().image(tex.id(), rect, uv, Color32::WHITE);
        } else {
            ui.add(egui::Spinner::new());
        }
    }
    if let Some(desc) = release.description.as_deref() {
        ui.label(desc);
    }
}

fn clipped_title(title: &str) -> String {
    if title.chars().count() > table::TITLE_CLIP {
        let mut clipped: String = title.chars().take(table::TITLE_CLIP).collect();
        clipped.push('…');
        clipped
    } else {
        title.to_string()
    }
}

fn distinct_values<F>(releases: &[Release], f: F) -> Vec<String>
where
    F: Fn(&Release) -> &str,
{
    let mut vals: Vec<String> = releases
        .iter()
        .map(|r| f(r).to_string())
        .filter(|v| !v.is_empty())
        .collect();
    vals.sort();
    vals.dedup();
    vals
}

/// Compact dropdown: current selection (or placeholder), caret, popup with
/// "Show all" plus the column's distinct values. Returns Some(pick) when a
/// row is clicked; the pick is None for "Show all".
fn column_dropdown(
    ui: &mut egui::Ui,
    key: &'static str,
    placeholder: &str,
    current: Option<&str>,
    values: &[String],
) -> Option<Option<String>> {
    let rounding = Rounding::same(badge::ROUNDING);
    let border_color = Color32::from_gray(80);
    let container_bg = Color32::from_rgb(30, 30, 30);
    let hover_bg = Color32::from_rgba_premultiplied(255, 255, 255, 6);

    let width = 180.0;
    let height = (ui.spacing().interact_size.y * 1.2).clamp(24.0, 36.0);
    let (container_rect, response) =
        ui.allocate_exact_size(Vec2::new(width, height), Sense::click());
    let response = response.on_hover_cursor(egui::CursorIcon::PointingHand);
    let painter = ui.painter();

    painter.rect(
        container_rect,
        rounding,
        container_bg,
        Stroke::new(1.0, border_color),
    );
    if response.hovered() {
        painter.rect(
            container_rect.shrink2(Vec2::new(2.0, 2.0)),
            rounding,
            hover_bg,
            Stroke::NONE,
        );
    }

    let label = current.unwrap_or(placeholder);
    let text_color = if current.is_some() {
        Color32::from_gray(230)
    } else {
        Color32::from_gray(140)
    };
    painter.text(
        pos2(
            container_rect.left() + spacing::MEDIUM,
            container_rect.center().y,
        ),
        egui::Align2::LEFT_CENTER,
        label,
        egui::FontId::proportional(13.0),
        text_color,
    );

    let popup_id: egui::Id = egui::Id::new(("column_filter", key));
    let mut is_open = ui
        .memory(|m| m.data.get_temp::<bool>(popup_id))
        .unwrap_or(false);
    if response.clicked() {
        is_open = !is_open;
    }

    // Caret
    let cx = container_rect.right() - 14.0;
    let cy = container_rect.center().y + 1.0;
    let (w, h) = (8.0, 5.0);
    let col = if is_open {
        Color32::from_gray(230)
    } else {
        Color32::from_gray(200)
    };
    if is_open {
        painter.line_segment(
            [pos2(cx - w * 0.5, cy + h * 0.5), pos2(cx, cy - h * 0.5)],
            Stroke::new(1.5, col),
        );
        painter.line_segment(
            [pos2(cx + w * 0.5, cy + h * 0.5), pos2(cx, cy - h * 0.5)],
            Stroke::new(1.5, col),
        );
    } else {
        painter.line_segment(
            [pos2(cx - w * 0.5, cy - h * 0.5), pos2(cx, cy + h * 0.5)],
            Stroke::new(1.5, col),
        );
        painter.line_segment(
            [pos2(cx + w * 0.5, cy - h * 0.5), pos2(cx, cy + h * 0.5)],
            Stroke::new(1.5, col),
        );
    }

    let mut pick: Option<Option<String>> = None;
    if is_open {
        let popup_pos = pos2(
            container_rect.left(),
            container_rect.bottom() + spacing::SMALL,
        );
        let inner = egui::Area::new(popup_id.with("popup"))
            .order(egui::Order::Foreground)
            .fixed_pos(popup_pos)
            .show(ui.ctx(), |ui| {
                egui::Frame::default()
                    .fill(Color32::from_rgb(28, 28, 28))
                    .stroke(Stroke::new(1.0, border_color))
                    .rounding(rounding)
                    .show(ui, |ui| {
                        ui.set_min_width(width);
                        egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                            if dropdown_row(ui, "Show all", current.is_none()) {
                                pick = Some(None);
                            }
                            for value in values {
                                if dropdown_row(ui, value, current == Some(value.as_str())) {
                                    pick = Some(Some(value.clone()));
                                }
                            }
                        });
                    });
            });

        if pick.is_some() {
            is_open = false;
        }
        let popup_rect = inner.response.rect;
        let clicked_outside = ui.input(|i| {
            i.pointer.any_click()
                && i.pointer
                    .latest_pos()
                    .map_or(false, |p| !popup_rect.contains(p) && !container_rect.contains(p))
        });
        if clicked_outside {
            is_open = false;
        }
    }
    ui.memory_mut(|m| m.data.insert_temp(popup_id, is_open));

    pick
}

/// One full-width row of the filter popup. Returns true when clicked.
fn dropdown_row(ui: &mut egui::Ui, label: &str, selected: bool) -> bool {
    let row_height = ui.spacing().interact_size.y * 1.2;
    let (rect, response) =
        ui.allocate_exact_size(Vec2::new(ui.available_width(), row_height), Sense::click());
    let painter = ui.painter();

    if selected {
        painter.rect(
            rect.shrink2(Vec2::new(2.0, 2.0)),
            Rounding::same(4.0),
            Color32::from_rgb(45, 45, 45),
            Stroke::NONE,
        );
    } else if response.hovered() {
        painter.rect(
            rect.shrink2(Vec2::new(2.0, 2.0)),
            Rounding::same(4.0),
            Color32::from_rgba_premultiplied(255, 255, 255, 6),
            Stroke::NONE,
        );
    }

    painter.text(
        pos2(rect.left() + spacing::MEDIUM, rect.center().y),
        egui::Align2::LEFT_CENTER,
        label,
        egui::FontId::proportional(13.0),
        if selected {
            Color32::from_gray(230)
        } else {
            Color32::from_gray(210)
        },
    );

    response
        .on_hover_cursor(egui::CursorIcon::PointingHand)
        .clicked()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tracker: &str, category: &str) -> Release {
        Release {
            tracker: tracker.to_string(),
            category_desc: category.to_string(),
            ..Release::default()
        }
    }

    #[test]
    fn exact_filter_anchors_the_value() {
        let mut filter = ColumnFilter::new(true);
        filter.set(Some("rarbg"));
        assert!(filter.matches("rarbg"));
        assert!(!filter.matches("rarbg2"));
        assert!(!filter.matches("my rarbg"));
    }

    #[test]
    fn loose_filter_matches_substrings() {
        let mut filter = ColumnFilter::new(false);
        filter.set(Some("Movies"));
        assert!(filter.matches("Movies/HD"));
        assert!(filter.matches("4K Movies"));
        assert!(!filter.matches("TV/HD"));
    }

    #[test]
    fn filter_value_is_escaped_not_interpreted() {
        let mut filter = ColumnFilter::new(true);
        filter.set(Some("a.b (c)"));
        assert!(filter.matches("a.b (c)"));
        assert!(!filter.matches("axb (c)"));

        let mut loose = ColumnFilter::new(false);
        loose.set(Some("C++"));
        assert!(loose.matches("C++ tutorials"));
    }

    #[test]
    fn clearing_passes_everything() {
        let mut filter = ColumnFilter::new(true);
        filter.set(Some("x"));
        assert!(!filter.matches("y"));
        filter.set(None);
        assert!(filter.matches("y"));
        assert!(filter.matches(""));
    }

    #[test]
    fn distinct_values_sorted_deduped() {
        let releases = vec![
            release("beta", "Movies"),
            release("alpha", "TV"),
            release("beta", "Movies"),
            release("", "Movies"),
        ];
        assert_eq!(distinct_values(&releases, |r| &r.tracker), vec!["alpha", "beta"]);
        assert_eq!(
            distinct_values(&releases, |r| &r.category_desc),
            vec!["Movies", "TV"]
        );
    }

    #[test]
    fn dropdown_row_reports_clicks() {
        let ctx = egui::Context::default();
        let run_frame = |input: egui::RawInput| {
            let mut hit = false;
            let _ = ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    hit = dropdown_row(ui, "Show all", false);
                });
            });
            hit
        };

        // Layout frame first so the row rect is known, then click it.
        assert!(!run_frame(egui::RawInput::default()));

        let pos = pos2(40.0, 16.0);
        let mut input = egui::RawInput::default();
        input.events.push(egui::Event::PointerMoved(pos));
        input.events.push(egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: Default::default(),
        });
        input.events.push(egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: false,
            modifiers: Default::default(),
        });
        assert!(run_frame(input));
    }

    #[test]
    fn clipped_title_is_char_safe() {
        let short = "Short title";
        assert_eq!(clipped_title(short), short);

        let long: String = "й".repeat(200);
        let clipped = clipped_title(&long);
        assert_eq!(clipped.chars().count(), crate::ui_constants::table::TITLE_CLIP + 1);
        assert!(clipped.ends_with('…'));
    }
}
