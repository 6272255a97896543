use eframe::egui::{self, RichText};

use crate::app::clipboard;
use crate::state::{self, Filter, FilterKind, Indexer, TestResult};
use crate::types::IndexerState;
use crate::ui_constants::{badge, spacing};
use crate::views::badges::{draw_badge, kind_color};

/// What a row asked the app to do this frame.
pub enum IndexerAction {
    Test(String),
    Refresh,
}

/// Configured-indexer table: filter chips on top, then one row per indexer
/// with kind badge, tags, categories, feed-URL copy buttons and the test
/// button. Returns an action when a button was clicked.
pub fn draw_indexers(ui: &mut egui::Ui) -> Option<IndexerAction> {
    let mut action: Option<IndexerAction> = None;

    let (available, current) = {
        let cache = state::FILTERS.read().unwrap();
        (cache.available.clone(), cache.current.clone())
    };
    let mut indexers = state::INDEXERS.read().unwrap().configured.clone();
    let tests = state::TEST_RESULTS.read().unwrap().clone();

    // Строка фильтров: "All" плюс доступные срезы по состоянию/типу/тегам
    ui.horizontal_wrapped(|ui| {
        if ui.selectable_label(current.is_none(), "All").clicked() {
            state::FILTERS.write().unwrap().set_current(None);
        }
        for filter in &available {
            let selected = current.as_deref() == Some(filter.id.as_str());
            if ui.selectable_label(selected, filter_label(filter)).clicked() {
                let next = if selected { None } else { Some(filter.id.clone()) };
                state::FILTERS.write().unwrap().set_current(next);
            }
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
            if ui.button("↻ Refresh").clicked() {
                action = Some(IndexerAction::Refresh);
            }
        });
    });
    ui.add_space(spacing::SMALL);

    if let Some(current_id) = current.as_deref() {
        if let Some(filter) = available.iter().find(|f| f.id == current_id) {
            indexers.retain(|i| filter.matches(i));
        }
    }

    let sort_id = egui::Id::new("indexers_sort_by_test");
    let sort_by_test = ui
        .memory(|m| m.data.get_temp::<bool>(sort_id))
        .unwrap_or(false);
    sort_rows(&mut indexers, &tests, sort_by_test);

    egui::Grid::new("indexers_grid")
        .striped(true)
        .spacing(egui::Vec2::new(spacing::MEDIUM, 4.0))
        .show(ui, |ui| {
            ui.strong("Indexer");
            ui.strong("Type");
            ui.strong("Tags");
            ui.strong("Categories");
            ui.strong("Feeds");
            if ui
                .selectable_label(sort_by_test, "Test")
                .on_hover_text("Click to group rows by test failure message")
                .clicked()
            {
                ui.memory_mut(|m| m.data.insert_temp(sort_id, !sort_by_test));
            }
            ui.end_row();

            for indexer in &indexers {
                if let Some(act) = draw_indexer_row(ui, indexer, tests.get(&indexer.id)) {
                    action = Some(act);
                }
                ui.end_row();
            }
        });

    if indexers.is_empty() {
        ui.add_space(spacing::MEDIUM);
        ui.label(RichText::new("No indexers match the selected filter").weak());
    }

    action
}

fn draw_indexer_row(
    ui: &mut egui::Ui,
    indexer: &Indexer,
    test: Option<&TestResult>,
) -> Option<IndexerAction> {
    let mut action = None;

    if indexer.site_link.is_empty() {
        ui.label(&indexer.name).on_hover_text(&indexer.description);
    } else {
        ui.hyperlink_to(&indexer.name, &indexer.site_link)
            .on_hover_text(&indexer.description);
    }

    draw_badge(
        ui,
        &indexer.kind.to_string(),
        kind_color(indexer.kind_label),
        badge::TEXT,
    );

    ui.horizontal(|ui| {
        for tag in &indexer.tags {
            draw_badge(ui, tag, badge::DEFAULT, badge::TEXT);
        }
    });

    ui.label(&indexer.main_cats);

    ui.horizontal(|ui| {
        for (label, url, tip) in [
            ("RSS", &indexer.rss_url, "Copy RSS feed URL"),
            ("Torznab", &indexer.torznab_url, "Copy Torznab endpoint"),
            ("Potato", &indexer.potato_url, "Copy TorrentPotato endpoint"),
        ] {
            if ui.small_button(label).on_hover_text(tip).clicked() {
                clipboard::copy_to_clipboard(ui.ctx(), url.clone());
            }
        }
    });

    // Test button mirrors the recorded outcome; untested rows fall back to
    // the state derived from the server's last_error.
    let state = test.map(|t| t.state).unwrap_or(indexer.state);
    match state {
        IndexerState::InProgress => {
            ui.add(egui::Spinner::new().size(14.0));
        }
        IndexerState::Success => {
            if ui
                .button(RichText::new("✔").color(badge::SUCCESS))
                .on_hover_text("Test this indexer")
                .clicked()
            {
                action = Some(IndexerAction::Test(indexer.id.clone()));
            }
        }
        IndexerState::Error => {
            let message = test
                .and_then(|t| t.message.clone())
                .unwrap_or_else(|| indexer.last_error.clone());
            if ui
                .button(RichText::new("⚠").color(badge::DANGER))
                .on_hover_text(message)
                .clicked()
            {
                action = Some(IndexerAction::Test(indexer.id.clone()));
            }
        }
    }

    action
}

fn filter_label(filter: &Filter) -> String {
    match &filter.kind {
        FilterKind::State(IndexerState::Success) => "Test passed".to_string(),
        FilterKind::State(_) => "Test failed".to_string(),
        FilterKind::Kind(kind) => kind.to_string(),
        FilterKind::Tag(tag) => format!("#{tag}"),
    }
}

/// Default order is by name; the test column groups failures together by
/// their recorded message so equal errors sit next to each other.
fn sort_rows(
    indexers: &mut [Indexer],
    tests: &std::collections::HashMap<String, TestResult>,
    by_test: bool,
) {
    if by_test {
        indexers.sort_by(|a, b| {
            let ka = tests.get(&a.id).map(|t| t.sort_key.as_str()).unwrap_or("");
            let kb = tests.get(&b.id).map(|t| t.sort_key.as_str()).unwrap_or("");
            ka.cmp(kb).then_with(|| a.name.cmp(&b.name))
        });
    } else {
        indexers.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn named(id: &str, name: &str) -> Indexer {
        Indexer {
            id: id.to_string(),
            name: name.to_string(),
            ..Indexer::default()
        }
    }

    fn result(sort_key: &str) -> TestResult {
        TestResult {
            state: IndexerState::Error,
            message: Some(sort_key.to_string()),
            sort_key: sort_key.to_string(),
        }
    }

    #[test]
    fn rows_sort_by_name_by_default() {
        let mut rows = vec![named("b", "Beta"), named("a", "Alpha")];
        sort_rows(&mut rows, &HashMap::new(), false);
        assert_eq!(rows[0].name, "Alpha");
        assert_eq!(rows[1].name, "Beta");
    }

    #[test]
    fn test_sort_groups_failures_by_message() {
        let mut rows = vec![
            named("x", "Xray"),
            named("a", "Alpha"),
            named("m", "Mike"),
        ];
        let mut tests = HashMap::new();
        tests.insert("x".to_string(), result("connection refused"));
        tests.insert("a".to_string(), result("connection refused"));
        // Mike passed: empty sort key puts it first
        sort_rows(&mut rows, &tests, true);
        assert_eq!(rows[0].name, "Mike");
        assert_eq!(rows[1].name, "Alpha");
        assert_eq!(rows[2].name, "Xray");
    }
}
