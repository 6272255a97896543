use eframe::egui::{self, Color32, RichText};

use crate::app::presets;
use crate::ui_constants::badge;

/// Focus the widget only while its rect is fully inside the visible clip,
/// so egui does not scroll the view just to show the caret.
pub fn stable_focus(ui: &egui::Ui, response: &egui::Response) {
    if ui.clip_rect().contains_rect(response.rect) {
        response.request_focus();
    }
}

/// What the search bar wants from the app this frame.
#[derive(Default)]
pub struct SearchBarAction {
    pub query_changed: bool,
    pub submitted: bool,
}

/// Строка поиска: поле ввода, выпадающий список сохранённых запросов и
/// кнопка сохранить/удалить текущий запрос.
/// query_changed взводится для дебаунса, submitted запускает поиск сразу.
pub fn draw_search_bar(ui: &mut egui::Ui, query: &mut String, focus: bool) -> SearchBarAction {
    let mut action = SearchBarAction::default();

    let edit = ui.add(
        egui::TextEdit::singleline(query)
            .hint_text("Search releases")
            .desired_width(320.0),
    );
    if edit.changed() {
        action.query_changed = true;
    }
    if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
        action.submitted = true;
    }
    if focus {
        stable_focus(ui, &edit);
    }

    let saved = presets::get_saved_presets();
    egui::ComboBox::from_id_source("search_presets")
        .selected_text("Presets")
        .width(120.0)
        .show_ui(ui, |ui| {
            if saved.is_empty() {
                ui.label(RichText::new("No saved searches").weak());
            }
            for preset in &saved {
                if ui.selectable_label(false, preset).clicked() {
                    *query = preset.clone();
                    action.submitted = true;
                }
            }
        });

    let trimmed = query.trim().to_string();
    if !trimmed.is_empty() {
        if presets::is_preset_saved(&trimmed) {
            let btn = egui::Button::new(RichText::new("★").color(Color32::WHITE))
                .fill(badge::DANGER);
            if ui.add(btn).on_hover_text("Remove saved search").clicked() {
                presets::remove_preset(&trimmed);
            }
        } else {
            let btn = egui::Button::new(RichText::new("☆").color(Color32::WHITE))
                .fill(badge::SUCCESS);
            if ui.add(btn).on_hover_text("Save this search").clicked() {
                presets::add_preset(&trimmed);
            }
        }
    }

    action
}
