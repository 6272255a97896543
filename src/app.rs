// Логика приложения вынесена из main.rs: здесь состояние TrawlApp и
// отрисовка экранов. Получение данных и runtime вынесены в подмодули.

use eframe::egui::RichText;
use eframe::{egui, App};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use strum::IntoEnumIterator;

use crate::types::{Tab, ToastLevel};
use crate::ui_constants::{spacing, RESULTS_PAGE_SIZE, SEARCH_DEBOUNCE_MS};
use crate::views;
use crate::views::results::TableFilters;

pub(crate) mod clipboard;
pub mod config;
pub(crate) mod notify;
pub(crate) mod posters;
pub(crate) mod presets;

// Вынесено: tokio runtime и вся логика получения данных
mod fetch;
mod runtime;
mod state;
pub use runtime::rt;

use posters::PosterState;
use state::{NetState, Screen, SearchState, SetupState};

pub struct TrawlApp {
    tab: Tab,
    focus_search: bool,
    net: NetState,
    search: SearchState,
    table_filters: TableFilters,
    posters: PosterState,
    setup: SetupState,
}

impl TrawlApp {
    /// Build the app, optionally prefilled from a deep-link fragment
    /// (`q`, `tracker` and `tab` keys).
    pub fn new(hash_args: HashMap<String, Option<String>>) -> Self {
        // Ensure the config is loaded before deciding which screen to show
        config::load_config_from_disk();
        presets::load_presets_from_disk();
        let screen = if config::current().is_complete() {
            Screen::Main
        } else {
            Screen::Setup
        };

        let mut search = SearchState::default();
        if let Some(Some(q)) = hash_args.get("q") {
            search.query = q.clone();
        }
        if let Some(Some(tracker)) = hash_args.get("tracker") {
            if !tracker.is_empty() {
                search.trackers.push(tracker.clone());
            }
        }
        let tab = match hash_args.get("tab") {
            Some(Some(t)) if t.eq_ignore_ascii_case("indexers") => Tab::Indexers,
            _ => Tab::default(),
        };

        Self {
            tab,
            focus_search: tab == Tab::Search,
            net: NetState::new(),
            search,
            table_filters: TableFilters::default(),
            posters: PosterState::new(),
            setup: SetupState::new(screen),
        }
    }
}

impl Default for TrawlApp {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

impl App for TrawlApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle async connect results
        while let Ok(res) = self.setup.rx.try_recv() {
            self.setup.in_progress = false;
            match res {
                Ok(()) => {
                    self.setup.error = None;
                    self.setup.screen = Screen::Main;
                    // Re-arm the first automatic indexer fetch
                    self.net.indexers_started = false;
                }
                Err(e) => {
                    self.setup.error = Some(e);
                }
            }
            ctx.request_repaint();
        }

        // Пока нет полного конфига: показываем экран подключения и выходим
        if self.setup.screen != Screen::Main {
            self.draw_setup_screen(ctx);
            notify::draw_toasts(ctx);
            return;
        }

        self.poll_incoming(ctx);
        self.posters.poll(ctx);

        // Первый автозапуск: список индексеров и, если запрос уже задан
        // (deep link), сразу и поиск
        if !self.net.indexers_started {
            self.net.indexers_started = true;
            self.start_fetch_indexers(ctx);
            if !self.search.query.trim().is_empty() {
                self.start_search(ctx);
            }
        }

        self.draw_top_panel(ctx);

        // Запуск отложенного поиска, когда дебаунс-срок прошёл
        if let Some(due) = self.search.search_due_at {
            if Instant::now() >= due {
                self.search.search_due_at = None;
                self.start_search(ctx);
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::Search => self.draw_search_tab(ui),
            Tab::Indexers => self.draw_indexers_tab(ui, ctx),
        });

        notify::draw_toasts(ctx);
    }
}

impl TrawlApp {
    fn draw_setup_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(spacing::XLARGE);
            ui.vertical_centered(|ui| {
                ui.heading("Connect to your indexer server");
            });
            ui.add_space(spacing::MEDIUM);
            ui.horizontal(|ui| {
                ui.label("Server URL:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.setup.server_input)
                        .hint_text("http://localhost:9117"),
                );
            });
            ui.horizontal(|ui| {
                ui.label("API key:");
                ui.add(egui::TextEdit::singleline(&mut self.setup.api_key_input).password(true));
            });
            if let Some(err) = &self.setup.error {
                ui.colored_label(egui::Color32::RED, err);
            }
            ui.add_space(spacing::MEDIUM);
            let connect_clicked = ui
                .add_enabled(!self.setup.in_progress, egui::Button::new("Connect"))
                .clicked();
            if self.setup.in_progress {
                ui.add_space(spacing::SMALL);
                ui.add(egui::Spinner::new());
                ui.label("Connecting...");
            }
            if connect_clicked {
                if self.setup.server_input.trim().is_empty()
                    || self.setup.api_key_input.trim().is_empty()
                {
                    self.setup.error = Some("Please enter the server URL and API key".to_string());
                } else {
                    self.setup.error = None;
                    self.setup.in_progress = true;
                    let url = self.setup.server_input.clone();
                    let key = self.setup.api_key_input.trim().to_string();
                    let tx = self.setup.tx.clone();
                    let ctx2 = ctx.clone();
                    rt().spawn(async move {
                        let res = config::connect_and_store(url, key).await;
                        let _ = tx.send(res);
                        ctx2.request_repaint();
                    });
                }
            }
            ui.add_space(spacing::MEDIUM);
            ui.label(
                RichText::new("The API key is shown in the server's web interface").small(),
            );
        });
    }

    // Верхняя панель: вкладки, строка поиска, кнопка отключения
    fn draw_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(spacing::SMALL);
            ui.horizontal(|ui| {
                ui.heading("Trawl");
                ui.separator();
                for tab in Tab::iter() {
                    let selected = self.tab == tab;
                    if ui.selectable_label(selected, tab.to_string()).clicked() && !selected {
                        self.tab = tab;
                        if tab == Tab::Search {
                            self.focus_search = true;
                        }
                    }
                }
                ui.separator();

                if self.tab == Tab::Search {
                    let focus = std::mem::take(&mut self.focus_search);
                    let action = views::search::draw_search_bar(ui, &mut self.search.query, focus);
                    if action.submitted {
                        self.search.search_due_at = None;
                        self.start_search(ctx);
                    } else if action.query_changed {
                        // Debounce text edits, run the search shortly after the last one
                        self.search.search_due_at =
                            Some(Instant::now() + Duration::from_millis(SEARCH_DEBOUNCE_MS));
                        ctx.request_repaint_after(Duration::from_millis(SEARCH_DEBOUNCE_MS));
                    }

                    if self.draw_tracker_menu(ui) {
                        self.search.search_due_at = None;
                        self.start_search(ctx);
                    }
                    ui.label("Categories:");
                    let cats = ui.add(
                        egui::TextEdit::singleline(&mut self.search.category_input)
                            .hint_text("2000,5030")
                            .desired_width(110.0),
                    );
                    if cats.changed() {
                        self.search.search_due_at =
                            Some(Instant::now() + Duration::from_millis(SEARCH_DEBOUNCE_MS));
                        ctx.request_repaint_after(Duration::from_millis(SEARCH_DEBOUNCE_MS));
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .button("Disconnect")
                        .on_hover_text("Forget the server and clear all cached data")
                        .clicked()
                    {
                        self.disconnect();
                    }
                });
            });
            ui.add_space(spacing::SMALL);
        });
    }

    /// Multi-select of configured indexers to search. Returns true when the
    /// selection changed so the caller restarts the search immediately.
    fn draw_tracker_menu(&mut self, ui: &mut egui::Ui) -> bool {
        let configured = crate::state::INDEXERS.read().unwrap().configured.clone();
        let label = if self.search.trackers.is_empty() {
            "All trackers".to_string()
        } else {
            format!("Trackers ({})", self.search.trackers.len())
        };
        let mut changed = false;
        ui.menu_button(label, |ui| {
            egui::ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                for indexer in &configured {
                    let mut on = self.search.trackers.contains(&indexer.id);
                    if ui.checkbox(&mut on, &indexer.name).changed() {
                        if on {
                            self.search.trackers.push(indexer.id.clone());
                        } else {
                            self.search.trackers.retain(|t| t != &indexer.id);
                        }
                        changed = true;
                    }
                }
                if !self.search.trackers.is_empty() {
                    ui.separator();
                    if ui.button("Clear selection").clicked() {
                        self.search.trackers.clear();
                        changed = true;
                    }
                }
            });
        });
        changed
    }

    fn draw_search_tab(&mut self, ui: &mut egui::Ui) {
        if let Some(err) = &self.net.last_error {
            ui.add_space(spacing::XLARGE);
            ui.vertical_centered(|ui| {
                ui.colored_label(egui::Color32::RED, format!("Error: {}", err));
            });
            return;
        }
        if self.net.loading && self.net.last_result.is_none() {
            ui.add_space(spacing::XLARGE);
            ui.vertical_centered(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Searching...");
            });
            return;
        }
        let Some(response) = &self.net.last_result else {
            ui.add_space(spacing::XLARGE);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("Type a query to search your indexers").weak());
            });
            return;
        };

        // Clone so the table can borrow filters and posters mutably
        let releases = response.results.clone();
        let summaries = response.indexers.clone();

        views::results::draw_search_summaries(ui, &summaries);
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let total = views::results::draw_results(
                    ui,
                    &releases,
                    &mut self.table_filters,
                    &mut self.posters,
                    self.search.page,
                );

                ui.add_space(spacing::MEDIUM);
                ui.vertical_centered(|ui| {
                    let pages = ((total + RESULTS_PAGE_SIZE - 1) / RESULTS_PAGE_SIZE).max(1);
                    if self.search.page >= pages {
                        self.search.page = pages - 1;
                    }
                    ui.horizontal(|ui| {
                        if ui
                            .add_enabled(self.search.page > 0, egui::Button::new("◀"))
                            .clicked()
                        {
                            self.search.page -= 1;
                        }
                        ui.label(format!("Page {} / {}", self.search.page + 1, pages));
                        if ui
                            .add_enabled(self.search.page + 1 < pages, egui::Button::new("▶"))
                            .clicked()
                        {
                            self.search.page += 1;
                        }
                    });
                    ui.label(format!("{} of {} releases", total, releases.len()));
                });
            });
    }

    fn draw_indexers_tab(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        if let Some(err) = self.net.indexers_error.clone() {
            ui.add_space(spacing::XLARGE);
            ui.vertical_centered(|ui| {
                ui.colored_label(egui::Color32::RED, format!("Error: {}", err));
                if ui.button("Retry").clicked() {
                    self.start_fetch_indexers(ctx);
                }
            });
            return;
        }
        let have_any = !crate::state::INDEXERS.read().unwrap().all.is_empty();
        if self.net.indexers_loading && !have_any {
            ui.add_space(spacing::XLARGE);
            ui.vertical_centered(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Loading indexers...");
            });
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match views::indexers::draw_indexers(ui) {
                Some(views::indexers::IndexerAction::Test(id)) => self.start_test(ctx, &id),
                Some(views::indexers::IndexerAction::Refresh) => self.start_fetch_indexers(ctx),
                None => {}
            });
    }

    /// Forget the server and wipe every cache, back to the setup screen.
    fn disconnect(&mut self) {
        config::clear_and_save();
        crate::state::clear_all();
        notify::clear_notify();
        self.net = NetState::new();
        self.search = SearchState::default();
        self.table_filters.clear();
        self.posters.clear();
        self.setup = SetupState::new(Screen::Setup);
        log::info!("Disconnected from server");
        notify::notify("Disconnected from the server", ToastLevel::Info, "ℹ");
    }
}
