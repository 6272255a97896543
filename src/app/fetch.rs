use eframe::egui;

use super::rt;
use crate::api::{self, SearchQuery, SearchResponse};
use crate::state::{self, Indexer};
use crate::types::{IndexerState, ToastLevel};

/// Messages delivered back to the UI thread by background requests.
pub enum FetchMsg {
    Indexers(Result<Vec<Indexer>, String>),
    Results {
        req_id: u64,
        res: Result<SearchResponse, String>,
    },
    Test {
        id: String,
        res: Result<(), String>,
    },
}

impl super::TrawlApp {
    /// Start an async refresh of the indexer list.
    pub(super) fn start_fetch_indexers(&mut self, ctx: &egui::Context) {
        if self.net.indexers_loading {
            return;
        }
        self.net.indexers_loading = true;
        self.net.indexers_error = None;
        ctx.request_repaint();

        let cfg = super::config::current();
        let tx = self.net.tx.clone();
        let ctx2 = ctx.clone();
        rt().spawn(async move {
            let res = api::fetch_indexers(&cfg).await.map_err(|e| e.to_string());
            if let Err(err) = &res {
                log::error!("Error fetching indexers: {err}");
            }
            let _ = tx.send(FetchMsg::Indexers(res));
            ctx2.request_repaint();
        });
    }

    /// Start an async search across all configured indexers.
    pub(super) fn start_search(&mut self, ctx: &egui::Context) {
        // Allow restarting while one is in flight; results are deduped by request id
        self.net.loading = true;
        self.net.last_error = None;
        self.net.last_result = None;
        self.search.page = 0;
        ctx.request_repaint();

        // bump request id
        self.net.counter = self.net.counter.wrapping_add(1);
        let req_id = self.net.counter;

        let cfg = super::config::current();
        let query = SearchQuery::default()
            .with_query(self.search.query.trim())
            .with_trackers(self.search.trackers.clone())
            .with_categories(parse_categories(&self.search.category_input));

        let tx = self.net.tx.clone();
        let ctx2 = ctx.clone();
        rt().spawn(async move {
            let res = api::search(&cfg, &query).await.map_err(|e| e.to_string());
            if let Err(err) = &res {
                log::error!("Search failed: {err}");
            }
            let _ = tx.send(FetchMsg::Results { req_id, res });
            ctx2.request_repaint();
        });
    }

    /// Start an async connectivity test for one indexer. The in-progress
    /// state lands in the caches immediately so the row shows a spinner.
    pub(super) fn start_test(&mut self, ctx: &egui::Context, id: &str) {
        state::update_test_state(id, IndexerState::InProgress, None);
        state::refresh_derived_caches();

        let cfg = super::config::current();
        let id = id.to_string();
        let tx = self.net.tx.clone();
        let ctx2 = ctx.clone();
        rt().spawn(async move {
            let res = api::test_indexer(&cfg, &id)
                .await
                .map_err(|e| e.to_string());
            if let Err(err) = &res {
                log::warn!("Indexer test failed: id={id} err={err}");
            }
            let _ = tx.send(FetchMsg::Test { id, res });
            ctx2.request_repaint();
        });
    }

    /// Drain finished background requests into app state.
    pub(super) fn poll_incoming(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.net.rx.try_recv() {
            match msg {
                FetchMsg::Indexers(res) => {
                    self.net.indexers_loading = false;
                    match res {
                        Ok(mut list) => {
                            let cfg = super::config::current();
                            for indexer in &mut list {
                                state::decorate_indexer(indexer, &cfg);
                            }
                            log::info!("Indexer list refreshed: {} entries", list.len());
                            state::INDEXERS.write().unwrap().set_all(list);
                            state::refresh_derived_caches();
                            self.net.indexers_error = None;
                            self.prune_stale_trackers();
                        }
                        Err(e) => {
                            self.net.indexers_error = Some(e);
                        }
                    }
                }
                FetchMsg::Results { req_id, res } => {
                    // Ignore results from superseded requests
                    if req_id != self.net.counter {
                        continue;
                    }
                    self.net.loading = false;
                    match res {
                        Ok(response) => {
                            log::info!(
                                "Search done: {} results from {} indexers",
                                response.results.len(),
                                response.indexers.len()
                            );
                            let mut failed = 0usize;
                            for summary in &response.indexers {
                                log::debug!(
                                    "Indexer {} ({}): {} results",
                                    summary.name,
                                    summary.id,
                                    summary.results
                                );
                                if summary.error.is_some() {
                                    failed += 1;
                                }
                            }
                            if failed > 0 {
                                log::warn!("{failed} indexers reported errors during search");
                                super::notify::notify_indexer_error("", "", "searching");
                            }
                            self.net.last_error = None;
                            self.net.last_result = Some(response);
                        }
                        Err(e) => {
                            self.net.last_result = None;
                            self.net.last_error = Some(e);
                        }
                    }
                }
                FetchMsg::Test { id, res } => {
                    match res {
                        Ok(()) => state::update_test_state(&id, IndexerState::Success, None),
                        Err(e) => {
                            state::update_test_state(&id, IndexerState::Error, Some(&e));
                            super::notify::notify_indexer_error(&id, &e, "testing");
                        }
                    }
                    state::refresh_derived_caches();
                }
            }
        }
    }

    /// Drop selected trackers that are not in the configured list. Deep links
    /// and older sessions can name indexers that have since been removed.
    fn prune_stale_trackers(&mut self) {
        let stale: Vec<String> = {
            let cache = state::INDEXERS.read().unwrap();
            self.search
                .trackers
                .iter()
                .filter(|id| !cache.configured.iter().any(|ix| ix.id.as_str() == id.as_str()))
                .cloned()
                .collect()
        };
        if stale.is_empty() {
            return;
        }
        self.search.trackers.retain(|id| !stale.contains(id));
        log::warn!("Dropping unknown trackers from selection: {}", stale.join(", "));
        super::notify::notify(
            format!(
                "Removed trackers that are not configured on this server: {}",
                stale.join(", ")
            ),
            ToastLevel::Warning,
            "⚠",
        );
    }
}

/// Parse a comma separated category list, ignoring anything non-numeric.
fn parse_categories(input: &str) -> Vec<u32> {
    input
        .split(',')
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_categories;

    #[test]
    fn categories_parse_ignores_junk() {
        assert_eq!(parse_categories("2000, 5030,abc, ,5040"), vec![2000, 5030, 5040]);
        assert_eq!(parse_categories(""), Vec::<u32>::new());
    }
}
