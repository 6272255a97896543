// Client-side caches mirroring the server's indexer list: the list itself
// split by configured state, the tag set, the derived filter set and the
// per-indexer test results. All of it lives in module-scoped statics so the
// views and the fetch plumbing see one consistent snapshot.

use std::collections::HashMap;
use std::sync::RwLock;

use lazy_static::lazy_static;
use serde::Deserialize;

use crate::app::config::ServerConfig;
use crate::types::{IndexerKind, IndexerState};
use crate::util::resolve_url;

/// One row of the server's caps payload (category id + name).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Capability {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Indexer as served by `/api/v2.0/indexers`, plus fields derived once by
/// [`decorate_indexer`] after each fetch. Only `state` changes later, via
/// [`update_test_state`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Indexer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: IndexerKind,
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub last_error: String,
    #[serde(default)]
    pub site_link: String,
    #[serde(default)]
    pub caps: Vec<Capability>,
    #[serde(skip)]
    pub state: IndexerState,
    #[serde(skip)]
    pub kind_label: &'static str,
    #[serde(skip)]
    pub main_cats: String,
    #[serde(skip)]
    pub rss_url: String,
    #[serde(skip)]
    pub torznab_url: String,
    #[serde(skip)]
    pub potato_url: String,
}

/// Fill the derived fields: feed endpoint URLs, state from last_error,
/// badge label and the main-category summary.
pub fn decorate_indexer(indexer: &mut Indexer, cfg: &ServerConfig) {
    let prefix = format!(
        "{}/api/v2.0/indexers/{}/results",
        cfg.base_path, indexer.id
    );
    indexer.rss_url = resolve_url(
        &cfg.base_url,
        &format!(
            "{prefix}/torznab/api?apikey={}&t=search&cat=&q=",
            cfg.api_key
        ),
    );
    indexer.torznab_url = resolve_url(&cfg.base_url, &format!("{prefix}/torznab/"));
    indexer.potato_url = resolve_url(&cfg.base_url, &format!("{prefix}/potato/"));

    indexer.state = if indexer.last_error.is_empty() {
        IndexerState::Success
    } else {
        IndexerState::Error
    };
    indexer.kind_label = indexer.kind.badge_label();
    indexer.main_cats = main_category_summary(&indexer.caps);
}

// Category ids below 100000 are standard Torznab ones; the name part before
// '/' is the main category. First-seen order, deduplicated.
fn main_category_summary(caps: &[Capability]) -> String {
    let mut mains: Vec<&str> = Vec::new();
    for cap in caps {
        let id: u32 = match cap.id.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        if id >= 100_000 {
            continue;
        }
        let main = cap.name.split('/').next().unwrap_or("");
        if !main.is_empty() && !mains.contains(&main) {
            mains.push(main);
        }
    }
    mains.join(", ")
}

#[derive(Default)]
pub struct IndexerCache {
    pub all: Vec<Indexer>,
    pub configured: Vec<Indexer>,
    pub unconfigured: Vec<Indexer>,
}

impl IndexerCache {
    /// Replace the whole cache; `configured`/`unconfigured` partition `all`.
    pub fn set_all(&mut self, indexers: Vec<Indexer>) {
        self.configured = indexers.iter().filter(|i| i.configured).cloned().collect();
        self.unconfigured = indexers.iter().filter(|i| !i.configured).cloned().collect();
        self.all = indexers;
    }

    pub fn update_state(&mut self, id: &str, state: IndexerState) {
        for list in [
            &mut self.all,
            &mut self.configured,
            &mut self.unconfigured,
        ] {
            for indexer in list.iter_mut().filter(|i| i.id == id) {
                indexer.state = state;
            }
        }
    }

    pub fn clear(&mut self) {
        self.all.clear();
        self.configured.clear();
        self.unconfigured.clear();
    }
}

#[derive(Default)]
pub struct TagCache {
    pub configured: Vec<String>,
}

impl TagCache {
    /// Flatten all indexer tags into a sorted, deduplicated list.
    pub fn set_configured(&mut self, indexers: &[Indexer]) {
        let mut tags: Vec<String> = indexers
            .iter()
            .flat_map(|i| i.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        self.configured = tags;
    }

    pub fn clear(&mut self) {
        self.configured.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    State(IndexerState),
    Kind(IndexerKind),
    Tag(String),
}

/// A predicate over indexers, identified by a stable id string shown in the
/// filter picker ("test:passed", "type:public", "tag:anime").
#[derive(Debug, Clone)]
pub struct Filter {
    pub id: String,
    pub kind: FilterKind,
}

impl Filter {
    pub fn state(state: IndexerState) -> Self {
        let outcome = if state == IndexerState::Success {
            "passed"
        } else {
            "failed"
        };
        Self {
            id: format!("test:{outcome}"),
            kind: FilterKind::State(state),
        }
    }

    pub fn kind(kind: IndexerKind) -> Self {
        Self {
            id: format!("type:{}", kind.api_value()),
            kind: FilterKind::Kind(kind),
        }
    }

    pub fn tag(tag: &str) -> Self {
        Self {
            id: format!("tag:{}", tag.to_lowercase()),
            kind: FilterKind::Tag(tag.to_string()),
        }
    }

    pub fn matches(&self, indexer: &Indexer) -> bool {
        match &self.kind {
            FilterKind::State(state) => indexer.state == *state,
            FilterKind::Kind(kind) => indexer.kind == *kind,
            FilterKind::Tag(tag) => indexer
                .tags
                .iter()
                .any(|t| t.eq_ignore_ascii_case(tag)),
        }
    }
}

#[derive(Default)]
pub struct FilterCache {
    pub available: Vec<Filter>,
    pub current: Option<String>,
}

impl FilterCache {
    /// Rebuild the candidate list: both test-state filters, one per known
    /// indexer kind, one per tag. A candidate survives only when it splits
    /// the set (matches at least one indexer but not all); duplicate ids
    /// are dropped.
    pub fn set_available(&mut self, indexers: &[Indexer], tags: &[String]) {
        self.available.clear();

        let mut candidates: Vec<Filter> = vec![
            Filter::state(IndexerState::Success),
            Filter::state(IndexerState::Error),
        ];
        for kind in [
            IndexerKind::Public,
            IndexerKind::Private,
            IndexerKind::SemiPrivate,
        ] {
            candidates.push(Filter::kind(kind));
        }
        let mut tags: Vec<&String> = tags.iter().collect();
        tags.sort();
        for tag in tags {
            candidates.push(Filter::tag(tag));
        }

        for filter in candidates {
            if self.available.iter().any(|f| f.id == filter.id) {
                continue;
            }
            let matched = indexers.iter().filter(|i| filter.matches(i)).count();
            if matched > 0 && matched < indexers.len() {
                self.available.push(filter);
            }
        }
    }

    pub fn set_current(&mut self, filter: Option<String>) {
        self.current = filter;
    }

    pub fn clear(&mut self) {
        self.available.clear();
        self.current = None;
    }
}

/// Outcome of the most recent per-indexer test, keyed by indexer id. The
/// sort key is empty for successful tests so failures group together when
/// the status column is sorted.
#[derive(Debug, Clone, Default)]
pub struct TestResult {
    pub state: IndexerState,
    pub message: Option<String>,
    pub sort_key: String,
}

lazy_static! {
    pub static ref INDEXERS: RwLock<IndexerCache> = RwLock::new(IndexerCache::default());
    pub static ref TAGS: RwLock<TagCache> = RwLock::new(TagCache::default());
    pub static ref FILTERS: RwLock<FilterCache> = RwLock::new(FilterCache::default());
    pub static ref TEST_RESULTS: RwLock<HashMap<String, TestResult>> =
        RwLock::new(HashMap::new());
}

/// Recompute tag and filter caches from the configured indexer list.
/// Locks are taken one at a time, never nested.
pub fn refresh_derived_caches() {
    let configured = INDEXERS.read().unwrap().configured.clone();
    let tags = {
        let mut cache = TAGS.write().unwrap();
        cache.set_configured(&configured);
        cache.configured.clone()
    };
    FILTERS.write().unwrap().set_available(&configured, &tags);
}

/// Record a test outcome and propagate the state into the indexer cache.
pub fn update_test_state(id: &str, state: IndexerState, message: Option<&str>) {
    let sort_key = match message {
        Some(m) if state != IndexerState::Success && !m.is_empty() => m.to_string(),
        _ => String::new(),
    };
    TEST_RESULTS.write().unwrap().insert(
        id.to_string(),
        TestResult {
            state,
            message: message.map(str::to_string),
            sort_key,
        },
    );
    INDEXERS.write().unwrap().update_state(id, state);
}

/// Empty every cache (used on disconnect).
pub fn clear_all() {
    INDEXERS.write().unwrap().clear();
    TAGS.write().unwrap().clear();
    FILTERS.write().unwrap().clear();
    TEST_RESULTS.write().unwrap().clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexer(
        id: &str,
        kind: IndexerKind,
        configured: bool,
        tags: &[&str],
        state: IndexerState,
    ) -> Indexer {
        Indexer {
            id: id.to_string(),
            name: id.to_uppercase(),
            kind,
            configured,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            state,
            ..Default::default()
        }
    }

    fn test_config() -> ServerConfig {
        ServerConfig {
            base_url: "http://localhost:9117".to_string(),
            base_path: String::new(),
            api_key: "secret".to_string(),
        }
    }

    #[test]
    fn set_all_partitions_by_configured() {
        let mut cache = IndexerCache::default();
        cache.set_all(vec![
            indexer("a", IndexerKind::Public, true, &[], IndexerState::Success),
            indexer("b", IndexerKind::Private, false, &[], IndexerState::Success),
            indexer("c", IndexerKind::Public, true, &[], IndexerState::Success),
        ]);
        assert_eq!(cache.all.len(), 3);
        assert_eq!(cache.configured.len(), 2);
        assert_eq!(cache.unconfigured.len(), 1);
        assert!(cache.configured.iter().all(|i| i.configured));
        assert!(cache.unconfigured.iter().all(|i| !i.configured));
    }

    #[test]
    fn update_state_touches_every_list() {
        let mut cache = IndexerCache::default();
        cache.set_all(vec![indexer(
            "a",
            IndexerKind::Public,
            true,
            &[],
            IndexerState::Success,
        )]);
        cache.update_state("a", IndexerState::Error);
        assert_eq!(cache.all[0].state, IndexerState::Error);
        assert_eq!(cache.configured[0].state, IndexerState::Error);
    }

    #[test]
    fn tags_are_deduplicated_and_sorted() {
        let mut cache = TagCache::default();
        cache.set_configured(&[
            indexer("a", IndexerKind::Public, true, &["zeta", "anime"], IndexerState::Success),
            indexer("b", IndexerKind::Public, true, &["anime", "movies"], IndexerState::Success),
        ]);
        assert_eq!(cache.configured, vec!["anime", "movies", "zeta"]);
    }

    #[test]
    fn available_filters_must_split_the_set() {
        let indexers = vec![
            indexer(
                "a",
                IndexerKind::Public,
                true,
                &["shared", "Anime"],
                IndexerState::Success,
            ),
            indexer(
                "b",
                IndexerKind::Private,
                true,
                &["shared"],
                IndexerState::Error,
            ),
        ];
        let tags = vec![
            "Anime".to_string(),
            "shared".to_string(),
        ];
        let mut cache = FilterCache::default();
        cache.set_available(&indexers, &tags);

        let ids: Vec<&str> = cache.available.iter().map(|f| f.id.as_str()).collect();
        assert!(ids.contains(&"test:passed"));
        assert!(ids.contains(&"test:failed"));
        assert!(ids.contains(&"type:public"));
        assert!(ids.contains(&"type:private"));
        assert!(ids.contains(&"tag:anime"));
        // nobody is semi-private, everybody carries "shared"
        assert!(!ids.contains(&"type:semi-private"));
        assert!(!ids.contains(&"tag:shared"));
    }

    #[test]
    fn duplicate_filter_ids_are_added_once() {
        let indexers = vec![
            indexer("a", IndexerKind::Public, true, &["Anime"], IndexerState::Success),
            indexer("b", IndexerKind::Private, true, &[], IndexerState::Success),
        ];
        let tags = vec!["Anime".to_string(), "anime".to_string()];
        let mut cache = FilterCache::default();
        cache.set_available(&indexers, &tags);
        let count = cache
            .available
            .iter()
            .filter(|f| f.id == "tag:anime")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn tag_matching_ignores_case() {
        let idx = indexer("a", IndexerKind::Public, true, &["AniMe"], IndexerState::Success);
        assert!(Filter::tag("anime").matches(&idx));
        assert!(Filter::tag("ANIME").matches(&idx));
        assert!(!Filter::tag("movies").matches(&idx));
    }

    #[test]
    fn decorate_builds_endpoints_and_state() {
        let mut idx = indexer("alpha", IndexerKind::Public, true, &[], IndexerState::Success);
        idx.caps = vec![
            Capability { id: "2000".into(), name: "Movies/Foreign".into() },
            Capability { id: "2010".into(), name: "Movies/Other".into() },
            Capability { id: "5000".into(), name: "TV".into() },
            Capability { id: "100001".into(), name: "Custom cat".into() },
        ];
        decorate_indexer(&mut idx, &test_config());

        assert_eq!(
            idx.rss_url,
            "http://localhost:9117/api/v2.0/indexers/alpha/results/torznab/api?apikey=secret&t=search&cat=&q="
        );
        assert_eq!(
            idx.torznab_url,
            "http://localhost:9117/api/v2.0/indexers/alpha/results/torznab/"
        );
        assert_eq!(
            idx.potato_url,
            "http://localhost:9117/api/v2.0/indexers/alpha/results/potato/"
        );
        assert_eq!(idx.state, IndexerState::Success);
        assert_eq!(idx.kind_label, "success");
        assert_eq!(idx.main_cats, "Movies, TV");
    }

    #[test]
    fn decorate_respects_base_path_and_errors() {
        let mut idx = indexer("beta", IndexerKind::Private, true, &[], IndexerState::Success);
        idx.last_error = "cannot connect".to_string();
        let cfg = ServerConfig {
            base_url: "http://localhost:9117".to_string(),
            base_path: "/jackett".to_string(),
            api_key: "k".to_string(),
        };
        decorate_indexer(&mut idx, &cfg);
        assert_eq!(
            idx.torznab_url,
            "http://localhost:9117/jackett/api/v2.0/indexers/beta/results/torznab/"
        );
        assert_eq!(idx.state, IndexerState::Error);
        assert_eq!(idx.kind_label, "danger");
    }

    #[test]
    fn test_state_records_sort_key_and_propagates() {
        let id = "state-test-unique";
        INDEXERS.write().unwrap().set_all(vec![indexer(
            id,
            IndexerKind::Public,
            true,
            &[],
            IndexerState::Success,
        )]);

        update_test_state(id, IndexerState::Error, Some("timeout"));
        {
            let results = TEST_RESULTS.read().unwrap();
            let res = &results[id];
            assert_eq!(res.state, IndexerState::Error);
            assert_eq!(res.sort_key, "timeout");
        }
        assert_eq!(
            INDEXERS.read().unwrap().all[0].state,
            IndexerState::Error
        );

        update_test_state(id, IndexerState::Success, Some("all good"));
        let results = TEST_RESULTS.read().unwrap();
        assert_eq!(results[id].sort_key, "");
        assert_eq!(results[id].message.as_deref(), Some("all good"));
    }
}
