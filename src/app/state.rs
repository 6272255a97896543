// Per-screen state owned by TrawlApp, split out of app.rs.

use std::sync::mpsc;
use std::time::Instant;

use super::fetch::FetchMsg;
use crate::api::SearchResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Main,
}

/// Search inputs on the main screen. Category input is kept as free text and
/// parsed right before the request goes out.
pub struct SearchState {
    pub query: String,
    pub trackers: Vec<String>,
    pub category_input: String,
    pub search_due_at: Option<Instant>,
    pub page: usize,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            trackers: Vec::new(),
            category_input: String::new(),
            search_due_at: None,
            page: 0,
        }
    }
}

pub struct NetState {
    pub counter: u64,
    pub loading: bool,
    pub tx: mpsc::Sender<FetchMsg>,
    pub rx: mpsc::Receiver<FetchMsg>,
    pub last_result: Option<SearchResponse>,
    pub last_error: Option<String>,
    pub indexers_started: bool,
    pub indexers_loading: bool,
    pub indexers_error: Option<String>,
}

impl NetState {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            counter: 0,
            loading: false,
            tx,
            rx,
            last_result: None,
            last_error: None,
            indexers_started: false,
            indexers_loading: false,
            indexers_error: None,
        }
    }
}

/// First-run connection form state. The screen lives here so the setup flow
/// owns the transition into the main screen.
pub struct SetupState {
    pub screen: Screen,
    pub server_input: String,
    pub api_key_input: String,
    pub error: Option<String>,
    pub in_progress: bool,
    pub tx: mpsc::Sender<Result<(), String>>,
    pub rx: mpsc::Receiver<Result<(), String>>,
}

impl SetupState {
    pub fn new(screen: Screen) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            screen,
            server_input: String::new(),
            api_key_input: String::new(),
            error: None,
            in_progress: false,
            tx,
            rx,
        }
    }
}
