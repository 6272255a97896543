// Shared enums: indexer classification, test state, toast levels, main tabs.

use serde::Deserialize;

#[derive(strum::EnumCount, strum::EnumIter, PartialEq, Eq, Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexerKind {
    Public,
    Private,
    #[serde(rename = "semi-private")]
    SemiPrivate,
    #[default]
    #[serde(other)]
    Unknown,
}

impl IndexerKind {
    // Value used in filter ids and API query strings
    pub fn api_value(&self) -> &'static str {
        match self {
            IndexerKind::Public => "public",
            IndexerKind::Private => "private",
            IndexerKind::SemiPrivate => "semi-private",
            IndexerKind::Unknown => "unknown",
        }
    }

    // Badge class driving the kind chip color
    pub fn badge_label(&self) -> &'static str {
        match self {
            IndexerKind::Public => "success",
            IndexerKind::Private => "danger",
            IndexerKind::SemiPrivate => "warning",
            IndexerKind::Unknown => "default",
        }
    }
}

impl std::fmt::Display for IndexerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IndexerKind::Public => "Public",
            IndexerKind::Private => "Private",
            IndexerKind::SemiPrivate => "Semi-private",
            IndexerKind::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum IndexerState {
    #[default]
    Success,
    Error,
    InProgress,
}

impl std::fmt::Display for IndexerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IndexerState::Success => "success",
            IndexerState::Error => "error",
            IndexerState::InProgress => "in progress",
        };
        f.write_str(s)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ToastLevel {
    Success,
    Warning,
    Danger,
    Info,
}

#[derive(strum::EnumCount, strum::EnumIter, PartialEq, Eq, Clone, Copy, Debug, Default, strum::Display)]
pub enum Tab {
    #[default]
    Search,
    Indexers,
}
