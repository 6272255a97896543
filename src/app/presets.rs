// Saved search presets: a flat JSON string list, the desktop stand-in for
// the web UI's local storage. The list lives in a process-wide store seeded
// once at startup; readers take the lock only, every mutation writes the
// file back. Add/remove key on the exact trimmed query.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use lazy_static::lazy_static;

lazy_static! {
    static ref PRESETS: RwLock<Vec<String>> = RwLock::new(Vec::new());
}

fn presets_file_path() -> PathBuf {
    // Tests point this at a temp file
    if let Ok(p) = std::env::var("TRAWL_PRESETS_PATH") {
        return PathBuf::from(p);
    }
    PathBuf::from("saved_presets.json")
}

fn load_presets_from(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
        Err(_) => Vec::new(),
    }
}

fn save_presets_to(path: &Path, presets: &[String]) {
    match serde_json::to_string_pretty(presets) {
        Ok(data) => {
            if let Err(e) = std::fs::write(path, data) {
                log::error!(
                    "Failed to save presets to {}: {}",
                    path.to_string_lossy(),
                    e
                );
            }
        }
        Err(e) => log::error!("Failed to serialize presets: {}", e),
    }
}

/// Seed the in-memory list from disk. Missing or unreadable storage reads
/// as empty, matching a browser with cleared local storage.
pub fn load_presets_from_disk() {
    let path = presets_file_path();
    let presets = load_presets_from(&path);
    if !presets.is_empty() {
        log::info!(
            "Loaded {} saved searches from {}",
            presets.len(),
            path.to_string_lossy()
        );
    }
    *PRESETS.write().unwrap() = presets;
}

fn save_presets_to_disk() {
    let presets = PRESETS.read().unwrap().clone();
    save_presets_to(&presets_file_path(), &presets);
}

/// Snapshot of the saved presets for the dropdown.
pub fn get_saved_presets() -> Vec<String> {
    PRESETS.read().unwrap().clone()
}

/// Save the trimmed query unless already present. Returns true if it was added.
pub fn add_preset(preset: &str) -> bool {
    let trimmed = preset.trim();
    if trimmed.is_empty() {
        return false;
    }
    {
        let mut presets = PRESETS.write().unwrap();
        if presets.iter().any(|p| p == trimmed) {
            return false;
        }
        presets.push(trimmed.to_string());
    }
    save_presets_to_disk();
    log::info!("Saved search preset {trimmed:?}");
    true
}

/// Drop the trimmed query if present. Returns true if anything was removed.
pub fn remove_preset(preset: &str) -> bool {
    let trimmed = preset.trim();
    if trimmed.is_empty() {
        return false;
    }
    {
        let mut presets = PRESETS.write().unwrap();
        let before = presets.len();
        presets.retain(|p| p != trimmed);
        if presets.len() == before {
            return false;
        }
    }
    save_presets_to_disk();
    log::info!("Removed search preset {trimmed:?}");
    true
}

/// True when the trimmed query is already saved (drives the save/remove
/// toggle button state).
pub fn is_preset_saved(preset: &str) -> bool {
    let trimmed = preset.trim();
    !trimmed.is_empty() && PRESETS.read().unwrap().iter().any(|p| p == trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_presets_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("{}_{}.json", name, std::process::id()));
        p
    }

    #[test]
    fn file_round_trip_is_lossless() {
        let path = temp_presets_path("trawl_presets_roundtrip");
        let presets = vec!["iron giant".to_string(), "s01e01".to_string()];
        save_presets_to(&path, &presets);
        assert_eq!(load_presets_from(&path), presets);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let path = temp_presets_path("trawl_presets_missing");
        let _ = std::fs::remove_file(&path);
        assert!(load_presets_from(&path).is_empty());
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let path = temp_presets_path("trawl_presets_corrupt");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_presets_from(&path).is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn store_keys_on_trimmed_value_and_writes_through() {
        // One test owns the env override and the global store; the file
        // helpers above stay on explicit paths.
        let path = temp_presets_path("trawl_presets_store");
        let _ = std::fs::remove_file(&path);
        std::env::set_var("TRAWL_PRESETS_PATH", &path);

        assert!(add_preset("  preset-one-of-a-kind  "));
        assert!(!add_preset("preset-one-of-a-kind"), "exact duplicate after trim");
        assert!(!add_preset("   "), "blank input is ignored");
        assert!(is_preset_saved("preset-one-of-a-kind"));
        assert!(
            load_presets_from(&path).contains(&"preset-one-of-a-kind".to_string()),
            "add writes through to the file"
        );

        // Readers come from memory: deleting the file changes nothing
        // mid-session.
        let _ = std::fs::remove_file(&path);
        assert!(is_preset_saved("preset-one-of-a-kind"));
        assert!(get_saved_presets().contains(&"preset-one-of-a-kind".to_string()));

        // Reload replaces the list with whatever the file holds.
        save_presets_to(&path, &["preset-restored".to_string()]);
        load_presets_from_disk();
        assert!(is_preset_saved("preset-restored"));
        assert!(!is_preset_saved("preset-one-of-a-kind"));

        assert!(remove_preset("preset-restored "));
        assert!(!remove_preset("preset-restored"), "already gone");
        assert!(
            load_presets_from(&path).is_empty(),
            "remove writes through to the file"
        );

        std::env::remove_var("TRAWL_PRESETS_PATH");
        let _ = std::fs::remove_file(path);
    }
}
