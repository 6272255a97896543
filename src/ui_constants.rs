// Named constants for layout and colors shared across the UI.

use eframe::egui::Color32;

/// Debounce delay for search query in milliseconds
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Maximum rows rendered per results page
pub const RESULTS_PAGE_SIZE: usize = 100;

/// Badge palette keyed by the label classes produced by indexer decoration
pub mod badge {
    use super::Color32;

    /// "success" class (public indexers, freeleech, passed tests)
    pub const SUCCESS: Color32 = Color32::from_rgb(92, 184, 92);

    /// "danger" class (private indexers, failed tests, >100% download factor)
    pub const DANGER: Color32 = Color32::from_rgb(217, 83, 79);

    /// "warning" class (semi-private indexers, no-upload)
    pub const WARNING: Color32 = Color32::from_rgb(240, 173, 78);

    /// "info" class (upload factor chips)
    pub const INFO: Color32 = Color32::from_rgb(91, 192, 222);

    /// "primary" class (sub-100% download factor chips)
    pub const PRIMARY: Color32 = Color32::from_rgb(51, 122, 183);

    /// "default" class (unknown kinds, plain tag chips)
    pub const DEFAULT: Color32 = Color32::from_rgb(119, 119, 119);

    /// Text color over most badge fills
    pub const TEXT: Color32 = Color32::WHITE;

    /// Text color over the warning fill, which is too light for white
    pub const TEXT_DARK: Color32 = Color32::from_rgb(33, 37, 41);

    /// Badge corner rounding
    pub const ROUNDING: f32 = 4.0;
}

/// Toast overlay layout
pub mod toast {
    /// Seconds an auto-hide toast stays visible
    pub const TTL_SECS: u64 = 5;

    /// Toast panel width in logical pixels
    pub const WIDTH: f32 = 340.0;

    /// Margin from the screen corner
    pub const MARGIN: f32 = 12.0;

    /// Vertical gap between stacked toasts
    pub const GAP: f32 = 8.0;
}

/// Results/indexer table layout
pub mod table {
    /// Minimum height of a data row
    pub const ROW_HEIGHT: f32 = 22.0;

    /// Max width of the poster shown in the title tooltip
    pub const POSTER_WIDTH: f32 = 200.0;

    /// Max characters of the title cell before truncation
    pub const TITLE_CLIP: usize = 90;
}

/// Spacing steps used by the screens and tables
pub mod spacing {
    /// Tight gap inside a panel
    pub const SMALL: f32 = 4.0;

    /// Gap between blocks
    pub const MEDIUM: f32 = 8.0;

    /// Top gap above centered status screens
    pub const XLARGE: f32 = 24.0;
}
