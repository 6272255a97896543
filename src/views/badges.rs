use eframe::egui::{self, Color32, RichText, Rounding};

use crate::api::Release;
use crate::ui_constants::badge;

/// Rounded chip in the label palette.
pub fn draw_badge(ui: &mut egui::Ui, text: &str, bg: Color32, fg: Color32) {
    egui::Frame::none()
        .fill(bg)
        .rounding(Rounding::same(badge::ROUNDING))
        .inner_margin(egui::Margin::symmetric(6.0, 2.0))
        .show(ui, |ui| {
            ui.label(RichText::new(text).small().color(fg));
        });
}

/// Chip color for an indexer kind label ("success", "danger", "warning", "default").
pub fn kind_color(label: &str) -> Color32 {
    match label {
        "success" => badge::SUCCESS,
        "danger" => badge::DANGER,
        "warning" => badge::WARNING,
        _ => badge::DEFAULT,
    }
}

pub fn imdb_url(id: i64) -> Option<String> {
    if id <= 0 {
        return None;
    }
    // tt ids are at least seven digits, longer ones pass through unpadded
    Some(format!("https://www.imdb.com/title/tt{id:07}/"))
}

pub fn tmdb_url(id: i64, category: &str) -> Option<String> {
    if id <= 0 {
        return None;
    }
    let kind = if category.contains("Movies") { "movie" } else { "tv" };
    Some(format!("https://www.themoviedb.org/{kind}/{id}"))
}

pub fn tvdb_url(id: i64) -> Option<String> {
    if id <= 0 {
        return None;
    }
    Some(format!("https://thetvdb.com/?tab=series&id={id}"))
}

pub fn tvmaze_url(id: i64) -> Option<String> {
    if id <= 0 {
        return None;
    }
    Some(format!("https://tvmaze.com/shows/{id}"))
}

pub fn trakt_url(id: i64, category: &str) -> Option<String> {
    if id <= 0 {
        return None;
    }
    let kind = if category.contains("Movies") { "movies" } else { "shows" };
    Some(format!("https://www.trakt.tv/{kind}/{id}"))
}

pub fn douban_url(id: i64) -> Option<String> {
    if id <= 0 {
        return None;
    }
    Some(format!("https://movie.douban.com/subject/{id}"))
}

pub struct FactorLabel {
    pub text: String,
    pub bg: Color32,
    pub fg: Color32,
}

/// Label for the download volume factor: free leech, discounted or penalized.
/// A factor of exactly 1 is the norm and gets no label.
pub fn download_factor_label(factor: Option<f64>) -> Option<FactorLabel> {
    let f = factor?;
    if f.is_nan() {
        return None;
    }
    if f == 0.0 {
        Some(FactorLabel {
            text: "FREELEECH".to_string(),
            bg: badge::SUCCESS,
            fg: badge::TEXT,
        })
    } else if f < 1.0 {
        Some(FactorLabel {
            text: format!("{:.0}%DL", f * 100.0),
            bg: badge::PRIMARY,
            fg: badge::TEXT,
        })
    } else if f > 1.0 {
        Some(FactorLabel {
            text: format!("{:.0}%DL", f * 100.0),
            bg: badge::DANGER,
            fg: badge::TEXT,
        })
    } else {
        None
    }
}

/// Label for the upload volume factor. A factor of exactly 1 gets no label.
pub fn upload_factor_label(factor: Option<f64>) -> Option<FactorLabel> {
    let f = factor?;
    if f.is_nan() {
        return None;
    }
    if f == 0.0 {
        Some(FactorLabel {
            text: "NO UPLOAD".to_string(),
            bg: badge::WARNING,
            fg: badge::TEXT_DARK,
        })
    } else if f != 1.0 {
        Some(FactorLabel {
            text: format!("{:.0}%UL", f * 100.0),
            bg: badge::INFO,
            fg: badge::TEXT,
        })
    } else {
        None
    }
}

/// External-database links plus volume-factor chips for one release row.
pub fn draw_release_labels(ui: &mut egui::Ui, release: &Release) {
    let cat = release.category_desc.as_str();
    let links = [
        ("IMDB", release.imdb.and_then(imdb_url)),
        ("TMDB", release.tmdb.and_then(|id| tmdb_url(id, cat))),
        ("TVDB", release.tvdb_id.and_then(tvdb_url)),
        ("TVMaze", release.tvmaze_id.and_then(tvmaze_url)),
        ("Trakt", release.trakt_id.and_then(|id| trakt_url(id, cat))),
        ("Douban", release.douban_id.and_then(douban_url)),
    ];
    for (label, url) in links {
        if let Some(url) = url {
            ui.hyperlink_to(RichText::new(label).small(), url);
        }
    }

    if let Some(label) = download_factor_label(release.download_volume_factor) {
        draw_badge(ui, &label.text, label.bg, label.fg);
    }
    if let Some(label) = upload_factor_label(release.upload_volume_factor) {
        draw_badge(ui, &label.text, label.bg, label.fg);
    }
}
