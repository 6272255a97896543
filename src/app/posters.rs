// Poster textures for the results-table title tooltips: fetched once per
// release, decoded off the UI thread, delivered over a channel and turned
// into egui textures on the next frame.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc;

use eframe::egui;

use super::rt;
use crate::api::CLIENT;

pub enum PosterMsg {
    Ok {
        guid: String,
        w: usize,
        h: usize,
        rgba: Vec<u8>,
    },
    Err {
        guid: String,
    },
}

pub struct PosterState {
    pub textures: HashMap<String, egui::TextureHandle>,
    loading: HashSet<String>,
    failed: HashSet<String>,
    tx: mpsc::Sender<PosterMsg>,
    rx: mpsc::Receiver<PosterMsg>,
}

impl PosterState {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            textures: HashMap::new(),
            loading: HashSet::new(),
            failed: HashSet::new(),
            tx,
            rx,
        }
    }

    /// Kick off a poster download unless it is cached, in flight or has
    /// already failed (the tooltip schedules every frame while hovered).
    pub fn schedule(&mut self, ctx: &egui::Context, guid: &str, url: &str) {
        if url.is_empty()
            || self.textures.contains_key(guid)
            || self.loading.contains(guid)
            || self.failed.contains(guid)
        {
            return;
        }
        self.loading.insert(guid.to_string());
        log::debug!("poster schedule: guid={guid} url={url}");

        let guid = guid.to_string();
        let url = url.to_string();
        let tx = self.tx.clone();
        let ctx2 = ctx.clone();
        rt().spawn(async move {
            let msg = match fetch_poster(&url).await {
                Ok((w, h, rgba)) => PosterMsg::Ok { guid, w, h, rgba },
                Err(err) => {
                    log::warn!("poster fetch failed: err={err} url={url}");
                    PosterMsg::Err { guid }
                }
            };
            let _ = tx.send(msg);
            ctx2.request_repaint();
        });
    }

    /// Drain finished downloads into textures.
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                PosterMsg::Ok { guid, w, h, rgba } => {
                    let image = egui::ColorImage::from_rgba_unmultiplied([w, h], &rgba);
                    let tex = ctx.load_texture(
                        format!("poster_{guid}"),
                        image,
                        egui::TextureOptions::LINEAR,
                    );
                    self.loading.remove(&guid);
                    self.textures.insert(guid, tex);
                }
                PosterMsg::Err { guid } => {
                    self.loading.remove(&guid);
                    self.failed.insert(guid);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.textures.clear();
        self.loading.clear();
        self.failed.clear();
    }
}

async fn fetch_poster(url: &str) -> Result<(usize, usize, Vec<u8>), String> {
    let resp = CLIENT
        .get(url)
        .send()
        .await
        .map_err(|e| format!("request error: {e}"))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(format!("http status {}", status.as_u16()));
    }
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| format!("body read error: {e}"))?;
    tokio::task::spawn_blocking(move || {
        let img = image::load_from_memory(&bytes).map_err(|e| format!("decode error: {e}"))?;
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        Ok((w as usize, h as usize, rgba.into_raw()))
    })
    .await
    .map_err(|e| format!("decode task error: {e}"))?
}
