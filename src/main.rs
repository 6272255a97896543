#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // скрыть консоль только в release
// Точка входа оставлена минимальной: только конфиг окна и запуск приложения.
// Вся логика в модуле app (src/app.rs).

use eframe::{egui, egui_wgpu::WgpuConfiguration, wgpu::PresentMode};

mod api;
mod app;
mod logger;
mod state;
mod types;
mod ui_constants;
mod util;
mod views;

fn main() -> eframe::Result<()> {
    logger::init();

    // Аргумент командной строки: ссылка из веб-интерфейса или голый фрагмент,
    // например "#q=ubuntu&tracker=rarbg" или "&tab=indexers"
    let hash_args = std::env::args()
        .nth(1)
        .map(|arg| {
            let fragment = match arg.find('#') {
                Some(i) => arg[i..].to_string(),
                None => arg,
            };
            util::get_hash_args(&fragment)
        })
        .unwrap_or_default();

    // Настройки для минимальной задержки:
    // - renderer: Wgpu (быстрее и даёт контроль над present mode)
    // - vsync: false (меньше задержка, возможен tearing)
    let wgpu_options = WgpuConfiguration {
        present_mode: PresentMode::AutoNoVsync,
        ..Default::default()
    };
    let native_options = eframe::NativeOptions {
        renderer: eframe::Renderer::Wgpu,
        vsync: false,
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        wgpu_options,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_resizable(true),
        ..Default::default()
    };

    let res = eframe::run_native(
        "Trawl",
        native_options,
        Box::new(move |_cc| Box::new(app::TrawlApp::new(hash_args))),
    );
    if let Err(ref e) = res {
        log::error!("eframe::run_native failed: {e}");
    }
    res
}
