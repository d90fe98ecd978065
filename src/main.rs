mod app;
mod autostart;
mod countdown;
mod dialogs;
mod settings;

use std::{fs, path::PathBuf};

use anyhow::Result;
use eframe::egui;
use tracing::{info, warn};

use crate::{
    app::CountdownApp,
    settings::{Settings, SETTINGS_FILE},
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings_path = PathBuf::from(SETTINGS_FILE);
    let settings = Settings::load(&settings_path);

    if let Err(err) = autostart::sync(settings.auto_start) {
        warn!(?err, "autostart registration failed");
    }

    let viewport = egui::ViewportBuilder::default()
        .with_decorations(false)
        .with_always_on_top()
        .with_transparent(true)
        .with_inner_size([settings.size.0 as f32, settings.size.1 as f32])
        .with_min_inner_size([
            settings::MIN_WIDTH as f32,
            settings::MIN_HEIGHT as f32,
        ])
        .with_position(egui::pos2(
            settings.position.0 as f32,
            settings.position.1 as f32,
        ))
        .with_title("桌面倒计时");

    let native_options = eframe::NativeOptions {
        viewport,
        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };

    eframe::run_native(
        "Desktop Countdown",
        native_options,
        Box::new(move |cc| {
            configure_cjk_fonts(&cc.egui_ctx);
            Ok(Box::new(CountdownApp::new(settings, settings_path)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed starting countdown window: {err}"))?;

    Ok(())
}

/// The display strings contain CJK glyphs the bundled egui fonts lack.
/// Pull in a system font when one is available; otherwise keep the
/// defaults and let missing glyphs render as boxes.
fn configure_cjk_fonts(ctx: &egui::Context) {
    let Some((name, bytes)) = load_cjk_font_file() else {
        warn!("no CJK system font found, countdown text may render as boxes");
        return;
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("system_cjk".to_owned(), egui::FontData::from_owned(bytes));
    fonts
        .families
        .entry(egui::FontFamily::Proportional)
        .or_default()
        .push("system_cjk".to_owned());
    ctx.set_fonts(fonts);
    info!(font = %name, "loaded CJK system font");
}

fn load_cjk_font_file() -> Option<(String, Vec<u8>)> {
    for path in cjk_font_candidate_paths() {
        if !path.is_file() {
            continue;
        }
        match fs::read(&path) {
            Ok(bytes) => return Some((path.display().to_string(), bytes)),
            Err(err) => warn!(?err, path = %path.display(), "failed reading font file"),
        }
    }
    None
}

fn cjk_font_candidate_paths() -> Vec<PathBuf> {
    [
        // Windows
        r"C:\Windows\Fonts\msyh.ttc",
        r"C:\Windows\Fonts\msyh.ttf",
        r"C:\Windows\Fonts\simhei.ttf",
        // macOS
        "/System/Library/Fonts/PingFang.ttc",
        "/System/Library/Fonts/STHeiti Light.ttc",
        // Linux
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}
