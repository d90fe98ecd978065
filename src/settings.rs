use std::{fs, path::Path};

use anyhow::{Context, Result};
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SETTINGS_FILE: &str = "countdown_settings.json";

pub const MIN_WIDTH: i32 = 150;
pub const MIN_HEIGHT: i32 = 80;

/// The full persisted preference record. Any key missing from the saved
/// file keeps its default, so older files keep loading after new fields
/// are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target_date: String,
    pub custom_text: String,
    pub position: (i32, i32),
    pub size: (i32, i32),
    pub bg_color: String,
    pub fg_color: String,
    pub transparent: bool,
    pub auto_start: bool,
    pub title_font_size: u32,
    pub text_font_size: u32,
    pub countdown_font_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_date: "2026-01-01 00:00:00".to_owned(),
            custom_text: "距离2026年1月1日还有".to_owned(),
            position: (100, 100),
            size: (200, 100),
            bg_color: "#333333".to_owned(),
            fg_color: "#FFFFFF".to_owned(),
            transparent: false,
            auto_start: true,
            title_font_size: 10,
            text_font_size: 10,
            countdown_font_size: 12,
        }
    }
}

impl Settings {
    /// Loads the persisted record, falling back to defaults if the file is
    /// missing or unreadable. Load never fails the caller; a corrupt file
    /// only costs the user their saved preferences.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(?err, path = %path.display(), "failed reading settings, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&text) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(?err, path = %path.display(), "invalid settings json, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let payload = serde_json::to_string_pretty(self).context("failed serializing settings")?;
        fs::write(path, payload)
            .with_context(|| format!("failed writing settings at {}", path.display()))?;
        Ok(())
    }
}

/// Window minimums, enforced at every edit site.
pub fn clamp_size(size: (i32, i32)) -> (i32, i32) {
    (size.0.max(MIN_WIDTH), size.1.max(MIN_HEIGHT))
}

pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

pub fn format_hex_color(color: Color32) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r(), color.g(), color.b())
}

#[cfg(test)]
mod tests {
    use eframe::egui::Color32;

    use super::{clamp_size, format_hex_color, parse_hex_color, Settings};

    #[test]
    fn defaults_match_original_widget() {
        let settings = Settings::default();
        assert_eq!(settings.target_date, "2026-01-01 00:00:00");
        assert_eq!(settings.position, (100, 100));
        assert_eq!(settings.size, (200, 100));
        assert_eq!(settings.bg_color, "#333333");
        assert_eq!(settings.fg_color, "#FFFFFF");
        assert!(!settings.transparent);
        assert!(settings.auto_start);
        assert_eq!(settings.title_font_size, 10);
        assert_eq!(settings.text_font_size, 10);
        assert_eq!(settings.countdown_font_size, 12);
    }

    #[test]
    fn partial_json_merges_under_defaults() {
        let raw = r#"{ "custom_text": "X" }"#;
        let parsed: Settings = serde_json::from_str(raw).expect("settings should parse");
        let mut expected = Settings::default();
        expected.custom_text = "X".to_owned();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = std::env::temp_dir().join(format!(
            "countdown_settings_test_{}.json",
            std::process::id()
        ));
        let mut settings = Settings::default();
        settings.custom_text = "until launch".to_owned();
        settings.position = (42, 7);
        settings.transparent = true;
        settings.save(&path).expect("save should succeed");
        let loaded = Settings::load(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!(
            "countdown_settings_corrupt_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").expect("write should succeed");
        let loaded = Settings::load(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn clamp_size_enforces_minimums() {
        assert_eq!(clamp_size((50, 10)), (150, 80));
        assert_eq!(clamp_size((150, 80)), (150, 80));
        assert_eq!(clamp_size((640, 480)), (640, 480));
    }

    #[test]
    fn hex_colors_parse_strictly() {
        assert_eq!(parse_hex_color("#333333"), Some(Color32::from_rgb(51, 51, 51)));
        assert_eq!(parse_hex_color("#FFFFFF"), Some(Color32::WHITE));
        assert_eq!(parse_hex_color("FFFFFF"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn hex_colors_reject_multibyte_input() {
        // Hand-edited settings files can hold anything; parsing must not
        // panic on non-ASCII bytes that happen to be six bytes long.
        assert_eq!(parse_hex_color("中文"), None);
        assert_eq!(parse_hex_color("#中文"), None);
        assert_eq!(parse_hex_color("#ＦＦＦＦＦＦ"), None);
    }

    #[test]
    fn hex_colors_round_trip() {
        let color = Color32::from_rgb(0x1e, 0x90, 0xff);
        assert_eq!(format_hex_color(color), "#1E90FF");
        assert_eq!(parse_hex_color(&format_hex_color(color)), Some(color));
    }
}
