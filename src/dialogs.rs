use eframe::egui;

use crate::countdown;
use crate::settings::{clamp_size, parse_hex_color, Settings};

/// One modal preference form at a time, rendered as an immediate child
/// viewport. Each variant carries its own input buffers so typing never
/// mutates the live settings until Apply validates.
pub enum Dialog {
    TargetDate {
        input: String,
        error: Option<String>,
    },
    CustomText {
        input: String,
    },
    Colors {
        bg: [u8; 3],
        fg: [u8; 3],
    },
    Size {
        width: String,
        height: String,
        error: Option<String>,
    },
    FontSizes {
        title: String,
        text: String,
        countdown: String,
        error: Option<String>,
    },
    About,
}

/// A validated edit produced by an Apply click.
pub enum DialogOutcome {
    TargetDate(String),
    CustomText(String),
    Colors { bg: String, fg: String },
    Size((i32, i32)),
    FontSizes { title: u32, text: u32, countdown: u32 },
}

pub enum DialogAction {
    Open,
    Close,
    Apply(DialogOutcome),
}

impl Dialog {
    pub fn target_date(settings: &Settings) -> Self {
        Self::TargetDate {
            input: settings.target_date.clone(),
            error: None,
        }
    }

    pub fn custom_text(settings: &Settings) -> Self {
        Self::CustomText {
            input: settings.custom_text.clone(),
        }
    }

    pub fn colors(settings: &Settings) -> Self {
        let bg = parse_hex_color(&settings.bg_color).unwrap_or(egui::Color32::from_rgb(51, 51, 51));
        let fg = parse_hex_color(&settings.fg_color).unwrap_or(egui::Color32::WHITE);
        Self::Colors {
            bg: [bg.r(), bg.g(), bg.b()],
            fg: [fg.r(), fg.g(), fg.b()],
        }
    }

    pub fn size(settings: &Settings) -> Self {
        Self::Size {
            width: settings.size.0.to_string(),
            height: settings.size.1.to_string(),
            error: None,
        }
    }

    pub fn font_sizes(settings: &Settings) -> Self {
        Self::FontSizes {
            title: settings.title_font_size.to_string(),
            text: settings.text_font_size.to_string(),
            countdown: settings.countdown_font_size.to_string(),
            error: None,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::TargetDate { .. } => "更改目标时间",
            Self::CustomText { .. } => "更改显示文字",
            Self::Colors { .. } => "更改颜色",
            Self::Size { .. } => "调整窗口大小",
            Self::FontSizes { .. } => "调整字体大小",
            Self::About => "关于软件",
        }
    }

    fn inner_size(&self) -> [f32; 2] {
        match self {
            Self::TargetDate { .. } => [340.0, 130.0],
            Self::CustomText { .. } => [340.0, 110.0],
            Self::Colors { .. } => [280.0, 130.0],
            Self::Size { .. } => [260.0, 150.0],
            Self::FontSizes { .. } => [280.0, 190.0],
            Self::About => [320.0, 180.0],
        }
    }

    /// Draws the dialog viewport for this frame and reports what the user
    /// did with it.
    pub fn show(&mut self, ctx: &egui::Context) -> DialogAction {
        let mut action = DialogAction::Open;
        let builder = egui::ViewportBuilder::default()
            .with_title(self.title())
            .with_inner_size(self.inner_size())
            .with_resizable(false)
            .with_always_on_top();
        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("countdown_pref_dialog"),
            builder,
            |ctx, _class| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    if let Some(act) = self.draw_form(ui) {
                        action = act;
                    }
                });
                if ctx.input(|input| input.viewport().close_requested()) {
                    action = DialogAction::Close;
                }
            },
        );
        action
    }

    fn draw_form(&mut self, ui: &mut egui::Ui) -> Option<DialogAction> {
        match self {
            Self::TargetDate { input, error } => {
                ui.label("请输入目标时间 (YYYY-MM-DD HH:MM:SS):");
                ui.text_edit_singleline(input);
                if let Some(message) = error.as_deref() {
                    ui.colored_label(egui::Color32::from_rgb(220, 60, 60), message);
                }
                if ui.button("应用").clicked() {
                    if validate_target_date(input) {
                        return Some(DialogAction::Apply(DialogOutcome::TargetDate(
                            input.clone(),
                        )));
                    }
                    *error =
                        Some("日期格式不正确，请使用 YYYY-MM-DD HH:MM:SS 格式".to_owned());
                }
                None
            }
            Self::CustomText { input } => {
                ui.label("请输入要显示的文字:");
                ui.text_edit_singleline(input);
                if ui.button("应用").clicked() {
                    return Some(DialogAction::Apply(DialogOutcome::CustomText(
                        input.clone(),
                    )));
                }
                None
            }
            Self::Colors { bg, fg } => {
                ui.horizontal(|ui| {
                    ui.label("背景颜色:");
                    ui.color_edit_button_srgb(bg);
                });
                ui.horizontal(|ui| {
                    ui.label("文字颜色:");
                    ui.color_edit_button_srgb(fg);
                });
                if ui.button("应用").clicked() {
                    return Some(DialogAction::Apply(DialogOutcome::Colors {
                        bg: format!("#{:02X}{:02X}{:02X}", bg[0], bg[1], bg[2]),
                        fg: format!("#{:02X}{:02X}{:02X}", fg[0], fg[1], fg[2]),
                    }));
                }
                None
            }
            Self::Size {
                width,
                height,
                error,
            } => {
                ui.horizontal(|ui| {
                    ui.label("宽度:");
                    ui.text_edit_singleline(width);
                });
                ui.horizontal(|ui| {
                    ui.label("高度:");
                    ui.text_edit_singleline(height);
                });
                if let Some(message) = error.as_deref() {
                    ui.colored_label(egui::Color32::from_rgb(220, 60, 60), message);
                }
                if ui.button("应用").clicked() {
                    match parse_size_input(width, height) {
                        Some(size) => {
                            return Some(DialogAction::Apply(DialogOutcome::Size(size)));
                        }
                        None => *error = Some("请输入有效的数字".to_owned()),
                    }
                }
                None
            }
            Self::FontSizes {
                title,
                text,
                countdown,
                error,
            } => {
                ui.horizontal(|ui| {
                    ui.label("标题字体大小:");
                    ui.text_edit_singleline(title);
                });
                ui.horizontal(|ui| {
                    ui.label("文本字体大小:");
                    ui.text_edit_singleline(text);
                });
                ui.horizontal(|ui| {
                    ui.label("倒计时字体大小:");
                    ui.text_edit_singleline(countdown);
                });
                if let Some(message) = error.as_deref() {
                    ui.colored_label(egui::Color32::from_rgb(220, 60, 60), message);
                }
                if ui.button("应用").clicked() {
                    match (
                        parse_font_size(title),
                        parse_font_size(text),
                        parse_font_size(countdown),
                    ) {
                        (Some(title), Some(text), Some(countdown)) => {
                            return Some(DialogAction::Apply(DialogOutcome::FontSizes {
                                title,
                                text,
                                countdown,
                            }));
                        }
                        _ => *error = Some("请输入有效的数字".to_owned()),
                    }
                }
                None
            }
            Self::About => {
                ui.label("作者：小盆友真聪明");
                ui.label("B站UID：382061364");
                ui.hyperlink("https://github.com/amagi678/Desktop-Countdown");
                ui.label("版本：1.0");
                ui.label("这是一个桌面倒计时悬浮窗程序");
                if ui.button("关闭").clicked() {
                    return Some(DialogAction::Close);
                }
                None
            }
        }
    }
}

pub fn validate_target_date(input: &str) -> bool {
    countdown::parse_target(input).is_some()
}

/// Parses a width/height pair, clamping to the window minimums. Returns
/// `None` when either field is not an integer.
pub fn parse_size_input(width: &str, height: &str) -> Option<(i32, i32)> {
    let width = width.trim().parse::<i32>().ok()?;
    let height = height.trim().parse::<i32>().ok()?;
    Some(clamp_size((width, height)))
}

/// Font sizes must be positive integers.
pub fn parse_font_size(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok().filter(|size| *size > 0)
}

#[cfg(test)]
mod tests {
    use super::{parse_font_size, parse_size_input, validate_target_date};

    #[test]
    fn target_date_validation_matches_countdown_format() {
        assert!(validate_target_date("2026-01-01 00:00:00"));
        assert!(!validate_target_date("2026/01/01"));
        assert!(!validate_target_date("2026-01-01"));
        assert!(!validate_target_date(" 2026-01-01 00:00:00"));
        assert!(!validate_target_date("2026-1-01 00:00:00"));
        assert!(!validate_target_date("soon"));
    }

    #[test]
    fn size_input_clamps_to_minimums() {
        assert_eq!(parse_size_input("50", "10"), Some((150, 80)));
        assert_eq!(parse_size_input("400", "300"), Some((400, 300)));
        assert_eq!(parse_size_input(" 200 ", " 100 "), Some((200, 100)));
    }

    #[test]
    fn size_input_rejects_non_numeric() {
        assert_eq!(parse_size_input("wide", "100"), None);
        assert_eq!(parse_size_input("200", ""), None);
        assert_eq!(parse_size_input("12.5", "100"), None);
    }

    #[test]
    fn font_size_must_be_positive_integer() {
        assert_eq!(parse_font_size("12"), Some(12));
        assert_eq!(parse_font_size("0"), None);
        assert_eq!(parse_font_size("-3"), None);
        assert_eq!(parse_font_size("big"), None);
    }
}
