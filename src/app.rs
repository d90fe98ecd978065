use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use chrono::Local;
use eframe::egui::{
    self, Align, Color32, CursorIcon, Id, Label, Layout, Rect, RichText, Sense, Stroke, Vec2,
    ViewportCommand,
};
use tracing::warn;

use crate::{
    autostart, countdown,
    dialogs::{Dialog, DialogAction, DialogOutcome},
    settings::{clamp_size, parse_hex_color, Settings, MIN_HEIGHT, MIN_WIDTH},
};

const EDGE_GRAB_WIDTH: f32 = 4.0;
const HANDLE_HEIGHT: f32 = 6.0;
const GEOMETRY_FLUSH_DELAY: Duration = Duration::from_millis(600);

pub struct CountdownApp {
    settings: Settings,
    settings_path: PathBuf,
    dialog: Option<Dialog>,
    geometry_changed_at: Option<Instant>,
}

impl CountdownApp {
    pub fn new(settings: Settings, settings_path: PathBuf) -> Self {
        Self {
            settings,
            settings_path,
            dialog: None,
            geometry_changed_at: None,
        }
    }

    fn save_settings(&mut self) {
        if let Err(err) = self.settings.save(&self.settings_path) {
            warn!(?err, "failed saving settings");
        }
    }

    fn bg_color(&self) -> Color32 {
        parse_hex_color(&self.settings.bg_color).unwrap_or(Color32::from_rgb(51, 51, 51))
    }

    fn fg_color(&self) -> Color32 {
        parse_hex_color(&self.settings.fg_color).unwrap_or(Color32::WHITE)
    }

    /// Mirrors the live viewport geometry into settings. The actual file
    /// write is debounced so drag and resize gestures do not write on
    /// every moved pixel.
    fn sync_window_geometry(&mut self, ctx: &egui::Context) {
        let (minimized, inner_rect, outer_rect) = ctx.input(|input| {
            let viewport = input.viewport();
            (viewport.minimized, viewport.inner_rect, viewport.outer_rect)
        });
        if minimized.unwrap_or(false) {
            return;
        }

        let mut changed = false;
        if let Some(inner) = inner_rect {
            let size = clamp_size((inner.width().round() as i32, inner.height().round() as i32));
            if size != self.settings.size {
                self.settings.size = size;
                changed = true;
            }
        }
        if let Some(outer) = outer_rect {
            let position = (outer.min.x.round() as i32, outer.min.y.round() as i32);
            if position != self.settings.position {
                self.settings.position = position;
                changed = true;
            }
        }
        if changed {
            self.geometry_changed_at = Some(Instant::now());
        }
    }

    fn flush_window_geometry_if_due(&mut self, ctx: &egui::Context) {
        let Some(changed_at) = self.geometry_changed_at else {
            return;
        };
        let close_requested = ctx.input(|input| input.viewport().close_requested());
        if !close_requested && changed_at.elapsed() < GEOMETRY_FLUSH_DELAY {
            return;
        }
        self.geometry_changed_at = None;
        self.save_settings();
    }

    /// Grows or shrinks the window by a pointer delta, keeping the 150x80
    /// minimum. Left-edge resizes shift the window so the right edge
    /// stays put.
    fn resize_window(&mut self, ctx: &egui::Context, dw: f32, dh: f32, from_left_edge: bool) {
        let (inner_rect, outer_rect) = ctx.input(|input| {
            let viewport = input.viewport();
            (viewport.inner_rect, viewport.outer_rect)
        });
        let Some(inner) = inner_rect else {
            return;
        };
        let new_width = (inner.width() + dw).max(MIN_WIDTH as f32);
        let new_height = (inner.height() + dh).max(MIN_HEIGHT as f32);
        if from_left_edge {
            if let Some(outer) = outer_rect {
                let shift = inner.width() - new_width;
                ctx.send_viewport_cmd(ViewportCommand::OuterPosition(egui::pos2(
                    outer.min.x + shift,
                    outer.min.y,
                )));
            }
        }
        ctx.send_viewport_cmd(ViewportCommand::InnerSize(Vec2::new(new_width, new_height)));
    }

    fn draw_widget(&mut self, ctx: &egui::Context) {
        let bg = self.bg_color();
        let fg = self.fg_color();
        // With transparency on, the background acts as a chroma key and
        // nothing is painted behind the text.
        let fill = if self.settings.transparent {
            Color32::TRANSPARENT
        } else {
            bg
        };
        let mut frame = egui::Frame::none()
            .fill(fill)
            .inner_margin(egui::Margin::symmetric(5.0, 2.0));
        if !self.settings.transparent {
            frame = frame.stroke(Stroke::new(2.0, bg.gamma_multiply(1.6)));
        }

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            self.draw_title_row(ui, ctx);
            self.draw_labels(ui, fg);
            self.draw_resize_zones(ui, ctx);
        });
    }

    fn draw_title_row(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let fg = self.fg_color();
        let title_size = self.settings.title_font_size as f32;
        ui.horizontal(|ui| {
            let title = ui.add(
                Label::new(RichText::new("倒计时").size(title_size).color(fg))
                    .sense(Sense::drag()),
            );
            if title.drag_started() {
                ctx.send_viewport_cmd(ViewportCommand::StartDrag);
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.menu_button(RichText::new("⚙").size(title_size).color(fg), |ui| {
                    self.settings_menu(ui, ctx);
                });
                // The gap between title and gear doubles as drag area.
                let gap = ui.allocate_response(ui.available_size(), Sense::drag());
                if gap.drag_started() {
                    ctx.send_viewport_cmd(ViewportCommand::StartDrag);
                }
            });
        });
    }

    fn draw_labels(&mut self, ui: &mut egui::Ui, fg: Color32) {
        let state = countdown::compute(&self.settings.target_date, Local::now().naive_local());
        ui.vertical_centered(|ui| {
            ui.add(Label::new(
                RichText::new(&self.settings.custom_text)
                    .size(self.settings.text_font_size as f32)
                    .color(fg),
            ));
            ui.add(Label::new(
                RichText::new(state.label())
                    .size(self.settings.countdown_font_size as f32)
                    .color(fg)
                    .strong(),
            ));
        });
    }

    fn draw_resize_zones(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let panel = ui.max_rect();

        let handle_rect = Rect::from_min_max(
            egui::pos2(panel.left(), panel.bottom() - HANDLE_HEIGHT),
            panel.max,
        );
        let handle = ui
            .interact(handle_rect, Id::new("resize_handle"), Sense::drag())
            .on_hover_cursor(CursorIcon::ResizeVertical);
        if handle.dragged() {
            self.resize_window(ctx, 0.0, handle.drag_delta().y, false);
        }

        let left_rect = Rect::from_min_size(panel.min, Vec2::new(EDGE_GRAB_WIDTH, panel.height()));
        let left = ui
            .interact(left_rect, Id::new("resize_left"), Sense::drag())
            .on_hover_cursor(CursorIcon::ResizeHorizontal);
        if left.dragged() {
            self.resize_window(ctx, -left.drag_delta().x, 0.0, true);
        }

        let right_rect = Rect::from_min_size(
            egui::pos2(panel.right() - EDGE_GRAB_WIDTH, panel.top()),
            Vec2::new(EDGE_GRAB_WIDTH, panel.height()),
        );
        let right = ui
            .interact(right_rect, Id::new("resize_right"), Sense::drag())
            .on_hover_cursor(CursorIcon::ResizeHorizontal);
        if right.dragged() {
            self.resize_window(ctx, right.drag_delta().x, 0.0, false);
        }
    }

    fn settings_menu(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        if ui.button("更改目标时间").clicked() {
            self.dialog = Some(Dialog::target_date(&self.settings));
            ui.close_menu();
        }
        if ui.button("更改显示文字").clicked() {
            self.dialog = Some(Dialog::custom_text(&self.settings));
            ui.close_menu();
        }
        if ui.button("更改颜色").clicked() {
            self.dialog = Some(Dialog::colors(&self.settings));
            ui.close_menu();
        }
        if ui.button("切换透明").clicked() {
            self.toggle_transparent();
            ui.close_menu();
        }
        if ui.button("调整窗口大小").clicked() {
            self.dialog = Some(Dialog::size(&self.settings));
            ui.close_menu();
        }
        if ui.button("调整字体大小").clicked() {
            self.dialog = Some(Dialog::font_sizes(&self.settings));
            ui.close_menu();
        }
        let mut auto_start = self.settings.auto_start;
        if ui.checkbox(&mut auto_start, "开机自启动").clicked() {
            self.set_auto_start(auto_start);
            ui.close_menu();
        }
        if ui.button("关于软件").clicked() {
            self.dialog = Some(Dialog::About);
            ui.close_menu();
        }
        ui.separator();
        if ui.button("退出").clicked() {
            ctx.send_viewport_cmd(ViewportCommand::Close);
            ui.close_menu();
        }
    }

    fn toggle_transparent(&mut self) {
        self.settings.transparent = !self.settings.transparent;
        self.save_settings();
    }

    fn set_auto_start(&mut self, enabled: bool) {
        self.settings.auto_start = enabled;
        if let Err(err) = autostart::sync(enabled) {
            warn!(?err, "autostart registration failed");
        }
        self.save_settings();
    }

    fn apply_dialog_outcome(&mut self, ctx: &egui::Context, outcome: DialogOutcome) {
        match outcome {
            DialogOutcome::TargetDate(value) => self.settings.target_date = value,
            DialogOutcome::CustomText(value) => self.settings.custom_text = value,
            DialogOutcome::Colors { bg, fg } => {
                self.settings.bg_color = bg;
                self.settings.fg_color = fg;
            }
            DialogOutcome::Size(size) => {
                self.settings.size = size;
                ctx.send_viewport_cmd(ViewportCommand::InnerSize(Vec2::new(
                    size.0 as f32,
                    size.1 as f32,
                )));
            }
            DialogOutcome::FontSizes {
                title,
                text,
                countdown,
            } => {
                self.settings.title_font_size = title;
                self.settings.text_font_size = text;
                self.settings.countdown_font_size = countdown;
            }
        }
        self.save_settings();
    }

    fn show_dialog(&mut self, ctx: &egui::Context) {
        let Some(mut dialog) = self.dialog.take() else {
            return;
        };
        match dialog.show(ctx) {
            DialogAction::Open => self.dialog = Some(dialog),
            DialogAction::Close => {}
            DialogAction::Apply(outcome) => self.apply_dialog_outcome(ctx, outcome),
        }
    }
}

impl eframe::App for CountdownApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_window_geometry(ctx);
        self.flush_window_geometry_if_due(ctx);
        self.draw_widget(ctx);
        self.show_dialog(ctx);
        // Countdown tick. The repaint request dies with the window, which
        // is the only cancellation this timer needs.
        ctx.request_repaint_after(Duration::from_secs(1));
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use eframe::egui;

    use crate::dialogs::DialogOutcome;
    use crate::settings::Settings;

    use super::CountdownApp;

    fn test_app(tag: &str) -> CountdownApp {
        let path = std::env::temp_dir().join(format!(
            "countdown_app_{tag}_{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        CountdownApp::new(Settings::default(), path)
    }

    fn cleanup(app: &CountdownApp) {
        let _ = std::fs::remove_file(&app.settings_path);
    }

    #[test]
    fn target_date_outcome_updates_and_persists() {
        let ctx = egui::Context::default();
        let mut app = test_app("date");
        app.apply_dialog_outcome(
            &ctx,
            DialogOutcome::TargetDate("2030-06-01 12:00:00".to_owned()),
        );
        assert_eq!(app.settings.target_date, "2030-06-01 12:00:00");
        let reloaded = Settings::load(&app.settings_path);
        assert_eq!(reloaded.target_date, "2030-06-01 12:00:00");
        cleanup(&app);
    }

    #[test]
    fn size_outcome_stores_dimensions_and_resizes_viewport() {
        let ctx = egui::Context::default();
        let mut app = test_app("size");
        app.apply_dialog_outcome(&ctx, DialogOutcome::Size((400, 300)));
        assert_eq!(app.settings.size, (400, 300));
        cleanup(&app);
    }

    #[test]
    fn color_outcome_replaces_both_colors() {
        let ctx = egui::Context::default();
        let mut app = test_app("colors");
        app.apply_dialog_outcome(
            &ctx,
            DialogOutcome::Colors {
                bg: "#000000".to_owned(),
                fg: "#00FF00".to_owned(),
            },
        );
        assert_eq!(app.settings.bg_color, "#000000");
        assert_eq!(app.settings.fg_color, "#00FF00");
        cleanup(&app);
    }

    #[test]
    fn font_size_outcome_updates_all_three() {
        let ctx = egui::Context::default();
        let mut app = test_app("fonts");
        app.apply_dialog_outcome(
            &ctx,
            DialogOutcome::FontSizes {
                title: 14,
                text: 12,
                countdown: 20,
            },
        );
        assert_eq!(app.settings.title_font_size, 14);
        assert_eq!(app.settings.text_font_size, 12);
        assert_eq!(app.settings.countdown_font_size, 20);
        cleanup(&app);
    }

    #[test]
    fn toggle_transparent_flips_flag() {
        let mut app = test_app("transparent");
        assert!(!app.settings.transparent);
        app.toggle_transparent();
        assert!(app.settings.transparent);
        app.toggle_transparent();
        assert!(!app.settings.transparent);
        cleanup(&app);
    }

    #[test]
    fn unparseable_configured_colors_fall_back() {
        let mut settings = Settings::default();
        settings.bg_color = "not-a-color".to_owned();
        settings.fg_color = "#GG0000".to_owned();
        let app = CountdownApp::new(settings, PathBuf::from("unused.json"));
        assert_eq!(app.bg_color(), egui::Color32::from_rgb(51, 51, 51));
        assert_eq!(app.fg_color(), egui::Color32::WHITE);
    }
}
