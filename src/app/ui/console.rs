use eframe::egui::{self, Context, Key, TextStyle};

use super::super::MindGraphApp;

impl MindGraphApp {
    pub(in crate::app) fn draw_console(&mut self, ctx: &Context) {
        egui::TopBottomPanel::bottom("console")
            .resizable(true)
            .default_height(180.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                let input_height = ui.text_style_height(&TextStyle::Monospace) + 10.0;
                egui::ScrollArea::vertical()
                    .id_salt("console_scroll")
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .max_height(ui.available_height() - input_height)
                    .show(ui, |ui| {
                        for line in &self.console_lines {
                            ui.monospace(line);
                        }
                    });

                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.console_input)
                        .desired_width(f32::INFINITY)
                        .font(TextStyle::Monospace)
                        .hint_text("help"),
                );
                if response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter)) {
                    let line = std::mem::take(&mut self.console_input);
                    self.run_console_line(&line);
                    response.request_focus();
                }
            });
    }
}
