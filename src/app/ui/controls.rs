use anyhow::Context;
use eframe::egui::{self, Ui};
use serde_json::Value;

use crate::camera::PresetView;
use crate::graph::{SessionDocument, normalize_session_document};
use crate::session::{SessionAction, SessionEvent};

use super::super::MindGraphApp;

impl MindGraphApp {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Mind Map Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search (node id)")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the graph.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();

        ui.collapsing("File", |ui| self.draw_file_section(ui));
        ui.collapsing("Cloud", |ui| self.draw_cloud_section(ui));
        ui.collapsing("Camera", |ui| self.draw_camera_section(ui));
        ui.collapsing("Layout", |ui| self.draw_layout_section(ui));
        ui.collapsing("Modes", |ui| self.draw_modes_section(ui));
    }

    fn draw_file_section(&mut self, ui: &mut Ui) {
        ui.label("JSON file path");
        ui.text_edit_singleline(&mut self.file_path);
        ui.horizontal(|ui| {
            if ui.button("Load file").clicked() {
                self.load_file();
            }
            if ui.button("New graph").clicked() {
                match self.session.apply(SessionAction::NewGraph) {
                    Ok(_) => {
                        self.layout.reheat();
                        self.console_push("Created a new empty graph.");
                    }
                    Err(err) => self.console_push(err.to_string()),
                }
            }
        });
    }

    fn load_file(&mut self) {
        let path = self.file_path.trim().to_string();
        if path.is_empty() {
            self.console_push("Please enter a file path to load.");
            return;
        }
        match read_session_document(&path).map_err(|error| error.to_string()) {
            Ok(document) => match self.session.apply(SessionAction::LoadDocument { document }) {
                Ok(SessionEvent::DocumentLoaded { nodes, links, .. }) => {
                    self.layout.reheat();
                    self.console_push(format!(
                        "Loaded graph from file: {path} ({nodes} nodes, {links} links)"
                    ));
                }
                Ok(_) => {}
                Err(err) => self.console_push(err.to_string()),
            },
            Err(err) => self.console_push(format!("Failed to load file: {err}")),
        }
    }

    fn draw_cloud_section(&mut self, ui: &mut Ui) {
        ui.label("Graph id");
        let id_edit = ui.text_edit_singleline(&mut self.graph_id_input);
        if id_edit.changed() && !self.graph_id_input.trim().is_empty() {
            let _ = self
                .session
                .apply(SessionAction::SetGraphId { id: self.graph_id_input.clone() });
        }

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.loading_cloud, egui::Button::new("Load"))
                .on_hover_text("Fetch this graph id from the database.")
                .clicked()
            {
                self.cloud_load();
            }
            if ui
                .add_enabled(!self.saving_cloud, egui::Button::new("Save"))
                .on_hover_text("Store the current graph, OG snapshot and bookmarks.")
                .clicked()
            {
                self.cloud_save();
            }
            if ui
                .add_enabled(!self.listing_graphs, egui::Button::new("List"))
                .on_hover_text("List graph ids stored in the database.")
                .clicked()
            {
                self.cloud_list();
            }
        });

        ui.add_space(6.0);
        ui.label("Account");
        match self.auth_user.clone() {
            Some(user) => {
                ui.horizontal(|ui| {
                    ui.label(user.email);
                    if ui
                        .add_enabled(!self.auth_busy, egui::Button::new("Logout"))
                        .clicked()
                    {
                        self.start_sign_out();
                    }
                });
            }
            None => {
                ui.text_edit_singleline(&mut self.email).on_hover_text("Email");
                ui.add(egui::TextEdit::singleline(&mut self.password).password(true))
                    .on_hover_text("Password");
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!self.auth_busy, egui::Button::new("Login"))
                        .clicked()
                    {
                        self.start_sign_in(false);
                    }
                    if ui
                        .add_enabled(!self.auth_busy, egui::Button::new("Register"))
                        .clicked()
                    {
                        self.start_sign_in(true);
                    }
                });
            }
        }
        if !self.auth_message.is_empty() {
            ui.small(self.auth_message.clone());
        }
    }

    fn draw_camera_section(&mut self, ui: &mut Ui) {
        ui.label("Bookmark name");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.bookmark_name);
            if ui.button("Capture").clicked() {
                let name = Some(std::mem::take(&mut self.bookmark_name))
                    .filter(|name| !name.trim().is_empty());
                let pose = self.camera;
                match self.session.apply(SessionAction::CaptureBookmark { name, pose }) {
                    Ok(SessionEvent::BookmarkCaptured { name, .. }) => {
                        self.console_push(format!("Captured camera bookmark: {name}"));
                    }
                    Ok(_) => {}
                    Err(err) => self.console_push(err.to_string()),
                }
            }
        });

        let names: Vec<String> =
            self.session.bookmarks.iter().map(|b| b.name.clone()).collect();
        for name in names {
            ui.horizontal(|ui| {
                ui.label(&name);
                if ui.small_button("Apply").clicked()
                    && let Ok(SessionEvent::BookmarkApplied { bookmark }) = self
                        .session
                        .apply(SessionAction::ApplyBookmark { name: name.clone() })
                {
                    self.apply_bookmark(&bookmark);
                }
                if ui.small_button("Delete").clicked() {
                    let _ = self
                        .session
                        .apply(SessionAction::DeleteBookmark { name: name.clone() });
                }
            });
        }

        ui.add_space(6.0);
        ui.label("Preset views");
        ui.horizontal_wrapped(|ui| {
            for view in PresetView::ALL {
                if ui.button(view.name()).clicked() {
                    self.start_preset(view);
                }
            }
        });

        ui.add_space(6.0);
        ui.checkbox(&mut self.auto_rotate, "Auto-rotate")
            .on_hover_text("Orbit the camera around the scene center.");
        ui.add(
            egui::Slider::new(&mut self.rotation_speed, 0.1..=5.0)
                .text("Rotation speed")
                .clamping(egui::SliderClamping::Always),
        );
        ui.checkbox(&mut self.camera.orthographic, "Orthographic projection")
            .on_hover_text("Switch between perspective and orthographic rendering.");
        if ui.button("Zoom out").clicked() {
            self.start_zoom_out();
        }
    }

    fn draw_layout_section(&mut self, ui: &mut Ui) {
        ui.checkbox(&mut self.live_physics, "Live physics simulation")
            .on_hover_text("Continuously simulate layout forces on unpinned nodes.");

        let mut changed = false;
        changed |= ui
            .add(
                egui::Slider::new(&mut self.repulsion_scale, 0.25..=2.6)
                    .text("Repulsion")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("How strongly nodes push away from each other.")
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.spring_scale, 0.2..=2.2)
                    .text("Link spring")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("How strongly linked nodes pull toward their rest distance.")
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.link_distance, 10.0..=300.0)
                    .text("Link distance")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("Rest distance for links.")
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.velocity_damping, 0.78..=0.97)
                    .text("Velocity damping")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("How quickly node movement slows each frame.")
            .changed();
        if changed {
            self.layout.reheat();
        }

        ui.add(
            egui::Slider::new(&mut self.pull_distance, 0.0..=100.0)
                .text("Pull distance %")
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text("How far 'Pull closer' moves the selected node toward its target.");
    }

    fn draw_modes_section(&mut self, ui: &mut Ui) {
        ui.checkbox(&mut self.focus_mode, "Focus mode")
            .on_hover_text("Clicking a node flies the camera to it.");
        ui.checkbox(&mut self.collapse_mode, "Collapse mode")
            .on_hover_text("Clicking a node hides or restores its descendants.");
        if ui
            .checkbox(&mut self.link_mode, "Link mode")
            .on_hover_text("Click two nodes to link them.")
            .changed()
            && !self.link_mode
        {
            let _ = self.session.apply(SessionAction::ClearLinkPicks);
        }
    }
}

fn read_session_document(path: &str) -> anyhow::Result<SessionDocument> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("failed to parse {path} as JSON"))?;
    Ok(normalize_session_document(&value))
}
