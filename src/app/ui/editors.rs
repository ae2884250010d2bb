use eframe::egui::{self, Context, Ui};

use crate::camera;
use crate::session::{SessionAction, SessionEvent};

use super::super::MindGraphApp;
use super::super::render_utils::{
    LINK_FALLBACK_COLOR, NODE_FALLBACK_COLOR, color_or, color_to_hex,
};

impl MindGraphApp {
    pub(in crate::app) fn draw_editors(&mut self, ctx: &Context) {
        self.draw_add_node_window(ctx);
        self.draw_delete_node_window(ctx);
        self.draw_add_link_window(ctx);
        self.draw_node_editor(ctx);
        self.draw_link_editor(ctx);
    }

    fn draw_add_node_window(&mut self, ctx: &Context) {
        if !self.show_add_node {
            return;
        }
        let mut open = true;
        egui::Window::new("Add Node")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Node id");
                ui.text_edit_singleline(&mut self.new_node_id);
                ui.label("Group");
                ui.text_edit_singleline(&mut self.new_node_group);
                ui.label("Bring closer to");
                self.draw_pull_target_picker(ui, "add_node_pull_target");
                ui.add_space(4.0);
                if ui.button("Add").clicked() {
                    self.add_node_from_inputs();
                }
            });
        if !open {
            self.show_add_node = false;
        }
    }

    /// New nodes spawn near the pull target when one is set; otherwise
    /// a step in front of the camera, then the camera flies to them.
    fn add_node_from_inputs(&mut self) {
        let fallback_position = self.camera.position + self.camera.forward() * 50.0;
        let action = SessionAction::AddNode {
            id: self.new_node_id.clone(),
            group: self.new_node_group.clone(),
            fallback_position,
        };
        match self.session.apply(action) {
            Ok(SessionEvent::NodeAdded { id, pos }) => {
                self.new_node_id.clear();
                self.layout.reheat();
                self.transition = Some(camera::focus_on(
                    &self.camera,
                    pos,
                    camera::ADD_NODE_FOCUS_MS,
                ));
                self.console_push(format!("Added node: {id}"));
            }
            Ok(_) => {}
            Err(err) => self.console_push(err.to_string()),
        }
    }

    fn draw_delete_node_window(&mut self, ctx: &Context) {
        if !self.show_delete_node {
            return;
        }
        let mut open = true;
        egui::Window::new("Delete Node")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                let ids = self.node_ids();
                let current = self
                    .delete_pick
                    .clone()
                    .unwrap_or_else(|| "(pick a node)".to_string());
                egui::ComboBox::from_id_salt("delete_node_pick")
                    .selected_text(current)
                    .show_ui(ui, |ui| {
                        for id in ids {
                            let selected = self.delete_pick.as_deref() == Some(id.as_str());
                            if ui.selectable_label(selected, &id).clicked() {
                                self.delete_pick = Some(id);
                            }
                        }
                    });
                ui.add_space(4.0);
                if ui
                    .add_enabled(self.delete_pick.is_some(), egui::Button::new("Delete"))
                    .clicked()
                    && let Some(id) = self.delete_pick.take()
                {
                    match self.session.apply(SessionAction::DeleteNode { id }) {
                        Ok(SessionEvent::NodeDeleted { id, links_removed }) => {
                            self.layout.reheat();
                            self.console_push(format!(
                                "Deleted node: {id} ({links_removed} links removed)"
                            ));
                        }
                        Ok(_) => {}
                        Err(err) => self.console_push(err.to_string()),
                    }
                }
            });
        if !open {
            self.show_delete_node = false;
        }
    }

    fn draw_add_link_window(&mut self, ctx: &Context) {
        if !self.show_add_link {
            return;
        }
        let mut open = true;
        egui::Window::new("Create Link")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                if ui
                    .checkbox(&mut self.link_mode, "Pick endpoints by clicking nodes")
                    .changed()
                    && !self.link_mode
                {
                    let _ = self.session.apply(SessionAction::ClearLinkPicks);
                }
                let picks = match self.session.link_picks.as_slice() {
                    [] => "Picked: (none)".to_string(),
                    [a] => format!("Picked: {a}"),
                    [a, b, ..] => format!("Picked: {a} -> {b}"),
                };
                ui.label(picks);
                ui.separator();

                let ids = self.node_ids();
                ui.label("From");
                Self::draw_node_picker(ui, "link_from_pick", &ids, &mut self.link_from);
                ui.label("To");
                Self::draw_node_picker(ui, "link_to_pick", &ids, &mut self.link_to);
                ui.add_space(4.0);

                ui.horizontal(|ui| {
                    let ready = self.link_from.is_some() && self.link_to.is_some();
                    if ui.add_enabled(ready, egui::Button::new("Create")).clicked() {
                        self.add_link_from_inputs();
                    }
                    if ui.button("Clear picks").clicked() {
                        let _ = self.session.apply(SessionAction::ClearLinkPicks);
                    }
                });
            });
        if !open {
            self.show_add_link = false;
        }
    }

    fn add_link_from_inputs(&mut self) {
        let (Some(from), Some(to)) = (self.link_from.clone(), self.link_to.clone()) else {
            return;
        };
        let _ = self.session.apply(SessionAction::ClearLinkPicks);
        for id in [from, to] {
            if let Err(err) = self.session.apply(SessionAction::PickLinkEndpoint { id }) {
                self.console_push(err.to_string());
                return;
            }
        }
        match self.session.apply(SessionAction::AddLink) {
            Ok(SessionEvent::LinkAdded { source, target }) => {
                self.layout.reheat();
                self.console_push(format!("Created link: {source} -> {target}"));
            }
            Ok(_) => {}
            Err(err) => self.console_push(err.to_string()),
        }
    }

    fn draw_node_editor(&mut self, ctx: &Context) {
        let Some((id, color_text, text_size)) = self
            .session
            .selected_node()
            .map(|node| (node.id.clone(), node.color.clone(), node.text_size))
        else {
            return;
        };
        if self.group_input_owner.as_deref() != Some(id.as_str()) {
            self.group_input = self
                .session
                .selected_node()
                .and_then(|node| node.group.clone())
                .unwrap_or_default();
            self.group_input_owner = Some(id.clone());
        }

        let mut open = true;
        egui::Window::new("Node Editor")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.strong(&id);
                    if ui.button("Next Node").clicked() {
                        self.select_next_node();
                    }
                });
                ui.separator();

                let mut color = color_or(&color_text, NODE_FALLBACK_COLOR);
                ui.horizontal(|ui| {
                    ui.label("Color");
                    if ui.color_edit_button_srgba(&mut color).changed() {
                        let _ = self
                            .session
                            .apply(SessionAction::SetNodeColor { color: color_to_hex(color) });
                    }
                });

                let mut size = text_size;
                if ui
                    .add(
                        egui::Slider::new(&mut size, 1.0..=20.0)
                            .step_by(1.0)
                            .text("Text size")
                            .clamping(egui::SliderClamping::Always),
                    )
                    .changed()
                {
                    let _ = self.session.apply(SessionAction::SetNodeTextSize { size });
                }

                ui.horizontal(|ui| {
                    ui.label("Group");
                    let group_edit = ui.text_edit_singleline(&mut self.group_input);
                    if group_edit.lost_focus() {
                        let _ = self
                            .session
                            .apply(SessionAction::SetNodeGroup { group: self.group_input.clone() });
                    }
                });

                ui.separator();
                ui.label("Pull target");
                self.draw_pull_target_picker(ui, "editor_pull_target");
                if ui.button("Pull closer").clicked() {
                    match self
                        .session
                        .apply(SessionAction::PullCloser { percent: self.pull_distance })
                    {
                        Ok(_) => self.layout.reheat(),
                        Err(err) => self.console_push(err.to_string()),
                    }
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Copy style").clicked() {
                        let _ = self.session.apply(SessionAction::CopyNodeStyle);
                    }
                    let can_apply = self.session.copied_node_style.is_some();
                    if ui
                        .add_enabled(can_apply, egui::Button::new("Apply style"))
                        .clicked()
                        && let Err(err) = self.session.apply(SessionAction::ApplyNodeStyle)
                    {
                        self.console_push(err.to_string());
                    }
                });
            });
        if !open {
            self.group_input_owner = None;
            let _ = self.session.apply(SessionAction::ClearSelection);
        }
    }

    fn draw_link_editor(&mut self, ctx: &Context) {
        let Some((source, target, color_text, thickness)) =
            self.session.selected_link().map(|link| {
                (
                    link.source.clone(),
                    link.target.clone(),
                    link.color.clone(),
                    link.thickness,
                )
            })
        else {
            return;
        };

        let mut open = true;
        egui::Window::new("Link Editor")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.strong(format!("{source} -> {target}"));
                ui.separator();

                let mut color = color_or(&color_text, LINK_FALLBACK_COLOR);
                ui.horizontal(|ui| {
                    ui.label("Color");
                    if ui.color_edit_button_srgba(&mut color).changed() {
                        let _ = self
                            .session
                            .apply(SessionAction::SetLinkColor { color: color_to_hex(color) });
                    }
                });

                let mut width = thickness;
                if ui
                    .add(
                        egui::Slider::new(&mut width, 0.1..=10.0)
                            .step_by(0.1)
                            .text("Thickness")
                            .clamping(egui::SliderClamping::Always),
                    )
                    .changed()
                {
                    let _ = self
                        .session
                        .apply(SessionAction::SetLinkThickness { thickness: width });
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Copy style").clicked() {
                        let _ = self.session.apply(SessionAction::CopyLinkStyle);
                    }
                    let can_apply = self.session.copied_link_style.is_some();
                    if ui
                        .add_enabled(can_apply, egui::Button::new("Apply style"))
                        .clicked()
                        && let Err(err) = self.session.apply(SessionAction::ApplyLinkStyle)
                    {
                        self.console_push(err.to_string());
                    }
                });
            });
        if !open {
            let _ = self.session.apply(SessionAction::ClearSelection);
        }
    }

    fn select_next_node(&mut self) {
        let nodes = &self.session.graph.nodes;
        if nodes.is_empty() {
            return;
        }
        let index = self
            .session
            .selected_node
            .as_deref()
            .and_then(|current| nodes.iter().position(|n| n.id == current))
            .map(|i| (i + 1) % nodes.len())
            .unwrap_or(0);
        let id = nodes[index].id.clone();
        let _ = self.session.apply(SessionAction::SelectNode { id });
    }

    fn node_ids(&self) -> Vec<String> {
        self.session.graph.nodes.iter().map(|n| n.id.clone()).collect()
    }

    fn draw_pull_target_picker(&mut self, ui: &mut Ui, salt: &str) {
        let ids = self.node_ids();
        let current = self
            .session
            .pull_target
            .clone()
            .unwrap_or_else(|| "(none)".to_string());
        egui::ComboBox::from_id_salt(salt)
            .selected_text(current)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(self.session.pull_target.is_none(), "(none)")
                    .clicked()
                {
                    let _ = self.session.apply(SessionAction::SetPullTarget { id: None });
                }
                for id in ids {
                    let selected = self.session.pull_target.as_deref() == Some(id.as_str());
                    if ui.selectable_label(selected, &id).clicked() {
                        let _ = self
                            .session
                            .apply(SessionAction::SetPullTarget { id: Some(id) });
                    }
                }
            });
    }

    fn draw_node_picker(ui: &mut Ui, salt: &str, ids: &[String], slot: &mut Option<String>) {
        let current = slot.clone().unwrap_or_else(|| "(pick a node)".to_string());
        egui::ComboBox::from_id_salt(salt)
            .selected_text(current)
            .show_ui(ui, |ui| {
                for id in ids {
                    let selected = slot.as_deref() == Some(id.as_str());
                    if ui.selectable_label(selected, id).clicked() {
                        *slot = Some(id.clone());
                    }
                }
            });
    }
}
