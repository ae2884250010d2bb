use eframe::egui::{self, Align, Context, Layout, Ui};

use crate::camera;
use crate::session::{SessionAction, SessionEvent};
use crate::util::now_millis;

use super::super::MindGraphApp;
use super::super::scene::{self, SceneContext, SceneResponse};

impl MindGraphApp {
    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        self.draw_top_bar(ctx);

        if self.show_controls {
            egui::SidePanel::left("controls")
                .resizable(true)
                .default_width(350.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("controls_scroll")
                        .show(ui, |ui| self.draw_controls(ui));
                });
        }

        if self.show_console {
            self.draw_console(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| self.draw_scene(ui));

        self.draw_editors(ctx);
    }

    fn draw_top_bar(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("MindGraph");
                    ui.separator();
                    ui.label(format!("graph: {}", self.session.graph_id));
                    ui.label(format!("nodes: {}", self.session.graph.nodes.len()));
                    ui.label(format!("links: {}", self.session.graph.links.len()));
                    ui.separator();

                    if ui.selectable_label(self.show_console, "Console").clicked() {
                        self.show_console = !self.show_console;
                    }
                    if ui.selectable_label(self.show_add_node, "+ Node").clicked() {
                        self.show_add_node = !self.show_add_node;
                    }
                    if ui.selectable_label(self.show_delete_node, "- Node").clicked() {
                        self.show_delete_node = !self.show_delete_node;
                    }
                    if ui.selectable_label(self.show_add_link, "Link").clicked() {
                        self.show_add_link = !self.show_add_link;
                    }
                    if ui.selectable_label(self.show_controls, "Controls").clicked() {
                        self.show_controls = !self.show_controls;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        match &self.auth_user {
                            Some(user) => ui.label(user.email.clone()),
                            None => ui.label("Not signed in"),
                        };
                    });
                });

                let labels = self.session.graph.group_labels();
                if !labels.is_empty() {
                    ui.horizontal_wrapped(|ui| {
                        ui.label("Groups:");
                        for label in labels {
                            let visible = !self.session.hidden_groups.contains(&label);
                            let pill = ui
                                .selectable_label(visible, &label)
                                .on_hover_text("Click to toggle this group's visibility.");
                            if pill.clicked() {
                                match self.session.apply(SessionAction::ToggleGroup { label }) {
                                    Ok(_) => self.layout.reheat(),
                                    Err(err) => self.console_push(err.to_string()),
                                }
                            }
                        }
                        if ui.button("Show all").clicked()
                            && self.session.apply(SessionAction::ShowAllGroups).is_ok()
                        {
                            self.layout.reheat();
                        }
                    });
                }
            });
    }

    fn draw_scene(&mut self, ui: &mut Ui) {
        let ctrl_held = ui.input(|input| input.modifiers.command);
        let response = {
            let visible = self.session.visible_graph();
            scene::show_scene(
                ui,
                SceneContext {
                    graph: &visible,
                    camera: &mut self.camera,
                    drag: &mut self.drag,
                    selected_node: self.session.selected_node.as_deref(),
                    selected_link: self
                        .session
                        .selected_link
                        .as_ref()
                        .map(|(s, t)| (s.as_str(), t.as_str())),
                    link_picks: &self.session.link_picks,
                    collapsed: &self.session.collapsed,
                    search: &self.search,
                },
            )
        };
        self.handle_scene_response(ui, response, ctrl_held);
    }

    fn handle_scene_response(&mut self, ui: &Ui, response: SceneResponse, ctrl_held: bool) {
        if response.camera_moved {
            self.transition = None;
            ui.ctx().request_repaint();
        }

        if let Some((id, pos)) = response.dragged_node {
            if self.session.apply(SessionAction::DragNode { id, pos }).is_ok() {
                self.layout.reheat();
            }
            ui.ctx().request_repaint();
        }

        if let Some(id) = response.released_node {
            let _ = self
                .session
                .apply(SessionAction::PinNode { id, timestamp: now_millis() });
        }

        if let Some(id) = response.clicked_node {
            self.dispatch_node_click(id, ctrl_held);
        }

        if let Some((source, target)) = response.clicked_link
            && let Err(err) = self.session.apply(SessionAction::SelectLink { source, target })
        {
            self.console_push(err.to_string());
        }
    }

    /// Ctrl-click collapses regardless of mode; otherwise collapse mode
    /// wins over focus, focus over linking, and a plain click selects.
    fn dispatch_node_click(&mut self, id: String, ctrl_held: bool) {
        if ctrl_held || self.collapse_mode {
            match self.session.apply(SessionAction::ToggleCollapse { id }) {
                Ok(_) => self.layout.reheat(),
                Err(err) => self.console_push(err.to_string()),
            }
        } else if self.focus_mode {
            if let Some(node) = self.session.graph.node(&id) {
                self.transition = Some(camera::focus_on(&self.camera, node.pos, camera::FOCUS_MS));
            }
        } else if self.link_mode {
            match self.session.apply(SessionAction::PickLinkEndpoint { id }) {
                Ok(SessionEvent::LinkPicksChanged { picks }) if picks.len() == 2 => {
                    match self.session.apply(SessionAction::AddLink) {
                        Ok(_) => self.layout.reheat(),
                        Err(err) => self.console_push(err.to_string()),
                    }
                }
                Ok(_) => {}
                Err(err) => self.console_push(err.to_string()),
            }
        } else if let Err(err) = self.session.apply(SessionAction::SelectNode { id }) {
            self.console_push(err.to_string());
        }
    }
}
