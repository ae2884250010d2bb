use crate::camera::{self, CameraBookmark, CameraTransition, PresetView};
use crate::session::console::{self, ConsoleCommand, HELP_LINES, Panel};
use crate::session::{SessionAction, SessionEvent};
use crate::util::now_millis;

use super::MindGraphApp;
use super::jobs::{FetchIntent, JobOutcome, StoreIntent};

pub(super) const CONSOLE_MAX_LINES: usize = 120;

impl MindGraphApp {
    pub(super) fn console_push(&mut self, line: impl Into<String>) {
        self.console_lines.push(line.into());
        if self.console_lines.len() > CONSOLE_MAX_LINES {
            let overflow = self.console_lines.len() - CONSOLE_MAX_LINES;
            self.console_lines.drain(..overflow);
        }
    }

    pub(super) fn run_console_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.console_push(format!("] {line}"));
        match console::parse(line) {
            Ok(command) => self.execute_command(command),
            Err(message) => self.console_push(message),
        }
    }

    fn execute_command(&mut self, command: ConsoleCommand) {
        match command {
            ConsoleCommand::Help => {
                for line in HELP_LINES {
                    self.console_push(line);
                }
            }
            ConsoleCommand::Clear => {
                self.console_lines = vec!["MindMap Console cleared.".to_string()];
            }
            ConsoleCommand::New => match self.session.apply(SessionAction::NewGraph) {
                Ok(_) => {
                    self.layout.reheat();
                    self.console_push("Created a new empty graph.");
                }
                Err(err) => self.console_push(err.to_string()),
            },
            ConsoleCommand::SetGraphId(id) => {
                match self.session.apply(SessionAction::SetGraphId { id }) {
                    Ok(SessionEvent::GraphIdSet { id }) => {
                        self.graph_id_input = id.clone();
                        self.console_push(format!("Active graph id set to: {id}"));
                    }
                    Ok(_) => {}
                    Err(err) => self.console_push(err.to_string()),
                }
            }
            ConsoleCommand::Save => self.cloud_save(),
            ConsoleCommand::Load => self.cloud_load(),
            ConsoleCommand::ListGraphs => self.cloud_list(),
            ConsoleCommand::GroupsList => self.list_groups(),
            ConsoleCommand::GroupsShowAll => {
                if self.session.apply(SessionAction::ShowAllGroups).is_ok() {
                    self.layout.reheat();
                    self.console_push("All groups are now visible.");
                }
            }
            ConsoleCommand::GroupHide(label) => {
                self.apply_group_action(SessionAction::HideGroup { label })
            }
            ConsoleCommand::GroupShow(label) => {
                self.apply_group_action(SessionAction::ShowGroup { label })
            }
            ConsoleCommand::GroupToggle(label) => {
                self.apply_group_action(SessionAction::ToggleGroup { label })
            }
            ConsoleCommand::OgRecord => {
                let timestamp = now_millis();
                match self.session.apply(SessionAction::RecordOg { timestamp }) {
                    Ok(_) => self
                        .console_push("Recorded OG snapshot from current fixed node positions."),
                    Err(err) => self.console_push(err.to_string()),
                }
            }
            ConsoleCommand::OgSave => self.cloud_save_og(),
            ConsoleCommand::OgLoad => self.cloud_load_og(),
            ConsoleCommand::CameraCapture(name) => {
                let pose = self.camera;
                match self.session.apply(SessionAction::CaptureBookmark { name, pose }) {
                    Ok(SessionEvent::BookmarkCaptured { name, .. }) => {
                        self.console_push(format!("Captured camera bookmark: {name}"));
                    }
                    Ok(_) => {}
                    Err(err) => self.console_push(err.to_string()),
                }
            }
            ConsoleCommand::CameraList => {
                if self.session.bookmarks.is_empty() {
                    self.console_push("No camera bookmarks recorded.");
                } else {
                    let names: Vec<String> =
                        self.session.bookmarks.iter().map(|b| b.name.clone()).collect();
                    for (index, name) in names.into_iter().enumerate() {
                        self.console_push(format!("{}. {name}", index + 1));
                    }
                }
            }
            ConsoleCommand::CameraLoad(name) => {
                match self.session.apply(SessionAction::ApplyBookmark { name }) {
                    Ok(SessionEvent::BookmarkApplied { bookmark }) => {
                        let name = bookmark.name.clone();
                        self.apply_bookmark(&bookmark);
                        self.console_push(format!("Loaded camera bookmark: {name}"));
                    }
                    Ok(_) => {}
                    Err(err) => self.console_push(err.to_string()),
                }
            }
            ConsoleCommand::CameraDelete(name) => {
                if let Ok(SessionEvent::BookmarkDeleted { name, .. }) =
                    self.session.apply(SessionAction::DeleteBookmark { name })
                {
                    self.console_push(format!("Deleted camera bookmark (if existed): {name}"));
                }
            }
            ConsoleCommand::CameraSave => self.cloud_save_bookmarks(),
            ConsoleCommand::CameraSync => self.cloud_sync_bookmarks(),
            ConsoleCommand::ZoomOut => {
                self.start_zoom_out();
                self.console_push("Camera reset to default view.");
            }
            ConsoleCommand::FocusMode => {
                self.focus_mode = !self.focus_mode;
                self.console_push(format!(
                    "Focus mode: {}",
                    if self.focus_mode { "ON" } else { "OFF" }
                ));
            }
            ConsoleCommand::CollapseMode => {
                self.collapse_mode = !self.collapse_mode;
                self.console_push(format!(
                    "Collapse mode: {}",
                    if self.collapse_mode { "ON" } else { "OFF" }
                ));
            }
            ConsoleCommand::Find(query) => {
                self.console_push(format!("Highlighting nodes matching: {query}"));
                self.search = query;
            }
            ConsoleCommand::TogglePanel(panel) => {
                let flag = match panel {
                    Panel::AddNode => &mut self.show_add_node,
                    Panel::DeleteNode => &mut self.show_delete_node,
                    Panel::AddLink => &mut self.show_add_link,
                    Panel::Controls => &mut self.show_controls,
                };
                *flag = !*flag;
                self.console_push(format!("Toggled panel: {}", panel.name()));
            }
        }
    }

    fn list_groups(&mut self) {
        let labels = self.session.graph.group_labels();
        if labels.is_empty() {
            self.console_push("No groups found in current graph.");
            return;
        }
        self.console_push(format!("Groups ({}):", labels.len()));
        for label in labels {
            let state = if self.session.hidden_groups.contains(&label) {
                "hidden"
            } else {
                "visible"
            };
            self.console_push(format!("- {label} [{state}]"));
        }
    }

    fn apply_group_action(&mut self, action: SessionAction) {
        match self.session.apply(action) {
            Ok(SessionEvent::GroupHidden { label }) => {
                self.layout.reheat();
                self.console_push(format!("Group hidden: {label}"));
            }
            Ok(SessionEvent::GroupShown { label }) => {
                self.layout.reheat();
                self.console_push(format!("Group visible: {label}"));
            }
            Ok(_) => {}
            Err(err) => self.console_push(err.to_string()),
        }
    }

    // Camera effects shared by the console, panels and editors.

    /// Up, zoom and projection switch instantly; position and look-at
    /// travel over the bookmark-apply duration.
    pub(super) fn apply_bookmark(&mut self, bookmark: &CameraBookmark) {
        self.camera.up = bookmark.up;
        self.camera.zoom = bookmark.zoom;
        self.camera.orthographic = bookmark.is_orthographic;
        self.transition = Some(CameraTransition::new(
            &self.camera,
            bookmark.position,
            bookmark.look_at,
            camera::BOOKMARK_APPLY_MS,
        ));
    }

    pub(super) fn start_zoom_out(&mut self) {
        self.camera.zoom = 1.0;
        self.camera.orthographic = false;
        self.transition = Some(camera::zoom_out(&self.camera));
    }

    pub(super) fn start_preset(&mut self, view: PresetView) {
        self.transition = Some(camera::preset_view(&self.camera, view));
    }

    // Cloud requests. Each spawns one job; feedback lands in the console
    // when the outcome is polled.

    pub(super) fn cloud_save(&mut self) {
        let graph_id = self.session.graph_id.clone();
        let document = self.session.to_session_document();
        self.saving_cloud = true;
        self.spawn_job(move |api| JobOutcome::GraphStored {
            intent: StoreIntent::Document,
            result: api.store_graph(&graph_id, &document),
            graph_id,
        });
    }

    pub(super) fn cloud_load(&mut self) {
        let graph_id = self.session.graph_id.clone();
        self.loading_cloud = true;
        self.spawn_job(move |api| JobOutcome::GraphFetched {
            intent: FetchIntent::Document,
            result: api.fetch_graph(&graph_id),
            graph_id,
        });
    }

    pub(super) fn cloud_list(&mut self) {
        self.listing_graphs = true;
        self.spawn_job(|api| JobOutcome::GraphsListed(api.list_graphs()));
    }

    fn cloud_save_og(&mut self) {
        if self.session.og.is_empty() {
            self.console_push("No OG snapshot recorded.");
            return;
        }
        let graph_id = self.session.graph_id.clone();
        let document = self.session.to_session_document();
        self.spawn_job(move |api| JobOutcome::GraphStored {
            intent: StoreIntent::OgSnapshot,
            result: api.store_graph(&graph_id, &document),
            graph_id,
        });
    }

    fn cloud_load_og(&mut self) {
        let graph_id = self.session.graph_id.clone();
        self.spawn_job(move |api| JobOutcome::GraphFetched {
            intent: FetchIntent::OgSnapshot,
            result: api.fetch_graph(&graph_id),
            graph_id,
        });
    }

    fn cloud_save_bookmarks(&mut self) {
        let graph_id = self.session.graph_id.clone();
        let document = self.session.to_session_document();
        self.spawn_job(move |api| JobOutcome::GraphStored {
            intent: StoreIntent::Bookmarks,
            result: api.store_graph(&graph_id, &document),
            graph_id,
        });
    }

    pub(super) fn cloud_sync_bookmarks(&mut self) {
        let graph_id = self.session.graph_id.clone();
        self.spawn_job(move |api| JobOutcome::GraphFetched {
            intent: FetchIntent::Bookmarks,
            result: api.fetch_graph(&graph_id),
            graph_id,
        });
    }

    // Account requests.

    pub(super) fn start_sign_in(&mut self, register: bool) {
        let email = self.email.trim().to_string();
        let password = self.password.clone();
        if email.is_empty() || password.is_empty() {
            self.auth_message = "Please enter both email and password.".to_string();
            return;
        }
        self.auth_busy = true;
        self.spawn_job(move |api| JobOutcome::SignedIn {
            registered: register,
            result: if register {
                api.register(&email, &password)
            } else {
                api.login(&email, &password)
            },
        });
    }

    pub(super) fn start_sign_out(&mut self) {
        self.auth_busy = true;
        self.spawn_job(|api| JobOutcome::SignedOut(api.logout()));
    }
}
