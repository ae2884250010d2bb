mod commands;
mod jobs;
mod physics;
mod render_utils;
mod scene;
mod ui;

use std::collections::HashSet;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use anyhow::Result;
use eframe::egui::{Context, Key};

use crate::api::{ApiClient, User};
use crate::camera::{self, CameraPose, CameraTransition};
use crate::graph::{DEFAULT_LINK_COLOR, DEFAULT_NODE_TEXT_SIZE, Link, MindGraph, Node};
use crate::session::SessionState;
use crate::vec3::Vec3;

use jobs::JobOutcome;
use physics::{LayoutConfig, LayoutSim};
use scene::NodeDrag;

/// Top-level application state. Document edits go through `session`,
/// everything else here is view state: camera, layout tuning, panel
/// toggles, widget buffers, and in-flight API jobs. The impl is split
/// by concern across the submodules.
pub struct MindGraphApp {
    api: ApiClient,
    session: SessionState,

    camera: CameraPose,
    transition: Option<CameraTransition>,
    auto_rotate: bool,
    rotation_speed: f32,

    layout: LayoutSim,
    live_physics: bool,
    repulsion_scale: f32,
    spring_scale: f32,
    link_distance: f32,
    velocity_damping: f32,

    drag: Option<NodeDrag>,
    focus_mode: bool,
    collapse_mode: bool,
    link_mode: bool,
    search: String,

    show_console: bool,
    show_controls: bool,
    show_add_node: bool,
    show_delete_node: bool,
    show_add_link: bool,

    graph_id_input: String,
    file_path: String,
    bookmark_name: String,
    new_node_id: String,
    new_node_group: String,
    pull_distance: f32,
    delete_pick: Option<String>,
    link_from: Option<String>,
    link_to: Option<String>,
    group_input: String,
    group_input_owner: Option<String>,

    email: String,
    password: String,
    auth_user: Option<User>,
    auth_message: String,

    console_lines: Vec<String>,
    console_input: String,

    jobs: Vec<Receiver<JobOutcome>>,
    saving_cloud: bool,
    loading_cloud: bool,
    listing_graphs: bool,
    auth_busy: bool,
}

impl MindGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        api_base: &str,
        graph_id: &str,
    ) -> Result<MindGraphApp> {
        let api = ApiClient::new(api_base)?;
        let session = SessionState {
            graph: sample_graph(),
            graph_id: graph_id.to_string(),
            ..SessionState::default()
        };
        let mut app = MindGraphApp {
            api,
            session,
            camera: CameraPose::default(),
            transition: None,
            auto_rotate: false,
            rotation_speed: 1.0,
            layout: LayoutSim::new(),
            live_physics: true,
            repulsion_scale: 1.0,
            spring_scale: 1.0,
            link_distance: 50.0,
            velocity_damping: 0.9,
            drag: None,
            focus_mode: false,
            collapse_mode: false,
            link_mode: false,
            search: String::new(),
            show_console: false,
            show_controls: true,
            show_add_node: false,
            show_delete_node: false,
            show_add_link: false,
            graph_id_input: graph_id.to_string(),
            file_path: String::new(),
            bookmark_name: String::new(),
            new_node_id: String::new(),
            new_node_group: "general".to_string(),
            pull_distance: 50.0,
            delete_pick: None,
            link_from: None,
            link_to: None,
            group_input: String::new(),
            group_input_owner: None,
            email: String::new(),
            password: String::new(),
            auth_user: None,
            auth_message: String::new(),
            console_lines: Vec::new(),
            console_input: String::new(),
            jobs: Vec::new(),
            saving_cloud: false,
            loading_cloud: false,
            listing_graphs: false,
            auth_busy: false,
        };
        app.spawn_job(|api| JobOutcome::SessionChecked(api.me()));
        Ok(app)
    }
}

impl eframe::App for MindGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_jobs();

        // Tab toggles the console unless a text field owns focus.
        if ctx.input(|input| input.key_pressed(Key::Tab))
            && ctx.memory(|memory| memory.focused().is_none())
        {
            self.show_console = !self.show_console;
        }

        let dt = ctx.input(|input| input.stable_dt).min(0.1);

        if let Some(mut transition) = self.transition.take() {
            if !transition.advance(dt, &mut self.camera) {
                self.transition = Some(transition);
            }
            ctx.request_repaint();
        }

        if self.auto_rotate && self.transition.is_none() {
            camera::auto_rotate_step(&mut self.camera, self.rotation_speed, dt);
            ctx.request_repaint();
        }

        if self.live_physics {
            let visible: HashSet<String> = self
                .session
                .visible_graph()
                .nodes
                .iter()
                .map(|node| node.id.clone())
                .collect();
            let config = LayoutConfig {
                repulsion_scale: self.repulsion_scale,
                spring_scale: self.spring_scale,
                link_distance: self.link_distance,
                velocity_damping: self.velocity_damping,
                delta_seconds: dt,
            };
            if self.layout.step(&mut self.session.graph, &visible, &config) {
                ctx.request_repaint();
            }
        }

        self.show(ctx);

        if !self.jobs.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(120));
        }
    }
}

/// Starter content for a fresh session so the scene is never empty.
/// The nodes are unpinned; the first layout passes spread them out.
fn sample_graph() -> MindGraph {
    let node = |id: &str, color: &str, pos: Vec3| Node {
        id: id.to_string(),
        color: color.to_string(),
        text_size: DEFAULT_NODE_TEXT_SIZE,
        group: None,
        pos,
        pinned: None,
    };
    let link = |source: &str, target: &str, thickness: f32| Link {
        source: source.to_string(),
        target: target.to_string(),
        color: DEFAULT_LINK_COLOR.to_string(),
        thickness,
    };
    MindGraph {
        nodes: vec![
            node("Node1", "#1A75FF", Vec3::new(0.0, 0.0, 0.0)),
            node("Node2", "#FF6B6B", Vec3::new(50.0, 0.0, 0.0)),
            node("Node3", "#4ECDC4", Vec3::new(25.0, 50.0, 0.0)),
        ],
        links: vec![link("Node1", "Node2", 5.0), link("Node2", "Node3", 1.0)],
    }
}
