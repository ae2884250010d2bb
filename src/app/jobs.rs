use std::sync::mpsc::{self, TryRecvError};
use std::thread;

use crate::api::{ApiClient, ApiError, FetchedGraph, GraphSummary, StoredGraph, User};
use crate::graph::{normalize_camera_bookmarks, normalize_og_snapshot, normalize_session_document};
use crate::session::SessionAction;

use super::MindGraphApp;

/// Why a graph row was fetched; decides which part of the session the
/// payload lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum FetchIntent {
    Document,
    OgSnapshot,
    Bookmarks,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum StoreIntent {
    Document,
    OgSnapshot,
    Bookmarks,
}

/// One finished background request. Fetch and store outcomes carry the
/// graph id they were issued for, so failure lines can name it even when
/// the active id changed mid-flight.
pub(super) enum JobOutcome {
    GraphFetched {
        intent: FetchIntent,
        graph_id: String,
        result: Result<FetchedGraph, ApiError>,
    },
    GraphStored {
        intent: StoreIntent,
        graph_id: String,
        result: Result<StoredGraph, ApiError>,
    },
    GraphsListed(Result<Vec<GraphSummary>, ApiError>),
    SignedIn {
        registered: bool,
        result: Result<User, ApiError>,
    },
    SessionChecked(Result<Option<User>, ApiError>),
    SignedOut(Result<(), ApiError>),
}

impl MindGraphApp {
    /// Runs the request on its own thread against a cloned client. The
    /// receiver is polled once per frame; a dropped sender counts as a
    /// failed job.
    pub(super) fn spawn_job(
        &mut self,
        job: impl FnOnce(ApiClient) -> JobOutcome + Send + 'static,
    ) {
        let (tx, rx) = mpsc::channel();
        let api = self.api.clone();
        thread::spawn(move || {
            let _ = tx.send(job(api));
        });
        self.jobs.push(rx);
    }

    pub(super) fn poll_jobs(&mut self) {
        let mut finished = Vec::new();
        let mut index = 0;
        while index < self.jobs.len() {
            match self.jobs[index].try_recv() {
                Ok(outcome) => {
                    finished.push(outcome);
                    self.jobs.remove(index);
                }
                Err(TryRecvError::Empty) => index += 1,
                Err(TryRecvError::Disconnected) => {
                    self.jobs.remove(index);
                    self.clear_busy_flags();
                    self.console_push("Background request died without a response.");
                }
            }
        }
        for outcome in finished {
            self.handle_job(outcome);
        }
    }

    fn clear_busy_flags(&mut self) {
        self.saving_cloud = false;
        self.loading_cloud = false;
        self.listing_graphs = false;
        self.auth_busy = false;
    }

    fn handle_job(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::GraphFetched { intent, graph_id, result } => {
                self.handle_fetch(intent, graph_id, result)
            }
            JobOutcome::GraphStored { intent, graph_id, result } => {
                self.handle_store(intent, graph_id, result)
            }
            JobOutcome::GraphsListed(result) => {
                self.listing_graphs = false;
                match result {
                    Ok(rows) if rows.is_empty() => {
                        self.console_push("No graphs found in database.");
                    }
                    Ok(rows) => {
                        self.console_push(format!("Found {} graph(s):", rows.len()));
                        for row in rows {
                            self.console_push(format!("- {} ({})", row.id, row.updated_at));
                        }
                    }
                    Err(_) => self.console_push("Failed to list graphs."),
                }
            }
            JobOutcome::SignedIn { registered, result } => {
                self.auth_busy = false;
                match result {
                    Ok(user) => {
                        self.auth_message = if registered {
                            format!("Registered as {}", user.email)
                        } else {
                            format!("Logged in as {}", user.email)
                        };
                        self.auth_user = Some(user);
                        self.password.clear();
                    }
                    Err(ApiError::Status { code: 409, .. }) if registered => {
                        self.auth_message =
                            "Email already exists. Please log in instead.".to_string();
                    }
                    Err(ApiError::Status { message, .. }) => self.auth_message = message,
                    Err(_) if registered => {
                        self.auth_message = "Failed to register.".to_string();
                    }
                    Err(_) => self.auth_message = "Failed to login.".to_string(),
                }
            }
            JobOutcome::SessionChecked(result) => {
                if let Ok(Some(user)) = result {
                    self.auth_message = format!("Signed in as {}", user.email);
                    self.auth_user = Some(user);
                }
            }
            JobOutcome::SignedOut(result) => {
                self.auth_busy = false;
                match result {
                    Ok(()) => {
                        self.auth_user = None;
                        self.password.clear();
                        self.auth_message = "Logged out.".to_string();
                    }
                    Err(_) => self.auth_message = "Failed to logout.".to_string(),
                }
            }
        }
    }

    fn handle_fetch(
        &mut self,
        intent: FetchIntent,
        graph_id: String,
        result: Result<FetchedGraph, ApiError>,
    ) {
        match intent {
            FetchIntent::Document => {
                self.loading_cloud = false;
                let Ok(row) = result else {
                    self.console_push(format!("Load failed for graph: {graph_id}"));
                    return;
                };
                let document = normalize_session_document(&row.data);
                match self.session.apply(SessionAction::LoadDocument { document }) {
                    Ok(_) => {
                        self.layout.reheat();
                        self.console_push(format!("Loaded graph: {}", row.id));
                    }
                    Err(err) => self.console_push(err.to_string()),
                }
            }
            FetchIntent::OgSnapshot => {
                let snapshot = result
                    .ok()
                    .and_then(|row| row.data.get("ogSnapshot").map(normalize_og_snapshot));
                let applied = snapshot.is_some_and(|snapshot| {
                    self.session
                        .apply(SessionAction::ApplyOgSnapshot { snapshot })
                        .is_ok()
                });
                if applied {
                    self.layout.reheat();
                    self.console_push(format!("Loaded OG snapshot for graph: {graph_id}"));
                } else {
                    self.console_push(format!("Failed to load OG snapshot for graph: {graph_id}"));
                }
            }
            FetchIntent::Bookmarks => match result {
                Ok(row) => {
                    self.session.bookmarks = row
                        .data
                        .get("cameraBookmarks")
                        .map(normalize_camera_bookmarks)
                        .unwrap_or_default();
                    self.console_push(format!(
                        "Synced camera bookmarks from DB for graph: {graph_id}"
                    ));
                }
                Err(_) => self.console_push(format!(
                    "Failed to sync camera bookmarks for graph: {graph_id}"
                )),
            },
        }
    }

    fn handle_store(
        &mut self,
        intent: StoreIntent,
        graph_id: String,
        result: Result<StoredGraph, ApiError>,
    ) {
        let line = match (intent, result) {
            (StoreIntent::Document, Ok(ack)) => {
                self.saving_cloud = false;
                format!("Saved graph: {}", ack.id)
            }
            (StoreIntent::Document, Err(_)) => {
                self.saving_cloud = false;
                format!("Save failed for graph: {graph_id}")
            }
            (StoreIntent::OgSnapshot, Ok(ack)) => {
                format!("Saved OG snapshot for graph: {}", ack.id)
            }
            (StoreIntent::OgSnapshot, Err(_)) => {
                format!("Failed to save OG snapshot for graph: {graph_id}")
            }
            (StoreIntent::Bookmarks, Ok(ack)) => {
                format!("Saved camera bookmarks to DB for graph: {}", ack.id)
            }
            (StoreIntent::Bookmarks, Err(_)) => {
                format!("Failed to save camera bookmarks for graph: {graph_id}")
            }
        };
        self.console_push(line);
    }
}
