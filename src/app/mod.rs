use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::case::{Graph, load_snapshot};
use crate::config::BoardConfig;

mod graph;
mod highlight;
mod host;
mod physics;
mod render_utils;
mod ui;

use graph::interaction::{Camera, InteractionController};
pub use host::{BoardHost, DeepDive, StdoutHost};

/// Where the snapshot feed reads from. The first file replaces the board,
/// the rest are merged into it in order.
#[derive(Clone, Debug, Default)]
pub struct SnapshotSources {
    pub initial: Option<PathBuf>,
    pub merges: Vec<PathBuf>,
    pub delay: Duration,
}

pub struct InvestigationBoardApp {
    sources: SnapshotSources,
    config: BoardConfig,
    host: Box<dyn BoardHost>,
    state: AppState,
    feed_rx: Option<Receiver<FeedMessage>>,
    dismissed: bool,
}

enum AppState {
    Loading,
    Ready(Box<BoardView>),
    Error(String),
}

enum FeedMessage {
    Replace(Graph),
    Merge(Graph),
    Failed { initial: bool, error: String },
}

/// Actions raised by the board UI during one frame.
#[derive(Debug, Default)]
struct BoardActions {
    reload: bool,
    close: bool,
    deep_dive: Option<DeepDive>,
}

struct BoardView {
    graph: Graph,
    board: Option<BoardGraph>,
    config: BoardConfig,
    camera: Camera,
    interaction: InteractionController,
    animation: AnimationLoop,
    selected: Option<String>,
    hovered: Option<usize>,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    graph_revision: u64,
    viewport: Vec2,
    show_all_labels: bool,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// Index-addressed arena the physics and the renderer share. `nodes[i]` and
/// `edges[i]` line up with the same positions in the validated `Graph`.
struct BoardGraph {
    nodes: Vec<BoardNode>,
    edges: Vec<(usize, usize)>,
    index_by_id: HashMap<String, usize>,
    neighbors: Vec<Vec<usize>>,
    center: Vec2,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
}

struct BoardNode {
    id: String,
    world_pos: Vec2,
    velocity: Vec2,
}

/// The per-frame physics loop. Running means: step once and ask for the next
/// frame. Each restart bumps the generation so a replaced board never shares
/// a loop with the one before it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct AnimationLoop {
    generation: u64,
    running: bool,
}

impl AnimationLoop {
    fn restart(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.running = true;
        tracing::debug!(generation = self.generation, "animation loop started");
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            tracing::debug!(generation = self.generation, "animation loop stopped");
        }
    }
}

impl InvestigationBoardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        sources: SnapshotSources,
        config: BoardConfig,
        host: Box<dyn BoardHost>,
    ) -> Self {
        let mut app = Self {
            sources,
            config,
            host,
            state: AppState::Loading,
            feed_rx: None,
            dismissed: false,
        };
        app.start_feed();
        app
    }

    fn spawn_feed(sources: SnapshotSources) -> Receiver<FeedMessage> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            if let Some(path) = &sources.initial {
                let message = match load_snapshot(path) {
                    Ok(graph) => FeedMessage::Replace(graph),
                    Err(error) => FeedMessage::Failed {
                        initial: true,
                        error: format!("{error:#}"),
                    },
                };
                let failed = matches!(message, FeedMessage::Failed { .. });
                if tx.send(message).is_err() || failed {
                    return;
                }
            }

            for path in &sources.merges {
                if !sources.delay.is_zero() {
                    thread::sleep(sources.delay);
                }
                let message = match load_snapshot(path) {
                    Ok(graph) => FeedMessage::Merge(graph),
                    Err(error) => FeedMessage::Failed {
                        initial: false,
                        error: format!("{error:#}"),
                    },
                };
                if tx.send(message).is_err() {
                    return;
                }
            }
        });

        rx
    }

    fn start_feed(&mut self) {
        if let AppState::Ready(view) = &mut self.state {
            view.stop();
        }

        self.state = if self.sources.initial.is_some() {
            AppState::Loading
        } else {
            AppState::Ready(Box::new(BoardView::new(Graph::default(), self.config.clone())))
        };
        self.feed_rx = Some(Self::spawn_feed(self.sources.clone()));
    }

    fn poll_feed(&mut self) {
        let Some(rx) = self.feed_rx.take() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok(FeedMessage::Replace(graph)) => match &mut self.state {
                    AppState::Ready(view) => view.replace(graph),
                    _ => {
                        self.state =
                            AppState::Ready(Box::new(BoardView::new(graph, self.config.clone())));
                    }
                },
                Ok(FeedMessage::Merge(graph)) => {
                    if let AppState::Ready(view) = &mut self.state {
                        view.merge(graph);
                    }
                }
                Ok(FeedMessage::Failed { initial: true, error }) => {
                    tracing::warn!(%error, "initial snapshot failed to load");
                    self.state = AppState::Error(error);
                    return;
                }
                Ok(FeedMessage::Failed { initial: false, error }) => {
                    tracing::warn!(%error, "skipping snapshot that failed to load");
                }
                Err(TryRecvError::Empty) => {
                    self.feed_rx = Some(rx);
                    return;
                }
                Err(TryRecvError::Disconnected) => {
                    if matches!(self.state, AppState::Loading) {
                        self.state =
                            AppState::Error("Snapshot feed stopped before delivering".to_owned());
                    }
                    return;
                }
            }
        }
    }

    /// Stops the board and tells the host, once.
    fn dismiss(&mut self) {
        if self.dismissed {
            return;
        }
        self.dismissed = true;
        self.feed_rx = None;
        if let AppState::Ready(view) = &mut self.state {
            view.stop();
        }
        self.host.close();
    }
}

impl eframe::App for InvestigationBoardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_feed();
        if self.feed_rx.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let mut retry = false;
        let mut actions = BoardActions::default();

        match &mut self.state {
            AppState::Loading => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading case snapshot...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the case snapshot");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        retry = true;
                    }
                });
            }
            AppState::Ready(view) => view.show(ctx, &mut actions),
        }

        if let Some(deep_dive) = actions.deep_dive {
            tracing::info!(label = %deep_dive.label, "deep dive requested");
            self.host.deep_dive(deep_dive);
        }

        if retry || actions.reload {
            self.start_feed();
        }

        if actions.close {
            self.dismiss();
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl Drop for InvestigationBoardApp {
    fn drop(&mut self) {
        self.dismiss();
    }
}
