use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};
use tracing::{debug, info, warn};

use crate::config::{LayoutConfig, StyleConfig};
use crate::error::PipelineResult;
use crate::radial::RadialLayout;

mod graph;
mod loader;
mod render_utils;
mod state;
mod ui;

pub use loader::Loader;
use loader::LoadedHierarchy;
use state::{LoadMachine, Phase};
use ui::search::{SearchBox, SearchRequest};

pub struct PreyRadialApp {
    loader: Arc<Loader>,
    style: Arc<StyleConfig>,
    layout_config: LayoutConfig,
    search: SearchBox,
    machine: LoadMachine<Box<ViewModel>>,
    outcome_tx: Sender<LoadOutcome>,
    outcome_rx: Receiver<LoadOutcome>,
}

struct LoadOutcome {
    seq: u64,
    predator: String,
    result: PipelineResult<LoadedHierarchy>,
}

struct ViewModel {
    loaded: LoadedHierarchy,
    style: Arc<StyleConfig>,
    layout_config: LayoutConfig,
    graph_cache: Option<RenderGraph>,
    legend: Vec<LegendEntry>,
    pan: Vec2,
    zoom: f32,
    hovered: Option<usize>,
    selected: Option<usize>,
}

struct RenderGraph {
    layout: RadialLayout,
    draw_order: Vec<usize>,
    rings: Vec<f32>,
    view_scratch: ViewScratch,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq)]
struct LegendEntry {
    category: String,
    total_value: u64,
    leaf_count: usize,
}

/// What the graph view asks its owner to do after a frame.
#[derive(Debug, PartialEq)]
enum ViewAction {
    None,
    Refresh,
    Failed(String),
}

impl PreyRadialApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        loader: Arc<Loader>,
        style: StyleConfig,
        layout_config: LayoutConfig,
        initial_predator: Option<String>,
    ) -> Self {
        let mut app = Self::with_loader(loader, style, layout_config);
        if let Some(predator) = initial_predator {
            app.select(&predator, false);
        }
        app
    }

    fn with_loader(loader: Arc<Loader>, style: StyleConfig, layout_config: LayoutConfig) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let search = SearchBox::new(loader.store().list_predators());
        Self {
            loader,
            style: Arc::new(style),
            layout_config,
            search,
            machine: LoadMachine::default(),
            outcome_tx,
            outcome_rx,
        }
    }

    /// Starts a load for `predator`; results of earlier selections become stale.
    fn select(&mut self, predator: &str, refresh: bool) {
        let predator = predator.trim().to_owned();
        let seq = self.machine.begin(&predator);
        info!(seq, %predator, refresh, "predator selected");

        let loader = Arc::clone(&self.loader);
        let tx = self.outcome_tx.clone();
        thread::spawn(move || {
            let result = loader.load(&predator, refresh);
            if let Err(error) = &result {
                warn!(seq, %predator, kind = error.kind(), %error, "load failed");
            }
            let _ = tx.send(LoadOutcome {
                seq,
                predator,
                result,
            });
        });
    }

    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome);
        }
    }

    fn apply(&mut self, outcome: LoadOutcome) {
        let style = Arc::clone(&self.style);
        let layout_config = self.layout_config;
        let succeeded = outcome.result.is_ok();
        let result = outcome
            .result
            .map(|loaded| Box::new(ViewModel::new(loaded, style, layout_config)));

        if self.machine.finish(outcome.seq, &outcome.predator, result) {
            debug!(seq = outcome.seq, predator = %outcome.predator, succeeded, "load finished");
            if succeeded {
                self.search.remember(&outcome.predator, self.loader.store());
            }
        }
    }

    /// Search stays usable while a load is in flight; a new selection
    /// supersedes the pending one.
    fn draw_top_bar(&mut self, ctx: &Context) -> Option<SearchRequest> {
        let title = match self.machine.phase() {
            Phase::Loaded(model) => Some(model.loaded.title()),
            _ => None,
        };

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("prey-radial");
                    ui.separator();
                    let request = self.search.show(ui);
                    if let Some(title) = title {
                        ui.separator();
                        ui.label(title);
                    }
                    request
                })
                .inner
            })
            .inner
    }
}

impl eframe::App for PreyRadialApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.drain_outcomes();

        if let Some(request) = self.draw_top_bar(ctx) {
            self.select(&request.predator, request.refresh);
        }

        let mut retry = None;
        let mut failure = None;

        match self.machine.phase_mut() {
            Phase::Idle => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Search for a predator to draw its prey.");
                    });
                });
            }
            Phase::Fetching { predator } => {
                let predator = predator.clone();
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading prey of {predator}..."));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint_after(std::time::Duration::from_millis(100));
            }
            Phase::Failed { predator, error } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading(format!("Could not show prey of {predator}"));
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        retry = Some(predator.clone());
                    }
                });
            }
            Phase::Loaded(model) => match model.show(ctx) {
                ViewAction::None => {}
                ViewAction::Refresh => retry = Some(model.loaded.shown.clone()),
                ViewAction::Failed(error) => failure = Some((model.loaded.shown.clone(), error)),
            },
        }

        if let Some((predator, error)) = failure {
            self.machine.fail(&predator, error);
        }
        if let Some(predator) = retry {
            self.select(&predator, true);
        }
    }
}
