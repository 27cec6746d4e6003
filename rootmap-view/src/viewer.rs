//! Root system viewer built with eframe/egui.
//!
//! [`Viewer`] runs one Rootmap simulation with the default configuration
//! and draws the result: the primary root in red, secondaries in grey.
//! "Regrow" reruns the simulation with a fresh seed. Growth parameters are
//! fixed; the viewer only controls what is shown.

use eframe::App;
use glam::DVec2;
use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng};
use rootmap_core::{
    config::Config,
    projection::Projection,
    simulation::{self, RootSystem},
    trajectory::RootTrajectory,
    types::RootRole,
};

/// Main application state for the viewer.
///
/// ### Fields
/// - `cfg` - Simulation configuration used for every run.
/// - `seed` - Seed of the `StdRng` behind the current system.
/// - `system` - Trajectories to draw; after an aborted run this holds
///   whatever was completed, or `None` if nothing was.
/// - `aborted` - Trajectory that was being grown when the run aborted.
/// - `error` - Message of the last run error, shown in the status bar.
///
/// - `projection` - Which pair of axes is drawn.
/// - `zoom` - Pixels per world unit.
/// - `pan` - Screen-space pan offset in pixels.
/// - `focus` - World point shown at the center of the canvas.
/// - `canvas` - Size of the drawing area in the last frame.
/// - `fit_pending` - Refit once the real canvas size is known.
pub struct Viewer {
    cfg: Config,
    seed: u64,
    system: Option<RootSystem>,
    aborted: Option<RootTrajectory>,
    error: Option<String>,

    projection: Projection,
    zoom: f32,
    pan: egui::Vec2,
    focus: DVec2,
    canvas: egui::Vec2,
    fit_pending: bool,
}

impl Viewer {
    /// Creates a viewer and grows a first root system from a random seed.
    pub fn new() -> Self {
        let mut viewer = Self {
            cfg: Config::default(),
            seed: 0,
            system: None,
            aborted: None,
            error: None,
            projection: Projection::default(),
            zoom: 3.0,
            pan: egui::vec2(0.0, 0.0),
            focus: DVec2::ZERO,
            canvas: egui::vec2(800.0, 600.0),
            fit_pending: false,
        };
        viewer.regrow(rand::random::<u64>());
        viewer
    }

    /// Reruns the simulation with `seed` and refits the view.
    fn regrow(&mut self, seed: u64) {
        self.seed = seed;
        let mut rng = StdRng::seed_from_u64(seed);

        match simulation::run(&self.cfg, &mut rng) {
            Ok(system) => {
                info!("seed {}: grew {} trajectories", seed, system.trajectory_count());
                self.system = Some(system);
                self.aborted = None;
                self.error = None;
            }
            Err(e) => {
                warn!("seed {}: {}", seed, e);
                self.system = e.partial().cloned();
                self.aborted = e.aborted_trajectory().cloned();
                self.error = Some(e.to_string());
            }
        }

        self.fit_view();
        self.fit_pending = true;
    }

    /// Fits the current system into the last known canvas.
    ///
    /// The horizontal range is symmetric about the projected origin, so the
    /// root's starting point stays on the vertical center line.
    fn fit_view(&mut self) {
        self.pan = egui::vec2(0.0, 0.0);
        let Some(bounds) = self.system.as_ref().and_then(|s| s.bounds(self.projection)) else {
            self.focus = DVec2::ZERO;
            return;
        };

        let origin = self.projection.project(self.cfg.origin);
        let half_width = (bounds.min.x - origin.x)
            .abs()
            .max((bounds.max.x - origin.x).abs())
            .max(0.5);
        let half_height = (bounds.size().y * 0.5).max(0.5);
        self.focus = DVec2::new(origin.x, bounds.center().y);

        let fit_x = self.canvas.x as f64 / (2.0 * half_width);
        let fit_y = self.canvas.y as f64 / (2.0 * half_height);
        let fit = fit_x.min(fit_y) * 0.9;
        self.zoom = (fit as f32).clamp(0.1, 50.0);
    }

    /// Converts a projected world position to screen-space.
    ///
    /// The world is scaled by `zoom` around `focus`, offset by `pan`, and
    /// centered in `rect`. The vertical axis is flipped so that positive
    /// world values point up.
    fn world_to_screen(&self, p: DVec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let d = (p - self.focus).as_vec2();
        egui::pos2(
            center.x + d.x * self.zoom + self.pan.x,
            center.y - d.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`], up to rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> DVec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        DVec2::new(x as f64, y as f64) + self.focus
    }

    /// Builds the top panel (regrow, fit, projection, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("🌱 Regrow").clicked() {
                    self.regrow(rand::random::<u64>());
                }

                if ui.button("Fit").clicked() {
                    self.fit_view();
                }

                ui.separator();
                let before = self.projection;
                egui::ComboBox::from_label("Projection")
                    .selected_text(self.projection.label())
                    .show_ui(ui, |ui| {
                        for p in Projection::ALL {
                            ui.selectable_value(&mut self.projection, p, p.label());
                        }
                    });
                if self.projection != before {
                    self.fit_view();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=50.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (seed, counts, run error).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("seed = {}", self.seed));
                ui.label(format!("steps = {}", self.cfg.step_count));
                if let Some(system) = &self.system {
                    ui.label(format!("secondaries = {}", system.secondaries.len()));
                }
                if let Some(error) = &self.error {
                    ui.separator();
                    ui.colored_label(egui::Color32::YELLOW, error);
                }
            });
        });
    }

    /// Builds the central panel where the root system is drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            self.canvas = rect.size();
            if self.fit_pending {
                self.fit_view();
                self.fit_pending = false;
            }

            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 50.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            self.draw_grid(&painter, rect);

            if let Some(system) = &self.system {
                // Secondaries first so the primary stays on top.
                for (role, line) in system.polylines(self.projection).iter().rev() {
                    let stroke = match role {
                        RootRole::Primary => egui::Stroke::new(1.5, egui::Color32::RED),
                        RootRole::Secondary => egui::Stroke::new(0.75, egui::Color32::GRAY),
                    };
                    self.draw_polyline(&painter, rect, line, stroke);
                }
            }

            if let Some(aborted) = &self.aborted {
                let line = self.projection.project_trajectory(aborted);
                let stroke = egui::Stroke::new(1.0, egui::Color32::YELLOW);
                self.draw_polyline(&painter, rect, &line, stroke);
            }

            let origin = self.projection.project(self.cfg.origin);
            painter.circle_filled(
                self.world_to_screen(origin, rect),
                3.0,
                egui::Color32::LIGHT_GREEN,
            );
        });
    }

    /// Light world-space grid behind the roots, one line per
    /// [`grid_spacing`] world units.
    fn draw_grid(&self, painter: &egui::Painter, rect: egui::Rect) {
        let spacing = grid_spacing(self.zoom);
        let min = self.screen_to_world(rect.left_bottom(), rect);
        let max = self.screen_to_world(rect.right_top(), rect);
        let stroke = egui::Stroke::new(0.5, egui::Color32::from_gray(55));

        for i in (min.x / spacing).floor() as i64..=(max.x / spacing).ceil() as i64 {
            let x = i as f64 * spacing;
            painter.line_segment(
                [
                    self.world_to_screen(DVec2::new(x, min.y), rect),
                    self.world_to_screen(DVec2::new(x, max.y), rect),
                ],
                stroke,
            );
        }
        for i in (min.y / spacing).floor() as i64..=(max.y / spacing).ceil() as i64 {
            let y = i as f64 * spacing;
            painter.line_segment(
                [
                    self.world_to_screen(DVec2::new(min.x, y), rect),
                    self.world_to_screen(DVec2::new(max.x, y), rect),
                ],
                stroke,
            );
        }
    }

    fn draw_polyline(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        line: &[DVec2],
        stroke: egui::Stroke,
    ) {
        if line.len() < 2 {
            return;
        }
        let points: Vec<egui::Pos2> = line.iter().map(|&p| self.world_to_screen(p, rect)).collect();
        painter.add(egui::Shape::line(points, stroke));
    }
}

/// Smallest power of ten, in world units, that keeps grid lines at least
/// 40 px apart at `zoom`.
fn grid_spacing(zoom: f32) -> f64 {
    let min_world = 40.0 / zoom as f64;
    10f64.powf(min_world.log10().ceil())
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
    }
}
