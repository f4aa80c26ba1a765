//! Interactive noise-grid viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which hosts a [`FrameDriver`]: it supplies
//! the clock and the query volume each frame, and draws the presented
//! instances with a simple orthographic projection.

use eframe::App;
use glam::{Quat, Vec3};
use grid_core::{
    bounds::QueryVolume,
    clock::FrameTime,
    config::{Config, Schedule},
    driver::{FrameDriver, TickReport},
    render::{Instance, RenderSink},
};
use tracing::{error, info};

/// Render sink keeping the last presented frame for drawing.
#[derive(Debug, Default)]
struct ViewFrame {
    instances: Vec<Instance>,
}

impl RenderSink for ViewFrame {
    fn present(&mut self, frame: &[Instance]) {
        self.instances.clear();
        self.instances.extend_from_slice(frame);
    }
}

/// Orthographic camera orbiting the origin.
#[derive(Clone, Copy, Debug)]
struct Camera {
    yaw: f32,
    pitch: f32,
    zoom: f32,
    pan: egui::Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.4,
            zoom: 6.0,
            pan: egui::vec2(0.0, 0.0),
        }
    }
}

impl Camera {
    fn rotation(&self) -> Quat {
        Quat::from_rotation_x(self.pitch) * Quat::from_rotation_y(self.yaw)
    }

    /// Converts a world-space position to screen-space.
    ///
    /// The position is rotated by pitch and yaw, then its x/y are scaled by
    /// `zoom`, offset by `pan`, and centered inside `rect`. The y-axis is
    /// flipped so that positive y goes up in world space.
    ///
    /// ### Parameters
    /// - `p` - World-space position.
    /// - `rect` - Screen-space rectangle representing the drawing area.
    ///
    /// ### Returns
    /// The egui position and the view depth; a larger depth is closer to the
    /// viewer.
    fn world_to_screen(&self, p: Vec3, rect: egui::Rect) -> (egui::Pos2, f32) {
        let v = self.rotation() * p;
        let center = rect.center();
        (
            egui::pos2(
                center.x + v.x * self.zoom + self.pan.x,
                center.y - v.y * self.zoom + self.pan.y,
            ),
            v.z,
        )
    }
}

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true`, advance the simulation clock and tick.
/// 3. Draw the last presented frame and the query volume outline.
///
/// ### Fields
/// - `driver` - The frame driver; `None` when the config failed to initialize.
/// - `cfg` - Configuration the current driver was built from.
/// - `pending_cfg` - Configuration being edited; applied with "Apply".
/// - `volume` - Query volume handed to every tick.
/// - `frame` - Last frame presented by the driver.
/// - `sim_time` - Simulation clock in seconds; frozen while paused.
pub struct Viewer {
    driver: Option<FrameDriver>,
    cfg: Config,
    pending_cfg: Config,
    volume: QueryVolume,
    frame: ViewFrame,

    running: bool,
    camera: Camera,

    sim_time: f32,
    step_dt: f32,
    last_input_time: Option<f64>,

    last_report: Option<TickReport>,
    last_error: Option<String>,
}

impl Viewer {
    /// Creates a viewer and initializes a driver for `cfg`.
    ///
    /// If `cfg` is rejected the viewer still opens, without a driver, and
    /// shows the error in the status bar.
    pub fn new(cfg: Config) -> Self {
        let mut viewer = Self {
            driver: None,
            volume: default_volume(&cfg),
            pending_cfg: cfg.clone(),
            cfg,
            frame: ViewFrame::default(),
            running: true,
            camera: Camera::default(),
            sim_time: 0.0,
            step_dt: 1.0 / 60.0,
            last_input_time: None,
            last_report: None,
            last_error: None,
        };
        viewer.reinitialize();
        viewer
    }

    /// Tears down the current driver (if any) and builds a new one from `cfg`.
    ///
    /// After this call:
    /// - The clock is back at zero and `last_report` is cleared.
    /// - On success, `frame` holds the resting grid until the next tick and
    ///   `last_error` is cleared.
    /// - On failure, `driver` is `None`, `frame` is empty and `last_error`
    ///   holds the reason.
    fn reinitialize(&mut self) {
        if let Some(mut driver) = self.driver.take()
            && let Err(err) = driver.teardown()
        {
            error!(%err, "teardown failed");
        }

        self.sim_time = 0.0;
        self.last_report = None;
        self.frame.instances.clear();

        match FrameDriver::with_initialized(self.cfg.clone()) {
            Ok(driver) => {
                if let Some(frame) = driver.frame() {
                    self.frame.present(frame);
                }
                info!(elements = driver.len(), "viewer driver ready");
                self.driver = Some(driver);
                self.last_error = None;
            }
            Err(err) => {
                error!(%err, "failed to initialize frame driver");
                self.last_error = Some(err.to_string());
            }
        }
    }

    /// Applies the edited configuration and restarts the simulation.
    ///
    /// A change of `edge_size` or `spacing` moves the grid, so the query
    /// volume is re-centered on it with [`default_volume`]. Other changes
    /// keep the volume the user placed.
    fn apply_pending(&mut self) {
        let reshaped = self.pending_cfg.edge_size != self.cfg.edge_size
            || self.pending_cfg.spacing != self.cfg.spacing;

        self.cfg = self.pending_cfg.clone();
        if reshaped {
            self.volume = default_volume(&self.cfg);
        }
        self.reinitialize();
    }

    /// Resets the clock and the grid, keeping the current configuration.
    ///
    /// - Rebuilds the driver via [`Viewer::reinitialize`].
    /// - Stops auto-running, so the resting grid stays on screen.
    fn reset(&mut self) {
        self.reinitialize();
        self.running = false;
    }

    /// Advances the clock by `delta` seconds and runs one tick.
    ///
    /// The presented frame replaces `frame` and the tick summary is stored
    /// in `last_report`. Does nothing when there is no driver.
    ///
    /// ### Parameters
    /// - `delta` - Seconds to add to `sim_time` before ticking.
    fn step_once(&mut self, delta: f32) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };

        self.sim_time += delta;
        let time = FrameTime {
            elapsed: self.sim_time,
            delta,
        };

        match driver.tick(time, &self.volume, &mut self.frame) {
            Ok(report) => self.last_report = Some(report),
            Err(err) => {
                error!(%err, "tick failed");
                self.last_error = Some(err.to_string());
            }
        }
    }

    /// Helper to draw a labeled `i32` [`egui::DragValue`].
    fn labeled_drag_i32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut i32,
        range: std::ops::RangeInclusive<i32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_dt)
                        .prefix("step dt = ")
                        .range(0.001..=1.0)
                        .speed(0.001),
                );

                if ui.button("Step").clicked() {
                    self.step_once(self.step_dt);
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.camera.zoom, 0.5..=40.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (tick, selection counts, errors).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("t = {:.2} s", self.sim_time));
                ui.separator();
                if let Some(report) = self.last_report {
                    ui.label(format!("tick = {}", report.tick));
                    ui.label(format!("inside = {}", report.inside));
                    ui.label(format!("outside = {}", report.outside));
                }
                ui.separator();
                ui.label(format!("elements = {}", self.frame.instances.len()));
                if let Some(err) = &self.last_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }
            });
        });
    }

    /// Builds the right-hand panel for the configuration and the query volume.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Grid");
                Self::labeled_drag_i32(ui, "edge_size:", &mut self.pending_cfg.edge_size, 0..=64, 0.2);
                Self::labeled_drag_f32(ui, "spacing:", &mut self.pending_cfg.spacing, 0.5..=20.0, 0.1);

                ui.separator();
                ui.label("Motion");
                Self::labeled_drag_f32(ui, "amplitude:", &mut self.pending_cfg.amplitude, 0.0..=10.0, 0.05);
                Self::labeled_drag_f32(ui, "freq.x:", &mut self.pending_cfg.frequencies.x, 0.0..=2.0, 0.01);
                Self::labeled_drag_f32(ui, "freq.y:", &mut self.pending_cfg.frequencies.y, 0.0..=2.0, 0.01);
                Self::labeled_drag_f32(ui, "freq.z:", &mut self.pending_cfg.frequencies.z, 0.0..=2.0, 0.01);

                ui.separator();
                ui.label("Jobs");
                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.pending_cfg.schedule, Schedule::Parallel, "Parallel");
                    ui.radio_value(&mut self.pending_cfg.schedule, Schedule::Sequential, "Sequential");
                });
                ui.checkbox(&mut self.pending_cfg.selection_enabled, "Selection");

                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        self.apply_pending();
                    }
                    if ui.button("Defaults").clicked() {
                        self.pending_cfg = Config::default();
                    }
                });

                ui.separator();
                ui.heading("Query volume");
                Self::labeled_drag_f32(ui, "center.x:", &mut self.volume.center.x, -500.0..=500.0, 0.2);
                Self::labeled_drag_f32(ui, "center.y:", &mut self.volume.center.y, -500.0..=500.0, 0.2);
                Self::labeled_drag_f32(ui, "center.z:", &mut self.volume.center.z, -500.0..=500.0, 0.2);
                Self::labeled_drag_f32(ui, "extent.x:", &mut self.volume.half_extents.x, 0.0..=500.0, 0.1);
                Self::labeled_drag_f32(ui, "extent.y:", &mut self.volume.half_extents.y, 0.0..=500.0, 0.1);
                Self::labeled_drag_f32(ui, "extent.z:", &mut self.volume.half_extents.z, 0.0..=500.0, 0.1);
                if ui.button("Reset volume").clicked() {
                    self.volume = default_volume(&self.cfg);
                }
            });
    }

    /// Builds the central panel where the cubes and the query volume are drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with the primary button, orbit with the secondary one.
            if response.dragged_by(egui::PointerButton::Primary) {
                self.camera.pan += response.drag_delta();
            }
            if response.dragged_by(egui::PointerButton::Secondary) {
                let delta = response.drag_delta();
                self.camera.yaw += delta.x * 0.01;
                self.camera.pitch = (self.camera.pitch + delta.y * 0.01).clamp(-1.5, 1.5);
            }

            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if response.hovered() && scroll != 0.0 {
                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.camera.zoom = (self.camera.zoom * factor).clamp(0.5, 40.0);
            }

            // Draw cubes back to front.
            for (p, radius, color) in draw_order(&self.camera, &self.frame.instances, rect) {
                painter.circle_filled(p, radius, color);
            }

            // Query volume outline.
            let stroke = egui::Stroke::new(1.5, egui::Color32::YELLOW);
            let corners = self
                .volume
                .corners()
                .map(|c| self.camera.world_to_screen(c, rect).0);
            for (a, b) in box_edges() {
                painter.line_segment([corners[a], corners[b]], stroke);
            }

            // Advance the clock from egui's input time while running.
            let now = ctx.input(|i| i.time);
            if self.running {
                let delta = self
                    .last_input_time
                    .map_or(self.step_dt, |last| (now - last) as f32);
                self.step_once(delta);
                ctx.request_repaint();
            }
            self.last_input_time = Some(now);
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

/// Query volume covering roughly the middle of the grid described by `cfg`.
fn default_volume(cfg: &Config) -> QueryVolume {
    let edge = cfg.edge_size.max(1) as f32;
    let depth = (edge - 1.0) * cfg.spacing;
    QueryVolume::new(
        Vec3::new(0.0, 0.0, depth * 0.5),
        Vec3::splat((edge * cfg.spacing * 0.2).max(cfg.spacing)),
    )
}

/// Index pairs of the 12 edges of [`QueryVolume::corners`].
fn box_edges() -> Vec<(usize, usize)> {
    let mut edges = Vec::with_capacity(12);
    for i in 0..8 {
        for bit in [1, 2, 4] {
            if i & bit == 0 {
                edges.push((i, i | bit));
            }
        }
    }
    edges
}

/// Screen-space circles for every instance, sorted farthest first.
fn draw_order(
    camera: &Camera,
    instances: &[Instance],
    rect: egui::Rect,
) -> Vec<(egui::Pos2, f32, egui::Color32)> {
    let mut projected: Vec<(f32, egui::Pos2, f32, egui::Color32)> = instances
        .iter()
        .map(|inst| {
            let (p, depth) = camera.world_to_screen(inst.position, rect);
            let radius = (0.5 * inst.scale.max_element() * camera.zoom).max(1.0);
            let [r, g, b, a] = inst.color.to_srgba_u8();
            (depth, p, radius, egui::Color32::from_rgba_unmultiplied(r, g, b, a))
        })
        .collect();

    projected.sort_by(|a, b| a.0.total_cmp(&b.0));
    projected
        .into_iter()
        .map(|(_, p, radius, color)| (p, radius, color))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_core::types::Rgba;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn small_config() -> Config {
        Config {
            edge_size: 3,
            num_threads: Some(2),
            ..Config::default()
        }
    }

    #[test]
    fn unrotated_projection_matches_planar_mapping() {
        let camera = Camera {
            yaw: 0.0,
            pitch: 0.0,
            zoom: 2.0,
            pan: egui::vec2(15.0, -7.0),
        };
        let rect = test_rect();

        let (p, depth) = camera.world_to_screen(Vec3::new(10.0, -5.0, 3.0), rect);
        assert!((p.x - (400.0 + 20.0 + 15.0)).abs() < 1e-4);
        assert!((p.y - (300.0 + 10.0 - 7.0)).abs() < 1e-4);
        assert!((depth - 3.0).abs() < 1e-5);
    }

    #[test]
    fn box_edges_connect_corners_differing_in_one_axis() {
        let edges = box_edges();
        assert_eq!(edges.len(), 12);
        for (a, b) in edges {
            assert_eq!((a ^ b).count_ones(), 1);
        }
    }

    #[test]
    fn draw_order_is_back_to_front() {
        let camera = Camera {
            yaw: 0.0,
            pitch: 0.0,
            ..Camera::default()
        };
        let instances = [
            Instance {
                index: 0,
                position: Vec3::new(0.0, 0.0, 1.0),
                ..Instance::default()
            },
            Instance {
                index: 1,
                position: Vec3::new(0.0, 0.0, 9.0),
                color: Rgba::GREEN,
                ..Instance::default()
            },
        ];

        let order = draw_order(&camera, &instances, test_rect());
        assert_eq!(order.len(), 2);
        assert_eq!(order[0].2, egui::Color32::WHITE);
        assert_eq!(order[1].2, egui::Color32::from_rgba_unmultiplied(0, 255, 0, 255));
    }

    #[test]
    fn new_viewer_shows_resting_grid() {
        let viewer = Viewer::new(small_config());
        assert!(viewer.driver.is_some());
        assert_eq!(viewer.frame.instances.len(), 27);
        assert!(viewer.last_error.is_none());
    }

    #[test]
    fn step_once_ticks_and_advances_clock() {
        let mut viewer = Viewer::new(small_config());
        viewer.step_once(0.5);
        viewer.step_once(0.25);

        let report = viewer.last_report.unwrap();
        assert_eq!(report.tick, 1);
        assert!((viewer.sim_time - 0.75).abs() < 1e-6);
        assert_eq!(report.inside + report.outside, 27);
    }

    #[test]
    fn invalid_pending_config_reports_error() {
        let mut viewer = Viewer::new(small_config());
        viewer.pending_cfg.batch_size = 0;
        viewer.apply_pending();

        assert!(viewer.driver.is_none());
        assert!(viewer.last_error.is_some());
        assert!(viewer.frame.instances.is_empty());

        // Stepping without a driver is a no-op.
        viewer.step_once(0.1);
        assert!(viewer.last_report.is_none());
    }

    #[test]
    fn applying_a_new_grid_shape_recenters_the_volume() {
        let mut viewer = Viewer::new(small_config());
        let moved = QueryVolume::new(Vec3::splat(40.0), Vec3::ONE);

        // Styling changes keep the user's volume.
        viewer.volume = moved;
        viewer.pending_cfg.highlight_scale = 2.0;
        viewer.apply_pending();
        assert_eq!(viewer.volume, moved);

        viewer.pending_cfg.edge_size = 6;
        viewer.apply_pending();
        assert_eq!(viewer.volume, default_volume(&viewer.cfg));

        viewer.volume = moved;
        viewer.pending_cfg.spacing = 2.0;
        viewer.apply_pending();
        assert_eq!(viewer.volume, default_volume(&viewer.cfg));
    }

    #[test]
    fn reset_restarts_clock_and_stops_running() {
        let mut viewer = Viewer::new(small_config());
        viewer.step_once(1.0);
        viewer.reset();

        assert!(!viewer.running);
        assert_eq!(viewer.sim_time, 0.0);
        assert!(viewer.last_report.is_none());
        assert_eq!(viewer.driver.as_ref().unwrap().ticks(), 0);
    }

    #[test]
    fn default_volume_selects_part_of_the_grid() {
        let cfg = Config::default();
        let mut driver = FrameDriver::with_initialized(cfg.clone()).unwrap();
        let mut frame = ViewFrame::default();
        let report = driver
            .tick(FrameTime::default(), &default_volume(&cfg), &mut frame)
            .unwrap();

        assert!(report.inside > 0);
        assert!(report.outside > 0);
    }
}
