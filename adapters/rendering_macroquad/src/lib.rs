#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the Overworld.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The scene is laid out in a fixed logical viewport. The backend scales that
//! viewport uniformly to fit the window and letterboxes the remainder.

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use overworld_rendering::{
    draw_list, DrawCommand, FrameInput, FrameSimulationBreakdown, Presentation, RenderingBackend,
    Scene,
};
use std::{
    collections::VecDeque,
    f32::consts::TAU,
    time::{Duration, Instant},
};
use tracing::info;

const WINDOW_SCALE: f32 = 2.0;
const ELLIPSE_SEGMENTS: usize = 24;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);

        Self { quit_requested }
    }
}

fn any_down(keys: &[KeyCode]) -> bool {
    keys.iter().any(|key| is_key_down(*key))
}

fn any_pressed(keys: &[KeyCode]) -> bool {
    keys.iter().any(|key| is_key_pressed(*key))
}

/// Samples held directions (arrows or WASD) and the action edge (Z, Space or Enter).
fn gather_frame_input() -> FrameInput {
    FrameInput {
        up: any_down(&[KeyCode::Up, KeyCode::W]),
        down: any_down(&[KeyCode::Down, KeyCode::S]),
        left: any_down(&[KeyCode::Left, KeyCode::A]),
        right: any_down(&[KeyCode::Right, KeyCode::D]),
        interact_pressed: any_pressed(&[KeyCode::Z, KeyCode::Space, KeyCode::Enter]),
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Timing of a single frame split by phase.
#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    scene_population: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    simulation_accum: Duration,
    scene_population_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_simulation: Duration,
    avg_scene_population: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);

        self.simulation_accum += breakdown.simulation;
        self.scene_population_accum += breakdown.scene_population;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_simulation: self.simulation_accum / frames,
            avg_scene_population: self.scene_population_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.simulation_accum = Duration::ZERO;
        self.scene_population_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: (scene.viewport.x * WINDOW_SCALE).round() as i32,
            window_height: (scene.viewport.y * WINDOW_SCALE).round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    info!("quit requested");
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input();
                let simulation_breakdown = update_scene(frame_dt, frame_input, &mut scene);

                let render_start = Instant::now();
                let metrics = SceneMetrics::from_viewport(
                    scene.viewport,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                for command in draw_list(&scene) {
                    execute(&command, &metrics);
                }
                draw_letterbox(&metrics, background);
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation: simulation_breakdown.simulation,
                    scene_population: simulation_breakdown.scene_population,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_simulation,
                        avg_scene_population,
                        avg_render,
                    }) = fps_metrics
                    {
                        info!(
                            fps = per_second,
                            fps_10s = trailing_ten_seconds,
                            sim_ms = avg_simulation.as_secs_f64() * 1_000.0,
                            scene_ms = avg_scene_population.as_secs_f64() * 1_000.0,
                            render_ms = avg_render.as_secs_f64() * 1_000.0,
                            "frame_metrics"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Uniform scale and letterbox offset mapping viewport pixels onto the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset: Vec2,
    scaled_viewport: Vec2,
    screen: Vec2,
}

impl SceneMetrics {
    fn from_viewport(viewport: Vec2, screen_width: f32, screen_height: f32) -> Self {
        let screen = Vec2::new(screen_width.max(0.0), screen_height.max(0.0));
        let scale = if viewport.x <= f32::EPSILON || viewport.y <= f32::EPSILON {
            1.0
        } else {
            (screen.x / viewport.x).min(screen.y / viewport.y)
        };
        let scaled_viewport = viewport * scale;
        let offset = ((screen - scaled_viewport) * 0.5).max(Vec2::ZERO);

        Self {
            scale,
            offset,
            scaled_viewport,
            screen,
        }
    }

    fn to_screen(&self, position: Vec2) -> Vec2 {
        self.offset + position * self.scale
    }
}

fn execute(command: &DrawCommand, metrics: &SceneMetrics) {
    match command {
        DrawCommand::Rect {
            position,
            size,
            color,
        } => {
            let origin = metrics.to_screen(*position);
            let size = *size * metrics.scale;
            macroquad::shapes::draw_rectangle(
                origin.x,
                origin.y,
                size.x,
                size.y,
                to_macroquad_color(*color),
            );
        }
        DrawCommand::RectOutline {
            position,
            size,
            thickness,
            color,
        } => {
            let origin = metrics.to_screen(*position);
            let size = *size * metrics.scale;
            macroquad::shapes::draw_rectangle_lines(
                origin.x,
                origin.y,
                size.x,
                size.y,
                (*thickness * metrics.scale).max(1.0),
                to_macroquad_color(*color),
            );
        }
        DrawCommand::Ellipse {
            center,
            radii,
            color,
        } => {
            let center = metrics.to_screen(*center);
            let points = ellipse_points(center, *radii * metrics.scale, ELLIPSE_SEGMENTS);
            let color = to_macroquad_color(*color);
            let hub = to_macroquad_vec2(center);
            for (index, point) in points.iter().enumerate() {
                let next = points[(index + 1) % points.len()];
                macroquad::shapes::draw_triangle(
                    hub,
                    to_macroquad_vec2(*point),
                    to_macroquad_vec2(next),
                    color,
                );
            }
        }
        DrawCommand::Text {
            text,
            position,
            font_size,
            color,
        } => {
            let origin = metrics.to_screen(*position);
            let _ = macroquad::text::draw_text(
                text,
                origin.x,
                origin.y,
                *font_size * metrics.scale,
                to_macroquad_color(*color),
            );
        }
    }
}

/// Covers the window outside the scaled viewport so overflowing tiles stay hidden.
fn draw_letterbox(metrics: &SceneMetrics, color: macroquad::color::Color) {
    let SceneMetrics {
        offset,
        scaled_viewport,
        screen,
        ..
    } = *metrics;
    let right = offset.x + scaled_viewport.x;
    let bottom = offset.y + scaled_viewport.y;

    macroquad::shapes::draw_rectangle(0.0, 0.0, screen.x, offset.y, color);
    macroquad::shapes::draw_rectangle(0.0, bottom, screen.x, screen.y - bottom, color);
    macroquad::shapes::draw_rectangle(0.0, 0.0, offset.x, screen.y, color);
    macroquad::shapes::draw_rectangle(right, 0.0, screen.x - right, screen.y, color);
}

fn ellipse_points(center: Vec2, radii: Vec2, segments: usize) -> Vec<Vec2> {
    let segments = segments.max(3);
    (0..segments)
        .map(|index| {
            let angle = TAU * index as f32 / segments as f32;
            center + Vec2::new(angle.cos() * radii.x, angle.sin() * radii.y)
        })
        .collect()
}

fn to_macroquad_vec2(value: Vec2) -> MacroquadVec2 {
    MacroquadVec2::new(value.x, value.y)
}

fn to_macroquad_color(color: overworld_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
