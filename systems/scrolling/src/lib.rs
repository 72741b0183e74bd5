#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Camera steering system that turns per-frame input into scroll requests.
//!
//! The system never touches the viewport. Each frame it receives the pointer
//! and keyboard state together with a [`ViewSnapshot`] and answers with
//! [`ScrollRequest`] values for the viewport to apply.

use serde::Deserialize;
use tactical_core::{
    cell_to_world, CellIndex, ScrollRequest, ViewSnapshot, WorldPosition, LEPTONS_PER_PIXEL,
};
use tracing::debug;

const EASE_ONE: i64 = 1024;

/// Tuning parameters of the scrolling system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Depth in pixels of the pointer-sensitive band along each edge.
    pub edge_zone: i32,
    /// Edge scroll speed at the inner border of the band, in pixels per frame.
    pub min_speed: i32,
    /// Edge scroll speed at the outer border of the band, in pixels per frame.
    pub max_speed: i32,
    /// Keyboard scroll speed in pixels per frame.
    pub keyboard_speed: i32,
    /// Frames of continuous edge scrolling before the acceleration bonus peaks.
    pub accel_frames: u32,
    /// Speed multiplier applied to edge and keyboard scrolling, in percent.
    pub speed_percent: i32,
    /// Distance in pixels the tracked target may drift from the centre unnoticed.
    pub tracking_dead_zone: i32,
    /// Fraction of the tracking offset covered per frame, as a divisor.
    pub tracking_divisor: i32,
}

impl Config {
    /// Classic tuning: 16 px band, 4 to 32 px per frame, 30 frame ramp.
    pub const CLASSIC: Self = Self {
        edge_zone: 16,
        min_speed: 4,
        max_speed: 32,
        keyboard_speed: 16,
        accel_frames: 30,
        speed_percent: 100,
        tracking_dead_zone: 100,
        tracking_divisor: 8,
    };

    /// Copy of the configuration with a different speed multiplier.
    #[must_use]
    pub const fn with_speed_percent(self, speed_percent: i32) -> Self {
        Self {
            speed_percent,
            ..self
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::CLASSIC
    }
}

/// Input sampled by the adapter for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollInput {
    /// Pointer position in screen pixels, if the pointer is over the window.
    pub pointer: Option<(i32, i32)>,
    /// Whether the scroll-up key is held.
    pub up: bool,
    /// Whether the scroll-down key is held.
    pub down: bool,
    /// Whether the scroll-left key is held.
    pub left: bool,
    /// Whether the scroll-right key is held.
    pub right: bool,
}

/// Progress curve of an animated scroll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Jumps straight to the target.
    Instant,
    /// Constant speed.
    #[default]
    Linear,
    /// Decelerates towards the target.
    EaseOut,
    /// Accelerates, then decelerates.
    EaseInOut,
}

impl Easing {
    /// Eased progress for `t` in `0..=1024`, also in `0..=1024`.
    fn apply(self, t: i64) -> i64 {
        let t = t.clamp(0, EASE_ONE);
        match self {
            Self::Instant => EASE_ONE,
            Self::Linear => t,
            Self::EaseOut => {
                let remaining = EASE_ONE - t;
                EASE_ONE - remaining * remaining / EASE_ONE
            }
            Self::EaseInOut => t * t * (3 * EASE_ONE - 2 * t) / (EASE_ONE * EASE_ONE),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Animation {
    start: WorldPosition,
    target: WorldPosition,
    easing: Easing,
    duration: u32,
    elapsed: u32,
}

impl Animation {
    fn advance(&mut self) -> WorldPosition {
        self.elapsed = self.elapsed.saturating_add(1).min(self.duration);
        let t = i64::from(self.elapsed) * EASE_ONE / i64::from(self.duration.max(1));
        let eased = self.easing.apply(t);
        WorldPosition::new(
            interpolate(self.start.x(), self.target.x(), eased),
            interpolate(self.start.y(), self.target.y(), eased),
        )
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

fn interpolate(from: i32, to: i32, eased: i64) -> i32 {
    let value = i64::from(from) + (i64::from(to) - i64::from(from)) * eased / EASE_ONE;
    i32::try_from(value).unwrap_or(to)
}

/// Pure system steering the camera from edge, keyboard, tracking and animation input.
#[derive(Debug)]
pub struct Scrolling {
    config: Config,
    enabled: bool,
    accel_counter: u32,
    scrolling: bool,
    tracked: Option<WorldPosition>,
    animation: Option<Animation>,
}

impl Scrolling {
    /// Creates a new scrolling system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            enabled: true,
            accel_counter: 0,
            scrolling: false,
            tracked: None,
            animation: None,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    /// Enables or disables all scrolling.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.accel_counter = 0;
            self.scrolling = false;
        }
    }

    /// Reports whether scrolling is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reports whether the last frame produced edge or keyboard scrolling.
    #[must_use]
    pub const fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Replaces the speed multiplier, in percent.
    pub fn set_speed_percent(&mut self, speed_percent: i32) {
        self.config = self.config.with_speed_percent(speed_percent.max(0));
    }

    /// Starts following the provided world position.
    pub fn track(&mut self, target: WorldPosition) {
        self.tracked = (!target.is_none()).then_some(target);
    }

    /// Stops following any target.
    pub fn stop_tracking(&mut self) {
        self.tracked = None;
    }

    /// Position currently followed, if any.
    #[must_use]
    pub const fn tracked(&self) -> Option<WorldPosition> {
        self.tracked
    }

    /// Reports whether an animated scroll is in progress.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Abandons any animated scroll.
    pub fn cancel(&mut self) {
        self.animation = None;
    }

    /// Moves the top-left corner of the view to `target`, animated over `frames`.
    ///
    /// Instant easing or a zero duration emits the jump immediately.
    pub fn scroll_to(
        &mut self,
        view: &ViewSnapshot,
        target: WorldPosition,
        easing: Easing,
        frames: u32,
        out: &mut Vec<ScrollRequest>,
    ) {
        if target.is_none() {
            return;
        }
        if easing == Easing::Instant || frames == 0 {
            self.cancel();
            out.push(ScrollRequest::To { position: target });
            return;
        }
        self.animation = Some(Animation {
            start: view.origin,
            target,
            easing,
            duration: frames,
            elapsed: 0,
        });
        debug!(
            x = target.x(),
            y = target.y(),
            frames,
            "scroll_animation_started"
        );
    }

    /// Centres the view on `position`, animated over `frames`.
    pub fn center_on(
        &mut self,
        view: &ViewSnapshot,
        position: WorldPosition,
        easing: Easing,
        frames: u32,
        out: &mut Vec<ScrollRequest>,
    ) {
        if position.is_none() {
            return;
        }
        self.scroll_to(view, view.origin_centering(position), easing, frames, out);
    }

    /// Centres the view on the centre of `cell`, animated over `frames`.
    pub fn center_on_cell(
        &mut self,
        view: &ViewSnapshot,
        cell: CellIndex,
        easing: Easing,
        frames: u32,
        out: &mut Vec<ScrollRequest>,
    ) {
        self.center_on(view, cell_to_world(cell), easing, frames, out);
    }

    /// Consumes one frame of input and emits the resulting scroll requests.
    ///
    /// An animated scroll owns the camera until it completes; edge, keyboard
    /// and tracking input resume on the following frame.
    pub fn handle(&mut self, input: &ScrollInput, view: &ViewSnapshot, out: &mut Vec<ScrollRequest>) {
        if !self.enabled {
            self.accel_counter = 0;
            self.scrolling = false;
            return;
        }

        if let Some(animation) = self.animation.as_mut() {
            out.push(ScrollRequest::To {
                position: animation.advance(),
            });
            if animation.finished() {
                self.animation = None;
            }
            return;
        }

        let edge = self.edge_scroll(input.pointer, view);
        let keyboard = self.keyboard_scroll(input);
        self.scrolling = edge != (0, 0) || keyboard != (0, 0);

        for (dx, dy) in [edge, keyboard, self.tracking_scroll(view)] {
            if dx != 0 || dy != 0 {
                out.push(ScrollRequest::By { dx, dy });
            }
        }
    }

    fn edge_scroll(&mut self, pointer: Option<(i32, i32)>, view: &ViewSnapshot) -> (i32, i32) {
        let Some((sx, sy)) = pointer else {
            self.accel_counter = 0;
            return (0, 0);
        };
        let x = sx - view.screen_x;
        let y = sy - view.screen_y;
        if x < 0 || y < 0 || x >= view.width || y >= view.height {
            self.accel_counter = 0;
            return (0, 0);
        }

        let zone = self.config.edge_zone;
        let dx = if x < zone {
            -self.edge_speed(zone - x)
        } else if x >= view.width - zone {
            self.edge_speed(x - (view.width - zone))
        } else {
            0
        };
        let dy = if y < zone {
            -self.edge_speed(zone - y)
        } else if y >= view.height - zone {
            self.edge_speed(y - (view.height - zone))
        } else {
            0
        };

        if dx != 0 || dy != 0 {
            self.accel_counter = (self.accel_counter + 1).min(self.config.accel_frames);
        } else {
            self.accel_counter = 0;
        }
        (dx, dy)
    }

    fn edge_speed(&self, depth: i32) -> i32 {
        let config = &self.config;
        let zone = config.edge_zone.max(1);
        let base = config.min_speed + (config.max_speed - config.min_speed) * depth / zone;
        let ramp = i32::try_from(config.accel_frames.max(1)).unwrap_or(i32::MAX);
        let counter = i32::try_from(self.accel_counter).unwrap_or(ramp);
        let bonus = base * counter / ramp / 2;
        self.scaled(base + bonus)
    }

    /// Left wins over right and up over down when both keys are held.
    fn keyboard_scroll(&self, input: &ScrollInput) -> (i32, i32) {
        let speed = self.scaled(self.config.keyboard_speed);
        let axis = |negative: bool, positive: bool| match (negative, positive) {
            (true, _) => -speed,
            (false, true) => speed,
            (false, false) => 0,
        };
        (axis(input.left, input.right), axis(input.up, input.down))
    }

    fn tracking_scroll(&self, view: &ViewSnapshot) -> (i32, i32) {
        let Some(target) = self.tracked else {
            return (0, 0);
        };
        let centre = view.center();
        let dx = target.x().saturating_sub(centre.x()) / LEPTONS_PER_PIXEL;
        let dy = target.y().saturating_sub(centre.y()) / LEPTONS_PER_PIXEL;
        let dead_zone = self.config.tracking_dead_zone;
        if dx.abs() <= dead_zone && dy.abs() <= dead_zone {
            return (0, 0);
        }
        let step = |delta: i32| {
            let moved = delta / self.config.tracking_divisor.max(1);
            if moved == 0 {
                delta.signum()
            } else {
                moved
            }
        };
        (step(dx), step(dy))
    }

    fn scaled(&self, speed: i32) -> i32 {
        speed * self.config.speed_percent / 100
    }
}

impl Default for Scrolling {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
