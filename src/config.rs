//! Geometry and timing configuration.
//!
//! Everything is expressed relative to the spawn origin (`X_START`, `Y_START`).
//! Timings are authored in beats; one beat is `scale_speed` frames, so a larger
//! scale slows the whole animation down uniformly.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Side length of the square playfield, in canvas units.
pub const CANVAS_SIZE: u16 = 280;
/// Edge length of one block.
pub const UNIT: i32 = 20;
/// Spawn column.
pub const X_START: i32 = 140;
/// Spawn row.
pub const Y_START: i32 = 0;
pub const FRAME_RATE: u32 = 60;
pub const SCALE_SPEED: u64 = 4;
/// The host's first frame number. Frame counters are 1-based.
pub const FIRST_FRAME: u64 = 1;

/// Left wall column, relative to `X_START`.
pub const LEFT_WALL_OFFSET: i32 = -140;
/// Right wall column, relative to `X_START`.
pub const RIGHT_WALL_OFFSET: i32 = 120;
/// Floor row, relative to `Y_START`.
pub const FLOOR_OFFSET: i32 = 260;

/// Largest playfield side, in blocks, that still maps onto a terminal grid.
pub const MAX_BLOCKS: i32 = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_canvas_size")]
    pub canvas_size: u16,
    #[serde(default = "default_unit")]
    pub unit: i32,
    #[serde(default = "default_x_start")]
    pub x_start: i32,
    #[serde(default = "default_y_start")]
    pub y_start: i32,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    #[serde(default = "default_scale_speed")]
    pub scale_speed: u64,

    #[serde(default = "default_auto_drop_beats")]
    pub auto_drop_beats: u64,
    #[serde(default = "default_clear_start_beats")]
    pub clear_start_beats: u64,
    #[serde(default = "default_clear_end_beats")]
    pub clear_end_beats: u64,
    #[serde(default = "default_clear_step_beats")]
    pub clear_step_beats: u64,
    /// How long the finished logo stays on screen after the settle drop.
    #[serde(default = "default_hold_beats")]
    pub hold_beats: u64,

    #[serde(default = "default_clear_band_y")]
    pub clear_band_y: i32,
    #[serde(default = "default_clear_band_height")]
    pub clear_band_height: i32,
    /// Half-width of the erase band on its first frame.
    #[serde(default = "default_clear_initial_width")]
    pub clear_initial_width: i32,
    #[serde(default = "default_clear_growth")]
    pub clear_growth: i32,
    #[serde(default = "default_settle_drop")]
    pub settle_drop: i32,
}

fn default_canvas_size() -> u16 { CANVAS_SIZE }
fn default_unit() -> i32 { UNIT }
fn default_x_start() -> i32 { X_START }
fn default_y_start() -> i32 { Y_START }
fn default_frame_rate() -> u32 { FRAME_RATE }
fn default_scale_speed() -> u64 { SCALE_SPEED }
fn default_auto_drop_beats() -> u64 { 6 }
fn default_clear_start_beats() -> u64 { 164 }
fn default_clear_end_beats() -> u64 { 176 }
fn default_clear_step_beats() -> u64 { 2 }
fn default_hold_beats() -> u64 { 30 }
fn default_clear_band_y() -> i32 { 200 }
fn default_clear_band_height() -> i32 { 60 }
fn default_clear_initial_width() -> i32 { 20 }
fn default_clear_growth() -> i32 { 20 }
fn default_settle_drop() -> i32 { 60 }

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            canvas_size: default_canvas_size(),
            unit: default_unit(),
            x_start: default_x_start(),
            y_start: default_y_start(),
            frame_rate: default_frame_rate(),
            scale_speed: default_scale_speed(),
            auto_drop_beats: default_auto_drop_beats(),
            clear_start_beats: default_clear_start_beats(),
            clear_end_beats: default_clear_end_beats(),
            clear_step_beats: default_clear_step_beats(),
            hold_beats: default_hold_beats(),
            clear_band_y: default_clear_band_y(),
            clear_band_height: default_clear_band_height(),
            clear_initial_width: default_clear_initial_width(),
            clear_growth: default_clear_growth(),
            settle_drop: default_settle_drop(),
        }
    }
}

impl AnimationConfig {
    /// Convert authored beats into absolute frames. Saturates; `validate`
    /// guarantees the configured timings fit.
    pub fn frames(&self, beats: u64) -> u64 {
        beats.saturating_mul(self.scale_speed)
    }

    /// Like `frames`, but `None` when the result does not fit a `u64`.
    pub fn checked_frames(&self, beats: u64) -> Option<u64> {
        beats.checked_mul(self.scale_speed)
    }

    pub fn auto_drop_period(&self) -> u64 {
        self.frames(self.auto_drop_beats)
    }

    pub fn clear_start(&self) -> u64 {
        self.frames(self.clear_start_beats)
    }

    pub fn clear_end(&self) -> u64 {
        self.frames(self.clear_end_beats)
    }

    pub fn clear_step(&self) -> u64 {
        self.frames(self.clear_step_beats)
    }

    /// Last frame the host needs to tick: one past the clear end (where the
    /// settle drop fires) plus the hold.
    pub fn last_frame(&self) -> u64 {
        self.checked_last_frame().unwrap_or(u64::MAX)
    }

    fn checked_last_frame(&self) -> Option<u64> {
        self.checked_frames(self.clear_end_beats)?
            .checked_add(1)?
            .checked_add(self.checked_frames(self.hold_beats)?)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        let invalid = |field: &'static str, reason: &'static str| {
            Err(ScheduleError::InvalidConfig { field, reason })
        };

        if self.unit <= 0 {
            return invalid("unit", "must be positive");
        }
        if self.canvas_size == 0 || i32::from(self.canvas_size) % self.unit != 0 {
            return invalid("canvas_size", "must be a non-zero multiple of unit");
        }
        if i32::from(self.canvas_size) / self.unit > MAX_BLOCKS {
            return invalid("canvas_size", "spans too many blocks for a terminal");
        }
        if self.frame_rate == 0 {
            return invalid("frame_rate", "must be positive");
        }
        if self.scale_speed == 0 {
            return invalid("scale_speed", "must be positive");
        }
        if self.auto_drop_beats == 0 {
            return invalid("auto_drop_beats", "must be positive");
        }
        if self.clear_step_beats == 0 {
            return invalid("clear_step_beats", "must be positive");
        }
        if self.clear_end_beats <= self.clear_start_beats {
            return invalid("clear_end_beats", "must be after clear_start_beats");
        }
        if self.checked_frames(self.auto_drop_beats).is_none()
            || self.checked_frames(self.clear_step_beats).is_none()
        {
            return invalid("scale_speed", "overflows the frame counter");
        }
        if self.checked_last_frame().is_none() {
            return invalid("hold_beats", "overflows the frame counter");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Playfield walls
    // -----------------------------------------------------------------------

    pub fn left_wall_x(&self) -> i32 {
        self.x_start + LEFT_WALL_OFFSET
    }

    pub fn right_wall_x(&self) -> i32 {
        self.x_start + RIGHT_WALL_OFFSET
    }

    pub fn floor_y(&self) -> i32 {
        self.y_start + FLOOR_OFFSET
    }

    /// Blocks per wall column.
    pub fn wall_height(&self) -> i32 {
        i32::from(self.canvas_size) / self.unit
    }

    /// Floor blocks between the two walls.
    pub fn floor_width(&self) -> i32 {
        (self.right_wall_x() - self.left_wall_x()) / self.unit - 1
    }
}
