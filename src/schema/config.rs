//! Configuration types for sequence assembly.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Wall-clock length of an infinite-loop container, in seconds.
pub const INFINITE_LOOP_SECONDS: u32 = 3600;

/// Length of the countdown prelude, in seconds (one per color).
pub const COUNTDOWN_SECONDS: u32 = 4;

/// How many times the still sequence repeats.
///
/// In `config.json` this is the integer `loop` key: `-1` selects
/// [`LoopMode::Infinite`], any positive value a finite count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum LoopMode {
    /// Repeat exactly this many times.
    Finite(NonZeroU32),
    /// Repeat until [`INFINITE_LOOP_SECONDS`] of frames are filled.
    Infinite,
}

impl LoopMode {
    /// Convenience constructor; `None` for a zero count.
    pub fn finite(count: u32) -> Option<Self> {
        NonZeroU32::new(count).map(LoopMode::Finite)
    }
}

impl TryFrom<i64> for LoopMode {
    type Error = ConfigError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            -1 => Ok(LoopMode::Infinite),
            0 => Err(ConfigError::ZeroLoopCount),
            n if n > 0 => u32::try_from(n)
                .ok()
                .and_then(NonZeroU32::new)
                .map(LoopMode::Finite)
                .ok_or(ConfigError::InvalidLoop(n)),
            n => Err(ConfigError::InvalidLoop(n)),
        }
    }
}

impl From<LoopMode> for i64 {
    fn from(mode: LoopMode) -> Self {
        match mode {
            LoopMode::Finite(n) => n.get() as i64,
            LoopMode::Infinite => -1,
        }
    }
}

fn default_loop() -> LoopMode {
    LoopMode::Infinite
}

fn default_loop_delay() -> i64 {
    1000
}

fn default_countdown() -> bool {
    true
}

fn default_fps() -> u32 {
    5
}

fn default_frame_duration() -> f64 {
    0.2
}

/// On-disk `config.json` stored next to the still images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// `-1` for the one-hour infinite loop, otherwise a positive count.
    #[serde(rename = "loop", default = "default_loop")]
    pub loop_mode: LoopMode,
    /// Black gap between iterations, in milliseconds.
    #[serde(default = "default_loop_delay")]
    pub loop_delay: i64,
    /// Prepend the red/yellow/green/black countdown to every iteration.
    #[serde(default = "default_countdown")]
    pub count_down: bool,
    /// Playback rate written to the container header.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Seconds each still image stays on screen.
    #[serde(default = "default_frame_duration")]
    pub frame_duration: f64,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            loop_mode: default_loop(),
            loop_delay: default_loop_delay(),
            count_down: default_countdown(),
            fps: default_fps(),
            frame_duration: default_frame_duration(),
        }
    }
}

impl ProjectConfig {
    /// Convert to the validated form used by the assembler.
    pub fn into_sequence_config(self) -> Result<SequenceConfig, ConfigError> {
        let loop_delay_ms = u64::try_from(self.loop_delay)
            .map_err(|_| ConfigError::NegativeLoopDelay(self.loop_delay))?;
        let config = SequenceConfig {
            loop_mode: self.loop_mode,
            loop_delay_ms,
            countdown_enabled: self.count_down,
            fps: self.fps,
            base_frame_duration_secs: self.frame_duration,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Validated assembly parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceConfig {
    pub loop_mode: LoopMode,
    /// Black gap between iterations, in milliseconds.
    pub loop_delay_ms: u64,
    pub countdown_enabled: bool,
    /// Frames per second for every duration-to-frame conversion.
    pub fps: u32,
    /// Display time of each still image.
    pub base_frame_duration_secs: f64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            loop_mode: LoopMode::Infinite,
            loop_delay_ms: 1000,
            countdown_enabled: true,
            fps: 5,
            base_frame_duration_secs: 0.2,
        }
    }
}

impl SequenceConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::InvalidFps);
        }
        if !self.base_frame_duration_secs.is_finite() || self.base_frame_duration_secs <= 0.0 {
            return Err(ConfigError::InvalidFrameDuration(
                self.base_frame_duration_secs,
            ));
        }
        Ok(())
    }

    /// Consecutive frames each still image occupies (at least one).
    /// Float-to-int conversions saturate at `usize::MAX`.
    pub fn frames_per_image(&self) -> usize {
        ((self.base_frame_duration_secs * self.fps as f64).round() as usize).max(1)
    }

    /// Black frames inserted between iterations: `round(delay_s * fps)`.
    pub fn delay_frame_count(&self) -> usize {
        (self.loop_delay_ms as f64 / 1000.0 * self.fps as f64).round() as usize
    }

    /// Frames per countdown color block: `round(1 s * fps)`.
    pub fn countdown_block_len(&self) -> usize {
        self.fps as usize
    }

    /// Total countdown frames per iteration (zero when disabled).
    pub fn countdown_frame_count(&self) -> usize {
        if self.countdown_enabled {
            (COUNTDOWN_SECONDS as usize).saturating_mul(self.countdown_block_len())
        } else {
            0
        }
    }

    /// Exact frame count of an infinite-loop container.
    pub fn infinite_target_frames(&self) -> usize {
        (INFINITE_LOOP_SECONDS as usize).saturating_mul(self.fps as usize)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("fps must be positive")]
    InvalidFps,
    #[error("Frame dimensions must be non-zero (got {width}x{height})")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Loop delay must not be negative (got {0} ms)")]
    NegativeLoopDelay(i64),
    #[error("Loop count must be positive or -1 for infinite")]
    ZeroLoopCount,
    #[error("Invalid loop value {0}: use a positive count or -1 for infinite")]
    InvalidLoop(i64),
    #[error("Frame duration must be a positive number of seconds (got {0})")]
    InvalidFrameDuration(f64),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(&'static str),
}
