//! Procedural color patterns for board tests and standalone containers.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::frame::{FrameBuffer, Rgb};

/// Length of one dissolve cycle in seconds: 2 s fade in, 1 s hold, 2 s fade out.
const DISSOLVE_CYCLE_SECONDS: usize = 5;

/// Predefined patterns that render straight to frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// A single color held for `frames` frames.
    Solid { color: Rgb, frames: usize },
    /// Cycle through `colors`, holding each for `frames_per_color`.
    Blink {
        colors: Vec<Rgb>,
        frames_per_color: usize,
        repeat: usize,
    },
    /// Repeated fade in / hold / fade out from black, padded with black to
    /// `frames`.
    Dissolve { color: Rgb, frames: usize },
    /// Random-interval fades, like a club strobe. Reproducible for a given
    /// `seed`.
    Psyche {
        color: Rgb,
        duration_secs: f32,
        #[serde(default = "default_min_interval")]
        min_interval: f32,
        #[serde(default = "default_max_interval")]
        max_interval: f32,
        #[serde(default = "default_fade")]
        fade_secs: f32,
        #[serde(default)]
        seed: u64,
    },
}

fn default_min_interval() -> f32 {
    1.0
}

fn default_max_interval() -> f32 {
    3.0
}

fn default_fade() -> f32 {
    0.3
}

impl Default for Pattern {
    fn default() -> Self {
        Pattern::Blink {
            colors: vec![Rgb::RED, Rgb::BLACK],
            frames_per_color: 10,
            repeat: 5,
        }
    }
}

impl Pattern {
    /// Render the pattern on a `width` x `height` board at `fps`.
    pub fn render(
        &self,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Vec<FrameBuffer>, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        if fps == 0 {
            return Err(ConfigError::InvalidFps);
        }
        let solid = |c: Rgb| FrameBuffer::solid(width, height, c);

        let frames = match self {
            Pattern::Solid { color, frames } => vec![solid(*color); *frames],
            Pattern::Blink {
                colors,
                frames_per_color,
                repeat,
            } => {
                let mut out = Vec::with_capacity(colors.len() * frames_per_color * repeat);
                for _ in 0..*repeat {
                    for &color in colors {
                        let frame = solid(color);
                        out.extend(std::iter::repeat_n(frame, *frames_per_color));
                    }
                }
                out
            }
            Pattern::Dissolve { color, frames } => dissolve(*color, *frames, fps as usize)
                .into_iter()
                .map(solid)
                .collect(),
            Pattern::Psyche {
                color,
                duration_secs,
                min_interval,
                max_interval,
                fade_secs,
                seed,
            } => {
                if !(*min_interval > 0.0 && min_interval <= max_interval) {
                    return Err(ConfigError::InvalidPattern(
                        "psyche intervals need 0 < min_interval <= max_interval",
                    ));
                }
                let mut rng = StdRng::seed_from_u64(*seed);
                psyche(
                    *color,
                    *duration_secs,
                    fps,
                    (*min_interval, *max_interval),
                    *fade_secs,
                    &mut rng,
                )
                .into_iter()
                .map(solid)
                .collect()
            }
        };
        Ok(frames)
    }
}

/// Brightness ramp of `steps` values going 0 -> 1 inclusive.
fn ramp(steps: usize) -> impl DoubleEndedIterator<Item = f32> {
    (0..steps).map(move |i| {
        if steps > 1 {
            i as f32 / (steps - 1) as f32
        } else {
            1.0
        }
    })
}

fn dissolve(color: Rgb, frame_count: usize, fps: usize) -> Vec<Rgb> {
    let fade = 2 * fps;
    let cycles = (frame_count / (DISSOLVE_CYCLE_SECONDS * fps)).max(1);

    let mut colors = Vec::with_capacity(frame_count.max(cycles * DISSOLVE_CYCLE_SECONDS * fps));
    for _ in 0..cycles {
        colors.extend(ramp(fade).map(|r| color.scaled(r)));
        colors.extend(std::iter::repeat_n(color, fps));
        colors.extend(ramp(fade).map(|r| color.scaled(1.0 - r)));
    }
    if colors.len() < frame_count {
        colors.resize(frame_count, Rgb::BLACK);
    }
    colors
}

fn psyche(
    color: Rgb,
    duration_secs: f32,
    fps: u32,
    (min_interval, max_interval): (f32, f32),
    fade_secs: f32,
    rng: &mut impl Rng,
) -> Vec<Rgb> {
    let fps_f = fps as f32;
    let target = (duration_secs * fps_f).max(0.0) as usize;
    let fade = (fade_secs * fps_f).max(0.0) as usize;

    let mut colors = Vec::with_capacity(target);
    while colors.len() < target {
        let interval = rng.gen_range(min_interval..=max_interval);
        let hold = ((interval * fps_f) as usize).saturating_sub(2 * fade).max(1);

        colors.extend(ramp(fade).rev().map(|r| color.scaled(r)));
        colors.extend(std::iter::repeat_n(Rgb::BLACK, hold));
        colors.extend(ramp(fade).map(|r| color.scaled(r)));
        colors.extend(std::iter::repeat_n(color, hold));
    }
    colors.truncate(target);
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_cycles_colors() {
        let pattern = Pattern::Blink {
            colors: vec![Rgb::GREEN, Rgb::BLACK],
            frames_per_color: 3,
            repeat: 2,
        };
        let frames = pattern.render(4, 4, 5).unwrap();
        assert_eq!(frames.len(), 12);
        let colors: Vec<_> = frames.iter().map(|f| f.solid_color().unwrap()).collect();
        assert_eq!(&colors[..3], &[Rgb::GREEN; 3]);
        assert_eq!(&colors[3..6], &[Rgb::BLACK; 3]);
        assert_eq!(colors[6], Rgb::GREEN);
    }

    #[test]
    fn test_dissolve_shape() {
        let colors = dissolve(Rgb::RED, 25, 5);
        assert_eq!(colors.len(), 25);
        assert_eq!(colors[0], Rgb::BLACK);
        assert_eq!(colors[9], Rgb::RED);
        // hold
        assert!(colors[10..15].iter().all(|c| *c == Rgb::RED));
        assert_eq!(colors[15], Rgb::RED);
        assert_eq!(colors[24], Rgb::BLACK);

        let padded = dissolve(Rgb::RED, 30, 5);
        assert_eq!(padded.len(), 30);
        assert!(padded[25..].iter().all(|c| *c == Rgb::BLACK));
    }

    #[test]
    fn test_dissolve_runs_at_least_one_cycle() {
        assert_eq!(dissolve(Rgb::GREEN, 3, 2).len(), 10);
    }

    #[test]
    fn test_psyche_is_exact_and_reproducible() {
        let pattern = Pattern::Psyche {
            color: Rgb::new(0, 0, 255),
            duration_secs: 10.0,
            min_interval: 1.0,
            max_interval: 3.0,
            fade_secs: 0.4,
            seed: 7,
        };
        let a = pattern.render(2, 2, 10).unwrap();
        let b = pattern.render(2, 2, 10).unwrap();
        assert_eq!(a.len(), 100);
        assert_eq!(a, b);
        // starts by fading out from full brightness
        assert_eq!(a[0].solid_color(), Some(Rgb::new(0, 0, 255)));
    }

    #[test]
    fn test_bad_intervals_rejected() {
        let pattern = Pattern::Psyche {
            color: Rgb::RED,
            duration_secs: 1.0,
            min_interval: 3.0,
            max_interval: 1.0,
            fade_secs: 0.1,
            seed: 0,
        };
        assert!(matches!(
            pattern.render(1, 1, 5),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_pattern_json() {
        let pattern: Pattern =
            serde_json::from_str(r#"{"type": "Solid", "color": [10, 20, 30], "frames": 4}"#)
                .unwrap();
        let frames = pattern.render(3, 2, 5).unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].pixel(2, 1), Some(Rgb::new(10, 20, 30)));
    }
}
