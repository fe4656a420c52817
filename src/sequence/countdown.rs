//! Countdown prelude shown before each loop iteration.

use crate::frame::{FrameBuffer, Rgb};
use crate::schema::SequenceConfig;

/// Countdown colors in display order, one second each.
pub const COUNTDOWN_COLORS: [Rgb; 4] = [Rgb::RED, Rgb::YELLOW, Rgb::GREEN, Rgb::BLACK];

/// Index into [`COUNTDOWN_COLORS`] for every countdown frame, in order.
///
/// Empty when the countdown is disabled, otherwise
/// [`SequenceConfig::countdown_block_len`] frames per color.
pub fn countdown_color_indices(config: &SequenceConfig) -> impl Iterator<Item = usize> {
    let block = if config.countdown_enabled {
        config.countdown_block_len()
    } else {
        0
    };
    (0..COUNTDOWN_COLORS.len()).flat_map(move |c| std::iter::repeat_n(c, block))
}

/// Build the four-second countdown: `fps` frames each of red, yellow, green
/// and black. Empty when the countdown is disabled.
pub fn create_countdown(width: u32, height: u32, config: &SequenceConfig) -> Vec<FrameBuffer> {
    let solids = COUNTDOWN_COLORS.map(|color| FrameBuffer::solid(width, height, color));
    countdown_color_indices(config)
        .map(|c| solids[c].clone())
        .collect()
}
