//! Expansion of still frames into the final loop/delay/countdown sequence.

use std::path::Path;

use super::countdown::{COUNTDOWN_COLORS, countdown_color_indices};
use crate::animation::{self, EncodeStats};
use crate::error::{Error, Result};
use crate::frame::FrameBuffer;
use crate::schema::{LoopMode, SequenceConfig};

/// Where an output frame comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSlot {
    /// Countdown block, indexing [`COUNTDOWN_COLORS`].
    Countdown(usize),
    /// Still image by input index.
    Still(usize),
    /// Black gap between iterations.
    Delay,
}

/// Ordered frame layout, independent of pixel data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequencePlan {
    slots: Vec<FrameSlot>,
    /// Complete iterations emitted.
    pub loops: usize,
    /// Countdown + stills + delay of one iteration.
    pub frames_per_loop: usize,
    /// Still frames appended to reach the infinite-loop target.
    pub fill_frames: usize,
}

impl SequencePlan {
    /// Lay out `still_count` images according to `config`.
    ///
    /// Finite loops emit the iteration `N` times. Infinite loops emit
    /// `floor(target / frames_per_loop)` iterations and then cycle the stills
    /// until exactly [`SequenceConfig::infinite_target_frames`] frames exist.
    /// No delay follows the last iteration in either case. No stills means
    /// an empty plan.
    ///
    /// Fails with `TooManyFrames` before allocating when the result would
    /// not fit the container's `u32` frame count.
    pub fn build(still_count: usize, config: &SequenceConfig) -> Result<Self> {
        config.validate()?;
        if still_count == 0 {
            return Ok(Self::default());
        }

        let per_image = config.frames_per_image();
        let base_len = still_count.checked_mul(per_image).ok_or(Error::TooManyFrames)?;
        let countdown_len = config.countdown_frame_count();
        let delay = config.delay_frame_count();
        let frames_per_loop = countdown_len
            .checked_add(base_len)
            .and_then(|n| n.checked_add(delay))
            .ok_or(Error::TooManyFrames)?;

        let (loops, total) = match config.loop_mode {
            LoopMode::Finite(n) => {
                let n = n.get() as usize;
                let total = n.checked_mul(frames_per_loop).ok_or(Error::TooManyFrames)? - delay;
                (n, total)
            }
            LoopMode::Infinite => {
                let target = config.infinite_target_frames();
                (target / frames_per_loop, target)
            }
        };
        if total > u32::MAX as usize {
            return Err(Error::TooManyFrames);
        }
        log::info!(
            "Sequence: {} loop(s), {} frames per loop (countdown: {}, stills: {}, delay: {})",
            loops,
            frames_per_loop,
            countdown_len,
            base_len,
            delay
        );

        let base = |k: usize| FrameSlot::Still(k / per_image);
        let mut slots = Vec::with_capacity(total);
        for i in 0..loops {
            slots.extend(countdown_color_indices(config).map(FrameSlot::Countdown));
            slots.extend((0..base_len).map(base));
            if i + 1 < loops {
                slots.extend(std::iter::repeat_n(FrameSlot::Delay, delay));
            }
        }

        let fill_frames = total - slots.len();
        if fill_frames > 0 {
            log::info!("Adding {} frames to reach exactly one hour", fill_frames);
            slots.extend((0..fill_frames).map(|k| base(k % base_len)));
        }

        Ok(Self {
            slots,
            loops,
            frames_per_loop,
            fill_frames,
        })
    }

    pub fn slots(&self) -> &[FrameSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Assembled sequence: the still frames, the solid frames it needs and the
/// plan that orders them. Frames are shared, not copied, until
/// [`to_frames`](Self::to_frames) is called.
#[derive(Debug, Clone)]
pub struct Sequence {
    stills: Vec<FrameBuffer>,
    /// One solid frame per countdown color; the black one doubles as delay.
    solids: Vec<FrameBuffer>,
    plan: SequencePlan,
    fps: u32,
}

impl Sequence {
    /// Validate inputs and build the plan.
    pub fn assemble(stills: Vec<FrameBuffer>, config: &SequenceConfig) -> Result<Self> {
        let solids = match stills.first() {
            Some(first) => {
                let dims = first.dimensions();
                if let Some((index, frame)) = stills
                    .iter()
                    .enumerate()
                    .find(|(_, f)| f.dimensions() != dims)
                {
                    return Err(Error::DimensionMismatch {
                        index,
                        expected: dims,
                        found: frame.dimensions(),
                    });
                }
                COUNTDOWN_COLORS
                    .iter()
                    .map(|&c| FrameBuffer::solid(dims.0, dims.1, c))
                    .collect()
            }
            None => Vec::new(),
        };
        let plan = SequencePlan::build(stills.len(), config)?;

        Ok(Self {
            stills,
            solids,
            plan,
            fps: config.fps,
        })
    }

    pub fn plan(&self) -> &SequencePlan {
        &self.plan
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn len(&self) -> usize {
        self.plan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    fn resolve(&self, slot: FrameSlot) -> &FrameBuffer {
        match slot {
            FrameSlot::Still(i) => &self.stills[i],
            FrameSlot::Countdown(c) => &self.solids[c],
            FrameSlot::Delay => &self.solids[COUNTDOWN_COLORS.len() - 1],
        }
    }

    /// Output frames in order.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = &FrameBuffer> + '_ {
        self.plan.slots.iter().map(|&slot| self.resolve(slot))
    }

    /// Materialize the frame list.
    pub fn to_frames(&self) -> Vec<FrameBuffer> {
        self.frames().cloned().collect()
    }

    /// Encode into an in-memory container.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(Error::EmptyInput);
        }
        let (cursor, _) =
            animation::encode_into(std::io::Cursor::new(Vec::new()), self.frames(), self.fps)?;
        Ok(cursor.into_inner())
    }

    /// Encode into a container file. Nothing is written for an empty
    /// sequence.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<EncodeStats> {
        if self.is_empty() {
            return Err(Error::EmptyInput);
        }
        animation::write_container(path, self.frames(), self.fps)
    }
}

/// Expand `stills` into the final ordered frame list.
pub fn assemble(stills: Vec<FrameBuffer>, config: &SequenceConfig) -> Result<Vec<FrameBuffer>> {
    Ok(Sequence::assemble(stills, config)?.to_frames())
}
