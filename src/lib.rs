//! Pixelbin - still images to LED board animation containers.
//!
//! This crate turns a directory of same-sized still images into the fixed
//! layout binary container played by RGB LED matrix boards, and reads those
//! containers back for validation and inspection.
//!
//! # Architecture
//!
//! - `frame`: the immutable RGB [`FrameBuffer`]
//! - `schema`: loop/delay/countdown configuration and procedural patterns
//! - `sequence`: expands stills into the exact ordered frame stream
//! - `animation`: container encoding, decoding and validation
//! - `source` / `project`: image loading and directory builds
//!
//! # Example
//!
//! ```rust,no_run
//! use pixelbin::{
//!     animation::{ContainerReader, validate},
//!     frame::{FrameBuffer, Rgb},
//!     schema::{LoopMode, SequenceConfig},
//!     sequence::Sequence,
//! };
//!
//! let stills = vec![
//!     FrameBuffer::solid(12, 12, Rgb::RED),
//!     FrameBuffer::solid(12, 12, Rgb::GREEN),
//! ];
//! let config = SequenceConfig {
//!     loop_mode: LoopMode::finite(3).unwrap(),
//!     ..Default::default()
//! };
//!
//! let sequence = Sequence::assemble(stills, &config)?;
//! let bytes = sequence.encode()?;
//!
//! assert!(validate(&bytes)?.is_valid());
//! let reader = ContainerReader::new(&bytes)?;
//! println!("{} frames", reader.usable_frame_count());
//! # Ok::<(), pixelbin::Error>(())
//! ```

pub mod animation;
pub mod error;
pub mod frame;
pub mod project;
pub mod schema;
pub mod sequence;
pub mod source;

// Re-export commonly used types
pub use error::{Error, Result};
pub use frame::{FrameBuffer, Rgb};
pub use schema::{LoopMode, ProjectConfig, SequenceConfig};
pub use sequence::{Sequence, assemble};
