//! Container encoding, decoding and validation for LED board animations.
//!
//! # File Format
//!
//! A container is a flat little-endian byte sequence:
//!
//! ```text
//! Header (16 bytes):
//!   Total frames: u32
//!   Height: u32
//!   Width: u32
//!   FPS: u32
//!
//! Frame data (total_frames * height * width * 3 bytes):
//!   Row-major pixels, R, G, B per pixel
//!
//! Trailer (16 bytes):
//!   Total frames: u32 (must match header)
//!   Save time: u64 (unix seconds)
//!   End marker: u32 (0xDEADBEEF)
//! ```
//!
//! A well-formed file is exactly `32 + total_frames * height * width * 3`
//! bytes long.

mod encoder;
mod format;
mod reader;
mod validate;

pub use encoder::{ContainerWriter, EncodeStats, encode, encode_into, write_container};
pub use format::{
    BYTES_PER_PIXEL, ContainerHeader, ContainerTrailer, END_MARKER, decode_frame, decode_header,
    decode_trailer, usable_frame_count,
};
pub use reader::{ContainerInfo, ContainerReader, FrameIterator};
pub use validate::{
    Defect, FrameSample, Inspection, ValidationReport, inspect, is_delay_frame, sample_indices,
    validate,
};
