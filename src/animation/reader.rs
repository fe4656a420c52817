//! Container reader for inspecting and playing back encoded sequences.

use super::format::{ContainerHeader, ContainerTrailer, decode_frame, usable_frame_count};
use crate::error::{Error, Result};
use crate::frame::FrameBuffer;
use crate::schema::ConfigError;

/// Random-access reader over an in-memory container.
///
/// Tolerates files whose frame region is shorter than the header declares:
/// [`usable_frame_count`](Self::usable_frame_count) reports what is really
/// present and every frame below it can be decoded.
///
/// Usage:
/// ```ignore
/// let bytes = std::fs::read("watermelon_sequence.bin")?;
/// let reader = ContainerReader::new(&bytes)?;
/// println!("{} frames", reader.usable_frame_count());
///
/// let frame = reader.frame(100)?;
/// for frame in reader.frames() {
///     let frame = frame?;
///     // Send to the board...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContainerReader<'a> {
    bytes: &'a [u8],
    header: ContainerHeader,
    usable_frames: u64,
}

impl<'a> ContainerReader<'a> {
    /// Parse the header. Zero dimensions are rejected since no frame could
    /// be addressed.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let header = ContainerHeader::decode(bytes)?;
        if header.width == 0 || header.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: header.width,
                height: header.height,
            }
            .into());
        }
        let usable_frames =
            usable_frame_count(bytes.len() as u64, header.frame_size(), header.total_frames);
        if usable_frames < header.total_frames as u64 {
            log::warn!(
                "Container declares {} frames but only {} are present",
                header.total_frames,
                usable_frames
            );
        }
        Ok(Self {
            bytes,
            header,
            usable_frames,
        })
    }

    /// Get container header.
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    /// Frame count declared in the header.
    pub fn frame_count(&self) -> u32 {
        self.header.total_frames
    }

    /// Frames that can actually be decoded.
    pub fn usable_frame_count(&self) -> u64 {
        self.usable_frames
    }

    /// True when fewer frames are present than declared.
    pub fn is_truncated(&self) -> bool {
        self.usable_frames < self.header.total_frames as u64
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.header.width, self.header.height)
    }

    pub fn fps(&self) -> u32 {
        self.header.fps
    }

    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Read a specific frame by index.
    pub fn frame(&self, index: u64) -> Result<FrameBuffer> {
        if index >= self.usable_frames {
            return Err(Error::OutOfRange {
                index,
                available: self.usable_frames,
            });
        }
        decode_frame(self.bytes, index, self.header.height, self.header.width)
    }

    /// Trailer at the position the header implies.
    pub fn trailer(&self) -> Result<ContainerTrailer> {
        ContainerTrailer::decode(self.bytes, self.header.frame_region_size())
    }

    /// Decode every usable frame.
    pub fn decode_all(&self) -> Result<Vec<FrameBuffer>> {
        self.frames().collect()
    }

    /// Create an iterator over all usable frames.
    pub fn frames(&self) -> FrameIterator<'a> {
        FrameIterator {
            reader: *self,
            current: 0,
        }
    }

    /// Summary for display.
    pub fn info(&self) -> ContainerInfo {
        ContainerInfo {
            header: self.header,
            file_size: self.file_size(),
            usable_frames: self.usable_frames,
        }
    }
}

/// Iterator over container frames.
pub struct FrameIterator<'a> {
    reader: ContainerReader<'a>,
    current: u64,
}

impl Iterator for FrameIterator<'_> {
    type Item = Result<FrameBuffer>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.reader.usable_frames {
            return None;
        }

        let result = self.reader.frame(self.current);
        self.current += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.reader.usable_frames - self.current) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameIterator<'_> {}

/// Header facts plus what the file really holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo {
    pub header: ContainerHeader,
    pub file_size: u64,
    pub usable_frames: u64,
}

impl ContainerInfo {
    /// Playback length of the usable frames in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.header.fps == 0 {
            0.0
        } else {
            self.usable_frames as f64 / self.header.fps as f64
        }
    }
}

impl std::fmt::Display for ContainerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total frames (header): {}", self.header.total_frames)?;
        writeln!(f, "Usable frames: {}", self.usable_frames)?;
        writeln!(f, "Dimensions: {}x{}", self.header.width, self.header.height)?;
        writeln!(f, "FPS: {}", self.header.fps)?;
        writeln!(f, "Duration: {:.1} seconds", self.duration_secs())?;
        write!(f, "File size: {} bytes", self.file_size)
    }
}
