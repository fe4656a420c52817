//! Binary layout of the LED board container.

use std::io::{self, Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};
use crate::frame::FrameBuffer;

/// Constant closing every well-formed container.
pub const END_MARKER: u32 = 0xDEAD_BEEF;

/// Bytes per pixel in the frame region (R, G, B).
pub const BYTES_PER_PIXEL: u64 = 3;

#[inline]
fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[inline]
fn le_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

/// Container header: four little-endian `u32`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Declared number of frames.
    pub total_frames: u32,
    pub height: u32,
    pub width: u32,
    pub fps: u32,
}

impl ContainerHeader {
    /// Size of header in bytes.
    /// TotalFrames(4) + Height(4) + Width(4) + Fps(4) = 16
    pub const SIZE: usize = 16;

    /// Bytes of one frame: `height * width * 3`.
    ///
    /// Sizes saturate at `u64::MAX`; no file can be that long, so a
    /// saturated size always fails the size and bounds checks.
    pub fn frame_size(&self) -> u64 {
        frame_size(self.height, self.width)
    }

    /// Bytes of the declared frame region.
    pub fn frame_region_size(&self) -> u64 {
        (self.total_frames as u64).saturating_mul(self.frame_size())
    }

    /// File size implied by the header.
    pub fn expected_file_size(&self) -> u64 {
        ((Self::SIZE + ContainerTrailer::SIZE) as u64).saturating_add(self.frame_region_size())
    }

    /// Byte offset of frame `index`.
    pub fn frame_offset(&self, index: u64) -> u64 {
        (Self::SIZE as u64).saturating_add(index.saturating_mul(self.frame_size()))
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.total_frames.to_le_bytes());
        out[4..8].copy_from_slice(&self.height.to_le_bytes());
        out[8..12].copy_from_slice(&self.width.to_le_bytes());
        out[12..16].copy_from_slice(&self.fps.to_le_bytes());
        out
    }

    /// Write header to output.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Read header from input.
    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        r.read_exact(&mut buf)?;
        Ok(Self::parse(&buf))
    }

    /// Decode the header at the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(Error::TruncatedHeader { found: bytes.len() });
        }
        Ok(Self::parse(bytes))
    }

    fn parse(bytes: &[u8]) -> Self {
        Self {
            total_frames: le_u32(bytes, 0),
            height: le_u32(bytes, 4),
            width: le_u32(bytes, 8),
            fps: le_u32(bytes, 12),
        }
    }
}

/// Container trailer: frame count check, save time and end marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerTrailer {
    /// Must equal the header's `total_frames`.
    pub total_frames: u32,
    /// Unix seconds at encode time. Informational only.
    pub save_time: u64,
    pub end_marker: u32,
}

impl ContainerTrailer {
    /// TotalFrames(4) + SaveTime(8) + EndMarker(4) = 16
    pub const SIZE: usize = 16;

    /// Trailer stamped with the given save time.
    pub fn new(total_frames: u32, save_time: u64) -> Self {
        Self {
            total_frames,
            save_time,
            end_marker: END_MARKER,
        }
    }

    /// Trailer stamped with the current wall-clock time.
    pub fn now(total_frames: u32) -> Self {
        Self::new(total_frames, unix_now())
    }

    pub fn end_marker_valid(&self) -> bool {
        self.end_marker == END_MARKER
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.total_frames.to_le_bytes());
        out[4..12].copy_from_slice(&self.save_time.to_le_bytes());
        out[12..16].copy_from_slice(&self.end_marker.to_le_bytes());
        out
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Decode the trailer that follows a frame region of `frame_region_size`
    /// bytes.
    pub fn decode(bytes: &[u8], frame_region_size: u64) -> Result<Self> {
        let offset = (ContainerHeader::SIZE as u64).saturating_add(frame_region_size);
        let available = (bytes.len() as u64).saturating_sub(offset);
        if available < Self::SIZE as u64 {
            return Err(Error::TruncatedTrailer {
                offset: usize::try_from(offset).unwrap_or(usize::MAX),
                found: available as usize,
            });
        }
        // offset + SIZE <= len, so offset fits in usize
        let at = offset as usize;
        Ok(Self {
            total_frames: le_u32(bytes, at),
            save_time: le_u64(bytes, at + 4),
            end_marker: le_u32(bytes, at + 12),
        })
    }
}

/// `height * width * 3`, saturating.
fn frame_size(height: u32, width: u32) -> u64 {
    (height as u64 * width as u64).saturating_mul(BYTES_PER_PIXEL)
}

/// Seconds since the Unix epoch; zero if the clock is before it.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Read `(total_frames, height, width, fps)` from the first 16 bytes.
pub fn decode_header(bytes: &[u8]) -> Result<ContainerHeader> {
    ContainerHeader::decode(bytes)
}

/// Read the trailer following `frame_region_size` bytes of frame data.
pub fn decode_trailer(bytes: &[u8], frame_region_size: u64) -> Result<ContainerTrailer> {
    ContainerTrailer::decode(bytes, frame_region_size)
}

/// Decode frame `index` of a `width` x `height` container.
///
/// The last 16 bytes are reserved for the trailer. A frame that starts
/// beyond the reserved boundary is `OutOfRange`; one that starts inside it
/// but runs past is `TruncatedFrame`.
pub fn decode_frame(bytes: &[u8], index: u64, height: u32, width: u32) -> Result<FrameBuffer> {
    let frame_size = frame_size(height, width);
    let available = (bytes.len() as u64).saturating_sub(ContainerTrailer::SIZE as u64);
    let offset = index
        .saturating_mul(frame_size)
        .saturating_add(ContainerHeader::SIZE as u64);

    if offset >= available {
        let usable = usable_frame_count(bytes.len() as u64, frame_size, u32::MAX);
        return Err(Error::OutOfRange {
            index,
            available: usable,
        });
    }
    let end = offset.saturating_add(frame_size);
    if end > available {
        return Err(Error::TruncatedFrame {
            expected: usize::try_from(frame_size).unwrap_or(usize::MAX),
            found: (available - offset) as usize,
        });
    }
    FrameBuffer::from_bytes(width, height, &bytes[offset as usize..end as usize])
}

/// Frames actually present: `min(declared, floor((file_size - 32) / frame_size))`.
pub fn usable_frame_count(file_size: u64, frame_size: u64, declared: u32) -> u64 {
    if frame_size == 0 {
        return 0;
    }
    let overhead = (ContainerHeader::SIZE + ContainerTrailer::SIZE) as u64;
    let on_disk = file_size.saturating_sub(overhead) / frame_size;
    on_disk.min(declared as u64)
}
