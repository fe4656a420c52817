//! Container writer for encoding frame sequences.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;

use super::format::{ContainerHeader, ContainerTrailer, unix_now};
use crate::error::{Error, Result};
use crate::frame::FrameBuffer;
use crate::schema::ConfigError;

/// Streaming container writer.
///
/// The header is written as a placeholder and rewritten by [`finish`] once
/// the frame count is known, so frames never need to be held in memory.
///
/// Usage:
/// ```ignore
/// let mut writer = ContainerWriter::new(File::create("out.bin")?, 5)?;
/// for frame in &frames {
///     writer.write_frame(frame)?;
/// }
/// let (_, stats) = writer.finish()?;
/// ```
///
/// [`finish`]: ContainerWriter::finish
pub struct ContainerWriter<W: Write + Seek> {
    writer: W,
    start: u64,
    header: ContainerHeader,
    save_time: Option<u64>,
    frames_written: u32,
}

impl<W: Write + Seek> ContainerWriter<W> {
    /// Start a container at the writer's current position.
    pub fn new(mut writer: W, fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(ConfigError::InvalidFps.into());
        }
        let start = writer.stream_position()?;

        let header = ContainerHeader {
            total_frames: 0, // Will be updated on finish
            height: 0,
            width: 0,
            fps,
        };
        header.write_to(&mut writer)?;

        Ok(Self {
            writer,
            start,
            header,
            save_time: None,
            frames_written: 0,
        })
    }

    /// Stamp the trailer with a fixed save time instead of the clock.
    pub fn with_save_time(mut self, save_time: u64) -> Self {
        self.save_time = Some(save_time);
        self
    }

    /// Append one frame. The first frame fixes the container dimensions.
    pub fn write_frame(&mut self, frame: &FrameBuffer) -> Result<()> {
        if self.frames_written == 0 {
            self.header.width = frame.width();
            self.header.height = frame.height();
        } else if frame.dimensions() != (self.header.width, self.header.height) {
            return Err(Error::DimensionMismatch {
                index: self.frames_written as usize,
                expected: (self.header.width, self.header.height),
                found: frame.dimensions(),
            });
        }
        let next = self
            .frames_written
            .checked_add(1)
            .ok_or(Error::TooManyFrames)?;

        self.writer.write_all(frame.as_bytes())?;
        self.frames_written = next;
        Ok(())
    }

    /// Get number of frames written so far.
    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }

    /// Write the trailer, patch the header and hand back the writer.
    pub fn finish(mut self) -> Result<(W, EncodeStats)> {
        if self.frames_written == 0 {
            return Err(Error::EmptyInput);
        }
        self.header.total_frames = self.frames_written;

        let save_time = self.save_time.unwrap_or_else(unix_now);
        ContainerTrailer::new(self.frames_written, save_time).write_to(&mut self.writer)?;
        let end = self.writer.stream_position()?;

        self.writer.seek(SeekFrom::Start(self.start))?;
        self.header.write_to(&mut self.writer)?;
        self.writer.seek(SeekFrom::Start(end))?;
        self.writer.flush()?;

        let stats = EncodeStats {
            frame_count: self.frames_written,
            width: self.header.width,
            height: self.header.height,
            fps: self.header.fps,
            total_bytes: end - self.start,
        };
        log::debug!("Encoded container: {}", stats);
        Ok((self.writer, stats))
    }
}

/// Summary of an encoded container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeStats {
    pub frame_count: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub total_bytes: u64,
}

impl EncodeStats {
    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frame_count as f64 / self.fps as f64
    }
}

impl std::fmt::Display for EncodeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames, {}x{} @ {} fps ({:.1} s), {} bytes total",
            self.frame_count,
            self.width,
            self.height,
            self.fps,
            self.duration_secs(),
            self.total_bytes
        )
    }
}

/// Encode frames into an in-memory container.
pub fn encode(frames: &[FrameBuffer], fps: u32) -> Result<Vec<u8>> {
    if frames.is_empty() {
        return Err(Error::EmptyInput);
    }
    let capacity =
        ContainerHeader::SIZE + frames.len() * frames[0].byte_len() + ContainerTrailer::SIZE;
    let (bytes, _) = encode_into(Cursor::new(Vec::with_capacity(capacity)), frames, fps)?;
    Ok(bytes.into_inner())
}

/// Encode any sequence of frames into `writer`.
pub fn encode_into<'a, W, I>(writer: W, frames: I, fps: u32) -> Result<(W, EncodeStats)>
where
    W: Write + Seek,
    I: IntoIterator<Item = &'a FrameBuffer>,
{
    let mut container = ContainerWriter::new(writer, fps)?;
    for frame in frames {
        container.write_frame(frame)?;
    }
    container.finish()
}

/// Encode frames straight to a file at `path`.
///
/// Nothing is created for an empty input or a zero fps. If encoding fails
/// part way through, the partial file is removed.
pub fn write_container<'a, P, I>(path: P, frames: I, fps: u32) -> Result<EncodeStats>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a FrameBuffer>,
{
    let path = path.as_ref();
    if fps == 0 {
        return Err(ConfigError::InvalidFps.into());
    }
    let mut frames = frames.into_iter().peekable();
    if frames.peek().is_none() {
        return Err(Error::EmptyInput);
    }

    let file = File::create(path)?;
    match encode_into(BufWriter::new(file), frames, fps) {
        Ok((_, stats)) => {
            log::info!("Saved {} frame(s) to {}", stats.frame_count, path.display());
            Ok(stats)
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(path) {
                log::warn!("Could not remove partial {}: {}", path.display(), rm);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Rgb;
    use tempfile::tempdir;

    #[test]
    fn test_two_red_frames_layout() {
        let frames = vec![FrameBuffer::solid(2, 2, Rgb::RED); 2];
        let bytes = encode(&frames, 1).unwrap();
        assert_eq!(bytes.len(), 16 + 2 * (2 * 2 * 3) + 16);

        let header = ContainerHeader::decode(&bytes).unwrap();
        assert_eq!(
            header,
            ContainerHeader {
                total_frames: 2,
                height: 2,
                width: 2,
                fps: 1
            }
        );
        assert_eq!(&bytes[16..19], &[255, 0, 0]);

        let trailer = ContainerTrailer::decode(&bytes, header.frame_region_size()).unwrap();
        assert_eq!(trailer.total_frames, 2);
        assert!(trailer.end_marker_valid());
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(encode(&[], 5), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_zero_fps() {
        let frames = vec![FrameBuffer::black(1, 1)];
        assert!(matches!(
            encode(&frames, 0),
            Err(Error::InvalidConfig(ConfigError::InvalidFps))
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let frames = vec![FrameBuffer::black(2, 2), FrameBuffer::black(3, 2)];
        let err = encode(&frames, 5).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                index: 1,
                expected: (2, 2),
                found: (3, 2)
            }
        ));
    }

    #[test]
    fn test_fixed_save_time() {
        let frames = [FrameBuffer::black(1, 1)];
        let mut writer = ContainerWriter::new(Cursor::new(Vec::new()), 5)
            .unwrap()
            .with_save_time(42);
        writer.write_frame(&frames[0]).unwrap();
        let (cursor, stats) = writer.finish().unwrap();
        let bytes = cursor.into_inner();

        assert_eq!(stats.total_bytes, bytes.len() as u64);
        let trailer = ContainerTrailer::decode(&bytes, 3).unwrap();
        assert_eq!(trailer.save_time, 42);
    }

    #[test]
    fn test_write_container_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.bin");

        let frames = vec![FrameBuffer::solid(12, 12, Rgb::GREEN); 10];
        let stats = write_container(&path, &frames, 5).unwrap();
        assert_eq!(stats.frame_count, 10);
        assert_eq!(stats.duration_secs(), 2.0);

        let metadata = fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), 32 + 10 * 12 * 12 * 3);
        assert_eq!(metadata.len(), stats.total_bytes);
    }

    #[test]
    fn test_write_container_empty_leaves_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.bin");

        let frames: Vec<FrameBuffer> = Vec::new();
        assert!(matches!(
            write_container(&path, &frames, 5),
            Err(Error::EmptyInput)
        ));
        assert!(matches!(
            write_container(&path, &[FrameBuffer::black(1, 1)], 0),
            Err(Error::InvalidConfig(ConfigError::InvalidFps))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_container_removes_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.bin");

        let frames = vec![
            FrameBuffer::black(2, 2),
            FrameBuffer::black(2, 2),
            FrameBuffer::black(3, 2),
        ];
        assert!(matches!(
            write_container(&path, &frames, 5),
            Err(Error::DimensionMismatch { index: 2, .. })
        ));
        assert!(!path.exists());
    }
}
