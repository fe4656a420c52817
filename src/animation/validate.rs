//! Structural validation and frame sampling for encoded containers.

use super::format::{ContainerHeader, ContainerTrailer, END_MARKER};
use super::reader::ContainerReader;
use crate::error::{Error, Result};
use crate::frame::FrameBuffer;

/// One structural defect found in a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect {
    /// File size differs from `32 + total_frames * frame_size`.
    SizeMismatch { expected: u64, actual: u64 },
    /// The 16 trailer bytes are not present where the header puts them.
    MissingTrailer,
    /// Trailer frame count disagrees with the header.
    FrameCountMismatch { header: u32, trailer: u32 },
    /// End marker is not `0xDEADBEEF`.
    BadEndMarker(u32),
}

impl std::fmt::Display for Defect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Defect::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {} bytes, found {}", expected, actual)
            }
            Defect::MissingTrailer => write!(f, "trailer missing"),
            Defect::FrameCountMismatch { header, trailer } => {
                write!(f, "header declares {} frames, trailer {}", header, trailer)
            }
            Defect::BadEndMarker(m) => {
                write!(f, "end marker 0x{:08X} (expected 0x{:08X})", m, END_MARKER)
            }
        }
    }
}

/// Result of checking a container. Every check runs independently so a
/// partially written file reports all of its defects at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationReport {
    pub header: ContainerHeader,
    pub trailer: Option<ContainerTrailer>,
    pub file_size: u64,
    pub expected_size: u64,
    /// `min(declared, floor((file_size - 32) / frame_size))`.
    pub usable_frames: u64,
}

impl ValidationReport {
    pub fn size_matches(&self) -> bool {
        self.file_size == self.expected_size
    }

    /// Header and trailer frame counts agree. False without a trailer.
    pub fn frame_counts_match(&self) -> bool {
        self.trailer
            .is_some_and(|t| t.total_frames == self.header.total_frames)
    }

    /// End marker equals `0xDEADBEEF`. False without a trailer.
    pub fn end_marker_valid(&self) -> bool {
        self.trailer.is_some_and(|t| t.end_marker_valid())
    }

    pub fn is_valid(&self) -> bool {
        self.size_matches() && self.frame_counts_match() && self.end_marker_valid()
    }

    /// All defects, in check order.
    pub fn defects(&self) -> Vec<Defect> {
        let mut defects = Vec::new();
        if !self.size_matches() {
            defects.push(Defect::SizeMismatch {
                expected: self.expected_size,
                actual: self.file_size,
            });
        }
        match self.trailer {
            None => defects.push(Defect::MissingTrailer),
            Some(t) => {
                if t.total_frames != self.header.total_frames {
                    defects.push(Defect::FrameCountMismatch {
                        header: self.header.total_frames,
                        trailer: t.total_frames,
                    });
                }
                if !t.end_marker_valid() {
                    defects.push(Defect::BadEndMarker(t.end_marker));
                }
            }
        }
        defects
    }

    /// Turn the first defect into an error for callers that need a strict
    /// pass/fail.
    ///
    /// A short file is `TruncatedFrame`, a long one `TrailingData`. Trailer
    /// count and marker defects are `CorruptTrailer`.
    pub fn ensure_valid(&self) -> Result<()> {
        let Some(defect) = self.defects().into_iter().next() else {
            return Ok(());
        };
        Err(match defect {
            Defect::SizeMismatch { expected, actual } if actual < expected => {
                Error::TruncatedFrame {
                    expected: usize::try_from(expected).unwrap_or(usize::MAX),
                    found: actual as usize,
                }
            }
            Defect::SizeMismatch { expected, actual } => Error::TrailingData {
                expected,
                found: actual,
            },
            Defect::MissingTrailer => {
                let offset = (ContainerHeader::SIZE as u64)
                    .saturating_add(self.header.frame_region_size());
                Error::TruncatedTrailer {
                    offset: usize::try_from(offset).unwrap_or(usize::MAX),
                    found: self.file_size.saturating_sub(offset) as usize,
                }
            }
            other @ (Defect::FrameCountMismatch { .. } | Defect::BadEndMarker(_)) => {
                Error::CorruptTrailer(other.to_string())
            }
        })
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = |ok: bool| if ok { "ok" } else { "FAIL" };
        writeln!(
            f,
            "Size: expected {} bytes, actual {} bytes [{}]",
            self.expected_size,
            self.file_size,
            mark(self.size_matches())
        )?;
        match &self.trailer {
            Some(t) => {
                writeln!(
                    f,
                    "Trailer frames: {} [{}]",
                    t.total_frames,
                    mark(self.frame_counts_match())
                )?;
                writeln!(f, "Save time: {}", t.save_time)?;
                write!(
                    f,
                    "End marker: 0x{:08X} [{}]",
                    t.end_marker,
                    mark(self.end_marker_valid())
                )
            }
            None => write!(f, "Trailer: missing [FAIL]"),
        }
    }
}

/// Check size, header/trailer frame counts and the end marker.
///
/// Only a missing header is an error; everything else lands in the report.
pub fn validate(bytes: &[u8]) -> Result<ValidationReport> {
    let header = ContainerHeader::decode(bytes)?;
    let trailer = ContainerTrailer::decode(bytes, header.frame_region_size()).ok();
    let file_size = bytes.len() as u64;

    let report = ValidationReport {
        header,
        trailer,
        file_size,
        expected_size: header.expected_file_size(),
        usable_frames: super::format::usable_frame_count(
            file_size,
            header.frame_size(),
            header.total_frames,
        ),
    };
    for defect in report.defects() {
        log::warn!("Container defect: {}", defect);
    }
    Ok(report)
}

/// Delay frames are solid black.
pub fn is_delay_frame(frame: &FrameBuffer) -> bool {
    frame.is_black()
}

/// A decoded frame picked for inspection.
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub index: u64,
    pub frame: FrameBuffer,
    pub is_delay: bool,
}

/// Validation report plus a handful of decoded frames.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub report: ValidationReport,
    pub samples: Vec<FrameSample>,
}

/// Indices sampled by [`inspect`]: first, 10th, 100th and last, clamped and
/// deduplicated.
pub fn sample_indices(frame_count: u64) -> Vec<u64> {
    if frame_count == 0 {
        return Vec::new();
    }
    let last = frame_count - 1;
    let mut indices = vec![0, 10.min(last), 100.min(last), last];
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Validate and decode sample frames from the usable region.
pub fn inspect(bytes: &[u8]) -> Result<Inspection> {
    let report = validate(bytes)?;
    let reader = ContainerReader::new(bytes)?;

    let samples = sample_indices(reader.usable_frame_count())
        .into_iter()
        .map(|index| {
            let frame = reader.frame(index)?;
            Ok(FrameSample {
                index,
                is_delay: is_delay_frame(&frame),
                frame,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Inspection { report, samples })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::encode;
    use crate::frame::Rgb;

    fn sample_container() -> Vec<u8> {
        let mut frames = vec![FrameBuffer::solid(3, 3, Rgb::GREEN); 4];
        frames.push(FrameBuffer::black(3, 3));
        encode(&frames, 5).unwrap()
    }

    #[test]
    fn test_valid_container() {
        let report = validate(&sample_container()).unwrap();
        assert!(report.is_valid());
        assert!(report.defects().is_empty());
        assert_eq!(report.usable_frames, 5);
        assert!(report.ensure_valid().is_ok());
    }

    #[test]
    fn test_truncated_by_one_byte() {
        let bytes = sample_container();
        let report = validate(&bytes[..bytes.len() - 1]).unwrap();
        assert!(!report.size_matches());
        assert!(!report.is_valid());
        assert_eq!(
            report.defects()[0],
            Defect::SizeMismatch {
                expected: bytes.len() as u64,
                actual: bytes.len() as u64 - 1
            }
        );
        assert!(report.defects().contains(&Defect::MissingTrailer));
    }

    #[test]
    fn test_flipped_end_marker() {
        let mut bytes = sample_container();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let report = validate(&bytes).unwrap();
        assert!(report.size_matches());
        assert!(report.frame_counts_match());
        assert!(!report.end_marker_valid());
        assert!(matches!(
            report.ensure_valid(),
            Err(Error::CorruptTrailer(_))
        ));
    }

    #[test]
    fn test_defects_reported_together() {
        let mut bytes = sample_container();
        let trailer_at = bytes.len() - 16;
        bytes[trailer_at] = 99;
        let last = bytes.len() - 1;
        bytes[last] = 0;
        bytes.push(0);

        let report = validate(&bytes).unwrap();
        let defects = report.defects();
        assert_eq!(defects.len(), 3);
        assert!(matches!(defects[0], Defect::SizeMismatch { .. }));
        assert_eq!(
            defects[1],
            Defect::FrameCountMismatch {
                header: 5,
                trailer: 99
            }
        );
        assert!(matches!(defects[2], Defect::BadEndMarker(_)));
    }

    #[test]
    fn test_sample_indices() {
        assert_eq!(sample_indices(0), Vec::<u64>::new());
        assert_eq!(sample_indices(1), vec![0]);
        assert_eq!(sample_indices(5), vec![0, 4]);
        assert_eq!(sample_indices(50), vec![0, 10, 49]);
        assert_eq!(sample_indices(18_000), vec![0, 10, 100, 17_999]);
    }

    #[test]
    fn test_inspect_marks_delay_frames() {
        let inspection = inspect(&sample_container()).unwrap();
        assert_eq!(inspection.samples.len(), 2);
        assert!(!inspection.samples[0].is_delay);
        assert_eq!(inspection.samples[1].index, 4);
        assert!(inspection.samples[1].is_delay);
    }

    #[test]
    fn test_is_delay_frame() {
        assert!(is_delay_frame(&FrameBuffer::black(2, 2)));
        let mut pixels = vec![Rgb::BLACK; 4];
        pixels[3] = Rgb::new(0, 0, 1);
        assert!(!is_delay_frame(&FrameBuffer::new(2, 2, pixels).unwrap()));
    }

    #[test]
    fn test_ensure_valid_maps_size_defects() {
        let bytes = sample_container();
        assert!(matches!(
            validate(&bytes[..bytes.len() - 1]).unwrap().ensure_valid(),
            Err(Error::TruncatedFrame { .. })
        ));

        let mut long = bytes.clone();
        long.extend_from_slice(&[0, 0]);
        let report = validate(&long).unwrap();
        assert!(report.frame_counts_match());
        assert!(report.end_marker_valid());
        assert!(matches!(
            report.ensure_valid(),
            Err(Error::TrailingData { expected, found })
                if expected == bytes.len() as u64 && found == long.len() as u64
        ));
    }

    #[test]
    fn test_garbage_header_reports_defects() {
        let mut bytes = vec![0xFF; 16];
        bytes.extend_from_slice(&[0; 16]);

        let report = validate(&bytes).unwrap();
        assert_eq!(report.expected_size, u64::MAX);
        assert_eq!(report.usable_frames, 0);
        assert!(!report.is_valid());
        assert_eq!(
            report.defects(),
            vec![
                Defect::SizeMismatch {
                    expected: u64::MAX,
                    actual: 32
                },
                Defect::MissingTrailer
            ]
        );
        assert!(matches!(
            report.ensure_valid(),
            Err(Error::TruncatedFrame { .. })
        ));
        assert!(report.to_string().contains("Trailer: missing"));

        let inspection = inspect(&bytes).unwrap();
        assert!(inspection.samples.is_empty());
    }
}
