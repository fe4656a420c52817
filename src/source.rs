//! Still-image discovery and decoding.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::frame::FrameBuffer;

/// Extensions picked up as animation frames.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Filename fragments marking generated or auxiliary images.
pub const EXCLUDED_NAME_PATTERNS: [&str; 7] = [
    "visualization",
    "cluster_vis",
    "comparison",
    "config",
    "readme",
    "sample",
    "example",
];

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

fn is_excluded(name: &str) -> bool {
    let lower = name.to_lowercase();
    EXCLUDED_NAME_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Compare strings so embedded numbers order numerically (`img_2` < `img_10`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_digits(&mut a);
                let nb = take_digits(&mut b);
                let ord = compare_digits(&na, &nb);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(c) = it.next_if(|c| c.is_ascii_digit()) {
        out.push(c);
    }
    out
}

/// Numeric comparison of digit runs of any length.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Image files in `dir`, auxiliary images removed, in natural filename order.
pub fn image_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if !path.is_file() || !has_image_extension(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if is_excluded(name) {
            log::info!("Excluding file: {}", name);
            continue;
        }
        files.push(path);
    }

    files.sort_by(|a, b| {
        let name = |p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        natural_cmp(&name(a), &name(b))
    });
    Ok(files)
}

/// Decode an image file into an RGB frame, dropping any alpha.
pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<FrameBuffer> {
    let img = image::open(path.as_ref())?.to_rgb8();
    FrameBuffer::from_bytes(img.width(), img.height(), img.as_raw())
}

/// Decode every path; all images must share one size.
pub fn load_frames<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<FrameBuffer>> {
    let mut frames: Vec<FrameBuffer> = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        let frame = load_frame(path)?;
        if let Some(first) = frames.first() {
            if first.dimensions() != frame.dimensions() {
                return Err(Error::DimensionMismatch {
                    index,
                    expected: first.dimensions(),
                    found: frame.dimensions(),
                });
            }
        }
        log::debug!("Loaded {}", path.as_ref().display());
        frames.push(frame);
    }
    Ok(frames)
}

/// Write a frame as PNG.
pub fn save_png<P: AsRef<Path>>(frame: &FrameBuffer, path: P) -> Result<()> {
    image::save_buffer_with_format(
        path.as_ref(),
        frame.as_bytes(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )?;
    Ok(())
}
