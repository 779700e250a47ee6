//! Gallery of accepted uploads
//!
//! Accepted images are re-encoded as JPEG and written as
//! `<prefix>_<YYYYMMDD-HHMMSS>.jpg`. Further uploads within the same second
//! get a zero-padded `_002`, `_003`, … before the extension, so name-descending
//! order still reflects recency. All operations are synchronous file I/O.

use std::fs::OpenOptions;
use std::io::{Cursor, ErrorKind, Write};
use std::path::{Path, PathBuf};

use breedid_common::time::format_stamp;
use breedid_common::{Error, Result};
use chrono::{DateTime, TimeZone};
use image::{ImageFormat, RgbImage};
use tracing::debug;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Same-second uploads per stamp; the padded suffix must not outgrow 3 digits
const MAX_PER_SECOND: u32 = 999;

/// Directory-backed image gallery
#[derive(Debug, Clone)]
pub struct Gallery {
    dir: PathBuf,
    prefix: String,
}

impl Gallery {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for the `n`th upload within one second (1-based)
    pub fn file_name_for(&self, stamp: &str, n: u32) -> String {
        if n <= 1 {
            format!("{}_{}.jpg", self.prefix, stamp)
        } else {
            format!("{}_{}_{:03}.jpg", self.prefix, stamp, n)
        }
    }

    /// Encode `image` as JPEG and store it under a unique time-stamped name
    ///
    /// Creates the directory on first use. Returns the written path.
    pub fn save<Tz: TimeZone>(&self, image: &RgbImage, at: &DateTime<Tz>) -> Result<PathBuf>
    where
        Tz::Offset: std::fmt::Display,
    {
        std::fs::create_dir_all(&self.dir)?;

        let encoded = encode_jpeg(image)?;

        let stamp = format_stamp(at);
        for n in 1..=MAX_PER_SECOND {
            let path = self.dir.join(self.file_name_for(&stamp, n));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(&encoded)?;
                    debug!("Stored gallery image {} ({} bytes)", path.display(), encoded.len());
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::Internal(format!(
            "no free gallery file name for stamp {}",
            stamp
        )))
    }

    /// Up to `limit` image file names, sorted by name descending
    ///
    /// A missing directory is an empty gallery.
    pub fn recent(&self, limit: usize) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_image_name(&name) {
                names.push(name);
            }
        }

        names.sort_unstable_by(|a, b| b.cmp(a));
        names.truncate(limit);
        Ok(names)
    }
}

/// Re-encode an image as JPEG bytes
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>> {
    let mut encoded = Cursor::new(Vec::new());
    image
        .write_to(&mut encoded, ImageFormat::Jpeg)
        .map_err(|e| Error::Internal(format!("JPEG encode failed: {}", e)))?;
    Ok(encoded.into_inner())
}

/// True for names ending in .jpg/.jpeg/.png (case-insensitive)
pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
        .unwrap_or(false)
}
