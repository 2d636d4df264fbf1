//! Frame payloads and the tagged frames that move through the drain.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// String-keyed metadata mapping attached to every captured frame.
///
/// Values are JSON values; the acquisition engine writes integers, strings,
/// and booleans into it, and the tagger rewrites the indexing keys listed in
/// [`crate::tags`].
pub type TagMap = serde_json::Map<String, Value>;

/// Represents a single image frame's pixel payload.
///
/// Data is stored as a raw byte vector:
/// - 8-bit images: 1 byte per pixel.
/// - 12/16-bit images: 2 bytes per pixel, little endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Bits per pixel (e.g., 8, 12, 16)
    pub bit_depth: u32,

    /// Raw pixel data
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a new frame from 16-bit pixel data.
    ///
    /// Copies the pixels into a little-endian byte vector.
    pub fn from_u16(width: u32, height: u32, pixels: &[u16]) -> Self {
        let mut data = Vec::with_capacity(pixels.len() * 2);
        for pixel in pixels {
            data.extend_from_slice(&pixel.to_le_bytes());
        }

        Self {
            width,
            height,
            bit_depth: 16,
            data,
        }
    }

    /// Create a new frame from 8-bit pixel data.
    pub fn from_u8(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            bit_depth: 8,
            data,
        }
    }

    /// Number of bytes a well-formed payload must hold for these
    /// dimensions and bit depth.
    pub fn expected_len(&self) -> usize {
        let pixels = (self.width as usize) * (self.height as usize);
        match self.bit_depth {
            12 | 16 => pixels * 2,
            _ => pixels,
        }
    }

    /// Get the pixel value at (x, y), handling bit depth conversion.
    ///
    /// Returns `None` when the coordinates or the payload are out of range.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = (y * self.width + x) as usize;

        match self.bit_depth {
            8 => self.data.get(idx).map(|&v| u32::from(v)),
            12 | 16 => {
                let start = idx * 2;
                let lo = *self.data.get(start)?;
                let hi = *self.data.get(start + 1)?;
                Some(u32::from(u16::from_le_bytes([lo, hi])))
            }
            _ => None,
        }
    }
}

/// One captured image plus its metadata mapping.
///
/// Identity is positional (arrival order out of the sequence buffer); there
/// is no independent frame id. The tag map is mutated exactly once, by the
/// tagger, while the frame is owned by the drain; after that the frame is
/// handed to the sink and never touched again.
#[derive(Debug, Clone)]
pub struct TaggedFrame {
    /// The pixel payload.
    pub image: Frame,

    /// The frame's metadata mapping.
    pub tags: TagMap,

    /// When the acquisition engine captured the frame.
    pub acquired_at: DateTime<Utc>,
}

impl TaggedFrame {
    /// Create a tagged frame stamped with the current time.
    pub fn new(image: Frame, tags: TagMap) -> Self {
        Self {
            image,
            tags,
            acquired_at: Utc::now(),
        }
    }
}
