//! The metadata-key vocabulary shared with downstream consumers.
//!
//! These spellings are load-bearing: viewers and storage backends index
//! images by them, and multi-channel cameras stamp the camera-specific keys
//! onto every frame they emit. They must match the acquisition engine's
//! vocabulary byte for byte.

use serde_json::Value;

use crate::data::TagMap;
use crate::error::{ReplayError, ReplayResult};

/// Channel index of the image within the acquisition.
pub const CHANNEL_INDEX: &str = "ChannelIndex";

/// Human-readable channel name.
pub const CHANNEL: &str = "Channel";

/// Stage-position index. Always normalized to 0 by the drain.
pub const POSITION_INDEX: &str = "PositionIndex";

/// Z-slice index. Always normalized to 0 by the drain.
pub const SLICE_INDEX: &str = "SliceIndex";

/// Per-channel frame number, assigned in delivery order.
pub const FRAME_INDEX: &str = "FrameIndex";

/// Channel index as stamped by the multi-camera utility device. Checked
/// first when resolving a frame's channel; see
/// [`crate::tagger::ChannelTagger`].
pub const MULTI_CAMERA_CHANNEL_INDEX: &str = "Multi Camera-CameraChannelIndex";

/// Channel index as stamped by a camera adapter without a device prefix.
pub const CAMERA_CHANNEL_INDEX: &str = "CameraChannelIndex";

/// Key under which a specific camera stamps the channel name of a frame.
pub fn camera_channel_name_key(camera: &str) -> String {
    format!("{camera}-CameraChannelName")
}

/// Key under which a specific camera stamps the channel index of a frame.
pub fn camera_channel_index_key(camera: &str) -> String {
    format!("{camera}-CameraChannelIndex")
}

/// Read an integer tag.
///
/// Returns `Ok(None)` when the key is absent and `MalformedTag` when the
/// key holds anything but an integer.
pub fn get_int(tags: &TagMap, key: &str) -> ReplayResult<Option<i64>> {
    match tags.get(key) {
        None => Ok(None),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| ReplayError::MalformedTag {
            key: key.to_string(),
            expected: "integer",
        }).map(Some),
        Some(_) => Err(ReplayError::MalformedTag {
            key: key.to_string(),
            expected: "integer",
        }),
    }
}

/// Read a string tag.
///
/// Returns `Ok(None)` when the key is absent and `MalformedTag` when the
/// key holds anything but a string.
pub fn get_str<'t>(tags: &'t TagMap, key: &str) -> ReplayResult<Option<&'t str>> {
    match tags.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ReplayError::MalformedTag {
            key: key.to_string(),
            expected: "string",
        }),
    }
}

/// Write an integer tag, replacing any previous value.
pub fn put_int(tags: &mut TagMap, key: &str, value: i64) {
    tags.insert(key.to_string(), Value::from(value));
}

/// Write a string tag, replacing any previous value.
pub fn put_str(tags: &mut TagMap, key: &str, value: &str) {
    tags.insert(key.to_string(), Value::from(value));
}
