//! Per-frame channel resolution and index normalization.
//!
//! The tagger is pure logic: it mutates nothing but the frame's own tag
//! map, and all sequence state lives in a counters slice owned by the
//! caller. Tagging the same frame twice against the same counter values
//! yields the same tags.

use crate::data::TaggedFrame;
use crate::error::{ReplayError, ReplayResult};
use crate::tags;

/// The channel shape of the active camera, derived once per drain.
#[derive(Debug, Clone)]
pub struct ChannelTopology {
    channel_count: usize,
    camera: String,
}

impl ChannelTopology {
    /// Describe a camera with `channel_count` channels. A count of 0 or 1
    /// is a single-channel camera.
    pub fn new(channel_count: usize, camera: impl Into<String>) -> Self {
        Self {
            channel_count,
            camera: camera.into(),
        }
    }

    /// Number of channels the camera exposes.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// The active camera's device identifier.
    pub fn camera(&self) -> &str {
        &self.camera
    }

    /// Whether frames need per-channel attribution.
    pub fn is_multi_channel(&self) -> bool {
        self.channel_count > 1
    }

    /// How many sequence counters a drain of this topology needs.
    pub fn counter_slots(&self) -> usize {
        self.channel_count.max(1)
    }
}

/// What the tagger did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    /// The frame was normalized and may be delivered.
    Tagged,
    /// The frame belongs to no enumerated channel and must not be
    /// delivered. No counter advanced.
    Skipped,
}

/// Assigns channel and sequence indices to frames popped off the buffer.
#[derive(Debug, Clone)]
pub struct ChannelTagger {
    topology: ChannelTopology,
}

impl ChannelTagger {
    /// Build a tagger for one drain's topology.
    pub fn new(topology: ChannelTopology) -> Self {
        Self { topology }
    }

    /// The topology this tagger was built for.
    pub fn topology(&self) -> &ChannelTopology {
        &self.topology
    }

    /// Normalize one frame's indexing tags.
    ///
    /// `counters` holds one per-channel frame counter and must have
    /// [`ChannelTopology::counter_slots`] entries; the slot the frame is
    /// attributed to is incremented on success.
    ///
    /// # Errors
    ///
    /// Malformed metadata (wrong-typed value, missing required camera
    /// index, channel index outside the topology) fails this frame only,
    /// and no counter advances for it. The caller reports the error and
    /// moves on to the next frame.
    pub fn tag(&self, frame: &mut TaggedFrame, counters: &mut [u64]) -> ReplayResult<TagOutcome> {
        if self.topology.is_multi_channel() {
            self.tag_multi_channel(frame, counters)
        } else {
            self.normalize(frame, counters, 0)?;
            Ok(TagOutcome::Tagged)
        }
    }

    /// Multi-channel path: frames not stamped with the camera's channel
    /// name belong to no enumerated channel and are skipped outright.
    fn tag_multi_channel(
        &self,
        frame: &mut TaggedFrame,
        counters: &mut [u64],
    ) -> ReplayResult<TagOutcome> {
        let name_key = tags::camera_channel_name_key(self.topology.camera());
        let Some(channel_name) = tags::get_str(&frame.tags, &name_key)?.map(str::to_owned) else {
            return Ok(TagOutcome::Skipped);
        };

        let index_key = tags::camera_channel_index_key(self.topology.camera());
        let channel_index = tags::get_int(&frame.tags, &index_key)?
            .ok_or(ReplayError::MissingTag { key: index_key })?;

        let slot = usize::try_from(channel_index)
            .ok()
            .filter(|slot| *slot < self.topology.channel_count())
            .ok_or(ReplayError::ChannelOutOfRange {
                index: channel_index,
                channels: self.topology.channel_count(),
            })?;

        tags::put_str(&mut frame.tags, tags::CHANNEL, &channel_name);
        tags::put_int(&mut frame.tags, tags::CHANNEL_INDEX, channel_index);

        self.normalize(frame, counters, slot)?;
        Ok(TagOutcome::Tagged)
    }

    /// Shared normalization: resolve the channel value, zero the position
    /// and slice indices, and stamp the frame with its channel's next
    /// sequence number.
    fn normalize(&self, frame: &mut TaggedFrame, counters: &mut [u64], slot: usize) -> ReplayResult<()> {
        let channel = resolve_channel(&frame.tags)?;

        let available = counters.len();
        let counter = counters
            .get_mut(slot)
            .ok_or(ReplayError::ChannelOutOfRange {
                index: slot as i64,
                channels: available,
            })?;

        tags::put_int(&mut frame.tags, tags::CHANNEL_INDEX, channel);
        tags::put_int(&mut frame.tags, tags::POSITION_INDEX, 0);
        tags::put_int(&mut frame.tags, tags::SLICE_INDEX, 0);
        tags::put_int(&mut frame.tags, tags::FRAME_INDEX, *counter as i64);

        *counter += 1;
        Ok(())
    }
}

/// Resolve the channel value a frame advertises.
///
/// Camera adapters have historically stamped the channel index under three
/// different keys; the lookup order below matches what downstream
/// consumers have come to depend on. Compatibility behavior: keep the
/// order even though no adapter is known to need all three.
fn resolve_channel(tag_map: &crate::data::TagMap) -> ReplayResult<i64> {
    for key in [
        tags::MULTI_CAMERA_CHANNEL_INDEX,
        tags::CAMERA_CHANNEL_INDEX,
        tags::CHANNEL_INDEX,
    ] {
        if let Some(value) = tags::get_int(tag_map, key)? {
            return Ok(value);
        }
    }
    Ok(0)
}
