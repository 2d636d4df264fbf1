//! The acquisition engine's sequence-buffer contract.

use anyhow::Result;
use async_trait::async_trait;

use crate::data::TaggedFrame;

/// A fixed-capacity store of previously captured frames, owned by the
/// acquisition engine.
///
/// The buffer is a snapshot: draining it does not race live acquisition.
/// [`pop_next`](Self::pop_next) is destructive (the returned frame is
/// removed from the engine's buffer permanently), so a buffer must never be
/// drained by more than one consumer at a time. The `&mut self` receiver
/// makes that single-consumer requirement part of the signature.
#[async_trait]
pub trait SequenceBuffer: Send {
    /// Number of frames still waiting in the buffer.
    fn remaining_count(&self) -> usize;

    /// Number of channels the active camera exposes. 0 or 1 means a
    /// single-channel camera.
    fn channel_count(&self) -> usize;

    /// Identifier of the active camera device, used to derive the
    /// camera-specific tag keys.
    fn camera_id(&self) -> String;

    /// Remove and return the oldest buffered frame.
    ///
    /// # Errors
    ///
    /// Fails on a hardware or I/O fault; such a fault aborts the
    /// remaining iterations of the drain.
    async fn pop_next(&mut self) -> Result<TaggedFrame>;
}
