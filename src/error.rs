//! Custom error types for the replay pipeline.
//!
//! Per-frame tagging problems are typed so the pipeline can tell a bad
//! frame (report and keep going) from a buffer fault (abort the drain).
//! Collaborator traits ([`crate::buffer::SequenceBuffer`],
//! [`crate::sink::FrameSink`]) return `anyhow::Result` instead; any error
//! crossing those boundaries is already fatal or already per-call by
//! contract, so no further classification is needed there.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type ReplayResult<T> = std::result::Result<T, ReplayError>;

/// Errors raised while draining the sequence buffer.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// A metadata value exists under an expected key but has the wrong
    /// JSON type. Per-frame: the frame is dropped and the drain continues.
    #[error("tag '{key}' has unexpected type (expected {expected})")]
    MalformedTag {
        /// The offending metadata key.
        key: String,
        /// What the tagger needed to find under the key.
        expected: &'static str,
    },

    /// A tag the tagger cannot proceed without is absent. Per-frame, like
    /// [`Self::MalformedTag`].
    #[error("required tag '{key}' is missing")]
    MissingTag {
        /// The absent metadata key.
        key: String,
    },

    /// A multi-channel frame resolved to a channel index outside the
    /// camera's enumerated channels. Per-frame, like [`Self::MalformedTag`].
    #[error("channel index {index} out of range for {channels} camera channels")]
    ChannelOutOfRange {
        /// The resolved channel index.
        index: i64,
        /// Number of channels the camera reported.
        channels: usize,
    },

    /// The handoff queue closed before the end-of-stream sentinel was
    /// accepted, meaning the consumer worker died.
    #[error("handoff queue closed before end of stream")]
    QueueClosed,

    /// The sequence buffer failed while popping a frame. Aborts the
    /// remaining iterations of the drain.
    #[error("sequence buffer fault: {0}")]
    Buffer(#[source] anyhow::Error),
}
