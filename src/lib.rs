//! # Live Replay
//!
//! This crate drains a finite, already-captured sequence of tagged camera
//! frames out of an acquisition engine's sequence buffer and delivers them,
//! in arrival order, to a datastore sink. Frames from multi-channel cameras
//! are re-tagged on the way through so that every channel numbers its own
//! frames independently and downstream consumers see a consistent
//! channel/frame/position/slice index vocabulary.
//!
//! The acquisition engine, the datastore, and the error log are external
//! collaborators reached through the traits in [`buffer`], [`sink`], and
//! [`report`]; this crate owns only the handoff between them.
//!
//! ## Crate Structure
//!
//! - **`data`**: The [`Frame`](data::Frame) pixel payload and the
//!   [`TaggedFrame`](data::TaggedFrame) that moves through the drain.
//! - **`tags`**: The fixed metadata-key vocabulary shared with downstream
//!   consumers, plus typed accessors over the JSON tag map.
//! - **`buffer`**: The [`SequenceBuffer`](buffer::SequenceBuffer) contract
//!   exposed by the acquisition engine. Popping is destructive.
//! - **`tagger`**: Pure per-frame channel resolution and index
//!   normalization, driven by caller-owned sequence counters.
//! - **`sink`**: The [`FrameSink`](sink::FrameSink) contract for the
//!   receiving datastore, and an in-memory implementation.
//! - **`report`**: Fire-and-forget error reporting.
//! - **`pipeline`**: The [`DrainPipeline`](pipeline::DrainPipeline)
//!   orchestrator: pop, tag, enqueue, and a consumer worker terminated by
//!   an explicit end-of-stream sentinel.
//! - **`error`**: The crate error type.

pub mod buffer;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod sink;
pub mod tagger;
pub mod tags;

pub use buffer::SequenceBuffer;
pub use data::{Frame, TagMap, TaggedFrame};
pub use error::{ReplayError, ReplayResult};
pub use pipeline::{DrainConfig, DrainPipeline, DrainReport};
pub use report::{ErrorReporter, LogReporter};
pub use sink::{FrameSink, MemoryDatastore, MemoryDatastoreHandle};
pub use tagger::{ChannelTagger, ChannelTopology, TagOutcome};
