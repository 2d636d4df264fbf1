//! The drain orchestrator.
//!
//! One drain moves every frame currently held in the sequence buffer to a
//! sink. The producer side (this module's loop) pops and tags frames and
//! pushes them onto a bounded handoff queue; a consumer worker on the
//! runtime takes them off and feeds the sink. The queue is the only state
//! shared between the two sides, and the stream is always terminated by an
//! explicit end-of-stream sentinel so the consumer can tell "no more
//! frames" from "no frames yet".

use std::sync::Arc;

use anyhow::{bail, Result};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::buffer::SequenceBuffer;
use crate::data::TaggedFrame;
use crate::error::ReplayError;
use crate::report::ErrorReporter;
use crate::sink::FrameSink;
use crate::tagger::{ChannelTagger, ChannelTopology, TagOutcome};

/// Default handoff queue capacity (frames in flight between producer and
/// consumer).
const DEFAULT_QUEUE_CAPACITY: usize = 16;

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

/// Configuration for a [`DrainPipeline`].
#[derive(Debug, Clone, Deserialize)]
pub struct DrainConfig {
    /// Capacity of the handoff queue. When the sink is slower than the
    /// buffer, a full queue blocks the producer (backpressure) rather
    /// than dropping frames.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl DrainConfig {
    /// Check the configuration for values that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Fails when the queue capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            bail!("queue_capacity must be at least 1");
        }
        Ok(())
    }
}

/// What a completed drain did.
#[derive(Debug)]
pub struct DrainReport {
    /// Frames tagged and handed to the consumer.
    pub frames_delivered: u64,

    /// Multi-channel frames excluded because they carried no channel-name
    /// stamp.
    pub frames_skipped: u64,

    /// Whether a buffer fault cut the drain short.
    pub aborted: bool,

    /// The fault that ended the drain, if any. Per-frame tagging and sink
    /// errors are reported, not surfaced here.
    pub error: Option<ReplayError>,
}

impl DrainReport {
    fn empty() -> Self {
        Self {
            frames_delivered: 0,
            frames_skipped: 0,
            aborted: false,
            error: None,
        }
    }
}

/// Items traveling over the handoff queue.
///
/// The sentinel is a distinct variant rather than a magic frame value so
/// the consumer can never mistake real data for termination.
enum QueueItem {
    Frame(TaggedFrame),
    EndOfStream,
}

/// Drains the acquisition engine's sequence buffer into a sink.
pub struct DrainPipeline {
    config: DrainConfig,
    reporter: Arc<dyn ErrorReporter>,
}

impl DrainPipeline {
    /// Build a pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// Fails when `config` does not validate.
    pub fn new(config: DrainConfig, reporter: Arc<dyn ErrorReporter>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, reporter })
    }

    /// Move every frame currently in `buffer` to `sink`, in order.
    ///
    /// Frames are re-tagged on the way through (see
    /// [`ChannelTagger`]); multi-channel frames without a channel stamp
    /// are skipped, frames with malformed metadata are reported and
    /// dropped, and a fault in the buffer itself aborts the remaining
    /// iterations. On every path except the empty buffer, the consumer
    /// observes exactly one end-of-stream sentinel and the sink is closed
    /// before this method returns.
    ///
    /// Popping is destructive, so callers must not drain the same buffer
    /// from two places at once; the `&mut` borrow enforces that within
    /// one process.
    pub async fn drain(
        &self,
        buffer: &mut dyn SequenceBuffer,
        sink: Box<dyn FrameSink>,
    ) -> DrainReport {
        let remaining = buffer.remaining_count();
        if remaining < 1 {
            // A normal outcome, not an error: live mode simply left
            // nothing behind. No sink session, no queue.
            info!("sequence buffer is empty, nothing to replay");
            return DrainReport::empty();
        }

        let (queue, receiver) = mpsc::channel(self.config.queue_capacity);
        let worker = spawn_consumer(receiver, sink, Arc::clone(&self.reporter));

        let topology = ChannelTopology::new(buffer.channel_count(), buffer.camera_id());
        info!(
            remaining,
            channels = topology.channel_count(),
            camera = topology.camera(),
            "replaying sequence buffer"
        );

        let tagger = ChannelTagger::new(topology);
        let mut counters = vec![0u64; tagger.topology().counter_slots()];

        let mut report = DrainReport::empty();

        for _ in 0..remaining {
            let mut frame = match buffer.pop_next().await {
                Ok(frame) => frame,
                Err(fault) => {
                    self.reporter
                        .report(&fault, "popping frame from sequence buffer");
                    report.aborted = true;
                    report.error = Some(ReplayError::Buffer(fault));
                    break;
                }
            };

            match tagger.tag(&mut frame, &mut counters) {
                Ok(TagOutcome::Tagged) => {
                    if queue.send(QueueItem::Frame(frame)).await.is_err() {
                        // The worker is gone; nothing downstream can
                        // receive the rest of the sequence.
                        let fault: anyhow::Error = ReplayError::QueueClosed.into();
                        self.reporter.report(&fault, "enqueueing frame");
                        report.aborted = true;
                        report.error = Some(ReplayError::QueueClosed);
                        break;
                    }
                    report.frames_delivered += 1;
                }
                Ok(TagOutcome::Skipped) => {
                    report.frames_skipped += 1;
                }
                Err(frame_error) => {
                    // One bad frame does not end the replay.
                    let frame_error: anyhow::Error = frame_error.into();
                    self.reporter.report(&frame_error, "normalizing frame tags");
                }
            }
        }

        // The sentinel goes out unconditionally, abort included, so the
        // consumer is never left blocked on an open queue.
        if queue.send(QueueItem::EndOfStream).await.is_err() {
            warn!("consumer worker stopped before the end-of-stream sentinel");
        }
        drop(queue);

        match worker.await {
            Ok(appended) => debug!(appended, "consumer worker finished"),
            Err(join_error) => {
                let fault = anyhow::Error::from(join_error);
                self.reporter.report(&fault, "joining consumer worker");
            }
        }

        info!(
            delivered = report.frames_delivered,
            skipped = report.frames_skipped,
            aborted = report.aborted,
            "sequence buffer replay finished"
        );
        report
    }
}

/// Spawn the consumer side of the handoff.
///
/// The worker hands frames to the sink until it sees the sentinel, then
/// closes the sink and stops. A failed append is reported and the worker
/// keeps going; only the sentinel (or a producer that died and closed the
/// queue) ends the loop; an empty-but-open queue is a normal transient
/// state under backpressure.
fn spawn_consumer(
    mut receiver: mpsc::Receiver<QueueItem>,
    mut sink: Box<dyn FrameSink>,
    reporter: Arc<dyn ErrorReporter>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut appended = 0u64;
        loop {
            match receiver.recv().await {
                Some(QueueItem::Frame(frame)) => match sink.append(frame).await {
                    Ok(()) => appended += 1,
                    Err(error) => reporter.report(&error, "appending frame to datastore"),
                },
                Some(QueueItem::EndOfStream) => {
                    if let Err(error) = sink.close().await {
                        reporter.report(&error, "closing datastore");
                    }
                    break;
                }
                None => {
                    warn!("handoff queue closed without an end-of-stream sentinel");
                    break;
                }
            }
        }
        appended
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::LogReporter;

    #[test]
    fn default_config_is_valid() {
        let config = DrainConfig::default();
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = DrainConfig { queue_capacity: 0 };
        assert!(config.validate().is_err());
        assert!(DrainPipeline::new(config, Arc::new(LogReporter)).is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: DrainConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);

        let config: DrainConfig = serde_json::from_str(r#"{"queue_capacity": 4}"#).unwrap();
        assert_eq!(config.queue_capacity, 4);
    }
}
