//! Destinations for normalized frames.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::data::TaggedFrame;

/// A destination that accepts normalized frames in delivery order.
///
/// A sink lives for exactly one drain: it receives zero or more frames via
/// [`append`](Self::append), then exactly one [`close`](Self::close), after
/// which it is closed for writes. A failed append is a per-frame problem;
/// the caller reports it and keeps feeding the sink.
#[async_trait]
pub trait FrameSink: Send {
    /// Hand one normalized frame to the destination.
    ///
    /// # Errors
    ///
    /// Fails per call; the frame is lost but later frames must still be
    /// accepted.
    async fn append(&mut self, frame: TaggedFrame) -> Result<()>;

    /// Mark the destination complete. Called once, after the last frame.
    ///
    /// # Errors
    ///
    /// Fails when finalizing the destination fails; there is nothing left
    /// to retry at that point.
    async fn close(&mut self) -> Result<()>;
}

struct DatastoreShared {
    frames: Mutex<Vec<TaggedFrame>>,
    closed: AtomicBool,
}

/// An in-memory datastore sink.
///
/// Holds every appended frame in RAM so a viewer (or a test) can walk the
/// replayed sequence afterwards. Once closed, further appends fail: the
/// store is locked, mirroring how downstream datastores refuse writes
/// after completion.
pub struct MemoryDatastore {
    shared: Arc<DatastoreShared>,
}

impl MemoryDatastore {
    /// Create an empty, writable datastore.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(DatastoreShared {
                frames: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// A handle for inspecting the store after the drain worker has
    /// consumed the sink itself.
    pub fn handle(&self) -> MemoryDatastoreHandle {
        MemoryDatastoreHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for MemoryDatastore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameSink for MemoryDatastore {
    async fn append(&mut self, frame: TaggedFrame) -> Result<()> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(anyhow!("datastore is closed for writes"));
        }
        self.shared
            .frames
            .lock()
            .map_err(|_| anyhow!("datastore lock poisoned"))?
            .push(frame);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.shared.closed.store(true, Ordering::Release);
        Ok(())
    }
}

/// Read-side view of a [`MemoryDatastore`].
#[derive(Clone)]
pub struct MemoryDatastoreHandle {
    shared: Arc<DatastoreShared>,
}

impl MemoryDatastoreHandle {
    /// Snapshot of the stored frames, in delivery order.
    pub fn frames(&self) -> Vec<TaggedFrame> {
        self.shared
            .frames
            .lock()
            .map(|frames| frames.clone())
            .unwrap_or_default()
    }

    /// Number of frames stored so far.
    pub fn len(&self) -> usize {
        self.shared.frames.lock().map(|f| f.len()).unwrap_or(0)
    }

    /// Whether the store holds no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the sink has been closed for writes.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Frame, TagMap};

    fn blank_frame() -> TaggedFrame {
        TaggedFrame::new(Frame::from_u8(2, 2, vec![0; 4]), TagMap::new())
    }

    #[tokio::test]
    async fn stores_frames_in_append_order() {
        let mut store = MemoryDatastore::new();
        let handle = store.handle();

        let mut first = blank_frame();
        first.tags.insert("FrameIndex".into(), 0.into());
        let mut second = blank_frame();
        second.tags.insert("FrameIndex".into(), 1.into());

        store.append(first).await.unwrap();
        store.append(second).await.unwrap();
        store.close().await.unwrap();

        let frames = handle.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].tags["FrameIndex"], 0);
        assert_eq!(frames[1].tags["FrameIndex"], 1);
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn append_after_close_is_refused() {
        let mut store = MemoryDatastore::new();
        let handle = store.handle();

        store.close().await.unwrap();
        let err = store.append(blank_frame()).await.unwrap_err();
        assert!(err.to_string().contains("closed"));
        assert!(handle.is_empty());
    }
}
