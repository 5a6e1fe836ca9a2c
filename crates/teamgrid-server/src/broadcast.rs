//! In-process fan-out of availability changes to every connected viewer.
//!
//! The hub keeps a registry of sinks. Publishing serializes the event once
//! and hands the same frame to every sink; there is no per-project routing
//! and no replay, so a viewer that connects late catches up by refetching.
//!
//! Delivery never blocks the publisher. Each SSE subscriber is backed by a
//! bounded channel; a subscriber that stops reading loses frames instead of
//! stalling everyone else.

use futures::Stream;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use teamgrid_core::event::BroadcastEvent;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Frames buffered per subscriber before deliveries start failing.
pub const SINK_BUFFER: usize = 256;

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One serialized event, shared by every sink it is delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    json: Arc<str>,
}

impl Frame {
    pub fn from_event(event: &BroadcastEvent) -> teamgrid_core::Result<Self> {
        Ok(Self {
            json: event.to_json()?.into(),
        })
    }

    pub fn json(&self) -> &str {
        &self.json
    }

    /// `data: <json>\n\n`
    pub fn to_wire(&self) -> String {
        format!("data: {}\n\n", self.json)
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The receiving side is gone. The hub drops the sink without logging.
    #[error("sink closed")]
    Closed,
    #[error("sink write failed: {0}")]
    Failed(String),
}

/// A destination for broadcast frames.
pub trait EventSink: Send + Sync {
    fn deliver(&self, frame: &Frame) -> Result<(), SinkError>;
}

/// Sink feeding a [`Subscription`].
pub struct ChannelSink {
    tx: mpsc::Sender<Frame>,
}

impl EventSink for ChannelSink {
    fn deliver(&self, frame: &Frame) -> Result<(), SinkError> {
        self.tx.try_send(frame.clone()).map_err(|e| match e {
            TrySendError::Closed(_) => SinkError::Closed,
            TrySendError::Full(_) => SinkError::Failed("subscriber buffer full".into()),
        })
    }
}

// ---------------------------------------------------------------------------
// BroadcastHub
// ---------------------------------------------------------------------------

/// Outcome of one publish pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub delivered: usize,
    pub pruned: usize,
    pub failed: usize,
}

#[derive(Default)]
struct HubInner {
    sinks: Mutex<HashMap<u64, Arc<dyn EventSink>>>,
    next_id: AtomicU64,
}

/// Cheap to clone; clones share one registry.
#[derive(Clone, Default)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink. Returns the id used to deregister it.
    pub fn register(&self, sink: Arc<dyn EventSink>) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.sinks.lock().insert(id, sink);
        id
    }

    /// Returns false if the sink was already gone.
    pub fn deregister(&self, id: u64) -> bool {
        self.inner.sinks.lock().remove(&id).is_some()
    }

    /// Register a channel-backed sink and return its receiving end.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(SINK_BUFFER);
        let id = self.register(Arc::new(ChannelSink { tx }));
        Subscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    pub fn sink_count(&self) -> usize {
        self.inner.sinks.lock().len()
    }

    /// Serialize `event` once and deliver it to every registered sink.
    pub fn publish(&self, event: &BroadcastEvent) -> teamgrid_core::Result<PublishReport> {
        let frame = Frame::from_event(event)?;
        Ok(self.publish_frame(&frame))
    }

    /// Deliver to a snapshot of the registry taken under the lock; writes
    /// happen outside it. Closed sinks are removed after the pass.
    pub fn publish_frame(&self, frame: &Frame) -> PublishReport {
        let snapshot: Vec<(u64, Arc<dyn EventSink>)> = self
            .inner
            .sinks
            .lock()
            .iter()
            .map(|(id, sink)| (*id, Arc::clone(sink)))
            .collect();

        let mut report = PublishReport::default();
        let mut closed = Vec::new();
        for (id, sink) in snapshot {
            match sink.deliver(frame) {
                Ok(()) => report.delivered += 1,
                Err(SinkError::Closed) => closed.push(id),
                Err(e) => {
                    tracing::warn!(sink = id, error = %e, "failed to deliver availability update");
                    report.failed += 1;
                }
            }
        }

        if !closed.is_empty() {
            let mut sinks = self.inner.sinks.lock();
            for id in &closed {
                sinks.remove(id);
            }
            report.pruned = closed.len();
        }

        tracing::debug!(
            delivered = report.delivered,
            pruned = report.pruned,
            failed = report.failed,
            "published availability update"
        );
        report
    }

    /// Drop every sink. Open subscriptions end once their buffered frames
    /// are drained. Returns how many sinks were removed.
    pub fn teardown(&self) -> usize {
        let drained = std::mem::take(&mut *self.inner.sinks.lock());
        drained.len()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Receiving end of one registered sink. Dropping it deregisters the sink.
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<Frame>,
    hub: Weak<HubInner>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}

impl Stream for Subscription {
    type Item = Frame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Frame>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.sinks.lock().remove(&self.id);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
