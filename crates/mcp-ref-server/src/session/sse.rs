//! Resumable SSE event ring: ordered buffer with replay-by-last-event-id
//! (spec.md §4.8, §3 `SSE event`).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::response::sse::Event;
use tokio::sync::{broadcast, RwLock};

use crate::config::protocol::DEFAULT_SSE_RING_CAPACITY;

/// A single buffered SSE event.
#[derive(Clone, Debug)]
pub struct BufferedEvent {
    pub id: u64,
    pub event_type: String,
    pub data: String,
}

impl BufferedEvent {
    #[must_use]
    pub fn to_sse_event(&self) -> Event {
        Event::default().id(self.id.to_string()).event(self.event_type.clone()).data(self.data.clone())
    }
}

/// Outcome of a replay request against [`SseRing::events_after`].
#[derive(Debug)]
pub enum ReplayOutcome {
    /// All events with id strictly greater than the requested id, in order.
    Replayed(Vec<BufferedEvent>),
    /// The requested id is older than the oldest event still buffered; the
    /// gap can't be filled and the client must re-initialize.
    Impossible,
}

/// A single session's ordered event buffer plus its live broadcast
/// channel. Single writer per session (spec.md §5): all mutation happens
/// through `&self` methods serialized by the internal lock.
pub struct SseRing {
    capacity: usize,
    ring: RwLock<VecDeque<BufferedEvent>>,
    next_id: AtomicU64,
    tx: broadcast::Sender<BufferedEvent>,
}

impl SseRing {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(16));
        Self { capacity, ring: RwLock::new(VecDeque::with_capacity(capacity)), next_id: AtomicU64::new(1), tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BufferedEvent> {
        self.tx.subscribe()
    }

    /// Assign the next monotonic id, append to the ring (evicting the
    /// oldest entry if at capacity), and broadcast to live subscribers.
    pub async fn send(&self, event_type: impl Into<String>, data: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let event = BufferedEvent { id, event_type: event_type.into(), data: data.into() };

        {
            let mut ring = self.ring.write().await;
            if ring.len() >= self.capacity {
                ring.pop_front();
            }
            ring.push_back(event.clone());
        }

        let _ = self.tx.send(event);
        id
    }

    /// Replay events with id > `last_event_id`. `last_event_id == 0` means
    /// "no prior connection" and never signals impossible-replay even if
    /// the ring has already evicted its earliest events.
    pub async fn events_after(&self, last_event_id: u64) -> ReplayOutcome {
        let ring = self.ring.read().await;

        if last_event_id > 0 {
            if let Some(oldest) = ring.front() {
                if oldest.id > last_event_id + 1 {
                    return ReplayOutcome::Impossible;
                }
            }
        }

        ReplayOutcome::Replayed(ring.iter().filter(|e| e.id > last_event_id).cloned().collect())
    }
}

impl Default for SseRing {
    fn default() -> Self {
        Self::new(DEFAULT_SSE_RING_CAPACITY)
    }
}
