//! Throttled progress notification emitter (spec.md §4.5).

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;

/// A pending, not-yet-emitted progress update.
#[derive(Debug, Clone)]
struct Pending {
    progress: f64,
    total: Option<f64>,
    message: Option<String>,
}

struct Inner {
    last_emit: Option<Instant>,
    pending: Option<Pending>,
    closed: bool,
}

/// A function that delivers a `notifications/progress` frame to the
/// session's outbound stream.
pub type SendFn = Box<dyn Fn(Value) + Send + Sync>;

/// Coalesces `report()` calls within a throttle window and guarantees the
/// final state is always flushed on [`ProgressReporter::complete`].
pub struct ProgressReporter {
    token: Value,
    throttle: Duration,
    send: SendFn,
    state: Mutex<Inner>,
}

impl ProgressReporter {
    #[must_use]
    pub fn new(token: Value, send: SendFn, throttle: Duration) -> Self {
        Self {
            token,
            throttle,
            send,
            state: Mutex::new(Inner { last_emit: None, pending: None, closed: false }),
        }
    }

    /// Report progress. If less than `throttleMs` has elapsed since the
    /// last emit, the values are stored as pending instead of emitted
    /// immediately.
    pub fn report(&self, progress: f64, total: Option<f64>, message: Option<String>) {
        let mut state = self.state.lock().expect("progress reporter mutex poisoned");
        if state.closed {
            return;
        }

        let now = Instant::now();
        let should_emit = match state.last_emit {
            None => true,
            Some(last) => now.duration_since(last) >= self.throttle,
        };

        if should_emit {
            state.last_emit = Some(now);
            state.pending = None;
            drop(state);
            self.emit(progress, total, message);
        } else {
            state.pending = Some(Pending { progress, total, message });
        }
    }

    /// Flush any pending values (or emit a synthetic `progress=100,
    /// total=100` completion if none are pending, see spec.md §9), then
    /// close the reporter. Subsequent calls are no-ops.
    pub fn complete(&self, message: Option<String>) {
        let mut state = self.state.lock().expect("progress reporter mutex poisoned");
        if state.closed {
            return;
        }
        state.closed = true;
        let pending = state.pending.take();
        drop(state);

        match pending {
            Some(p) => self.emit(p.progress, p.total, p.message.or(message)),
            None => self.emit(100.0, Some(100.0), message),
        }
    }

    fn emit(&self, progress: f64, total: Option<f64>, message: Option<String>) {
        let mut payload = serde_json::json!({
            "progressToken": self.token,
            "progress": progress,
        });
        if let Some(total) = total {
            payload["total"] = serde_json::json!(total);
        }
        if let Some(message) = message {
            payload["message"] = serde_json::json!(message);
        }
        (self.send)(payload);
    }
}
