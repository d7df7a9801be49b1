//! Per-analysis network event log.

use std::sync::{Arc, Mutex, PoisonError};

use crate::browser::{NetworkEvent, NetworkHandler};

#[derive(Debug, Default)]
struct Captured {
    requests: Vec<String>,
    redirects: Vec<String>,
}

/// Request and redirect URLs captured for one analysis.
///
/// The handler appends under a mutex because browser events arrive on the
/// browser's event thread. Each analysis owns its own log.
#[derive(Debug, Clone, Default)]
pub struct NetworkLog {
    inner: Arc<Mutex<Captured>>,
}

impl NetworkLog {
    /// An empty log for one analysis.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler that records events into this log, in delivery order.
    pub fn handler(&self) -> NetworkHandler {
        let log = self.clone();
        Arc::new(move |event| log.record(event))
    }

    /// Records one event. Responses count as redirects purely by status code.
    pub fn record(&self, event: NetworkEvent) {
        let mut captured = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match event {
            NetworkEvent::Request { url } => captured.requests.push(url),
            NetworkEvent::Response { url, status } if (300..400).contains(&status) => {
                captured.redirects.push(url)
            }
            NetworkEvent::Response { .. } => {}
        }
    }

    /// Copies of the request and redirect sequences captured so far.
    pub fn snapshot(&self) -> (Vec<String>, Vec<String>) {
        let captured = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        (captured.requests.clone(), captured.redirects.clone())
    }
}
