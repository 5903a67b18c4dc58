use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{sync::OwnedMutexGuard, time::Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected { retry_after: Duration },
}

/// Tracks when each identity last had an order accepted.
///
/// State lives as long as the gate does, which is the lifetime of the process.
#[derive(Debug)]
pub struct CooldownGate {
    window: Duration,
    last_accepted: Mutex<HashMap<String, Instant>>,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl CooldownGate {
    pub fn new(window: Duration) -> Self {
        Self { window, last_accepted: Mutex::default(), in_flight: Mutex::default() }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn admit(&self, identity: &str, now: Instant) -> Admission {
        let last_accepted = self.last_accepted.lock().get(identity).copied();
        match last_accepted {
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                if elapsed >= self.window {
                    Admission::Admitted
                } else {
                    Admission::Rejected { retry_after: self.window - elapsed }
                }
            }
            None => Admission::Admitted,
        }
    }

    /// Record an accepted order. Only call this once the ticket actually exists.
    pub fn commit(&self, identity: &str, now: Instant) {
        self.last_accepted.lock().insert(identity.to_string(), now);
    }

    /// Serialize submissions of a single identity.
    /// Hold the guard from [`Self::admit`] until after [`Self::commit`].
    pub async fn lock(&self, identity: &str) -> OwnedMutexGuard<()> {
        let lock = self.in_flight.lock().entry(identity.to_string()).or_default().clone();
        lock.lock_owned().await
    }

    pub fn last_accepted(&self, identity: &str) -> Option<Instant> {
        self.last_accepted.lock().get(identity).copied()
    }
}
