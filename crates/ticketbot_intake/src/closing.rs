use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::directory::{ChannelHandle, Directory};

/// How long a ticket stays around after somebody closed it.
pub const CLOSE_GRACE_DELAY: Duration = Duration::from_secs(5);

/// Deferred, cancellable deletion of ticket channels.
pub struct ClosingQueue {
    directory: Arc<dyn Directory>,
    pending: Arc<Mutex<HashMap<ChannelHandle, CancellationToken>>>,
}

impl std::fmt::Debug for ClosingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosingQueue").field("pending", &self.pending.lock().len()).finish()
    }
}

impl ClosingQueue {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory, pending: Arc::default() }
    }

    /// Delete the channel once `delay` has passed.
    /// Returns `None` if a deletion of that channel is already pending.
    pub fn schedule(&self, channel: ChannelHandle, delay: Duration) -> Option<JoinHandle<()>> {
        let token = CancellationToken::new();
        {
            let mut pending = self.pending.lock();
            if pending.contains_key(&channel) {
                return None;
            }
            pending.insert(channel.clone(), token.clone());
        }
        tracing::info!(channel.id = %channel, delay = ?delay, "Scheduled ticket deletion");

        let directory = self.directory.clone();
        let pending = self.pending.clone();
        Some(tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::info!(channel.id = %channel, "Ticket deletion cancelled");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            {
                // `cancel` marks the token while holding the lock, so a cancelled token means
                // the entry under this channel, if any, belongs to a newer schedule
                let mut pending = pending.lock();
                if token.is_cancelled() {
                    return;
                }
                pending.remove(&channel);
            }
            if let Err(err) = directory.delete_channel(&channel).await {
                tracing::warn!(error.message = %err, channel.id = %channel, "Failed to delete ticket channel");
            }
        }))
    }

    /// Cancel a pending deletion. Returns whether there was anything to cancel.
    pub fn cancel(&self, channel: &ChannelHandle) -> bool {
        match self.pending.lock().remove(channel) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, channel: &ChannelHandle) -> bool {
        self.pending.lock().contains_key(channel)
    }
}
