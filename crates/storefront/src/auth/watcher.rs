//! Polls the credential source and publishes sign-in changes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument};

use super::CredentialSource;

/// Background task that tracks whether a customer is signed in.
///
/// The credential is re-read on a fixed interval (catching changes made by
/// another process or tab) and immediately whenever [`AuthWatcher::notify`]
/// is called. Subscribers only see a new value when it actually changes.
///
/// The task stops when the watcher is dropped.
#[derive(Debug)]
pub struct AuthWatcher {
    receiver: watch::Receiver<bool>,
    notify: Arc<Notify>,
    task: JoinHandle<()>,
}

impl AuthWatcher {
    /// Start watching `credentials`, checking every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<C>(credentials: C, interval: Duration) -> Self
    where
        C: CredentialSource + 'static,
    {
        let (sender, receiver) = watch::channel(credentials.is_signed_in());
        let notify = Arc::new(Notify::new());
        let task = tokio::spawn(poll(credentials, interval, sender, Arc::clone(&notify)));

        Self {
            receiver,
            notify,
            task,
        }
    }

    /// A receiver for sign-in changes, starting at the current value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.receiver.clone()
    }

    /// Re-check the credential now instead of waiting for the next tick.
    pub fn notify(&self) {
        self.notify.notify_one();
    }

    /// Last published sign-in state.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Stop polling.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for AuthWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[instrument(skip_all, fields(interval = ?interval))]
async fn poll<C: CredentialSource>(
    credentials: C,
    interval: Duration,
    sender: watch::Sender<bool>,
    notify: Arc<Notify>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            () = notify.notified() => {}
            () = sender.closed() => break,
        }

        let signed_in = credentials.is_signed_in();
        let changed = sender.send_if_modified(|current| {
            if *current == signed_in {
                false
            } else {
                *current = signed_in;
                true
            }
        });

        if changed {
            debug!(signed_in, "Sign-in state changed");
        }
    }
}
