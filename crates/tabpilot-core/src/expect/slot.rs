//! Single-fire observable slot.
//!
//! The one-shot notification primitive behind expectation scopes: one
//! write, any number of waiters, value-or-error semantics. Built on a
//! watch channel so late waiters still observe an already-written value.

use std::time::Duration;

use tabpilot_cdp::CdpConnection;
use tokio::sync::watch;
use tokio::time::timeout;

use crate::error::ExpectError;

/// A slot that is written at most once per arming and read any number
/// of times.
#[derive(Debug)]
pub(crate) struct Slot<T: Clone> {
    tx: watch::Sender<Option<Result<T, ExpectError>>>,
}

impl<T: Clone> Slot<T> {
    /// An empty, armed slot.
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Write the slot. The first write wins; later writes are ignored
    /// until [`reset`](Self::reset).
    pub(crate) fn complete(&self, value: Result<T, ExpectError>) -> bool {
        let mut wrote = false;
        self.tx.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(value.clone());
                wrote = true;
                true
            } else {
                false
            }
        });
        wrote
    }

    /// Clear the slot so it can fire again.
    pub(crate) fn reset(&self) {
        self.tx.send_replace(None);
    }

    /// The current contents, without waiting.
    pub(crate) fn peek(&self) -> Option<Result<T, ExpectError>> {
        self.tx.borrow().clone()
    }

    /// Wait until the slot is written.
    ///
    /// A slot that was already written resolves immediately, even after
    /// the connection went away. An empty slot on a closed connection
    /// resolves to [`ExpectError::SessionClosed`]; with a deadline, to
    /// [`ExpectError::Timeout`] when it passes first. A timeout does not
    /// disturb the slot or its hooks.
    pub(crate) async fn wait(
        &self,
        conn: &CdpConnection,
        deadline: Option<Duration>,
    ) -> Result<T, ExpectError> {
        let wait = self.wait_inner(conn);
        match deadline {
            Some(duration) => timeout(duration, wait)
                .await
                .map_err(|_| ExpectError::Timeout(duration))?,
            None => wait.await,
        }
    }

    async fn wait_inner(&self, conn: &CdpConnection) -> Result<T, ExpectError> {
        let mut rx = self.tx.subscribe();
        let mut closed = conn.closed();
        loop {
            if let Some(result) = rx.borrow_and_update().clone() {
                return result;
            }
            if *closed.borrow_and_update() {
                return Err(ExpectError::SessionClosed);
            }
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Err(ExpectError::SessionClosed);
                    }
                }
                _ = closed.changed() => {}
            }
        }
    }
}
