use async_trait::async_trait;
use log::debug;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Asks the user whether a bookmark should really be removed.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Resolves exactly once per call and never fails; a dismissed prompt
    /// is a `false`.
    async fn confirm(&self) -> bool;
}

/// A modal answered from the outside, e.g. by an HTTP or WebSocket client.
#[derive(Default)]
pub struct ModalPrompt {
    pending: Mutex<Option<oneshot::Sender<bool>>>,
}

impl ModalPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.pending
            .lock()
            .map(|p| p.is_some())
            .unwrap_or(false)
    }

    /// Resolves the open modal. Returns false when nothing was waiting.
    pub fn answer(&self, accept: bool) -> bool {
        let sender = match self.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(_) => None,
        };
        match sender {
            Some(tx) => tx.send(accept).is_ok(),
            None => false,
        }
    }

    /// Same as cancelling; used when the user clicks outside the modal.
    pub fn dismiss(&self) -> bool {
        self.answer(false)
    }
}

#[async_trait]
impl ConfirmationPrompt for ModalPrompt {
    async fn confirm(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        let previous = match self.pending.lock() {
            Ok(mut pending) => pending.replace(tx),
            Err(_) => {
                return false;
            }
        };
        if let Some(previous) = previous {
            debug!("Confirmation superseded by a newer prompt");
            let _ = previous.send(false);
        }
        rx.await.unwrap_or(false)
    }
}
