use super::confirm::ConfirmationPrompt;
use super::state::{ DashboardSnapshot, DashboardState };
use crate::api::BookmarkApi;
use crate::cli::Session;
use crate::formatter::format_bookmarks;
use crate::models::bookmark::{ FetchFailure, FormattedBookmark };
use chrono::Utc;
use log::{ debug, info, warn };
use std::sync::{ Arc, Mutex };
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    Declined,
    NotFound,
}

struct Shared {
    state: Mutex<DashboardState>,
    snapshots: watch::Sender<DashboardSnapshot>,
}

impl Shared {
    fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&state)
    }

    fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let result = f(&mut state);
        let snapshot = state.snapshot();

        // Published under the state lock so snapshots reach the channel in
        // the order their writes were applied.
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        drop(state);
        result
    }
}

/// Clears the busy state on every exit path out of `load`, including a
/// dropped future.
struct BusyGuard<'a> {
    shared: &'a Shared,
}

impl<'a> BusyGuard<'a> {
    fn engage(shared: &'a Shared) -> Option<Self> {
        let engaged = shared.update(|state| {
            if state.loading {
                return false;
            }
            state.loading = true;
            state.error_message = None;
            true
        });
        engaged.then_some(Self { shared })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.shared.update(|state| {
            state.loading = false;
        });
    }
}

/// Owns the displayed bookmark list. Presentation layers read snapshots
/// and call `load` / `request_delete`; concurrent writers resolve as
/// last write wins.
pub struct BookmarkListController {
    api: Arc<dyn BookmarkApi>,
    prompt: Arc<dyn ConfirmationPrompt>,
    session: Session,
    removal_delay: Duration,
    shared: Arc<Shared>,
}

impl BookmarkListController {
    pub fn new(
        api: Arc<dyn BookmarkApi>,
        prompt: Arc<dyn ConfirmationPrompt>,
        session: Session,
        removal_delay: Duration
    ) -> Self {
        let (snapshots, _) = watch::channel(DashboardSnapshot::default());
        Self {
            api,
            prompt,
            session,
            removal_delay,
            shared: Arc::new(Shared {
                state: Mutex::new(DashboardState::default()),
                snapshots,
            }),
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn bookmarks(&self) -> Vec<FormattedBookmark> {
        self.shared.read(|state| state.bookmarks.clone())
    }

    /// Fetches and replaces the displayed list. A failed fetch shows the
    /// empty state; the failure kind is kept on the snapshot.
    pub async fn load(&self) -> DashboardSnapshot {
        let busy = match BusyGuard::engage(&self.shared) {
            Some(guard) => guard,
            None => {
                debug!("Refresh already in progress, ignoring load request");
                return self.snapshot();
            }
        };

        let payload = self.api.fetch_bookmarks(&self.session).await;
        let bookmarks = format_bookmarks(&payload);
        let failure = if payload.is_success() {
            None
        } else {
            Some(payload.failure.clone().unwrap_or_else(|| FetchFailure::reported(&payload)))
        };

        match &failure {
            None => info!("Displaying {} bookmarks", bookmarks.len()),
            Some(f) =>
                warn!(
                    "Bookmark fetch failed ({:?}): {}; showing empty state",
                    f,
                    payload.errors().join("; ")
                ),
        }

        self.shared.update(|state| {
            state.bookmarks = bookmarks;
            state.exiting.clear();
            state.last_failure = failure;
            state.refreshed_at = Some(Utc::now().timestamp());
            state.loading = false;
        });
        drop(busy);

        self.snapshot()
    }

    /// Asks for confirmation, then removes the bookmark from the list at
    /// once and deletes it remotely in the background. The remote outcome
    /// never restores the card.
    pub async fn request_delete(&self, query_id: &str) -> DeleteOutcome {
        let known = self.shared.update(|state| {
            if state.position(query_id).is_none() {
                return false;
            }
            state.confirming = Some(query_id.to_string());
            true
        });
        if !known {
            warn!("Delete requested for unknown bookmark {}", query_id);
            return DeleteOutcome::NotFound;
        }

        let confirmed = self.prompt.confirm().await;
        let delay = self.removal_delay;

        self.shared.update(|state| {
            if state.confirming.as_deref() == Some(query_id) {
                state.confirming = None;
            }
            if !confirmed {
                return;
            }
            state.remove(query_id, !delay.is_zero());
        });

        if !confirmed {
            debug!("Removal of bookmark {} cancelled", query_id);
            return DeleteOutcome::Declined;
        }
        info!("Removing bookmark {}", query_id);

        if !delay.is_zero() {
            let shared = self.shared.clone();
            let id = query_id.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                shared.update(|state| {
                    state.finish_exit(&id);
                    if state.bookmarks.is_empty() && state.exiting.is_empty() {
                        debug!("Last bookmark removed, showing empty state");
                    }
                });
            });
        }

        let api = self.api.clone();
        let session = self.session.clone();
        let id = query_id.to_string();
        tokio::spawn(async move {
            api.delete_bookmark(&session, &id).await;
        });

        DeleteOutcome::Removed
    }

    /// Puts a message in the error container. Fetch failures do not use it.
    pub fn show_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.shared.update(|state| {
            state.error_message = Some(message);
        });
    }
}
