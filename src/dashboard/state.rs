use crate::models::bookmark::{ FetchFailure, FormattedBookmark };
use serde::{ Deserialize, Serialize };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    Visible,
    /// Already gone from the list, still on screen for its exit animation.
    PendingRemoval,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkCard {
    pub bookmark: FormattedBookmark,
    pub state: CardState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardView {
    Loading,
    Empty,
    Bookmarks,
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub loading: bool,
    /// The displayed list, keyed by `query_id`.
    pub bookmarks: Vec<FormattedBookmark>,
    /// Cards removed from `bookmarks` whose exit delay has not elapsed yet,
    /// with their slot in `cards()`, ascending by slot.
    pub exiting: Vec<(usize, FormattedBookmark)>,
    pub confirming: Option<String>,
    pub error_message: Option<String>,
    pub last_failure: Option<FetchFailure>,
    pub refreshed_at: Option<i64>,
}

impl DashboardState {
    pub fn view(&self) -> DashboardView {
        if self.loading {
            DashboardView::Loading
        } else if self.bookmarks.is_empty() && self.exiting.is_empty() {
            DashboardView::Empty
        } else {
            DashboardView::Bookmarks
        }
    }

    pub fn position(&self, query_id: &str) -> Option<usize> {
        self.bookmarks.iter().position(|b| b.query_id == query_id)
    }

    /// Takes a bookmark out of the list. With `keep_on_screen` it stays in
    /// `cards()` as `PendingRemoval` at the slot it occupied.
    pub fn remove(&mut self, query_id: &str, keep_on_screen: bool) -> Option<FormattedBookmark> {
        let index = self.position(query_id)?;
        let slot = self
            .cards()
            .iter()
            .position(|c| c.state == CardState::Visible && c.bookmark.query_id == query_id)
            .unwrap_or(index);
        let bookmark = self.bookmarks.remove(index);
        if keep_on_screen {
            let at = self.exiting.partition_point(|(s, _)| *s < slot);
            self.exiting.insert(at, (slot, bookmark.clone()));
        }
        Some(bookmark)
    }

    /// Drops an exiting card once its delay has passed.
    pub fn finish_exit(&mut self, query_id: &str) {
        let Some(i) = self.exiting.iter().position(|(_, b)| b.query_id == query_id) else {
            return;
        };
        let (slot, _) = self.exiting.remove(i);
        for (s, _) in self.exiting.iter_mut() {
            if *s > slot {
                *s -= 1;
            }
        }
    }

    pub fn cards(&self) -> Vec<BookmarkCard> {
        let mut cards: Vec<BookmarkCard> = self.bookmarks
            .iter()
            .cloned()
            .map(|bookmark| BookmarkCard { bookmark, state: CardState::Visible })
            .collect();

        for (index, bookmark) in &self.exiting {
            let card = BookmarkCard { bookmark: bookmark.clone(), state: CardState::PendingRemoval };
            let at = (*index).min(cards.len());
            cards.insert(at, card);
        }
        cards
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            loading: self.loading,
            refresh_enabled: !self.loading,
            view: self.view(),
            cards: self.cards(),
            confirming: self.confirming.clone(),
            error_message: self.error_message.clone(),
            last_failure: self.last_failure.clone(),
            refreshed_at: self.refreshed_at,
        }
    }
}

/// What a presentation layer needs to draw the dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub loading: bool,
    pub refresh_enabled: bool,
    pub view: DashboardView,
    pub cards: Vec<BookmarkCard>,
    pub confirming: Option<String>,
    pub error_message: Option<String>,
    pub last_failure: Option<FetchFailure>,
    pub refreshed_at: Option<i64>,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        DashboardState::default().snapshot()
    }
}

impl DashboardSnapshot {
    pub fn visible_ids(&self) -> Vec<&str> {
        self.cards
            .iter()
            .filter(|c| c.state == CardState::Visible)
            .map(|c| c.bookmark.query_id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(id: &str) -> FormattedBookmark {
        FormattedBookmark {
            id: id.into(),
            query_id: id.into(),
            query: format!("query {}", id),
            response_html: String::new(),
            reference_link: None,
            is_bookmark: true,
        }
    }

    #[test]
    fn view_follows_state() {
        let mut state = DashboardState::default();
        assert_eq!(state.view(), DashboardView::Empty);

        state.loading = true;
        assert_eq!(state.view(), DashboardView::Loading);
        assert!(!state.snapshot().refresh_enabled);

        state.loading = false;
        state.exiting.push((0, bookmark("a")));
        assert_eq!(state.view(), DashboardView::Bookmarks);
    }

    #[test]
    fn exiting_cards_keep_their_slot() {
        let state = DashboardState {
            bookmarks: vec![bookmark("a"), bookmark("c")],
            exiting: vec![(1, bookmark("b"))],
            ..Default::default()
        };
        let cards = state.cards();
        let ids: Vec<&str> = cards.iter().map(|c| c.bookmark.query_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(cards[1].state, CardState::PendingRemoval);
        assert_eq!(state.snapshot().visible_ids(), ["a", "c"]);
    }

    fn ids(state: &DashboardState) -> Vec<String> {
        state.cards().into_iter().map(|c| c.bookmark.query_id).collect()
    }

    #[test]
    fn adjacent_exits_keep_list_order() {
        let mut state = DashboardState {
            bookmarks: vec![bookmark("a"), bookmark("b"), bookmark("c")],
            ..Default::default()
        };

        state.remove("a", true);
        state.remove("b", true);
        assert_eq!(ids(&state), ["a", "b", "c"]);
        assert_eq!(state.snapshot().visible_ids(), ["c"]);

        state.finish_exit("a");
        assert_eq!(ids(&state), ["b", "c"]);

        state.remove("c", true);
        state.finish_exit("b");
        assert_eq!(ids(&state), ["c"]);
        state.finish_exit("c");
        assert_eq!(state.view(), DashboardView::Empty);
    }

    #[test]
    fn exits_out_of_order_keep_list_order() {
        let mut state = DashboardState {
            bookmarks: vec![bookmark("a"), bookmark("b"), bookmark("c"), bookmark("d")],
            ..Default::default()
        };

        state.remove("c", true);
        state.remove("a", true);
        state.remove("b", true);
        assert_eq!(ids(&state), ["a", "b", "c", "d"]);

        state.finish_exit("b");
        assert_eq!(ids(&state), ["a", "c", "d"]);
    }

    #[test]
    fn removal_without_exit_leaves_no_card() {
        let mut state = DashboardState {
            bookmarks: vec![bookmark("a"), bookmark("b")],
            ..Default::default()
        };
        assert_eq!(state.remove("a", false).map(|b| b.query_id), Some("a".to_string()));
        assert!(state.remove("zzz", true).is_none());
        assert_eq!(ids(&state), ["b"]);
    }
}
