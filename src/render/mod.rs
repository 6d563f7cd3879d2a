use crate::dashboard::{ BookmarkCard, CardState, DashboardSnapshot, DashboardView };
use crate::formatter::{ escape_attribute, escape_html };
use percent_encoding::{ utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC };

/// Everything outside the RFC 3986 unreserved set.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

const EMPTY_STATE_ICON: &str = r#"<svg fill="none" stroke="currentColor" viewBox="0 0 24 24"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M5 5a2 2 0 012-2h10a2 2 0 012 2v16l-7-3.5L5 21V5z"></path></svg>"#;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #f5f6fa; margin: 0; padding: 2rem; }
.toolbar { display: flex; justify-content: space-between; align-items: center; }
.bookmark-card { background: #fff; border-radius: 8px; padding: 1rem 1.5rem; margin: 1rem 0; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
.bookmark-card.removing { animation: fadeOut 0.3s ease-out forwards; }
.card-header { display: flex; justify-content: flex-end; }
.section-label { font-size: .75rem; text-transform: uppercase; color: #888; margin-top: .75rem; }
.no-reference { color: #aaa; font-style: italic; }
.empty-state { text-align: center; color: #666; padding: 4rem 0; }
.empty-state svg { width: 64px; height: 64px; }
.error-message { background: #fdecea; color: #b71c1c; padding: .75rem 1rem; border-radius: 6px; }
.modal { position: fixed; inset: 0; background: rgba(0,0,0,.4); display: flex; align-items: center; justify-content: center; }
.modal-content { background: #fff; padding: 1.5rem; border-radius: 8px; }
.modal-dismiss { position: absolute; inset: 0; width: 100%; height: 100%; opacity: 0; border: 0; }
@keyframes fadeOut { from { opacity: 1; } to { opacity: 0; transform: translateX(-20px); } }
"#;

/// Turns dashboard snapshots into a display surface.
pub trait Renderer: Send + Sync {
    fn render_card(&self, card: &BookmarkCard) -> String;

    fn render_empty_state(&self) -> String;

    fn render_bookmarks(&self, cards: &[BookmarkCard]) -> String {
        cards
            .iter()
            .map(|card| self.render_card(card))
            .collect()
    }

    /// Everything below the toolbar for the given snapshot.
    fn render_view(&self, snapshot: &DashboardSnapshot) -> String {
        match snapshot.view {
            DashboardView::Loading => String::new(),
            DashboardView::Empty => self.render_empty_state(),
            DashboardView::Bookmarks => self.render_bookmarks(&snapshot.cards),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn refresh_button(&self, snapshot: &DashboardSnapshot) -> String {
        if snapshot.refresh_enabled {
            r#"<form method="post" action="/refresh"><button id="refresh-btn" type="submit">🔄 Refresh Bookmarks</button></form>"#.to_string()
        } else {
            r#"<form method="post" action="/refresh"><button id="refresh-btn" type="submit" disabled>🔄 Refreshing...</button></form>"#.to_string()
        }
    }

    fn confirmation_modal(&self) -> String {
        r#"<div id="confirmation-modal" class="modal show">
<form method="post" action="/dismiss"><button class="modal-dismiss" type="submit" aria-label="Close"></button></form>
<div class="modal-content">
<h3>Remove Bookmark?</h3>
<p>Are you sure you want to remove this bookmark?</p>
<form method="post" action="/confirm">
<button id="cancel-delete-btn" type="submit" name="confirm" value="false">Cancel</button>
<button id="confirm-delete-btn" type="submit" name="confirm" value="true">Remove</button>
</form>
</div>
</div>"#.to_string()
    }

    pub fn render_page(&self, snapshot: &DashboardSnapshot) -> String {
        let mut page = String::new();
        page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        page.push_str("<title>Bookmarks</title>\n<style>");
        page.push_str(STYLE);
        page.push_str("</style>\n</head>\n<body>\n<div class=\"toolbar\"><h1>My Bookmarks</h1>");
        page.push_str(&self.refresh_button(snapshot));
        page.push_str("</div>\n<div id=\"error-container\">");
        if let Some(message) = &snapshot.error_message {
            page.push_str(&format!("<div class=\"error-message\">{}</div>", escape_html(message)));
        }
        page.push_str("</div>\n");
        if snapshot.loading {
            page.push_str("<div id=\"loading\" class=\"loading\">Loading bookmarks...</div>\n");
        }
        match snapshot.view {
            DashboardView::Bookmarks => {
                page.push_str("<div id=\"bookmarks-container\">");
                page.push_str(&self.render_view(snapshot));
                page.push_str("</div>\n");
            }
            DashboardView::Empty => page.push_str(&self.render_view(snapshot)),
            DashboardView::Loading => {}
        }
        if snapshot.confirming.is_some() {
            page.push_str(&self.confirmation_modal());
        }
        page.push_str("\n</body>\n</html>\n");
        page
    }
}

impl Renderer for HtmlRenderer {
    fn render_card(&self, card: &BookmarkCard) -> String {
        let bookmark = &card.bookmark;
        let class = match card.state {
            CardState::Visible => "bookmark-card",
            CardState::PendingRemoval => "bookmark-card removing",
        };
        let links = match bookmark.reference_link.as_deref().map(str::trim) {
            Some(link) if !link.is_empty() => {
                format!(
                    r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                    escape_attribute(link),
                    escape_html(link)
                )
            }
            _ => r#"<span class="no-reference">No reference links available</span>"#.to_string(),
        };
        let query_id = escape_attribute(&bookmark.query_id);

        format!(
            r#"<div class="{class}" data-query-id="{query_id}">
<div class="card-header"><form method="post" action="/remove/{action_id}"><button class="remove-bookmark-btn" type="submit" title="Remove bookmark">Remove Bookmark</button></form></div>
<div class="query-section"><div class="section-label">Query</div><div class="query-text">{query}</div></div>
<div class="query-section"><div class="section-label">Response</div><div class="response-text">{response}</div></div>
<div class="query-section"><div class="section-label">Reference Links</div><div class="reference-links">{links}</div></div>
</div>
"#,
            action_id = url_path_segment(&bookmark.query_id),
            query = escape_html(&bookmark.query),
            response = bookmark.response_html
        )
    }

    fn render_empty_state(&self) -> String {
        format!(
            "<div id=\"empty-state\" class=\"empty-state\">{}<h2>No Bookmarks Yet</h2><p>Your bookmarked queries will appear here</p></div>\n",
            EMPTY_STATE_ICON
        )
    }
}

fn url_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}
