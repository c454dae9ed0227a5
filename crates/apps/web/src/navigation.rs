use protocol::Endpoint;
use runtime::{Slot, Ticket};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::ports::{PageView, Transport};

/// Stored with every history entry so back/forward can restore the page
/// without a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub content: String,
}

/// What the rest of the app has to react to after a navigation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Nothing changed on the page.
    Unchanged,
    /// The content region was swapped.
    ContentReplaced { path: String },
    /// The page is being left with a full navigation.
    FullNavigation,
}

impl NavigationOutcome {
    /// Whether the new content is the root page, which hosts the map.
    pub fn entered_root(&self) -> bool {
        matches!(self, NavigationOutcome::ContentReplaced { path } if path == "/")
    }
}

/// Partial page navigation over `/ajax`.
///
/// Only the most recent link click is honoured: a newer click aborts the
/// pending fetch and its completion is ignored.
#[derive(Debug, Default)]
pub struct NavigationController {
    fetch: Slot,
    pending_href: Option<String>,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owns(&self, ticket: Ticket) -> bool {
        self.fetch.is_live(ticket)
    }

    pub fn pending_href(&self) -> Option<&str> {
        self.pending_href.as_deref()
    }

    /// Handles a click on an internal link. The browser's default navigation
    /// is always cancelled by the caller. Returns whether a fetch started.
    pub fn on_link_click<H: Transport + PageView>(&mut self, href: &str, host: &mut H) -> bool {
        if host.is_link_active(href) {
            debug!(href, "link already active");
            return false;
        }

        let ticket = host.send(Endpoint::page(href));
        if let Some(old) = self.fetch.replace(ticket) {
            debug!(?old, "superseding pending page fetch");
            host.abort(old);
        }
        self.pending_href = Some(href.to_string());
        true
    }

    pub fn on_response<H: PageView>(
        &mut self,
        ticket: Ticket,
        result: Result<String, FetchError>,
        host: &mut H,
    ) -> NavigationOutcome {
        if !self.fetch.settle(ticket) {
            debug!(?ticket, "dropping stale page response");
            return NavigationOutcome::Unchanged;
        }
        let Some(href) = self.pending_href.take() else {
            return NavigationOutcome::Unchanged;
        };

        match result {
            Ok(html) => {
                host.replace_content(&html);
                host.set_active_link(&href);
                host.remove_modal_backdrops();
                host.push_history(&HistoryState { content: html }, &href);
                info!(href = href.as_str(), "page swapped");
                NavigationOutcome::ContentReplaced { path: href }
            }
            Err(FetchError::Aborted) => NavigationOutcome::Unchanged,
            Err(err) => {
                warn!(href = href.as_str(), %err, "partial navigation failed, loading full page");
                host.navigate_full(&href);
                NavigationOutcome::FullNavigation
            }
        }
    }

    /// Stores the markup served with the page on its history entry, so
    /// coming back to it restores without a request.
    pub fn on_page_loaded<H: PageView>(&mut self, path: &str, host: &mut H) {
        let state = HistoryState {
            content: host.content(),
        };
        host.replace_history(&state, path);
    }

    /// Back/forward navigation. Restores stored markup without a request.
    pub fn on_popstate<H: Transport + PageView>(
        &mut self,
        path: &str,
        state: Option<HistoryState>,
        host: &mut H,
    ) -> NavigationOutcome {
        let Some(state) = state else {
            debug!(path, "history entry without stored content");
            return NavigationOutcome::Unchanged;
        };

        if let Some(pending) = self.fetch.take() {
            host.abort(pending);
            self.pending_href = None;
        }

        host.replace_content(&state.content);
        host.set_active_link(path);
        NavigationOutcome::ContentReplaced {
            path: path.to_string(),
        }
    }
}
