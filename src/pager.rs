//! Caller-side pagination state for one provider surface.
//!
//! Providers are stateless, so everything needed to navigate lives here: the
//! page number for page-mode providers, the cursor plus a stack of previously
//! seen cursors for cursor-mode providers (the upstream cannot supply a
//! "previous cursor", so backward navigation replays a remembered one), and
//! the last-used filters for change detection.
//!
//! One pager serves one provider; switching providers means a fresh pager.
//! The flow per request is: [`request`](SearchPager::request) to obtain the
//! [`SearchQuery`] to send (or `None` when the move is refused), then exactly
//! one of [`complete`](SearchPager::complete) or [`abort`](SearchPager::abort)
//! once the search settles.

use crate::api::{PagingMode, PagingStrategy, SearchPage, SearchQuery};
use crate::traits::SearchProvider;

/// The filter values a search surface exposes. Compared against the previous
/// request to detect changes that must reset pagination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub query: String,
    pub model_type: String,
    pub base_model: String,
    pub sort: String,
    pub include_nsfw: bool,
}

/// A navigation intent, applied relative to the pager's current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    /// Jump to the first page, as a fresh search does.
    First,
    /// Go back one step.
    Prev,
    /// Re-issue the current position (retry).
    Stay,
    /// Advance one step.
    Next,
}

/// Navigation state machine for one provider surface.
#[derive(Debug, Clone)]
pub struct SearchPager {
    limit: u32,
    inflight: bool,
    strategy: Option<PagingStrategy>,
    // Cursor mode.
    cursor: String,
    cursor_stack: Vec<String>,
    next_cursor: Option<String>,
    // Page mode.
    page: u32,
    total_pages: u32,
    has_more: bool,
    last: SearchFilters,
}

impl Default for SearchPager {
    fn default() -> Self {
        Self {
            limit: 24,
            inflight: false,
            strategy: None,
            cursor: String::new(),
            cursor_stack: Vec::new(),
            next_cursor: None,
            page: 1,
            total_pages: 1,
            has_more: false,
            last: SearchFilters::default(),
        }
    }
}

impl SearchPager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page size used for every request built by this pager.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Build the next request, or refuse it.
    ///
    /// Returns `None` when a search is already in flight (excess requests are
    /// dropped, not queued) or when the move is impossible from the current
    /// position. A filter or paging-mode change resets to the first page and
    /// overrides whatever move was passed; a filter change is never combined
    /// with page navigation.
    pub fn request(
        &mut self,
        provider: &dyn SearchProvider,
        filters: &SearchFilters,
        mov: PageMove,
    ) -> Option<SearchQuery> {
        if self.inflight {
            return None;
        }

        let filterable = provider.supports_filters();
        let nsfw_capable = provider.supports_nsfw();
        let include_nsfw = nsfw_capable && filters.include_nsfw;

        let filters_changed = self.last.query != filters.query
            || (filterable
                && (self.last.model_type != filters.model_type
                    || self.last.base_model != filters.base_model
                    || self.last.sort != filters.sort))
            || (nsfw_capable && self.last.include_nsfw != include_nsfw);

        self.last.query = filters.query.clone();
        if filterable {
            self.last.model_type = filters.model_type.clone();
            self.last.base_model = filters.base_model.clone();
            self.last.sort = filters.sort.clone();
        }
        self.last.include_nsfw = include_nsfw;

        let strategy = provider.paging(&SearchQuery {
            query: self.last.query.clone(),
            ..SearchQuery::default()
        });
        let mode_changed = self
            .strategy
            .is_some_and(|previous| previous.mode() != strategy.mode());
        self.strategy = Some(strategy);

        if filters_changed || mode_changed {
            self.reset();
        } else if !self.apply_move(strategy, mov) {
            return None;
        }

        if strategy.is_cursor() {
            // Page numbers are meaningless to a cursor upstream.
            self.page = 1;
            self.total_pages = 1;
        }

        self.inflight = true;
        Some(SearchQuery {
            query: self.last.query.clone(),
            page: self.page,
            limit: self.limit,
            cursor: if strategy.is_cursor() {
                self.cursor.clone()
            } else {
                String::new()
            },
            model_type: self.last.model_type.clone(),
            base_model: self.last.base_model.clone(),
            sort: self.last.sort.clone(),
            include_nsfw: self.last.include_nsfw,
        })
    }

    /// Absorb a successful page: adopt the reported position and the next
    /// cursor / totals it carries.
    pub fn complete(&mut self, page: &SearchPage) {
        self.inflight = false;
        match page.mode {
            PagingMode::Cursor => {
                self.next_cursor = page
                    .next_cursor
                    .as_deref()
                    .map(str::trim)
                    .filter(|cursor| !cursor.is_empty())
                    .map(String::from);
            }
            PagingMode::Page => {
                if page.page > 0 {
                    self.page = page.page;
                }
                self.total_pages = page.total_pages.max(1);
                self.has_more = page.has_more.unwrap_or(false);
                self.next_cursor = None;
            }
        }
    }

    /// Absorb a failed search: stay on the current position but withdraw the
    /// forward affordance until a retry succeeds.
    pub fn abort(&mut self) {
        self.inflight = false;
        self.total_pages = 1;
        self.has_more = false;
        self.next_cursor = None;
    }

    /// Whether a forward move would currently be accepted.
    pub fn can_advance(&self) -> bool {
        if self.inflight {
            return false;
        }
        match self.strategy {
            Some(PagingStrategy::Cursor) => self.next_cursor.is_some(),
            Some(PagingStrategy::PageHasMore) => self.has_more,
            Some(PagingStrategy::PageTotal) => self.page < self.total_pages,
            None => false,
        }
    }

    /// Whether a backward move would currently be accepted.
    pub fn can_retreat(&self) -> bool {
        if self.inflight {
            return false;
        }
        match self.strategy {
            Some(PagingStrategy::Cursor) => !self.cursor_stack.is_empty(),
            Some(_) => self.page > 1,
            None => false,
        }
    }

    /// Current 1-based position: the page number in page mode, the cursor
    /// stack depth plus one in cursor mode.
    pub fn position(&self) -> u32 {
        match self.strategy {
            Some(PagingStrategy::Cursor) => self.cursor_stack.len() as u32 + 1,
            _ => self.page,
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_inflight(&self) -> bool {
        self.inflight
    }

    fn reset(&mut self) {
        self.page = 1;
        self.total_pages = 1;
        self.has_more = false;
        self.cursor.clear();
        self.cursor_stack.clear();
        self.next_cursor = None;
    }

    /// Apply `mov` to the paging state. Returns `false` when the move is
    /// impossible and the request must be refused.
    fn apply_move(&mut self, strategy: PagingStrategy, mov: PageMove) -> bool {
        if strategy.is_cursor() {
            match mov {
                PageMove::First => {
                    self.cursor.clear();
                    self.cursor_stack.clear();
                    self.next_cursor = None;
                }
                PageMove::Stay => {}
                PageMove::Next => {
                    let Some(next) = self.next_cursor.take() else {
                        return false;
                    };
                    self.cursor_stack.push(std::mem::take(&mut self.cursor));
                    self.cursor = next;
                }
                PageMove::Prev => {
                    let Some(previous) = self.cursor_stack.pop() else {
                        return false;
                    };
                    self.cursor = previous;
                    self.next_cursor = None;
                }
            }
            return true;
        }

        match mov {
            PageMove::First => self.page = 1,
            PageMove::Stay => {}
            PageMove::Next => {
                let allowed = match strategy {
                    PagingStrategy::PageHasMore => self.has_more,
                    _ => self.page < self.total_pages,
                };
                if !allowed {
                    return false;
                }
                self.page += 1;
            }
            PageMove::Prev => {
                if self.page <= 1 {
                    return false;
                }
                self.page -= 1;
            }
        }
        true
    }
}
