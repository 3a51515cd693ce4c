//! The browsing context a page runs in.
//!
//! [`Page`] bundles the document with everything else the enhancement layer
//! reads or writes: the URL and session history, viewport scroll state, client
//! storage, a timer queue, and the navigation the page asked the host to
//! perform. The host owns the page and drives time and events.

use crate::dom::Document;
use crate::i18n::storage::PreferenceStore;
use std::collections::VecDeque;
use std::time::Duration;
use url::Url;

/// How a scroll request should animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// A scroll performed by a component, recorded for the host to animate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// Scroll requests kept in [`Viewport::scroll_log`].
pub const SCROLL_LOG_CAPACITY: usize = 32;

/// Window metrics and scroll position.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Current vertical scroll offset
    pub scroll_y: f64,
    /// Visible height of the window
    pub height: f64,
    /// Window width including the vertical scrollbar
    pub inner_width: f64,
    /// Document width excluding the vertical scrollbar
    pub client_width: f64,
    /// The most recent scrolls issued through [`Viewport::scroll_to`], oldest
    /// first, capped at [`SCROLL_LOG_CAPACITY`]
    pub scroll_log: VecDeque<ScrollRequest>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_y: 0.0,
            height: 800.0,
            inner_width: 1280.0,
            client_width: 1265.0,
            scroll_log: VecDeque::with_capacity(SCROLL_LOG_CAPACITY),
        }
    }
}

impl Viewport {
    /// Scroll the window. Offsets are clamped at zero.
    pub fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        let top = top.max(0.0);
        self.scroll_y = top;
        if self.scroll_log.len() == SCROLL_LOG_CAPACITY {
            self.scroll_log.pop_front();
        }
        self.scroll_log.push_back(ScrollRequest { top, behavior });
    }

    pub fn last_scroll(&self) -> Option<ScrollRequest> {
        self.scroll_log.back().copied()
    }

    /// Width taken by the vertical scrollbar.
    pub fn scrollbar_width(&self) -> f64 {
        (self.inner_width - self.client_width).max(0.0)
    }
}

/// Identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    due: Duration,
    interval: Option<Duration>,
}

/// Deterministic timer queue driven by [`TimerQueue::advance`].
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule a one-shot timer.
    pub fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.schedule(delay, None)
    }

    /// Schedule a repeating timer. A zero period is bumped to one millisecond
    /// so `advance` always terminates.
    pub fn set_interval(&mut self, period: Duration) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.schedule(period, Some(period))
    }

    fn schedule(&mut self, delay: Duration, interval: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay,
            interval,
        });
        id
    }

    /// Cancel a timer. Unknown ids are ignored.
    pub fn clear(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Absolute time of the earliest pending timer.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Move the clock forward and return every firing, in due order. An
    /// interval spanning several periods fires once per period.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerId> {
        let target = self.now + by;
        let mut fired = Vec::new();

        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= target)
                .min_by_key(|(_, t)| (t.due, t.id))
                .map(|(index, _)| index);

            let Some(index) = next else { break };
            let Timer { id, due, interval } = self.timers[index].clone();
            self.now = due;
            fired.push(id);
            match interval {
                Some(period) => self.timers[index].due += period,
                None => {
                    self.timers.remove(index);
                }
            }
        }

        self.now = target;
        fired
    }
}

/// Browser features the host provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub intersection_observer: bool,
    pub service_worker: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            service_worker: true,
        }
    }
}

/// One loaded page.
pub struct Page {
    pub document: Document,
    pub viewport: Viewport,
    pub timers: TimerQueue,
    pub capabilities: Capabilities,
    storage: Box<dyn PreferenceStore>,
    history: Vec<Url>,
    navigation: Option<Url>,
}

impl Page {
    pub fn new(url: Url, document: Document, storage: Box<dyn PreferenceStore>) -> Self {
        Self {
            document,
            viewport: Viewport::default(),
            timers: TimerQueue::default(),
            capabilities: Capabilities::default(),
            storage,
            history: vec![url],
            navigation: None,
        }
    }

    // ==================== Location & history ====================

    /// Current URL.
    pub fn url(&self) -> &Url {
        // history always holds at least the initial entry
        &self.history[self.history.len() - 1]
    }

    /// `origin + pathname`, without query or fragment.
    pub fn base_url(&self) -> String {
        let url = self.url();
        format!("{}{}", url.origin().ascii_serialization(), url.path())
    }

    pub fn path(&self) -> &str {
        self.url().path()
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url()
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Fragment without the leading `#`, empty when absent.
    pub fn hash(&self) -> &str {
        self.url().fragment().unwrap_or("")
    }

    /// Replace the current history entry without navigating.
    pub fn replace_state(&mut self, url: Url) {
        let last = self.history.len() - 1;
        self.history[last] = url;
    }

    /// Add a history entry without navigating.
    pub fn push_state(&mut self, url: Url) {
        self.history.push(url);
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Remove one query parameter from the visible URL (history replace).
    pub fn strip_query_param(&mut self, name: &str) {
        let mut url = self.url().clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != name)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
        self.replace_state(url);
    }

    /// Replace the URL with the bare path (drops query and fragment).
    pub fn replace_with_path(&mut self) {
        let mut url = self.url().clone();
        url.set_query(None);
        url.set_fragment(None);
        self.replace_state(url);
    }

    // ==================== Navigation ====================

    /// Ask the host to load `url`. The last request wins.
    pub fn navigate(&mut self, url: Url) {
        self.navigation = Some(url);
    }

    /// Equivalent of assigning `location.search`: reload the current path
    /// with a new query string.
    pub fn navigate_with_query(&mut self, query: &str) {
        let mut url = self.url().clone();
        url.set_query(Some(query));
        url.set_fragment(None);
        self.navigate(url);
    }

    pub fn pending_navigation(&self) -> Option<&Url> {
        self.navigation.as_ref()
    }

    pub fn take_navigation(&mut self) -> Option<Url> {
        self.navigation.take()
    }

    // ==================== Storage ====================

    pub fn storage(&self) -> &dyn PreferenceStore {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> &mut dyn PreferenceStore {
        self.storage.as_mut()
    }

    /// Give the storage back, e.g. to carry it across a navigation.
    pub fn into_storage(self) -> Box<dyn PreferenceStore> {
        self.storage
    }
}
