//! `a[data-scroll]` navigation with a fixed-header offset.
//!
//! Scrolling is deferred to an idle delay so a closing mobile menu can settle,
//! then re-applied a few times in case late content shifts the target.

use super::mobile_menu::close_mobile_menu;
use super::scroll::element_top;
use crate::dom::Document;
use crate::events::{Component, EventContext, PageEvent};
use crate::page::{Page, ScrollBehavior, TimerId};
use std::time::Duration;
use tracing::debug;

const CLICK_IDLE_DELAY: Duration = Duration::from_millis(200);
const LOAD_IDLE_DELAY: Duration = Duration::from_millis(300);
const RETRY_DELAY: Duration = Duration::from_millis(100);
const MAX_RETRIES: u32 = 3;

/// Targets that always mean the top of the page.
const TOP_TARGETS: &[&str] = &["home", "preface"];

#[derive(Debug, Clone, PartialEq)]
enum ScrollJob {
    /// First scroll after the idle delay; also cleans the URL.
    Initial { target: String },
    Retry { target: String, attempt: u32 },
}

fn nav_height(doc: &Document) -> f64 {
    doc.query_first(|d, n| d.tag(n) == Some("nav"))
        .and_then(|nav| doc.layout(nav))
        .map(|rect| rect.height)
        .unwrap_or(0.0)
}

pub struct AnchorScroll {
    offset: f64,
    jobs: Vec<(TimerId, ScrollJob)>,
}

impl AnchorScroll {
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            jobs: Vec::new(),
        }
    }

    /// Timers still waiting to scroll.
    pub fn pending(&self) -> usize {
        self.jobs.len()
    }

    fn schedule(&mut self, page: &mut Page, delay: Duration, job: ScrollJob) {
        let id = page.timers.set_timeout(delay);
        self.jobs.push((id, job));
    }

    fn scroll_to_target(&mut self, page: &mut Page, target: &str, attempt: u32) {
        if TOP_TARGETS.contains(&target) {
            page.viewport.scroll_to(0.0, ScrollBehavior::Smooth);
            return;
        }
        let Some(element) = page.document.element_by_id(target) else {
            debug!("Scroll target '{}' not found", target);
            return;
        };

        let top = element_top(&page.document, element) - nav_height(&page.document) - self.offset;
        page.viewport.scroll_to(top, ScrollBehavior::Smooth);

        if attempt < MAX_RETRIES {
            let job = ScrollJob::Retry {
                target: target.to_string(),
                attempt: attempt + 1,
            };
            self.schedule(page, RETRY_DELAY, job);
        }
    }

    fn run(&mut self, page: &mut Page, job: ScrollJob) {
        match job {
            ScrollJob::Initial { target } => {
                self.scroll_to_target(page, &target, 0);
                page.replace_with_path();
            }
            ScrollJob::Retry { target, attempt } => self.scroll_to_target(page, &target, attempt),
        }
    }
}

impl Component for AnchorScroll {
    fn name(&self) -> &'static str {
        "anchor-scroll"
    }

    fn unmount(&mut self, page: &mut Page) {
        for (id, _) in self.jobs.drain(..) {
            page.timers.clear(id);
        }
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent, ctx: &mut EventContext) {
        match event {
            PageEvent::Click { target } => {
                let doc = &page.document;
                let Some(link) = doc.closest(*target, |d, n| d.tag(n) == Some("a") && d.has_attr(n, "data-scroll"))
                else {
                    return;
                };
                let scroll_target = doc.attr(link, "data-scroll").unwrap_or_default().to_string();

                ctx.prevent_default();
                close_mobile_menu(&mut page.document);
                self.schedule(page, CLICK_IDLE_DELAY, ScrollJob::Initial { target: scroll_target });
            }
            PageEvent::Load => {
                let hash = page.hash().to_string();
                if hash.is_empty() || TOP_TARGETS.contains(&hash.as_str()) {
                    return;
                }
                self.schedule(page, LOAD_IDLE_DELAY, ScrollJob::Initial { target: hash });
            }
            PageEvent::Timer(id) => {
                let Some(index) = self.jobs.iter().position(|(job_id, _)| job_id == id) else {
                    return;
                };
                let (_, job) = self.jobs.remove(index);
                self.run(page, job);
            }
            _ => {}
        }
    }
}
