//! Typed page events and component registration.
//!
//! Widgets implement [`Component`] and are mounted into a
//! [`ComponentRegistry`]. The host turns browser input into [`PageEvent`]s
//! and dispatches them; every mounted component sees every event, in mount
//! order, and decides for itself whether the event concerns it.

use crate::dom::NodeId;
use crate::page::{Page, TimerId};
use tracing::debug;

/// Keyboard keys the components react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Tab,
    Escape,
    Enter,
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Input delivered to mounted components.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Click { target: NodeId },
    MouseDown { target: NodeId },
    KeyDown { key: Key, shift: bool },
    KeyUp { key: Key },
    /// The viewport scroll offset changed
    Scroll,
    /// The window finished loading
    Load,
    Timer(TimerId),
    TransitionEnd { target: NodeId },
    AnimationEnd { target: NodeId, animation_name: String },
}

/// Per-dispatch state shared by the components handling one event.
#[derive(Debug, Default)]
pub struct EventContext {
    default_prevented: bool,
}

impl EventContext {
    /// Suppress the host's default action (following a link, for example).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A widget that can be mounted on a page.
pub trait Component {
    fn name(&self) -> &'static str;

    /// Called once when mounted.
    fn mount(&mut self, _page: &mut Page) {}

    /// Called once when unmounted. Components holding timers cancel them here.
    fn unmount(&mut self, _page: &mut Page) {}

    fn handle(&mut self, page: &mut Page, event: &PageEvent, ctx: &mut EventContext);
}

/// Handle returned by [`ComponentRegistry::mount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Result of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
}

/// Mounted components, in mount order.
#[derive(Default)]
pub struct ComponentRegistry {
    next_id: u64,
    components: Vec<(HandlerId, Box<dyn Component>)>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, page: &mut Page, mut component: Box<dyn Component>) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        component.mount(page);
        debug!("Mounted component '{}'", component.name());
        self.components.push((id, component));
        id
    }

    /// Unmount a component and run its teardown. Returns false for unknown ids.
    pub fn unmount(&mut self, page: &mut Page, id: HandlerId) -> bool {
        let Some(index) = self.components.iter().position(|(cid, _)| *cid == id) else {
            return false;
        };
        let (_, mut component) = self.components.remove(index);
        component.unmount(page);
        debug!("Unmounted component '{}'", component.name());
        true
    }

    /// Unmount everything, newest first.
    pub fn unmount_all(&mut self, page: &mut Page) {
        while let Some((_, mut component)) = self.components.pop() {
            component.unmount(page);
        }
    }

    pub fn is_mounted(&self, id: HandlerId) -> bool {
        self.components.iter().any(|(cid, _)| *cid == id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Names of mounted components, in mount order.
    pub fn names(&self) -> Vec<&'static str> {
        self.components.iter().map(|(_, c)| c.name()).collect()
    }

    pub fn dispatch(&mut self, page: &mut Page, event: &PageEvent) -> DispatchOutcome {
        let mut ctx = EventContext::default();
        for (_, component) in self.components.iter_mut() {
            component.handle(page, event, &mut ctx);
        }
        DispatchOutcome {
            default_prevented: ctx.default_prevented(),
        }
    }
}
