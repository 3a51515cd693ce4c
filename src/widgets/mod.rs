//! Page widgets. Each one is a [`Component`](crate::events::Component)
//! mounted during page-ready and driven by host events.

pub mod anchor_scroll;
pub mod focus_outline;
pub mod language_selector;
pub mod lazy_load;
pub mod lightbox;
pub mod mobile_menu;
pub mod scroll;
pub mod slider;

pub use anchor_scroll::AnchorScroll;
pub use focus_outline::FocusOutline;
pub use language_selector::{
    highlight_active_language, render_current_language, render_option_flags, LanguageSelector,
};
pub use lazy_load::LazyLoader;
pub use lightbox::Lightbox;
pub use mobile_menu::{close_mobile_menu, MobileMenu};
pub use scroll::{ScrollToTop, SmoothScroll};
pub use slider::Slider;
