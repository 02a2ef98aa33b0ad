//! Toolkit-independent UI helpers

pub mod popup;

pub use popup::{create_popup_menu, enable_icons, Anchor, MenuItem, MenuResources, PopupContext, PopupMenu};
