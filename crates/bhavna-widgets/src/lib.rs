//! Terminal widgets for the **bhavna** client.
//!
//! Stateful widgets implement [`bhavna_core::Component`] so they can be
//! embedded in a [`bhavna_core::Model`]; the rest are plain render helpers.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`text_box`] | Multi-line text entry with a status slot in its border |
//! | [`spinner`] | Loading indicator driven by a frame timer |
//! | [`key`] | Key bindings with exact-modifier matching and hint labels |
//! | [`hint_bar`] | Footer listing key hints and a status note |
//! | [`chrome`] | Focus-aware panel borders and banner styling |

pub mod chrome;
pub mod hint_bar;
pub mod key;
pub mod spinner;
pub mod text_box;
