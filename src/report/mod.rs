//! Report renderers.
//!
//! - [`json`] — the machine-readable document, one per run; the default.
//! - [`terminal`] — colored summary box and an update-recommendation table.

pub mod json;
pub mod terminal;
