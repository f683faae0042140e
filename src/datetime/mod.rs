//! Datetime formatting module
//!
//! Maps template identifiers to timestamp patterns and renders the current time.

pub mod engine;
pub mod templates;

pub use engine::{Clock, DatetimeFormatter, SystemClock};
pub use templates::{FormatId, Template, TemplateTable};
