//! Output renderers for normalized records

pub mod html;
pub mod json;

pub use html::{escape_html, render_table, Theme};
pub use json::render_json;
