//! HTML table renderer
//!
//! Builds a complete, self-contained HTML document. Column headers come
//! from the first record only: keys that appear only in later records are
//! dropped and keys missing from a record render as an empty cell.
//!
//! Every interpolated string (page title, headers, cell values) goes
//! through [`escape_html`], so detection titles containing markup are shown
//! as text.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Write};
use std::str::FromStr;

/// Message shown instead of a table when there are no records
pub const NO_DATA_MESSAGE: &str = "No data available";

/// Styling variant for the table page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light-mode table
    Plain,
    /// Dark neon styling with a latest-detection line and row-count footer
    #[default]
    Cyberpunk,
}

impl Theme {
    fn stylesheet(self) -> &'static str {
        match self {
            Theme::Plain => PLAIN_CSS,
            Theme::Cyberpunk => CYBERPUNK_CSS,
        }
    }

    /// Whether the page carries the latest-detection line and footer
    fn decorated(self) -> bool {
        matches!(self, Theme::Cyberpunk)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Plain => write!(f, "plain"),
            Theme::Cyberpunk => write!(f, "cyberpunk"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(Theme::Plain),
            "cyberpunk" => Ok(Theme::Cyberpunk),
            other => Err(format!("unknown theme '{}' (expected plain or cyberpunk)", other)),
        }
    }
}

/// Escape text for use in HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Key read from the first record for the latest-detection line
const TIMESTAMP_KEY: &str = "timestamp";

/// Text shown in a table cell for a record value
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render records as an HTML document
pub fn render_table(records: &[Record], page_title: &str, theme: Theme) -> String {
    let title = escape_html(page_title);
    let mut html = String::new();

    // Writing into a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{css}</style>\n</head>\n<body>\n<h1>{title}</h1>\n",
        title = title,
        css = theme.stylesheet(),
    );

    // Records arrive newest first; sources without timestamps get no line
    let latest = records
        .first()
        .filter(|_| theme.decorated())
        .map(|first| cell_text(first.get(TIMESTAMP_KEY)))
        .filter(|text| !text.is_empty());
    if let Some(latest) = latest {
        let _ = writeln!(
            html,
            "<p class=\"stats\">Latest detection: {}</p>",
            escape_html(&latest)
        );
    }

    match records.first() {
        None => {
            let _ = writeln!(html, "<p class=\"no-data\">{}</p>", NO_DATA_MESSAGE);
        }
        Some(first) => {
            let headers: Vec<&str> = first.keys().collect();

            html.push_str("<table>\n<thead>\n<tr>");
            for header in &headers {
                let _ = write!(html, "<th>{}</th>", escape_html(header));
            }
            html.push_str("</tr>\n</thead>\n<tbody>\n");

            for record in records {
                html.push_str("<tr>");
                for header in &headers {
                    let _ = write!(html, "<td>{}</td>", escape_html(&cell_text(record.get(header))));
                }
                html.push_str("</tr>\n");
            }

            html.push_str("</tbody>\n</table>\n");
        }
    }

    if theme.decorated() {
        let _ = writeln!(html, "<footer>Showing {} rows</footer>", records.len());
    }

    html.push_str("</body>\n</html>\n");
    html
}

const PLAIN_CSS: &str = r#"
body { font-family: Arial, sans-serif; margin: 20px; color: #222; background: #fff; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: 8px; border: 1px solid #ddd; }
tr:nth-child(even) { background-color: #f2f2f2; }
th { background-color: #4caf50; color: white; }
.no-data { font-style: italic; color: #666; }
"#;

const CYBERPUNK_CSS: &str = r#"
body { background-color: #0a0a0f; color: #00ff66; font-family: 'Courier New', monospace; margin: 0; padding: 20px; }
h1 { color: #ff00aa; text-shadow: 0 0 5px #ff00aa, 0 0 10px #ff00aa; text-transform: uppercase; letter-spacing: 2px; }
.stats { color: #00ccff; }
table { border-collapse: collapse; width: 100%; background-color: rgba(10, 10, 15, 0.8); border: 1px solid #00ccff; box-shadow: 0 0 15px #00ccff; }
th, td { text-align: left; padding: 10px; border: 1px solid #00ccff; }
tbody tr:nth-child(even) { background-color: rgba(0, 204, 255, 0.1); }
tbody tr:hover { background-color: rgba(255, 0, 170, 0.2); }
th { background-color: #000033; color: #00ff66; text-transform: uppercase; border-bottom: 2px solid #ff00aa; }
.no-data { color: #ff00aa; }
footer { margin-top: 12px; color: #00ccff; font-size: 0.9em; }
"#;
