//! # Row Rendering
//!
//! Turns a `Dependency` into the markup of one row of the dependency table.
//!
//! Merging never depends on markup: callers pick a `RowRenderer` and apply it
//! to the rows `DependencyMerger::merge` returns.

use crate::Dependency;
use crate::primitives::{FIELD_ID_PREFIX, FORM_FIELD_NAME, ROW_ID_PREFIX};
use crate::TriggerId;
use serde::{Deserialize, Serialize};

/// A rendered row, keyed by the trigger it shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedRow {
    pub triggerid: TriggerId,
    pub html: String,
}

/// Renders dependency rows.
///
/// Implementors must be pure: the same dependency always renders the same way.
pub trait RowRenderer: Send + Sync {
    fn render(&self, dependency: &Dependency) -> RenderedRow;

    /// Render several rows, keeping their order.
    fn render_all<'a, I>(&self, dependencies: I) -> Vec<RenderedRow>
    where
        I: IntoIterator<Item = &'a Dependency>,
        Self: Sized,
    {
        dependencies.into_iter().map(|d| self.render(d)).collect()
    }
}

/// The standard table row: hidden form field, edit link, remove button.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRowRenderer;

impl RowRenderer for HtmlRowRenderer {
    fn render(&self, dependency: &Dependency) -> RenderedRow {
        let id = dependency.triggerid.as_str();
        let html = format!(
            concat!(
                "<tr id=\"{row}{id}\" data-triggerid=\"{id}\">",
                "<td>",
                "<input type=\"hidden\" name=\"{field}\" id=\"{field_id}{id}\" value=\"{id}\">",
                "<a href=\"{url}\" target=\"_blank\">{name}</a>",
                "</td>",
                "<td><button type=\"button\" class=\"btn-link\" ",
                "onclick=\"removeDependency('{id}')\">Remove</button></td>",
                "</tr>"
            ),
            row = ROW_ID_PREFIX,
            field = FORM_FIELD_NAME,
            field_id = FIELD_ID_PREFIX,
            id = id,
            url = escape_html(&dependency.url),
            name = escape_html(&dependency.name),
        );

        RenderedRow {
            triggerid: dependency.triggerid.clone(),
            html,
        }
    }
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
