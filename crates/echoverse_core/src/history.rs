//! crates/echoverse_core/src/history.rs
//!
//! Presentational rendering of a session's narration history.

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::NarrationEntry;

pub const SIDEBAR_SNIPPET_CHARS: usize = 60;
pub const PAST_NARRATIONS_SNIPPET_CHARS: usize = 180;

const ELLIPSIS: char = '…';

/// Where the history is shown. Each call site has its own snippet length and markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLayout {
    Sidebar,
    PastNarrations,
}

impl HistoryLayout {
    pub fn snippet_chars(&self) -> usize {
        match self {
            HistoryLayout::Sidebar => SIDEBAR_SNIPPET_CHARS,
            HistoryLayout::PastNarrations => PAST_NARRATIONS_SNIPPET_CHARS,
        }
    }

    fn empty_markup(&self) -> &'static str {
        match self {
            HistoryLayout::Sidebar => r#"<div class="hist-empty">No narrations yet.</div>"#,
            HistoryLayout::PastNarrations => r#"<p class="muted">No past narrations yet.</p>"#,
        }
    }

    fn item_markup(&self, when: &str, snippet: &str) -> String {
        match self {
            HistoryLayout::Sidebar => format!(
                r#"<div class="hist-item"><div class="hist-time">{}</div><div class="hist-text">🗣️ {}</div></div>"#,
                when, snippet
            ),
            HistoryLayout::PastNarrations => {
                format!(r#"<div class="card"><b>{}</b><br>{}</div>"#, when, snippet)
            }
        }
    }
}

/// Renders the history most-recent-first. Every piece of user text is escaped.
pub fn render_history(history: &[NarrationEntry], layout: HistoryLayout) -> String {
    if history.is_empty() {
        return layout.empty_markup().to_string();
    }

    history
        .iter()
        .rev()
        .map(|entry| {
            let snip = escape_html(&snippet(&entry.text, layout.snippet_chars()));
            layout.item_markup(&escape_html(&entry.timestamp()), &snip)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cuts `text` to at most `limit` characters, appending an ellipsis when anything was cut.
///
/// A cut that would split a character reference such as `&amp;` moves back to
/// its `&`, so a snippet never ends in half an entity.
pub fn snippet(text: &str, limit: usize) -> String {
    let cut = match text.char_indices().nth(limit) {
        Some((idx, _)) => idx,
        None => return text.to_string(),
    };
    let cut = text[..cut]
        .rfind('&')
        .and_then(|amp| entity_regex().find(&text[amp..]).map(|m| (amp, amp + m.end())))
        .filter(|&(_, end)| end > cut)
        .map_or(cut, |(amp, _)| amp);

    let mut out = text[..cut].to_string();
    out.push(ELLIPSIS);
    out
}

/// Escapes markup-significant characters.
///
/// An `&` that already starts a character reference (`&amp;`, `&#60;`, `&#x3c;`)
/// is kept, so escaping escaped text is a no-op.
pub fn escape_html(text: &str) -> String {
    escape(text, true)
}

/// Escapes every markup-significant character, `&` included, so the browser
/// shows exactly `text`. Form values must go through this one: they are
/// submitted back verbatim.
pub fn escape_text(text: &str) -> String {
    escape(text, false)
}

fn entity_regex() -> &'static Regex {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    ENTITY.get_or_init(|| {
        Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]{1,31}|#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6});")
            .expect("Failed to compile entity regex")
    })
}

fn escape(text: &str, keep_entities: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, c) in text.char_indices() {
        match c {
            '&' if keep_entities && entity_regex().is_match(&text[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
