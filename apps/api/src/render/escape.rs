//! Markup escaping and date formatting for rendered fields.

use serde::Serialize;

use super::engine::Form;

/// Target markup of a template. Decides how field values are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    Typst,
    Html,
    Markdown,
}

impl Markup {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Typst => "typst",
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }

    pub fn escape(self, text: &str, form: Form) -> String {
        match (self, form) {
            (Self::Typst, Form::Content) => typst(text),
            (Self::Typst, Form::Literal) => typst_string(text),
            (Self::Html, _) => html(text),
            (Self::Markdown, Form::Content) => markdown(text),
            (Self::Markdown, Form::Literal) => markdown_url(text),
        }
    }
}

/// Typst markup. `/` is escaped so `//` in a URL does not open a comment.
/// Line breaks are folded and a leading heading or list marker is escaped.
pub fn typst(text: &str) -> String {
    escape_block(
        text,
        &['\\', '#', '*', '_', '`', '$', '[', ']', '@', '<', '>', '~', '/'],
        &['=', '-', '+'],
        &['.'],
    )
}

/// Inside a Typst string literal, e.g. `#link("...")`. `@` stays as is.
pub fn typst_string(text: &str) -> String {
    backslash_escape(text, &['\\', '"'])
}

pub fn html(text: &str) -> String {
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

/// Markdown text. Line breaks are folded and a leading list marker or setext
/// underline is escaped.
pub fn markdown(text: &str) -> String {
    escape_block(
        text,
        &['\\', '*', '_', '`', '#', '[', ']', '<', '>'],
        &['-', '+', '='],
        &['.', ')'],
    )
}

/// Destination of a `[text](<url>)` link.
pub fn markdown_url(text: &str) -> String {
    text.replace('<', "%3C").replace('>', "%3E").replace(' ', "%20")
}

/// A field value always lands on one line, so only its first character can
/// start a block-level construct.
fn escape_block(text: &str, special: &[char], markers: &[char], enumerators: &[char]) -> String {
    let folded = fold_lines(text);
    let mut out = backslash_escape(&folded, special);

    let digits = folded.bytes().take_while(u8::is_ascii_digit).count();
    if folded.starts_with(markers) {
        out.insert(0, '\\');
    } else if digits > 0 && folded[digits..].starts_with(enumerators) {
        // Digits are never in `special`, so offsets match.
        out.insert(digits, '\\');
    }
    out
}

fn fold_lines(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn backslash_escape(text: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Dates
// ────────────────────────────────────────────────────────────────────────────

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `MM/YYYY` and `YYYY-MM[-DD]` become `Mon YYYY`; empty or "present" become
/// `Present`; anything else is kept verbatim.
pub fn format_date(raw: &str) -> String {
    let date = raw.trim();
    if date.is_empty() || date.eq_ignore_ascii_case("present") {
        return "Present".to_string();
    }

    let parsed = if let Some((month, year)) = date.split_once('/') {
        month_year(month, year)
    } else {
        let mut parts = date.splitn(3, '-');
        match (parts.next(), parts.next()) {
            (Some(year), Some(month)) if parts.next().map_or(true, is_day) => month_year(month, year),
            _ => None,
        }
    };
    parsed.unwrap_or_else(|| date.to_string())
}

/// `start – end`. A missing end means the entry is current.
pub fn format_range(start: &str, end: &str) -> String {
    match (start.trim().is_empty(), end.trim().is_empty()) {
        (true, true) => String::new(),
        (true, false) => format_date(end),
        _ => format!("{} – {}", format_date(start), format_date(end)),
    }
}

fn month_year(month: &str, year: &str) -> Option<String> {
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if month.is_empty() || month.len() > 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: usize = month.parse().ok()?;
    let name = MONTHS.get(index.checked_sub(1)?)?;
    Some(format!("{name} {year}"))
}

fn is_day(day: &str) -> bool {
    day.len() == 2 && day.bytes().all(|b| b.is_ascii_digit())
}
