//! Text helpers shared by the matchers, the fingerprint and the fallback renderer.

use regex::Regex;

const ELLIPSIS: &str = "...";

/// Removes chat markup that never carries meaning in log lines: bold (`**`),
/// underline (`__`), strikethrough (`~~`) and inline code ticks. Code fences are
/// handled separately by [`MarkupCleaner`].
#[must_use]
pub fn strip_inline_markup(text: &str) -> String {
    text.replace("**", "")
        .replace("__", "")
        .replace("~~", "")
        .replace('`', "")
}

/// Strips code fences and inline markup and collapses runs of blank lines.
#[derive(Debug, Clone)]
pub struct MarkupCleaner {
    fence: Regex,
    blank_lines: Regex,
}

impl MarkupCleaner {
    /// Compiles the cleaner's patterns.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            fence: Regex::new(r"```[A-Za-z0-9_+-]*[ \t]*\n?")?,
            blank_lines: Regex::new(r"\n{3,}")?,
        })
    }

    /// Markup-free text with trailing whitespace removed from every line,
    /// at most one blank line in a row, trimmed.
    #[must_use]
    pub fn clean(&self, text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        let without_fences = self.fence.replace_all(&normalized, "");
        let plain = strip_inline_markup(&without_fences);

        let trimmed_lines = plain
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n");

        self.blank_lines
            .replace_all(&trimmed_lines, "\n\n")
            .trim()
            .to_string()
    }
}

/// Cuts `text` to at most `limit` characters (plus the ellipsis).
///
/// Prefers the last line break inside the window when it falls in the window's
/// second half; otherwise cuts at the character boundary.
#[must_use]
pub fn truncate_display(text: &str, limit: usize) -> String {
    let Some((cut_byte, _)) = text.char_indices().nth(limit) else {
        return text.to_string();
    };

    let window = &text[..cut_byte];
    let head = match window.rfind('\n') {
        Some(pos) if window[..pos].chars().count() >= limit / 2 => &window[..pos],
        _ => window,
    };

    format!("{}{ELLIPSIS}", head.trim_end())
}

/// Parses a money amount as written in game logs.
///
/// A lone comma is the decimal separator (`12,50`). When both `,` and `.` occur
/// the right-most one is the decimal separator and the other groups thousands
/// (`1,234.50`, `1.234,50`). Returns `None` for anything that is not a finite,
/// non-negative number.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let normalized = match (raw.rfind(','), raw.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => raw.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => raw.replace(',', ""),
        (Some(_), None) if raw.matches(',').count() == 1 => raw.replace(',', "."),
        (Some(_), None) => raw.replace(',', ""),
        (None, Some(_)) if raw.matches('.').count() > 1 => raw.replace('.', ""),
        _ => raw.to_string(),
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Parses a base-10 count; overflow and garbage are `None`.
#[must_use]
pub fn parse_count(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}
