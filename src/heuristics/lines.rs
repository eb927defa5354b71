use super::tokens::normalize_line;

/// Lines searched before a demand header for its ministry/department names.
pub const HEADER_WINDOW_BEFORE: usize = 6;
/// Lines searched after a demand header for its ministry/department names.
pub const HEADER_WINDOW_AFTER: usize = 8;
/// How far a totals or coded line may look ahead for wrapped figures.
pub const CONTINUATION_LOOKAHEAD: usize = 2;

/// The normalized lines of one page, with bounded random access around a
/// cursor position. Nothing here consumes lines.
#[derive(Debug)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(normalize_line).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines.iter().map(String::as_str).enumerate()
    }

    /// Lines from `before` above `idx` through `after` below it, inclusive,
    /// clamped to the page.
    pub fn window(&self, idx: usize, before: usize, after: usize) -> &[String] {
        if self.lines.is_empty() {
            return &[];
        }
        let start = idx.saturating_sub(before);
        let end = idx.saturating_add(after).min(self.lines.len() - 1);
        &self.lines[start.min(end)..=end]
    }

    /// Up to `count` lines following `idx`.
    pub fn peek_after(&self, idx: usize, count: usize) -> &[String] {
        let start = (idx + 1).min(self.lines.len());
        let end = (start + count).min(self.lines.len());
        &self.lines[start..end]
    }
}
