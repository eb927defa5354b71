use regex::Regex;
use std::sync::LazyLock;

/// An amount token: optional minus, comma-grouped digits, optional fraction,
/// or the ellipsis the printed tables use for a nil cell.
static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-?\d[\d,]*(?:\.\d+)?|\.\.\.|…)$").unwrap());

/// Collapse runs of whitespace and trim the line.
pub fn normalize_line(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_numeric_token(tok: &str) -> bool {
    NUMERIC_RE.is_match(tok.trim())
}

/// Parse one amount cell. Placeholders and garbage are `None`, never `0.0`.
pub fn parse_amount(tok: &str) -> Option<f64> {
    let cleaned = tok.replace(',', "");
    match cleaned.trim() {
        "" | "..." | "…" | "-" => None,
        s => s.parse::<f64>().ok(),
    }
}

pub fn parse_amounts<S: AsRef<str>>(tokens: &[S]) -> Vec<Option<f64>> {
    tokens.iter().map(|t| parse_amount(t.as_ref())).collect()
}

/// Split a row into its leading name and its trailing run of amounts.
///
/// Scans from the right. Non-numeric tokens are skipped until the first
/// numeric one; after that the run ends at the next non-numeric token or
/// once `max_numbers` are collected. Name tokens stop where the run starts,
/// so a name ending in a digit loses that token to the run.
pub fn split_numeric_tail<'a, S: AsRef<str>>(
    tokens: &'a [S],
    max_numbers: usize,
) -> (&'a [S], &'a [S]) {
    let mut start = tokens.len();
    let mut end = tokens.len();
    let mut collected = 0;

    for (idx, tok) in tokens.iter().enumerate().rev() {
        if is_numeric_token(tok.as_ref()) {
            if collected == 0 {
                end = idx + 1;
            }
            start = idx;
            collected += 1;
            if collected >= max_numbers {
                break;
            }
        } else if collected > 0 {
            break;
        }
    }

    if collected == 0 {
        return (tokens, &tokens[tokens.len()..]);
    }
    (&tokens[..start], &tokens[start..end])
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
