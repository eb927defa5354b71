// src/heuristics/classify.rs

use super::tokens::is_numeric_token;
use regex::Regex;
use std::sync::LazyLock;

static DEMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:DEMAND\s*NO\.?|No\.)\s*(\d+)").unwrap());
pub(crate) static MINISTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)MINISTRY OF [A-Z &']+").unwrap());
pub(crate) static DEPARTMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DEPARTMENT (?:OF )?[A-Z &']+").unwrap());
static TOTALS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:Grand\s+Total|Total\b|Net\b|Total-)").unwrap());
static GRAND_TOTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Grand\s+Total").unwrap());
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)*\.?$").unwrap());
static HAS_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d[\d,]*(?:\.\d+)?|\.\.\.").unwrap());

const SECTION_KEYWORDS: &[&str] = &[
    "expenditure",
    "schemes",
    "projects",
    "allocations",
    "heads",
    "developmental",
    "centre's",
    "transfers",
    "welfare",
    "autonomous",
    "centrally",
];

/// What a single normalized line of a detail page is.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    DemandHeader { demand_no: u32 },
    MinistryHeader { name: String },
    DepartmentHeader { name: String },
    TotalsLine { grand: bool },
    SectionHeading,
    CodedItem { code: String },
    NumericRow,
    Unclassified,
}

/// Classify a normalized line. First match wins, headers first.
pub fn classify(line: &str) -> LineKind {
    if let Some(demand_no) = demand_number(line) {
        return LineKind::DemandHeader { demand_no };
    }
    if let Some(name) = ministry_name(line) {
        return LineKind::MinistryHeader { name };
    }
    if let Some(name) = department_name(line) {
        return LineKind::DepartmentHeader { name };
    }
    classify_body(line)
}

/// Classification that ignores ministry/department header patterns. Used for
/// lines inside a demand whose names are already known.
pub fn classify_body(line: &str) -> LineKind {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return LineKind::Unclassified;
    }
    if is_totals_line(line) {
        return LineKind::TotalsLine {
            grand: GRAND_TOTAL_RE.is_match(line),
        };
    }
    if is_section_heading(line, &tokens) {
        return LineKind::SectionHeading;
    }
    if let Some(code) = item_code(&tokens) {
        return LineKind::CodedItem { code };
    }
    if is_numeric_row(&tokens) {
        return LineKind::NumericRow;
    }
    LineKind::Unclassified
}

pub fn demand_number(line: &str) -> Option<u32> {
    DEMAND_RE
        .captures(line)
        .and_then(|c| c[1].parse::<u32>().ok())
}

/// Ministry name found anywhere in the line, title-cased.
pub fn ministry_name(line: &str) -> Option<String> {
    MINISTRY_RE
        .find(line)
        .map(|m| super::tokens::title_case(m.as_str().trim()))
}

pub fn department_name(line: &str) -> Option<String> {
    DEPARTMENT_RE
        .find(line)
        .map(|m| super::tokens::title_case(m.as_str().trim()))
}

/// Starts with a totals marker, or carries an embedded "Total-" next to a figure.
pub fn is_totals_line(line: &str) -> bool {
    TOTALS_RE.is_match(line) || (line.contains("Total-") && HAS_NUMBER_RE.is_match(line))
}

pub fn is_section_heading(line: &str, tokens: &[&str]) -> bool {
    if tokens.iter().any(|t| is_numeric_token(t)) {
        return false;
    }
    let upper = tokens.len() > 1
        && line.chars().any(char::is_alphabetic)
        && !line.chars().any(char::is_lowercase);
    let mut chars = line.chars();
    let letter_dot = matches!(
        (chars.next(), chars.next()),
        (Some(c), Some('.')) if c.is_ascii_uppercase()
    );
    let lower = line.to_lowercase();
    let keyword = SECTION_KEYWORDS.iter().any(|kw| lower.contains(kw));
    upper || letter_dot || keyword
}

/// The item code, without a trailing dot, if the line opens with one.
pub fn item_code(tokens: &[&str]) -> Option<String> {
    let first = tokens.first()?;
    if !CODE_RE.is_match(first) {
        return None;
    }
    if tokens.get(1).is_some_and(|t| is_numeric_token(t)) {
        return None;
    }
    Some(first.trim_end_matches('.').to_string())
}

pub fn is_numeric_row(tokens: &[&str]) -> bool {
    tokens.first().is_some_and(|t| is_numeric_token(t))
        && tokens.iter().filter(|t| is_numeric_token(t)).count() >= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demand_header_anywhere() {
        assert_eq!(
            classify("MINISTRY OF AGRICULTURE DEMAND NO. 7"),
            LineKind::DemandHeader { demand_no: 7 }
        );
        assert_eq!(classify("demand no 12"), LineKind::DemandHeader { demand_no: 12 });
        assert_eq!(classify("See No. 3"), LineKind::DemandHeader { demand_no: 3 });
    }

    #[test]
    fn test_ministry_and_department_headers() {
        assert_eq!(
            classify("MINISTRY OF HOME AFFAIRS"),
            LineKind::MinistryHeader {
                name: "Ministry Of Home Affairs".into()
            }
        );
        assert_eq!(
            classify("Department of Posts"),
            LineKind::DepartmentHeader {
                name: "Department Of Posts".into()
            }
        );
    }

    #[test]
    fn test_totals_lines() {
        assert_eq!(classify("Grand Total 10 20"), LineKind::TotalsLine { grand: true });
        assert_eq!(classify("Total 10 20"), LineKind::TotalsLine { grand: false });
        assert_eq!(classify("net 5"), LineKind::TotalsLine { grand: false });
        assert_eq!(classify("Total-Revenue 1 2"), LineKind::TotalsLine { grand: false });
        assert_eq!(
            classify("Sub Total-Capital 4 5"),
            LineKind::TotalsLine { grand: false }
        );
        // "Totally" is not a totals marker
        assert_ne!(classify("Totally 4 5 6"), LineKind::TotalsLine { grand: false });
    }

    #[test]
    fn test_section_headings() {
        assert_eq!(classify("CENTRAL SECTOR SCHEMES"), LineKind::SectionHeading);
        assert_eq!(classify("A. Establishment"), LineKind::SectionHeading);
        assert_eq!(classify("Other Central Expenditure"), LineKind::SectionHeading);
        assert_eq!(classify("Centre's Share"), LineKind::SectionHeading);
        // a single upper-case token is not enough
        assert_eq!(classify("SECRETARIAT"), LineKind::Unclassified);
        // figures disqualify a heading
        assert_ne!(classify("WELFARE SCHEMES 10 20"), LineKind::SectionHeading);
    }

    #[test]
    fn test_coded_items() {
        assert_eq!(
            classify("2.1 Grants-in-aid ... 450 450"),
            LineKind::CodedItem { code: "2.1".into() }
        );
        assert_eq!(
            classify("3. Secretariat 12 13"),
            LineKind::CodedItem { code: "3".into() }
        );
        assert_eq!(classify("7"), LineKind::CodedItem { code: "7".into() });
    }

    #[test]
    fn test_numeric_rows() {
        assert_eq!(classify("100 200 300"), LineKind::NumericRow);
        assert_eq!(classify("... 200 300"), LineKind::NumericRow);
        assert_eq!(classify("100 200"), LineKind::Unclassified);
    }

    #[test]
    fn test_body_ignores_header_patterns() {
        assert_eq!(
            classify_body("1.2 Ministry of Finance grants 4 5"),
            LineKind::CodedItem { code: "1.2".into() }
        );
        assert_eq!(classify_body(""), LineKind::Unclassified);
    }
}
