// src/heuristics/summary.rs

use super::tokens::{normalize_line, parse_amount, split_numeric_tail};
use super::{DepartmentRow, MinistryRow, SummaryTable};
use crate::error::ExtractError;
use crate::pdf_extract::PageText;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

pub const SUMMARY_START_MARKERS: &[&str] = &["SBE Summary", "Summary of Contents"];
pub const SUMMARY_END_MARKERS: &[&str] = &["Notes on Demand"];

/// Numerics considered on a ministry header line (revenue, capital, total and slack).
const MINISTRY_MAX_NUMBERS: usize = 5;
/// Numerics considered on a demand row.
const DEMAND_MAX_NUMBERS: usize = 4;
const HEADER_MIN_NUMBERS: usize = 3;

const MINISTRY_PREFIXES: &[&str] = &["MINISTRY", "DEPARTMENT", "THE PRESIDENT"];

static DEMAND_ROW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.*)$").unwrap());
static PAGE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(?:-\d+)?$").unwrap());

/// Cut the summary region out of the document's non-blank, normalized lines.
///
/// Starts at the first line mentioning a start marker and stops before the
/// first end marker after it. Without an end marker the region runs to the
/// end of the document; without a start marker extraction fails.
pub fn locate_summary(pages: &[PageText]) -> Result<Vec<String>, ExtractError> {
    let lines: Vec<String> = pages
        .iter()
        .filter_map(|p| p.text.as_deref())
        .flat_map(str::lines)
        .map(normalize_line)
        .filter(|l| !l.is_empty())
        .collect();

    let Some(start) = lines
        .iter()
        .position(|l| contains_any(l, SUMMARY_START_MARKERS))
    else {
        return Err(ExtractError::SummaryNotFound {
            pages: pages.len(),
            markers: SUMMARY_START_MARKERS,
        });
    };

    let end = match lines[start..]
        .iter()
        .position(|l| contains_any(l, SUMMARY_END_MARKERS))
    {
        Some(offset) => start + offset,
        None => {
            warn!(
                markers = ?SUMMARY_END_MARKERS,
                "Summary end marker not found, reading to end of document"
            );
            lines.len()
        }
    };

    info!(start, end, lines = end - start, "Located summary region");
    Ok(lines[start..end].to_vec())
}

fn contains_any(line: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| line.contains(m))
}

/// Running state of the summary grammar.
#[derive(Debug, Default)]
struct SummaryBuilder {
    table: SummaryTable,
    current_ministry: Option<usize>,
    current_department_header: Option<String>,
}

impl SummaryBuilder {
    fn open_ministry(&mut self, name: String, totals: [Option<f64>; 3]) {
        let idx = match self.table.ministries.get_index_of(&name) {
            Some(idx) => idx,
            None => {
                let [revenue, capital, total] = totals;
                debug!(ministry = %name, ?total, "Ministry header");
                let row = MinistryRow {
                    name: name.clone(),
                    revenue,
                    capital,
                    total,
                    departments: Vec::new(),
                };
                self.table.ministries.insert_full(name, row).0
            }
        };
        self.current_ministry = Some(idx);
        self.current_department_header = None;
    }

    fn ministry_name(&self) -> Option<&str> {
        self.current_ministry
            .and_then(|i| self.table.ministries.get_index(i))
            .map(|(name, _)| name.as_str())
    }

    fn push_department(&mut self, row: DepartmentRow) {
        match self
            .current_ministry
            .and_then(|i| self.table.ministries.get_index_mut(i))
        {
            Some((_, ministry)) => ministry.departments.push(row),
            None => debug!(demand_no = row.demand_no, "Demand row before any ministry, dropped"),
        }
    }
}

/// Parse the summary region into ministries and their demand rows.
pub fn parse_summary<S: AsRef<str>>(lines: &[S]) -> SummaryTable {
    let mut builder = SummaryBuilder::default();

    for line in lines {
        let line = line.as_ref();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (name_tokens, tail) = split_numeric_tail(&tokens, MINISTRY_MAX_NUMBERS);
        let upper = line.to_uppercase();
        let starts_with_prefix = MINISTRY_PREFIXES.iter().any(|p| upper.starts_with(p));

        if starts_with_prefix && tail.len() >= HEADER_MIN_NUMBERS {
            builder.open_ministry(name_tokens.join(" "), first_three(tail));
            continue;
        }

        if let Some(caps) = DEMAND_ROW_RE.captures(line) {
            let Ok(demand_no) = caps[1].parse::<u32>() else {
                continue;
            };
            let rest: Vec<&str> = caps[2].split_whitespace().collect();
            let row = demand_row(demand_no, &rest, &builder);
            builder.push_department(row);
            continue;
        }

        if upper.starts_with("DEPARTMENT") && tail.len() < HEADER_MIN_NUMBERS {
            builder.current_department_header = Some(name_tokens.join(" "));
        }
    }

    let table = builder.table;
    info!(
        ministries = table.ministries.len(),
        departments = table.department_count(),
        "Summary table parsed"
    );
    table
}

/// Build a department row from the tokens after "N.".
///
/// A hyphenated range closing the row is taken first. Otherwise the figures
/// are split off and a page range is the last name token if it looks like
/// one, or a fourth trailing figure.
fn demand_row(demand_no: u32, rest: &[&str], builder: &SummaryBuilder) -> DepartmentRow {
    let mut page_range = None;
    let rest = match rest.split_last() {
        Some((last, head)) if last.contains('-') && PAGE_RANGE_RE.is_match(last) => {
            page_range = Some(last.to_string());
            head
        }
        _ => rest,
    };

    let (mut name, mut nums) = split_numeric_tail(rest, DEMAND_MAX_NUMBERS);
    match (name.split_last(), nums.split_last()) {
        _ if page_range.is_some() => {}
        (Some((last, head)), _) if PAGE_RANGE_RE.is_match(last) => {
            page_range = Some(last.to_string());
            name = head;
        }
        (_, Some((last, head)))
            if nums.len() == DEMAND_MAX_NUMBERS && PAGE_RANGE_RE.is_match(last) =>
        {
            page_range = Some(last.to_string());
            nums = head;
        }
        _ => {}
    }

    let name = name.join(" ");
    let department = if !name.is_empty() {
        name
    } else if let Some(header) = &builder.current_department_header {
        header.clone()
    } else {
        builder.ministry_name().unwrap_or_default().to_string()
    };

    let [revenue, capital, total] = first_three(nums);
    DepartmentRow {
        demand_no,
        department,
        revenue,
        capital,
        total,
        page_range,
    }
}

fn first_three(nums: &[&str]) -> [Option<f64>; 3] {
    let at = |i: usize| nums.get(i).and_then(|t| parse_amount(t));
    [at(0), at(1), at(2)]
}
