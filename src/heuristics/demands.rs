// src/heuristics/demands.rs

use super::classify::{self, LineKind};
use super::lines::{CONTINUATION_LOOKAHEAD, HEADER_WINDOW_AFTER, HEADER_WINDOW_BEFORE, LineBuffer};
use super::tokens::{parse_amounts, split_numeric_tail};
use super::{Demand, FiscalLineItem, FiscalValues, ItemKind, Section};
use crate::pdf_extract::PageText;
use std::collections::HashMap;
use tracing::{debug, info, info_span};

/// Fiscal columns a detail row can carry.
const MAX_ITEM_NUMBERS: usize = 12;

const TOTALS_HEADING: &str = "Totals";
const MISC_HEADING: &str = "Miscellaneous";
const NUMERIC_ROW_NAME: &str = "Totals (line)";

/// Accumulates demands during the single forward pass.
///
/// Holds the parser context: the demand currently being filled and, within
/// it, the open section. A demand number seen again resumes the existing
/// record.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    demands: Vec<Demand>,
    index: HashMap<u32, usize>,
    current_demand: Option<usize>,
    current_section: Option<usize>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_demand(&self) -> bool {
        self.current_demand.is_some()
    }

    /// Switch to demand `demand_no`, creating it if unseen. Returns true if
    /// the demand is new. The open section is always closed.
    pub fn enter_demand(
        &mut self,
        demand_no: u32,
        ministry: Option<String>,
        department: Option<String>,
    ) -> bool {
        self.current_section = None;
        if let Some(&idx) = self.index.get(&demand_no) {
            self.current_demand = Some(idx);
            return false;
        }
        self.demands.push(Demand {
            demand_no,
            ministry,
            department,
            sections: Vec::new(),
        });
        let idx = self.demands.len() - 1;
        self.index.insert(demand_no, idx);
        self.current_demand = Some(idx);
        true
    }

    pub fn is_known(&self, demand_no: u32) -> bool {
        self.index.contains_key(&demand_no)
    }

    fn demand_mut(&mut self) -> Option<&mut Demand> {
        self.current_demand.map(|i| &mut self.demands[i])
    }

    /// Set the current demand's ministry if it has none. Returns whether it was set.
    pub fn fill_ministry(&mut self, name: &str) -> bool {
        match self.demand_mut() {
            Some(d) if d.ministry.is_none() => {
                d.ministry = Some(name.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn fill_department(&mut self, name: &str) -> bool {
        match self.demand_mut() {
            Some(d) if d.department.is_none() => {
                d.department = Some(name.to_string());
                true
            }
            _ => false,
        }
    }

    /// Open a new section under the current demand. No-op outside a demand.
    pub fn open_section(&mut self, heading: &str) {
        let Some(demand) = self.demand_mut() else {
            return;
        };
        demand.sections.push(Section::new(heading));
        let idx = demand.sections.len() - 1;
        self.current_section = Some(idx);
    }

    /// Append an item to the open section, synthesizing one titled
    /// `default_heading` if none is open. Duplicates are dropped.
    pub fn push_item(&mut self, item: FiscalLineItem, default_heading: &str) -> bool {
        if self.current_demand.is_none() {
            return false;
        }
        if self.current_section.is_none() {
            self.open_section(default_heading);
        }
        let (Some(d), Some(s)) = (self.current_demand, self.current_section) else {
            return false;
        };
        self.demands[d].sections[s].push_unique(item)
    }

    pub fn finish(self) -> Vec<Demand> {
        self.demands
    }
}

/// Run the line-item parser over all pages, in order.
pub fn extract_demands(pages: &[PageText]) -> Vec<Demand> {
    let mut builder = DocumentBuilder::new();
    for page in pages {
        let Some(text) = page.text.as_deref() else {
            debug!(page = page.number, "No text on page, skipping");
            continue;
        };
        let span = info_span!("page", number = page.number);
        let _guard = span.enter();
        parse_page(&mut builder, &LineBuffer::new(text));
    }

    let demands = builder.finish();
    let without_figures = demands
        .iter()
        .flat_map(|d| &d.sections)
        .flat_map(|s| &s.items)
        .filter(|it| it.values.is_empty())
        .count();
    info!(
        demands = demands.len(),
        items = demands.iter().map(Demand::item_count).sum::<usize>(),
        without_figures,
        "Demand extraction complete"
    );
    demands
}

/// Feed one page's lines through the state machine.
pub fn parse_page(builder: &mut DocumentBuilder, lines: &LineBuffer) {
    for (idx, line) in lines.iter() {
        match classify::classify(line) {
            LineKind::DemandHeader { demand_no } => enter_demand(builder, lines, idx, demand_no),
            LineKind::MinistryHeader { name } => {
                // a combined "MINISTRY OF X DEPARTMENT OF Y" line may still carry the department
                let filled = builder.fill_ministry(&name)
                    || classify::department_name(line)
                        .is_some_and(|department| builder.fill_department(&department));
                if !filled {
                    handle_body(builder, lines, idx, line, classify::classify_body(line));
                }
            }
            LineKind::DepartmentHeader { name } => {
                if !builder.fill_department(&name) {
                    handle_body(builder, lines, idx, line, classify::classify_body(line));
                }
            }
            kind => handle_body(builder, lines, idx, line, kind),
        }
    }
}

fn enter_demand(builder: &mut DocumentBuilder, lines: &LineBuffer, idx: usize, demand_no: u32) {
    if builder.is_known(demand_no) {
        debug!(demand_no, "Resuming demand");
        builder.enter_demand(demand_no, None, None);
        return;
    }
    let window = lines.window(idx, HEADER_WINDOW_BEFORE, HEADER_WINDOW_AFTER);
    let ministry = window.iter().find_map(|l| classify::ministry_name(l));
    let department = window.iter().find_map(|l| classify::department_name(l));
    info!(demand_no, ministry = ?ministry, department = ?department, "New demand");
    builder.enter_demand(demand_no, ministry, department);
}

fn handle_body(
    builder: &mut DocumentBuilder,
    lines: &LineBuffer,
    idx: usize,
    line: &str,
    kind: LineKind,
) {
    // nothing is kept before the first demand header
    if !builder.in_demand() {
        return;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match kind {
        LineKind::SectionHeading => builder.open_section(line),
        LineKind::TotalsLine { grand } => {
            let (name, amounts) = split_with_continuation(&tokens, lines, idx);
            let name = if name.is_empty() {
                tokens.first().copied().unwrap_or_default().to_string()
            } else {
                name.join(" ")
            };
            let kind = if grand {
                ItemKind::GrandTotal
            } else {
                ItemKind::Total
            };
            builder.push_item(
                FiscalLineItem {
                    code: None,
                    name,
                    values: FiscalValues::from_amounts(&amounts),
                    kind: Some(kind),
                },
                TOTALS_HEADING,
            );
        }
        LineKind::CodedItem { code } => {
            let rest = tokens.get(1..).unwrap_or_default();
            let (mut name_tokens, amounts) = split_with_continuation(rest, lines, idx);
            if name_tokens.first() == tokens.first() {
                name_tokens = &name_tokens[1..];
            }
            let name = if name_tokens.is_empty() {
                rest.join(" ")
            } else {
                name_tokens.join(" ")
            };
            builder.push_item(
                FiscalLineItem {
                    code: Some(code),
                    name,
                    values: FiscalValues::from_amounts(&amounts),
                    kind: None,
                },
                MISC_HEADING,
            );
        }
        LineKind::NumericRow => {
            let (_, nums) = split_numeric_tail(&tokens, MAX_ITEM_NUMBERS);
            builder.push_item(
                FiscalLineItem {
                    code: None,
                    name: NUMERIC_ROW_NAME.to_string(),
                    values: FiscalValues::from_amounts(&parse_amounts(nums)),
                    kind: Some(ItemKind::Total),
                },
                TOTALS_HEADING,
            );
        }
        _ => {}
    }
}

/// Split `tokens` into name and amounts. When the line carries no figures,
/// borrow them from the first of the next lines that does.
fn split_with_continuation<'t, 's>(
    tokens: &'t [&'s str],
    lines: &LineBuffer,
    idx: usize,
) -> (&'t [&'s str], Vec<Option<f64>>) {
    let (name, nums) = split_numeric_tail(tokens, MAX_ITEM_NUMBERS);
    if !nums.is_empty() {
        return (name, parse_amounts(nums));
    }

    for next in lines.peek_after(idx, CONTINUATION_LOOKAHEAD) {
        let next_tokens: Vec<&str> = next.split_whitespace().collect();
        let (_, next_nums) = split_numeric_tail(&next_tokens, MAX_ITEM_NUMBERS);
        if !next_nums.is_empty() {
            debug!(line = idx, "Figures taken from continuation line");
            return (name, parse_amounts(next_nums));
        }
    }
    debug!(line = idx, "No figures within lookahead");
    (name, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, lines: &[&str]) -> PageText {
        PageText {
            number,
            text: Some(lines.join("\n")),
        }
    }

    fn run(lines: &[&str]) -> Vec<Demand> {
        extract_demands(&[page(1, lines)])
    }

    #[test]
    fn test_ellipsis_is_none_not_zero() {
        let demands = run(&["DEMAND NO. 1", "2.1 Grants-in-aid ... 450 450"]);
        let item = &demands[0].sections[0].items[0];
        assert_eq!(item.code.as_deref(), Some("2.1"));
        assert_eq!(item.name, "Grants-in-aid");
        let slots = item.values.slots();
        assert_eq!(slots[0], None);
        assert_eq!(slots[1], Some(450.0));
        assert_eq!(slots[2], Some(450.0));
        assert!(slots[3..].iter().all(Option::is_none));
    }

    #[test]
    fn test_coded_item_without_section_goes_to_miscellaneous() {
        let demands = run(&["DEMAND NO. 2", "1. Secretariat 10 20"]);
        let section = &demands[0].sections[0];
        assert_eq!(section.heading, "Miscellaneous");
        assert_eq!(section.items[0].code.as_deref(), Some("1"));
        assert_eq!(section.items[0].name, "Secretariat");
    }

    #[test]
    fn test_demand_is_singleton_across_pages() {
        let pages = vec![
            page(3, &["DEMAND NO. 7", "CENTRAL SECTOR SCHEMES", "1. Roads 10 20"]),
            page(
                40,
                &["see Demand No. 7", "OTHER CENTRAL EXPENDITURE", "2. Ports 5 6"],
            ),
        ];
        let demands = extract_demands(&pages);
        assert_eq!(demands.len(), 1);
        let d = &demands[0];
        assert_eq!(d.demand_no, 7);
        let headings: Vec<&str> = d.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, ["CENTRAL SECTOR SCHEMES", "OTHER CENTRAL EXPENDITURE"]);
    }

    #[test]
    fn test_names_found_in_header_window() {
        let demands = run(&[
            "MINISTRY OF AGRICULTURE AND FARMERS WELFARE",
            "DEMAND NO. 1",
            "Department of Agriculture",
        ]);
        let d = &demands[0];
        assert_eq!(
            d.ministry.as_deref(),
            Some("Ministry Of Agriculture And Farmers Welfare")
        );
        assert_eq!(d.department.as_deref(), Some("Department Of Agriculture"));
    }

    #[test]
    fn test_window_takes_first_match() {
        let demands = run(&["MINISTRY OF COAL", "DEMAND NO. 9", "MINISTRY OF MINES"]);
        assert_eq!(demands[0].ministry.as_deref(), Some("Ministry Of Coal"));
    }

    #[test]
    fn test_names_filled_once_inside_demand() {
        let mut lines = vec!["DEMAND NO. 4"];
        lines.extend(std::iter::repeat_n("", 10));
        lines.push("MINISTRY OF STEEL");
        lines.push("MINISTRY OF POWER");
        let demands = run(&lines);
        assert_eq!(demands[0].ministry.as_deref(), Some("Ministry Of Steel"));
        // the second ministry line is body content, a section heading
        assert_eq!(demands[0].sections[0].heading, "MINISTRY OF POWER");
    }

    #[test]
    fn test_totals_and_grand_totals() {
        let demands = run(&[
            "DEMAND NO. 5",
            "Total 1,000 2,000",
            "Grand Total 3,000 4,000",
        ]);
        let section = &demands[0].sections[0];
        assert_eq!(section.heading, "Totals");
        assert_eq!(section.items[0].kind, Some(ItemKind::Total));
        assert_eq!(section.items[0].values.get("actual_2024_25"), Some(1000.0));
        assert_eq!(section.items[1].kind, Some(ItemKind::GrandTotal));
        assert_eq!(section.items[1].name, "Grand Total");
    }

    #[test]
    fn test_totals_borrow_figures_from_next_lines() {
        let demands = run(&["DEMAND NO. 5", "Total", "", "10 20 30"]);
        let item = &demands[0].sections[0].items[0];
        assert_eq!(item.name, "Total");
        assert_eq!(item.values.get("total_2024_25"), Some(30.0));
        // the peeked line is still parsed on its own
        assert_eq!(demands[0].sections[0].items[1].name, "Totals (line)");
    }

    #[test]
    fn test_lookahead_exhausted_records_empty_values() {
        let demands = run(&["DEMAND NO. 5", "3. Wrapped Name", "more text", "still text", "1 2 3"]);
        let item = &demands[0].sections[0].items[0];
        assert_eq!(item.name, "Wrapped Name");
        assert!(item.values.is_empty());
    }

    #[test]
    fn test_duplicate_rows_suppressed() {
        let demands = run(&[
            "DEMAND NO. 6",
            "WELFARE SCHEMES",
            "1. Pensions 5 6",
            "1. Pensions 5 6",
            "Total 5 6",
            "Total 5 6",
        ]);
        assert_eq!(demands[0].sections[0].items.len(), 2);
    }

    #[test]
    fn test_numeric_row_and_embedded_total() {
        let demands = run(&[
            "DEMAND NO. 8",
            "Revenue Total-Capital 7 8",
            "100 200 300",
        ]);
        let items = &demands[0].sections[0].items;
        assert_eq!(items[0].name, "Revenue Total-Capital");
        assert_eq!(items[0].kind, Some(ItemKind::Total));
        assert_eq!(items[1].name, "Totals (line)");
        assert_eq!(items[1].values.get("total_2024_25"), Some(300.0));
    }

    #[test]
    fn test_numeric_row_name_is_fixed() {
        let demands = run(&["DEMAND NO. 8", "10 20 30 Roads 40"]);
        let item = &demands[0].sections[0].items[0];
        assert_eq!(item.name, "Totals (line)");
        assert_eq!(item.values.get("actual_2024_25"), Some(40.0));
        assert!(item.values.slots()[1..].iter().all(Option::is_none));
    }

    #[test]
    fn test_department_filled_from_ministry_line() {
        let mut lines = vec!["DEMAND NO. 4"];
        lines.extend([""; 10]);
        lines.extend(["MINISTRY OF STEEL", "MINISTRY OF STEEL DEPARTMENT OF MINES"]);
        let demands = run(&lines);
        let d = &demands[0];
        assert_eq!(d.ministry.as_deref(), Some("Ministry Of Steel"));
        assert_eq!(d.department.as_deref(), Some("Department Of Mines"));
        assert!(d.sections.is_empty());
    }

    #[test]
    fn test_orphan_lines_dropped() {
        let demands = run(&["1. Roads 10 20", "Total 5", "CENTRAL SCHEMES"]);
        assert!(demands.is_empty());
    }

    #[test]
    fn test_blank_pages_skipped() {
        let pages = vec![
            PageText {
                number: 1,
                text: None,
            },
            page(2, &["DEMAND NO. 1", "1. Roads 1 2"]),
        ];
        let demands = extract_demands(&pages);
        assert_eq!(demands[0].item_count(), 1);
    }

    #[test]
    fn test_builder_ignores_items_outside_demand() {
        let mut builder = DocumentBuilder::new();
        let item = FiscalLineItem {
            code: None,
            name: "x".into(),
            values: FiscalValues::default(),
            kind: None,
        };
        assert!(!builder.push_item(item, "Totals"));
        builder.open_section("A. Orphan");
        assert!(builder.finish().is_empty());
    }
}
