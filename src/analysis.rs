// src/analysis.rs

use crate::heuristics::{MinistryRow, SummaryTable};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationReport {
    pub overall_total: f64,
    pub ministries: Vec<MinistryShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinistryShare {
    pub ministry: String,
    pub total: f64,
    pub percentage_share: f64,
    pub departments: Vec<DepartmentShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentShare {
    pub department: String,
    pub total: f64,
    pub percentage_share_within_ministry: f64,
    pub demands: Vec<DemandTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandTotal {
    pub demand_no: u32,
    pub summary_total: Option<f64>,
}

/// A ministry's printed total; when missing or zero, the sum of its
/// department totals.
pub fn ministry_total(ministry: &MinistryRow) -> f64 {
    match ministry.total {
        Some(total) if total != 0.0 => total,
        _ => ministry
            .departments
            .iter()
            .map(|d| d.total.unwrap_or(0.0))
            .sum(),
    }
}

/// `part / whole * 100`, or 0 when `whole` is 0.
fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

/// Roll the summary table up into percentage shares.
pub fn analyze(table: &SummaryTable) -> AllocationReport {
    let overall_total: f64 = table.ministries.values().map(ministry_total).sum();

    let ministries = table
        .ministries
        .values()
        .map(|m| {
            let total = ministry_total(m);
            let departments = m
                .departments
                .iter()
                .map(|d| {
                    let dept_total = d.total.unwrap_or(0.0);
                    DepartmentShare {
                        department: d.department.clone(),
                        total: dept_total,
                        percentage_share_within_ministry: percentage(dept_total, total),
                        demands: vec![DemandTotal {
                            demand_no: d.demand_no,
                            summary_total: d.total,
                        }],
                    }
                })
                .collect();
            MinistryShare {
                ministry: m.name.clone(),
                total,
                percentage_share: percentage(total, overall_total),
                departments,
            }
        })
        .collect();

    info!(overall_total, ministries = table.ministries.len(), "Allocation analysis built");
    AllocationReport {
        overall_total,
        ministries,
    }
}
