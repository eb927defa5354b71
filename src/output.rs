// src/output.rs

use crate::analysis::AllocationReport;
use crate::config::OutputConfig;
use crate::error::ExtractError;
use crate::heuristics::{Demand, SummaryTable};
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExtractError> {
    let file = fs::File::create(path)?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value)?;
    out.flush()?;
    Ok(())
}

/// Write the master demand list and, if enabled, one `DEMAND_<n>.json` per demand.
pub fn write_demands(
    dir: &Path,
    cfg: &OutputConfig,
    demands: &[Demand],
) -> Result<PathBuf, ExtractError> {
    fs::create_dir_all(dir)?;
    if cfg.per_demand_files {
        for demand in demands {
            write_json(&dir.join(format!("DEMAND_{}.json", demand.demand_no)), demand)?;
        }
    }
    let master = dir.join(&cfg.demands_file);
    write_json(&master, demands)?;
    info!(path = %master.display(), demands = demands.len(), "Demands written");
    Ok(master)
}

/// Write the ministry mapping and the allocation analysis.
pub fn write_summary(
    dir: &Path,
    cfg: &OutputConfig,
    table: &SummaryTable,
    report: &AllocationReport,
) -> Result<(PathBuf, PathBuf), ExtractError> {
    fs::create_dir_all(dir)?;
    let mapping = dir.join(&cfg.mapping_file);
    write_json(&mapping, table)?;
    let analysis = dir.join(&cfg.analysis_file);
    write_json(&analysis, report)?;
    info!(
        mapping = %mapping.display(),
        analysis = %analysis.display(),
        "Summary written"
    );
    Ok((mapping, analysis))
}
