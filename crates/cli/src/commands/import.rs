use std::path::Path;

use cca_sim_reporting::Snapshot;
use eyre::{Result, WrapErr};

use super::Report;
use crate::config::read_file;

/// Rebuilds a simulation from an exported snapshot by replaying its bids.
pub fn import(path: &Path) -> Result<Report> {
    let json = read_file(path)?;
    let snapshot = Snapshot::from_json(&json)
        .wrap_err_with(|| format!("invalid snapshot at {}", path.display()))?;
    let restored = snapshot.restore()?;

    Ok(Report::new(&restored.simulator, restored.result))
}
