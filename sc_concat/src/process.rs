use std::path::Path;

use anyhow::Context;
use ndarray::Array2;
use ndarray_npy::write_npy;

use sc_core::concat::concat_records;

fn write_matrix(path: &Path, a: &Array2<f64>) -> anyhow::Result<()> {
    debug!(
        "Writing {} x {} matrix to {}",
        a.nrows(),
        a.ncols(),
        path.display()
    );
    write_npy(path, a).with_context(|| format!("Error writing to {}", path.display()))
}

/// Read and stack all records, then write the output matrices
pub fn process_records(cfg: &crate::config::Config) -> anyhow::Result<()> {
    debug!(
        "Reading {} {} records with {} threads",
        cfg.files().len(),
        cfg.kind(),
        cfg.threads()
    );
    let stacked = concat_records(cfg.files(), cfg.kind(), cfg.threads())
        .with_context(|| "Error concatenating records")?;
    write_matrix(&cfg.output_path(cfg.kind().suffix()), &stacked.features)?;
    if let Some(s) = stacked.strength.as_ref() {
        write_matrix(&cfg.output_path("cpgcompstr"), s)?
    }
    info!(
        "Finished concatenating {} {} records to {}",
        stacked.features.nrows(),
        cfg.kind(),
        cfg.output_prefix().display()
    );
    Ok(())
}
