use anyhow::Context;

use sc_core::{compute_insulation, io};

use crate::config::Config;

/// Calculate and store the insulation scores for one cell
fn process_cell(cfg: &Config, cell: &str) -> anyhow::Result<()> {
    let ipath = io::container_path(cfg.input_dir(), cell, cfg.chrom(), cfg.mode());
    let a = io::read_sparse_container(&ipath)
        .with_context(|| format!("Error reading matrix for cell {}", cell))?;
    trace!("Cell {}: {} bins, {} contacts", cell, a.n(), a.nnz());
    let score = compute_insulation(&a, cfg.params())?;
    let opath = io::record_path(cfg.output_dir(), cell, cfg.chrom(), cfg.mode(), "is");
    io::write_record(&opath, &score)
        .with_context(|| format!("Error writing insulation scores for cell {}", cell))?;
    Ok(())
}

/// Process all cells in parallel.  Failed cells are reported and do not stop the
/// processing of the remaining cells
pub fn process_cells(cfg: &Config) -> anyhow::Result<()> {
    debug!(
        "Starting processing of {} cells for {} with {} threads",
        cfg.cell_list().len(),
        cfg.chrom(),
        cfg.threads()
    );
    let res = utils::process_parallel(cfg.cell_list(), cfg.threads(), |cell| {
        process_cell(cfg, cell)
    });
    let mut failed = 0;
    for (cell, r) in cfg.cell_list().iter().zip(res) {
        if let Err(e) = r {
            error!("Cell {} failed: {:#}", cell, e);
            failed += 1
        }
    }
    info!(
        "Finished processing: {} of {} cells completed",
        cfg.cell_list().len() - failed,
        cfg.cell_list().len()
    );
    if failed > 0 {
        Err(anyhow!("Processing failed for {} cells", failed))
    } else {
        Ok(())
    }
}
