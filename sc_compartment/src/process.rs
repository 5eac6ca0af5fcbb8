use anyhow::Context;

use sc_core::{compute_compartment, io, normalize_matrix, ContactMatrix};

use crate::config::{Config, InputMode};

fn read_matrix(cfg: &Config, cell: &str) -> anyhow::Result<ContactMatrix> {
    let a = match cfg.mode() {
        InputMode::Raw => {
            let p = io::contact_list_path(cfg.input_dir(), cell, cfg.chrom());
            io::read_contact_list(&p, cfg.cpg().len())
                .with_context(|| format!("Error reading contact list {}", p.display()))?
        }
        InputMode::Imputed(mode) => {
            let p = io::container_path(cfg.input_dir(), cell, cfg.chrom(), mode);
            io::read_sparse_container(&p)
                .with_context(|| format!("Error reading matrix {}", p.display()))?
        }
    };
    Ok(a)
}

/// Calculate and store the compartment scores and strength for one cell
fn process_cell(cfg: &Config, cell: &str) -> anyhow::Result<()> {
    let a = normalize_matrix(&read_matrix(cfg, cell)?);
    trace!("Cell {}: {} bins, {} contacts", cell, a.n(), a.nnz());
    let res = compute_compartment(&a, cfg.cpg(), cfg.params())
        .with_context(|| format!("Error calculating compartments for cell {}", cell))?;
    trace!("Cell {}: compartment strength {:?}", cell, res.strength);
    let opath = io::record_path(
        cfg.output_dir(),
        cell,
        cfg.chrom(),
        cfg.mode().name(),
        "cpgcomp",
    );
    io::write_record(&opath, &res.to_record())
        .with_context(|| format!("Error writing compartment scores for cell {}", cell))?;
    Ok(())
}

/// Process all cells in parallel.  Failed cells are reported and do not stop the
/// processing of the remaining cells
pub fn process_cells(cfg: &Config) -> anyhow::Result<()> {
    debug!(
        "Starting processing of {} cells for {} ({} mode) with {} threads",
        cfg.cell_list().len(),
        cfg.chrom(),
        cfg.mode().name(),
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
