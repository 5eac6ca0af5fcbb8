use std::path::{Path, PathBuf};

use sc_core::InsulationParams;

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// cell_list - cells to process
/// input_dir - directory with per chromosome sub-directories of imputed matrices
/// output_dir - output directory (defaults to input_dir)
/// chrom - chromosome to process
/// mode - suffix of the imputed matrix file names
/// params - insulation parameters
/// threads - number of threads
///
pub struct Config {
    cell_list: Vec<String>,
    input_dir: PathBuf,
    output_dir: Option<PathBuf>,
    chrom: String,
    mode: String,
    params: InsulationParams,
    threads: usize,
}

impl Config {
    pub fn new(
        cell_list: Vec<String>,
        input_dir: PathBuf,
        chrom: String,
        mode: String,
        params: InsulationParams,
    ) -> Self {
        Self {
            cell_list,
            input_dir,
            output_dir: None,
            chrom,
            mode,
            params,
            threads: 1,
        }
    }

    pub fn set_output_dir(&mut self, d: PathBuf) {
        self.output_dir = Some(d)
    }

    pub fn set_threads(&mut self, nt: usize) {
        self.threads = nt
    }

    pub fn cell_list(&self) -> &[String] {
        &self.cell_list
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.input_dir)
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn params(&self) -> &InsulationParams {
        &self.params
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}
