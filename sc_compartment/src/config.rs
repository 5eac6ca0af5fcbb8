use std::path::{Path, PathBuf};

use sc_core::{CompartmentParams, CpgProfile};

/// Input matrix type.  Raw contact lists must be symmetrized before use; imputed
/// matrices are read from sparse containers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Raw,
    Imputed(String),
}

impl InputMode {
    pub fn new(s: &str) -> Self {
        if s == "raw" {
            Self::Raw
        } else {
            Self::Imputed(s.to_owned())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Raw => "raw",
            Self::Imputed(s) => s,
        }
    }
}

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// cell_list - cells to process
/// input_dir - directory with per chromosome sub-directories of input matrices
/// output_dir - output directory (defaults to input_dir)
/// chrom - chromosome to process
/// mode - raw contact lists or imputed matrices (with file name suffix)
/// cpg - CpG profile for chrom
/// params - compartment calling parameters
/// threads - number of threads
///
pub struct Config {
    cell_list: Vec<String>,
    input_dir: PathBuf,
    output_dir: Option<PathBuf>,
    chrom: String,
    mode: InputMode,
    cpg: CpgProfile,
    params: CompartmentParams,
    threads: usize,
}

impl Config {
    pub fn new(
        cell_list: Vec<String>,
        input_dir: PathBuf,
        chrom: String,
        mode: InputMode,
        cpg: CpgProfile,
    ) -> Self {
        Self {
            cell_list,
            input_dir,
            output_dir: None,
            chrom,
            mode,
            cpg,
            params: CompartmentParams::default(),
            threads: 1,
        }
    }

    pub fn set_output_dir(&mut self, d: PathBuf) {
        self.output_dir = Some(d)
    }

    pub fn set_threads(&mut self, nt: usize) {
        self.threads = nt
    }

    pub fn set_params(&mut self, params: CompartmentParams) {
        self.params = params
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

    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    pub fn cpg(&self) -> &CpgProfile {
        &self.cpg
    }

    pub fn params(&self) -> &CompartmentParams {
        &self.params
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}
