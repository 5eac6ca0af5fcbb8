use std::path::{Path, PathBuf};

use sc_core::concat::RecordKind;

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// files - per cell record files, in output row order
/// kind - type of record
/// output_prefix - prefix for output matrices
/// threads - number of threads for reading records
///
pub struct Config {
    files: Vec<PathBuf>,
    kind: RecordKind,
    output_prefix: PathBuf,
    threads: usize,
}

impl Config {
    pub fn new(files: Vec<PathBuf>, kind: RecordKind, output_prefix: PathBuf) -> Self {
        Self {
            files,
            kind,
            output_prefix,
            threads: 1,
        }
    }

    pub fn set_threads(&mut self, nt: usize) {
        self.threads = nt
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Output file name: `{prefix}.{suffix}.npy`
    pub fn output_path(&self, suffix: &str) -> PathBuf {
        let mut s = self.output_prefix.as_os_str().to_owned();
        s.push(format!(".{}.npy", suffix));
        PathBuf::from(s)
    }

    pub fn output_prefix(&self) -> &Path {
        &self.output_prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names() {
        let cfg = Config::new(
            Vec::new(),
            RecordKind::Compartment,
            PathBuf::from("out/chr1_raw"),
        );
        assert_eq!(
            cfg.output_path("cpgcompstr"),
            PathBuf::from("out/chr1_raw.cpgcompstr.npy")
        );
        assert_eq!(cfg.output_prefix(), Path::new("out/chr1_raw"));
    }
}
