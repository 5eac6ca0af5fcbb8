use std::{fmt, path::Path, str::FromStr};

use ndarray::Array2;

use crate::{
    error::{FeatureError, Result},
    io::read_record,
};

/// Type of per cell record being concatenated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Compartment scores followed by 3 strength values
    Compartment,
    /// Insulation scores
    Insulation,
}

impl RecordKind {
    /// Suffix of the per cell output files
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Compartment => "cpgcomp",
            Self::Insulation => "is",
        }
    }
}

impl FromStr for RecordKind {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comp" | "compartment" => Ok(Self::Compartment),
            "is" | "insulation" => Ok(Self::Insulation),
            _ => Err("no match"),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Compartment => write!(f, "compartment"),
            Self::Insulation => write!(f, "insulation"),
        }
    }
}

/// Per cell records stacked into cells x bins matrices
#[derive(Debug)]
pub struct Stacked {
    pub features: Array2<f64>,
    /// cells x 3 compartment strength matrix (compartment records only)
    pub strength: Option<Array2<f64>>,
}

/// Stack records (one per cell, in order).  Compartment records are split into the
/// score vector and the trailing 3 strength values.  All records must have the same length
pub fn stack_records(records: &[Vec<f64>], kind: RecordKind) -> Result<Stacked> {
    let len = records.first().map(|r| r.len()).unwrap_or(0);
    if let Some(r) = records.iter().find(|r| r.len() != len) {
        return Err(FeatureError::DimensionMismatch {
            what: "record",
            expected: len,
            found: r.len(),
        });
    }
    let ncells = records.len();
    match kind {
        RecordKind::Insulation => {
            let features = Array2::from_shape_fn((ncells, len), |(i, j)| records[i][j]);
            Ok(Stacked {
                features,
                strength: None,
            })
        }
        RecordKind::Compartment => {
            if ncells > 0 && len < 3 {
                return Err(FeatureError::DimensionMismatch {
                    what: "compartment record",
                    expected: 3,
                    found: len,
                });
            }
            let nbins = len.saturating_sub(3);
            let features = Array2::from_shape_fn((ncells, nbins), |(i, j)| records[i][j]);
            let strength = Array2::from_shape_fn((ncells, 3), |(i, j)| records[i][nbins + j]);
            Ok(Stacked {
                features,
                strength: Some(strength),
            })
        }
    }
}

/// Read per cell record files using nt threads and stack them in the order given
pub fn concat_records<P: AsRef<Path> + Sync>(
    paths: &[P],
    kind: RecordKind,
    nt: usize,
) -> Result<Stacked> {
    let records = utils::process_parallel(paths, nt, |p| read_record(p))
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
    debug!("Read {} {} records", records.len(), kind);
    stack_records(&records, kind)
}
