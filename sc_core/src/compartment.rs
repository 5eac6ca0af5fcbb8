use crate::{
    cpg::CpgProfile,
    error::{FeatureError, Result},
    matrix::ContactMatrix,
    ZeroDivisionPolicy,
};

/// Parameters for compartment calling
///
/// upper_pct - bins with scores above this percentile (of valid bins) are called A
/// lower_pct - bins with scores below this percentile are called B
/// zero_decay - result for entries on a diagonal with zero mean contact.  Only stored
///   (positive) entries are visited and their diagonal means are positive, so with a
///   valid matrix this policy never changes the result
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompartmentParams {
    pub upper_pct: f64,
    pub lower_pct: f64,
    pub zero_decay: ZeroDivisionPolicy,
}

impl Default for CompartmentParams {
    fn default() -> Self {
        Self {
            upper_pct: 80.0,
            lower_pct: 20.0,
            zero_decay: ZeroDivisionPolicy::Zero,
        }
    }
}

impl CompartmentParams {
    pub fn validate(&self) -> Result<()> {
        let ok = |p: f64| (0.0..=100.0).contains(&p);
        if !ok(self.upper_pct) || !ok(self.lower_pct) {
            Err(FeatureError::InvalidParameter(format!(
                "percentiles must lie in [0, 100] (upper: {}, lower: {})",
                self.upper_pct, self.lower_pct
            )))
        } else if self.lower_pct > self.upper_pct {
            Err(FeatureError::InvalidParameter(format!(
                "lower percentile {} is greater than upper percentile {}",
                self.lower_pct, self.upper_pct
            )))
        } else {
            Ok(())
        }
    }
}

/// Classification of a bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinClass {
    A,
    B,
    /// Valid bin lying between the two thresholds (or exactly on one)
    Neither,
    /// Bin with no CpG information; never classified
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompartmentResult {
    /// CpG weighted contact score for every bin
    pub scores: Vec<f64>,
    /// Decay normalized contact totals: [A-A, B-B, A-B]
    pub strength: [f64; 3],
    pub classes: Vec<BinClass>,
}

impl CompartmentResult {
    /// Output record: scores followed by the 3 strength values
    pub fn to_record(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.scores.len() + 3);
        v.extend_from_slice(&self.scores);
        v.extend_from_slice(&self.strength);
        v
    }
}

/// Percentile of a sorted slice using linear interpolation between closest ranks
/// (the numpy default).  Returns None for an empty slice
pub fn percentile(sorted: &[f64], pct: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let pos = (pct / 100.0) * ((n - 1) as f64);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let z = sorted[lo];
    Some(if hi == lo {
        z
    } else {
        z + (sorted[hi] - z) * (pos - lo as f64)
    })
}

/// Classify bins using thresholds from the distribution of scores over valid bins.
/// Both comparisons are strict, so bins lying on a threshold are in neither set
pub fn classify_bins(
    scores: &[f64],
    valid: &[bool],
    params: &CompartmentParams,
) -> Vec<BinClass> {
    let mut v: Vec<f64> = scores
        .iter()
        .zip(valid)
        .filter(|(_, ok)| **ok)
        .map(|(x, _)| *x)
        .collect();
    v.sort_unstable_by(|a, b| a.total_cmp(b));
    let thresholds = percentile(&v, params.upper_pct).zip(percentile(&v, params.lower_pct));
    scores
        .iter()
        .zip(valid)
        .map(|(x, ok)| match thresholds {
            Some((upper, lower)) if *ok => {
                if *x > upper {
                    BinClass::A
                } else if *x < lower {
                    BinClass::B
                } else {
                    BinClass::Neither
                }
            }
            _ => BinClass::Invalid,
        })
        .collect()
}

/// Sum of decay normalized (observed / expected) contacts between classes.
/// Returns [A-A, B-B, A-B] where A-B takes A bins as rows and B bins as columns
pub fn compartment_strength(
    a: &ContactMatrix,
    classes: &[BinClass],
    zero_decay: ZeroDivisionPolicy,
) -> [f64; 3] {
    let decay = a.diagonal_means();
    if let Some(k) = decay.iter().position(|d| *d == 0.0) {
        trace!("Zero mean contact at diagonal offset {} or beyond", k);
    }
    let mut s = [0.0; 3];
    for (row, col, x) in a.iter() {
        let ix = match (classes[row], classes[col]) {
            (BinClass::A, BinClass::A) => 0,
            (BinClass::B, BinClass::B) => 1,
            (BinClass::A, BinClass::B) => 2,
            _ => continue,
        };
        s[ix] += zero_decay.divide(x, decay[row.abs_diff(col)]);
    }
    s
}

/// CpG weighted compartment scores and A/B compartment strength for a canonical
/// contact matrix (see [crate::normalize_matrix])
///
/// The score of a bin is the sum of its contacts weighted by the CpG ratio of the
/// partner bin.  Bins with a zero CpG ratio are excluded from thresholding and from the
/// strength summary but still receive a score.
pub fn compute_compartment(
    a: &ContactMatrix,
    cpg: &CpgProfile,
    params: &CompartmentParams,
) -> Result<CompartmentResult> {
    params.validate()?;
    let n = a.n();
    if cpg.len() != n {
        return Err(FeatureError::DimensionMismatch {
            what: "CpG profile",
            expected: n,
            found: cpg.len(),
        });
    }
    let scores = a.mul_vec(cpg.ratios())?;
    let valid = cpg.valid_mask();
    let classes = classify_bins(&scores, &valid, params);
    let strength = compartment_strength(a, &classes, params.zero_decay);
    debug!(
        "Compartment calling: {} bins, {} valid, {} A, {} B",
        n,
        valid.iter().filter(|x| **x).count(),
        classes.iter().filter(|c| **c == BinClass::A).count(),
        classes.iter().filter(|c| **c == BinClass::B).count()
    );
    Ok(CompartmentResult {
        scores,
        strength,
        classes,
    })
}
