use std::{collections::HashMap, io::BufRead, path::Path};

use compress_io::compress::CompressIo;
use utils::get_next_line;

use crate::{
    error::{FeatureError, Result},
    io::chrom_name,
};

const CHROM_COL: &str = "#1_usercol";
const N_COUNT_COL: &str = "10_num_N";
const SEQ_LEN_COL: &str = "12_seq_len";
const PATTERN_COL: &str = "13_user_patt_count";

/// CpG ratio of a bin: pattern count / number of non-N bases.  NaN (no bases) maps to 0
pub fn cpg_ratio(pattern_count: f64, seq_len: f64, n_count: f64) -> f64 {
    let r = pattern_count / (seq_len - n_count);
    if r.is_nan() {
        0.0
    } else {
        r
    }
}

/// CpG ratios for the bins of one chromosome.  A bin is valid if its ratio is > 0
#[derive(Debug, Clone, PartialEq)]
pub struct CpgProfile {
    ratios: Vec<f64>,
}

impl CpgProfile {
    pub fn new(ratios: Vec<f64>) -> Self {
        Self { ratios }
    }

    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }

    pub fn valid_mask(&self) -> Vec<bool> {
        self.ratios.iter().map(|x| *x > 0.0).collect()
    }
}

/// CpgTable
///
/// Per chromosome CpG profiles read from the output of `bedtools nuc` run with a
/// CG pattern on the genome bins.  The file must have a header line with the
/// standard bedtools column names.  Bins are kept in file order.
#[derive(Debug, Default)]
pub struct CpgTable {
    chroms: HashMap<String, Vec<f64>>,
}

impl CpgTable {
    pub fn from_file<P: AsRef<Path>>(fname: P) -> Result<Self> {
        let fname = fname.as_ref();
        debug!("Reading CpG table from {}", fname.display());
        let rdr = CompressIo::new().path(fname).bufreader()?;
        let tab = Self::from_reader(rdr)?;
        debug!(
            "Finished reading CpG table; found {} chromosomes",
            tab.chroms.len()
        );
        Ok(tab)
    }

    pub fn from_reader<R: BufRead>(mut rdr: R) -> Result<Self> {
        let mut buf = String::new();
        let header = get_next_line(&mut rdr, &mut buf)
            .map_err(|e| FeatureError::parse(1, e.to_string()))?
            .ok_or_else(|| FeatureError::parse(1, "empty CpG table"))?;
        let col = |name: &str| {
            header
                .iter()
                .position(|h| *h == name)
                .ok_or_else(|| FeatureError::parse(1, format!("missing column {}", name)))
        };
        let cols = [col(CHROM_COL)?, col(N_COUNT_COL)?, col(SEQ_LEN_COL)?, col(PATTERN_COL)?];
        let min_fields = cols.iter().max().map(|x| x + 1).unwrap_or(0);

        let mut chroms: HashMap<String, Vec<f64>> = HashMap::new();
        let mut line = 1;
        while let Some(fields) = get_next_line(&mut rdr, &mut buf)
            .map_err(|e| FeatureError::parse(line + 1, e.to_string()))?
        {
            line += 1;
            // Skip empty lines
            if fields.len() == 1 && fields[0].is_empty() {
                continue;
            }
            if fields.len() < min_fields {
                return Err(FeatureError::parse(line, "too few columns"));
            }
            let get = |ix: usize| {
                fields[ix].parse::<f64>().map_err(|_| {
                    FeatureError::parse(line, format!("invalid number '{}'", fields[ix]))
                })
            };
            let r = cpg_ratio(get(cols[3])?, get(cols[2])?, get(cols[1])?);
            chroms.entry(chrom_name(fields[cols[0]])).or_default().push(r)
        }
        Ok(Self { chroms })
    }

    /// Profile for a chromosome (with or without the chr prefix)
    pub fn profile(&self, chrom: &str) -> Option<CpgProfile> {
        self.chroms
            .get(&chrom_name(chrom))
            .map(|v| CpgProfile::new(v.clone()))
    }

    pub fn n_chroms(&self) -> usize {
        self.chroms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "#1_usercol\t2_usercol\t3_usercol\t4_pct_at\t5_pct_gc\t6_num_A\t7_num_C\t8_num_G\t9_num_T\t10_num_N\t11_num_oth\t12_seq_len\t13_user_patt_count
chr1\t0\t100\t0\t0\t0\t0\t0\t0\t100\t0\t100\t0
chr1\t100\t200\t0.5\t0.5\t25\t25\t25\t25\t0\t0\t100\t10
chr1\t200\t300\t0.5\t0.5\t20\t20\t20\t20\t20\t0\t100\t4
chr2\t0\t100\t0.5\t0.5\t25\t25\t25\t25\t0\t0\t100\t0
";

    #[test]
    fn ratio_nan_is_zero() {
        assert_eq!(cpg_ratio(0.0, 100.0, 100.0), 0.0);
        assert_eq!(cpg_ratio(5.0, 100.0, 50.0), 0.1);
    }

    #[test]
    fn read_table() {
        let tab = CpgTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(tab.n_chroms(), 2);
        let p = tab.profile("1").unwrap();
        assert_eq!(p.ratios(), &[0.0, 0.1, 0.05]);
        assert_eq!(p.valid_mask(), vec![false, true, true]);
        assert_eq!(tab.profile("chr1"), Some(p));
        assert_eq!(tab.profile("chr2").unwrap().ratios(), &[0.0]);
        assert!(tab.profile("chrX").is_none());
    }

    #[test]
    fn missing_column() {
        let r = CpgTable::from_reader("#1_usercol\t10_num_N\t12_seq_len\nchr1\t0\t100\n".as_bytes());
        assert!(matches!(r, Err(FeatureError::Parse { line: 1, .. })));
    }

    #[test]
    fn bad_number() {
        let mut s = TABLE.to_owned();
        s.push_str("chr2\t100\t200\t0\t0\t0\t0\t0\t0\tx\t0\t100\t1\n");
        let r = CpgTable::from_reader(s.as_bytes());
        assert!(matches!(r, Err(FeatureError::Parse { line: 6, .. })));
    }
}
