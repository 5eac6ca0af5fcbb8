use std::{
    fs,
    io::{BufRead, Read, Seek},
    path::{Path, PathBuf},
};

use compress_io::compress::CompressIo;
use ndarray::Array1;
use ndarray_npy::{read_npy, write_npy, NpzReader, ReadNpzError, ReadableElement};

use crate::{
    error::{FeatureError, Result},
    matrix::ContactMatrix,
};

/// Chromosome name with a single `chr` prefix (1 and chr1 both give chr1)
pub fn chrom_name(chrom: &str) -> String {
    format!("chr{}", chrom.strip_prefix("chr").unwrap_or(chrom))
}

/// Input path for a raw contact list: `{dir}/chr{c}/{cell}_chr{c}.txt`
pub fn contact_list_path(dir: &Path, cell: &str, chrom: &str) -> PathBuf {
    let c = chrom_name(chrom);
    dir.join(&c).join(format!("{}_{}.txt", cell, c))
}

/// Input path for an imputed matrix: `{dir}/chr{c}/{cell}_chr{c}_{mode}.npz`
pub fn container_path(dir: &Path, cell: &str, chrom: &str, mode: &str) -> PathBuf {
    let c = chrom_name(chrom);
    dir.join(&c).join(format!("{}_{}_{}.npz", cell, c, mode))
}

/// Output path for a per cell record: `{dir}/chr{c}/{cell}_chr{c}_{mode}.{suffix}.npy`
pub fn record_path(dir: &Path, cell: &str, chrom: &str, mode: &str, suffix: &str) -> PathBuf {
    let c = chrom_name(chrom);
    dir.join(&c)
        .join(format!("{}_{}_{}.{}.npy", cell, c, mode, suffix))
}

/// Read a contact list for an n x n matrix from a (possibly compressed) file.
/// See [read_contacts] for the format
pub fn read_contact_list<P: AsRef<Path>>(fname: P, n: usize) -> Result<ContactMatrix> {
    let fname = fname.as_ref();
    trace!("Opening contact list {} for reading", fname.display());
    let rdr = CompressIo::new().path(fname).bufreader()?;
    read_contacts(rdr, n)
}

/// Read white space separated `row col value` lines.  Indices may be written as floats
/// with no fractional part.  Empty lines and lines starting with '#' are skipped.
/// Duplicate coordinates are summed and an empty input gives an all zero matrix
pub fn read_contacts<R: BufRead>(mut rdr: R, n: usize) -> Result<ContactMatrix> {
    let mut buf = String::new();
    let mut line = 0;
    let mut triplets = Vec::new();
    loop {
        buf.clear();
        if rdr.read_line(&mut buf)? == 0 {
            break;
        }
        line += 1;
        let s = buf.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let fields: Vec<_> = s.split_ascii_whitespace().collect();
        if fields.len() < 3 {
            return Err(FeatureError::parse(line, "expected row, column and value"));
        }
        let row = parse_index(fields[0], line)?;
        let col = parse_index(fields[1], line)?;
        let x = fields[2]
            .parse::<f64>()
            .map_err(|_| FeatureError::parse(line, format!("invalid value '{}'", fields[2])))?;
        triplets.push((row, col, x))
    }
    trace!("Read {} contacts from {} lines", triplets.len(), line);
    ContactMatrix::from_triplets(n, triplets)
}

fn parse_index(s: &str, line: usize) -> Result<usize> {
    let err = || FeatureError::parse(line, format!("invalid bin index '{}'", s));
    match s.parse::<usize>() {
        Ok(i) => Ok(i),
        Err(_) => {
            let z = s.parse::<f64>().map_err(|_| err())?;
            if z >= 0.0 && z.fract() == 0.0 && z < usize::MAX as f64 {
                Ok(z as usize)
            } else {
                Err(err())
            }
        }
    }
}

/// Read an imputed matrix stored in a scipy sparse CSR npz archive
/// (arrays `data`, `indices`, `indptr` and `shape`)
pub fn read_sparse_container<P: AsRef<Path>>(fname: P) -> Result<ContactMatrix> {
    let fname = fname.as_ref();
    trace!("Opening sparse matrix container {}", fname.display());
    let file = fs::File::open(fname)?;
    read_sparse_npz(file).map_err(|e| match e {
        FeatureError::ArrayFile { message, .. } => FeatureError::array_file(fname, message),
        e => e,
    })
}

pub fn read_sparse_npz<R: Read + Seek>(rdr: R) -> Result<ContactMatrix> {
    let mut npz = NpzReader::new(rdr).map_err(|e| FeatureError::array_file("<npz>", e))?;

    let data: Vec<f64> = match npz_array::<_, f64>(&mut npz, "data") {
        Ok(a) => a.to_vec(),
        Err(_) => npz_array::<_, f32>(&mut npz, "data")
            .map_err(|e| FeatureError::array_file("<npz>", format!("array 'data': {}", e)))?
            .iter()
            .map(|x| *x as f64)
            .collect(),
    };
    let indices = read_index_array(&mut npz, "indices")?;
    let indptr = read_index_array(&mut npz, "indptr")?;
    let shape = read_index_array(&mut npz, "shape")?;
    if shape.len() != 2 {
        return Err(FeatureError::array_file(
            "<npz>",
            format!("shape array has {} elements", shape.len()),
        ));
    }
    ContactMatrix::from_csr((shape[0], shape[1]), &indptr, &indices, &data)
}

/// Get a 1 dimensional array from an npz archive, with or without the .npy suffix
fn npz_array<R: Read + Seek, A: ReadableElement>(
    npz: &mut NpzReader<R>,
    name: &str,
) -> std::result::Result<Array1<A>, ReadNpzError> {
    npz.by_name(name)
        .or_else(|_| npz.by_name(&format!("{}.npy", name)))
}

/// Index arrays may be stored as 32 or 64 bit integers
fn read_index_array<R: Read + Seek>(npz: &mut NpzReader<R>, name: &str) -> Result<Vec<usize>> {
    let v: Vec<i64> = match npz_array::<_, i32>(npz, name) {
        Ok(a) => a.iter().map(|x| *x as i64).collect(),
        Err(_) => npz_array::<_, i64>(npz, name)
            .map_err(|e| FeatureError::array_file("<npz>", format!("array '{}': {}", name, e)))?
            .to_vec(),
    };
    v.into_iter()
        .map(|x| {
            usize::try_from(x).map_err(|_| {
                FeatureError::array_file("<npz>", format!("negative value in '{}'", name))
            })
        })
        .collect()
}

/// Write a record as a 1 dimensional npy array.
///
/// The record is written to a temporary file in the same directory and then renamed,
/// so an interrupted job never leaves a partial record behind.  The temporary file is
/// removed if the write fails.  Missing parent directories are created
pub fn write_record<P: AsRef<Path>>(fname: P, record: &[f64]) -> Result<()> {
    let fname = fname.as_ref();
    if let Some(d) = fname.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !d.exists() {
            fs::create_dir_all(d)?
        }
    }
    let mut tmp = fname.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    trace!("Writing {} values to {}", record.len(), tmp.display());
    let res = write_npy(&tmp, &Array1::from_vec(record.to_vec()))
        .map_err(|e| FeatureError::array_file(&tmp, e))
        .and_then(|_| fs::rename(&tmp, fname).map_err(FeatureError::from));
    if res.is_err() && tmp.exists() {
        trace!("Removing temporary file {}", tmp.display());
        let _ = fs::remove_file(&tmp);
    }
    res
}

pub fn read_record<P: AsRef<Path>>(fname: P) -> Result<Vec<f64>> {
    let fname = fname.as_ref();
    let a: Array1<f64> = read_npy(fname).map_err(|e| FeatureError::array_file(fname, e))?;
    Ok(a.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", "chr1")]
    #[case("chr1", "chr1")]
    #[case("X", "chrX")]
    #[case("chrchr2", "chrchr2")]
    fn chromosome_names(#[case] s: &str, #[case] expected: &str) {
        assert_eq!(chrom_name(s), expected)
    }

    #[test]
    fn file_layout() {
        let d = Path::new("/data");
        assert_eq!(
            contact_list_path(d, "cell_7", "1"),
            PathBuf::from("/data/chr1/cell_7_chr1.txt")
        );
        assert_eq!(
            container_path(d, "cell_7", "chr1", "pad1_std1_rp0.5_sqrtvc"),
            PathBuf::from("/data/chr1/cell_7_chr1_pad1_std1_rp0.5_sqrtvc.npz")
        );
        assert_eq!(
            record_path(d, "cell_7", "chr1", "raw", "cpgcomp"),
            PathBuf::from("/data/chr1/cell_7_chr1_raw.cpgcomp.npy")
        );
    }

    #[test]
    fn contact_list() {
        let input = "0\t1\t3\n1 2 1.5\n\n# comment\n0.0\t1.0\t2.0\n";
        let m = read_contacts(input.as_bytes(), 4).unwrap();
        assert_eq!(m.get(0, 1), 5.0);
        assert_eq!(m.get(1, 2), 1.5);
        assert_eq!(m.get(1, 0), 0.0);
        assert_eq!(m.n(), 4);
    }

    #[test]
    fn empty_contact_list() {
        let m = read_contacts("".as_bytes(), 3).unwrap();
        assert_eq!(m.n(), 3);
        assert_eq!(m.nnz(), 0);
    }

    #[rstest]
    #[case("0 1\n")]
    #[case("0 x 1\n")]
    #[case("0 1.5 1\n")]
    #[case("-1 1 1\n")]
    #[case("0 1 y\n")]
    fn contact_list_parse_errors(#[case] input: &str) {
        assert!(matches!(
            read_contacts(input.as_bytes(), 3),
            Err(FeatureError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn contact_list_out_of_range() {
        assert!(matches!(
            read_contacts("0 5 1\n".as_bytes(), 3),
            Err(FeatureError::InvalidEntry { .. })
        ));
    }
}
