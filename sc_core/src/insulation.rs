use crate::{
    error::{FeatureError, Result},
    matrix::ContactMatrix,
    ZeroDivisionPolicy,
};

pub const DEFAULT_WINDOW: usize = 10;

/// Parameters for insulation score calculation
///
/// window - number of bins on each side of the boundary
/// zero_total - result when there is no signal either within or between the windows
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsulationParams {
    pub window: usize,
    pub zero_total: ZeroDivisionPolicy,
}

impl Default for InsulationParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            zero_total: ZeroDivisionPolicy::Zero,
        }
    }
}

impl InsulationParams {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            Err(FeatureError::InvalidWindow(self.window))
        } else {
            Ok(())
        }
    }
}

/// Insulation score for each bin of a contact matrix
///
/// For a boundary at bin i, with windows L = [i - w, i) and R = [i, i + w), the score
/// is inter / (inter + intra) where intra is the mean contact density within L and within R,
/// and inter is the mean density between L and R.  Near the left end (i < w) L is truncated
/// to [0, i) and the divisors become i(i+1)/2 + w(w+1)/2 for intra and i·w for inter (the
/// number of L x R pairs).  Some older insulation scripts divide by i(i+w) here instead.
/// At the right end the windows are truncated to the matrix but the full window divisors
/// are used.
///
/// The score for bin 0 is always 1.  An empty matrix gives an empty vector.
pub fn compute_insulation(a: &ContactMatrix, params: &InsulationParams) -> Result<Vec<f64>> {
    params.validate()?;
    let n = a.n();
    let w = params.window;
    let mut score = vec![1.0; n];
    if n == 0 {
        debug!("Empty contact matrix: no insulation scores");
        return Ok(score);
    }
    let w_tri = (w * (w + 1)) as f64 / 2.0;
    for (i, sc) in score.iter_mut().enumerate().skip(1) {
        let right = i..i + w;
        let right_sum = a.block_sum(right.clone(), right.clone());
        let (intra, inter) = if i < w {
            let left = 0..i;
            let i_tri = (i * (i + 1)) as f64 / 2.0;
            (
                (a.block_sum(left.clone(), left.clone()) + right_sum) / (i_tri + w_tri),
                a.block_sum(left, right) / ((i * w) as f64),
            )
        } else {
            let left = i - w..i;
            (
                (a.block_sum(left.clone(), left.clone()) + right_sum) / (2.0 * w_tri),
                a.block_sum(left, right) / ((w * w) as f64),
            )
        };
        *sc = params.zero_total.divide(inter, inter + intra);
    }
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_matrix;
    use rstest::rstest;

    fn chain(n: usize) -> ContactMatrix {
        // Neighbouring bins in contact, with a gap between bins 4 and 5
        let triplets = (0..n.saturating_sub(1))
            .filter(|i| *i != 4)
            .map(|i| (i, i + 1, 1.0));
        normalize_matrix(&ContactMatrix::from_triplets(n, triplets).unwrap())
    }

    #[test]
    fn zero_window_rejected() {
        let a = ContactMatrix::zeros(3);
        assert!(matches!(
            compute_insulation(&a, &InsulationParams::new(0)),
            Err(FeatureError::InvalidWindow(0))
        ));
    }

    #[test]
    fn empty_matrix() {
        let a = ContactMatrix::zeros(0);
        assert!(compute_insulation(&a, &InsulationParams::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn window_larger_than_matrix() {
        // Only the left edge branch is used (i = 1, 2)
        let a = normalize_matrix(
            &ContactMatrix::from_triplets(3, vec![(0, 1, 2.0), (1, 2, 1.0)]).unwrap(),
        );
        let s = compute_insulation(&a, &InsulationParams::new(10)).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s[0], 1.0);

        // i = 1: intra = (0 + 2) / (1 + 55), inter = 2 / 10
        let intra = 2.0 / 56.0;
        let inter = 0.2;
        assert!((s[1] - inter / (inter + intra)).abs() < 1e-12);

        // i = 2: intra = (4 + 0) / (3 + 55), inter = 1 / 20
        let intra = 4.0 / 58.0;
        let inter = 0.05;
        assert!((s[2] - inter / (inter + intra)).abs() < 1e-12);
    }

    #[test]
    fn full_window_branch() {
        let a = chain(8);
        let s = compute_insulation(&a, &InsulationParams::new(2)).unwrap();
        // i = 3: L = [1, 3), R = [3, 5)
        // intra = (2 + 2) / 6, inter = A[2,3] / 4
        let intra = 4.0 / 6.0;
        let inter = 0.25;
        assert!((s[3] - inter / (inter + intra)).abs() < 1e-12);
        // i = 5 lies on the gap: no contacts between the windows
        assert_eq!(s[5], 0.0);
    }

    #[test]
    fn right_edge_uses_full_divisors() {
        let a = chain(8);
        let s = compute_insulation(&a, &InsulationParams::new(2)).unwrap();
        // i = 7: L = [5, 7), R = [7, 9) truncated to [7, 8)
        // intra = (2 + 0) / 6, inter = A[6,7] / 4
        let intra = 2.0 / 6.0;
        let inter = 0.25;
        assert!((s[7] - inter / (inter + intra)).abs() < 1e-12);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(10)]
    fn scores_in_unit_interval(#[case] w: usize) {
        let a = chain(25);
        let s = compute_insulation(&a, &InsulationParams::new(w)).unwrap();
        assert_eq!(s.len(), 25);
        assert_eq!(s[0], 1.0);
        assert!(s.iter().all(|x| (0.0..=1.0).contains(x)));
    }

    #[test]
    fn no_signal_policy() {
        let a = ContactMatrix::zeros(4);
        let s = compute_insulation(&a, &InsulationParams::new(2)).unwrap();
        assert_eq!(s, vec![1.0, 0.0, 0.0, 0.0]);

        let params = InsulationParams {
            window: 2,
            zero_total: ZeroDivisionPolicy::Propagate,
        };
        let s = compute_insulation(&a, &params).unwrap();
        assert_eq!(s[0], 1.0);
        assert!(s[1..].iter().all(|x| x.is_nan()));
    }
}
