use crate::matrix::ContactMatrix;

/// Remove the diagonal and form A + A^T
///
/// Entries present in both triangles are added together, so a matrix that is already
/// symmetric has its off diagonal entries doubled
pub fn symmetrize(a: &ContactMatrix) -> ContactMatrix {
    let triplets = a
        .iter()
        .filter(|(row, col, _)| row != col)
        .flat_map(|(row, col, x)| [(row, col, x), (col, row, x)]);
    ContactMatrix::from_valid_triplets(a.n(), triplets)
}

/// Canonical contact matrix: zero diagonal, symmetrized, and a self loop of weight 1
/// added to every row that has no contacts so that all row sums are positive
pub fn normalize_matrix(a: &ContactMatrix) -> ContactMatrix {
    let s = symmetrize(a);
    let empty_rows: Vec<usize> = s
        .row_sums()
        .iter()
        .enumerate()
        .filter(|(_, x)| **x == 0.0)
        .map(|(i, _)| i)
        .collect();
    if empty_rows.is_empty() {
        s
    } else {
        trace!(
            "Adding self loops to {} of {} bins with no contacts",
            empty_rows.len(),
            s.n()
        );
        let self_loops = empty_rows.into_iter().map(|i| (i, i, 1.0));
        ContactMatrix::from_valid_triplets(s.n(), s.iter().chain(self_loops))
    }
}

/// Row stochastic (transition) matrix P = D^-1 A where D is the diagonal matrix of row
/// sums.  Rows with zero sum are left as zero
pub fn row_stochastic(a: &ContactMatrix) -> ContactMatrix {
    let sums = a.row_sums();
    ContactMatrix::from_valid_triplets(
        a.n(),
        a.iter()
            .map(|(row, col, x)| (row, col, crate::ZeroDivisionPolicy::Zero.divide(x, sums[row]))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_canonical(m: &ContactMatrix, original: &ContactMatrix) {
        assert!(m.is_symmetric());
        let sums = m.row_sums();
        let orig_sym = symmetrize(original).row_sums();
        for i in 0..m.n() {
            assert!(sums[i] > 0.0, "row {} has zero sum", i);
            let d = m.get(i, i);
            if orig_sym[i] == 0.0 {
                assert_eq!(d, 1.0)
            } else {
                assert_eq!(d, 0.0)
            }
        }
    }

    #[test]
    fn upper_triangular_input() {
        let a = ContactMatrix::from_triplets(5, vec![(0, 1, 4.0)]).unwrap();
        let m = normalize_matrix(&a);
        assert_eq!(m.get(0, 1), 4.0);
        assert_eq!(m.get(1, 0), 4.0);
        assert_eq!(m.diagonal(), vec![0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(m.nnz(), 5);
        check_canonical(&m, &a);
    }

    #[test]
    fn mirrored_input_is_doubled() {
        let a = ContactMatrix::from_triplets(2, vec![(0, 1, 4.0), (1, 0, 4.0)]).unwrap();
        let m = normalize_matrix(&a);
        assert_eq!(m.get(0, 1), 8.0);
        assert_eq!(m.get(1, 0), 8.0);
    }

    #[test]
    fn diagonal_is_removed() {
        let a = ContactMatrix::from_triplets(
            3,
            vec![(0, 0, 9.0), (1, 1, 3.0), (0, 2, 1.0), (2, 1, 2.5)],
        )
        .unwrap();
        let m = normalize_matrix(&a);
        // Bin 1 keeps a contact with bin 2 so no self loop is added
        assert_eq!(m.diagonal(), vec![0.0, 0.0, 0.0]);
        assert_eq!(m.get(1, 2), 2.5);
        assert_eq!(m.get(2, 0), 1.0);
        check_canonical(&m, &a);
    }

    #[test]
    fn only_diagonal_gives_self_loops() {
        let a = ContactMatrix::from_triplets(3, vec![(0, 0, 9.0), (2, 2, 1.0)]).unwrap();
        let m = normalize_matrix(&a);
        assert_eq!(m.diagonal(), vec![1.0, 1.0, 1.0]);
        assert_eq!(m.nnz(), 3);
    }

    #[test]
    fn degenerate_matrices() {
        let m = normalize_matrix(&ContactMatrix::zeros(0));
        assert!(m.is_empty());
        let a = ContactMatrix::zeros(4);
        let m = normalize_matrix(&a);
        assert_eq!(m.row_sums(), vec![1.0; 4]);
        check_canonical(&m, &a);
    }

    #[test]
    fn transition_matrix_rows_sum_to_one() {
        let a = ContactMatrix::from_triplets(4, vec![(0, 1, 1.0), (0, 2, 3.0), (1, 2, 2.0)])
            .unwrap();
        let p = row_stochastic(&normalize_matrix(&a));
        for s in p.row_sums() {
            assert!((s - 1.0).abs() < 1e-12)
        }
        assert!((p.get(0, 2) - 0.75).abs() < 1e-12);
        assert!((p.get(2, 1) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn transition_matrix_keeps_zero_rows() {
        let a = ContactMatrix::from_triplets(2, vec![(0, 1, 2.0)]).unwrap();
        let p = row_stochastic(&a);
        assert_eq!(p.row_sums(), vec![1.0, 0.0]);
    }
}
