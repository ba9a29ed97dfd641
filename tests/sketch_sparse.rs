//! Integration tests for sparse sketch application

use sketchmat::coo::coo_to_dense;
use sketchmat::prelude::*;

fn densify(s: &mut SparseSkOp<'_, f64>) -> Vec<f64> {
    let coo = s.coo_view().unwrap();
    let mut out = vec![0.0; coo.n_rows * coo.n_cols];
    coo_to_dense(&coo, Layout::RowMajor, &mut out).unwrap();
    out
}

#[test]
fn test_left_apply_equals_densified_product() {
    let (d, m, n) = (8usize, 40usize, 6usize);
    let dist = SparseDist::new(d, m, 4);
    let mut s = SparseSkOp::<f64>::new(dist, RngState::from_key(70)).unwrap();
    let s_mat = densify(&mut s);
    let a: Vec<f64> = (0..m * n).map(|t| ((t * 11 % 23) as f64) - 11.0).collect();

    let mut b = vec![0.0; d * n];
    sketch_sparse_left(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        1.0,
        &mut s,
        0,
        0,
        &a,
        n,
        0.0,
        &mut b,
        n,
    )
    .unwrap();

    for i in 0..d {
        for j in 0..n {
            let mut acc = 0.0;
            for p in 0..m {
                acc += s_mat[i * m + p] * a[p * n + j];
            }
            assert!((b[i * n + j] - acc).abs() < 1e-12);
        }
    }
}

#[test]
fn test_left_apply_fills_on_demand() {
    // An unfilled operator is sampled inside the apply call, and the result
    // matches applying a pre-filled copy.
    let (d, m, n) = (6usize, 30usize, 4usize);
    let dist = SparseDist::new(d, m, 3);
    let a: Vec<f64> = (0..m * n).map(|t| (t as f64) * 0.01).collect();

    let mut unfilled = SparseSkOp::<f64>::new(dist, RngState::from_key(44)).unwrap();
    assert!(!unfilled.known_filled());
    let mut b1 = vec![0.0; d * n];
    sketch_sparse_left(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        1.0,
        &mut unfilled,
        0,
        0,
        &a,
        n,
        0.0,
        &mut b1,
        n,
    )
    .unwrap();
    assert!(unfilled.known_filled());

    let mut prefilled = SparseSkOp::<f64>::new(dist, RngState::from_key(44)).unwrap();
    prefilled.fill().unwrap();
    let mut b2 = vec![0.0; d * n];
    sketch_sparse_left(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        1.0,
        &mut prefilled,
        0,
        0,
        &a,
        n,
        0.0,
        &mut b2,
        n,
    )
    .unwrap();

    assert_eq!(b1, b2);
}

#[test]
fn test_isometry_scaled_sketch_preserves_norms_on_average() {
    // With alpha = isometry_scale, E[ |S x|^2 ] = |x|^2. A single wide
    // sketch of a fixed vector should land within a loose band.
    let (d, m) = (100usize, 400usize);
    let dist = SparseDist::new(d, m, 8);
    let mut s = SparseSkOp::<f64>::new(dist, RngState::from_key(1)).unwrap();
    let alpha = dist.isometry_scale();

    let x: Vec<f64> = (0..m).map(|t| ((t % 5) as f64) - 2.0).collect();
    let x_norm2: f64 = x.iter().map(|v| v * v).sum();

    let mut y = vec![0.0; d];
    sketch_sparse_left(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        1,
        m,
        alpha,
        &mut s,
        0,
        0,
        &x,
        1,
        0.0,
        &mut y,
        1,
    )
    .unwrap();

    let y_norm2: f64 = y.iter().map(|v| v * v).sum();
    let ratio = y_norm2 / x_norm2;
    assert!((0.5..2.0).contains(&ratio), "norm ratio = {}", ratio);
}

#[test]
fn test_right_apply_transposed_window() {
    // Right-apply with op(S) = S^T against a sub-block window, checked
    // against the densified parent.
    let (pn, pd) = (12usize, 20usize); // parent is pd x pn; we use S^T windows
    let (m, n, d) = (3usize, 5usize, 4usize);
    let (ro, co) = (7usize, 2usize);
    let dist = SparseDist::new(pd, pn, 2);
    let mut s = SparseSkOp::<f64>::new(dist, RngState::from_key(33)).unwrap();
    let parent = densify(&mut s); // pd x pn row-major

    let a: Vec<f64> = (0..m * n).map(|t| ((t * 13 % 9) as f64) - 4.0).collect();

    // op(S) = S^T, so the stored sub-block is (rows_s, cols_s) = (d, n)
    // starting at (ro, co); op(submat(S)) is n x d.
    let mut b = vec![0.0; m * d];
    sketch_sparse_right(
        Layout::RowMajor,
        Op::NoTrans,
        Op::Trans,
        m,
        d,
        n,
        1.0,
        &a,
        n,
        &mut s,
        ro,
        co,
        0.0,
        &mut b,
        d,
    )
    .unwrap();

    let mut b_ref = vec![0.0; m * d];
    for i in 0..m {
        for q in 0..d {
            let mut acc = 0.0;
            for p in 0..n {
                // op(submat(S))[p, q] = parent[ro + q, co + p]
                acc += a[i * n + p] * parent[(ro + q) * pn + (co + p)];
            }
            b_ref[i * d + q] = acc;
        }
    }
    for (x, y) in b.iter().zip(b_ref.iter()) {
        assert!((x - y).abs() < 1e-12, "{} vs {}", x, y);
    }
}

#[test]
fn test_left_apply_colmajor_agrees_with_rowmajor() {
    let (d, m, n) = (5usize, 25usize, 4usize);
    let dist = SparseDist::new(d, m, 3);
    let a_rm: Vec<f64> = (0..m * n).map(|t| (t as f64) * 0.2 - 2.0).collect();
    let mut a_cm = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            a_cm[i + j * m] = a_rm[i * n + j];
        }
    }

    let mut s1 = SparseSkOp::<f64>::new(dist, RngState::from_key(12)).unwrap();
    let mut b_rm = vec![0.0; d * n];
    sketch_sparse_left(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        1.0,
        &mut s1,
        0,
        0,
        &a_rm,
        n,
        0.0,
        &mut b_rm,
        n,
    )
    .unwrap();

    let mut s2 = SparseSkOp::<f64>::new(dist, RngState::from_key(12)).unwrap();
    let mut b_cm = vec![0.0; d * n];
    sketch_sparse_left(
        Layout::ColMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        1.0,
        &mut s2,
        0,
        0,
        &a_cm,
        m,
        0.0,
        &mut b_cm,
        d,
    )
    .unwrap();

    for i in 0..d {
        for j in 0..n {
            assert!((b_rm[i * n + j] - b_cm[i + j * d]).abs() < 1e-12);
        }
    }
}
