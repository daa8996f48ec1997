//! Reference master-problem solver.
//!
//! Each outer iteration the bundle solvers minimize, over the accumulated
//! cutting planes,
//!
//! ```text
//! M(w) = lambda/2 ||w||^2 [+ mu/2 ||w - w_hat||^2] + max_i (a_i . w + b_i)
//! ```
//!
//! This module solves the dual of that problem: with `kappa = lambda + mu`
//! and `v = mu * w_hat`, the minimizer is `w = (v - A alpha) / kappa` for
//! dual weights `alpha` on the unit simplex, and the dual objective
//!
//! ```text
//! D(alpha) = alpha . (b + A^T v / kappa) - 1/2 alpha . G alpha - v.v / (2 kappa)
//! ```
//!
//! with Gram matrix `G = A^T A / kappa` is maximized by pairwise coordinate
//! ascent: each step moves dual mass from the worst active plane to the best
//! one. The returned objective is the dual value (plus the proximal
//! constant), which is a valid lower bound on the master optimum at any
//! `alpha` and tight at the dual optimum.
//!
//! The exact floating-point behavior of a particular QP library is out of
//! scope; only this contract is.

use ndarray::{Array1, Array2, ArrayView1};
use thiserror::Error;

use super::buffer::Plane;

/// Iteration cap for one dual solve.
pub(crate) const MAX_INNER: usize = 2000;

/// KKT-violation threshold terminating one dual solve.
pub(crate) const INNER_TOL: f64 = 1e-10;

/// Outcome of one master solve.
#[derive(Debug, Clone)]
pub(crate) struct MasterSolution {
    /// Minimizer of the master problem.
    pub w: Array1<f64>,
    /// Master objective value (dual value at the returned `alpha`).
    pub objective: f64,
    /// Dual weights, one per plane; positive entries mark binding planes.
    pub alpha: Vec<f64>,
}

/// The master problem could not be solved.
#[derive(Debug, Error)]
pub(crate) enum MasterError {
    #[error("no cutting planes to solve over")]
    Empty,
    #[error("master problem encountered a non-finite value")]
    NonFinite,
}

/// Solve the master problem over `planes`.
///
/// `prox` adds a proximal term `mu/2 ||w - w_hat||^2` around `w_hat`.
pub(crate) fn solve(
    planes: &[Plane],
    lambda: f64,
    prox: Option<(f64, ArrayView1<f64>)>,
) -> Result<MasterSolution, MasterError> {
    let p = planes.len();
    if p == 0 {
        return Err(MasterError::Empty);
    }
    for plane in planes {
        if !plane.b.is_finite() || plane.a.iter().any(|v| !v.is_finite()) {
            return Err(MasterError::NonFinite);
        }
    }

    let (mu, w_hat) = match prox {
        Some((mu, w_hat)) => (mu, Some(w_hat)),
        None => (0.0, None),
    };
    let kappa = lambda + mu;
    let dim = planes[0].a.len();

    // v = mu * w_hat; v.v and per-plane a_i . v terms.
    let v: Option<Array1<f64>> = w_hat.map(|w| w.mapv(|x| mu * x));
    let v_sq = v.as_ref().map_or(0.0, |v| v.dot(v));

    // Linear term c_i = b_i + a_i . v / kappa and Gram G = A^T A / kappa.
    let mut c = Array1::zeros(p);
    let mut gram = Array2::zeros((p, p));
    for i in 0..p {
        c[i] = planes[i].b
            + v.as_ref().map_or(0.0, |v| planes[i].a.dot(v) / kappa);
        for j in 0..=i {
            let g = planes[i].a.dot(&planes[j].a) / kappa;
            gram[[i, j]] = g;
            gram[[j, i]] = g;
        }
    }

    // Pairwise coordinate ascent on the simplex, starting from uniform.
    let mut alpha = vec![1.0 / p as f64; p];
    // g_alpha = G alpha, maintained incrementally.
    let mut g_alpha: Vec<f64> = (0..p)
        .map(|i| (0..p).map(|j| gram[[i, j]] * alpha[j]).sum())
        .collect();

    for _ in 0..MAX_INNER {
        let mut up = 0;
        let mut dn = None::<usize>;
        let mut g_up = f64::NEG_INFINITY;
        let mut g_dn = f64::INFINITY;
        for i in 0..p {
            let g = c[i] - g_alpha[i];
            if g > g_up {
                g_up = g;
                up = i;
            }
            if alpha[i] > 0.0 && g < g_dn {
                g_dn = g;
                dn = Some(i);
            }
        }
        let dn = match dn {
            Some(dn) if dn != up => dn,
            _ => break,
        };
        let violation = g_up - g_dn;
        if !violation.is_finite() {
            return Err(MasterError::NonFinite);
        }
        if violation <= INNER_TOL {
            break;
        }

        let denom = gram[[up, up]] - 2.0 * gram[[up, dn]] + gram[[dn, dn]];
        let mut delta = if denom > 1e-300 {
            (violation / denom).min(alpha[dn])
        } else {
            alpha[dn]
        };
        if delta <= 0.0 {
            break;
        }
        if delta > alpha[dn] {
            delta = alpha[dn];
        }
        alpha[up] += delta;
        alpha[dn] -= delta;
        for j in 0..p {
            g_alpha[j] += delta * (gram[[up, j]] - gram[[dn, j]]);
        }
    }

    // Materialize the primal point and the dual value.
    let mut a_alpha = Array1::zeros(dim);
    for (i, plane) in planes.iter().enumerate() {
        if alpha[i] != 0.0 {
            a_alpha.scaled_add(alpha[i], &plane.a);
        }
    }
    let w = match v {
        Some(v) => (&v - &a_alpha) / kappa,
        None => a_alpha.mapv(|x| -x / kappa),
    };

    let mut dual = -v_sq / (2.0 * kappa) + mu / 2.0 * w_hat.map_or(0.0, |w| w.dot(&w));
    for i in 0..p {
        dual += alpha[i] * (c[i] - 0.5 * g_alpha[i]);
    }

    if !dual.is_finite() || w.iter().any(|x| !x.is_finite()) {
        return Err(MasterError::NonFinite);
    }

    Ok(MasterSolution {
        w,
        objective: dual,
        alpha,
    })
}
