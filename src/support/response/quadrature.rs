use std::f64::consts::PI;

use thiserror::Error;

/// Newton iteration limit per root.
const MAX_NEWTON_ITERS: usize = 100;

/// Absolute convergence tolerance for a root on `[-1, 1]`.
const ROOT_TOL: f64 = 3.0e-15;

/// Errors raised while building a [`GaussLegendre`] rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuadratureError {
    /// A rule needs at least one node.
    #[error("quadrature order must be at least 1")]
    ZeroOrder,

    /// Newton iteration did not settle on a Legendre root.
    #[error("legendre root {root} of order {order} did not converge")]
    RootNotConverged { order: usize, root: usize },
}

/// Fixed-order Gauss–Legendre quadrature rule.
///
/// Nodes are the roots of the Legendre polynomial `P_n` on `[-1, 1]`, found by
/// Newton iteration on the three-term recurrence; weights follow from `P_n'`.
/// A rule of order `n` integrates polynomials up to degree `2n - 1` exactly.
///
/// All nodes lie strictly inside `(-1, 1)`, so an integrand with an integrable
/// singularity at an interval endpoint is never evaluated there.
///
/// # Example
///
/// ```
/// use twine_geothermal::support::response::GaussLegendre;
///
/// let rule = GaussLegendre::new(3).unwrap();
///
/// // Exact for x^5 with only three nodes.
/// let integral = rule.integrate(|x| x.powi(5), 0.0, 2.0);
/// assert!((integral - 64.0 / 6.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GaussLegendre {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussLegendre {
    /// Computes the nodes and weights of an order-`order` rule.
    ///
    /// # Errors
    ///
    /// Returns [`QuadratureError::ZeroOrder`] for `order == 0`, or
    /// [`QuadratureError::RootNotConverged`] if Newton iteration stalls.
    pub fn new(order: usize) -> Result<Self, QuadratureError> {
        if order == 0 {
            return Err(QuadratureError::ZeroOrder);
        }

        let n = order;
        let mut nodes = vec![0.0; n];
        let mut weights = vec![0.0; n];

        // Roots are symmetric, so only the positive half is searched.
        for i in 0..n.div_ceil(2) {
            #[allow(clippy::cast_precision_loss)]
            let mut z = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
            let mut derivative = 0.0;
            let mut converged = false;

            for _ in 0..MAX_NEWTON_ITERS {
                let (p, dp) = legendre(n, z);
                derivative = dp;
                let step = p / dp;
                z -= step;
                if step.abs() < ROOT_TOL {
                    converged = true;
                    break;
                }
            }

            if !converged {
                return Err(QuadratureError::RootNotConverged { order, root: i });
            }

            let weight = 2.0 / ((1.0 - z * z) * derivative * derivative);
            nodes[i] = -z;
            nodes[n - 1 - i] = z;
            weights[i] = weight;
            weights[n - 1 - i] = weight;
        }

        Ok(Self { nodes, weights })
    }

    /// Number of nodes.
    #[must_use]
    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes on `[-1, 1]`, ascending.
    #[must_use]
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Weights matching [`GaussLegendre::nodes`].
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Approximates `∫ f(x) dx` over `[a, b]`.
    ///
    /// Nodes and weights are mapped from `[-1, 1]` with the affine map
    /// `x = (b - a)/2 · ξ + (a + b)/2`.
    pub fn integrate(&self, f: impl Fn(f64) -> f64, a: f64, b: f64) -> f64 {
        let half = 0.5 * (b - a);
        let mid = 0.5 * (a + b);

        let sum: f64 = self
            .nodes
            .iter()
            .zip(&self.weights)
            .map(|(&xi, &w)| w * f(half * xi + mid))
            .sum();

        sum * half
    }
}

/// Evaluates `P_n(z)` and `P_n'(z)` by upward recurrence.
fn legendre(n: usize, z: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = z;
    for k in 2..=n {
        #[allow(clippy::cast_precision_loss)]
        let k = k as f64;
        let p2 = ((2.0 * k - 1.0) * z * p1 - (k - 1.0) * p0) / k;
        p0 = p1;
        p1 = p2;
    }

    #[allow(clippy::cast_precision_loss)]
    let dp = n as f64 * (z * p1 - p0) / (z * z - 1.0);

    (p1, dp)
}
