//! Genome organization features from single cell Hi-C contact matrices.
//!
//! Two independent engines work on the contact matrix for one chromosome of one cell:
//!
//!   insulation - per bin insulation scores for domain boundary detection
//!   compartment - CpG weighted compartment scores and A/B compartment strength
//!
//! Both engines are pure functions with no shared state, so callers may run any number
//! of (cell, chromosome) jobs in parallel.  File access is restricted to the [io] and
//! [cpg] loaders and the record persister.
#[macro_use]
extern crate log;

pub mod compartment;
pub mod concat;
pub mod cpg;
pub mod error;
pub mod insulation;
pub mod io;
pub mod matrix;
pub mod normalize;

pub use compartment::{compute_compartment, BinClass, CompartmentParams, CompartmentResult};
pub use cpg::{CpgProfile, CpgTable};
pub use error::{FeatureError, Result};
pub use insulation::{compute_insulation, InsulationParams};
pub use matrix::ContactMatrix;
pub use normalize::{normalize_matrix, row_stochastic};

/// Policy applied when a ratio has a zero denominator
/// (zero total contact signal around a bin, or zero distance decay)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroDivisionPolicy {
    /// Result is set to 0
    #[default]
    Zero,
    /// Result is the IEEE quotient (NaN or infinite)
    Propagate,
}

impl ZeroDivisionPolicy {
    pub fn divide(&self, num: f64, den: f64) -> f64 {
        if den == 0.0 && matches!(self, Self::Zero) {
            0.0
        } else {
            num / den
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_division_policy() {
        assert_eq!(ZeroDivisionPolicy::Zero.divide(0.0, 0.0), 0.0);
        assert_eq!(ZeroDivisionPolicy::Zero.divide(3.0, 0.0), 0.0);
        assert_eq!(ZeroDivisionPolicy::Zero.divide(3.0, 2.0), 1.5);
        assert!(ZeroDivisionPolicy::Propagate.divide(0.0, 0.0).is_nan());
        assert!(ZeroDivisionPolicy::Propagate.divide(1.0, 0.0).is_infinite());
    }
}
