//! Loader for World Magnetic Model (WMM) spherical harmonic coefficients.
//!
//! The WMM describes the Earth's main magnetic field as a spherical
//! harmonic expansion whose Gauss coefficients g(n, m) and h(n, m), and
//! their secular variation rates, are published as a fixed-format text
//! file for each five year release. This crate parses that file into the
//! packed coefficient arrays that field calculations work from.
//!
//! ```no_run
//! use wmm::MagneticModel;
//!
//! let mut model = MagneticModel::new();
//! model.load_coefficients()?;
//! assert_eq!(model.default_date, model.epoch + 2.5);
//! # Ok::<(), wmm::CoefficientError>(())
//! ```

pub mod coefficients;
pub mod error;
pub mod model;

pub use crate::coefficients::{CoefficientError, CoefficientSet, COEFF_DIM, MAX_DEGREE};
pub use crate::error::WmmError;
pub use crate::model::MagneticModel;
