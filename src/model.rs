use crate::coefficients::{CoefficientError, CoefficientSet, COEFF_DIM};

/// A magnetic model instance holding the coefficient arrays that the
/// field calculations read from.
///
/// `c` and `cd` use the packed layout described on
/// [`CoefficientSet`]: `c[m][n]` holds g(n, m) and, for m != 0,
/// `c[n][m - 1]` holds h(n, m).
#[derive(Debug, Clone, PartialEq)]
pub struct MagneticModel {
    /// Base year of the loaded coefficient set.
    pub epoch: f64,
    /// Midpoint of the model's five year validity window, `epoch + 2.5`.
    pub default_date: f64,
    /// Gauss coefficients in nT.
    pub c: [[f64; COEFF_DIM]; COEFF_DIM],
    /// Secular variation rates in nT/year.
    pub cd: [[f64; COEFF_DIM]; COEFF_DIM],
}

impl MagneticModel {
    /// Creates an empty model with zeroed coefficient arrays.
    pub fn new() -> MagneticModel {
        MagneticModel {
            epoch: 0.0,
            default_date: 0.0,
            c: [[0.0; COEFF_DIM]; COEFF_DIM],
            cd: [[0.0; COEFF_DIM]; COEFF_DIM],
        }
    }

    /// Populates this model from the coefficient file shipped with the
    /// crate.
    ///
    /// The file is parsed in full before anything is written, so a failed
    /// load leaves the model exactly as it was.
    ///
    /// # Errors
    /// Will return `Err` if the bundled file cannot be read or any of its
    /// records fails to parse.
    pub fn load_coefficients(&mut self) -> Result<(), CoefficientError> {
        let coeffs = CoefficientSet::bundled()?;
        self.apply(&coeffs);
        Ok(())
    }

    /// Copies a parsed coefficient set into this model.
    pub fn apply(&mut self, coeffs: &CoefficientSet) {
        self.epoch = coeffs.epoch;
        self.default_date = coeffs.default_date;
        self.c = coeffs.c;
        self.cd = coeffs.cd;
    }
}

impl Default for MagneticModel {
    fn default() -> Self {
        Self::new()
    }
}
