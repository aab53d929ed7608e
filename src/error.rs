use crate::coefficients::CoefficientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WmmError {
    /// Unable to load the coefficient file
    #[error("{0}")]
    Coefficient(#[from] CoefficientError),
}
