use std::fmt;

use thiserror::Error;

use crate::math::quadrature::quadrature::IntegrationError;

/// 正在計算的係數，用於錯誤訊息。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoefficientTerm {
    Constant,
    Cosine(usize),
    Sine(usize)
}

impl fmt::Display for CoefficientTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoefficientTerm::Constant => write!(f, "a0"),
            CoefficientTerm::Cosine(i) => write!(f, "A[{}]", i),
            CoefficientTerm::Sine(i) => write!(f, "B[{}]", i)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FourierError {
    #[error("half-period must be positive and finite, got {0}")]
    InvalidHalfPeriod(f64),

    #[error("failed to integrate {term}: {source}")]
    Integration {
        term: CoefficientTerm,
        #[source]
        source: IntegrationError
    },
}
