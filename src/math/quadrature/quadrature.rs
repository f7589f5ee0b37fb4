use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("integration bounds must be finite, got [{lower}, {upper}]")]
    InvalidInterval { lower: f64, upper: f64 },

    #[error("integrand is not finite at x = {x} (value {value})")]
    NonFiniteIntegrand { x: f64, value: f64 },

    #[error("no convergence after {subdivisions} subdivisions (estimated error {abs_error:e})")]
    NotConverged { subdivisions: usize, abs_error: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntegrationResult {
    value: f64,
    abs_error: f64,
    subdivisions: usize,
    converged: bool
}

impl IntegrationResult {
    pub fn new(value: f64, abs_error: f64, subdivisions: usize, converged: bool) -> IntegrationResult {
        IntegrationResult { value, abs_error, subdivisions, converged }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn abs_error(&self) -> f64 {
        self.abs_error
    }

    pub fn subdivisions(&self) -> usize {
        self.subdivisions
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn negate(self) -> IntegrationResult {
        IntegrationResult { value: -self.value, ..self }
    }
}

/// 有限區間上的定積分。
///
/// `break_points` 為被積函數可能不平滑的內部點；實作不得讓單一積分區段跨過它們。
pub trait Quadrature: Send + Sync {
    fn integrate(
        &self,
        f: &dyn Fn(f64) -> f64,
        a: f64,
        b: f64,
        break_points: &[f64]
    ) -> Result<IntegrationResult, IntegrationError>;
}
