use std::f64::consts::PI;

use tracing::debug;

use crate::fourier::fouriercoefficients::FourierCoefficients;
use crate::fourier::fouriererror::{
    CoefficientTerm,
    FourierError
};
use crate::math::curve::curve::Curve;
use crate::math::curve::targetfunction::TargetFunction;
use crate::math::quadrature::gausskronrod::AdaptiveGaussKronrod;
use crate::math::quadrature::quadrature::Quadrature;

/// Fourier 係數計算器。
///
/// 以數值積分直接套用係數公式（區間 [-L, L]）：
///
///   a0  = (1/L) ∫ f(x) dx
///   A_i = (1/L) ∫ f(x)·cos(iπx/L) dx
///   B_i = (1/L) ∫ f(x)·sin(iπx/L) dx，i = 1..=N
///
/// 無內部可變狀態；同一個 calculator 可在多個執行緒同時使用。
pub struct FourierCalculator<Q = AdaptiveGaussKronrod> {
    quadrature: Q
}

impl Default for FourierCalculator<AdaptiveGaussKronrod> {
    fn default() -> Self {
        FourierCalculator::new(AdaptiveGaussKronrod::default())
    }
}

impl<Q> FourierCalculator<Q> where
    Q: Quadrature {
    pub fn new(quadrature: Q) -> FourierCalculator<Q> {
        FourierCalculator { quadrature }
    }

    pub fn compute(
        &self,
        half_period: f64,
        harmonics: usize,
        target: &TargetFunction
    ) -> Result<FourierCoefficients, FourierError> {
        if !(half_period.is_finite() && half_period > 0.0) {
            return Err(FourierError::InvalidHalfPeriod(half_period));
        }

        let break_points = target.break_points(-half_period, half_period);
        let a0 = self.coefficient(CoefficientTerm::Constant, &|x: f64| target.value(x), half_period, &break_points)?;

        let mut a = Vec::with_capacity(harmonics);
        let mut b = Vec::with_capacity(harmonics);
        for i in 1..=harmonics {
            let omega = i as f64 * PI / half_period;
            let cosine = |x: f64| target.value(x) * (omega * x).cos();
            let sine = |x: f64| target.value(x) * (omega * x).sin();
            a.push(self.coefficient(CoefficientTerm::Cosine(i), &cosine, half_period, &break_points)?);
            b.push(self.coefficient(CoefficientTerm::Sine(i), &sine, half_period, &break_points)?);
        }

        debug!(half_period, harmonics, a0, "computed fourier coefficients");
        Ok(FourierCoefficients::new(a0, a, b, half_period))
    }

    fn coefficient(
        &self,
        term: CoefficientTerm,
        integrand: &dyn Fn(f64) -> f64,
        half_period: f64,
        break_points: &[f64]
    ) -> Result<f64, FourierError> {
        self.quadrature
            .integrate(integrand, -half_period, half_period, break_points)
            .map(|result| result.value() / half_period)
            .map_err(|source| FourierError::Integration { term, source })
    }
}
