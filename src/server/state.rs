use std::sync::Arc;

use crate::configuration::{
    Configuration,
    ConfigurationError,
    FourierConfiguration
};
use crate::fourier::fouriercalculator::FourierCalculator;
use crate::fourier::fouriercoefficients::FourierCoefficients;
use crate::fourier::fouriererror::FourierError;
use crate::math::curve::targetfunction::TargetFunction;

/// 伺服器共享狀態；建立後不再變動，clone 只複製 `Arc`。
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>
}

struct AppStateInner {
    fourier: FourierConfiguration,
    calculator: FourierCalculator,
    target: TargetFunction
}

impl AppState {
    pub fn new(
        fourier: FourierConfiguration,
        calculator: FourierCalculator,
        target: TargetFunction
    ) -> AppState {
        AppState { inner: Arc::new(AppStateInner { fourier, calculator, target }) }
    }

    pub fn from_configuration(configuration: &Configuration) -> Result<AppState, ConfigurationError> {
        let target = configuration.target().build()?;
        let calculator = FourierCalculator::new(*configuration.quadrature());
        Ok(AppState::new(*configuration.fourier(), calculator, target))
    }

    pub fn fourier(&self) -> &FourierConfiguration {
        &self.inner.fourier
    }

    pub fn compute(&self, harmonics: usize) -> Result<FourierCoefficients, FourierError> {
        self.inner.calculator.compute(self.inner.fourier.half_period(), harmonics, &self.inner.target)
    }
}
