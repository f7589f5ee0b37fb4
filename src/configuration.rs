use std::f64::consts::PI;
use std::fs::File;
use std::io::{
    BufReader,
    Read
};
use std::path::{
    Path,
    PathBuf
};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::math::curve::nonparametriccurve::nonparametriccurve::NonparametricCurve;
use crate::math::curve::nonparametriccurve::piecewisepolynomial::PolynomialType;
use crate::math::curve::nonparametriccurve::sampledcurve::{
    SampledCurve,
    SampledCurveError
};
use crate::math::curve::targetfunction::TargetFunction;
use crate::math::quadrature::gausskronrod::AdaptiveGaussKronrod;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse configuration: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidValue(String),

    #[error("cannot load sampled target '{path}': {source}")]
    SampledCurve {
        path: PathBuf,
        #[source]
        source: SampledCurveError
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// 各區段
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP 伺服器設定。`allowed_origins` 支援 `*`、完整 origin，以及 `https://*.example.com`。
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfiguration {
    host: String,
    port: u16,
    allowed_origins: Vec<String>
}

impl Default for ServerConfiguration {
    fn default() -> Self {
        ServerConfiguration {
            host: "127.0.0.1".to_owned(),
            port: 5001,
            allowed_origins: vec!["*".to_owned()]
        }
    }
}

impl ServerConfiguration {
    pub fn new(host: String, port: u16, allowed_origins: Vec<String>) -> ServerConfiguration {
        ServerConfiguration { host, port, allowed_origins }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FourierConfiguration {
    half_period: f64,
    default_harmonics: usize,
    max_harmonics: usize
}

impl Default for FourierConfiguration {
    fn default() -> Self {
        FourierConfiguration {
            half_period: 2.0 * PI,
            default_harmonics: 20,
            max_harmonics: 1000
        }
    }
}

impl FourierConfiguration {
    pub fn half_period(&self) -> f64 {
        self.half_period
    }

    pub fn default_harmonics(&self) -> usize {
        self.default_harmonics
    }

    pub fn max_harmonics(&self) -> usize {
        self.max_harmonics
    }
}

fn default_radius() -> f64 {
    1.0
}

fn default_extrapolate() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetConfiguration {
    Semicircle {
        #[serde(default = "default_radius")]
        radius: f64
    },
    OneSidedSquareRoot,
    /// CSV 取樣點插值；`extrapolate = false` 時取樣範圍外為 0
    Sampled {
        path: PathBuf,
        #[serde(default)]
        interpolation: PolynomialType,
        #[serde(default = "default_extrapolate")]
        extrapolate: bool
    },
}

impl Default for TargetConfiguration {
    fn default() -> Self {
        TargetConfiguration::Semicircle { radius: default_radius() }
    }
}

impl TargetConfiguration {
    pub fn build(&self) -> Result<TargetFunction, ConfigurationError> {
        match self {
            TargetConfiguration::Semicircle { radius } => Ok(TargetFunction::semicircle(*radius)),
            TargetConfiguration::OneSidedSquareRoot => Ok(TargetFunction::one_sided_square_root()),
            TargetConfiguration::Sampled { path, interpolation, extrapolate } => {
                let curve = SampledCurve::from_file(path, *interpolation)
                    .map_err(|source| ConfigurationError::SampledCurve { path: path.clone(), source })?;
                let (lower, upper) = (curve.min_x(), curve.max_x());
                info!(
                    path = %path.display(),
                    interpolation = ?curve.polynomial_type(),
                    lower,
                    upper,
                    "loaded sampled target function"
                );
                if *extrapolate {
                    Ok(TargetFunction::new(Arc::new(curve), lower, upper))
                } else {
                    Ok(TargetFunction::truncated(Arc::new(curve), lower, upper))
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Configuration {
    server: ServerConfiguration,
    fourier: FourierConfiguration,
    quadrature: AdaptiveGaussKronrod,
    target: TargetConfiguration
}

impl Configuration {
    pub fn new(
        server: ServerConfiguration,
        fourier: FourierConfiguration,
        quadrature: AdaptiveGaussKronrod,
        target: TargetConfiguration
    ) -> Result<Configuration, ConfigurationError> {
        let configuration = Configuration { server, fourier, quadrature, target };
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn server(&self) -> &ServerConfiguration {
        &self.server
    }

    pub fn fourier(&self) -> &FourierConfiguration {
        &self.fourier
    }

    pub fn quadrature(&self) -> &AdaptiveGaussKronrod {
        &self.quadrature
    }

    pub fn target(&self) -> &TargetConfiguration {
        &self.target
    }

    pub fn with_port(mut self, port: u16) -> Configuration {
        self.server.port = port;
        self
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Configuration, ConfigurationError> {
        let configuration: Configuration = serde_json::from_reader(reader)?;
        configuration.validate()?;
        Ok(configuration)
    }

    /// 讀取 JSON 設定檔；`sampled` 目標的相對路徑以設定檔所在目錄為基準。
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Configuration, ConfigurationError> {
        let file_path = file_path.as_ref();
        let file = File::open(file_path)?;
        let mut configuration = Configuration::from_reader(BufReader::new(file))?;
        if let TargetConfiguration::Sampled { path, .. } = &mut configuration.target {
            if path.is_relative() {
                if let Some(parent) = file_path.parent() {
                    *path = parent.join(&*path);
                }
            }
        }
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |message: String| Err(ConfigurationError::InvalidValue(message));

        let half_period = self.fourier.half_period;
        if !(half_period.is_finite() && half_period > 0.0) {
            return invalid(format!("fourier.half_period must be positive, got {}", half_period));
        }
        if self.fourier.default_harmonics > self.fourier.max_harmonics {
            return invalid(format!(
                "fourier.default_harmonics ({}) exceeds fourier.max_harmonics ({})",
                self.fourier.default_harmonics,
                self.fourier.max_harmonics
            ));
        }
        if !(self.quadrature.absolute_tolerance() > 0.0 && self.quadrature.relative_tolerance() > 0.0) {
            return invalid("quadrature tolerances must be positive".to_owned());
        }
        if self.quadrature.max_subdivisions() == 0 {
            return invalid("quadrature.max_subdivisions must be at least 1".to_owned());
        }
        if let TargetConfiguration::Semicircle { radius } = self.target {
            if !(radius.is_finite() && radius > 0.0) {
                return invalid(format!("target.radius must be positive, got {}", radius));
            }
        }
        if self.server.allowed_origins.is_empty() {
            return invalid("server.allowed_origins must not be empty".to_owned());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::curve::curve::Curve;

    #[test]
    fn empty_document_uses_defaults() {
        let configuration = Configuration::from_reader("{}".as_bytes()).unwrap();
        assert_eq!(configuration.server().port(), 5001);
        assert_eq!(configuration.server().allowed_origins(), ["*".to_owned()]);
        assert_eq!(configuration.fourier().default_harmonics(), 20);
        assert!((configuration.fourier().half_period() - 2.0 * PI).abs() < 1e-15);
        assert_eq!(configuration.quadrature().max_subdivisions(), 50);
        assert_eq!(configuration.target(), &TargetConfiguration::Semicircle { radius: 1.0 });
        assert_eq!(configuration, Configuration::default());
    }

    #[test]
    fn sections_are_parsed() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080, "allowed_origins": ["https://*.example.com"] },
            "fourier": { "half_period": 3.0, "default_harmonics": 5, "max_harmonics": 10 },
            "quadrature": { "max_subdivisions": 200, "strict": true },
            "target": { "type": "one_sided_square_root" }
        }"#;
        let configuration = Configuration::from_reader(json.as_bytes()).unwrap();
        assert_eq!(configuration.server().address(), "0.0.0.0:8080");
        assert_eq!(configuration.fourier().max_harmonics(), 10);
        assert_eq!(configuration.quadrature().max_subdivisions(), 200);
        assert!(configuration.quadrature().strict());
        assert_eq!(configuration.quadrature().absolute_tolerance(), 1.49e-8);
        assert_eq!(configuration.target(), &TargetConfiguration::OneSidedSquareRoot);
    }

    #[test]
    fn sampled_target_defaults() {
        let json = r#"{ "target": { "type": "sampled", "path": "logo.csv" } }"#;
        let configuration = Configuration::from_reader(json.as_bytes()).unwrap();
        assert_eq!(
            configuration.target(),
            &TargetConfiguration::Sampled {
                path: PathBuf::from("logo.csv"),
                interpolation: PolynomialType::NotAKnotCubic,
                extrapolate: true
            }
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{ "fourier": { "half_period": -1.0 } }"#,
            r#"{ "fourier": { "default_harmonics": 30, "max_harmonics": 10 } }"#,
            r#"{ "quadrature": { "max_subdivisions": 0 } }"#,
            r#"{ "quadrature": { "relative_tolerance": 0.0 } }"#,
            r#"{ "target": { "type": "semicircle", "radius": 0.0 } }"#,
            r#"{ "server": { "allowed_origins": [] } }"#,
        ] {
            let err = Configuration::from_reader(json.as_bytes()).unwrap_err();
            assert!(matches!(err, ConfigurationError::InvalidValue(_)), "{}", json);
        }
    }

    #[test]
    fn unknown_target_type_is_a_parse_error() {
        let err = Configuration::from_reader(r#"{ "target": { "type": "square" } }"#.as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigurationError::JsonParse(_)));
    }

    #[test]
    fn port_override() {
        let configuration = Configuration::default().with_port(9000);
        assert_eq!(configuration.server().port(), 9000);
    }

    #[test]
    fn builds_closed_form_targets() {
        let semicircle = TargetConfiguration::Semicircle { radius: 2.0 }.build().unwrap();
        assert_eq!(semicircle.lower_bound(), -2.0);
        assert_eq!(semicircle.upper_bound(), 2.0);

        let half_line = TargetConfiguration::OneSidedSquareRoot.build().unwrap();
        assert_eq!(half_line.lower_bound(), 0.0);
    }

    #[test]
    fn builds_truncated_sampled_target() {
        let target = TargetConfiguration::Sampled {
            path: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/json/semicircle.csv")),
            interpolation: PolynomialType::NaturalCubic,
            extrapolate: false
        };
        let target = target.build().unwrap();
        assert!(target.is_truncated());
        assert_eq!(target.lower_bound(), -1.0);
        assert_eq!(target.upper_bound(), 1.0);
        assert_eq!(target.value(1.5), 0.0);
        assert!((target.value(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn missing_sample_file_is_reported() {
        let target = TargetConfiguration::Sampled {
            path: PathBuf::from("does/not/exist.csv"),
            interpolation: PolynomialType::Linear,
            extrapolate: false
        };
        let err = target.build().err().unwrap();
        assert!(matches!(err, ConfigurationError::SampledCurve { .. }));
    }
}
