use serde::Deserialize;
use tracing::{
    trace,
    warn
};

use crate::math::quadrature::quadrature::{
    IntegrationError,
    IntegrationResult,
    Quadrature
};

// ─────────────────────────────────────────────────────────────────────────────
// Gauss–Kronrod 21 點規則（內嵌 10 點 Gauss）
// ─────────────────────────────────────────────────────────────────────────────
//
// XGK[1], XGK[3], ..., XGK[9] 同時是 10 點 Gauss 節點，權重為 WG；
// 其餘為 Kronrod 擴充節點。XGK[10] 為中心點。
//
// 誤差估計採 QUADPACK 的縮放：
//   err = resasc · min(1, (200·|K21 − G10| / resasc)^1.5)
//   並以 50·ε·resabs 為下限

const XGK: [f64; 11] = [
    0.995657163025808080735527280689003,
    0.973906528517171720077964012084452,
    0.930157491355708226001207180059508,
    0.865063366688984510732096688423493,
    0.780817726586416897063717578345042,
    0.679409568299024406234327365114874,
    0.562757134668604683339000099272694,
    0.433395394129247190799265943165784,
    0.294392862701460198131126603103866,
    0.148874338981631210884826001129720,
    0.000000000000000000000000000000000,
];

const WGK: [f64; 11] = [
    0.011694638867371874278064396062192,
    0.032558162307964727478818972459390,
    0.054755896574351996031381300244580,
    0.075039674810919952767043140916190,
    0.093125454583697605535065465083366,
    0.109387158802297641899210590325805,
    0.123491976262065851077600525733702,
    0.134709217311473325928054001771707,
    0.142775938577060080797094273138717,
    0.147739104901338491374841515972068,
    0.149445554002916905664936468389821,
];

const WG: [f64; 5] = [
    0.066671344308688137593568809893332,
    0.149451349150580593145776339657697,
    0.219086362515982043995534934228163,
    0.269266719309996355091226921569469,
    0.295524224714752870173892994651338,
];

struct Segment {
    lhs: f64,
    rhs: f64,
    value: f64,
    error: f64
}

fn evaluate(f: &dyn Fn(f64) -> f64, x: f64) -> Result<f64, IntegrationError> {
    let value = f(x);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(IntegrationError::NonFiniteIntegrand { x, value })
    }
}

fn gauss_kronrod_21(f: &dyn Fn(f64) -> f64, lhs: f64, rhs: f64) -> Result<Segment, IntegrationError> {
    let center = 0.5 * (lhs + rhs);
    let half_length = 0.5 * (rhs - lhs);

    let f_center = evaluate(f, center)?;
    let mut result_kronrod = WGK[10] * f_center;
    let mut result_gauss = 0.0;
    let mut result_abs = result_kronrod.abs();
    let mut f_lhs = [0.0; 10];
    let mut f_rhs = [0.0; 10];

    for j in 0..10 {
        let dx = half_length * XGK[j];
        let f1 = evaluate(f, center - dx)?;
        let f2 = evaluate(f, center + dx)?;
        f_lhs[j] = f1;
        f_rhs[j] = f2;
        result_kronrod += WGK[j] * (f1 + f2);
        result_abs += WGK[j] * (f1.abs() + f2.abs());
        if j % 2 == 1 {
            result_gauss += WG[j / 2] * (f1 + f2);
        }
    }

    let mean = 0.5 * result_kronrod;
    let mut result_asc = WGK[10] * (f_center - mean).abs();
    for j in 0..10 {
        result_asc += WGK[j] * ((f_lhs[j] - mean).abs() + (f_rhs[j] - mean).abs());
    }

    let scale = half_length.abs();
    result_abs *= scale;
    result_asc *= scale;

    let mut error = ((result_kronrod - result_gauss) * half_length).abs();
    if result_asc != 0.0 && error != 0.0 {
        error = result_asc * (200.0 * error / result_asc).powf(1.5).min(1.0);
    }
    if result_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        error = error.max(50.0 * f64::EPSILON * result_abs);
    }

    Ok(Segment { lhs, rhs, value: result_kronrod * half_length, error })
}

// ─────────────────────────────────────────────────────────────────────────────
// AdaptiveGaussKronrod
// ─────────────────────────────────────────────────────────────────────────────

/// 全域自適應二分積分：每一步把估計誤差最大的區段一分為二，
/// 直到總誤差 ≤ max(absolute_tolerance, relative_tolerance·|I|) 或區段數達上限。
///
/// 預設值與 QUADPACK `qags` 相同（1.49e-8, 1.49e-8, 50）。
/// `strict = false` 時達上限只記錄 warning 並回傳目前最佳估計。
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdaptiveGaussKronrod {
    absolute_tolerance: f64,
    relative_tolerance: f64,
    max_subdivisions: usize,
    strict: bool
}

impl Default for AdaptiveGaussKronrod {
    fn default() -> Self {
        AdaptiveGaussKronrod {
            absolute_tolerance: 1.49e-8,
            relative_tolerance: 1.49e-8,
            max_subdivisions: 50,
            strict: false
        }
    }
}

impl AdaptiveGaussKronrod {
    pub fn new(
        absolute_tolerance: f64,
        relative_tolerance: f64,
        max_subdivisions: usize,
        strict: bool
    ) -> AdaptiveGaussKronrod {
        AdaptiveGaussKronrod { absolute_tolerance, relative_tolerance, max_subdivisions, strict }
    }

    pub fn absolute_tolerance(&self) -> f64 {
        self.absolute_tolerance
    }

    pub fn relative_tolerance(&self) -> f64 {
        self.relative_tolerance
    }

    pub fn max_subdivisions(&self) -> usize {
        self.max_subdivisions
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    fn integrate_ordered(
        &self,
        f: &dyn Fn(f64) -> f64,
        a: f64,
        b: f64,
        break_points: &[f64]
    ) -> Result<IntegrationResult, IntegrationError> {
        let mut nodes: Vec<f64> = break_points
            .iter()
            .copied()
            .filter(|x| x.is_finite() && *x > a && *x < b)
            .collect();
        nodes.sort_by(|lhs, rhs| lhs.total_cmp(rhs));
        nodes.dedup();
        nodes.insert(0, a);
        nodes.push(b);

        let mut segments = nodes
            .windows(2)
            .map(|pair| gauss_kronrod_21(f, pair[0], pair[1]))
            .collect::<Result<Vec<Segment>, IntegrationError>>()?;

        loop {
            let total: f64 = segments.iter().map(|s| s.value).sum();
            let error: f64 = segments.iter().map(|s| s.error).sum();
            let tolerance = self.absolute_tolerance.max(self.relative_tolerance * total.abs());

            if error <= tolerance {
                trace!(subdivisions = segments.len(), error, "quadrature converged");
                return Ok(IntegrationResult::new(total, error, segments.len(), true));
            }

            let worst = if segments.len() < self.max_subdivisions {
                segments
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| {
                        let mid = 0.5 * (s.lhs + s.rhs);
                        mid > s.lhs && mid < s.rhs
                    })
                    .max_by(|(_, lhs), (_, rhs)| lhs.error.total_cmp(&rhs.error))
                    .map(|(i, _)| i)
            } else {
                None
            };

            match worst {
                Some(i) => {
                    let segment = segments.swap_remove(i);
                    let mid = 0.5 * (segment.lhs + segment.rhs);
                    segments.push(gauss_kronrod_21(f, segment.lhs, mid)?);
                    segments.push(gauss_kronrod_21(f, mid, segment.rhs)?);
                },
                None => {
                    if self.strict {
                        return Err(IntegrationError::NotConverged {
                            subdivisions: segments.len(),
                            abs_error: error
                        });
                    }
                    warn!(
                        lower = a,
                        upper = b,
                        subdivisions = segments.len(),
                        abs_error = error,
                        "quadrature stopped before reaching the requested tolerance"
                    );
                    return Ok(IntegrationResult::new(total, error, segments.len(), false));
                }
            }
        }
    }
}

impl Quadrature for AdaptiveGaussKronrod {
    fn integrate(
        &self,
        f: &dyn Fn(f64) -> f64,
        a: f64,
        b: f64,
        break_points: &[f64]
    ) -> Result<IntegrationResult, IntegrationError> {
        if !a.is_finite() || !b.is_finite() {
            return Err(IntegrationError::InvalidInterval { lower: a, upper: b });
        }
        // 符號慣例：∫_a^b = -∫_b^a
        if a == b {
            Ok(IntegrationResult::new(0.0, 0.0, 0, true))
        } else if a > b {
            self.integrate_ordered(f, b, a, break_points).map(IntegrationResult::negate)
        } else {
            self.integrate_ordered(f, a, b, break_points)
        }
    }
}
