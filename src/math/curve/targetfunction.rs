use std::sync::Arc;

use crate::math::curve::curve::Curve;

// ─────────────────────────────────────────────────────────────────────────────
// 封閉形式的目標函數
// ─────────────────────────────────────────────────────────────────────────────

/// 半圓：f(x) = √(r² − x²)，|x| ≤ r；其餘為 0。
///
/// 在 ±r 處一階導數不連續（√ 型奇異），積分時應把 ±r 當作 break point。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Semicircle {
    radius: f64
}

impl Semicircle {
    pub fn new(radius: f64) -> Semicircle {
        Semicircle { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Default for Semicircle {
    fn default() -> Self {
        Semicircle::new(1.0)
    }
}

impl Curve for Semicircle {
    fn value(&self, x: f64) -> f64 {
        if x > self.radius || x < -self.radius {
            return 0.0;
        }
        // max(0) 吸收 r² − x² 在邊界上的捨入負值
        (self.radius * self.radius - x * x).max(0.0).sqrt()
    }
}

/// 單側平方根：f(x) = √x，x ≥ 0；負半軸為 0。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OneSidedSquareRoot;

impl Curve for OneSidedSquareRoot {
    fn value(&self, x: f64) -> f64 {
        if x < 0.0 {
            0.0
        } else {
            x.sqrt()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TargetFunction
// ─────────────────────────────────────────────────────────────────────────────

/// 曲線加上兩個邊界（關注區間）。
///
/// 邊界本身不改變函數值，除非以 [`TargetFunction::truncated`] 建構；
/// 它們主要作為積分的 break point，讓 quadrature 不會跨過支撐區間的端點。
#[derive(Clone)]
pub struct TargetFunction {
    curve: Arc<dyn Curve>,
    lower_bound: f64,
    upper_bound: f64,
    truncate: bool
}

impl TargetFunction {
    pub fn new(curve: Arc<dyn Curve>, lower_bound: f64, upper_bound: f64) -> TargetFunction {
        let (lower_bound, upper_bound) = ordered(lower_bound, upper_bound);
        TargetFunction { curve, lower_bound, upper_bound, truncate: false }
    }

    /// 區間外強制為 0。
    pub fn truncated(curve: Arc<dyn Curve>, lower_bound: f64, upper_bound: f64) -> TargetFunction {
        let (lower_bound, upper_bound) = ordered(lower_bound, upper_bound);
        TargetFunction { curve, lower_bound, upper_bound, truncate: true }
    }

    pub fn semicircle(radius: f64) -> TargetFunction {
        TargetFunction::new(Arc::new(Semicircle::new(radius)), -radius, radius)
    }

    pub fn one_sided_square_root() -> TargetFunction {
        TargetFunction::new(Arc::new(OneSidedSquareRoot), 0.0, f64::INFINITY)
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn is_truncated(&self) -> bool {
        self.truncate
    }

    /// 落在開區間 (a, b) 內、且為有限值的邊界，由小到大。
    pub fn break_points(&self, a: f64, b: f64) -> Vec<f64> {
        let (a, b) = ordered(a, b);
        [self.lower_bound, self.upper_bound]
            .into_iter()
            .filter(|x| x.is_finite() && *x > a && *x < b)
            .collect()
    }
}

impl Curve for TargetFunction {
    fn value(&self, x: f64) -> f64 {
        if self.truncate && (x < self.lower_bound || x > self.upper_bound) {
            0.0
        } else {
            self.curve.value(x)
        }
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}
