use nalgebra::{
    DMatrix,
    DVector
};
use serde::Deserialize;

use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};

// ─────────────────────────────────────────────
// Subpolynomial
// ─────────────────────────────────────────────

struct Subpolynomial {
    coefs: Vec<f64>,
    lhs_x: f64,
}

impl Subpolynomial {
    pub fn new(coefs: Vec<f64>, lhs_x: f64) -> Subpolynomial {
        Subpolynomial { coefs, lhs_x }
    }

    pub fn value(&self, x: f64) -> f64 {
        let x_diff = x - self.lhs_x;
        let mut result = self.coefs[0];
        for &beta in &self.coefs[1..] {
            result = f64::mul_add(result, x_diff, beta);
        }
        result
    }
}

fn generate_linear_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    (0..(points.len() - 1))
        .map(|i| vec![
            Point2D::slope(&points[i], &points[i + 1]),
            points[i].y(),
        ])
        .collect()
}

// ─────────────────────────────────────────────
// 共用輔助函數
// ─────────────────────────────────────────────

fn interval_widths(points: &[Point2D]) -> Vec<f64> {
    (0..(points.len() - 1))
        .map(|i| points[i + 1].x() - points[i].x())
        .collect()
}

/// 從各節點的二階導數（moments）m[0..=n] 計算各區間的三次多項式係數。
///
/// 每段多項式以 Horner 形式存成 [d, c, b, a]，對應：
///   S_i(x) = a + b*(x-x_i) + c*(x-x_i)^2 + d*(x-x_i)^3
fn cubic_coefs_from_moments(points: &[Point2D], h: &[f64], m: &[f64]) -> Vec<Vec<f64>> {
    (0..h.len())
        .map(|i| {
            let d = (m[i + 1] - m[i]) / (6.0 * h[i]);
            let c = m[i] / 2.0;
            let b = (points[i + 1].y() - points[i].y()) / h[i]
                  - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0;
            let a = points[i].y();
            vec![d, c, b, a]
        })
        .collect()
}

/// 從各節點的一階導數（Hermite slopes）t[0..=n] 計算各區間的三次多項式係數。
fn cubic_coefs_from_hermite(points: &[Point2D], h: &[f64], t: &[f64]) -> Vec<Vec<f64>> {
    (0..h.len())
        .map(|i| {
            let dy = points[i + 1].y() - points[i].y();
            let a = points[i].y();
            let b = t[i];
            let c = (3.0 * dy / h[i] - 2.0 * t[i] - t[i + 1]) / h[i];
            let d = (-2.0 * dy / h[i] + t[i] + t[i + 1]) / (h[i] * h[i]);
            vec![d, c, b, a]
        })
        .collect()
}

// ─────────────────────────────────────────────
// CubicSpline（Natural / NotAKnot）
// ─────────────────────────────────────────────
//
// 建立 (n+1)×(n+1) 的聯立方程組，求解各節點的二階導數 m[0..=n]，
// 內部方程式由 C² 連續性導出：
//   h[i-1]*m[i-1] + 2*(h[i-1]+h[i])*m[i] + h[i]*m[i+1]
//     = 6*( (y[i+1]-y[i])/h[i] - (y[i]-y[i-1])/h[i-1] )
// 第 0 列與第 n 列依邊界條件設定。

fn build_interior_system(points: &[Point2D], h: &[f64]) -> (DMatrix<f64>, DVector<f64>) {
    let n = h.len();
    let mut mat = DMatrix::<f64>::zeros(n + 1, n + 1);
    let mut rhs = DVector::<f64>::zeros(n + 1);

    for i in 1..n {
        mat[(i, i - 1)] = h[i - 1];
        mat[(i, i)]     = 2.0 * (h[i - 1] + h[i]);
        mat[(i, i + 1)] = h[i];
        rhs[i] = 6.0 * (
            (points[i + 1].y() - points[i].y()) / h[i]
          - (points[i].y()     - points[i - 1].y()) / h[i - 1]
        );
    }
    (mat, rhs)
}

fn solve_moments(mat: DMatrix<f64>, rhs: DVector<f64>) -> Option<Vec<f64>> {
    mat.lu()
        .solve(&rhs)
        .map(|m| m.iter().copied().collect())
}

/// Natural：端點的二階導數為 0（m[0] = m[n] = 0）
fn generate_natural_cubic_coef_list(points: &[Point2D]) -> Option<Vec<Vec<f64>>> {
    let n = points.len() - 1;
    let h = interval_widths(points);

    let (mut mat, rhs) = build_interior_system(points, &h);
    mat[(0, 0)] = 1.0;
    mat[(n, n)] = 1.0;

    let m = solve_moments(mat, rhs)?;
    Some(cubic_coefs_from_moments(points, &h, &m))
}

/// Not-a-knot：第三導數在 x[1] 與 x[n-1] 處連續。
///
///   在 x[1]：-h[1]*m[0] + (h[0]+h[1])*m[1] - h[0]*m[2] = 0
///   在 x[n-1]：-h[n-1]*m[n-2] + (h[n-2]+h[n-1])*m[n-1] - h[n-2]*m[n] = 0
///
/// 至少需要 4 個點（3 個區間）使兩條邊界方程線性獨立。
fn generate_not_a_knot_cubic_coef_list(points: &[Point2D]) -> Option<Vec<Vec<f64>>> {
    let n = points.len() - 1;
    let h = interval_widths(points);

    let (mut mat, rhs) = build_interior_system(points, &h);

    mat[(0, 0)] = -h[1];
    mat[(0, 1)] =  h[0] + h[1];
    mat[(0, 2)] = -h[0];

    mat[(n, n - 2)] = -h[n - 1];
    mat[(n, n - 1)] =  h[n - 2] + h[n - 1];
    mat[(n, n)]     = -h[n - 2];

    let m = solve_moments(mat, rhs)?;
    Some(cubic_coefs_from_moments(points, &h, &m))
}

// ─────────────────────────────────────────────
// PCHIP（Fritsch-Carlson，保單調性）
// ─────────────────────────────────────────────

fn pchip_end_slope(h0: f64, h1: f64, s0: f64, s1: f64) -> f64 {
    let raw = ((2.0 * h0 + h1) * s0 - h0 * s1) / (h0 + h1);
    if raw.signum() != s0.signum() {
        0.0
    } else if s0.signum() != s1.signum() && raw.abs() > 3.0 * s0.abs() {
        3.0 * s0
    } else {
        raw
    }
}

fn generate_pchip_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    let n = points.len() - 1;
    let h = interval_widths(points);
    let s: Vec<f64> = (0..n)
        .map(|i| (points[i + 1].y() - points[i].y()) / h[i])
        .collect();

    let mut t = vec![0.0_f64; n + 1];
    for i in 1..n {
        if s[i - 1] * s[i] > 0.0 {
            let w1 = 2.0 * h[i] + h[i - 1];
            let w2 = h[i] + 2.0 * h[i - 1];
            t[i] = (w1 + w2) / (w1 / s[i - 1] + w2 / s[i]);
        }
    }

    t[0] = pchip_end_slope(h[0], h[1], s[0], s[1]);
    t[n] = pchip_end_slope(h[n - 1], h[n - 2], s[n - 1], s[n - 2]);

    cubic_coefs_from_hermite(points, &h, &t)
}

// ─────────────────────────────────────────────
// PolynomialType
// ─────────────────────────────────────────────

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolynomialType {
    Linear,
    NaturalCubic,
    /// 與 SciPy `interp1d(kind="cubic")` 相同的邊界條件；需要至少 4 個點
    #[default]
    NotAKnotCubic,
    PiecewiseCubicHermite,
}

pub fn get_necessary_points(polynomial_type: PolynomialType) -> usize {
    match polynomial_type {
        PolynomialType::Linear                => 2,
        PolynomialType::NaturalCubic          => 3,
        PolynomialType::NotAKnotCubic         => 4,
        PolynomialType::PiecewiseCubicHermite => 3,
    }
}

// ─────────────────────────────────────────────
// PiecewisePolynomial
// ─────────────────────────────────────────────

/// 分段多項式插值。區間外以第一段／最後一段多項式外插。
pub struct PiecewisePolynomial {
    max_x: f64,
    polynomial_type: PolynomialType,
    subpolynomial_list: Vec<Subpolynomial>,
}

impl PiecewisePolynomial {
    /// `points` 必須已依 x 嚴格遞增排列；點數不足或方程組奇異時回傳 `None`。
    pub fn new(
        polynomial_type: PolynomialType,
        points: Vec<Point2D>,
    ) -> Option<PiecewisePolynomial> {
        if points.len() < get_necessary_points(polynomial_type) {
            return None;
        }

        let coef_list = match polynomial_type {
            PolynomialType::Linear                => generate_linear_coef_list(&points),
            PolynomialType::NaturalCubic          => generate_natural_cubic_coef_list(&points)?,
            PolynomialType::NotAKnotCubic         => generate_not_a_knot_cubic_coef_list(&points)?,
            PolynomialType::PiecewiseCubicHermite => generate_pchip_coef_list(&points),
        };

        let subpolynomial_list = coef_list
            .into_iter()
            .zip(points.iter())
            .map(|(coefs, pt)| Subpolynomial::new(coefs, pt.x()))
            .collect();

        Some(PiecewisePolynomial {
            subpolynomial_list,
            max_x: points.last()?.x(),
            polynomial_type,
        })
    }

    pub fn polynomial_type(&self) -> PolynomialType {
        self.polynomial_type
    }

    fn find_segment(&self, x: f64) -> usize {
        if x <= self.min_x() {
            0
        } else if x >= self.max_x {
            self.subpolynomial_list.len() - 1
        } else {
            // 第一個 lhs_x > x 的位置減一；x 為 NaN 時落在第 0 段
            self.subpolynomial_list
                .partition_point(|s| s.lhs_x <= x)
                .saturating_sub(1)
        }
    }
}

impl NonparametricCurve for PiecewisePolynomial {
    fn points(&self) -> Vec<Point2D> {
        let mut pts: Vec<Point2D> = self
            .subpolynomial_list
            .iter()
            .map(|s| Point2D::new(s.lhs_x, s.value(s.lhs_x)))
            .collect();
        if let Some(last) = self.subpolynomial_list.last() {
            pts.push(Point2D::new(self.max_x, last.value(self.max_x)));
        }
        pts
    }

    fn min_x(&self) -> f64 {
        self.subpolynomial_list[0].lhs_x
    }

    fn max_x(&self) -> f64 {
        self.max_x
    }
}

impl Curve for PiecewisePolynomial {
    fn value(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].value(x)
    }
}
