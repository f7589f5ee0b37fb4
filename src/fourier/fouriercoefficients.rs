use std::f64::consts::PI;

use serde::Serialize;

/// Fourier 係數：a0 與 N 組 (A_i, B_i)，`a[i - 1]`、`b[i - 1]` 對應第 i 個諧波。
///
/// 序列化後只輸出 `{"a0", "A", "B"}`；`half_period` 僅供 [`partial_sum`](Self::partial_sum) 使用。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FourierCoefficients {
    a0: f64,
    #[serde(rename = "A")]
    a: Vec<f64>,
    #[serde(rename = "B")]
    b: Vec<f64>,
    #[serde(skip)]
    half_period: f64
}

impl FourierCoefficients {
    /// `a` 與 `b` 長度必須相同。
    pub fn new(a0: f64, a: Vec<f64>, b: Vec<f64>, half_period: f64) -> FourierCoefficients {
        debug_assert_eq!(a.len(), b.len());
        FourierCoefficients { a0, a, b, half_period }
    }

    pub fn a0(&self) -> f64 {
        self.a0
    }

    pub fn cosine_terms(&self) -> &[f64] {
        &self.a
    }

    pub fn sine_terms(&self) -> &[f64] {
        &self.b
    }

    pub fn harmonics(&self) -> usize {
        self.a.len()
    }

    pub fn half_period(&self) -> f64 {
        self.half_period
    }

    /// 截斷級數 S_N(x) = a0/2 + Σ_{i=1}^{N} [A_i·cos(iπx/L) + B_i·sin(iπx/L)]。
    ///
    /// a0 = (1/L)∫f，故常數項取 a0/2，而非直接加上 a0；
    /// 後者會把平均值算成兩倍。
    pub fn partial_sum(&self, x: f64) -> f64 {
        let omega = PI * x / self.half_period;
        self.a
            .iter()
            .zip(self.b.iter())
            .enumerate()
            .fold(0.5 * self.a0, |acc, (k, (a_i, b_i))| {
                let angle = (k + 1) as f64 * omega;
                acc + a_i * angle.cos() + b_i * angle.sin()
            })
    }
}
