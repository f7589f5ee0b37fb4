/// 一維實函數。
///
/// `Send + Sync` 為 supertrait，使 `Arc<dyn Curve>` 可交給 blocking worker 執行緒求值。
pub trait Curve: Send + Sync {
    fn value(&self, x: f64) -> f64;
}

/// 以 closure 包裝的曲線，方便測試或臨時替換目標函數。
pub struct FunctionCurve<F> {
    f: F
}

impl<F> FunctionCurve<F> where
    F: Fn(f64) -> f64 + Send + Sync {
    pub fn new(f: F) -> FunctionCurve<F> {
        FunctionCurve { f }
    }
}

impl<F> Curve for FunctionCurve<F> where
    F: Fn(f64) -> f64 + Send + Sync {
    fn value(&self, x: f64) -> f64 {
        (self.f)(x)
    }
}
