use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
    Read
};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};
use crate::math::curve::nonparametriccurve::piecewisepolynomial::{
    get_necessary_points,
    PiecewisePolynomial,
    PolynomialType
};

#[derive(Error, Debug)]
pub enum SampledCurveError {
    #[error("failed to read samples: {0}")]
    Io(#[from] std::io::Error),

    #[error("sample header has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("line {line}: cannot parse '{value}' as a number")]
    Parse { line: usize, value: String },

    #[error("line {line}: sample '{value}' is not finite")]
    NonFiniteSample { line: usize, value: String },

    #[error("sample ({x}, {y}) is not finite")]
    NonFinitePoint { x: f64, y: f64 },

    #[error("line {line}: expected at least {expected} fields")]
    ShortRow { line: usize, expected: usize },

    #[error("{interpolation:?} interpolation needs at least {required} samples, got {found}")]
    InsufficientPoints { interpolation: PolynomialType, required: usize, found: usize },

    #[error("duplicate sample abscissa x = {0}")]
    DuplicateAbscissa(f64),

    #[error("interpolation system is singular")]
    SingularSystem,
}

/// 以 CSV 取樣點（欄位 `x`, `y`）建立的插值曲線。
///
/// 欄位以逗號分隔，可用雙引號包住單一欄位（`"1.0"`）；欄位內不支援逗號或跳脫的引號。
/// 取樣範圍外依插值多項式外插；`min_x()`／`max_x()` 為取樣範圍。
pub struct SampledCurve {
    interpolant: PiecewisePolynomial
}

impl SampledCurve {
    pub fn from_points(
        polynomial_type: PolynomialType,
        mut points: Vec<Point2D>
    ) -> Result<SampledCurve, SampledCurveError> {
        let required = get_necessary_points(polynomial_type);
        if points.len() < required {
            return Err(SampledCurveError::InsufficientPoints {
                interpolation: polynomial_type,
                required,
                found: points.len()
            });
        }

        if let Some(point) = points.iter().find(|p| !(p.x().is_finite() && p.y().is_finite())) {
            return Err(SampledCurveError::NonFinitePoint { x: point.x(), y: point.y() });
        }

        points.sort_by(|a, b| a.x().total_cmp(&b.x()));
        if let Some(pair) = points.windows(2).find(|pair| pair[0].x() == pair[1].x()) {
            return Err(SampledCurveError::DuplicateAbscissa(pair[0].x()));
        }

        let interpolant = PiecewisePolynomial::new(polynomial_type, points)
            .ok_or(SampledCurveError::SingularSystem)?;
        Ok(SampledCurve { interpolant })
    }

    pub fn from_reader<R: Read>(
        reader: R,
        polynomial_type: PolynomialType
    ) -> Result<SampledCurve, SampledCurveError> {
        let points = read_points(BufReader::new(reader))?;
        debug!(samples = points.len(), ?polynomial_type, "building sampled curve");
        SampledCurve::from_points(polynomial_type, points)
    }

    pub fn from_file<P: AsRef<Path>>(
        file_path: P,
        polynomial_type: PolynomialType
    ) -> Result<SampledCurve, SampledCurveError> {
        let file = File::open(file_path)?;
        SampledCurve::from_reader(file, polynomial_type)
    }

    pub fn polynomial_type(&self) -> PolynomialType {
        self.interpolant.polynomial_type()
    }
}

impl NonparametricCurve for SampledCurve {
    fn points(&self) -> Vec<Point2D> {
        self.interpolant.points()
    }

    fn min_x(&self) -> f64 {
        self.interpolant.min_x()
    }

    fn max_x(&self) -> f64 {
        self.interpolant.max_x()
    }
}

impl Curve for SampledCurve {
    fn value(&self, x: f64) -> f64 {
        self.interpolant.value(x)
    }
}

fn read_points<B: BufRead>(reader: B) -> Result<Vec<Point2D>, SampledCurveError> {
    let mut lines = reader.lines().enumerate();

    let (x_col, y_col) = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let header = split_fields(&line);
                let x_col = header.iter().position(|&h| h == "x")
                    .ok_or(SampledCurveError::MissingColumn("x"))?;
                let y_col = header.iter().position(|&h| h == "y")
                    .ok_or(SampledCurveError::MissingColumn("y"))?;
                break (x_col, y_col);
            },
            None => return Err(SampledCurveError::MissingColumn("x"))
        }
    };

    let mut points = Vec::new();
    for (index, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        let fields = split_fields(&line);
        let x = parse_field(&fields, x_col, line_number)?;
        let y = parse_field(&fields, y_col, line_number)?;
        points.push(Point2D::new(x, y));
    }
    Ok(points)
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',')
        .map(|field| {
            let field = field.trim();
            field
                .strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .map_or(field, str::trim)
        })
        .collect()
}

fn parse_field(fields: &[&str], col: usize, line: usize) -> Result<f64, SampledCurveError> {
    let raw = fields.get(col).ok_or(SampledCurveError::ShortRow { line, expected: col + 1 })?;
    let value = raw.parse::<f64>().map_err(|_| SampledCurveError::Parse { line, value: raw.to_string() })?;
    if !value.is_finite() {
        return Err(SampledCurveError::NonFiniteSample { line, value: raw.to_string() });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_columns_by_header_name() {
        let csv = "label,y,x\na,1.0,0.0\nb,3.0,1.0\n\nc,5.0,2.0\n";
        let curve = SampledCurve::from_reader(csv.as_bytes(), PolynomialType::Linear).unwrap();
        assert_eq!(curve.min_x(), 0.0);
        assert_eq!(curve.max_x(), 2.0);
        assert!((curve.value(1.5) - 4.0).abs() < 1e-15);
        // 外插
        assert!((curve.value(3.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn unsorted_samples_are_sorted() {
        let csv = "x,y\n3,9\n0,0\n2,4\n1,1\n";
        let curve = SampledCurve::from_reader(csv.as_bytes(), PolynomialType::NotAKnotCubic).unwrap();
        // 四點的 not-a-knot 即為通過四點的三次多項式，此處恰為 x²
        assert!((curve.value(1.5) - 2.25).abs() < 1e-12);
        assert_eq!(curve.points().len(), 4);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = SampledCurve::from_reader("a,y\n1,2\n".as_bytes(), PolynomialType::Linear)
            .err()
            .unwrap();
        assert!(matches!(err, SampledCurveError::MissingColumn("x")));
    }

    #[test]
    fn bad_number_reports_line() {
        let err = SampledCurve::from_reader("x,y\n0,1\n1,oops\n".as_bytes(), PolynomialType::Linear)
            .err()
            .unwrap();
        match err {
            SampledCurveError::Parse { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "oops");
            },
            other => panic!("unexpected error: {}", other)
        }
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        for raw in ["nan", "inf", "-inf"] {
            let csv = format!("x,y\n-1,0\n-0.5,0.8\n0,1\n0.5,{}\n1,0\n", raw);
            let err = SampledCurve::from_reader(csv.as_bytes(), PolynomialType::NotAKnotCubic)
                .err()
                .unwrap();
            match err {
                SampledCurveError::NonFiniteSample { line, value } => {
                    assert_eq!(line, 5);
                    assert_eq!(value, raw);
                },
                other => panic!("unexpected error: {}", other)
            }
        }

        let points = vec![Point2D::new(0.0, 1.0), Point2D::new(f64::INFINITY, 2.0)];
        let err = SampledCurve::from_points(PolynomialType::Linear, points).err().unwrap();
        assert!(matches!(err, SampledCurveError::NonFinitePoint { .. }));
    }

    #[test]
    fn quoted_fields_are_unwrapped() {
        let csv = "\"x\",\"y\"\n\"0.0\",\"1.0\"\n\" 1.0 \",3.0\n";
        let curve = SampledCurve::from_reader(csv.as_bytes(), PolynomialType::Linear).unwrap();
        assert_eq!(curve.max_x(), 1.0);
        assert!((curve.value(0.5) - 2.0).abs() < 1e-15);
    }

    #[test]
    fn duplicate_and_insufficient_samples_are_rejected() {
        let err = SampledCurve::from_reader("x,y\n0,1\n0,2\n1,3\n".as_bytes(), PolynomialType::Linear)
            .err()
            .unwrap();
        assert!(matches!(err, SampledCurveError::DuplicateAbscissa(_)));

        let err = SampledCurve::from_reader("x,y\n0,1\n1,2\n".as_bytes(), PolynomialType::NotAKnotCubic)
            .err()
            .unwrap();
        assert!(matches!(err, SampledCurveError::InsufficientPoints { required: 4, found: 2, .. }));
    }
}
