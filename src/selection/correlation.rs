//! Pairwise Pearson correlation matrix

use super::aligner::AlignedSeries;
use super::error::SelectionError;
use crate::types::Symbol;
use tracing::debug;

/// Calculate Pearson correlation coefficient between two series
///
/// Returns a value in [-1.0, 1.0], or NaN when the correlation is undefined
/// (length mismatch, fewer than two points, or a zero-variance series).
///
/// # Mathematical Definition
/// r = Σ[(xi - x̄)(yi - ȳ)] / √[Σ(xi - x̄)² × Σ(yi - ȳ)²]
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return f64::NAN;
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }

    let correlation = covariance / (var_a.sqrt() * var_b.sqrt());

    if correlation.is_finite() {
        // Rounding can push |r| a hair past 1
        correlation.clamp(-1.0, 1.0)
    } else {
        f64::NAN
    }
}

/// Square correlation matrix over a fixed symbol ordering.
///
/// Symmetric with an exact unit diagonal. Undefined entries are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    symbols: Vec<Symbol>,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Build a matrix from explicit rows.
    ///
    /// # Errors
    /// `InvalidMatrix` if the rows are not square over `symbols`, the
    /// diagonal is not 1, or the matrix is not symmetric.
    pub fn new(symbols: Vec<Symbol>, rows: Vec<Vec<f64>>) -> Result<Self, SelectionError> {
        let n = symbols.len();
        if rows.len() != n || rows.iter().any(|row| row.len() != n) {
            return Err(SelectionError::InvalidMatrix(format!(
                "expected a {}x{} matrix",
                n, n
            )));
        }

        let values: Vec<f64> = rows.into_iter().flatten().collect();
        let matrix = Self { symbols, values };

        for i in 0..n {
            if matrix.get(i, i) != 1.0 {
                return Err(SelectionError::InvalidMatrix(format!(
                    "diagonal entry {} is {}, expected 1",
                    i,
                    matrix.get(i, i)
                )));
            }
            for j in (i + 1)..n {
                let (upper, lower) = (matrix.get(i, j), matrix.get(j, i));
                let both_nan = upper.is_nan() && lower.is_nan();
                if !both_nan && upper != lower {
                    return Err(SelectionError::InvalidMatrix(format!(
                        "entries ({}, {}) and ({}, {}) differ",
                        i, j, j, i
                    )));
                }
            }
        }

        Ok(matrix)
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Row/column ordering
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size() + col]
    }

    /// Correlation between two symbols, if both are in the matrix
    pub fn correlation(&self, a: &Symbol, b: &Symbol) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.get(i, j))
    }

    /// Strict upper triangle as `(row, col, value)`, row-major.
    pub fn upper_triangle(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.size();
        (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (i, j, self.get(i, j))))
    }
}

/// Builds a [`CorrelationMatrix`] from aligned series
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationMatrixBuilder;

impl CorrelationMatrixBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Each unordered pair is computed once and mirrored.
    ///
    /// # Errors
    /// `InsufficientSymbols` if fewer than two series are present.
    pub fn build(&self, aligned: &AlignedSeries) -> Result<CorrelationMatrix, SelectionError> {
        let n = aligned.len();
        if n < 2 {
            return Err(SelectionError::InsufficientSymbols { found: n });
        }

        let (symbols, series): (Vec<Symbol>, Vec<&[f64]>) =
            aligned.iter().map(|(s, v)| (s.clone(), v)).unzip();

        let mut values = vec![0.0; n * n];
        let mut undefined = 0usize;

        for i in 0..n {
            values[i * n + i] = 1.0;
            for j in (i + 1)..n {
                let r = pearson_correlation(series[i], series[j]);
                if r.is_nan() {
                    undefined += 1;
                }
                values[i * n + j] = r;
                values[j * n + i] = r;
            }
        }

        debug!(
            symbols = n,
            points = aligned.points(),
            undefined,
            "Correlation matrix built"
        );

        Ok(CorrelationMatrix { symbols, values })
    }
}
