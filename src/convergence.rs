//! Empirical convergence rates from sequences of (mesh size, error) samples.
//!
//! If the error behaves like $E \approx C h^r$, then two samples $(h_1, E_1)$ and $(h_2, E_2)$
//! give the estimate $r = \ln(E_2 / E_1) / \ln(h_2 / h_1)$.
use crate::error::NormKind;
use eyre::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// The empirical rate between two consecutive samples.
///
/// No checks are performed: a zero error produces an infinite or NaN rate, and equal mesh sizes
/// produce a division by zero.
pub fn convergence_rate(h_prev: f64, error_prev: f64, h: f64, error: f64) -> f64 {
    (error / error_prev).ln() / (h / h_prev).ln()
}

/// Computes the empirical rate between every pair of consecutive samples.
///
/// The returned sequence has one element less than the input, and is empty if fewer than two
/// samples are given. Mesh sizes must be finite, positive and strictly decreasing, and errors
/// must be non-negative. Zero errors are accepted and give infinite or NaN rates.
pub fn convergence_rates(mesh_sizes: &[f64], errors: &[f64]) -> eyre::Result<Vec<f64>> {
    if mesh_sizes.len() != errors.len() {
        bail!(
            "got {} mesh sizes but {} errors",
            mesh_sizes.len(),
            errors.len()
        );
    }
    if let Some((i, h)) = mesh_sizes
        .iter()
        .enumerate()
        .find(|(_, h)| !(h.is_finite() && **h > 0.0))
    {
        bail!("mesh size {} at index {} is not a finite positive number", h, i);
    }
    if let Some((i, e)) = errors.iter().enumerate().find(|(_, e)| e.is_nan() || **e < 0.0) {
        bail!("error {} at index {} is negative or NaN", e, i);
    }
    if let Some(i) = (1..mesh_sizes.len()).find(|&i| mesh_sizes[i] >= mesh_sizes[i - 1]) {
        bail!(
            "mesh sizes must be strictly decreasing, but h[{}] = {} >= h[{}] = {}",
            i,
            mesh_sizes[i],
            i - 1,
            mesh_sizes[i - 1]
        );
    }

    let rates = mesh_sizes
        .windows(2)
        .zip(errors.windows(2))
        .map(|(h, e)| convergence_rate(h[0], e[0], h[1], e[1]))
        .collect();
    Ok(rates)
}

/// The error of a single discretization level.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSample {
    pub mesh_size: f64,
    pub error: f64,
}

/// A sequence of error samples for one norm, ordered from coarse to fine.
///
/// Its [`Display`] implementation prints one line per sample with the rate relative to the
/// previous sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceStudy {
    pub label: String,
    pub norm: NormKind,
    pub samples: Vec<ErrorSample>,
}

impl ConvergenceStudy {
    pub fn new(label: impl Into<String>, norm: NormKind) -> Self {
        Self {
            label: label.into(),
            norm,
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, mesh_size: f64, error: f64) {
        self.samples.push(ErrorSample { mesh_size, error });
    }

    pub fn mesh_sizes(&self) -> Vec<f64> {
        self.samples.iter().map(|sample| sample.mesh_size).collect()
    }

    pub fn errors(&self) -> Vec<f64> {
        self.samples.iter().map(|sample| sample.error).collect()
    }

    pub fn rates(&self) -> eyre::Result<Vec<f64>> {
        convergence_rates(&self.mesh_sizes(), &self.errors())
    }
}

impl Display for ConvergenceStudy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} error)", self.label, self.norm)?;
        for (i, sample) in self.samples.iter().enumerate() {
            write!(
                f,
                "h: {} Error: {} Rate:",
                Scientific(sample.mesh_size),
                Scientific(sample.error)
            )?;
            if i > 0 {
                let prev = &self.samples[i - 1];
                let rate = convergence_rate(prev.mesh_size, prev.error, sample.mesh_size, sample.error);
                write!(f, " {:.2}", rate)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Formats a number with two decimals and a signed exponent of at least two digits, such as
/// `2.50e-01`.
struct Scientific(f64);

impl Display for Scientific {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let formatted = format!("{:.2e}", self.0);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                write!(f, "{}e{}{:0>2}", mantissa, sign, digits)
            }
            // inf and NaN have no exponent
            None => write!(f, "{}", formatted),
        }
    }
}
