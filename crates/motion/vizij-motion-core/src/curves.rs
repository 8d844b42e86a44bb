//! Per-axis curve transforms and their named registry.
//!
//! Every transform is pure and returns a series of the same length as its
//! input. Boundary behaviour is part of the contract:
//! - `lowpass` averages over however many samples exist near the start,
//! - `gaussian` skips out-of-range taps without renormalizing,
//! - `derivative` writes `0` within `order` samples of either end,
//! - the caps never rewrite the first sample.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

const DEFAULT_WINDOW: usize = 5;
const DEFAULT_ORDER: usize = 1;

/// Options shared by all registered transforms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveOptions {
    #[serde(default)]
    pub threshold: Option<f64>,
}

impl CurveOptions {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: Some(threshold),
        }
    }

    fn window(&self) -> usize {
        self.threshold
            .filter(|t| t.is_finite())
            .map(|t| t.round().max(1.0) as usize)
            .unwrap_or(DEFAULT_WINDOW)
    }

    fn order(&self) -> usize {
        self.threshold
            .filter(|t| t.is_finite())
            .map(|t| t.round().max(0.0) as usize)
            .unwrap_or(DEFAULT_ORDER)
    }
}

/// Causal moving average over up to `window` samples ending at each index.
pub fn lowpass(samples: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..samples.len())
        .map(|i| {
            let lo = (i + 1).saturating_sub(window);
            let span = &samples[lo..=i];
            span.iter().sum::<f64>() / span.len() as f64
        })
        .collect()
}

/// `sample - lowpass(sample)`.
pub fn highpass(samples: &[f64], window: usize) -> Vec<f64> {
    lowpass(samples, window)
        .iter()
        .zip(samples)
        .map(|(low, s)| s - low)
        .collect()
}

fn gaussian_kernel(window: usize) -> Vec<f64> {
    let window = window.max(1);
    let half = (window / 2) as isize;
    let sigma = window as f64 / 2.0;
    let mut kernel: Vec<f64> = (-half..=half)
        .map(|j| (-((j * j) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f64 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= total;
    }
    kernel
}

/// Symmetric Gaussian smoothing. Taps falling outside the series are dropped.
pub fn gaussian(samples: &[f64], window: usize) -> Vec<f64> {
    let kernel = gaussian_kernel(window);
    let half = (kernel.len() / 2) as isize;
    let n = samples.len() as isize;
    (0..n)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(k, w)| {
                    let idx = i + k as isize - half;
                    (0..n).contains(&idx).then(|| w * samples[idx as usize])
                })
                .sum()
        })
        .collect()
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Central finite-difference coefficients for the `order`-th difference on a
/// stride-2 stencil, indexed by offset `-order..=order`.
fn derivative_coefficients(order: usize) -> Vec<f64> {
    let mut coeffs = vec![0.0; 2 * order + 1];
    let scale = 2f64.powi(order as i32);
    for k in 0..=order {
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        // offset = order - 2k, stored at index offset + order
        coeffs[2 * order - 2 * k] = sign * binomial(order, k) / scale;
    }
    coeffs
}

/// Centered finite difference of the given order. Indices closer than `order`
/// to either boundary cannot be computed and are written as `0`.
pub fn derivative(samples: &[f64], order: usize) -> Vec<f64> {
    let n = samples.len();
    let coeffs = derivative_coefficients(order);
    let mut out = vec![0.0; n];
    if n < 2 * order + 1 {
        return out;
    }
    for (i, slot) in out.iter_mut().enumerate().take(n - order).skip(order) {
        *slot = coeffs
            .iter()
            .enumerate()
            .map(|(k, c)| c * samples[i + k - order])
            .sum();
    }
    out
}

/// Hold samples below `threshold` at the last sample that was not below it.
pub fn cap_min(samples: &[f64], threshold: f64) -> Vec<f64> {
    hold(samples, |s| s < threshold)
}

/// Hold samples above `threshold` at the last sample that was not above it.
pub fn cap_max(samples: &[f64], threshold: f64) -> Vec<f64> {
    hold(samples, |s| s > threshold)
}

fn hold(samples: &[f64], rejected: impl Fn(f64) -> bool) -> Vec<f64> {
    let Some(&first) = samples.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(samples.len());
    out.push(first);
    let mut prev = first;
    for &s in &samples[1..] {
        if rejected(s) {
            out.push(prev);
        } else {
            prev = s;
            out.push(s);
        }
    }
    out
}

/// Registry signature: one axis series in, one axis series out.
pub type CurveFn = fn(&[f64], &CurveOptions) -> Vec<f64>;

fn lowpass_entry(s: &[f64], o: &CurveOptions) -> Vec<f64> {
    lowpass(s, o.window())
}

fn highpass_entry(s: &[f64], o: &CurveOptions) -> Vec<f64> {
    highpass(s, o.window())
}

fn gaussian_entry(s: &[f64], o: &CurveOptions) -> Vec<f64> {
    gaussian(s, o.window())
}

fn derivative_entry(s: &[f64], o: &CurveOptions) -> Vec<f64> {
    derivative(s, o.order())
}

fn cap_min_entry(s: &[f64], o: &CurveOptions) -> Vec<f64> {
    match o.threshold {
        Some(t) => cap_min(s, t),
        None => s.to_vec(),
    }
}

fn cap_max_entry(s: &[f64], o: &CurveOptions) -> Vec<f64> {
    match o.threshold {
        Some(t) => cap_max(s, t),
        None => s.to_vec(),
    }
}

/// Named transforms selectable from configuration (`curve.equation`).
#[derive(Clone)]
pub struct CurveRegistry {
    entries: HashMap<String, CurveFn>,
}

impl std::fmt::Debug for CurveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl Default for CurveRegistry {
    fn default() -> Self {
        let mut reg = Self {
            entries: HashMap::new(),
        };
        reg.register("lowpass", lowpass_entry);
        reg.register("highpass", highpass_entry);
        reg.register("gaussian", gaussian_entry);
        reg.register("derivative", derivative_entry);
        reg.register("capMin", cap_min_entry);
        reg.register("capMax", cap_max_entry);
        reg
    }
}

impl CurveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named transform.
    pub fn register(&mut self, name: &str, f: CurveFn) {
        self.entries.insert(name.to_string(), f);
    }

    pub fn get(&self, name: &str) -> Option<CurveFn> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn apply(
        &self,
        name: &str,
        samples: &[f64],
        options: &CurveOptions,
    ) -> Result<Vec<f64>, TransformError> {
        let f = self.get(name).ok_or_else(|| TransformError::UnknownCurve {
            name: name.to_string(),
        })?;
        Ok(f(samples, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_coefficients_first_and_second_order() {
        assert_eq!(derivative_coefficients(1), vec![-0.5, 0.0, 0.5]);
        assert_eq!(
            derivative_coefficients(2),
            vec![0.25, 0.0, -0.5, 0.0, 0.25]
        );
    }

    #[test]
    fn gaussian_kernel_sums_to_one() {
        let k = gaussian_kernel(5);
        assert_eq!(k.len(), 5);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(k[2] > k[1] && k[1] > k[0]);
    }

    #[test]
    fn registry_lists_builtins() {
        let reg = CurveRegistry::new();
        assert_eq!(
            reg.names(),
            vec!["capMax", "capMin", "derivative", "gaussian", "highpass", "lowpass"]
        );
    }
}
