//! Piecewise-linear lookup tables, keyed by diffusion area, used for the
//! `diffPAR`/`diffPSR`/`diffCAR`/`diffCSR` thresholds and for
//! `areaDiffReduce`.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pwl(Vec<(f64, f64)>);

impl Pwl {
    /// Builds a table from `(index, ratio)` pairs, sorting by index.
    pub fn new(mut points: Vec<(f64, f64)>) -> Self {
        points.sort_by_key(|&(x, _)| OrderedFloat(x));
        Self(points)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.0
    }

    /// Linear interpolation between bracketing points, linear extrapolation
    /// using the nearest segment's slope outside the table's range. A
    /// single-point table is constant. An empty table returns `default`.
    pub fn eval(&self, x: f64, default: f64) -> f64 {
        match self.0.len() {
            0 => default,
            1 => self.0[0].1,
            _ => {
                let (x0, y0) = self.0[0];
                if x <= x0 {
                    let (x1, y1) = self.0[1];
                    return lerp(x0, y0, x1, y1, x);
                }
                let last = self.0.len() - 1;
                let (xn, yn) = self.0[last];
                if x >= xn {
                    let (xp, yp) = self.0[last - 1];
                    return lerp(xp, yp, xn, yn, x);
                }
                let idx = match self
                    .0
                    .binary_search_by(|&(px, _)| px.partial_cmp(&x).unwrap())
                {
                    Ok(i) => return self.0[i].1,
                    Err(i) => i,
                };
                let (x0, y0) = self.0[idx - 1];
                let (x1, y1) = self.0[idx];
                lerp(x0, y0, x1, y1, x)
            }
        }
    }
}

fn lerp(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    if (x1 - x0).abs() < f64::EPSILON {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
