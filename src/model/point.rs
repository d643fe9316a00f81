use approx::{relative_eq, AbsDiffEq, RelativeEq};
use auto_ops::impl_op_ex;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Tolerance used for all geometric comparisons in the crate, in micrometres.
pub const EP: f64 = 1e-6;

pub fn eq(a: f64, b: f64) -> bool {
    relative_eq!(a, b, epsilon = EP)
}

pub fn ge(a: f64, b: f64) -> bool {
    eq(a, b) || a > b
}

pub fn le(a: f64, b: f64) -> bool {
    eq(a, b) || a < b
}

/// A point in the plane, in micrometres.
#[derive(Debug, Default, PartialEq, Copy, Clone, Display, Serialize, Deserialize)]
#[display(fmt = "({}, {})", x, y)]
pub struct Pt {
    pub x: f64,
    pub y: f64,
}

impl Pt {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl AbsDiffEq for Pt {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        EP
    }

    fn abs_diff_eq(&self, o: &Self, epsilon: f64) -> bool {
        f64::abs_diff_eq(&self.x, &o.x, epsilon) && f64::abs_diff_eq(&self.y, &o.y, epsilon)
    }
}

impl RelativeEq for Pt {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, o: &Self, epsilon: f64, max_relative: f64) -> bool {
        f64::relative_eq(&self.x, &o.x, epsilon, max_relative)
            && f64::relative_eq(&self.y, &o.y, epsilon, max_relative)
    }
}

impl_op_ex!(+ |a: &Pt, b: &Pt| -> Pt { Pt::new(a.x + b.x, a.y + b.y) });
impl_op_ex!(-|a: &Pt, b: &Pt| -> Pt { Pt::new(a.x - b.x, a.y - b.y) });

pub const fn pt(x: f64, y: f64) -> Pt {
    Pt::new(x, y)
}
