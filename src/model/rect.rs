use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::model::point::{ge, le, pt, Pt, EP};

/// An axis-aligned rectilinear box, in micrometres. Covers `[l, r] x [b, t]`.
/// Empty rectangles have `r < l` or `t < b`.
#[derive(Debug, Copy, Clone, Display, Serialize, Deserialize)]
#[display(fmt = "({}, {}, {}, {})", l, b, r, t)]
pub struct Rt {
    l: f64,
    b: f64,
    r: f64,
    t: f64,
}

impl Default for Rt {
    fn default() -> Self {
        Self::empty()
    }
}

impl Rt {
    pub const fn new(l: f64, b: f64, r: f64, t: f64) -> Self {
        Self { l, b, r, t }
    }

    pub const fn empty() -> Self {
        Self::new(0.0, 0.0, -1.0, -1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.r < self.l - EP || self.t < self.b - EP
    }

    pub fn w(&self) -> f64 {
        (self.r - self.l).max(0.0)
    }

    pub fn h(&self) -> f64 {
        (self.t - self.b).max(0.0)
    }

    pub const fn l(&self) -> f64 {
        self.l
    }

    pub const fn b(&self) -> f64 {
        self.b
    }

    pub const fn r(&self) -> f64 {
        self.r
    }

    pub const fn t(&self) -> f64 {
        self.t
    }

    pub const fn bl(&self) -> Pt {
        pt(self.l, self.b)
    }

    pub const fn tr(&self) -> Pt {
        pt(self.r, self.t)
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.w() * self.h()
        }
    }

    pub fn perimeter(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            2.0 * (self.w() + self.h())
        }
    }

    pub fn contains(&self, p: Pt) -> bool {
        ge(p.x, self.l) && ge(p.y, self.b) && le(p.x, self.r) && le(p.y, self.t)
    }

    /// True iff the two boxes overlap with nonzero area.
    pub fn intersects(&self, o: &Rt) -> bool {
        self.l < o.r - EP && o.l < self.r - EP && self.b < o.t - EP && o.b < self.t - EP
    }

    /// True iff the two boxes overlap, or share part of a boundary edge —
    /// the adjacency test used to merge wire shapes into one island.
    pub fn touches(&self, o: &Rt) -> bool {
        if self.is_empty() || o.is_empty() {
            return false;
        }
        let l = self.l.max(o.l);
        let r = self.r.min(o.r);
        let b = self.b.max(o.b);
        let t = self.t.min(o.t);
        l <= r + EP && b <= t + EP
    }

    pub fn intersection(&self, o: &Rt) -> Rt {
        Rt::new(self.l.max(o.l), self.b.max(o.b), self.r.min(o.r), self.t.min(o.t))
    }

    pub fn united(&self, o: &Rt) -> Rt {
        if o.is_empty() {
            *self
        } else if self.is_empty() {
            *o
        } else {
            Rt::new(self.l.min(o.l), self.b.min(o.b), self.r.max(o.r), self.t.max(o.t))
        }
    }

    pub fn enclosing(a: Pt, b: Pt) -> Rt {
        Rt::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }
}

pub const fn rt(l: f64, b: f64, r: f64, t: f64) -> Rt {
    Rt::new(l, b, r, t)
}
