//! A rectilinear polygon expressed as a union of axis-aligned boxes — the
//! shape of one `Island` on one layer. The teacher's `Compound`/`QuadTree`
//! index shapes for fast intersection queries but never merge them into a
//! single boolean union; antenna analysis needs exactly that (area and
//! perimeter of the union), so this computes it directly via coordinate
//! compression rather than pulling in a general polygon-clipping crate.

use crate::model::point::EP;
use crate::model::rect::Rt;

#[derive(Debug, Default, Clone)]
pub struct RectSet {
    rects: Vec<Rt>,
}

impl RectSet {
    pub fn new(rects: Vec<Rt>) -> Self {
        Self { rects: rects.into_iter().filter(|r| !r.is_empty()).collect() }
    }

    pub fn rects(&self) -> &[Rt] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn bounds(&self) -> Rt {
        self.rects.iter().fold(Rt::empty(), |acc, r| acc.united(r))
    }

    pub fn touches_rect(&self, o: &Rt) -> bool {
        self.rects.iter().any(|r| r.touches(o))
    }

    pub fn intersects_rect(&self, o: &Rt) -> bool {
        self.rects.iter().any(|r| r.intersects(o))
    }

    pub fn intersects_set(&self, o: &RectSet) -> bool {
        self.rects.iter().any(|r| o.intersects_rect(r))
    }

    pub fn area(&self) -> f64 {
        union_area(&self.rects)
    }

    pub fn perimeter(&self) -> f64 {
        union_perimeter(&self.rects)
    }

    /// Removes `hole` from every member rect, splitting each into the
    /// non-overlapping pieces that remain (used to carve pin footprints out
    /// of wire/via shapes).
    pub fn subtract(&self, hole: &Rt) -> RectSet {
        RectSet::new(self.rects.iter().flat_map(|r| subtract_rect(r, hole)).collect())
    }
}

fn subtract_rect(r: &Rt, hole: &Rt) -> Vec<Rt> {
    if !r.intersects(hole) {
        return vec![*r];
    }
    let ih = r.intersection(hole);
    let mut out = Vec::new();
    if ih.l() > r.l() + EP {
        out.push(Rt::new(r.l(), r.b(), ih.l(), r.t()));
    }
    if ih.r() < r.r() - EP {
        out.push(Rt::new(ih.r(), r.b(), r.r(), r.t()));
    }
    if ih.b() > r.b() + EP {
        out.push(Rt::new(ih.l(), r.b(), ih.r(), ih.b()));
    }
    if ih.t() < r.t() - EP {
        out.push(Rt::new(ih.l(), ih.t(), ih.r(), r.t()));
    }
    out.into_iter().filter(|o| !o.is_empty()).collect()
}

fn compressed_axis(vals: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = vals.collect();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap());
    v.dedup_by(|a, b| (*a - *b).abs() < EP);
    v
}

fn cell_covered(rects: &[Rt], cx: f64, cy: f64) -> bool {
    rects.iter().any(|r| r.l() <= cx && cx <= r.r() && r.b() <= cy && cy <= r.t())
}

fn union_area(rects: &[Rt]) -> f64 {
    if rects.is_empty() {
        return 0.0;
    }
    let xs = compressed_axis(rects.iter().flat_map(|r| [r.l(), r.r()]));
    let ys = compressed_axis(rects.iter().flat_map(|r| [r.b(), r.t()]));
    let mut area = 0.0;
    for w in xs.windows(2) {
        for h in ys.windows(2) {
            let cx = (w[0] + w[1]) / 2.0;
            let cy = (h[0] + h[1]) / 2.0;
            if cell_covered(rects, cx, cy) {
                area += (w[1] - w[0]) * (h[1] - h[0]);
            }
        }
    }
    area
}

fn union_perimeter(rects: &[Rt]) -> f64 {
    if rects.is_empty() {
        return 0.0;
    }
    let xs = compressed_axis(rects.iter().flat_map(|r| [r.l(), r.r()]));
    let ys = compressed_axis(rects.iter().flat_map(|r| [r.b(), r.t()]));
    let nx = xs.len() - 1;
    let ny = ys.len() - 1;
    let covered: Vec<Vec<bool>> = (0..nx)
        .map(|i| {
            let cx = (xs[i] + xs[i + 1]) / 2.0;
            (0..ny)
                .map(|j| {
                    let cy = (ys[j] + ys[j + 1]) / 2.0;
                    cell_covered(rects, cx, cy)
                })
                .collect()
        })
        .collect();

    let mut perim = 0.0;
    for i in 0..nx {
        for j in 0..ny {
            if !covered[i][j] {
                continue;
            }
            let w = xs[i + 1] - xs[i];
            let h = ys[j + 1] - ys[j];
            if i == 0 || !covered[i - 1][j] {
                perim += h;
            }
            if i == nx - 1 || !covered[i + 1][j] {
                perim += h;
            }
            if j == 0 || !covered[i][j - 1] {
                perim += w;
            }
            if j == ny - 1 || !covered[i][j + 1] {
                perim += w;
            }
        }
    }
    perim
}
