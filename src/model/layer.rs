use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::pwl::Pwl;

pub type LayerId = usize;

/// Preferred routing direction of a metal layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum Dir {
    Horizontal,
    Vertical,
}

/// Per-layer antenna rule, as delivered pre-interpreted by the database —
/// rule *parsing* is out of scope, this is the parsed shape the checker
/// consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AntennaRule {
    /// Area factor applied to metal (and, unless overridden, cut) area.
    pub area_factor: f64,
    /// True if `area_factor` only applies to the diffusion-connected
    /// (`diff_*`) variants, leaving the plain variants at 1.0.
    pub area_factor_diff_only: bool,
    /// Per-cut area factor for via layers; defaults to `area_factor` when
    /// unset.
    pub cut_area_factor: Option<f64>,
    pub side_area_factor: f64,
    pub side_area_factor_diff_only: bool,
    pub minus_diff_factor: f64,
    pub plus_diff_factor: f64,
    pub area_diff_reduce: Pwl,

    pub par: f64,
    pub psr: f64,
    pub car: f64,
    pub csr: f64,
    pub diff_par: Pwl,
    pub diff_psr: Pwl,
    pub diff_car: Pwl,
    pub diff_csr: Pwl,

    /// "cumulative includes cuts": wire CAR/diff_CAR on this layer also
    /// folds in the PAR of any via islands in the same DSU set as the wire
    /// island being evaluated.
    pub cumulative_includes_cuts: bool,
}

/// A layer in the tech stack. Ordering is given by `lower`/`upper`, not by
/// `routing_level` (which is only a type flag: 0 = cut/via, >=1 = metal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub routing_level: u32,
    pub dir: Dir,
    pub width: f64,
    pub thickness: f64,
    pub rule: Option<AntennaRule>,
    pub lower: Option<LayerId>,
    pub upper: Option<LayerId>,
}

impl Layer {
    pub fn is_via(&self) -> bool {
        self.routing_level == 0
    }

    pub fn is_metal(&self) -> bool {
        self.routing_level >= 1
    }
}
