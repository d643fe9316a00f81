use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::layer::LayerId;
use crate::model::rect::Rt;

pub type NetId = usize;
pub type GateId = usize;

/// One routed wire segment: an orthogonal rectangle on a single metal layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireSeg {
    pub layer: LayerId,
    pub rect: Rt,
}

/// One via crossing, contributing three shapes per spec.md §4.2: a land on
/// the bottom metal layer, the cut itself, and a land on the top metal
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViaInst {
    pub cut_layer: LayerId,
    pub bottom_layer: LayerId,
    pub top_layer: LayerId,
    pub bottom_rect: Rt,
    pub cut_rect: Rt,
    pub top_rect: Rt,
}

/// The master-terminal antenna properties of an iterm: gate area (oxide
/// being protected) and diff area (protecting diode), each potentially
/// defined per layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mterm {
    pub is_input: bool,
    pub gate_area: HashMap<LayerId, f64>,
    pub diff_area: HashMap<LayerId, f64>,
}

impl Mterm {
    /// A gate's gate area is the max over its per-layer gate-area entries.
    pub fn gate_area_max(&self) -> f64 {
        self.gate_area.values().copied().fold(0.0, f64::max)
    }

    /// A gate's diff area is the max over its per-layer diff-area entries.
    pub fn diff_area_max(&self) -> f64 {
        self.diff_area.values().copied().fold(0.0, f64::max)
    }

    /// A "gate" per spec.md §3 is an iterm whose mterm is an input with
    /// nonzero gate area.
    pub fn is_gate(&self) -> bool {
        self.is_input && self.gate_area_max() > 0.0
    }
}

/// An instance pin (iterm) on a net.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iterm {
    pub id: GateId,
    pub name: String,
    pub mterm: Mterm,
    /// Pin footprint boxes, one or more per layer the pin's padstack covers.
    pub footprints: Vec<(LayerId, Rt)>,
}

impl Iterm {
    pub fn is_gate(&self) -> bool {
        self.mterm.is_gate()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Net {
    pub id: NetId,
    pub name: String,
    pub special: bool,
    pub wires: Vec<WireSeg>,
    pub vias: Vec<ViaInst>,
    pub iterms: Vec<Iterm>,
}

impl Net {
    pub fn gates(&self) -> impl Iterator<Item = &Iterm> {
        self.iterms.iter().filter(|p| p.is_gate())
    }

    pub fn is_empty_route(&self) -> bool {
        self.wires.is_empty() && self.vias.is_empty()
    }
}
