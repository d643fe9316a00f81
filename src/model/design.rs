//! Owned, file-format-independent representation of a placed-and-routed
//! design, consumed by the checker. Mirrors the teacher's `Pcb`: the
//! database loader that populates one is the external collaborator named in
//! spec.md §1, out of scope here.

use crate::model::layer::{Layer, LayerId};
use crate::model::net::{Net, NetId};

#[derive(Debug, Clone, Default)]
pub struct Design {
    layers: Vec<Layer>,
    nets: Vec<Net>,
    /// Database units per micrometre, for the conversions named in spec.md §6.
    pub dbu_per_um: f64,
}

impl Design {
    pub fn new(layers: Vec<Layer>, nets: Vec<Net>, dbu_per_um: f64) -> Self {
        Self { layers, nets, dbu_per_um }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn net(&self, id: NetId) -> Option<&Net> {
        self.nets.iter().find(|n| n.id == id)
    }

    /// Non-special nets, in the order `checkAllNets` should walk them for
    /// deterministic report output.
    pub fn routable_nets(&self) -> impl Iterator<Item = &Net> {
        self.nets.iter().filter(|n| !n.special)
    }

    pub fn has_any_routes(&self) -> bool {
        self.nets.iter().any(|n| !n.is_empty_route())
    }

    /// Walks the layer stack from the bottommost layer (no lower neighbour)
    /// to the topmost (no upper neighbour), following the `lower`/`upper`
    /// links — the total order that "bottom to top" refers to throughout
    /// spec.md, independent of the `routing_level` type flag.
    pub fn layers_bottom_to_top(&self) -> Vec<LayerId> {
        let Some(bottom) = self.layers.iter().find(|l| l.lower.is_none()) else {
            return Vec::new();
        };
        let mut order = Vec::with_capacity(self.layers.len());
        let mut cur = Some(bottom.id);
        while let Some(id) = cur {
            order.push(id);
            cur = self.layer(id).and_then(|l| l.upper);
        }
        order
    }

    pub fn to_um(&self, dbu: i64) -> f64 {
        dbu as f64 / self.dbu_per_um
    }

    pub fn to_dbu(&self, um: f64) -> i64 {
        (um * self.dbu_per_um).round() as i64
    }
}
