//! Disjoint-set union over the layered polygon graph, per spec.md §4.3:
//! attaches gate pins to the island they touch and propagates gate
//! membership upward layer by layer.

pub mod dsu;

use std::collections::{HashMap, HashSet};

use crate::connectivity::dsu::Dsu;
use crate::geometry::LayeredGraph;
use crate::model::design::Design;
use crate::model::net::{GateId, Net};

#[derive(Debug, Default)]
pub struct Connectivity {
    /// Gate ids attached to each island, sorted and deduplicated, frozen at
    /// the point the island's own layer was processed in the bottom-to-top
    /// traversal.
    pub gate_sets: HashMap<usize, Vec<GateId>>,
    /// Final DSU root of every island, used by the "cumulative includes
    /// cuts" rule in `ratio.rs` to find via islands sharing a wire island's
    /// connected component.
    pub island_root: HashMap<usize, usize>,
}

impl Connectivity {
    pub fn gates_on(&self, island: usize) -> &[GateId] {
        self.gate_sets.get(&island).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub fn compute(design: &Design, net: &Net, graph: &LayeredGraph) -> Connectivity {
    let order = design.layers_bottom_to_top();

    // Step 1: per-pin candidate islands, from the pin's own layer plus the
    // layer immediately above and below (the pin touches a via there).
    let mut pin_islands: HashMap<GateId, Vec<usize>> = HashMap::new();
    for iterm in net.gates() {
        let mut islands = HashSet::new();
        for &(layer_id, fp) in &iterm.footprints {
            let Some(layer) = design.layer(layer_id) else { continue };
            let mut candidate_layers = vec![layer_id];
            candidate_layers.extend(layer.upper);
            candidate_layers.extend(layer.lower);
            for cl in candidate_layers {
                if let Some(ids) = graph.by_layer.get(&cl) {
                    for &island_id in ids {
                        if graph.islands[island_id].shape.touches_rect(&fp) {
                            islands.insert(island_id);
                        }
                    }
                }
            }
        }
        pin_islands.insert(iterm.id, islands.into_iter().collect());
    }

    // Inverse of `via_upper`: metal island -> via islands immediately below
    // it that land on it.
    let mut metal_lower_vias: HashMap<usize, Vec<usize>> = HashMap::new();
    for (&via_id, uppers) in &graph.via_upper {
        for &m in uppers {
            metal_lower_vias.entry(m).or_default().push(via_id);
        }
    }

    let mut dsu = Dsu::new(graph.islands.len());
    let mut gate_sets: HashMap<usize, Vec<GateId>> = HashMap::new();

    for &layer_id in &order {
        let Some(ids) = graph.by_layer.get(&layer_id) else { continue };
        let is_via = design.layer(layer_id).map(|l| l.is_via()).unwrap_or(false);

        for &island_id in ids {
            let lower_neighbors: &[usize] = if is_via {
                graph.via_lower.get(&island_id).map(Vec::as_slice).unwrap_or(&[])
            } else {
                metal_lower_vias.get(&island_id).map(Vec::as_slice).unwrap_or(&[])
            };
            for &ln in lower_neighbors {
                dsu.union(island_id, ln);
            }
        }

        for &island_id in ids {
            let mut gates: Vec<GateId> = pin_islands
                .iter()
                .filter(|(_, islands)| islands.iter().any(|&pid| dsu.same(pid, island_id)))
                .map(|(&gate_id, _)| gate_id)
                .collect();
            gates.sort_unstable();
            gate_sets.insert(island_id, gates);
        }
    }

    let island_root = (0..graph.islands.len()).map(|id| (id, dsu.find(id))).collect();

    Connectivity { gate_sets, island_root }
}
