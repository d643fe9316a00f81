//! `LayerGeometry`: turns one net's wires and vias into per-layer islands
//! plus via-to-metal adjacency, per spec.md §4.2. Grounded on the teacher's
//! `route/place_model.rs::add_shape`, which buckets shapes into a
//! `HashMap<LayerId, _>` keyed accumulator the same way.

use std::collections::HashMap;

use crate::connectivity::dsu::Dsu;
use crate::model::design::Design;
use crate::model::layer::LayerId;
use crate::model::net::Net;
use crate::model::rect::Rt;
use crate::model::rectset::RectSet;

#[derive(Debug, Clone)]
pub struct Island {
    pub id: usize,
    pub layer: LayerId,
    pub shape: RectSet,
}

#[derive(Debug, Default)]
pub struct LayeredGraph {
    pub islands: Vec<Island>,
    /// Island ids per layer, in the order the polygon-set traversal
    /// assigned them (deterministic: by bounds, bottom-left first).
    pub by_layer: HashMap<LayerId, Vec<usize>>,
    /// Via island id -> lower metal island ids it intersects.
    pub via_lower: HashMap<usize, Vec<usize>>,
    /// Via island id -> upper metal island ids it intersects.
    pub via_upper: HashMap<usize, Vec<usize>>,
}

pub fn build(design: &Design, net: &Net) -> LayeredGraph {
    let order = design.layers_bottom_to_top();

    let mut raw: HashMap<LayerId, Vec<Rt>> = HashMap::new();
    for w in &net.wires {
        raw.entry(w.layer).or_default().push(w.rect);
    }
    for v in &net.vias {
        raw.entry(v.bottom_layer).or_default().push(v.bottom_rect);
        raw.entry(v.cut_layer).or_default().push(v.cut_rect);
        raw.entry(v.top_layer).or_default().push(v.top_rect);
    }

    for iterm in &net.iterms {
        for &(layer, fp) in &iterm.footprints {
            if let Some(rects) = raw.get_mut(&layer) {
                let set = RectSet::new(std::mem::take(rects)).subtract(&fp);
                *rects = set.rects().to_vec();
            }
        }
    }

    let mut graph = LayeredGraph::default();
    let mut next_id = 0usize;
    for &layer_id in &order {
        let Some(rects) = raw.get(&layer_id) else { continue };
        if rects.is_empty() {
            continue;
        }
        let mut groups = connected_components(rects);
        groups.sort_by(|a, b| {
            let (ab, bb) = (a.bounds(), b.bounds());
            ab.l()
                .partial_cmp(&bb.l())
                .unwrap()
                .then(ab.b().partial_cmp(&bb.b()).unwrap())
        });
        let mut ids = Vec::with_capacity(groups.len());
        for shape in groups {
            let id = next_id;
            next_id += 1;
            graph.islands.push(Island { id, layer: layer_id, shape });
            ids.push(id);
        }
        graph.by_layer.insert(layer_id, ids);
    }

    for &layer_id in &order {
        let Some(layer) = design.layer(layer_id) else { continue };
        if !layer.is_via() {
            continue;
        }
        let Some(via_ids) = graph.by_layer.get(&layer_id).cloned() else { continue };
        for via_id in via_ids {
            let via_shape = graph.islands[via_id].shape.clone();
            let lowers = neighbor_islands(&graph, layer.lower, &via_shape);
            let uppers = neighbor_islands(&graph, layer.upper, &via_shape);
            if lowers.len() + uppers.len() > 2 {
                log::warn!(
                    "net {}: via island {} on layer {} touches {} neighbour islands (expected <=2), data model error",
                    net.name,
                    via_id,
                    layer.name,
                    lowers.len() + uppers.len()
                );
            }
            graph.via_lower.insert(via_id, lowers);
            graph.via_upper.insert(via_id, uppers);
        }
    }

    graph
}

fn neighbor_islands(graph: &LayeredGraph, layer: Option<LayerId>, via_shape: &RectSet) -> Vec<usize> {
    let Some(layer) = layer else { return Vec::new() };
    let Some(ids) = graph.by_layer.get(&layer) else { return Vec::new() };
    ids.iter().copied().filter(|&id| graph.islands[id].shape.intersects_set(via_shape)).collect()
}

fn connected_components(rects: &[Rt]) -> Vec<RectSet> {
    let mut dsu = Dsu::new(rects.len());
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if rects[i].touches(&rects[j]) {
                dsu.union(i, j);
            }
        }
    }
    let mut groups: HashMap<usize, Vec<Rt>> = HashMap::new();
    for (i, &r) in rects.iter().enumerate() {
        groups.entry(dsu.find(i)).or_default().push(r);
    }
    groups.into_values().map(RectSet::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::layer::{AntennaRule, Dir, Layer};
    use crate::model::net::{Iterm, Mterm, ViaInst, WireSeg};
    use crate::model::rect::rt;

    fn two_metal_one_via_design() -> Design {
        let m1 = Layer {
            id: 1,
            name: "M1".into(),
            routing_level: 1,
            dir: Dir::Horizontal,
            width: 1.0,
            thickness: 1.0,
            rule: Some(AntennaRule::default()),
            lower: None,
            upper: Some(2),
        };
        let via = Layer {
            id: 2,
            name: "V1".into(),
            routing_level: 0,
            dir: Dir::Horizontal,
            width: 1.0,
            thickness: 1.0,
            rule: Some(AntennaRule::default()),
            lower: Some(1),
            upper: Some(3),
        };
        let m2 = Layer {
            id: 3,
            name: "M2".into(),
            routing_level: 1,
            dir: Dir::Vertical,
            width: 1.0,
            thickness: 1.0,
            rule: Some(AntennaRule::default()),
            lower: Some(2),
            upper: None,
        };
        Design::new(vec![m1, via, m2], vec![], 1000.0)
    }

    #[test]
    fn single_wire_forms_one_island_with_via_adjacency() {
        let design = two_metal_one_via_design();
        let net = Net {
            id: 0,
            name: "n1".into(),
            special: false,
            wires: vec![WireSeg { layer: 1, rect: rt(0.0, 0.0, 10.0, 1.0) }],
            vias: vec![ViaInst {
                cut_layer: 2,
                bottom_layer: 1,
                top_layer: 3,
                bottom_rect: rt(9.0, 0.0, 10.0, 1.0),
                cut_rect: rt(9.0, 0.0, 10.0, 1.0),
                top_rect: rt(9.0, 0.0, 10.0, 1.0),
            }],
            iterms: vec![Iterm {
                id: 0,
                name: "d".into(),
                mterm: Mterm::default(),
                footprints: vec![(3, rt(9.0, 0.0, 10.0, 1.0))],
            }],
        };
        let graph = build(&design, &net);
        assert_eq!(graph.by_layer.get(&1).map(Vec::len), Some(1));
        assert_eq!(graph.by_layer.get(&2).map(Vec::len), Some(1));
        let via_id = graph.by_layer[&2][0];
        assert_eq!(graph.via_lower[&via_id].len(), 1);
    }

    #[test]
    fn pin_footprint_is_subtracted_from_wire() {
        let design = two_metal_one_via_design();
        let net = Net {
            id: 0,
            name: "n1".into(),
            special: false,
            wires: vec![WireSeg { layer: 1, rect: rt(0.0, 0.0, 10.0, 1.0) }],
            vias: vec![],
            iterms: vec![Iterm {
                id: 0,
                name: "d".into(),
                mterm: Mterm::default(),
                footprints: vec![(1, rt(4.0, 0.0, 6.0, 1.0))],
            }],
        };
        let graph = build(&design, &net);
        // The footprint splits the 10x1 wire into two islands (left, right).
        assert_eq!(graph.by_layer.get(&1).map(Vec::len), Some(2));
    }
}
