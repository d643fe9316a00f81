//! `RatioEngine`, per spec.md §4.4: computes per-island PAR/PSR and
//! per-gate CAR/CSR from RuleStore factors, handling the diffusion-area PWL
//! branch and the cumulative running sums.

use std::collections::{HashMap, HashSet};

use crate::connectivity::Connectivity;
use crate::geometry::LayeredGraph;
use crate::model::design::Design;
use crate::model::layer::{Layer, LayerId};
use crate::model::net::{GateId, Iterm, Net};
use crate::rules::{AntennaModel, RuleStore};

#[derive(Debug, Clone, Default)]
pub struct InfoRecord {
    pub gate: GateId,
    pub layer: LayerId,
    pub area: f64,
    pub side_area: f64,
    pub iterm_gate_area: f64,
    pub iterm_diff_area: f64,
    pub par: f64,
    pub psr: f64,
    pub diff_par: f64,
    pub diff_psr: f64,
    pub car: f64,
    pub csr: f64,
    pub diff_car: f64,
    pub diff_csr: f64,
    /// Count of distinct gates sharing the island(s) behind this record,
    /// i.e. the `k` in the diode loop's `diodeDiff * k` (spec.md §4.5):
    /// each co-located gate needs its own diode at this node.
    pub gate_count: usize,
}

/// Builds one `InfoRecord` per (gate, layer) pair carrying that gate,
/// with PAR/PSR/diff_PAR/diff_PSR already computed, in layer-then-gate
/// order for determinism (spec.md §5 "within a layer, islands are
/// processed in id order").
pub fn compute_info_records(
    design: &Design,
    net: &Net,
    graph: &LayeredGraph,
    conn: &Connectivity,
    rules: &RuleStore,
) -> Vec<InfoRecord> {
    let order = design.layers_bottom_to_top();
    let gates_by_id: HashMap<GateId, &Iterm> = net.gates().map(|g| (g.id, g)).collect();

    let mut acc: HashMap<(GateId, LayerId), (f64, f64, usize)> = HashMap::new();
    for island in &graph.islands {
        let gates = conn.gates_on(island.id);
        if gates.is_empty() {
            continue;
        }
        let Some(layer) = design.layer(island.layer) else { continue };
        let area = island.shape.area();
        let side_area = if layer.is_metal() { island.shape.perimeter() * layer.thickness } else { 0.0 };
        for &gate_id in gates {
            let e = acc.entry((gate_id, island.layer)).or_insert((0.0, 0.0, 0));
            e.0 += area;
            e.1 += side_area;
            e.2 = e.2.max(gates.len());
        }
    }

    let mut records = Vec::new();
    for &layer_id in &order {
        let Some(layer) = design.layer(layer_id) else { continue };
        let Some(model) = rules.model(layer_id) else { continue };
        let rule = layer.rule.as_ref().expect("RuleStore only has a model when the layer has a rule");

        let mut gate_ids: Vec<GateId> =
            acc.keys().filter(|&&(_, l)| l == layer_id).map(|&(g, _)| g).collect();
        gate_ids.sort_unstable();

        for gate_id in gate_ids {
            let (area, side_area, gate_count) = acc[&(gate_id, layer_id)];
            let gate = gates_by_id[&gate_id];
            let gg = gate.mterm.gate_area_max();
            // "PAR=0 implies iterm_gate_area=0 and the gate/layer pair is
            // not checked."
            if gg == 0.0 {
                continue;
            }
            let gd = gate.mterm.diff_area_max();
            let mut rec = build_record(layer, model, &rule.area_diff_reduce, gate_id, layer_id, area, side_area, gg, gd);
            rec.gate_count = gate_count;
            records.push(rec);
        }
    }
    records
}

/// PAR/PSR/diff_PAR/diff_PSR for one (area, side_area, Gg, Gd) point, per
/// the metal/via, diff-connected/not branches of spec.md §4.4. Shared
/// between the initial build and the diode loop's PAR/PSR-only recheck
/// (spec.md §4.5).
pub fn par_psr(
    layer: &Layer,
    model: &AntennaModel,
    area_diff_reduce: &crate::model::pwl::Pwl,
    area: f64,
    side_area: f64,
    gg: f64,
    gd: f64,
) -> (f64, f64, f64, f64) {
    let r = area_diff_reduce.eval(gd, 1.0);
    let diff_connected = gd != 0.0;
    let is_via = layer.is_via();

    let metal_f = if is_via { model.cut_factor } else { model.metal_factor };
    let diff_metal_f = if is_via { model.diff_cut_factor } else { model.diff_metal_factor };

    let (par, diff_par) = if diff_connected {
        let par = diff_metal_f * area / gg;
        let diff_par = (diff_metal_f * area * r - model.minus_diff_factor * gd) / (gg + model.plus_diff_factor * gd);
        (par, diff_par)
    } else {
        (metal_f * area / gg, metal_f * area * r / gg)
    };

    let (psr, diff_psr) = if is_via {
        (0.0, 0.0)
    } else if diff_connected {
        let psr = model.diff_side_metal_factor * side_area / gg;
        let diff_psr = (model.diff_side_metal_factor * side_area * r - model.minus_diff_factor * gd)
            / (gg + model.plus_diff_factor * gd);
        (psr, diff_psr)
    } else {
        (model.side_metal_factor * side_area / gg, model.side_metal_factor * side_area * r / gg)
    };

    (par, psr, diff_par, diff_psr)
}

#[allow(clippy::too_many_arguments)]
fn build_record(
    layer: &Layer,
    model: &AntennaModel,
    area_diff_reduce: &crate::model::pwl::Pwl,
    gate: GateId,
    layer_id: LayerId,
    area: f64,
    side_area: f64,
    gg: f64,
    gd: f64,
) -> InfoRecord {
    let (par, psr, diff_par, diff_psr) = par_psr(layer, model, area_diff_reduce, area, side_area, gg, gd);

    InfoRecord {
        gate,
        layer: layer_id,
        area,
        side_area,
        iterm_gate_area: gg,
        iterm_diff_area: gd,
        par,
        psr,
        diff_par,
        diff_psr,
        car: 0.0,
        csr: 0.0,
        diff_car: 0.0,
        diff_csr: 0.0,
        gate_count: 0,
    }
}

/// Fills in CAR/CSR/diff_CAR/diff_CSR by walking layers bottom to top,
/// keeping separate running sums for wire and via layers per gate.
pub fn compute_cumulative(design: &Design, net: &Net, graph: &LayeredGraph, conn: &Connectivity, records: &mut [InfoRecord]) {
    let order = design.layers_bottom_to_top();

    let record_index: HashMap<(GateId, LayerId), usize> =
        records.iter().enumerate().map(|(i, r)| ((r.gate, r.layer), i)).collect();

    let mut by_layer: HashMap<LayerId, Vec<usize>> = HashMap::new();
    for (i, r) in records.iter().enumerate() {
        by_layer.entry(r.layer).or_default().push(i);
    }

    #[derive(Default, Clone, Copy)]
    struct Sums {
        par: f64,
        psr: f64,
        diff_par: f64,
        diff_psr: f64,
    }
    let mut sum_wire: HashMap<GateId, Sums> = HashMap::new();
    let mut sum_via: HashMap<GateId, Sums> = HashMap::new();

    for &layer_id in &order {
        let Some(layer) = design.layer(layer_id) else { continue };
        let Some(idxs) = by_layer.get(&layer_id) else { continue };

        for &i in idxs {
            let gate = records[i].gate;
            if layer.is_via() {
                let e = sum_via.entry(gate).or_default();
                e.par += records[i].par;
                e.diff_par += records[i].diff_par;
                records[i].car = e.par;
                records[i].diff_car = e.diff_par;
                records[i].csr = 0.0;
                records[i].diff_csr = 0.0;
            } else {
                let e = sum_wire.entry(gate).or_default();
                e.par += records[i].par;
                e.psr += records[i].psr;
                e.diff_par += records[i].diff_par;
                e.diff_psr += records[i].diff_psr;

                let mut car = e.par;
                let mut diff_car = e.diff_par;
                if layer.rule.as_ref().map(|r| r.cumulative_includes_cuts).unwrap_or(false) {
                    let (extra_par, extra_diff_par) =
                        matching_via_root_contributions(design, graph, conn, gate, layer_id, &record_index, records);
                    car += extra_par;
                    diff_car += extra_diff_par;
                }

                records[i].car = car;
                records[i].csr = e.psr;
                records[i].diff_car = diff_car;
                records[i].diff_csr = e.diff_psr;
            }
        }
    }
}

/// "CAR wire roots with matching via roots": via islands that share a DSU
/// root with one of this gate's wire islands on `layer_id`, each counted
/// once, contribute their own (gate, layer) record's PAR/diff_PAR.
fn matching_via_root_contributions(
    design: &Design,
    graph: &LayeredGraph,
    conn: &Connectivity,
    gate: GateId,
    layer_id: LayerId,
    record_index: &HashMap<(GateId, LayerId), usize>,
    records: &[InfoRecord],
) -> (f64, f64) {
    let Some(wire_islands) = graph.by_layer.get(&layer_id) else { return (0.0, 0.0) };
    let wire_islands: Vec<usize> =
        wire_islands.iter().copied().filter(|&id| conn.gates_on(id).contains(&gate)).collect();

    let mut extra_par = 0.0;
    let mut extra_diff_par = 0.0;
    let mut seen_via = HashSet::new();
    for &wi in &wire_islands {
        let Some(&root) = conn.island_root.get(&wi) else { continue };
        for island in &graph.islands {
            let is_via = design.layer(island.layer).map(|l| l.is_via()).unwrap_or(false);
            if !is_via || conn.island_root.get(&island.id) != Some(&root) || !seen_via.insert(island.id) {
                continue;
            }
            if let Some(&idx) = record_index.get(&(gate, island.layer)) {
                extra_par += records[idx].par;
                extra_diff_par += records[idx].diff_par;
            }
        }
    }
    (extra_par, extra_diff_par)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity;
    use crate::geometry;
    use crate::model::layer::{AntennaRule, Dir, Layer};
    use crate::model::net::{Iterm, Mterm, WireSeg};
    use crate::model::rect::rt;

    fn toy_design(par_threshold: f64) -> Design {
        let rule = AntennaRule { area_factor: 1.0, side_area_factor: 1.0, par: par_threshold, ..Default::default() };
        let m1 = Layer {
            id: 1,
            name: "M1".into(),
            routing_level: 1,
            dir: Dir::Horizontal,
            width: 1.0,
            thickness: 1.0,
            rule: Some(rule),
            lower: None,
            upper: None,
        };
        Design::new(vec![m1], vec![], 1000.0)
    }

    #[test]
    fn s1_clean_par_under_threshold() {
        let design = toy_design(1.0);
        let mut receiver = Mterm::default();
        receiver.is_input = true;
        receiver.gate_area.insert(1, 20.0);
        let net = Net {
            id: 0,
            name: "n1".into(),
            special: false,
            wires: vec![WireSeg { layer: 1, rect: rt(0.0, 0.0, 10.0, 1.0) }],
            vias: vec![],
            iterms: vec![Iterm {
                id: 0,
                name: "receiver".into(),
                mterm: receiver,
                // Touches the wire's left edge without overlapping it, so
                // LayerGeometry's pin-footprint subtraction is a no-op and
                // the full 10x1 wire area is attributed to the gate.
                footprints: vec![(1, rt(-1.0, 0.0, 0.0, 1.0))],
            }],
        };
        let rules = RuleStore::build(&design);
        let graph = geometry::build(&design, &net);
        let conn = connectivity::compute(&design, &net, &graph);
        let records = compute_info_records(&design, &net, &graph, &conn, &rules);
        assert_eq!(records.len(), 1);
        assert!((records[0].par - 0.5).abs() < 1e-9);
    }
}
