//! Property-based checks for the cross-cutting invariants: non-negative
//! ratios, margin monotonicity, diode-mterm independence from violation
//! counts, and run-to-run determinism.

use antcheck::checker::{CheckOptions, Checker, NetReport};
use antcheck::model::design::Design;
use antcheck::model::layer::{AntennaRule, Dir, Layer};
use antcheck::model::net::{Iterm, Mterm, Net, WireSeg};
use antcheck::model::rect::rt;
use proptest::prelude::*;

fn design_with(wire_len: f64, gate_area: f64, par_threshold: f64, n_gates: u32) -> (Design, usize) {
    let layer = Layer {
        id: 1,
        name: "M1".into(),
        routing_level: 1,
        dir: Dir::Horizontal,
        width: 1.0,
        thickness: 1.0,
        rule: Some(AntennaRule { area_factor: 1.0, par: par_threshold, ..Default::default() }),
        lower: None,
        upper: None,
    };
    let mut iterms = Vec::new();
    // Each gate gets its own disjoint wire segment further right along M1,
    // so they never merge into a shared island.
    let mut wires = Vec::new();
    for g in 0..n_gates {
        let offset = g as f64 * (wire_len + 10.0);
        wires.push(WireSeg { layer: 1, rect: rt(offset, 0.0, offset + wire_len, 1.0) });
        let mut mterm = Mterm::default();
        mterm.is_input = true;
        mterm.gate_area.insert(1, gate_area);
        iterms.push(Iterm {
            id: g as usize,
            name: format!("g{g}"),
            mterm,
            footprints: vec![(1, rt(offset - 1.0, 0.0, offset, 1.0))],
        });
    }
    let net = Net { id: 0, name: "n".into(), special: false, wires, vias: vec![], iterms };
    (Design::new(vec![layer], vec![net], 1000.0), 0)
}

fn arb_ratio_inputs() -> impl Strategy<Value = (f64, f64, f64)> {
    (1.0..200.0f64, 1.0..200.0f64, 0.1..5.0f64)
}

proptest! {
    /// Invariant 1: pin_violation_count never exceeds the number of gates
    /// actually present on the net.
    #[test]
    fn pin_violation_count_bounded_by_gate_count((wire_len, gate_area, par) in arb_ratio_inputs(), n_gates in 1u32..5) {
        let (design, net_id) = design_with(wire_len, gate_area, par, n_gates);
        let mut checker = Checker::new(&design);
        let report = checker.check_net(net_id, &CheckOptions::default()).unwrap();
        if let NetReport::Checked { pin_violation_count, .. } = report {
            prop_assert!(pin_violation_count <= n_gates);
        }
    }

    /// Invariant 2: ratios are never negative.
    #[test]
    fn ratios_are_non_negative((wire_len, gate_area, _par) in arb_ratio_inputs()) {
        use antcheck::connectivity;
        use antcheck::geometry;
        use antcheck::ratio::compute_info_records;
        use antcheck::rules::RuleStore;

        let (design, net_id) = design_with(wire_len, gate_area, 1.0, 1);
        let net = design.net(net_id).unwrap();
        let rules = RuleStore::build(&design);
        let graph = geometry::build(&design, net);
        let conn = connectivity::compute(&design, net, &graph);
        let records = compute_info_records(&design, net, &graph, &conn, &rules);
        for r in &records {
            prop_assert!(r.par >= 0.0);
            prop_assert!(r.psr >= 0.0);
            // minus_diff_factor is 0 in this toy rule, so diff_par can't go negative.
            prop_assert!(r.diff_par >= -1e-9);
        }
    }

    /// Invariant 3: two runs on the same design produce byte-identical
    /// violation counts and report text.
    #[test]
    fn rerun_is_deterministic((wire_len, gate_area, par) in arb_ratio_inputs()) {
        let (design, net_id) = design_with(wire_len, gate_area, par, 2);
        let opts = CheckOptions { report_if_no_violation: true, ..Default::default() };

        let mut checker_a = Checker::new(&design);
        let report_a = checker_a.check_net(net_id, &opts).unwrap();
        let mut checker_b = Checker::new(&design);
        let report_b = checker_b.check_net(net_id, &opts).unwrap();

        match (report_a, report_b) {
            (
                NetReport::Checked { net_violation: nva, pin_violation_count: pva, lines: la, .. },
                NetReport::Checked { net_violation: nvb, pin_violation_count: pvb, lines: lb, .. },
            ) => {
                prop_assert_eq!(nva, nvb);
                prop_assert_eq!(pva, pvb);
                prop_assert_eq!(la, lb);
            }
            _ => prop_assert!(false, "net unexpectedly skipped"),
        }
    }

    /// Invariant 4: raising ratioMargin never clears a violation that held
    /// at margin 0 against a nonzero fixed threshold (margin only shrinks
    /// the effective threshold).
    #[test]
    fn raising_margin_keeps_fixed_violations(
        (wire_len, gate_area, par) in arb_ratio_inputs(),
        margin in 1.0..90.0f64,
    ) {
        let (design, net_id) = design_with(wire_len, gate_area, par, 1);
        let mut checker = Checker::new(&design);
        let base = checker.check_net(net_id, &CheckOptions::default()).unwrap();
        let base_violated = matches!(base, NetReport::Checked { net_violation: true, .. });

        if base_violated {
            let opts = CheckOptions { ratio_margin: margin, ..Default::default() };
            let mut checker2 = Checker::new(&design);
            let with_margin = checker2.check_net(net_id, &opts).unwrap();
            prop_assert!(matches!(with_margin, NetReport::Checked { net_violation: true, .. }));
        }
    }

    /// Invariant 5: supplying a diode mterm never changes net/pin
    /// violation counts, only the returned violation list.
    #[test]
    fn diode_mterm_does_not_change_violation_counts(
        (wire_len, gate_area, par) in arb_ratio_inputs(),
        diode_diff in 0.1..50.0f64,
    ) {
        let (design, net_id) = design_with(wire_len, gate_area, par, 1);

        let mut checker_plain = Checker::new(&design);
        let plain = checker_plain.check_net(net_id, &CheckOptions::default()).unwrap();

        let mut diode = Mterm::default();
        diode.diff_area.insert(1, diode_diff);
        let opts = CheckOptions { diode_mterm: Some(diode), ..Default::default() };
        let mut checker_diode = Checker::new(&design);
        let with_diode = checker_diode.check_net(net_id, &opts).unwrap();

        match (plain, with_diode) {
            (
                NetReport::Checked { net_violation: nv1, pin_violation_count: pv1, .. },
                NetReport::Checked { net_violation: nv2, pin_violation_count: pv2, .. },
            ) => {
                prop_assert_eq!(nv1, nv2);
                prop_assert_eq!(pv1, pv2);
            }
            _ => prop_assert!(false, "net unexpectedly skipped"),
        }
    }
}

/// Invariant 6 (same-layer slice): islands merged on one layer by a direct
/// touching connection get the gate attached to every merged island, since
/// same-layer merges happen before that layer's gate_sets snapshot is
/// frozen (unlike cross-layer vias, which freeze first and merge after).
#[test]
fn same_layer_touching_islands_share_gate_set() {
    use antcheck::connectivity;
    use antcheck::geometry;

    let layer = Layer {
        id: 1,
        name: "M1".into(),
        routing_level: 1,
        dir: Dir::Horizontal,
        width: 1.0,
        thickness: 1.0,
        rule: Some(AntennaRule::default()),
        lower: None,
        upper: None,
    };
    let mut mterm = Mterm::default();
    mterm.is_input = true;
    mterm.gate_area.insert(1, 20.0);
    let net = Net {
        id: 0,
        name: "n".into(),
        special: false,
        // Two touching segments forming one island, plus a footprint
        // touching only the first one.
        wires: vec![
            WireSeg { layer: 1, rect: rt(0.0, 0.0, 5.0, 1.0) },
            WireSeg { layer: 1, rect: rt(5.0, 0.0, 10.0, 1.0) },
        ],
        vias: vec![],
        iterms: vec![Iterm { id: 0, name: "g".into(), mterm, footprints: vec![(1, rt(-1.0, 0.0, 0.0, 1.0))] }],
    };
    let design = Design::new(vec![layer], vec![net.clone()], 1000.0);
    let graph = geometry::build(&design, &net);
    let conn = connectivity::compute(&design, &net, &graph);

    assert_eq!(graph.by_layer[&1].len(), 1, "touching segments should merge into one island");
    let island = graph.by_layer[&1][0];
    assert_eq!(conn.gates_on(island), &[0]);
}
