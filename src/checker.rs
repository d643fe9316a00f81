//! `Checker`, per spec.md §4.5: drives the pipeline per net, compares
//! ratios to rule thresholds, optionally iterates diode counts, and emits
//! violation records and report lines.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::connectivity;
use crate::error::CheckerError;
use crate::geometry;
use crate::model::design::Design;
use crate::model::layer::AntennaRule;
use crate::model::net::{GateId, Mterm, Net, NetId};
use crate::model::pwl::Pwl;
use crate::ratio::{self, InfoRecord};
use crate::report::{CheckLine, LayerBlock, NetBlock, PinBlock, ReportSink};
use crate::rules::RuleStore;
use crate::violation::Violation;

/// The cap on diode-loop iterations per gate/layer before giving up and
/// warning (spec.md §7 `RepairSaturation`).
pub const MAX_DIODE_COUNT_PER_GATE: u32 = 16;

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub verbose: bool,
    pub report_if_no_violation: bool,
    pub diode_mterm: Option<Mterm>,
    /// Percentage reduction of fixed thresholds, in `[0, 100)`.
    pub ratio_margin: f64,
}

#[derive(Debug, Clone)]
pub enum NetReport {
    /// An explicitly-selected special net (spec.md §7 `InputError`): not a
    /// defect, just a normal "nothing to do here" outcome.
    Skipped,
    Checked { net_violation: bool, pin_violation_count: u32, violations: Vec<Violation>, lines: Vec<String> },
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub net_violation_count: u32,
    pub pin_violation_count: u32,
    pub violations: Vec<Violation>,
}

pub struct Checker<'a> {
    design: &'a Design,
    rules: RuleStore,
    sink: Option<ReportSink>,
}

impl<'a> Checker<'a> {
    pub fn new(design: &'a Design) -> Self {
        Self { design, rules: RuleStore::build(design), sink: None }
    }

    pub fn set_report_sink(&mut self, sink: Option<ReportSink>) {
        self.sink = sink;
    }

    pub fn check_net(&mut self, net_id: NetId, opts: &CheckOptions) -> Result<NetReport, CheckerError> {
        if !self.design.has_any_routes() {
            return Err(CheckerError::NoRoutes);
        }
        let net = self.design.net(net_id).ok_or(CheckerError::UnknownNet(net_id))?;
        if net.special {
            log::info!("net {} skipped: explicitly selected special net", net.name);
            return Ok(NetReport::Skipped);
        }
        let report = self.check_net_inner(net, opts);
        self.emit(&report);
        Ok(report)
    }

    pub fn check_all_nets(&mut self, opts: &CheckOptions) -> Result<RunReport, CheckerError> {
        if !self.design.has_any_routes() {
            return Err(CheckerError::NoRoutes);
        }
        let mut run = RunReport::default();
        for net in self.design.routable_nets() {
            let report = self.check_net_inner(net, opts);
            self.emit(&report);
            fold_into(&mut run, report);
        }
        Ok(run)
    }

    /// Optional net-level parallel convenience (spec.md §5, §11.5): the
    /// per-net pipeline only touches the immutable `RuleStore` and the
    /// read-only `Design`, so nets can be scattered across a rayon pool.
    /// Report lines are still handed to the sink in net-iteration order
    /// afterwards, so report determinism is unaffected by scheduling.
    pub fn check_all_nets_parallel(&mut self, opts: &CheckOptions) -> Result<RunReport, CheckerError> {
        if !self.design.has_any_routes() {
            return Err(CheckerError::NoRoutes);
        }
        use rayon::prelude::*;
        let nets: Vec<&Net> = self.design.routable_nets().collect();
        let reports: Vec<NetReport> = nets.par_iter().map(|net| self.check_net_inner(net, opts)).collect();
        let mut run = RunReport::default();
        for report in reports {
            self.emit(&report);
            fold_into(&mut run, report);
        }
        Ok(run)
    }

    fn emit(&self, report: &NetReport) {
        if let (NetReport::Checked { lines, .. }, Some(sink)) = (report, &self.sink) {
            if let Err(e) = sink.emit(lines) {
                log::warn!("failed to write antenna report: {e:#}");
            }
        }
    }

    fn check_net_inner(&self, net: &Net, opts: &CheckOptions) -> NetReport {
        if net.is_empty_route() {
            let lines = if opts.report_if_no_violation { crate::report::render(&NetBlock { net_name: net.name.clone(), pins: vec![] }) } else { Vec::new() };
            return NetReport::Checked { net_violation: false, pin_violation_count: 0, violations: Vec::new(), lines };
        }

        let graph = geometry::build(self.design, net);
        let conn = connectivity::compute(self.design, net, &graph);
        let mut records = ratio::compute_info_records(self.design, net, &graph, &conn, &self.rules);
        ratio::compute_cumulative(self.design, net, &graph, &conn, &mut records);

        let gate_names: HashMap<GateId, &str> = net.gates().map(|g| (g.id, g.name.as_str())).collect();

        let mut by_gate: BTreeMap<GateId, Vec<usize>> = BTreeMap::new();
        for (i, r) in records.iter().enumerate() {
            by_gate.entry(r.gate).or_default().push(i);
        }

        let mut pin_blocks = Vec::new();
        let mut violating_gates: HashSet<GateId> = HashSet::new();
        let mut violations = Vec::new();

        for (&gate_id, idxs) in &by_gate {
            let mut layer_blocks = Vec::new();
            let mut gate_violated = false;

            for &i in idxs {
                let rec = &records[i];
                let Some(layer) = self.design.layer(rec.layer) else { continue };
                let Some(rule) = &layer.rule else { continue };

                let (block, violated) = build_layer_block(rec, rule, layer.is_via(), opts.ratio_margin, &layer.name);
                if violated {
                    gate_violated = true;
                }

                if layer.is_metal() && violated {
                    if let Some(diode_mterm) = &opts.diode_mterm {
                        if let Some(v) = run_diode_loop(self, &layer, rec, diode_mterm) {
                            violations.push(v);
                        }
                    }
                }

                if let Some(block) = block {
                    if violated || opts.verbose {
                        layer_blocks.push(block);
                    }
                }
            }

            if gate_violated {
                violating_gates.insert(gate_id);
            }
            if !layer_blocks.is_empty() {
                let gate_name = gate_names.get(&gate_id).copied().unwrap_or("?").to_string();
                pin_blocks.push(PinBlock { gate_name, layers: layer_blocks });
            }
        }

        let net_violation = !violating_gates.is_empty();
        let pin_violation_count = violating_gates.len() as u32;

        let lines = if net_violation || opts.report_if_no_violation {
            crate::report::render(&NetBlock { net_name: net.name.clone(), pins: pin_blocks })
        } else {
            Vec::new()
        };

        NetReport::Checked { net_violation, pin_violation_count, violations, lines }
    }
}

fn fold_into(run: &mut RunReport, report: NetReport) {
    if let NetReport::Checked { net_violation, pin_violation_count, violations, .. } = report {
        run.net_violation_count += net_violation as u32;
        run.pin_violation_count += pin_violation_count;
        run.violations.extend(violations);
    }
}

/// One fixed-or-PWL threshold check, per spec.md §4.5: "fixed-ratio if the
/// fixed threshold is nonzero, else PWL-diff threshold if it is nonzero,
/// else skipped". Fixed thresholds are scaled down by `ratio_margin`.
fn check_ratio(
    fixed: f64,
    diff_pwl: &Pwl,
    gd: f64,
    measured_fixed: f64,
    measured_diff: f64,
    ratio_margin: f64,
) -> Option<(f64, f64, bool)> {
    if fixed != 0.0 {
        let required = fixed * (1.0 - ratio_margin / 100.0);
        Some((measured_fixed, required, measured_fixed > required))
    } else if !diff_pwl.is_empty() {
        let required = diff_pwl.eval(gd, 0.0);
        Some((measured_diff, required, measured_diff > required))
    } else {
        None
    }
}

/// The diode loop's PAR/PSR-only recheck (spec.md §4.5 step 3) always
/// compares the diffusion-dependent measured value against the `diffPAR`/
/// `diffPSR` PWL threshold, never the fixed threshold: a fixed threshold
/// is purely geometric (`metal_factor * A / Gg`, independent of `Gd`), so
/// no amount of added diode diffusion area could ever move it — only the
/// PWL-diff formulas depend on `Gd`. A rule with a fixed threshold but no
/// PWL table therefore cannot be resolved by diode insertion and is left
/// failing until the loop hits its cap. A rule with neither threshold is
/// not applicable and never blocks the loop.
fn diode_recheck_ok(fixed: f64, diff_pwl: &Pwl, gd: f64, diff_measured: f64) -> bool {
    let applicable = fixed != 0.0 || !diff_pwl.is_empty();
    if !applicable {
        return true;
    }
    if diff_pwl.is_empty() {
        false
    } else {
        diff_measured <= diff_pwl.eval(gd, 0.0)
    }
}

fn build_layer_block(
    rec: &InfoRecord,
    rule: &AntennaRule,
    is_via: bool,
    ratio_margin: f64,
    layer_name: &str,
) -> (Option<LayerBlock>, bool) {
    let mut lines = Vec::new();
    let mut violated = false;

    if let Some((m, r, v)) = check_ratio(rule.par, &rule.diff_par, rec.iterm_diff_area, rec.par, rec.diff_par, ratio_margin) {
        violated |= v;
        lines.push(CheckLine { measured_label: "Partial area ratio", measured: m, required_label: "Gate area", required: r, violated: v });
    }
    if !is_via {
        if let Some((m, r, v)) = check_ratio(rule.psr, &rule.diff_psr, rec.iterm_diff_area, rec.psr, rec.diff_psr, ratio_margin) {
            violated |= v;
            lines.push(CheckLine {
                measured_label: "Partial side-area ratio",
                measured: m,
                required_label: "Side area",
                required: r,
                violated: v,
            });
        }
    }
    if let Some((m, r, v)) = check_ratio(rule.car, &rule.diff_car, rec.iterm_diff_area, rec.car, rec.diff_car, ratio_margin) {
        violated |= v;
        lines.push(CheckLine {
            measured_label: "Cumulative area ratio",
            measured: m,
            required_label: "Cumulative area",
            required: r,
            violated: v,
        });
    }
    if !is_via {
        if let Some((m, r, v)) = check_ratio(rule.csr, &rule.diff_csr, rec.iterm_diff_area, rec.csr, rec.diff_csr, ratio_margin) {
            violated |= v;
            lines.push(CheckLine {
                measured_label: "Cumulative side-area ratio",
                measured: m,
                required_label: "Cumulative side area",
                required: r,
                violated: v,
            });
        }
    }

    if lines.is_empty() {
        (None, false)
    } else {
        (Some(LayerBlock { layer_name: layer_name.to_string(), lines }), violated)
    }
}

/// Spec.md §4.5 step 3: iteratively sizes the diode count needed to clear
/// PAR and PSR on one violating (gate, layer) record, without touching
/// CAR/CSR (left un-recomputed — see `DESIGN.md`'s resolution of the
/// corresponding open question).
fn run_diode_loop(
    checker: &Checker<'_>,
    layer: &crate::model::layer::Layer,
    rec: &InfoRecord,
    diode_mterm: &Mterm,
) -> Option<Violation> {
    let model = checker.rules.model(layer.id)?;
    let rule = layer.rule.as_ref()?;
    let diode_diff = diode_mterm.diff_area_max();
    let k = rec.gate_count.max(1) as f64;

    let mut gd = rec.iterm_diff_area;
    let mut count = 0u32;
    loop {
        let (_, _, diff_par, diff_psr) =
            ratio::par_psr(layer, model, &rule.area_diff_reduce, rec.area, rec.side_area, rec.iterm_gate_area, gd);
        let par_ok = diode_recheck_ok(rule.par, &rule.diff_par, gd, diff_par);
        let psr_ok = diode_recheck_ok(rule.psr, &rule.diff_psr, gd, diff_psr);
        if par_ok && psr_ok {
            break;
        }
        gd += diode_diff * k;
        count += 1;
        if count > MAX_DIODE_COUNT_PER_GATE {
            log::warn!(
                "diode loop for gate on layer {} exceeded the cap of {} diodes; recording current count and continuing",
                layer.name,
                MAX_DIODE_COUNT_PER_GATE
            );
            break;
        }
    }

    if count > 0 {
        Some(Violation { routing_level: layer.routing_level, gates: vec![rec.gate], diode_count_per_gate: count })
    } else {
        None
    }
}
