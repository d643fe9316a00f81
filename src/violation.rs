//! The `Violation` record emitted per offending (gate, layer), per
//! spec.md §3.

use crate::model::net::GateId;

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub routing_level: u32,
    pub gates: Vec<GateId>,
    pub diode_count_per_gate: u32,
}
