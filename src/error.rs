use thiserror::Error;

use crate::model::net::NetId;

/// The one fatal error kind from spec.md §7 (`PreconditionError`). The
/// other four kinds (`DataWarning`, `InputError`, `RepairSaturation`,
/// `RuleGap`) are non-fatal by policy and are modelled elsewhere: the first
/// and last as `log::warn!` records, `InputError` as `NetReport::Skipped`,
/// and `RepairSaturation` as a warning plus the diode count recorded as-is.
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("no routes exist in the design: neither global nor detailed routing has run")]
    NoRoutes,
    #[error("unknown net {0}")]
    UnknownNet(NetId),
}
