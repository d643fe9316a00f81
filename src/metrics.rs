//! Named metrics accumulated across a `checkAllNets` run, per spec.md §6
//! Outputs ("also exposed as named metrics").

#[derive(Debug, Clone, Copy, Default)]
pub struct Counters {
    pub net_violation_count: u32,
    pub pin_violation_count: u32,
}

impl Counters {
    pub fn record_net(&mut self, net_had_violation: bool, pins_with_violation: u32) {
        if net_had_violation {
            self.net_violation_count += 1;
        }
        self.pin_violation_count += pins_with_violation;
    }

    pub fn log_summary(&self) {
        log::info!(
            "antenna check complete: {} nets, {} pins with violations",
            self.net_violation_count,
            self.pin_violation_count
        );
    }
}
