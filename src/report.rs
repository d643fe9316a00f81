//! Renders the exact report text of spec.md §6 Outputs and sinks it to the
//! logger and/or a file, mirroring the teacher's separation between an
//! in-memory result and the side-effecting application of that result.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use eyre::{Context, Result};

/// A single rule check's rendered line pair, e.g. "Partial area ratio" /
/// "Required ratio ... (Gate area)".
#[derive(Debug, Clone)]
pub struct CheckLine {
    pub measured_label: &'static str,
    pub measured: f64,
    pub required_label: &'static str,
    pub required: f64,
    pub violated: bool,
}

impl CheckLine {
    pub fn render(&self, indent: &str) -> Vec<String> {
        vec![
            format!("{indent}{}:   {:.2}", self.measured_label, self.measured),
            format!(
                "{indent}Required ratio:       {:.2} ({}){}",
                self.required,
                self.required_label,
                if self.violated { " (VIOLATED)" } else { "" }
            ),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct LayerBlock {
    pub layer_name: String,
    pub lines: Vec<CheckLine>,
}

#[derive(Debug, Clone)]
pub struct PinBlock {
    pub gate_name: String,
    pub layers: Vec<LayerBlock>,
}

#[derive(Debug, Clone)]
pub struct NetBlock {
    pub net_name: String,
    pub pins: Vec<PinBlock>,
}

pub fn render(block: &NetBlock) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Net: {}", block.net_name));
    for pin in &block.pins {
        lines.push(format!("  Pin: {}", pin.gate_name));
        for layer in &pin.layers {
            lines.push(format!("    Layer: {}", layer.layer_name));
            for check in &layer.lines {
                for l in check.render("        ") {
                    lines.push(l);
                }
            }
        }
        lines.push(String::new());
    }
    lines.push(String::new());
    lines
}

/// Where rendered report text goes: the logger, a file, both, or neither.
/// Mirrors the teacher's `RouteResult` vs. its side-effecting consumer
/// split — the returned violation list (see `checker.rs`) is independent
/// of whichever sinks are configured here.
#[derive(Debug, Default)]
pub struct ReportSink {
    pub to_log: bool,
    pub file: Option<PathBuf>,
}

impl ReportSink {
    pub fn log() -> Self {
        Self { to_log: true, file: None }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self { to_log: false, file: Some(path.into()) }
    }

    pub fn emit(&self, lines: &[String]) -> Result<()> {
        if self.to_log {
            for l in lines {
                log::info!("{l}");
            }
        }
        if let Some(path) = &self.file {
            let mut f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("opening report file {}", path.display()))?;
            for l in lines {
                writeln!(f, "{l}").wrap_err("writing report line")?;
            }
        }
        Ok(())
    }
}
