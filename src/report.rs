//! Report output for the CLI frontend.
//!
//! Every report renders either as a plain-text table (via `Display`) or as
//! JSON, and is written to stdout.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::analysis::{Bisection, FrequencyPoint, StabilityMargins};
use crate::circuit::Plant;
use crate::compensator::{Compensator, Design};
use crate::error::{PowerloopError, Result};

/// Bode table of one response.
#[derive(Debug, Serialize)]
pub struct SweepReport<'a> {
    /// What was swept (`plant`, `open loop`, ...)
    pub response: &'a str,
    pub points: &'a [FrequencyPoint],
}

impl fmt::Display for SweepReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} ({} points)", self.response, self.points.len())?;
        writeln!(f, "{:>14} {:>12} {:>12}", "freq_hz", "gain_db", "phase_deg")?;
        for p in self.points {
            writeln!(f, "{:>14.3} {:>12.4} {:>12.4}", p.frequency_hz, p.gain_db, p.phase_deg)?;
        }
        Ok(())
    }
}

/// Margins of the bare plant or of a compensated loop.
#[derive(Debug, Serialize)]
pub struct MarginsReport<'a> {
    pub plant: &'a Plant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compensator: Option<&'a Compensator>,
    pub margins: &'a StabilityMargins,
}

impl fmt::Display for MarginsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_plant(f, self.plant)?;
        if let Some(compensator) = self.compensator {
            writeln!(f, "compensator      {} {:?}", compensator.kind(), compensator.params())?;
        }
        write_margins(f, self.margins)
    }
}

/// A synthesized compensator and its verification.
#[derive(Debug, Serialize)]
pub struct DesignReport<'a> {
    pub plant: &'a Plant,
    pub design: &'a Design,
    pub verification: &'a StabilityMargins,
    pub closed_loop_bandwidth: &'a Bisection,
}

impl fmt::Display for DesignReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_plant(f, self.plant)?;
        writeln!(f, "compensator      {}", self.design.kind())?;
        match self.design {
            Design::Type1(d) => {
                writeln!(f, "  Ki             {:.6e}", d.ki)?;
            }
            Design::Type2(d) => {
                writeln!(f, "  Kp             {:.6e}", d.kp)?;
                writeln!(f, "  Ki             {:.6e}", d.ki)?;
                writeln!(f, "  zero           {:.3} Hz", d.zero_hz)?;
                writeln!(f, "  phase boost    {:.2}° (required)", d.required_phase_boost_deg)?;
            }
            Design::Type3(d) => {
                writeln!(f, "  Kp             {:.6e}", d.kp)?;
                writeln!(f, "  Ki             {:.6e}", d.ki)?;
                writeln!(f, "  Kd             {:.6e}", d.kd)?;
                writeln!(f, "  zeros          {:.3} Hz, {:.3} Hz", d.zero1_hz, d.zero2_hz)?;
                writeln!(f, "  poles          {:.3} Hz, {:.3} Hz", d.pole1_hz, d.pole2_hz)?;
                writeln!(f, "  phase boost    {:.2}° (required)", d.required_phase_boost_deg)?;
            }
        }
        writeln!(f, "target crossover {:.3} Hz", self.design.crossover_hz())?;
        writeln!(f, "verification")?;
        write_margins(f, self.verification)?;
        write_search(f, "bandwidth", self.closed_loop_bandwidth)
    }
}

fn write_plant(f: &mut fmt::Formatter<'_>, plant: &Plant) -> fmt::Result {
    writeln!(
        f,
        "plant            R={} L={} C={}",
        fmt_value(plant.resistance),
        fmt_value(plant.inductance),
        fmt_value(plant.capacitance)
    )?;
    if let (Some(f0), Some(q)) = (plant.natural_frequency_hz(), plant.quality_factor()) {
        writeln!(f, "  f0             {:.3} Hz", f0)?;
        writeln!(f, "  Q              {:.3}", q)?;
    }
    Ok(())
}

fn write_margins(f: &mut fmt::Formatter<'_>, margins: &StabilityMargins) -> fmt::Result {
    write_search(f, "crossover", &margins.crossover)?;
    write_search(f, "phase -180°", &margins.phase_crossover)?;
    writeln!(f, "  phase margin   {:.2}°", margins.phase_margin_deg)?;
    writeln!(f, "    signed       {:.2}°", margins.signed_phase_margin_deg)?;
    writeln!(f, "  gain margin    {:.2} dB", margins.gain_margin_db)?;
    writeln!(f, "  stable         {}", if margins.is_stable() { "yes" } else { "no" })
}

fn write_search(f: &mut fmt::Formatter<'_>, label: &str, search: &Bisection) -> fmt::Result {
    write!(f, "  {:<14} {:.3} Hz", label, search.frequency_hz)?;
    if search.converged {
        writeln!(f)
    } else {
        writeln!(f, " (not converged after {} iterations)", search.iterations)
    }
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:e}"))
}

/// Render a report as text or pretty JSON.
pub fn render<T>(report: &T, json: bool) -> Result<String>
where
    T: Serialize + fmt::Display,
{
    if json {
        serde_json::to_string_pretty(report).map_err(|e| PowerloopError::OutputError {
            message: e.to_string(),
        })
    } else {
        Ok(report.to_string())
    }
}

/// Write rendered output to stdout.
pub fn emit(output: &str) -> Result<()> {
    write_stdout(output).map_err(|e| PowerloopError::OutputError {
        message: e.to_string(),
    })
}

fn write_stdout(output: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", output.trim_end_matches('\n'))?;
    stdout.flush()
}
