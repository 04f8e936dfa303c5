//! Powerloop - Converter Loop Analysis
//!
//! Bode sweeps, stability margins and compensator design for the R-L-C
//! output filter of a switching converter.
//!
//! # Usage
//!
//! ```bash
//! powerloop buck.plc sweep --start 10 --end 1M --points 60
//! powerloop buck.plc margins --compensator type2 --params 2.95,18500
//! powerloop buck.plc design --type type3 --crossover 10k --phase-margin 50 --json
//! ```
//!
//! Set `RUST_LOG=powerloop_core=debug` to trace the searches on stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use powerloop_core::{
    analysis::{frequency_sweep_of, PlantAnalyzer},
    circuit::{validate_schematic, Schematic},
    compensator::{CompensatedLoop, Compensator, CompensatorDesigner, CompensatorType},
    dsl::{self, DEFAULT_PHASE_MARGIN_DEG},
    error::{PowerloopError, Result},
    report::{self, DesignReport, MarginsReport, SweepReport},
    DEFAULT_SEARCH_END_HZ, DEFAULT_SEARCH_START_HZ,
};

/// Default number of sweep points when neither the file nor the command line
/// gives one: ten per decade over the default search bounds.
const DEFAULT_SWEEP_POINTS: usize = 61;

/// Frequency-domain loop analysis for switching power converters
#[derive(Parser, Debug)]
#[command(name = "powerloop", author, version, about, long_about = None)]
struct Args {
    /// Path to the plant description file (.plc)
    #[arg(value_name = "PLANT_FILE")]
    plant_file: PathBuf,

    /// Print JSON instead of a text report
    #[arg(long, global = true)]
    json: bool,

    /// Fail when a search runs out of iterations instead of reporting its
    /// best estimate
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bode table of the plant, or of the open loop with a compensator
    Sweep {
        /// First frequency (Hz, SI suffixes allowed)
        #[arg(long, value_parser = parse_number)]
        start: Option<f64>,
        /// Last frequency (Hz)
        #[arg(long, value_parser = parse_number)]
        end: Option<f64>,
        /// Number of log-spaced points
        #[arg(long)]
        points: Option<usize>,
        #[command(flatten)]
        compensator: CompensatorArgs,
    },
    /// Crossover, phase margin and gain margin
    Margins {
        #[command(flatten)]
        compensator: CompensatorArgs,
    },
    /// Design a compensator and verify it on the open loop
    Design {
        /// type1, type2 or type3
        #[arg(long = "type", value_parser = parse_compensator)]
        kind: Option<CompensatorType>,
        /// Target crossover frequency (Hz)
        #[arg(long, value_parser = parse_number)]
        crossover: Option<f64>,
        /// Target phase margin (degrees)
        #[arg(long, value_parser = parse_number, allow_negative_numbers = true)]
        phase_margin: Option<f64>,
    },
}

#[derive(clap::Args, Debug)]
struct CompensatorArgs {
    /// Close the loop with this compensator (type1, type2, type3)
    #[arg(long, value_parser = parse_compensator, requires = "params")]
    compensator: Option<CompensatorType>,
    /// Comma-separated compensator parameters: Ki | Kp,Ki | Kp,Ki,Kd
    #[arg(
        long,
        value_parser = parse_number,
        value_delimiter = ',',
        allow_negative_numbers = true,
        requires = "compensator"
    )]
    params: Vec<f64>,
}

impl CompensatorArgs {
    fn build(&self) -> Result<Option<Compensator>> {
        self.compensator
            .map(|kind| Compensator::new(kind, self.params.clone()))
            .transpose()
    }
}

fn parse_number(text: &str) -> std::result::Result<f64, String> {
    dsl::parse_value(text).ok_or_else(|| format!("invalid number '{text}'"))
}

fn parse_compensator(text: &str) -> std::result::Result<CompensatorType, String> {
    CompensatorType::from_keyword(text).ok_or_else(|| format!("unknown compensator type '{text}'"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse and build the schematic
    let ast = dsl::parse_file(&args.plant_file)?;
    let schematic = Schematic::from_ast(ast)?;

    let output = match &args.command {
        Command::Sweep {
            start,
            end,
            points,
            compensator,
        } => cmd_sweep(&args, &schematic, (*start, *end, *points), compensator)?,
        Command::Margins { compensator } => cmd_margins(&args, &schematic, compensator)?,
        Command::Design {
            kind,
            crossover,
            phase_margin,
        } => cmd_design(&args, &schematic, *kind, *crossover, *phase_margin)?,
    };

    report::emit(&output)
}

fn cmd_sweep(
    args: &Args,
    schematic: &Schematic,
    (start, end, points): (Option<f64>, Option<f64>, Option<usize>),
    compensator: &CompensatorArgs,
) -> Result<String> {
    let defaults = schematic.sweep;
    let start = start
        .or(defaults.map(|s| s.start_hz))
        .unwrap_or(DEFAULT_SEARCH_START_HZ);
    let end = end.or(defaults.map(|s| s.end_hz)).unwrap_or(DEFAULT_SEARCH_END_HZ);
    let points = points.or(defaults.map(|s| s.points)).unwrap_or(DEFAULT_SWEEP_POINTS);

    // Sweeps run on incomplete plants too, so no validation here
    let plant = schematic.plant();
    let (response, points) = match compensator.build()? {
        Some(c) => {
            let open_loop = CompensatedLoop::new(plant, c);
            ("open loop", frequency_sweep_of(&open_loop, start, end, points)?)
        }
        None => {
            let analyzer = PlantAnalyzer::new(plant);
            ("plant", analyzer.frequency_sweep(start, end, points)?)
        }
    };

    report::render(
        &SweepReport {
            response,
            points: &points,
        },
        args.json,
    )
}

fn cmd_margins(
    args: &Args,
    schematic: &Schematic,
    compensator: &CompensatorArgs,
) -> Result<String> {
    validate_schematic(schematic)?;
    let plant = schematic.plant();
    let compensator = compensator.build()?;

    let mut margins = match &compensator {
        Some(c) => CompensatedLoop::new(plant, c.clone()).margins(&schematic.search)?,
        None => PlantAnalyzer::with_config(plant, schematic.search)?.margins()?,
    };
    if args.strict {
        margins = margins.require_converged()?;
    }

    report::render(
        &MarginsReport {
            plant: &plant,
            compensator: compensator.as_ref(),
            margins: &margins,
        },
        args.json,
    )
}

fn cmd_design(
    args: &Args,
    schematic: &Schematic,
    kind: Option<CompensatorType>,
    crossover: Option<f64>,
    phase_margin: Option<f64>,
) -> Result<String> {
    validate_schematic(schematic)?;
    let defaults = schematic.design;
    let kind = kind
        .or(defaults.map(|d| d.compensator))
        .unwrap_or(CompensatorType::Type2);
    let crossover = crossover.or(defaults.map(|d| d.crossover_hz)).ok_or_else(|| {
        PowerloopError::invalid_range(
            "no target crossover: pass --crossover or add a .design directive",
        )
    })?;
    let phase_margin = phase_margin
        .or(defaults.map(|d| d.phase_margin_deg))
        .unwrap_or(DEFAULT_PHASE_MARGIN_DEG);

    let plant = schematic.plant();
    let designer = CompensatorDesigner::with_config(plant, schematic.search)?;
    let design = designer.design(kind, crossover, phase_margin)?;

    let compensator = design.compensator();
    let mut verification = designer.verify_design(compensator.kind(), compensator.params())?;
    let bandwidth = designer.closed_loop_bandwidth(compensator.kind(), compensator.params())?;
    if args.strict {
        verification = verification.require_converged()?;
        bandwidth.require_converged()?;
    }

    report::render(
        &DesignReport {
            plant: &plant,
            design: &design,
            verification: &verification,
            closed_loop_bandwidth: &bandwidth,
        },
        args.json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_require_compensator() {
        let result = Args::try_parse_from(["powerloop", "buck.plc", "margins", "--params", "1,2"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_compensator_requires_params() {
        let result =
            Args::try_parse_from(["powerloop", "buck.plc", "sweep", "--compensator", "type2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_compensator_with_params() {
        let args = Args::try_parse_from([
            "powerloop",
            "buck.plc",
            "margins",
            "--compensator",
            "type2",
            "--params",
            "2.95,18.5k",
        ])
        .unwrap();
        let Command::Margins { compensator } = args.command else {
            panic!("expected the margins subcommand");
        };
        let built = compensator.build().unwrap().unwrap();
        assert_eq!(built.kind(), CompensatorType::Type2);
        assert_eq!(built.params(), &[2.95, 18_500.0]);
    }
}
