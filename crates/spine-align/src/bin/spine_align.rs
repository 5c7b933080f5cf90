//! spine-align CLI: plan annotated cases and grade manually entered values.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use spine_align::measure::{CervicalMeasurements, LumbarMeasurements, Measurements};
use spine_align::targets::{compute_targets, AgeBucket, TargetPlan, NORMS};
use spine_align::{catalog_report, plan, CaseConfig, ClinicalParameter, PlanReport, Region};

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "spine-align")]
#[command(about = "Sagittal spine alignment: measurements, age-adjusted targets and correction preview")]
#[command(version)]
struct Cli {
    /// Log level: off, error, warn, info, debug, trace.
    /// Defaults to `SPINE_ALIGN_LOG`, then `info`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan an annotated case from a JSON case file.
    Plan(PlanArgs),

    /// Print the landmark catalog of a region.
    Catalog {
        #[arg(long)]
        region: Region,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Grade typed-in measurements without landmarks.
    Targets(TargetsArgs),
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Path to the case JSON.
    #[arg(long)]
    case: PathBuf,

    /// Report path; defaults to the case's `output_path`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Override the patient age from the case file.
    #[arg(long)]
    age: Option<f64>,
}

#[derive(Debug, Args)]
struct TargetsArgs {
    #[arg(long)]
    region: Region,

    /// Patient age in years.
    #[arg(long)]
    age: f64,

    /// Cervical lordosis, degrees (lordosis negative).
    #[arg(long, allow_hyphen_values = true)]
    cl: Option<f64>,
    /// Cervical SVA, mm.
    #[arg(long)]
    csva: Option<f64>,
    /// T1 slope, degrees.
    #[arg(long, allow_hyphen_values = true)]
    t1s: Option<f64>,
    /// Chin-brow vertical angle, degrees.
    #[arg(long, allow_hyphen_values = true)]
    cbva: Option<f64>,

    /// Lumbar lordosis, degrees.
    #[arg(long, allow_hyphen_values = true)]
    ll: Option<f64>,
    /// Sagittal vertical axis, mm.
    #[arg(long, allow_hyphen_values = true)]
    sva: Option<f64>,
    /// Pelvic incidence, degrees.
    #[arg(long)]
    pi: Option<f64>,
    /// Pelvic tilt, degrees.
    #[arg(long, allow_hyphen_values = true)]
    pt: Option<f64>,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl TargetsArgs {
    fn measurements(&self) -> CliResult<Measurements> {
        let v = |x: Option<f64>| x.unwrap_or(f64::NAN);
        match self.region {
            Region::Cervical => {
                if self.ll.or(self.sva).or(self.pi).or(self.pt).is_some() {
                    return Err("--ll/--sva/--pi/--pt only apply to --region lumbar".into());
                }
                Ok(Measurements::Cervical(CervicalMeasurements {
                    cl: v(self.cl),
                    csva: v(self.csva),
                    t1s: v(self.t1s),
                    cbva: v(self.cbva),
                }))
            }
            Region::Lumbar => {
                if self.cl.or(self.csva).or(self.t1s).or(self.cbva).is_some() {
                    return Err("--cl/--csva/--t1s/--cbva only apply to --region cervical".into());
                }
                Ok(Measurements::Lumbar(LumbarMeasurements {
                    ll: v(self.ll),
                    sva: v(self.sva),
                    pi: v(self.pi),
                    pt: v(self.pt),
                }))
            }
        }
    }
}

fn init_logging(level: Option<&str>) -> CliResult<()> {
    #[cfg(feature = "tracing")]
    {
        let _ = level;
        let _ = LogTracer::init();
        spine_align::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let level = match level {
            Some(name) => spine_align::core::parse_level_filter(name)
                .ok_or_else(|| format!("invalid --log-level `{name}`"))?,
            None => spine_align::core::level_from_env().unwrap_or(log::LevelFilter::Info),
        };
        spine_align::core::init_with_level(level)?;
    }
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Plan(args) => run_plan(&args),
        Commands::Catalog { region, json } => run_catalog(region, json),
        Commands::Targets(args) => run_targets(&args),
    }
}

fn run_plan(args: &PlanArgs) -> CliResult<()> {
    log::info!("loading case {}", args.case.display());
    let mut case = CaseConfig::load_json(&args.case)?;
    if let Some(age) = args.age {
        case.age = age;
    }
    let out = args.out.clone().unwrap_or_else(|| case.output_path());

    let session = match case.build_session() {
        Ok(session) => session,
        Err(err) => {
            PlanReport::failed(case, &err).write_json(&out)?;
            log::error!("invalid case: {err} (report written to {})", out.display());
            return Err(err.into());
        }
    };

    let result = plan(&session, &case.simulation_params());
    print_parameters(&result.targets, case.age);
    PlanReport::from_result(case, &result).write_json(&out)?;
    log::info!("report written to {}", out.display());
    Ok(())
}

fn run_catalog(region: Region, json: bool) -> CliResult<()> {
    let rows = catalog_report(region);
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    println!("{region} landmarks ({})", rows.len());
    for row in rows {
        println!("  {:>2}  {:<12} {}", row.index + 1, row.short_label, row.label);
    }
    Ok(())
}

fn run_targets(args: &TargetsArgs) -> CliResult<()> {
    let measurements = args.measurements()?;
    let targets = compute_targets(&measurements, args.age);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
    } else {
        print_parameters(&targets, args.age);
    }
    Ok(())
}

fn print_parameters(targets: &TargetPlan, age: f64) {
    println!(
        "{} targets, age {age} ({}), norms {}",
        targets.region(),
        AgeBucket::from_age(age).label(),
        NORMS.version
    );
    for p in targets.parameters() {
        print_row(p);
    }
    println!("overall severity: {}", targets.overall());
}

fn print_row(p: &ClinicalParameter) {
    let severity = p.severity.as_ref().map_or("--", |s| s.text.as_str());
    println!(
        "  {:<34} {:>9}  target {:<14} {:<22} {}",
        p.label,
        p.display_current(),
        p.target_expression,
        severity,
        p.correction_text
    );
}
