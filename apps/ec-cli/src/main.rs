use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use ec_driver::{
    BuiltTrain, CancellationToken, InstallationProgram, build_train, compile_installation,
    resolve_simplified_train_sizing, run_time_series,
};
use ec_model::{EcalcModel, ExprContext};
use ec_turbine::TurbineCurve;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Model(#[from] ec_model::ModelError),

    #[error(transparent)]
    Driver(#[from] ec_driver::DriverError),

    #[error(transparent)]
    Turbine(#[from] ec_turbine::TurbineError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Parser)]
#[command(name = "ec-cli")]
#[command(about = "eCalc compressor-train engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a model file and persist per-installation results.
    Run {
        model_file: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFrequency::None)]
        output_frequency: OutputFrequency,
        #[arg(long)]
        output_folder: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        detailed_output: bool,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=2), default_value_t = 0)]
        date_format_option: u8,
    },
    /// Inspect a model file.
    #[command(subcommand)]
    Show(ShowCommands),
}

#[derive(Subcommand)]
enum ShowCommands {
    /// Re-serialize and print the loaded, validated model as YAML.
    Yaml { model_file: PathBuf },
    /// Print a previously persisted result set.
    Results {
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = ".")]
        output_folder: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFrequency {
    None,
    Year,
    Month,
    Day,
}

/// No time-series data source is part of the CLI contract (`spec.md` §6
/// specifies the arguments only); `run` drives each installation over a
/// single steady-state period. Installations whose expressions reference
/// `SERIES;COLUMN` data have no source to resolve against here and report
/// `Infeasible` for that period — full time-series driving is exercised
/// through `ec_driver::run_time_series` directly against a real
/// `ExprContext` (see `ec-driver`'s tests).
struct NullExprContext;

impl ExprContext for NullExprContext {
    fn time_series(&self, _series: &str, _column: &str, _period: usize) -> Option<f64> {
        None
    }

    fn variable(&self, _name: &str) -> Option<f64> {
        None
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedPeriodResult {
    period_index: usize,
    power_mw: f64,
    fuel_sm3_per_day: f64,
    status: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedInstallationResult {
    installation: String,
    periods: Vec<PersistedPeriodResult>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            model_file,
            output_frequency,
            output_folder,
            detailed_output,
            date_format_option,
        } => cmd_run(&model_file, output_frequency, output_folder.as_deref(), detailed_output, date_format_option),
        Commands::Show(ShowCommands::Yaml { model_file }) => cmd_show_yaml(&model_file),
        Commands::Show(ShowCommands::Results { name, output_folder }) => {
            cmd_show_results(name.as_deref(), &output_folder)
        }
    }
}

fn cmd_run(
    model_file: &Path,
    output_frequency: OutputFrequency,
    output_folder: Option<&Path>,
    detailed_output: bool,
    date_format_option: u8,
) -> CliResult<()> {
    tracing::info!(
        ?output_frequency,
        detailed_output,
        date_format_option,
        "running model {}",
        model_file.display()
    );
    let model: EcalcModel = ec_model::load_yaml(model_file)?;

    let output_folder = output_folder.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_folder)?;

    let ctx = NullExprContext;
    let cancellation = CancellationToken::new();

    for installation in &model.installations {
        let train_def = model
            .models
            .iter()
            .find(|m| m.name == installation.model)
            .expect("validated at load: installation.model references an existing train");

        let program: InstallationProgram = compile_installation(installation)?;

        // `spec.md` §4.E: a simplified variable-speed train whose STAGES is a
        // single template stage has its stage count N fixed from the first
        // evaluation's suction/discharge pressures and reused for the rest
        // of the run.
        let suction_bar_0 = ec_model::expr::eval(&program.suction_pressure_bar, &ctx, 0).unwrap_or(0.0);
        let discharge_bar_0 = ec_model::expr::eval(&program.discharge_pressure_bar, &ctx, 0).unwrap_or(0.0);
        let sized_train_def = resolve_simplified_train_sizing(train_def, suction_bar_0, discharge_bar_0)?;

        let built: BuiltTrain = build_train(&sized_train_def, &[])?;
        let turbine = train_def
            .fuel_type
            .as_ref()
            .and_then(|fuel_name| model.fuel_types.iter().find(|f| &f.name == fuel_name))
            .map(|fuel| TurbineCurve::new(fuel.loads_mw.clone(), fuel.efficiencies.clone(), fuel.lhv_mj_per_sm3))
            .transpose()?;
        let results = run_time_series(&program, &built, turbine.as_ref(), &ctx, 1, detailed_output, &cancellation, None)?;

        println!(
            "{}: period 0 -> power={:.3} MW, fuel={:.1} Sm3/day, status={:?}",
            installation.name, results[0].power_mw, results[0].fuel_sm3_per_day, results[0].status
        );

        let persisted = PersistedInstallationResult {
            installation: installation.name.clone(),
            periods: results
                .iter()
                .map(|r| PersistedPeriodResult {
                    period_index: r.period_index,
                    power_mw: r.power_mw,
                    fuel_sm3_per_day: r.fuel_sm3_per_day,
                    status: format!("{:?}", r.status),
                })
                .collect(),
        };
        let out_path = output_folder.join(format!("{}.json", installation.name));
        std::fs::write(&out_path, serde_json::to_string_pretty(&persisted)?)?;
    }

    Ok(())
}

fn cmd_show_yaml(model_file: &Path) -> CliResult<()> {
    let model: EcalcModel = ec_model::load_yaml(model_file)?;
    print!("{}", serde_yaml::to_string(&model)?);
    Ok(())
}

fn cmd_show_results(name: Option<&str>, output_folder: &Path) -> CliResult<()> {
    let mut found_any = false;
    for entry in std::fs::read_dir(output_folder)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let text = std::fs::read_to_string(&path)?;
        let result: PersistedInstallationResult = serde_json::from_str(&text)?;
        if let Some(filter) = name {
            if result.installation != filter {
                continue;
            }
        }
        found_any = true;
        println!("{}:", result.installation);
        for period in &result.periods {
            println!(
                "  period {}: power={:.3} MW, fuel={:.1} Sm3/day, status={}",
                period.period_index, period.power_mw, period.fuel_sm3_per_day, period.status
            );
        }
    }
    if !found_any {
        println!("No results found in {}", output_folder.display());
    }
    Ok(())
}
