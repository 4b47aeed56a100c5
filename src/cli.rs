//! The command line interface for AutoDengue.
use crate::dashboard::Dashboard;
use crate::district::find_district;
use crate::log;
use crate::output::metadata::write_metadata;
use crate::output::{DataWriter, create_output_directory, get_output_dir};
use crate::settings::Settings;
use crate::status::{DistrictStatus, Overview, assess_all, simulate_district};
use crate::weather::{WeatherInputs, describe_ranges, weather_from_options};
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for AutoDengue.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// Weather conditions for the simulate command.
///
/// Omitted values are set to their calibration reference.
#[derive(Args, Default)]
pub struct WeatherOpts {
    /// Rainfall in mm
    #[arg(long)]
    pub rainfall: Option<f64>,
    /// Temperature in °C
    #[arg(long, allow_negative_numbers = true)]
    pub temperature: Option<f64>,
    /// Relative humidity in %
    #[arg(long)]
    pub humidity: Option<f64>,
    /// Wind speed in km/h
    #[arg(long)]
    pub wind: Option<f64>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Assess every district of a dashboard and write the results.
    Run {
        /// Path to the dashboard directory.
        dashboard_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Validate a dashboard.
    Validate {
        /// The path to the dashboard directory.
        dashboard_dir: PathBuf,
    },
    /// Project a district's forecast under different weather.
    Simulate {
        /// The path to the dashboard directory.
        dashboard_dir: PathBuf,
        /// The name of the district (case-insensitive).
        district: String,
        /// The weather to simulate
        #[command(flatten)]
        weather: WeatherOpts,
    },
    /// Manage example dashboards.
    Example {
        /// The available subcommands for managing example dashboards.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run {
                dashboard_dir,
                opts,
            } => handle_run_command(&dashboard_dir, &opts, None),
            Self::Validate { dashboard_dir } => handle_validate_command(&dashboard_dir, None),
            Self::Simulate {
                dashboard_dir,
                district,
                weather,
            } => handle_simulate_command(&dashboard_dir, &district, &weather, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start AutoDengue
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ autodengue --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn settings_or_load(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Log the status of one district
fn log_district_status(status: &DistrictStatus) {
    match &status.forecast {
        Ok(forecast) => info!(
            "{}: {} ({} predicted, model {} {})",
            status.district,
            forecast.assessment.tier,
            forecast.cases,
            status.model_name,
            status.accuracy
        ),
        // The reason has already been logged as a warning
        Err(_) => info!("{}: UNAVAILABLE", status.district),
    }
}

/// Handle the `run` command.
pub fn handle_run_command(
    dashboard_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = settings_or_load(settings)?;

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(dashboard_path)?;
        &pathbuf
    };

    let overwrite = create_output_directory(output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    log::init(settings.log_level, Some(output_path))
        .context("Failed to initialise logging.")?;

    let dashboard = Dashboard::from_path(dashboard_path).context("Failed to load dashboard.")?;
    info!("Loaded dashboard \"{}\" from {}", dashboard.title, dashboard_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    write_metadata(output_path, &dashboard).context("Failed to save metadata.")?;

    let statuses = assess_all(&dashboard);
    for status in &statuses {
        log_district_status(status);
    }

    let overview = Overview::from_statuses(&statuses);
    info!(
        "Forecast total: {} cases; {} high risk district(s); {} of {} district(s) available",
        overview.total_forecast_cases,
        overview.high_risk_districts,
        overview.available,
        statuses.len()
    );

    let writer = DataWriter::create(output_path);
    writer
        .write_district_statuses(&statuses)
        .context("Failed to write district statuses.")?;
    for status in &statuses {
        // Unavailable districts have no chart
        if let Ok(forecast) = &status.forecast {
            writer
                .write_trend(&status.district, &forecast.trend)
                .with_context(|| {
                    format!("Failed to write trend for district {}.", status.district)
                })?;
        }
    }
    info!("Run complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(dashboard_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = settings_or_load(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(settings.log_level, None).context("Failed to initialise logging.")?;

    let dashboard = Dashboard::from_path(dashboard_path).context("Failed to validate dashboard.")?;
    info!(
        "Dashboard validation successful! {} district(s) configured",
        dashboard.districts.len()
    );

    Ok(())
}

/// The warning to show when simulated weather lies outside the simulator control ranges.
///
/// Such values are still simulated.
pub fn out_of_range_warning(weather: &WeatherInputs) -> Option<String> {
    let out_of_range = weather.out_of_range();
    if out_of_range.is_empty() {
        return None;
    }

    Some(format!(
        "Outside the usual simulator range: {} (usual ranges: {})",
        out_of_range.join(", "),
        describe_ranges()
    ))
}

/// Handle the `simulate` command.
pub fn handle_simulate_command(
    dashboard_path: &Path,
    district_name: &str,
    opts: &WeatherOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = settings_or_load(settings)?;
    log::init(settings.log_level, None).context("Failed to initialise logging.")?;

    let dashboard = Dashboard::from_path(dashboard_path).context("Failed to load dashboard.")?;
    let district = find_district(&dashboard.districts, district_name)?;
    let weather = weather_from_options(
        &dashboard.calibration,
        opts.rainfall,
        opts.temperature,
        opts.humidity,
        opts.wind,
    )?;

    if let Some(warning) = out_of_range_warning(&weather) {
        warn!("{warning}");
    }

    let simulation = simulate_district(&dashboard, &district.id, &weather)?;
    info!(
        "{}: baseline {:.0} cases (rainfall {} mm, temperature {} °C, humidity {} %, wind {} km/h)",
        district.id,
        simulation.baseline,
        weather.rainfall_mm,
        weather.temperature_c,
        weather.humidity_pct,
        weather.wind_kph
    );
    info!(
        "Contributions: rainfall {:+.1}, temperature {:+.1}, humidity {:+.1}, wind {:+.1}",
        simulation.terms.rainfall,
        simulation.terms.temperature,
        simulation.terms.humidity,
        simulation.terms.wind
    );
    info!(
        "Projected cases: {} ({:+}) -> {}",
        simulation.result.adjusted_cases, simulation.result.delta, simulation.assessment.tier
    );

    Ok(())
}
