use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use energymon::app::{settle_shutdown, App, SessionInfo};
use energymon::config::{load_settings, Cli, Settings};
use energymon::install::install_config;
use energymon::metrics::aggregate::historical_total;
use energymon::metrics::cpu::SysinfoSampler;
use energymon::metrics::emission::EnergyContext;
use energymon::metrics::scheduler::SampleScheduler;
use energymon::metrics::series::TimeAxisSpec;
use energymon::prompt::{self, GEOLOCATION_DISCLAIMER};
use energymon::providers::carbon::sorted_by_name;
use energymon::providers::{
    CarbonIntensityProvider, CarbonIntensityReport, Co2SignalClient, IpGeolocationClient,
    JsonFileCache, JsonTdpDatabase, LocationProvider, TdpResolver,
};
use energymon::session::SessionLog;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if let Some(path) = &cli.install_config {
        install_config(path)?;
        println!("Default configuration written to {}", path.display());
        return Ok(());
    }

    fs::create_dir_all(&cli.data_dir)
        .wrap_err_with(|| format!("cannot create data directory {}", cli.data_dir.display()))?;
    init_logging(&cli.data_dir)?;

    let settings = load_settings(&cli.config)?;
    let carbon = Co2SignalClient::new(settings.api.co2signal_token.clone());

    if cli.show_list {
        let zones = carbon.zones()?;
        for (name, code) in sorted_by_name(&zones) {
            println!("{name} : {code}");
        }
        return Ok(());
    }

    let report = fetch_report(&cli, &settings, &carbon)?;
    let carbon_intensity = report.intensity()?;
    info!(
        zone = %report.country_code,
        carbon_intensity,
        unit = %report.units.carbon_intensity,
        "carbon intensity"
    );

    let sampler = Arc::new(SysinfoSampler::new());
    let cpu_name = sampler.cpu_name().unwrap_or_default();
    let cpu_tdp_watts = resolve_tdp(&cli.data_dir, &settings, &cpu_name)?;

    let context = EnergyContext::new(
        cpu_tdp_watts,
        carbon_intensity,
        settings.sampling_interval,
        settings.precision,
    )?;
    let axis = TimeAxisSpec::new(settings.sampling_interval, settings.x_unit, settings.x_ticks)?;

    let log = SessionLog::open(cli.data_dir.join("sessions"))?;
    let history = log.load_all()?;
    let historical = historical_total(&history, settings.x_unit, settings.y_unit);
    info!(sessions = history.len(), historical, "loaded session history");

    let info = SessionInfo {
        zone: report.country_code.clone(),
        carbon_intensity,
        intensity_unit: report.units.carbon_intensity.clone(),
        fossil_percentage: report.data.fossil_fuel_percentage,
        cpu_name,
        cpu_tdp_watts,
    };
    let scheduler = SampleScheduler::new(sampler, context, settings.sampling_margin);
    let mut app = App::new(scheduler, axis, &settings, info, historical);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    let finished = app.finish();
    ratatui::restore();

    let saved = settle_shutdown(result, log.save(&finished.samples))?;

    info!(
        samples = finished.appended,
        skipped_ticks = finished.skipped_ticks,
        failed_samples = finished.failed_samples,
        "session finished"
    );
    println!("{}", finished.summary(saved.as_deref()));
    Ok(())
}

fn init_logging(data_dir: &Path) -> color_eyre::Result<()> {
    let path = data_dir.join("energymon.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("cannot open log file {}", path.display()))?;

    // The terminal UI owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Carbon intensity for the chosen zone, the IP location, or a zone picked
/// interactively.
fn fetch_report(
    cli: &Cli,
    settings: &Settings,
    carbon: &Co2SignalClient,
) -> color_eyre::Result<CarbonIntensityReport> {
    if let Some(code) = &cli.country {
        return Ok(carbon.latest_for_zone(&code.trim().to_ascii_uppercase())?);
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let use_location = if cli.yes {
        true
    } else {
        println!("{GEOLOCATION_DISCLAIMER}");
        prompt::confirm(&mut input, &mut output, "Locate this machine by IP address?")?
    };

    if use_location {
        let location = IpGeolocationClient::new(settings.api.ipgeolocation_key.clone()).locate()?;
        info!(latitude = %location.latitude, longitude = %location.longitude, "located by IP");
        Ok(carbon.latest_for_location(&location)?)
    } else {
        let zones = carbon.zones()?;
        let code = prompt::select_zone(&mut input, &mut output, &zones)?;
        Ok(carbon.latest_for_zone(&code)?)
    }
}

fn resolve_tdp(data_dir: &Path, settings: &Settings, cpu_name: &str) -> energymon::Result<f64> {
    if let Some(watts) = settings.cpu_tdp_override {
        info!(watts, "using configured CPU TDP");
        return Ok(watts);
    }
    let cache = JsonFileCache::open(data_dir.join("cpu_tdp.json"));
    let database = settings.tdp_database.as_ref().map(JsonTdpDatabase::new);
    TdpResolver::new(cache, database).resolve(cpu_name)
}
