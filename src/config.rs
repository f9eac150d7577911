use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::error::{ConfigViolation, Error, Result};
use crate::metrics::TimeUnit;
use crate::util::parse_hex_color;

pub const DEFAULT_CONFIG: &str = include_str!("../config/energymon.yml");

const MAX_INTERVAL_SECS: f64 = 3600.0;
const MAX_PRECISION: i64 = 12;
const MAX_HISTORY_POINTS: i64 = 100_000;

#[derive(Parser, Debug)]
#[command(
    name = "energymon",
    version,
    about = "Estimate the CO2 footprint of your CPU from live grid carbon intensity"
)]
pub struct Cli {
    /// Manually set the electricity zone (e.g. DE, IT-NO)
    #[arg(short = 'c', long = "set-country", value_name = "CODE")]
    pub country: Option<String>,

    /// Show the list of available zone codes and exit
    #[arg(short = 'l', long = "show-list")]
    pub show_list: bool,

    /// Write the default configuration to PATH and exit
    #[arg(short = 'C', long = "install-config", value_name = "PATH")]
    pub install_config: Option<PathBuf>,

    /// Configuration file
    #[arg(long, default_value = "energymon.yml")]
    pub config: PathBuf,

    /// Directory holding saved sessions, the TDP cache and the log file
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Use IP geolocation without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

// --- File schema ---

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub functional: Functional,
    pub appearance: Appearance,
    pub api: ApiKeys,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Functional {
    pub sampling_interval_secs: f64,
    pub sampling_margin_secs: f64,
    pub emission_precision: i64,
    pub history_points: i64,
    pub x_ticks: i64,
    pub x_unit: String,
    pub y_unit: String,
    pub on_sample_failure: String,
    pub cpu_tdp_watts: Option<f64>,
    pub tdp_database: Option<PathBuf>,
}

impl Default for Functional {
    fn default() -> Self {
        Self {
            sampling_interval_secs: 1.0,
            sampling_margin_secs: 0.1,
            emission_precision: 6,
            history_points: 300,
            x_ticks: 5,
            x_unit: "s".to_string(),
            y_unit: "s".to_string(),
            on_sample_failure: "skip".to_string(),
            cpu_tdp_watts: None,
            tdp_database: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Appearance {
    pub line_color: String,
    pub axis_color: String,
    pub text_color: String,
    pub marker: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            line_color: "#a6e3a1".to_string(),
            axis_color: "#a6adc8".to_string(),
            text_color: "#cdd6f4".to_string(),
            marker: "braille".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ApiKeys {
    pub co2signal_token: String,
    pub ipgeolocation_key: String,
}

// --- Validated settings ---

/// What a tick whose measurement failed contributes to the series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Append nothing.
    Skip,
    /// Repeat the last real sample (nothing before the first one).
    Hold,
    /// Append 0.
    Zero,
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(FailurePolicy::Skip),
            "hold" => Ok(FailurePolicy::Hold),
            "zero" => Ok(FailurePolicy::Zero),
            other => Err(Error::invalid_argument(format!(
                "failure policy must be one of skip, hold, zero, got '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartMarker {
    Braille,
    Dot,
    Block,
}

impl FromStr for ChartMarker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "braille" => Ok(ChartMarker::Braille),
            "dot" => Ok(ChartMarker::Dot),
            "block" => Ok(ChartMarker::Block),
            other => Err(Error::invalid_argument(format!(
                "marker must be one of braille, dot, block, got '{other}'"
            ))),
        }
    }
}

pub type Rgb = (u8, u8, u8);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Colors {
    pub line: Rgb,
    pub axis: Rgb,
    pub text: Rgb,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub sampling_interval: f64,
    pub sampling_margin: Duration,
    pub precision: u32,
    pub history_points: usize,
    pub x_ticks: usize,
    pub x_unit: TimeUnit,
    pub y_unit: TimeUnit,
    pub failure_policy: FailurePolicy,
    pub cpu_tdp_override: Option<f64>,
    pub tdp_database: Option<PathBuf>,
    pub colors: Colors,
    pub marker: ChartMarker,
    pub api: ApiKeys,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sampling_interval: 1.0,
            sampling_margin: Duration::from_millis(100),
            precision: 6,
            history_points: 300,
            x_ticks: 5,
            x_unit: TimeUnit::Seconds,
            y_unit: TimeUnit::Seconds,
            failure_policy: FailurePolicy::Skip,
            cpu_tdp_override: None,
            tdp_database: None,
            colors: Colors {
                line: (166, 227, 161),
                axis: (166, 173, 200),
                text: (205, 214, 244),
            },
            marker: ChartMarker::Braille,
            api: ApiKeys::default(),
        }
    }
}

impl FileConfig {
    /// Checks every field and reports all violations together.
    pub fn validate(self) -> Result<Settings> {
        let mut violations = Vec::new();
        let f = &self.functional;
        let a = &self.appearance;

        let interval = f.sampling_interval_secs;
        if !(interval > 0.0 && interval <= MAX_INTERVAL_SECS) {
            violations.push(ConfigViolation::new(
                "functional.sampling_interval_secs",
                format!("must be a number in (0, {MAX_INTERVAL_SECS}]. Got '{interval}' instead."),
            ));
        }
        let margin = f.sampling_margin_secs;
        if !(margin >= 0.0 && margin < interval) {
            violations.push(ConfigViolation::new(
                "functional.sampling_margin_secs",
                format!("must be at least 0 and below the sampling interval. Got '{margin}' instead."),
            ));
        }
        if !(0..=MAX_PRECISION).contains(&f.emission_precision) {
            violations.push(ConfigViolation::new(
                "functional.emission_precision",
                format!(
                    "must be an integer in [0, {MAX_PRECISION}]. Got '{}' instead.",
                    f.emission_precision
                ),
            ));
        }
        if !(2..=MAX_HISTORY_POINTS).contains(&f.history_points) {
            violations.push(ConfigViolation::new(
                "functional.history_points",
                format!(
                    "must be an integer in [2, {MAX_HISTORY_POINTS}]. Got '{}' instead.",
                    f.history_points
                ),
            ));
        }
        if f.x_ticks < 2 || f.x_ticks > f.history_points.max(2) {
            violations.push(ConfigViolation::new(
                "functional.x_ticks",
                format!(
                    "must be an integer between 2 and history_points. Got '{}' instead.",
                    f.x_ticks
                ),
            ));
        }

        let x_unit = parse_field(&mut violations, "functional.x_unit", &f.x_unit, time_unit_reason);
        let y_unit = parse_field(&mut violations, "functional.y_unit", &f.y_unit, time_unit_reason);
        let failure_policy = parse_field(
            &mut violations,
            "functional.on_sample_failure",
            &f.on_sample_failure,
            |v| format!("must be one of skip, hold, zero. Got '{v}' instead."),
        );

        if let Some(tdp) = f.cpu_tdp_watts {
            if !(tdp > 0.0 && tdp.is_finite()) {
                violations.push(ConfigViolation::new(
                    "functional.cpu_tdp_watts",
                    format!("must be a positive number. Got '{tdp}' instead."),
                ));
            }
        }

        let line = color_field(&mut violations, "appearance.line_color", &a.line_color);
        let axis = color_field(&mut violations, "appearance.axis_color", &a.axis_color);
        let text = color_field(&mut violations, "appearance.text_color", &a.text_color);
        let marker = parse_field(&mut violations, "appearance.marker", &a.marker, |v| {
            format!("must be one of braille, dot, block. Got '{v}' instead.")
        });

        match (x_unit, y_unit, failure_policy, line, axis, text, marker) {
            (
                Some(x_unit),
                Some(y_unit),
                Some(failure_policy),
                Some(line),
                Some(axis),
                Some(text),
                Some(marker),
            ) if violations.is_empty() => Ok(Settings {
                sampling_interval: interval,
                sampling_margin: Duration::from_secs_f64(margin),
                precision: self.functional.emission_precision as u32,
                history_points: self.functional.history_points as usize,
                x_ticks: self.functional.x_ticks as usize,
                x_unit,
                y_unit,
                failure_policy,
                cpu_tdp_override: self.functional.cpu_tdp_watts,
                tdp_database: self.functional.tdp_database,
                colors: Colors { line, axis, text },
                marker,
                api: self.api,
            }),
            _ => Err(Error::ConfigurationInvalid(violations)),
        }
    }
}

fn time_unit_reason(value: &str) -> String {
    format!("must be a string between ['s', 'm', 'h']. Got '{value}' instead.")
}

fn parse_field<T: FromStr>(
    violations: &mut Vec<ConfigViolation>,
    field: &str,
    value: &str,
    reason: impl Fn(&str) -> String,
) -> Option<T> {
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            violations.push(ConfigViolation::new(field, reason(value)));
            None
        }
    }
}

fn color_field(violations: &mut Vec<ConfigViolation>, field: &str, value: &str) -> Option<Rgb> {
    let parsed = parse_hex_color(value);
    if parsed.is_none() {
        violations.push(ConfigViolation::new(
            field,
            format!("must be a #RRGGBB color code. Got '{value}' instead."),
        ));
    }
    parsed
}

/// Reads `path` (optional; YAML, TOML or JSON by extension) layered with
/// `ENERGYMON__SECTION__KEY` environment variables, then validates it.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let source = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("ENERGYMON")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| schema_error(path, e))?;

    let raw: FileConfig = source.try_deserialize().map_err(|e| schema_error(path, e))?;
    raw.validate()
}

fn schema_error(path: &Path, err: config::ConfigError) -> Error {
    Error::ConfigurationInvalid(vec![ConfigViolation::new(
        path.display().to_string(),
        err.to_string(),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<Settings> {
        let source = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .map_err(|e| schema_error(Path::new("inline"), e))?;
        let raw: FileConfig = source
            .try_deserialize()
            .map_err(|e| schema_error(Path::new("inline"), e))?;
        raw.validate()
    }

    fn violations(result: Result<Settings>) -> Vec<ConfigViolation> {
        match result {
            Err(Error::ConfigurationInvalid(v)) => v,
            other => panic!("expected invalid configuration, got {other:?}"),
        }
    }

    #[test]
    fn defaults_validate() {
        let settings = FileConfig::default().validate().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.sampling_interval, 1.0);
        assert_eq!(settings.precision, 6);
        assert_eq!(settings.history_points, 300);
        assert_eq!(settings.x_unit, TimeUnit::Seconds);
        assert_eq!(settings.failure_policy, FailurePolicy::Skip);
        assert_eq!(settings.colors.line, (166, 227, 161));
    }

    #[test]
    fn shipped_file_matches_defaults() {
        assert_eq!(parse(DEFAULT_CONFIG).unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = parse(
            "functional:\n  sampling_interval_secs: 5\n  x_unit: m\n  on_sample_failure: hold\n",
        )
        .unwrap();
        assert_eq!(settings.sampling_interval, 5.0);
        assert_eq!(settings.x_unit, TimeUnit::Minutes);
        assert_eq!(settings.failure_policy, FailurePolicy::Hold);
        assert_eq!(settings.x_ticks, 5);
    }

    #[test]
    fn collects_every_violation() {
        let found = violations(parse(
            "functional:\n  sampling_interval_secs: 0\n  x_unit: d\n  y_unit: w\n  x_ticks: 1\n\
             appearance:\n  line_color: green\n",
        ));
        let fields: Vec<&str> = found.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "functional.sampling_interval_secs",
                "functional.sampling_margin_secs",
                "functional.x_ticks",
                "functional.x_unit",
                "functional.y_unit",
                "appearance.line_color",
            ]
        );
    }

    #[test]
    fn ticks_cannot_exceed_points() {
        let found = violations(parse("functional:\n  history_points: 4\n  x_ticks: 5\n"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field, "functional.x_ticks");
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(parse("functional:\n  sampling_interval: 2\n").is_err());
    }

    #[test]
    fn tdp_override_must_be_positive() {
        let found = violations(parse("functional:\n  cpu_tdp_watts: -5\n"));
        assert_eq!(found[0].field, "functional.cpu_tdp_watts");
        assert_eq!(
            parse("functional:\n  cpu_tdp_watts: 28\n").unwrap().cpu_tdp_override,
            Some(28.0)
        );
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::parse_from(["energymon", "-c", "DE", "--data-dir", "/tmp/em"]);
        assert_eq!(cli.country.as_deref(), Some("DE"));
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/em"));
        assert_eq!(cli.config, PathBuf::from("energymon.yml"));
        assert!(!cli.show_list);

        let cli = Cli::parse_from(["energymon", "--install-config", "my.yml"]);
        assert_eq!(cli.install_config, Some(PathBuf::from("my.yml")));
    }
}
