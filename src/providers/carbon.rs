use std::collections::BTreeMap;

use serde::Deserialize;

use super::geolocation::Geolocation;
use crate::error::{Error, Result};
use crate::util::contains_ignore_ascii_case;

const CO2SIGNAL_URL: &str = "https://api.co2signal.com/v1/latest";
const ZONES_URL: &str = "https://api.electricitymap.org/v3/zones";

// --- Co2Signal API types ---

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarbonIntensityReport {
    pub country_code: String,
    pub data: IntensityData,
    pub units: IntensityUnits,
    #[serde(default)]
    pub status: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntensityData {
    pub carbon_intensity: Option<f64>,
    pub fossil_fuel_percentage: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntensityUnits {
    pub carbon_intensity: String,
}

impl CarbonIntensityReport {
    /// The intensity figure in gCO2eq/kWh. Zones the provider knows but has
    /// no data for report none.
    pub fn intensity(&self) -> Result<f64> {
        match self.data.carbon_intensity {
            Some(ci) if ci >= 0.0 => Ok(ci),
            Some(ci) => Err(Error::provider_unavailable(format!(
                "negative carbon intensity {ci} for {}",
                self.country_code
            ))),
            None => Err(Error::provider_unavailable(format!(
                "no carbon intensity data for zone '{}'",
                self.country_code
            ))),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub zone_name: String,
}

pub trait CarbonIntensityProvider {
    /// Known zones keyed by code.
    fn zones(&self) -> Result<BTreeMap<String, Zone>>;

    fn latest_for_zone(&self, code: &str) -> Result<CarbonIntensityReport>;

    fn latest_for_location(&self, location: &Geolocation) -> Result<CarbonIntensityReport>;
}

pub fn ensure_known_zone(code: &str, zones: &BTreeMap<String, Zone>) -> Result<()> {
    if code.trim().is_empty() {
        return Err(Error::invalid_argument("zone code must not be empty"));
    }
    if zones.contains_key(code) {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!("zone code '{code}' not found")))
    }
}

/// `(zone name, code)` pairs ordered by zone name.
pub fn sorted_by_name(zones: &BTreeMap<String, Zone>) -> Vec<(&str, &str)> {
    let mut entries: Vec<(&str, &str)> = zones
        .iter()
        .map(|(code, zone)| (zone.zone_name.as_str(), code.as_str()))
        .collect();
    entries.sort();
    entries
}

/// Zones whose name or code contains `query`, ordered by name.
pub fn search<'a>(zones: &'a BTreeMap<String, Zone>, query: &str) -> Vec<(&'a str, &'a str)> {
    let query = query.trim();
    sorted_by_name(zones)
        .into_iter()
        .filter(|(name, code)| {
            contains_ignore_ascii_case(name, query) || contains_ignore_ascii_case(code, query)
        })
        .collect()
}

pub struct Co2SignalClient {
    agent: ureq::Agent,
    token: String,
}

impl Co2SignalClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            agent: super::agent(),
            token: token.into(),
        }
    }

    fn latest(&self, params: &[(&str, &str)]) -> Result<CarbonIntensityReport> {
        let mut request = self.agent.get(CO2SIGNAL_URL).set("auth-token", &self.token);
        for (key, value) in params {
            request = request.query(key, value);
        }
        request
            .call()?
            .into_json()
            .map_err(|e| Error::provider_unavailable(format!("co2signal response: {e}")))
    }
}

impl CarbonIntensityProvider for Co2SignalClient {
    fn zones(&self) -> Result<BTreeMap<String, Zone>> {
        self.agent
            .get(ZONES_URL)
            .call()?
            .into_json()
            .map_err(|e| Error::provider_unavailable(format!("zone list response: {e}")))
    }

    fn latest_for_zone(&self, code: &str) -> Result<CarbonIntensityReport> {
        ensure_known_zone(code, &self.zones()?)?;
        self.latest(&[("countryCode", code)])
    }

    fn latest_for_location(&self, location: &Geolocation) -> Result<CarbonIntensityReport> {
        self.latest(&[
            ("lon", location.longitude.as_str()),
            ("lat", location.latitude.as_str()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones() -> BTreeMap<String, Zone> {
        serde_json::from_str(
            r#"{
                "IT-NO": {"zoneName": "North Italy", "countryName": "Italy"},
                "DE": {"zoneName": "Germany"},
                "FR": {"zoneName": "France"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn decodes_latest_report() {
        let body = r#"{
            "_disclaimer": "This data is the exclusive property of Electricity Maps",
            "status": "ok",
            "countryCode": "IT-NO",
            "data": {"datetime": "2026-10-14T15:00:00.000Z", "carbonIntensity": 282, "fossilFuelPercentage": 51.73},
            "units": {"carbonIntensity": "gCO2eq/kWh"}
        }"#;
        let report: CarbonIntensityReport = serde_json::from_str(body).unwrap();
        assert_eq!(report.country_code, "IT-NO");
        assert_eq!(report.intensity().unwrap(), 282.0);
        assert_eq!(report.data.fossil_fuel_percentage, Some(51.73));
        assert_eq!(report.units.carbon_intensity, "gCO2eq/kWh");
        assert_eq!(report.status, "ok");
    }

    #[test]
    fn missing_intensity_is_a_provider_error() {
        let body = r#"{"countryCode": "XK", "data": {}, "units": {"carbonIntensity": "gCO2eq/kWh"}, "status": "ok"}"#;
        let report: CarbonIntensityReport = serde_json::from_str(body).unwrap();
        assert!(matches!(report.intensity(), Err(Error::ProviderUnavailable(_))));
    }

    #[test]
    fn unknown_zone_is_an_invalid_argument() {
        let zones = zones();
        assert!(ensure_known_zone("DE", &zones).is_ok());
        assert!(matches!(ensure_known_zone("ABC", &zones), Err(Error::InvalidArgument(_))));
        assert!(matches!(ensure_known_zone(" ", &zones), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn lists_and_searches_by_name() {
        let zones = zones();
        assert_eq!(
            sorted_by_name(&zones),
            vec![("France", "FR"), ("Germany", "DE"), ("North Italy", "IT-NO")]
        );
        assert_eq!(search(&zones, "ital"), vec![("North Italy", "IT-NO")]);
        assert_eq!(search(&zones, "de"), vec![("Germany", "DE")]);
        assert!(search(&zones, "atlantis").is_empty());
    }
}
