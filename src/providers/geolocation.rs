use serde::Deserialize;

use crate::error::{Error, Result};

const IPGEOLOCATION_URL: &str = "https://api.ipgeolocation.io/ipgeo";

/// Approximate position of this machine. The provider encodes both
/// coordinates as decimal strings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Geolocation {
    pub latitude: String,
    pub longitude: String,
}

impl Geolocation {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("latitude", &self.latitude), ("longitude", &self.longitude)] {
            value.trim().parse::<f64>().map_err(|_| {
                Error::provider_unavailable(format!("geolocation {name} '{value}' is not a number"))
            })?;
        }
        Ok(())
    }
}

pub trait LocationProvider {
    fn locate(&self) -> Result<Geolocation>;
}

/// ipgeolocation.io lookup by public IP.
pub struct IpGeolocationClient {
    agent: ureq::Agent,
    api_key: String,
}

impl IpGeolocationClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            agent: super::agent(),
            api_key: api_key.into(),
        }
    }
}

impl LocationProvider for IpGeolocationClient {
    fn locate(&self) -> Result<Geolocation> {
        let location: Geolocation = self
            .agent
            .get(IPGEOLOCATION_URL)
            .query("apiKey", &self.api_key)
            .call()?
            .into_json()
            .map_err(|e| Error::provider_unavailable(format!("geolocation response: {e}")))?;
        location.validate()?;
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_string_coordinates() {
        let body = r#"{"ip":"8.8.8.8","latitude":"41.8719","longitude":"12.5674","country_code2":"IT"}"#;
        let location: Geolocation = serde_json::from_str(body).unwrap();
        assert_eq!(location.latitude, "41.8719");
        assert!(location.validate().is_ok());
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        let location = Geolocation {
            latitude: "north".to_string(),
            longitude: "12.5".to_string(),
        };
        assert!(matches!(location.validate(), Err(Error::ProviderUnavailable(_))));
    }
}
