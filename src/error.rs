use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Measurement unavailable: {0}")]
    MeasurementUnavailable(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Invalid configuration:\n{}", format_violations(.0))]
    ConfigurationInvalid(Vec<ConfigViolation>),

    #[error("Storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single rejected configuration field.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigViolation {
    pub field: String,
    pub reason: String,
}

impl ConfigViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

fn format_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("* {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Error {
    pub(crate) fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn not_supported<S: Into<String>>(msg: S) -> Self {
        Error::NotSupported(msg.into())
    }

    pub(crate) fn measurement_unavailable<S: Into<String>>(msg: S) -> Self {
        Error::MeasurementUnavailable(msg.into())
    }

    pub(crate) fn provider_unavailable<S: Into<String>>(msg: S) -> Self {
        Error::ProviderUnavailable(msg.into())
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Storage {
            path: path.into(),
            source,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, resp) => {
                Error::ProviderUnavailable(format!("{} returned HTTP {code}", resp.get_url()))
            }
            ureq::Error::Transport(t) => Error::ProviderUnavailable(t.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_list_every_violation() {
        let err = Error::ConfigurationInvalid(vec![
            ConfigViolation::new("functional.x_unit", "must be one of s, m, h. Got 'd' instead."),
            ConfigViolation::new("appearance.line_color", "must be a #RRGGBB color."),
        ]);
        let text = err.to_string();
        assert!(text.contains("* functional.x_unit must be one of s, m, h"));
        assert!(text.contains("* appearance.line_color must be a #RRGGBB color."));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn http_errors_mean_the_provider_is_unavailable() {
        let resp = ureq::Response::new(503, "Service Unavailable", "").unwrap();
        match Error::from(ureq::Error::Status(503, resp)) {
            Error::ProviderUnavailable(reason) => assert!(reason.contains("HTTP 503"), "{reason}"),
            other => panic!("expected provider unavailable, got {other:?}"),
        }

        // A malformed URL fails in transport without touching the network.
        let err = ureq::get("http://[not-a-host").call().unwrap_err();
        assert!(matches!(Error::from(err), Error::ProviderUnavailable(_)));
    }
}
