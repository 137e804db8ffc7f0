//! Error type for the simulation core.
//!
//! Failures fall into three classes of our own — rejected configuration,
//! population input that violates the agent data model, and broken runtime
//! invariants — plus the io/serde/csv failures of the loaders and report
//! writers, which are wrapped so they propagate with `?`.

use std::fmt::{self, Display};
use std::io;

#[derive(Debug)]
pub enum EpigridError {
    /// A configuration value was rejected at initialization: a probability
    /// outside `[0, 1]`, a non-positive Gamma parameter, inconsistent travel
    /// tables, an ambiguous hospital timer offset. Nothing is clamped or
    /// retried; the simulation refuses to start.
    BadConfig(String),
    /// A population row or case-seeding request that violates the agent data
    /// model (cell outside the domain, negative group id, out-of-range
    /// school grade, more seed cases than agents).
    BadPopulation(String),
    /// A cross-cutting data-model invariant did not hold when checked.
    BrokenInvariant(String),
    /// Failure reading or writing a configuration, population, or report
    /// file.
    Io(io::Error),
    /// Malformed configuration or population JSON.
    Json(serde_json::Error),
    /// Failure emitting a CSV report row.
    Csv(csv::Error),
}

impl From<io::Error> for EpigridError {
    fn from(error: io::Error) -> Self {
        EpigridError::Io(error)
    }
}

impl From<serde_json::Error> for EpigridError {
    fn from(error: serde_json::Error) -> Self {
        EpigridError::Json(error)
    }
}

impl From<csv::Error> for EpigridError {
    fn from(error: csv::Error) -> Self {
        EpigridError::Csv(error)
    }
}

impl Display for EpigridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpigridError::BadConfig(reason) => write!(f, "bad configuration: {reason}"),
            EpigridError::BadPopulation(reason) => write!(f, "bad population input: {reason}"),
            EpigridError::BrokenInvariant(reason) => write!(f, "invariant violated: {reason}"),
            EpigridError::Io(error) => write!(f, "io error: {error}"),
            EpigridError::Json(error) => write!(f, "json error: {error}"),
            EpigridError::Csv(error) => write!(f, "csv error: {error}"),
        }
    }
}

impl std::error::Error for EpigridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpigridError::Io(error) => Some(error),
            EpigridError::Json(error) => Some(error),
            EpigridError::Csv(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EpigridError;
    use std::error::Error;

    #[test]
    fn display_names_the_failure_class() {
        let e = EpigridError::BadConfig("vac_eff = 1.5 outside [0, 1]".into());
        assert_eq!(format!("{e}"), "bad configuration: vac_eff = 1.5 outside [0, 1]");
        let e = EpigridError::BadPopulation("home cell (9, 9) outside the domain".into());
        assert!(format!("{e}").starts_with("bad population input:"));
    }

    #[test]
    fn wrapped_errors_keep_their_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such config");
        let e: EpigridError = io_err.into();
        assert!(matches!(e, EpigridError::Io(_)));
        assert!(e.source().is_some());
        assert!(EpigridError::BadConfig("x".into()).source().is_none());
    }
}
