//! Service status taxonomy and severity ordering

use serde::{Deserialize, Serialize};
use std::fmt;

/// Health of a single monitored dependency.
///
/// `Ok < Degraded < Down` by severity. `Unknown` carries no severity: it never
/// overrides a known status but is reported as-is when nothing better exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Degraded,
    Down,
    Unknown,
}

impl Status {
    pub fn severity(self) -> Option<u8> {
        match self {
            Status::Ok => Some(0),
            Status::Degraded => Some(1),
            Status::Down => Some(2),
            Status::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        self.severity().is_some()
    }

    /// The more severe of two statuses, ignoring `Unknown` when the other is known.
    pub fn worse(self, other: Status) -> Status {
        match (self.severity(), other.severity()) {
            (Some(a), Some(b)) => if b > a { other } else { self },
            (Some(_), None) => self,
            (None, Some(_)) => other,
            (None, None) => Status::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Degraded => "degraded",
            Status::Down => "down",
            Status::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Worst-of fold. Returns `None` for an empty input.
pub fn worst_of<I>(statuses: I) -> Option<Status>
where
    I: IntoIterator<Item = Status>,
{
    statuses.into_iter().reduce(Status::worse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_known_statuses() {
        assert_eq!(Status::Ok.worse(Status::Degraded), Status::Degraded);
        assert_eq!(Status::Down.worse(Status::Degraded), Status::Down);
        assert_eq!(Status::Degraded.worse(Status::Ok), Status::Degraded);
    }

    #[test]
    fn unknown_never_overrides_known() {
        assert_eq!(Status::Ok.worse(Status::Unknown), Status::Ok);
        assert_eq!(Status::Unknown.worse(Status::Down), Status::Down);
        assert_eq!(Status::Unknown.worse(Status::Unknown), Status::Unknown);
    }

    #[test]
    fn worst_of_picks_down_then_degraded() {
        assert_eq!(worst_of([Status::Ok, Status::Down, Status::Degraded]), Some(Status::Down));
        assert_eq!(worst_of([Status::Ok, Status::Unknown, Status::Degraded]), Some(Status::Degraded));
        assert_eq!(worst_of([Status::Ok, Status::Ok]), Some(Status::Ok));
        assert_eq!(worst_of(std::iter::empty()), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Degraded).unwrap(), "\"degraded\"");
        let parsed: Status = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(parsed, Status::Unknown);
    }
}
