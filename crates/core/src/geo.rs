//! Geolocation capture payload.
//!
//! Every clocking action must carry a fully populated payload; a missing or
//! denied geolocation fails the action with `LocationRequired` before any
//! state is read or mutated.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Where/who audit stamp recorded at every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoStamp {
    pub latitude: f64,
    pub longitude: f64,
    pub ip: String,
    pub user_agent: String,
}

impl GeoStamp {
    /// Precondition check: coordinates in range, IP and user-agent non-blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::LocationRequired(format!(
                "latitude out of range: {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::LocationRequired(format!(
                "longitude out of range: {}",
                self.longitude
            )));
        }
        if self.ip.trim().is_empty() {
            return Err(CoreError::LocationRequired("missing client IP".into()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(CoreError::LocationRequired("missing user agent".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn stamp() -> GeoStamp {
        GeoStamp {
            latitude: 40.4168,
            longitude: -3.7038,
            ip: "203.0.113.9".into(),
            user_agent: "Mozilla/5.0".into(),
        }
    }

    #[test]
    fn valid_stamp_passes() {
        assert!(stamp().validate().is_ok());
    }

    #[test]
    fn out_of_range_latitude_fails() {
        let mut s = stamp();
        s.latitude = 91.0;
        assert_matches!(s.validate(), Err(CoreError::LocationRequired(_)));
    }

    #[test]
    fn non_finite_coordinates_fail() {
        let mut s = stamp();
        s.longitude = f64::NAN;
        assert_matches!(s.validate(), Err(CoreError::LocationRequired(_)));
    }

    #[test]
    fn blank_ip_fails() {
        let mut s = stamp();
        s.ip = "   ".into();
        assert_matches!(s.validate(), Err(CoreError::LocationRequired(_)));
    }

    #[test]
    fn blank_user_agent_fails() {
        let mut s = stamp();
        s.user_agent = String::new();
        assert_matches!(s.validate(), Err(CoreError::LocationRequired(_)));
    }
}
