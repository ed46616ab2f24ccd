use chrono::{DateTime, Local, NaiveDate};
use sunrise::{Coordinates, SolarDay, SolarEvent};

use crate::config::SiteConfig;
use crate::error::{CamwatchError, Result};

/// Sunrise and sunset for one calendar day, in local time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: DateTime<Local>,
    pub sunset: DateTime<Local>,
}

impl SunTimes {
    /// Strictly between sunrise and sunset.
    pub fn is_daytime(&self, now: DateTime<Local>) -> bool {
        self.sunrise < now && now < self.sunset
    }
}

/// Source of sunrise/sunset times.
pub trait SunCalculator {
    fn sun_times(&self, date: NaiveDate) -> Result<SunTimes>;
}

/// Sun times for a fixed observer location.
#[derive(Clone, Copy, Debug)]
pub struct SiteSun {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&SiteConfig> for SiteSun {
    fn from(site: &SiteConfig) -> Self {
        Self {
            latitude: site.latitude,
            longitude: site.longitude,
        }
    }
}

impl SunCalculator for SiteSun {
    fn sun_times(&self, date: NaiveDate) -> Result<SunTimes> {
        let coords = Coordinates::new(self.latitude, self.longitude).ok_or_else(|| {
            CamwatchError::InvalidConfig(format!(
                "site coordinates out of range: latitude {}, longitude {}",
                self.latitude, self.longitude
            ))
        })?;
        let day = SolarDay::new(coords, date);
        Ok(SunTimes {
            sunrise: day.event_time(SolarEvent::Sunrise).with_timezone(&Local),
            sunset: day.event_time(SolarEvent::Sunset).with_timezone(&Local),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn daytime_is_exclusive_at_both_ends() {
        let sunrise = Local.with_ymd_and_hms(2024, 6, 1, 5, 30, 0).unwrap();
        let sunset = Local.with_ymd_and_hms(2024, 6, 1, 21, 0, 0).unwrap();
        let sun = SunTimes { sunrise, sunset };
        assert!(!sun.is_daytime(sunrise));
        assert!(!sun.is_daytime(sunset));
        assert!(sun.is_daytime(Local.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()));
        assert!(!sun.is_daytime(Local.with_ymd_and_hms(2024, 6, 1, 23, 0, 0).unwrap()));
    }

    #[test]
    fn site_sun_orders_sunrise_before_sunset() {
        // Greenwich, midsummer.
        let site = SiteSun {
            latitude: 51.48,
            longitude: 0.0,
        };
        let times = site
            .sun_times(NaiveDate::from_ymd_opt(2024, 6, 21).unwrap())
            .unwrap();
        assert!(times.sunrise < times.sunset);
        let day_len = times.sunset - times.sunrise;
        assert!(day_len.num_hours() >= 15 && day_len.num_hours() <= 17);
    }

    #[test]
    fn out_of_range_site_is_rejected() {
        let site = SiteSun {
            latitude: 95.0,
            longitude: 0.0,
        };
        let err = site
            .sun_times(NaiveDate::from_ymd_opt(2024, 6, 21).unwrap())
            .unwrap_err();
        assert!(matches!(err, CamwatchError::InvalidConfig(_)));
    }
}
