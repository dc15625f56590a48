//! Which timezone's midnight splits the event timeline into days
//!
//! The zone comes from `--utc`, an explicit IANA name, or the machine the
//! report runs on.

use crate::error::{CostlineError, Result};
use crate::types::DailyDate;
use chrono::Utc;
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Timezone that day buckets are cut in
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// Zone whose local midnight starts each bucket
    pub tz: Tz,
    /// Set for `--utc` and for zones named `UTC`
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    /// The zone of the machine, see [`get_local_timezone`]
    fn default() -> Self {
        Self::from_tz(get_local_timezone())
    }
}

impl TimezoneConfig {
    /// Buckets cut at UTC midnight
    pub fn utc() -> Self {
        Self::from_tz(Tz::UTC)
    }

    fn from_tz(tz: Tz) -> Self {
        Self {
            is_utc: tz == Tz::UTC,
            tz,
        }
    }

    /// Resolve the `--utc` / `--timezone` pair
    ///
    /// `--utc` wins over a zone name; with neither, the machine's zone is
    /// used.
    pub fn from_cli(timezone_str: Option<&str>, use_utc: bool) -> Result<Self> {
        match (use_utc, timezone_str) {
            (true, _) => Ok(Self::utc()),
            (false, Some(name)) => parse_timezone(name).map(Self::from_tz),
            (false, None) => Ok(Self::default()),
        }
    }

    /// Label shown in report headers
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Current calendar day in this zone
    pub fn today(&self) -> DailyDate {
        DailyDate::new(Utc::now().with_timezone(&self.tz).date_naive())
    }
}

/// Look up an IANA zone name such as `Europe/Berlin`
pub fn parse_timezone(name: &str) -> Result<Tz> {
    Tz::from_str(name.trim()).map_err(|_| {
        CostlineError::InvalidTimezone(format!(
            "'{name}' is not an IANA zone name (try 'America/New_York' or 'UTC')"
        ))
    })
}

/// Zone of the machine running the report
///
/// `TZ` takes precedence over the OS setting. Unknown or undetectable zones
/// resolve to UTC.
pub fn get_local_timezone() -> Tz {
    zone_from_env()
        .or_else(zone_from_os)
        .unwrap_or_else(|| {
            debug!("No usable local timezone, cutting days at UTC midnight");
            Tz::UTC
        })
}

fn zone_from_env() -> Option<Tz> {
    let name = std::env::var("TZ").ok()?;
    let tz = Tz::from_str(&name).ok()?;
    debug!("Timezone {} from TZ", name);
    Some(tz)
}

fn zone_from_os() -> Option<Tz> {
    let name = match iana_time_zone::get_timezone() {
        Ok(name) => name,
        Err(e) => {
            debug!("OS timezone lookup failed: {:?}", e);
            return None;
        }
    };
    match Tz::from_str(&name) {
        Ok(tz) => {
            debug!("Timezone {} from the OS", name);
            Some(tz)
        }
        Err(_) => {
            debug!("OS reported unknown timezone '{}'", name);
            None
        }
    }
}
