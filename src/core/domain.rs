use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_MAX_ACTIVE_HOLDS: usize = 5;
pub const DEFAULT_PICKUP_WINDOW_DAYS: i64 = 3;
pub const MAX_PICKUP_WINDOW_DAYS: i64 = 365;

const MAX_ACTIVE_HOLDS_ENV: &str = "LMS_MAX_ACTIVE_HOLDS";
const PICKUP_WINDOW_DAYS_ENV: &str = "LMS_PICKUP_WINDOW_DAYS";

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable : Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}


// Configuration abstracts config options for the reservation engine
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub branch_id: String,
    pub max_active_holds_per_patron: usize,
    pub pickup_window_days: i64,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            max_active_holds_per_patron: DEFAULT_MAX_ACTIVE_HOLDS,
            pickup_window_days: DEFAULT_PICKUP_WINDOW_DAYS,
        }
    }

    // Reads overrides from LMS_MAX_ACTIVE_HOLDS and LMS_PICKUP_WINDOW_DAYS, keeping
    // the defaults for anything missing or malformed.
    pub fn from_env(branch_id: &str) -> Self {
        let mut config = Configuration::new(branch_id);
        if let Ok(val) = std::env::var(MAX_ACTIVE_HOLDS_ENV) {
            match val.parse::<usize>() {
                Ok(max) => config = config.with_max_active_holds(max),
                Err(err) => warn!("ignoring {}={}: {}", MAX_ACTIVE_HOLDS_ENV, val, err),
            }
        }
        if let Ok(val) = std::env::var(PICKUP_WINDOW_DAYS_ENV) {
            match val.parse::<i64>() {
                Ok(days) => config = config.with_pickup_window_days(days),
                Err(err) => warn!("ignoring {}={}: {}", PICKUP_WINDOW_DAYS_ENV, val, err),
            }
        }
        config
    }

    // non-positive limits are ignored
    pub fn with_max_active_holds(mut self, max: usize) -> Self {
        if max > 0 {
            self.max_active_holds_per_patron = max;
        } else {
            warn!("ignoring non-positive max active holds {}", max);
        }
        self
    }

    // windows outside 1..=MAX_PICKUP_WINDOW_DAYS are ignored
    pub fn with_pickup_window_days(mut self, days: i64) -> Self {
        if days <= 0 {
            warn!("ignoring non-positive pickup window {}", days);
        } else if days > MAX_PICKUP_WINDOW_DAYS {
            warn!("ignoring pickup window {} above {} days", days, MAX_PICKUP_WINDOW_DAYS);
        } else {
            self.pickup_window_days = days;
        }
        self
    }
}
