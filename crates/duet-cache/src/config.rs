use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

/// Cache sizing and expiry settings.
///
/// Durations are written in seconds when serialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries held at once.
    pub capacity: usize,
    /// Lifetime of entries inserted without an explicit TTL.
    #[serde(with = "secs")]
    pub default_ttl: Duration,
    /// Period of the background expiry sweep. `None` disables the sweeper;
    /// expired entries are then only dropped on lookup or by
    /// `purge_expired`.
    #[serde(with = "opt_secs")]
    pub sweep_interval: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            default_ttl: Duration::from_secs(5 * 60),
            sweep_interval: Some(Duration::from_secs(60)),
        }
    }
}

impl CacheConfig {
    /// Shorthand for a config with the three knobs set.
    pub fn new(capacity: usize, default_ttl: Duration, sweep_interval: Option<Duration>) -> Self {
        Self {
            capacity,
            default_ttl,
            sweep_interval,
        }
    }

    pub fn validate(&self) -> CacheResult<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig {
                name: "capacity",
                reason: "must be greater than zero".into(),
            });
        }
        if self.sweep_interval.is_some_and(|d| d.is_zero()) {
            return Err(CacheError::InvalidConfig {
                name: "sweep_interval",
                reason: "must be greater than zero; omit it to disable sweeping".into(),
            });
        }
        Ok(())
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

mod opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|o| o.map(Duration::from_secs))
    }
}
