//! The object-store blob-plus-metadata value (component C).

use bytes::Bytes;

/// Metadata for a stored object, without its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedStat {
    pub content_type: String,
    pub last_modified: i64,
    pub last_fetched: i64,
    /// Negative means never-expire.
    pub ttl: i64,
    pub size: u64,
}

impl PersistedStat {
    pub fn new(content_type: impl Into<String>) -> Self {
        PersistedStat {
            content_type: content_type.into(),
            last_modified: 0,
            last_fetched: 0,
            ttl: -1,
            size: 0,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.ttl >= 0 && now >= self.last_fetched + self.ttl
    }

    /// The wall-clock time after which this object should be considered
    /// stale enough to warrant a refresh. Infinite (`i64::MAX`) if the ttl
    /// never expires.
    pub fn expiry_time(&self) -> i64 {
        if self.ttl < 0 {
            i64::MAX
        } else {
            self.last_fetched + self.ttl
        }
    }

    /// Returns a copy with the ttl clamped against `ttu` per the cached
    /// store's policy: zero/negative own-ttl is overwritten with `ttu`,
    /// otherwise take the minimum of the two.
    pub fn clamp_ttl(&self, ttu: i64) -> Self {
        let mut out = self.clone();
        out.ttl = if self.ttl > 0 { self.ttl.min(ttu) } else { ttu };
        out
    }
}

/// A stored object including its bytes.
#[derive(Debug, Clone)]
pub struct Persisted {
    pub content_type: String,
    pub last_modified: i64,
    pub last_fetched: i64,
    pub ttl: i64,
    pub data: Bytes,
}

impl Persisted {
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Persisted {
            content_type: content_type.into(),
            last_modified: 0,
            last_fetched: 0,
            ttl: -1,
            data: data.into(),
        }
    }

    pub fn stat(&self) -> PersistedStat {
        PersistedStat {
            content_type: self.content_type.clone(),
            last_modified: self.last_modified,
            last_fetched: self.last_fetched,
            ttl: self.ttl,
            size: self.data.len() as u64,
        }
    }

    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_timestamps(mut self, last_modified: i64, last_fetched: i64) -> Self {
        self.last_modified = last_modified;
        self.last_fetched = last_fetched;
        self
    }

    pub fn clamp_ttl(&self, ttu: i64) -> Self {
        let mut out = self.clone();
        out.ttl = if self.ttl > 0 { self.ttl.min(ttu) } else { ttu };
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_time_is_infinite_for_negative_ttl() {
        let stat = PersistedStat {
            ttl: -1,
            last_fetched: 100,
            ..PersistedStat::new("text/xml")
        };
        assert_eq!(stat.expiry_time(), i64::MAX);
    }

    #[test]
    fn expiry_time_adds_ttl_to_last_fetched() {
        let stat = PersistedStat {
            ttl: 10,
            last_fetched: 100,
            ..PersistedStat::new("text/xml")
        };
        assert_eq!(stat.expiry_time(), 110);
    }

    #[test]
    fn clamp_ttl_overwrites_nonpositive_own_ttl() {
        let stat = PersistedStat {
            ttl: 0,
            ..PersistedStat::new("text/xml")
        };
        assert_eq!(stat.clamp_ttl(30).ttl, 30);
    }

    #[test]
    fn clamp_ttl_takes_minimum_of_positive_ttls() {
        let stat = PersistedStat {
            ttl: 100,
            ..PersistedStat::new("text/xml")
        };
        assert_eq!(stat.clamp_ttl(30).ttl, 30);
        assert_eq!(stat.clamp_ttl(300).ttl, 100);
    }
}
