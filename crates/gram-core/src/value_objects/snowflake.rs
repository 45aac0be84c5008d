//! 64-bit platform identifier
//!
//! Every id this system touches (posts, members, channels, roles, custom
//! emoji) is a platform snowflake: 64 unsigned bits packing a millisecond
//! timestamp, a worker number and a per-millisecond sequence. Ids arrive on
//! the wire as decimal strings and land in Postgres as `BIGINT`, so the type
//! carries explicit conversions for both edges. Tag rows are minted locally
//! by [`SnowflakeGenerator`] and share the same shape.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const WORKER_BITS: u32 = 10;
const SEQ_BITS: u32 = 12;
const SEQ_MASK: u64 = (1 << SEQ_BITS) - 1;

/// Milliseconds of 2024-01-01T00:00:00Z, the instant locally minted ids
/// count from
const EPOCH_MS: u64 = 1_704_067_200_000;

/// An unsigned 64-bit platform id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(u64);

impl Snowflake {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw unsigned value
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Value as stored in a `BIGINT` column; ids above `i64::MAX` wrap to
    /// negative and [`from_db`](Self::from_db) wraps them back
    #[inline]
    pub const fn as_db(self) -> i64 {
        self.0 as i64
    }

    /// Rebuild from a `BIGINT` column value
    #[inline]
    pub const fn from_db(raw: i64) -> Self {
        Self(raw as u64)
    }

    /// Parse the wire form, a decimal string
    pub fn parse(s: &str) -> Result<Self, InvalidSnowflake> {
        s.parse::<u64>().map(Self).map_err(|_| InvalidSnowflake)
    }
}

/// A string that does not hold a decimal 64-bit id
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("not a snowflake id")]
pub struct InvalidSnowflake;

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for Snowflake {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for u64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl FromStr for Snowflake {
    type Err = InvalidSnowflake;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// JSON carries ids as strings so consumers reading them as doubles never
// lose precision.
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = Snowflake;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal string or unsigned integer id")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Snowflake, E> {
                Ok(Snowflake(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Snowflake, E> {
                Snowflake::parse(v).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Mints ids for rows created locally (tags)
///
/// One atomic word packs the last-used millisecond and the sequence within
/// it, so minting is lock-free and ids from one generator are strictly
/// increasing.
pub struct SnowflakeGenerator {
    worker: u64,
    /// last millisecond << SEQ_BITS | sequence
    state: AtomicU64,
}

impl SnowflakeGenerator {
    /// # Panics
    /// Panics when `worker` does not fit in 10 bits.
    pub fn new(worker: u16) -> Self {
        assert!(
            u32::from(worker) < (1 << WORKER_BITS),
            "worker id must fit in 10 bits"
        );
        Self {
            worker: u64::from(worker),
            state: AtomicU64::new(0),
        }
    }

    pub fn generate(&self) -> Snowflake {
        loop {
            let now = clock_ms();
            let claim = self
                .state
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                    let last = state >> SEQ_BITS;
                    let seq = state & SEQ_MASK;
                    if now > last {
                        Some(now << SEQ_BITS)
                    } else if seq < SEQ_MASK {
                        // Same millisecond, or the clock stepped back: stay
                        // on `last` so ids keep increasing.
                        Some((last << SEQ_BITS) | (seq + 1))
                    } else {
                        None
                    }
                });

            match claim {
                Ok(prev) => {
                    let last = prev >> SEQ_BITS;
                    let (ms, seq) = if now > last {
                        (now, 0)
                    } else {
                        (last, (prev & SEQ_MASK) + 1)
                    };
                    let id = (ms.saturating_sub(EPOCH_MS) << (WORKER_BITS + SEQ_BITS))
                        | (self.worker << SEQ_BITS)
                        | seq;
                    return Snowflake(id);
                }
                // Sequence exhausted for that millisecond
                Err(_) => std::thread::yield_now(),
            }
        }
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

fn clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}
