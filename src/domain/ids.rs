//! Type-safe identifiers for tenants, users, shards and channels.
//!
//! The chat service assigns all of these as 64-bit snowflakes. Each one is
//! wrapped in its own newtype so a [`UserId`] can never be passed where a
//! [`TenantId`] is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw snowflake value.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw snowflake value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self)
            }
        }
    };
}

snowflake_id!(
    /// Identifier of a tenant (a guild). Externally assigned and immutable;
    /// also the storage key of the tenant's config document.
    TenantId
);

snowflake_id!(
    /// Identifier of a user account on the chat service.
    UserId
);

snowflake_id!(
    /// Identifier of a shard, the transport connection grouping many hosts.
    ShardId
);

snowflake_id!(
    /// Identifier of a text channel.
    ChannelId
);

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_number() {
        assert_eq!(TenantId::new(42).to_string(), "42");
    }

    #[test]
    fn parse_accepts_surrounding_whitespace() {
        let Ok(id) = " 1234 ".parse::<UserId>() else {
            panic!("valid id");
        };
        assert_eq!(id.get(), 1234);
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert!("guild".parse::<TenantId>().is_err());
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&ShardId::new(7)).unwrap_or_default();
        assert_eq!(json, "7");
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = TenantId::new(9);
        let mut map = HashMap::new();
        map.insert(id, "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }
}
