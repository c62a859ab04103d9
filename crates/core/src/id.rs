//! Strongly-typed identifiers used across the domain.
//!
//! Every table row is identified by an opaque, auto-assigned, positive integer.
//! The persistence layer hands them out; callers never invent them.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Raw row identifier shared by every table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct RecordId(u64);

impl RecordId {
    /// First identifier handed out by an empty table.
    pub const FIRST: RecordId = RecordId(1);

    /// Wrap a raw value. Zero is not a valid row identifier.
    pub fn new(value: u64) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::invalid_id("record id must be positive"));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Identifier following this one in a table's sequence, or `None` once
    /// the sequence is exhausted.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u64> for RecordId {
    type Error = DomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordId> for u64 {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<u64>()
            .map_err(|e| DomainError::invalid_id(format!("RecordId: {e}")))?;
        Self::new(raw)
    }
}

/// Declare a typed row identifier wrapping [`RecordId`].
///
/// ```ignore
/// storefront_core::record_id!(ProductId, "ProductId");
/// ```
#[macro_export]
macro_rules! record_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $t(pub $crate::RecordId);

        impl $t {
            pub fn new(id: $crate::RecordId) -> Self {
                Self(id)
            }

            /// Build from a raw integer (zero is rejected).
            pub fn from_raw(value: u64) -> Result<Self, $crate::DomainError> {
                $crate::RecordId::new(value).map(Self)
            }

            pub fn get(self) -> u64 {
                self.0.get()
            }
        }

        impl ::core::fmt::Display for $t {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$crate::RecordId> for $t {
            fn from(value: $crate::RecordId) -> Self {
                Self(value)
            }
        }

        impl From<$t> for $crate::RecordId {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl ::core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<$crate::RecordId>()
                    .map(Self)
                    .map_err(|e| $crate::DomainError::invalid_id(format!("{}: {}", $name, e)))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::record_id!(WidgetId, "WidgetId");

    #[test]
    fn zero_is_not_a_record_id() {
        assert!(RecordId::new(0).is_err());
        assert!("0".parse::<RecordId>().is_err());
    }

    #[test]
    fn next_stops_at_the_last_id() {
        assert_eq!(RecordId::FIRST.next().map(RecordId::get), Some(2));
        let last = RecordId::new(u64::MAX).unwrap();
        assert_eq!(last.next(), None);
    }

    #[test]
    fn typed_ids_parse_and_display() {
        let id: WidgetId = " 42 ".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");

        let err = "abc".parse::<WidgetId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) => assert!(msg.starts_with("WidgetId")),
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let id = WidgetId::from_raw(7).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        assert!(serde_json::from_str::<WidgetId>("0").is_err());
    }
}
