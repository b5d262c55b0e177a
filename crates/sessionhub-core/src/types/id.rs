//! Newtype wrappers around `u32` for the broker-issued entity identifiers.
//!
//! Using distinct types prevents accidentally passing a `ClientId` where a
//! `SessionId` is expected. Ids are issued and recycled by the broker's
//! allocators, so the constructor takes the raw value instead of generating
//! one; an id is unique only among *currently live* entities of its kind.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype id wrapper around `u32`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an identifier from a raw allocator-issued value.
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Return the inner value.
            pub const fn value(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a connected client.
    ClientId
);

define_id!(
    /// Unique identifier for an active session.
    SessionId
);
