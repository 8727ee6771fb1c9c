//! Typed ID definitions for all domain entities.
//!
//! Listing, category, menu and photo identities are server-assigned integers
//! (bigserial in the live store, a monotonic counter in the fixture store).
//! Wrapping them in distinct newtypes keeps the compiler from letting a
//! `CategoryId` wander into a slot expecting a `ListingId`.
//!
//! Profiles come from the auth collaborator and are keyed by UUID.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! int_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, sqlx::Type,
        )]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

int_id! {
    /// Identity of a Listing (service offer or property).
    ListingId
}

int_id! {
    /// Identity of a service Category.
    CategoryId
}

int_id! {
    /// Identity of a navigation MenuItem.
    MenuItemId
}

int_id! {
    /// Identity of a Photo record within a listing's photo set.
    PhotoId
}

/// Identity of a resident/admin profile, issued by the auth collaborator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ProfileId(Uuid);

impl ProfileId {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for ProfileId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_is_transparent() {
        let id = ListingId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let back: ListingId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_shows_raw_value() {
        assert_eq!(CategoryId::new(7).to_string(), "7");
    }

    #[test]
    fn hash_map_key() {
        use std::collections::HashMap;
        let mut map: HashMap<ListingId, &str> = HashMap::new();
        map.insert(ListingId::new(1), "anuncio");
        assert_eq!(map.get(&ListingId::new(1)), Some(&"anuncio"));
    }
}
