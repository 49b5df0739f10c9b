//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into per-agent `Vec`s via `id.0 as usize`, but callers
//! should prefer the `.index()` helpers for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — equivalent to the type's MAX.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a movable station (robot) in the fleet store.
    pub struct StationId(u32);
}

typed_id! {
    /// Index of a mate (human picker) in the fleet store.
    pub struct MateId(u32);
}

typed_id! {
    /// Index of a waypoint in the warehouse grid graph.
    pub struct WaypointId(u32);
}

typed_id! {
    /// Identifier of a pick order, allocated by the order book.
    pub struct OrderId(u32);
}

typed_id! {
    /// Identifier of a storage pod sitting on a waypoint.
    pub struct PodId(u32);
}

typed_id! {
    /// Identifier of a queue zone protected by an admission semaphore.
    /// `u16` keeps zone tables compact (max 65,535 zones).
    pub struct ZoneId(u16);
}

// ── ActorId ───────────────────────────────────────────────────────────────────

/// Either kind of agent, where a shared table (locks, claims) must record the
/// holder without caring which variant it is.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorId {
    Station(StationId),
    Mate(MateId),
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorId::Station(id) => write!(f, "{id}"),
            ActorId::Mate(id) => write!(f, "{id}"),
        }
    }
}

impl From<StationId> for ActorId {
    #[inline(always)]
    fn from(id: StationId) -> Self {
        ActorId::Station(id)
    }
}

impl From<MateId> for ActorId {
    #[inline(always)]
    fn from(id: MateId) -> Self {
        ActorId::Mate(id)
    }
}
