//! Value Objects - Immutable objects defined by their attributes
//!
//! Value objects are identified by their attributes rather than an identity.
//! They are immutable and have no lifecycle.

pub mod identifiers;
pub mod persisted;

pub use identifiers::{AnidbId, AnimeId, AnimeMappingId, TmdbId, TmdbSeasonId, parse_anime_id};
pub use persisted::{Persisted, PersistedStat};
