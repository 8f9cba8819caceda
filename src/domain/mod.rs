//! Domain Layer - Pure business logic and domain models
//!
//! This layer contains:
//! - Entities: Core business objects with identity
//! - Value Objects: Immutable objects defined by their attributes
//! - Domain Services: Stateless services containing business logic
//! - Repository Interfaces: Abstractions for data access

pub mod entities;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::{Anime, AnimeEntry, AnimeMapping, Episode, Season, Title, TitleEntry, TitleMappingResult};
pub use value_objects::{AnidbId, AnimeId, AnimeMappingId, Persisted, PersistedStat, TmdbId, TmdbSeasonId};
