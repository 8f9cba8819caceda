//! Anime metadata aggregation and caching service.
//!
//! Fetches, normalizes, and caches anime catalog metadata from anidb and
//! tmdb behind one archival-cache-first object store abstraction, resolves
//! titles across both catalogs, and merges matched anidb/tmdb records into
//! one normalized [`domain::entities::Anime`].

pub mod domain;
pub mod infrastructure;
pub mod shared;
