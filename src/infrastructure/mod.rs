//! Infrastructure layer: object store backends (filesystem, S3, HTTP,
//! caching, single-file), the anidb and tmdb catalog integrations, the
//! anime-mapping repositories, and the shared URL/throttling helpers they
//! all build on.

pub mod anidb;
pub mod mapping;
pub mod object_store;
pub mod throttle;
pub mod tmdb;
pub mod url;
