//! Anime-mapping repository backends (component L).

pub mod document;
pub mod factory;
pub mod relational;

pub use document::DocumentAnimeMappingRepository;
pub use factory::{anime_mapping_repo, MappingFactoryError};
pub use relational::SqliteAnimeMappingRepository;
