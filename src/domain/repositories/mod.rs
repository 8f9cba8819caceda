//! Repository Interfaces - Abstractions for data access
//!
//! Repository interfaces define the contract for data access implementations.
//! They use domain entities and return domain errors.

pub mod anime_mapping_repository;
pub mod anime_repository;
pub mod object_store;
pub mod title_repository;

pub use anime_mapping_repository::AnimeMappingRepository;
pub use anime_repository::AnimeRepository;
pub use object_store::ObjectStore;
pub use title_repository::TitleRepository;
