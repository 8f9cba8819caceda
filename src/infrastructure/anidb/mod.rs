//! Anidb catalog integration: title index (H/I), per-anime XML parsing (J),
//! HTTP stores, and the repository orchestration layer (S).

pub mod error_xml;
pub mod http_store;
pub mod parser;
pub mod repository;
pub mod title_repo;
pub mod titles_xml;

pub use repository::AnidbAnimeRepository;
pub use title_repo::{InMemoryTitleRepository, OverlayTitleRepository, XmlIndexTitleRepository};
