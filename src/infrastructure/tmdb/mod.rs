//! Tmdb catalog integration: show fetching and JSON parsing (K), title
//! search (K.1), and the image store (K.2).

pub mod image_store;
pub mod parser;
pub mod show_store;
pub mod title_search;

pub use image_store::TmdbImageStore;
pub use parser::parse_tmdb_show;
pub use show_store::TmdbShowStore;
pub use title_search::TmdbTitleSearch;
