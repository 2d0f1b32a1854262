// Taxonomy ingestion: CSV skill catalog, category fallback, curated synonyms.

pub mod category;
pub mod loader;
pub mod synonyms;

pub use loader::{
    load_taxonomy, load_taxonomy_file, DataFormatError, LoadReport, Taxonomy, TaxonomyError,
};
pub use synonyms::CuratedSynonyms;
