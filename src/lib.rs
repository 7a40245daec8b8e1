pub mod alias;
pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod lexer;
pub mod mode;
pub mod reader;
pub mod references;
pub mod report;
pub mod scope;
pub mod state;

// Re-export the main public API
pub use api::{get_matching_paths, run};
pub use config::load_config;
pub use error::{ExtractError, SqlrefsError};
pub use extractor::{extract, process_query, Extraction};
pub use mode::{Mode, OutputFormat};
pub use references::References;
