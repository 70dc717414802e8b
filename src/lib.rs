pub mod config;
pub mod error;
pub mod db;
pub mod cache;
pub mod questions;
pub mod sparql;
pub mod transform;
pub mod endpoint;
pub mod collector;
pub mod resultsets;
pub mod metrics;
pub mod output;
pub mod serve;

pub use config::Config;
pub use error::{BenchError, Result};
pub use questions::{LanguageList, QuestionsFile};
pub use transform::{to_relevance_set, RelevanceSet};
