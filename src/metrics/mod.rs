//! Scoring: relevance measures and the evaluation pipeline.

pub mod engine;
pub mod measures;

pub use engine::{
    evaluate, overlay_order_metric, with_combined_score, with_language_averages, Evaluation,
    MetricResult, Scores, AVERAGE,
};
pub use measures::Measure;
