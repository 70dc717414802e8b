//! Evaluation pipeline: base scoring, order-metric overlay, combined score and
//! per-language averages.
//!
//! Each pass takes the previous [`MetricResult`] by reference and returns a new
//! one, so the passes compose in a fixed order without sharing mutable state.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{BenchError, Result};
use crate::metrics::Measure;
use crate::transform::RelevanceSet;

/// Metric name -> value.
pub type Scores = BTreeMap<String, f64>;

/// Key of the overall average entry.
pub const AVERAGE: &str = "average";

/// Per-question scores plus synthetic `average` / `average-<lang>` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricResult {
    pub questions: BTreeMap<String, Scores>,
    pub averages: BTreeMap<String, Scores>,
}

impl MetricResult {
    pub fn question(&self, qname: &str) -> Option<&Scores> {
        self.questions.get(qname)
    }

    pub fn average(&self) -> Option<&Scores> {
        self.averages.get(AVERAGE)
    }

    pub fn language_average(&self, language: &str) -> Option<&Scores> {
        self.averages.get(&language_average_key(language))
    }

    /// Number of entries as written to the output (questions and averages).
    pub fn len(&self) -> usize {
        self.questions.len() + self.averages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty() && self.averages.is_empty()
    }
}

impl Serialize for MetricResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (qname, scores) in &self.questions {
            map.serialize_entry(qname, scores)?;
        }
        for (key, scores) in &self.averages {
            map.serialize_entry(key, scores)?;
        }
        map.end()
    }
}

pub fn language_average_key(language: &str) -> String {
    format!("{}-{}", AVERAGE, language)
}

/// Name of the combined score, e.g. `set_F_ndcg`.
pub fn combined_metric_name(order_metric: Measure) -> String {
    format!("{}_{}", Measure::SetF.name(), order_metric.name())
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Mean of every metric over the given questions; metrics absent from a
/// question are averaged over the questions that have them.
fn average_scores<'a>(questions: impl Iterator<Item = &'a Scores>) -> Scores {
    let mut collected: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for scores in questions {
        for (metric, value) in scores {
            collected.entry(metric.as_str()).or_default().push(*value);
        }
    }
    collected
        .into_iter()
        .filter_map(|(metric, values)| mean(&values).map(|m| (metric.to_string(), m)))
        .collect()
}

/// Per-question combined score: the order metric where present, else `set_F`.
fn combined_score<'a>(questions: impl Iterator<Item = &'a Scores>, order_metric: &str) -> Option<f64> {
    let base = Measure::SetF.name();
    let values: Vec<f64> = questions
        .filter_map(|scores| scores.get(order_metric).or_else(|| scores.get(&base)).copied())
        .collect();
    mean(&values)
}

/// Score every qname in `predicted` against `truth` and add the `average` entry.
///
/// A predicted qname without ground truth is an error: scoring needs a 1:1
/// correspondence.
pub fn evaluate(
    predicted: &RelevanceSet,
    truth: &RelevanceSet,
    measures: &[Measure],
) -> Result<MetricResult> {
    let mut result = MetricResult::default();

    for (qname, answers) in predicted.iter() {
        let expected = truth
            .get(qname)
            .ok_or_else(|| BenchError::MissingGroundTruth(qname.to_string()))?;
        let scores: Scores = measures
            .iter()
            .map(|m| (m.name(), m.score(answers, expected)))
            .collect();
        result.questions.insert(qname.to_string(), scores);
    }

    let average = average_scores(result.questions.values());
    result.averages.insert(AVERAGE.to_string(), average);
    Ok(result)
}

/// Overwrite only `order_metric` for the qnames in `order_scores`.
///
/// Every other metric of those qnames, every other qname and the averages are
/// carried over unchanged.
pub fn overlay_order_metric(
    results: &MetricResult,
    order_scores: &MetricResult,
    order_metric: Measure,
) -> Result<MetricResult> {
    let key = order_metric.name();
    let mut merged = results.clone();

    for (qname, scores) in &order_scores.questions {
        let value = scores.get(&key).copied().ok_or_else(|| {
            BenchError::InvalidInput(format!("{} has no {} score to merge", qname, key))
        })?;
        merged
            .questions
            .get_mut(qname)
            .ok_or_else(|| BenchError::MissingGroundTruth(qname.clone()))?
            .insert(key.clone(), value);
    }

    Ok(merged)
}

/// Add `average.set_F_<order_metric>` over all questions, and refresh
/// `average.<order_metric>` from the overlaid per-question scores.
pub fn with_combined_score(results: &MetricResult, order_metric: Measure) -> MetricResult {
    let key = order_metric.name();
    let mut combined = results.clone();
    let average = combined.averages.entry(AVERAGE.to_string()).or_default();

    let order_values: Vec<f64> = results
        .questions
        .values()
        .filter_map(|scores| scores.get(&key).copied())
        .collect();
    if let Some(value) = mean(&order_values) {
        average.insert(key.clone(), value);
    }
    if let Some(value) = combined_score(results.questions.values(), &key) {
        average.insert(combined_metric_name(order_metric), value);
    }
    combined
}

/// Add `average-<lang>` entries for each language.
///
/// A question belongs to a language when its qname ends with `-<lang>`. When
/// `order_metric` is given, the combined score is recomputed per language too.
pub fn with_language_averages(
    results: &MetricResult,
    languages: &[String],
    order_metric: Option<Measure>,
) -> MetricResult {
    let mut extended = results.clone();

    for language in languages {
        let suffix = format!("-{}", language);
        let suffix = suffix.as_str();
        let in_language = move || {
            results
                .questions
                .iter()
                .filter(move |(qname, _)| qname.ends_with(suffix))
                .map(|(_, scores)| scores)
        };

        let mut average = average_scores(in_language());
        if let Some(order) = order_metric {
            if let Some(value) = combined_score(in_language(), &order.name()) {
                average.insert(combined_metric_name(order), value);
            }
        }
        extended.averages.insert(language_average_key(language), average);
    }

    extended
}

/// Full scoring configuration for one evaluation run.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub measures: Vec<Measure>,
    pub order_metric: Measure,
    pub languages: Vec<String>,
}

impl Evaluation {
    pub fn new(measures: Vec<Measure>, order_metric: Measure, languages: Vec<String>) -> Self {
        Self {
            measures,
            order_metric,
            languages,
        }
    }

    /// Run the pipeline: base scores, order overlay and combined score for
    /// `order_required` qnames, then language averages when several
    /// languages are evaluated.
    pub fn run(
        &self,
        predicted: &RelevanceSet,
        truth: &RelevanceSet,
        order_required: &[String],
    ) -> Result<MetricResult> {
        let has_order = !order_required.is_empty();
        let mut measures = self.measures.clone();
        if has_order && !measures.contains(&Measure::SetF) {
            // the combined score falls back to set_F
            measures.push(Measure::SetF);
        }
        let mut results = evaluate(predicted, truth, &measures)?;

        if has_order {
            let order_predicted = predicted.filtered(order_required)?;
            let order_truth = truth.filtered(order_required)?;
            let order_scores = evaluate(&order_predicted, &order_truth, &[self.order_metric])?;
            results = overlay_order_metric(&results, &order_scores, self.order_metric)?;
            results = with_combined_score(&results, self.order_metric);
            log::debug!(
                "Re-scored {} order-sensitive questions with {}",
                order_required.len(),
                self.order_metric
            );
        }

        if self.languages.len() > 1 {
            let order = has_order.then_some(self.order_metric);
            results = with_language_averages(&results, &self.languages, order);
        }

        Ok(results)
    }
}
