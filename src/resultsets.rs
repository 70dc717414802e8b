//! Ground-truth and predicted relevance sets for a questions file.
//!
//! Both sides are built the same way: run a SPARQL query against the dataset
//! endpoint and transform the result. Ground truth uses the reference query of
//! each question, predictions use the query the endpoint under test produced.

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::endpoint::AnswerRecord;
use crate::error::Result;
use crate::questions::{LanguageList, QuestionsFile};
use crate::sparql::{RawEndpointResult, SparqlClient};
use crate::transform::{to_relevance_set, RelevanceSet};

/// Ground truth plus the qnames whose answer order is scored.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroundTruth {
    #[serde(flatten)]
    pub sets: RelevanceSet,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_required: Vec<String>,
}

/// Read a responses file (JSON list of answer records).
pub fn load_responses(path: &Path) -> Result<Vec<AnswerRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Query the reference SPARQL of every question, once per requested language.
pub async fn ground_truth(
    sparql: &SparqlClient,
    file: &QuestionsFile,
    languages: &LanguageList,
) -> Result<GroundTruth> {
    file.require_ids()?;
    let mut truth = GroundTruth::default();

    for (idx, question) in file.questions.iter().enumerate() {
        log::info!(
            "[{}/{}] Ground truth for {}",
            idx + 1,
            file.questions.len(),
            question.id.as_deref().unwrap_or_default()
        );
        let raw = sparql.execute(question.sparql()).await;

        for language in languages.iter() {
            let Some(qname) = file.qname(question, language) else {
                continue;
            };
            truth.sets.extend(to_relevance_set(&qname, &raw));
            if question.order_matters() {
                truth.order_required.push(qname);
            }
        }
    }

    Ok(truth)
}

/// Run each answer's query; questions without an answer get the empty result.
pub async fn predicted(
    sparql: &SparqlClient,
    responses: &[AnswerRecord],
    file: &QuestionsFile,
    languages: &LanguageList,
) -> Result<RelevanceSet> {
    file.require_ids()?;

    let mut by_qname: HashMap<&str, &AnswerRecord> = HashMap::new();
    for response in responses {
        if let Some(qname) = response.qname.as_deref() {
            by_qname.entry(qname).or_insert(response);
        }
    }

    let mut predicted = RelevanceSet::new();
    for question in &file.questions {
        for language in languages.iter() {
            let Some(qname) = file.qname(question, language) else {
                continue;
            };
            let raw = match by_qname.get(qname.as_str()) {
                Some(response) => sparql.execute(&response.query).await,
                None => {
                    log::info!("qname {} not found in responses", qname);
                    RawEndpointResult::empty()
                }
            };
            predicted.extend(to_relevance_set(&qname, &raw));
        }
    }

    Ok(predicted)
}
