//! Conversion of raw endpoint results into relevance sets.
//!
//! A relevance set maps a qualified question name to the answer tokens for that
//! question. Every token has weight 1, and tokens keep the order in which the
//! endpoint returned them because order-sensitive metrics rank by it.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::error::{BenchError, Result};
use crate::sparql::RawEndpointResult;

/// Ordered, de-duplicated answer tokens for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    tokens: Vec<String>,
    seen: HashSet<String>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token; duplicates keep their first position.
    pub fn insert(&mut self, token: impl Into<String>) {
        let token = token.into();
        if self.seen.insert(token.clone()) {
            self.tokens.push(token);
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.seen.contains(token)
    }

    /// Tokens in ranking order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Relevance weight of a token (1 if present, 0 otherwise).
    pub fn weight(&self, token: &str) -> u32 {
        u32::from(self.contains(token))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Answers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut answers = Answers::new();
        for token in iter {
            answers.insert(token);
        }
        answers
    }
}

impl Serialize for Answers {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tokens.len()))?;
        for token in &self.tokens {
            map.serialize_entry(token, &1)?;
        }
        map.end()
    }
}

/// Mapping qname -> answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RelevanceSet(BTreeMap<String, Answers>);

impl RelevanceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, qname: impl Into<String>, answers: Answers) {
        self.0.insert(qname.into(), answers);
    }

    /// Merge another set in; entries of `other` replace existing qnames.
    pub fn extend(&mut self, other: RelevanceSet) {
        self.0.extend(other.0);
    }

    pub fn get(&self, qname: &str) -> Option<&Answers> {
        self.0.get(qname)
    }

    pub fn contains(&self, qname: &str) -> bool {
        self.0.contains_key(qname)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Answers)> {
        self.0.iter().map(|(q, a)| (q.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Subset restricted to `qnames`; every requested qname must be present.
    pub fn filtered(&self, qnames: &[String]) -> Result<RelevanceSet> {
        let mut subset = RelevanceSet::new();
        for qname in qnames {
            let answers = self
                .0
                .get(qname)
                .ok_or_else(|| BenchError::MissingGroundTruth(qname.clone()))?;
            subset.insert(qname.clone(), answers.clone());
        }
        Ok(subset)
    }
}

/// Transform one raw result into a single-entry relevance set for `qname`.
///
/// `true` becomes the token `"true"`; `false` becomes the empty set. For
/// bindings, rows are walked in order and each declared variable bound in a row
/// contributes its value.
pub fn to_relevance_set(qname: &str, raw: &RawEndpointResult) -> RelevanceSet {
    let mut answers = Answers::new();
    match raw {
        RawEndpointResult::Boolean { boolean } => {
            if *boolean {
                answers.insert("true");
            }
        }
        RawEndpointResult::Bindings { head, results } => {
            for row in &results.bindings {
                for var in &head.vars {
                    if let Some(binding) = row.get(var) {
                        answers.insert(binding.value.as_str());
                    }
                }
            }
        }
    }

    let mut set = RelevanceSet::new();
    set.insert(qname, answers);
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(json: &str) -> RawEndpointResult {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_boolean_true() {
        let set = to_relevance_set("ds:q1-en", &RawEndpointResult::Boolean { boolean: true });
        let answers = set.get("ds:q1-en").unwrap();
        assert_eq!(answers.tokens(), ["true"]);
        assert_eq!(answers.weight("true"), 1);
    }

    #[test]
    fn test_boolean_false_is_empty() {
        let set = to_relevance_set("ds:q1-en", &RawEndpointResult::Boolean { boolean: false });
        assert_eq!(set.len(), 1);
        assert!(set.get("ds:q1-en").unwrap().is_empty());
    }

    #[test]
    fn test_empty_result() {
        let set = to_relevance_set("ds:q9-de", &RawEndpointResult::empty());
        assert!(set.get("ds:q9-de").unwrap().is_empty());
    }

    #[test]
    fn test_bindings_keep_order_and_dedupe() {
        let raw = bindings(
            r#"{"head": {"vars": ["a", "b"]}, "results": {"bindings": [
                {"a": {"value": "x"}, "b": {"value": "y"}},
                {"a": {"value": "z"}},
                {"a": {"value": "y"}, "c": {"value": "ignored"}}
            ]}}"#,
        );
        let set = to_relevance_set("ds:q2-en", &raw);
        assert_eq!(set.get("ds:q2-en").unwrap().tokens(), ["x", "y", "z"]);
    }

    #[test]
    fn test_serializes_in_token_order() {
        let raw = bindings(
            r#"{"head": {"vars": ["v"]}, "results": {"bindings": [
                {"v": {"value": "zeta"}}, {"v": {"value": "alpha"}}
            ]}}"#,
        );
        let json = serde_json::to_string(&to_relevance_set("ds:q3-en", &raw)).unwrap();
        assert_eq!(json, r#"{"ds:q3-en":{"zeta":1,"alpha":1}}"#);
    }

    #[test]
    fn test_filtered_requires_presence() {
        let mut set = RelevanceSet::new();
        set.insert("ds:q1-en", ["a"].into_iter().collect());
        set.insert("ds:q2-en", ["b"].into_iter().collect());

        let subset = set.filtered(&["ds:q2-en".to_string()]).unwrap();
        assert_eq!(subset.len(), 1);
        assert!(subset.contains("ds:q2-en"));

        let err = set.filtered(&["ds:q3-en".to_string()]).unwrap_err();
        assert!(matches!(err, BenchError::MissingGroundTruth(q) if q == "ds:q3-en"));
    }
}
