//! Questions file model: dataset, questions, validation and qualified names.

pub mod languages;

pub use languages::LanguageList;

use crate::error::{BenchError, Result};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Feature flag marking questions whose answer order is scored.
pub const RESULT_ORDER_MATTERS: &str = "RESULT_ORDER_MATTERS";

/// Benchmark dataset the questions are asked about.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    /// Dataset URI, sent to the endpoint and used as base for question URIs.
    pub id: String,
    /// Short prefix used in qualified question names.
    pub prefix: String,
}

impl Dataset {
    /// Qualified name `prefix:id-lang`.
    pub fn qname(&self, question_id: &str, language: &str) -> String {
        format!("{}:{}-{}", self.prefix, question_id, language)
    }

    /// Full URI `id` + `question_id-lang`.
    pub fn uri(&self, question_id: &str, language: &str) -> String {
        format!("{}{}-{}", self.id, question_id, language)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionQuery {
    pub sparql: String,
}

/// One benchmark question with its texts per language and the reference query.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<String>,
    /// Question text per language, in file order.
    #[serde(rename = "question", deserialize_with = "ordered_texts")]
    pub texts: Vec<(String, String)>,
    pub query: QuestionQuery,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Question {
    pub fn sparql(&self) -> &str {
        &self.query.sparql
    }

    pub fn order_matters(&self) -> bool {
        self.features.iter().any(|f| f == RESULT_ORDER_MATTERS)
    }
}

/// A validated questions file.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionsFile {
    pub dataset: Dataset,
    pub questions: Vec<Question>,
}

impl QuestionsFile {
    /// Parse and validate a questions file from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: QuestionsFile = serde_yaml_ng::from_str(content)?;
        file.validate()?;
        Ok(file)
    }

    /// Read, parse and validate a questions file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Either all questions have an id or none do; ids are unique.
    pub fn validate(&self) -> Result<()> {
        let with_id = self.questions.iter().filter(|q| q.id.is_some()).count();
        if with_id != 0 && with_id != self.questions.len() {
            return Err(BenchError::Validation("Only some questions have a ID".to_string()));
        }

        let mut seen = HashSet::new();
        for id in self.questions.iter().filter_map(|q| q.id.as_deref()) {
            if !seen.insert(id) {
                return Err(BenchError::Validation("Questions must have unique ids".to_string()));
            }
        }
        Ok(())
    }

    pub fn has_ids(&self) -> bool {
        self.questions.iter().all(|q| q.id.is_some()) && !self.questions.is_empty()
    }

    /// Scoring joins on qnames, so every question needs an id.
    pub fn require_ids(&self) -> Result<()> {
        if self.has_ids() {
            Ok(())
        } else {
            Err(BenchError::Validation(
                "Questions need ids to build qualified names".to_string(),
            ))
        }
    }

    /// Qualified name for a question, when it has an id.
    pub fn qname(&self, question: &Question, language: &str) -> Option<String> {
        question
            .id
            .as_deref()
            .map(|id| self.dataset.qname(id, language))
    }
}

/// Ids may be written as strings or bare integers.
fn optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Text(String),
        Number(i64),
    }

    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(|id| match id {
        IdRepr::Text(s) => s,
        IdRepr::Number(n) => n.to_string(),
    }))
}

fn ordered_texts<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TextsVisitor;

    impl<'de> Visitor<'de> for TextsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a mapping from language code to question text")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut texts = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((lang, text)) = map.next_entry::<String, String>()? {
                texts.push((lang, text));
            }
            Ok(texts)
        }
    }

    deserializer.deserialize_map(TextsVisitor)
}
