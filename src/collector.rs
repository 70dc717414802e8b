//! Answer collection: every question in every language, one at a time.

use crate::cache::ResponseCache;
use crate::endpoint::{AnswerRecord, Outcome, RetryingRequester};
use crate::error::Result;
use crate::questions::QuestionsFile;

/// Counters for the end-of-run summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectStats {
    pub asked: usize,
    pub cached: usize,
    pub skipped: usize,
}

pub struct AnswerCollector<'a> {
    requester: RetryingRequester<'a>,
    cache: &'a ResponseCache,
}

impl<'a> AnswerCollector<'a> {
    pub fn new(requester: RetryingRequester<'a>, cache: &'a ResponseCache) -> Self {
        Self { requester, cache }
    }

    /// Ask every question in every language it is written in, in file order.
    ///
    /// Skipped questions are left out of the returned list.
    pub async fn collect(&self, file: &QuestionsFile) -> Result<(Vec<AnswerRecord>, CollectStats)> {
        let endpoint = self.requester.endpoint();
        let dataset = &file.dataset;
        let mut answers = Vec::new();
        let mut stats = CollectStats::default();

        log::info!(
            "Asking questions about dataset {} on endpoint {}.",
            dataset.id,
            endpoint
        );
        if !self.cache.is_enabled() {
            log::info!("Response cache disabled, every question goes to the endpoint.");
        }

        for question in &file.questions {
            for (language, text) in &question.texts {
                log::info!("{} ({}) ... ", text, language);
                stats.asked += 1;

                let qname = file.qname(question, language);
                let label = qname.as_deref().unwrap_or(text.as_str());

                let mut record = match self.cache.lookup(endpoint, &dataset.id, text).await? {
                    Some(cached) => {
                        log::info!("Cached response found.");
                        stats.cached += 1;
                        cached
                    }
                    None => match self.requester.ask(&dataset.id, text, label).await {
                        Outcome::Answered(record) => {
                            self.cache.store(endpoint, &dataset.id, text, &record).await?;
                            record
                        }
                        Outcome::Skipped(reason) => {
                            log::debug!("{} skipped: {}", label, reason);
                            stats.skipped += 1;
                            continue;
                        }
                    },
                };

                if let (Some(id), false) = (question.id.as_deref(), dataset.prefix.is_empty()) {
                    record.qname = Some(dataset.qname(id, language));
                    record.uri = Some(dataset.uri(id, language));
                }
                answers.push(record);
            }
        }

        Ok((answers, stats))
    }
}
