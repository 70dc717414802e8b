//! Relevance measures over one question's predicted and ground-truth answers.
//!
//! Set measures ignore order. Rank measures treat the predicted token order as
//! the ranking (rank 1 = first token) and use binary gains.

use crate::error::{BenchError, Result};
use crate::transform::Answers;
use std::fmt;

/// A supported relevance measure, named as in trec_eval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    /// `set_P`: |P ∩ T| / |P|
    SetPrecision,
    /// `set_recall`: |P ∩ T| / |T|
    SetRecall,
    /// `set_F`: harmonic mean of set precision and recall
    SetF,
    /// `ndcg`: normalized discounted cumulative gain over the full ranking
    Ndcg,
    /// `ndcg_cut_<k>`
    NdcgCut(usize),
    /// `recip_rank`: 1 / rank of the first relevant answer
    RecipRank,
    /// `P_<k>`: relevant answers in the top k, divided by k
    PrecisionAt(usize),
}

impl Measure {
    pub fn parse(name: &str) -> Result<Self> {
        let unknown = || BenchError::InvalidInput(format!("Unknown metric: {}", name));
        let cutoff = |rest: &str| -> Result<usize> {
            match rest.parse::<usize>() {
                Ok(k) if k > 0 => Ok(k),
                _ => Err(unknown()),
            }
        };

        match name {
            "set_P" => Ok(Measure::SetPrecision),
            "set_recall" => Ok(Measure::SetRecall),
            "set_F" => Ok(Measure::SetF),
            "ndcg" => Ok(Measure::Ndcg),
            "recip_rank" => Ok(Measure::RecipRank),
            _ => {
                if let Some(rest) = name.strip_prefix("ndcg_cut_") {
                    Ok(Measure::NdcgCut(cutoff(rest)?))
                } else if let Some(rest) = name.strip_prefix("P_") {
                    Ok(Measure::PrecisionAt(cutoff(rest)?))
                } else {
                    Err(unknown())
                }
            }
        }
    }

    pub fn name(&self) -> String {
        match self {
            Measure::SetPrecision => "set_P".to_string(),
            Measure::SetRecall => "set_recall".to_string(),
            Measure::SetF => "set_F".to_string(),
            Measure::Ndcg => "ndcg".to_string(),
            Measure::NdcgCut(k) => format!("ndcg_cut_{}", k),
            Measure::RecipRank => "recip_rank".to_string(),
            Measure::PrecisionAt(k) => format!("P_{}", k),
        }
    }

    /// Score one question.
    pub fn score(&self, predicted: &Answers, truth: &Answers) -> f64 {
        match self {
            Measure::SetPrecision => set_precision(predicted, truth),
            Measure::SetRecall => set_recall(predicted, truth),
            Measure::SetF => set_f(predicted, truth),
            Measure::Ndcg => ndcg(predicted, truth, None),
            Measure::NdcgCut(k) => ndcg(predicted, truth, Some(*k)),
            Measure::RecipRank => recip_rank(predicted, truth),
            Measure::PrecisionAt(k) => precision_at(predicted, truth, *k),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn relevant_retrieved(predicted: &Answers, truth: &Answers) -> usize {
    predicted
        .tokens()
        .iter()
        .filter(|t| truth.contains(t))
        .count()
}

fn set_precision(predicted: &Answers, truth: &Answers) -> f64 {
    if predicted.is_empty() {
        return 0.0;
    }
    relevant_retrieved(predicted, truth) as f64 / predicted.len() as f64
}

fn set_recall(predicted: &Answers, truth: &Answers) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    relevant_retrieved(predicted, truth) as f64 / truth.len() as f64
}

fn set_f(predicted: &Answers, truth: &Answers) -> f64 {
    let p = set_precision(predicted, truth);
    let r = set_recall(predicted, truth);
    if p + r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

/// Discount for a 1-based rank.
fn discount(rank: usize) -> f64 {
    ((rank + 1) as f64).log2()
}

fn ndcg(predicted: &Answers, truth: &Answers, cutoff: Option<usize>) -> f64 {
    let limit = cutoff.unwrap_or(usize::MAX);

    let dcg: f64 = predicted
        .tokens()
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, t)| f64::from(truth.weight(t)) / discount(i + 1))
        .sum();

    // Ground-truth gains are all 1, so the ideal ranking is |T| relevant answers.
    let ideal: f64 = (1..=truth.len().min(limit)).map(|rank| 1.0 / discount(rank)).sum();

    if ideal == 0.0 {
        0.0
    } else {
        dcg / ideal
    }
}

fn recip_rank(predicted: &Answers, truth: &Answers) -> f64 {
    predicted
        .tokens()
        .iter()
        .position(|t| truth.contains(t))
        .map(|i| 1.0 / (i + 1) as f64)
        .unwrap_or(0.0)
}

fn precision_at(predicted: &Answers, truth: &Answers, k: usize) -> f64 {
    let hits = predicted
        .tokens()
        .iter()
        .take(k)
        .filter(|t| truth.contains(t))
        .count();
    hits as f64 / k as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(tokens: &[&str]) -> Answers {
        tokens.iter().copied().collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_names() {
        for name in ["set_P", "set_recall", "set_F", "ndcg", "ndcg_cut_10", "recip_rank", "P_5"] {
            assert_eq!(Measure::parse(name).unwrap().name(), name);
        }
        assert!(Measure::parse("ndcg_cut_0").is_err());
        assert!(Measure::parse("P_x").is_err());
        assert!(Measure::parse("map").is_err());
    }

    #[test]
    fn test_identical_sets_score_one() {
        let p = answers(&["a", "b", "c"]);
        let t = answers(&["c", "a", "b"]);
        for m in [Measure::SetPrecision, Measure::SetRecall, Measure::SetF] {
            assert!(close(m.score(&p, &t), 1.0), "{} should be 1.0", m);
        }
        assert!(close(Measure::Ndcg.score(&p, &t), 1.0));
    }

    #[test]
    fn test_disjoint_sets_score_zero() {
        let p = answers(&["a", "b"]);
        let t = answers(&["x", "y"]);
        for m in [Measure::SetPrecision, Measure::SetRecall, Measure::SetF, Measure::Ndcg] {
            assert_eq!(m.score(&p, &t), 0.0, "{} should be 0.0", m);
        }
    }

    #[test]
    fn test_partial_overlap() {
        let p = answers(&["a", "x"]);
        let t = answers(&["a", "b", "c", "d"]);
        assert!(close(Measure::SetPrecision.score(&p, &t), 0.5));
        assert!(close(Measure::SetRecall.score(&p, &t), 0.25));
        assert!(close(Measure::SetF.score(&p, &t), 2.0 * 0.5 * 0.25 / 0.75));
    }

    #[test]
    fn test_empty_sets() {
        let empty = Answers::new();
        let t = answers(&["a"]);
        assert_eq!(Measure::SetPrecision.score(&empty, &t), 0.0);
        assert_eq!(Measure::SetRecall.score(&t, &empty), 0.0);
        assert_eq!(Measure::SetF.score(&empty, &empty), 0.0);
        assert_eq!(Measure::Ndcg.score(&t, &empty), 0.0);
    }

    #[test]
    fn test_ndcg_depends_on_order() {
        let t = answers(&["a"]);
        let first = answers(&["a", "x"]);
        let second = answers(&["x", "a"]);
        assert!(close(Measure::Ndcg.score(&first, &t), 1.0));
        assert!(close(Measure::Ndcg.score(&second, &t), 1.0 / 3f64.log2()));
        // set measures don't care
        assert_eq!(
            Measure::SetF.score(&first, &t),
            Measure::SetF.score(&second, &t)
        );
    }

    #[test]
    fn test_ndcg_cut() {
        let t = answers(&["a", "b"]);
        let p = answers(&["x", "a", "b"]);
        // only "x" survives the cut
        assert_eq!(Measure::NdcgCut(1).score(&p, &t), 0.0);
        let dcg = 1.0 / 3f64.log2();
        let ideal = 1.0 + 1.0 / 3f64.log2();
        assert!(close(Measure::NdcgCut(2).score(&p, &t), dcg / ideal));
    }

    #[test]
    fn test_recip_rank_and_precision_at() {
        let t = answers(&["b"]);
        let p = answers(&["a", "b", "c"]);
        assert!(close(Measure::RecipRank.score(&p, &t), 0.5));
        assert!(close(Measure::PrecisionAt(2).score(&p, &t), 0.5));
        assert!(close(Measure::PrecisionAt(5).score(&p, &t), 0.2));
    }
}
