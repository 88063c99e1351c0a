//! Keyword statistics: log-likelihood (G²) and mutual information of a study
//! corpus against a reference corpus.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{AnalysisError, CorpusSide, Result};
use crate::frequency::FrequencyTable;

/// Chi-square critical value at 1 d.f. for p < 0.0001.
pub const LL_CRITICAL_HIGH: f64 = 15.13;
/// Chi-square critical value at 1 d.f. for p < 0.01.
pub const LL_CRITICAL_MEDIUM: f64 = 6.63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Significance {
    High,
    Medium,
    Low,
}

impl Significance {
    pub fn from_log_likelihood(ll: f64) -> Self {
        if ll > LL_CRITICAL_HIGH {
            Significance::High
        } else if ll > LL_CRITICAL_MEDIUM {
            Significance::Medium
        } else {
            Significance::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Significance::High => "High",
            Significance::Medium => "Medium",
            Significance::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordResult {
    pub word: String,
    pub study_frequency: u64,
    pub reference_frequency: u64,
    pub log_likelihood: f64,
    pub mutual_information: f64,
    pub significance: Significance,
}

/// Log-likelihood of observing `o1` in `n1` and `o2` in `n2` under the
/// hypothesis of equal relative frequency.
///
/// A zero observed frequency contributes nothing to the sum. A word absent
/// from both corpora therefore scores 0. The statistic is never negative;
/// rounding noise below zero is clamped.
pub fn log_likelihood(o1: u64, n1: u64, o2: u64, n2: u64) -> f64 {
    let (o1f, n1f, o2f, n2f) = (o1 as f64, n1 as f64, o2 as f64, n2 as f64);
    let pooled = (o1f + o2f) / (n1f + n2f);
    let e1 = n1f * pooled;
    let e2 = n2f * pooled;
    (2.0 * (ll_term(o1f, e1) + ll_term(o2f, e2))).max(0.0)
}

fn ll_term(observed: f64, expected: f64) -> f64 {
    if observed > 0.0 && expected > 0.0 {
        observed * (observed / expected).ln()
    } else {
        0.0
    }
}

/// `log2(p1 / p_total)` with `p1 = o1/n1` and `p_total = (o1+o2)/(n1+n2)`.
/// Zero when either probability is zero.
pub fn mutual_information(o1: u64, n1: u64, o2: u64, n2: u64) -> f64 {
    if n1 == 0 {
        return 0.0;
    }
    let p1 = o1 as f64 / n1 as f64;
    let p_total = (o1 as f64 + o2 as f64) / (n1 as f64 + n2 as f64);
    if p1 == 0.0 || p_total == 0.0 {
        0.0
    } else {
        (p1 / p_total).log2()
    }
}

/// Scores every study-table headword against the reference table.
///
/// Words only present in the reference table are not reported. Results are
/// sorted by log-likelihood, highest first; equal scores keep study-table
/// order.
pub fn compute_keywords(
    study: &FrequencyTable,
    reference: &FrequencyTable,
) -> Result<Vec<KeywordResult>> {
    let n1 = study.total_tokens();
    let n2 = reference.total_tokens();
    if n1 == 0 {
        return Err(AnalysisError::EmptyCorpus {
            side: CorpusSide::Study,
        });
    }
    if n2 == 0 {
        return Err(AnalysisError::EmptyCorpus {
            side: CorpusSide::Reference,
        });
    }

    let mut results: Vec<KeywordResult> = study
        .par_entries()
        .map(|entry| {
            let o1 = entry.frequency;
            let o2 = reference.frequency_of(&entry.headword);
            let ll = log_likelihood(o1, n1, o2, n2);
            KeywordResult {
                word: entry.headword.clone(),
                study_frequency: o1,
                reference_frequency: o2,
                log_likelihood: ll,
                mutual_information: mutual_information(o1, n1, o2, n2),
                significance: Significance::from_log_likelihood(ll),
            }
        })
        .collect();

    results.sort_by(|a, b| b.log_likelihood.total_cmp(&a.log_likelihood));
    log::debug!(
        "scored {} keywords (study n={n1}, reference n={n2})",
        results.len()
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyEntry;

    #[test]
    fn tche_scenario_is_medium() {
        let study = FrequencyTable::from_entries(vec![FrequencyEntry::new("tchê", 5)])
            .with_total_tokens(100);
        let reference =
            FrequencyTable::from_entries(vec![FrequencyEntry::new("tchê", 0)]).with_total_tokens(100);
        let r = compute_keywords(&study, &reference).unwrap();
        assert_eq!(r.len(), 1);
        let k = &r[0];
        assert_eq!(k.reference_frequency, 0);
        let expected = 2.0 * 5.0 * 2f64.ln();
        assert!((k.log_likelihood - expected).abs() < 1e-9);
        assert!((k.log_likelihood - 6.93).abs() < 0.01);
        assert_eq!(k.significance, Significance::Medium);
        // p1 = 0.05, p_total = 0.025
        assert!((k.mutual_information - 1.0).abs() < 1e-12);
    }

    #[test]
    fn significance_bands_are_strict() {
        assert_eq!(Significance::from_log_likelihood(15.14), Significance::High);
        assert_eq!(Significance::from_log_likelihood(15.13), Significance::Medium);
        assert_eq!(Significance::from_log_likelihood(6.64), Significance::Medium);
        assert_eq!(Significance::from_log_likelihood(6.63), Significance::Low);
        assert_eq!(Significance::from_log_likelihood(0.0), Significance::Low);
    }

    #[test]
    fn empty_totals_are_rejected() {
        let empty = FrequencyTable::default();
        let some = FrequencyTable::from_entries(vec![FrequencyEntry::new("a", 1)]);
        assert!(matches!(
            compute_keywords(&empty, &some),
            Err(AnalysisError::EmptyCorpus {
                side: CorpusSide::Study
            })
        ));
        assert!(matches!(
            compute_keywords(&some, &empty),
            Err(AnalysisError::EmptyCorpus {
                side: CorpusSide::Reference
            })
        ));
    }

    #[test]
    fn absent_everywhere_scores_zero() {
        assert_eq!(log_likelihood(0, 10, 0, 10), 0.0);
        assert_eq!(mutual_information(0, 10, 0, 10), 0.0);
    }

    #[test]
    fn equal_rates_never_round_below_zero() {
        assert!(log_likelihood(1, 12345, 3, 37035) >= 0.0);
        for k in 1..50u64 {
            for o1 in 1..20u64 {
                let n1 = 12345 + o1 * 7;
                assert!(log_likelihood(o1, n1, o1 * k, n1 * k) >= 0.0, "o1={o1} k={k}");
            }
        }
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let mi = mutual_information(u64::MAX, u64::MAX, u64::MAX, u64::MAX);
        assert!(mi.is_finite());
        assert!(mi.abs() < 1e-9);
        assert!(log_likelihood(u64::MAX, u64::MAX, 5, u64::MAX).is_finite());
    }

    #[test]
    fn equal_relative_frequency_scores_zero() {
        assert!(log_likelihood(10, 1000, 20, 2000).abs() < 1e-12);
        assert!(mutual_information(10, 1000, 20, 2000).abs() < 1e-12);
    }

    #[test]
    fn mutual_information_is_not_symmetric() {
        let forward = mutual_information(30, 1000, 10, 5000);
        let swapped = mutual_information(10, 5000, 30, 1000);
        assert!(forward > 0.0);
        assert!(swapped < 0.0);
        assert!((forward - swapped).abs() > 1e-6);
    }

    #[test]
    fn reference_only_words_are_not_surfaced() {
        let study = FrequencyTable::from_entries(vec![FrequencyEntry::new("a", 3)]);
        let reference = FrequencyTable::from_entries(vec![
            FrequencyEntry::new("a", 1),
            FrequencyEntry::new("z", 40),
        ]);
        let r = compute_keywords(&study, &reference).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].word, "a");
    }

    #[test]
    fn results_sorted_by_log_likelihood() {
        let study = FrequencyTable::from_entries(vec![
            FrequencyEntry::new("common", 10),
            FrequencyEntry::new("rare", 40),
            FrequencyEntry::new("mid", 20),
        ]);
        let reference = FrequencyTable::from_entries(vec![
            FrequencyEntry::new("common", 100),
            FrequencyEntry::new("other", 900),
        ]);
        let r = compute_keywords(&study, &reference).unwrap();
        let lls: Vec<f64> = r.iter().map(|k| k.log_likelihood).collect();
        assert!(lls.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(r[0].word, "rare");
    }
}
