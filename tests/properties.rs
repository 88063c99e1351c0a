//! Property tests for the statistical and positional invariants.

use lyric_corpus::{Corpus, NGramOptions, concordance, dispersion, log_likelihood, ngrams};
use proptest::prelude::*;

/// Documents drawn from a tiny vocabulary so words repeat often.
fn corpus_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    let token = prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(String::from);
    prop::collection::vec(prop::collection::vec(token, 0..12), 1..6)
}

proptest! {
    #[test]
    fn log_likelihood_is_non_negative(
        o1 in 0u64..10_000,
        extra1 in 1u64..1_000_000,
        o2 in 0u64..10_000,
        extra2 in 1u64..1_000_000,
    ) {
        let ll = log_likelihood(o1, o1 + extra1, o2, o2 + extra2);
        prop_assert!(ll.is_finite());
        prop_assert!(ll >= 0.0, "ll = {}", ll);
    }

    #[test]
    fn log_likelihood_at_equal_rates_is_non_negative(
        o1 in 1u64..1_000,
        n1 in 1_000u64..100_000,
        k in 1u64..100,
    ) {
        prop_assert!(log_likelihood(o1, n1, o1 * k, n1 * k) >= 0.0);
    }

    #[test]
    fn kwic_window_lengths(
        docs in corpus_strategy(),
        left in 0usize..6,
        right in 0usize..6,
    ) {
        let corpus = Corpus::from_token_lists(docs.clone());
        let lines = concordance(&corpus, "a", left, right).unwrap();

        let mut expected = Vec::new();
        for doc in &docs {
            for (i, t) in doc.iter().enumerate() {
                if t == "a" {
                    expected.push((i.min(left), (doc.len() - i - 1).min(right)));
                }
            }
        }
        let count = |s: &str| if s.is_empty() { 0 } else { s.split(' ').count() };
        let got: Vec<(usize, usize)> = lines
            .iter()
            .map(|l| (count(&l.left_context), count(&l.right_context)))
            .collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn ngram_total_matches_window_count(docs in corpus_strategy(), n in 2usize..=5) {
        let expected: usize = docs.iter().map(|d| d.len().saturating_sub(n - 1)).sum();
        let corpus = Corpus::from_token_lists(docs);
        let a = ngrams(&corpus, &NGramOptions::new(n)).unwrap();
        prop_assert_eq!(a.total_ngrams, expected);
        prop_assert!(a.ngrams.iter().all(|e| e.frequency >= 2 && e.samples.len() <= 10));
        prop_assert!(a.ngrams.windows(2).all(|w| w[0].frequency >= w[1].frequency));
    }

    #[test]
    fn dispersion_stays_in_unit_interval(docs in corpus_strategy()) {
        let corpus = Corpus::from_token_lists(docs);
        let r = dispersion(&corpus, "b").unwrap();
        prop_assert!((0.0..=1.0).contains(&r.dispersion_coefficient));
        prop_assert_eq!(r.occurrence_points.len(), r.total_occurrences);
        if r.total_occurrences == 0 {
            prop_assert_eq!(r.dispersion_coefficient, 0.0);
        }
    }
}
