//! Fuzzy string matching for knowledge-base lookup.
//!
//! Gestalt pattern matching (Ratcliff/Obershelp): the similarity of two
//! strings is `2*M / T`, where `T` is the total number of characters and `M`
//! the number of characters in matching blocks. Blocks are found by taking the
//! longest common run, then recursing into the pieces on either side.

use crate::error::{ChatError, Result};
use std::collections::HashMap;

/// Default number of candidates kept by [`close_matches`]
pub const DEFAULT_TOP_N: usize = 1;

/// Default minimum similarity for a match
pub const DEFAULT_CUTOFF: f64 = 0.5;

/// Sequences at least this long get popular characters ignored as match seeds
const AUTOJUNK_MIN_LEN: usize = 200;

/// Lookup tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    top_n: usize,
    cutoff: f64,
}

impl MatchOptions {
    pub fn new(top_n: usize, cutoff: f64) -> Result<Self> {
        if top_n == 0 {
            return Err(ChatError::InvalidMatchOptions(
                "top_n must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(ChatError::InvalidMatchOptions(format!(
                "cutoff must be within [0, 1], got {}",
                cutoff
            )));
        }
        Ok(Self { top_n, cutoff })
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

/// A candidate that cleared the cutoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Position in the candidate list
    pub index: usize,
    pub score: f64,
}

/// Pre-indexed second sequence
struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each (non-popular) char in `b`
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` / `b[blo..bhi]`.
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i-1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let prev = if j > 0 {
                        j2len.get(&(j - 1)).copied().unwrap_or(0)
                    } else {
                        0
                    };
                    let k = prev + 1;
                    new_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Popular chars never seed a match but may extend one
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// Total number of characters in matching blocks
    fn matched_chars(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }

    fn ratio(&self) -> f64 {
        ratio_of(self.matched_chars(), self.a.len() + self.b.len())
    }
}

fn ratio_of(matches: usize, length: usize) -> f64 {
    if length == 0 {
        1.0
    } else {
        2.0 * matches as f64 / length as f64
    }
}

/// Upper bound on the ratio from lengths alone
fn real_quick_ratio(a: &[char], b: &[char]) -> f64 {
    ratio_of(a.len().min(b.len()), a.len() + b.len())
}

/// Upper bound on the ratio from the shared character multiset
fn quick_ratio(a: &[char], b: &[char]) -> f64 {
    let mut counts: HashMap<char, isize> = HashMap::new();
    for c in b {
        *counts.entry(*c).or_insert(0) += 1;
    }
    let mut matches = 0;
    for c in a {
        let available = counts.entry(*c).or_insert(0);
        if *available > 0 {
            matches += 1;
        }
        *available -= 1;
    }
    ratio_of(matches, a.len() + b.len())
}

/// Similarity of two strings in `[0, 1]`.
///
/// Not symmetric in general: `b` is the indexed sequence.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}

/// Candidates scoring at least `opts.cutoff()` against `query`, best first.
///
/// Equal scores keep candidate order, so the earliest candidate wins a tie.
pub fn close_matches<S: AsRef<str>>(
    query: &str,
    candidates: &[S],
    opts: &MatchOptions,
) -> Vec<Candidate> {
    let b: Vec<char> = query.chars().collect();
    let mut hits = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let a: Vec<char> = candidate.as_ref().chars().collect();
        if real_quick_ratio(&a, &b) < opts.cutoff || quick_ratio(&a, &b) < opts.cutoff {
            continue;
        }
        let score = SequenceMatcher::new(&a, &b).ratio();
        if score >= opts.cutoff {
            hits.push(Candidate { index, score });
        }
    }

    // Stable sort keeps iteration order among ties
    hits.sort_by(|x, y| y.score.total_cmp(&x.score));
    hits.truncate(opts.top_n);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_strings() {
        assert!(approx(similarity_ratio("como cancelar", "como cancelar"), 1.0));
        assert!(approx(similarity_ratio("", ""), 1.0));
    }

    #[test]
    fn test_disjoint_strings() {
        assert!(approx(similarity_ratio("abc", "xyz"), 0.0));
        assert!(approx(similarity_ratio("abc", ""), 0.0));
    }

    #[test]
    fn test_known_ratios() {
        assert!(approx(similarity_ratio("abcd", "bcde"), 0.75));
        // Longest block is found first, so order matters
        assert!(approx(similarity_ratio("tide", "diet"), 0.25));
        assert!(approx(similarity_ratio("diet", "tide"), 0.5));
    }

    #[test]
    fn test_unicode_counts_chars_not_bytes() {
        // "horário" vs "horario": 6 of 7 chars match on each side
        let score = similarity_ratio("horário", "horario");
        assert!(approx(score, 12.0 / 14.0), "got {}", score);
    }

    #[test]
    fn test_quick_ratios_are_upper_bounds() {
        let a: Vec<char> = "preço do plano básico".chars().collect();
        let b: Vec<char> = "custo do plano".chars().collect();
        let full = SequenceMatcher::new(&a, &b).ratio();
        assert!(quick_ratio(&a, &b) >= full);
        assert!(real_quick_ratio(&a, &b) >= quick_ratio(&a, &b));
    }

    #[test]
    fn test_autojunk_long_sequences() {
        // 'a' is popular in a 200+ char sequence: it cannot seed a match,
        // only extend the empty one at the origin
        let long_b = "a".repeat(250);
        let score = similarity_ratio("a", &long_b);
        assert!(approx(score, 2.0 / 251.0), "got {}", score);

        let short_b = "a".repeat(50);
        assert!(approx(similarity_ratio("a", &short_b), 2.0 / 51.0));
    }

    #[test]
    fn test_close_matches_cutoff() {
        let questions = ["horário de atendimento", "preço do plano básico", "como cancelar"];
        let hits = close_matches("como cancelo", &questions, &MatchOptions::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 2);
        assert!(hits[0].score >= 0.5);

        assert!(close_matches("xyz123", &questions, &MatchOptions::default()).is_empty());
    }

    #[test]
    fn test_close_matches_ties_keep_first() {
        let questions = ["abc", "abc", "abd"];
        let opts = MatchOptions::new(3, 0.5).unwrap();
        let hits = close_matches("abc", &questions, &opts);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].index, 0);
        assert_eq!(hits[1].index, 1);
        assert_eq!(hits[2].index, 2);
    }

    #[test]
    fn test_close_matches_top_n_truncates() {
        let questions = ["abcd", "abce", "abcf"];
        let opts = MatchOptions::new(2, 0.1).unwrap();
        assert_eq!(close_matches("abcd", &questions, &opts).len(), 2);
    }

    #[test]
    fn test_match_options_validation() {
        assert!(MatchOptions::new(0, 0.5).is_err());
        assert!(MatchOptions::new(1, 1.5).is_err());
        assert!(MatchOptions::new(1, -0.1).is_err());
        let opts = MatchOptions::new(1, 1.0).unwrap();
        assert_eq!(opts.top_n(), 1);
        assert!(approx(opts.cutoff(), 1.0));
    }
}
