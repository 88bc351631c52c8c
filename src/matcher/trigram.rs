//! Trigram extraction and similarity.
//!
//! A string is split into words (maximal runs of alphanumeric characters,
//! Unicode-aware). Each word is padded with two spaces in front and one
//! behind, then cut into overlapping 3-character windows:
//!
//! ```text
//! "cif"    ->  "  c", " ci", "cif", "if "
//! ```
//!
//! Trigrams are counted as a multiset. Similarity is the Jaccard
//! coefficient `|A ∩ B| / |A ∪ B|` with per-trigram min/max counts.
//! Characters outside ASCII are compared by code point, so "é" and "e"
//! never share a trigram.

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Three consecutive characters.
pub type Trigram = [char; 3];

type WordBuf = SmallVec<[char; 32]>;

/// Multiset of trigrams for one string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrigramSet {
    counts: HashMap<Trigram, u32>,
    total: u32,
}

impl TrigramSet {
    /// Extract the trigrams of `text`, lowercasing first when `fold_case` is set.
    pub fn extract(text: &str, fold_case: bool) -> Self {
        let mut set = TrigramSet::default();
        let mut word = WordBuf::new();

        for c in text.chars() {
            if !c.is_alphanumeric() {
                set.add_word(&word);
                word.clear();
            } else if fold_case {
                word.extend(c.to_lowercase());
            } else {
                word.push(c);
            }
        }
        set.add_word(&word);
        set
    }

    fn add_word(&mut self, word: &[char]) {
        if word.is_empty() {
            return;
        }
        let mut padded: SmallVec<[char; 36]> = SmallVec::with_capacity(word.len() + 3);
        padded.extend_from_slice(&[' ', ' ']);
        padded.extend_from_slice(word);
        padded.push(' ');

        for window in padded.windows(3) {
            *self.counts.entry([window[0], window[1], window[2]]).or_insert(0) += 1;
            self.total += 1;
        }
    }

    /// Total number of trigrams, counting repeats.
    pub fn len(&self) -> usize {
        self.total as usize
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn count(&self, trigram: &Trigram) -> u32 {
        self.counts.get(trigram).copied().unwrap_or(0)
    }

    /// Size of the multiset intersection.
    pub fn shared(&self, other: &TrigramSet) -> u32 {
        let (small, large) = if self.counts.len() <= other.counts.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .counts
            .iter()
            .map(|(trigram, &n)| n.min(large.count(trigram)))
            .sum()
    }

    /// Jaccard similarity in [0, 1]. Two empty sets score 0.
    pub fn similarity(&self, other: &TrigramSet) -> f64 {
        let shared = self.shared(other);
        let union = self.total + other.total - shared;
        if union == 0 {
            return 0.0;
        }
        f64::from(shared) / f64::from(union)
    }
}

/// Trigram similarity between two strings.
pub fn similarity(a: &str, b: &str, fold_case: bool) -> f64 {
    TrigramSet::extract(a, fold_case).similarity(&TrigramSet::extract(b, fold_case))
}
