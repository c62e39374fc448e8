//! Nearest-codeword searches.
//!
//! Both strategies take a received word of `end_dim` bits and return the
//! codeword closest to it in Hamming distance, which undoes any corruption
//! of strictly less than `2^(order - 2)` bits.
//!
//! The semi-exhaustive strategy walks the half of the plain-word space with
//! the constant bit clear and scores each candidate codeword by its
//! correlation with the received word, `end_dim - 2 * distance`. A negative
//! correlation means the *complement* of the candidate is the closer
//! codeword, and complementing a codeword is the same as setting the
//! constant bit of its plain word, so the other half of the space comes for
//! free. The transform strategy reaches the same answer in one pass by
//! multiplying the signed received word with the Sylvester-Hadamard matrix
//! and locating the peak of the transform.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gf2::{Bit, Word};

use super::ReedMuller;

/// Identifies a nearest-codeword search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Semi-exhaustive candidate enumeration.
    Exhaustive,
    /// Hadamard-transform peak search.
    Transform,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhaustive => write!(f, "exhaustive"),
            Self::Transform => write!(f, "transform"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exhaustive" => Ok(Self::Exhaustive),
            "transform" => Ok(Self::Transform),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown search strategy '{other}', expected 'exhaustive' or 'transform'"
            ))),
        }
    }
}

/// Trait defining the interface for nearest-codeword searches.
pub trait SearchStrategy: fmt::Debug + Send + Sync {
    /// Returns the kind of this strategy.
    fn kind(&self) -> StrategyKind;

    /// Returns the codeword of `code` nearest to `word`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `word` is not `end_dim` bits
    /// long.
    fn search(&self, code: &ReedMuller, word: &Word) -> Result<Word>;

    /// Returns the name of the strategy.
    fn name(&self) -> &str;
}

/// Factory function to create a search strategy of the given kind.
///
/// The parallel flag applies to the exhaustive strategy, which can
/// partition its candidates across the rayon thread pool; the transform
/// strategy is a single pass and ignores it.
pub fn create_strategy(kind: StrategyKind, parallel: bool) -> Box<dyn SearchStrategy> {
    match kind {
        StrategyKind::Exhaustive => Box::new(ExhaustiveSearch::new().with_parallel(parallel)),
        StrategyKind::Transform => Box::new(TransformSearch::new()),
    }
}

/// Correlation between a candidate codeword and a received word.
///
/// Ranges from `-end_dim` to `end_dim`; the implied distance to the
/// candidate is `(end_dim - f) / 2`, and to its complement
/// `(end_dim + f) / 2`.
fn correlation(end_dim: usize, codeword: &Word, word: &Word) -> Result<i64> {
    let distance = codeword.hamming_distance(word)?;
    Ok(end_dim as i64 - 2 * distance as i64)
}

/// The semi-exhaustive reference search.
///
/// Enumerates the `2^order` plain words with the constant bit clear in
/// ascending order; ties between equally distant codewords resolve to the
/// earliest candidate, whether the enumeration runs sequentially or in
/// parallel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSearch {
    parallel: bool,
}

impl ExhaustiveSearch {
    /// Creates a sequential exhaustive search.
    pub fn new() -> Self {
        Self { parallel: false }
    }

    /// Sets whether candidates are partitioned across worker threads.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns whether the parallel path is enabled.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Scores one candidate, returning its implied distance, its position
    /// in the enumeration and the winning plain word.
    ///
    /// When the correlation is negative the complemented codeword is the
    /// closer one; its plain word is the candidate with the constant bit
    /// set, at `index + end_dim` in the whole-space numbering.
    fn evaluate(
        code: &ReedMuller,
        word: &Word,
        index: usize,
        candidate: &Word,
    ) -> Result<(usize, usize, Word)> {
        let end = code.end_dim() as i64;
        let f = correlation(code.end_dim(), &code.encode(candidate)?, word)?;
        if f >= 0 {
            Ok((((end - f) / 2) as usize, index, candidate.clone()))
        } else {
            let value = BigUint::from(index + code.end_dim());
            let winner = Word::from_biguint_sized(&value, code.start_dim())?;
            Ok((((end + f) / 2) as usize, index, winner))
        }
    }

    fn search_sequential(code: &ReedMuller, word: &Word) -> Result<Word> {
        let mut min = usize::MAX;
        let mut winner = Word::zero(code.start_dim());
        let mut candidate = Word::zero(code.start_dim());
        for index in 0..code.end_dim() {
            let (implied, _, plain) = Self::evaluate(code, word, index, &candidate)?;
            if implied < min {
                min = implied;
                winner = plain;
            }
            candidate = candidate.plus_one();
        }
        code.encode(&winner)
    }

    fn search_parallel(code: &ReedMuller, word: &Word) -> Result<Word> {
        let identity = || (usize::MAX, usize::MAX, Word::zero(code.start_dim()));
        let (_, _, winner) = (0..code.end_dim())
            .into_par_iter()
            .map(|index| {
                let value = BigUint::from(index);
                let candidate = Word::from_biguint_sized(&value, code.start_dim())?;
                Self::evaluate(code, word, index, &candidate)
            })
            .try_reduce(identity, |best, other| {
                // Keyed by (distance, enumeration index) so the outcome
                // matches the sequential scan regardless of split order.
                Ok(if (other.0, other.1) < (best.0, best.1) {
                    other
                } else {
                    best
                })
            })?;
        code.encode(&winner)
    }
}

impl SearchStrategy for ExhaustiveSearch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Exhaustive
    }

    fn search(&self, code: &ReedMuller, word: &Word) -> Result<Word> {
        code.check_length(word, code.end_dim())?;
        if self.parallel {
            Self::search_parallel(code, word)
        } else {
            Self::search_sequential(code, word)
        }
    }

    fn name(&self) -> &str {
        "semi-exhaustive search"
    }
}

/// The Hadamard-transform search.
///
/// Multiplies the signed received word (bit 0 mapped to `+1`, bit 1 to
/// `-1`) by the sign matrix. The transform entry at position `i` is the
/// correlation with the codeword of plain word `i`, so the entry of
/// largest absolute value names the winner; a negative peak points at the
/// complemented codeword.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformSearch;

impl TransformSearch {
    /// Creates a transform search.
    pub fn new() -> Self {
        Self
    }
}

impl SearchStrategy for TransformSearch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Transform
    }

    fn search(&self, code: &ReedMuller, word: &Word) -> Result<Word> {
        code.check_length(word, code.end_dim())?;
        let end_dim = code.end_dim();
        let sign = code.sign_matrix();

        let signs: Vec<i32> = word
            .iter()
            .map(|bit| if bit == Bit::ZERO { 1 } else { -1 })
            .collect();

        // Row-by-row accumulation keeps the flat sign matrix in scan order.
        let mut transformed = vec![0i32; end_dim];
        for (j, &s) in signs.iter().enumerate() {
            for (i, &h) in sign.row(j).iter().enumerate() {
                transformed[i] += s * h;
            }
        }

        // First peak by absolute value wins, matching the exhaustive
        // strategy's tie-break.
        let mut peak_index = 0;
        let mut peak = transformed[0];
        for (i, &value) in transformed.iter().enumerate().skip(1) {
            if value.abs() > peak.abs() {
                peak = value;
                peak_index = i;
            }
        }

        let winner = if peak < 0 {
            peak_index + end_dim
        } else {
            peak_index
        };
        let plain = Word::from_biguint_sized(&BigUint::from(winner), code.start_dim())?;
        code.encode(&plain)
    }

    fn name(&self) -> &str {
        "transform search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn word(bits: &str) -> Word {
        bits.parse().unwrap()
    }

    fn all_codewords(code: &ReedMuller) -> Vec<Word> {
        let mut codewords = Vec::new();
        let mut plain = Word::zero(code.start_dim());
        for _ in 0..(1usize << code.start_dim()) {
            codewords.push(code.encode(&plain).unwrap());
            plain = plain.plus_one();
        }
        codewords
    }

    fn random_word(rng: &mut ChaCha8Rng, len: usize) -> Word {
        let mut w = Word::zero(len);
        for i in 0..len {
            if rng.random::<bool>() {
                w.set(i, Bit::ONE);
            }
        }
        w
    }

    fn strategies() -> Vec<Box<dyn SearchStrategy>> {
        vec![
            Box::new(ExhaustiveSearch::new()),
            Box::new(ExhaustiveSearch::new().with_parallel(true)),
            Box::new(TransformSearch::new()),
        ]
    }

    #[test]
    fn test_exact_codewords_are_fixed_points() {
        for order in [3, 4] {
            let code = ReedMuller::new(order).unwrap();
            for codeword in all_codewords(&code) {
                for strategy in strategies() {
                    assert_eq!(
                        strategy.search(&code, &codeword).unwrap(),
                        codeword,
                        "{} on {codeword}",
                        strategy.name()
                    );
                }
            }
        }
    }

    #[test]
    fn test_single_flip_corrected_for_every_message() {
        // Covers plain words with the constant bit both clear and set, so
        // both the direct and the complement branches are exercised.
        for order in [3, 4] {
            let code = ReedMuller::new(order).unwrap();
            for codeword in all_codewords(&code) {
                for i in 0..code.end_dim() {
                    let mut corrupted = codeword.clone();
                    corrupted.set(i, corrupted[i].complement());
                    for strategy in strategies() {
                        assert_eq!(
                            strategy.search(&code, &corrupted).unwrap(),
                            codeword,
                            "{} failed on flip {i} of {codeword}",
                            strategy.name()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_corrects_up_to_correction_radius() {
        // Order 4 has minimum distance 8, so any three flips stay within
        // the unique-decoding radius.
        let code = ReedMuller::new(4).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..25 {
            let plain = random_word(&mut rng, code.start_dim());
            let codeword = code.encode(&plain).unwrap();
            let mut corrupted = codeword.clone();
            let mut flipped = Vec::new();
            while flipped.len() < 3 {
                let i = rng.random_range(0..code.end_dim());
                if !flipped.contains(&i) {
                    flipped.push(i);
                    corrupted.set(i, corrupted[i].complement());
                }
            }
            for strategy in strategies() {
                assert_eq!(
                    strategy.search(&code, &corrupted).unwrap(),
                    codeword,
                    "{} failed on flips {flipped:?} of {codeword}",
                    strategy.name()
                );
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential_on_arbitrary_words() {
        let sequential = ExhaustiveSearch::new();
        let parallel = ExhaustiveSearch::new().with_parallel(true);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for order in [3, 4] {
            let code = ReedMuller::new(order).unwrap();
            for _ in 0..20 {
                let received = random_word(&mut rng, code.end_dim());
                assert_eq!(
                    sequential.search(&code, &received).unwrap(),
                    parallel.search(&code, &received).unwrap(),
                    "order {order}, word {received}"
                );
            }
        }
    }

    #[test]
    fn test_first_candidate_wins_ties() {
        // A single flip of the zero codeword at order 2 is equally close
        // to the zero codeword and to one complemented candidate; the
        // zero codeword is enumerated first and must win everywhere.
        let code = ReedMuller::new(2).unwrap();
        let received = word("0001");
        let zero = word("0000");
        for strategy in strategies() {
            assert_eq!(
                strategy.search(&code, &received).unwrap(),
                zero,
                "{}",
                strategy.name()
            );
        }
    }

    #[test]
    fn test_denoised_word_decodes_to_original() {
        let code = ReedMuller::new(3).unwrap();
        let plain = word("0110");
        let codeword = code.encode(&plain).unwrap();
        let mut corrupted = codeword.clone();
        corrupted.set(5, corrupted[5].complement());
        for strategy in strategies() {
            let recovered = strategy.search(&code, &corrupted).unwrap();
            assert_eq!(code.decode(&recovered).unwrap(), plain);
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let code = ReedMuller::new(3).unwrap();
        for strategy in strategies() {
            assert!(matches!(
                strategy.search(&code, &word("1010")),
                Err(Error::LengthMismatch {
                    expected: 8,
                    actual: 4
                })
            ));
        }
    }

    #[test]
    fn test_factory_builds_requested_kind() {
        let exhaustive = create_strategy(StrategyKind::Exhaustive, false);
        assert_eq!(exhaustive.kind(), StrategyKind::Exhaustive);
        let transform = create_strategy(StrategyKind::Transform, false);
        assert_eq!(transform.kind(), StrategyKind::Transform);
        for strategy in strategies() {
            assert!(!strategy.name().is_empty());
        }
    }

    #[test]
    fn test_kind_parsing_and_display() {
        assert_eq!(
            "exhaustive".parse::<StrategyKind>().unwrap(),
            StrategyKind::Exhaustive
        );
        assert_eq!(
            "transform".parse::<StrategyKind>().unwrap(),
            StrategyKind::Transform
        );
        assert_eq!(StrategyKind::Exhaustive.to_string(), "exhaustive");
        assert_eq!(StrategyKind::Transform.to_string(), "transform");
        assert!(matches!(
            "simd".parse::<StrategyKind>(),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}
