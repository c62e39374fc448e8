//! The binary Reed-Muller codec engine.
//!
//! A code of order `r` maps plain words of `r + 1` bits onto codewords of
//! `2^r` bits whose pairwise Hamming distance is at least `2^(r - 1)`. The
//! engine owns the generator matrix used for encoding and the
//! Sylvester-Hadamard sign matrix used by the transform search; both depend
//! only on the order, so they are built once per order and shared
//! process-wide behind an `Arc`.
//!
//! Encoding multiplies the plain word by the generator matrix over GF(2).
//! Decoding assumes an exact codeword and reads the plain bits back from a
//! handful of fixed positions. Recovering a *corrupted* codeword is the job
//! of the [`SearchStrategy`] implementations in this module.

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::gf2::{add, mult, Bit, Word};

mod matrix;
mod search;

pub use matrix::{BitMatrix, SignMatrix};
pub use search::{
    create_strategy, ExhaustiveSearch, SearchStrategy, StrategyKind, TransformSearch,
};

/// Highest supported code order.
///
/// The sign matrix holds `4^order` entries, so this bound keeps the largest
/// table at a few hundred megabytes.
pub const MAX_ORDER: usize = 12;

/// Precomputed matrices for one code order.
#[derive(Debug)]
struct CodeTables {
    generator: BitMatrix,
    sign: SignMatrix,
}

lazy_static! {
    /// Process-wide cache of code tables, keyed by order.
    static ref CODE_TABLES_CACHE: Mutex<HashMap<usize, Arc<CodeTables>>> =
        Mutex::new(HashMap::new());
}

/// A binary Reed-Muller codec of fixed order.
///
/// Instances of the same order compare equal and share their tables, so
/// cloning or recreating a code is cheap after the first construction.
#[derive(Debug, Clone)]
pub struct ReedMuller {
    /// Order of the code.
    order: usize,
    /// Plain word length in bits, `order + 1`.
    start_dim: usize,
    /// Codeword length in bits, `2^order`.
    end_dim: usize,
    /// Generator and sign matrices shared across instances of this order.
    tables: Arc<CodeTables>,
}

impl ReedMuller {
    /// Creates a codec of the given order.
    ///
    /// # Arguments
    ///
    /// * `order` - Order of the code, between 1 and [`MAX_ORDER`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if the order is outside the
    /// supported range.
    pub fn new(order: usize) -> Result<Self> {
        if !(1..=MAX_ORDER).contains(&order) {
            return Err(Error::InvalidOrder {
                order,
                max: MAX_ORDER,
            });
        }
        let start_dim = order + 1;
        let end_dim = 1usize << order;

        let cache = CODE_TABLES_CACHE.lock();
        if let Some(tables) = cache.get(&order) {
            debug!(order, "reusing cached code tables");
            return Ok(Self {
                order,
                start_dim,
                end_dim,
                tables: Arc::clone(tables),
            });
        }
        // Release the lock while the tables are built; a racing build of
        // the same order produces an identical table set.
        drop(cache);

        debug!(order, start_dim, end_dim, "building code tables");
        let tables = Arc::new(CodeTables {
            generator: BitMatrix::generator(order),
            sign: SignMatrix::sylvester(order),
        });
        CODE_TABLES_CACHE
            .lock()
            .insert(order, Arc::clone(&tables));

        Ok(Self {
            order,
            start_dim,
            end_dim,
            tables,
        })
    }

    /// Returns the order of the code.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the plain word length in bits.
    #[inline]
    pub fn start_dim(&self) -> usize {
        self.start_dim
    }

    /// Returns the codeword length in bits.
    #[inline]
    pub fn end_dim(&self) -> usize {
        self.end_dim
    }

    /// Returns the generator matrix of the code.
    #[inline]
    pub fn generator(&self) -> &BitMatrix {
        &self.tables.generator
    }

    /// Returns the Sylvester-Hadamard sign matrix of the code.
    #[inline]
    pub fn sign_matrix(&self) -> &SignMatrix {
        &self.tables.sign
    }

    /// Encodes a plain word into a codeword.
    ///
    /// Bit `j` of the codeword is the GF(2) dot product of the plain word
    /// with column `j` of the generator matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `word` is not `start_dim` bits
    /// long.
    pub fn encode(&self, word: &Word) -> Result<Word> {
        self.check_length(word, self.start_dim)?;
        let generator = self.generator();
        let mut codeword = Word::zero(self.end_dim);
        for j in 0..self.end_dim {
            let mut sum = Bit::ZERO;
            for i in 0..self.start_dim {
                sum = add(sum, mult(word[i], generator.at(i, j)));
            }
            codeword.set(j, sum);
        }
        Ok(codeword)
    }

    /// Decodes an exact codeword back into its plain word.
    ///
    /// The constant bit is codeword bit 0; plain bit `i` is recovered from
    /// codeword bit `2^i` by cancelling the constant row's contribution.
    /// The result is meaningless for a word that is not a codeword; use a
    /// [`SearchStrategy`] to correct errors first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `word` is not `end_dim` bits
    /// long.
    pub fn decode(&self, word: &Word) -> Result<Word> {
        self.check_length(word, self.end_dim)?;
        let generator = self.generator();
        let constant = word[0];
        let mut plain = Word::zero(self.start_dim);
        plain.set(self.order, constant);
        for i in 0..self.order {
            let position = 1usize << i;
            let cancel = mult(constant, generator.at(self.order, position));
            plain.set(i, add(cancel, word[position]));
        }
        Ok(plain)
    }

    /// Flips each bit of a word independently with the given probability,
    /// drawing randomness from the thread-local generator.
    ///
    /// Words of any length are accepted; the output always has the
    /// input's length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProbability`] if `probability` is not in
    /// `[0, 1)`.
    pub fn noise(&self, word: &Word, probability: f64) -> Result<Word> {
        self.noise_with(word, probability, &mut rand::rng())
    }

    /// Flips each bit of a word independently with the given probability,
    /// drawing randomness from the supplied generator.
    ///
    /// A seeded generator makes the corruption reproducible.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ReedMuller::noise`].
    pub fn noise_with<R: Rng + ?Sized>(
        &self,
        word: &Word,
        probability: f64,
        rng: &mut R,
    ) -> Result<Word> {
        // The range check also rejects NaN, which fails every comparison.
        if !(0.0..1.0).contains(&probability) {
            return Err(Error::InvalidProbability(probability));
        }
        let mut noised = word.clone();
        for i in 0..noised.len() {
            if rng.random::<f64>() < probability {
                noised.set(i, noised[i].complement());
            }
        }
        Ok(noised)
    }

    /// Returns the codeword nearest to `word` using the semi-exhaustive
    /// reference search.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `word` is not `end_dim` bits
    /// long.
    pub fn search(&self, word: &Word) -> Result<Word> {
        ExhaustiveSearch::new().search(self, word)
    }

    /// Returns the codeword nearest to `word` using the Hadamard-transform
    /// search.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `word` is not `end_dim` bits
    /// long.
    pub fn fast_search(&self, word: &Word) -> Result<Word> {
        TransformSearch::new().search(self, word)
    }

    /// Checks that a word has the expected length.
    pub(crate) fn check_length(&self, word: &Word, expected: usize) -> Result<()> {
        if word.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                actual: word.len(),
            });
        }
        Ok(())
    }
}

impl PartialEq for ReedMuller {
    /// Two codes are equal when they have the same order; the tables are a
    /// pure function of it.
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for ReedMuller {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn word(bits: &str) -> Word {
        bits.parse().unwrap()
    }

    #[test]
    fn test_new_rejects_out_of_range_orders() {
        assert!(matches!(
            ReedMuller::new(0),
            Err(Error::InvalidOrder { order: 0, .. })
        ));
        assert!(matches!(
            ReedMuller::new(MAX_ORDER + 1),
            Err(Error::InvalidOrder { .. })
        ));
    }

    #[test]
    fn test_dimensions() {
        for order in 1..=4 {
            let code = ReedMuller::new(order).unwrap();
            assert_eq!(code.order(), order);
            assert_eq!(code.start_dim(), order + 1);
            assert_eq!(code.end_dim(), 1 << order);
        }
    }

    #[test]
    fn test_same_order_codes_are_equal_and_share_tables() {
        let a = ReedMuller::new(3).unwrap();
        let b = ReedMuller::new(3).unwrap();
        let c = ReedMuller::new(4).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(Arc::ptr_eq(&a.tables, &b.tables));
    }

    #[test]
    fn test_encode_constant_word() {
        // Only the constant bit set: the codeword is the all-ones row.
        let code = ReedMuller::new(3).unwrap();
        let encoded = code.encode(&word("1000")).unwrap();
        assert_eq!(encoded.to_string(), "11111111");
    }

    #[test]
    fn test_encode_known_word() {
        let code = ReedMuller::new(3).unwrap();
        let encoded = code.encode(&word("1010")).unwrap();
        assert_eq!(encoded.to_string(), "00110011");
    }

    #[test]
    fn test_encode_zero_word() {
        let code = ReedMuller::new(3).unwrap();
        let encoded = code.encode(&word("0000")).unwrap();
        assert_eq!(encoded.to_string(), "00000000");
    }

    #[test]
    fn test_round_trip_all_words() {
        for order in 1..=4 {
            let code = ReedMuller::new(order).unwrap();
            let mut plain = Word::zero(code.start_dim());
            for _ in 0..(1usize << code.start_dim()) {
                let encoded = code.encode(&plain).unwrap();
                assert_eq!(encoded.len(), code.end_dim());
                let decoded = code.decode(&encoded).unwrap();
                assert_eq!(decoded, plain, "order {order}, word {plain}");
                plain = plain.plus_one();
            }
        }
    }

    #[test]
    fn test_minimum_distance() {
        for order in 2..=3 {
            let code = ReedMuller::new(order).unwrap();
            let mut codewords = Vec::new();
            let mut plain = Word::zero(code.start_dim());
            for _ in 0..(1usize << code.start_dim()) {
                codewords.push(code.encode(&plain).unwrap());
                plain = plain.plus_one();
            }
            let mut min = usize::MAX;
            for i in 0..codewords.len() {
                for j in (i + 1)..codewords.len() {
                    let d = codewords[i].hamming_distance(&codewords[j]).unwrap();
                    min = min.min(d);
                }
            }
            assert_eq!(min, 1 << (order - 1), "order {order}");
        }
    }

    #[test]
    fn test_encode_rejects_wrong_length() {
        let code = ReedMuller::new(3).unwrap();
        assert!(matches!(
            code.encode(&word("10100")),
            Err(Error::LengthMismatch {
                expected: 4,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let code = ReedMuller::new(3).unwrap();
        assert!(matches!(
            code.decode(&word("0011")),
            Err(Error::LengthMismatch {
                expected: 8,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_noise_zero_probability_is_identity() {
        let code = ReedMuller::new(3).unwrap();
        let codeword = code.encode(&word("1010")).unwrap();
        let noised = code.noise(&codeword, 0.0).unwrap();
        assert_eq!(noised, codeword);
    }

    #[test]
    fn test_noise_preserves_length() {
        let code = ReedMuller::new(4).unwrap();
        let codeword = code.encode(&word("10110")).unwrap();
        let noised = code.noise(&codeword, 0.999).unwrap();
        assert_eq!(noised.len(), code.end_dim());
    }

    #[test]
    fn test_noise_rejects_invalid_probability() {
        let code = ReedMuller::new(3).unwrap();
        let codeword = code.encode(&word("1010")).unwrap();
        for p in [1.0, 1.5, -0.1, f64::NAN] {
            assert!(
                matches!(
                    code.noise(&codeword, p),
                    Err(Error::InvalidProbability(_))
                ),
                "probability {p}"
            );
        }
    }

    #[test]
    fn test_noise_accepts_any_word_length() {
        // Noise is not tied to the codeword length.
        let code = ReedMuller::new(3).unwrap();
        let noised = code.noise(&word("1010"), 0.0).unwrap();
        assert_eq!(noised, word("1010"));
    }

    #[test]
    fn test_noise_with_seeded_rng_is_reproducible() {
        let code = ReedMuller::new(4).unwrap();
        let codeword = code.encode(&word("01101")).unwrap();
        let mut first = ChaCha8Rng::seed_from_u64(42);
        let mut second = ChaCha8Rng::seed_from_u64(42);
        let a = code.noise_with(&codeword, 0.3, &mut first).unwrap();
        let b = code.noise_with(&codeword, 0.3, &mut second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_search_corrects_single_flip() {
        let code = ReedMuller::new(3).unwrap();
        let codeword = code.encode(&word("1010")).unwrap();
        for i in 0..code.end_dim() {
            let mut corrupted = codeword.clone();
            corrupted.set(i, corrupted[i].complement());
            assert_eq!(code.search(&corrupted).unwrap(), codeword, "flip at {i}");
            assert_eq!(code.fast_search(&corrupted).unwrap(), codeword, "flip at {i}");
        }
    }
}
