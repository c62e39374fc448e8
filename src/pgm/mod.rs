//! Plain (ASCII) PGM greymaps and the per-pixel codec operations.
//!
//! A [`Pgm`] holds a `P2` greyscale image whose pixel values are
//! arbitrary-precision integers, so codeword-domain images with grey
//! levels up to `2^end_dim - 1` survive every supported code order. The
//! code order is never stored in the file; it is derived from the bit
//! width of the maximum grey value. An image whose grey level is
//! `2^(r + 1) - 1` carries plain words of a code of order `r`, and an
//! image whose grey level has a power-of-two bit width `2^r` carries
//! codewords of that code.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use itertools::Itertools;
use num_bigint::BigUint;
use num_traits::One;
use tracing::info;

use crate::code::{ExhaustiveSearch, ReedMuller, SearchStrategy};
use crate::error::{Error, Result};
use crate::gf2::{natural_width, Word};

/// Magic number opening every plain PGM file.
const MAGIC: &str = "P2";

/// Comment line written below the magic number.
const COMMENT: &str = "written by reedmuller";

/// Returns the largest value representable in the given number of bits.
fn domain_max(bits: usize) -> BigUint {
    (BigUint::one() << bits) - BigUint::one()
}

/// A plain PGM greyscale image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pgm {
    width: usize,
    height: usize,
    grey_level: BigUint,
    values: Vec<BigUint>,
}

impl Pgm {
    /// Creates an image from raw parts.
    ///
    /// # Arguments
    ///
    /// * `width` - Image width in pixels, nonzero
    /// * `height` - Image height in pixels, nonzero
    /// * `grey_level` - Maximum grey value
    /// * `values` - Pixel values in row-major order, `width * height` of them
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageFormat`] if a dimension is zero or the pixel
    /// count does not match the dimensions.
    pub fn new(
        width: usize,
        height: usize,
        grey_level: BigUint,
        values: Vec<BigUint>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::ImageFormat(format!(
                "image dimensions {width}x{height} must be nonzero"
            )));
        }
        let expected = width.checked_mul(height).ok_or_else(|| {
            Error::ImageFormat(format!("image dimensions {width}x{height} overflow"))
        })?;
        if values.len() != expected {
            return Err(Error::ImageFormat(format!(
                "expected {expected} pixel values for a {width}x{height} image, found {}",
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            grey_level,
            values,
        })
    }

    /// Reads a plain PGM file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::ImageFormat`] if its contents are not a well-formed `P2`
    /// image.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)?;
        let image = Self::parse(&text)?;
        info!(
            path = %path.as_ref().display(),
            width = image.width,
            height = image.height,
            "read image"
        );
        Ok(image)
    }

    /// Parses the text of a plain PGM file.
    ///
    /// Comments run from `#` to the end of the line and may appear
    /// anywhere; the remaining tokens are the magic number, the width, the
    /// height, the grey level and exactly `width * height` pixel values.
    fn parse(text: &str) -> Result<Self> {
        let mut tokens = text.lines().flat_map(|line| {
            line.split('#')
                .next()
                .unwrap_or("")
                .split_whitespace()
        });

        let magic = next_token(&mut tokens, "magic number")?;
        if magic != MAGIC {
            return Err(Error::ImageFormat(format!(
                "expected magic number '{MAGIC}', found '{magic}'"
            )));
        }
        let width: usize = parse_field(next_token(&mut tokens, "width")?, "width")?;
        let height: usize = parse_field(next_token(&mut tokens, "height")?, "height")?;
        let grey_level: BigUint =
            parse_field(next_token(&mut tokens, "grey level")?, "grey level")?;

        let count = width.checked_mul(height).ok_or_else(|| {
            Error::ImageFormat(format!("image dimensions {width}x{height} overflow"))
        })?;
        let mut values = Vec::new();
        for _ in 0..count {
            let token = next_token(&mut tokens, "pixel value")?;
            values.push(parse_field::<BigUint>(token, "pixel value")?);
        }
        if tokens.next().is_some() {
            return Err(Error::ImageFormat(
                "trailing data after pixel values".to_string(),
            ));
        }

        Self::new(width, height, grey_level, values)
    }

    /// Writes the image as a plain PGM file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(&path, self.render())?;
        info!(
            path = %path.as_ref().display(),
            width = self.width,
            height = self.height,
            "wrote image"
        );
        Ok(())
    }

    /// Renders the image as plain PGM text, one pixel row per line.
    fn render(&self) -> String {
        let rows = self
            .values
            .chunks(self.width)
            .map(|row| row.iter().join(" "))
            .join("\n");
        format!(
            "{MAGIC}\n# {COMMENT}\n{} {}\n{}\n{rows}\n",
            self.width, self.height, self.grey_level
        )
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the maximum grey value.
    #[inline]
    pub fn grey_level(&self) -> &BigUint {
        &self.grey_level
    }

    /// Returns the pixel values in row-major order.
    #[inline]
    pub fn values(&self) -> &[BigUint] {
        &self.values
    }

    /// Derives the code whose plain words this image carries: the grey
    /// level's bit width is the plain word length `r + 1`.
    fn plain_code(&self) -> Result<ReedMuller> {
        let start_dim = natural_width(&self.grey_level);
        ReedMuller::new(start_dim - 1)
    }

    /// Derives the code whose codewords this image carries: the grey
    /// level's bit width must be a power-of-two codeword length `2^r`.
    fn codeword_code(&self) -> Result<ReedMuller> {
        let end_dim = natural_width(&self.grey_level);
        if end_dim < 2 || !end_dim.is_power_of_two() {
            return Err(Error::ImageFormat(format!(
                "grey level {} spans {end_dim} bits, which is not a codeword length \
                 (a power of two of at least 2)",
                self.grey_level
            )));
        }
        ReedMuller::new(end_dim.trailing_zeros() as usize)
    }

    /// Applies a word operation to every pixel, producing an image with
    /// the given grey level.
    fn map_pixels<F>(&self, bits: usize, grey_level: BigUint, mut op: F) -> Result<Pgm>
    where
        F: FnMut(&Word) -> Result<Word>,
    {
        let mut values = Vec::with_capacity(self.values.len());
        for pixel in &self.values {
            let word = Word::from_biguint_sized(pixel, bits)?;
            values.push(op(&word)?.to_biguint());
        }
        Ok(Pgm {
            width: self.width,
            height: self.height,
            grey_level,
            values,
        })
    }

    /// Encodes every pixel of a plain-word image, returning a codeword
    /// image with grey level `2^end_dim - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if the grey level's bit width does
    /// not name a supported order and [`Error::SizeTooSmall`] if a pixel
    /// value does not fit a plain word.
    pub fn encode(&self) -> Result<Pgm> {
        let code = self.plain_code()?;
        info!(
            order = code.order(),
            width = self.width,
            height = self.height,
            "encoding image"
        );
        self.map_pixels(code.start_dim(), domain_max(code.end_dim()), |word| {
            code.encode(word)
        })
    }

    /// Decodes every pixel of a codeword image, returning a plain-word
    /// image with grey level `2^start_dim - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageFormat`] if the grey level's bit width is not
    /// a power of two and [`Error::SizeTooSmall`] if a pixel value does
    /// not fit a codeword.
    pub fn decode(&self) -> Result<Pgm> {
        let code = self.codeword_code()?;
        info!(
            order = code.order(),
            width = self.width,
            height = self.height,
            "decoding image"
        );
        self.map_pixels(code.end_dim(), domain_max(code.start_dim()), |word| {
            code.decode(word)
        })
    }

    /// Corrupts every pixel of a codeword image, flipping each bit
    /// independently with the given probability. The grey level is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Pgm::decode`], plus
    /// [`Error::InvalidProbability`] if `probability` is not in `[0, 1)`.
    pub fn noise(&self, probability: f64) -> Result<Pgm> {
        let code = self.codeword_code()?;
        info!(
            order = code.order(),
            probability,
            width = self.width,
            height = self.height,
            "noising image"
        );
        self.map_pixels(code.end_dim(), self.grey_level.clone(), |word| {
            code.noise(word, probability)
        })
    }

    /// Restores every pixel of a corrupted codeword image to the nearest
    /// codeword using the semi-exhaustive reference search.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Pgm::decode`].
    pub fn denoise(&self) -> Result<Pgm> {
        self.denoise_with(&ExhaustiveSearch::new())
    }

    /// Restores every pixel of a corrupted codeword image to the nearest
    /// codeword using the supplied strategy.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Pgm::decode`].
    pub fn denoise_with(&self, strategy: &dyn SearchStrategy) -> Result<Pgm> {
        let code = self.codeword_code()?;
        info!(
            order = code.order(),
            strategy = strategy.name(),
            width = self.width,
            height = self.height,
            "denoising image"
        );
        self.map_pixels(code.end_dim(), self.grey_level.clone(), |word| {
            strategy.search(&code, word)
        })
    }
}

/// Returns the next token of a PGM file, or the field that is missing.
fn next_token<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    field: &str,
) -> Result<&'a str> {
    tokens
        .next()
        .ok_or_else(|| Error::ImageFormat(format!("missing {field}")))
}

/// Parses one header or pixel token.
fn parse_field<T: FromStr>(token: &str, field: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| Error::ImageFormat(format!("invalid {field} '{token}'")))
}
