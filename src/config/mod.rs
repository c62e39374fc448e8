//! Configuration settings for the Reed-Muller codec.
//!
//! This module defines the options that control the behavior of the codec
//! tools: the code order, the noise probability, the nearest-codeword
//! search strategy and the threading of the exhaustive search.
//! Configurations round-trip through JSON files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::code::{create_strategy, ReedMuller, SearchStrategy, StrategyKind, MAX_ORDER};
use crate::error::{Error, Result};

/// Configuration settings for the Reed-Muller codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Order of the code
    order: usize,
    /// Probability of flipping each bit when noising a codeword
    noise_probability: f64,
    /// Nearest-codeword search strategy
    strategy: StrategyKind,
    /// Whether the exhaustive search partitions candidates across threads
    parallel_search: bool,
    /// Number of threads to use (0 for auto)
    threads: usize,
    /// Verbose output flag
    verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            order: 3,
            noise_probability: 0.1,
            strategy: StrategyKind::Exhaustive,
            parallel_search: false,
            threads: 0, // Auto
            verbose: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the order of the code.
    ///
    /// # Arguments
    ///
    /// * `order` - Order of the code
    ///
    /// # Returns
    ///
    /// Updated configuration with the new order
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Sets the probability of flipping each bit when noising a codeword.
    ///
    /// # Arguments
    ///
    /// * `noise_probability` - Flip probability, in `[0, 1)`
    ///
    /// # Returns
    ///
    /// Updated configuration with the new probability
    pub fn with_noise_probability(mut self, noise_probability: f64) -> Self {
        self.noise_probability = noise_probability;
        self
    }

    /// Sets the nearest-codeword search strategy.
    ///
    /// # Arguments
    ///
    /// * `strategy` - Strategy kind to use
    ///
    /// # Returns
    ///
    /// Updated configuration with the new strategy
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets whether the exhaustive search partitions candidates across
    /// threads.
    ///
    /// # Arguments
    ///
    /// * `parallel_search` - Whether to enable the parallel path
    ///
    /// # Returns
    ///
    /// Updated configuration with the new setting
    pub fn with_parallel_search(mut self, parallel_search: bool) -> Self {
        self.parallel_search = parallel_search;
        self
    }

    /// Sets the number of threads to use (0 for auto).
    ///
    /// # Arguments
    ///
    /// * `threads` - Number of threads, or 0 to use all logical cores
    ///
    /// # Returns
    ///
    /// Updated configuration with the new thread count
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets whether verbose output is enabled.
    ///
    /// # Arguments
    ///
    /// * `verbose` - Whether to enable verbose output
    ///
    /// # Returns
    ///
    /// Updated configuration with the new setting
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Returns the order of the code.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the probability of flipping each bit when noising a
    /// codeword.
    pub fn noise_probability(&self) -> f64 {
        self.noise_probability
    }

    /// Returns the nearest-codeword search strategy.
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Returns whether the exhaustive search partitions candidates across
    /// threads.
    pub fn parallel_search(&self) -> bool {
        self.parallel_search
    }

    /// Returns the number of threads to use (0 for auto).
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Returns the maximum number of threads to use, accounting for auto
    /// settings.
    pub fn max_threads(&self) -> usize {
        if self.threads == 0 {
            // Auto: use available logical cores
            num_cpus::get()
        } else {
            self.threads
        }
    }

    /// Returns whether verbose output is enabled.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or an error if it's invalid
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_ORDER).contains(&self.order) {
            return Err(Error::InvalidConfiguration(format!(
                "order {} is outside the supported range 1..={MAX_ORDER}",
                self.order
            )));
        }

        if !(0.0..1.0).contains(&self.noise_probability) {
            return Err(Error::InvalidConfiguration(format!(
                "noise probability {} is outside [0.0, 1.0)",
                self.noise_probability
            )));
        }

        Ok(())
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Serialization`] if its contents are not a valid
    /// configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&text)?;
        debug!(path = %path.as_ref().display(), "loaded configuration");
        Ok(config)
    }

    /// Saves the configuration to a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(&path, text)?;
        debug!(path = %path.as_ref().display(), "saved configuration");
        Ok(())
    }

    /// Builds the codec described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the configuration does
    /// not validate.
    pub fn build_code(&self) -> Result<ReedMuller> {
        self.validate()?;
        ReedMuller::new(self.order)
    }

    /// Builds the search strategy described by this configuration.
    pub fn build_strategy(&self) -> Box<dyn SearchStrategy> {
        create_strategy(self.strategy, self.parallel_search)
    }
}
