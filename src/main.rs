//! Interactive Reed-Muller codec tool.
//!
//! The tool reads a stream of whitespace-separated tokens: with no
//! arguments the stream is stdin, a single argument naming an existing
//! file reads that file as a script, and any other arguments are taken as
//! the tokens themselves. The stream supplies the code order, the noise
//! threshold and then menu selections for working on either a single word
//! or a PGM image.
//!
//! Prompts, menus and errors go to stderr; stdout carries only computed
//! values, so piped output stays clean. A bad selection or a failed
//! operation is reported and the menu comes back; the end of the token
//! stream quits the session.

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, Command};
use num_bigint::BigInt;
use reedmuller::prelude::*;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Menu shown while working on a single word.
const WORD_MENU: &str = "\nOperations menu\n 0: Quit\n 1: Encode\n 2: Decode\n 3: Noise\n 4: Denoise\n 5: Read a new word\nChosen operation:";

/// Menu shown while working on an image.
const IMAGE_MENU: &str = "\nOperations menu\n 0: Quit\n 1: Encode\n 2: Decode\n 3: Noise\n 4: Denoise\n 5: Load an image\nChosen operation:";

/// Whitespace-separated tokens feeding the menus.
#[derive(Debug)]
struct Tokens {
    items: std::vec::IntoIter<String>,
}

impl Tokens {
    /// Builds the token stream from the positional arguments.
    fn from_args(args: Vec<String>) -> Result<Self> {
        let text = match args.as_slice() {
            [] => {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read tokens from stdin")?;
                buffer
            }
            [single] if Path::new(single).is_file() => fs::read_to_string(single)
                .with_context(|| format!("Failed to read script file {single}"))?,
            _ => args.join(" "),
        };
        let items: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        Ok(Self {
            items: items.into_iter(),
        })
    }

    /// Returns the next token, or `None` at the end of the stream.
    fn next(&mut self) -> Option<String> {
        self.items.next()
    }
}

/// Reads and parses the next token. `Ok(None)` means the stream ended,
/// which callers treat as a quiet quit.
fn read_value<T: FromStr>(tokens: &mut Tokens, what: &str) -> Result<Option<T>> {
    match tokens.next() {
        None => Ok(None),
        Some(token) => token
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("'{token}' is not a valid {what}")),
    }
}

/// Runs one word operation against the current word.
fn apply_word_operation(
    code: &ReedMuller,
    strategy: &dyn SearchStrategy,
    probability: f64,
    selection: u32,
    word: &Word,
) -> reedmuller::Result<Word> {
    match selection {
        1 => code.encode(word),
        2 => code.decode(word),
        3 => code.noise(word, probability),
        4 => strategy.search(code, word),
        _ => unreachable!(),
    }
}

/// Prints the current word on stdout, in decimal and in binary.
fn print_word(word: &Word) {
    eprintln!("Current word, in decimal and in binary:");
    println!("{}", word.to_biguint());
    println!("{word}");
}

/// Menu loop for working on a single word.
fn run_word_mode(
    code: &ReedMuller,
    strategy: &dyn SearchStrategy,
    probability: f64,
    tokens: &mut Tokens,
) -> Result<()> {
    let mut current: Option<Word> = None;
    // The session opens on the word prompt, as if operation 5 had been
    // chosen from the menu.
    let mut pending = Some(5);
    loop {
        let selection = match pending.take() {
            Some(selection) => selection,
            None => {
                eprintln!("{WORD_MENU}");
                match tokens.next() {
                    None => break,
                    Some(token) => match token.parse::<u32>() {
                        Ok(selection) => selection,
                        Err(_) => {
                            eprintln!("'{token}' is not an operation number.");
                            continue;
                        }
                    },
                }
            }
        };

        match selection {
            0 => break,
            1..=4 => match current.as_ref() {
                None => eprintln!("No current word: read one with operation 5 first."),
                Some(word) => {
                    match apply_word_operation(code, strategy, probability, selection, word) {
                        Ok(result) => {
                            print_word(&result);
                            current = Some(result);
                        }
                        Err(err) => eprintln!("Operation failed: {err}"),
                    }
                }
            },
            5 => {
                eprintln!("\nEnter a word of {} bits, in decimal:", code.start_dim());
                match tokens.next() {
                    None => break,
                    Some(token) => match token.parse::<BigInt>() {
                        Ok(value) => match Word::from_bigint_sized(&value, code.start_dim()) {
                            Ok(word) => {
                                print_word(&word);
                                current = Some(word);
                            }
                            Err(err) => eprintln!("Cannot read word: {err}"),
                        },
                        Err(_) => eprintln!("'{token}' is not a decimal integer."),
                    },
                }
            }
            other => eprintln!("Unknown operation {other}: choose 0 to 5."),
        }
    }
    Ok(())
}

/// Menu loop for working on an image. Each operation derives its code
/// order from the image's grey level and writes its result to a prompted
/// output file.
fn run_image_mode(
    strategy: &dyn SearchStrategy,
    probability: f64,
    tokens: &mut Tokens,
) -> Result<()> {
    let mut current: Option<Pgm> = None;
    let mut pending = Some(5);
    loop {
        let selection = match pending.take() {
            Some(selection) => selection,
            None => {
                eprintln!("{IMAGE_MENU}");
                match tokens.next() {
                    None => break,
                    Some(token) => match token.parse::<u32>() {
                        Ok(selection) => selection,
                        Err(_) => {
                            eprintln!("'{token}' is not an operation number.");
                            continue;
                        }
                    },
                }
            }
        };

        match selection {
            0 => break,
            1..=4 => match current.as_ref() {
                None => eprintln!("No current image: load one with operation 5 first."),
                Some(image) => {
                    let result = match selection {
                        1 => image.encode(),
                        2 => image.decode(),
                        3 => image.noise(probability),
                        4 => image.denoise_with(strategy),
                        _ => unreachable!(),
                    };
                    match result {
                        Ok(output) => {
                            eprintln!("Output file for the result:");
                            match tokens.next() {
                                None => break,
                                Some(path) => match output.write(&path) {
                                    Ok(()) => current = Some(output),
                                    Err(err) => eprintln!("Cannot write {path}: {err}"),
                                },
                            }
                        }
                        Err(err) => eprintln!("Operation failed: {err}"),
                    }
                }
            },
            5 => {
                eprintln!("\nEnter the path of a PGM image:");
                match tokens.next() {
                    None => break,
                    Some(path) => match Pgm::read(&path) {
                        Ok(image) => {
                            eprintln!(
                                "Loaded {path}: {}x{} pixels, grey level {}.",
                                image.width(),
                                image.height(),
                                image.grey_level()
                            );
                            current = Some(image);
                        }
                        Err(err) => eprintln!("Cannot read {path}: {err}"),
                    },
                }
            }
            other => eprintln!("Unknown operation {other}: choose 0 to 5."),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("reedmuller")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Binary Reed-Muller codec with noise simulation and nearest-codeword search")
        .arg(
            Arg::new("strategy")
                .short('s')
                .long("strategy")
                .help("Nearest-codeword search strategy")
                .value_parser(["exhaustive", "transform"])
                .default_value("exhaustive"),
        )
        .arg(
            Arg::new("parallel")
                .short('p')
                .long("parallel")
                .help("Partition the exhaustive search across worker threads")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("threads")
                .short('j')
                .long("threads")
                .help("Number of threads to use (0 for auto)")
                .default_value("0")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("JSON configuration file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("input")
                .help("Script file with menu tokens, or the tokens themselves")
                .value_name("TOKENS")
                .num_args(0..),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");

    // Initialize logging on stderr; stdout is reserved for computed values
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default subscriber")?;

    // Configure the session, command line flags overriding the file
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => Config::default(),
    };
    if matches.value_source("strategy") == Some(ValueSource::CommandLine) {
        let kind: StrategyKind = matches.get_one::<String>("strategy").unwrap().parse()?;
        config = config.with_strategy(kind);
    }
    if matches.get_flag("parallel") {
        config = config.with_parallel_search(true);
    }
    if matches.value_source("threads") == Some(ValueSource::CommandLine) {
        config = config.with_threads(*matches.get_one::<usize>("threads").unwrap());
    }
    if verbose {
        config = config.with_verbose(true);
    }

    if config.threads() > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_threads())
            .build_global()
            .context("Failed to size the worker thread pool")?;
    }

    let args: Vec<String> = matches
        .get_many::<String>("input")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let mut tokens = Tokens::from_args(args)?;

    // Session parameters come from the token stream
    eprintln!("Words of r + 1 bits are encoded on codewords of 2^r bits.");
    eprintln!("Choose the value of r:");
    let Some(order) = read_value::<usize>(&mut tokens, "code order")? else {
        return Ok(());
    };

    eprintln!("\nThe noise threshold is the probability of flipping each bit of a codeword.");
    eprintln!("Choose a noise threshold between 0.0 and 1.0:");
    let Some(probability) = read_value::<f64>(&mut tokens, "noise threshold")? else {
        return Ok(());
    };

    config = config.with_order(order).with_noise_probability(probability);
    let code = config.build_code().context("Invalid session parameters")?;
    let strategy = config.build_strategy();
    debug!(
        order = config.order(),
        probability = config.noise_probability(),
        strategy = %config.strategy(),
        parallel = config.parallel_search(),
        "session configured"
    );

    eprintln!("\nInitial menu");
    eprintln!(" 0: Quit");
    eprintln!(" 1: Process a word");
    eprintln!(" 2: Process an image");
    eprintln!("Chosen mode:");
    let Some(mode) = read_value::<u32>(&mut tokens, "mode")? else {
        return Ok(());
    };

    match mode {
        0 => {}
        1 => run_word_mode(&code, strategy.as_ref(), probability, &mut tokens)?,
        2 => run_image_mode(strategy.as_ref(), probability, &mut tokens)?,
        other => eprintln!("Unknown mode {other}: nothing to do."),
    }

    Ok(())
}
