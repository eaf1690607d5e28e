//  BACKCHAIN.rs
//    by Lut99
//
//  Created:
//    14 Oct 2026, 15:44:10
//  Last edited:
//    14 Oct 2026, 16:20:37
//  Auto updated?
//    Yes
//
//  Description:
//!   Loads facts and rules from files and backchains on a query.
//

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use backchain::memory::{MemoryKb, MemorySolver};
use backchain::parser;
use backchain::unify::SyntacticUnifier;
use backchain::{BackchainConfig, Backchainer, Literal, RuleCache, Term};
use clap::Parser;
use error_trace::toplevel;
use humanlog::{DebugMode, HumanLogger};
use log::{debug, error, info};


/***** CONSTANTS *****/
/// The maximum number of files that are supported as input.
pub const MAX_FILES: usize = 64;





/***** ARGUMENTS *****/
/// Defines arguments to the backchainer.
#[derive(Debug, Parser)]
pub struct Arguments {
    /// If given, enables more verbose logging.
    #[clap(long, global = true)]
    debug: bool,

    /// The literal to backchain on, e.g., `(isa ?X Dog)`. Must have exactly one variable.
    #[clap(name = "QUERY")]
    query: String,
    /// The path(s) to the file(s) with facts and rules. If more than one is given, they are loaded as if they are one large file concatenated.
    #[clap(name = "PATHS")]
    paths: Vec<PathBuf>,

    /// The context (microtheory) in which to load and query.
    #[clap(short, long, default_value = "BaseKB")]
    mt: String,
    /// The maximum depth at which rules are still expanded.
    #[clap(short = 'd', long, default_value_t = 3)]
    max_depth: usize,
    /// If given, also backchains on `isa` and `genls`.
    #[clap(long)]
    taxonomic: bool,
    /// If given, caches which rules conclude which predicates.
    #[clap(long)]
    cache: bool,
    /// If given, prints the knowledge base before querying.
    #[clap(long)]
    show_kb: bool,
}





/***** ENTRYPOINT *****/
fn main() {
    // Parse the CLI arguments
    let args = Arguments::parse();

    // Setup the logger
    if let Err(err) = HumanLogger::terminal(if args.debug { DebugMode::Full } else { DebugMode::HumanFriendly }).init() {
        eprintln!("WARNING: Failed to setup logger: {err} (no logging for this session)");
    }
    info!("backchain {} - v{}", env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"));

    if args.paths.len() > MAX_FILES {
        error!(
            "The backchainer only supports up to {MAX_FILES} files, but {} files are given.\nPlease merge some files manually and try again.",
            args.paths.len()
        );
        std::process::exit(1);
    }

    // Parse the query first, so we fail before loading anything
    let query: Literal = match args.query.parse() {
        Ok(query) => query,
        Err(err) => {
            error!("{}", toplevel!(("Failed to parse query '{}'", args.query), err));
            std::process::exit(1);
        },
    };

    // Load the files into a knowledge base
    let mut kb = MemoryKb::new();
    for path in &args.paths {
        debug!("Reading input file '{}'...", path.display());
        let source: String = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                error!("{}", toplevel!(("Failed to load input file '{}'", path.display()), err));
                std::process::exit(1);
            },
        };
        let what: String = path.display().to_string();
        let terms: Vec<Term> = match parser::parse(&what, &source) {
            Ok(terms) => terms,
            Err(err) => {
                error!("{}", toplevel!(("Failed to parse input file '{what}'"), err));
                std::process::exit(1);
            },
        };
        debug!("Asserting {} expression(s) from '{what}'...", terms.len());
        for term in terms {
            if let Err(err) = kb.assert_expression(args.mt.as_str(), term) {
                error!("{}", toplevel!(("Failed to assert expression from '{what}'"), err));
                std::process::exit(1);
            }
        }
    }
    if args.show_kb {
        println!("{kb}");
    }

    // Alright, now backchain
    let config = BackchainConfig::default().with_max_backchain_depth(args.max_depth).with_backchain_taxonomic(args.taxonomic).with_rule_cache(args.cache);
    let cache: Arc<RuleCache> = Arc::new(RuleCache::default());
    let solver = MemorySolver::new(&kb, cache.clone(), config.clone());
    let backchainer = Backchainer::new(&kb, &SyntacticUnifier, &solver, cache, args.mt.as_str(), &config);
    let values: Vec<Term> = match backchainer.backchain(&query) {
        Ok(values) => values,
        Err(err) => {
            error!("{}", toplevel!(("Failed to backchain on '{query}'"), err));
            std::process::exit(1);
        },
    };

    // If we made it, print them
    println!("Values for {query} (found {}):", values.len());
    for value in values {
        println!("  - {value}");
    }
}
