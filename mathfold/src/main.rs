//! mathfold CLI

use clap::{Parser, Subcommand};
use mathfold::config::{FileConfig, MathConfig, NumberType, SimplifyOptions};
use mathfold::error::{report_error, Error};
use mathfold::repl::{Repl, Session};
use mathfold::{parse_expression, Simplifier};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SOURCE_NAME: &str = "<expr>";

#[derive(Parser)]
#[command(name = "mathfold", version, about = "Constant folding for symbolic expressions")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preferred numeric representation
    #[arg(long, global = true, value_enum)]
    number: Option<NumberType>,

    /// Keep floats as floats instead of exact fractions
    #[arg(long, global = true)]
    no_exact: bool,

    /// Abandon fractions whose numerator or denominator reaches this size
    #[arg(long, global = true)]
    fractions_limit: Option<u64>,

    /// Maximum expression nesting depth
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Log each fold step to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fold the constant parts of an expression
    Fold {
        /// Expression to fold
        expr: String,
        /// Print the folded tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse and dump the expression tree (debug)
    Parse {
        /// Expression to parse
        expr: String,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Expression to tokenize
        expr: String,
    },
    /// Start an interactive session
    Repl,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (config, options) = match settings(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            report_error(SOURCE_NAME, "", &err);
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Command::Fold { expr, json } => fold_expr(expr, *json, config, &options),
        Command::Parse { expr } => parse_expr(expr, config),
        Command::Tokens { expr } => tokenize_expr(expr),
        Command::Repl => {
            run_repl(config, options);
            return;
        }
    };

    if let Err((source, err)) = result {
        report_error(SOURCE_NAME, &source, &err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the config file with command-line overrides
fn settings(cli: &Cli) -> mathfold::Result<(MathConfig, SimplifyOptions)> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let mut config = file.math_config();
    let mut options = file.simplify;

    if let Some(number) = cli.number {
        config.number = number;
    }
    if cli.no_exact {
        options.exact_fractions = false;
    }
    if let Some(limit) = cli.fractions_limit {
        options.fractions_limit = Some(limit);
    }
    if let Some(depth) = cli.max_depth {
        options.max_depth = depth;
    }
    Ok((config, options))
}

type CliResult = std::result::Result<(), (String, Error)>;

fn fold_expr(expr: &str, json: bool, config: MathConfig, options: &SimplifyOptions) -> CliResult {
    let with_source = |err: Error| (expr.to_string(), err);
    let tree = parse_expression(expr, &config).map_err(with_source)?;
    let folded = Simplifier::new()
        .with_config(config)
        .simplify_constant(tree, options)
        .map_err(|e| with_source(e.into()))?;

    if json {
        let text = serde_json::to_string_pretty(&folded)
            .map_err(|e| with_source(Error::io_error(e.to_string())))?;
        println!("{text}");
    } else {
        println!("{folded}");
    }
    Ok(())
}

fn parse_expr(expr: &str, config: MathConfig) -> CliResult {
    let with_source = |err: Error| (expr.to_string(), err);
    let tree = parse_expression(expr, &config).map_err(with_source)?;
    let text = serde_json::to_string_pretty(&tree)
        .map_err(|e| with_source(Error::io_error(e.to_string())))?;
    println!("{text}");
    Ok(())
}

fn tokenize_expr(expr: &str) -> CliResult {
    let tokens = mathfold::lexer::tokenize(expr).map_err(|e| (expr.to_string(), e))?;
    for (tok, span) in &tokens {
        println!("{:?} @ {}..{}", tok, span.start, span.end);
    }
    Ok(())
}

fn run_repl(config: MathConfig, options: SimplifyOptions) {
    let session = Session::new(config, options);
    let outcome = Repl::new(session).and_then(|mut repl| repl.run());
    if let Err(err) = outcome {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
