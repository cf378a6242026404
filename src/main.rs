//! The tupy CLI tool

use std::io::{self, Write};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::{Builder, Target};
use log::{info, LevelFilter};
use num_bigint::BigUint;
use tupy::parallel::{fib_arr_with, ArrayOptions, Strategy};
use tupy::{fib_arr, fib_val};

#[derive(Parser)]
#[command(name = "tupy", author, version, about, long_about = None)]
struct Cli {
    /// Set log filter value [ off, error, warn, info, debug, trace ]
    #[arg(long)]
    #[arg(default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the Fibonacci number at the given index.
    Value {
        /// Zero-based index into the sequence
        #[arg(allow_negative_numbers = true)]
        index: i64,

        /// Use matrix exponentiation instead of iteration
        #[arg(long)]
        fast: bool,
    },
    /// Prints the Fibonacci numbers up to the given index.
    Array {
        /// Zero-based index into the sequence
        #[arg(allow_negative_numbers = true)]
        index: i64,

        /// Also print the number at the index itself
        #[arg(long)]
        inclusive: bool,

        #[arg(long)]
        #[arg(value_enum, default_value_t = StrategyArg::Sequential)]
        strategy: StrategyArg,

        /// Number of values computed per chunk by the parallel strategies
        #[arg(long)]
        #[arg(default_value_t = ArrayOptions::default().chunk_size)]
        chunk_size: usize,

        /// Maximum number of chunks in flight with the tokio strategy
        #[arg(long)]
        #[arg(default_value_t = ArrayOptions::default().max_concurrent_tasks)]
        max_concurrent_tasks: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Sequential,
    Rayon,
    Threads,
    Tokio,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Sequential => Strategy::Sequential,
            StrategyArg::Rayon => Strategy::Rayon,
            StrategyArg::Threads => Strategy::Threads,
            StrategyArg::Tokio => Strategy::Tokio,
        }
    }
}

fn format_array(values: &[BigUint]) -> String {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        None => {
            writeln!(out, "The Fibonacci number at index 6 is {}.", fib_val(6)?)?;
            writeln!(
                out,
                "The Fibonacci numbers up to index 9 are {}.",
                format_array(&fib_arr(9, false)?)
            )?;
        }
        Some(Commands::Value { index, fast }) => {
            let value = if fast {
                tupy::fibo::fib_val_fast(index)?
            } else {
                fib_val(index)?
            };
            writeln!(out, "{value}")?;
        }
        Some(Commands::Array {
            index,
            inclusive,
            strategy,
            chunk_size,
            max_concurrent_tasks,
        }) => {
            let options = ArrayOptions {
                chunk_size,
                max_concurrent_tasks,
            };
            let values = fib_arr_with(strategy.into(), index, inclusive, &options)?;
            info!("computed {} values", values.len());
            writeln!(out, "{}", format_array(&values))?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    Builder::new()
        .filter_level(args.log_level)
        .parse_default_env()
        .target(Target::Stderr)
        .init();

    let stdout = io::stdout();
    run(args, &mut stdout.lock())
}
