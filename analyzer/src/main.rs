//! noael-rank CLI - Rank toxicology endpoints per NOAEL category
//!
//! # Commands
//!
//! ```bash
//! noael-rank analyze Subchronic_complete.csv     # Table, rankings and statistics
//! noael-rank pivot Subchronic_complete.csv       # Only the intermediate table
//! noael-rank rank 20210502_211720_intermediate_table.csv
//! noael-rank stats Subchronic_complete.csv --json
//! ```
//!
//! Defaults come from `NOAEL_RANK_*` environment variables (a `.env` file is
//! loaded if present); flags override them.

use clap::{Args, Parser, Subcommand};
use noael_rank::config::{parse_column_name, parse_delimiter};
use noael_rank::logs::init_tracing;
use noael_rank::{
    analyze_csv, pivot_csv, rank_intermediate, statistics_csv, AnalyzerOptions, Statistics,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "noael-rank")]
#[command(about = "Rank toxicology endpoints by direction of effect per NOAEL category", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Report debug details (conflicting pairs, inconsistent NOAELs)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full run: intermediate table, one ranking per category, statistics
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Do not write the intermediate table
        #[arg(long)]
        no_intermediate: bool,
    },

    /// Build and write only the intermediate (chemical × endpoint) table
    Pivot {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Rank categories from a previously written intermediate table
    Rank {
        /// Intermediate table CSV
        intermediate: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print statistics without writing any file
    Stats {
        #[command(flatten)]
        input: InputArgs,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input CSV file (one row per observation)
    input: PathBuf,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Chemical name column
    #[arg(long)]
    chemical_column: Option<String>,

    /// Endpoint column
    #[arg(long)]
    endpoint_column: Option<String>,

    /// Direction column
    #[arg(long)]
    direction_column: Option<String>,

    /// NOAEL dose column
    #[arg(long)]
    dose_column: Option<String>,

    /// NOAEL category column
    #[arg(long)]
    category_column: Option<String>,
}

impl InputArgs {
    fn apply(&self, options: &mut AnalyzerOptions) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref raw) = self.delimiter {
            options.delimiter = Some(parse_delimiter("--delimiter", raw)?);
        }
        let columns = &mut options.columns;
        let overrides = [
            ("--chemical-column", &self.chemical_column, &mut columns.chemical_name),
            ("--endpoint-column", &self.endpoint_column, &mut columns.endpoint),
            ("--direction-column", &self.direction_column, &mut columns.direction),
            ("--dose-column", &self.dose_column, &mut columns.noael_dose),
            ("--category-column", &self.category_column, &mut columns.noael_category),
        ];
        for (flag, value, slot) in overrides {
            if let Some(name) = value {
                *slot = parse_column_name(flag, name)?;
            }
        }
        Ok(())
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Directory for result files (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl OutputArgs {
    fn apply(&self, options: &mut AnalyzerOptions) {
        if let Some(ref dir) = self.output_dir {
            options.output_dir = dir.clone();
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("⚠️  {}", e);
    }

    if let Err(e) = run(cli.command) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = AnalyzerOptions::from_env()?;

    match command {
        Commands::Analyze {
            input,
            output,
            no_intermediate,
        } => {
            input.apply(&mut options)?;
            output.apply(&mut options);
            if no_intermediate {
                options.export_intermediate = false;
            }
            cmd_analyze(&input.input, &options)
        }

        Commands::Pivot { input, output } => {
            input.apply(&mut options)?;
            output.apply(&mut options);
            cmd_pivot(&input.input, &options)
        }

        Commands::Rank {
            intermediate,
            output,
        } => {
            output.apply(&mut options);
            cmd_rank(&intermediate, &options)
        }

        Commands::Stats { input, json } => {
            input.apply(&mut options)?;
            cmd_stats(&input.input, &options, json)
        }
    }
}

fn cmd_analyze(input: &Path, options: &AnalyzerOptions) -> Result<(), Box<dyn std::error::Error>> {
    let result = analyze_csv(input, options)?;

    print_outputs(&result.outputs);
    print!("{}", result.statistics);
    Ok(())
}

fn cmd_pivot(input: &Path, options: &AnalyzerOptions) -> Result<(), Box<dyn std::error::Error>> {
    let (consolidation, outputs) = pivot_csv(input, options)?;

    print_outputs(&outputs);
    print!(
        "{}",
        Statistics::collect(&consolidation.table, Some(consolidation.conflict_count()))
    );
    Ok(())
}

fn cmd_rank(intermediate: &Path, options: &AnalyzerOptions) -> Result<(), Box<dyn std::error::Error>> {
    let result = rank_intermediate(intermediate, options)?;

    print_outputs(&result.outputs);
    print!("{}", result.statistics);
    Ok(())
}

fn cmd_stats(input: &Path, options: &AnalyzerOptions, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let statistics = statistics_csv(input, options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statistics)?);
    } else {
        print!("{}", statistics);
    }
    Ok(())
}

fn print_outputs(outputs: &[PathBuf]) {
    for path in outputs {
        eprintln!("💾 Output written to: {}", path.display());
    }
}
