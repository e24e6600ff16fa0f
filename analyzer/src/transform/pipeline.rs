//! High-level pipeline API.
//!
//! This module provides easy-to-use functions that combine all steps:
//! loading, consolidation, ranking, persistence and statistics.
//!
//! # Example
//!
//! ```rust,ignore
//! use noael_rank::{analyze_csv, AnalyzerOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = analyze_csv(Path::new("Subchronic_complete.csv"), &AnalyzerOptions::default())?;
//!     println!("{}", result.statistics);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::consolidate::{consolidate, Consolidation};
use super::pivot::Conflict;
use super::ranking::rank_categories;
use crate::config::AnalyzerOptions;
use crate::error::{PipelineError, PipelineResult};
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::models::{CategoryRanking, ConsolidatedTable, RecordSet};
use crate::parser::{read_consolidated_table, CsvLoader, Loader, ParseResult};
use crate::sink::{CsvDirSink, Sink};
use crate::stats::Statistics;

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of a complete analysis run
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Chemical × endpoint table with consolidated NOAEL
    pub table: ConsolidatedTable,

    /// Chemical/endpoint pairs left absent because several records matched
    pub conflicts: Vec<Conflict>,

    /// One ranking per non-missing category, ascending by category
    pub rankings: Vec<CategoryRanking>,

    /// Run counts
    pub statistics: Statistics,

    /// Input metadata when the records came from a CSV file
    pub csv_info: Option<CsvInfo>,

    /// Files written by the sink, when it writes files
    pub outputs: Vec<PathBuf>,
}

/// Load, consolidate, rank and persist.
pub fn analyze<L, S>(loader: &L, sink: &mut S, options: &AnalyzerOptions) -> PipelineResult<AnalysisResult>
where
    L: Loader + ?Sized,
    S: Sink + ?Sized,
{
    let records = loader.load()?;
    analyze_records(&records, sink, options)
}

/// Consolidate and rank an already loaded record set.
///
/// The consolidated table is persisted first when
/// [`AnalyzerOptions::export_intermediate`] is set, then each category ranking.
pub fn analyze_records<S>(
    records: &RecordSet,
    sink: &mut S,
    options: &AnalyzerOptions,
) -> PipelineResult<AnalysisResult>
where
    S: Sink + ?Sized,
{
    let consolidation = build_table(records, sink, options)?;
    let rankings = rank_and_persist(&consolidation.table, sink)?;

    let statistics = Statistics::collect(&consolidation.table, Some(consolidation.conflict_count()))
        .with_rankings(&rankings);

    Ok(AnalysisResult {
        table: consolidation.table,
        conflicts: consolidation.conflicts,
        rankings,
        statistics,
        csv_info: None,
        outputs: Vec::new(),
    })
}

/// Consolidate a record set and export the table if requested.
pub fn build_table<S>(
    records: &RecordSet,
    sink: &mut S,
    options: &AnalyzerOptions,
) -> PipelineResult<Consolidation>
where
    S: Sink + ?Sized,
{
    if records.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    log_info("🧪 Building chemical × endpoint table...");
    let consolidation = consolidate(records);
    let table = &consolidation.table;
    log_success(format!(
        "{} chemicals × {} endpoints",
        table.chemical_count(),
        table.endpoint_count()
    ));

    if consolidation.conflict_count() > 0 {
        log_warning(format!(
            "{} chemical/endpoint pairs with multiple records left empty",
            consolidation.conflict_count()
        ));
    }
    if table.missing_noael_count() > 0 {
        log_warning(format!(
            "{} chemicals without a consistent NOAEL",
            table.missing_noael_count()
        ));
    }

    if options.export_intermediate {
        sink.persist_consolidated(table).map_err(|err| {
            log_error(format!("Intermediate table not written: {}", err));
            err
        })?;
        log_success("Intermediate table exported");
    }

    Ok(consolidation)
}

/// Rank every category of the table and hand each ranking to the sink.
pub fn rank_and_persist<S>(table: &ConsolidatedTable, sink: &mut S) -> PipelineResult<Vec<CategoryRanking>>
where
    S: Sink + ?Sized,
{
    log_info(format!("📊 Ranking endpoints (total count: {})", table.chemical_count()));
    let rankings = rank_categories(table);

    if rankings.is_empty() {
        log_warning("No chemical has a consistent NOAEL category");
    }

    for ranking in &rankings {
        sink.persist_ranking(ranking).map_err(|err| {
            log_error(format!("{}: {}", ranking.category, err));
            err
        })?;
        log_info_indent(
            format!("{} count: {}", ranking.category, ranking.chemical_count),
            1,
        );
    }

    log_success(format!("{} category rankings written", rankings.len()));
    Ok(rankings)
}

/// Full run over a CSV export, writing timestamped files to the output directory.
pub fn analyze_csv(path: &Path, options: &AnalyzerOptions) -> PipelineResult<AnalysisResult> {
    let parsed = load_csv(path, options)?;
    let csv_info = report_parse(&parsed);

    let mut sink = CsvDirSink::new(&options.output_dir);
    let mut result = analyze_records(&parsed.records, &mut sink, options)?;

    result.csv_info = Some(csv_info);
    result.outputs = sink.written().to_vec();
    Ok(result)
}

/// Build and export only the consolidated table of a CSV export.
pub fn pivot_csv(path: &Path, options: &AnalyzerOptions) -> PipelineResult<(Consolidation, Vec<PathBuf>)> {
    let parsed = load_csv(path, options)?;
    report_parse(&parsed);

    let mut sink = CsvDirSink::new(&options.output_dir);
    let export = AnalyzerOptions {
        export_intermediate: true,
        ..options.clone()
    };
    let consolidation = build_table(&parsed.records, &mut sink, &export)?;

    Ok((consolidation, sink.written().to_vec()))
}

/// Rank a previously exported intermediate table.
///
/// The raw records are not available, so the conflict count is unknown.
pub fn rank_intermediate(path: &Path, options: &AnalyzerOptions) -> PipelineResult<AnalysisResult> {
    log_info(format!("📖 Reading intermediate table {}", path.display()));
    let table = read_consolidated_table(path)?;
    log_success(format!(
        "{} chemicals × {} endpoints",
        table.chemical_count(),
        table.endpoint_count()
    ));

    let mut sink = CsvDirSink::new(&options.output_dir);
    let rankings = rank_and_persist(&table, &mut sink)?;
    let statistics = Statistics::collect(&table, None).with_rankings(&rankings);

    Ok(AnalysisResult {
        table,
        conflicts: Vec::new(),
        rankings,
        statistics,
        csv_info: None,
        outputs: sink.written().to_vec(),
    })
}

/// Statistics of a CSV export without writing anything.
pub fn statistics_csv(path: &Path, options: &AnalyzerOptions) -> PipelineResult<Statistics> {
    let parsed = load_csv(path, options)?;
    report_parse(&parsed);

    if parsed.records.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let consolidation = consolidate(&parsed.records);
    let rankings = rank_categories(&consolidation.table);
    Ok(
        Statistics::collect(&consolidation.table, Some(consolidation.conflict_count()))
            .with_rankings(&rankings),
    )
}

fn load_csv(path: &Path, options: &AnalyzerOptions) -> PipelineResult<ParseResult> {
    log_info(format!("📖 Reading {}", path.display()));
    let mut loader = CsvLoader::from_path(path, options.columns.clone());
    if let Some(delimiter) = options.delimiter {
        loader = loader.with_delimiter(delimiter);
    }
    Ok(loader.parse()?)
}

fn report_parse(parsed: &ParseResult) -> CsvInfo {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parsed.delimiter)));
    log_success(format!("Read {} records", parsed.records.len()));

    CsvInfo {
        encoding: parsed.encoding.clone(),
        delimiter: parsed.delimiter,
        headers: parsed.headers.clone(),
        row_count: parsed.records.len(),
    }
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
