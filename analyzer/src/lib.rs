//! # noael-rank - Endpoint direction rankings per NOAEL category
//!
//! noael-rank turns toxicology study exports (one row per chemical, endpoint
//! and study observation) into a chemical × endpoint direction table and
//! ranks, for every NOAEL category, which endpoints most often increase or
//! decrease.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Loader    │────▶│ Consolidate │────▶│    Rank     │
//! │  (records)  │     │ (auto-enc)  │     │ (pivot+NOAEL│     │ (per categ.)│
//! └─────────────┘     └─────────────┘     └──────┬──────┘     └──────┬──────┘
//!                                                │                   │
//!                                                ▼                   ▼
//!                                         intermediate table   one CSV per category
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use noael_rank::{analyze_records, MemorySink, ObservationRecord, RecordSet, AnalyzerOptions};
//!
//! let records = RecordSet::new(vec![
//!     ObservationRecord::new("X", "Liver", "Increase").with_noael(10.0, "Category2"),
//! ]);
//! let mut sink = MemorySink::new();
//! let result = analyze_records(&records, &mut sink, &AnalyzerOptions::default()).unwrap();
//! println!("{}", result.statistics);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (ObservationRecord, ConsolidatedTable, CategoryRanking)
//! - [`config`] - Options and environment configuration
//! - [`parser`] - CSV loading with auto-detection
//! - [`transform`] - Pivot, NOAEL consolidation, ranking and pipeline
//! - [`sink`] - Result persistence
//! - [`stats`] - Run statistics
//! - [`logs`] - Progress logging

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Loading
pub mod parser;

// Transformation
pub mod transform;

// Persistence
pub mod sink;

// Reporting
pub mod logs;
pub mod stats;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, LoadError, PipelineError, PipelineResult, SinkError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CategoryRanking,
    CategoryRankingRow,
    ConsolidatedRow,
    ConsolidatedTable,
    Direction,
    ObservationRecord,
    RecordSet,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{AnalyzerOptions, ColumnNames};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use parser::{
    parse_bytes_auto,
    read_consolidated_table,
    detect_encoding,
    detect_delimiter,
    decode_content,
    CsvLoader,
    Loader,
    ParseResult,
};

// =============================================================================
// Re-exports - Core transformations
// =============================================================================

pub use transform::{
    build_pivot,
    consolidate,
    consolidate_noael,
    rank_categories,
    rank_category,
    Conflict,
    Consolidation,
    Noael,
    PivotMatrix,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    analyze,
    analyze_csv,
    analyze_records,
    pivot_csv,
    rank_intermediate,
    statistics_csv,
    AnalysisResult,
    CsvInfo,
};

// =============================================================================
// Re-exports - Sinks and statistics
// =============================================================================

pub use sink::{CsvDirSink, MemorySink, Sink};
pub use stats::Statistics;
