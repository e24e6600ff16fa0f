//! Result persistence.
//!
//! A [`Sink`] receives the consolidated table once and each category ranking
//! once, in the order they are produced. [`CsvDirSink`] writes timestamped CSV
//! files into a directory; [`MemorySink`] keeps everything in memory.
//!
//! # Output files
//!
//! ```text
//! 20210502_211720_intermediate_table.csv   chemical_name, <endpoints...>, noael_dose, Category
//! 20210502_211720_Category1.csv            count, total_values_for_endpoint, endpoint, direction
//! 20210502_211720_Category2.csv            ...
//! ```

use csv::WriterBuilder;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::SinkResult;
use crate::logs::log_warning;
use crate::models::{CategoryRanking, CategoryRankingRow, ConsolidatedTable};

/// Row-key column of the exported table.
pub const CHEMICAL_COLUMN: &str = "chemical_name";

/// Second-to-last column of the exported table.
pub const DOSE_COLUMN: &str = "noael_dose";

/// Last column of the exported table.
pub const CATEGORY_COLUMN: &str = "Category";

/// File name stem of the exported table.
pub const INTERMEDIATE_TABLE_NAME: &str = "intermediate_table";

/// Field delimiter of every file the sinks write.
pub const EXPORT_DELIMITER: char = ',';

const RANKING_HEADER: [&str; 4] = ["count", "total_values_for_endpoint", "endpoint", "direction"];

/// Destination of result tables.
pub trait Sink {
    /// Persist one category's rows, keeping their order.
    fn persist_ranking(&mut self, ranking: &CategoryRanking) -> SinkResult<()>;

    /// Persist the full consolidated table.
    fn persist_consolidated(&mut self, table: &ConsolidatedTable) -> SinkResult<()>;
}

/// Write ranking rows as CSV. The header is written even when there are no rows.
pub fn write_ranking<W: Write>(writer: W, rows: &[CategoryRankingRow]) -> SinkResult<()> {
    let mut csv = WriterBuilder::new()
        .delimiter(EXPORT_DELIMITER as u8)
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(RANKING_HEADER)?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the consolidated table as CSV, absent values as empty cells.
pub fn write_consolidated<W: Write>(writer: W, table: &ConsolidatedTable) -> SinkResult<()> {
    let mut csv = WriterBuilder::new()
        .delimiter(EXPORT_DELIMITER as u8)
        .from_writer(writer);

    let mut header = Vec::with_capacity(table.endpoint_count() + 3);
    header.push(CHEMICAL_COLUMN);
    header.extend(table.endpoints().iter().map(String::as_str));
    header.push(DOSE_COLUMN);
    header.push(CATEGORY_COLUMN);
    csv.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.chemical_name.clone());
        record.extend(row.cells.iter().map(|c| c.clone().unwrap_or_default()));
        record.push(row.noael_dose.map(|d| d.to_string()).unwrap_or_default());
        record.push(row.noael_category.clone().unwrap_or_default());
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Sink writing `{timestamp}_{name}.csv` files into a directory.
///
/// One timestamp is taken when the sink is created and shared by every file
/// of the run. Category names that sanitise to an already used file name, or
/// to the intermediate table's name, get a `_2`, `_3`, ... suffix. Names are
/// compared case-insensitively.
#[derive(Debug, Clone)]
pub struct CsvDirSink {
    dir: PathBuf,
    timestamp: String,
    written: Vec<PathBuf>,
    used_stems: HashSet<String>,
}

impl CsvDirSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        Self::with_timestamp(dir, timestamp)
    }

    pub fn with_timestamp(dir: impl AsRef<Path>, timestamp: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            timestamp: timestamp.into(),
            written: Vec::new(),
            used_stems: HashSet::new(),
        }
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Path used for a table name.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.csv", self.timestamp, sanitize_file_name(name)))
    }

    /// Reserve a file name stem for a category, unique within this sink.
    fn category_stem(&mut self, category: &str) -> String {
        let base = sanitize_file_name(category);
        let mut stem = base.clone();
        let mut n = 1;
        while stem.to_lowercase() == INTERMEDIATE_TABLE_NAME
            || !self.used_stems.insert(stem.to_lowercase())
        {
            n += 1;
            stem = format!("{}_{}", base, n);
        }
        if n > 1 {
            log_warning(format!(
                "Category '{}' written as '{}' to avoid overwriting another file",
                category, stem
            ));
        }
        stem
    }

    fn create(&self, stem: &str) -> SinkResult<(PathBuf, fs::File)> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(stem);
        let file = fs::File::create(&path)?;
        Ok((path, file))
    }
}

impl Sink for CsvDirSink {
    fn persist_ranking(&mut self, ranking: &CategoryRanking) -> SinkResult<()> {
        let stem = self.category_stem(&ranking.category);
        let (path, file) = self.create(&stem)?;
        write_ranking(file, &ranking.rows)?;
        tracing::debug!(path = %path.display(), rows = ranking.rows.len(), "ranking written");
        self.written.push(path);
        Ok(())
    }

    fn persist_consolidated(&mut self, table: &ConsolidatedTable) -> SinkResult<()> {
        let (path, file) = self.create(INTERMEDIATE_TABLE_NAME)?;
        write_consolidated(file, table)?;
        tracing::debug!(path = %path.display(), chemicals = table.chemical_count(), "table written");
        self.written.push(path);
        Ok(())
    }
}

/// Sink keeping results in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub rankings: Vec<CategoryRanking>,
    pub consolidated: Option<ConsolidatedTable>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranking(&self, category: &str) -> Option<&CategoryRanking> {
        self.rankings.iter().find(|r| r.category == category)
    }
}

impl Sink for MemorySink {
    fn persist_ranking(&mut self, ranking: &CategoryRanking) -> SinkResult<()> {
        self.rankings.push(ranking.clone());
        Ok(())
    }

    fn persist_consolidated(&mut self, table: &ConsolidatedTable) -> SinkResult<()> {
        self.consolidated = Some(table.clone());
        Ok(())
    }
}

/// Replace characters that are unsafe in file names.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
