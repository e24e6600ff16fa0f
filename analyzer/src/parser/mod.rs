//! CSV loading with encoding and delimiter auto-detection.
//!
//! Reads the raw study export into a [`RecordSet`], keeping only the five
//! columns the analysis consumes. Every other column is ignored. The module
//! also reads back an exported intermediate table (see
//! [`read_consolidated_table`]) so rankings can be recomputed without the raw
//! records.

use csv::{ReaderBuilder, StringRecord};
use std::path::{Path, PathBuf};

use crate::config::ColumnNames;
use crate::error::{LoadError, LoadResult};
use crate::models::{ConsolidatedRow, ConsolidatedTable, ObservationRecord, RecordSet};
use crate::sink::{CATEGORY_COLUMN, DOSE_COLUMN, EXPORT_DELIMITER};

/// Cell values read as "no value".
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "NULL", "null", "#N/A", "None"];

/// Source of observation records.
pub trait Loader {
    fn load(&self) -> LoadResult<RecordSet>;
}

impl Loader for RecordSet {
    fn load(&self) -> LoadResult<RecordSet> {
        Ok(self.clone())
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed observation records
    pub records: RecordSet,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

#[derive(Debug, Clone)]
enum CsvSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// [`Loader`] reading a CSV export from a file or from memory.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    source: CsvSource,
    columns: ColumnNames,
    delimiter: Option<char>,
}

impl CsvLoader {
    pub fn from_path(path: impl AsRef<Path>, columns: ColumnNames) -> Self {
        Self {
            source: CsvSource::Path(path.as_ref().to_path_buf()),
            columns,
            delimiter: None,
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>, columns: ColumnNames) -> Self {
        Self {
            source: CsvSource::Bytes(bytes.into()),
            columns,
            delimiter: None,
        }
    }

    /// Use a fixed delimiter instead of detecting it. Loading fails with
    /// [`LoadError::InvalidDelimiter`] unless it is a single ASCII character.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Load records together with the detected encoding, delimiter and headers.
    pub fn parse(&self) -> LoadResult<ParseResult> {
        let owned;
        let bytes = match &self.source {
            CsvSource::Path(path) => {
                owned = std::fs::read(path)?;
                &owned
            }
            CsvSource::Bytes(bytes) => bytes,
        };
        parse_bytes_auto(bytes, &self.columns, self.delimiter)
    }
}

impl Loader for CsvLoader {
    fn load(&self) -> LoadResult<RecordSet> {
        self.parse().map(|result| result.records)
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding, falling back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV bytes, detecting the encoding and (unless given) the delimiter.
pub fn parse_bytes_auto(
    bytes: &[u8],
    columns: &ColumnNames,
    delimiter: Option<char>,
) -> LoadResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    let (headers, records) = parse_records(&content, delimiter, columns)?;

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse decoded CSV content with an explicit delimiter.
///
/// Header names are matched ignoring surrounding whitespace; cell values are
/// kept verbatim.
pub fn parse_records(
    content: &str,
    delimiter: char,
    columns: &ColumnNames,
) -> LoadResult<(Vec<String>, RecordSet)> {
    let mut reader = csv_reader(content, delimiter)?;
    let headers = read_headers(&mut reader)?;

    let chemical = column_index(&headers, &columns.chemical_name)?;
    let endpoint = column_index(&headers, &columns.endpoint)?;
    let direction = column_index(&headers, &columns.direction)?;
    let dose = column_index(&headers, &columns.noael_dose)?;
    let category = column_index(&headers, &columns.noael_category)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        records.push(ObservationRecord {
            chemical_name: cell(&row, chemical),
            endpoint: cell(&row, endpoint),
            direction: cell(&row, direction),
            noael_dose: number(&row, dose, &columns.noael_dose)?,
            noael_category: cell(&row, category),
        });
    }

    Ok((headers, RecordSet::new(records)))
}

/// Read an exported intermediate table back into a [`ConsolidatedTable`].
///
/// The first column is the chemical name, the last two must be the dose and
/// category columns, everything in between is an endpoint. Columns and rows
/// are re-sorted if the file is not in canonical order. The file is read with
/// the delimiter the sink writes, [`EXPORT_DELIMITER`].
pub fn read_consolidated_table(path: impl AsRef<Path>) -> LoadResult<ConsolidatedTable> {
    let bytes = std::fs::read(path.as_ref())?;
    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding);
    parse_consolidated_table(&content, EXPORT_DELIMITER)
}

/// Parse intermediate table content with an explicit delimiter.
pub fn parse_consolidated_table(content: &str, delimiter: char) -> LoadResult<ConsolidatedTable> {
    let mut reader = csv_reader(content, delimiter)?;
    let headers = read_headers(&mut reader)?;

    let width = headers.len();
    if width < 3 {
        return Err(LoadError::MalformedTable(format!(
            "expected at least 3 columns, found {}",
            width
        )));
    }
    if headers[width - 2] != DOSE_COLUMN || headers[width - 1] != CATEGORY_COLUMN {
        return Err(LoadError::MalformedTable(format!(
            "last two columns must be '{}' and '{}'",
            DOSE_COLUMN, CATEGORY_COLUMN
        )));
    }

    let mut order: Vec<usize> = (1..width - 2).collect();
    order.sort_by(|&a, &b| headers[a].cmp(&headers[b]));
    let endpoints: Vec<String> = order.iter().map(|&i| headers[i].clone()).collect();
    if let Some(pair) = endpoints.windows(2).find(|w| w[0] == w[1]) {
        return Err(LoadError::MalformedTable(format!("duplicate endpoint '{}'", pair[0])));
    }

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let chemical_name = cell(&row, 0).ok_or_else(|| {
            LoadError::MalformedTable(format!("row at line {} has no chemical name", line_of(&row)))
        })?;
        rows.push(ConsolidatedRow {
            chemical_name,
            cells: order.iter().map(|&i| cell(&row, i)).collect(),
            noael_dose: number(&row, width - 2, DOSE_COLUMN)?,
            noael_category: cell(&row, width - 1),
        });
    }

    rows.sort_by(|a, b| a.chemical_name.cmp(&b.chemical_name));
    if let Some(pair) = rows.windows(2).find(|w| w[0].chemical_name == w[1].chemical_name) {
        return Err(LoadError::MalformedTable(format!(
            "duplicate chemical '{}'",
            pair[0].chemical_name
        )));
    }

    Ok(ConsolidatedTable::from_parts(endpoints, rows))
}

fn csv_reader(content: &str, delimiter: char) -> LoadResult<csv::Reader<&[u8]>> {
    if !delimiter.is_ascii() {
        return Err(LoadError::InvalidDelimiter(delimiter));
    }
    Ok(ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_reader(content.as_bytes()))
}

fn read_headers(reader: &mut csv::Reader<&[u8]>) -> LoadResult<Vec<String>> {
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if headers.iter().all(String::is_empty) {
        return Err(LoadError::EmptyFile);
    }
    Ok(headers)
}

fn column_index(headers: &[String], name: &str) -> LoadResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

fn cell(row: &StringRecord, index: usize) -> Option<String> {
    row.get(index)
        .filter(|value| !MISSING_TOKENS.contains(value))
        .map(String::from)
}

fn number(row: &StringRecord, index: usize, column: &str) -> LoadResult<Option<f64>> {
    let Some(raw) = row.get(index) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if MISSING_TOKENS.contains(&trimmed) {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| LoadError::InvalidDose {
            line: line_of(row),
            column: column.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "chemical_casrn,chemical_name,Endpoint,direction,noael_dose,Category,species";

    fn load(content: &str) -> LoadResult<ParseResult> {
        CsvLoader::from_bytes(content.as_bytes(), ColumnNames::default()).parse()
    }

    #[test]
    fn test_reads_consumed_columns_only() {
        let csv = format!("{}\n50-00-0,Formaldehyde,Liver,Increase,15,Category2,rat\n", HEADER);
        let result = load(&csv).unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.records.len(), 1);
        let record = &result.records.records()[0];
        assert_eq!(record.chemical_name.as_deref(), Some("Formaldehyde"));
        assert_eq!(record.endpoint.as_deref(), Some("Liver"));
        assert_eq!(record.direction.as_deref(), Some("Increase"));
        assert_eq!(record.noael_dose, Some(15.0));
        assert_eq!(record.noael_category.as_deref(), Some("Category2"));
    }

    #[test]
    fn test_quoted_names_keep_delimiters() {
        let csv = format!(
            "{}\n1,\"2,4-Dichlorophenol\",Kidney,Decrease,2.5,Category1,mouse\n",
            HEADER
        );
        let result = load(&csv).unwrap();

        let record = &result.records.records()[0];
        assert_eq!(record.chemical_name.as_deref(), Some("2,4-Dichlorophenol"));
        assert_eq!(record.noael_dose, Some(2.5));
    }

    #[test]
    fn test_missing_tokens_read_as_absent() {
        let csv = format!("{}\n1,X,Liver,,NA,,rat\n", HEADER);
        let result = load(&csv).unwrap();

        let record = &result.records.records()[0];
        assert_eq!(record.direction, None);
        assert_eq!(record.noael_dose, None);
        assert_eq!(record.noael_category, None);
    }

    #[test]
    fn test_invalid_dose_reports_line() {
        let csv = format!("{}\n1,X,Liver,Increase,10,Category1,rat\n1,X,Liver,Increase,ten,Category1,rat\n", HEADER);
        let err = load(&csv).unwrap_err();

        match err {
            LoadError::InvalidDose { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "noael_dose");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_column_error() {
        let err = load("chemical_name,Endpoint,direction,noael_dose\nX,Liver,Increase,1\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "Category"));
    }

    #[test]
    fn test_empty_file_error() {
        assert!(matches!(load("").unwrap_err(), LoadError::EmptyFile));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let csv = format!("{}\n1,X,Liver,Increase,1,C,rat\n\n1,Y,Liver,Decrease,1,C,rat\n", HEADER);
        assert_eq!(load(&csv).unwrap().records.len(), 2);
    }

    #[test]
    fn test_custom_columns_and_delimiter() {
        let columns = ColumnNames {
            noael_category: "noael_category".to_string(),
            ..ColumnNames::default()
        };
        let csv = "chemical_name;Endpoint;direction;noael_dose;noael_category\nX;Liver;Increase;3;Category4\n";
        let records = CsvLoader::from_bytes(csv.as_bytes(), columns).load().unwrap();

        assert_eq!(records.records()[0].noael_category.as_deref(), Some("Category4"));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_bom_stripped() {
        assert_eq!(decode_content("\u{feff}a,b".as_bytes(), "utf-8"), "a,b");
    }

    #[test]
    fn test_loader_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "1,X,Liver,Increase,1,Category1,rat").unwrap();

        let records = CsvLoader::from_path(file.path(), ColumnNames::default()).load().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_values_kept_verbatim() {
        let csv = "chemical_name,Endpoint,direction,noael_dose,Category\n\
                   X,Liver,Increase,1,C\n\
                   X ,Liver, Decrease, 1 ,C\n";
        let records = load(csv).unwrap().records;

        let names: Vec<_> = records.iter().map(|r| r.chemical_name.as_deref()).collect();
        assert_eq!(names, vec![Some("X"), Some("X ")]);
        assert_eq!(records.records()[1].direction.as_deref(), Some(" Decrease"));
        assert_eq!(records.records()[1].noael_dose, Some(1.0));

        let consolidation = crate::transform::consolidate(&records);
        assert_eq!(consolidation.table.chemicals().collect::<Vec<_>>(), vec!["X", "X "]);
        assert_eq!(consolidation.conflict_count(), 0);
        assert_eq!(consolidation.table.cell("X ", "Liver"), Some(" Decrease"));
    }

    #[test]
    fn test_padded_headers_still_match() {
        let csv = "chemical_name , Endpoint,direction,noael_dose,Category\nX,Liver,Increase,1,C\n";
        assert_eq!(load(csv).unwrap().records.len(), 1);
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let csv = "chemical_name§Endpoint§direction§noael_dose§Category\nX§Liver§Increase§1§C\n";
        let err = CsvLoader::from_bytes(csv.as_bytes(), ColumnNames::default())
            .with_delimiter('§')
            .load()
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidDelimiter('§')));
    }

    #[test]
    fn test_export_with_semicolons_reads_back() {
        let endpoint = "Liver: hypertrophy; necrosis; vacuolation; focal; diffuse";
        let records = RecordSet::new(vec![
            ObservationRecord::new("X", endpoint, "Increase").with_noael(10.0, "Category2"),
            ObservationRecord::new("Y", "Kidney", "Decrease").with_noael(5.0, "Category1"),
        ]);
        let table = crate::transform::consolidate(&records).table;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        crate::sink::write_consolidated(&mut file, &table).unwrap();
        file.flush().unwrap();

        let read = read_consolidated_table(file.path()).unwrap();
        assert_eq!(read, table);
        assert_eq!(read.cell("X", endpoint), Some("Increase"));
    }

    #[test]
    fn test_parse_consolidated_table_reorders() {
        let content = "chemical_name,Liver,Kidney,noael_dose,Category\n\
                       Y,Decrease,,,\n\
                       X,Increase,Decrease,10,Category2\n";
        let table = parse_consolidated_table(content, ',').unwrap();

        assert_eq!(table.endpoints(), ["Kidney", "Liver"]);
        assert_eq!(table.chemicals().collect::<Vec<_>>(), vec!["X", "Y"]);
        assert_eq!(table.cell("X", "Kidney"), Some("Decrease"));
        assert_eq!(table.cell("Y", "Kidney"), None);
        assert_eq!(table.row("X").unwrap().noael_dose, Some(10.0));
        assert!(table.row("Y").unwrap().is_noael_missing());
    }

    #[test]
    fn test_parse_consolidated_table_rejects_bad_layout() {
        let err = parse_consolidated_table("chemical_name,Liver,Category,noael_dose\nX,Increase,C,1\n", ',')
            .unwrap_err();
        assert!(matches!(err, LoadError::MalformedTable(_)));

        let err = parse_consolidated_table(
            "chemical_name,Liver,noael_dose,Category\nX,Increase,1,C\nX,Decrease,1,C\n",
            ',',
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate chemical"));
    }
}
