use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{CastOptions, cast_with_options};
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use calamine::{Data, Reader, Xls, Xlsx};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file type: {filename}")]
    UnsupportedFormat { filename: String },
    #[error("failed to parse {format} file: {source:#}")]
    Parse {
        format: FileFormat,
        #[source]
        source: anyhow::Error,
    },
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// File formats the loader understands, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
    Json,
    Parquet,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileFormat::Csv => "CSV",
            FileFormat::Xlsx => "XLSX",
            FileFormat::Xls => "XLS",
            FileFormat::Json => "JSON",
            FileFormat::Parquet => "Parquet",
        };
        f.write_str(name)
    }
}

impl FileFormat {
    /// Extensions offered in the open dialog.
    pub const EXTENSIONS: &'static [&'static str] =
        &["csv", "xlsx", "xlsm", "xls", "json", "parquet", "pq"];

    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" | "xlsm" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            "json" => Some(FileFormat::Json),
            "parquet" | "pq" => Some(FileFormat::Parquet),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Decode uploaded bytes into a [`Table`].  Dispatch by the filename's extension.
///
/// Supported formats:
/// * `.csv`            – header row followed by records
/// * `.xlsx` / `.xls`  – first worksheet, first row is the header
/// * `.json`           – `[{ "col": value, ... }, ...]` (records orientation)
/// * `.parquet`        – flat columns of strings, numbers, booleans or dates
pub fn load(bytes: &[u8], filename: &str) -> Result<Table, LoadError> {
    let format = FileFormat::from_filename(filename).ok_or_else(|| LoadError::UnsupportedFormat {
        filename: filename.to_string(),
    })?;

    let parsed = match format {
        FileFormat::Csv => load_csv(bytes),
        FileFormat::Xlsx => load_workbook::<Xlsx<_>>(bytes),
        FileFormat::Xls => load_workbook::<Xls<_>>(bytes),
        FileFormat::Json => load_json(bytes),
        FileFormat::Parquet => load_parquet(bytes),
    };

    let table = parsed.map_err(|source| LoadError::Parse { format, source })?;
    log::info!(
        "Loaded {filename} as {format}: {} rows, columns {:?}",
        table.row_count(),
        table.column_names()
    );
    Ok(table)
}

/// Read a file from disk and decode it with [`load`].
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    if FileFormat::from_filename(&filename).is_none() {
        return Err(LoadError::UnsupportedFormat { filename });
    }
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load(&bytes, &filename)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
/// Column types are inferred once all cells are read (see [`infer_column`]).
fn load_csv(bytes: &[u8]) -> Result<Table> {
    let text = std::str::from_utf8(bytes).context("CSV is not valid UTF-8")?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let raw_headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if raw_headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }
    let headers = unique_headers(raw_headers);

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            cells.push(record.get(col_idx).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_column(&cells)))
        .collect();
    Table::new(columns).context("building table from CSV")
}

/// Cell texts `read_csv` treats as missing by default.
const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_null_marker(s: &str) -> bool {
    NULL_MARKERS.contains(&s)
}

/// Infer a single dtype per column the way `read_csv` does: all-integer
/// columns become `Integer`, all-numeric become `Float`, `true`/`false`
/// columns become `Bool`, anything else stays text.  Empty cells and the
/// usual missing-value markers (`NA`, `n/a`, `null`, ...) are `Null`.
fn infer_column(cells: &[String]) -> Vec<CellValue> {
    let present = || cells.iter().map(|s| s.trim()).filter(|s| !is_null_marker(s));

    let map_cells = |f: &dyn Fn(&str) -> CellValue| -> Vec<CellValue> {
        cells
            .iter()
            .map(|s| {
                let s = s.trim();
                if is_null_marker(s) { CellValue::Null } else { f(s) }
            })
            .collect()
    };

    if present().all(|s| s.parse::<i64>().is_ok()) {
        return map_cells(&|s| s.parse::<i64>().map(CellValue::Integer).unwrap_or(CellValue::Null));
    }
    if present().all(|s| s.parse::<f64>().is_ok()) {
        return map_cells(&|s| s.parse::<f64>().map(CellValue::Float).unwrap_or(CellValue::Null));
    }
    if present().all(|s| s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")) {
        return map_cells(&|s| CellValue::Bool(s.eq_ignore_ascii_case("true")));
    }
    map_cells(&|s| CellValue::String(s.to_string()))
}

/// Make header names unique and non-empty, as `read_csv` does:
/// blanks become `Unnamed: {i}`, repeats get a `.1`, `.2`, … suffix.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.is_empty() { format!("Unnamed: {i}") } else { h };
            let mut name = base.clone();
            let mut n = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}.{n}");
                n += 1;
            }
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of a workbook; `R` picks the file flavour.
fn load_workbook<'a, R>(bytes: &'a [u8]) -> Result<Table>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    let mut workbook =
        R::new(Cursor::new(bytes)).map_err(|e| anyhow::anyhow!("opening workbook: {e}"))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook contains no sheets")?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| anyhow::anyhow!("reading sheet '{sheet}': {e}"))?;
    range_to_table(&range)
}

/// First row of the used range is the header, the rest are records.
fn range_to_table(range: &calamine::Range<Data>) -> Result<Table> {
    let mut rows = range.rows();
    let header = rows.next().context("worksheet is empty")?;
    let headers = unique_headers(
        header
            .iter()
            .map(|c| match c {
                Data::Empty => String::new(),
                other => other.to_string().trim().to_string(),
            })
            .collect(),
    );

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (column, data) in cells.iter_mut().zip(row) {
            column.push(data_to_cell(data));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, mut values)| {
            settle_numbers(&mut values);
            Column::new(name, values)
        })
        .collect();
    Table::new(columns).context("building table from worksheet")
}

/// Spreadsheets store every number as a float.  A column whose numbers are
/// all whole becomes integral; any fraction keeps the whole column float.
fn settle_numbers(values: &mut [CellValue]) {
    let whole = values.iter().all(|v| match v {
        CellValue::Float(f) => f.fract() == 0.0 && f.abs() < i64::MAX as f64,
        _ => true,
    });
    for value in values.iter_mut() {
        let settled = match value {
            CellValue::Float(f) if whole => CellValue::Integer(*f as i64),
            CellValue::Integer(i) if !whole => CellValue::Float(*i as f64),
            _ => continue,
        };
        *value = settled;
    }
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => {
                let text = d.to_string();
                let date = text.strip_suffix(" 00:00:00").unwrap_or(&text).to_string();
                CellValue::Date(date)
            }
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::Date(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#{e:?}")),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "region": "North", "channel": "Online", "revenue": 120.5 },
///   ...
/// ]
/// ```
///
/// Columns are the union of keys in first-seen order; missing keys are `Null`.
fn load_json(bytes: &[u8]) -> Result<Table> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows: Vec<Vec<CellValue>> = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Table::from_rows(headers, rows).context("building table from JSON")
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); see [`column_cells`] for type mapping.
fn load_parquet(bytes: &[u8]) -> Result<Table> {
    let data = bytes::Bytes::from(bytes.to_vec());
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(data).context("reading parquet metadata")?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, cells) in values.iter_mut().enumerate() {
            let decoded = column_cells(batch.column(col_idx))
                .with_context(|| format!("decoding column '{}'", headers[col_idx]))?;
            cells.extend(decoded);
        }
    }

    let columns = headers
        .into_iter()
        .zip(values)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();
    Table::new(columns).context("building table from parquet")
}

/// Decode one Arrow column into cells.
///
/// Dictionary columns (pandas `category`) are unpacked, every integer width
/// becomes `Integer`, and `Float16`/`Float32`/decimals become `Float`.  Dates
/// and timestamps are kept as ISO text; any other type is rendered with
/// Arrow's display formatter.  Values that do not fit, or types the formatter
/// cannot render, are errors.
fn column_cells(col: &ArrayRef) -> Result<Vec<CellValue>> {
    let col = widen(col)?;
    let cells: Vec<CellValue> = match col.data_type() {
        DataType::Utf8 => col
            .as_string::<i32>()
            .iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::from))
            .collect(),
        DataType::LargeUtf8 => col
            .as_string::<i64>()
            .iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::from))
            .collect(),
        DataType::Int64 => col
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::Integer))
            .collect(),
        DataType::Float64 => col
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::Float))
            .collect(),
        DataType::Boolean => col
            .as_boolean()
            .iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::Bool))
            .collect(),
        DataType::Null => vec![CellValue::Null; col.len()],
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(..) => {
            formatted_cells(&col, CellValue::Date)?
        }
        _ => formatted_cells(&col, CellValue::String)?,
    };
    Ok(cells)
}

/// Cast a column to one of the types [`column_cells`] reads directly.
fn widen(col: &ArrayRef) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Dictionary(_, value) => {
            let unpacked = cast_with_options(col, value, &strict_cast())?;
            return widen(&unpacked);
        }
        DataType::Utf8View => DataType::Utf8,
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16
        | DataType::Float32
        | DataType::Decimal128(..)
        | DataType::Decimal256(..) => DataType::Float64,
        _ => return Ok(col.clone()),
    };
    cast_with_options(col, &target, &strict_cast())
        .with_context(|| format!("converting {} to {target}", col.data_type()))
}

/// Fail on overflow instead of replacing the value with null.
fn strict_cast() -> CastOptions<'static> {
    CastOptions {
        safe: false,
        ..Default::default()
    }
}

fn formatted_cells(col: &ArrayRef, wrap: fn(String) -> CellValue) -> Result<Vec<CellValue>> {
    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(col.as_ref(), &options)
        .with_context(|| format!("unsupported column type {}", col.data_type()))?;
    (0..col.len())
        .map(|row| -> Result<CellValue> {
            if col.is_null(row) {
                return Ok(CellValue::Null);
            }
            Ok(wrap(formatter.value(row).try_to_string()?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{
        Decimal128Array, DictionaryArray, Float64Array, Int16Array, StringArray, UInt64Array,
    };
    use arrow::datatypes::{Field, Int8Type, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::sankey::{LevelSelector, SankeyError, ValueProblem, aggregate};

    fn parquet_bytes(fields: Vec<Field>, arrays: Vec<ArrayRef>) -> Vec<u8> {
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();
        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        buf
    }

    const SALES_CSV: &str = "region,channel,product,revenue\n\
                             North,Online,Widget,10\n\
                             North,Retail,Gadget,5\n\
                             South,Online,Widget,3\n";

    #[test]
    fn csv_infers_column_types() {
        let table = load(SALES_CSV.as_bytes(), "sales.csv").unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(
            table.column_names(),
            vec!["region", "channel", "product", "revenue"]
        );
        assert_eq!(table.numeric_column_names(), vec!["revenue".to_string()]);
        assert_eq!(
            table.column("revenue").unwrap().values[0],
            CellValue::Integer(10)
        );
    }

    #[test]
    fn csv_mixed_numbers_become_floats_and_blanks_null() {
        let csv = "k,v\na,1\nb,2.5\nc,\n";
        let table = load(csv.as_bytes(), "data.CSV").unwrap();
        let v = &table.column("v").unwrap().values;
        assert_eq!(v[0], CellValue::Float(1.0));
        assert_eq!(v[1], CellValue::Float(2.5));
        assert_eq!(v[2], CellValue::Null);
    }

    #[test]
    fn csv_missing_markers_are_null() {
        let csv = "region,channel,revenue\n\
                   North,Online,10\n\
                   NA,Retail,NA\n\
                   South,n/a,3\n";
        let table = load(csv.as_bytes(), "sales.csv").unwrap();
        let revenue = &table.column("revenue").unwrap().values;
        assert_eq!(
            revenue,
            &vec![CellValue::Integer(10), CellValue::Null, CellValue::Integer(3)]
        );
        assert_eq!(table.column("region").unwrap().values[1], CellValue::Null);
        assert_eq!(table.column("channel").unwrap().values[2], CellValue::Null);

        let selector = LevelSelector::new("region", "channel", "channel", "revenue");
        assert_eq!(
            aggregate(&table, &selector).unwrap_err(),
            SankeyError::InvalidValue {
                column: "revenue".into(),
                row: 1,
                problem: ValueProblem::Missing,
            }
        );
    }

    #[test]
    fn csv_text_with_numbers_stays_text() {
        let csv = "code\n10\nA7\n";
        let table = load(csv.as_bytes(), "codes.csv").unwrap();
        assert_eq!(
            table.column("code").unwrap().values[0],
            CellValue::String("10".into())
        );
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let csv = "a,a,\n1,2,3\n";
        let table = load(csv.as_bytes(), "dup.csv").unwrap();
        assert_eq!(table.column_names(), vec!["a", "a.1", "Unnamed: 2"]);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = load(b"whatever", "notes.txt").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { ref filename } if filename == "notes.txt"));
    }

    #[test]
    fn invalid_utf8_csv_is_parse_error() {
        let err = load(&[0xff, 0xfe, 0x00], "broken.csv").unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: FileFormat::Csv, .. }));
    }

    #[test]
    fn garbage_xlsx_is_parse_error() {
        let err = load(b"not a zip archive", "book.xlsx").unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: FileFormat::Xlsx, .. }));
    }

    #[test]
    fn garbage_xls_is_parse_error() {
        let err = load(b"not a compound document", "legacy.XLS").unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: FileFormat::Xls, .. }));
    }

    #[test]
    fn xlsx_first_sheet_is_loaded() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "region").unwrap();
        sheet.write_string(0, 1, "revenue").unwrap();
        sheet.write_string(0, 2, "units").unwrap();
        sheet.write_string(1, 0, "North").unwrap();
        sheet.write_number(1, 1, 12.0).unwrap();
        sheet.write_number(1, 2, 3.0).unwrap();
        sheet.write_string(2, 0, "South").unwrap();
        sheet.write_number(2, 1, 2.5).unwrap();
        sheet.write_number(2, 2, 4.0).unwrap();
        workbook.add_worksheet().write_string(0, 0, "ignored").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = load(&bytes, "upload.xlsx").unwrap();
        assert_eq!(table.column_names(), vec!["region", "revenue", "units"]);
        assert_eq!(table.row_count(), 2);

        // A fraction anywhere keeps the whole column float.
        let revenue = &table.column("revenue").unwrap().values;
        assert_eq!(revenue, &vec![CellValue::Float(12.0), CellValue::Float(2.5)]);
        assert_eq!(revenue[0].to_string(), "12.0");
        assert!(table.column("revenue").unwrap().is_numeric());

        let units = &table.column("units").unwrap().values;
        assert_eq!(units, &vec![CellValue::Integer(3), CellValue::Integer(4)]);
    }

    #[test]
    fn json_records_union_keys() {
        let json = r#"[{"a": "x", "v": 1}, {"a": "y", "w": true}]"#;
        let table = load(json.as_bytes(), "records.json").unwrap();
        assert_eq!(table.column_names(), vec!["a", "v", "w"]);
        assert_eq!(table.column("v").unwrap().values[1], CellValue::Null);
        assert_eq!(table.column("w").unwrap().values[1], CellValue::Bool(true));
    }

    #[test]
    fn json_must_be_array() {
        let err = load(br#"{"a": 1}"#, "records.json").unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: FileFormat::Json, .. }));
    }

    #[test]
    fn parquet_columns_are_loaded() {
        let buf = parquet_bytes(
            vec![
                Field::new("region", DataType::Utf8, false),
                Field::new("revenue", DataType::Float64, true),
            ],
            vec![
                Arc::new(StringArray::from(vec!["North", "South"])),
                Arc::new(Float64Array::from(vec![Some(1.5), None])),
            ],
        );

        let table = load(&buf, "sales.parquet").unwrap();
        assert_eq!(table.column_names(), vec!["region", "revenue"]);
        assert_eq!(table.column("region").unwrap().values[1], CellValue::from("South"));
        assert_eq!(table.column("revenue").unwrap().values[0], CellValue::Float(1.5));
        assert_eq!(table.column("revenue").unwrap().values[1], CellValue::Null);
    }

    #[test]
    fn parquet_category_and_narrow_types_are_decoded() {
        let region: DictionaryArray<Int8Type> = vec!["north", "south", "north"].into_iter().collect();
        let price = Decimal128Array::from(vec![1250i128, 300, 75])
            .with_precision_and_scale(10, 2)
            .unwrap();
        let buf = parquet_bytes(
            vec![
                Field::new(
                    "region",
                    DataType::Dictionary(Box::new(DataType::Int8), Box::new(DataType::Utf8)),
                    false,
                ),
                Field::new("channel", DataType::Utf8, false),
                Field::new("units", DataType::Int16, false),
                Field::new("price", DataType::Decimal128(10, 2), false),
            ],
            vec![
                Arc::new(region),
                Arc::new(StringArray::from(vec!["web", "shop", "web"])),
                Arc::new(Int16Array::from(vec![1i16, 2, 3])),
                Arc::new(price),
            ],
        );

        let table = load(&buf, "orders.parquet").unwrap();
        assert_eq!(
            table.column("region").unwrap().values,
            vec![
                CellValue::from("north"),
                CellValue::from("south"),
                CellValue::from("north")
            ]
        );
        assert_eq!(
            table.column("units").unwrap().values,
            vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Integer(3)]
        );
        assert_eq!(table.column("price").unwrap().values[0], CellValue::Float(12.5));
        assert_eq!(
            table.numeric_column_names(),
            vec!["units".to_string(), "price".to_string()]
        );

        let selector = LevelSelector::new("region", "channel", "channel", "units");
        let diagram = aggregate(&table, &selector).unwrap();
        assert_eq!(&diagram.labels()[1..3], ["north", "south"]);
        let from_root: f64 = diagram
            .edges()
            .iter()
            .filter(|e| e.source == 0)
            .map(|e| e.value)
            .sum();
        assert_eq!(from_root, 6.0);
    }

    #[test]
    fn parquet_value_out_of_range_is_parse_error() {
        let buf = parquet_bytes(
            vec![Field::new("count", DataType::UInt64, false)],
            vec![Arc::new(UInt64Array::from(vec![u64::MAX]))],
        );
        let err = load(&buf, "counts.parquet").unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: FileFormat::Parquet, .. }));
    }

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, SALES_CSV).unwrap();
        let table = load_file(&path).unwrap();
        assert_eq!(table.row_count(), 3);

        let missing = dir.path().join("missing.csv");
        assert!(matches!(load_file(&missing), Err(LoadError::Io { .. })));
    }
}
