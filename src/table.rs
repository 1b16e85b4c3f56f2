//! Table types for catar.
//!
//! Provides the [`Table`] wrapper over Arrow record batches that every
//! analysis module consumes by shared reference. Loading helpers cover
//! CSV, Parquet and JSON Lines; the missing marker is the Arrow null.

use std::{path::Path, sync::Arc};

use arrow::{
    array::{Array, Float64Array, RecordBatch},
    compute::cast,
    datatypes::{DataType, Schema, SchemaRef},
    util::display::array_value_to_string,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{Error, Result};

/// An in-memory rectangular table backed by Arrow RecordBatches.
///
/// Columns are named and typed; every column has the same row count
/// (Arrow enforces this per batch, and [`Table::new`] rejects batches
/// with disagreeing schemas). Analysis functions never mutate a table.
///
/// # Example
///
/// ```no_run
/// use catar::Table;
///
/// let table = Table::from_csv("data/users.csv").unwrap();
/// println!("{} rows, {} columns", table.n_rows(), table.n_cols());
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    batches: Vec<RecordBatch>,
    schema: SchemaRef,
    row_count: usize,
}

impl Table {
    /// Creates a new Table from a vector of RecordBatches.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The batches vector is empty (no schema to adopt)
    /// - The batches have inconsistent schemas
    pub fn new(batches: Vec<RecordBatch>) -> Result<Self> {
        if batches.is_empty() {
            return Err(Error::EmptyTable);
        }

        let schema = batches[0].schema();

        for (i, batch) in batches.iter().enumerate().skip(1) {
            if batch.schema() != schema {
                return Err(Error::schema_mismatch(format!(
                    "Batch {} has different schema than batch 0",
                    i
                )));
            }
        }

        let row_count = batches.iter().map(|b| b.num_rows()).sum();

        Ok(Self {
            batches,
            schema,
            row_count,
        })
    }

    /// Creates a Table from a single RecordBatch.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch list would be empty.
    pub fn from_batch(batch: RecordBatch) -> Result<Self> {
        Self::new(vec![batch])
    }

    /// Creates a zero-row Table with the given schema.
    ///
    /// A zero-row table is structurally valid input for every analysis
    /// function; the degenerate shape yields well-defined defaults
    /// rather than errors.
    #[must_use]
    pub fn empty(schema: SchemaRef) -> Self {
        Self {
            batches: Vec::new(),
            schema,
            row_count: 0,
        }
    }

    /// Loads a table from a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid
    /// Parquet, or contains no batches.
    pub fn from_parquet(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(Error::Parquet)?;
        let reader = builder.build().map_err(Error::Parquet)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        if batches.is_empty() {
            return Err(Error::EmptyTable);
        }

        Self::new(batches)
    }

    /// Loads a table from Parquet bytes in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid Parquet.
    pub fn from_parquet_bytes(data: &[u8]) -> Result<Self> {
        use bytes::Bytes;

        let bytes = Bytes::copy_from_slice(data);

        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).map_err(Error::Parquet)?;
        let reader = builder.build().map_err(Error::Parquet)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        if batches.is_empty() {
            return Err(Error::EmptyTable);
        }

        Self::new(batches)
    }

    /// Loads a table from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid
    /// CSV, or contains no batches.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Loads a table from a CSV file with options.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the file is empty.
    pub fn from_csv_with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        use std::io::{BufReader, Seek, SeekFrom};

        use arrow_csv::{reader::Format, ReaderBuilder};

        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let mut buf_reader = BufReader::new(file);

        // Get schema (infer or use provided)
        let schema = if let Some(schema) = options.schema {
            Arc::new(schema)
        } else {
            let mut format = Format::default().with_header(options.has_header);
            if let Some(delim) = options.delimiter {
                format = format.with_delimiter(delim);
            }
            let (inferred, _) = format
                .infer_schema(&mut buf_reader, Some(1000))
                .map_err(Error::Arrow)?;

            buf_reader
                .seek(SeekFrom::Start(0))
                .map_err(|e| Error::io(e, path))?;

            Arc::new(inferred)
        };

        let mut builder = ReaderBuilder::new(schema)
            .with_batch_size(options.batch_size)
            .with_header(options.has_header);

        if let Some(delim) = options.delimiter {
            builder = builder.with_delimiter(delim);
        }

        let reader = builder.build(buf_reader).map_err(Error::Arrow)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        if batches.is_empty() {
            return Err(Error::EmptyTable);
        }

        Self::new(batches)
    }

    /// Loads a table from a CSV string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid CSV.
    pub fn from_csv_str(data: &str) -> Result<Self> {
        use std::io::Cursor;

        use arrow_csv::{reader::Format, ReaderBuilder};

        let format = Format::default().with_header(true);
        let mut cursor = Cursor::new(data.as_bytes());
        let (inferred, _) = format
            .infer_schema(&mut cursor, Some(1000))
            .map_err(Error::Arrow)?;

        let reader = ReaderBuilder::new(Arc::new(inferred))
            .with_header(true)
            .build(Cursor::new(data.as_bytes()))
            .map_err(Error::Arrow)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        if batches.is_empty() {
            return Err(Error::EmptyTable);
        }

        Self::new(batches)
    }

    /// Loads a table from a JSON Lines (JSONL) file.
    ///
    /// Each line in the file should be a valid JSON object representing
    /// a row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        use std::io::BufReader;

        use arrow_json::ReaderBuilder;

        let path = path.as_ref();

        let infer_file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let infer_reader = BufReader::new(infer_file);
        let (inferred, _) = arrow_json::reader::infer_json_schema(infer_reader, Some(1000))
            .map_err(Error::Arrow)?;

        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let buf_reader = BufReader::new(file);

        let reader = ReaderBuilder::new(Arc::new(inferred))
            .with_batch_size(1024)
            .build(buf_reader)
            .map_err(Error::Arrow)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        if batches.is_empty() {
            return Err(Error::EmptyTable);
        }

        Self::new(batches)
    }

    /// Returns the schema of the table.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Returns the record batches backing the table.
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.schema.fields().len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Returns the column names in schema order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }

    /// Returns the index of the named column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no column has that name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.schema
            .fields()
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Returns the Arrow data type of the named column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no column has that name.
    pub fn column_type(&self, name: &str) -> Result<&DataType> {
        let idx = self.column_index(name)?;
        Ok(self.schema.field(idx).data_type())
    }

    /// Collects the named column as stringified cells.
    ///
    /// Null cells become `None`; every other cell is rendered to its
    /// canonical string form. This is the representation used for
    /// distinct counting and top-value tables, where only cell identity
    /// matters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no column has that name.
    pub fn string_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        use arrow::array::{
            BooleanArray, Float32Array, Int32Array, Int64Array, LargeStringArray, StringArray,
        };

        let idx = self.column_index(name)?;
        let mut values = Vec::with_capacity(self.row_count);

        for batch in &self.batches {
            let array = batch.column(idx);

            for i in 0..array.len() {
                if array.is_null(i) {
                    values.push(None);
                } else if let Some(arr) = array.as_any().downcast_ref::<StringArray>() {
                    values.push(Some(arr.value(i).to_string()));
                } else if let Some(arr) = array.as_any().downcast_ref::<LargeStringArray>() {
                    values.push(Some(arr.value(i).to_string()));
                } else if let Some(arr) = array.as_any().downcast_ref::<Int32Array>() {
                    values.push(Some(arr.value(i).to_string()));
                } else if let Some(arr) = array.as_any().downcast_ref::<Int64Array>() {
                    values.push(Some(arr.value(i).to_string()));
                } else if let Some(arr) = array.as_any().downcast_ref::<Float64Array>() {
                    values.push(Some(arr.value(i).to_string()));
                } else if let Some(arr) = array.as_any().downcast_ref::<Float32Array>() {
                    values.push(Some(arr.value(i).to_string()));
                } else if let Some(arr) = array.as_any().downcast_ref::<BooleanArray>() {
                    values.push(Some(arr.value(i).to_string()));
                } else {
                    let rendered = array_value_to_string(array.as_ref(), i)
                        .unwrap_or_else(|_| "?".to_string());
                    values.push(Some(rendered));
                }
            }
        }

        Ok(values)
    }

    /// Collects the named numeric column as `f64` cells.
    ///
    /// Null cells become `None`. Integer and decimal columns are cast
    /// to `Float64` first, so the result covers every Arrow numeric
    /// type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] for an unknown name and
    /// [`Error::SchemaMismatch`] for a non-numeric column.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        let data_type = self.schema.field(idx).data_type();

        if !data_type.is_numeric() {
            return Err(Error::schema_mismatch(format!(
                "Column '{}' is not numeric (found {})",
                name, data_type
            )));
        }

        let mut values = Vec::with_capacity(self.row_count);

        for batch in &self.batches {
            let casted = cast(batch.column(idx), &DataType::Float64).map_err(Error::Arrow)?;
            let array = casted
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| Error::schema_mismatch("cast to Float64 produced another type"))?;

            for i in 0..array.len() {
                if array.is_null(i) {
                    values.push(None);
                } else {
                    values.push(Some(array.value(i)));
                }
            }
        }

        Ok(values)
    }
}

/// Options for CSV parsing.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Field delimiter (defaults to comma when `None`).
    pub delimiter: Option<u8>,
    /// Rows per record batch.
    pub batch_size: usize,
    /// Explicit schema (inferred from the file when `None`).
    pub schema: Option<Schema>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: None,
            batch_size: 1024,
            schema: None,
        }
    }
}
