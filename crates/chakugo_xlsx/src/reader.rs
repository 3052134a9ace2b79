//! Ingestion of uploaded sheets into typed input rows.
//!
//! Two sources are supported:
//! - raw `.xlsx` bytes, decoded with `calamine` (header on source row 2,
//!   source rows 3-4 skipped by default);
//! - a Polars `DataFrame` (or its Arrow IPC bytes) that already carries the
//!   source column names.

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use log::{debug, warn};
use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader};

use crate::spec::{ChakugoError, EnumCellValue, SpecIngestOptions, SpecInputRow, SpecInputSchema};
use crate::util::{
    convert_cell_value_to_quantity, derive_duplicate_column_warnings, select_schema_indices,
};

/// Rows read from one source plus non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecInputTable {
    /// Data rows in source order.
    pub rows: Vec<SpecInputRow>,
    /// Non-fatal ingestion warnings.
    pub warnings: Vec<String>,
}

////////////////////////////////////////////////////////////////////////////////
// #region XlsxSource

/// Decode the first worksheet of an in-memory `.xlsx` file.
pub fn read_input_rows_from_xlsx_bytes(
    data: &[u8],
    schema: &SpecInputSchema,
    ingest: &SpecIngestOptions,
) -> Result<SpecInputTable, ChakugoError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(data)).map_err(|err| ChakugoError::Read(err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ChakugoError::EmptyWorkbook)?
        .map_err(|err| ChakugoError::Read(err.to_string()))?;

    let grid = derive_grid_from_range(&range);
    debug!(
        "decoded worksheet: {} rows x {} cols",
        grid.len(),
        grid.first().map_or(0, Vec::len)
    );
    read_input_rows_from_grid(&grid, schema, ingest)
}

/// Build input rows from an absolute-position cell grid (row 0 = sheet row 1).
pub fn read_input_rows_from_grid(
    grid: &[Vec<EnumCellValue>],
    schema: &SpecInputSchema,
    ingest: &SpecIngestOptions,
) -> Result<SpecInputTable, ChakugoError> {
    let n_idx_header = ingest.row_header.saturating_sub(1);
    let l_header: Vec<String> = grid
        .get(n_idx_header)
        .map(|row| row.iter().map(derive_header_text).collect())
        .unwrap_or_default();

    let warnings = derive_duplicate_column_warnings(&l_header);
    for c_warning in &warnings {
        warn!("{c_warning}");
    }
    let [n_col_code, n_col_name, n_col_category, n_col_qty] =
        select_schema_indices(&l_header, schema)?;

    let mut rows = Vec::new();
    for (n_idx_row, row) in grid.iter().enumerate().skip(n_idx_header + 1) {
        let n_row_source = n_idx_row + 1;
        if ingest.rows_skipped.contains(&n_row_source) {
            continue;
        }
        if row.iter().all(EnumCellValue::is_blank) {
            continue;
        }

        let cell_at = |n_col: usize| row.get(n_col).cloned().unwrap_or(EnumCellValue::None);
        rows.push(SpecInputRow {
            product_code: cell_at(n_col_code),
            product_name: cell_at(n_col_name),
            category: cell_at(n_col_category),
            qty_adjust: convert_cell_value_to_quantity(&cell_at(n_col_qty), n_row_source)?,
        });
    }

    Ok(SpecInputTable { rows, warnings })
}

fn derive_grid_from_range(range: &Range<Data>) -> Vec<Vec<EnumCellValue>> {
    let Some((n_row_end, n_col_end)) = range.end() else {
        return vec![];
    };

    (0..=n_row_end)
        .map(|n_row| {
            (0..=n_col_end)
                .map(|n_col| {
                    range
                        .get_value((n_row, n_col))
                        .map_or(EnumCellValue::None, derive_cell_value_from_data)
                })
                .collect()
        })
        .collect()
}

fn derive_cell_value_from_data(value: &Data) -> EnumCellValue {
    match value {
        Data::Empty | Data::Error(_) => EnumCellValue::None,
        Data::String(val) if val.is_empty() => EnumCellValue::None,
        Data::String(val) => EnumCellValue::String(val.clone()),
        Data::Int(val) => EnumCellValue::Number(*val as f64),
        Data::Float(val) => EnumCellValue::Number(*val),
        Data::Bool(val) => EnumCellValue::String(if *val { "True" } else { "False" }.to_string()),
        _ => EnumCellValue::String(value.to_string()),
    }
}

fn derive_header_text(value: &EnumCellValue) -> String {
    match value {
        EnumCellValue::None => String::new(),
        _ => value.to_text(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataFrameSource

/// Read input rows from a Polars frame whose columns carry the source names.
pub fn read_input_rows_from_dataframe(
    df: &DataFrame,
    schema: &SpecInputSchema,
) -> Result<SpecInputTable, ChakugoError> {
    let l_colnames_df: Vec<String> = df
        .get_column_names_str()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    let l_idx = select_schema_indices(&l_colnames_df, schema)?;
    let l_cols = df.get_columns();

    let mut rows = Vec::with_capacity(df.height());
    for n_row in 0..df.height() {
        let mut l_cells = Vec::with_capacity(l_idx.len());
        for n_idx_col in l_idx {
            let value = l_cols[n_idx_col]
                .get(n_row)
                .map_err(|err| ChakugoError::Read(format!("Failed to access cell value: {err}")))?;
            l_cells.push(derive_cell_value_from_any_value(value));
        }
        if l_cells.iter().all(EnumCellValue::is_blank) {
            continue;
        }

        let [product_code, product_name, category, qty_adjust] =
            <[EnumCellValue; 4]>::try_from(l_cells)
                .map_err(|_| ChakugoError::Read("Schema width mismatch.".to_string()))?;
        rows.push(SpecInputRow {
            product_code,
            product_name,
            category,
            qty_adjust: convert_cell_value_to_quantity(&qty_adjust, n_row + 1)?,
        });
    }

    Ok(SpecInputTable {
        rows,
        warnings: vec![],
    })
}

/// Read input rows from IPC-serialized dataframe bytes.
pub fn read_input_rows_from_ipc_bytes(
    v_ipc_df: &[u8],
    schema: &SpecInputSchema,
) -> Result<SpecInputTable, ChakugoError> {
    let df = IpcReader::new(Cursor::new(v_ipc_df))
        .finish()
        .map_err(|err| ChakugoError::Read(format!("Failed to read IPC DataFrame bytes: {err}")))?;
    read_input_rows_from_dataframe(&df, schema)
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) if val.is_empty() => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => {
            EnumCellValue::String(if val { "True" } else { "False" }.to_string())
        }
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
