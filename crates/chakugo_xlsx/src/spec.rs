//! Extraction specification models, options and top-level error types.

use crate::conf::{
    C_COL_CATEGORY, C_COL_PRODUCT_CODE, C_COL_PRODUCT_NAME, C_COL_QTY_ADJUST, C_COL_QTY_REQUIRED,
    C_FILL_PLAIN, C_FILL_SHADED, C_LABEL_ARRIVAL_REQUIRED, C_MARKER_LOOSE_ITEM,
    C_SHEET_NAME_OUTPUT, C_SUFFIX_EXCLUDED_VARIANT, C_SUFFIX_EXCLUDED_VENDOR, N_BORDER_THIN,
    N_FONT_SIZE_OUTPUT, N_HEIGHT_OUTPUT_ROW, N_ROW_SOURCE_HEADER, N_UTC_OFFSET_HOURS,
    TUP_ROWS_SOURCE_SKIPPED, TUP_WIDTHS_OUTPUT_COLS,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification, translated to `rust_xlsxwriter::Format` at write time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCellFormat {
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Background fill color.
    pub bg_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
        }
    }
}

/// Normalized cell value read from the source table.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

impl EnumCellValue {
    /// Text form used for substring/suffix predicates.
    ///
    /// Blank renders as `nan` and integral numbers drop the fraction, so
    /// that a blank field never matches a marker.
    pub fn to_text(&self) -> String {
        match self {
            Self::None => "nan".to_string(),
            Self::String(s) => s.clone(),
            Self::Number(n) if n.is_nan() => "nan".to_string(),
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            Self::Number(n) => n.to_string(),
        }
    }

    /// Whether the cell carries no value.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::None => true,
            Self::String(s) => s.trim().is_empty(),
            Self::Number(n) => n.is_nan(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Names of the four source columns the extraction depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecInputSchema {
    /// Product code column.
    pub col_product_code: String,
    /// Product name column.
    pub col_product_name: String,
    /// Category label column.
    pub col_category: String,
    /// Signed adjustment quantity column.
    pub col_qty_adjust: String,
}

impl SpecInputSchema {
    /// Required column names in validation order.
    pub fn columns(&self) -> [&str; 4] {
        [
            &self.col_product_code,
            &self.col_product_name,
            &self.col_category,
            &self.col_qty_adjust,
        ]
    }
}

impl Default for SpecInputSchema {
    fn default() -> Self {
        Self {
            col_product_code: C_COL_PRODUCT_CODE.to_string(),
            col_product_name: C_COL_PRODUCT_NAME.to_string(),
            col_category: C_COL_CATEGORY.to_string(),
            col_qty_adjust: C_COL_QTY_ADJUST.to_string(),
        }
    }
}

/// Source sheet geometry for xlsx ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecIngestOptions {
    /// 1-based row holding the column names.
    pub row_header: usize,
    /// 1-based rows skipped after the header.
    pub rows_skipped: Vec<usize>,
}

impl Default for SpecIngestOptions {
    fn default() -> Self {
        Self {
            row_header: N_ROW_SOURCE_HEADER,
            rows_skipped: TUP_ROWS_SOURCE_SKIPPED.to_vec(),
        }
    }
}

/// Business rules and fixed output strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExtractPolicy {
    /// Category substring a retained row must contain.
    pub marker_loose_item: String,
    /// Name suffix excluding a row.
    pub suffix_excluded_variant: String,
    /// Name suffix excluding a row (vendor tag).
    pub suffix_excluded_vendor: String,
    /// Output header labels: code, name, required quantity.
    pub labels_header: [String; 3],
    /// Label following the footer date and in the file name.
    pub label_footer: String,
    /// Offset from UTC used to decide "tomorrow".
    pub utc_offset_hours: i32,
}

impl Default for SpecExtractPolicy {
    fn default() -> Self {
        Self {
            marker_loose_item: C_MARKER_LOOSE_ITEM.to_string(),
            suffix_excluded_variant: C_SUFFIX_EXCLUDED_VARIANT.to_string(),
            suffix_excluded_vendor: C_SUFFIX_EXCLUDED_VENDOR.to_string(),
            labels_header: [
                C_COL_PRODUCT_CODE.to_string(),
                C_COL_PRODUCT_NAME.to_string(),
                C_COL_QTY_REQUIRED.to_string(),
            ],
            label_footer: C_LABEL_ARRIVAL_REQUIRED.to_string(),
            utc_offset_hours: N_UTC_OFFSET_HOURS,
        }
    }
}

/// Output worksheet geometry and palette.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetLayout {
    /// Worksheet name (sanitized before use).
    pub sheet_name: String,
    /// Widths of the three output columns.
    pub widths_col: [f64; 3],
    /// Height of header and data rows.
    pub height_row: f64,
    /// Font size of every written cell.
    pub font_size: i64,
    /// Fill of even (1-based) rows.
    pub fill_shaded: String,
    /// Fill of odd (1-based) rows.
    pub fill_plain: String,
    /// Border style code for header/data cells.
    pub border: i64,
}

impl Default for SpecSheetLayout {
    fn default() -> Self {
        Self {
            sheet_name: C_SHEET_NAME_OUTPUT.to_string(),
            widths_col: TUP_WIDTHS_OUTPUT_COLS,
            height_row: N_HEIGHT_OUTPUT_ROW,
            font_size: N_FONT_SIZE_OUTPUT,
            fill_shaded: C_FILL_SHADED.to_string(),
            fill_plain: C_FILL_PLAIN.to_string(),
            border: N_BORDER_THIN,
        }
    }
}

/// Options for one upload-to-download run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecProcessOptions {
    /// Source column names.
    pub schema: SpecInputSchema,
    /// Source sheet geometry.
    pub ingest: SpecIngestOptions,
    /// Filter rules and output strings.
    pub policy: SpecExtractPolicy,
    /// Output sheet layout.
    pub layout: SpecSheetLayout,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Records

/// One line item from the uploaded sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecInputRow {
    /// Product code as read.
    pub product_code: EnumCellValue,
    /// Product name as read.
    pub product_name: EnumCellValue,
    /// Category label as read.
    pub category: EnumCellValue,
    /// Signed adjustment quantity; `None` when blank.
    pub qty_adjust: Option<f64>,
}

/// One extracted line item.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecOutputRow {
    /// Product code copied from input.
    pub product_code: EnumCellValue,
    /// Product name copied from input.
    pub product_name: EnumCellValue,
    /// Absolute value of the adjustment quantity; always `> 0`.
    pub qty_required: f64,
}

/// Footer line placed under the data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFooter {
    /// 1-based sheet row.
    pub row_idx: usize,
    /// 1-based sheet column.
    pub col_idx: usize,
    /// Footer text, e.g. `03/15 着後必要数`.
    pub text: String,
}

/// Fully resolved output sheet content.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecOutputDocument {
    /// Header labels.
    pub header: [String; 3],
    /// Data rows in input order.
    pub rows: Vec<SpecOutputRow>,
    /// Footer line.
    pub footer: SpecFooter,
}

impl SpecOutputDocument {
    /// Header plus data row count (the styled block height).
    pub fn tot_rows(&self) -> usize {
        1 + self.rows.len()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Top-level call failures.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ChakugoError {
    /// A required source column is absent.
    #[error("Required column not found: {column:?}")]
    MissingColumn {
        /// Missing column name.
        column: String,
    },
    /// Adjustment quantity holds non-numeric text.
    #[error("Non-numeric adjustment quantity at source row {row}: {value:?}")]
    InvalidQuantity {
        /// 1-based source row.
        row: usize,
        /// Offending cell text.
        value: String,
    },
    /// The workbook has no worksheet.
    #[error("Workbook has no usable worksheet.")]
    EmptyWorkbook,
    /// Source decode failure.
    #[error("xlsx read error: {0}")]
    Read(String),
    /// Output encode failure.
    #[error("xlsx write error: {0}")]
    Write(String),
    /// UTC offset or next-day date cannot be represented.
    #[error("invalid arrival date: {0}")]
    InvalidDate(String),
    /// Row/column index does not fit the Excel coordinate type.
    #[error("index overflow: {0}")]
    IndexOverflow(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
