//! Extraction constants and default preset factories.

use crate::spec::{
    SpecCellFormat, SpecExtractPolicy, SpecIngestOptions, SpecInputSchema, SpecProcessOptions,
    SpecSheetLayout,
};

/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Source column holding the product code.
pub const C_COL_PRODUCT_CODE: &str = "商品コード";
/// Source column holding the product name.
pub const C_COL_PRODUCT_NAME: &str = "商品名";
/// Source column holding the box / loose-item category label.
pub const C_COL_CATEGORY: &str = "箱/こもの";
/// Source column holding the signed adjustment quantity.
pub const C_COL_QTY_ADJUST: &str = "集荷便から降ろす数/小分けしないと足りない数";
/// Output column label for the required quantity.
pub const C_COL_QTY_REQUIRED: &str = "必要数";

/// Category substring marking loose (non-boxed) items.
pub const C_MARKER_LOOSE_ITEM: &str = "こもの";
/// Trailing product-name symbol for excluded variants.
pub const C_SUFFIX_EXCLUDED_VARIANT: &str = "◇";
/// Trailing product-name tag for the excluded vendor.
pub const C_SUFFIX_EXCLUDED_VENDOR: &str = "東一";

/// Fixed label appended to the footer date and file name.
pub const C_LABEL_ARRIVAL_REQUIRED: &str = "着後必要数";
/// Output workbook extension.
pub const C_EXT_XLSX: &str = ".xlsx";
/// MIME type of the delivered workbook.
pub const C_MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Fixed UTC offset (hours) used for "tomorrow".
pub const N_UTC_OFFSET_HOURS: i32 = 9;

/// 1-based source row holding the column names.
pub const N_ROW_SOURCE_HEADER: usize = 2;
/// 1-based source rows dropped before the data block.
pub const TUP_ROWS_SOURCE_SKIPPED: [usize; 2] = [3, 4];

/// Output worksheet name.
pub const C_SHEET_NAME_OUTPUT: &str = "抽出結果";
/// Output column widths in Excel character units.
pub const TUP_WIDTHS_OUTPUT_COLS: [f64; 3] = [11.25, 49.00, 10.50];
/// Header/data row height in points.
pub const N_HEIGHT_OUTPUT_ROW: f64 = 18.75;
/// Font size used by every written cell.
pub const N_FONT_SIZE_OUTPUT: i64 = 12;
/// Fill for even rows.
pub const C_FILL_SHADED: &str = "#EEEEEE";
/// Fill for odd rows.
pub const C_FILL_PLAIN: &str = "#FFFFFF";
/// Thin border style code (see `writer::derive_format_border`).
pub const N_BORDER_THIN: i64 = 1;

/// Build the default input schema.
pub fn derive_default_input_schema() -> SpecInputSchema {
    SpecInputSchema::default()
}

/// Build the default extraction policy.
pub fn derive_default_extract_policy() -> SpecExtractPolicy {
    SpecExtractPolicy::default()
}

/// Build the default output sheet layout.
pub fn derive_default_sheet_layout() -> SpecSheetLayout {
    SpecSheetLayout::default()
}

/// Build the default end-to-end options.
pub fn derive_default_process_options() -> SpecProcessOptions {
    SpecProcessOptions {
        schema: derive_default_input_schema(),
        ingest: SpecIngestOptions::default(),
        policy: derive_default_extract_policy(),
        layout: derive_default_sheet_layout(),
    }
}

/// Base cell format shared by header, data and footer cells.
pub fn derive_base_cell_format(layout: &SpecSheetLayout) -> SpecCellFormat {
    SpecCellFormat {
        font_size: Some(layout.font_size),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    }
}
