//! `chakugo_xlsx` v1:
//! Rust-side kernel for the arrival-requirement (着後必要数) sheet.
//!
//! Module layout:
//! - `conf`     : constants and default presets
//! - `spec`     : records/options/errors
//! - `util`     : pure helper functions
//! - `reader`   : xlsx / DataFrame ingestion
//! - `extract`  : row filter and document construction
//! - `style`    : pure per-cell styling plan
//! - `date`     : "tomorrow" stamp derivation
//! - `writer`   : workbook serialization
//! - `report`   : run counters
//! - `delivery` : upload-to-download pipeline
pub mod conf;
pub mod date;
pub mod delivery;
pub mod extract;
pub mod reader;
pub mod report;
pub mod spec;
pub mod style;
pub mod util;
pub mod writer;

pub use conf::{C_LABEL_ARRIVAL_REQUIRED, C_MIME_XLSX, N_UTC_OFFSET_HOURS};
pub use date::{SpecArrivalStamp, derive_file_name};
pub use delivery::{SpecDeliveryFile, process_dataframe, process_ipc_bytes, process_workbook};
pub use extract::{
    derive_required_quantity, extract_rows, is_row_selected, transform, transform_with_report,
};
pub use reader::{
    SpecInputTable, read_input_rows_from_dataframe, read_input_rows_from_ipc_bytes,
    read_input_rows_from_xlsx_bytes,
};
pub use report::{EnumRejectReason, ReportExtract, ReportExtractBuilder};
pub use spec::{
    ChakugoError, EnumCellValue, SpecCellFormat, SpecExtractPolicy, SpecFooter,
    SpecIngestOptions, SpecInputRow, SpecInputSchema, SpecOutputDocument, SpecOutputRow,
    SpecProcessOptions, SpecSheetLayout,
};
pub use style::{derive_cell_format, derive_footer_format};
pub use writer::write_output_document;
