//! Upload-to-download orchestration.

use chrono::{DateTime, Utc};
use log::{info, warn};
use polars::prelude::DataFrame;

use crate::conf::C_MIME_XLSX;
use crate::date::SpecArrivalStamp;
use crate::extract::transform_with_report;
use crate::reader::{
    SpecInputTable, read_input_rows_from_dataframe, read_input_rows_from_ipc_bytes,
    read_input_rows_from_xlsx_bytes,
};
use crate::report::{ReportExtract, ReportExtractBuilder};
use crate::spec::{ChakugoError, SpecOutputDocument, SpecProcessOptions};
use crate::writer::write_output_document;

/// Workbook ready to be offered as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDeliveryFile {
    /// Suggested file name, e.g. `0315着後必要数.xlsx`.
    pub file_name: String,
    /// MIME type of `data`.
    pub mime: String,
    /// Serialized workbook.
    pub data: Vec<u8>,
    /// Sheet content that was serialized.
    pub document: SpecOutputDocument,
    /// Run counters.
    pub report: ReportExtract,
}

/// Process an uploaded `.xlsx` file.
///
/// `now` is read once by the caller; the footer date, the file name and the
/// workbook metadata all derive from it.
pub fn process_workbook(
    data: &[u8],
    now: DateTime<Utc>,
    options: &SpecProcessOptions,
) -> Result<SpecDeliveryFile, ChakugoError> {
    let table = read_input_rows_from_xlsx_bytes(data, &options.schema, &options.ingest)?;
    deliver_table(table, now, options)
}

/// Process a frame that already carries the source column names.
pub fn process_dataframe(
    df: &DataFrame,
    now: DateTime<Utc>,
    options: &SpecProcessOptions,
) -> Result<SpecDeliveryFile, ChakugoError> {
    let table = read_input_rows_from_dataframe(df, &options.schema)?;
    deliver_table(table, now, options)
}

/// Process IPC-serialized dataframe bytes.
pub fn process_ipc_bytes(
    v_ipc_df: &[u8],
    now: DateTime<Utc>,
    options: &SpecProcessOptions,
) -> Result<SpecDeliveryFile, ChakugoError> {
    let table = read_input_rows_from_ipc_bytes(v_ipc_df, &options.schema)?;
    deliver_table(table, now, options)
}

fn deliver_table(
    table: SpecInputTable,
    now: DateTime<Utc>,
    options: &SpecProcessOptions,
) -> Result<SpecDeliveryFile, ChakugoError> {
    let stamp = SpecArrivalStamp::from_now(now, options.policy.utc_offset_hours)?;

    let mut builder = ReportExtractBuilder::with_warnings(table.warnings);
    let document = transform_with_report(&table.rows, &stamp, &options.policy, &mut builder);
    if document.rows.is_empty() {
        let c_warning = "no rows matched; delivering header-only sheet".to_string();
        warn!("{c_warning}");
        builder.add_warning(c_warning);
    }
    let data = write_output_document(&document, &options.layout, now)?;

    let report = builder.build();
    info!("{report}");

    Ok(SpecDeliveryFile {
        file_name: stamp.file_name(&options.policy.label_footer),
        mime: C_MIME_XLSX.to_string(),
        data,
        document,
        report,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use polars::prelude::df;

    use super::*;

    #[test]
    fn test_process_dataframe_names_file_from_same_now() {
        let df = df!(
            "商品コード" => &["A1", "A2", "A3"],
            "商品名" => &["りんご", "みかん東一", "なし"],
            "箱/こもの" => &["こもの", "こもの", "箱"],
            "集荷便から降ろす数/小分けしないと足りない数" => &[-4.0, -1.0, -2.0]
        )
        .unwrap();
        // 2024-03-14 23:00 in UTC+9.
        let now = Utc.with_ymd_and_hms(2024, 3, 14, 14, 0, 0).unwrap();

        let delivery = process_dataframe(&df, now, &SpecProcessOptions::default()).unwrap();
        assert_eq!(delivery.file_name, "0315着後必要数.xlsx");
        assert_eq!(
            delivery.mime,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(delivery.document.footer.text, "03/15 着後必要数");
        assert_eq!(delivery.document.rows.len(), 1);
        assert_eq!(delivery.report.cnt_rejected_vendor, 1);
        assert_eq!(delivery.report.cnt_rejected_category, 1);
    }

    #[test]
    fn test_process_workbook_schema_error_produces_nothing() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        workbook.add_worksheet().write_string(1, 0, "商品名").unwrap();
        let data = workbook.save_to_buffer().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 14, 14, 0, 0).unwrap();

        let err = process_workbook(&data, now, &SpecProcessOptions::default()).unwrap_err();
        assert!(matches!(err, ChakugoError::MissingColumn { .. }));
    }

    #[test]
    fn test_zero_matches_adds_report_warning() {
        let df = df!(
            "商品コード" => &["A1"],
            "商品名" => &["なし"],
            "箱/こもの" => &["箱"],
            "集荷便から降ろす数/小分けしないと足りない数" => &[-2.0]
        )
        .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 14, 14, 0, 0).unwrap();

        let delivery = process_dataframe(&df, now, &SpecProcessOptions::default()).unwrap();
        assert!(delivery.document.rows.is_empty());
        assert_eq!(delivery.report.warning_count(), 1);
        assert!(!delivery.data.is_empty());
    }
}
