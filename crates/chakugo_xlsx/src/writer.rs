//! XLSX writer kernel that serializes an output document into workbook bytes.

use std::io::{Cursor, Read, Write};

use chrono::{DateTime, Datelike, Timelike, Utc};
use log::debug;
use rust_xlsxwriter::{
    DocProperties, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError,
};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::spec::{ChakugoError, EnumCellValue, SpecCellFormat, SpecOutputDocument, SpecSheetLayout};
use crate::style::{derive_cell_format, derive_footer_format};
use crate::util::sanitize_sheet_name;

const C_PATH_SHEET_XML: &str = "xl/worksheets/sheet1.xml";

/// Serialize `doc` into an in-memory `.xlsx` file.
///
/// `now` is stored as the document creation time, so equal inputs produce
/// equal bytes.
pub fn write_output_document(
    doc: &SpecOutputDocument,
    layout: &SpecSheetLayout,
    now: DateTime<Utc>,
) -> Result<Vec<u8>, ChakugoError> {
    let mut workbook = Workbook::new();
    let dt_created = derive_excel_datetime(now)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&dt_created));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sanitize_sheet_name(&layout.sheet_name, "_"))
        .map_err(derive_xlsx_error)?;

    write_block(worksheet, doc, layout)?;
    write_footer(worksheet, doc, layout)?;

    for (n_idx_col, n_width) in layout.widths_col.iter().enumerate() {
        worksheet
            .set_column_width(cast_col_num(n_idx_col)?, *n_width)
            .map_err(derive_xlsx_error)?;
    }

    let data = workbook.save_to_buffer().map_err(derive_xlsx_error)?;
    let data = store_native_column_widths(data, &layout.widths_col)?;
    debug!(
        "wrote workbook: {} data rows, footer at row {}, {} bytes",
        doc.rows.len(),
        doc.footer.row_idx,
        data.len()
    );
    Ok(data)
}

/// Header and data rows: bordered, filled, fixed height.
fn write_block(
    worksheet: &mut Worksheet,
    doc: &SpecOutputDocument,
    layout: &SpecSheetLayout,
) -> Result<(), ChakugoError> {
    for (n_idx_col, c_label) in doc.header.iter().enumerate() {
        let format = derive_rust_xlsx_format(&derive_cell_format(1, n_idx_col + 1, layout));
        write_cell_with_format(
            worksheet,
            0,
            n_idx_col,
            &EnumCellValue::String(c_label.clone()),
            &format,
        )?;
    }

    for (n_idx_row, row) in doc.rows.iter().enumerate() {
        let n_row = n_idx_row + 1;
        let l_values = [
            row.product_code.clone(),
            row.product_name.clone(),
            EnumCellValue::Number(row.qty_required),
        ];
        for (n_idx_col, value) in l_values.iter().enumerate() {
            let format =
                derive_rust_xlsx_format(&derive_cell_format(n_row + 1, n_idx_col + 1, layout));
            write_cell_with_format(worksheet, n_row, n_idx_col, value, &format)?;
        }
    }

    for n_row in 0..doc.tot_rows() {
        worksheet
            .set_row_height(cast_row_num(n_row)?, layout.height_row)
            .map_err(derive_xlsx_error)?;
    }
    Ok(())
}

fn write_footer(
    worksheet: &mut Worksheet,
    doc: &SpecOutputDocument,
    layout: &SpecSheetLayout,
) -> Result<(), ChakugoError> {
    let n_row = doc.footer.row_idx.checked_sub(1).ok_or_else(|| {
        ChakugoError::IndexOverflow(format!("footer row {}", doc.footer.row_idx))
    })?;
    let n_col = doc.footer.col_idx.checked_sub(1).ok_or_else(|| {
        ChakugoError::IndexOverflow(format!("footer column {}", doc.footer.col_idx))
    })?;

    let format = derive_rust_xlsx_format(&derive_footer_format(layout));
    write_cell_with_format(
        worksheet,
        n_row,
        n_col,
        &EnumCellValue::String(doc.footer.text.clone()),
        &format,
    )
}

/// Rewrite the `<cols>` block so the stored widths equal `widths_col`.
///
/// `set_column_width` adds cell padding to the stored value (11.25 becomes
/// 12), so the saved sheet part is patched and the archive repacked.
fn store_native_column_widths(
    data: Vec<u8>,
    widths_col: &[f64],
) -> Result<Vec<u8>, ChakugoError> {
    if widths_col.is_empty() {
        return Ok(data);
    }

    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(derive_zip_error)?;
    let mut writer_zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o600)
        .last_modified_time(zip::DateTime::default());

    for n_idx in 0..archive.len() {
        if archive.name_for_index(n_idx) != Some(C_PATH_SHEET_XML) {
            let file = archive.by_index_raw(n_idx).map_err(derive_zip_error)?;
            writer_zip.raw_copy_file(file).map_err(derive_zip_error)?;
            continue;
        }

        let mut c_xml = String::new();
        archive
            .by_index(n_idx)
            .map_err(derive_zip_error)?
            .read_to_string(&mut c_xml)
            .map_err(|err| ChakugoError::Write(err.to_string()))?;
        let c_xml = replace_cols_block(&c_xml, widths_col)?;

        writer_zip.start_file(C_PATH_SHEET_XML, options)
            .map_err(derive_zip_error)?;
        writer_zip.write_all(c_xml.as_bytes())
            .map_err(|err| ChakugoError::Write(err.to_string()))?;
    }

    Ok(writer_zip.finish().map_err(derive_zip_error)?.into_inner())
}

fn replace_cols_block(c_xml: &str, widths_col: &[f64]) -> Result<String, ChakugoError> {
    const C_TAG_END: &str = "</cols>";
    let (Some(n_start), Some(n_end)) = (c_xml.find("<cols>"), c_xml.find(C_TAG_END)) else {
        return Err(ChakugoError::Write(
            "worksheet part has no <cols> block".to_string(),
        ));
    };

    let c_cols: String = widths_col
        .iter()
        .enumerate()
        .map(|(n_idx, n_width)| {
            let n_col = n_idx + 1;
            format!(r#"<col min="{n_col}" max="{n_col}" width="{n_width}" customWidth="1"/>"#)
        })
        .collect();
    Ok(format!(
        "{}<cols>{c_cols}</cols>{}",
        &c_xml[..n_start],
        &c_xml[n_end + C_TAG_END.len()..]
    ))
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), ChakugoError> {
    match value {
        EnumCellValue::None => {
            worksheet
                .write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::Number(val) if !val.is_finite() => {
            worksheet
                .write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    val,
                    format,
                )
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    *val,
                    format,
                )
                .map_err(derive_xlsx_error)?;
        }
    }
    Ok(())
}

/// Translate a [`SpecCellFormat`] into a `rust_xlsxwriter` format.
pub fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn derive_excel_datetime(now: DateTime<Utc>) -> Result<ExcelDateTime, ChakugoError> {
    let n_year = u16::try_from(now.year())
        .map_err(|_| ChakugoError::InvalidDate(format!("year {} out of range", now.year())))?;
    ExcelDateTime::from_ymd(n_year, now.month() as u8, now.day() as u8)
        .and_then(|dt| dt.and_hms(now.hour() as u16, now.minute() as u8, now.second()))
        .map_err(derive_xlsx_error)
}

fn cast_row_num(value: usize) -> Result<u32, ChakugoError> {
    u32::try_from(value).map_err(|_| ChakugoError::IndexOverflow(format!("row {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, ChakugoError> {
    u16::try_from(value).map_err(|_| ChakugoError::IndexOverflow(format!("column {value}")))
}

fn derive_xlsx_error(err: XlsxError) -> ChakugoError {
    ChakugoError::Write(err.to_string())
}

fn derive_zip_error(err: ZipError) -> ChakugoError {
    ChakugoError::Write(err.to_string())
}
