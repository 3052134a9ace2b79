use std::io::{Cursor, Read};

use calamine::{Data, Reader, Xlsx};
use chakugo_xlsx::{SpecProcessOptions, process_workbook};
use chrono::{TimeZone, Utc};
use rust_xlsxwriter::Workbook;

const C_QTY: &str = "集荷便から降ろす数/小分けしないと足りない数";

fn build_upload(rows: &[(&str, &str, &str, f64)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "出荷調整").unwrap();
    for (n_col, c_name) in ["商品コード", "商品名", "箱/こもの", C_QTY].iter().enumerate() {
        worksheet.write_string(1, n_col as u16, *c_name).unwrap();
    }
    worksheet.write_string(2, 0, "小計").unwrap();
    worksheet.write_string(3, 0, "----").unwrap();

    for (n_idx, (code, name, category, qty)) in rows.iter().enumerate() {
        let n_row = 4 + n_idx as u32;
        worksheet.write_string(n_row, 0, *code).unwrap();
        worksheet.write_string(n_row, 1, *name).unwrap();
        worksheet.write_string(n_row, 2, *category).unwrap();
        worksheet.write_number(n_row, 3, *qty).unwrap();
    }
    workbook.save_to_buffer().unwrap()
}

fn read_back(data: &[u8]) -> (Vec<String>, Vec<Vec<Data>>) {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data)).unwrap();
    let l_sheet_names = workbook.sheet_names().to_vec();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    let (n_row_end, n_col_end) = range.end().unwrap();
    let grid = (0..=n_row_end)
        .map(|n_row| {
            (0..=n_col_end)
                .map(|n_col| range.get_value((n_row, n_col)).cloned().unwrap_or(Data::Empty))
                .collect()
        })
        .collect();
    (l_sheet_names, grid)
}

fn read_sheet_xml(data: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
    let mut c_xml = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")
        .unwrap()
        .read_to_string(&mut c_xml)
        .unwrap();
    c_xml
}

fn row_tag(c_xml: &str, n_row: usize) -> &str {
    let c_open = format!(r#"<row r="{n_row}""#);
    let n_start = c_xml.find(&c_open).unwrap();
    let n_end = n_start + c_xml[n_start..].find('>').unwrap();
    &c_xml[n_start..=n_end]
}

fn text(value: &str) -> Data {
    Data::String(value.to_string())
}

#[test]
fn five_rows_two_matches_round_trip() {
    let upload = build_upload(&[
        ("P1", "りんご", "ケースこもの", -3.0),
        ("P2", "みかん◇", "こもの", -1.0),
        ("P3", "ぶどう", "箱", -2.0),
        ("P4", "なし", "こもの", 5.0),
        ("P5", "もも", "こもの", -6.0),
    ]);
    // 2024-03-14 23:00 in UTC+9.
    let now = Utc.with_ymd_and_hms(2024, 3, 14, 14, 0, 0).unwrap();

    let delivery = process_workbook(&upload, now, &SpecProcessOptions::default()).unwrap();
    assert_eq!(delivery.file_name, "0315着後必要数.xlsx");
    assert_eq!(delivery.report.cnt_scanned, 5);
    assert_eq!(delivery.report.cnt_matched, 2);

    let (l_sheet_names, grid) = read_back(&delivery.data);
    assert_eq!(l_sheet_names, vec!["抽出結果".to_string()]);
    assert_eq!(grid.len(), 5);
    assert_eq!(grid[0], vec![text("商品コード"), text("商品名"), text("必要数")]);
    assert_eq!(grid[1], vec![text("P1"), text("りんご"), Data::Float(3.0)]);
    assert_eq!(grid[2], vec![text("P5"), text("もも"), Data::Float(6.0)]);
    assert!(grid[3].iter().all(|cell| *cell == Data::Empty));
    assert_eq!(grid[4][0], Data::Empty);
    assert_eq!(grid[4][1], text("03/15 着後必要数"));
}

#[test]
fn zero_matches_yields_header_and_footer() {
    let upload = build_upload(&[("P1", "ぶどう", "箱", -2.0)]);
    let now = Utc.with_ymd_and_hms(2024, 3, 14, 14, 0, 0).unwrap();

    let delivery = process_workbook(&upload, now, &SpecProcessOptions::default()).unwrap();
    assert!(delivery.document.rows.is_empty());

    let (_, grid) = read_back(&delivery.data);
    assert_eq!(grid.len(), 3);
    assert_eq!(grid[0], vec![text("商品コード"), text("商品名"), text("必要数")]);
    assert_eq!(grid[2][1], text("03/15 着後必要数"));
}

#[test]
fn same_upload_and_now_give_identical_bytes() {
    let upload = build_upload(&[("P1", "りんご", "こもの", -3.0)]);
    let now = Utc.with_ymd_and_hms(2024, 3, 14, 14, 0, 0).unwrap();
    let options = SpecProcessOptions::default();

    let first = process_workbook(&upload, now, &options).unwrap();
    let second = process_workbook(&upload, now, &options).unwrap();
    assert_eq!(first.data, second.data);
    assert_eq!(first.document, second.document);
}

#[test]
fn sheet_geometry_is_stored_as_configured() {
    let upload = build_upload(&[
        ("P1", "りんご", "こもの", -3.0),
        ("P2", "もも", "こもの", -6.0),
    ]);
    let now = Utc.with_ymd_and_hms(2024, 3, 14, 14, 0, 0).unwrap();

    let delivery = process_workbook(&upload, now, &SpecProcessOptions::default()).unwrap();
    let c_xml = read_sheet_xml(&delivery.data);

    assert!(c_xml.contains(r#"<col min="1" max="1" width="11.25" customWidth="1"/>"#));
    assert!(c_xml.contains(r#"<col min="2" max="2" width="49" customWidth="1"/>"#));
    assert!(c_xml.contains(r#"<col min="3" max="3" width="10.5" customWidth="1"/>"#));

    // Header plus two data rows carry the fixed height; the footer row does not.
    for n_row in 1..=3 {
        assert!(row_tag(&c_xml, n_row).contains(r#"ht="18.75""#), "row {n_row}");
    }
    assert!(!c_xml.contains(r#"<row r="4""#));
    assert!(!row_tag(&c_xml, 5).contains("ht="));
}
