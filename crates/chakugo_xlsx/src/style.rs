//! Styling plan for the output sheet.
//!
//! Every decision is a pure function of the 1-based sheet position, so the
//! writer only translates the returned [`SpecCellFormat`].

use crate::conf::derive_base_cell_format;
use crate::spec::{SpecCellFormat, SpecSheetLayout};

/// 1-based column holding the required quantity.
const N_COL_QTY_REQUIRED: usize = 3;

/// Fill for a 1-based row: even rows shaded, odd rows (header included) plain.
pub fn derive_row_fill(row_idx: usize, layout: &SpecSheetLayout) -> &str {
    if row_idx % 2 == 0 {
        &layout.fill_shaded
    } else {
        &layout.fill_plain
    }
}

/// Format of a header/data cell at 1-based `(row_idx, col_idx)`.
///
/// Row 1 is the header.
pub fn derive_cell_format(
    row_idx: usize,
    col_idx: usize,
    layout: &SpecSheetLayout,
) -> SpecCellFormat {
    let fmt_block = derive_base_cell_format(layout).with_(SpecCellFormat {
        border: Some(layout.border),
        bg_color: Some(derive_row_fill(row_idx, layout).to_string()),
        ..Default::default()
    });

    if row_idx == 1 || col_idx == N_COL_QTY_REQUIRED {
        fmt_block.with_(SpecCellFormat {
            bold: Some(true),
            align: Some("center".to_string()),
            ..Default::default()
        })
    } else {
        fmt_block.with_(SpecCellFormat {
            bold: Some(false),
            align: Some("left".to_string()),
            ..Default::default()
        })
    }
}

/// Format of the footer cell: plain font, centered, no border or fill.
pub fn derive_footer_format(layout: &SpecSheetLayout) -> SpecCellFormat {
    derive_base_cell_format(layout).with_(SpecCellFormat {
        bold: Some(false),
        align: Some("center".to_string()),
        ..Default::default()
    })
}
