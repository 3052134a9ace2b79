//! Stateless helper utilities shared by the reader and writer.

use std::collections::BTreeMap;

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{ChakugoError, EnumCellValue, SpecInputSchema};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Normalize an adjustment-quantity cell to a number.
///
/// Blank and NaN cells yield `None`; numeric text is parsed; any other text
/// is an error carrying the 1-based source row.
pub fn convert_cell_value_to_quantity(
    value: &EnumCellValue,
    row_source: usize,
) -> Result<Option<f64>, ChakugoError> {
    match value {
        EnumCellValue::None => Ok(None),
        EnumCellValue::Number(n) if n.is_nan() => Ok(None),
        EnumCellValue::Number(n) => Ok(Some(*n)),
        EnumCellValue::String(s) => {
            let c_trimmed = s.trim();
            if c_trimmed.is_empty() {
                return Ok(None);
            }
            match c_trimmed.parse::<f64>() {
                Ok(v) if v.is_nan() => Ok(None),
                Ok(v) => Ok(Some(v)),
                Err(_) => Err(ChakugoError::InvalidQuantity {
                    row: row_source,
                    value: s.clone(),
                }),
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HeaderResolution

/// Describe duplicated header names, one message per name.
pub fn derive_duplicate_column_warnings(columns: &[String]) -> Vec<String> {
    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        if c_name.is_empty() {
            continue;
        }
        dict_pos.entry(c_name).or_default().push(n_idx);
    }

    dict_pos
        .iter()
        .filter(|(_, l_pos)| l_pos.len() > 1)
        .map(|(c_name, l_pos)| {
            format!(
                "Duplicate column name {c_name:?} x{} at indices {:?}; using the first.",
                l_pos.len(),
                l_pos
            )
        })
        .collect()
}

/// Resolve the four schema columns to zero-based header positions.
///
/// Returned order: code, name, category, adjustment quantity. The first
/// occurrence wins when a name repeats.
pub fn select_schema_indices(
    columns: &[String],
    schema: &SpecInputSchema,
) -> Result<[usize; 4], ChakugoError> {
    let mut l_idx = [0usize; 4];
    for (n_slot, c_required) in schema.columns().iter().enumerate() {
        let Some(n_idx) = columns.iter().position(|c_name| c_name == c_required) else {
            return Err(ChakugoError::MissingColumn {
                column: c_required.to_string(),
            });
        };
        l_idx[n_slot] = n_idx;
    }
    Ok(l_idx)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
