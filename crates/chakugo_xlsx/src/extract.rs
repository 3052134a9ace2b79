//! Row filter and output document construction.

use log::debug;

use crate::date::SpecArrivalStamp;
use crate::report::{EnumRejectReason, ReportExtractBuilder};
use crate::spec::{SpecExtractPolicy, SpecFooter, SpecInputRow, SpecOutputDocument, SpecOutputRow};

/// 1-based sheet column of the footer.
const N_COL_FOOTER: usize = 2;

/// Required quantity of a retained row, or the first predicate it fails.
pub fn derive_required_quantity(
    row: &SpecInputRow,
    policy: &SpecExtractPolicy,
) -> Result<f64, EnumRejectReason> {
    let n_qty = match row.qty_adjust {
        Some(q) if q < 0.0 => q,
        _ => return Err(EnumRejectReason::Quantity),
    };
    if !row.category.to_text().contains(&policy.marker_loose_item) {
        return Err(EnumRejectReason::Category);
    }

    let c_name = row.product_name.to_text();
    if c_name.ends_with(&policy.suffix_excluded_variant) {
        return Err(EnumRejectReason::VariantMarker);
    }
    if c_name.ends_with(&policy.suffix_excluded_vendor) {
        return Err(EnumRejectReason::VendorTag);
    }
    Ok(n_qty.abs())
}

/// First predicate `row` fails, or `None` when it is retained.
pub fn derive_reject_reason(
    row: &SpecInputRow,
    policy: &SpecExtractPolicy,
) -> Option<EnumRejectReason> {
    derive_required_quantity(row, policy).err()
}

/// Whether `row` passes all four predicates.
pub fn is_row_selected(row: &SpecInputRow, policy: &SpecExtractPolicy) -> bool {
    derive_reject_reason(row, policy).is_none()
}

/// Filter `rows` in order and compute required quantities.
pub fn extract_rows(
    rows: &[SpecInputRow],
    policy: &SpecExtractPolicy,
    report: &mut ReportExtractBuilder,
) -> Vec<SpecOutputRow> {
    let mut l_rows_out = Vec::new();
    for row in rows {
        report.add_scanned();
        let n_qty_required = match derive_required_quantity(row, policy) {
            Ok(val) => val,
            Err(reason) => {
                report.add_rejected(reason);
                continue;
            }
        };

        report.add_matched();
        l_rows_out.push(SpecOutputRow {
            product_code: row.product_code.clone(),
            product_name: row.product_name.clone(),
            qty_required: n_qty_required,
        });
    }
    l_rows_out
}

/// Build the output document for `rows`, recording counters in `report`.
pub fn transform_with_report(
    rows: &[SpecInputRow],
    stamp: &SpecArrivalStamp,
    policy: &SpecExtractPolicy,
    report: &mut ReportExtractBuilder,
) -> SpecOutputDocument {
    let l_rows_out = extract_rows(rows, policy, report);
    debug!(
        "extracted {} of {} rows for {}",
        l_rows_out.len(),
        rows.len(),
        stamp.date_next
    );

    let n_tot_rows = 1 + l_rows_out.len();
    SpecOutputDocument {
        header: policy.labels_header.clone(),
        rows: l_rows_out,
        footer: SpecFooter {
            row_idx: n_tot_rows + 2,
            col_idx: N_COL_FOOTER,
            text: stamp.footer_text(&policy.label_footer),
        },
    }
}

/// Build the output document for `rows`.
pub fn transform(
    rows: &[SpecInputRow],
    stamp: &SpecArrivalStamp,
    policy: &SpecExtractPolicy,
) -> SpecOutputDocument {
    let mut report = ReportExtractBuilder::default();
    transform_with_report(rows, stamp, policy, &mut report)
}
