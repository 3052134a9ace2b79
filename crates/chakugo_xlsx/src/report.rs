//! Extraction report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Which filter predicate dropped a row (first failing one wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRejectReason {
    /// Adjustment quantity blank or not negative.
    Quantity,
    /// Category lacks the loose-item marker.
    Category,
    /// Name ends with the excluded-variant symbol.
    VariantMarker,
    /// Name ends with the excluded vendor tag.
    VendorTag,
}

/// Aggregate counters and diagnostics for one extraction run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportExtract {
    /// Input rows inspected by the filter.
    pub cnt_scanned: u64,
    /// Rows retained in the output.
    pub cnt_matched: u64,
    /// Rows dropped for a blank or non-negative quantity.
    pub cnt_rejected_qty: u64,
    /// Rows dropped for a category without the marker.
    pub cnt_rejected_category: u64,
    /// Rows dropped for the excluded-variant suffix.
    pub cnt_rejected_marker: u64,
    /// Rows dropped for the excluded vendor suffix.
    pub cnt_rejected_vendor: u64,
    /// Non-fatal warnings collected during ingestion.
    pub warnings: Vec<String>,
}

impl ReportExtract {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Total dropped rows across all reasons.
    pub fn cnt_rejected(&self) -> u64 {
        self.cnt_rejected_qty
            + self.cnt_rejected_category
            + self.cnt_rejected_marker
            + self.cnt_rejected_vendor
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_rejected_qty".to_string(), self.cnt_rejected_qty);
        dict_counts.insert(
            "cnt_rejected_category".to_string(),
            self.cnt_rejected_category,
        );
        dict_counts.insert("cnt_rejected_marker".to_string(), self.cnt_rejected_marker);
        dict_counts.insert("cnt_rejected_vendor".to_string(), self.cnt_rejected_vendor);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} matched={} rejected={} (qty={} category={} marker={} vendor={}) warnings={}",
            self.cnt_scanned,
            self.cnt_matched,
            self.cnt_rejected(),
            self.cnt_rejected_qty,
            self.cnt_rejected_category,
            self.cnt_rejected_marker,
            self.cnt_rejected_vendor,
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportExtract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[EXTRACT]"))
    }
}

/// Mutable accumulator for extraction statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportExtractBuilder {
    report: ReportExtract,
}

impl ReportExtractBuilder {
    /// Start from warnings already collected by the reader.
    pub fn with_warnings(warnings: Vec<String>) -> Self {
        Self {
            report: ReportExtract {
                warnings,
                ..Default::default()
            },
        }
    }

    /// Increment scanned count by one.
    pub fn add_scanned(&mut self) {
        self.report.cnt_scanned += 1;
    }

    /// Increment matched count by one.
    pub fn add_matched(&mut self) {
        self.report.cnt_matched += 1;
    }

    /// Count one dropped row under `reason`.
    pub fn add_rejected(&mut self, reason: EnumRejectReason) {
        match reason {
            EnumRejectReason::Quantity => self.report.cnt_rejected_qty += 1,
            EnumRejectReason::Category => self.report.cnt_rejected_category += 1,
            EnumRejectReason::VariantMarker => self.report.cnt_rejected_marker += 1,
            EnumRejectReason::VendorTag => self.report.cnt_rejected_vendor += 1,
        }
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.report.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportExtract {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_extract_to_dict_and_format() {
        let mut builder = ReportExtractBuilder::with_warnings(vec!["w".to_string()]);
        for _ in 0..5 {
            builder.add_scanned();
        }
        builder.add_matched();
        builder.add_matched();
        builder.add_rejected(EnumRejectReason::Quantity);
        builder.add_rejected(EnumRejectReason::Category);
        builder.add_rejected(EnumRejectReason::VendorTag);
        let report = builder.build();

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_scanned"], 5);
        assert_eq!(dict_counts["cnt_matched"], 2);
        assert_eq!(dict_counts["cnt_rejected_qty"], 1);
        assert_eq!(dict_counts["cnt_rejected_marker"], 0);
        assert_eq!(dict_counts["cnt_warnings"], 1);
        assert_eq!(report.cnt_rejected(), 3);

        let txt = report.format("[EXTRACT]");
        assert_eq!(
            txt,
            "[EXTRACT] scanned=5 matched=2 rejected=3 (qty=1 category=1 marker=0 vendor=1) warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }
}
