use super::date_threshold_days;
use crate::aoi::AoiKind;
use crate::dates::DateRange;

/// Cuts a date range into consecutive windows of at most `threshold_days`.
pub struct TemporalTiler {
    threshold_days: i64,
}

impl TemporalTiler {
    pub fn for_kind(kind: AoiKind) -> Self {
        Self {
            threshold_days: date_threshold_days(kind),
        }
    }

    pub fn with_threshold(threshold_days: i64) -> Self {
        Self {
            threshold_days: threshold_days.max(1),
        }
    }

    pub fn threshold_days(&self) -> i64 {
        self.threshold_days
    }

    /// Slices are contiguous and disjoint, all `threshold_days` long except
    /// possibly the last, and together cover exactly `range`.
    pub fn tile(&self, range: &DateRange) -> Vec<DateRange> {
        let total = range.days();
        if total <= self.threshold_days {
            return vec![*range];
        }

        let slice_len = self.threshold_days.min(total);
        let mut slices = Vec::with_capacity(((total + slice_len - 1) / slice_len) as usize);
        let mut offset = 0;
        while offset < total {
            slices.push(range.window(offset, slice_len));
            offset += slice_len;
        }
        slices
    }
}
