//! Technology label classification.
//!
//! Labels form an open vocabulary ("4G", "4G/5G", "2G/3G/4G", ...). A label
//! counts toward a generation when it contains that generation's tag. The
//! `Unknown` sentinel yields no generation flags at all, so it is excluded
//! from 4G/5G sums instead of counting as zero.

use crate::record::UNKNOWN_LABEL;

const TAG_4G: &str = "4G";
const TAG_5G: &str = "5G";

/// Generation flags derived from one technology label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TechnologyClass {
    pub is_4g: bool,
    pub is_5g: bool,
    pub is_unknown: bool,
}

impl TechnologyClass {
    /// 4G flag, or `None` when the label is unknown.
    pub fn has_4g(&self) -> Option<bool> {
        (!self.is_unknown).then_some(self.is_4g)
    }

    /// 5G flag, or `None` when the label is unknown.
    pub fn has_5g(&self) -> Option<bool> {
        (!self.is_unknown).then_some(self.is_5g)
    }
}

pub fn classify(label: &str) -> TechnologyClass {
    if label == UNKNOWN_LABEL {
        return TechnologyClass {
            is_4g: false,
            is_5g: false,
            is_unknown: true,
        };
    }

    TechnologyClass {
        is_4g: label.contains(TAG_4G),
        is_5g: label.contains(TAG_5G),
        is_unknown: false,
    }
}
