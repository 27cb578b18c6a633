use std::collections::HashMap;
use tracing::debug;

use crate::analyzers::types::{DistrictLeader, OperatorDistrictCount};
use crate::record::District;

/// Picks the operator with the highest antenna count in each district.
///
/// Rows for a district need not be contiguous. On equal counts the row that
/// comes first in `counts` wins. Output is in order of each district's first
/// appearance.
#[tracing::instrument(skip(counts), fields(rows = counts.len()))]
pub fn district_leaders(counts: &[OperatorDistrictCount]) -> Vec<DistrictLeader> {
    let mut leaders: Vec<DistrictLeader> = Vec::new();
    let mut slots: HashMap<&District, usize> = HashMap::new();

    for row in counts {
        match slots.get(&row.district) {
            Some(&slot) => {
                let leader: &mut DistrictLeader = &mut leaders[slot];
                // strict: an equal count never displaces the earlier row
                if row.antenna_count > leader.antenna_count {
                    leader.operator = row.operator.clone();
                    leader.antenna_count = row.antenna_count;
                }
            }
            None => {
                slots.insert(&row.district, leaders.len());
                leaders.push(DistrictLeader {
                    district: row.district.clone(),
                    operator: row.operator.clone(),
                    antenna_count: row.antenna_count,
                });
            }
        }
    }

    debug!(districts = leaders.len(), "District leaders resolved");
    leaders
}
