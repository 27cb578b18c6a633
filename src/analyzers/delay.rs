use std::collections::BTreeMap;
use tracing::debug;

use crate::analyzers::types::DistrictDelay;
use crate::analyzers::utility::mean;
use crate::record::{AntennaRecord, District};

/// Days between base service and 5G activation for one record.
///
/// `None` when either date is missing. Negative values (5G dated before the
/// base service) are passed through unchanged.
pub fn rollout_delay_days(record: &AntennaRecord) -> Option<i64> {
    let start = record.service_start?;
    let start_5g = record.service_start_5g?;
    Some((start_5g - start).num_days())
}

/// Computes the mean 5G rollout delay per district, sorted ascending by delay.
///
/// Districts with no record carrying both dates are omitted.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn district_delay(records: &[AntennaRecord]) -> Vec<DistrictDelay> {
    let mut delays: BTreeMap<&District, Vec<f64>> = BTreeMap::new();

    for record in records {
        let Some(district) = &record.district else {
            continue;
        };
        if let Some(days) = rollout_delay_days(record) {
            delays.entry(district).or_default().push(days as f64);
        }
    }

    let mut rows: Vec<DistrictDelay> = delays
        .into_iter()
        .map(|(district, series)| DistrictDelay {
            district: district.clone(),
            mean_delay_days: mean(&series),
            observations: series.len(),
        })
        .collect();

    rows.sort_by(|a, b| a.mean_delay_days.total_cmp(&b.mean_delay_days));

    debug!(districts = rows.len(), "District delays computed");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(district: i64, start: Option<&str>, start_5g: Option<&str>) -> AntennaRecord {
        let date = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        AntennaRecord {
            operator: "A".to_string(),
            district: Some(District::from(district)),
            technology_label: "4G/5G".to_string(),
            service_start: start.map(date),
            service_start_5g: start_5g.map(date),
            longitude: None,
            latitude: None,
        }
    }

    #[test]
    fn test_only_complete_records_contribute() {
        let records = vec![
            record(1, Some("2020-01-01"), Some("2021-01-01")),
            record(1, Some("2020-06-01"), None),
        ];
        let rows = district_delay(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].district, District::from(1));
        assert_eq!(rows[0].mean_delay_days, 366.0);
        assert_eq!(rows[0].observations, 1);
    }

    #[test]
    fn test_district_without_observations_is_absent() {
        let records = vec![
            record(1, Some("2020-01-01"), Some("2020-01-11")),
            record(2, None, Some("2021-01-01")),
        ];
        let rows = district_delay(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].district, District::from(1));
    }

    #[test]
    fn test_mean_is_not_truncated_and_sorted() {
        let records = vec![
            record(1, Some("2020-01-01"), Some("2020-01-11")),
            record(1, Some("2020-01-01"), Some("2020-01-12")),
            record(2, Some("2020-01-01"), Some("2020-01-03")),
        ];
        let rows = district_delay(&records);
        assert_eq!(rows[0].district, District::from(2));
        assert_eq!(rows[0].mean_delay_days, 2.0);
        assert_eq!(rows[1].mean_delay_days, 10.5);
    }

    #[test]
    fn test_negative_delay_passes_through() {
        let records = vec![record(3, Some("2021-01-11"), Some("2021-01-01"))];
        let rows = district_delay(&records);
        assert_eq!(rows[0].mean_delay_days, -10.0);
    }

    #[test]
    fn test_null_district_is_skipped() {
        let mut r = record(1, Some("2020-01-01"), Some("2020-02-01"));
        r.district = None;
        assert!(district_delay(&[r]).is_empty());
    }
}
