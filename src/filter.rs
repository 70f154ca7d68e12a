use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::{DefectRecord, OutlierBounds};
use crate::outlier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Date,
    Time,
    DefectName,
    Station,
    PartOfCar,
    CarModel,
    MotorType,
    DesignPackage,
    Shift,
    Category,
    Reporter,
    PartNumber,
    Severity,
    ResolutionTime,
    RootCause,
    Flagged,
    Status,
}

impl SortKey {
    pub const ALL: [SortKey; 18] = [
        SortKey::Id,
        SortKey::Date,
        SortKey::Time,
        SortKey::DefectName,
        SortKey::Station,
        SortKey::PartOfCar,
        SortKey::CarModel,
        SortKey::MotorType,
        SortKey::DesignPackage,
        SortKey::Shift,
        SortKey::Category,
        SortKey::Reporter,
        SortKey::PartNumber,
        SortKey::Severity,
        SortKey::ResolutionTime,
        SortKey::RootCause,
        SortKey::Flagged,
        SortKey::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Date => "date",
            SortKey::Time => "time",
            SortKey::DefectName => "defect",
            SortKey::Station => "station",
            SortKey::PartOfCar => "part",
            SortKey::CarModel => "model",
            SortKey::MotorType => "motor",
            SortKey::DesignPackage => "package",
            SortKey::Shift => "shift",
            SortKey::Category => "category",
            SortKey::Reporter => "reporter",
            SortKey::PartNumber => "part-number",
            SortKey::Severity => "severity",
            SortKey::ResolutionTime => "resolution",
            SortKey::RootCause => "root-cause",
            SortKey::Flagged => "flagged",
            SortKey::Status => "status",
        }
    }

    fn compare(&self, a: &DefectRecord, b: &DefectRecord) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Time => a.time.cmp(&b.time),
            SortKey::DefectName => a.defect_name.cmp(&b.defect_name),
            SortKey::Station => a.station.cmp(&b.station),
            SortKey::PartOfCar => a.part_of_car.cmp(&b.part_of_car),
            SortKey::CarModel => a.car_model.cmp(&b.car_model),
            SortKey::MotorType => a.motor_type.cmp(&b.motor_type),
            SortKey::DesignPackage => a.design_package.cmp(&b.design_package),
            SortKey::Shift => a
                .production_shift
                .as_str()
                .cmp(b.production_shift.as_str()),
            SortKey::Category => a.defect_category.as_str().cmp(b.defect_category.as_str()),
            SortKey::Reporter => a.reporter.cmp(&b.reporter),
            SortKey::PartNumber => a.part_number.cmp(&b.part_number),
            SortKey::Severity => a.severity_rating.cmp(&b.severity_rating),
            SortKey::ResolutionTime => a
                .resolution_time
                .partial_cmp(&b.resolution_time)
                .unwrap_or(Ordering::Equal),
            SortKey::RootCause => a.root_cause_identified.cmp(&b.root_cause_identified),
            SortKey::Flagged => a.flagged.cmp(&b.flagged),
            SortKey::Status => a.status.cmp(&b.status),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .iter()
            .find(|key| key.as_str() == value.to_lowercase())
            .copied()
            .ok_or_else(|| format!("unknown sort key '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SortState {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortState {
    // Selecting the active key flips direction; a new key resets to ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == Some(key) {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.key = Some(key);
            self.direction = SortDirection::Ascending;
        }
    }
}

pub fn matches_search(record: &DefectRecord, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn filter_sort(
    records: &[DefectRecord],
    search: &str,
    outliers_only: bool,
    bounds: &OutlierBounds,
    sort: &SortState,
) -> Vec<DefectRecord> {
    let mut rows: Vec<DefectRecord> = records
        .iter()
        .filter(|record| matches_search(record, search))
        .filter(|record| !outliers_only || outlier::is_outlier(record, bounds))
        .cloned()
        .collect();

    if let Some(key) = sort.key {
        rows.sort_by(|a, b| {
            let ordering = key.compare(a, b);
            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;
    use crate::outlier::compute_bounds;

    #[test]
    fn search_matches_reporter_substring_case_insensitively() {
        let mut records = dataset::generate(30, 53);
        for (position, record) in records.iter_mut().enumerate() {
            record.reporter = if position % 3 == 0 {
                "Priya Sharma".to_string()
            } else {
                "Marcus Webb".to_string()
            };
            record.note = String::new();
        }
        let bounds = compute_bounds(&records, 2.0);
        let rows = filter_sort(&records, "sHaRm", false, &bounds, &SortState::default());
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.reporter == "Priya Sharma"));
        assert_eq!(rows.len(), records.iter().filter(|r| r.reporter == "Priya Sharma").count());
    }

    #[test]
    fn search_spans_every_field() {
        let mut records = dataset::generate(10, 53);
        records[4].note = "waiting on supplier batch".to_string();
        let bounds = compute_bounds(&records, 2.0);
        let rows = filter_sort(&records, "supplier batch", false, &bounds, &SortState::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 5);
    }

    #[test]
    fn outlier_filter_is_anded_with_search() {
        let records = dataset::generate(150, 59);
        let bounds = compute_bounds(&records, 1.0);
        let rows = filter_sort(&records, "", true, &bounds, &SortState::default());
        assert!(rows.iter().all(|r| outlier::is_outlier(r, &bounds)));
        let all = filter_sort(&records, "", false, &bounds, &SortState::default());
        assert_eq!(all.len(), records.len());
    }

    #[test]
    fn sorting_orders_by_the_selected_key() {
        let records = dataset::generate(80, 61);
        let bounds = compute_bounds(&records, 2.0);

        let ascending = filter_sort(
            &records,
            "",
            false,
            &bounds,
            &SortState {
                key: Some(SortKey::Severity),
                direction: SortDirection::Ascending,
            },
        );
        for window in ascending.windows(2) {
            assert!(window[0].severity_rating <= window[1].severity_rating);
        }

        let descending = filter_sort(
            &records,
            "",
            false,
            &bounds,
            &SortState {
                key: Some(SortKey::ResolutionTime),
                direction: SortDirection::Descending,
            },
        );
        for window in descending.windows(2) {
            assert!(window[0].resolution_time >= window[1].resolution_time);
        }
    }

    #[test]
    fn toggle_flips_same_key_and_resets_new_key() {
        let mut state = SortState::default();
        state.toggle(SortKey::Severity);
        assert_eq!(state.key, Some(SortKey::Severity));
        assert_eq!(state.direction, SortDirection::Ascending);

        state.toggle(SortKey::Severity);
        assert_eq!(state.direction, SortDirection::Descending);

        state.toggle(SortKey::Date);
        assert_eq!(state.key, Some(SortKey::Date));
        assert_eq!(state.direction, SortDirection::Ascending);
    }

    #[test]
    fn no_sort_key_preserves_store_order() {
        let records = dataset::generate(25, 67);
        let bounds = compute_bounds(&records, 2.0);
        let rows = filter_sort(&records, "", false, &bounds, &SortState::default());
        let ids: Vec<u32> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=25).collect::<Vec<u32>>());
    }
}
