use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Filter criteria for the survival-rate statistic. `None` fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalFilter {
    /// `true` keeps passengers under 18, `false` keeps 18 and over.
    pub is_child: Option<bool>,
    pub is_male: Option<bool>,
    /// Passenger class 1, 2 or 3.
    pub passenger_class: Option<u8>,
    /// Inclusive age range; records without a numeric age never match.
    pub age_range: Option<(f64, f64)>,
}

fn class_label(class: u8) -> Option<&'static str> {
    match class {
        1 => Some("1st"),
        2 => Some("2nd"),
        3 => Some("3rd"),
        _ => None,
    }
}

fn age_of(record: &Record) -> Option<f64> {
    record.get("age").and_then(|v| v.trim().parse::<f64>().ok())
}

fn matches(record: &Record, filter: &SurvivalFilter) -> bool {
    if let Some(is_child) = filter.is_child {
        match age_of(record) {
            Some(age) => {
                if is_child != (age < 18.0) {
                    return false;
                }
            }
            None => return false,
        }
    }
    if let Some(is_male) = filter.is_male {
        let wanted = if is_male { "male" } else { "female" };
        if record.get("gender") != Some(wanted) {
            return false;
        }
    }
    if let Some(class) = filter.passenger_class {
        if record.get("class") != class_label(class) {
            return false;
        }
    }
    if let Some((min_age, max_age)) = filter.age_range {
        match age_of(record) {
            Some(age) => {
                if age < min_age || age > max_age {
                    return false;
                }
            }
            None => return false,
        }
    }
    true
}

/// Fraction of matching passengers with `survived == "yes"`, over matching
/// passengers whose survived field is a valid "yes"/"no". `None` when no
/// record matches.
pub fn survival_probability(records: &[Record], filter: &SurvivalFilter) -> Option<f64> {
    let mut total = 0u64;
    let mut survivors = 0u64;
    for record in records.iter().filter(|r| matches(r, filter)) {
        match record.get("survived") {
            Some("yes") => {
                total += 1;
                survivors += 1;
            }
            Some("no") => total += 1,
            _ => {}
        }
    }
    if total == 0 {
        return None;
    }
    Some(survivors as f64 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passenger(gender: &str, class: &str, age: &str, survived: &str) -> Record {
        Record::from_iter([
            ("gender", gender),
            ("class", class),
            ("age", age),
            ("survived", survived),
        ])
    }

    fn sample() -> Vec<Record> {
        vec![
            passenger("female", "1st", "29", "yes"),
            passenger("male", "1st", "40", "no"),
            passenger("male", "3rd", "8", "yes"),
            passenger("female", "3rd", "15", "no"),
            passenger("male", "2nd", "", "no"),
        ]
    }

    #[test]
    fn unfiltered_rate_covers_all_valid_records() {
        let p = survival_probability(&sample(), &SurvivalFilter::default()).unwrap();
        assert!((p - 2.0 / 5.0).abs() < 1e-12);
    }

    #[test]
    fn child_filter_requires_numeric_age() {
        let filter = SurvivalFilter {
            is_child: Some(true),
            ..SurvivalFilter::default()
        };
        // Two children, one survivor; the record without an age is excluded.
        let p = survival_probability(&sample(), &filter).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn class_and_gender_filters_combine() {
        let filter = SurvivalFilter {
            is_male: Some(false),
            passenger_class: Some(1),
            ..SurvivalFilter::default()
        };
        assert_eq!(survival_probability(&sample(), &filter), Some(1.0));
    }

    #[test]
    fn no_matching_records_is_none() {
        let filter = SurvivalFilter {
            age_range: Some((80.0, 90.0)),
            ..SurvivalFilter::default()
        };
        assert_eq!(survival_probability(&sample(), &filter), None);
    }

    #[test]
    fn invalid_survived_values_do_not_count() {
        let records = vec![passenger("male", "1st", "30", "unknown")];
        assert_eq!(
            survival_probability(&records, &SurvivalFilter::default()),
            None
        );
    }
}
