use crate::record::Record;
use serde::{Deserialize, Serialize};

/// What to do with a record whose age value is missing or unparsable when the
/// age attribute is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownAgePolicy {
    /// Bucket into the adult category. Matches the reference behavior, where a
    /// non-numeric age fails the `< threshold` comparison.
    #[default]
    Adult,
    /// Bucket into a dedicated unknown category.
    Unknown,
    /// Drop the record from aggregation entirely.
    Exclude,
}

/// Categorization rules: identity mapping for every attribute except age,
/// which is bucketed by a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPolicy {
    /// Attribute name the threshold rule applies to.
    pub age_attribute: String,
    /// Ages strictly below this are children.
    pub age_threshold: f64,
    pub child_label: String,
    pub adult_label: String,
    pub unknown_label: String,
    pub unknown_age: UnknownAgePolicy,
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        Self {
            age_attribute: "age".to_string(),
            age_threshold: 18.0,
            child_label: "child".to_string(),
            adult_label: "adult".to_string(),
            unknown_label: "unknown".to_string(),
            unknown_age: UnknownAgePolicy::default(),
        }
    }
}

/// Maps a record to its category label for one attribute.
///
/// The raw value is its own label (a missing or empty value is a degenerate
/// category of its own); the age attribute is bucketed into child/adult.
/// Returns `None` only when the unknown-age policy excludes the record.
pub fn categorize(record: &Record, attribute: &str, policy: &CategoryPolicy) -> Option<String> {
    if attribute != policy.age_attribute {
        return Some(record.get(attribute).unwrap_or_default().to_string());
    }

    match record.get(attribute).and_then(|v| v.trim().parse::<f64>().ok()) {
        Some(age) if age < policy.age_threshold => Some(policy.child_label.clone()),
        Some(_) => Some(policy.adult_label.clone()),
        None => match policy.unknown_age {
            UnknownAgePolicy::Adult => Some(policy.adult_label.clone()),
            UnknownAgePolicy::Unknown => Some(policy.unknown_label.clone()),
            UnknownAgePolicy::Exclude => None,
        },
    }
}

/// The fixed category set for attributes whose labels are enumerated up front
/// rather than discovered from the data (the age buckets). `None` for
/// attributes whose categories come from the records.
pub fn fixed_categories(attribute: &str, policy: &CategoryPolicy) -> Option<Vec<String>> {
    if attribute != policy.age_attribute {
        return None;
    }
    let mut labels = vec![policy.child_label.clone(), policy.adult_label.clone()];
    if policy.unknown_age == UnknownAgePolicy::Unknown {
        labels.push(policy.unknown_label.clone());
    }
    Some(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(attribute: &str, value: &str) -> Record {
        Record::from_iter([(attribute, value)])
    }

    #[test]
    fn age_below_threshold_is_child() {
        let policy = CategoryPolicy::default();
        assert_eq!(
            categorize(&record("age", "10"), "age", &policy).as_deref(),
            Some("child")
        );
    }

    #[test]
    fn age_at_or_above_threshold_is_adult() {
        let policy = CategoryPolicy::default();
        assert_eq!(
            categorize(&record("age", "40"), "age", &policy).as_deref(),
            Some("adult")
        );
        assert_eq!(
            categorize(&record("age", "18"), "age", &policy).as_deref(),
            Some("adult")
        );
    }

    #[test]
    fn non_age_values_pass_through_as_their_own_label() {
        let policy = CategoryPolicy::default();
        assert_eq!(
            categorize(&record("class", "1st"), "class", &policy).as_deref(),
            Some("1st")
        );
        // Missing value is a degenerate category, not a failure.
        assert_eq!(
            categorize(&record("class", "1st"), "embarked", &policy).as_deref(),
            Some("")
        );
    }

    #[test]
    fn unparsable_age_follows_policy() {
        let mut policy = CategoryPolicy::default();
        let rec = record("age", "n/a");

        assert_eq!(categorize(&rec, "age", &policy).as_deref(), Some("adult"));

        policy.unknown_age = UnknownAgePolicy::Unknown;
        assert_eq!(categorize(&rec, "age", &policy).as_deref(), Some("unknown"));

        policy.unknown_age = UnknownAgePolicy::Exclude;
        assert_eq!(categorize(&rec, "age", &policy), None);
    }

    #[test]
    fn fixed_categories_only_for_age() {
        let policy = CategoryPolicy::default();
        assert_eq!(
            fixed_categories("age", &policy),
            Some(vec!["child".to_string(), "adult".to_string()])
        );
        assert_eq!(fixed_categories("class", &policy), None);
    }

    #[test]
    fn french_labels_via_policy() {
        let policy = CategoryPolicy {
            child_label: "enfant".to_string(),
            adult_label: "adulte".to_string(),
            ..CategoryPolicy::default()
        };
        assert_eq!(
            categorize(&record("age", "7"), "age", &policy).as_deref(),
            Some("enfant")
        );
    }
}
