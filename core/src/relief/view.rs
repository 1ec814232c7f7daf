use super::model::FoodRequest;
use crate::determinism::clock::parse_rfc3339;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Urgency,
    Timestamp,
    PeopleCount,
    Location,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Display parameters. Default: no filter, urgency descending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ViewQuery {
    pub location_filter: String,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl ViewQuery {
    pub fn has_filter(&self) -> bool {
        !self.location_filter.trim().is_empty()
    }
}

pub fn matches_location(record: &FoodRequest, filter: &str) -> bool {
    if filter.trim().is_empty() {
        return true;
    }
    record
        .location
        .to_lowercase()
        .contains(&filter.to_lowercase())
}

/// Ascending comparator for one sort field.
pub fn compare_by(field: SortField, a: &FoodRequest, b: &FoodRequest) -> Ordering {
    match field {
        SortField::Urgency => a.urgency.weight().cmp(&b.urgency.weight()),
        SortField::PeopleCount => a.people_count.cmp(&b.people_count),
        SortField::Timestamp => {
            // Unparseable instants sort before every valid one.
            parse_rfc3339(&a.timestamp).cmp(&parse_rfc3339(&b.timestamp))
        }
        SortField::Location => locale_compare(&a.location, &b.location),
    }
}

/// Filtered and sorted projection over `records`. Never mutates its input;
/// the sort is stable so equal keys keep cache order.
pub fn project<'a>(records: &'a [FoodRequest], query: &ViewQuery) -> Vec<&'a FoodRequest> {
    let mut out: Vec<&FoodRequest> = records
        .iter()
        .filter(|r| matches_location(r, &query.location_filter))
        .collect();
    out.sort_by(|a, b| {
        let ord = compare_by(query.sort_field, a, b);
        match query.sort_direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    out
}

fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

// Combining marks grouped under the base character they follow.
fn accent_key(s: &str) -> Vec<Vec<char>> {
    let mut out: Vec<Vec<char>> = Vec::new();
    for c in s.nfd() {
        match out.last_mut() {
            Some(marks) if is_combining_mark(c) => marks.push(c),
            _ => out.push(Vec::new()),
        }
    }
    out
}

// Lower case orders before upper case among otherwise-equal strings.
fn case_key(s: &str) -> Vec<(bool, char)> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| (c.is_uppercase(), c))
        .collect()
}

/// Close to a default-locale `localeCompare`: base letters first, then
/// accents, then case.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| case_key(a).cmp(&case_key(b)))
}
