//! Category heuristics shared by the provider adapters.
//!
//! Tag-rich sources (OpenStreetMap) may yield several categories per
//! record; type-list sources (Google Places) yield exactly one, the
//! highest-priority match. Both fall back to [`DEFAULT_CATEGORY`].

use std::collections::HashMap;

use crate::types::DEFAULT_CATEGORY;

pub const FOOD_BANK: &str = "Food Bank";
pub const SHELTER: &str = "Shelter";
pub const HEALTH: &str = "Health";
pub const COMMUNITY: &str = "Community";
pub const SOCIAL_SERVICES: &str = "Social Services";

/// Categories for a record described by `key=value` tags.
///
/// Output is ordered, free of duplicates and never empty.
pub fn categorize_tags(tags: &HashMap<String, String>, name: &str) -> Vec<String> {
    let tag = |key: &str| tags.get(key).map(String::as_str);
    let amenity = tag("amenity");
    let social = tag("social_facility");
    let name = name.to_lowercase();

    let mut categories: Vec<String> = Vec::new();
    let mut push = |label: &str| {
        if !categories.iter().any(|c| c == label) {
            categories.push(label.to_string());
        }
    };

    if amenity == Some("food_bank")
        || social == Some("food_bank")
        || name.contains("pantry")
        || name.contains("food bank")
    {
        push(FOOD_BANK);
    }
    if social == Some("shelter") || name.contains("shelter") {
        push(SHELTER);
    }
    if matches!(amenity, Some("clinic" | "hospital" | "doctors")) || tag("healthcare").is_some() {
        push(HEALTH);
    }
    if matches!(amenity, Some("community_centre" | "place_of_worship")) {
        push(COMMUNITY);
    }
    let generic_facility = amenity == Some("social_facility") && social.is_none();
    if generic_facility || matches!(social, Some(v) if v != "food_bank" && v != "shelter") {
        push(SOCIAL_SERVICES);
    }

    if categories.is_empty() {
        categories.push(DEFAULT_CATEGORY.to_string());
    }
    categories
}

/// The single best category for a record described by a list of place
/// types, falling back to a name heuristic.
pub fn categorize_types(types: &[String], name: &str) -> Vec<String> {
    let has = |wanted: &[&str]| types.iter().any(|t| wanted.contains(&t.as_str()));
    let name = name.to_lowercase();

    let label = if has(&["food_bank", "food"]) {
        FOOD_BANK
    } else if has(&["place_of_worship", "church"]) {
        COMMUNITY
    } else if has(&["health", "doctor", "hospital"]) {
        HEALTH
    } else if name.contains("pantry") {
        FOOD_BANK
    } else if name.contains("shelter") {
        SHELTER
    } else {
        DEFAULT_CATEGORY
    };
    vec![label.to_string()]
}

/// A provider-supplied category label, or the default when it is blank.
pub fn single_or_default(label: Option<&str>) -> Vec<String> {
    let label = label.map(str::trim).filter(|l| !l.is_empty());
    vec![label.unwrap_or(DEFAULT_CATEGORY).to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn types(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn food_bank_amenity_tagged() {
        let cats = categorize_tags(&tags(&[("amenity", "food_bank")]), "Hope Center");
        assert!(cats.contains(&FOOD_BANK.to_string()));
    }

    #[test]
    fn unmatched_tags_yield_exactly_nonprofit() {
        let cats = categorize_tags(&tags(&[("office", "charity")]), "Friends of the Library");
        assert_eq!(cats, vec![DEFAULT_CATEGORY.to_string()]);
    }

    #[test]
    fn tag_rich_record_gets_several_categories() {
        let cats = categorize_tags(
            &tags(&[("amenity", "community_centre"), ("healthcare", "clinic")]),
            "Eastside Pantry",
        );
        assert_eq!(cats, vec![FOOD_BANK, HEALTH, COMMUNITY]);
    }

    #[test]
    fn name_heuristic_is_case_insensitive() {
        let cats = categorize_tags(&tags(&[]), "ST. MARY'S SHELTER");
        assert_eq!(cats, vec![SHELTER]);
    }

    #[test]
    fn social_facility_values() {
        let cats = categorize_tags(&tags(&[("social_facility", "shelter")]), "Harbor House");
        assert_eq!(cats, vec![SHELTER]);
        let cats = categorize_tags(&tags(&[("social_facility", "outreach")]), "Harbor House");
        assert_eq!(cats, vec![SOCIAL_SERVICES]);
        let cats = categorize_tags(&tags(&[("amenity", "social_facility")]), "Harbor House");
        assert_eq!(cats, vec![SOCIAL_SERVICES]);
    }

    #[test]
    fn food_bank_not_duplicated() {
        let cats = categorize_tags(
            &tags(&[("amenity", "food_bank"), ("social_facility", "food_bank")]),
            "City Food Bank Pantry",
        );
        assert_eq!(cats, vec![FOOD_BANK]);
    }

    #[test]
    fn types_pick_highest_priority_only() {
        let cats = categorize_types(&types(&["hospital", "church", "food"]), "Anything");
        assert_eq!(cats, vec![FOOD_BANK]);
        let cats = categorize_types(&types(&["doctor", "place_of_worship"]), "Anything");
        assert_eq!(cats, vec![COMMUNITY]);
        let cats = categorize_types(&types(&["health", "point_of_interest"]), "Anything");
        assert_eq!(cats, vec![HEALTH]);
    }

    #[test]
    fn types_fall_back_to_name_then_default() {
        let cats = categorize_types(&types(&["establishment"]), "Northside Food Pantry");
        assert_eq!(cats, vec![FOOD_BANK]);
        let cats = categorize_types(&types(&["establishment"]), "Family Shelter");
        assert_eq!(cats, vec![SHELTER]);
        let cats = categorize_types(&types(&["establishment"]), "Arts Council");
        assert_eq!(cats, vec![DEFAULT_CATEGORY]);
    }

    #[test]
    fn single_label_or_default() {
        assert_eq!(single_or_default(Some("Human Services")), vec!["Human Services"]);
        assert_eq!(single_or_default(Some("  ")), vec![DEFAULT_CATEGORY]);
        assert_eq!(single_or_default(None), vec![DEFAULT_CATEGORY]);
    }
}
