//! List view: facets, filtering and sort orders.

use estate_model::format::{build_start_year, nearest_metro_distance, parse_date_value};
use estate_model::CommunityRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Distinct filter values present in a collection, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub tags: Vec<String>,
    pub districts: Vec<String>,
    pub areas: Vec<String>,
}

impl Facets {
    pub fn collect<'a>(records: impl IntoIterator<Item = &'a CommunityRecord>) -> Self {
        let mut facets = Facets::default();
        for record in records {
            for tag in &record.tags {
                push_unique(&mut facets.tags, Some(tag));
            }
            push_unique(&mut facets.districts, record.district.as_ref());
            push_unique(&mut facets.areas, record.area.as_ref());
        }
        facets
    }
}

fn push_unique(values: &mut Vec<String>, value: Option<&String>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        if !values.contains(v) {
            values.push(v.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most recently updated first.
    #[default]
    UpdatedDesc,
    /// Cheapest unit price first; unpriced last.
    PriceAsc,
    /// Closest metro first; no metro last.
    MetroAsc,
    /// Newest build year first; unknown last.
    BuildYearDesc,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::UpdatedDesc => "updated_desc",
            SortKey::PriceAsc => "price_asc",
            SortKey::MetroAsc => "metro_asc",
            SortKey::BuildYearDesc => "build_year_desc",
        }
    }

    /// Stable comparison of two records under this order.
    pub fn compare(self, a: &CommunityRecord, b: &CommunityRecord) -> Ordering {
        match self {
            SortKey::UpdatedDesc => {
                parse_date_value(&b.updated_at).cmp(&parse_date_value(&a.updated_at))
            }
            SortKey::PriceAsc => {
                let price = |r: &CommunityRecord| {
                    r.price
                        .as_ref()
                        .and_then(|p| p.ref_wan_per_sqm)
                        .unwrap_or(f64::MAX)
                };
                price(a).total_cmp(&price(b))
            }
            SortKey::MetroAsc => {
                let metro = |r: &CommunityRecord| nearest_metro_distance(r).unwrap_or(f64::MAX);
                metro(a).total_cmp(&metro(b))
            }
            SortKey::BuildYearDesc => {
                build_start_year(b).unwrap_or(0).cmp(&build_start_year(a).unwrap_or(0))
            }
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "updated" | "updated_desc" => Ok(SortKey::UpdatedDesc),
            "price" | "price_asc" => Ok(SortKey::PriceAsc),
            "metro" | "metro_asc" => Ok(SortKey::MetroAsc),
            "build_year" | "build_year_desc" => Ok(SortKey::BuildYearDesc),
            other => Err(format!(
                "unknown sort `{other}` (expected updated|price|metro|build-year)"
            )),
        }
    }
}

/// Filter + sort for the list view.
///
/// Tags match when any selected tag is present; district and area must match
/// exactly when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
}

impl ListQuery {
    /// Select `tag` if unselected, unselect it otherwise.
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.to_string());
        }
    }

    pub fn matches(&self, record: &CommunityRecord) -> bool {
        let tags_ok = self.tags.is_empty() || self.tags.iter().any(|t| record.has_tag(t));
        let district_ok = blank_or_eq(self.district.as_deref(), record.district.as_deref());
        let area_ok = blank_or_eq(self.area.as_deref(), record.area.as_deref());
        tags_ok && district_ok && area_ok
    }

    /// Matching records in this query's order. Ties keep collection order.
    pub fn apply<'a>(&self, records: &'a [CommunityRecord]) -> Vec<&'a CommunityRecord> {
        let mut hits: Vec<&CommunityRecord> = records.iter().filter(|r| self.matches(r)).collect();
        hits.sort_by(|a, b| self.sort.compare(a, b));
        hits
    }
}

fn blank_or_eq(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None | Some("") => true,
        Some(w) => actual == Some(w),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_model::{Build, Price};

    fn record(id: &str, updated_at: &str) -> CommunityRecord {
        CommunityRecord::new(id, format!("小区{id}"), updated_at)
    }

    fn sample() -> Vec<CommunityRecord> {
        let mut a = record("a", "2024-01-10");
        a.tags = vec!["学区".into(), "地铁".into()];
        a.district = Some("西湖".into());
        a.area = Some("文教".into());
        a.price = Some(Price {
            ref_wan_per_sqm: Some(6.5),
            ..Default::default()
        });
        a.build = Some(Build {
            build_year_range: Some("2008-2010".into()),
        });

        let mut b = record("b", "2024-03-01");
        b.tags = vec!["地铁".into()];
        b.district = Some("滨江".into());
        b.price = Some(Price {
            ref_wan_per_sqm: Some(4.8),
            ..Default::default()
        });

        let mut c = record("c", "2023-12-31");
        c.tags = vec!["低密".into()];
        c.district = Some("西湖".into());
        c.build = Some(Build {
            build_year_range: Some("2019".into()),
        });

        vec![a, b, c]
    }

    fn ids(hits: &[&CommunityRecord]) -> Vec<String> {
        hits.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn facets_are_unique_in_first_seen_order() {
        let facets = Facets::collect(&sample());
        assert_eq!(facets.tags, vec!["学区", "地铁", "低密"]);
        assert_eq!(facets.districts, vec!["西湖", "滨江"]);
        assert_eq!(facets.areas, vec!["文教"]);
    }

    #[test]
    fn default_query_sorts_by_update_date_desc() {
        let records = sample();
        assert_eq!(ids(&ListQuery::default().apply(&records)), vec!["b", "a", "c"]);
    }

    #[test]
    fn tag_filter_matches_any_selected_tag() {
        let records = sample();
        let mut query = ListQuery::default();
        query.toggle_tag("学区");
        query.toggle_tag("低密");
        assert_eq!(ids(&query.apply(&records)), vec!["a", "c"]);

        query.toggle_tag("学区");
        assert_eq!(query.tags, vec!["低密"]);
    }

    #[test]
    fn district_and_area_must_match_exactly() {
        let records = sample();
        let query = ListQuery {
            district: Some("西湖".into()),
            area: Some("文教".into()),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&records)), vec!["a"]);
    }

    #[test]
    fn price_sort_puts_unpriced_last() {
        let records = sample();
        let query = ListQuery {
            sort: SortKey::PriceAsc,
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&records)), vec!["b", "a", "c"]);
    }

    #[test]
    fn build_year_sort_is_newest_first() {
        let records = sample();
        let query = ListQuery {
            sort: SortKey::BuildYearDesc,
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&records)), vec!["c", "a", "b"]);
    }

    #[test]
    fn metro_sort_without_metros_keeps_collection_order() {
        let records = sample();
        let query = ListQuery {
            sort: SortKey::MetroAsc,
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&records)), vec!["a", "b", "c"]);
    }

    #[test]
    fn sort_keys_parse_cli_spellings() {
        assert_eq!("build-year".parse::<SortKey>().unwrap(), SortKey::BuildYearDesc);
        assert_eq!("price_asc".parse::<SortKey>().unwrap(), SortKey::PriceAsc);
        assert!("rating".parse::<SortKey>().is_err());
    }
}
