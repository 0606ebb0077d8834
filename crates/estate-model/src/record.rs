//! Canonical community records.
//!
//! A `CommunityRecord` is what consumers see after a data file has been
//! validated and normalized. Every nested block mirrors the YAML layout of the
//! data files; optional blocks stay `None` when absent or unusable.

use crate::area::AreaRangeValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One residential community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Public URL key: `slug` when set, otherwise `id`.
    pub route_key: String,
    /// Data file the record was read from.
    pub source_file: String,
    pub name_zh: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Build>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing_stock: Option<HousingStock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_md: Option<String>,
    #[serde(default)]
    pub images: Images,
    /// Top-level keys the schema does not know about, carried through as-is.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl CommunityRecord {
    /// Record with only the required fields set; the route key is the id.
    pub fn new(
        id: impl Into<String>,
        name_zh: impl Into<String>,
        updated_at: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            route_key: id.clone(),
            source_file: String::new(),
            id,
            slug: None,
            name_zh: name_zh.into(),
            tags: Vec::new(),
            updated_at: updated_at.into(),
            district: None,
            area: None,
            price: None,
            build: None,
            distance: None,
            property: None,
            housing_stock: None,
            links: None,
            notes_md: None,
            images: Images::default(),
            extra: BTreeMap::new(),
        }
    }

    /// `district / area`, skipping blanks; `-` when neither is set.
    pub fn location_label(&self) -> String {
        let parts: Vec<&str> = [self.district.as_deref(), self.area.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            "-".to_string()
        } else {
            parts.join(" / ")
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn building_types(&self) -> &[BuildingType] {
        self.housing_stock
            .as_ref()
            .map(|h| h.building_types.as_slice())
            .unwrap_or(&[])
    }

    pub fn metro(&self) -> &[MetroDistance] {
        self.distance
            .as_ref()
            .map(|d| d.metro.as_slice())
            .unwrap_or(&[])
    }

    pub fn targets(&self) -> &[TargetDistance] {
        self.distance
            .as_ref()
            .map(|d| d.to_targets.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Reference unit price, 10k CNY per square meter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_wan_per_sqm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_total_wan_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Build {
    /// Free text such as `2015-2018` or `约2010年`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_year_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    #[serde(default)]
    pub metro: Vec<MetroDistance>,
    #[serde(default)]
    pub to_targets: Vec<TargetDistance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetroDistance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetDistance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_pool: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_kids_playground: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_separation_ped_car: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_fee: Option<ManagementFee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking: Option<Parking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facilities_note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagementFee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cny_per_sqm_month_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rent_cny_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_price_wan_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HousingStock {
    #[serde(default)]
    pub building_types: Vec<BuildingType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingType {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_floors_range: Option<String>,
    #[serde(default)]
    pub layouts: Vec<Layout>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_sqm_range: Option<AreaRangeValue>,
    #[serde(default)]
    pub layout_tags: Vec<String>,
    #[serde(default)]
    pub main_supply: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Image paths, already rewritten to their public-serving form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Images {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(id: &str) -> CommunityRecord {
        CommunityRecord::new(id, id, "2024-01-01")
    }

    #[test]
    fn location_label_skips_missing_parts() {
        let mut record = bare("a");
        assert_eq!(record.location_label(), "-");

        record.area = Some("滨江".to_string());
        assert_eq!(record.location_label(), "滨江");

        record.district = Some("杭州".to_string());
        assert_eq!(record.location_label(), "杭州 / 滨江");
    }

    #[test]
    fn accessors_default_to_empty_slices() {
        let record = bare("a");
        assert!(record.building_types().is_empty());
        assert!(record.metro().is_empty());
        assert!(record.targets().is_empty());
    }
}
