//! Raw mapping → `CommunityRecord`.
//!
//! Conversion is lenient: a wrongly typed optional field becomes `None` (or an
//! empty list) instead of failing. Validation is where problems get reported.

use estate_model::format::normalize_image_path;
use estate_model::{
    AreaRangeValue, Build, BuildingType, CommunityRecord, Distance, HousingStock, Images, Layout,
    Link, ManagementFee, MetroDistance, Parking, Price, PropertyInfo, TargetDistance,
};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Top-level keys with a typed home on `CommunityRecord`.
const KNOWN_KEYS: &[&str] = &[
    "id",
    "slug",
    "name_zh",
    "tags",
    "updated_at",
    "district",
    "area",
    "price",
    "build",
    "distance",
    "property",
    "housing_stock",
    "links",
    "notes_md",
    "images",
];

/// Build the canonical record for one raw mapping read from `file_name`.
pub fn normalize_community(file_name: &str, raw: &Mapping) -> CommunityRecord {
    let id = stringify_id(raw.get("id"));
    let slug = raw
        .get("slug")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let route_key = slug.clone().unwrap_or_else(|| id.clone());

    let tags = raw
        .get("tags")
        .and_then(Value::as_sequence)
        .map(|seq| string_list(seq))
        .unwrap_or_default();

    let extra: BTreeMap<String, Value> = raw
        .iter()
        .filter_map(|(k, v)| {
            let key = k.as_str()?;
            (!KNOWN_KEYS.contains(&key)).then(|| (key.to_string(), v.clone()))
        })
        .collect();

    CommunityRecord {
        id,
        slug,
        route_key,
        source_file: file_name.to_string(),
        name_zh: text(raw.get("name_zh")).unwrap_or_default(),
        tags,
        updated_at: text(raw.get("updated_at")).unwrap_or_default(),
        district: text(raw.get("district")),
        area: text(raw.get("area")),
        price: block(raw, "price").map(price),
        build: block(raw, "build").map(|b| Build {
            build_year_range: text(b.get("build_year_range")),
        }),
        distance: block(raw, "distance").map(distance),
        property: block(raw, "property").map(property),
        housing_stock: block(raw, "housing_stock").map(housing_stock),
        links: raw
            .get("links")
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().filter_map(Value::as_mapping).map(link).collect()),
        notes_md: text(raw.get("notes_md")),
        images: block(raw, "images").map(images).unwrap_or_default(),
        extra,
    }
}

/// String form of an id, whatever scalar it was written as.
fn stringify_id(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Some(other) => serde_json::to_string(other).unwrap_or_default(),
    }
}

fn block<'a>(raw: &'a Mapping, key: &str) -> Option<&'a Mapping> {
    raw.get(key).and_then(Value::as_mapping)
}

/// Scalar text; numbers and booleans are rendered, everything else is dropped.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers, or strings that parse as numbers.
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag(value: Option<&Value>) -> Option<bool> {
    value?.as_bool()
}

fn string_list(seq: &[Value]) -> Vec<String> {
    seq.iter().filter_map(|v| text(Some(v))).collect()
}

fn price(m: &Mapping) -> Price {
    Price {
        level: text(m.get("level")),
        ref_wan_per_sqm: number(m.get("ref_wan_per_sqm")),
        ref_total_wan_range: text(m.get("ref_total_wan_range")),
    }
}

fn entries<'a>(m: &'a Mapping, key: &str) -> Vec<&'a Mapping> {
    m.get(key)
        .and_then(Value::as_sequence)
        .map(|seq| seq.iter().filter_map(Value::as_mapping).collect())
        .unwrap_or_default()
}

fn distance(m: &Mapping) -> Distance {
    Distance {
        metro: entries(m, "metro")
            .into_iter()
            .map(|e| MetroDistance {
                station: text(e.get("station")),
                line: text(e.get("line")),
                distance_m: number(e.get("distance_m")),
            })
            .collect(),
        to_targets: entries(m, "to_targets")
            .into_iter()
            .map(|e| TargetDistance {
                id: text(e.get("id")),
                name: text(e.get("name")),
                distance_m: number(e.get("distance_m")),
            })
            .collect(),
    }
}

fn property(m: &Mapping) -> PropertyInfo {
    PropertyInfo {
        has_pool: flag(m.get("has_pool")),
        has_kids_playground: flag(m.get("has_kids_playground")),
        has_separation_ped_car: flag(m.get("has_separation_ped_car")),
        management_fee: block(m, "management_fee").map(|f| ManagementFee {
            cny_per_sqm_month_range: text(f.get("cny_per_sqm_month_range")),
        }),
        parking: block(m, "parking").map(|p| Parking {
            monthly_rent_cny_range: text(p.get("monthly_rent_cny_range")),
            spot_price_wan_range: text(p.get("spot_price_wan_range")),
        }),
        facilities_note: text(m.get("facilities_note")),
    }
}

fn housing_stock(m: &Mapping) -> HousingStock {
    let building_types = m
        .get("building_types")
        .and_then(Value::as_sequence)
        .map(|seq| seq.iter().filter_map(Value::as_mapping).map(building_type).collect())
        .unwrap_or_default();
    HousingStock { building_types }
}

fn building_type(m: &Mapping) -> BuildingType {
    BuildingType {
        building_type: text(m.get("type")),
        total_floors_range: text(m.get("total_floors_range")),
        layouts: m
            .get("layouts")
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().filter_map(Value::as_mapping).map(layout).collect())
            .unwrap_or_default(),
    }
}

fn layout(m: &Mapping) -> Layout {
    Layout {
        area_sqm_range: text(m.get("area_sqm_range")).map(|raw| AreaRangeValue::from_raw(&raw)),
        layout_tags: m
            .get("layout_tags")
            .and_then(Value::as_sequence)
            .map(|seq| string_list(seq))
            .unwrap_or_default(),
        main_supply: flag(m.get("main_supply")).unwrap_or(false),
    }
}

fn link(m: &Mapping) -> Link {
    Link {
        title: text(m.get("title")),
        url: text(m.get("url")),
    }
}

fn images(m: &Mapping) -> Images {
    let cover = normalize_image_path(m.get("cover").and_then(Value::as_str));
    let gallery = m.get("gallery").and_then(Value::as_sequence).map(|seq| {
        seq.iter()
            .filter_map(|v| normalize_image_path(v.as_str()))
            .collect()
    });
    Images { cover, gallery }
}
