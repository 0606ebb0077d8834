//! Integration tests for the complete community catalog pipeline
//!
//! These tests verify end-to-end behavior across crates:
//! - YAML files → validation → normalized records (estate-ingest-yaml)
//! - Records → list facets, filters and sort orders (estate-catalog)
//! - Records → comparison selection, table and chart series (estate-catalog)
//!
//! Run with: cargo test --test integration_tests

use estate_catalog::{
    CompareSelection, ComparisonView, Facets, ListQuery, SortKey, ToggleOutcome,
};
use estate_ingest_yaml::{CommunityRepository, LoadError};
use estate_model::format::{build_start_year, nearest_metro_label};
use estate_model::AreaRange;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

fn seed(dir: &Path) {
    write(
        dir,
        "01-garden.yml",
        r#"id: 1001
name_zh: 花园小区
slug: " garden "
tags: [地铁, 学区]
updated_at: "2024-02-01"
district: 西湖
area: 文教
price:
  level: 中
  ref_wan_per_sqm: 5.8
  ref_total_wan_range: "500-600"
build:
  build_year_range: "2012-2014"
distance:
  metro:
    - station: 古荡
      line: 2号线
      distance_m: 900
    - station: 文三路
      line: 2号线
      distance_m: 520
  to_targets:
    - id: office
      name: 公司
      distance_m: 4200
property:
  has_pool: true
  management_fee:
    cny_per_sqm_month_range: "3.5"
housing_stock:
  building_types:
    - type: 高层
      total_floors_range: "18-26"
      layouts:
        - area_sqm_range: "80-90"
          layout_tags: [三室]
          main_supply: true
        - area_sqm_range: "100-120"
images:
  cover: ../assets/garden/cover.jpg
rating: 4
"#,
    );
    write(
        dir,
        "02-river.yaml",
        r#"id: river
name_zh: 江景苑
tags: [低密]
updated_at: "2024-05-20"
district: 滨江
price:
  ref_wan_per_sqm: 4.1
build:
  build_year_range: 约2019年
distance:
  to_targets:
    - id: office
      distance_m: 1800
"#,
    );
    write(
        dir,
        "03-hill.yml",
        r#"id: hill
name_zh: 山景府
tags: []
updated_at: "2023-11-11"
district: 西湖
"#,
    );
    write(dir, "notes.txt", "ignored");
}

#[test]
fn test_load_normalizes_every_record() {
    let dir = tempdir().unwrap();
    seed(dir.path());

    let repo = CommunityRepository::with_data_dir(dir.path());
    let records = repo.load_all().unwrap();
    assert_eq!(records.len(), 3);

    let garden = &records[0];
    assert_eq!(garden.id, "1001");
    assert_eq!(garden.route_key, "garden");
    assert_eq!(garden.source_file, "01-garden.yml");
    assert_eq!(garden.images.cover.as_deref(), Some("/assets/garden/cover.jpg"));
    assert_eq!(garden.extra.get("rating"), Some(&serde_yaml::Value::from(4)));
    assert_eq!(build_start_year(garden), Some(2012));
    assert!(nearest_metro_label(garden).starts_with("文三路 520m"));

    assert_eq!(repo.find_by_key("garden").unwrap().unwrap().id, "1001");
    assert_eq!(repo.find_by_key("1001").unwrap().unwrap().route_key, "garden");
    assert!(repo.find_by_id("garden").unwrap().is_none());
}

#[test]
fn test_list_view_over_loaded_records() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let repo = CommunityRepository::with_data_dir(dir.path());
    let records = repo.load_all().unwrap();

    let facets = Facets::collect(records);
    assert_eq!(facets.tags, vec!["地铁", "学区", "低密"]);
    assert_eq!(facets.districts, vec!["西湖", "滨江"]);

    let ids = |query: &ListQuery| -> Vec<String> {
        query.apply(records).iter().map(|r| r.id.clone()).collect()
    };

    assert_eq!(ids(&ListQuery::default()), vec!["river", "1001", "hill"]);
    assert_eq!(
        ids(&ListQuery {
            district: Some("西湖".into()),
            sort: SortKey::PriceAsc,
            ..Default::default()
        }),
        vec!["1001", "hill"]
    );
    assert_eq!(
        ids(&ListQuery {
            sort: SortKey::BuildYearDesc,
            ..Default::default()
        }),
        vec!["river", "1001", "hill"]
    );
    assert_eq!(
        ids(&ListQuery {
            sort: SortKey::MetroAsc,
            ..Default::default()
        }),
        vec!["1001", "river", "hill"]
    );
}

#[test]
fn test_comparison_over_loaded_records() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let repo = CommunityRepository::with_data_dir(dir.path());
    let records = repo.load_all().unwrap();

    let mut selection = CompareSelection::new();
    assert_eq!(selection.toggle("river", true), ToggleOutcome::Added);
    assert!(ComparisonView::build(&selection, records).is_err());
    assert_eq!(selection.toggle("1001", true), ToggleOutcome::Added);

    let view = ComparisonView::build(&selection, records).unwrap();
    assert_eq!(view.table.headers, vec!["江景苑", "花园小区"]);

    let row = |label: &str| {
        view.table
            .rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.cells.clone())
            .unwrap()
    };
    assert_eq!(row("区域 / 片区"), vec!["滨江", "西湖 / 文教"]);
    assert_eq!(row("泳池 / 儿童乐园 / 人车分流"), vec!["否 / 否 / 否", "是 / 否 / 否"]);
    assert_eq!(row("物业费"), vec!["-", "3.5"]);
    assert_eq!(row(&format!("主供面积段 {}", AreaRange::Sqm80To90)), vec!["-", "高层"]);
    assert_eq!(row("主供面积段 100-120"), vec!["-", "-"]);

    let titles: Vec<&str> = view.charts.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["参考单价（万/㎡）", "最近地铁距离（m）", "office 距离（m）"]);
    assert_eq!(view.charts[2].values, vec![1800.0, 4200.0]);
}

#[test]
fn test_one_bad_file_fails_the_whole_load() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    write(
        dir.path(),
        "04-bad.yml",
        "id: bad\nname_zh: 坏数据\ntags: []\nupdated_at: 2024/01/01\n",
    );

    let repo = CommunityRepository::with_data_dir(dir.path());
    match repo.load_all() {
        Err(LoadError::Validation(report)) => {
            assert_eq!(
                report.to_string(),
                "Community YAML validation failed:\n[04-bad.yml] updated_at: must match YYYY-MM-DD; value=2024/01/01"
            );
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(!repo.is_loaded());
}
