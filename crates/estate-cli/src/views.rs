//! List, detail and comparison views.
//!
//! Each `render_*` function returns the text view so it can be checked without
//! a terminal; the `cmd_*` functions load through the repository and print.

use crate::OutputFormat;
use anyhow::{anyhow, Result};
use colored::Colorize;
use estate_catalog::{ChartSeries, CompareSelection, ComparisonView, Facets, ListQuery};
use estate_ingest_yaml::CommunityRepository;
use estate_model::format::{
    format_distance_with_time, nearest_metro_distance, or_dash, with_base_url,
};
use estate_model::CommunityRecord;
use serde::Serialize;

const SITE_BASE_URL: &str = "/";

#[derive(Debug, Serialize)]
struct ListOutput<'a> {
    query: &'a ListQuery,
    facets: Facets,
    communities: Vec<&'a CommunityRecord>,
}

pub fn cmd_list(repo: &CommunityRepository, query: &ListQuery, format: OutputFormat) -> Result<()> {
    let records = repo.load_all()?;
    let facets = Facets::collect(records);
    let hits = query.apply(records);
    tracing::debug!(matched = hits.len(), total = records.len(), "list query applied");

    match format {
        OutputFormat::Json => {
            let out = ListOutput {
                query,
                facets,
                communities: hits,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => println!("{}", render_list_text(&facets, &hits)),
    }
    Ok(())
}

pub fn cmd_show(repo: &CommunityRepository, key: &str, format: OutputFormat) -> Result<()> {
    let record = repo
        .find_by_key(key)?
        .ok_or_else(|| anyhow!("community `{key}` not found"))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => println!("{}", render_detail_text(record)),
    }
    Ok(())
}

pub fn cmd_compare(
    repo: &CommunityRepository,
    selection: &CompareSelection,
    format: OutputFormat,
) -> Result<()> {
    let records = repo.load_all()?;
    let view = ComparisonView::build(selection, records)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => println!("{}", render_compare_text(&view)),
    }
    Ok(())
}

pub fn render_list_text(facets: &Facets, hits: &[&CommunityRecord]) -> String {
    let mut out = Vec::new();
    out.push(format!("{} {}", "Communities".green().bold(), hits.len()));
    out.push(format!("  标签: {}", join_or_dash(&facets.tags)));
    out.push(format!("  区域: {}", join_or_dash(&facets.districts)));
    out.push(format!("  片区: {}", join_or_dash(&facets.areas)));

    if hits.is_empty() {
        out.push(String::new());
        out.push("暂无符合筛选条件的小区".yellow().to_string());
        return out.join("\n");
    }

    for record in hits {
        out.push(String::new());
        out.push(format!(
            "{} {}",
            record.name_zh.cyan().bold(),
            format!("[{}]", record.id).dimmed()
        ));
        out.push(format!("  {}", record.location_label()));
        out.push(format!(
            "  单价: {} 万/㎡",
            or_dash(record.price.as_ref().and_then(|p| p.ref_wan_per_sqm))
        ));
        out.push(format!(
            "  总价段: {} 万",
            or_dash(record.price.as_ref().and_then(|p| p.ref_total_wan_range.as_deref()))
        ));
        out.push(format!(
            "  最近地铁: {}",
            format_distance_with_time(nearest_metro_distance(record))
        ));
        out.push(format!("  更新于 {}", record.updated_at));
        if !record.tags.is_empty() {
            out.push(format!("  {}", record.tags.join(" · ").yellow()));
        }
        out.push(format!(
            "  {}",
            with_base_url(SITE_BASE_URL, &format!("communities/{}", record.route_key))
        ));
    }
    out.join("\n")
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

fn yes_no(flag: Option<bool>) -> &'static str {
    if flag.unwrap_or(false) {
        "是"
    } else {
        "否"
    }
}

pub fn render_detail_text(record: &CommunityRecord) -> String {
    let mut out = Vec::new();
    out.push(record.name_zh.green().bold().to_string());
    if let Some(cover) = &record.images.cover {
        out.push(format!("  封面: {}", with_base_url(SITE_BASE_URL, cover)));
    }
    if !record.tags.is_empty() {
        out.push(format!("  {}", record.tags.join(" · ").yellow()));
    }

    let price = record.price.clone().unwrap_or_default();
    out.push(section("基础信息"));
    out.push(format!("  区域：{}", or_dash(record.district.as_deref())));
    out.push(format!("  片区：{}", or_dash(record.area.as_deref())));
    out.push(format!(
        "  建成年份：{}",
        or_dash(record.build.as_ref().and_then(|b| b.build_year_range.as_deref()))
    ));
    out.push(format!("  价格等级：{}", or_dash(price.level)));
    out.push(format!("  参考单价：{} 万/㎡", or_dash(price.ref_wan_per_sqm)));
    out.push(format!("  参考总价：{} 万", or_dash(price.ref_total_wan_range)));

    out.push(section("距离"));
    out.push("  地铁".to_string());
    for metro in record.metro() {
        let name: Vec<&str> = [metro.line.as_deref(), metro.station.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        let name = if name.is_empty() {
            "未知地铁站".to_string()
        } else {
            name.join(" / ")
        };
        out.push(format!("    {name}：{}", format_distance_with_time(metro.distance_m)));
    }
    out.push("  目标地点".to_string());
    for target in record.targets() {
        let name = target
            .name
            .as_deref()
            .or(target.id.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or("目标地点");
        out.push(format!("    {name}：{}", format_distance_with_time(target.distance_m)));
    }

    let property = record.property.clone().unwrap_or_default();
    out.push(section("物业与配套"));
    out.push(format!(
        "  泳池: {}  儿童乐园: {}  人车分流: {}",
        yes_no(property.has_pool),
        yes_no(property.has_kids_playground),
        yes_no(property.has_separation_ped_car)
    ));
    out.push(format!(
        "  物业费：{}",
        or_dash(property.management_fee.and_then(|m| m.cny_per_sqm_month_range))
    ));
    let parking = property.parking.unwrap_or_default();
    out.push(format!("  停车月租：{}", or_dash(parking.monthly_rent_cny_range)));
    out.push(format!("  车位价格：{}", or_dash(parking.spot_price_wan_range)));
    if let Some(note) = property.facilities_note.filter(|n| !n.is_empty()) {
        out.push(format!("  备注：{note}"));
    }

    out.push(section("房产形态"));
    for building in record.building_types() {
        out.push(format!(
            "  {} / 总楼层 {}",
            building
                .building_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or("类型未填"),
            building
                .total_floors_range
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or("-")
        ));
        for layout in &building.layouts {
            let range = layout
                .area_sqm_range
                .as_ref()
                .map(|a| a.as_str().to_string())
                .unwrap_or_default();
            let range = if layout.main_supply {
                format!("{range} (主供)").cyan().to_string()
            } else {
                range
            };
            let tags = if layout.layout_tags.is_empty() {
                "无户型标签".to_string()
            } else {
                layout.layout_tags.join(" / ")
            };
            out.push(format!("    {range}  {tags}"));
        }
    }

    if let Some(links) = record.links.as_ref().filter(|l| !l.is_empty()) {
        out.push(section("链接"));
        for link in links {
            let url = link.url.as_deref().unwrap_or_default();
            let title = link.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(url);
            out.push(format!("  {title}  {}", url.dimmed()));
        }
    }

    if let Some(notes) = record.notes_md.as_deref().filter(|n| !n.is_empty()) {
        out.push(section("备注"));
        out.extend(notes.lines().map(|l| format!("  {l}")));
    }

    out.join("\n")
}

fn section(title: &str) -> String {
    format!("\n{}", title.bold())
}

pub fn render_compare_text(view: &ComparisonView) -> String {
    let mut out = Vec::new();
    out.push("小区对比".green().bold().to_string());

    let mut header = vec!["字段".to_string()];
    header.extend(view.table.headers.iter().cloned());
    out.push(header.join(" | ").bold().to_string());
    for row in &view.table.rows {
        let mut line = vec![row.label.clone()];
        line.extend(row.cells.iter().cloned());
        out.push(line.join(" | "));
    }

    for chart in &view.charts {
        out.push(String::new());
        out.push(render_chart_text(chart));
    }

    out.push(String::new());
    out.push(
        format!("距离展示规则：{}", format_distance_with_time(Some(850.0)))
            .dimmed()
            .to_string(),
    );
    out.join("\n")
}

fn render_chart_text(chart: &ChartSeries) -> String {
    let mut out = vec![chart.title.bold().to_string()];
    for (name, value) in chart.categories.iter().zip(&chart.values) {
        out.push(format!("  {name}: {value}"));
    }
    out.join("\n")
}
