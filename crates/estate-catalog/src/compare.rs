//! Side-by-side comparison: the selection rules, the comparison table and
//! the bar-chart series.

use estate_model::format::{nearest_metro_distance, nearest_metro_label, or_dash, with_base_url};
use estate_model::{AreaRange, CommunityRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_COMPARE_COUNT: usize = 6;
pub const MIN_COMPARE_COUNT: usize = 2;

const UNNAMED_BUILDING_TYPE: &str = "未命名类型";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("至少选择 {min} 个小区后才能对比 (selected {got})")]
    TooFew { min: usize, got: usize },

    #[error("最多只能选择 {max} 个小区进行对比")]
    TooMany { max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Already selected (or already absent) so nothing changed.
    Unchanged,
    /// Selection is full; the id was not added.
    LimitReached,
}

/// Ordered set of community ids picked for comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompareSelection {
    ids: Vec<String>,
}

impl CompareSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated id list such as the `ids` query parameter.
    ///
    /// Entries are trimmed, blanks dropped, and anything past the limit ignored.
    pub fn parse_ids(raw: &str) -> Self {
        Self::from_ids(raw.split(',').map(str::trim))
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids
            .into_iter()
            .map(Into::into)
            .filter(|id| !id.is_empty())
            .take(MAX_COMPARE_COUNT)
            .collect();
        Self { ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    pub fn add(&mut self, id: &str) -> Result<ToggleOutcome, CompareError> {
        match self.toggle(id, true) {
            ToggleOutcome::LimitReached => Err(CompareError::TooMany {
                max: MAX_COMPARE_COUNT,
            }),
            outcome => Ok(outcome),
        }
    }

    pub fn remove(&mut self, id: &str) -> ToggleOutcome {
        self.toggle(id, false)
    }

    /// Check or uncheck `id`, mirroring a checkbox in the list view.
    pub fn toggle(&mut self, id: &str, checked: bool) -> ToggleOutcome {
        if !checked {
            let before = self.ids.len();
            self.ids.retain(|i| i != id);
            return if self.ids.len() < before {
                ToggleOutcome::Removed
            } else {
                ToggleOutcome::Unchanged
            };
        }
        if self.contains(id) {
            ToggleOutcome::Unchanged
        } else if self.ids.len() >= MAX_COMPARE_COUNT {
            ToggleOutcome::LimitReached
        } else {
            self.ids.push(id.to_string());
            ToggleOutcome::Added
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ensure_comparable(&self) -> Result<(), CompareError> {
        if self.ids.len() < MIN_COMPARE_COUNT {
            return Err(CompareError::TooFew {
                min: MIN_COMPARE_COUNT,
                got: self.ids.len(),
            });
        }
        Ok(())
    }

    /// Link to the comparison page, `<base>/compare?ids=a,b`.
    pub fn compare_path(&self, base_url: &str) -> Result<String, CompareError> {
        self.ensure_comparable()?;
        Ok(with_base_url(
            base_url,
            &format!("compare?ids={}", self.ids.join(",")),
        ))
    }

    /// Selected records in selection order. Unknown ids are skipped.
    pub fn resolve<'a>(&self, records: &'a [CommunityRecord]) -> Vec<&'a CommunityRecord> {
        self.ids
            .iter()
            .filter_map(|id| records.iter().find(|r| &r.id == id))
            .collect()
    }
}

/// Building types offering `range` as a main-supply layout, `" / "`-joined.
pub fn main_supply_by_range(record: &CommunityRecord, range: AreaRange) -> String {
    let hits: Vec<&str> = record
        .building_types()
        .iter()
        .filter(|bt| {
            bt.layouts.iter().any(|layout| {
                layout.main_supply
                    && layout.area_sqm_range.as_ref().and_then(|a| a.bucket()) == Some(range)
            })
        })
        .map(|bt| {
            bt.building_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(UNNAMED_BUILDING_TYPE)
        })
        .collect();
    if hits.is_empty() {
        "-".to_string()
    } else {
        hits.join(" / ")
    }
}

fn row(
    label: impl Into<String>,
    selected: &[&CommunityRecord],
    cell: impl Fn(&CommunityRecord) -> String,
) -> CompareRow {
    CompareRow {
        label: label.into(),
        cells: selected.iter().map(|r| cell(*r)).collect(),
    }
}

fn yes_no(flag: Option<bool>) -> &'static str {
    if flag.unwrap_or(false) {
        "是"
    } else {
        "否"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareRow {
    pub label: String,
    /// One cell per selected record, in selection order.
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareTable {
    pub headers: Vec<String>,
    pub rows: Vec<CompareRow>,
}

impl CompareTable {
    pub fn build(selected: &[&CommunityRecord]) -> Self {
        let mut rows = vec![
            row("区域 / 片区", selected, |r| r.location_label()),
            row("建成年份", selected, |r| {
                or_dash(r.build.as_ref().and_then(|b| b.build_year_range.clone()))
            }),
            row("参考单价（万/㎡）", selected, |r| {
                or_dash(r.price.as_ref().and_then(|p| p.ref_wan_per_sqm))
            }),
            row("参考总价（万）", selected, |r| {
                or_dash(r.price.as_ref().and_then(|p| p.ref_total_wan_range.clone()))
            }),
            row("最近地铁", selected, nearest_metro_label),
            row("泳池 / 儿童乐园 / 人车分流", selected, |r| {
                let p = r.property.clone().unwrap_or_default();
                [p.has_pool, p.has_kids_playground, p.has_separation_ped_car]
                    .map(yes_no)
                    .join(" / ")
            }),
            row("物业费", selected, |r| {
                or_dash(
                    r.property
                        .as_ref()
                        .and_then(|p| p.management_fee.as_ref())
                        .and_then(|m| m.cny_per_sqm_month_range.clone()),
                )
            }),
            row("停车月租", selected, |r| {
                or_dash(
                    r.property
                        .as_ref()
                        .and_then(|p| p.parking.as_ref())
                        .and_then(|p| p.monthly_rent_cny_range.clone()),
                )
            }),
            row("车位价格（万）", selected, |r| {
                or_dash(
                    r.property
                        .as_ref()
                        .and_then(|p| p.parking.as_ref())
                        .and_then(|p| p.spot_price_wan_range.clone()),
                )
            }),
        ];
        for range in AreaRange::ALL {
            rows.push(row(format!("主供面积段 {range}"), selected, |r| {
                main_supply_by_range(r, range)
            }));
        }

        Self {
            headers: selected.iter().map(|r| r.name_zh.clone()).collect(),
            rows,
        }
    }
}

/// Bar-chart data: one category per selected record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub title: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    fn over(
        title: String,
        selected: &[&CommunityRecord],
        value: impl Fn(&CommunityRecord) -> Option<f64>,
    ) -> Self {
        Self {
            title,
            categories: selected.iter().map(|r| r.name_zh.clone()).collect(),
            values: selected.iter().map(|r| value(*r).unwrap_or(0.0)).collect(),
        }
    }
}

pub fn price_series(selected: &[&CommunityRecord]) -> ChartSeries {
    ChartSeries::over("参考单价（万/㎡）".to_string(), selected, |r| {
        r.price.as_ref().and_then(|p| p.ref_wan_per_sqm)
    })
}

pub fn metro_series(selected: &[&CommunityRecord]) -> ChartSeries {
    ChartSeries::over("最近地铁距离（m）".to_string(), selected, nearest_metro_distance)
}

/// Distance to the first named target across the selection.
///
/// `None` when no record lists a target with an id, or every distance is 0.
pub fn target_series(selected: &[&CommunityRecord]) -> Option<ChartSeries> {
    let first = selected
        .iter()
        .flat_map(|r| r.targets())
        .find(|t| t.id.as_deref().is_some_and(|id| !id.is_empty()))?;
    let target_id = first.id.as_deref()?;
    let label = first
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(target_id);

    let series = ChartSeries::over(format!("{label} 距离（m）"), selected, |r| {
        r.targets()
            .iter()
            .find(|t| t.id.as_deref() == Some(target_id))
            .and_then(|t| t.distance_m)
    });
    if series.values.iter().all(|v| *v == 0.0) {
        None
    } else {
        Some(series)
    }
}

/// Everything the comparison view shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonView {
    pub ids: Vec<String>,
    pub table: CompareTable,
    pub charts: Vec<ChartSeries>,
}

impl ComparisonView {
    /// Resolve the selection and build the view; fewer than two known ids is an error.
    pub fn build(
        selection: &CompareSelection,
        records: &[CommunityRecord],
    ) -> Result<Self, CompareError> {
        let selected = selection.resolve(records);
        if selected.len() < MIN_COMPARE_COUNT {
            return Err(CompareError::TooFew {
                min: MIN_COMPARE_COUNT,
                got: selected.len(),
            });
        }

        let mut charts = vec![price_series(&selected), metro_series(&selected)];
        charts.extend(target_series(&selected));
        Ok(Self {
            ids: selected.iter().map(|r| r.id.clone()).collect(),
            table: CompareTable::build(&selected),
            charts,
        })
    }
}
