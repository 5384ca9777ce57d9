// Scatter filtering
//
// Payload mass vs. outcome for one site (or all), restricted to an inclusive payload range.

use crate::catalog::SiteSelection;
use crate::dataset::LaunchRecord;
use crate::figure::{Axis, Figure, FigureLayout, Legend, Title, Trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const PAYLOAD_AXIS_TITLE: &str = "Payload Mass (kg)";
pub const OUTCOME_AXIS_TITLE: &str = "Outcome";
pub const BOOSTER_LEGEND_TITLE: &str = "Booster Version Category";

/// Inclusive payload interval `[low, high]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayloadRange {
    pub low: f64,
    pub high: f64,
}

impl PayloadRange {
    /// Takes the bounds as given. An inverted range matches nothing.
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Orders the endpoints so that `low <= high`
    pub fn normalized(a: f64, b: f64) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn contains(&self, payload_mass_kg: f64) -> bool {
        payload_mass_kg >= self.low && payload_mass_kg <= self.high
    }

    pub fn is_inverted(&self) -> bool {
        self.low > self.high
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub payload_mass_kg: f64,
    pub class: u8,
}

/// Points sharing one booster version category
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub category: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterSpec {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub series: Vec<ScatterSeries>,
}

impl ScatterSpec {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    pub fn to_figure(&self) -> Figure {
        let data = self
            .series
            .iter()
            .map(|s| {
                Trace::markers(
                    &s.category,
                    s.points.iter().map(|p| p.payload_mass_kg).collect(),
                    s.points.iter().map(|p| p.class).collect(),
                )
            })
            .collect();

        Figure {
            data,
            layout: FigureLayout {
                title: Title::new(self.title.clone()),
                xaxis: Some(Axis {
                    title: Title::new(self.x_title.clone()),
                }),
                yaxis: Some(Axis {
                    title: Title::new(self.y_title.clone()),
                }),
                legend: Some(Legend {
                    title: Title::new(BOOSTER_LEGEND_TITLE),
                }),
            },
        }
    }
}

/// Filtered rows together with the chart built from them
#[derive(Clone, Debug)]
pub struct ScatterView<'a> {
    pub records: Vec<&'a LaunchRecord>,
    pub spec: ScatterSpec,
}

pub fn filter_scatter<'a>(
    records: &'a [LaunchRecord],
    selected: &SiteSelection,
    range: PayloadRange,
) -> ScatterView<'a> {
    let matched: Vec<&LaunchRecord> = records
        .iter()
        .filter(|r| selected.matches(&r.launch_site) && range.contains(r.payload_mass_kg))
        .collect();

    // series follow first appearance of each category within the filtered rows
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut series: Vec<ScatterSeries> = Vec::new();
    for &record in &matched {
        let slot = *index
            .entry(record.booster_version_category.as_str())
            .or_insert_with(|| {
                series.push(ScatterSeries {
                    category: record.booster_version_category.clone(),
                    points: Vec::new(),
                });
                series.len() - 1
            });
        series[slot].points.push(ScatterPoint {
            payload_mass_kg: record.payload_mass_kg,
            class: record.outcome.class(),
        });
    }

    let title = match selected {
        SiteSelection::All => "Payload vs. Outcome for All Sites".to_string(),
        SiteSelection::Site(site) => format!("Payload vs. Outcome for {}", site),
    };

    ScatterView {
        records: matched,
        spec: ScatterSpec {
            title,
            x_title: PAYLOAD_AXIS_TITLE.to_string(),
            y_title: OUTCOME_AXIS_TITLE.to_string(),
            series,
        },
    }
}
