// Pie aggregation
//
// ALL: successful launches per site. Single site: success vs. failure counts.

use crate::catalog::SiteSelection;
use crate::dataset::{LaunchRecord, Outcome};
use crate::figure::{Figure, FigureLayout, Trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const ALL_SITES_PIE_TITLE: &str = "Total Successful Launches by Site";
pub const SUCCESS_LABEL: &str = "Success";
pub const FAILURE_LABEL: &str = "Failure";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: u64,
}

impl PieSlice {
    fn new(label: &str, value: u64) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieSpec {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieSpec {
    /// Sum of all slice values
    pub fn total(&self) -> u64 {
        self.slices.iter().map(|s| s.value).sum()
    }

    /// True when there is nothing to draw (no slices or all zero)
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn value_of(&self, label: &str) -> Option<u64> {
        self.slices.iter().find(|s| s.label == label).map(|s| s.value)
    }

    pub fn to_figure(&self) -> Figure {
        Figure {
            data: vec![Trace::Pie {
                labels: self.slices.iter().map(|s| s.label.clone()).collect(),
                values: self.slices.iter().map(|s| s.value).collect(),
            }],
            layout: FigureLayout::titled(self.title.clone()),
        }
    }
}

pub fn aggregate_pie(records: &[LaunchRecord], selected: &SiteSelection) -> PieSpec {
    match selected {
        SiteSelection::All => successes_by_site(records),
        SiteSelection::Site(site) => site_outcomes(records, site),
    }
}

fn successes_by_site(records: &[LaunchRecord]) -> PieSpec {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut slices: Vec<PieSlice> = Vec::new();

    for record in records {
        let slot = *index.entry(record.launch_site.as_str()).or_insert_with(|| {
            slices.push(PieSlice::new(&record.launch_site, 0));
            slices.len() - 1
        });
        if record.outcome.is_success() {
            slices[slot].value += 1;
        }
    }

    PieSpec {
        title: ALL_SITES_PIE_TITLE.to_string(),
        slices,
    }
}

fn site_outcomes(records: &[LaunchRecord], site: &str) -> PieSpec {
    let (mut success, mut failure) = (0u64, 0u64);
    for record in records.iter().filter(|r| r.launch_site == site) {
        match record.outcome {
            Outcome::Success => success += 1,
            Outcome::Failure => failure += 1,
        }
    }

    PieSpec {
        title: format!("Success vs. Failure for {}", site),
        slices: vec![
            PieSlice::new(SUCCESS_LABEL, success),
            PieSlice::new(FAILURE_LABEL, failure),
        ],
    }
}
