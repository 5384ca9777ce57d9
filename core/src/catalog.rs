// Launch site catalog
//
// Distinct launch sites in first-appearance order, behind an "ALL" sentinel.

use crate::dataset::LaunchRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Sentinel dropdown value meaning "no site filter"
pub const ALL_SITES: &str = "ALL";
pub const ALL_SITES_LABEL: &str = "All Sites";

/// Dropdown entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteOption {
    pub label: String,
    pub value: String,
}

impl SiteOption {
    pub fn all() -> Self {
        Self {
            label: ALL_SITES_LABEL.to_string(),
            value: ALL_SITES.to_string(),
        }
    }

    pub fn site(name: &str) -> Self {
        Self {
            label: name.to_string(),
            value: name.to_string(),
        }
    }
}

/// Ordered dropdown options; the sentinel is always first
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SiteCatalog {
    options: Vec<SiteOption>,
}

impl SiteCatalog {
    pub fn from_records(records: &[LaunchRecord]) -> Self {
        let mut seen = HashSet::new();
        let mut options = vec![SiteOption::all()];
        for record in records {
            if seen.insert(record.launch_site.as_str()) {
                options.push(SiteOption::site(&record.launch_site));
            }
        }
        Self { options }
    }

    pub fn options(&self) -> &[SiteOption] {
        &self.options
    }

    /// Real site names, without the sentinel
    pub fn sites(&self) -> impl Iterator<Item = &str> {
        self.options.iter().skip(1).map(|o| o.value.as_str())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// Parsed dropdown value
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SiteSelection {
    #[default]
    All,
    Site(String),
}

impl SiteSelection {
    pub fn from_value(value: &str) -> Self {
        if value == ALL_SITES {
            SiteSelection::All
        } else {
            SiteSelection::Site(value.to_string())
        }
    }

    pub fn matches(&self, launch_site: &str) -> bool {
        match self {
            SiteSelection::All => true,
            SiteSelection::Site(site) => site == launch_site,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SiteSelection::All => ALL_SITES,
            SiteSelection::Site(site) => site,
        }
    }
}

impl fmt::Display for SiteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}
