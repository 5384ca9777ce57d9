// Dashboard view model
//
// Plain declarative description of the page: title, site dropdown, pie
// placeholder, payload range slider and scatter placeholder. The browser
// builds its controls from the serialized form of this structure.

use crate::binder::{InputId, OutputId};
use crate::catalog::{SiteCatalog, SiteOption, ALL_SITES};
use crate::dataset::Dataset;
use crate::scatter::PayloadRange;
use serde::{Deserialize, Serialize};

pub const DASHBOARD_TITLE: &str = "SpaceX Launch Records Dashboard";
pub const DROPDOWN_PLACEHOLDER: &str = "Select a Launch Site here";
pub const PAYLOAD_PROMPT: &str = "Payload range (Kg):";

pub const SLIDER_MIN: f64 = 0.0;
pub const SLIDER_MAX: f64 = 10_000.0;
pub const SLIDER_STEP: f64 = 1_000.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub text_align: String,
    pub color: String,
    pub font_size: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliderMark {
    pub value: f64,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Component {
    Heading {
        text: String,
        style: TextStyle,
    },
    Dropdown {
        id: String,
        options: Vec<SiteOption>,
        value: String,
        placeholder: String,
        searchable: bool,
    },
    Break,
    Paragraph {
        text: String,
    },
    RangeSlider {
        id: String,
        min: f64,
        max: f64,
        step: f64,
        value: [f64; 2],
        marks: Vec<SliderMark>,
    },
    Graph {
        id: String,
    },
}

impl Component {
    pub fn id(&self) -> Option<&str> {
        match self {
            Component::Dropdown { id, .. }
            | Component::RangeSlider { id, .. }
            | Component::Graph { id } => Some(id.as_str()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub children: Vec<Component>,
}

impl Layout {
    pub fn build(dataset: &Dataset, catalog: &SiteCatalog) -> Self {
        let initial = slider_default(dataset);

        let children = vec![
            Component::Heading {
                text: DASHBOARD_TITLE.to_string(),
                style: TextStyle {
                    text_align: "center".to_string(),
                    color: "#503D36".to_string(),
                    font_size: 40,
                },
            },
            Component::Dropdown {
                id: InputId::SiteDropdown.as_str().to_string(),
                options: catalog.options().to_vec(),
                value: ALL_SITES.to_string(),
                placeholder: DROPDOWN_PLACEHOLDER.to_string(),
                searchable: true,
            },
            Component::Break,
            Component::Graph {
                id: OutputId::SuccessPie.as_str().to_string(),
            },
            Component::Break,
            Component::Paragraph {
                text: PAYLOAD_PROMPT.to_string(),
            },
            Component::RangeSlider {
                id: InputId::PayloadSlider.as_str().to_string(),
                min: SLIDER_MIN,
                max: SLIDER_MAX,
                step: SLIDER_STEP,
                value: [initial.low, initial.high],
                marks: slider_marks(),
            },
            Component::Graph {
                id: OutputId::PayloadScatter.as_str().to_string(),
            },
        ];

        Self { children }
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.children.iter().find(|c| c.id() == Some(id))
    }
}

/// Initial slider value: the observed payload bounds, even when they fall
/// outside the slider's fixed `[SLIDER_MIN, SLIDER_MAX]` track. An empty
/// table falls back to the full track.
pub fn slider_default(dataset: &Dataset) -> PayloadRange {
    match dataset.payload_bounds() {
        Some((min, max)) => PayloadRange::new(min, max),
        None => PayloadRange::new(SLIDER_MIN, SLIDER_MAX),
    }
}

fn slider_marks() -> Vec<SliderMark> {
    (0..=10)
        .map(|i| {
            let value = SLIDER_MIN + SLIDER_STEP * i as f64;
            SliderMark {
                value,
                label: format!("{}", value as u64),
            }
        })
        .collect()
}
