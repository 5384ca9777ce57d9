// Chart figure model
//
// Serializes to the `{data, layout}` shape Plotly renders directly in the browser.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: FigureLayout,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Pie {
        labels: Vec<String>,
        values: Vec<u64>,
    },
    Scatter {
        name: String,
        mode: String,
        x: Vec<f64>,
        y: Vec<u8>,
    },
}

impl Trace {
    pub fn markers(name: &str, x: Vec<f64>, y: Vec<u8>) -> Self {
        Trace::Scatter {
            name: name.to_string(),
            mode: "markers".to_string(),
            x,
            y,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: Title,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub title: Title,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FigureLayout {
    pub title: Title,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
}

impl FigureLayout {
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Title::new(text),
            xaxis: None,
            yaxis: None,
            legend: None,
        }
    }
}
