// Reactive binder
//
// Wires control changes to chart recomputation. Subscriptions pair a set of
// input ids with one output id and a pure handler; dispatching an input
// change reruns every subscription listening to it and hands each result to
// an `OutputSink`, which replaces the rendered chart wholesale.

use crate::catalog::SiteSelection;
use crate::dataset::Dataset;
use crate::figure::Figure;
use crate::layout::slider_default;
use crate::pie::{aggregate_pie, PieSpec};
use crate::scatter::{filter_scatter, PayloadRange, ScatterSpec};
use crate::{DashError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Controls that emit input events
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputId {
    #[serde(rename = "site-dropdown")]
    SiteDropdown,
    #[serde(rename = "payload-slider")]
    PayloadSlider,
}

impl InputId {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputId::SiteDropdown => "site-dropdown",
            InputId::PayloadSlider => "payload-slider",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "site-dropdown" => Some(InputId::SiteDropdown),
            "payload-slider" => Some(InputId::PayloadSlider),
            _ => None,
        }
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart placeholders that receive replacements
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputId {
    #[serde(rename = "success-pie-chart")]
    SuccessPie,
    #[serde(rename = "success-payload-scatter-chart")]
    PayloadScatter,
}

impl OutputId {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputId::SuccessPie => "success-pie-chart",
            OutputId::PayloadScatter => "success-payload-scatter-chart",
        }
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New value for one control
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Site(SiteSelection),
    Range(PayloadRange),
}

impl InputValue {
    pub fn input_id(&self) -> InputId {
        match self {
            InputValue::Site(_) => InputId::SiteDropdown,
            InputValue::Range(_) => InputId::PayloadSlider,
        }
    }

    /// Decode the JSON value a browser control sends.
    ///
    /// A cleared dropdown (`null`) selects all sites. Slider values must be a
    /// pair of numbers; a swapped pair is reordered.
    pub fn from_json(id: InputId, value: &Value) -> Result<Self> {
        match id {
            InputId::SiteDropdown => match value {
                Value::Null => Ok(InputValue::Site(SiteSelection::All)),
                Value::String(s) => Ok(InputValue::Site(SiteSelection::from_value(s))),
                other => Err(DashError::InvalidInput(format!(
                    "{} expects a string, got {}",
                    id, other
                ))),
            },
            InputId::PayloadSlider => {
                let pair = value
                    .as_array()
                    .filter(|a| a.len() == 2)
                    .and_then(|a| Some((a[0].as_f64()?, a[1].as_f64()?)))
                    .ok_or_else(|| {
                        DashError::InvalidInput(format!(
                            "{} expects [low, high], got {}",
                            id, value
                        ))
                    })?;
                Ok(InputValue::Range(PayloadRange::normalized(pair.0, pair.1)))
            }
        }
    }
}

/// Current control values for one dashboard session
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionState {
    pub site: SiteSelection,
    pub range: PayloadRange,
}

impl SelectionState {
    /// All sites, slider seeded with the dataset's payload bounds
    pub fn initial(dataset: &Dataset) -> Self {
        Self {
            site: SiteSelection::All,
            range: slider_default(dataset),
        }
    }

    /// Store a new control value, returning which control changed
    pub fn apply(&mut self, value: InputValue) -> InputId {
        let id = value.input_id();
        match value {
            InputValue::Site(site) => self.site = site,
            InputValue::Range(range) => self.range = range,
        }
        id
    }
}

/// Chart produced by a subscription handler
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Pie(PieSpec),
    Scatter(ScatterSpec),
}

impl ChartSpec {
    /// True for a valid but empty chart (no rows, or all-zero slices)
    pub fn is_empty(&self) -> bool {
        match self {
            ChartSpec::Pie(pie) => pie.is_empty(),
            ChartSpec::Scatter(scatter) => scatter.is_empty(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Pie(pie) => &pie.title,
            ChartSpec::Scatter(scatter) => &scatter.title,
        }
    }

    pub fn to_figure(&self) -> Figure {
        match self {
            ChartSpec::Pie(pie) => pie.to_figure(),
            ChartSpec::Scatter(scatter) => scatter.to_figure(),
        }
    }
}

/// Receives rendered charts for placeholders
pub trait OutputSink {
    fn replace_output(&self, target: OutputId, spec: ChartSpec);
}

type Handler = Box<dyn Fn(&Dataset, &SelectionState) -> ChartSpec + Send + Sync>;

struct Subscription {
    inputs: Vec<InputId>,
    output: OutputId,
    handler: Handler,
}

/// Registry of input → output subscriptions
#[derive(Default)]
pub struct Binder {
    subscriptions: Vec<Subscription>,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dashboard's wiring: dropdown → pie, dropdown or slider → scatter
    pub fn standard() -> Self {
        let mut binder = Self::new();
        binder
            .subscribe(&[InputId::SiteDropdown], OutputId::SuccessPie, update_pie)
            .subscribe(
                &[InputId::SiteDropdown, InputId::PayloadSlider],
                OutputId::PayloadScatter,
                update_scatter,
            );
        binder
    }

    pub fn subscribe<F>(&mut self, inputs: &[InputId], output: OutputId, handler: F) -> &mut Self
    where
        F: Fn(&Dataset, &SelectionState) -> ChartSpec + Send + Sync + 'static,
    {
        self.subscriptions.push(Subscription {
            inputs: inputs.to_vec(),
            output,
            handler: Box::new(handler),
        });
        self
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Outputs that depend on `input`, in registration order
    pub fn outputs_for(&self, input: InputId) -> Vec<OutputId> {
        self.subscriptions
            .iter()
            .filter(|s| s.inputs.contains(&input))
            .map(|s| s.output)
            .collect()
    }

    /// Rerun every subscription listening to `changed`
    pub fn dispatch(
        &self,
        dataset: &Dataset,
        state: &SelectionState,
        changed: InputId,
        sink: &dyn OutputSink,
    ) -> Vec<OutputId> {
        self.subscriptions
            .iter()
            .filter(|s| s.inputs.contains(&changed))
            .map(|s| Self::run(s, dataset, state, sink))
            .collect()
    }

    /// Run every subscription, used for the first paint of a session
    pub fn render_all(
        &self,
        dataset: &Dataset,
        state: &SelectionState,
        sink: &dyn OutputSink,
    ) -> Vec<OutputId> {
        self.subscriptions
            .iter()
            .map(|s| Self::run(s, dataset, state, sink))
            .collect()
    }

    fn run(
        sub: &Subscription,
        dataset: &Dataset,
        state: &SelectionState,
        sink: &dyn OutputSink,
    ) -> OutputId {
        let spec = (sub.handler)(dataset, state);
        debug!(
            target: "binder",
            output = %sub.output,
            site = %state.site,
            low = state.range.low,
            high = state.range.high,
            "Recomputed chart"
        );
        if spec.is_empty() {
            debug!(target: "binder", output = %sub.output, "Empty selection result");
        }
        sink.replace_output(sub.output, spec);
        sub.output
    }
}

pub fn update_pie(dataset: &Dataset, state: &SelectionState) -> ChartSpec {
    ChartSpec::Pie(aggregate_pie(dataset.records(), &state.site))
}

pub fn update_scatter(dataset: &Dataset, state: &SelectionState) -> ChartSpec {
    ChartSpec::Scatter(filter_scatter(dataset.records(), &state.site, state.range).spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cleared_dropdown_selects_all() {
        let value = InputValue::from_json(InputId::SiteDropdown, &Value::Null).unwrap();
        assert_eq!(value, InputValue::Site(SiteSelection::All));
    }

    #[test]
    fn slider_pair_is_reordered() {
        let value = InputValue::from_json(InputId::PayloadSlider, &json!([8000, 2000])).unwrap();
        assert_eq!(value, InputValue::Range(PayloadRange::new(2000.0, 8000.0)));
    }

    #[test]
    fn malformed_slider_value_is_rejected() {
        for bad in [json!(5), json!([1]), json!(["a", "b"]), json!([1, 2, 3])] {
            assert!(InputValue::from_json(InputId::PayloadSlider, &bad).is_err());
        }
        assert!(InputValue::from_json(InputId::SiteDropdown, &json!(3)).is_err());
    }

    #[test]
    fn input_ids_round_trip_through_strings() {
        for id in [InputId::SiteDropdown, InputId::PayloadSlider] {
            assert_eq!(InputId::parse(id.as_str()), Some(id));
        }
        assert_eq!(InputId::parse("nope"), None);
    }
}
