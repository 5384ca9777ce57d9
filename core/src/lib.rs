// Launch Dash Core Library
// Launch records dashboard: dataset, chart aggregation and reactive server

pub mod binder;
pub mod catalog;
pub mod dashboard;
pub mod dataset;
pub mod figure;
pub mod layout;
pub mod pie;
pub mod scatter;

// Export core types
pub use binder::{Binder, ChartSpec, InputId, InputValue, OutputId, OutputSink, SelectionState};
pub use catalog::{SiteCatalog, SiteOption, SiteSelection, ALL_SITES};
pub use dataset::{DataLoadError, Dataset, LaunchRecord, Outcome};
pub use figure::Figure;
pub use layout::Layout;
pub use pie::{aggregate_pie, PieSlice, PieSpec};
pub use scatter::{filter_scatter, PayloadRange, ScatterSpec, ScatterView};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Data load error: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
pub type Result<T> = std::result::Result<T, DashError>;
