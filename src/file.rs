use crate::engine::ChartEngine;
use std::path::PathBuf;

/// One open dataset tab and its loading lifecycle.
pub struct DatasetTab {
    pub path: PathBuf,
    pub load_state: DatasetLoadState,
}

pub enum DatasetLoadState {
    Loading,
    Ready(Box<ChartTab>),
    Error(String),
}

/// A fully loaded dataset: the engine plus its load summary.
pub struct ChartTab {
    pub engine: ChartEngine,
    pub activity_total: usize,
    pub marker_total: usize,
    pub skipped: usize,
}

impl DatasetTab {
    pub fn title(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn chart(&self) -> Option<&ChartTab> {
        match &self.load_state {
            DatasetLoadState::Ready(chart) => Some(chart.as_ref()),
            _ => None,
        }
    }

    pub fn chart_mut(&mut self) -> Option<&mut ChartTab> {
        match &mut self.load_state {
            DatasetLoadState::Ready(chart) => Some(chart.as_mut()),
            _ => None,
        }
    }
}
