//! Modification time series dashboard
//!
//! The series is fetched once per mount. Switching the chart type only
//! changes how the same points are drawn.

use super::fetch::{Applied, FetchResult, FetchTicket, FetchTracker};
use crate::api::{ApiError, ModificationPoint};
use chrono::Datelike;

pub type SeriesTicket = FetchTicket<()>;
pub type SeriesResult = FetchResult<(), Vec<ModificationPoint>>;

pub const TITLE: &str = "Bug Modifications Over Time";
pub const CAPTION: &str = "Shows bug modifications over the past week";
pub const EMPTY_MESSAGE: &str = "No modification data available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Line,
    Area,
    Bar,
}

impl ChartKind {
    pub fn all() -> &'static [ChartKind] {
        &[ChartKind::Line, ChartKind::Area, ChartKind::Bar]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::Area => "Area",
            ChartKind::Bar => "Bar",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ChartKind::Line => 0,
            ChartKind::Area => 1,
            ChartKind::Bar => 2,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ChartKind::Line => ChartKind::Area,
            ChartKind::Area => ChartKind::Bar,
            ChartKind::Bar => ChartKind::Line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesContent {
    Loading,
    Empty,
    Ready(Vec<ModificationPoint>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    chart: ChartKind,
    content: SeriesContent,
    tracker: FetchTracker<()>,
}

impl DashboardState {
    pub fn mount() -> (Self, SeriesTicket) {
        let mut state = Self {
            chart: ChartKind::default(),
            content: SeriesContent::Loading,
            tracker: FetchTracker::default(),
        };
        let ticket = state.tracker.issue(());
        (state, ticket)
    }

    pub fn reload(&mut self) -> SeriesTicket {
        self.content = SeriesContent::Loading;
        self.tracker.issue(())
    }

    pub fn apply(&mut self, settled: SeriesResult) -> Applied {
        if !self.tracker.accept(&settled.ticket) {
            return Applied::Stale;
        }

        self.content = match settled.result {
            Ok(points) if points.is_empty() => SeriesContent::Empty,
            Ok(points) => SeriesContent::Ready(points),
            Err(ApiError::Unauthorized) => return Applied::Unauthorized,
            Err(e) => SeriesContent::Failed(e.user_message()),
        };
        Applied::Committed
    }

    /// Change the chart type; never issues a fetch
    pub fn set_chart(&mut self, chart: ChartKind) {
        self.chart = chart;
    }

    pub fn cycle_chart(&mut self) {
        self.chart = self.chart.next();
    }

    pub fn chart(&self) -> ChartKind {
        self.chart
    }

    pub fn content(&self) -> &SeriesContent {
        &self.content
    }

    pub fn points(&self) -> &[ModificationPoint] {
        match &self.content {
            SeriesContent::Ready(points) => points,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        self.tracker.in_flight()
    }
}

/// X axis label for a sample, `M/D`
pub fn axis_label(point: &ModificationPoint) -> String {
    format!("{}/{}", point.date.month(), point.date.day())
}

/// Min, max and latest count of a non-empty series
pub fn summary(points: &[ModificationPoint]) -> Option<(u64, u64, u64)> {
    let latest = points.last()?.count;
    let min = points.iter().map(|p| p.count).min()?;
    let max = points.iter().map(|p| p.count).max()?;
    Some((min, max, latest))
}
