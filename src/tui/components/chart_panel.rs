//! Modification time series panel
//!
//! The same points drawn three ways: a braille line chart, a sparkline
//! "area" and a bar chart. An empty series gets an explicit empty state
//! instead of an axis-only chart.

use super::render_placeholder;
use crate::api::ModificationPoint;
use crate::tui::theme::Theme;
use crate::views::dashboard::{axis_label, summary, CAPTION, EMPTY_MESSAGE, TITLE};
use crate::views::{ChartKind, DashboardState, SeriesContent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols,
    text::Line,
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, Paragraph, Sparkline, Tabs},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, state: &DashboardState, theme: &Theme, spinner: char) {
    let [tabs_area, chart_area, caption_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(area);

    let tabs = Tabs::new(ChartKind::all().iter().map(|k| k.label()))
        .select(state.chart().index())
        .style(theme.muted_style())
        .highlight_style(theme.selected_style())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(false))
                .title(" Chart (Tab) "),
        );
    f.render_widget(tabs, tabs_area);

    match state.content() {
        SeriesContent::Loading => render_placeholder(
            f,
            chart_area,
            TITLE,
            &format!("{} Loading modifications…", spinner),
            theme.muted_style(),
            theme,
        ),
        SeriesContent::Empty => {
            render_placeholder(f, chart_area, TITLE, EMPTY_MESSAGE, theme.muted_style(), theme)
        }
        SeriesContent::Failed(message) => {
            render_placeholder(f, chart_area, TITLE, message, theme.error_style(), theme)
        }
        SeriesContent::Ready(points) => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(true))
                .title(chart_title(points));
            match state.chart() {
                ChartKind::Line => render_line(f, chart_area, points, block, theme),
                ChartKind::Area => render_area(f, chart_area, points, block, theme),
                ChartKind::Bar => render_bars(f, chart_area, points, block, theme),
            }
        }
    }

    f.render_widget(
        Paragraph::new(format!(" {}", CAPTION)).style(theme.muted_style()),
        caption_area,
    );
}

fn chart_title(points: &[ModificationPoint]) -> String {
    match summary(points) {
        Some((min, max, latest)) => {
            format!(" {} · min {} · max {} · latest {} ", TITLE, min, max, latest)
        }
        None => format!(" {} ", TITLE),
    }
}

fn y_ceiling(points: &[ModificationPoint]) -> f64 {
    let max = points.iter().map(|p| p.count).max().unwrap_or(0) as f64;
    (max * 1.1).ceil().max(1.0)
}

fn render_line(
    f: &mut Frame,
    area: Rect,
    points: &[ModificationPoint],
    block: Block,
    theme: &Theme,
) {
    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.count as f64))
        .collect();
    let max_x = (points.len().saturating_sub(1)).max(1) as f64;
    let top = y_ceiling(points);

    // First, middle and last dates keep the axis readable
    let mut x_labels: Vec<String> = Vec::new();
    if let Some(first) = points.first() {
        x_labels.push(axis_label(first));
    }
    if points.len() > 2 {
        x_labels.push(axis_label(&points[points.len() / 2]));
    }
    if points.len() > 1 {
        if let Some(last) = points.last() {
            x_labels.push(axis_label(last));
        }
    }

    let dataset = Dataset::default()
        .name("modifications")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.chart))
        .data(&coords);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(theme.muted_style())
                .bounds([0.0, max_x])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.muted_style())
                .bounds([0.0, top])
                .labels(vec!["0".to_string(), format!("{}", top as u64)]),
        );
    f.render_widget(chart, area);
}

fn render_area(
    f: &mut Frame,
    area: Rect,
    points: &[ModificationPoint],
    block: Block,
    theme: &Theme,
) {
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [spark_area, label_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    let counts: Vec<u64> = points.iter().map(|p| p.count).collect();
    let sparkline = Sparkline::default()
        .data(&counts)
        .max(y_ceiling(points) as u64)
        .style(Style::default().fg(theme.chart));
    f.render_widget(sparkline, spark_area);

    let first = points.first().map(axis_label).unwrap_or_default();
    let last = points.last().map(axis_label).unwrap_or_default();
    let gap = (label_area.width as usize).saturating_sub(first.len() + last.len());
    f.render_widget(
        Paragraph::new(Line::styled(
            format!("{}{}{}", first, " ".repeat(gap), last),
            theme.muted_style(),
        )),
        label_area,
    );
}

fn render_bars(
    f: &mut Frame,
    area: Rect,
    points: &[ModificationPoint],
    block: Block,
    theme: &Theme,
) {
    let labels: Vec<String> = points.iter().map(axis_label).collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .map(String::as_str)
        .zip(points.iter().map(|p| p.count))
        .collect();

    let inner_width = area.width.saturating_sub(2) as usize;
    let n = points.len().max(1);
    let bar_width = (inner_width / n).saturating_sub(1).clamp(3, 9) as u16;

    let chart = BarChart::default()
        .block(block)
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme.chart))
        .value_style(theme.selected_style())
        .label_style(theme.muted_style());
    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::FetchResult;
    use chrono::NaiveDate;
    use ratatui::{backend::TestBackend, Terminal};

    fn two_points() -> Vec<ModificationPoint> {
        vec![
            ModificationPoint {
                date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                count: 2,
            },
            ModificationPoint {
                date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
                count: 5,
            },
        ]
    }

    fn loaded(points: Vec<ModificationPoint>) -> DashboardState {
        let (mut state, ticket) = DashboardState::mount();
        state.apply(FetchResult::new(ticket, Ok(points)));
        state
    }

    fn draw(state: &DashboardState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|f| render(f, f.area(), state, &Theme::default(), '*'))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn line_and_bar_draw_the_same_points() {
        let mut state = loaded(two_points());
        let line = draw(&state);
        assert!(line.contains("4/1"));
        assert!(line.contains("4/2"));
        assert!(line.contains("latest 5"));

        state.set_chart(ChartKind::Bar);
        let bars = draw(&state);
        assert!(bars.contains("4/1"));
        assert!(bars.contains("4/2"));
        assert!(bars.contains("latest 5"));
    }

    #[test]
    fn empty_series_renders_empty_state() {
        let state = loaded(Vec::new());
        let screen = draw(&state);
        assert!(screen.contains(EMPTY_MESSAGE));
        assert!(!screen.contains("min"));
    }

    #[test]
    fn area_chart_labels_the_ends() {
        let mut state = loaded(two_points());
        state.set_chart(ChartKind::Area);
        let screen = draw(&state);
        assert!(screen.contains("4/1"));
        assert!(screen.contains("4/2"));
    }
}
