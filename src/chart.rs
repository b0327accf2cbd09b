//! Declarative chart descriptions
//!
//! Turns already-aggregated numbers into a renderer-agnostic structure:
//! chart type, axis bindings, per-point labels and static style. No
//! aggregation happens here. The browser page maps these onto Plotly
//! traces, but nothing in the structure is Plotly-specific.

use crate::aggregate::AggregationResult;
use serde::Serialize;

/// Which of the three dashboard charts to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Analyzed count per city, horizontal bars
    CityBars,
    /// Analyzed count per partner, line with markers
    PartnerLine,
    /// Percentage share per partner, vertical bars
    PartnerShare,
}

/// Geometry of the marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    HorizontalBar,
    LineWithMarkers,
    VerticalBar,
}

/// One plotted point; `category` is always the categorical axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub category: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    /// Fixed [min, max]; autoscaled when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl Axis {
    fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            range: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartStyle {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_size: Option<u32>,
    /// Where per-point labels sit relative to the mark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_position: Option<String>,
    pub font_color: String,
    pub plot_background: String,
    pub paper_background: String,
    pub margin: Margin,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub points: Vec<ChartPoint>,
    pub style: ChartStyle,
}

const TRANSPARENT: &str = "rgba(0,0,0,0)";
const FONT_COLOR: &str = "white";

fn chart_type(kind: ChartKind) -> ChartType {
    match kind {
        ChartKind::CityBars => ChartType::HorizontalBar,
        ChartKind::PartnerLine => ChartType::LineWithMarkers,
        ChartKind::PartnerShare => ChartType::VerticalBar,
    }
}

fn chart_title(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::CityBars => "Análisis por Ciudad",
        ChartKind::PartnerLine => "Análisis por Aliado",
        ChartKind::PartnerShare => "Distribución Porcentual por Aliado",
    }
}

fn chart_color(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::CityBars => "#1f77b4",     // Blue
        ChartKind::PartnerLine => "#ff7f0e",  // Orange
        ChartKind::PartnerShare => "#2ca02c", // Green
    }
}

fn axes(kind: ChartKind) -> (Axis, Axis) {
    match kind {
        ChartKind::CityBars => (Axis::titled("Cantidad"), Axis::titled("")),
        ChartKind::PartnerLine => (Axis::titled("Aliado"), Axis::titled("Cantidad")),
        ChartKind::PartnerShare => (
            Axis::titled(""),
            Axis {
                title: "Porcentaje (%)".to_string(),
                range: Some([0.0, 100.0]),
            },
        ),
    }
}

fn style(kind: ChartKind) -> ChartStyle {
    let (line_width, marker_size, text_position) = match kind {
        ChartKind::PartnerLine => (Some(3), Some(10), None),
        _ => (None, None, Some("outside".to_string())),
    };
    let (bottom, height) = match kind {
        ChartKind::PartnerShare => (100, 500),
        _ => (50, 400),
    };

    ChartStyle {
        color: chart_color(kind).to_string(),
        line_width,
        marker_size,
        text_position,
        font_color: FONT_COLOR.to_string(),
        plot_background: TRANSPARENT.to_string(),
        paper_background: TRANSPARENT.to_string(),
        margin: Margin {
            l: 20,
            r: 20,
            t: 50,
            b: bottom,
        },
        height,
    }
}

/// Percentage label with one decimal place
pub fn format_share(share: f64) -> String {
    format!("{:.1}%", share)
}

fn points(result: &AggregationResult, kind: ChartKind) -> Vec<ChartPoint> {
    result
        .groups
        .iter()
        .map(|g| match kind {
            ChartKind::CityBars => ChartPoint {
                category: g.key.clone(),
                value: g.analisis as f64,
                label: Some(g.analisis.to_string()),
            },
            ChartKind::PartnerLine => ChartPoint {
                category: g.key.clone(),
                value: g.analisis as f64,
                label: None,
            },
            ChartKind::PartnerShare => {
                let share = g.share.unwrap_or(0.0);
                ChartPoint {
                    category: g.key.clone(),
                    value: share,
                    label: Some(format_share(share)),
                }
            }
        })
        .collect()
}

/// Build the chart description for an aggregation result
pub fn build(result: &AggregationResult, kind: ChartKind) -> ChartSpec {
    let (x_axis, y_axis) = axes(kind);
    ChartSpec {
        chart_type: chart_type(kind),
        title: chart_title(kind).to_string(),
        x_axis,
        y_axis,
        points: points(result, kind),
        style: style(kind),
    }
}

impl ChartSpec {
    /// A chart with no data and no styling, used when a recompute fails
    pub fn empty() -> Self {
        Self {
            chart_type: ChartType::VerticalBar,
            title: String::new(),
            x_axis: Axis::titled(""),
            y_axis: Axis::titled(""),
            points: vec![],
            style: ChartStyle {
                color: String::new(),
                line_width: None,
                marker_size: None,
                text_position: None,
                font_color: FONT_COLOR.to_string(),
                plot_background: TRANSPARENT.to_string(),
                paper_background: TRANSPARENT.to_string(),
                margin: Margin { l: 20, r: 20, t: 50, b: 50 },
                height: 400,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::GroupSum;
    use crate::dataset::Dimension;

    fn result(share: bool) -> AggregationResult {
        AggregationResult {
            dimension: Dimension::Aliado,
            groups: vec![
                GroupSum {
                    key: "A".to_string(),
                    analisis: 150,
                    share: share.then_some(150.0 / 530.0 * 100.0),
                },
                GroupSum {
                    key: "B".to_string(),
                    analisis: 380,
                    share: share.then_some(380.0 / 530.0 * 100.0),
                },
            ],
        }
    }

    #[test]
    fn test_city_bars() {
        let spec = build(&result(false), ChartKind::CityBars);
        assert_eq!(spec.chart_type, ChartType::HorizontalBar);
        assert_eq!(spec.title, "Análisis por Ciudad");
        assert_eq!(spec.x_axis.title, "Cantidad");
        assert_eq!(spec.points[1].value, 380.0);
        assert_eq!(spec.points[1].label.as_deref(), Some("380"));
        assert_eq!(spec.style.text_position.as_deref(), Some("outside"));
        assert_eq!(spec.style.height, 400);
    }

    #[test]
    fn test_partner_line() {
        let spec = build(&result(false), ChartKind::PartnerLine);
        assert_eq!(spec.chart_type, ChartType::LineWithMarkers);
        assert_eq!(spec.y_axis.title, "Cantidad");
        assert_eq!(spec.style.line_width, Some(3));
        assert_eq!(spec.style.marker_size, Some(10));
        assert!(spec.points.iter().all(|p| p.label.is_none()));
    }

    #[test]
    fn test_partner_share() {
        let spec = build(&result(true), ChartKind::PartnerShare);
        assert_eq!(spec.chart_type, ChartType::VerticalBar);
        assert_eq!(spec.y_axis.range, Some([0.0, 100.0]));
        assert_eq!(spec.points[0].label.as_deref(), Some("28.3%"));
        assert_eq!(spec.points[1].label.as_deref(), Some("71.7%"));
        assert_eq!(spec.style.margin.b, 100);
        assert_eq!(spec.style.height, 500);
    }

    #[test]
    fn test_empty_result_builds_empty_chart() {
        let empty = AggregationResult {
            dimension: Dimension::Ciudad,
            groups: vec![],
        };
        let spec = build(&empty, ChartKind::CityBars);
        assert!(spec.points.is_empty());
        assert_eq!(spec.title, "Análisis por Ciudad");
    }

    #[test]
    fn test_spec_serializes_type_field() {
        let spec = build(&result(true), ChartKind::PartnerShare);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "vertical_bar");
        assert_eq!(json["y_axis"]["range"][1], 100.0);
        assert!(json["x_axis"].get("range").is_none());
    }

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(0.0), "0.0%");
        assert_eq!(format_share(100.0), "100.0%");
        assert_eq!(format_share(15.04), "15.0%");
    }
}
