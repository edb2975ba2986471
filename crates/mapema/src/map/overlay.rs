//! Traffic overlay construction.
//!
//! Each segment becomes a GeoJSON line feature carrying its classification
//! and the color derived from it. The layer paints with the per-feature
//! color directly, so there is no fallback color for an unknown class.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::model::TrafficSegment;

/// Source id of the traffic overlay.
pub const TRAFFIC_SOURCE_ID: &str = "traffic";

/// Layer id of the traffic overlay.
pub const TRAFFIC_LAYER_ID: &str = "traffic-layer";

/// Width of traffic lines in pixels.
pub const TRAFFIC_LINE_WIDTH: f64 = 6.0;

/// Opacity of traffic lines.
pub const TRAFFIC_LINE_OPACITY: f64 = 0.8;

/// A named GeoJSON data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonSource {
    /// Source id layers refer to.
    pub id: String,
    /// A GeoJSON `FeatureCollection`.
    pub data: Value,
}

impl GeoJsonSource {
    /// Number of features in the collection.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.data
            .get("features")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

/// How line ends and joins are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    /// Rounded.
    Round,
}

/// A line layer drawing a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineLayer {
    /// Layer id.
    pub id: String,
    /// Id of the source being drawn.
    pub source: String,
    /// Join style.
    pub line_join: LineStyle,
    /// Cap style.
    pub line_cap: LineStyle,
    /// Color expression evaluated per feature.
    pub line_color: Value,
    /// Width in pixels.
    pub line_width: f64,
    /// Opacity between 0 and 1.
    pub line_opacity: f64,
}

/// Build the traffic source from road segments.
#[must_use]
pub fn traffic_source(segments: &[TrafficSegment]) -> GeoJsonSource {
    let features: Vec<Value> = segments
        .iter()
        .map(|segment| {
            let coordinates: Vec<[f64; 2]> = segment
                .path
                .iter()
                .map(|point| [point.lng(), point.lat()])
                .collect();
            json!({
                "type": "Feature",
                "properties": {
                    "name": segment.name,
                    "congestion": segment.congestion.to_string(),
                    "color": segment.congestion.color(),
                },
                "geometry": {
                    "type": "LineString",
                    "coordinates": coordinates,
                },
            })
        })
        .collect();

    GeoJsonSource {
        id: TRAFFIC_SOURCE_ID.to_string(),
        data: json!({
            "type": "FeatureCollection",
            "features": features,
        }),
    }
}

/// Build the traffic line layer.
#[must_use]
pub fn traffic_layer() -> LineLayer {
    LineLayer {
        id: TRAFFIC_LAYER_ID.to_string(),
        source: TRAFFIC_SOURCE_ID.to_string(),
        line_join: LineStyle::Round,
        line_cap: LineStyle::Round,
        line_color: json!(["get", "color"]),
        line_width: TRAFFIC_LINE_WIDTH,
        line_opacity: TRAFFIC_LINE_OPACITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Classification, LngLat};

    fn segments() -> Vec<TrafficSegment> {
        vec![
            TrafficSegment {
                name: "Uhuru Highway".to_string(),
                congestion: Classification::Congested,
                path: vec![LngLat(36.8165, -1.2921), LngLat(36.8265, -1.2871)],
            },
            TrafficSegment {
                name: "Thika Road".to_string(),
                congestion: Classification::Clear,
                path: vec![LngLat(36.8419, -1.2621), LngLat(36.8519, -1.2521)],
            },
        ]
    }

    #[test]
    fn test_traffic_source_features() {
        let source = traffic_source(&segments());
        assert_eq!(source.id, "traffic");
        assert_eq!(source.feature_count(), 2);
        assert_eq!(source.data["type"], "FeatureCollection");

        let first = &source.data["features"][0];
        assert_eq!(first["properties"]["name"], "Uhuru Highway");
        assert_eq!(first["properties"]["congestion"], "congested");
        assert_eq!(first["properties"]["color"], "#ef4444");
        assert_eq!(first["geometry"]["type"], "LineString");
        assert_eq!(first["geometry"]["coordinates"][1][0], 36.8265);
    }

    #[test]
    fn test_feature_color_follows_classification() {
        let source = traffic_source(&segments());
        for (feature, segment) in source.data["features"]
            .as_array()
            .unwrap()
            .iter()
            .zip(segments())
        {
            assert_eq!(feature["properties"]["color"], segment.congestion.color());
        }
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(traffic_source(&[]).feature_count(), 0);
    }

    #[test]
    fn test_traffic_layer_has_no_fallback_color() {
        let layer = traffic_layer();
        assert_eq!(layer.id, "traffic-layer");
        assert_eq!(layer.source, "traffic");
        assert_eq!(layer.line_color, json!(["get", "color"]));
        assert!((layer.line_width - 6.0).abs() < f64::EPSILON);
        assert!((layer.line_opacity - 0.8).abs() < f64::EPSILON);
    }
}
