//! Core data types for mapema.
//!
//! This module defines the records shown by the routes browser, the alerts
//! list and the live map, together with the closed vocabularies they use.
//! Every vocabulary parses strictly: an unknown value is an error, never a
//! silent default.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Congestion level of a road segment or route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Traffic is flowing freely.
    Clear,
    /// Traffic is slowed.
    Moderate,
    /// Traffic is heavy.
    Congested,
}

impl Classification {
    /// Every classification, in display order.
    pub const ALL: [Self; 3] = [Self::Clear, Self::Moderate, Self::Congested];

    /// The color family this classification is rendered with.
    #[must_use]
    pub fn family(self) -> ColorFamily {
        match self {
            Self::Clear => ColorFamily::Green,
            Self::Moderate => ColorFamily::Amber,
            Self::Congested => ColorFamily::Red,
        }
    }

    /// The line color used on the map overlay.
    #[must_use]
    pub fn color(self) -> &'static str {
        self.family().hex()
    }

    /// Human-readable label for summary tiles and legends.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Moderate => "Moderate",
            Self::Congested => "Congested",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clear => write!(f, "clear"),
            Self::Moderate => write!(f, "moderate"),
            Self::Congested => write!(f, "congested"),
        }
    }
}

impl FromStr for Classification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "clear" => Ok(Self::Clear),
            "moderate" => Ok(Self::Moderate),
            "congested" => Ok(Self::Congested),
            other => Err(Error::UnknownClassification {
                value: other.to_string(),
            }),
        }
    }
}

/// Palette families shared by every view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFamily {
    /// Good news.
    Green,
    /// Caution.
    Amber,
    /// Trouble.
    Red,
    /// Neutral brand color for informational items.
    Primary,
}

impl ColorFamily {
    /// Hex color for this family.
    #[must_use]
    pub fn hex(self) -> &'static str {
        match self {
            Self::Green => "#22c55e",
            Self::Amber => "#f59e0b",
            Self::Red => "#ef4444",
            Self::Primary => "#0ea5e9",
        }
    }
}

/// Kind of traffic alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    /// Accidents, breakdowns, flooding.
    Incident,
    /// Scheduled road works.
    Roadwork,
    /// Planned events causing closures.
    Event,
    /// General announcements.
    Info,
}

impl AlertCategory {
    /// Every category, in filter-chip order.
    pub const ALL: [Self; 4] = [Self::Incident, Self::Roadwork, Self::Event, Self::Info];
}

impl std::fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incident => write!(f, "incident"),
            Self::Roadwork => write!(f, "roadwork"),
            Self::Event => write!(f, "event"),
            Self::Info => write!(f, "info"),
        }
    }
}

impl FromStr for AlertCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "incident" => Ok(Self::Incident),
            "roadwork" => Ok(Self::Roadwork),
            "event" => Ok(Self::Event),
            "info" => Ok(Self::Info),
            other => Err(Error::UnknownValue {
                kind: "alert category",
                value: other.to_string(),
            }),
        }
    }
}

/// How serious an alert is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Major disruption.
    High,
    /// Noticeable delays.
    Medium,
    /// Informational.
    Low,
}

impl Severity {
    /// The color family an active alert of this severity is rendered with.
    #[must_use]
    pub fn family(self) -> ColorFamily {
        match self {
            Self::High => ColorFamily::Red,
            Self::Medium => ColorFamily::Amber,
            Self::Low => ColorFamily::Primary,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Whether an alert still applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Still affecting traffic.
    Active,
    /// Cleared.
    Resolved,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

/// A `[longitude, latitude]` pair, in the order map widgets expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat(pub f64, pub f64);

impl LngLat {
    /// Longitude in degrees.
    #[must_use]
    pub fn lng(self) -> f64 {
        self.0
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn lat(self) -> f64 {
        self.1
    }
}

/// A named road segment drawn as a colored line on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSegment {
    /// Road name.
    pub name: String,
    /// Current congestion level.
    pub congestion: Classification,
    /// Ordered points along the road.
    pub path: Vec<LngLat>,
}

/// A named transit hub drawn as a marker with a popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitHub {
    /// Hub name shown in the popup.
    pub name: String,
    /// Marker position.
    pub position: LngLat,
}

/// A public transport route shown in the routes browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Stable identifier.
    pub id: u32,
    /// Display name, e.g. `Route 23`.
    pub name: String,
    /// Where the route starts.
    pub origin: String,
    /// Where the route ends.
    pub destination: String,
    /// Distance label, e.g. `8.5 km`.
    pub distance: String,
    /// Average travel time label.
    pub avg_time: String,
    /// Fare label.
    pub fare: String,
    /// Current congestion along the route.
    pub status: Classification,
    /// Number of operators serving the route.
    pub operators: u32,
    /// Rider rating out of five.
    pub rating: f32,
}

/// A traffic alert shown in the alerts list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Stable identifier.
    pub id: u32,
    /// What kind of alert this is.
    pub category: AlertCategory,
    /// How serious it is.
    pub severity: Severity,
    /// Headline.
    pub title: String,
    /// Details.
    pub description: String,
    /// Where it happens.
    pub location: String,
    /// Elapsed-time label, e.g. `15 min ago`.
    pub elapsed: String,
    /// Whether it still applies.
    pub status: AlertStatus,
}

impl AlertRecord {
    /// Check if the alert still applies.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// The color family the alert card is rendered with. Resolved alerts are muted.
    #[must_use]
    pub fn family(&self) -> Option<ColorFamily> {
        self.is_active().then(|| self.severity.family())
    }
}

/// A major road on the traffic status board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corridor {
    /// Road name.
    pub name: String,
    /// Current congestion level.
    pub status: Classification,
    /// Average travel time label.
    pub avg_time: String,
    /// Change in travel time versus usual, in percent.
    pub change_percent: i32,
}

impl Corridor {
    /// Signed percent change label, e.g. `+15%`, `-10%`, `0%`.
    #[must_use]
    pub fn change_label(&self) -> String {
        if self.change_percent > 0 {
            format!("+{}%", self.change_percent)
        } else {
            format!("{}%", self.change_percent)
        }
    }
}

/// A prefilled origin/destination pair offered as a search shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularRoute {
    /// Origin to prefill.
    pub origin: String,
    /// Destination to prefill.
    pub destination: String,
    /// Typical travel time label.
    pub time: String,
    /// Fare label.
    pub fare: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_display_round_trips_from_str() {
        for class in Classification::ALL {
            assert_eq!(class.to_string().parse::<Classification>().unwrap(), class);
        }
    }

    #[test]
    fn test_classification_unknown_fails() {
        let err = "heavy".parse::<Classification>().unwrap_err();
        assert!(matches!(err, Error::UnknownClassification { ref value } if value == "heavy"));
    }

    #[test]
    fn test_classification_deserialize_unknown_fails() {
        let result: std::result::Result<Classification, _> = serde_json::from_str("\"gridlock\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_classification_colors() {
        assert_eq!(Classification::Clear.color(), "#22c55e");
        assert_eq!(Classification::Moderate.color(), "#f59e0b");
        assert_eq!(Classification::Congested.color(), "#ef4444");
    }

    #[test]
    fn test_classification_families_are_distinct() {
        assert_eq!(Classification::Clear.family(), ColorFamily::Green);
        assert_eq!(Classification::Moderate.family(), ColorFamily::Amber);
        assert_eq!(Classification::Congested.family(), ColorFamily::Red);
    }

    #[test]
    fn test_severity_shares_palette_with_classification() {
        assert_eq!(Severity::High.family(), Classification::Congested.family());
        assert_eq!(Severity::Medium.family(), Classification::Moderate.family());
        assert_eq!(Severity::Low.family(), ColorFamily::Primary);
    }

    #[test]
    fn test_alert_category_from_str() {
        assert_eq!("roadwork".parse::<AlertCategory>().unwrap(), AlertCategory::Roadwork);
        assert!("parade".parse::<AlertCategory>().is_err());
    }

    #[test]
    fn test_resolved_alert_is_muted() {
        let mut alert = AlertRecord {
            id: 1,
            category: AlertCategory::Incident,
            severity: Severity::High,
            title: "Stalled truck".to_string(),
            description: String::new(),
            location: "Thika Road".to_string(),
            elapsed: "6 hours ago".to_string(),
            status: AlertStatus::Active,
        };
        assert_eq!(alert.family(), Some(ColorFamily::Red));

        alert.status = AlertStatus::Resolved;
        assert_eq!(alert.family(), None);
    }

    #[test]
    fn test_lng_lat_serializes_as_pair() {
        let json = serde_json::to_string(&LngLat(36.8219, -1.2921)).unwrap();
        assert_eq!(json, "[36.8219,-1.2921]");
    }

    #[test]
    fn test_corridor_change_label() {
        let mut corridor = Corridor {
            name: "Thika Road".to_string(),
            status: Classification::Clear,
            avg_time: "20 min".to_string(),
            change_percent: -10,
        };
        assert_eq!(corridor.change_label(), "-10%");
        corridor.change_percent = 15;
        assert_eq!(corridor.change_label(), "+15%");
        corridor.change_percent = 0;
        assert_eq!(corridor.change_label(), "0%");
    }
}
