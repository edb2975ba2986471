//! Read-only data sources for routes, alerts, road segments and hubs.
//!
//! Views never reach for data directly; they take a [`DataProvider`]. The
//! built-in [`Dataset::seed`] stands in until a real data service exists, and
//! [`Dataset::load`] swaps in a JSON file without touching filter or map code.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{
    AlertCategory, AlertRecord, AlertStatus, Classification, Corridor, LngLat, PopularRoute,
    RouteRecord, Severity, TrafficSegment, TransitHub,
};

/// A narrow, read-only source of the collections the views render.
pub trait DataProvider {
    /// Public transport routes.
    fn routes(&self) -> &[RouteRecord];

    /// Traffic alerts.
    fn alerts(&self) -> &[AlertRecord];

    /// Road segments for the map overlay.
    fn segments(&self) -> &[TrafficSegment];

    /// Transit hubs for map markers.
    fn hubs(&self) -> &[TransitHub];

    /// Major roads on the traffic status board.
    fn corridors(&self) -> &[Corridor];

    /// Search shortcuts.
    fn popular_routes(&self) -> &[PopularRoute];
}

/// An in-memory set of every collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Dataset {
    /// Public transport routes.
    pub routes: Vec<RouteRecord>,
    /// Traffic alerts.
    pub alerts: Vec<AlertRecord>,
    /// Road segments for the map overlay.
    pub segments: Vec<TrafficSegment>,
    /// Transit hubs for map markers.
    pub hubs: Vec<TransitHub>,
    /// Major roads on the traffic status board.
    pub corridors: Vec<Corridor>,
    /// Search shortcuts.
    pub popular_routes: Vec<PopularRoute>,
}

impl DataProvider for Dataset {
    fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    fn alerts(&self) -> &[AlertRecord] {
        &self.alerts
    }

    fn segments(&self) -> &[TrafficSegment] {
        &self.segments
    }

    fn hubs(&self) -> &[TransitHub] {
        &self.hubs
    }

    fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }

    fn popular_routes(&self) -> &[PopularRoute] {
        &self.popular_routes
    }
}

impl Dataset {
    /// Load a dataset from a JSON file.
    ///
    /// Unknown classifications or categories in the file are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading dataset from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| Error::DataLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let dataset: Self = serde_json::from_str(&raw).map_err(|e| Error::DataLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        info!(
            routes = dataset.routes.len(),
            alerts = dataset.alerts.len(),
            segments = dataset.segments.len(),
            hubs = dataset.hubs.len(),
            "Dataset loaded from {}",
            path.display()
        );
        Ok(dataset)
    }

    /// Load from `path` if given, otherwise use the built-in seed.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is given and loading it fails.
    pub fn load_or_seed(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::seed()),
        }
    }

    /// The built-in Nairobi sample data.
    #[must_use]
    pub fn seed() -> Self {
        Self {
            routes: seed_routes(),
            alerts: seed_alerts(),
            segments: seed_segments(),
            hubs: seed_hubs(),
            corridors: seed_corridors(),
            popular_routes: seed_popular_routes(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn route(
    id: u32,
    name: &str,
    origin: &str,
    destination: &str,
    distance: &str,
    avg_time: &str,
    fare: &str,
    status: Classification,
    operators: u32,
    rating: f32,
) -> RouteRecord {
    RouteRecord {
        id,
        name: name.to_string(),
        origin: origin.to_string(),
        destination: destination.to_string(),
        distance: distance.to_string(),
        avg_time: avg_time.to_string(),
        fare: fare.to_string(),
        status,
        operators,
        rating,
    }
}

fn seed_routes() -> Vec<RouteRecord> {
    use Classification::{Clear, Congested, Moderate};
    vec![
        route(1, "Route 23", "CBD", "Westlands", "8.5 km", "25 min", "KSh 50", Clear, 45, 4.5),
        route(2, "Route 58", "CBD", "Karen", "18 km", "45 min", "KSh 100", Moderate, 32, 4.2),
        route(3, "Route 111", "Westlands", "JKIA", "22 km", "50 min", "KSh 150", Congested, 28, 3.8),
        route(4, "Route 45", "CBD", "Thika Town", "45 km", "1h 15min", "KSh 200", Clear, 65, 4.6),
        route(5, "Route 17", "Eastleigh", "CBD", "6 km", "20 min", "KSh 40", Moderate, 52, 4.0),
        route(6, "Route 33", "CBD", "Ngong", "25 km", "55 min", "KSh 120", Congested, 38, 3.9),
    ]
}

#[allow(clippy::too_many_arguments)]
fn alert(
    id: u32,
    category: AlertCategory,
    severity: Severity,
    title: &str,
    description: &str,
    location: &str,
    elapsed: &str,
    status: AlertStatus,
) -> AlertRecord {
    AlertRecord {
        id,
        category,
        severity,
        title: title.to_string(),
        description: description.to_string(),
        location: location.to_string(),
        elapsed: elapsed.to_string(),
        status,
    }
}

fn seed_alerts() -> Vec<AlertRecord> {
    use AlertCategory::{Event, Incident, Info, Roadwork};
    use AlertStatus::{Active, Resolved};
    use Severity::{High, Low, Medium};
    vec![
        alert(
            1,
            Incident,
            High,
            "Major Accident - Uhuru Highway",
            "Multi-vehicle collision near Kenyatta Avenue junction. Two lanes blocked. Emergency services on scene.",
            "Uhuru Highway, near Kenyatta Ave",
            "15 min ago",
            Active,
        ),
        alert(
            2,
            Roadwork,
            Medium,
            "Road Works - Ngong Road",
            "Scheduled road repairs in progress. Single lane operating between Adams Arcade and Prestige Plaza.",
            "Ngong Road, Adams Arcade",
            "1 hour ago",
            Active,
        ),
        alert(
            3,
            Event,
            Medium,
            "Marathon Event - CBD",
            "Nairobi Marathon this Sunday. Multiple road closures expected in CBD and surrounding areas.",
            "CBD, Uhuru Gardens",
            "2 hours ago",
            Active,
        ),
        alert(
            4,
            Incident,
            High,
            "Flooding - Mombasa Road",
            "Heavy rain causing flooding near JKIA. Vehicles advised to use alternative routes.",
            "Mombasa Road, near JKIA",
            "3 hours ago",
            Active,
        ),
        alert(
            5,
            Info,
            Low,
            "New Bus Stop - Westlands",
            "New bus stop operational at Sarit Centre. Additional routes now serving this location.",
            "Westlands, Sarit Centre",
            "5 hours ago",
            Active,
        ),
        alert(
            6,
            Incident,
            Medium,
            "Broken Down Vehicle - Thika Road",
            "Stalled truck removed from outer lane. Traffic flow resuming to normal.",
            "Thika Road, Kasarani",
            "6 hours ago",
            Resolved,
        ),
    ]
}

fn segment(name: &str, congestion: Classification, path: &[(f64, f64)]) -> TrafficSegment {
    TrafficSegment {
        name: name.to_string(),
        congestion,
        path: path.iter().map(|&(lng, lat)| LngLat(lng, lat)).collect(),
    }
}

fn seed_segments() -> Vec<TrafficSegment> {
    use Classification::{Clear, Congested, Moderate};
    vec![
        segment(
            "Uhuru Highway",
            Congested,
            &[(36.8165, -1.2921), (36.8265, -1.2871), (36.8365, -1.2821)],
        ),
        segment(
            "Mombasa Road",
            Moderate,
            &[(36.8319, -1.3021), (36.8419, -1.3121), (36.8519, -1.3221)],
        ),
        segment(
            "Thika Road",
            Clear,
            &[(36.8419, -1.2621), (36.8519, -1.2521), (36.8619, -1.2421)],
        ),
        segment(
            "Ngong Road",
            Congested,
            &[(36.7919, -1.2921), (36.7819, -1.2971), (36.7719, -1.3021)],
        ),
        segment(
            "Waiyaki Way",
            Moderate,
            &[(36.7919, -1.2721), (36.7719, -1.2681), (36.7519, -1.2641)],
        ),
    ]
}

fn seed_hubs() -> Vec<TransitHub> {
    [
        ("CBD", 36.8219, -1.2864),
        ("JKIA", 36.9277, -1.3195),
        ("Westlands", 36.8048, -1.2673),
        ("Karen", 36.7126, -1.3197),
    ]
    .into_iter()
    .map(|(name, lng, lat)| TransitHub {
        name: name.to_string(),
        position: LngLat(lng, lat),
    })
    .collect()
}

fn seed_corridors() -> Vec<Corridor> {
    use Classification::{Clear, Congested, Moderate};
    [
        ("Uhuru Highway", Congested, "45 min", 15),
        ("Mombasa Road", Moderate, "35 min", 5),
        ("Thika Road", Clear, "20 min", -10),
        ("Ngong Road", Congested, "40 min", 20),
        ("Waiyaki Way", Moderate, "30 min", 0),
    ]
    .into_iter()
    .map(|(name, status, avg_time, change_percent)| Corridor {
        name: name.to_string(),
        status,
        avg_time: avg_time.to_string(),
        change_percent,
    })
    .collect()
}

fn seed_popular_routes() -> Vec<PopularRoute> {
    [
        ("CBD", "Westlands", "25 min", "KSh 50"),
        ("CBD", "Karen", "45 min", "KSh 100"),
        ("Westlands", "JKIA", "40 min", "KSh 150"),
    ]
    .into_iter()
    .map(|(origin, destination, time, fare)| PopularRoute {
        origin: origin.to_string(),
        destination: destination.to_string(),
        time: time.to_string(),
        fare: fare.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::filter::{active_alert_count, count_by_status, is_high_traffic};

    #[test]
    fn test_seed_sizes() {
        let data = Dataset::seed();
        assert_eq!(data.routes().len(), 6);
        assert_eq!(data.alerts().len(), 6);
        assert_eq!(data.segments().len(), 5);
        assert_eq!(data.hubs().len(), 4);
        assert_eq!(data.corridors().len(), 5);
        assert_eq!(data.popular_routes().len(), 3);
    }

    #[test]
    fn test_seed_route_ids_are_unique() {
        let data = Dataset::seed();
        let ids: BTreeSet<_> = data.routes().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), data.routes().len());
    }

    #[test]
    fn test_seed_has_five_active_alerts() {
        assert_eq!(active_alert_count(Dataset::seed().alerts()), 5);
    }

    #[test]
    fn test_seed_corridors_trigger_banner() {
        let data = Dataset::seed();
        let counts = count_by_status(data.corridors(), |c| c.status);
        assert_eq!(counts[&Classification::Congested], 2);
        assert!(is_high_traffic(data.corridors()));
    }

    #[test]
    fn test_seed_segments_have_paths() {
        for segment in Dataset::seed().segments() {
            assert!(segment.path.len() >= 2, "{} has no path", segment.name);
        }
    }

    #[test]
    fn test_dataset_json_shape() {
        let json = serde_json::to_string(&Dataset::seed()).unwrap();
        let parsed: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.routes[0].name, "Route 23");
        assert_eq!(parsed.hubs[1].name, "JKIA");
    }

    #[test]
    fn test_dataset_rejects_unknown_classification() {
        let json = r#"{"segments": [{"name": "A104", "congestion": "heavy", "path": []}]}"#;
        assert!(serde_json::from_str::<Dataset>(json).is_err());
    }

    #[test]
    fn test_dataset_missing_sections_default_empty() {
        let parsed: Dataset = serde_json::from_str(r#"{"hubs": []}"#).unwrap();
        assert!(parsed.routes.is_empty());
        assert!(parsed.alerts.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Dataset::load("/nonexistent/seed.json").unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }

    #[test]
    fn test_load_or_seed_without_path() {
        assert_eq!(Dataset::load_or_seed(None).unwrap(), Dataset::seed());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("mapema-seed-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&Dataset::seed()).unwrap()).unwrap();
        let loaded = Dataset::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.routes.len(), 6);
    }
}
