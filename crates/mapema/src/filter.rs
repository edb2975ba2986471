//! List filtering for the routes browser, alerts list and status boards.
//!
//! Everything here is a pure function over borrowed slices: results keep the
//! input order and hold references into the input, so filtering never copies
//! or mutates records.

use std::collections::BTreeMap;

use tracing::trace;

use crate::model::{AlertCategory, AlertRecord, AlertStatus, Classification, Corridor, PopularRoute, RouteRecord};

/// Number of congested corridors at which the high-traffic banner is shown.
pub const HIGH_TRAFFIC_THRESHOLD: usize = 2;

/// Count of items per classification.
///
/// Always holds an entry for every [`Classification`], zero included.
pub type StatusCounts = BTreeMap<Classification, usize>;

/// Case-insensitive substring match. An empty needle matches everything.
fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

/// Filter routes by free-text query and optional status chip.
///
/// A route is kept when the query is empty or matches its name, origin or
/// destination case-insensitively, and when no status is selected or the
/// route's status equals the selected one.
#[must_use]
pub fn filter_routes<'a>(
    routes: &'a [RouteRecord],
    query: &str,
    status_filter: Option<Classification>,
) -> Vec<&'a RouteRecord> {
    let needle = query.to_lowercase();
    let kept: Vec<_> = routes
        .iter()
        .filter(|route| {
            let matches_query = contains_ignore_case(&route.name, &needle)
                || contains_ignore_case(&route.origin, &needle)
                || contains_ignore_case(&route.destination, &needle);
            let matches_status = status_filter.map_or(true, |status| route.status == status);
            matches_query && matches_status
        })
        .collect();

    trace!(
        query,
        status = ?status_filter,
        total = routes.len(),
        kept = kept.len(),
        "Filtered routes"
    );
    kept
}

/// Filter alerts by optional category chip, hiding resolved alerts unless asked.
#[must_use]
pub fn filter_alerts(
    alerts: &[AlertRecord],
    type_filter: Option<AlertCategory>,
    include_resolved: bool,
) -> Vec<&AlertRecord> {
    alerts
        .iter()
        .filter(|alert| type_filter.map_or(true, |category| alert.category == category))
        .filter(|alert| include_resolved || alert.status == AlertStatus::Active)
        .collect()
}

/// Count items per classification, reading the classification with `field`.
///
/// Classifications with no matching items are present with a count of zero.
#[must_use]
pub fn count_by_status<T, F>(collection: &[T], field: F) -> StatusCounts
where
    F: Fn(&T) -> Classification,
{
    let mut counts: StatusCounts = Classification::ALL.iter().map(|c| (*c, 0)).collect();
    for item in collection {
        *counts.entry(field(item)).or_insert(0) += 1;
    }
    counts
}

/// Number of alerts that are still active, for the header badge.
#[must_use]
pub fn active_alert_count(alerts: &[AlertRecord]) -> usize {
    alerts.iter().filter(|alert| alert.is_active()).count()
}

/// Whether enough corridors are congested to show the high-traffic banner.
#[must_use]
pub fn is_high_traffic(corridors: &[Corridor]) -> bool {
    let counts = count_by_status(corridors, |corridor| corridor.status);
    counts[&Classification::Congested] >= HIGH_TRAFFIC_THRESHOLD
}

/// Origin/destination search form state.
///
/// Results are only shown once both ends have been filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSearch {
    /// Where the trip starts.
    pub origin: String,
    /// Where the trip ends.
    pub destination: String,
    submitted: bool,
}

impl RouteSearch {
    /// Create an empty search form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill both ends from a popular-route shortcut.
    pub fn apply_popular(&mut self, popular: &PopularRoute) {
        self.origin.clone_from(&popular.origin);
        self.destination.clone_from(&popular.destination);
    }

    /// Submit the form. Returns whether results are now shown.
    pub fn submit(&mut self) -> bool {
        if !self.origin.trim().is_empty() && !self.destination.trim().is_empty() {
            self.submitted = true;
        }
        self.submitted
    }

    /// Whether results are shown.
    #[must_use]
    pub fn shows_results(&self) -> bool {
        self.submitted
    }

    /// Routes serving this origin/destination pair, in input order.
    ///
    /// Empty until the form has been submitted.
    #[must_use]
    pub fn results<'a>(&self, routes: &'a [RouteRecord]) -> Vec<&'a RouteRecord> {
        if !self.submitted {
            return Vec::new();
        }
        let origin = self.origin.trim().to_lowercase();
        let destination = self.destination.trim().to_lowercase();
        routes
            .iter()
            .filter(|route| {
                contains_ignore_case(&route.origin, &origin)
                    && contains_ignore_case(&route.destination, &destination)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn route(id: u32, name: &str, origin: &str, destination: &str, status: Classification) -> RouteRecord {
        RouteRecord {
            id,
            name: name.to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            distance: "10 km".to_string(),
            avg_time: "30 min".to_string(),
            fare: "KSh 50".to_string(),
            status,
            operators: 10,
            rating: 4.0,
        }
    }

    fn alert(id: u32, category: AlertCategory, status: AlertStatus) -> AlertRecord {
        AlertRecord {
            id,
            category,
            severity: Severity::Medium,
            title: format!("Alert {id}"),
            description: String::new(),
            location: "CBD".to_string(),
            elapsed: "1 hour ago".to_string(),
            status,
        }
    }

    fn sample_routes() -> Vec<RouteRecord> {
        vec![
            route(1, "Route 23", "CBD", "Westlands", Classification::Clear),
            route(2, "Route 58", "CBD", "Karen", Classification::Moderate),
            route(3, "Route 111", "Westlands", "JKIA", Classification::Congested),
            route(4, "Route 17", "Eastleigh", "CBD", Classification::Moderate),
        ]
    }

    fn sample_alerts() -> Vec<AlertRecord> {
        vec![
            alert(1, AlertCategory::Incident, AlertStatus::Active),
            alert(2, AlertCategory::Roadwork, AlertStatus::Active),
            alert(3, AlertCategory::Incident, AlertStatus::Resolved),
            alert(4, AlertCategory::Event, AlertStatus::Active),
        ]
    }

    fn ids<T, F: Fn(&T) -> u32>(items: &[&T], id: F) -> Vec<u32> {
        items.iter().map(|item| id(item)).collect()
    }

    #[test]
    fn test_filter_routes_status_only() {
        let routes = vec![
            route(23, "Route 23", "CBD", "Westlands", Classification::Clear),
            route(58, "Route 58", "CBD", "Karen", Classification::Moderate),
        ];
        let result = filter_routes(&routes, "", Some(Classification::Clear));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Route 23");
    }

    #[test]
    fn test_filter_routes_empty_query_keeps_all() {
        let routes = sample_routes();
        let result = filter_routes(&routes, "", None);
        assert_eq!(ids(&result, |r: &RouteRecord| r.id), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_filter_routes_query_is_case_insensitive() {
        let routes = sample_routes();
        let result = filter_routes(&routes, "wEsTlAnDs", None);
        assert_eq!(ids(&result, |r: &RouteRecord| r.id), vec![1, 3]);
    }

    #[test]
    fn test_filter_routes_matches_name_origin_and_destination() {
        let routes = sample_routes();
        assert_eq!(ids(&filter_routes(&routes, "111", None), |r: &RouteRecord| r.id), vec![3]);
        assert_eq!(ids(&filter_routes(&routes, "eastleigh", None), |r: &RouteRecord| r.id), vec![4]);
        assert_eq!(ids(&filter_routes(&routes, "karen", None), |r: &RouteRecord| r.id), vec![2]);
    }

    #[test]
    fn test_filter_routes_preserves_order() {
        let routes = sample_routes();
        let result = filter_routes(&routes, "cbd", None);
        assert_eq!(ids(&result, |r: &RouteRecord| r.id), vec![1, 2, 4]);
    }

    #[test]
    fn test_filter_routes_combines_query_and_status() {
        let routes = sample_routes();
        let result = filter_routes(&routes, "cbd", Some(Classification::Moderate));
        assert_eq!(ids(&result, |r: &RouteRecord| r.id), vec![2, 4]);
    }

    #[test]
    fn test_filter_routes_no_match() {
        let routes = sample_routes();
        assert!(filter_routes(&routes, "Mombasa", None).is_empty());
    }

    #[test]
    fn test_filter_alerts_hides_resolved() {
        let alerts = sample_alerts();
        let result = filter_alerts(&alerts, None, false);
        assert_eq!(ids(&result, |a: &AlertRecord| a.id), vec![1, 2, 4]);
        assert!(result.iter().all(|a| a.status == AlertStatus::Active));
    }

    #[test]
    fn test_filter_alerts_include_resolved_returns_all() {
        let alerts = sample_alerts();
        let result = filter_alerts(&alerts, None, true);
        assert_eq!(result.len(), alerts.len());
    }

    #[test]
    fn test_filter_alerts_by_category() {
        let alerts = sample_alerts();
        let active = filter_alerts(&alerts, Some(AlertCategory::Incident), false);
        assert_eq!(ids(&active, |a: &AlertRecord| a.id), vec![1]);

        let all = filter_alerts(&alerts, Some(AlertCategory::Incident), true);
        assert_eq!(ids(&all, |a: &AlertRecord| a.id), vec![1, 3]);

        assert!(filter_alerts(&alerts, Some(AlertCategory::Info), true).is_empty());
    }

    #[test]
    fn test_count_by_status_empty_has_every_key() {
        let routes: Vec<RouteRecord> = Vec::new();
        let counts = count_by_status(&routes, |r| r.status);
        assert_eq!(counts.len(), Classification::ALL.len());
        for class in Classification::ALL {
            assert_eq!(counts.get(&class), Some(&0));
        }
    }

    #[test]
    fn test_count_by_status_counts() {
        let routes = sample_routes();
        let counts = count_by_status(&routes, |r| r.status);
        assert_eq!(counts[&Classification::Clear], 1);
        assert_eq!(counts[&Classification::Moderate], 2);
        assert_eq!(counts[&Classification::Congested], 1);
    }

    #[test]
    fn test_active_alert_count() {
        assert_eq!(active_alert_count(&sample_alerts()), 3);
        assert_eq!(active_alert_count(&[]), 0);
    }

    #[test]
    fn test_is_high_traffic() {
        let corridor = |status| Corridor {
            name: "Road".to_string(),
            status,
            avg_time: "30 min".to_string(),
            change_percent: 0,
        };
        assert!(!is_high_traffic(&[corridor(Classification::Congested), corridor(Classification::Clear)]));
        assert!(is_high_traffic(&[
            corridor(Classification::Congested),
            corridor(Classification::Congested),
        ]));
    }

    #[test]
    fn test_route_search_requires_both_ends() {
        let routes = sample_routes();
        let mut search = RouteSearch::new();
        search.origin = "CBD".to_string();
        assert!(!search.submit());
        assert!(search.results(&routes).is_empty());

        search.destination = "  ".to_string();
        assert!(!search.submit());

        search.destination = "karen".to_string();
        assert!(search.submit());
        assert_eq!(ids(&search.results(&routes), |r: &RouteRecord| r.id), vec![2]);
    }

    #[test]
    fn test_route_search_apply_popular() {
        let routes = sample_routes();
        let mut search = RouteSearch::new();
        search.apply_popular(&PopularRoute {
            origin: "Westlands".to_string(),
            destination: "JKIA".to_string(),
            time: "40 min".to_string(),
            fare: "KSh 150".to_string(),
        });
        assert!(!search.shows_results());
        assert!(search.submit());
        assert_eq!(ids(&search.results(&routes), |r: &RouteRecord| r.id), vec![3]);
    }
}
