//! Map widget boundary and lifecycle control.
//!
//! The external map widget is reached only through [`MapBackend`], an opaque
//! capability offering construction, controls, sources and layers, markers
//! with popups, and disposal. [`MapController`] owns the one live widget per
//! mounted container and enforces the call order around its one-shot ready
//! signal.

mod controller;
pub mod overlay;
pub mod recording;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::trace;

use crate::credential::Credential;
use crate::model::LngLat;

pub use controller::{MapController, MapHandle};
pub use overlay::{GeoJsonSource, LineLayer};

/// Default map style.
pub const DEFAULT_STYLE: &str = "mapbox://styles/mapbox/dark-v11";

/// Default map center: Nairobi CBD.
pub const DEFAULT_CENTER: LngLat = LngLat(36.8219, -1.2921);

/// Default zoom level.
pub const DEFAULT_ZOOM: f64 = 12.0;

/// Default camera pitch in degrees.
pub const DEFAULT_PITCH: f64 = 45.0;

/// Popup offset in pixels above a hub marker.
pub const POPUP_OFFSET: u32 = 25;

/// Errors reported by a map widget backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// The widget could not be constructed.
    #[error("widget construction failed: {0}")]
    Construction(String),

    /// The widget rejected an operation.
    #[error("widget rejected operation: {0}")]
    Rejected(String),

    /// The widget id is not known to the backend.
    #[error("unknown widget {0}")]
    UnknownWidget(u64),
}

/// Identifier of a DOM-like surface a widget is mounted into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend-assigned identifier of a constructed widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WidgetId(pub u64);

/// Backend-assigned identifier of a placed marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

/// Initial camera and style of a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// Style URL.
    pub style: String,
    /// Initial center.
    pub center: LngLat,
    /// Initial zoom level.
    pub zoom: f64,
    /// Initial camera pitch in degrees.
    pub pitch: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            pitch: DEFAULT_PITCH,
        }
    }
}

/// Options a map surface is initialized with.
///
/// A change to any of these requires a teardown and re-initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapOptions {
    /// Camera and style.
    pub view: MapView,
    /// Whether navigation and geolocation controls are added.
    pub show_controls: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            view: MapView::default(),
            show_controls: true,
        }
    }
}

/// Where on the map a control is docked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlPosition {
    /// Top right corner.
    TopRight,
}

/// A map control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Control {
    /// Zoom and compass buttons.
    Navigation {
        /// Tilt the compass to show pitch.
        visualize_pitch: bool,
    },
    /// Locate-me button.
    Geolocate {
        /// Ask for a high-accuracy fix.
        enable_high_accuracy: bool,
        /// Keep following the user.
        track_user_location: bool,
        /// Show the user's heading.
        show_user_heading: bool,
    },
}

impl Control {
    /// The controls added when `show_controls` is set, in order.
    #[must_use]
    pub fn defaults() -> [(Self, ControlPosition); 2] {
        [
            (
                Self::Navigation {
                    visualize_pitch: true,
                },
                ControlPosition::TopRight,
            ),
            (
                Self::Geolocate {
                    enable_high_accuracy: true,
                    track_user_location: true,
                    show_user_heading: true,
                },
                ControlPosition::TopRight,
            ),
        ]
    }
}

/// Label shown when a marker is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popup {
    /// Pixel offset above the marker.
    pub offset: u32,
    /// Bold first line.
    pub title: String,
    /// Muted second line.
    pub subtitle: String,
}

/// An interactive point marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Where the marker sits.
    pub position: LngLat,
    /// Popup attached to the marker.
    pub popup: Popup,
}

/// One-shot sender a backend fires when its widget has finished loading.
///
/// Consuming `self` makes a second notification impossible. Once the
/// controller has torn the widget down nobody is listening and the
/// notification is dropped.
#[derive(Debug)]
pub struct ReadyNotifier {
    generation: u64,
    tx: oneshot::Sender<u64>,
}

impl ReadyNotifier {
    pub(crate) fn channel(generation: u64) -> (Self, oneshot::Receiver<u64>) {
        let (tx, rx) = oneshot::channel();
        (Self { generation, tx }, rx)
    }

    /// Signal readiness. Returns whether a live controller received it.
    pub fn notify(self) -> bool {
        let delivered = self.tx.send(self.generation).is_ok();
        trace!(generation = self.generation, delivered, "Ready signal sent");
        delivered
    }

    /// Whether the controller side has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Capability surface of an external interactive map widget.
///
/// Implementations absorb every detail of the vendor API. All calls happen
/// on the UI thread.
pub trait MapBackend {
    /// Construct a widget inside `container`.
    ///
    /// The backend keeps `ready` and fires it once style and tiles have loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget cannot be constructed.
    fn create(
        &mut self,
        container: &ContainerId,
        credential: &Credential,
        view: &MapView,
        ready: ReadyNotifier,
    ) -> Result<WidgetId, WidgetError>;

    /// Dock a control on the widget.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget rejects the control.
    fn add_control(
        &mut self,
        widget: WidgetId,
        control: &Control,
        position: ControlPosition,
    ) -> Result<(), WidgetError>;

    /// Register a geojson data source.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget rejects the source.
    fn add_source(&mut self, widget: WidgetId, source: &GeoJsonSource) -> Result<(), WidgetError>;

    /// Add a line layer drawing a registered source.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget rejects the layer.
    fn add_layer(&mut self, widget: WidgetId, layer: &LineLayer) -> Result<(), WidgetError>;

    /// Place a marker with its popup.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget rejects the marker.
    fn add_marker(&mut self, widget: WidgetId, marker: &Marker) -> Result<MarkerId, WidgetError>;

    /// Remove a previously placed marker.
    fn remove_marker(&mut self, widget: WidgetId, marker: MarkerId);

    /// Dispose of the widget and everything registered on it.
    fn remove(&mut self, widget: WidgetId);
}
