//! A map backend that records every call instead of drawing.
//!
//! Used to exercise the map lifecycle without a browser, both in tests and
//! by the `mapema map` command.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::trace;

use super::{
    Control, ControlPosition, ContainerId, GeoJsonSource, LineLayer, MapBackend, MapView, Marker,
    MarkerId, ReadyNotifier, WidgetError, WidgetId,
};
use crate::credential::Credential;
use crate::model::LngLat;

/// One call made against the widget boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum WidgetCall {
    /// A widget was constructed.
    Create {
        /// New widget id.
        widget: WidgetId,
        /// Container it was mounted into.
        container: ContainerId,
        /// Fingerprint of the credential used.
        credential: String,
        /// Initial center.
        center: LngLat,
        /// Initial zoom.
        zoom: f64,
    },
    /// A control was docked.
    AddControl {
        /// Target widget.
        widget: WidgetId,
        /// The control.
        control: Control,
        /// Where it was docked.
        position: ControlPosition,
    },
    /// A data source was registered.
    AddSource {
        /// Target widget.
        widget: WidgetId,
        /// Source id.
        source: String,
        /// Number of features in the source.
        features: usize,
    },
    /// A layer was added.
    AddLayer {
        /// Target widget.
        widget: WidgetId,
        /// Layer id.
        layer: String,
    },
    /// A marker was placed.
    AddMarker {
        /// Target widget.
        widget: WidgetId,
        /// Assigned marker id.
        id: MarkerId,
        /// The marker.
        marker: Marker,
    },
    /// A marker was removed.
    RemoveMarker {
        /// Target widget.
        widget: WidgetId,
        /// Removed marker id.
        id: MarkerId,
    },
    /// A widget was disposed.
    Remove {
        /// Disposed widget.
        widget: WidgetId,
    },
}

/// In-memory stand-in for a real map widget.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: Rc<RefCell<Vec<WidgetCall>>>,
    next_id: u64,
    live: BTreeMap<WidgetId, usize>,
    pending: Vec<(WidgetId, ReadyNotifier)>,
    fail_next_create: Option<String>,
    fail_next_layer: Option<String>,
    reject_controls: bool,
}

impl RecordingBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create` fail with `message`.
    pub fn fail_next_create(&mut self, message: impl Into<String>) {
        self.fail_next_create = Some(message.into());
    }

    /// Make the next `add_layer` fail with `message`.
    pub fn fail_next_layer(&mut self, message: impl Into<String>) {
        self.fail_next_layer = Some(message.into());
    }

    /// Make `add_control` fail.
    pub fn reject_controls(&mut self, reject: bool) {
        self.reject_controls = reject;
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<WidgetCall> {
        self.log.borrow().clone()
    }

    /// The call log, shared so it outlives the backend.
    #[must_use]
    pub fn shared_log(&self) -> Rc<RefCell<Vec<WidgetCall>>> {
        Rc::clone(&self.log)
    }

    /// Widgets constructed and not yet disposed.
    #[must_use]
    pub fn live_widgets(&self) -> Vec<WidgetId> {
        self.live.keys().copied().collect()
    }

    /// Markers currently placed across all live widgets.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.live.values().sum()
    }

    /// Signal readiness for every widget still loading.
    ///
    /// Returns how many signals reached a listener.
    pub fn fire_all_ready(&mut self) -> usize {
        self.pending
            .drain(..)
            .filter(|(_, notifier)| !notifier.is_closed())
            .map(|(_, notifier)| notifier.notify())
            .filter(|delivered| *delivered)
            .count()
    }

    /// Take the pending ready notifiers without firing them.
    pub fn take_notifiers(&mut self) -> Vec<ReadyNotifier> {
        self.pending.drain(..).map(|(_, notifier)| notifier).collect()
    }

    fn record(&self, call: WidgetCall) {
        trace!(?call, "Widget call");
        self.log.borrow_mut().push(call);
    }

    fn check_live(&self, widget: WidgetId) -> Result<(), WidgetError> {
        if self.live.contains_key(&widget) {
            Ok(())
        } else {
            Err(WidgetError::UnknownWidget(widget.0))
        }
    }
}

impl MapBackend for RecordingBackend {
    fn create(
        &mut self,
        container: &ContainerId,
        credential: &Credential,
        view: &MapView,
        ready: ReadyNotifier,
    ) -> Result<WidgetId, WidgetError> {
        if let Some(message) = self.fail_next_create.take() {
            return Err(WidgetError::Construction(message));
        }
        self.next_id += 1;
        let widget = WidgetId(self.next_id);
        self.live.insert(widget, 0);
        self.pending.push((widget, ready));
        self.record(WidgetCall::Create {
            widget,
            container: container.clone(),
            credential: credential.fingerprint(),
            center: view.center,
            zoom: view.zoom,
        });
        Ok(widget)
    }

    fn add_control(
        &mut self,
        widget: WidgetId,
        control: &Control,
        position: ControlPosition,
    ) -> Result<(), WidgetError> {
        self.check_live(widget)?;
        if self.reject_controls {
            return Err(WidgetError::Rejected("controls disabled".to_string()));
        }
        self.record(WidgetCall::AddControl {
            widget,
            control: control.clone(),
            position,
        });
        Ok(())
    }

    fn add_source(&mut self, widget: WidgetId, source: &GeoJsonSource) -> Result<(), WidgetError> {
        self.check_live(widget)?;
        self.record(WidgetCall::AddSource {
            widget,
            source: source.id.clone(),
            features: source.feature_count(),
        });
        Ok(())
    }

    fn add_layer(&mut self, widget: WidgetId, layer: &LineLayer) -> Result<(), WidgetError> {
        self.check_live(widget)?;
        if let Some(message) = self.fail_next_layer.take() {
            return Err(WidgetError::Rejected(message));
        }
        self.record(WidgetCall::AddLayer {
            widget,
            layer: layer.id.clone(),
        });
        Ok(())
    }

    fn add_marker(&mut self, widget: WidgetId, marker: &Marker) -> Result<MarkerId, WidgetError> {
        self.check_live(widget)?;
        self.next_id += 1;
        let id = MarkerId(self.next_id);
        if let Some(count) = self.live.get_mut(&widget) {
            *count += 1;
        }
        self.record(WidgetCall::AddMarker {
            widget,
            id,
            marker: marker.clone(),
        });
        Ok(id)
    }

    fn remove_marker(&mut self, widget: WidgetId, marker: MarkerId) {
        if let Some(count) = self.live.get_mut(&widget) {
            *count = count.saturating_sub(1);
        }
        self.record(WidgetCall::RemoveMarker { widget, id: marker });
    }

    fn remove(&mut self, widget: WidgetId) {
        self.live.remove(&widget);
        self.pending.retain(|(id, _)| *id != widget);
        self.record(WidgetCall::Remove { widget });
    }
}
