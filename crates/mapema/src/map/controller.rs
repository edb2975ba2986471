//! Lifecycle control of a single map widget.
//!
//! A controller holds at most one live widget. Every `initialize` first
//! releases whatever was there, and every release drops the ready receiver,
//! so a ready signal from an older widget can never act on a newer one.

use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};

use super::overlay::{traffic_layer, traffic_source};
use super::{
    Control, ContainerId, MapBackend, MapOptions, Marker, MarkerId, Popup, ReadyNotifier,
    WidgetId, POPUP_OFFSET,
};
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::model::{TrafficSegment, TransitHub};

/// Subtitle shown under every hub name.
const HUB_POPUP_SUBTITLE: &str = "Transit Hub";

/// Opaque reference to one initialization of a map widget.
///
/// Handles are never reused: each `initialize` mints a new generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapHandle {
    generation: u64,
}

impl MapHandle {
    /// Generation number of this handle.
    #[must_use]
    pub fn generation(self) -> u64 {
        self.generation
    }
}

struct ReadyCallback(Box<dyn FnOnce(MapHandle)>);

impl std::fmt::Debug for ReadyCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ReadyCallback")
    }
}

#[derive(Debug)]
struct LiveWidget {
    handle: MapHandle,
    widget: WidgetId,
    container: ContainerId,
    ready: bool,
    ready_rx: Option<oneshot::Receiver<u64>>,
    on_ready: Option<ReadyCallback>,
    source_registered: bool,
    layer_registered: bool,
    markers: Vec<MarkerId>,
}

impl LiveWidget {
    fn mark_ready(&mut self) {
        self.ready = true;
        self.ready_rx = None;
        info!(
            generation = self.handle.generation,
            container = %self.container,
            "Map widget ready"
        );
        if let Some(callback) = self.on_ready.take() {
            (callback.0)(self.handle);
        }
    }
}

/// Look up the live widget for `handle`.
fn live_for(live: &mut Option<LiveWidget>, handle: MapHandle) -> Result<&mut LiveWidget> {
    match live {
        Some(widget) if widget.handle == handle => Ok(widget),
        _ => Err(Error::StaleHandle {
            generation: handle.generation,
        }),
    }
}

/// Look up the live widget for `handle`, requiring it to have signaled readiness.
fn ready_for(live: &mut Option<LiveWidget>, handle: MapHandle) -> Result<&mut LiveWidget> {
    let widget = live_for(live, handle)?;
    if widget.ready {
        Ok(widget)
    } else {
        warn!(
            generation = handle.generation,
            "Map operation attempted before ready signal"
        );
        Err(Error::NotReady)
    }
}

/// Owns the map widget mounted in one container.
#[derive(Debug)]
pub struct MapController<B: MapBackend> {
    backend: B,
    generation: u64,
    live: Option<LiveWidget>,
}

impl<B: MapBackend> MapController<B> {
    /// Create a controller with no widget.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            generation: 0,
            live: None,
        }
    }

    /// The widget backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the widget backend, e.g. to deliver widget events.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Handle of the live widget, if any.
    #[must_use]
    pub fn current(&self) -> Option<MapHandle> {
        self.live.as_ref().map(|live| live.handle)
    }

    /// Whether `handle` refers to the live widget.
    #[must_use]
    pub fn is_live(&self, handle: MapHandle) -> bool {
        self.current() == Some(handle)
    }

    /// Whether the live widget has signaled readiness.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.live.as_ref().is_some_and(|live| live.ready)
    }

    /// Construct a widget in `container`.
    ///
    /// Any existing widget is torn down first, whether or not this call succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] without touching the backend when
    /// no credential is given, and [`Error::WidgetInitFailure`] when the
    /// widget cannot be built. In both cases no widget is live afterwards.
    pub fn initialize(
        &mut self,
        container: &ContainerId,
        credential: Option<&Credential>,
        options: &MapOptions,
    ) -> Result<MapHandle> {
        self.release();

        let Some(credential) = credential else {
            debug!(container = %container, "No credential, map stays uninitialized");
            return Err(Error::MissingCredential);
        };

        self.generation += 1;
        let handle = MapHandle {
            generation: self.generation,
        };
        let (notifier, ready_rx) = ReadyNotifier::channel(handle.generation);

        let widget = self
            .backend
            .create(container, credential, &options.view, notifier)
            .map_err(|e| {
                error!(
                    error = %e,
                    container = %container,
                    credential = %credential,
                    "Map initialization failed"
                );
                Error::widget_init(e.to_string())
            })?;

        if options.show_controls {
            for (control, position) in Control::defaults() {
                if let Err(e) = self.backend.add_control(widget, &control, position) {
                    error!(error = %e, "Adding map control failed, disposing widget");
                    self.backend.remove(widget);
                    return Err(Error::widget_init(e.to_string()));
                }
            }
        }

        info!(
            generation = handle.generation,
            container = %container,
            credential = %credential,
            controls = options.show_controls,
            "Map widget created"
        );

        self.live = Some(LiveWidget {
            handle,
            widget,
            container: container.clone(),
            ready: false,
            ready_rx: Some(ready_rx),
            on_ready: None,
            source_registered: false,
            layer_registered: false,
            markers: Vec::new(),
        });
        Ok(handle)
    }

    /// Run `callback` once when the widget behind `handle` becomes ready.
    ///
    /// If it is already ready the callback runs immediately. Registering again
    /// before readiness replaces the earlier callback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleHandle`] if `handle` is not the live widget.
    pub fn on_ready<F>(&mut self, handle: MapHandle, callback: F) -> Result<()>
    where
        F: FnOnce(MapHandle) + 'static,
    {
        let live = live_for(&mut self.live, handle)?;
        if live.ready {
            callback(handle);
        } else if live
            .on_ready
            .replace(ReadyCallback(Box::new(callback)))
            .is_some()
        {
            debug!(generation = handle.generation, "Replaced pending ready callback");
        }
        Ok(())
    }

    /// Check for a pending ready signal without blocking.
    ///
    /// Returns the handle that became ready on this call, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadySignalDropped`] if the widget went away without
    /// signaling. The widget is released first, so nothing stays loading.
    pub fn poll_ready(&mut self) -> Result<Option<MapHandle>> {
        let Some(live) = self.live.as_mut() else {
            return Ok(None);
        };
        if live.ready {
            return Ok(None);
        }
        let Some(rx) = live.ready_rx.as_mut() else {
            return Ok(None);
        };
        match rx.try_recv() {
            Ok(generation) if generation == live.handle.generation => {
                live.mark_ready();
                Ok(Some(live.handle))
            }
            Ok(generation) => {
                debug!(generation, "Ignoring ready signal for an older widget");
                Ok(None)
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => {
                warn!(
                    generation = live.handle.generation,
                    "Map widget dropped its ready signal"
                );
                self.release();
                Err(Error::ReadySignalDropped)
            }
        }
    }

    /// Wait until the widget behind `handle` signals readiness.
    ///
    /// Cancel safe: the receiver stays in place until the signal arrives, so
    /// a later `poll_ready` or `wait_ready` still observes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleHandle`] if `handle` is not the live widget, and
    /// [`Error::ReadySignalDropped`] if the widget went away without signaling,
    /// in which case it is released.
    pub async fn wait_ready(&mut self, handle: MapHandle) -> Result<()> {
        let live = live_for(&mut self.live, handle)?;
        if live.ready {
            return Ok(());
        }
        let Some(rx) = live.ready_rx.as_mut() else {
            return Err(Error::ReadySignalDropped);
        };
        let received = rx.await;
        match received {
            Ok(generation) if generation == handle.generation => {
                live.mark_ready();
                Ok(())
            }
            Ok(generation) => Err(Error::internal(format!(
                "ready signal for generation {generation} delivered to {}",
                handle.generation
            ))),
            Err(_) => {
                warn!(
                    generation = handle.generation,
                    "Map widget dropped its ready signal"
                );
                self.release();
                Err(Error::ReadySignalDropped)
            }
        }
    }

    /// Draw road segments as a line overlay colored by classification.
    ///
    /// Registering a second time is a no-op. If the layer is rejected after
    /// the source was accepted, a retry adds only the layer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] before the ready signal, without calling
    /// the backend, and [`Error::StaleHandle`] for a torn-down handle.
    pub fn register_overlay(&mut self, handle: MapHandle, segments: &[TrafficSegment]) -> Result<()> {
        let live = ready_for(&mut self.live, handle)?;
        if live.layer_registered {
            debug!(generation = handle.generation, "Traffic overlay already registered");
            return Ok(());
        }

        if !live.source_registered {
            let source = traffic_source(segments);
            self.backend.add_source(live.widget, &source)?;
            live.source_registered = true;
        }
        self.backend.add_layer(live.widget, &traffic_layer())?;
        live.layer_registered = true;

        debug!(
            generation = handle.generation,
            segments = segments.len(),
            "Traffic overlay registered"
        );
        Ok(())
    }

    /// Place one marker with a popup per hub. Returns how many were placed.
    ///
    /// Markers are not deduplicated; call [`Self::clear_markers`] before
    /// placing an overlapping set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] before the ready signal and
    /// [`Error::StaleHandle`] for a torn-down handle.
    pub fn place_markers(&mut self, handle: MapHandle, hubs: &[TransitHub]) -> Result<usize> {
        let live = ready_for(&mut self.live, handle)?;
        for hub in hubs {
            let marker = Marker {
                position: hub.position,
                popup: Popup {
                    offset: POPUP_OFFSET,
                    title: hub.name.clone(),
                    subtitle: HUB_POPUP_SUBTITLE.to_string(),
                },
            };
            let id = self.backend.add_marker(live.widget, &marker)?;
            live.markers.push(id);
        }
        debug!(generation = handle.generation, placed = hubs.len(), "Hub markers placed");
        Ok(hubs.len())
    }

    /// Remove every marker placed on the widget. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleHandle`] for a torn-down handle.
    pub fn clear_markers(&mut self, handle: MapHandle) -> Result<usize> {
        let live = live_for(&mut self.live, handle)?;
        let removed = live.markers.len();
        for marker in live.markers.drain(..) {
            self.backend.remove_marker(live.widget, marker);
        }
        Ok(removed)
    }

    /// Release the widget behind `handle`.
    ///
    /// A handle that is already torn down, or belongs to another widget, is
    /// ignored. Returns whether a widget was released.
    pub fn teardown(&mut self, handle: MapHandle) -> bool {
        if self.is_live(handle) {
            self.release();
            true
        } else {
            debug!(generation = handle.generation, "Teardown of inactive handle ignored");
            false
        }
    }

    /// Release whatever widget is live.
    fn release(&mut self) {
        let Some(mut live) = self.live.take() else {
            return;
        };
        for marker in live.markers.drain(..) {
            self.backend.remove_marker(live.widget, marker);
        }
        self.backend.remove(live.widget);
        info!(
            generation = live.handle.generation,
            container = %live.container,
            was_ready = live.ready,
            "Map widget released"
        );
    }
}

impl<B: MapBackend> Drop for MapController<B> {
    fn drop(&mut self) {
        self.release();
    }
}
