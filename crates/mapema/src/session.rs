//! The live-map surface: credential capture, loading state and the map itself.
//!
//! A [`MapSession`] ties a [`MapController`] to the credential store and the
//! data provider. It reads the credential once when constructed, shows the
//! capture form while none is available, and re-creates the widget whenever
//! the credential or the controls option changes.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::credential::{Credential, CredentialStore};
use crate::data::DataProvider;
use crate::error::{Error, Result};
use crate::map::{ContainerId, MapBackend, MapController, MapHandle, MapOptions};

/// What the map surface currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum SurfaceView {
    /// Nothing is mounted.
    Unmounted,
    /// The token capture form, with an inline message after a failed attempt.
    CredentialForm {
        /// Why the last attempt failed, if it did.
        error: Option<String>,
    },
    /// The widget exists but has not signaled readiness.
    Loading,
    /// The map is interactive.
    Interactive,
}

/// A mounted-or-not map surface and everything it depends on.
#[derive(Debug)]
pub struct MapSession<B: MapBackend, S: CredentialStore, D: DataProvider> {
    controller: MapController<B>,
    store: S,
    data: D,
    options: MapOptions,
    credential: Option<Credential>,
    container: Option<ContainerId>,
    handle: Option<MapHandle>,
    populated: bool,
    last_error: Option<String>,
}

impl<B: MapBackend, S: CredentialStore, D: DataProvider> MapSession<B, S, D> {
    /// Create a session, reading the stored credential once.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be read.
    pub fn new(backend: B, store: S, data: D, options: MapOptions) -> Result<Self> {
        let credential = store.load()?.map(|stored| stored.credential);
        debug!(has_credential = credential.is_some(), "Map session created");
        Ok(Self {
            controller: MapController::new(backend),
            store,
            data,
            options,
            credential,
            container: None,
            handle: None,
            populated: false,
            last_error: None,
        })
    }

    /// The underlying controller.
    #[must_use]
    pub fn controller(&self) -> &MapController<B> {
        &self.controller
    }

    /// Mutable access to the underlying controller.
    pub fn controller_mut(&mut self) -> &mut MapController<B> {
        &mut self.controller
    }

    /// The credential store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Mount the surface into `container` and build the map if possible.
    pub fn mount(&mut self, container: ContainerId) -> SurfaceView {
        self.container = Some(container);
        self.start();
        self.view()
    }

    /// Unmount the surface, releasing the widget.
    pub fn unmount(&mut self) {
        self.stop();
        self.container = None;
    }

    /// Accept a token typed into the capture form.
    ///
    /// Blank input is ignored and returns `Ok(false)`. Otherwise the trimmed
    /// token is persisted and the map is rebuilt with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be persisted.
    pub fn submit_credential(&mut self, input: &str) -> Result<bool> {
        let Some(credential) = Credential::parse(input) else {
            debug!("Ignoring blank credential submission");
            return Ok(false);
        };
        self.store.save(&credential)?;
        info!(credential = %credential, "Map credential updated");
        self.credential = Some(credential);
        self.restart();
        Ok(true)
    }

    /// Toggle navigation and geolocation controls, rebuilding the map on change.
    pub fn set_show_controls(&mut self, show_controls: bool) {
        if self.options.show_controls != show_controls {
            self.options.show_controls = show_controls;
            self.restart();
        }
    }

    /// Check for the ready signal; on readiness draw traffic and hubs.
    ///
    /// Returns whether traffic and hubs were drawn on this call. A failed
    /// draw is retried by the next call. If the widget drops its ready
    /// signal the surface falls back to the capture form.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget rejects the overlay or a marker.
    pub fn poll(&mut self) -> Result<bool> {
        let Some(handle) = self.handle else {
            return Ok(false);
        };
        if let Err(e) = self.controller.poll_ready() {
            self.fall_back(&e);
            return Ok(false);
        }
        if self.populated || !self.controller.is_ready() || !self.controller.is_live(handle) {
            return Ok(false);
        }
        self.populate(handle)?;
        Ok(true)
    }

    /// Wait for the ready signal, then draw traffic and hubs.
    ///
    /// Returns immediately when no widget is loading. A widget that drops
    /// its ready signal sends the surface back to the capture form.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget rejects the overlay or a marker.
    pub async fn wait_ready(&mut self) -> Result<()> {
        let Some(handle) = self.handle else {
            return Ok(());
        };
        if !self.controller.is_ready() {
            if let Err(e) = self.controller.wait_ready(handle).await {
                if !e.is_recoverable() {
                    return Err(e);
                }
                self.fall_back(&e);
                return Ok(());
            }
        }
        if self.populated {
            return Ok(());
        }
        self.populate(handle)
    }

    /// What the surface currently shows.
    #[must_use]
    pub fn view(&self) -> SurfaceView {
        if self.container.is_none() {
            return SurfaceView::Unmounted;
        }
        match self.handle {
            Some(handle) if self.controller.is_live(handle) => {
                if self.controller.is_ready() {
                    SurfaceView::Interactive
                } else {
                    SurfaceView::Loading
                }
            }
            _ => SurfaceView::CredentialForm {
                error: self.last_error.clone(),
            },
        }
    }

    fn restart(&mut self) {
        self.stop();
        self.start();
    }

    fn start(&mut self) {
        let Some(container) = self.container.clone() else {
            return;
        };
        if self.credential.is_none() {
            debug!("No credential, showing capture form");
            return;
        }
        match self
            .controller
            .initialize(&container, self.credential.as_ref(), &self.options)
        {
            Ok(handle) => {
                self.last_error = None;
                self.handle = Some(handle);
                self.populated = false;
                let registered = self.controller.on_ready(handle, |handle| {
                    info!(
                        generation = handle.generation(),
                        "Loading indicator replaced by interactive map"
                    );
                });
                if let Err(e) = registered {
                    warn!(error = %e, "Could not register ready callback");
                }
            }
            Err(e) => self.fall_back(&e),
        }
    }

    fn fall_back(&mut self, error: &Error) {
        warn!(error = %error, "Map surface falling back to capture form");
        self.last_error = Some(error.to_string());
        self.handle = None;
        self.populated = false;
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.controller.teardown(handle);
        }
    }

    fn populate(&mut self, handle: MapHandle) -> Result<()> {
        self.controller
            .register_overlay(handle, self.data.segments())?;
        // A retry after a rejected marker must not double up the rest.
        self.controller.clear_markers(handle)?;
        self.controller.place_markers(handle, self.data.hubs())?;
        self.populated = true;
        Ok(())
    }
}
