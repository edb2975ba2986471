//! `mapema` - Traffic and transit information core for Nairobi
//!
//! This library provides the map widget lifecycle behind the live traffic
//! map, and the pure filtering and counting used by the route, alert and
//! traffic views.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod credential;
pub mod data;
pub mod error;
pub mod filter;
pub mod logging;
pub mod map;
pub mod model;
pub mod session;

pub use config::Config;
pub use credential::{Credential, CredentialStore, MemoryCredentialStore, SqliteCredentialStore};
pub use data::{DataProvider, Dataset};
pub use error::{Error, Result};
pub use filter::{count_by_status, filter_alerts, filter_routes, RouteSearch, StatusCounts};
pub use logging::init_logging;
pub use map::{MapBackend, MapController, MapHandle, MapOptions};
pub use model::{AlertRecord, Classification, RouteRecord, TrafficSegment, TransitHub};
pub use session::{MapSession, SurfaceView};
