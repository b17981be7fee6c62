//! tfw-guard application layer: ports onto the access-log store, the
//! enforcement back-ends, and the allow-list file; the detector and
//! detection-loop services built on top of them; and the immutable
//! `AppContext` bundle the `cli` crate wires up at startup.
pub mod context;
pub mod errors;
pub mod ports;
pub mod services;

pub use context::AppContext;
pub use errors::{EnforcementError, PreparationError, TransientStoreError};
pub use ports::{AccessLogPort, AggregateMetric, AggregateQuerySpec, AllowListFileSource, Blocker, GeoipPort, GroupAggregateRow};
pub use services::{DetectionLoopService, Detector, IterationReport, PersistentUsersService, UserAgentManager};
