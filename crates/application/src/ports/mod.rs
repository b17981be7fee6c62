pub mod access_log;
pub mod allow_list_source;
pub mod blocker;
pub mod geoip;

pub use access_log::{AccessLogPort, AggregateMetric, AggregateQuerySpec, GroupAggregateRow};
pub use allow_list_source::AllowListFileSource;
pub use blocker::Blocker;
pub use geoip::GeoipPort;
