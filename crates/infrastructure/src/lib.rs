//! tfw-guard infrastructure layer: concrete adapters for the ports defined
//! in `tfw_guard_application` — the columnar access-log client, the
//! fingerprint-file store, the four blocker back-ends, the user-agent
//! allow-list file reader, and the geoip lookup.
pub mod access_log;
pub mod blockers;
pub mod fingerprint;
pub mod geoip;
pub mod user_agents;
