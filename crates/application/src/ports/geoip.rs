use std::net::IpAddr;

/// Backs the `geoip` detector variant (SPEC_FULL.md §E.6): resolves an
/// address to a city and decides whether that city is on the allow-list,
/// the same allow/deny shape the spec already gives user-agents and
/// persistent users, applied to geography instead.
pub trait GeoipPort: Send + Sync {
    /// `true` when `ip` resolves to a city present in
    /// `GeoipConfig::path_allowed_cities_list` — such rows are excluded
    /// from the geoip detector's candidate view.
    fn is_allowed_city(&self, ip: IpAddr) -> bool;
}
