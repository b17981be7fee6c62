use maxminddb::geoip2;
use std::collections::HashSet;
use std::net::IpAddr;
use tfw_guard_application::GeoipPort;
use tracing::warn;

/// Backs the `geoip` detector variant (SPEC_FULL.md §E.6): resolves an
/// address against a local MMDB city database and checks the resolved city
/// name against an allow-list loaded once at startup.
pub struct MaxMindGeoipSource {
    reader: maxminddb::Reader<Vec<u8>>,
    allowed_cities: HashSet<String>,
}

impl MaxMindGeoipSource {
    pub fn open(db_path: &str, allowed_cities: HashSet<String>) -> Result<Self, maxminddb::MaxMindDBError> {
        let reader = maxminddb::Reader::open_readfile(db_path)?;
        Ok(Self {
            reader,
            allowed_cities,
        })
    }
}

impl GeoipPort for MaxMindGeoipSource {
    fn is_allowed_city(&self, ip: IpAddr) -> bool {
        let city: Result<geoip2::City, _> = self.reader.lookup(ip);
        let Ok(city) = city else {
            warn!(%ip, "geoip lookup failed, treating as not-allowed");
            return false;
        };
        let Some(name) = city
            .city
            .and_then(|c| c.names)
            .and_then(|names| names.get("en").copied())
        else {
            return false;
        };
        self.allowed_cities.contains(name)
    }
}

/// Parses the newline-delimited allowed-cities list (one city name per
/// non-empty, non-comment line).
pub fn parse_allowed_cities(contents: &str) -> HashSet<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_allowed_cities_skipping_blank_and_comment_lines() {
        let parsed = parse_allowed_cities("Austin\n\n# not a city\nDenver\n");
        assert_eq!(parsed.len(), 2);
        assert!(parsed.contains("Austin"));
        assert!(parsed.contains("Denver"));
    }
}
