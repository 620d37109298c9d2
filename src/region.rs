//! Maps an inbound request to a cloud region tag, synchronously and without
//! I/O, so it stays cheap on the hot path of every public S3 get.

use std::net::IpAddr;

/// A pre-built table mapping IP prefixes (as dotted-quad string prefixes,
/// the simplest representation that avoids pulling in a CIDR crate for a
/// handful of ranges) to region tags. Built once at startup per §9's
/// "pre-build any IP-to-region structure at startup" guidance.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    entries: Vec<(String, String)>,
}

impl RegionTable {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    fn lookup(&self, ip: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(prefix, _)| ip.starts_with(prefix.as_str()))
            .map(|(_, region)| region.clone())
    }
}

pub trait RegionResolver: Send + Sync {
    /// Resolves a region tag from the request's source IP / forwarding
    /// headers, or `None` if the origin is unknown or outside every
    /// configured region.
    fn region_of(&self, forwarded_for: Option<&str>, remote_ip: Option<IpAddr>) -> Option<String>;
}

/// Reference resolver: consults `x-forwarded-for` first (first hop, which is
/// the original client under a well-behaved proxy chain), then the raw
/// connection's remote address, against a pre-built `RegionTable`.
#[derive(Debug, Clone, Default)]
pub struct StaticRegionResolver {
    table: RegionTable,
}

impl StaticRegionResolver {
    pub fn new(table: RegionTable) -> Self {
        Self { table }
    }
}

impl RegionResolver for StaticRegionResolver {
    fn region_of(&self, forwarded_for: Option<&str>, remote_ip: Option<IpAddr>) -> Option<String> {
        if let Some(header) = forwarded_for {
            if let Some(first) = header.split(',').next() {
                let candidate = first.trim();
                if let Some(region) = self.table.lookup(candidate) {
                    return Some(region);
                }
            }
        }

        remote_ip.and_then(|ip| self.table.lookup(&ip.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RegionTable {
        RegionTable::new(vec![
            ("10.0.1.".to_string(), "us-east-1".to_string()),
            ("10.0.2.".to_string(), "us-west-2".to_string()),
        ])
    }

    #[test]
    fn resolves_known_forwarded_for() {
        let resolver = StaticRegionResolver::new(table());
        let region = resolver.region_of(Some("10.0.1.42, 10.0.0.1"), None);
        assert_eq!(region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn unknown_origin_resolves_to_none() {
        let resolver = StaticRegionResolver::new(table());
        let region = resolver.region_of(Some("203.0.113.9"), None);
        assert_eq!(region, None);
    }

    #[test]
    fn falls_back_to_remote_ip_when_no_header() {
        let resolver = StaticRegionResolver::new(table());
        let ip: IpAddr = "10.0.2.7".parse().unwrap();
        let region = resolver.region_of(None, Some(ip));
        assert_eq!(region.as_deref(), Some("us-west-2"));
    }
}
