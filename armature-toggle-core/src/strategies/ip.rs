use super::{Strategy, StrategyKind};
use crate::context::{EvaluationContext, FlagConfig, IP_ADDRESS};
use crate::logger::{OptionalLogger, SharedLogger};
use serde_json::Value;
use std::net::IpAddr;

/// Parse an IPv4 or IPv6 address, ignoring surrounding whitespace
pub fn parse_ip(raw: &str) -> Option<IpAddr> {
    raw.trim().parse().ok()
}

/// An address range in `address/prefix` notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    network: IpAddr,
    prefix: u8,
}

impl Cidr {
    /// Parse `address/prefix`. A bare address is a single-host range.
    ///
    /// Returns `None` for malformed addresses and for prefixes wider than
    /// the address family.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (address, prefix) = match raw.split_once('/') {
            Some((address, prefix)) => (address, Some(prefix)),
            None => (raw, None),
        };

        let network = parse_ip(address)?;
        let width = address_width(&network);
        let prefix = match prefix {
            Some(p) => p.trim().parse::<u8>().ok().filter(|p| *p <= width)?,
            None => width,
        };

        Some(Self { network, prefix })
    }

    pub fn network(&self) -> IpAddr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Whether `address` shares the first `prefix` bits with the network.
    /// Addresses of the other IP version never match.
    pub fn contains(&self, address: &IpAddr) -> bool {
        match (self.network, address) {
            (IpAddr::V4(network), IpAddr::V4(address)) => {
                let mask = prefix_mask_u32(self.prefix);
                (u32::from(network) & mask) == (u32::from(*address) & mask)
            }
            (IpAddr::V6(network), IpAddr::V6(address)) => {
                let mask = prefix_mask_u128(self.prefix);
                (u128::from(network) & mask) == (u128::from(*address) & mask)
            }
            _ => false,
        }
    }
}

fn address_width(address: &IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn prefix_mask_u32(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p)),
    }
}

fn prefix_mask_u128(prefix: u8) -> u128 {
    match prefix {
        0 => 0,
        p => u128::MAX << (128 - u32::from(p)),
    }
}

/// IP address targeting.
///
/// Enabled when `ip_address` equals a `whitelist` entry or falls inside any
/// of the `ip_ranges`. With neither list configured, or an unparsable
/// context address, the feature is off.
#[derive(Debug, Clone, Default)]
pub struct IpStrategy {
    logger: OptionalLogger,
}

impl IpStrategy {
    pub fn new(logger: Option<SharedLogger>) -> Self {
        Self {
            logger: OptionalLogger::new(logger),
        }
    }
}

impl Strategy for IpStrategy {
    fn name(&self) -> &str {
        StrategyKind::Ip.as_str()
    }

    fn is_enabled(&self, config: &FlagConfig, context: &EvaluationContext) -> bool {
        let whitelist = config.get_non_empty_array("whitelist");
        let ranges = config.get_non_empty_array("ip_ranges");

        if whitelist.is_none() && ranges.is_none() {
            self.logger
                .debug("ip strategy: no whitelist or ip_ranges configured", &[]);
            return false;
        }

        let Some(raw) = context.get(IP_ADDRESS).and_then(Value::as_str) else {
            self.logger.debug("ip strategy: no ip_address in context", &[]);
            return false;
        };

        let Some(address) = parse_ip(raw) else {
            self.logger.debug(
                "ip strategy: unparsable ip_address",
                &[("ip_address", raw.to_string())],
            );
            return false;
        };

        let whitelisted = whitelist.is_some_and(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .any(|entry| match parse_ip(entry) {
                    Some(candidate) => candidate == address,
                    None => entry.trim() == raw.trim(),
                })
        });

        whitelisted
            || ranges.is_some_and(|ranges| {
                ranges
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(Cidr::parse)
                    .any(|cidr| cidr.contains(&address))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ip(raw: &str) -> IpAddr {
        parse_ip(raw).unwrap()
    }

    #[test]
    fn test_cidr_parse() {
        assert_eq!(Cidr::parse("10.0.0.0/8").map(|c| c.prefix()), Some(8));
        assert_eq!(Cidr::parse("10.0.0.1").map(|c| c.prefix()), Some(32));
        assert_eq!(Cidr::parse("2001:db8::/32").map(|c| c.prefix()), Some(32));
        assert!(Cidr::parse("10.0.0.0/33").is_none());
        assert!(Cidr::parse("2001:db8::/129").is_none());
        assert!(Cidr::parse("10.0.0.0/abc").is_none());
        assert!(Cidr::parse("not-an-ip/8").is_none());
    }

    #[test]
    fn test_host_route_is_exact() {
        let cidr = Cidr::parse("192.168.1.100/32").unwrap();
        assert!(cidr.contains(&ip("192.168.1.100")));
        assert!(!cidr.contains(&ip("192.168.1.101")));
    }

    #[test]
    fn test_zero_prefix_matches_same_version() {
        let v4 = Cidr::parse("0.0.0.0/0").unwrap();
        assert!(v4.contains(&ip("8.8.8.8")));
        assert!(v4.contains(&ip("255.255.255.255")));
        assert!(!v4.contains(&ip("::1")));

        let v6 = Cidr::parse("::/0").unwrap();
        assert!(v6.contains(&ip("2001:db8::1")));
        assert!(!v6.contains(&ip("10.0.0.1")));
    }

    #[test]
    fn test_partial_prefix() {
        let cidr = Cidr::parse("172.16.0.0/12").unwrap();
        assert!(cidr.contains(&ip("172.31.255.255")));
        assert!(!cidr.contains(&ip("172.32.0.0")));

        let cidr = Cidr::parse("2001:db8:abcd::/48").unwrap();
        assert!(cidr.contains(&ip("2001:db8:abcd:12::1")));
        assert!(!cidr.contains(&ip("2001:db8:abce::1")));
    }

    #[test]
    fn test_strategy_whitelist_and_ranges() {
        let strategy = IpStrategy::default();
        let config = FlagConfig::for_strategy("ip")
            .with("whitelist", json!(["203.0.113.7", "::1"]))
            .with("ip_ranges", json!(["10.0.0.0/8", "bogus/99"]));

        let check = |raw: &str| {
            strategy.is_enabled(&config, &EvaluationContext::new().with_ip_address(raw))
        };

        assert!(check("203.0.113.7"));
        assert!(check("0:0:0:0:0:0:0:1"));
        assert!(check("10.20.30.40"));
        assert!(!check("11.0.0.1"));
        assert!(!check("garbage"));
        assert!(!strategy.is_enabled(&config, &EvaluationContext::new()));
    }

    #[test]
    fn test_strategy_unconfigured_fails_closed() {
        let strategy = IpStrategy::default();
        let context = EvaluationContext::new().with_ip_address("10.0.0.1");
        assert!(!strategy.is_enabled(&FlagConfig::for_strategy("ip"), &context));
    }
}
