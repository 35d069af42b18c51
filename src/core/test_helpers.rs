//! Shared test utilities for core module tests
//!
//! Provides common builders to avoid duplication across test suites.
//! This module is only compiled in test mode.

use crate::core::firewall::{
    Config, DirectChain, DirectRule, ForwardPort, Passthrough, PortItem, RichLog, RichRule,
    ValueItem,
};
use crate::core::generate::{Direction, GenerateOptions, generate};

/// Options without banners, so line lists compare cleanly
pub fn plain_options() -> GenerateOptions {
    GenerateOptions {
        transient: false,
        banners: false,
    }
}

/// Creates a basic test config with one `public` zone allowing SSH.
///
/// This is the canonical helper for creating test configs.
pub fn create_test_config() -> Config {
    let mut config = Config::new();
    let zone = config.zone_mut("public");
    zone.services.push(ValueItem::new("ssh"));
    zone.ports.push(PortItem::new("8080", "tcp"));
    config
}

/// Creates a rich rule allowing `service` from `source`.
pub fn create_test_rich_rule(service: &str, source: Option<&str>) -> RichRule {
    RichRule {
        family: source.map(|_| "ipv4".to_string()),
        source: source.map(String::from),
        service: Some(service.to_string()),
        action: Some("accept".to_string()),
        ..RichRule::default()
    }
}

/// Creates a literal config touching every zone field and every direct list.
pub fn create_full_test_config() -> Config {
    let mut config = Config::new();

    let zone = config.zone_mut("public");
    zone.target = Some("DROP".to_string());
    zone.interfaces.push(ValueItem::new("eth0"));
    zone.sources.push(ValueItem::new("192.168.1.0/24"));
    zone.services.push(ValueItem::new("ssh"));
    zone.services.push(ValueItem::new("https"));
    zone.ports.push(PortItem::new("8080", "tcp"));
    zone.ports.push(PortItem::new("60000-61000", "udp"));
    zone.protocols.push(ValueItem::new("gre"));
    zone.source_ports.push(PortItem::new("53", "udp"));
    zone.rich_rules
        .push(create_test_rich_rule("ssh", Some("10.0.0.1")));
    zone.rich_rules.push(RichRule {
        family: Some("ipv6".to_string()),
        source: Some("2001:db8::/32".to_string()),
        source_invert: true,
        port: Some("443".to_string()),
        protocol: Some("tcp".to_string()),
        log: Some(RichLog {
            prefix: Some("https drop".to_string()),
            level: Some("info".to_string()),
            limit: Some("1/m".to_string()),
        }),
        action: Some("drop".to_string()),
        ..RichRule::default()
    });
    zone.forward = Some(true);
    zone.masquerade = Some(true);
    zone.forward_ports.push(ForwardPort {
        to_port: Some("8022".to_string()),
        to_addr: Some("10.0.0.5".to_string()),
        ..ForwardPort::new("22", "tcp")
    });
    zone.icmp_blocks.push(ValueItem::new("echo-request"));
    zone.icmp_block_inversion = Some(true);

    config
        .zone_mut("dmz")
        .services
        .push(ValueItem::new("http"));

    let direct = config.direct_mut();
    direct
        .chains
        .push(DirectChain::new("ipv4", "filter", "IN_extra"));
    direct.rules.push(DirectRule {
        ipv: "ipv4".to_string(),
        table: "filter".to_string(),
        chain: "IN_extra".to_string(),
        priority: 10,
        args: "-p tcp --dport 9000 -j ACCEPT".to_string(),
        loop_var: None,
    });
    direct.passthroughs.push(Passthrough {
        ipv: "ipv4".to_string(),
        args: "-A INPUT -j IN_extra".to_string(),
        loop_var: None,
    });

    config
}

/// Generated lines without banners, as a single script
pub fn script_for(config: &Config, direction: Direction) -> String {
    generate(Some(config), direction, &plain_options()).join("\n")
}
