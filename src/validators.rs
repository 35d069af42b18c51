//! Lexical checks for individual declarative values
//!
//! These only ever produce warnings in the document validator: firewalld is
//! the final authority on what it accepts, so a value that looks wrong here
//! is surfaced to the operator but still rendered.

use crate::core::schema::PortProtocol;
use std::str::FromStr;

/// Validates a single port number.
///
/// # Errors
///
/// Returns `Err` if port is 0 (reserved).
pub fn validate_port(port: u16) -> Result<u16, String> {
    if port == 0 {
        Err("Port must be between 1 and 65535".to_string())
    } else {
        Ok(port)
    }
}

/// Validates a port range.
///
/// # Errors
///
/// Returns `Err` if:
/// - Either port is 0
/// - Start port is greater than end port
pub fn validate_port_range(start: u16, end: u16) -> Result<(u16, u16), String> {
    validate_port(start)?;
    validate_port(end)?;

    if start > end {
        Err("Start port must be less than or equal to end port".to_string())
    } else {
        Ok((start, end))
    }
}

/// Parses the port part of a spec: `22` or `1000-2000`.
///
/// # Examples
///
/// ```
/// use dfwc::validators::validate_port_spec;
///
/// assert_eq!(validate_port_spec("22"), Ok((22, 22)));
/// assert_eq!(validate_port_spec("1000-2000"), Ok((1000, 2000)));
/// assert!(validate_port_spec("http").is_err());
/// ```
///
/// # Errors
///
/// Returns `Err` if the text is not a port or an ordered range.
pub fn validate_port_spec(spec: &str) -> Result<(u16, u16), String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<u16>()
            .map_err(|_| format!("'{s}' is not a port number"))
    };
    match spec.split_once('-') {
        Some((start, end)) => validate_port_range(parse(start)?, parse(end)?),
        None => {
            let port = validate_port(parse(spec)?)?;
            Ok((port, port))
        }
    }
}

/// Validates a port protocol (`tcp`, `udp`, `sctp`, `dccp`).
///
/// # Errors
///
/// Returns `Err` naming the unknown protocol.
pub fn validate_protocol(protocol: &str) -> Result<PortProtocol, String> {
    PortProtocol::from_str(protocol).map_err(|_| format!("Unknown port protocol '{protocol}'"))
}

/// Validates a network interface name.
///
/// Linux kernel interface name rules:
/// - Max 15 characters (IFNAMSIZ - 1)
/// - Alphanumeric, dot, dash, underscore only
/// - Cannot be "." or ".."
///
/// A trailing `+` is accepted as the firewalld wildcard (`eth+`).
///
/// # Errors
///
/// Returns `Err` if interface name violates kernel constraints.
pub fn validate_interface(name: &str) -> Result<String, String> {
    if name.is_empty() {
        return Err("Interface name cannot be empty".to_string());
    }

    let stem = name.strip_suffix('+').unwrap_or(name);

    if stem.len() > 15 {
        return Err("Interface name too long (max 15 characters)".to_string());
    }

    if stem == "." || stem == ".." {
        return Err("Invalid interface name".to_string());
    }

    if !stem
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err("Interface name contains invalid characters".to_string());
    }

    Ok(name.to_string())
}

fn is_mac_address(text: &str) -> bool {
    let parts: Vec<&str> = text.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Validates a zone source or rich-rule address.
///
/// Accepts an IP address or CIDR network, a MAC address, or an
/// `ipset:<name>` reference.
///
/// # Errors
///
/// Returns `Err` if the text is none of these.
pub fn validate_address(address: &str) -> Result<(), String> {
    if let Some(set) = address.strip_prefix("ipset:") {
        return if set.is_empty() {
            Err("ipset reference has no name".to_string())
        } else {
            Ok(())
        };
    }
    if is_mac_address(address) {
        return Ok(());
    }
    address
        .parse::<ipnetwork::IpNetwork>()
        .map(|_| ())
        .map_err(|_| format!("'{address}' is not an IP address, network, MAC or ipset"))
}

/// Validates a rich-rule log prefix.
///
/// # Errors
///
/// Returns `Err` if:
/// - Prefix is empty
/// - Prefix exceeds 127 characters (kernel log prefix limit)
/// - Prefix contains control characters or double quotes
pub fn validate_log_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Err("Log prefix cannot be empty".to_string());
    }

    if prefix.len() > 127 {
        return Err("Log prefix too long (max 127 chars)".to_string());
    }

    if prefix.chars().any(|c| c.is_control() || c == '"') {
        return Err("Log prefix contains control characters or quotes".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_port_valid() {
        assert!(validate_port(1).is_ok());
        assert!(validate_port(80).is_ok());
        assert!(validate_port(65535).is_ok());
    }

    #[test]
    fn test_validate_port_zero() {
        assert!(validate_port(0).is_err());
    }

    #[test]
    fn test_validate_port_range() {
        assert!(validate_port_range(80, 443).is_ok());
        assert!(validate_port_range(443, 80).is_err());
        assert!(validate_port_range(0, 80).is_err());
    }

    #[test]
    fn test_validate_port_spec() {
        assert_eq!(validate_port_spec("8080"), Ok((8080, 8080)));
        assert_eq!(validate_port_spec("60000-61000"), Ok((60000, 61000)));
        assert!(validate_port_spec("61000-60000").is_err());
        assert!(validate_port_spec("70000").is_err());
        assert!(validate_port_spec("").is_err());
    }

    #[test]
    fn test_validate_protocol() {
        assert_eq!(validate_protocol("udp"), Ok(PortProtocol::Udp));
        assert!(validate_protocol("UDP").is_err());
        assert!(validate_protocol("icmp").is_err());
    }

    #[test]
    fn test_validate_interface_valid() {
        assert!(validate_interface("eth0").is_ok());
        assert!(validate_interface("wlan0").is_ok());
        assert!(validate_interface("br-lan").is_ok());
        assert!(validate_interface("veth_1.100").is_ok());
        assert!(validate_interface("eth+").is_ok());
    }

    #[test]
    fn test_validate_interface_invalid() {
        assert!(validate_interface("").is_err());
        assert!(validate_interface("a_very_long_interface").is_err());
        assert!(validate_interface("..").is_err());
        assert!(validate_interface("eth0; rm -rf").is_err());
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("10.0.0.1").is_ok());
        assert!(validate_address("192.168.0.0/16").is_ok());
        assert!(validate_address("fd00::/8").is_ok());
        assert!(validate_address("ipset:blocklist").is_ok());
        assert!(validate_address("00:11:22:33:44:aa").is_ok());
        assert!(validate_address("ipset:").is_err());
        assert!(validate_address("10.0.0.300").is_err());
        assert!(validate_address("example.com").is_err());
    }

    #[test]
    fn test_validate_log_prefix() {
        assert!(validate_log_prefix("SSH: ").is_ok());
        assert!(validate_log_prefix("").is_err());
        assert!(validate_log_prefix(&"a".repeat(128)).is_err());
        assert!(validate_log_prefix("bad\"quote").is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_validate_port_rejects_zero(port in any::<u16>()) {
            let result = validate_port(port);
            if port == 0 {
                prop_assert!(result.is_err());
            } else {
                prop_assert_eq!(result, Ok(port));
            }
        }

        #[test]
        fn test_validate_port_range_consistency(
            start in 1u16..=65535,
            end in 1u16..=65535
        ) {
            let result = validate_port_range(start, end);
            if start <= end {
                prop_assert_eq!(result, Ok((start, end)));
            } else {
                prop_assert!(result.is_err());
            }
        }

        #[test]
        fn test_port_spec_accepts_formatted_ranges(start in 1u16..=65535, len in 0u16..100) {
            let end = start.saturating_add(len);
            prop_assert_eq!(validate_port_spec(&format!("{start}-{end}")), Ok((start, end)));
        }

        #[test]
        fn test_validate_interface_never_panics(name in "\\PC*") {
            let _ = validate_interface(&name);
        }
    }
}
