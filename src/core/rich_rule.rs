//! Rich rule text rendering and parsing
//!
//! Both directions walk the clauses in one fixed order:
//!
//! ```text
//! rule [family] [source] [destination] [element] [log] [audit] [action]
//! ```
//!
//! The generator renders through [`RichRule`]'s `Display` impl and the reverse
//! parser reads back through [`parse`], so a literal rule survives
//! `parse(rule.to_string()) == rule`.

use crate::core::firewall::{RichForwardPort, RichLog, RichPortSpec, RichRule};
use crate::core::schema::DEFAULT_PORT_PROTOCOL;
use crate::core::tokenize::tokenize;
use std::fmt;

impl fmt::Display for RichRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("rule")?;

        if let Some(ref family) = self.family {
            write!(f, " family=\"{family}\"")?;
        }
        if let Some(ref source) = self.source {
            let not = if self.source_invert { " not" } else { "" };
            write!(f, " source{not} address=\"{source}\"")?;
        }
        if let Some(ref destination) = self.destination {
            let not = if self.destination_invert { " not" } else { "" };
            write!(f, " destination{not} address=\"{destination}\"")?;
        }

        self.fmt_element(f)?;

        if let Some(ref log) = self.log {
            f.write_str(" log")?;
            if let Some(ref prefix) = log.prefix {
                write!(f, " prefix=\"{prefix}\"")?;
            }
            if let Some(ref level) = log.level {
                write!(f, " level=\"{level}\"")?;
            }
            if let Some(ref limit) = log.limit {
                write!(f, " limit value=\"{limit}\"")?;
            }
        }
        if self.audit {
            f.write_str(" audit")?;
        }

        match self.action.as_deref() {
            None => {}
            Some("reject") => {
                f.write_str(" reject")?;
                if let Some(ref reject_type) = self.reject_type {
                    write!(f, " type=\"{reject_type}\"")?;
                }
            }
            Some("mark") => {
                f.write_str(" mark")?;
                if let Some(ref mark) = self.mark_set {
                    write!(f, " set=\"{mark}\"")?;
                }
            }
            Some(action) => write!(f, " {action}")?,
        }
        Ok(())
    }
}

impl RichRule {
    /// Renders the single element clause, first set field wins
    fn fmt_element(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref service) = self.service {
            return write!(f, " service name=\"{service}\"");
        }
        if let Some(ref port) = self.port {
            let protocol = self
                .protocol
                .clone()
                .unwrap_or_else(|| DEFAULT_PORT_PROTOCOL.to_string());
            return write!(f, " port port=\"{port}\" protocol=\"{protocol}\"");
        }
        if let Some(ref protocol) = self.protocol {
            return write!(f, " protocol value=\"{protocol}\"");
        }
        if let Some(ref name) = self.icmp_block {
            return write!(f, " icmp-block name=\"{name}\"");
        }
        if let Some(ref name) = self.icmp_type {
            return write!(f, " icmp-type name=\"{name}\"");
        }
        if self.masquerade {
            return f.write_str(" masquerade");
        }
        if let Some(ref fp) = self.forward_port {
            write!(
                f,
                " forward-port port=\"{}\" protocol=\"{}\"",
                fp.port, fp.protocol
            )?;
            if let Some(ref to_port) = fp.to_port {
                write!(f, " to-port=\"{to_port}\"")?;
            }
            if let Some(ref to_addr) = fp.to_addr {
                write!(f, " to-addr=\"{to_addr}\"")?;
            }
            return Ok(());
        }
        if let Some(ref sp) = self.source_port {
            return write!(
                f,
                " source-port port=\"{}\" protocol=\"{}\"",
                sp.port, sp.protocol
            );
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Parsing
// ═══════════════════════════════════════════════════════════════════════════

struct Cursor {
    tokens: Vec<String>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    /// Consumes `word` if it is the next token
    fn eat(&mut self, word: &str) -> bool {
        if self.peek() == Some(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes `key=value` and returns the value
    fn eat_value(&mut self, key: &str) -> Option<String> {
        let value = self
            .peek()?
            .strip_prefix(key)?
            .strip_prefix('=')?
            .to_string();
        self.pos += 1;
        Some(value)
    }

    fn eat_port_spec(&mut self) -> RichPortSpec {
        RichPortSpec {
            port: self.eat_value("port").unwrap_or_default(),
            protocol: self
                .eat_value("protocol")
                .unwrap_or_else(|| DEFAULT_PORT_PROTOCOL.to_string()),
        }
    }
}

/// Parses a rich rule string into fields.
///
/// Never fails: reading stops at the first clause that is out of place and
/// whatever was recognized so far is returned.
pub fn parse(text: &str) -> RichRule {
    parse_with_rest(text).0
}

/// Like [`parse`], also returning the first token that was not consumed.
///
/// `None` means the whole text was understood.
pub fn parse_with_rest(text: &str) -> (RichRule, Option<String>) {
    let tokens = tokenize(text)
        .unwrap_or_else(|_| text.split_whitespace().map(str::to_string).collect());
    let mut cur = Cursor { tokens, pos: 0 };
    let mut rule = RichRule::default();

    cur.eat("rule");
    rule.family = cur.eat_value("family");

    if cur.eat("source") {
        rule.source_invert = cur.eat("not");
        rule.source = cur.eat_value("address");
    }
    if cur.eat("destination") {
        rule.destination_invert = cur.eat("not");
        rule.destination = cur.eat_value("address");
    }

    match cur.peek() {
        Some("service") => {
            cur.pos += 1;
            rule.service = cur.eat_value("name");
        }
        Some("port") => {
            cur.pos += 1;
            let spec = cur.eat_port_spec();
            rule.port = Some(spec.port);
            rule.protocol = Some(spec.protocol);
        }
        Some("protocol") => {
            cur.pos += 1;
            rule.protocol = cur.eat_value("value");
        }
        Some("icmp-block") => {
            cur.pos += 1;
            rule.icmp_block = cur.eat_value("name");
        }
        Some("icmp-type") => {
            cur.pos += 1;
            rule.icmp_type = cur.eat_value("name");
        }
        Some("masquerade") => {
            cur.pos += 1;
            rule.masquerade = true;
        }
        Some("forward-port") => {
            cur.pos += 1;
            let spec = cur.eat_port_spec();
            rule.forward_port = Some(RichForwardPort {
                port: spec.port,
                protocol: spec.protocol,
                to_port: cur.eat_value("to-port"),
                to_addr: cur.eat_value("to-addr"),
            });
        }
        Some("source-port") => {
            cur.pos += 1;
            rule.source_port = Some(cur.eat_port_spec());
        }
        _ => {}
    }

    if cur.eat("log") {
        let mut log = RichLog {
            prefix: cur.eat_value("prefix"),
            level: cur.eat_value("level"),
            limit: None,
        };
        if cur.eat("limit") {
            log.limit = cur.eat_value("value");
        }
        rule.log = Some(log);
    }
    rule.audit = cur.eat("audit");

    match cur.peek() {
        Some(action @ ("accept" | "drop")) => {
            rule.action = Some(action.to_string());
            cur.pos += 1;
        }
        Some("reject") => {
            cur.pos += 1;
            rule.action = Some("reject".to_string());
            rule.reject_type = cur.eat_value("type");
        }
        Some("mark") => {
            cur.pos += 1;
            rule.action = Some("mark".to_string());
            rule.mark_set = cur.eat_value("set");
        }
        _ => {}
    }

    let rest = cur.peek().map(str::to_string);
    (rule, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SSH_RULE: &str = r#"rule family="ipv4" source address="10.0.0.1" service name="ssh" accept"#;

    #[test]
    fn test_parse_service_rule() {
        let rule = parse(SSH_RULE);
        assert_eq!(rule.family.as_deref(), Some("ipv4"));
        assert_eq!(rule.source.as_deref(), Some("10.0.0.1"));
        assert_eq!(rule.service.as_deref(), Some("ssh"));
        assert_eq!(rule.action.as_deref(), Some("accept"));
        assert!(!rule.source_invert);
    }

    #[test]
    fn test_render_reproduces_text() {
        assert_eq!(parse(SSH_RULE).to_string(), SSH_RULE);
    }

    #[test]
    fn test_full_clause_order() {
        let text = r#"rule family="ipv6" source not address="fd00::/8" destination address="fd00::1" port port="8080" protocol="udp" log prefix="web " level="info" limit value="1/m" audit reject type="icmp6-port-unreachable""#;
        let rule = parse(text);
        assert!(rule.source_invert);
        assert_eq!(rule.port.as_deref(), Some("8080"));
        assert_eq!(rule.protocol.as_deref(), Some("udp"));
        let log = rule.log.as_ref().unwrap();
        assert_eq!(log.prefix.as_deref(), Some("web "));
        assert_eq!(log.limit.as_deref(), Some("1/m"));
        assert!(rule.audit);
        assert_eq!(rule.reject_type.as_deref(), Some("icmp6-port-unreachable"));
        assert_eq!(rule.to_string(), text);
    }

    #[test]
    fn test_forward_port_and_mark() {
        let text = r#"rule forward-port port="80" protocol="tcp" to-port="8080" to-addr="10.0.0.2""#;
        let rule = parse(text);
        let fp = rule.forward_port.as_ref().unwrap();
        assert_eq!(fp.to_port.as_deref(), Some("8080"));
        assert_eq!(rule.to_string(), text);

        let marked = parse(r#"rule protocol value="icmp" mark set="0x1""#);
        assert_eq!(marked.protocol.as_deref(), Some("icmp"));
        assert_eq!(marked.mark_set.as_deref(), Some("0x1"));
    }

    #[test]
    fn test_reordered_rule_stops_early() {
        let rule = parse(r#"rule service name="ssh" family="ipv4" accept"#);
        assert_eq!(rule.service.as_deref(), Some("ssh"));
        assert_eq!(rule.family, None);
        assert_eq!(rule.action, None);
    }

    #[test]
    fn test_rest_names_first_unread_token() {
        let (rule, rest) = parse_with_rest(r#"rule family="ipv4" accept service name="ssh""#);
        assert_eq!(rule.action.as_deref(), Some("accept"));
        assert_eq!(rule.service, None);
        assert_eq!(rest.as_deref(), Some("service"));

        let (_, rest) = parse_with_rest(r#"rule service name="ssh" family="ipv4" accept"#);
        assert_eq!(rest.as_deref(), Some("family=ipv4"));
    }

    #[test]
    fn test_complete_rule_has_no_rest() {
        assert_eq!(parse_with_rest(SSH_RULE).1, None);
        assert_eq!(
            parse_with_rest(r#"rule protocol value="icmp" mark set="0x1""#).1,
            None
        );
        assert_eq!(parse_with_rest("").1, None);
    }

    #[test]
    fn test_garbage_never_panics() {
        for text in ["", "rule", "rule source", "'unterminated", "log log log"] {
            let _ = parse(text);
        }
    }

    #[test]
    fn test_action_renders_last() {
        let rule = RichRule {
            action: Some("drop".to_string()),
            audit: true,
            masquerade: true,
            ..RichRule::default()
        };
        assert_eq!(rule.to_string(), "rule masquerade audit drop");
    }
}
