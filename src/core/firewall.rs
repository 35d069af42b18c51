//! Declarative firewall data structures
//!
//! This module defines the typed configuration shared by every stage:
//! the template engine expands it, the generator renders it to commands,
//! the reverse parser rebuilds it from commands and the merger combines two
//! of them.
//!
//! # Structure
//!
//! A [`Config`] holds:
//! - `variables`: template values (scalar or list)
//! - `zones`: insertion-ordered map of zone name to [`Zone`]
//! - `direct`: optional [`Direct`] block with raw chains, rules and passthroughs
//!
//! Insertion order of zones and of every list is preserved end-to-end; it
//! decides command emission order.
//!
//! # Accepted shapes
//!
//! Documents are loose about item shapes. Normalization accepts:
//! - `interfaces: [eth0]` or `[{value: "{{item}}", loop: "{{nics}}"}]`
//! - `ports: ["8080/tcp", 53, {port: 443, protocol: tcp}]`
//! - `forward_ports: ["port=80:proto=tcp:toport=8080", {port: 22, to_port: 2222}]`
//! - `rich_rules: ['rule service name="ssh" accept', {service: ssh, action: accept}]`
//!
//! and stores each as one canonical struct, so later stages never see the
//! alternatives.
//!
//! # Example
//!
//! ```
//! use dfwc::core::firewall::{Config, PortItem};
//!
//! let doc: serde_yaml::Value = serde_yaml::from_str(
//!     "zones:\n  public:\n    ports: ['8080/tcp']\n",
//! ).unwrap();
//! let config = Config::from_document(&doc).unwrap();
//! assert_eq!(config.zones["public"].ports, vec![PortItem::new("8080", "tcp")]);
//! ```

use crate::core::error::{Error, Result};
use crate::core::schema::{DEFAULT_PORT_PROTOCOL, ZoneField};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ═══════════════════════════════════════════════════════════════════════════
// Scalar coercion
// ═══════════════════════════════════════════════════════════════════════════

/// Any YAML scalar, coerced to its string form on the way in
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn de_scalar<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Scalar::deserialize(d).map(Scalar::into_string)
}

fn de_opt_scalar<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<String>, D::Error> {
    Option::<Scalar>::deserialize(d).map(|s| s.map(Scalar::into_string))
}

/// Scalar or list of scalars, always stored as a list
fn de_scalar_or_list<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Scalar>),
        One(Scalar),
    }
    Ok(match OneOrMany::deserialize(d)? {
        OneOrMany::Many(items) => items.into_iter().map(Scalar::into_string).collect(),
        OneOrMany::One(item) => vec![item.into_string()],
    })
}

/// Integer priority, also accepted as a numeric string
fn parse_priority(s: Scalar) -> std::result::Result<i32, String> {
    match s {
        Scalar::Int(i) => i32::try_from(i).map_err(|_| format!("priority {i} out of range")),
        Scalar::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| format!("priority '{s}' is not an integer")),
        other => Err(format!(
            "priority '{}' is not an integer",
            other.into_string()
        )),
    }
}

fn de_priority<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i32, D::Error> {
    parse_priority(Scalar::deserialize(d)?).map_err(serde::de::Error::custom)
}

fn de_opt_priority<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<i32>, D::Error> {
    Option::<Scalar>::deserialize(d)?
        .map(parse_priority)
        .transpose()
        .map_err(serde::de::Error::custom)
}

fn is_false(b: &bool) -> bool {
    !*b
}

// ═══════════════════════════════════════════════════════════════════════════
// Variables
// ═══════════════════════════════════════════════════════════════════════════

/// A template variable: one value, or an ordered list for `loop` directives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variable {
    Scalar(String),
    List(Vec<String>),
}

impl Variable {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Variable::Scalar(s) => Some(s),
            Variable::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Variable::Scalar(_) => None,
            Variable::List(items) => Some(items),
        }
    }
}

impl<'de> Deserialize<'de> for Variable {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<Scalar>),
            Scalar(Scalar),
        }
        Ok(match Repr::deserialize(d)? {
            Repr::List(items) => Variable::List(items.into_iter().map(Scalar::into_string).collect()),
            Repr::Scalar(s) => Variable::Scalar(s.into_string()),
        })
    }
}

impl Serialize for Variable {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Variable::Scalar(v) => s.serialize_str(v),
            Variable::List(items) => items.serialize(s),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Zone list items
// ═══════════════════════════════════════════════════════════════════════════

/// Element of a plain string list (interfaces, sources, services, ...)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueItem {
    pub value: String,
    /// Loop directive, e.g. `{{nics}}`; never present after expansion
    pub loop_var: Option<String>,
}

impl ValueItem {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            loop_var: None,
        }
    }
}

impl<'de> Deserialize<'de> for ValueItem {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Plain(Scalar),
            Object {
                #[serde(default, deserialize_with = "de_scalar")]
                value: String,
                #[serde(rename = "loop", default)]
                loop_var: Option<String>,
            },
        }
        Ok(match Repr::deserialize(d)? {
            Repr::Plain(s) => ValueItem::new(s.into_string()),
            Repr::Object { value, loop_var } => ValueItem { value, loop_var },
        })
    }
}

impl Serialize for ValueItem {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self.loop_var {
            None => s.serialize_str(&self.value),
            Some(ref loop_var) => {
                let mut map = s.serialize_map(Some(2))?;
                map.serialize_entry("value", &self.value)?;
                map.serialize_entry("loop", loop_var)?;
                map.end()
            }
        }
    }
}

/// Element of `ports` / `source_ports`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortItem {
    /// Single port or `start-end` range
    pub port: String,
    pub protocol: String,
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_var: Option<String>,
}

impl PortItem {
    pub fn new(port: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            protocol: protocol.into(),
            loop_var: None,
        }
    }

    /// Parses `8080/tcp`; a spec without protocol defaults to tcp.
    pub fn parse(spec: &str) -> Self {
        match spec.split_once('/') {
            Some((port, protocol)) => Self::new(port.trim(), protocol.trim()),
            None => Self::new(spec.trim(), DEFAULT_PORT_PROTOCOL.to_string()),
        }
    }

    /// `port/protocol` as used on the command line
    pub fn spec(&self) -> String {
        format!("{}/{}", self.port, self.protocol)
    }
}

impl<'de> Deserialize<'de> for PortItem {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Plain(Scalar),
            Object {
                #[serde(default, deserialize_with = "de_scalar")]
                port: String,
                #[serde(default, deserialize_with = "de_opt_scalar")]
                protocol: Option<String>,
                #[serde(rename = "loop", default)]
                loop_var: Option<String>,
            },
        }
        Ok(match Repr::deserialize(d)? {
            Repr::Plain(s) => PortItem::parse(&s.into_string()),
            Repr::Object {
                port,
                protocol,
                loop_var,
            } => PortItem {
                port,
                protocol: protocol.unwrap_or_else(|| DEFAULT_PORT_PROTOCOL.to_string()),
                loop_var,
            },
        })
    }
}

/// Element of `forward_ports`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardPort {
    pub port: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_addr: Option<String>,
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_var: Option<String>,
}

impl ForwardPort {
    pub fn new(port: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            protocol: protocol.into(),
            to_port: None,
            to_addr: None,
            loop_var: None,
        }
    }

    /// Parses the colon-delimited form `port=80:proto=tcp:toport=8080:toaddr=10.0.0.2`.
    ///
    /// A segment without a recognized `key=` continues the previous value,
    /// which keeps IPv6 `toaddr` values intact.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the text has no `port=` segment.
    pub fn parse(spec: &str) -> std::result::Result<Self, String> {
        let mut fields: Vec<(&str, String)> = Vec::new();
        for segment in spec.split(':') {
            match segment.split_once('=') {
                Some((key, value)) if matches!(key, "port" | "proto" | "toport" | "toaddr") => {
                    fields.push((key, value.to_string()));
                }
                _ => match fields.last_mut() {
                    Some((_, value)) => {
                        value.push(':');
                        value.push_str(segment);
                    }
                    None => return Err(format!("malformed forward-port segment '{segment}'")),
                },
            }
        }

        let mut forward = ForwardPort::new(String::new(), DEFAULT_PORT_PROTOCOL.to_string());
        for (key, value) in fields {
            match key {
                "port" => forward.port = value,
                "proto" => forward.protocol = value,
                "toport" => forward.to_port = Some(value),
                _ => forward.to_addr = Some(value),
            }
        }

        if forward.port.is_empty() {
            return Err(format!("forward-port '{spec}' has no port"));
        }
        Ok(forward)
    }

    /// Colon-delimited command-line form
    pub fn spec(&self) -> String {
        let mut out = format!("port={}:proto={}", self.port, self.protocol);
        if let Some(ref to_port) = self.to_port {
            out.push_str(":toport=");
            out.push_str(to_port);
        }
        if let Some(ref to_addr) = self.to_addr {
            out.push_str(":toaddr=");
            out.push_str(to_addr);
        }
        out
    }
}

impl<'de> Deserialize<'de> for ForwardPort {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Plain(String),
            Object {
                #[serde(default, deserialize_with = "de_scalar")]
                port: String,
                #[serde(default, deserialize_with = "de_opt_scalar")]
                protocol: Option<String>,
                #[serde(default, deserialize_with = "de_opt_scalar")]
                to_port: Option<String>,
                #[serde(default, deserialize_with = "de_opt_scalar")]
                to_addr: Option<String>,
                #[serde(rename = "loop", default)]
                loop_var: Option<String>,
            },
        }
        match Repr::deserialize(d)? {
            Repr::Plain(spec) => ForwardPort::parse(&spec).map_err(serde::de::Error::custom),
            Repr::Object {
                port,
                protocol,
                to_port,
                to_addr,
                loop_var,
            } => Ok(ForwardPort {
                port,
                protocol: protocol.unwrap_or_else(|| DEFAULT_PORT_PROTOCOL.to_string()),
                to_port,
                to_addr,
                loop_var,
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Rich rules
// ═══════════════════════════════════════════════════════════════════════════

/// `log` clause of a rich rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RichLog {
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub prefix: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub level: Option<String>,
    /// Rate such as `1/m`
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub limit: Option<String>,
}

/// `forward-port` element of a rich rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RichForwardPort {
    #[serde(default, deserialize_with = "de_scalar")]
    pub port: String,
    #[serde(default, deserialize_with = "de_scalar")]
    pub protocol: String,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub to_port: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub to_addr: Option<String>,
}

/// `source-port` element of a rich rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RichPortSpec {
    #[serde(default, deserialize_with = "de_scalar")]
    pub port: String,
    #[serde(default, deserialize_with = "de_scalar")]
    pub protocol: String,
}

/// Structured rich rule.
///
/// At most one element field (`service`, `port`, bare `protocol`,
/// `icmp_block`, `icmp_type`, `masquerade`, `forward_port`, `source_port`)
/// is expected to be set. Rendering order is fixed, see
/// [`crate::core::rich_rule`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RichRule {
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub family: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub source_invert: bool,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub destination_invert: bool,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub service: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub port: Option<String>,
    /// Protocol of `port`, or the bare protocol element when `port` is unset
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub protocol: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub icmp_block: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub icmp_type: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub masquerade: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_port: Option<RichForwardPort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<RichPortSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<RichLog>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub audit: bool,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub reject_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub mark_set: Option<String>,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub loop_var: Option<String>,
}

/// Rich rules may be written as objects or as raw `rule ...` strings
fn de_rich_rules<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Vec<RichRule>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Fields(Box<RichRule>),
    }
    Ok(Vec::<Repr>::deserialize(d)?
        .into_iter()
        .map(|r| match r {
            Repr::Text(text) => crate::core::rich_rule::parse(&text),
            Repr::Fields(rule) => *rule,
        })
        .collect())
}

// ═══════════════════════════════════════════════════════════════════════════
// Zones
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Zone {
    #[serde(
        default,
        deserialize_with = "de_opt_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<ValueItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<ValueItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ValueItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<ValueItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_ports: Vec<PortItem>,
    #[serde(
        default,
        deserialize_with = "de_rich_rules",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub rich_rules: Vec<RichRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masquerade: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forward_ports: Vec<ForwardPort>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icmp_blocks: Vec<ValueItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icmp_block_inversion: Option<bool>,
}

impl Zone {
    /// Plain string list behind `field`, if it is one
    pub fn values(&self, field: ZoneField) -> Option<&Vec<ValueItem>> {
        match field {
            ZoneField::Interfaces => Some(&self.interfaces),
            ZoneField::Sources => Some(&self.sources),
            ZoneField::Services => Some(&self.services),
            ZoneField::Protocols => Some(&self.protocols),
            ZoneField::IcmpBlocks => Some(&self.icmp_blocks),
            _ => None,
        }
    }

    pub fn values_mut(&mut self, field: ZoneField) -> Option<&mut Vec<ValueItem>> {
        match field {
            ZoneField::Interfaces => Some(&mut self.interfaces),
            ZoneField::Sources => Some(&mut self.sources),
            ZoneField::Services => Some(&mut self.services),
            ZoneField::Protocols => Some(&mut self.protocols),
            ZoneField::IcmpBlocks => Some(&mut self.icmp_blocks),
            _ => None,
        }
    }

    /// `port/protocol` list behind `field`, if it is one
    pub fn port_list(&self, field: ZoneField) -> Option<&Vec<PortItem>> {
        match field {
            ZoneField::Ports => Some(&self.ports),
            ZoneField::SourcePorts => Some(&self.source_ports),
            _ => None,
        }
    }

    pub fn port_list_mut(&mut self, field: ZoneField) -> Option<&mut Vec<PortItem>> {
        match field {
            ZoneField::Ports => Some(&mut self.ports),
            ZoneField::SourcePorts => Some(&mut self.source_ports),
            _ => None,
        }
    }

    /// Boolean toggle behind `field`, if it is one
    pub fn toggle(&self, field: ZoneField) -> Option<bool> {
        match field {
            ZoneField::Forward => self.forward,
            ZoneField::Masquerade => self.masquerade,
            ZoneField::IcmpBlockInversion => self.icmp_block_inversion,
            _ => None,
        }
    }

    pub fn set_toggle(&mut self, field: ZoneField, on: bool) {
        match field {
            ZoneField::Forward => self.forward = Some(on),
            ZoneField::Masquerade => self.masquerade = Some(on),
            ZoneField::IcmpBlockInversion => self.icmp_block_inversion = Some(on),
            _ => {}
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Direct block
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectChain {
    #[serde(default, deserialize_with = "de_scalar")]
    pub ipv: String,
    #[serde(default, deserialize_with = "de_scalar")]
    pub table: String,
    #[serde(default, deserialize_with = "de_scalar")]
    pub chain: String,
}

impl DirectChain {
    pub fn new(ipv: impl Into<String>, table: impl Into<String>, chain: impl Into<String>) -> Self {
        Self {
            ipv: ipv.into(),
            table: table.into(),
            chain: chain.into(),
        }
    }

    /// Dedup key: chains are identical when the `ipv|table|chain` triple is
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.ipv, &self.table, &self.chain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectRule {
    #[serde(default, deserialize_with = "de_scalar")]
    pub ipv: String,
    #[serde(default, deserialize_with = "de_scalar")]
    pub table: String,
    #[serde(default, deserialize_with = "de_scalar")]
    pub chain: String,
    #[serde(default, deserialize_with = "de_priority")]
    pub priority: i32,
    /// Raw iptables/ip6tables/ebtables arguments
    #[serde(default, deserialize_with = "de_scalar")]
    pub args: String,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub loop_var: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Passthrough {
    #[serde(default, deserialize_with = "de_scalar")]
    pub ipv: String,
    #[serde(default, deserialize_with = "de_scalar")]
    pub args: String,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub loop_var: Option<String>,
}

/// Rule template inside a [`RuleGroup`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleGroupRule {
    #[serde(
        default,
        deserialize_with = "de_opt_priority",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "de_scalar")]
    pub args: String,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub loop_var: Option<String>,
}

/// Passthrough template inside a [`RuleGroup`]; a bare string is its `args`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RuleGroupPassthrough {
    pub args: String,
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_var: Option<String>,
}

impl<'de> Deserialize<'de> for RuleGroupPassthrough {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Plain(String),
            Object {
                #[serde(default, deserialize_with = "de_scalar")]
                args: String,
                #[serde(rename = "loop", default)]
                loop_var: Option<String>,
            },
        }
        Ok(match Repr::deserialize(d)? {
            Repr::Plain(args) => RuleGroupPassthrough {
                args,
                loop_var: None,
            },
            Repr::Object { args, loop_var } => RuleGroupPassthrough { args, loop_var },
        })
    }
}

/// Declarative sugar realized into one chain plus rules/passthroughs per family
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RuleGroup {
    #[serde(default, deserialize_with = "de_scalar_or_list")]
    pub ipv: Vec<String>,
    #[serde(default, deserialize_with = "de_scalar")]
    pub table: String,
    #[serde(default, deserialize_with = "de_scalar")]
    pub chain: String,
    /// Inherited by member rules that set none
    #[serde(default, deserialize_with = "de_opt_priority")]
    pub priority: Option<i32>,
    #[serde(default)]
    pub rules: Vec<RuleGroupRule>,
    #[serde(default)]
    pub passthroughs: Vec<RuleGroupPassthrough>,
}

impl Serialize for RuleGroup {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(None)?;
        match self.ipv.as_slice() {
            [single] => map.serialize_entry("ipv", single)?,
            many => map.serialize_entry("ipv", many)?,
        }
        map.serialize_entry("table", &self.table)?;
        map.serialize_entry("chain", &self.chain)?;
        if let Some(priority) = self.priority {
            map.serialize_entry("priority", &priority)?;
        }
        if !self.rules.is_empty() {
            map.serialize_entry("rules", &self.rules)?;
        }
        if !self.passthroughs.is_empty() {
            map.serialize_entry("passthroughs", &self.passthroughs)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Direct {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chains: Vec<DirectChain>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<DirectRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passthroughs: Vec<Passthrough>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_groups: Vec<RuleGroup>,
}

impl Direct {
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
            && self.rules.is_empty()
            && self.passthroughs.is_empty()
            && self.rule_groups.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Root
// ═══════════════════════════════════════════════════════════════════════════

/// A zone written as an empty YAML node (`public:`) is an empty zone, and so
/// is a null `zones` map
fn de_zones<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<IndexMap<String, Zone>, D::Error> {
    Ok(Option::<IndexMap<String, Option<Zone>>>::deserialize(d)?
        .unwrap_or_default()
        .into_iter()
        .map(|(name, zone)| (name, zone.unwrap_or_default()))
        .collect())
}

/// Root container of a declarative firewall description
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, Variable>,
    #[serde(
        default,
        deserialize_with = "de_zones",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub zones: IndexMap<String, Zone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct: Option<Direct>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts a structurally valid generic tree into the typed model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a value has a shape the validator
    /// does not reject but the model cannot hold.
    pub fn from_document(doc: &serde_yaml::Value) -> Result<Self> {
        if doc.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(doc.clone()).map_err(|e| Error::Validation {
            field: "document".to_string(),
            message: e.to_string(),
        })
    }

    /// Zone entry for `name`, created empty if missing
    pub fn zone_mut(&mut self, name: &str) -> &mut Zone {
        self.zones.entry(name.to_string()).or_default()
    }

    /// Direct block, created empty if missing
    pub fn direct_mut(&mut self) -> &mut Direct {
        self.direct.get_or_insert_with(Direct::default)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
