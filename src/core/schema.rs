//! Static catalogs of legal keys and scalar enumerations
//!
//! Pure data shared by the validator, the command generator and the reverse
//! parser. Keeping the key lists and the [`ZoneField`] table in one place is
//! what keeps the three of them agreeing on field names and emission order.

use strum::IntoEnumIterator;

/// Executable name of the firewalld client
pub const COMMAND_NAME: &str = "firewall-cmd";

/// Persistence qualifier on generated lines
pub const PERMANENT_FLAG: &str = "--permanent";

/// Words that may precede the command name on imported lines
pub const PRIVILEGE_PREFIXES: &[&str] = &["sudo", "doas", "pkexec"];

/// Zone used for modifying lines that carry no `--zone`
pub const DEFAULT_ZONE: &str = "public";

/// Loop-local binding, only meaningful inside a `loop` expansion
pub const ITEM_VARIABLE: &str = "item";

/// Name of the wildcard-address placeholder
pub const ANY_ADDR_VARIABLE: &str = "any";

/// Array-item key carrying a loop directive
pub const LOOP_KEY: &str = "loop";

pub const TOP_LEVEL_KEYS: &[&str] = &["variables", "zones", "direct"];

pub const ZONE_KEYS: &[&str] = &[
    "target",
    "interfaces",
    "sources",
    "services",
    "ports",
    "protocols",
    "source_ports",
    "rich_rules",
    "forward",
    "masquerade",
    "forward_ports",
    "icmp_blocks",
    "icmp_block_inversion",
];

pub const VALUE_ITEM_KEYS: &[&str] = &["value", "loop"];

pub const PORT_KEYS: &[&str] = &["port", "protocol", "loop"];

pub const FORWARD_PORT_KEYS: &[&str] = &["port", "protocol", "to_port", "to_addr", "loop"];

pub const RICH_RULE_KEYS: &[&str] = &[
    "family",
    "source",
    "source_invert",
    "destination",
    "destination_invert",
    "service",
    "port",
    "protocol",
    "icmp_block",
    "icmp_type",
    "masquerade",
    "forward_port",
    "source_port",
    "log",
    "audit",
    "action",
    "reject_type",
    "mark_set",
    "loop",
];

/// Rich-rule keys that make a rule do something on their own
pub const RICH_RULE_EFFECT_KEYS: &[&str] = &["action", "log", "audit", "masquerade"];

pub const RICH_LOG_KEYS: &[&str] = &["prefix", "level", "limit"];

pub const RICH_FORWARD_PORT_KEYS: &[&str] = &["port", "protocol", "to_port", "to_addr"];

pub const RICH_SOURCE_PORT_KEYS: &[&str] = &["port", "protocol"];

pub const DIRECT_KEYS: &[&str] = &["chains", "rules", "passthroughs", "rule_groups"];

pub const DIRECT_CHAIN_KEYS: &[&str] = &["ipv", "table", "chain"];

pub const DIRECT_RULE_KEYS: &[&str] = &["ipv", "table", "chain", "priority", "args", "loop"];

pub const DIRECT_RULE_REQUIRED: &[&str] = &["ipv", "table", "chain", "priority", "args"];

pub const PASSTHROUGH_KEYS: &[&str] = &["ipv", "args", "loop"];

pub const RULE_GROUP_KEYS: &[&str] = &["ipv", "table", "chain", "priority", "rules", "passthroughs"];

pub const RULE_GROUP_REQUIRED: &[&str] = &["ipv", "table", "chain"];

pub const RULE_GROUP_RULE_KEYS: &[&str] = &["priority", "args", "loop"];

pub const RULE_GROUP_PASSTHROUGH_KEYS: &[&str] = &["args", "loop"];

/// Zone default target
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum ZoneTarget {
    #[strum(serialize = "default")]
    Default,
    #[strum(serialize = "ACCEPT")]
    Accept,
    #[strum(serialize = "DROP")]
    Drop,
    #[strum(serialize = "REJECT")]
    Reject,
}

/// Rich-rule address family
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum Family {
    #[strum(serialize = "ipv4")]
    Ipv4,
    #[strum(serialize = "ipv6")]
    Ipv6,
}

/// Address family of a direct chain, rule or passthrough
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum DirectFamily {
    #[strum(serialize = "ipv4")]
    Ipv4,
    #[strum(serialize = "ipv6")]
    Ipv6,
    /// Ethernet bridge tables (ebtables)
    #[strum(serialize = "eb")]
    Eb,
}

impl DirectFamily {
    /// Literal that the wildcard-address token resolves to for this family
    pub const fn any_address(self) -> Option<&'static str> {
        match self {
            DirectFamily::Ipv4 => Some("0.0.0.0/0"),
            DirectFamily::Ipv6 => Some("::/0"),
            DirectFamily::Eb => None,
        }
    }
}

/// Terminal rich-rule action
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum RuleAction {
    #[strum(serialize = "accept")]
    Accept,
    #[strum(serialize = "drop")]
    Drop,
    #[strum(serialize = "reject")]
    Reject,
    #[strum(serialize = "mark")]
    Mark,
}

/// Transport protocols accepted in `port/protocol` specs
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum PortProtocol {
    #[strum(serialize = "tcp")]
    Tcp,
    #[strum(serialize = "udp")]
    Udp,
    #[strum(serialize = "sctp")]
    Sctp,
    #[strum(serialize = "dccp")]
    Dccp,
}

/// Default protocol for ports written without one
pub const DEFAULT_PORT_PROTOCOL: PortProtocol = PortProtocol::Tcp;

/// Syslog levels accepted by rich-rule `log`
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum LogLevel {
    #[strum(serialize = "emerg")]
    Emerg,
    #[strum(serialize = "alert")]
    Alert,
    #[strum(serialize = "crit")]
    Crit,
    #[strum(serialize = "error")]
    Error,
    #[strum(serialize = "warning")]
    Warning,
    #[strum(serialize = "notice")]
    Notice,
    #[strum(serialize = "info")]
    Info,
    #[strum(serialize = "debug")]
    Debug,
}

/// Add or remove, as it appears in `--add-*` / `--remove-*` flags
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum Verb {
    #[strum(serialize = "add")]
    Add,
    #[strum(serialize = "remove")]
    Remove,
}

/// Shape of the value a zone field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// The zone target, set with `--set-target`
    Target,
    /// Boolean toggle with no value (`--add-masquerade`)
    Toggle,
    /// List of plain strings
    Values,
    /// List of `port/protocol` specs
    Ports,
    /// List of forward-port specs
    ForwardPorts,
    /// List of rich rules
    RichRules,
}

/// Every zone field, declared in command emission order.
///
/// The generator iterates this enum to order its output and the reverse
/// parser maps normalized flag names back onto it, so the two directions
/// share one closed table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
pub enum ZoneField {
    #[strum(serialize = "target")]
    Target,
    #[strum(serialize = "interfaces")]
    Interfaces,
    #[strum(serialize = "sources")]
    Sources,
    #[strum(serialize = "services")]
    Services,
    #[strum(serialize = "ports")]
    Ports,
    #[strum(serialize = "protocols")]
    Protocols,
    #[strum(serialize = "source_ports")]
    SourcePorts,
    #[strum(serialize = "rich_rules")]
    RichRules,
    #[strum(serialize = "forward")]
    Forward,
    #[strum(serialize = "masquerade")]
    Masquerade,
    #[strum(serialize = "forward_ports")]
    ForwardPorts,
    #[strum(serialize = "icmp_blocks")]
    IcmpBlocks,
    #[strum(serialize = "icmp_block_inversion")]
    IcmpBlockInversion,
}

impl ZoneField {
    /// Document key of this field
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Flag name without its `add-`/`remove-` prefix
    pub const fn flag_stem(self) -> &'static str {
        match self {
            ZoneField::Target => "target",
            ZoneField::Interfaces => "interface",
            ZoneField::Sources => "source",
            ZoneField::Services => "service",
            ZoneField::Ports => "port",
            ZoneField::Protocols => "protocol",
            ZoneField::SourcePorts => "source-port",
            ZoneField::RichRules => "rich-rule",
            ZoneField::Forward => "forward",
            ZoneField::Masquerade => "masquerade",
            ZoneField::ForwardPorts => "forward-port",
            ZoneField::IcmpBlocks => "icmp-block",
            ZoneField::IcmpBlockInversion => "icmp-block-inversion",
        }
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            ZoneField::Target => FieldKind::Target,
            ZoneField::Forward | ZoneField::Masquerade | ZoneField::IcmpBlockInversion => {
                FieldKind::Toggle
            }
            ZoneField::Interfaces
            | ZoneField::Sources
            | ZoneField::Services
            | ZoneField::Protocols
            | ZoneField::IcmpBlocks => FieldKind::Values,
            ZoneField::Ports | ZoneField::SourcePorts => FieldKind::Ports,
            ZoneField::ForwardPorts => FieldKind::ForwardPorts,
            ZoneField::RichRules => FieldKind::RichRules,
        }
    }

    /// Whether the document holds this field as a list
    pub const fn is_list(self) -> bool {
        !matches!(self.kind(), FieldKind::Target | FieldKind::Toggle)
    }

    /// Whether firewalld accepts this field without `--permanent`
    pub const fn has_runtime_form(self) -> bool {
        !matches!(self, ZoneField::Target)
    }

    /// Looks a field up by its document key
    pub fn from_key(key: &str) -> Option<Self> {
        ZoneField::iter().find(|f| f.key() == key)
    }

    /// Looks a field up by its normalized flag name (`port`, `rich-rule`, ...)
    pub fn from_flag_stem(stem: &str) -> Option<Self> {
        ZoneField::iter().find(|f| f.flag_stem() == stem)
    }
}

/// Keys of every zone field that must be a list when present
pub fn zone_list_keys() -> impl Iterator<Item = &'static str> {
    ZoneField::iter().filter(|f| f.is_list()).map(ZoneField::key)
}
