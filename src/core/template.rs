//! Template expansion: variables, loops and rule groups
//!
//! [`expand`] turns a validated [`Config`] into a literal one in five steps,
//! each depending on the previous:
//!
//! 1. Copy the `variables` map.
//! 2. Resolve one hop of indirection between variables (`{{item}}` is kept).
//! 3. Realize `direct.rule_groups` into chains, rules and passthroughs, with
//!    `{{any}}` replaced by the family's any-address literal.
//! 4. Replicate every item carrying a `loop` once per value of its list
//!    variable, substituting `{{item}}`.
//! 5. Substitute `{{name}}` in every remaining string.
//!
//! Nothing here fails. An anomaly leaves the literal token in place and adds
//! a warning, so a validated document always produces output.

use crate::core::error::Diagnostic;
use crate::core::firewall::{
    Config, Direct, DirectChain, DirectRule, ForwardPort, Passthrough, PortItem, RichForwardPort,
    RichLog, RichPortSpec, RichRule, RuleGroup, ValueItem, Variable, Zone,
};
use crate::core::schema::{ANY_ADDR_VARIABLE, DirectFamily, ITEM_VARIABLE};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// `{{ name }}`, inner whitespace tolerated
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_-]*)\s*\}\}").expect("token pattern is valid")
});

/// Result of [`expand`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Literal config: no variables, loops or rule groups remain
    pub config: Config,
    /// Variables after one-hop resolution, reserved names dropped
    pub variables: IndexMap<String, Variable>,
    pub warnings: Vec<Diagnostic>,
}

/// Expands a validated config into a new literal one. The input is untouched.
pub fn expand(config: &Config) -> Expansion {
    let mut engine = Engine {
        variables: resolve_variables(&config.variables),
        warnings: Vec::new(),
        reported: HashSet::new(),
    };

    let mut direct = config.direct.as_ref().map(|d| engine.realize_rule_groups(d));

    let zones: IndexMap<String, Zone> = config
        .zones
        .iter()
        .map(|(name, zone)| (name.clone(), engine.expand_zone_loops(name, zone)))
        .collect();
    if let Some(ref mut d) = direct {
        d.rules = engine.expand_loops("direct.rules", &d.rules);
        d.passthroughs = engine.expand_loops("direct.passthroughs", &d.passthroughs);
    }

    let zones = zones
        .iter()
        .map(|(name, zone)| {
            let path = format!("zones.{name}");
            (
                name.clone(),
                zone.map_strings(&mut |s| engine.substitute(&path, s)),
            )
        })
        .collect();
    let direct = direct
        .map(|d| d.map_strings(&mut |s| engine.substitute("direct", s)))
        .filter(|d| !d.is_empty());

    let expanded = Config {
        variables: IndexMap::new(),
        zones,
        direct,
    };
    debug!(
        zones = expanded.zones.len(),
        warnings = engine.warnings.len(),
        "expanded config"
    );

    Expansion {
        config: expanded,
        variables: engine.variables,
        warnings: engine.warnings,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Step 2: one-hop variable resolution
// ═══════════════════════════════════════════════════════════════════════════

fn is_reserved(name: &str) -> bool {
    name == ITEM_VARIABLE || name == ANY_ADDR_VARIABLE
}

/// Replaces references to scalar variables using their pre-resolution values.
///
/// Runs once: a value pulled in this way is not scanned again.
fn resolve_variables(raw: &IndexMap<String, Variable>) -> IndexMap<String, Variable> {
    let hop = |text: &str| -> String {
        TOKEN_RE
            .replace_all(text, |caps: &Captures| {
                match raw.get(&caps[1]).and_then(Variable::as_scalar) {
                    Some(value) if !is_reserved(&caps[1]) => value.to_string(),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    };

    raw.iter()
        .filter(|(name, _)| !is_reserved(name))
        .map(|(name, value)| {
            let resolved = match value {
                Variable::Scalar(s) => Variable::Scalar(hop(s)),
                Variable::List(items) => Variable::List(items.iter().map(|s| hop(s)).collect()),
            };
            (name.clone(), resolved)
        })
        .collect()
}

/// Substitutes `{{item}}` only
fn substitute_item(text: &str, value: &str) -> String {
    TOKEN_RE
        .replace_all(text, |caps: &Captures| {
            if &caps[1] == ITEM_VARIABLE {
                value.to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Variable named by a loop directive: `{{nics}}` or bare `nics`
fn loop_target(directive: &str) -> Option<&str> {
    let trimmed = directive.trim();
    let name = match trimmed.strip_prefix("{{").and_then(|s| s.strip_suffix("}}")) {
        Some(inner) => inner.trim(),
        None => trimmed,
    };
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then_some(name)
}

// ═══════════════════════════════════════════════════════════════════════════
// Engine
// ═══════════════════════════════════════════════════════════════════════════

struct Engine {
    variables: IndexMap<String, Variable>,
    warnings: Vec<Diagnostic>,
    /// Dedup for once-per-name warnings
    reported: HashSet<String>,
}

impl Engine {
    fn warn(&mut self, path: &str, message: String) {
        warn!(path, "{message}");
        self.warnings.push(Diagnostic::new(path, message));
    }

    fn warn_once(&mut self, key: String, path: &str, message: String) {
        if self.reported.insert(key) {
            self.warn(path, message);
        }
    }

    /// Step 3
    fn realize_rule_groups(&mut self, direct: &Direct) -> Direct {
        let mut out = Direct {
            chains: direct.chains.clone(),
            rules: direct.rules.clone(),
            passthroughs: direct.passthroughs.clone(),
            rule_groups: Vec::new(),
        };

        for (g, group) in direct.rule_groups.iter().enumerate() {
            let path = format!("direct.rule_groups[{g}]");
            for ipv in &group.ipv {
                let any = DirectFamily::from_str(ipv)
                    .ok()
                    .and_then(DirectFamily::any_address);
                if any.is_none() && group_uses_any(group) {
                    self.warn(
                        &path,
                        format!("no any-address literal for family '{ipv}'; {{{{any}}}} left in place"),
                    );
                    // already reported for the group; step 5 stays quiet
                    self.reported.insert("any:direct".to_string());
                }
                let resolve_any = |args: &str| match any {
                    Some(literal) => TOKEN_RE
                        .replace_all(args, |caps: &Captures| {
                            if &caps[1] == ANY_ADDR_VARIABLE {
                                literal.to_string()
                            } else {
                                caps[0].to_string()
                            }
                        })
                        .into_owned(),
                    None => args.to_string(),
                };

                out.chains
                    .push(DirectChain::new(ipv.clone(), group.table.clone(), group.chain.clone()));
                for rule in &group.rules {
                    out.rules.push(DirectRule {
                        ipv: ipv.clone(),
                        table: group.table.clone(),
                        chain: group.chain.clone(),
                        priority: rule.priority.or(group.priority).unwrap_or(0),
                        args: resolve_any(&rule.args),
                        loop_var: rule.loop_var.clone(),
                    });
                }
                for passthrough in &group.passthroughs {
                    out.passthroughs.push(Passthrough {
                        ipv: ipv.clone(),
                        args: resolve_any(&passthrough.args),
                        loop_var: passthrough.loop_var.clone(),
                    });
                }
            }
        }
        out
    }

    /// Step 4 for every list of a zone
    fn expand_zone_loops(&mut self, name: &str, zone: &Zone) -> Zone {
        let path = |key: &str| format!("zones.{name}.{key}");
        Zone {
            target: zone.target.clone(),
            interfaces: self.expand_loops(&path("interfaces"), &zone.interfaces),
            sources: self.expand_loops(&path("sources"), &zone.sources),
            services: self.expand_loops(&path("services"), &zone.services),
            ports: self.expand_loops(&path("ports"), &zone.ports),
            protocols: self.expand_loops(&path("protocols"), &zone.protocols),
            source_ports: self.expand_loops(&path("source_ports"), &zone.source_ports),
            rich_rules: self.expand_loops(&path("rich_rules"), &zone.rich_rules),
            forward: zone.forward,
            masquerade: zone.masquerade,
            forward_ports: self.expand_loops(&path("forward_ports"), &zone.forward_ports),
            icmp_blocks: self.expand_loops(&path("icmp_blocks"), &zone.icmp_blocks),
            icmp_block_inversion: zone.icmp_block_inversion,
        }
    }

    fn expand_loops<T: Loopable>(&mut self, path: &str, items: &[T]) -> Vec<T> {
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let Some(directive) = item.loop_var() else {
                out.push(item.clone());
                continue;
            };
            let item_path = format!("{path}[{i}].loop");

            let values = match loop_target(directive) {
                None => Err(format!("invalid loop reference '{directive}'")),
                Some(name) => match self.variables.get(name) {
                    Some(Variable::List(values)) => Ok(values.clone()),
                    Some(Variable::Scalar(_)) => {
                        Err(format!("loop variable '{name}' is not a list"))
                    }
                    None => Err(format!("loop variable '{name}' is not defined")),
                },
            };

            match values {
                Ok(values) => {
                    let template = item.without_loop();
                    out.extend(
                        values
                            .iter()
                            .map(|value| template.map_strings(&mut |s| substitute_item(s, value))),
                    );
                }
                Err(message) => {
                    self.warn(&item_path, message);
                    out.push(item.without_loop());
                }
            }
        }
        out
    }

    /// Step 5 for one string
    fn substitute(&mut self, path: &str, text: &str) -> String {
        if !text.contains("{{") {
            return text.to_string();
        }
        let mut missing = Vec::new();
        let mut lists = Vec::new();
        let mut stray_item = false;
        let mut stray_any = false;

        let out = TOKEN_RE
            .replace_all(text, |caps: &Captures| {
                let name = &caps[1];
                match self.variables.get(name) {
                    Some(Variable::Scalar(value)) => value.clone(),
                    Some(Variable::List(_)) => {
                        lists.push(name.to_string());
                        caps[0].to_string()
                    }
                    None => {
                        if name == ITEM_VARIABLE {
                            stray_item = true;
                        } else if name == ANY_ADDR_VARIABLE {
                            stray_any = true;
                        } else {
                            missing.push(name.to_string());
                        }
                        caps[0].to_string()
                    }
                }
            })
            .into_owned();

        for name in missing {
            self.warn_once(
                format!("missing:{name}"),
                path,
                format!("variable '{name}' is not defined"),
            );
        }
        for name in lists {
            self.warn_once(
                format!("list:{name}:{path}"),
                path,
                format!("list variable '{name}' used where a single value is expected"),
            );
        }
        if stray_item {
            self.warn_once(
                format!("item:{path}"),
                path,
                "'{{item}}' used outside a loop".to_string(),
            );
        }
        if stray_any {
            self.warn_once(
                format!("any:{path}"),
                path,
                "'{{any}}' only resolves inside direct.rule_groups".to_string(),
            );
        }
        out
    }
}

fn group_uses_any(group: &RuleGroup) -> bool {
    let uses = |args: &str| {
        TOKEN_RE
            .captures_iter(args)
            .any(|c| &c[1] == ANY_ADDR_VARIABLE)
    };
    group.rules.iter().any(|r| uses(&r.args)) || group.passthroughs.iter().any(|p| uses(&p.args))
}

// ═══════════════════════════════════════════════════════════════════════════
// Tree transforms
// ═══════════════════════════════════════════════════════════════════════════

/// Rebuilds a node with every string field passed through `f`
pub trait Substitute: Sized {
    fn map_strings<F: FnMut(&str) -> String>(&self, f: &mut F) -> Self;
}

/// A list item that may carry a `loop` directive
pub trait Loopable: Substitute + Clone {
    fn loop_var(&self) -> Option<&str>;
    fn without_loop(&self) -> Self;
}

fn map_opt<F: FnMut(&str) -> String>(value: Option<&String>, f: &mut F) -> Option<String> {
    value.map(|s| f(s))
}

fn map_vec<T: Substitute, F: FnMut(&str) -> String>(items: &[T], f: &mut F) -> Vec<T> {
    items.iter().map(|item| item.map_strings(f)).collect()
}

macro_rules! impl_loopable {
    ($($ty:ty),*) => {$(
        impl Loopable for $ty {
            fn loop_var(&self) -> Option<&str> {
                self.loop_var.as_deref()
            }

            fn without_loop(&self) -> Self {
                let mut item = self.clone();
                item.loop_var = None;
                item
            }
        }
    )*};
}

impl_loopable!(ValueItem, PortItem, ForwardPort, RichRule, DirectRule, Passthrough);

impl Substitute for ValueItem {
    fn map_strings<F: FnMut(&str) -> String>(&self, f: &mut F) -> Self {
        ValueItem {
            value: f(&self.value),
            loop_var: self.loop_var.clone(),
        }
    }
}

impl Substitute for PortItem {
    /// A substituted port such as `8080/udp` is split back into its parts
    fn map_strings<F: FnMut(&str) -> String>(&self, f: &mut F) -> Self {
        let port = f(&self.port);
        let protocol = f(&self.protocol);
        let (port, protocol) = match port.split_once('/') {
            Some((p, proto)) => (p.to_string(), proto.to_string()),
            None => (port, protocol),
        };
        PortItem {
            port,
            protocol,
            loop_var: self.loop_var.clone(),
        }
    }
}

impl Substitute for ForwardPort {
    fn map_strings<F: FnMut(&str) -> String>(&self, f: &mut F) -> Self {
        ForwardPort {
            port: f(&self.port),
            protocol: f(&self.protocol),
            to_port: map_opt(self.to_port.as_ref(), f),
            to_addr: map_opt(self.to_addr.as_ref(), f),
            loop_var: self.loop_var.clone(),
        }
    }
}

impl Substitute for RichRule {
    fn map_strings<F: FnMut(&str) -> String>(&self, f: &mut F) -> Self {
        RichRule {
            family: map_opt(self.family.as_ref(), f),
            source: map_opt(self.source.as_ref(), f),
            source_invert: self.source_invert,
            destination: map_opt(self.destination.as_ref(), f),
            destination_invert: self.destination_invert,
            service: map_opt(self.service.as_ref(), f),
            port: map_opt(self.port.as_ref(), f),
            protocol: map_opt(self.protocol.as_ref(), f),
            icmp_block: map_opt(self.icmp_block.as_ref(), f),
            icmp_type: map_opt(self.icmp_type.as_ref(), f),
            masquerade: self.masquerade,
            forward_port: self.forward_port.as_ref().map(|fp| RichForwardPort {
                port: f(&fp.port),
                protocol: f(&fp.protocol),
                to_port: map_opt(fp.to_port.as_ref(), f),
                to_addr: map_opt(fp.to_addr.as_ref(), f),
            }),
            source_port: self.source_port.as_ref().map(|sp| RichPortSpec {
                port: f(&sp.port),
                protocol: f(&sp.protocol),
            }),
            log: self.log.as_ref().map(|log| RichLog {
                prefix: map_opt(log.prefix.as_ref(), f),
                level: map_opt(log.level.as_ref(), f),
                limit: map_opt(log.limit.as_ref(), f),
            }),
            audit: self.audit,
            action: map_opt(self.action.as_ref(), f),
            reject_type: map_opt(self.reject_type.as_ref(), f),
            mark_set: map_opt(self.mark_set.as_ref(), f),
            loop_var: self.loop_var.clone(),
        }
    }
}

impl Substitute for DirectChain {
    fn map_strings<F: FnMut(&str) -> String>(&self, f: &mut F) -> Self {
        DirectChain::new(f(&self.ipv), f(&self.table), f(&self.chain))
    }
}

impl Substitute for DirectRule {
    fn map_strings<F: FnMut(&str) -> String>(&self, f: &mut F) -> Self {
        DirectRule {
            ipv: f(&self.ipv),
            table: f(&self.table),
            chain: f(&self.chain),
            priority: self.priority,
            args: f(&self.args),
            loop_var: self.loop_var.clone(),
        }
    }
}

impl Substitute for Passthrough {
    fn map_strings<F: FnMut(&str) -> String>(&self, f: &mut F) -> Self {
        Passthrough {
            ipv: f(&self.ipv),
            args: f(&self.args),
            loop_var: self.loop_var.clone(),
        }
    }
}

impl Substitute for Zone {
    fn map_strings<F: FnMut(&str) -> String>(&self, f: &mut F) -> Self {
        Zone {
            target: map_opt(self.target.as_ref(), f),
            interfaces: map_vec(&self.interfaces, f),
            sources: map_vec(&self.sources, f),
            services: map_vec(&self.services, f),
            ports: map_vec(&self.ports, f),
            protocols: map_vec(&self.protocols, f),
            source_ports: map_vec(&self.source_ports, f),
            rich_rules: map_vec(&self.rich_rules, f),
            forward: self.forward,
            masquerade: self.masquerade,
            forward_ports: map_vec(&self.forward_ports, f),
            icmp_blocks: map_vec(&self.icmp_blocks, f),
            icmp_block_inversion: self.icmp_block_inversion,
        }
    }
}

impl Substitute for Direct {
    /// Rule groups are dropped; call only on a realized block
    fn map_strings<F: FnMut(&str) -> String>(&self, f: &mut F) -> Self {
        Direct {
            chains: map_vec(&self.chains, f),
            rules: map_vec(&self.rules, f),
            passthroughs: map_vec(&self.passthroughs, f),
            rule_groups: Vec::new(),
        }
    }
}
