//! firewall-cmd command generation
//!
//! Renders an expanded [`Config`] into ordered command lines. Apply emits
//! zones then direct entries then a reload; remove retracts direct entries
//! first (rules, passthroughs, then chains) and then the zones, with every
//! `--add-*` turned into its `--remove-*` counterpart.
//!
//! Every value goes through the same builders as the reverse parser reads
//! (`PortItem::spec`, `ForwardPort::spec`, the rich rule `Display` impl), so
//! a literal config survives a round trip through both.
//!
//! # Example
//!
//! ```
//! use dfwc::core::firewall::{Config, PortItem};
//! use dfwc::core::generate::{Direction, GenerateOptions, generate};
//!
//! let mut config = Config::new();
//! config.zone_mut("public").ports.push(PortItem::new("8080", "tcp"));
//! let options = GenerateOptions { banners: false, ..GenerateOptions::default() };
//! let lines = generate(Some(&config), Direction::Apply, &options);
//! assert_eq!(lines, [
//!     "firewall-cmd --permanent --zone=public --add-port=8080/tcp",
//!     "firewall-cmd --reload",
//! ]);
//! ```

use crate::core::firewall::{Config, Direct, DirectChain, Zone};
use crate::core::schema::{COMMAND_NAME, FieldKind, PERMANENT_FLAG, Verb, ZoneField};
use crate::core::tokenize::shell_quote;
use std::collections::HashSet;
use std::fmt::Write;
use strum::IntoEnumIterator;
use tracing::debug;

/// Which way the generated commands move the firewall
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum Direction {
    #[default]
    #[strum(serialize = "apply")]
    Apply,
    #[strum(serialize = "remove")]
    Remove,
}

impl Direction {
    pub const fn verb(self) -> Verb {
        match self {
            Direction::Apply => Verb::Add,
            Direction::Remove => Verb::Remove,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Also emit a runtime (non-permanent) copy of each line, and no reload
    pub transient: bool,
    /// `# Zone: <name>` / `# Direct rules` comment lines
    pub banners: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            transient: false,
            banners: true,
        }
    }
}

/// Reload line that ends a non-transient run
pub fn reload_line() -> String {
    format!("{COMMAND_NAME} --reload")
}

/// Generates the ordered command lines for `config`.
///
/// A missing config yields no lines.
pub fn generate(
    config: Option<&Config>,
    direction: Direction,
    options: &GenerateOptions,
) -> Vec<String> {
    let Some(config) = config else {
        return Vec::new();
    };
    let mut out = Emitter {
        lines: Vec::new(),
        options,
        verb: direction.verb(),
    };

    match direction {
        Direction::Apply => {
            for (name, zone) in &config.zones {
                out.zone(name, zone);
            }
            if let Some(ref direct) = config.direct {
                out.direct(direct, direction);
            }
        }
        Direction::Remove => {
            if let Some(ref direct) = config.direct {
                out.direct(direct, direction);
            }
            for (name, zone) in &config.zones {
                out.zone(name, zone);
            }
        }
    }

    if !options.transient {
        out.lines.push(reload_line());
    }
    debug!(lines = out.lines.len(), %direction, "generated commands");
    out.lines
}

/// Joins lines into script text; `script` adds a shebang and `set -e`.
pub fn render(lines: &[String], script: bool) -> String {
    let mut out = String::new();
    if script {
        let _ = writeln!(out, "#!/bin/sh");
        let _ = writeln!(out, "set -e");
    }
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    out
}

struct Emitter<'a> {
    lines: Vec<String>,
    options: &'a GenerateOptions,
    verb: Verb,
}

impl Emitter<'_> {
    /// Pushes the permanent line and, in transient mode, its runtime twin
    fn emit(&mut self, has_runtime_form: bool, body: &str) {
        self.lines
            .push(format!("{COMMAND_NAME} {PERMANENT_FLAG} {body}"));
        if self.options.transient && has_runtime_form {
            self.lines.push(format!("{COMMAND_NAME} {body}"));
        }
    }

    fn banner(&mut self, text: &str) {
        if self.options.banners {
            self.lines.push(format!("# {text}"));
        }
    }

    fn zone(&mut self, name: &str, zone: &Zone) {
        let zone_flag = format!("--zone={}", shell_quote(name));
        let verb = self.verb;
        let mut flags: Vec<(ZoneField, String)> = Vec::new();

        for field in ZoneField::iter() {
            let stem = field.flag_stem();
            let with_value = |value: &str| format!("--{verb}-{stem}={}", shell_quote(value));
            match field.kind() {
                FieldKind::Target => {
                    if let Some(ref target) = zone.target {
                        let value = match verb {
                            Verb::Add => target.as_str(),
                            Verb::Remove => "default",
                        };
                        flags.push((field, format!("--set-target={}", shell_quote(value))));
                    }
                }
                FieldKind::Toggle => {
                    if zone.toggle(field) == Some(true) {
                        flags.push((field, format!("--{verb}-{stem}")));
                    }
                }
                FieldKind::Values => {
                    for item in zone.values(field).into_iter().flatten() {
                        flags.push((field, with_value(&item.value)));
                    }
                }
                FieldKind::Ports => {
                    for item in zone.port_list(field).into_iter().flatten() {
                        flags.push((field, with_value(&item.spec())));
                    }
                }
                FieldKind::ForwardPorts => {
                    for item in &zone.forward_ports {
                        flags.push((field, with_value(&item.spec())));
                    }
                }
                FieldKind::RichRules => {
                    for rule in &zone.rich_rules {
                        flags.push((field, with_value(&rule.to_string())));
                    }
                }
            }
        }

        if flags.is_empty() {
            return;
        }
        self.banner(&format!("Zone: {name}"));
        for (field, flag) in flags {
            self.emit(field.has_runtime_form(), &format!("{zone_flag} {flag}"));
        }
    }

    fn direct(&mut self, direct: &Direct, direction: Direction) {
        let mut seen = HashSet::new();
        let chains: Vec<&DirectChain> = direct
            .chains
            .iter()
            .filter(|c| seen.insert(c.key()))
            .collect();
        if chains.is_empty() && direct.rules.is_empty() && direct.passthroughs.is_empty() {
            return;
        }
        self.banner("Direct rules");

        let verb = self.verb;
        let chain_lines: Vec<String> = chains
            .iter()
            .map(|c| {
                format!(
                    "--direct --{verb}-chain {} {} {}",
                    shell_quote(&c.ipv),
                    shell_quote(&c.table),
                    shell_quote(&c.chain)
                )
            })
            .collect();
        let rule_lines: Vec<String> = direct
            .rules
            .iter()
            .map(|r| {
                format!(
                    "--direct --{verb}-rule {} {} {} {} {}",
                    shell_quote(&r.ipv),
                    shell_quote(&r.table),
                    shell_quote(&r.chain),
                    r.priority,
                    r.args
                )
            })
            .collect();
        let passthrough_lines: Vec<String> = direct
            .passthroughs
            .iter()
            .map(|p| format!("--direct --{verb}-passthrough {} {}", shell_quote(&p.ipv), p.args))
            .collect();

        let ordered: [Vec<String>; 3] = match direction {
            Direction::Apply => [chain_lines, rule_lines, passthrough_lines],
            Direction::Remove => [rule_lines, passthrough_lines, chain_lines],
        };
        for body in ordered.iter().flatten() {
            self.emit(true, body);
        }
    }
}
