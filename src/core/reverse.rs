//! Reverse parser: firewall-cmd command text back into a config fragment
//!
//! Each logical line is classified in a fixed order:
//!
//! 1. blank or comment (shebang included): skipped
//! 2. not a `firewall-cmd` invocation after an optional `sudo`/`doas`/`pkexec`: skipped
//! 3. contains a shell variable (`$X`, `${X}`, `$(...)`): error
//! 4. tokenized, quote-aware
//! 5. split into flags and positional words; `--permanent` and `--timeout` dropped
//! 6. reload: skipped
//! 7. query or introspection (`--state`, `--get-*`, `--list-*`, ...): skipped
//! 8. `--direct`: chain, rule or passthrough from positional words
//! 9. zone command: every flag applied to the zone named by `--zone`, or the
//!    default zone when the line modifies something
//! 10. anything else: error
//!
//! A failing line contributes nothing and never stops the batch.
//!
//! # Example
//!
//! ```
//! use dfwc::core::reverse::{ReverseOptions, reverse_parse};
//!
//! let result = reverse_parse(
//!     "firewall-cmd --permanent --zone=public --add-port=8080/tcp\n",
//!     &ReverseOptions::default(),
//! );
//! assert!(result.errors.is_empty());
//! assert_eq!(result.config.zones["public"].ports[0].spec(), "8080/tcp");
//! ```

use crate::core::firewall::{
    Config, Direct, DirectChain, DirectRule, ForwardPort, Passthrough, PortItem, ValueItem, Zone,
};
use crate::core::merge;
use crate::core::rich_rule;
use crate::core::schema::{COMMAND_NAME, DEFAULT_ZONE, FieldKind, PRIVILEGE_PREFIXES, ZoneField};
use crate::core::tokenize::{shell_quote, tokenize};
use crate::utils::truncate_string;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

/// `$NAME`, `${NAME}`, `$(command)`
static SHELL_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\{[^}]*\}|\([^)]*\)|[A-Za-z_][A-Za-z0-9_]*)").expect("shell pattern is valid")
});

/// Longest line text kept in diagnostics
const MAX_LINE_TEXT: usize = 200;

/// Privilege-command options that consume the following word
const PRIVILEGE_OPTIONS_WITH_ARG: &[&str] = &["-u", "-g", "-C", "-U", "-p"];

const DIRECT_VERB_FLAGS: &[&str] = &[
    "add-chain",
    "remove-chain",
    "add-rule",
    "remove-rule",
    "add-passthrough",
    "remove-passthrough",
];

const RELOAD_FLAGS: &[&str] = &["reload", "complete-reload"];

const QUERY_FLAGS: &[&str] = &[
    "state",
    "version",
    "help",
    "runtime-to-permanent",
    "check-config",
];

const QUERY_PREFIXES: &[&str] = &["get-", "list-", "query-", "info-"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseOptions {
    /// Zone for modifying lines without `--zone`
    pub default_zone: String,
}

impl Default for ReverseOptions {
    fn default() -> Self {
        Self {
            default_zone: DEFAULT_ZONE.to_string(),
        }
    }
}

/// Why a line was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
pub enum SkipReason {
    #[strum(serialize = "blank line")]
    Blank,
    #[strum(serialize = "comment")]
    Comment,
    #[strum(serialize = "not a firewall-cmd command")]
    NotCommand,
    #[strum(serialize = "reload")]
    Reload,
    #[strum(serialize = "query")]
    Query,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based number of the first physical line
    pub line: usize,
    pub text: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based number of the first physical line
    pub line: usize,
    pub text: String,
    pub message: String,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} [{}]", self.line, self.message, self.text)
    }
}

/// Result of [`reverse_parse`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseParse {
    pub config: Config,
    pub errors: Vec<LineError>,
    pub skipped: Vec<SkippedLine>,
    /// Line numbers that contributed to `config`
    pub parsed: Vec<usize>,
}

enum Outcome {
    Skip(SkipReason),
    Fail(String),
    Parsed(Config),
}

/// Rebuilds a config fragment from command text
pub fn reverse_parse(text: &str, options: &ReverseOptions) -> ReverseParse {
    let mut result = ReverseParse::default();
    let mut acc = Config::new();

    for (line, logical) in logical_lines(text) {
        let shown = || truncate_string(logical.trim(), MAX_LINE_TEXT);
        match classify(&logical, options) {
            Outcome::Skip(reason) => result.skipped.push(SkippedLine {
                line,
                text: shown(),
                reason,
            }),
            Outcome::Fail(message) => result.errors.push(LineError {
                line,
                text: shown(),
                message,
            }),
            Outcome::Parsed(fragment) => {
                absorb(&mut acc, fragment);
                result.parsed.push(line);
            }
        }
    }

    let mut config = merge::dedup(&acc);
    if config.direct.as_ref().is_some_and(Direct::is_empty) {
        config.direct = None;
    }
    result.config = config;

    debug!(
        parsed = result.parsed.len(),
        errors = result.errors.len(),
        skipped = result.skipped.len(),
        "reverse-parsed commands"
    );
    result
}

/// Joins backslash continuations; each entry carries its first line number
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (i, raw) in text.lines().enumerate() {
        let (start, mut buf) = pending.take().unwrap_or_else(|| (i + 1, String::new()));
        match raw.trim_end().strip_suffix('\\') {
            Some(head) => {
                buf.push_str(head);
                buf.push(' ');
                pending = Some((start, buf));
            }
            None => {
                buf.push_str(raw);
                out.push((start, buf));
            }
        }
    }
    if let Some(rest) = pending {
        out.push(rest);
    }
    out
}

/// Drops a leading privilege command and its options
fn strip_privilege<S: AsRef<str>>(words: &[S]) -> &[S] {
    let mut i = 0;
    while i < words.len() && PRIVILEGE_PREFIXES.contains(&words[i].as_ref()) {
        i += 1;
        while i < words.len() && words[i].as_ref().starts_with('-') {
            let takes_arg = PRIVILEGE_OPTIONS_WITH_ARG.contains(&words[i].as_ref());
            i += if takes_arg { 2 } else { 1 };
        }
    }
    &words[i.min(words.len())..]
}

fn is_command(word: &str) -> bool {
    word.rsplit('/').next() == Some(COMMAND_NAME)
}

fn classify(text: &str, options: &ReverseOptions) -> Outcome {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Outcome::Skip(SkipReason::Blank);
    }
    if trimmed.starts_with('#') {
        return Outcome::Skip(SkipReason::Comment);
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if !strip_privilege(&words).first().is_some_and(|w| is_command(w)) {
        return Outcome::Skip(SkipReason::NotCommand);
    }

    if let Some(found) = SHELL_VAR_RE.find(trimmed) {
        return Outcome::Fail(format!(
            "shell variable '{}' is not supported; expand it before importing",
            found.as_str()
        ));
    }

    let tokens = match tokenize(trimmed) {
        Ok(tokens) => tokens,
        Err(e) => return Outcome::Fail(e),
    };
    let args = match strip_privilege(&tokens).split_first() {
        Some((_command, args)) => args,
        None => return Outcome::Skip(SkipReason::NotCommand),
    };
    let call = Invocation::parse(args);

    if call.has_flag(|name| RELOAD_FLAGS.contains(&name)) {
        return Outcome::Skip(SkipReason::Reload);
    }
    if call.has_flag(|name| {
        QUERY_FLAGS.contains(&name) || QUERY_PREFIXES.iter().any(|p| name.starts_with(p))
    }) {
        return Outcome::Skip(SkipReason::Query);
    }

    let result = if call.has_flag(|name| name == "direct") {
        call.direct_fragment()
    } else {
        call.zone_fragment(options)
    };
    match result {
        Ok(fragment) => Outcome::Parsed(fragment),
        Err(message) => Outcome::Fail(message),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Flag handling
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Flag<'a> {
    name: &'a str,
    value: Option<&'a str>,
}

impl Flag<'_> {
    fn required_value(&self) -> Result<String, String> {
        match self.value {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(format!("--{} needs a value", self.name)),
        }
    }
}

/// Tokens of one invocation, command word removed
#[derive(Debug)]
struct Invocation<'a> {
    flags: Vec<Flag<'a>>,
    positionals: Vec<&'a str>,
    /// Direct verb flag and the words after it
    direct_call: Option<(&'a str, &'a [String])>,
}

/// What a zone-command flag writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagTarget {
    Field(ZoneField),
    SetTarget,
    NewZone,
}

impl FlagTarget {
    /// Closed mapping from normalized flag name to zone setter
    fn from_flag(name: &str) -> Option<Self> {
        match name {
            "set-target" => Some(FlagTarget::SetTarget),
            "new-zone" => Some(FlagTarget::NewZone),
            "change-interface" => Some(FlagTarget::Field(ZoneField::Interfaces)),
            "change-source" => Some(FlagTarget::Field(ZoneField::Sources)),
            _ => {
                let stem = name
                    .strip_prefix("add-")
                    .or_else(|| name.strip_prefix("remove-"))?;
                ZoneField::from_flag_stem(stem)
                    .filter(|f| f.kind() != FieldKind::Target)
                    .map(FlagTarget::Field)
            }
        }
    }
}

impl<'a> Invocation<'a> {
    fn parse(args: &'a [String]) -> Self {
        let mut call = Invocation {
            flags: Vec::new(),
            positionals: Vec::new(),
            direct_call: None,
        };
        let mut seen_direct = false;
        let mut i = 0;

        while i < args.len() {
            let token = args[i].as_str();
            i += 1;
            let Some(body) = token.strip_prefix("--") else {
                call.positionals.push(token);
                continue;
            };
            let (name, value) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            match name {
                "permanent" => {}
                "timeout" => {
                    if value.is_none() {
                        i += 1;
                    }
                }
                _ if seen_direct && DIRECT_VERB_FLAGS.contains(&name) => {
                    call.direct_call = Some((name, &args[i.min(args.len())..]));
                    break;
                }
                _ => {
                    seen_direct |= name == "direct";
                    call.flags.push(Flag { name, value });
                }
            }
        }
        call
    }

    fn has_flag(&self, pred: impl Fn(&str) -> bool) -> bool {
        self.flags.iter().any(|f| pred(f.name))
    }

    fn direct_fragment(&self) -> Result<Config, String> {
        let Some((verb, words)) = self.direct_call else {
            return Err("--direct without an add/remove chain, rule or passthrough".to_string());
        };
        let kind = verb
            .strip_prefix("add-")
            .or_else(|| verb.strip_prefix("remove-"))
            .unwrap_or(verb);
        let mut direct = Direct::default();

        match kind {
            "chain" => match words {
                [ipv, table, chain] => direct.chains.push(DirectChain::new(ipv, table, chain)),
                _ => {
                    return Err(format!(
                        "--{verb} needs exactly 3 arguments (ipv table chain), got {}",
                        words.len()
                    ));
                }
            },
            "rule" => {
                let [ipv, table, chain, priority, rest @ ..] = words else {
                    return Err(format!(
                        "--{verb} needs ipv, table, chain, priority and arguments, got {} words",
                        words.len()
                    ));
                };
                if rest.is_empty() {
                    return Err(format!("--{verb} has no rule arguments"));
                }
                let priority = priority
                    .parse()
                    .map_err(|_| format!("direct rule priority '{priority}' is not an integer"))?;
                direct.rules.push(DirectRule {
                    ipv: ipv.clone(),
                    table: table.clone(),
                    chain: chain.clone(),
                    priority,
                    args: rejoin(rest),
                    loop_var: None,
                });
            }
            _ => {
                let [ipv, rest @ ..] = words else {
                    return Err(format!("--{verb} needs ipv and arguments"));
                };
                if rest.is_empty() {
                    return Err(format!("--{verb} has no arguments"));
                }
                direct.passthroughs.push(Passthrough {
                    ipv: ipv.clone(),
                    args: rejoin(rest),
                    loop_var: None,
                });
            }
        }

        Ok(Config {
            direct: Some(direct),
            ..Config::default()
        })
    }

    fn zone_fragment(&self, options: &ReverseOptions) -> Result<Config, String> {
        let zone_flag = self.flags.iter().find(|f| f.name == "zone");
        let actions: Vec<&Flag> = self.flags.iter().filter(|f| f.name != "zone").collect();
        let modifies = actions
            .iter()
            .any(|f| FlagTarget::from_flag(f.name).is_some());

        if actions.is_empty() || (zone_flag.is_none() && !modifies) {
            return Err("unrecognized command".to_string());
        }
        if let Some(word) = self.positionals.first() {
            return Err(format!("unexpected argument '{word}'"));
        }

        let zone_name = match zone_flag {
            Some(flag) => flag.required_value()?,
            None => options.default_zone.clone(),
        };

        let mut fragment = Config::new();
        let mut zone = Zone::default();
        let mut touches_zone = false;

        for flag in actions {
            let target = FlagTarget::from_flag(flag.name)
                .ok_or_else(|| format!("unrecognized flag '--{}'", flag.name))?;
            match target {
                FlagTarget::NewZone => {
                    fragment.zone_mut(&flag.required_value()?);
                }
                FlagTarget::SetTarget => {
                    zone.target = Some(flag.required_value()?);
                    touches_zone = true;
                }
                FlagTarget::Field(field) => {
                    apply_field(&mut zone, field, flag)?;
                    touches_zone = true;
                }
            }
        }

        if touches_zone {
            fragment.zones.insert(zone_name, zone);
        }
        Ok(fragment)
    }
}

fn apply_field(zone: &mut Zone, field: ZoneField, flag: &Flag) -> Result<(), String> {
    match field.kind() {
        FieldKind::Toggle => zone.set_toggle(field, true),
        FieldKind::Values => {
            let value = flag.required_value()?;
            if let Some(list) = zone.values_mut(field) {
                list.push(ValueItem::new(value));
            }
        }
        FieldKind::Ports => {
            let value = flag.required_value()?;
            if let Some(list) = zone.port_list_mut(field) {
                list.push(PortItem::parse(&value));
            }
        }
        FieldKind::ForwardPorts => {
            let value = flag.required_value()?;
            zone.forward_ports.push(ForwardPort::parse(&value)?);
        }
        FieldKind::RichRules => {
            let value = flag.required_value()?;
            zone.rich_rules.push(rich_rule::parse(&value));
        }
        FieldKind::Target => return Err(format!("unrecognized flag '--{}'", flag.name)),
    }
    Ok(())
}

/// Rejoins raw rule words, re-quoting any that contain whitespace
fn rejoin(words: &[String]) -> String {
    words
        .iter()
        .map(|w| {
            if w.is_empty() || w.chars().any(char::is_whitespace) {
                shell_quote(w)
            } else {
                w.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Appends a one-line fragment to the accumulated config
fn absorb(acc: &mut Config, fragment: Config) {
    for (name, zone) in fragment.zones {
        let target = acc.zone_mut(&name);
        if zone.target.is_some() {
            target.target = zone.target;
        }
        target.interfaces.extend(zone.interfaces);
        target.sources.extend(zone.sources);
        target.services.extend(zone.services);
        target.ports.extend(zone.ports);
        target.protocols.extend(zone.protocols);
        target.source_ports.extend(zone.source_ports);
        target.rich_rules.extend(zone.rich_rules);
        target.forward = zone.forward.or(target.forward);
        target.masquerade = zone.masquerade.or(target.masquerade);
        target.forward_ports.extend(zone.forward_ports);
        target.icmp_blocks.extend(zone.icmp_blocks);
        target.icmp_block_inversion = zone.icmp_block_inversion.or(target.icmp_block_inversion);
    }
    if let Some(direct) = fragment.direct {
        let target = acc.direct_mut();
        target.chains.extend(direct.chains);
        target.rules.extend(direct.rules);
        target.passthroughs.extend(direct.passthroughs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ReverseParse {
        reverse_parse(text, &ReverseOptions::default())
    }

    #[test]
    fn test_port_scenario() {
        let result = parse("firewall-cmd --permanent --zone=public --add-port=8080/tcp");
        assert_eq!(
            result.config.zones["public"].ports,
            vec![PortItem::new("8080", "tcp")]
        );
        assert_eq!(result.parsed, [1]);
    }

    #[test]
    fn test_rich_rule_scenario() {
        let result = parse(
            r#"firewall-cmd --permanent --zone=public --add-rich-rule='rule family="ipv4" source address="10.0.0.1" service name="ssh" accept'"#,
        );
        let rule = &result.config.zones["public"].rich_rules[0];
        assert_eq!(rule.family.as_deref(), Some("ipv4"));
        assert_eq!(rule.source.as_deref(), Some("10.0.0.1"));
        assert_eq!(rule.service.as_deref(), Some("ssh"));
        assert_eq!(rule.action.as_deref(), Some("accept"));
    }

    #[test]
    fn test_shell_variable_line_isolated() {
        let result = parse(
            "firewall-cmd --zone=public --add-port=$PORT/tcp\nfirewall-cmd --zone=public --add-service=http\n",
        );
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 1);
        let zone = &result.config.zones["public"];
        assert!(zone.ports.is_empty());
        assert_eq!(zone.services, vec![ValueItem::new("http")]);
    }

    #[test]
    fn test_shell_variable_forms() {
        for line in [
            "firewall-cmd --add-service=${SVC}",
            "firewall-cmd --add-service=$(cat svc)",
        ] {
            assert_eq!(parse(line).errors.len(), 1, "{line}");
        }
    }

    #[test]
    fn test_default_zone_only_for_modifying_lines() {
        let result = parse("firewall-cmd --add-service=http\nfirewall-cmd --get-zones\n");
        assert_eq!(result.config.zones.len(), 1);
        assert!(result.config.zones.contains_key("public"));
        assert_eq!(result.skipped[0].reason, SkipReason::Query);

        let custom = reverse_parse(
            "firewall-cmd --add-service=http",
            &ReverseOptions {
                default_zone: "home".to_string(),
            },
        );
        assert!(custom.config.zones.contains_key("home"));
    }

    #[test]
    fn test_skips() {
        let result = parse(
            "#!/bin/sh\n\nset -e\n# comment\nfirewall-cmd --reload\nfirewall-cmd --state\nfirewall-cmd --permanent --list-all\n",
        );
        let reasons: Vec<SkipReason> = result.skipped.iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            [
                SkipReason::Comment,
                SkipReason::Blank,
                SkipReason::NotCommand,
                SkipReason::Comment,
                SkipReason::Reload,
                SkipReason::Query,
                SkipReason::Query,
            ]
        );
        assert!(result.errors.is_empty());
        assert_eq!(result.config, Config::default());
    }

    #[test]
    fn test_privilege_prefix() {
        let result = parse("sudo -n firewall-cmd --zone=dmz --add-masquerade\ndoas firewall-cmd --zone=dmz --add-forward");
        let zone = &result.config.zones["dmz"];
        assert_eq!(zone.masquerade, Some(true));
        assert_eq!(zone.forward, Some(true));
    }

    #[test]
    fn test_direct_commands() {
        let result = parse(
            "firewall-cmd --permanent --direct --add-chain ipv4 filter X\n\
             firewall-cmd --permanent --direct --add-rule ipv4 filter X 5 -m comment --comment 'allow all' -j ACCEPT\n\
             firewall-cmd --direct --add-passthrough ipv6 -A INPUT -j X\n",
        );
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let direct = result.config.direct.unwrap();
        assert_eq!(direct.chains, vec![DirectChain::new("ipv4", "filter", "X")]);
        assert_eq!(direct.rules[0].priority, 5);
        assert_eq!(
            direct.rules[0].args,
            "-m comment --comment 'allow all' -j ACCEPT"
        );
        assert_eq!(direct.passthroughs[0].args, "-A INPUT -j X");
    }

    #[test]
    fn test_direct_arity_errors() {
        let result = parse(
            "firewall-cmd --direct --add-chain ipv4 filter\n\
             firewall-cmd --direct --add-rule ipv4 filter X 0\n\
             firewall-cmd --direct --add-rule ipv4 filter X high -j DROP\n\
             firewall-cmd --direct --add-passthrough ipv4\n\
             firewall-cmd --direct\n",
        );
        assert_eq!(result.errors.len(), 5);
        assert_eq!(result.config.direct, None);
    }

    #[test]
    fn test_unrecognized_flag_rejects_whole_line() {
        let result = parse("firewall-cmd --zone=public --add-service=ssh --add-bogus=1");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("--add-bogus"));
        assert!(result.config.zones.is_empty());
    }

    #[test]
    fn test_unrecognized_command() {
        let result = parse("firewall-cmd --panic-on");
        assert_eq!(result.errors[0].message, "unrecognized command");
    }

    #[test]
    fn test_multiple_flags_and_continuation() {
        let result = parse(
            "firewall-cmd --permanent --zone=work \\\n  --add-service=ssh \\\n  --add-port=22/tcp # admin access\nfirewall-cmd --zone=work --add-port=bad",
        );
        let zone = &result.config.zones["work"];
        assert_eq!(zone.services, vec![ValueItem::new("ssh")]);
        assert_eq!(zone.ports[0], PortItem::new("22", "tcp"));
        assert_eq!(result.parsed, [1, 4]);
    }

    #[test]
    fn test_remove_flags_populate_fields() {
        let result = parse(
            "firewall-cmd --zone=public --remove-service=telnet\nfirewall-cmd --zone=public --set-target=default\nfirewall-cmd --zone=public --remove-icmp-block-inversion",
        );
        let zone = &result.config.zones["public"];
        assert_eq!(zone.services, vec![ValueItem::new("telnet")]);
        assert_eq!(zone.target.as_deref(), Some("default"));
        assert_eq!(zone.icmp_block_inversion, Some(true));
    }

    #[test]
    fn test_forward_port_and_new_zone() {
        let result = parse(
            "firewall-cmd --permanent --new-zone=lab\nfirewall-cmd --zone=lab --add-forward-port=port=80:proto=tcp:toport=8080:toaddr=10.0.0.2\nfirewall-cmd --zone=lab --add-forward-port=proto=tcp\n",
        );
        let fp = &result.config.zones["lab"].forward_ports[0];
        assert_eq!(fp.to_addr.as_deref(), Some("10.0.0.2"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 3);
    }

    #[test]
    fn test_transient_duplicates_dedup() {
        let result = parse(
            "firewall-cmd --permanent --zone=public --add-service=ssh\nfirewall-cmd --zone=public --add-service=ssh\n",
        );
        assert_eq!(result.config.zones["public"].services.len(), 1);
    }

    #[test]
    fn test_change_interface_and_timeout() {
        let result = parse(
            "firewall-cmd --zone=internal --change-interface=eth1\nfirewall-cmd --zone=internal --add-service=dns --timeout=60",
        );
        let zone = &result.config.zones["internal"];
        assert_eq!(zone.interfaces, vec![ValueItem::new("eth1")]);
        assert_eq!(zone.services, vec![ValueItem::new("dns")]);
    }

    #[test]
    fn test_unterminated_quote_is_line_error() {
        let result = parse("firewall-cmd --zone=public --add-rich-rule='rule accept");
        assert_eq!(result.errors.len(), 1);
    }
}
