//! Structural and lexical validation of a raw declarative document
//!
//! Runs over the generic YAML tree before anything is typed. Fatal errors are
//! the shapes [`Config::from_document`](crate::core::firewall::Config::from_document)
//! could not hold (a zone that is not a mapping, a list field that is not a
//! list, a priority that is not an integer). Everything else, from unknown
//! keys to malformed port numbers, is a warning and the document still
//! renders.
//!
//! Unknown keys carry a suggestion when a valid key is within edit distance 2:
//!
//! ```
//! use dfwc::core::validate::validate;
//!
//! let doc: serde_yaml::Value = serde_yaml::from_str(
//!     "zones:\n  public:\n    servics: [ssh]\n",
//! ).unwrap();
//! let result = validate(&doc);
//! assert!(result.errors.is_empty());
//! assert_eq!(result.warnings[0].suggestion.as_deref(), Some("services"));
//! ```

use crate::core::error::Diagnostic;
use crate::core::firewall::{ForwardPort, RichRule};
use crate::core::rich_rule;
use crate::core::schema::{
    ANY_ADDR_VARIABLE, DIRECT_CHAIN_KEYS, DIRECT_KEYS, DIRECT_RULE_KEYS, DIRECT_RULE_REQUIRED,
    DirectFamily, FORWARD_PORT_KEYS, FieldKind, Family, ITEM_VARIABLE, LOOP_KEY, LogLevel,
    PASSTHROUGH_KEYS, PORT_KEYS, RICH_FORWARD_PORT_KEYS, RICH_LOG_KEYS, RICH_RULE_EFFECT_KEYS,
    RICH_RULE_KEYS, RICH_SOURCE_PORT_KEYS, RULE_GROUP_KEYS, RULE_GROUP_PASSTHROUGH_KEYS,
    RULE_GROUP_REQUIRED, RULE_GROUP_RULE_KEYS, RuleAction, TOP_LEVEL_KEYS, VALUE_ITEM_KEYS,
    ZONE_KEYS, ZoneField, ZoneTarget,
};
use crate::validators;
use serde_yaml::{Mapping, Value};
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::debug;

/// Maximum edit distance for a "did you mean" suggestion
pub const SUGGESTION_DISTANCE: usize = 2;

/// Outcome of [`validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Fatal findings; downstream stages must not run when non-empty
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Validation {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Nearest valid key within [`SUGGESTION_DISTANCE`]; ties go to the first
/// candidate in catalog order.
pub fn suggest(key: &str, valid: &[&'static str]) -> Option<&'static str> {
    let mut best: Option<(&'static str, usize)> = None;
    for &candidate in valid {
        let distance = strsim::levenshtein(key, candidate);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.filter(|&(_, d)| d <= SUGGESTION_DISTANCE)
        .map(|(candidate, _)| candidate)
}

/// Validates a raw document tree. Never mutates its input.
pub fn validate(doc: &Value) -> Validation {
    let mut checker = Checker::default();
    checker.document(doc);
    debug!(
        errors = checker.result.errors.len(),
        warnings = checker.result.warnings.len(),
        "validated document"
    );
    checker.result
}

// ═══════════════════════════════════════════════════════════════════════════
// Tree helpers
// ═══════════════════════════════════════════════════════════════════════════

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn index(path: &str, i: usize) -> String {
    format!("{path}[{i}]")
}

/// String form of a scalar node
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn is_templated(text: &str) -> bool {
    text.contains("{{")
}

/// Value kinds that get a lexical check
#[derive(Debug, Clone, Copy)]
enum Lexeme {
    Interface,
    Address,
    PortSpec,
    PortNumber,
    Protocol,
    Target,
    Family,
    Action,
    LogLevel,
    LogPrefix,
    DirectFamily,
}

impl Lexeme {
    fn check(self, text: &str) -> Result<(), String> {
        let enum_err = |what: &str| format!("unrecognized {what} '{text}'");
        match self {
            Lexeme::Interface => validators::validate_interface(text).map(|_| ()),
            Lexeme::Address => validators::validate_address(text),
            Lexeme::PortSpec => {
                let (port, protocol) = text.split_once('/').unwrap_or((text, "tcp"));
                validators::validate_port_spec(port)?;
                validators::validate_protocol(protocol).map(|_| ())
            }
            Lexeme::PortNumber => validators::validate_port_spec(text).map(|_| ()),
            Lexeme::Protocol => validators::validate_protocol(text).map(|_| ()),
            Lexeme::Target => ZoneTarget::from_str(text)
                .map(|_| ())
                .map_err(|_| enum_err("zone target")),
            Lexeme::Family => Family::from_str(text)
                .map(|_| ())
                .map_err(|_| enum_err("rich rule family")),
            Lexeme::Action => RuleAction::from_str(text)
                .map(|_| ())
                .map_err(|_| enum_err("rich rule action")),
            Lexeme::LogLevel => LogLevel::from_str(text)
                .map(|_| ())
                .map_err(|_| enum_err("log level")),
            Lexeme::LogPrefix => validators::validate_log_prefix(text),
            Lexeme::DirectFamily => DirectFamily::from_str(text)
                .map(|_| ())
                .map_err(|_| enum_err("direct ipv")),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Checker
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct Checker {
    result: Validation,
}

impl Checker {
    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.result.errors.push(Diagnostic::new(path, message));
    }

    fn warn(&mut self, path: &str, message: impl Into<String>) {
        self.result.warnings.push(Diagnostic::new(path, message));
    }

    fn lexical(&mut self, path: &str, lexeme: Lexeme, text: &str) {
        if is_templated(text) {
            return;
        }
        if let Err(message) = lexeme.check(text) {
            self.warn(path, message);
        }
    }

    /// Warns on every key outside `valid`, suggesting the closest one
    fn check_keys(&mut self, path: &str, map: &Mapping, valid: &[&'static str], what: &str) {
        for key in map.keys() {
            let name = scalar_text(key).unwrap_or_else(|| format!("{key:?}"));
            if valid.contains(&name.as_str()) {
                continue;
            }
            let mut diag = Diagnostic::new(child(path, &name), format!("unknown {what} key"));
            if let Some(suggestion) = suggest(&name, valid) {
                diag = diag.with_suggestion(suggestion);
            }
            self.result.warnings.push(diag);
        }
    }

    fn check_required(&mut self, path: &str, map: &Mapping, required: &[&str], what: &str) {
        for key in required {
            if !map.contains_key(*key) {
                self.warn(path, format!("{what} is missing '{key}'"));
            }
        }
    }

    /// Scalar field; returns its string form when present and scalar
    fn scalar(&mut self, path: &str, map: &Mapping, key: &str) -> Option<String> {
        let value = map.get(key)?;
        let text = scalar_text(value);
        if text.is_none() {
            self.error(
                &child(path, key),
                format!("expected a scalar value, found {}", type_name(value)),
            );
        }
        text
    }

    fn boolean(&mut self, path: &str, map: &Mapping, key: &str) {
        if let Some(value) = map.get(key)
            && !value.is_bool()
        {
            self.error(
                &child(path, key),
                format!("expected true or false, found {}", type_name(value)),
            );
        }
    }

    fn loop_directive(&mut self, path: &str, map: &Mapping) {
        if let Some(value) = map.get(LOOP_KEY)
            && !value.is_string()
        {
            self.error(
                &child(path, LOOP_KEY),
                format!("loop must name a list variable, found {}", type_name(value)),
            );
        }
    }

    fn priority(&mut self, path: &str, map: &Mapping) {
        let Some(value) = map.get("priority") else {
            return;
        };
        let ok = match value {
            Value::Number(n) => n.as_i64().is_some_and(|i| i32::try_from(i).is_ok()),
            Value::String(s) => s.trim().parse::<i32>().is_ok(),
            _ => false,
        };
        if !ok {
            self.error(
                &child(path, "priority"),
                format!(
                    "priority must be an integer, found {}",
                    scalar_text(value).map_or_else(|| type_name(value).to_string(), |s| format!("'{s}'"))
                ),
            );
        }
    }

    /// Optional list field; returns its items when present and a list
    fn list<'a>(&mut self, path: &str, map: &'a Mapping, key: &str) -> Option<&'a [Value]> {
        let value = map.get(key)?;
        match value {
            Value::Sequence(items) => Some(items),
            other => {
                self.error(
                    &child(path, key),
                    format!("expected a list, found {}", type_name(other)),
                );
                None
            }
        }
    }

    fn mapping<'a>(&mut self, path: &str, value: &'a Value, what: &str) -> Option<&'a Mapping> {
        match value {
            Value::Mapping(map) => Some(map),
            other => {
                self.error(
                    path,
                    format!("{what} must be a mapping, found {}", type_name(other)),
                );
                None
            }
        }
    }

    // ───────────────────────────────────────────────────────────────────────
    // Top level
    // ───────────────────────────────────────────────────────────────────────

    fn document(&mut self, doc: &Value) {
        let Value::Mapping(root) = doc else {
            self.error(
                "",
                format!("document must be a mapping, found {}", type_name(doc)),
            );
            return;
        };
        self.check_keys("", root, TOP_LEVEL_KEYS, "top-level");

        if let Some(variables) = root.get("variables") {
            self.variables(variables);
        }
        if let Some(zones) = root.get("zones") {
            self.zones(zones);
        }
        if let Some(direct) = root.get("direct") {
            self.direct(direct);
        }
    }

    fn variables(&mut self, value: &Value) {
        let Some(map) = self.mapping("variables", value, "variables") else {
            return;
        };
        for (key, value) in map {
            let Some(name) = key.as_str() else {
                self.error("variables", "variable names must be strings");
                continue;
            };
            let path = child("variables", name);
            if name == ITEM_VARIABLE || name == ANY_ADDR_VARIABLE {
                self.warn(&path, format!("'{name}' is reserved and will be ignored"));
            }
            let shape_ok = match value {
                Value::Sequence(items) => items.iter().all(|i| scalar_text(i).is_some()),
                other => scalar_text(other).is_some(),
            };
            if !shape_ok {
                self.error(&path, "variable must be a scalar or a list of scalars");
            }
        }
    }

    // ───────────────────────────────────────────────────────────────────────
    // Zones
    // ───────────────────────────────────────────────────────────────────────

    fn zones(&mut self, value: &Value) {
        if value.is_null() {
            return;
        }
        let Some(map) = self.mapping("zones", value, "zones") else {
            return;
        };
        for (key, zone) in map {
            let Some(name) = key.as_str() else {
                self.error("zones", "zone names must be strings");
                continue;
            };
            let path = child("zones", name);
            if zone.is_null() {
                continue;
            }
            if let Some(zone) = self.mapping(&path, zone, "zone") {
                self.zone(&path, zone);
            }
        }
    }

    fn zone(&mut self, path: &str, zone: &Mapping) {
        self.check_keys(path, zone, ZONE_KEYS, "zone");

        for field in ZoneField::iter() {
            let key = field.key();
            match field.kind() {
                FieldKind::Target => {
                    if let Some(target) = self.scalar(path, zone, key) {
                        self.lexical(&child(path, key), Lexeme::Target, &target);
                    }
                }
                FieldKind::Toggle => self.boolean(path, zone, key),
                FieldKind::Values => {
                    let Some(items) = self.list(path, zone, key) else {
                        continue;
                    };
                    let lexeme = match field {
                        ZoneField::Interfaces => Some(Lexeme::Interface),
                        ZoneField::Sources => Some(Lexeme::Address),
                        _ => None,
                    };
                    let list_path = child(path, key);
                    for (i, item) in items.iter().enumerate() {
                        self.value_item(&index(&list_path, i), item, lexeme);
                    }
                }
                FieldKind::Ports => {
                    let Some(items) = self.list(path, zone, key) else {
                        continue;
                    };
                    let list_path = child(path, key);
                    for (i, item) in items.iter().enumerate() {
                        self.port_item(&index(&list_path, i), item);
                    }
                }
                FieldKind::ForwardPorts => {
                    let Some(items) = self.list(path, zone, key) else {
                        continue;
                    };
                    let list_path = child(path, key);
                    for (i, item) in items.iter().enumerate() {
                        self.forward_port(&index(&list_path, i), item);
                    }
                }
                FieldKind::RichRules => {
                    let Some(items) = self.list(path, zone, key) else {
                        continue;
                    };
                    let list_path = child(path, key);
                    for (i, item) in items.iter().enumerate() {
                        self.rich_rule(&index(&list_path, i), item);
                    }
                }
            }
        }
    }

    fn value_item(&mut self, path: &str, item: &Value, lexeme: Option<Lexeme>) {
        let text = match item {
            Value::Mapping(map) => {
                self.check_keys(path, map, VALUE_ITEM_KEYS, "list item");
                self.loop_directive(path, map);
                let value = self.scalar(path, map, "value");
                if value.is_none() && !map.contains_key("value") {
                    self.warn(path, "list item is missing 'value'");
                }
                value
            }
            other => {
                let text = scalar_text(other);
                if text.is_none() {
                    self.error(
                        path,
                        format!("expected a string or {{value, loop}}, found {}", type_name(other)),
                    );
                }
                text
            }
        };
        if let (Some(lexeme), Some(text)) = (lexeme, text) {
            self.lexical(path, lexeme, &text);
        }
    }

    fn port_item(&mut self, path: &str, item: &Value) {
        match item {
            Value::Mapping(map) => {
                self.check_keys(path, map, PORT_KEYS, "port");
                self.loop_directive(path, map);
                match self.scalar(path, map, "port") {
                    Some(port) => self.lexical(&child(path, "port"), Lexeme::PortNumber, &port),
                    None if !map.contains_key("port") => self.warn(path, "port is missing 'port'"),
                    None => {}
                }
                if let Some(protocol) = self.scalar(path, map, "protocol") {
                    self.lexical(&child(path, "protocol"), Lexeme::Protocol, &protocol);
                }
            }
            other => match scalar_text(other) {
                Some(spec) => self.lexical(path, Lexeme::PortSpec, &spec),
                None => self.error(
                    path,
                    format!("expected a port spec or mapping, found {}", type_name(other)),
                ),
            },
        }
    }

    fn forward_port(&mut self, path: &str, item: &Value) {
        match item {
            Value::Mapping(map) => {
                self.check_keys(path, map, FORWARD_PORT_KEYS, "forward port");
                self.loop_directive(path, map);
                match self.scalar(path, map, "port") {
                    Some(port) => self.lexical(&child(path, "port"), Lexeme::PortNumber, &port),
                    None if !map.contains_key("port") => {
                        self.warn(path, "forward port is missing 'port'");
                    }
                    None => {}
                }
                if let Some(protocol) = self.scalar(path, map, "protocol") {
                    self.lexical(&child(path, "protocol"), Lexeme::Protocol, &protocol);
                }
                if let Some(to_port) = self.scalar(path, map, "to_port") {
                    self.lexical(&child(path, "to_port"), Lexeme::PortNumber, &to_port);
                }
                if let Some(to_addr) = self.scalar(path, map, "to_addr") {
                    self.lexical(&child(path, "to_addr"), Lexeme::Address, &to_addr);
                }
            }
            Value::String(spec) => {
                if let Err(message) = ForwardPort::parse(spec) {
                    self.error(path, message);
                }
            }
            other => self.error(
                path,
                format!("expected a forward-port spec or mapping, found {}", type_name(other)),
            ),
        }
    }

    fn rich_rule(&mut self, path: &str, item: &Value) {
        match item {
            Value::String(text) => {
                let (rule, rest) = rich_rule::parse_with_rest(text);
                if let Some(token) = rest {
                    self.warn(path, format!("rich rule text not understood from '{token}'"));
                }
                if !has_effect(&rule) {
                    self.warn(path, "rich rule has no action, log, audit or masquerade");
                }
                self.rich_rule_lexical(path, &rule);
            }
            Value::Mapping(map) => {
                self.check_keys(path, map, RICH_RULE_KEYS, "rich rule");
                self.loop_directive(path, map);
                for key in [
                    "family",
                    "source",
                    "destination",
                    "service",
                    "port",
                    "protocol",
                    "icmp_block",
                    "icmp_type",
                    "action",
                    "reject_type",
                    "mark_set",
                ] {
                    self.scalar(path, map, key);
                }
                for key in ["source_invert", "destination_invert", "masquerade", "audit"] {
                    self.boolean(path, map, key);
                }
                self.rich_sub_object(path, map, "log", RICH_LOG_KEYS);
                self.rich_sub_object(path, map, "forward_port", RICH_FORWARD_PORT_KEYS);
                self.rich_sub_object(path, map, "source_port", RICH_SOURCE_PORT_KEYS);

                if !RICH_RULE_EFFECT_KEYS.iter().any(|k| map.contains_key(*k)) {
                    self.warn(path, "rich rule has no action, log, audit or masquerade");
                }
                // Only lexical checks remain; skip them if the shape was rejected.
                if let Ok(rule) = serde_yaml::from_value::<RichRule>(item.clone()) {
                    self.rich_rule_lexical(path, &rule);
                }
            }
            other => self.error(
                path,
                format!("expected a rule string or mapping, found {}", type_name(other)),
            ),
        }
    }

    fn rich_sub_object(&mut self, path: &str, map: &Mapping, key: &str, valid: &[&'static str]) {
        let Some(value) = map.get(key) else {
            return;
        };
        let sub_path = child(path, key);
        if let Some(sub) = self.mapping(&sub_path, value, key) {
            self.check_keys(&sub_path, sub, valid, key);
            for field in valid {
                self.scalar(&sub_path, sub, field);
            }
        }
    }

    fn rich_rule_lexical(&mut self, path: &str, rule: &RichRule) {
        if let Some(ref family) = rule.family {
            self.lexical(&child(path, "family"), Lexeme::Family, family);
        }
        if let Some(ref source) = rule.source {
            self.lexical(&child(path, "source"), Lexeme::Address, source);
        }
        if let Some(ref destination) = rule.destination {
            self.lexical(&child(path, "destination"), Lexeme::Address, destination);
        }
        if let Some(ref port) = rule.port {
            self.lexical(&child(path, "port"), Lexeme::PortNumber, port);
        }
        if let Some(ref action) = rule.action {
            self.lexical(&child(path, "action"), Lexeme::Action, action);
        }
        if let Some(ref log) = rule.log {
            if let Some(ref level) = log.level {
                self.lexical(&child(path, "log.level"), Lexeme::LogLevel, level);
            }
            if let Some(ref prefix) = log.prefix {
                self.lexical(&child(path, "log.prefix"), Lexeme::LogPrefix, prefix);
            }
        }
    }

    // ───────────────────────────────────────────────────────────────────────
    // Direct
    // ───────────────────────────────────────────────────────────────────────

    fn direct(&mut self, value: &Value) {
        let path = "direct";
        let Some(direct) = self.mapping(path, value, "direct") else {
            return;
        };
        self.check_keys(path, direct, DIRECT_KEYS, "direct");

        if let Some(chains) = self.list(path, direct, "chains") {
            for (i, chain) in chains.iter().enumerate() {
                let item_path = index("direct.chains", i);
                if let Some(map) = self.mapping(&item_path, chain, "direct chain") {
                    self.check_keys(&item_path, map, DIRECT_CHAIN_KEYS, "direct chain");
                    self.check_required(&item_path, map, DIRECT_CHAIN_KEYS, "direct chain");
                    self.ipv(&item_path, map);
                    for key in ["table", "chain"] {
                        self.scalar(&item_path, map, key);
                    }
                }
            }
        }

        if let Some(rules) = self.list(path, direct, "rules") {
            for (i, rule) in rules.iter().enumerate() {
                let item_path = index("direct.rules", i);
                if let Some(map) = self.mapping(&item_path, rule, "direct rule") {
                    self.check_keys(&item_path, map, DIRECT_RULE_KEYS, "direct rule");
                    self.check_required(&item_path, map, DIRECT_RULE_REQUIRED, "direct rule");
                    self.ipv(&item_path, map);
                    for key in ["table", "chain", "args"] {
                        self.scalar(&item_path, map, key);
                    }
                    self.priority(&item_path, map);
                    self.loop_directive(&item_path, map);
                }
            }
        }

        if let Some(passthroughs) = self.list(path, direct, "passthroughs") {
            for (i, passthrough) in passthroughs.iter().enumerate() {
                let item_path = index("direct.passthroughs", i);
                if let Some(map) = self.mapping(&item_path, passthrough, "passthrough") {
                    self.check_keys(&item_path, map, PASSTHROUGH_KEYS, "passthrough");
                    self.check_required(&item_path, map, &["ipv", "args"], "passthrough");
                    self.ipv(&item_path, map);
                    self.scalar(&item_path, map, "args");
                    self.loop_directive(&item_path, map);
                }
            }
        }

        if let Some(groups) = self.list(path, direct, "rule_groups") {
            for (i, group) in groups.iter().enumerate() {
                let item_path = index("direct.rule_groups", i);
                if let Some(map) = self.mapping(&item_path, group, "rule group") {
                    self.rule_group(&item_path, map);
                }
            }
        }
    }

    fn ipv(&mut self, path: &str, map: &Mapping) {
        if let Some(ipv) = self.scalar(path, map, "ipv") {
            self.lexical(&child(path, "ipv"), Lexeme::DirectFamily, &ipv);
        }
    }

    fn rule_group(&mut self, path: &str, group: &Mapping) {
        self.check_keys(path, group, RULE_GROUP_KEYS, "rule group");
        self.check_required(path, group, RULE_GROUP_REQUIRED, "rule group");
        for key in ["table", "chain"] {
            self.scalar(path, group, key);
        }
        self.priority(path, group);

        match group.get("ipv") {
            Some(Value::Sequence(families)) => {
                let ipv_path = child(path, "ipv");
                for (i, family) in families.iter().enumerate() {
                    match scalar_text(family) {
                        Some(text) => {
                            self.lexical(&index(&ipv_path, i), Lexeme::DirectFamily, &text);
                        }
                        None => self.error(&index(&ipv_path, i), "ipv entries must be scalars"),
                    }
                }
            }
            Some(_) => self.ipv(path, group),
            None => {}
        }

        if let Some(rules) = self.list(path, group, "rules") {
            let rules_path = child(path, "rules");
            for (i, rule) in rules.iter().enumerate() {
                let item_path = index(&rules_path, i);
                if let Some(map) = self.mapping(&item_path, rule, "rule group rule") {
                    self.check_keys(&item_path, map, RULE_GROUP_RULE_KEYS, "rule group rule");
                    self.check_required(&item_path, map, &["args"], "rule group rule");
                    self.scalar(&item_path, map, "args");
                    self.priority(&item_path, map);
                    self.loop_directive(&item_path, map);
                }
            }
        }

        if let Some(passthroughs) = self.list(path, group, "passthroughs") {
            let pt_path = child(path, "passthroughs");
            for (i, passthrough) in passthroughs.iter().enumerate() {
                let item_path = index(&pt_path, i);
                match passthrough {
                    Value::String(_) => {}
                    Value::Mapping(map) => {
                        self.check_keys(
                            &item_path,
                            map,
                            RULE_GROUP_PASSTHROUGH_KEYS,
                            "rule group passthrough",
                        );
                        self.check_required(&item_path, map, &["args"], "rule group passthrough");
                        self.scalar(&item_path, map, "args");
                        self.loop_directive(&item_path, map);
                    }
                    other => self.error(
                        &item_path,
                        format!("expected a string or mapping, found {}", type_name(other)),
                    ),
                }
            }
        }
    }
}

fn has_effect(rule: &RichRule) -> bool {
    rule.action.is_some() || rule.log.is_some() || rule.audit || rule.masquerade
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(yaml: &str) -> Validation {
        validate(&serde_yaml::from_str(yaml).unwrap())
    }

    fn paths(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().map(|d| d.path.as_str()).collect()
    }

    #[test]
    fn test_clean_document() {
        let result = check(
            r#"
variables:
  web: [80, 443]
zones:
  public:
    target: DROP
    interfaces: [eth0]
    sources: [10.0.0.0/8]
    services: [ssh]
    ports: ["8080/tcp", { port: "{{item}}", loop: "{{web}}" }]
    masquerade: true
    forward_ports: ["port=22:proto=tcp:toport=2222"]
    rich_rules:
      - { family: ipv4, source: 10.0.0.1, service: ssh, action: accept }
direct:
  chains: [{ ipv: ipv4, table: filter, chain: X }]
  rules: [{ ipv: ipv4, table: filter, chain: X, priority: 0, args: "-j ACCEPT" }]
"#,
        );
        assert!(result.is_ok(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_top_level_not_mapping_is_fatal() {
        let result = check("- a\n- b\n");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("must be a mapping"));
    }

    #[test]
    fn test_structural_errors() {
        let result = check(
            r"
variables: [a]
zones:
  public:
    ports: 8080
  internal: [eth0]
direct:
  rules: {}
",
        );
        assert_eq!(
            paths(&result.errors),
            ["variables", "zones.public.ports", "zones.internal", "direct.rules"]
        );
    }

    #[test]
    fn test_unknown_key_suggestion() {
        let result = check("zones:\n  public:\n    servics: [ssh]\n    xyzzy: 1\n");
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.warnings[0].suggestion.as_deref(), Some("services"));
        assert_eq!(result.warnings[1].suggestion, None);
    }

    #[test]
    fn test_suggest_tie_takes_first() {
        assert_eq!(suggest("ab", &["aa", "bb"]), Some("aa"));
        assert_eq!(suggest("zzzzzz", &["ports"]), None);
    }

    #[test]
    fn test_unknown_target_warns() {
        let result = check("zones:\n  public:\n    target: accept\n");
        assert!(result.is_ok());
        assert_eq!(paths(&result.warnings), ["zones.public.target"]);
    }

    #[test]
    fn test_rich_rule_without_effect_warns() {
        let result = check(
            "zones:\n  public:\n    rich_rules:\n      - { service: ssh }\n      - 'rule service name=\"http\"'\n",
        );
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_rich_rule_text_out_of_order_warns() {
        let result = check(
            "zones:\n  public:\n    rich_rules:\n      - 'rule family=\"ipv4\" accept service name=\"ssh\"'\n      - 'rule family=\"ipv4\" service name=\"ssh\" accept'\n",
        );
        assert!(result.is_ok());
        assert_eq!(paths(&result.warnings), ["zones.public.rich_rules[0]"]);
        assert_eq!(
            result.warnings[0].message,
            "rich rule text not understood from 'service'"
        );
    }

    #[test]
    fn test_null_zones_is_empty() {
        for yaml in ["zones: null\n", "zones:\n"] {
            let result = check(yaml);
            assert!(result.is_ok(), "{:?}", result.errors);
            assert!(result.warnings.is_empty());

            let doc: Value = serde_yaml::from_str(yaml).unwrap();
            let config = crate::core::firewall::Config::from_document(&doc).unwrap();
            assert!(config.zones.is_empty());
        }
    }

    #[test]
    fn test_direct_rule_missing_fields_warn() {
        let result = check("direct:\n  rules:\n    - { ipv: ipv4, args: '-j DROP' }\n");
        assert!(result.is_ok());
        let messages: Vec<&str> = result.warnings.iter().map(|d| d.message.as_str()).collect();
        assert!(messages.contains(&"direct rule is missing 'table'"));
        assert!(messages.contains(&"direct rule is missing 'priority'"));
    }

    #[test]
    fn test_non_integer_priority_is_fatal() {
        let result = check(
            "direct:\n  rules:\n    - { ipv: ipv4, table: filter, chain: X, priority: high, args: x }\n",
        );
        assert_eq!(paths(&result.errors), ["direct.rules[0].priority"]);
    }

    #[test]
    fn test_lexical_warnings_skip_templates() {
        let result = check(
            r#"
zones:
  public:
    interfaces: ["bad iface!", "{{nic}}"]
    ports: ["99999/tcp", "80/icmp", "{{p}}/tcp"]
"#,
        );
        assert!(result.is_ok());
        assert_eq!(
            paths(&result.warnings),
            ["zones.public.interfaces[0]", "zones.public.ports[0]", "zones.public.ports[1]"]
        );
    }

    #[test]
    fn test_reserved_variable_names_warn() {
        let result = check("variables:\n  item: x\n  any: y\n");
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_bad_forward_port_string_is_fatal() {
        let result = check("zones:\n  public:\n    forward_ports: ['toport=80']\n");
        assert_eq!(paths(&result.errors), ["zones.public.forward_ports[0]"]);
    }

    #[test]
    fn test_toggle_must_be_bool() {
        let result = check("zones:\n  public:\n    masquerade: yes please\n");
        assert_eq!(paths(&result.errors), ["zones.public.masquerade"]);
    }

    #[test]
    fn test_rule_group_checks() {
        let result = check(
            r"
direct:
  rule_groups:
    - ipv: [ipv4, ipx]
      table: filter
      chain: X
      rules: [{ args: '-j ACCEPT', prio: 1 }]
      passthroughs: ['-A INPUT -j X', [nested]]
",
        );
        assert_eq!(paths(&result.errors), ["direct.rule_groups[0].passthroughs[1]"]);
        let warn_paths = paths(&result.warnings);
        assert!(warn_paths.contains(&"direct.rule_groups[0].ipv[1]"));
        assert!(warn_paths.contains(&"direct.rule_groups[0].rules[0].prio"));
    }

    #[test]
    fn test_validated_documents_normalize() {
        let doc: Value = serde_yaml::from_str(
            r"
zones:
  public:
    ports: [8080, { port: 53, protocol: udp }]
    rich_rules: ['rule family=ipv4 drop']
  empty:
",
        )
        .unwrap();
        assert!(validate(&doc).is_ok());
        assert!(crate::core::firewall::Config::from_document(&doc).is_ok());
    }
}
