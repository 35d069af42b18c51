//! Deep merge of two configs with per-entity deduplication
//!
//! Arrays are concatenated (existing first) and then collapsed by an
//! entity key:
//!
//! | Entity         | Key                                      |
//! |----------------|------------------------------------------|
//! | plain value    | value                                    |
//! | port           | `port/protocol`                          |
//! | forward port   | `port/protocol/to_port/to_addr`          |
//! | rich rule      | whole rule                               |
//! | direct chain   | `ipv/table/chain`                        |
//! | direct rule    | `ipv/table/chain/priority/args`          |
//! | passthrough    | `ipv/args`                               |
//!
//! Items still carrying a `loop` directive are keyed with it, so a template
//! item never collapses into a literal one.

use crate::core::firewall::{
    Config, Direct, DirectChain, DirectRule, ForwardPort, Passthrough, PortItem, RichRule,
    ValueItem, Zone,
};
use std::collections::HashSet;
use std::hash::Hash;
use tracing::debug;

/// Identity of a list entity for deduplication
pub trait MergeKey {
    type Key<'a>: Eq + Hash
    where
        Self: 'a;

    fn merge_key(&self) -> Self::Key<'_>;
}

impl MergeKey for ValueItem {
    type Key<'a> = (&'a str, Option<&'a str>);

    fn merge_key(&self) -> Self::Key<'_> {
        (&self.value, self.loop_var.as_deref())
    }
}

impl MergeKey for PortItem {
    type Key<'a> = (&'a str, &'a str, Option<&'a str>);

    fn merge_key(&self) -> Self::Key<'_> {
        (&self.port, &self.protocol, self.loop_var.as_deref())
    }
}

impl MergeKey for ForwardPort {
    type Key<'a> = (
        &'a str,
        &'a str,
        Option<&'a str>,
        Option<&'a str>,
        Option<&'a str>,
    );

    fn merge_key(&self) -> Self::Key<'_> {
        (
            &self.port,
            &self.protocol,
            self.to_port.as_deref(),
            self.to_addr.as_deref(),
            self.loop_var.as_deref(),
        )
    }
}

impl MergeKey for RichRule {
    type Key<'a> = &'a RichRule;

    fn merge_key(&self) -> Self::Key<'_> {
        self
    }
}

impl MergeKey for DirectChain {
    type Key<'a> = (&'a str, &'a str, &'a str);

    fn merge_key(&self) -> Self::Key<'_> {
        self.key()
    }
}

impl MergeKey for DirectRule {
    type Key<'a> = (&'a str, &'a str, &'a str, i32, &'a str, Option<&'a str>);

    fn merge_key(&self) -> Self::Key<'_> {
        (
            &self.ipv,
            &self.table,
            &self.chain,
            self.priority,
            &self.args,
            self.loop_var.as_deref(),
        )
    }
}

impl MergeKey for Passthrough {
    type Key<'a> = (&'a str, &'a str, Option<&'a str>);

    fn merge_key(&self) -> Self::Key<'_> {
        (&self.ipv, &self.args, self.loop_var.as_deref())
    }
}

/// Concatenates and keeps the first item per key, in order
fn concat_dedup<T: MergeKey + Clone>(existing: &[T], incoming: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    existing
        .iter()
        .chain(incoming)
        .filter(|&item| seen.insert(item.merge_key()))
        .cloned()
        .collect()
}

fn merge_zone(existing: &Zone, incoming: &Zone) -> Zone {
    Zone {
        target: incoming.target.clone().or_else(|| existing.target.clone()),
        interfaces: concat_dedup(&existing.interfaces, &incoming.interfaces),
        sources: concat_dedup(&existing.sources, &incoming.sources),
        services: concat_dedup(&existing.services, &incoming.services),
        ports: concat_dedup(&existing.ports, &incoming.ports),
        protocols: concat_dedup(&existing.protocols, &incoming.protocols),
        source_ports: concat_dedup(&existing.source_ports, &incoming.source_ports),
        rich_rules: concat_dedup(&existing.rich_rules, &incoming.rich_rules),
        forward: incoming.forward.or(existing.forward),
        masquerade: incoming.masquerade.or(existing.masquerade),
        forward_ports: concat_dedup(&existing.forward_ports, &incoming.forward_ports),
        icmp_blocks: concat_dedup(&existing.icmp_blocks, &incoming.icmp_blocks),
        icmp_block_inversion: incoming.icmp_block_inversion.or(existing.icmp_block_inversion),
    }
}

fn merge_direct(existing: &Direct, incoming: &Direct) -> Direct {
    let mut rule_groups = existing.rule_groups.clone();
    for group in &incoming.rule_groups {
        if !rule_groups.contains(group) {
            rule_groups.push(group.clone());
        }
    }
    Direct {
        chains: concat_dedup(&existing.chains, &incoming.chains),
        rules: concat_dedup(&existing.rules, &incoming.rules),
        passthroughs: concat_dedup(&existing.passthroughs, &incoming.passthroughs),
        rule_groups,
    }
}

/// Merges `incoming` into a copy of `existing`.
///
/// Scalars from `incoming` win, arrays are unioned by entity key, variables
/// already in `existing` keep their value, and existing rule groups are kept
/// verbatim.
pub fn merge(existing: &Config, incoming: &Config) -> Config {
    let mut variables = existing.variables.clone();
    for (name, value) in &incoming.variables {
        variables
            .entry(name.clone())
            .or_insert_with(|| value.clone());
    }

    let mut zones = existing.zones.clone();
    for (name, zone) in &incoming.zones {
        let merged = match zones.get(name) {
            Some(current) => merge_zone(current, zone),
            None => merge_zone(&Zone::default(), zone),
        };
        zones.insert(name.clone(), merged);
    }
    // Zones only in `existing` still get their own duplicates collapsed
    for zone in zones.values_mut() {
        *zone = merge_zone(zone, &Zone::default());
    }

    let direct = match (&existing.direct, &incoming.direct) {
        (None, None) => None,
        (Some(d), None) | (None, Some(d)) => Some(merge_direct(d, &Direct::default())),
        (Some(a), Some(b)) => Some(merge_direct(a, b)),
    };

    debug!(zones = zones.len(), "merged configs");
    Config {
        variables,
        zones,
        direct,
    }
}

/// Collapses duplicate entities in every array of `config`
pub fn dedup(config: &Config) -> Config {
    merge(config, &Config::default())
}
