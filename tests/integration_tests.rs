//! Integration tests for DFWC
//!
//! These tests drive the public API end to end: document text through
//! validation, expansion and generation, and command text back into a
//! config that is merged, serialized and compiled again.
//!
//! Nothing here runs firewall-cmd; the generated lines are compared as text.

#![allow(clippy::uninlined_format_args)]

use dfwc::core::firewall::{Config, PortItem, ValueItem};
use dfwc::core::generate::{Direction, GenerateOptions, generate, render};
use dfwc::core::merge::merge;
use dfwc::core::pipeline::compile;
use dfwc::core::reverse::{ReverseOptions, SkipReason, reverse_parse};
use dfwc::core::{Error, document, validate};
use dfwc::utils::write_atomic;

const SITE_CONFIG: &str = r#"
variables:
  admin_net: 10.20.0.0/16
  web_ports: ["80/tcp", "443/tcp"]
  lan_nics: [eth1, eth2]

zones:
  public:
    target: DROP
    services: [ssh]
    ports:
      - port: "{{item}}"
        loop: web_ports
    rich_rules:
      - family: ipv4
        source: "{{admin_net}}"
        service: ssh
        log:
          prefix: ssh-admin
          level: info
        action: accept
      - 'rule family="ipv4" source address="192.0.2.1" drop'
    masquerade: true
    forward_ports:
      - "port=2222:proto=tcp:toport=22:toaddr=10.20.0.5"

  internal:
    interfaces:
      - value: "{{item}}"
        loop: "{{lan_nics}}"
    services: [dns, dhcp]
    icmp_block_inversion: true

direct:
  chains:
    - {ipv: ipv4, table: filter, chain: IN_guard}
  rules:
    - {ipv: ipv4, table: filter, chain: IN_guard, priority: 0, args: "-p tcp --dport 25 -j DROP"}
  rule_groups:
    - ipv: [ipv4, ipv6]
      table: filter
      chain: OUT_ok
      priority: 5
      rules:
        - args: "-d {{any}} -j ACCEPT"
      passthroughs:
        - "-A OUTPUT -j OUT_ok"
"#;

fn no_banners() -> GenerateOptions {
    GenerateOptions {
        transient: false,
        banners: false,
    }
}

#[test]
fn test_site_config_compiles_without_diagnostics() {
    let result = compile(SITE_CONFIG);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let config = result.config().unwrap();
    let names: Vec<&str> = config.zones.keys().map(String::as_str).collect();
    assert_eq!(names, ["public", "internal"]);
    assert_eq!(
        config.zones["public"].ports,
        vec![PortItem::new("80", "tcp"), PortItem::new("443", "tcp")]
    );
    assert_eq!(
        config.zones["internal"].interfaces,
        vec![ValueItem::new("eth1"), ValueItem::new("eth2")]
    );
    assert!(config.variables.is_empty());
}

#[test]
fn test_apply_script_layout() {
    let result = compile(SITE_CONFIG);
    let lines = result.commands(Direction::Apply, &GenerateOptions::default());

    assert_eq!(lines[0], "# Zone: public");
    assert_eq!(
        lines[1],
        "firewall-cmd --permanent --zone=public --set-target=DROP"
    );
    assert!(lines.contains(
        &"firewall-cmd --permanent --zone=public --add-rich-rule='rule family=\"ipv4\" source address=\"10.20.0.0/16\" service name=\"ssh\" log prefix=\"ssh-admin\" level=\"info\" accept'"
            .to_string()
    ));
    assert!(lines.contains(&"# Zone: internal".to_string()));
    assert!(lines.contains(&"# Direct rules".to_string()));
    assert!(lines.contains(
        &"firewall-cmd --permanent --direct --add-rule ipv6 filter OUT_ok 5 -d ::/0 -j ACCEPT"
            .to_string()
    ));
    assert_eq!(lines.last().map(String::as_str), Some("firewall-cmd --reload"));
    assert_eq!(lines.iter().filter(|l| l.contains("--reload")).count(), 1);
}

#[test]
fn test_rendered_script_has_shebang() {
    let result = compile(SITE_CONFIG);
    let lines = result.commands(Direction::Remove, &no_banners());
    let script = render(&lines, true);

    assert!(script.starts_with("#!/bin/sh\nset -e\n"));
    assert!(script.ends_with("firewall-cmd --reload\n"));
    assert!(script.contains("--set-target=default"));
    assert!(!script.contains("--add-"));
}

#[test]
fn test_generated_script_imports_back() {
    let result = compile(SITE_CONFIG);
    let expanded = result.config().unwrap();
    let script = render(
        &generate(Some(expanded), Direction::Apply, &GenerateOptions::default()),
        true,
    );

    let imported = reverse_parse(&script, &ReverseOptions::default());
    assert!(imported.errors.is_empty(), "{:?}", imported.errors);
    assert_eq!(&imported.config, expanded);

    let reasons: Vec<SkipReason> = imported.skipped.iter().map(|s| s.reason).collect();
    assert!(reasons.contains(&SkipReason::NotCommand));
    assert!(reasons.contains(&SkipReason::Reload));
}

#[test]
fn test_handwritten_script_import() {
    let script = r#"#!/bin/bash
# bootstrap firewall
sudo firewall-cmd --permanent --new-zone=lab
sudo firewall-cmd --permanent --zone=lab --add-source=172.16.0.0/12 --add-service=ssh
firewall-cmd --permanent --zone=lab \
    --add-rich-rule='rule family="ipv4" source address="172.16.5.5" reject type="icmp-host-prohibited"'
firewall-cmd --add-service=http
firewall-cmd --zone=lab --add-port=$APP_PORT/tcp
firewall-cmd --list-all-zones
systemctl restart firewalld
firewall-cmd --reload
"#;
    let result = reverse_parse(script, &ReverseOptions::default());

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 8);
    assert!(result.errors[0].message.contains("$APP_PORT"));

    let lab = &result.config.zones["lab"];
    assert_eq!(lab.sources, vec![ValueItem::new("172.16.0.0/12")]);
    assert_eq!(lab.services, vec![ValueItem::new("ssh")]);
    assert_eq!(lab.rich_rules[0].action.as_deref(), Some("reject"));
    assert_eq!(
        lab.rich_rules[0].reject_type.as_deref(),
        Some("icmp-host-prohibited")
    );
    assert!(lab.ports.is_empty());
    assert_eq!(
        result.config.zones["public"].services,
        vec![ValueItem::new("http")]
    );
    assert_eq!(result.parsed, [3, 4, 5, 7]);
}

#[test]
fn test_import_merge_keeps_templates() {
    let doc = document::load(SITE_CONFIG).unwrap();
    assert!(validate::validate(&doc).is_ok());
    let existing = Config::from_document(&doc).unwrap();

    let fragment = reverse_parse(
        "firewall-cmd --permanent --zone=public --add-service=ssh --add-service=imaps\n",
        &ReverseOptions::default(),
    )
    .config;
    let merged = merge(&existing, &fragment);

    let public = &merged.zones["public"];
    assert_eq!(
        public.services,
        vec![ValueItem::new("ssh"), ValueItem::new("imaps")]
    );
    assert_eq!(public.ports[0].loop_var.as_deref(), Some("web_ports"));
    assert_eq!(merged.variables.len(), 3);
    assert_eq!(merged.direct.as_ref().unwrap().rule_groups.len(), 1);
}

#[test]
fn test_serialized_merge_result_compiles_again() {
    let doc = document::load(SITE_CONFIG).unwrap();
    let existing = Config::from_document(&doc).unwrap();
    let fragment = reverse_parse(
        "firewall-cmd --permanent --zone=dmz --add-service=http\n",
        &ReverseOptions::default(),
    )
    .config;
    let merged = merge(&existing, &fragment);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("merged.yaml");
    write_atomic(&path, &merged.to_yaml().unwrap()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let again = compile(&text);
    assert!(again.errors.is_empty(), "{:?}", again.errors);
    let config = again.config().unwrap();
    let names: Vec<&str> = config.zones.keys().map(String::as_str).collect();
    assert_eq!(names, ["public", "internal", "dmz"]);
    assert_eq!(config.zones["public"].ports.len(), 2);
    assert_eq!(config.direct.as_ref().unwrap().rules.len(), 3);

    let json = merged.to_json().unwrap();
    assert!(compile(&json).is_ok());
}

#[test]
fn test_invalid_documents_report_and_stop() {
    let result = compile("zones:\n  public:\n    ports: 8080\n    target: [DROP]\n");
    let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
    assert!(paths.contains(&"zones.public.ports"), "{paths:?}");
    assert!(paths.contains(&"zones.public.target"), "{paths:?}");
    assert!(result.expansion.is_none());

    match document::load("zones:\n  public: {services: [ssh}\n") {
        Err(Error::Parse { line: Some(line), .. }) => assert_eq!(line, 2),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_transient_mode() {
    let result = compile("zones:\n  public:\n    target: ACCEPT\n    services: [ssh]\n");
    let lines = result.commands(
        Direction::Apply,
        &GenerateOptions {
            transient: true,
            banners: false,
        },
    );
    assert_eq!(
        lines,
        [
            "firewall-cmd --permanent --zone=public --set-target=ACCEPT",
            "firewall-cmd --permanent --zone=public --add-service=ssh",
            "firewall-cmd --zone=public --add-service=ssh",
        ]
    );
}
