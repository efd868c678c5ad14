// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

const EXAMPLE: &str = r#"
agent_command = "ssh buildhost tether-agent"
debounce_ms = 150
ignore = "target\n*.swp\n"

[[mapping]]
local = "/home/me/project"
remote = "work/project"

[[mapping]]
local = "/home/me/notes"
remote = "work/notes"
ignore = "*.draft\n"
"#;

fn parse(text: &str) -> Config {
    toml::from_str(text).unwrap()
}

#[test]
fn full_config_parses() {
    let config = parse(EXAMPLE);
    assert_eq!(config.agent_command, "ssh buildhost tether-agent");
    assert_eq!(config.debounce_window(), Duration::from_millis(150));
    assert_eq!(config.mappings.len(), 2);
}

#[test]
fn debounce_defaults_when_omitted() {
    let config = parse(
        "agent_command = \"agent\"\n[[mapping]]\nlocal = \"/a\"\nremote = \"x\"\n",
    );
    assert_eq!(config.debounce_window(), Duration::from_millis(200));
}

#[test]
fn mapping_preserves_order_and_validates() {
    let config = parse(EXAMPLE);
    let mapping = config.mapping().unwrap();
    assert_eq!(mapping.entries()[0].remote, Path::new("work/project"));
    assert_eq!(mapping.entries()[1].remote, Path::new("work/notes"));
}

#[test]
fn overlapping_roots_are_rejected() {
    let config = parse(
        "agent_command = \"agent\"\n\
         [[mapping]]\nlocal = \"/a\"\nremote = \"x\"\n\
         [[mapping]]\nlocal = \"/a/b\"\nremote = \"y\"\n",
    );
    assert!(matches!(config.mapping(), Err(ConfigError::Mapping(_))));
}

#[test]
fn per_root_ignore_overrides_the_global_rules() {
    let config = parse(EXAMPLE);
    let skippers = config.skippers().unwrap();
    // Global rules apply to the first root.
    assert!(!skippers[0].allows(Path::new("target"), true));
    assert!(skippers[0].allows(Path::new("x.draft"), false));
    // The second root sees only its own rules.
    assert!(skippers[1].allows(Path::new("target"), true));
    assert!(!skippers[1].allows(Path::new("x.draft"), false));
}

#[test]
fn unknown_keys_are_rejected() {
    let result: Result<Config, _> = toml::from_str(
        "agent_command = \"agent\"\nbogus = 1\n[[mapping]]\nlocal = \"/a\"\nremote = \"x\"\n",
    );
    assert!(result.is_err());
}

#[test]
fn load_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
