//! Integration tests for depwise-deps
//!
//! These tests run the composer extraction end to end over fetched files.

use depwise_deps::{
    composer::is_package, version, ComposerFileParser, Dependency, DependencyFile, DependencySet,
    FileParser, Requirement, Scope, Source,
};
use proptest::prelude::*;

fn files(manifest: &str, lockfile: &str) -> Vec<DependencyFile> {
    vec![
        DependencyFile::new("composer.json", manifest, "/"),
        DependencyFile::new("composer.lock", lockfile, "/"),
    ]
}

#[test]
fn test_single_runtime_dependency() {
    let deps = ComposerFileParser::new()
        .parse(&files(
            r#"{ "require": { "vendor/pkg": "^1.0" } }"#,
            r#"{ "packages": [ { "name": "vendor/pkg", "version": "1.2.0" } ] }"#,
        ))
        .unwrap();

    assert_eq!(deps.len(), 1);
    let dep = &deps[0];
    assert_eq!(dep.name, "vendor/pkg");
    assert_eq!(dep.version.as_deref(), Some("1.2.0"));
    assert_eq!(dep.package_manager, "composer");
    assert_eq!(dep.requirements.len(), 1);
    assert_eq!(dep.requirements[0].requirement, "^1.0");
    assert_eq!(dep.requirements[0].file, "composer.json");
    assert_eq!(dep.requirements[0].groups, vec!["runtime".to_string()]);
    assert_eq!(dep.requirements[0].source, None);
    // Manifest and lockfile entries merge into one, taking the lockfile metadata.
    assert!(dep.subdependency_metadata.is_some());
}

#[test]
fn test_manifest_order_and_transitive_entries() {
    let deps = ComposerFileParser::new()
        .parse(&files(
            r#"{
                "require": { "php": ">=8.1", "vendor/zeta": "^2.0", "vendor/alpha": "^1.0" },
                "require-dev": { "vendor/tool": "dev-main" }
            }"#,
            r#"{
                "packages": [
                    { "name": "vendor/alpha", "version": "v1.4.0" },
                    { "name": "vendor/zeta", "version": "2.0.1" },
                    { "name": "vendor/transitive", "version": "0.3.0" }
                ],
                "packages-dev": [
                    {
                        "name": "vendor/tool",
                        "version": "dev-main",
                        "source": {
                            "type": "git",
                            "url": "https://github.com/vendor/tool.git",
                            "reference": "0123456789abcdef0123456789abcdef01234567"
                        }
                    }
                ]
            }"#,
        ))
        .unwrap();

    let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["vendor/zeta", "vendor/alpha", "vendor/tool", "vendor/transitive"]
    );

    let tool = &deps[2];
    assert_eq!(
        tool.version.as_deref(),
        Some("0123456789abcdef0123456789abcdef01234567")
    );
    match &tool.requirements[0].source {
        Some(Source::Git(git)) => {
            assert_eq!(git.branch.as_deref(), Some("main"));
            assert_eq!(git.reference, None);
        }
        other => panic!("expected git source, got {:?}", other),
    }
    assert!(!tool.is_production());

    let transitive = &deps[3];
    assert!(!transitive.is_top_level());
    assert!(transitive.is_production());
}

#[test]
fn test_path_dependency() {
    let deps = ComposerFileParser::new()
        .parse(&files(
            r#"{ "require": { "vendor/local": "*" } }"#,
            r#"{ "packages": [
                { "name": "vendor/local", "version": "1.0.0", "dist": { "type": "path" } }
            ] }"#,
        ))
        .unwrap();

    assert_eq!(deps[0].requirements[0].source, Some(Source::Path));
}

fn requirement(raw: &str) -> Requirement {
    Requirement::new(raw, "composer.json", Scope::Runtime)
}

proptest! {
    #[test]
    fn prop_non_namespaced_names_are_excluded(name in "[a-z][a-z0-9-]{0,12}") {
        prop_assert!(!is_package(&name));

        for scope in Scope::ALL {
            let manifest = format!(r#"{{ "{}": {{ "{}": "*" }} }}"#, scope.manifest_key(), name);
            let lockfile = format!(
                r#"{{ "{}": [ {{ "name": "{}", "version": "1.0.0" }} ] }}"#,
                scope.lockfile_key(),
                name
            );
            let deps = ComposerFileParser::new().parse(&files(&manifest, &lockfile)).unwrap();
            prop_assert!(deps.is_empty());
        }
    }

    #[test]
    fn prop_leading_v_is_stripped(
        prefix in prop_oneof![Just(""), Just("v")],
        major in 0u32..100,
        minor in 0u32..100,
    ) {
        let raw = format!("{}{}.{}", prefix, major, minor);
        let lockfile = format!(
            r#"{{ "packages": [ {{ "name": "vendor/pkg", "version": "{}" }} ] }}"#,
            raw
        );
        let deps = ComposerFileParser::new()
            .parse(&files(r#"{ "require": { "vendor/pkg": "*" } }"#, &lockfile))
            .unwrap();
        let expected = format!("{}.{}", major, minor);
        prop_assert_eq!(deps[0].version.as_deref(), Some(expected.as_str()));
        prop_assert_eq!(version::strip_v_prefix(&raw), expected.as_str());
    }

    #[test]
    fn prop_dev_branch_resolves_to_reference(
        branch in "[a-z]{1,10}",
        reference in "[0-9a-f]{40}",
    ) {
        let lockfile = format!(
            r#"{{ "packages": [ {{
                "name": "vendor/pkg",
                "version": "dev-{}",
                "source": {{ "type": "git", "url": "https://example.com/pkg.git", "reference": "{}" }}
            }} ] }}"#,
            branch, reference
        );
        let manifest = format!(r#"{{ "require": {{ "vendor/pkg": "dev-{}" }} }}"#, branch);
        let deps = ComposerFileParser::new().parse(&files(&manifest, &lockfile)).unwrap();
        prop_assert_eq!(deps[0].version.as_deref(), Some(reference.as_str()));
    }

    #[test]
    fn prop_merge_keeps_both_requirements_in_order(
        first in proptest::collection::vec("[0-9^~.]{1,6}", 1..4),
        second in proptest::collection::vec("[0-9^~.]{1,6}", 1..4),
    ) {
        let build = |reqs: &[String]| {
            let mut set = DependencySet::new();
            set.add(
                Dependency::new(
                    "vendor/pkg",
                    None,
                    reqs.iter().map(|r| requirement(r)).collect(),
                    "composer",
                )
                .unwrap(),
            );
            set
        };

        let mut merged = build(&first[..]);
        merged += build(&second[..]);

        let got: Vec<String> = merged
            .get("vendor/pkg")
            .unwrap()
            .requirements
            .iter()
            .map(|r| r.requirement.clone())
            .collect();
        let expected: Vec<String> = first.iter().chain(second.iter()).cloned().collect();
        prop_assert_eq!(got, expected);
    }
}
