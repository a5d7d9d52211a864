//! Tests for execution order resolution.

use std::collections::HashMap;

use camino::Utf8Path;
use rstest::rstest;
use taskweave::{
    graph::{Graph, Prerequisite},
    manifest,
    resolve::{ResolveError, resolve, resolve_default},
};
use test_support::{Workspace, manifest_yaml};

fn graph_from(body: &str) -> Graph {
    let manifest = manifest::from_str(&manifest_yaml(body)).expect("parse");
    Graph::from_manifest(&manifest, Utf8Path::new(".")).expect("graph")
}

/// Every target appears once and after each of its target prerequisites.
fn assert_post_order(graph: &Graph, order: &[&str]) {
    let position: HashMap<&str, usize> = order.iter().enumerate().map(|(i, n)| (*n, i)).collect();
    assert_eq!(position.len(), order.len(), "duplicates in {order:?}");
    for name in order {
        let target = graph.get(name).expect("target in graph");
        for prereq in &target.prerequisites {
            if let Prerequisite::Target(dep) = prereq {
                assert!(
                    position[dep.as_str()] < position[name],
                    "{dep} must precede {name} in {order:?}"
                );
            }
        }
    }
}

#[rstest]
fn diamond_visits_shared_prerequisite_once() {
    let manifest = manifest::from_path("tests/data/diamond.yml").expect("load");
    let graph = Graph::from_manifest(&manifest, Utf8Path::new(".")).expect("graph");
    let plan = resolve_default(&graph).expect("plan");
    assert_eq!(plan.names(), vec!["base", "left", "right", "top"]);
    assert_post_order(&graph, &plan.names());
}

#[rstest]
#[case("lint", &["lint"])]
#[case("test", &["build", "test"])]
#[case("release", &["lint", "build", "test", "docs", "release"])]
fn order_follows_declaration_order_of_prerequisites(
    #[case] requested: &str,
    #[case] expected: &[&str],
) {
    let graph = graph_from(
        "\
targets:
  - name: release
    phony: true
    deps: [lint, test, docs]
  - name: lint
    phony: true
  - name: build
    phony: true
  - name: test
    phony: true
    deps: build
  - name: docs
    phony: true
    deps: [build, lint]
",
    );
    let plan = resolve(&graph, requested).expect("plan");
    assert_eq!(plan.names(), expected);
    assert_post_order(&graph, &plan.names());
}

#[rstest]
fn plan_only_contains_reachable_targets() {
    let graph = graph_from(
        "\
targets:
  - name: a
    phony: true
  - name: b
    phony: true
    deps: a
  - name: unrelated
    phony: true
",
    );
    let plan = resolve(&graph, "b").expect("plan");
    assert_eq!(plan.names(), vec!["a", "b"]);
}

#[rstest]
fn file_prerequisites_are_not_planned() {
    let graph = graph_from(
        "\
targets:
  - name: out.txt
    deps: [in.txt]
    commands: cp in.txt out.txt
",
    );
    let plan = resolve(&graph, "out.txt").expect("plan");
    assert_eq!(plan.names(), vec!["out.txt"]);
}

#[rstest]
fn unknown_target_is_an_error() {
    let graph = graph_from("targets:\n  - name: a\n    phony: true\n");
    let err = resolve(&graph, "definitely-not-here").expect_err("unknown");
    assert!(
        matches!(&err, ResolveError::UnknownTarget { name } if name == "definitely-not-here"),
        "{err:?}"
    );
    assert_eq!(
        err.to_string(),
        "no target named 'definitely-not-here' and no such file"
    );
}

#[rstest]
fn existing_file_name_resolves_to_empty_plan() {
    let ws = Workspace::new();
    ws.write("notes.md", "hello");
    let graph = ws
        .graph("targets:\n  - name: a\n    phony: true\n")
        .expect("graph");
    let plan = resolve(&graph, "notes.md").expect("plan");
    assert!(plan.is_empty());
}

#[rstest]
fn artifact_path_resolves_to_its_producer() {
    let ws = Workspace::new();
    ws.write("dist/bundle.tar", "").write("in.txt", "");
    let graph = ws
        .graph(
            "\
targets:
  - name: bundle
    output: dist/bundle.tar
    deps: [prepare, in.txt]
    commands: tar cf dist/bundle.tar in.txt
  - name: prepare
    phony: true
",
        )
        .expect("graph");
    let plan = resolve(&graph, "dist/bundle.tar").expect("plan");
    assert_eq!(plan.names(), vec!["prepare", "bundle"]);
}

#[rstest]
fn missing_artifact_path_still_finds_its_producer() {
    let graph = graph_from(
        "\
targets:
  - name: bundle
    output: dist/bundle.tar
",
    );
    assert!(!Utf8Path::new("dist/bundle.tar").exists());
    let plan = resolve(&graph, "dist/bundle.tar").expect("plan");
    assert_eq!(plan.names(), vec!["bundle"]);
}
