//! Contents and source maps of the emitted worker bundle.

use offload_config::DEFAULT_WORKER_ENTRY;
use offload_conformance::{
    find_position, init_test_logging, original_of, Project, ProjectSetup, WORKER_BOOTSTRAP,
};
use offload_host::ChildSchedule;
use offload_sourcemap::{Mapping, Position, SourceMapBuilder};

const F: &str = "import parallel from 'parallel-es';\n\nparallel.from([1, 2, 3]).map(value => value * 2);\n";
const G: &str = "import parallel from 'parallel-es';\nfunction square(n) {\n  return n * n;\n}\nparallel.range(10).map(square);\n";

fn files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("main.js", "import './f.js';\nimport './g.js';\n"),
        ("f.js", F),
        ("g.js", G),
    ]
}

#[test]
fn arrow_is_registered_under_its_position() {
    init_test_logging();
    let mut project = Project::new(&files(), &["main.js"]).unwrap();
    project.run_clean();

    let ids = project.worker_function_ids();
    assert_eq!(
        ids,
        vec!["static:f.js/_anonymous:3:29", "static:g.js/square:2:0"]
    );
    let main = project.compiler.read_output("main.js").unwrap();
    assert!(main.contains("identifier: 'static:f.js/_anonymous:3:29'"));
    assert!(!main.contains("value => value * 2"));
}

#[test]
fn relocated_arrow_maps_back_to_its_module() {
    let mut project = Project::new(&files(), &["main.js"]).unwrap();
    project.run_clean();

    let bundle = project.worker_bundle().unwrap();
    let map = project.worker_map().unwrap();
    let (line, column) = find_position(bundle, "value => value * 2").unwrap();
    assert_eq!(original_of(&map, line, column), Some(("f.js".to_string(), 3, 29)));

    let (line, column) = find_position(bundle, "n * n").unwrap();
    assert_eq!(original_of(&map, line, column), Some(("g.js".to_string(), 3, 9)));
    assert!(map.sources.iter().any(|s| s == DEFAULT_WORKER_ENTRY));
}

#[test]
fn output_is_deterministic() {
    let mut first = Project::new(&files(), &["main.js"]).unwrap();
    let mut second = Project::new(&files(), &["main.js"]).unwrap();
    first.run_clean();
    second.run_clean();
    assert_eq!(first.worker_bundle(), second.worker_bundle());
    assert_eq!(first.worker_map(), second.worker_map());

    // Rewriting again after a round trip through another edit.
    let before = (first.worker_bundle().unwrap().to_string(), first.worker_map());
    first.write("g.js", "const nothing = 0;\n");
    first.run_clean();
    first.write("g.js", G);
    first.run_clean();
    assert_eq!(first.worker_bundle().unwrap(), before.0);
    assert_eq!(first.worker_map(), before.1);
}

#[test]
fn upstream_map_hides_the_bootstrap_path() {
    let mut project = Project::new(&files(), &["main.js"]).unwrap();
    let mut upstream = SourceMapBuilder::new(Some(DEFAULT_WORKER_ENTRY.to_string()));
    for line in 1..=WORKER_BOOTSTRAP.lines().count() as u32 {
        upstream.add_mapping(Mapping::new(
            Position::new(line, 0),
            "src/worker-slave.ts",
            Position::new(line, 0),
        ));
    }
    project
        .compiler
        .fs_mut()
        .write_with_map(DEFAULT_WORKER_ENTRY, WORKER_BOOTSTRAP, upstream.build());
    project.run_clean();

    let map = project.worker_map().unwrap();
    assert!(!map.sources.iter().any(|s| s == DEFAULT_WORKER_ENTRY), "{:?}", map.sources);
    assert!(map.sources.iter().any(|s| s == "src/worker-slave.ts"));
    assert!(map.sources.iter().any(|s| s == "f.js"));
}

#[test]
fn worker_built_before_entries_has_no_functions() {
    let mut project = Project::build(
        &files(),
        ProjectSetup::new(&["main.js"]).schedule(ChildSchedule::BeforeEntries),
    )
    .unwrap();
    let stats = project.run_clean();
    assert!(!stats.needs_additional_pass);
    assert!(project.worker_function_ids().is_empty());
    assert!(project
        .worker_bundle()
        .unwrap()
        .starts_with("const slaveFunctionLookupTable = createFunctionLookupTable();\nself.onmessage"));
}

#[test]
fn worker_built_mid_graph_has_only_earlier_functions() {
    let mut project = Project::build(
        &files(),
        ProjectSetup::new(&["main.js"]).schedule(ChildSchedule::AfterModules(2)),
    )
    .unwrap();
    project.run_clean();
    assert_eq!(project.worker_function_ids(), vec!["static:f.js/_anonymous:3:29"]);
}

#[test]
fn relocated_function_maps_through_its_module_map() {
    let mut project = Project::new(&files(), &["main.js"]).unwrap();
    let mut compiled = SourceMapBuilder::new(Some("f.js".to_string()));
    for line in 1..=F.lines().count() as u32 {
        compiled.add_mapping(Mapping::new(Position::new(line, 0), "src/f.ts", Position::new(line, 0)));
    }
    compiled.add_mapping(Mapping::new(Position::new(3, 29), "src/f.ts", Position::new(3, 33)));
    project.compiler.fs_mut().write_with_map("f.js", F, compiled.build());
    project.run_clean();

    let bundle = project.worker_bundle().unwrap();
    let map = project.worker_map().unwrap();
    let (line, column) = find_position(bundle, "value => value * 2").unwrap();
    assert_eq!(original_of(&map, line, column), Some(("src/f.ts".to_string(), 3, 33)));
    assert!(map.sources.iter().any(|s| s == "src/f.ts"), "{:?}", map.sources);
}
