//! The module cache survives a restart through its on-disk manifest.

use offload_cache::ModuleCache;
use offload_conformance::Project;
use offload_host::{Compiler, HostConfig, MemoryFs};

fn config() -> HostConfig {
    HostConfig {
        entries: vec!["src/main.js".to_string()],
        ..HostConfig::default()
    }
}

fn fs() -> MemoryFs {
    let mut fs = MemoryFs::new();
    fs.write("src/main.js", "import './util.js';\nrun(1);\n");
    fs.write("src/util.js", "function run(x) {\n  return x;\n}\n");
    fs
}

#[test]
fn restored_cache_skips_unchanged_modules() {
    let dir = tempfile::tempdir().unwrap();
    let mut compiler = Compiler::new(config(), fs());
    compiler.run().unwrap();
    compiler.cache().save(dir.path()).unwrap();
    let bundle = compiler.read_output("main.js").unwrap().to_string();

    let restored = ModuleCache::load_or_default(dir.path());
    assert_eq!(restored.len(), 2);
    let mut compiler = Compiler::with_cache(config(), fs(), restored);
    let stats = compiler.run().unwrap();
    assert!(stats.rebuilt.is_empty(), "{:?}", stats.rebuilt);
    assert_eq!(compiler.read_output("main.js").unwrap(), bundle);
}

#[test]
fn restored_cache_notices_edits_made_while_stopped() {
    let dir = tempfile::tempdir().unwrap();
    let mut compiler = Compiler::new(config(), fs());
    compiler.run().unwrap();
    compiler.cache().save(dir.path()).unwrap();

    let mut edited = fs();
    edited.write("src/util.js", "function run(x) {\n  return x * 2;\n}\n");
    let mut compiler =
        Compiler::with_cache(config(), edited, ModuleCache::load_or_default(dir.path()));
    let stats = compiler.run().unwrap();
    assert_eq!(stats.rebuilt, vec!["src/util.js"]);
}

#[test]
fn corrupt_manifest_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("manifest.json"), "{ not json").unwrap();
    assert!(ModuleCache::load_or_default(dir.path()).is_empty());
}

#[test]
fn worker_namespace_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let mut project = Project::new(
        &[(
            "src/main.js",
            "import parallel from 'parallel-es';\nparallel.from([1]).map(x => x);\n",
        )],
        &["src/main.js"],
    )
    .unwrap();
    project.run_clean();
    project.compiler.cache().save(dir.path()).unwrap();

    let restored = ModuleCache::load_or_default(dir.path());
    assert!(restored
        .get("offload-worker", project.options.worker_request().as_str())
        .is_some());
}
