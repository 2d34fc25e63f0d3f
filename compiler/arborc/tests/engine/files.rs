//! Loading from disk and writing compiled units.

use std::fs;
use std::path::Path;

use arbor_engine::{Context, EngineError, HostConfig, ServiceError, Stage};
use arborc::{LocalService, UNIT_EXTENSION};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const MAIN: &str = "import { helper } from \"./lib\"\nimport { write } from \"std/io\"\nexport function run() { write(helper()) }";
const LIB: &str = "export function helper() { return 1 }";
const IO: &str = "export function write(value) {}";

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("main.ts"), MAIN).unwrap();
    fs::write(root.join("lib.ts"), LIB).unwrap();
    fs::create_dir_all(root.join("stdlib")).unwrap();
    fs::write(root.join("stdlib").join("io.ts"), IO).unwrap();
    dir
}

fn write_config(dir: &Path, output_path: &str) -> HostConfig {
    let text = serde_json::json!({
        "stdlib_path": "stdlib",
        "output_path": output_path,
        "files": [
            { "path": "main.ts" },
            { "path": "lib.ts", "output": "out/lib-unit.abc" }
        ]
    });
    let path = dir.join("arbor.json");
    fs::write(&path, text.to_string()).unwrap();
    HostConfig::from_file(&path).unwrap()
}

#[test]
fn test_compile_project_from_disk() {
    arborc::init_tracing();
    let dir = project();
    let config = write_config(dir.path(), "build");
    let mut cx = Context::create(LocalService::from_fs(), config).unwrap();

    let mut names: Vec<(&str, bool)> = cx
        .programs()
        .map(|program| (program.name.as_str(), program.is_stdlib))
        .collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            ("lib", false),
            ("main", false),
            ("std/io", true),
            ("std/prelude", true),
        ]
    );

    cx.proceed_to(Stage::BinaryGenerated).unwrap();
    assert!(cx.diagnostics().is_empty(), "{:?}", cx.diagnostics());

    let main_unit = dir
        .path()
        .join("build")
        .join(format!("main.{UNIT_EXTENSION}"));
    let lib_unit = dir.path().join("out").join("lib-unit.abc");
    let mut written: Vec<_> = cx
        .emitted()
        .iter()
        .map(|unit| unit.path.clone().unwrap())
        .collect();
    written.sort();
    let mut expected = vec![main_unit.clone(), lib_unit.clone()];
    expected.sort();
    assert_eq!(written, expected);

    let unit = arbor_emit::decode(&fs::read(&main_unit).unwrap()).unwrap();
    assert_eq!(unit.module, "main");
    assert_eq!(unit.exports, vec!["run".to_owned()]);
    let sources: Vec<&str> = unit.imports.iter().map(|i| i.source.as_str()).collect();
    assert_eq!(sources, vec!["./lib", "std/io"]);
    let calls = &unit.functions[0].calls;
    assert!(calls.contains(&"write".to_owned()) && calls.contains(&"helper".to_owned()));

    let lib = arbor_emit::decode(&fs::read(&lib_unit).unwrap()).unwrap();
    assert_eq!(lib.exports, vec!["helper".to_owned()]);

    cx.destroy();
}

#[test]
fn test_unwritable_output_fails_emission() {
    let dir = project();
    fs::write(dir.path().join("blocker"), "not a directory").unwrap();
    let config = write_config(dir.path(), "blocker");
    let mut cx = Context::create(LocalService::from_fs(), config).unwrap();

    let err = cx.proceed_to(Stage::BinaryGenerated).unwrap_err();
    assert!(
        matches!(err, EngineError::Service(ServiceError::Emit { .. })),
        "{err}"
    );
    assert_eq!(cx.stage(), Stage::Checked);
}

#[test]
fn test_missing_main_file_fails_creation() {
    let dir = tempfile::tempdir().unwrap();
    let config = HostConfig::new(dir.path().join("absent.ts"));
    let err = Context::create(LocalService::from_fs(), config).err().unwrap();
    assert!(
        matches!(err, EngineError::Service(ServiceError::Io { .. })),
        "{err}"
    );
}

#[test]
fn test_syntax_error_fails_creation() {
    let dir = project();
    fs::write(dir.path().join("lib.ts"), "export function (").unwrap();
    let config = write_config(dir.path(), "build");
    let err = Context::create(LocalService::from_fs(), config).err().unwrap();
    let EngineError::Service(ServiceError::Parse { path, diagnostics }) = err else {
        panic!("expected a parse error");
    };
    assert_eq!(path, dir.path().join("lib.ts"));
    assert!(!diagnostics.is_empty());
}
