#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use arbor_ir::NodeArena;
use pretty_assertions::assert_eq;

fn lower_source(source: &str) -> CompiledUnit {
    let mut arena = NodeArena::new();
    let root = arbor_parse::parse(source, &mut arena).unwrap();
    lower(&arena, root, "main").unwrap()
}

#[test]
fn test_lower_summarizes_program() {
    let unit = lower_source(
        r#"
        import D, { a as b } from "./lib"
        import type * as T from "./types"
        export function run(x, y) { b(x); console.log(y); g()() }
        export default class App { start() { run(1, 2) } }
        const hidden = 1
        export { hidden as shown }
        "#,
    );

    assert_eq!(unit.module, "main");
    assert_eq!(
        unit.imports,
        vec![
            ImportRecord {
                source: "./lib".into(),
                names: vec!["default".into(), "a".into()],
                type_only: false,
            },
            ImportRecord {
                source: "./types".into(),
                names: vec!["*".into()],
                type_only: true,
            },
        ]
    );
    assert_eq!(unit.exports, vec!["run", "default", "shown"]);
    assert_eq!(
        unit.functions,
        vec![
            FunctionRecord {
                name: "run".into(),
                arity: 2,
                calls: vec!["b".into(), "console.log".into(), "g".into()],
            },
            FunctionRecord {
                name: "App.start".into(),
                arity: 0,
                calls: vec!["run".into()],
            },
        ]
    );
    assert_eq!(unit.classes[0].methods, vec!["start"]);
}

#[test]
fn test_encode_decode() {
    let unit = lower_source("export function f() { print(1) }");
    let bytes = encode(&unit).unwrap();
    assert_eq!(&bytes[..4], b"ARBC");
    assert_eq!(bytes[4], FORMAT_VERSION);
    assert_eq!(decode(&bytes).unwrap(), unit);
}

#[test]
fn test_decode_rejects_bad_header() {
    assert!(matches!(decode(b"nope"), Err(EmitError::BadMagic)));
    assert!(matches!(decode(b"XXXX\x01"), Err(EmitError::BadMagic)));

    let mut bytes = encode(&CompiledUnit::default()).unwrap();
    bytes[4] = FORMAT_VERSION + 1;
    assert!(matches!(
        decode(&bytes),
        Err(EmitError::UnsupportedVersion { .. })
    ));
}

#[test]
fn test_decode_rejects_truncated_payload() {
    let bytes = encode(&lower_source("function f() {}")).unwrap();
    assert!(matches!(
        decode(&bytes[..bytes.len() - 2]),
        Err(EmitError::Codec(_))
    ));
}

#[test]
fn test_stale_root() {
    let mut arena = NodeArena::new();
    let root = arbor_parse::parse("f()", &mut arena).unwrap();
    let other = NodeArena::new();
    assert!(lower(&other, root, "x").is_err());
}
