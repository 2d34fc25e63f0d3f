//! Whole-pipeline scenarios over the local service.

use std::cell::RefCell;
use std::rc::Rc;

use arbor_diagnostic::ErrorCode;
use arbor_engine::{BindingKey, EngineError, Pipeline, Plugin, Stage};
use arbor_ir::visitor::rewrite_kind;
use arbor_ir::{NodeData, NodeKind};
use pretty_assertions::assert_eq;

use crate::common::{memory_context, rename};

const LIB: &str = "export function testFunction() {}";
const MAIN: &str = "import { testFunction } from \"./lib\"\ntestFunction()";

#[test]
fn test_import_addition() {
    let mut cx = memory_context(&[("main.ts", "function _() {}")]);
    let mut pipeline = Pipeline::new().with(Plugin::new("add-import", |edit, _options, _cx| {
        let arena = edit.arena_mut();
        let specifier = arena.import_specifier("X", "X");
        let import = arena.import_declaration("./variable", vec![specifier])?;
        let mut statements = vec![import];
        statements.extend_from_slice(edit.ast()?.statements());
        let root = edit.root();
        Ok(Some(edit.arena_mut().with_statements(root, statements)?))
    }));
    let mut plugin_cx = cx.plugin_context();
    cx.run_pipeline(&mut pipeline, &mut plugin_cx).unwrap();

    let main = cx.graph().main_id();
    assert_eq!(cx.stage(), Stage::Parsed);
    assert_eq!(
        cx.dump_src(main).unwrap(),
        "import { X } from \"./variable\"\nfunction _() {}"
    );
    let bindings = cx.tracker().bindings(main);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].key(), BindingKey::new("./variable", "X"));

    // the module does not exist, so checking reports it
    let err = cx.proceed_to(Stage::Checked).unwrap_err();
    let EngineError::BuildFailed(failure) = err else {
        panic!("expected a build failure");
    };
    let codes: Vec<ErrorCode> = failure.diagnostics().iter().map(|(_, d)| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E3003]);
}

#[test]
fn test_cross_file_rename() {
    let mut cx = memory_context(&[("main.ts", MAIN), ("lib.ts", LIB)]);
    cx.proceed_to(Stage::Checked).unwrap();
    let main = cx.graph().main_id();

    let mut pipeline = Pipeline::new().with(rename("testFunction", "testFunctionChanged"));
    let mut plugin_cx = cx.plugin_context();
    let report = cx.run_pipeline(&mut pipeline, &mut plugin_cx).unwrap();

    assert!(report.rechecked);
    assert_eq!(cx.stage(), Stage::Checked);
    assert!(cx.diagnostics().is_empty(), "{:?}", cx.diagnostics());
    assert!(cx.tracker().unresolved_keys().is_empty());
    assert_eq!(
        cx.dump_src(main).unwrap(),
        "import { testFunctionChanged } from \"./lib\"\ntestFunctionChanged()"
    );

    // the binding now lands on the renamed declaration in the library
    let binding = cx
        .tracker()
        .binding(main, &BindingKey::new("./lib", "testFunctionChanged"))
        .unwrap();
    let declaration = cx.node(binding.resolved.unwrap()).unwrap();
    assert_eq!(declaration.kind(), NodeKind::FunctionDeclaration);
    assert_eq!(declaration.name(), Some("testFunctionChanged"));

    // the call site resolves to the rewritten import specifier
    let call = cx
        .root(main)
        .unwrap()
        .descendants()
        .find(|node| node.is_call_expression())
        .unwrap();
    let NodeData::CallExpression { callee, .. } = call.data() else {
        unreachable!()
    };
    let callee = *callee;
    let target = cx.declaration_of(callee).unwrap().unwrap();
    assert_eq!(target.kind(), NodeKind::ImportSpecifier);
    assert_eq!(cx.parent_of(target.id()).unwrap().unwrap().kind(), NodeKind::ImportDeclaration);
}

#[test]
fn test_rename_of_declaration_only_fails_recheck() {
    let mut cx = memory_context(&[("main.ts", MAIN), ("lib.ts", LIB)]);
    cx.proceed_to(Stage::Checked).unwrap();
    let main = cx.graph().main_id();

    let mut pipeline = Pipeline::new().with(Plugin::new("rename-lib", |edit, options, _cx| {
        if options.is_main_program {
            return Ok(None);
        }
        edit.rewrite(&mut rewrite_kind(NodeKind::Identifier, |cx, node| {
            if cx.node(node)?.text() == Some("testFunction") {
                Ok(cx.arena_mut().identifier("testFunctionChanged"))
            } else {
                Ok(node)
            }
        }))?;
        Ok(None)
    }));
    let mut plugin_cx = cx.plugin_context();
    let err = cx.run_pipeline(&mut pipeline, &mut plugin_cx).unwrap_err();

    let EngineError::LinkageRegression { bindings } = err else {
        panic!("expected a linkage regression");
    };
    assert_eq!(bindings, vec![(main, BindingKey::new("./lib", "testFunction"))]);
    assert_eq!(cx.stage(), Stage::Checked);
    let codes: Vec<ErrorCode> = cx.diagnostics().iter().map(|(_, d)| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E3001]);
}

#[test]
fn test_main_transform_sees_rewritten_dependency() {
    let mut cx = memory_context(&[
        ("main.ts", "import { old } from \"./lib\"\nold()"),
        ("lib.ts", "export function old() {}"),
    ]);
    cx.proceed_to(Stage::Checked).unwrap();

    // one plugin: renames the export in the library, then follows it in main
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut pipeline = Pipeline::new().with(Plugin::new("follow-export", move |edit, options, _cx| {
        let exported = if options.is_main_program {
            let lib = edit.program("./lib").unwrap();
            lib.at(lib.statements()[0]).name().unwrap().to_owned()
        } else {
            "fresh".to_owned()
        };
        sink.borrow_mut().push((options.name.to_owned(), exported.clone()));
        edit.rewrite(&mut rewrite_kind(NodeKind::Identifier, |cx, node| {
            if cx.node(node)?.text() == Some("old") {
                Ok(cx.arena_mut().identifier(&exported))
            } else {
                Ok(node)
            }
        }))?;
        Ok(None)
    }));
    let mut plugin_cx = cx.plugin_context();
    cx.run_pipeline(&mut pipeline, &mut plugin_cx).unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![
            ("./lib".to_owned(), "fresh".to_owned()),
            ("main".to_owned(), "fresh".to_owned()),
        ]
    );
    let main = cx.graph().main_id();
    assert_eq!(
        cx.dump_src(main).unwrap(),
        "import { fresh } from \"./lib\"\nfresh()"
    );
}

#[test]
fn test_stage_monotonicity() {
    let mut cx = memory_context(&[("main.ts", MAIN), ("lib.ts", LIB)]);
    cx.proceed_to(Stage::Checked).unwrap();

    let err = cx.proceed_to(Stage::Parsed).unwrap_err();
    assert!(matches!(
        err,
        EngineError::StageViolation {
            stage: Stage::Checked,
            ..
        }
    ));
    assert_eq!(cx.stage(), Stage::Checked);

    cx.recheck().unwrap();
    assert_eq!(cx.stage(), Stage::Checked);

    cx.proceed_to(Stage::BinaryGenerated).unwrap();
    assert_eq!(cx.emitted().len(), 2);
    assert!(matches!(
        cx.recheck(),
        Err(EngineError::StageViolation { .. })
    ));
    assert!(matches!(
        cx.arena_mut(),
        Err(EngineError::StageViolation { .. })
    ));
    // dumping stays legal
    assert_eq!(cx.dump_src(cx.graph().main_id()).unwrap(), MAIN);
}

#[test]
fn test_prelude_is_never_transformed() {
    let mut cx = memory_context(&[("main.ts", "print(1)")]);
    let names = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&names);
    let mut pipeline = Pipeline::new().with(Plugin::new("record", move |edit, _options, _cx| {
        sink.borrow_mut().push(edit.name().to_owned());
        Ok(None)
    }));
    let mut plugin_cx = cx.plugin_context();
    cx.run_pipeline(&mut pipeline, &mut plugin_cx).unwrap();
    assert_eq!(*names.borrow(), vec!["main".to_owned()]);

    cx.proceed_to(Stage::Checked).unwrap();
    assert!(cx.diagnostics().is_empty());
}
