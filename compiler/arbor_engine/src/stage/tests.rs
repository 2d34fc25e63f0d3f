#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn at(stage: Stage) -> StageController {
    let mut controller = StageController::new();
    controller.enter(stage);
    controller
}

#[test]
fn test_stages_are_ordered() {
    assert!(Stage::Parsed < Stage::Checked);
    assert!(Stage::Checked < Stage::BinaryGenerated);
    assert_eq!(Stage::BinaryGenerated.to_string(), "binary-generated");
}

#[test]
fn test_plan_steps_forward() {
    let controller = StageController::new();
    assert_eq!(controller.current(), Stage::Parsed);
    assert_eq!(
        controller.plan(Stage::BinaryGenerated).unwrap(),
        vec![Stage::Checked, Stage::BinaryGenerated]
    );
    assert_eq!(controller.plan(Stage::Checked).unwrap(), vec![Stage::Checked]);
    assert!(controller.plan(Stage::Parsed).unwrap().is_empty());
}

#[test]
fn test_plan_rejects_backward() {
    let err = at(Stage::Checked).plan(Stage::Parsed).unwrap_err();
    assert!(matches!(
        err,
        EngineError::StageViolation {
            stage: Stage::Checked,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "cannot move back to an earlier stage at stage checked"
    );
}

#[test]
fn test_edits_end_at_emission() {
    assert!(at(Stage::Parsed).ensure_editable("edit").is_ok());
    assert!(at(Stage::Checked).ensure_editable("edit").is_ok());
    assert!(matches!(
        at(Stage::BinaryGenerated).ensure_editable("edit"),
        Err(EngineError::StageViolation { operation: "edit", .. })
    ));
}

#[test]
fn test_recheck_only_when_checked() {
    assert!(at(Stage::Parsed).ensure_recheckable().is_err());
    assert!(at(Stage::Checked).ensure_recheckable().is_ok());
    assert!(at(Stage::BinaryGenerated).ensure_recheckable().is_err());
}
