// The virtual machine on hand assembled phrases, without the compiler in the
// way.

use forthkit::{
    lang::code::{BranchCondition, CompiledPhrase, Instruction},
    runtime::{error::ForthError, vm::Vm},
};
use std::rc::Rc;
use test_case::test_case;

fn phrase(instructions: Vec<Instruction>) -> CompiledPhrase {
    CompiledPhrase::new(instructions)
}

#[test_case(Instruction::Add, 2, 3, "5 " ; "add")]
#[test_case(Instruction::Sub, 3, 2, "1 " ; "sub")]
#[test_case(Instruction::Mul, 2, 3, "6 " ; "mul")]
#[test_case(Instruction::Div, 7, 2, "3 " ; "div truncates")]
#[test_case(Instruction::Div, -7, 2, "-3 " ; "div truncates toward zero")]
fn binary_operators(op: Instruction, lhs: i64, rhs: i64, expected: &str) {
    let mut vm = Vm::new();

    vm.exec_phrase(&phrase(vec![
        Instruction::PushConstant(lhs),
        Instruction::PushConstant(rhs),
        op,
        Instruction::Dot,
    ]))
    .unwrap();

    assert_eq!(vm.read_and_reset_output(), expected);
}

#[test]
fn division_by_zero_fails_without_pushing() {
    let mut vm = Vm::new();

    let result = vm.exec_phrase(&phrase(vec![
        Instruction::PushConstant(6),
        Instruction::PushConstant(0),
        Instruction::Div,
    ]));

    assert_eq!(result, Err(ForthError::DivisionByZero));
    assert!(vm.arg_stack().is_empty());
}

#[test]
fn underflow_is_detected_before_execution() {
    let mut vm = Vm::new();

    let result = vm.exec_phrase(&phrase(vec![
        Instruction::PushConstant(1),
        Instruction::Add,
    ]));

    assert_eq!(
        result.unwrap_err().to_string(),
        "add: expected 2 argument(s) but got 1"
    );

    // The pre-check fires before any pop, so the operand is still there.
    assert_eq!(vm.arg_stack().to_string(), "1 ");
}

#[test]
fn dot_on_empty_stack_reports_the_mnemonic() {
    let mut vm = Vm::new();

    let result = vm.exec_phrase(&phrase(vec![Instruction::Dot]));

    assert_eq!(
        result.unwrap_err().to_string(),
        "dot: expected 1 argument(s) but got 0"
    );
}

#[test]
fn emit_appends_the_character() {
    let mut vm = Vm::new();

    vm.exec_phrase(&phrase(vec![
        Instruction::PushConstant(65),
        Instruction::Emit,
    ]))
    .unwrap();

    assert_eq!(vm.read_and_reset_output(), "A");
}

#[test_case(-1 ; "negative code")]
#[test_case(0xD800 ; "surrogate code")]
fn emit_rejects_invalid_character_codes(code: i64) {
    let mut vm = Vm::new();

    let result = vm.exec_phrase(&phrase(vec![
        Instruction::PushConstant(code),
        Instruction::Emit,
    ]));

    assert_eq!(result, Err(ForthError::InvalidCharacterCode(code)));
}

#[test]
fn branch_if_zero_pops_and_jumps_on_zero() {
    let mut vm = Vm::new();

    // 0 makes the branch jump over pushConstant(1).
    vm.exec_phrase(&phrase(vec![
        Instruction::PushConstant(0),
        Instruction::Branch(BranchCondition::IfZero, Some(3)),
        Instruction::PushConstant(1),
        Instruction::PushConstant(2),
        Instruction::Dot,
    ]))
    .unwrap();

    // The skipped pushConstant(1) never ran, only the 2 prints.
    assert_eq!(vm.read_and_reset_output(), "2 ");
}

#[test]
fn branch_if_zero_falls_through_on_nonzero() {
    let mut vm = Vm::new();

    vm.exec_phrase(&phrase(vec![
        Instruction::PushConstant(7),
        Instruction::Branch(BranchCondition::IfZero, Some(3)),
        Instruction::PushConstant(1),
        Instruction::Dot,
    ]))
    .unwrap();

    assert_eq!(vm.read_and_reset_output(), "1 ");
}

#[test]
fn counted_loop_prints_each_index() {
    let mut vm = Vm::new();

    // 3 0 DO I . LOOP
    vm.exec_phrase(&phrase(vec![
        Instruction::PushConstant(3),
        Instruction::PushConstant(0),
        Instruction::Do,
        Instruction::PushLoopIndex,
        Instruction::Dot,
        Instruction::Loop(3),
    ]))
    .unwrap();

    assert_eq!(vm.read_and_reset_output(), "0 1 2 ");
    assert!(vm.arg_stack().is_empty());
}

#[test]
fn loop_without_active_loop_underflows_the_control_stack() {
    let mut vm = Vm::new();

    let result = vm.exec_phrase(&phrase(vec![Instruction::Loop(0)]));

    assert_eq!(
        result,
        Err(ForthError::ControlStackUnderflow { word: "LOOP" })
    );
}

#[test]
fn loop_index_outside_a_loop_underflows_the_control_stack() {
    let mut vm = Vm::new();

    let result = vm.exec_phrase(&phrase(vec![Instruction::PushLoopIndex]));

    assert_eq!(result, Err(ForthError::ControlStackUnderflow { word: "I" }));
}

#[test]
fn call_executes_the_captured_phrase() {
    let mut vm = Vm::new();

    let callee = Rc::new(phrase(vec![
        Instruction::PushConstant(2),
        Instruction::Mul,
    ]));

    vm.exec_phrase(&phrase(vec![
        Instruction::PushConstant(21),
        Instruction::Call("double".to_string(), callee),
        Instruction::Dot,
    ]))
    .unwrap();

    assert_eq!(vm.read_and_reset_output(), "42 ");
}

#[test]
fn failure_inside_a_call_propagates() {
    let mut vm = Vm::new();

    let callee = Rc::new(phrase(vec![Instruction::Div]));

    let result = vm.exec_phrase(&phrase(vec![
        Instruction::PushConstant(1),
        Instruction::PushConstant(0),
        Instruction::Call("crash".to_string(), callee),
        Instruction::PushConstant(99),
    ]));

    assert_eq!(result, Err(ForthError::DivisionByZero));
}

#[test]
fn reset_after_error_clears_both_stacks_but_keeps_output() {
    let mut vm = Vm::new();

    vm.exec_phrase(&phrase(vec![
        Instruction::PushConstant(1),
        Instruction::Dot,
        Instruction::PushConstant(5),
        Instruction::PushConstant(3),
        Instruction::PushConstant(0),
        Instruction::Do,
    ]))
    .unwrap();

    vm.reset_after_error();

    assert!(vm.arg_stack().is_empty());
    assert_eq!(vm.read_and_reset_output(), "1 ");
}

#[test]
fn empty_phrase_is_a_no_op() {
    let mut vm = Vm::new();

    vm.exec_phrase(&CompiledPhrase::default()).unwrap();

    assert!(vm.arg_stack().is_empty());
    assert_eq!(vm.read_and_reset_output(), "");
}
