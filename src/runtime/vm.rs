use crate::{
    lang::code::{Address, BranchCondition, CompiledPhrase, Instruction},
    runtime::{
        data_structures::forth_stack::ForthStack,
        error::{ForthError, Result},
    },
};
use tracing::trace;

/// The Forth virtual machine.
///
/// Holds the state that survives across input lines: the argument stack, the
/// loop control stack, and the accumulated output text.  Output is only ever
/// appended by `Dot` and `Emit`; the host retrieves it with
/// [`Vm::read_and_reset_output`].
#[derive(Default)]
pub struct Vm {
    arg_stack: ForthStack<i64>,
    control_stack: ForthStack<i64>,
    output: String,
}

impl Vm {
    pub fn new() -> Vm {
        Vm::default()
    }

    /// The argument stack, readable for display but not externally mutable.
    pub fn arg_stack(&self) -> &ForthStack<i64> {
        &self.arg_stack
    }

    /// Take the accumulated output, leaving the buffer empty.
    pub fn read_and_reset_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Roll the machine back to a consistent baseline after a runtime error.
    /// Output accumulated before the failing instruction is kept.
    pub fn reset_after_error(&mut self) {
        self.arg_stack.clear();
        self.control_stack.clear();
    }

    /// Execute a phrase from address zero to completion.  A failing
    /// instruction aborts the phrase and, through any chain of nested calls,
    /// the whole execution.
    pub fn exec_phrase(&mut self, phrase: &CompiledPhrase) -> Result<()> {
        let mut pc = 0;

        while pc < phrase.len() {
            trace!(pc, insn = %phrase[pc], "executing");
            pc = self.exec_instruction(pc, &phrase[pc])?;
        }

        Ok(())
    }

    /// Execute a single instruction and return the next program counter.
    fn exec_instruction(&mut self, pc: Address, insn: &Instruction) -> Result<Address> {
        let expected = insn.expected_argument_count();

        if self.arg_stack.len() < expected {
            return Err(ForthError::ArgumentStackUnderflow {
                insn: insn.to_string(),
                expected,
                actual: self.arg_stack.len(),
            });
        }

        match insn {
            Instruction::Nop => {}

            Instruction::Add => {
                let rhs = self.pop();
                let lhs = self.pop();
                self.arg_stack.push(lhs.wrapping_add(rhs));
            }

            Instruction::Sub => {
                let rhs = self.pop();
                let lhs = self.pop();
                self.arg_stack.push(lhs.wrapping_sub(rhs));
            }

            Instruction::Mul => {
                let rhs = self.pop();
                let lhs = self.pop();
                self.arg_stack.push(lhs.wrapping_mul(rhs));
            }

            Instruction::Div => {
                let rhs = self.pop();
                let lhs = self.pop();

                if rhs == 0 {
                    return Err(ForthError::DivisionByZero);
                }

                self.arg_stack.push(lhs.wrapping_div(rhs));
            }

            Instruction::Dot => {
                let value = self.pop();
                self.output.push_str(&format!("{} ", value));
            }

            Instruction::Emit => {
                let code = self.pop();
                let character = u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(ForthError::InvalidCharacterCode(code))?;

                self.output.push(character);
            }

            Instruction::PushConstant(k) => self.arg_stack.push(*k),

            Instruction::Call(name, phrase) => {
                trace!(word = %name, "calling");
                self.exec_phrase(phrase)?;
            }

            Instruction::Branch(condition, target) => {
                let target = (*target).expect("branch resolved when the phrase was sealed");

                match condition {
                    BranchCondition::Always => return Ok(target),

                    BranchCondition::IfZero => {
                        if self.pop() == 0 {
                            return Ok(target);
                        }
                    }
                }
            }

            Instruction::Do => {
                // `5 0 DO` counts from 0 up to 5: the top of the argument
                // stack is the starting index, the value beneath it the limit.
                let index = self.pop();
                let limit = self.pop();

                self.control_stack.push(limit);
                self.control_stack.push(index);
            }

            Instruction::Loop(back_address) => {
                if self.control_stack.len() < 2 {
                    return Err(ForthError::ControlStackUnderflow { word: "LOOP" });
                }

                let index = self.control_pop() + 1;
                let limit = *self
                    .control_stack
                    .top()
                    .expect("control stack depth checked above");

                if index < limit {
                    self.control_stack.push(index);
                    return Ok(*back_address);
                }

                // Loop complete, drop the limit as well.
                let _ = self.control_stack.pop();
            }

            Instruction::PushLoopIndex => {
                let index = *self
                    .control_stack
                    .top()
                    .ok_or(ForthError::ControlStackUnderflow { word: "I" })?;

                self.arg_stack.push(index);
            }
        }

        Ok(pc + 1)
    }

    fn pop(&mut self) -> i64 {
        self.arg_stack
            .pop()
            .expect("argument count checked before execution")
    }

    fn control_pop(&mut self) -> i64 {
        self.control_stack
            .pop()
            .expect("control stack depth checked before popping")
    }
}
