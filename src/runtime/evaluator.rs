use crate::{
    lang::compilation::Compiler,
    runtime::{
        data_structures::forth_stack::ForthStack,
        error::{ErrorHandler, NullErrorHandler, Result},
        vm::Vm,
    },
};
use tracing::debug;

/// Top level coordinator of one interactive Forth session.
///
/// Owns the compiler and the virtual machine and passes compiled phrases from
/// one to the other; they share no other state.  The dictionary and the
/// argument stack live as long as the evaluator, so definitions and stacked
/// values carry over from one input line to the next.
///
/// Sessions are fully independent: create one evaluator per session, there are
/// no globals behind it.
pub struct Evaluator {
    compiler: Compiler,
    vm: Vm,
    error_handler: Box<dyn ErrorHandler>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Create an evaluator with the builtin words loaded.  Builtins written in
    /// Forth itself are compiled through the same path as user input.
    pub fn new() -> Evaluator {
        let mut evaluator = Evaluator {
            compiler: Compiler::new(),
            vm: Vm::new(),
            error_handler: Box::new(NullErrorHandler),
        };

        evaluator.eval_builtin(": CR 13 EMIT ;");

        evaluator
    }

    /// Install the callback that receives error messages.  It is invoked
    /// exactly once per failing input line.
    pub fn set_error_handler(&mut self, handler: Box<dyn ErrorHandler>) {
        self.error_handler = handler;
    }

    /// Compile and execute one line of input.
    ///
    /// On failure the error has already been delivered to the error handler
    /// and the transient compiler or machine state has been reset; the
    /// returned error is for hosts that prefer to branch on it directly.
    pub fn eval(&mut self, input: &str) -> Result<()> {
        debug!(input, "evaluating");

        match self.compile_and_exec(input) {
            Ok(()) => Ok(()),

            Err(error) => {
                self.error_handler.handle_error(&error.to_string());
                Err(error)
            }
        }
    }

    fn compile_and_exec(&mut self, input: &str) -> Result<()> {
        // The compiler resets its own transient state when it fails.
        let phrase = self.compiler.compile(input)?;

        if let Err(error) = self.vm.exec_phrase(&phrase) {
            self.vm.reset_after_error();
            return Err(error);
        }

        Ok(())
    }

    /// Is the session in the middle of a multi-line definition or control
    /// structure?  Hosts use this to show a continuation prompt.
    pub fn is_compiling(&self) -> bool {
        self.compiler.is_compiling()
    }

    /// Take the output produced by `.` and `EMIT` since the last call.
    pub fn read_and_reset_output(&mut self) -> String {
        self.vm.read_and_reset_output()
    }

    /// The argument stack, readable for prompt display.
    pub fn arg_stack(&self) -> &ForthStack<i64> {
        self.vm.arg_stack()
    }

    /// Evaluate a builtin definition that is part of the evaluator itself.  A
    /// failure here is a bug in the builtin, not a user error.
    fn eval_builtin(&mut self, input: &str) {
        if self.eval(input).is_err() {
            panic!("failed to evaluate builtin definition '{}'", input);
        }
    }
}
