use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForthError>;

/// Any error that can occur while compiling or executing Forth source.
///
/// These are all user input errors and never fatal to the session: the
/// evaluator reports the error once through its [`ErrorHandler`] and resets
/// the relevant transient state, after which the next input line starts from
/// a clean baseline.
///
/// The display strings are the user facing messages.  The core never prints
/// them itself.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ForthError {
    /// The token following `:` parsed as a number or named a special form.
    #[error("word expected after ':' (parsed {0})")]
    ExpectedDefinitionName(String),

    /// `;` with no open definition body.
    #[error("unexpected ;")]
    UnexpectedSemicolon,

    /// The token is not a number and not in the dictionary.
    #[error("unknown word {0}")]
    UnknownWord(String),

    #[error("ELSE without IF")]
    ElseWithoutIf,

    #[error("THEN without IF")]
    ThenWithoutIf,

    #[error("LOOP without DO")]
    LoopWithoutDo,

    /// `;` reached while a conditional is still open.
    #[error("unterminated IF in definition")]
    UnterminatedIf,

    /// `;` reached while a loop is still open.
    #[error("unterminated DO in definition")]
    UnterminatedDo,

    /// The argument stack is shallower than the instruction requires.  The
    /// check happens before execution, so the instruction has no effect.
    #[error("{insn}: expected {expected} argument(s) but got {actual}")]
    ArgumentStackUnderflow {
        insn: String,
        expected: usize,
        actual: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    /// `LOOP` or `I` found fewer control stack entries than an active loop
    /// provides.
    #[error("{word}: not enough arguments on control stack")]
    ControlStackUnderflow { word: &'static str },

    /// `EMIT` popped a value that is not a valid character code.
    #[error("EMIT: invalid character code {0}")]
    InvalidCharacterCode(i64),
}

impl ForthError {
    /// Did this error occur while compiling, as opposed to while executing?
    pub fn is_compile_time(&self) -> bool {
        matches!(
            self,
            ForthError::ExpectedDefinitionName(_)
                | ForthError::UnexpectedSemicolon
                | ForthError::UnknownWord(_)
                | ForthError::ElseWithoutIf
                | ForthError::ThenWithoutIf
                | ForthError::LoopWithoutDo
                | ForthError::UnterminatedIf
                | ForthError::UnterminatedDo
        )
    }

    pub fn is_runtime(&self) -> bool {
        !self.is_compile_time()
    }
}

/// Hosts implement this to be notified of errors.  The evaluator invokes it
/// exactly once per failing input line; the host decides whether to print,
/// log, or collect the message.
pub trait ErrorHandler {
    fn handle_error(&mut self, message: &str);
}

/// An error handler that discards all errors.  This is the default until the
/// host installs its own.
pub struct NullErrorHandler;

impl ErrorHandler for NullErrorHandler {
    fn handle_error(&mut self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_reported_kind() {
        assert_eq!(
            ForthError::UnknownWord("foo".to_string()).to_string(),
            "unknown word foo"
        );
        assert_eq!(
            ForthError::ExpectedDefinitionName(";".to_string()).to_string(),
            "word expected after ':' (parsed ;)"
        );
        assert_eq!(
            ForthError::ControlStackUnderflow { word: "I" }.to_string(),
            "I: not enough arguments on control stack"
        );
    }

    #[test]
    fn compile_and_runtime_kinds_are_disjoint() {
        assert!(ForthError::UnexpectedSemicolon.is_compile_time());
        assert!(!ForthError::UnexpectedSemicolon.is_runtime());
        assert!(ForthError::DivisionByZero.is_runtime());
        assert!(!ForthError::DivisionByZero.is_compile_time());
    }
}
