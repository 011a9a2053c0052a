/// Module for splitting raw source text into word tokens, and for deciding
/// which tokens are integer literals.
pub mod tokenizing;

/// Module for defining the bytecode instructions and the compiled phrases that
/// the virtual machine executes.
pub mod code;

/// Module for compiling a list of tokens into a compiled phrase.  This is
/// where the definition state machine and the control structure bookkeeping
/// live.
pub mod compilation;
