//! A small interactive Forth toolchain.
//!
//! The crate is split in two halves.  The [`lang`] module covers everything
//! that happens before execution: splitting raw source text into word tokens
//! and compiling those tokens into linear bytecode phrases.  The [`runtime`]
//! module covers everything that happens after: the stack machine that
//! executes a compiled phrase, the error reporting that goes with it, and the
//! [`runtime::evaluator::Evaluator`] facade that ties a compiler and a
//! virtual machine together into one interactive session.
//!
//! The library never prints anything itself.  Forth output (`.` and `EMIT`)
//! accumulates in a buffer the host reads and resets, and errors are
//! delivered through a host supplied [`runtime::error::ErrorHandler`]
//! callback.

/// Module for turning source code into tokens and tokens into bytecode.
pub mod lang;

/// Module for the virtual machine, the session state, and error reporting.
pub mod runtime;
