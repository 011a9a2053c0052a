/// The core data structures shared by the compiler and the virtual machine.
pub mod data_structures;

/// Module for defining the error kinds the toolchain can report and the
/// callback interface errors are delivered through.
pub mod error;

/// Module for the stack based virtual machine that executes compiled phrases.
pub mod vm;

/// Module for the session facade that couples one compiler to one virtual
/// machine.
pub mod evaluator;
