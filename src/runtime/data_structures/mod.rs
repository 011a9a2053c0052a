/// Module for the word dictionary shared by the whole session.
pub mod dictionary;

/// Module for the simple stack type used for arguments, loop state, and
/// compile time bookkeeping.
pub mod forth_stack;
