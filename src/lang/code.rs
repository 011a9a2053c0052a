use std::{
    fmt::{self, Display, Formatter},
    ops::Index,
    rc::Rc,
};

/// A zero based instruction index within one compiled phrase.  Addresses are
/// only meaningful within the phrase that contains them.
pub type Address = usize;

/// The condition attached to a branch instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BranchCondition {
    /// Take the branch unconditionally.
    Always,

    /// Pop the top of the argument stack and take the branch if it is zero.
    IfZero,
}

impl Display for BranchCondition {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BranchCondition::Always => write!(f, "always"),
            BranchCondition::IfZero => write!(f, "ifZero"),
        }
    }
}

/// The operations that can be performed by the Forth virtual machine.
///
/// This is a closed set.  User defined words never add new instructions, they
/// only combine existing ones into new phrases invoked through `Call`.
#[derive(Clone, Debug)]
pub enum Instruction {
    /// Do nothing and advance.  Emitted by `THEN` so a branch target always
    /// lands on a concrete instruction, even at the end of a phrase.
    Nop,

    /// Pop two values and push their sum.
    Add,

    /// Pop two values and push their difference.  The second popped value is
    /// the left operand.
    Sub,

    /// Pop two values and push their product.
    Mul,

    /// Pop two values and push their quotient, truncating toward zero.  The
    /// second popped value is the left operand.  Division by zero is a
    /// runtime error.
    Div,

    /// Pop the top value and append its decimal representation, followed by
    /// one space, to the output buffer.
    Dot,

    /// Pop the top value, interpret it as a character code, and append that
    /// character to the output buffer.
    Emit,

    /// Push a constant onto the argument stack.
    PushConstant(i64),

    /// Invoke another compiled phrase as a nested interpretive call.  The
    /// phrase is captured at compile time, so later redefinitions of the named
    /// word do not affect calls compiled before them.  The name is kept for
    /// disassembly and tracing only.
    Call(String, Rc<CompiledPhrase>),

    /// Jump to another address in the containing phrase.  The target is
    /// `None` only while the phrase is under construction; sealing a phrase
    /// requires every branch to be resolved.
    Branch(BranchCondition, Option<Address>),

    /// Pop the starting index and the limit from the argument stack and push
    /// them onto the control stack, leaving the running index on top.
    Do,

    /// Increment the loop index on top of the control stack and jump back to
    /// the recorded body start while the index is below the limit.  Once the
    /// limit is reached the index/limit pair is dropped and execution falls
    /// through.
    Loop(Address),

    /// Push a copy of the control stack's top, the innermost loop index,
    /// without popping it.  This is the Forth word `I`.
    PushLoopIndex,
}

impl Instruction {
    /// How many values this instruction consumes from the argument stack.
    /// Checked before execution so a failing instruction has no side effect on
    /// the argument stack.
    pub fn expected_argument_count(&self) -> usize {
        match self {
            Instruction::Nop
            | Instruction::PushConstant(_)
            | Instruction::Call(_, _)
            | Instruction::Loop(_)
            | Instruction::PushLoopIndex => 0,

            Instruction::Dot | Instruction::Emit => 1,

            Instruction::Add
            | Instruction::Sub
            | Instruction::Mul
            | Instruction::Div
            | Instruction::Do => 2,

            Instruction::Branch(condition, _) => match condition {
                BranchCondition::Always => 0,
                BranchCondition::IfZero => 1,
            },
        }
    }
}

/// Print the instruction as a lowercase mnemonic.  Used by the phrase listing
/// and by the runtime's stack underflow messages.
impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Instruction::Nop => write!(f, "nop"),
            Instruction::Add => write!(f, "add"),
            Instruction::Sub => write!(f, "sub"),
            Instruction::Mul => write!(f, "mul"),
            Instruction::Div => write!(f, "div"),
            Instruction::Dot => write!(f, "dot"),
            Instruction::Emit => write!(f, "emit"),
            Instruction::PushConstant(k) => write!(f, "pushConstant({})", k),
            Instruction::Call(name, _) => write!(f, "call({})", name),
            Instruction::Branch(condition, Some(target)) => {
                write!(f, "branch({}, {})", condition, target)
            }
            Instruction::Branch(condition, None) => write!(f, "branch({}, ?)", condition),
            Instruction::Do => write!(f, "do"),
            Instruction::Loop(back) => write!(f, "loop({})", back),
            Instruction::PushLoopIndex => write!(f, "pushLoopIndex"),
        }
    }
}

/// An ordered, immutable once sealed, sequence of instructions.  Typically
/// corresponds to one word definition or one top level input line.
#[derive(Clone, Debug, Default)]
pub struct CompiledPhrase {
    instructions: Vec<Instruction>,
}

impl CompiledPhrase {
    /// Wrap a finished instruction sequence.  The builder guarantees that
    /// every branch is resolved before this is called.
    pub fn new(instructions: Vec<Instruction>) -> CompiledPhrase {
        CompiledPhrase { instructions }
    }

    /// The number of instructions in the phrase.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Does the phrase contain no instructions at all?  The compiler returns
    /// an empty phrase while a multi-line definition is still open.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl Index<Address> for CompiledPhrase {
    type Output = Instruction;

    fn index(&self, address: Address) -> &Instruction {
        &self.instructions[address]
    }
}

/// Pretty print the phrase as an address prefixed listing, one instruction per
/// line, for debugging and tracing.
impl Display for CompiledPhrase {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for (address, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{:4}: {}", address, instruction)?;
        }

        Ok(())
    }
}
