use crate::{
    lang::{
        code::{Address, BranchCondition, CompiledPhrase, Instruction},
        tokenizing::{parse_forth_int, split_into_words},
    },
    runtime::{
        data_structures::{
            dictionary::{DefinitionBody, Dictionary, SpecialForm},
            forth_stack::ForthStack,
        },
        error::{ForthError, Result},
    },
};
use std::fmt::{self, Display, Formatter};
use tracing::debug;

/// Incrementally assembles one compiled phrase.
///
/// The builder is the "phrase under construction" side of the compiler: a
/// growable instruction buffer where branch targets may still be unresolved.
/// Sealing it with [`PhraseBuilder::get_and_reset`] produces the immutable
/// [`CompiledPhrase`] the virtual machine executes.
///
/// Patching and sealing misuse are compiler bugs, not user errors, so they are
/// guarded by assertions rather than reported through [`ForthError`].
#[derive(Default)]
pub struct PhraseBuilder {
    phrase: Vec<Instruction>,
    forward_branch_count: usize,
}

impl PhraseBuilder {
    pub fn new() -> PhraseBuilder {
        PhraseBuilder::default()
    }

    /// The address the next appended instruction will occupy.
    pub fn next_address(&self) -> Address {
        self.phrase.len()
    }

    /// Append an instruction and return its own address.
    pub fn append(&mut self, instruction: Instruction) -> Address {
        self.phrase.push(instruction);
        self.phrase.len() - 1
    }

    /// Append a branch whose target is not yet known and return its address so
    /// it can be patched later.
    pub fn append_forward_branch(&mut self, condition: BranchCondition) -> Address {
        self.forward_branch_count += 1;
        self.append(Instruction::Branch(condition, None))
    }

    /// Resolve the forward branch at `address` to jump to `target`.
    pub fn patch_branch_at(&mut self, address: Address, target: Address) {
        assert!(self.forward_branch_count > 0, "unexpected patching");
        self.forward_branch_count -= 1;

        match self.phrase[address] {
            Instruction::Branch(condition, None) => {
                self.phrase[address] = Instruction::Branch(condition, Some(target));
            }
            _ => panic!("patching a non-branch instruction"),
        }
    }

    /// Seal the accumulated instructions into a compiled phrase and reset the
    /// builder for the next one.
    pub fn get_and_reset(&mut self) -> CompiledPhrase {
        assert!(
            self.forward_branch_count == 0,
            "phrase has unpatched branches"
        );

        CompiledPhrase::new(std::mem::take(&mut self.phrase))
    }
}

/// Compile time bookkeeping for nested `IF`/`ELSE`/`THEN`.
///
/// The pending stack holds, for every conditional still open, the address of
/// the forward branch that is waiting for its target.
#[derive(Default)]
pub struct ConditionalCompiler {
    pending: ForthStack<Address>,
}

impl ConditionalCompiler {
    /// `IF` emits a branch taken when the popped value is zero and remembers
    /// its address for patching.
    pub fn on_if(&mut self, builder: &mut PhraseBuilder) {
        self.pending
            .push(builder.append_forward_branch(BranchCondition::IfZero));
    }

    /// `ELSE` emits the jump over the else branch, points the pending `IF`
    /// branch at the else branch's first instruction, and leaves the new jump
    /// pending for `THEN`.
    pub fn on_else(&mut self, builder: &mut PhraseBuilder) -> Result<()> {
        let if_address = self.pending.pop().ok_or(ForthError::ElseWithoutIf)?;
        let else_address = builder.append_forward_branch(BranchCondition::Always);
        let target = builder.next_address();

        builder.patch_branch_at(if_address, target);
        self.pending.push(else_address);

        Ok(())
    }

    /// `THEN` appends a `Nop` so there is a concrete instruction at the jump
    /// target even when `THEN` ends the phrase, then patches the pending
    /// branch to it.
    pub fn on_then(&mut self, builder: &mut PhraseBuilder) -> Result<()> {
        let pending = self.pending.pop().ok_or(ForthError::ThenWithoutIf)?;
        let target = builder.append(Instruction::Nop);

        builder.patch_branch_at(pending, target);

        Ok(())
    }

    /// Is at least one conditional still waiting for its `THEN`?
    pub fn is_compiling(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

/// Compile time bookkeeping for nested `DO`/`LOOP`.
#[derive(Default)]
pub struct LoopCompiler {
    pending: ForthStack<Address>,
}

impl LoopCompiler {
    /// `DO` emits its instruction and remembers the address of the loop
    /// body's first instruction, the back edge target, not the address of the
    /// `Do` itself.
    pub fn on_do(&mut self, builder: &mut PhraseBuilder) {
        builder.append(Instruction::Do);
        self.pending.push(builder.next_address());
    }

    /// `LOOP` closes the innermost open loop with a back edge to its body
    /// start.
    pub fn on_loop(&mut self, builder: &mut PhraseBuilder) -> Result<()> {
        let body_start = self.pending.pop().ok_or(ForthError::LoopWithoutDo)?;
        builder.append(Instruction::Loop(body_start));

        Ok(())
    }

    /// Is at least one loop still waiting for its `LOOP`?
    pub fn is_compiling(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

/// Where the compiler stands in a `: name ... ;` definition.
#[derive(Clone, PartialEq, Eq, Debug)]
enum DefinitionState {
    /// Not defining anything; compiled code executes immediately.
    None,

    /// Just saw `:`, the next token must be the new word's name.
    WaitingName,

    /// Accumulating the body of the named definition.
    CompilingBody(String),
}

impl DefinitionState {
    fn is_defining(&self) -> bool {
        !matches!(self, DefinitionState::None)
    }

    fn is_waiting_name(&self) -> bool {
        matches!(self, DefinitionState::WaitingName)
    }
}

impl Display for DefinitionState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            DefinitionState::None => write!(f, "none"),
            DefinitionState::WaitingName => write!(f, "waitingName"),
            DefinitionState::CompilingBody(name) => write!(f, "compilingBody({})", name),
        }
    }
}

/// The compiler entry point and heart.
///
/// One compiler instance lives for the whole session.  The dictionary persists
/// across calls to [`Compiler::compile`], while the definition state, the
/// phrase being compiled, and both helper stacks persist only long enough to
/// span multi-line definitions and are reset wholesale on any compile error.
pub struct Compiler {
    definition_state: DefinitionState,
    conditionals: ConditionalCompiler,
    loops: LoopCompiler,
    dictionary: Dictionary,
    phrase_being_compiled: PhraseBuilder,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Create a compiler with the builtin words preloaded.
    pub fn new() -> Compiler {
        let mut dictionary = Dictionary::new();

        dictionary.append_phrase("+", CompiledPhrase::new(vec![Instruction::Add]));
        dictionary.append_phrase("-", CompiledPhrase::new(vec![Instruction::Sub]));
        dictionary.append_phrase("*", CompiledPhrase::new(vec![Instruction::Mul]));
        dictionary.append_phrase("/", CompiledPhrase::new(vec![Instruction::Div]));
        dictionary.append_phrase(".", CompiledPhrase::new(vec![Instruction::Dot]));
        dictionary.append_phrase("EMIT", CompiledPhrase::new(vec![Instruction::Emit]));
        dictionary.append_phrase("I", CompiledPhrase::new(vec![Instruction::PushLoopIndex]));

        dictionary.append_special_form(":", SpecialForm::Colon);
        dictionary.append_special_form(";", SpecialForm::Semicolon);
        dictionary.append_special_form("IF", SpecialForm::If);
        dictionary.append_special_form("THEN", SpecialForm::Then);
        dictionary.append_special_form("ELSE", SpecialForm::Else);
        dictionary.append_special_form("DO", SpecialForm::Do);
        dictionary.append_special_form("LOOP", SpecialForm::Loop);

        Compiler {
            definition_state: DefinitionState::None,
            conditionals: ConditionalCompiler::default(),
            loops: LoopCompiler::default(),
            dictionary,
            phrase_being_compiled: PhraseBuilder::new(),
        }
    }

    /// The session dictionary, for host side introspection.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Is the current phrase syntactically incomplete?  True while a
    /// definition is open or any `IF`/`DO` is still unbalanced, in which case
    /// compilation must continue accumulating across input lines.
    pub fn is_compiling(&self) -> bool {
        self.definition_state.is_defining()
            || self.conditionals.is_compiling()
            || self.loops.is_compiling()
    }

    /// Transform one line of source text into a compiled phrase.
    ///
    /// On success the returned phrase is ready for immediate execution.  It is
    /// explicitly empty when the line left a definition or control structure
    /// open, meaning nothing should run yet and more input is needed.
    ///
    /// On failure the remaining tokens of the line are not processed and all
    /// transient compiler state is discarded, including any earlier lines of a
    /// still open multi-line definition.  Words already registered in the
    /// dictionary are untouched.
    pub fn compile(&mut self, input: &str) -> Result<CompiledPhrase> {
        for token in split_into_words(input) {
            debug!(token, state = %self.definition_state, "compiling token");

            if let Err(error) = self.compile_token(token) {
                self.reset_after_error();
                return Err(error);
            }
        }

        if self.is_compiling() {
            Ok(CompiledPhrase::default())
        } else {
            Ok(self.phrase_being_compiled.get_and_reset())
        }
    }

    /// Compile a single token into the phrase being compiled.
    fn compile_token(&mut self, token: &str) -> Result<()> {
        if self.definition_state.is_waiting_name() {
            if parse_forth_int(token).is_some() || self.dictionary.is_special_form(token) {
                return Err(ForthError::ExpectedDefinitionName(token.to_string()));
            }

            self.definition_state = DefinitionState::CompilingBody(token.to_string());
            return Ok(());
        }

        if let Some(n) = parse_forth_int(token) {
            self.phrase_being_compiled.append(Instruction::PushConstant(n));
            return Ok(());
        }

        let body = self
            .dictionary
            .lookup(token)
            .map(|definition| definition.body.clone());

        match body {
            Some(DefinitionBody::SpecialForm(form)) => self.compile_special_form(form),

            Some(DefinitionBody::Regular(phrase)) => {
                self.phrase_being_compiled
                    .append(Instruction::Call(token.to_string(), phrase));
                Ok(())
            }

            None => Err(ForthError::UnknownWord(token.to_string())),
        }
    }

    /// Deal with the words whose effect happens at compile time.
    fn compile_special_form(&mut self, form: SpecialForm) -> Result<()> {
        match form {
            SpecialForm::Colon => {
                self.definition_state = DefinitionState::WaitingName;
            }

            SpecialForm::Semicolon => {
                let state = std::mem::replace(&mut self.definition_state, DefinitionState::None);

                let DefinitionState::CompilingBody(name) = state else {
                    return Err(ForthError::UnexpectedSemicolon);
                };

                if self.conditionals.is_compiling() {
                    return Err(ForthError::UnterminatedIf);
                }

                if self.loops.is_compiling() {
                    return Err(ForthError::UnterminatedDo);
                }

                let phrase = self.phrase_being_compiled.get_and_reset();
                debug!(word = %name, "registering definition");
                self.dictionary.append_phrase(&name, phrase);
            }

            SpecialForm::If => self.conditionals.on_if(&mut self.phrase_being_compiled),
            SpecialForm::Then => self.conditionals.on_then(&mut self.phrase_being_compiled)?,
            SpecialForm::Else => self.conditionals.on_else(&mut self.phrase_being_compiled)?,
            SpecialForm::Do => self.loops.on_do(&mut self.phrase_being_compiled),
            SpecialForm::Loop => self.loops.on_loop(&mut self.phrase_being_compiled)?,
        }

        Ok(())
    }

    /// Roll the compiler back to a consistent empty baseline.  The dictionary
    /// keeps every definition completed before the error.
    fn reset_after_error(&mut self) {
        self.definition_state = DefinitionState::None;
        self.conditionals.reset();
        self.loops.reset();
        self.phrase_being_compiled = PhraseBuilder::new();
    }
}
