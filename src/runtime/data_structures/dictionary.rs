use crate::lang::code::CompiledPhrase;
use std::rc::Rc;

/// The words whose effect happens during compilation.  They never appear in a
/// compiled phrase; the compiler dispatches on this closed tag instead.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpecialForm {
    Colon,
    Semicolon,
    If,
    Then,
    Else,
    Do,
    Loop,
}

/// What a dictionary entry stands for.
#[derive(Clone)]
pub enum DefinitionBody {
    /// Compile time only, no runtime phrase.
    SpecialForm(SpecialForm),

    /// A regular word owning an immutable compiled phrase.  The phrase is
    /// reference counted because `Call` instructions in other phrases capture
    /// it directly.
    Regular(Rc<CompiledPhrase>),
}

/// An entry in the Forth dictionary.  Immutable once created.
#[derive(Clone)]
pub struct Definition {
    pub name: String,
    pub body: DefinitionBody,
}

/// The Forth dictionary.
///
/// A growing list of definitions rather than a name keyed map, mimicking the
/// classical Forth layout.  Lookup scans from the most recently appended entry
/// backwards, so redefining a word shadows the old definition while phrases
/// compiled earlier keep calling the phrase they captured.  Nothing is ever
/// removed or overwritten in place.
#[derive(Default)]
pub struct Dictionary {
    content: Vec<Definition>,
}

impl Dictionary {
    pub fn new() -> Dictionary {
        Dictionary::default()
    }

    /// Append a definition.  Never fails, even when the name already exists.
    pub fn append(&mut self, definition: Definition) {
        self.content.push(definition);
    }

    /// Append a regular word with the given compiled phrase as its body.
    pub fn append_phrase(&mut self, name: &str, phrase: CompiledPhrase) {
        self.append(Definition {
            name: name.to_string(),
            body: DefinitionBody::Regular(Rc::new(phrase)),
        });
    }

    /// Append a special form.
    pub fn append_special_form(&mut self, name: &str, form: SpecialForm) {
        self.append(Definition {
            name: name.to_string(),
            body: DefinitionBody::SpecialForm(form),
        });
    }

    /// Find the most recent definition of `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<&Definition> {
        self.content
            .iter()
            .rev()
            .find(|definition| definition.name == name)
    }

    /// Does `name` currently resolve to a special form?
    pub fn is_special_form(&self, name: &str) -> bool {
        matches!(
            self.lookup(name),
            Some(Definition {
                body: DefinitionBody::SpecialForm(_),
                ..
            })
        )
    }
}
