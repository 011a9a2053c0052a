use std::fmt::{self, Display, Formatter};

/// A plain push/pop stack.
///
/// One type serves every stack in the system: the argument stack and the loop
/// control stack at run time, and the pending address stacks the control
/// structure helpers keep at compile time.  The top of the stack is the most
/// recently pushed item.
#[derive(Clone, Default)]
pub struct ForthStack<T> {
    items: Vec<T>,
}

impl<T> ForthStack<T> {
    pub fn new() -> ForthStack<T> {
        ForthStack { items: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Pop the most recently pushed item, or `None` if the stack is empty.
    /// Callers that have already checked the depth may unwrap with an
    /// invariant message.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Look at the most recently pushed item without popping it.
    pub fn top(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterate the items from the bottom of the stack to the top.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// Print the items bottom to top, each followed by one space.  The REPL uses
/// this to show the argument stack in its prompt.
impl<T: Display> Display for ForthStack<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for item in self.items.iter() {
            write!(f, "{} ", item)?;
        }

        Ok(())
    }
}
