//! Activation frames and the frame stack.
//!
//! A frame is a dense collection of value slots keyed by symbol id,
//! corresponding to one lexical activation: either the global frame (index
//! 0, lives for the whole run) or a call frame (lives for the duration of
//! one function call). Every identifier reference resolves to a slot in
//! the current frame, falling back to the global frame — there is no
//! search through intermediate frames; closures capture by snapshot
//! instead (see `function::FunctionRecord`).

use crate::ast::Value;
use crate::config::STACK_SIZE;
use crate::error::{RinhaError, SourceLocation};
use crate::symbol::SymbolId;
use std::collections::HashMap;

/// One lexical activation: a map from symbol id to value.
#[derive(Debug, Default)]
pub struct Frame {
    slots: HashMap<SymbolId, Value>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: SymbolId) -> Option<&Value> {
        self.slots.get(&name)
    }

    pub fn set(&mut self, name: SymbolId, value: Value) {
        self.slots.insert(name, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Value)> {
        self.slots.iter().map(|(&k, v)| (k, v))
    }
}

/// The interpreter's stack of active frames: the global frame at the
/// bottom, plus one frame per nested call.
#[derive(Debug)]
pub struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self { frames: vec![Frame::new()] }
    }

    pub fn global(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn global_mut(&mut self) -> &mut Frame {
        &mut self.frames[0]
    }

    pub fn current(&self) -> &Frame {
        self.frames.last().expect("frame stack is never empty")
    }

    pub fn current_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("frame stack is never empty")
    }

    /// Depth of the frame stack, i.e. the current call nesting.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, frame: Frame, location: SourceLocation) -> Result<(), RinhaError> {
        if self.frames.len() >= STACK_SIZE {
            return Err(RinhaError::StackOverflow { location });
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        self.frames.pop();
        debug_assert!(!self.frames.is_empty(), "must never pop the global frame");
    }

    /// Resolves an identifier: current frame first, falling back to the
    /// global frame. No search of intermediate frames.
    pub fn resolve(&self, name: SymbolId) -> Option<&Value> {
        self.current().get(name).or_else(|| self.global().get(name))
    }

    /// Assigns to the slot `name` resolves to: current frame if it holds
    /// the name already or we're at global scope, else the global frame.
    pub fn assign(&mut self, name: SymbolId, value: Value) {
        if self.frames.len() == 1 || self.current().get(name).is_some() {
            self.current_mut().set(name, value);
        } else {
            self.global_mut().set(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(n: u32) -> SymbolId {
        SymbolId(n)
    }

    #[test]
    fn resolves_from_current_frame_before_global() {
        let mut stack = FrameStack::new();
        stack.global_mut().set(sym(0), Value::Integer(1));
        stack.push(Frame::new(), SourceLocation::default()).unwrap();
        stack.current_mut().set(sym(0), Value::Integer(2));
        assert_eq!(stack.resolve(sym(0)), Some(&Value::Integer(2)));
    }

    #[test]
    fn falls_back_to_global_frame() {
        let mut stack = FrameStack::new();
        stack.global_mut().set(sym(0), Value::Integer(7));
        stack.push(Frame::new(), SourceLocation::default()).unwrap();
        assert_eq!(stack.resolve(sym(0)), Some(&Value::Integer(7)));
    }

    #[test]
    fn stack_overflow_is_fatal_past_the_configured_depth() {
        let mut stack = FrameStack::new();
        for _ in 0..STACK_SIZE - 1 {
            stack.push(Frame::new(), SourceLocation::default()).unwrap();
        }
        assert!(matches!(
            stack.push(Frame::new(), SourceLocation::default()),
            Err(RinhaError::StackOverflow { .. })
        ));
    }
}
