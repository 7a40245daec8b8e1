use compact_str::CompactString;
use smallvec::SmallVec;

use crate::classifier::keyword_eq;
use crate::state::StatePair;

/// Tables listed in FROM for the current scope, in order of appearance.
pub type ActiveTables = SmallVec<[CompactString; 4]>;

/// Saved outer-query state while a parenthesized subquery is scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFrame {
    pub states: StatePair,
    pub active_tables: ActiveTables,
}

/// Stack of outer scopes, one frame per open `( SELECT`.
///
/// Only parentheses directly followed by SELECT push a frame, but every `)`
/// pops one if there is any. A `)` closing a plain expression group nested
/// inside a subquery therefore ends that subquery's scope early.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called on `(` with the token that follows it.
    ///
    /// When the lookahead is SELECT the outer state is saved, then `states`
    /// is reset and `active_tables` emptied for the subquery. Returns whether
    /// a frame was pushed; otherwise the parenthesis is transparent.
    pub fn enter_parenthesis(
        &mut self,
        lookahead: Option<&str>,
        states: &mut StatePair,
        active_tables: &mut ActiveTables,
    ) -> bool {
        if !lookahead.is_some_and(|token| keyword_eq(token, "SELECT")) {
            return false;
        }
        self.frames.push(ScopeFrame {
            states: *states,
            active_tables: std::mem::take(active_tables),
        });
        states.reset();
        true
    }

    /// Called on `)`. Returns the frame to restore, or `None` if no
    /// subquery is open.
    pub fn exit_parenthesis(&mut self) -> Option<ScopeFrame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
