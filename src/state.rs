use crate::classifier::keyword_eq;

/// Which clause the extractor believes it is in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParserState {
    #[default]
    None,
    Select,
    From,
    Where,
}

/// What a keyword asks the extractor to do with its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `SELECT` / `UNION`: both states become `Select` and the active
    /// tables are cleared before the next ordinary token.
    Restart,
    /// `FROM` / `JOIN`.
    EnterFrom,
    /// `WHERE` / `ON` / `BY`.
    EnterWhere,
}

impl Transition {
    pub fn for_token(token: &str) -> Option<Self> {
        const RESTART: &[&str] = &["SELECT", "UNION"];
        const FROM: &[&str] = &["FROM", "JOIN"];
        const WHERE: &[&str] = &["WHERE", "ON", "BY"];

        let any = |set: &[&str]| set.iter().any(|kw| keyword_eq(token, kw));
        if any(RESTART) {
            Some(Self::Restart)
        } else if any(FROM) {
            Some(Self::EnterFrom)
        } else if any(WHERE) {
            Some(Self::EnterWhere)
        } else {
            None
        }
    }
}

/// Current and previous parser state, updated together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatePair {
    pub current: ParserState,
    pub previous: ParserState,
}

impl StatePair {
    /// Apply `transition`. Returns whether the current state changed.
    pub fn apply(&mut self, transition: Transition) -> bool {
        let before = self.current;
        match transition {
            Transition::Restart => {
                self.previous = ParserState::Select;
                self.current = ParserState::Select;
            }
            Transition::EnterFrom => {
                self.previous = self.current;
                self.current = ParserState::From;
            }
            Transition::EnterWhere => {
                self.previous = self.current;
                self.current = ParserState::Where;
            }
        }
        self.current != before
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
