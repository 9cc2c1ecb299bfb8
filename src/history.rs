use std::fmt::{Display, Formatter};

/// Notations of the moves played so far, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveLog(Vec<String>);

impl MoveLog {
    pub fn push(&mut self, notation: String) {
        self.0.push(notation)
    }
    /// Drops the most recent entry, used when a move is taken back
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl Display for MoveLog {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}
