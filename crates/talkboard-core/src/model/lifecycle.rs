use std::fmt;
use std::str::FromStr;

use super::ParseEnumError;

/// An ordered, forward-only status sequence.
///
/// Implementors derive `Ord` in declaration order and list every state in
/// [`Lifecycle::ORDER`] in that same order.
pub trait Lifecycle:
    Copy + Eq + Ord + fmt::Debug + fmt::Display + FromStr<Err = ParseEnumError> + 'static
{
    /// Every state, first to last.
    const ORDER: &'static [Self];

    /// Human label, also the persisted status string.
    fn label(self) -> &'static str;

    /// Lower-case CLI spelling.
    fn slug(self) -> &'static str;

    /// The immediate next state, or `None` when terminal.
    fn successor(self) -> Option<Self> {
        Self::ORDER.iter().copied().find(|state| *state > self)
    }

    fn is_terminal(self) -> bool {
        self.successor().is_none()
    }

    /// States a new record may start in: the first two of the lifecycle.
    fn initial_choices() -> &'static [Self] {
        Self::ORDER.get(..2).unwrap_or(Self::ORDER)
    }

    /// Validate whether a transition from self to `target` is allowed.
    ///
    /// Only the immediate successor is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for no-op, backward, skipping, or
    /// terminal moves.
    fn can_transition_to(self, target: Self) -> Result<(), InvalidTransition> {
        let reason = match self.successor() {
            Some(next) if next == target => return Ok(()),
            _ if self == target => "no-op transition is not allowed",
            None => "status is terminal",
            _ if target < self => "backward transition is not allowed",
            Some(_) => "status advances one step at a time",
        };

        Err(InvalidTransition {
            from: self.label(),
            to: target.label(),
            reason,
        })
    }
}

/// Error returned when a status transition is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
    pub reason: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.reason)
    }
}
