//! Core data model for Mathrace.
//!
//! Every type here can travel on the wire. Room and match views render
//! name→value mappings as ordered JSON objects (via `BTreeMap`) so a
//! client can rebuild rosters, live problems, and final scores, and so
//! the same state always serializes to the same bytes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SettingsError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for a room.
///
/// Newtype over `u64`, serialized as the bare number. Identifiers are
/// allocated by the registry and never reused while it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Operation & bounds
// ---------------------------------------------------------------------------

/// One of the four arithmetic operations a problem can use.
///
/// Serialized as its symbol (`"+"`, `"-"`, `"*"`, `"/"`), the same
/// representation the browser client declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 4] = [Self::Add, Self::Sub, Self::Mul, Self::Div];

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    /// `true` for ADD/SUB, which draw operands from `add_bounds`.
    pub fn is_additive(self) -> bool {
        matches!(self, Self::Add | Self::Sub)
    }

    /// Evaluates `a op b`.
    ///
    /// Returns `None` on overflow, on division by zero, and when a
    /// division would not produce an exact integer.
    pub fn apply(self, a: i64, b: i64) -> Option<i64> {
        match self {
            Self::Add => a.checked_add(b),
            Self::Sub => a.checked_sub(b),
            Self::Mul => a.checked_mul(b),
            Self::Div => {
                if b == 0 || a.checked_rem(b)? != 0 {
                    None
                } else {
                    a.checked_div(b)
                }
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Two inclusive `(min, max)` ranges, one per operand.
///
/// For DIV, `bounds_1` bounds the quotient and `bounds_2` the divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpBounds {
    pub bounds_1: (i64, i64),
    pub bounds_2: (i64, i64),
}

impl OpBounds {
    pub const fn new(bounds_1: (i64, i64), bounds_2: (i64, i64)) -> Self {
        Self { bounds_1, bounds_2 }
    }

    /// Returns the first inverted range, if any.
    pub fn inverted(&self) -> Option<(i64, i64)> {
        [self.bounds_1, self.bounds_2]
            .into_iter()
            .find(|(min, max)| min > max)
    }

    /// Every `(operand_1, operand_2)` pair at a corner of the two ranges.
    fn corners(&self) -> [(i64, i64); 4] {
        let ((a0, a1), (b0, b1)) = (self.bounds_1, self.bounds_2);
        [(a0, b0), (a0, b1), (a1, b0), (a1, b1)]
    }

    /// `true` if some operand pair makes `operation` leave the `i64` range.
    ///
    /// Sums, differences, and products over a box reach their extremes at
    /// its corners. DIV builds its dividend as `quotient * divisor`, so it
    /// is checked as a product.
    pub fn overflows(&self, operation: Operation) -> bool {
        let checked: fn(i64, i64) -> Option<i64> = match operation {
            Operation::Add => i64::checked_add,
            Operation::Sub => i64::checked_sub,
            Operation::Mul | Operation::Div => i64::checked_mul,
        };
        self.corners().into_iter().any(|(a, b)| checked(a, b).is_none())
    }
}

impl fmt::Display for OpBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{({}, {}) x ({}, {})}}",
            self.bounds_1.0, self.bounds_1.1, self.bounds_2.0, self.bounds_2.1
        )
    }
}

// ---------------------------------------------------------------------------
// MatchSettings
// ---------------------------------------------------------------------------

/// Configuration for a match.
///
/// A room holds a pending copy it may replace freely in the lobby; a
/// match takes its own snapshot at start and never sees later edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSettings {
    /// Operations a problem may use. Drawn uniformly.
    pub operations: BTreeSet<Operation>,
    /// Operand ranges for ADD and SUB.
    pub add_bounds: OpBounds,
    /// Operand ranges for MUL and DIV.
    pub mul_bounds: OpBounds,
    /// Match length in seconds.
    pub duration: u32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            operations: Operation::ALL.into_iter().collect(),
            add_bounds: OpBounds::new((2, 100), (2, 100)),
            mul_bounds: OpBounds::new((2, 12), (2, 100)),
            duration: 120,
        }
    }
}

impl MatchSettings {
    /// The bounds family an operation draws its operands from.
    pub fn bounds_for(&self, operation: Operation) -> &OpBounds {
        if operation.is_additive() {
            &self.add_bounds
        } else {
            &self.mul_bounds
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration))
    }

    /// Checks every structural rule a room relies on.
    ///
    /// # Errors
    /// Returns the first [`SettingsError`] found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.operations.is_empty() {
            return Err(SettingsError::NoOperations);
        }
        if self.duration == 0 {
            return Err(SettingsError::ZeroDuration);
        }
        for (family, bounds) in [("add", &self.add_bounds), ("mul", &self.mul_bounds)] {
            if let Some((min, max)) = bounds.inverted() {
                return Err(SettingsError::InvertedBounds { family, min, max });
            }
        }
        if self.operations.contains(&Operation::Div) && self.mul_bounds.bounds_2 == (0, 0) {
            return Err(SettingsError::NoDivisor);
        }
        if let Some(&operation) = self
            .operations
            .iter()
            .find(|op| self.bounds_for(**op).overflows(**op))
        {
            return Err(SettingsError::Overflow { operation });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Problem & Player
// ---------------------------------------------------------------------------

/// A single arithmetic question with its precomputed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub num1: i64,
    pub num2: i64,
    pub operation: Operation,
    pub result: i64,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} = {}",
            self.num1, self.operation, self.num2, self.result
        )
    }
}

/// A player as seen inside a room or a match.
///
/// `current_problem` is only ever set on a participant of an active match
/// who still has a question to answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub score: u32,
    pub current_problem: Option<Problem>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            current_problem: None,
        }
    }

    /// Checks `answer` against the current problem.
    ///
    /// Awards one point and returns `true` on a match. The problem itself
    /// is left in place; the caller decides what comes next.
    pub fn check(&mut self, answer: i64) -> bool {
        match &self.current_problem {
            Some(problem) if problem.result == answer => {
                self.score = self.score.saturating_add(1);
                true
            }
            _ => false,
        }
    }

    pub fn assign_problem(&mut self, problem: Problem) {
        self.current_problem = Some(problem);
    }

    pub fn clear_problem(&mut self) {
        self.current_problem = None;
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.score)?;
        if let Some(problem) = &self.current_problem {
            write!(f, " - {problem}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Match & room views
// ---------------------------------------------------------------------------

/// Outcome of a finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Highest score; ties go to the alphabetically first name.
    pub winner: Player,
    /// Score of every participant, including zeros.
    pub final_scores: BTreeMap<String, u32>,
}

/// Serializable snapshot of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub players: BTreeMap<String, Player>,
    pub settings: MatchSettings,
    pub active: bool,
    pub result: Option<MatchResult>,
    /// Milliseconds left in the match window. Zero once inactive.
    pub remaining_ms: u64,
}

/// Serializable snapshot of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomView {
    pub id: RoomId,
    pub host: Option<Player>,
    pub players: BTreeMap<String, Player>,
    pub settings: MatchSettings,
    #[serde(rename = "match")]
    pub current_match: Option<MatchView>,
}

/// The lifecycle state of a room, derived from its match slot.
///
/// ```text
/// Lobby → InMatch → PostMatch → InMatch → PostMatch …
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomState {
    /// No match has been started yet.
    Lobby,
    /// A match is running; the roster and settings are frozen.
    InMatch,
    /// The last match finished; its result is still visible.
    PostMatch,
}

impl RoomState {
    /// Roster and pending settings may change in every state but `InMatch`.
    pub fn is_roster_editable(&self) -> bool {
        !self.is_active()
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::InMatch)
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::InMatch => write!(f, "InMatch"),
            Self::PostMatch => write!(f, "PostMatch"),
        }
    }
}

/// A short room description returned in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomId,
    pub host: Option<String>,
    pub player_count: usize,
    pub state: RoomState,
}
