/*!

Error kinds raised by the matcher. Most are caller mistakes (malformed shapes fed to construction or matching);
`InternalInvariantViolation` is reserved for defects in the matcher itself and should never actually be observed.

*/

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchError {
  /// A pattern or subject's flattened form is malformed: an `OperationHead` without a matching `OperationEnd`,
  /// or vice versa.
  ShapeError(String),

  /// Two flattened forms that were expected to describe the same surrounding structure (e.g. when fusing
  /// sub-patterns for the sequence matcher) disagree on operation head.
  HeadMismatch(String),

  /// The subject's tape contains an atom that is not a ground symbol or operation marker — most commonly, a
  /// pattern containing a wildcard was passed where a constant subject was required.
  NonTerminalAtom(String),

  /// The product/subset construction reached a state it should be unreachable to reach. Indicates a bug in the
  /// matcher, not a caller mistake.
  InternalInvariantViolation(String),
}

impl fmt::Display for MatchError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MatchError::ShapeError(msg) => write!(f, "malformed term shape: {msg}"),
      MatchError::HeadMismatch(msg) => write!(f, "operation head mismatch: {msg}"),
      MatchError::NonTerminalAtom(msg) => write!(f, "non-terminal atom in subject: {msg}"),
      MatchError::InternalInvariantViolation(msg) => write!(f, "internal invariant violated: {msg}"),
    }
  }
}

impl std::error::Error for MatchError {}
