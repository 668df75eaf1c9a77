/*!

Walks a subject's `FlatTerm` through a finished (deterministic) automaton, collecting the set of patterns it
matches.

*/

use synmatch_abs::PatternSet;

use crate::api::error::MatchError;
use crate::core::flatterm::{FlatTerm, TermAtom};

use super::state::{next_state, Automaton};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum MatchMode {
  /// Only the payload of the final state reached matters (the usual case: "which patterns match exactly this
  /// subject").
  LastState,
  /// The payload of every state visited along the way is unioned into the result (used when a pattern's match
  /// doesn't need to consume the whole rest of the subject — e.g. prefix-style matching).
  Collect,
}

/// Drives `flatterm` through `automaton`. `first_hit`, when set, returns as soon as any non-empty payload is
/// reached rather than continuing to the end — used by the sequence matcher, which only needs to know that
/// *some* fused-pattern accepted the current window, not which one came first in the net's merge order.
pub(crate) fn drive(
  automaton: &Automaton,
  flatterm: &FlatTerm,
  mode: MatchMode,
  first_hit: bool,
) -> Result<PatternSet, MatchError> {
  let mut state = automaton.root;
  let mut result = automaton.state(state).payload.clone();
  let mut skip_depth: u32 = 0;

  for atom in flatterm.atoms() {
    if skip_depth > 0 {
      match atom {
        TermAtom::OperationHead(_) => skip_depth += 1,
        TermAtom::OperationEnd => skip_depth -= 1,
        _ => {}
      }
      continue;
    }

    if first_hit && !automaton.state(state).payload.is_empty() {
      return Ok(automaton.state(state).payload.clone());
    }

    let label = atom.as_label().ok_or_else(|| {
      MatchError::NonTerminalAtom("subject tape contains a wildcard atom; subjects must be ground".to_string())
    })?;

    match next_state(automaton, state, &label) {
      Some((next, used_any_atom)) => {
        state = next;
        if mode == MatchMode::Collect {
          result.union_with(&automaton.state(state).payload);
        } else {
          result = automaton.state(state).payload.clone();
        }
        if used_any_atom && matches!(atom, TermAtom::OperationHead(_)) {
          // The whole operation was collapsed to one `AnyAtom` edge; skip over its interior without
          // consulting the automaton again until the matching `OperationEnd`.
          skip_depth = 1;
        }
      }
      None => {
        return Ok(if mode == MatchMode::Collect { result } else { PatternSet::new() });
      }
    }
  }

  Ok(if mode == MatchMode::Collect { result } else { automaton.state(state).payload.clone() })
}
