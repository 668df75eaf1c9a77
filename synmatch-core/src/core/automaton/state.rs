/*!

A dense, arena-owned automaton: states are referenced by a plain integer index (`StateId`), not by pointer or
`Rc`, so NFAs, DFAs, and product nets all share the same representation and ownership is trivial — the
`Automaton` that built a state owns it for as long as the automaton lives.

*/

use synmatch_abs::HashMap;

use crate::api::error::MatchError;
use crate::core::flatterm::Label;
use synmatch_abs::PatternSet;

pub(crate) type StateId = usize;

#[derive(Clone, Debug, Default)]
pub(crate) struct State {
  pub(crate) transitions: HashMap<Label, StateId>,
  pub(crate) payload     : PatternSet,
}

#[derive(Clone, Debug)]
pub(crate) struct Automaton {
  states: Vec<State>,
  pub(crate) root: StateId,
}

impl Automaton {
  /// A fresh automaton with a single (root) state.
  pub(crate) fn new() -> Self {
    let mut automaton = Automaton{ states: Vec::new(), root: 0 };
    automaton.root = automaton.alloc();
    automaton
  }

  /// An automaton with no states at all; the caller is responsible for allocating and setting `root` itself
  /// (used by determinization and product construction, which pick their own root from scratch).
  pub(crate) fn empty() -> Self {
    Automaton{ states: Vec::new(), root: 0 }
  }

  pub(crate) fn alloc(&mut self) -> StateId {
    self.states.push(State::default());
    self.states.len() - 1
  }

  pub(crate) fn state(&self, id: StateId) -> &State {
    &self.states[id]
  }

  pub(crate) fn state_mut(&mut self, id: StateId) -> &mut State {
    &mut self.states[id]
  }

  pub(crate) fn set_transition(&mut self, from: StateId, label: Label, to: StateId) {
    self.states[from].transitions.insert(label, to);
  }

  pub(crate) fn len(&self) -> usize {
    self.states.len()
  }

  /// Validates that every `OperationHead` atom in a tape-like atom sequence has a matching `OperationEnd`.
  /// Used to surface `MatchError::ShapeError` early on malformed input rather than panicking deep inside
  /// construction or traversal.
  pub(crate) fn check_balanced(atoms: &[crate::core::flatterm::TermAtom]) -> Result<(), MatchError> {
    use crate::core::flatterm::TermAtom;
    let mut depth: i64 = 0;
    for atom in atoms {
      match atom {
        TermAtom::OperationHead(_) => depth += 1,
        TermAtom::OperationEnd => {
          depth -= 1;
          if depth < 0 {
            return Err(MatchError::ShapeError("OperationEnd with no matching OperationHead".to_string()));
          }
        }
        _ => {}
      }
    }
    if depth != 0 {
      return Err(MatchError::ShapeError(format!("{depth} unclosed OperationHead marker(s)")));
    }
    Ok(())
  }
}

/// Looks up the DFA transition for `label` from `state`, following the exact-match → symbol-category →
/// any-atom fallback chain. Returns the target state and whether the fallback (any-atom) edge was the one
/// taken. `OperationEnd` never falls back: a miss there is a hard failure.
pub(crate) fn next_state(automaton: &Automaton, state: StateId, label: &Label) -> Option<(StateId, bool)> {
  let st = automaton.state(state);

  if let Some(&target) = st.transitions.get(label) {
    return Some((target, false));
  }
  if matches!(label, Label::OperationEnd) {
    return None;
  }
  if let Label::Symbol(symbol) = label {
    if let Some(category) = &symbol.category {
      for (edge_label, &target) in &st.transitions {
        if let Label::SymbolCategory(edge_category) = edge_label {
          if category.is_or_subcategory_of(edge_category) {
            return Some((target, false));
          }
        }
      }
    }
  }
  st.transitions.get(&Label::AnyAtom).map(|&target| (target, true))
}
