/*!

Builds a single pattern's automaton from its `FlatTerm`.

Two modes, chosen by `FlatTerm::is_syntactic` (and trivially for single-atom terms): a *syntactic* pattern
(every wildcard fixed-size, no commutative/associative head) needs no backtracking and compiles to a plain
linear chain that is already a DFA. A *general* pattern can contain unbounded wildcards at arbitrary nesting
depth, so matching it may need to retry a subtree as "skip one atom" after a more specific attempt fails; that
retry path is wired in as an epsilon edge to a backtrack target, built up via a stack of per-depth "fail
states" mirroring the structure of nested operations. Determinizing the result (see `dfa::determinize`)
removes the epsilon edges.

*/

use synmatch_abs::{smallvec, SmallVec};

use crate::api::symbol::Arity;
use crate::core::flatterm::{FlatTerm, Label, TermAtom};

use super::state::{Automaton, StateId};

pub(crate) fn build_nfa(flatterm: &FlatTerm, pattern_index: usize) -> Automaton {
  if flatterm.is_syntactic() || flatterm.len() <= 1 {
    build_syntactic_chain(flatterm, pattern_index)
  } else {
    build_general(flatterm, pattern_index)
  }
}

/// A straight-line chain: one state per atom, wildcards of min-count `k` becoming a chain of `k` `AnyAtom`
/// edges. No epsilon edges, no self-loops — already deterministic.
fn build_syntactic_chain(flatterm: &FlatTerm, pattern_index: usize) -> Automaton {
  let mut net = Automaton::new();
  let mut state = net.root;

  for atom in flatterm.atoms() {
    match atom {
      TermAtom::Wildcard(w) => {
        for _ in 0..w.min_count {
          let next = net.alloc();
          net.set_transition(state, Label::AnyAtom, next);
          state = next;
        }
      }
      other => {
        let next = net.alloc();
        net.set_transition(state, other.as_label().expect("non-wildcard atom always has a label"), next);
        state = next;
      }
    }
  }

  net.state_mut(state).payload.insert(pattern_index);
  net
}

/// The backtrack target available at one nesting depth: either none, a single self-looping state (for a
/// variadic-arity parent operation), or a ladder of `min_count + 1` states (for a fixed-arity parent), one
/// rung per possible count of operands already committed to when a nested match needs to retry.
enum FailState {
  None,
  Single(StateId),
  Ladder(SmallVec<[StateId; 4]>),
}

/// Looks up the fail-ladder rung for the current operand count. Once the count has gone unbounded (signalled
/// by the `-1` sentinel, set the moment a variadic wildcard is seen among the parent's operands), the correct
/// rung is always the last one: position no longer matters once an unbounded wildcard has already absorbed an
/// unknown number of operands.
fn fail_target(fail: &FailState, operand_count: i64) -> Option<StateId> {
  match fail {
    FailState::None => None,
    FailState::Single(s) => Some(*s),
    FailState::Ladder(rungs) => {
      if operand_count < 0 {
        rungs.last().copied()
      } else {
        rungs.get(operand_count as usize).copied()
      }
    }
  }
}

fn build_general(flatterm: &FlatTerm, pattern_index: usize) -> Automaton {
  let mut net = Automaton::new();
  let mut state = net.root;

  // Indexed by current operation-nesting depth; a handful of entries covers all but pathologically
  // deep patterns, so these stay inline rather than heap-allocating on every pattern registered.
  let mut last_wildcards: SmallVec<[Option<StateId>; 8]> = smallvec![None];
  let mut fail_states: SmallVec<[FailState; 8]> = smallvec![FailState::None];
  let mut operand_counts: SmallVec<[i64; 8]> = smallvec![0];

  for atom in flatterm.atoms() {
    let depth = last_wildcards.len() - 1;
    if operand_counts[depth] >= 0 {
      operand_counts[depth] += 1;
    }

    match atom {
      TermAtom::Wildcard(w) => {
        for _ in 0..w.min_count {
          let next = net.alloc();
          net.set_transition(state, Label::AnyAtom, next);
          state = next;
        }
        if !w.fixed_size {
          net.set_transition(state, Label::AnyAtom, state);
          last_wildcards[depth] = Some(state);
          operand_counts[depth] = -1;
        }
      }

      _ => {
        let label = atom.as_label().expect("non-wildcard atom always has a label");
        let next = net.alloc();
        net.set_transition(state, label, next);
        state = next;

        match atom {
          TermAtom::OperationHead(symbol) => {
            let fail_state = if last_wildcards[depth].is_some() || !matches!(fail_states[depth], FailState::None) {
              let backtrack_target = last_wildcards[depth]
                .or_else(|| fail_target(&fail_states[depth], operand_counts[depth]))
                .expect("guarded by the preceding condition");

              build_child_fail_state(&mut net, &symbol.arity, backtrack_target)
            } else {
              FailState::None
            };

            fail_states.push(fail_state);
            last_wildcards.push(None);
            operand_counts.push(0);
          }
          TermAtom::OperationEnd => {
            fail_states.pop();
            last_wildcards.pop();
            operand_counts.pop();
          }
          _ => {}
        }
      }
    }

    // Wire the epsilon backtrack edge for the state we just landed on, unless it *is* the active wildcard's
    // own self-loop state (which already has its own self-loop and needs no separate epsilon edge).
    let depth = last_wildcards.len() - 1;
    if last_wildcards[depth] != Some(state) {
      let target = last_wildcards[depth].or_else(|| fail_target(&fail_states[depth], operand_counts[depth]));
      if let Some(target) = target {
        net.set_transition(state, Label::Epsilon, target);
      }
    }
  }

  net.state_mut(state).payload.insert(pattern_index);
  net
}

/// Builds the fail state(s) for a newly-opened nested operation, given the backtrack target that applies if
/// the whole subtree should instead be treated as a single skipped atom.
fn build_child_fail_state(net: &mut Automaton, arity: &Arity, carry: StateId) -> FailState {
  if arity.fixed_size {
    let first = net.alloc();
    let mut rungs: SmallVec<[StateId; 4]> = smallvec![first];
    let mut cursor = first;
    for _ in 0..arity.min_count {
      let next = net.alloc();
      net.set_transition(cursor, Label::AnyAtom, next);
      cursor = next;
      rungs.push(cursor);
    }
    net.set_transition(cursor, Label::OperationEnd, carry);
    FailState::Ladder(rungs)
  } else {
    let single = net.alloc();
    net.set_transition(single, Label::OperationEnd, carry);
    net.set_transition(single, Label::AnyAtom, single);
    FailState::Single(single)
  }
}
