/*!

Subset construction: turns a single pattern's NFA (with epsilon edges and self-loops, built by `nfa::build_nfa`)
into a deterministic automaton with no epsilon edges, interning each reachable set of NFA states as one DFA
state.

*/

use std::collections::BTreeSet;

use synmatch_abs::{HashSet, IndexSet, PatternSet};

use crate::core::flatterm::Label;

use super::state::{Automaton, StateId};

type StateSet = BTreeSet<StateId>;

fn epsilon_closure(nfa: &Automaton, seed: &StateSet) -> StateSet {
  let mut set = seed.clone();
  let mut frontier: Vec<StateId> = seed.iter().copied().collect();

  while let Some(s) = frontier.pop() {
    if let Some(&eps_target) = nfa.state(s).transitions.get(&Label::Epsilon) {
      if set.insert(eps_target) {
        frontier.push(eps_target);
      }
    }
  }
  set
}

fn collect_payload(nfa: &Automaton, set: &StateSet) -> PatternSet {
  let mut payload = PatternSet::new();
  for &s in set {
    payload.union_with(&nfa.state(s).payload);
  }
  payload
}

/// The states reachable from any state in `set` on `label`, following the same exact → symbol-category →
/// any-atom fallback rule the matcher driver uses at runtime — except here it is applied per NFA state in the
/// set and the results are unioned, since different states merged into the same set by earlier epsilon
/// closures can each have a different kind of edge for the same label.
fn target_set(nfa: &Automaton, set: &StateSet, label: &Label) -> StateSet {
  let mut targets = StateSet::new();

  for &s in set {
    let st = nfa.state(s);
    if let Some(&t) = st.transitions.get(label) {
      targets.insert(t);
    }
    if let Label::Symbol(symbol) = label {
      if let Some(category) = &symbol.category {
        for (edge_label, &t) in &st.transitions {
          if let Label::SymbolCategory(edge_category) = edge_label {
            if category.is_or_subcategory_of(edge_category) {
              targets.insert(t);
            }
          }
        }
      }
    }
    if !matches!(label, Label::OperationHead(_) | Label::OperationEnd) {
      if let Some(&t) = st.transitions.get(&Label::AnyAtom) {
        targets.insert(t);
      }
    }
  }

  epsilon_closure(nfa, &targets)
}

pub(crate) fn determinize(nfa: &Automaton) -> Automaton {
  let mut dfa = Automaton::empty();
  let mut pool: IndexSet<StateSet, StateSet> = IndexSet::new();
  let mut dfa_ids: Vec<StateId> = Vec::new();

  let root_set = epsilon_closure(nfa, &StateSet::from([nfa.root]));
  let root_index = pool.insert(root_set.clone());
  debug_assert_eq!(root_index, 0);
  let root_id = dfa.alloc();
  dfa.root = root_id;
  dfa_ids.push(root_id);
  dfa.state_mut(root_id).payload = collect_payload(nfa, &root_set);

  let mut queue = vec![(root_index, root_set)];

  while let Some((from_index, set)) = queue.pop() {
    let from_id = dfa_ids[from_index];

    let mut labels: HashSet<Label> = HashSet::default();
    for &s in &set {
      labels.extend(nfa.state(s).transitions.keys().cloned());
    }
    labels.remove(&Label::Epsilon);

    for label in labels {
      let targets = target_set(nfa, &set, &label);
      if targets.is_empty() {
        continue;
      }

      let to_index = match pool.value_to_index(targets.clone()) {
        Some(index) => index,
        None => {
          let index = pool.insert(targets.clone());
          let id = dfa.alloc();
          dfa.state_mut(id).payload = collect_payload(nfa, &targets);
          dfa_ids.push(id);
          queue.push((index, targets));
          index
        }
      };

      dfa.set_transition(from_id, label, dfa_ids[to_index]);
    }
  }

  dfa
}
