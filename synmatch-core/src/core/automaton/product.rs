/*!

Merges a newly-built pattern DFA into the net accumulated from every pattern added so far, producing a single
DFA whose payload at each state is the union of whichever patterns would accept there. This is a product
automaton over a pair of possibly-unequal depths: while one side is mid-way through matching an operation the
other side has no opinion about (because its own corresponding operation is shallower, or it has no
transitions for this subtree at all), that side is pinned in place ("fixed") and an `AnyAtom`/`OperationEnd`
bookkeeping pair tracks how deep into the pinned side's subtree we've descended, so the pin can be released
exactly when that subtree closes.

*/

use std::collections::VecDeque;

use synmatch_abs::{HashSet, IndexSet, PatternSet};

use crate::core::flatterm::Label;

use super::state::{next_state, Automaton, StateId};

type Key = (Option<StateId>, Option<StateId>, i32);

#[derive(Copy, Clone, Debug)]
struct QueueItem {
  state1: Option<StateId>,
  state2: Option<StateId>,
  depth : i32,
  /// 0 = neither side pinned; 1 = side 1 is pinned (tracking side 2's depth into a subtree side 1 treated as
  /// one atom); 2 = the symmetric case with sides swapped.
  fixed: u8,
}

impl QueueItem {
  fn key(&self) -> Key {
    (self.state1, self.state2, self.depth)
  }
}

/// Advances one side by `label`. A pinned side does not move at all (it is standing still while the other
/// side walks through the subtree it collapsed to a single atom). Returns the new state and whether reaching
/// it required falling back to the `AnyAtom` edge.
fn advance(net: &Automaton, state: Option<StateId>, label: &Label, pinned: bool) -> (Option<StateId>, bool) {
  if pinned {
    return (state, false);
  }
  match state {
    Some(s) => match next_state(net, s, label) {
      Some((target, used_any_atom)) => (Some(target), used_any_atom),
      None => (None, false),
    },
    None => (None, false),
  }
}

/// The labels to consider transitioning on from this queue item: the real alphabet of whichever side(s) are
/// not pinned, plus (while a side is pinned) `AnyAtom` to keep walking through the collapsed subtree, and
/// `OperationEnd` to notice when that subtree has fully closed on the side that ran out of states early.
fn labels_for(a: &Automaton, b: &Automaton, item: &QueueItem) -> HashSet<Label> {
  let mut labels = HashSet::default();

  if let Some(s) = item.state1 {
    if item.fixed != 1 {
      labels.extend(a.state(s).transitions.keys().cloned());
    }
  }
  if let Some(s) = item.state2 {
    if item.fixed != 2 {
      labels.extend(b.state(s).transitions.keys().cloned());
    }
  }
  if item.fixed != 0 {
    if item.fixed == 1 && item.state2.is_none() {
      labels.insert(Label::OperationEnd);
    } else if item.fixed == 2 && item.state1.is_none() {
      labels.insert(Label::OperationEnd);
    }
    labels.insert(Label::AnyAtom);
  }

  labels
}

pub(crate) fn product(a: &Automaton, b: &Automaton) -> Automaton {
  let mut out = Automaton::empty();
  let mut pool: IndexSet<Key, Key> = IndexSet::new();
  let mut out_ids: Vec<StateId> = Vec::new();

  let root_item = QueueItem{ state1: Some(a.root), state2: Some(b.root), depth: 0, fixed: 0 };
  let root_index = pool.insert(root_item.key());
  debug_assert_eq!(root_index, 0);
  let root_id = out.alloc();
  out.root = root_id;
  out_ids.push(root_id);

  let mut queue = VecDeque::new();
  queue.push_back((root_index, root_item));

  while let Some((from_index, item)) = queue.pop_front() {
    let from_id = out_ids[from_index];

    for label in labels_for(a, b, &item) {
      let (t1, used_any_atom1) = advance(a, item.state1, &label, item.fixed == 1);
      let (t2, used_any_atom2) = advance(b, item.state2, &label, item.fixed == 2);

      let mut child = QueueItem{ state1: t1, state2: t2, depth: item.depth, fixed: item.fixed };

      if let Label::OperationHead(_) = label {
        if item.fixed != 0 {
          child.depth += 1;
        } else if used_any_atom1 {
          child.fixed = 1;
          child.depth = 1;
          child.state1 = item.state1;
        } else if used_any_atom2 {
          child.fixed = 2;
          child.depth = 1;
          child.state2 = item.state2;
        }
      } else if matches!(label, Label::OperationEnd) && item.fixed != 0 {
        child.depth -= 1;
        if child.depth == 0 {
          match child.fixed {
            1 => {
              let (advanced, _) = advance(a, child.state1, &Label::AnyAtom, false);
              child.state1 = advanced;
            }
            2 => {
              let (advanced, _) = advance(b, child.state2, &Label::AnyAtom, false);
              child.state2 = advanced;
            }
            _ => unreachable!("product construction: closed a pinned subtree with neither side pinned"),
          }
          child.fixed = 0;
        }
      }

      let mut child_payload = PatternSet::new();
      if let Some(s) = child.state1 {
        child_payload.union_with(&a.state(s).payload);
      }
      if let Some(s) = child.state2 {
        child_payload.union_with(&b.state(s).payload);
      }

      let key = child.key();
      let to_index = match pool.value_to_index(key) {
        Some(index) => index,
        None => {
          let index = pool.insert(key);
          let id = out.alloc();
          out.state_mut(id).payload = child_payload;
          out_ids.push(id);
          queue.push_back((index, child));
          index
        }
      };

      out.set_transition(from_id, label, out_ids[to_index]);
    }
  }

  out
}
