/*!

A `Substitution` holds the bindings produced by matching a pattern against a subject: for each named variable in
the pattern, the subject subtree(s) it was bound to. Unlike the small-integer-indexed substitution used internally
by a compiled rewriting engine, bindings here are keyed by the variable's name directly, since the matcher itself
never pre-assigns variables to slots — any given pattern is only ever matched once before being discarded.

`extract_substitution` is the final confirmation step run on a candidate a discrimination net or sequence matcher
has already narrowed down to: it walks `subject` and `pattern` together and either builds the bindings or fails,
independent of whatever automaton produced the candidate.

*/

use std::collections::hash_map::Entry;

use synmatch_abs::{HashMap, IString};

use crate::api::expression::{structural_eq, Expression, Wildcard};

/// What a single variable was bound to. A blank (`_`) binds to exactly one subexpression; a sequence (`__`) or
/// null-sequence (`___`) wildcard binds to the (possibly empty, for `___`) run of subexpressions it consumed.
#[derive(Clone, Debug)]
pub enum Binding {
  Single(Expression),
  Sequence(Vec<Expression>),
}

#[derive(Clone, Debug, Default)]
pub struct Substitution {
  bindings: HashMap<IString, Binding>,
}

impl Substitution {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn get(&self, name: &str) -> Option<&Binding> {
    self.bindings.get(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&IString, &Binding)> {
    self.bindings.iter()
  }

  /// Binds `name` to a single value. Fails if `name` is already bound to a structurally different value
  /// (a pattern that uses the same variable name twice must see the same subject value both times).
  pub(crate) fn try_bind_single(&mut self, name: IString, value: Expression) -> bool {
    match self.bindings.entry(name) {
      Entry::Occupied(entry) => matches!(entry.get(), Binding::Single(existing) if structural_eq(existing, &value)),
      Entry::Vacant(entry) => {
        entry.insert(Binding::Single(value));
        true
      }
    }
  }

  /// Binds `name` to a run of values. Same conflict rule as `try_bind_single`.
  pub(crate) fn try_bind_sequence(&mut self, name: IString, values: Vec<Expression>) -> bool {
    match self.bindings.entry(name) {
      Entry::Occupied(entry) => match entry.get() {
        Binding::Sequence(existing) => {
          existing.len() == values.len() && existing.iter().zip(&values).all(|(a, b)| structural_eq(a, b))
        }
        Binding::Single(_) => false,
      },
      Entry::Vacant(entry) => {
        entry.insert(Binding::Sequence(values));
        true
      }
    }
  }

  /// Matches `pattern` against `subject`, extending `self` with the bindings it implies. Returns `false` (leaving
  /// `self` partially, harmlessly extended) on any structural mismatch, arity mismatch, or binding conflict.
  pub fn extract_substitution(&mut self, subject: &Expression, pattern: &Expression) -> bool {
    match pattern {
      Expression::Variable{ name, inner, .. } => {
        self.extract_substitution(subject, inner) && self.try_bind_single(name.clone(), subject.clone())
      }

      // A bare (unnamed) wildcard imposes no constraint of its own here; its width is accounted for by
      // whichever operand-list match consumed it.
      Expression::Wildcard(_) => true,

      Expression::Symbol(p) => matches!(subject, Expression::Symbol(s) if s.name == p.name),

      Expression::SymbolWildcard(category) => {
        matches!(subject, Expression::Symbol(s) if s.category.as_ref().is_some_and(|c| c.is_or_subcategory_of(category)))
      }

      Expression::Operation(head, operands) => match subject {
        Expression::Operation(subject_head, subject_operands) if subject_head.name == head.name => {
          self.match_operand_list(subject_operands, operands)
        }
        _ => false,
      },
    }
  }

  fn match_operand_list(&mut self, subjects: &[Expression], patterns: &[Expression]) -> bool {
    let flexible: Vec<usize> = patterns
      .iter()
      .enumerate()
      .filter(|(_, p)| variadic_wildcard(p).is_some())
      .map(|(i, _)| i)
      .collect();

    match flexible.as_slice() {
      [] => {
        subjects.len() == patterns.len()
          && subjects.iter().zip(patterns).all(|(s, p)| self.extract_substitution(s, p))
      }

      // The common, efficiently-determined case: at most one variable-width wildcard, so its width is forced
      // by simple arithmetic once the fixed prefix and suffix are accounted for.
      [position] => {
        let prefix = &patterns[..*position];
        let suffix = &patterns[*position + 1..];
        if subjects.len() < prefix.len() + suffix.len() {
          return false;
        }
        let middle_len = subjects.len() - prefix.len() - suffix.len();
        let (wildcard, name) = variadic_wildcard(&patterns[*position]).unwrap();
        if middle_len < wildcard.min_count {
          return false;
        }

        for (s, p) in subjects[..prefix.len()].iter().zip(prefix) {
          if !self.extract_substitution(s, p) {
            return false;
          }
        }
        let middle = &subjects[prefix.len()..prefix.len() + middle_len];
        for (s, p) in subjects[prefix.len() + middle_len..].iter().zip(suffix) {
          if !self.extract_substitution(s, p) {
            return false;
          }
        }
        match name {
          Some(name) => self.try_bind_sequence(name, middle.to_vec()),
          None => true,
        }
      }

      // More than one variable-width wildcard sharing an operand list: fall back to a general backtracking
      // search. The sequence matcher specializes exactly this shape and never reaches this branch itself.
      _ => self.match_operand_list_backtracking(subjects, patterns),
    }
  }

  fn match_operand_list_backtracking(&mut self, subjects: &[Expression], patterns: &[Expression]) -> bool {
    let Some((p, rest)) = patterns.split_first() else {
      return subjects.is_empty();
    };

    if let Some((wildcard, name)) = variadic_wildcard(p) {
      for take in wildcard.min_count..=subjects.len() {
        let mut attempt = self.clone();
        let bound = match &name {
          Some(name) => attempt.try_bind_sequence(name.clone(), subjects[..take].to_vec()),
          None => true,
        };
        if bound && attempt.match_operand_list_backtracking(&subjects[take..], rest) {
          *self = attempt;
          return true;
        }
      }
      false
    } else {
      let Some((s, subject_rest)) = subjects.split_first() else {
        return false;
      };
      let mut attempt = self.clone();
      if attempt.extract_substitution(s, p) && attempt.match_operand_list_backtracking(subject_rest, rest) {
        *self = attempt;
        return true;
      }
      false
    }
  }
}

/// If `pattern` is a bare or named non-fixed-size wildcard, its wildcard shape and the variable name (if any) it
/// would bind.
fn variadic_wildcard(pattern: &Expression) -> Option<(Wildcard, Option<IString>)> {
  match pattern {
    Expression::Wildcard(w) if !w.fixed_size => Some((*w, None)),
    Expression::Variable{ name, inner, .. } => match inner.as_ref() {
      Expression::Wildcard(w) if !w.fixed_size => Some((*w, Some(name.clone()))),
      _ => None,
    },
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::symbol::{Arity, Symbol};

  fn sym(name: &str) -> Expression {
    Expression::Symbol(Symbol::leaf(name))
  }

  fn op(name: &str, operands: Vec<Expression>) -> Expression {
    Expression::Operation(Symbol::operation(name, Arity::at_least(0)), operands)
  }

  #[test]
  fn binds_a_single_variable() {
    let pattern = Expression::variable("x", Expression::Wildcard(Wildcard::blank()));
    let subject = sym("a");
    let mut subst = Substitution::new();
    assert!(subst.extract_substitution(&subject, &pattern));
    assert!(matches!(subst.get("x"), Some(Binding::Single(Expression::Symbol(s))) if s.name == "a".into()));
  }

  #[test]
  fn conflicting_repeated_variable_fails() {
    let pattern = op(
      "f",
      vec![
        Expression::variable("x", Expression::Wildcard(Wildcard::blank())),
        Expression::variable("x", Expression::Wildcard(Wildcard::blank())),
      ],
    );
    let subject = op("f", vec![sym("a"), sym("b")]);
    let mut subst = Substitution::new();
    assert!(!subst.extract_substitution(&subject, &pattern));
  }

  #[test]
  fn sequence_wildcard_binds_the_consumed_run() {
    let pattern = op(
      "f",
      vec![sym("a"), Expression::variable("rest", Expression::Wildcard(Wildcard::sequence()))],
    );
    let subject = op("f", vec![sym("a"), sym("b"), sym("c")]);
    let mut subst = Substitution::new();
    assert!(subst.extract_substitution(&subject, &pattern));
    match subst.get("rest") {
      Some(Binding::Sequence(values)) => assert_eq!(values.len(), 2),
      other => panic!("unexpected binding: {other:?}"),
    }
  }

  #[test]
  fn null_sequence_wildcard_may_bind_empty() {
    let pattern = op(
      "f",
      vec![sym("a"), Expression::variable("rest", Expression::Wildcard(Wildcard::null_sequence()))],
    );
    let subject = op("f", vec![sym("a")]);
    let mut subst = Substitution::new();
    assert!(subst.extract_substitution(&subject, &pattern));
    match subst.get("rest") {
      Some(Binding::Sequence(values)) => assert!(values.is_empty()),
      other => panic!("unexpected binding: {other:?}"),
    }
  }
}
