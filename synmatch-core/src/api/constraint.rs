/*!

User-supplied predicates attached to pattern variables. A constraint is just a function from the substitution
accumulated so far to a `bool`; `MultiConstraint` combines several of them (one per constrained variable in a
pattern) into one predicate that must pass for a candidate match to be accepted.

*/

use std::rc::Rc;

use crate::api::substitution::Substitution;

/// A predicate over an accumulated substitution.
pub trait Constraint {
  fn evaluate(&self, substitution: &Substitution) -> bool;
}

/// A boxed predicate, wrapped so `Expression` can carry one without needing `Debug`/`Clone` impls for arbitrary
/// closures.
#[derive(Clone)]
pub struct ConstraintFn(pub Rc<dyn Fn(&Substitution) -> bool>);

impl std::fmt::Debug for ConstraintFn {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "<constraint>")
  }
}

/// The conjunction of zero or more constraints.
pub struct MultiConstraint {
  constraints: Vec<Rc<dyn Fn(&Substitution) -> bool>>,
}

impl MultiConstraint {
  /// Returns `None` if `constraints` is empty (i.e. there is nothing to check, so callers can skip evaluation
  /// entirely rather than evaluating a vacuous "always true" constraint).
  pub fn create(constraints: Vec<Rc<dyn Fn(&Substitution) -> bool>>) -> Option<Self> {
    if constraints.is_empty() {
      None
    } else {
      Some(MultiConstraint{ constraints })
    }
  }
}

impl Constraint for MultiConstraint {
  fn evaluate(&self, substitution: &Substitution) -> bool {
    self.constraints.iter().all(|c| c(substitution))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_constraint_list_creates_none() {
    assert!(MultiConstraint::create(Vec::new()).is_none());
  }

  #[test]
  fn conjunction_short_circuits_on_first_failure() {
    let always_true: Rc<dyn Fn(&Substitution) -> bool> = Rc::new(|_: &Substitution| true);
    let always_false: Rc<dyn Fn(&Substitution) -> bool> = Rc::new(|_: &Substitution| false);
    let combined = MultiConstraint::create(vec![always_true, always_false]).unwrap();
    assert!(!combined.evaluate(&Substitution::new()));
  }
}
