/*!

The expression algebra that patterns and subjects are built from. This is intentionally small: just enough tree
structure to exercise every construct the matcher cares about (ground symbols, operations, named variables,
fixed/sequence/null-sequence wildcards, and symbol-wildcards). A host embedding typically has its own, richer
expression type; it plugs into the matcher by producing a `FlatTerm` (see `core::flatterm`) from its own trees
instead of going through this type.

*/

use std::rc::Rc;

use crate::api::constraint::ConstraintFn;
use crate::api::substitution::Substitution;
use crate::api::symbol::{Category, Symbol};
use synmatch_abs::IString;

/// A repeated-atom wildcard. `min_count` is how many atoms it must match at minimum; `fixed_size` distinguishes
/// a single-width "blank" (`_`) from an unbounded "sequence" (`__`) or "null sequence" (`___`) wildcard.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Wildcard {
  pub min_count : usize,
  pub fixed_size: bool,
}

impl Wildcard {
  /// `_`: matches exactly one atom.
  pub const fn blank() -> Self {
    Wildcard{ min_count: 1, fixed_size: true }
  }

  /// `__`: matches one or more atoms.
  pub const fn sequence() -> Self {
    Wildcard{ min_count: 1, fixed_size: false }
  }

  /// `___`: matches zero or more atoms.
  pub const fn null_sequence() -> Self {
    Wildcard{ min_count: 0, fixed_size: false }
  }
}

#[derive(Clone, Debug)]
pub enum Expression {
  /// A ground leaf symbol.
  Symbol(Symbol),
  /// An operation applied to a list of operand expressions.
  Operation(Symbol, Vec<Expression>),
  /// A named binding around a subexpression. Matching `inner` against a subject binds `name` to whatever
  /// `inner` matched. `constraint`, if present, must hold of the substitution for the match to succeed.
  Variable{ name: IString, inner: Box<Expression>, constraint: Option<ConstraintFn> },
  /// A repeated-atom wildcard appearing directly as an operand (unnamed; wrap in `Variable` to bind it).
  Wildcard(Wildcard),
  /// Matches any ground symbol whose category is `c` or a subcategory of `c`.
  SymbolWildcard(Category),
}

impl Expression {
  pub fn variable(name: impl Into<IString>, inner: Expression) -> Self {
    Expression::Variable{ name: name.into(), inner: Box::new(inner), constraint: None }
  }

  pub fn variable_with_constraint(
    name: impl Into<IString>,
    inner: Expression,
    constraint: Rc<dyn Fn(&Substitution) -> bool>,
  ) -> Self {
    Expression::Variable{ name: name.into(), inner: Box::new(inner), constraint: Some(ConstraintFn(constraint)) }
  }

  /// Collects every constraint attached to a `Variable` node in this tree, in preorder.
  pub(crate) fn collect_constraints(&self, out: &mut Vec<Rc<dyn Fn(&Substitution) -> bool>>) {
    if let Expression::Variable{ inner, constraint, .. } = self {
      if let Some(c) = constraint {
        out.push(c.0.clone());
      }
      inner.collect_constraints(out);
    } else if let Expression::Operation(_, operands) = self {
      for operand in operands {
        operand.collect_constraints(out);
      }
    }
  }

  /// All constraints attached anywhere in this pattern, combined into one. `None` if there are none.
  pub fn combined_constraint(&self) -> Option<crate::api::constraint::MultiConstraint> {
    let mut constraints = Vec::new();
    self.collect_constraints(&mut constraints);
    crate::api::constraint::MultiConstraint::create(constraints)
  }
}

/// Structural equality ignoring attached constraints (closures aren't comparable). Used to detect conflicting
/// bindings of the same variable to two different values.
pub(crate) fn structural_eq(a: &Expression, b: &Expression) -> bool {
  match (a, b) {
    (Expression::Symbol(a), Expression::Symbol(b)) => a.name == b.name,
    (Expression::Operation(ah, ao), Expression::Operation(bh, bo)) => {
      ah.name == bh.name && ao.len() == bo.len() && ao.iter().zip(bo).all(|(x, y)| structural_eq(x, y))
    }
    (Expression::Variable{ name: an, inner: ai, .. }, Expression::Variable{ name: bn, inner: bi, .. }) => {
      an == bn && structural_eq(ai, bi)
    }
    (Expression::Wildcard(a), Expression::Wildcard(b)) => a == b,
    (Expression::SymbolWildcard(a), Expression::SymbolWildcard(b)) => a == b,
    _ => false,
  }
}
