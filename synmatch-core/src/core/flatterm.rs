/*!

`FlatTerm` is the linearized, prefix-order form of an expression tree that the discrimination net actually
operates over. Flattening an expression walks it in prefix order, emitting an `OperationHead`/`OperationEnd`
bracket around each operation's operands and a single atom for every leaf, then fuses adjacent wildcard atoms
into one (so that e.g. a sequence wildcard directly followed by a blank in the same pattern contributes a single
combined run-length rather than two separate atoms the automaton would have to track independently).

*/

use std::sync::OnceLock;

use crate::api::expression::Expression;
use crate::api::symbol::{Category, Symbol};
use crate::api::expression::Wildcard;
use crate::core::format::{impl_display_debug_for_formattable, FormatStyle, Formattable};

/// One position in a flattened term. `OperationHead`/`OperationEnd` are markers, not symbols in their own right;
/// every other variant corresponds to exactly one leaf or repeated-atom run in the original tree.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) enum TermAtom {
  Symbol(Symbol),
  SymbolCategory(Category),
  OperationHead(Symbol),
  OperationEnd,
  Wildcard(Wildcard),
}

impl TermAtom {
  /// The automaton transition label this atom corresponds to, or `None` for `Wildcard` (which expands into a
  /// run of `AnyAtom` edges at automaton-construction time rather than mapping to a single label).
  pub(crate) fn as_label(&self) -> Option<Label> {
    match self {
      TermAtom::Symbol(s) => Some(Label::Symbol(s.clone())),
      TermAtom::SymbolCategory(c) => Some(Label::SymbolCategory(c.clone())),
      TermAtom::OperationHead(s) => Some(Label::OperationHead(s.clone())),
      TermAtom::OperationEnd => Some(Label::OperationEnd),
      TermAtom::Wildcard(_) => None,
    }
  }
}

impl Formattable for TermAtom {
  fn repr(&self, f: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result {
    match style {
      FormatStyle::Debug => match self {
        TermAtom::Symbol(s) => write!(f, "Symbol({s})"),
        TermAtom::SymbolCategory(c) => write!(f, "SymbolCategory({})", c.name()),
        TermAtom::OperationHead(s) => write!(f, "OperationHead({s})"),
        TermAtom::OperationEnd => write!(f, "OperationEnd"),
        TermAtom::Wildcard(w) => write!(f, "Wildcard {{ min_count: {}, fixed_size: {} }}", w.min_count, w.fixed_size),
      },
      FormatStyle::Simple | FormatStyle::Input | FormatStyle::Default => match self {
        TermAtom::Symbol(s) => write!(f, "{s}"),
        TermAtom::SymbolCategory(c) => write!(f, "_:{}", c.name()),
        TermAtom::OperationHead(s) => write!(f, "{s}("),
        TermAtom::OperationEnd => write!(f, ")"),
        TermAtom::Wildcard(w) if w.fixed_size => write!(f, "{}", "_".repeat(w.min_count.max(1))),
        TermAtom::Wildcard(w) if w.min_count == 0 => write!(f, "___"),
        TermAtom::Wildcard(_) => write!(f, "__"),
      },
    }
  }
}
impl_display_debug_for_formattable!(TermAtom);

/// The alphabet of automaton transitions. A superset of `TermAtom`: `AnyAtom` stands for "one atom, whatever it
/// is" (what a wildcard compiles down to), and `Epsilon` exists only in NFAs before determinization removes it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Label {
  Symbol(Symbol),
  SymbolCategory(Category),
  OperationHead(Symbol),
  OperationEnd,
  AnyAtom,
  Epsilon,
}

fn flatten_into(expr: &Expression, atoms: &mut Vec<TermAtom>) {
  match expr {
    Expression::Variable{ inner, .. } => flatten_into(inner, atoms),
    Expression::Operation(head, operands) => {
      atoms.push(TermAtom::OperationHead(head.clone()));
      for operand in operands {
        flatten_into(operand, atoms);
      }
      atoms.push(TermAtom::OperationEnd);
    }
    Expression::SymbolWildcard(category) => atoms.push(TermAtom::SymbolCategory(category.clone())),
    Expression::Symbol(symbol) => atoms.push(TermAtom::Symbol(symbol.clone())),
    Expression::Wildcard(w) => atoms.push(TermAtom::Wildcard(*w)),
  }
}

/// Fuses adjacent `Wildcard` atoms: their minimum counts add, and the fused wildcard is fixed-size only if every
/// contributor was.
fn fuse_wildcards(atoms: Vec<TermAtom>) -> Vec<TermAtom> {
  let mut out = Vec::with_capacity(atoms.len());
  let mut pending: Option<Wildcard> = None;

  for atom in atoms {
    match atom {
      TermAtom::Wildcard(w) => {
        pending = Some(match pending {
          Some(p) => Wildcard{ min_count: p.min_count + w.min_count, fixed_size: p.fixed_size && w.fixed_size },
          None => w,
        });
      }
      other => {
        if let Some(w) = pending.take() {
          out.push(TermAtom::Wildcard(w));
        }
        out.push(other);
      }
    }
  }
  if let Some(w) = pending.take() {
    out.push(TermAtom::Wildcard(w));
  }
  out
}

pub(crate) struct FlatTerm {
  atoms       : Vec<TermAtom>,
  is_syntactic: OnceLock<bool>,
}

impl Formattable for FlatTerm {
  fn repr(&self, f: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result {
    if style == FormatStyle::Debug {
      write!(f, "FlatTerm[")?;
      for (i, atom) in self.atoms.iter().enumerate() {
        if i > 0 {
          write!(f, ", ")?;
        }
        atom.repr(f, style)?;
      }
      return write!(f, "]");
    }

    for atom in &self.atoms {
      atom.repr(f, style)?;
    }
    Ok(())
  }
}
impl_display_debug_for_formattable!(FlatTerm);

impl Clone for FlatTerm {
  fn clone(&self) -> Self {
    // The cache is not carried over; it is cheap to recompute and doing so avoids needing `OnceLock: Clone`.
    FlatTerm{ atoms: self.atoms.clone(), is_syntactic: OnceLock::new() }
  }
}

impl PartialEq for FlatTerm {
  fn eq(&self, other: &Self) -> bool {
    self.atoms == other.atoms
  }
}
impl Eq for FlatTerm {}

impl std::hash::Hash for FlatTerm {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.atoms.hash(state);
  }
}

impl FlatTerm {
  pub(crate) fn from_expression(expr: &Expression) -> Self {
    let mut atoms = Vec::new();
    flatten_into(expr, &mut atoms);
    Self::from_atoms(fuse_wildcards(atoms))
  }

  /// Builds a `FlatTerm` from an already-flattened, already-fused, well-formed sequence of atoms (e.g. the
  /// fused middle window the sequence matcher slides across a subject's operands).
  pub(crate) fn from_atoms(atoms: Vec<TermAtom>) -> Self {
    FlatTerm{ atoms, is_syntactic: OnceLock::new() }
  }

  pub(crate) fn empty() -> Self {
    Self::from_atoms(Vec::new())
  }

  /// Concatenates several flat terms and re-fuses wildcards across the seams between them.
  pub(crate) fn merged(parts: &[FlatTerm]) -> Self {
    let mut atoms = Vec::new();
    for part in parts {
      atoms.extend(part.atoms.iter().cloned());
    }
    Self::from_atoms(fuse_wildcards(atoms))
  }

  pub(crate) fn atoms(&self) -> &[TermAtom] {
    &self.atoms
  }

  pub(crate) fn len(&self) -> usize {
    self.atoms.len()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.atoms.is_empty()
  }

  /// A term is syntactic when every wildcard in it is fixed-size and no operation head is commutative or
  /// associative — i.e. when matching it needs no backtracking, only a straight-line walk. Computed once and
  /// cached; safe to call concurrently since the cache is a `OnceLock`.
  pub(crate) fn is_syntactic(&self) -> bool {
    *self.is_syntactic.get_or_init(|| {
      self.atoms.iter().all(|atom| match atom {
        TermAtom::Wildcard(w) => w.fixed_size,
        TermAtom::OperationHead(symbol) => !symbol.is_commutative() && !symbol.is_associative(),
        _ => true,
      })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::symbol::Arity;

  fn sym(name: &str) -> Expression {
    Expression::Symbol(Symbol::leaf(name))
  }

  #[test]
  fn flattens_a_leaf() {
    let term = FlatTerm::from_expression(&sym("a"));
    assert_eq!(term.atoms(), &[TermAtom::Symbol(Symbol::leaf("a"))]);
  }

  #[test]
  fn flattens_nested_operations_with_markers() {
    let f = Symbol::operation("f", Arity::exactly(2));
    let pattern = Expression::Operation(f.clone(), vec![sym("a"), sym("b")]);
    let term = FlatTerm::from_expression(&pattern);
    assert_eq!(
      term.atoms(),
      &[
        TermAtom::OperationHead(f),
        TermAtom::Symbol(Symbol::leaf("a")),
        TermAtom::Symbol(Symbol::leaf("b")),
        TermAtom::OperationEnd,
      ]
    );
  }

  #[test]
  fn adjacent_wildcards_fuse() {
    let pattern = Expression::Operation(
      Symbol::operation("f", Arity::at_least(0)),
      vec![
        Expression::Wildcard(Wildcard::blank()),
        Expression::Wildcard(Wildcard::sequence()),
      ],
    );
    let term = FlatTerm::from_expression(&pattern);
    // blank (min 1, fixed) + sequence (min 1, variadic) fuse to min 2, variadic.
    assert_eq!(
      term.atoms(),
      &[
        TermAtom::OperationHead(Symbol::operation("f", Arity::at_least(0))),
        TermAtom::Wildcard(Wildcard{ min_count: 2, fixed_size: false }),
        TermAtom::OperationEnd,
      ]
    );
  }

  #[test]
  fn fixed_wildcards_are_syntactic() {
    let pattern = Expression::Operation(Symbol::operation("f", Arity::exactly(1)), vec![Expression::Wildcard(Wildcard::blank())]);
    assert!(FlatTerm::from_expression(&pattern).is_syntactic());
  }

  #[test]
  fn variadic_wildcards_are_not_syntactic() {
    let pattern = Expression::Operation(Symbol::operation("f", Arity::at_least(0)), vec![Expression::Wildcard(Wildcard::sequence())]);
    assert!(!FlatTerm::from_expression(&pattern).is_syntactic());
  }

  #[test]
  fn commutative_heads_are_not_syntactic() {
    let head = Symbol::operation("f", Arity::exactly(2)).with_commutative();
    let pattern = Expression::Operation(head, vec![sym("a"), sym("b")]);
    assert!(!FlatTerm::from_expression(&pattern).is_syntactic());
  }

  #[test]
  fn operation_head_and_end_counts_always_balance() {
    let f = Symbol::operation("f", Arity::exactly(2));
    let g = Symbol::operation("g", Arity::exactly(1));
    let pattern = Expression::Operation(f, vec![Expression::Operation(g, vec![sym("a")]), sym("b")]);
    let term = FlatTerm::from_expression(&pattern);

    let heads = term.atoms().iter().filter(|a| matches!(a, TermAtom::OperationHead(_))).count();
    let ends = term.atoms().iter().filter(|a| matches!(a, TermAtom::OperationEnd)).count();
    assert_eq!(heads, ends);
  }

  #[test]
  fn merged_matches_concatenation_with_fusion_at_the_seam() {
    // Two independently-flattened terms, each ending/starting with a wildcard, fuse across the seam exactly as
    // a single flattening pass over the concatenated atoms would.
    let left = FlatTerm::from_atoms(vec![TermAtom::Symbol(Symbol::leaf("a")), TermAtom::Wildcard(Wildcard::sequence())]);
    let right = FlatTerm::from_atoms(vec![TermAtom::Wildcard(Wildcard::blank()), TermAtom::Symbol(Symbol::leaf("b"))]);

    let merged = FlatTerm::merged(&[left, right]);
    assert_eq!(
      merged.atoms(),
      &[
        TermAtom::Symbol(Symbol::leaf("a")),
        TermAtom::Wildcard(Wildcard{ min_count: 2, fixed_size: false }),
        TermAtom::Symbol(Symbol::leaf("b")),
      ]
    );
  }

  #[test]
  fn no_flatterm_ever_has_two_adjacent_plain_wildcards() {
    let pattern = Expression::Operation(
      Symbol::operation("f", Arity::at_least(0)),
      vec![
        Expression::Wildcard(Wildcard::blank()),
        Expression::Wildcard(Wildcard::blank()),
        Expression::Wildcard(Wildcard::sequence()),
        sym("a"),
        Expression::Wildcard(Wildcard::null_sequence()),
      ],
    );
    let term = FlatTerm::from_expression(&pattern);
    let adjacent_wildcards = term
      .atoms()
      .windows(2)
      .any(|pair| matches!((&pair[0], &pair[1]), (TermAtom::Wildcard(_), TermAtom::Wildcard(_))));
    assert!(!adjacent_wildcards);
  }
}
