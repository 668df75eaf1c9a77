/*!

`DiscriminationNet` is the many-to-one syntactic matcher: register any number of patterns, then ask which of
them match a given (ground) subject in a single traversal shared across all of them, rather than testing each
pattern independently.

Internally, each pattern compiles to its own automaton (a straight-line chain for syntactic patterns, an
NFA-then-determinized-DFA for patterns with unbounded wildcards or commutative/associative heads — see
`core::automaton::nfa`), which is then merged into the net accumulated from every previously-added pattern via
a product construction (`core::automaton::product`).

*/

use crate::api::error::MatchError;
use crate::api::expression::Expression;
use crate::api::substitution::Substitution;
use crate::core::automaton::{dfa, nfa, product, Automaton};
use crate::core::automaton::driver::{drive, MatchMode};
use crate::core::flatterm::FlatTerm;

struct PatternEntry<L> {
  /// `None` for patterns registered directly as a `FlatTerm` with no corresponding single expression (the
  /// sequence matcher's internal use); such entries never participate in `match_expression`'s substitution
  /// extraction step.
  pattern: Option<Expression>,
  label  : L,
}

/// A many-to-one syntactic pattern matcher. `L` is whatever label the caller wants associated with each
/// registered pattern (a rule identifier, an index, `()` if none is needed).
pub struct DiscriminationNet<L = ()> {
  automaton: Option<Automaton>,
  registry : Vec<PatternEntry<L>>,
}

impl<L> Default for DiscriminationNet<L> {
  fn default() -> Self {
    Self::new()
  }
}

impl<L> DiscriminationNet<L> {
  pub fn new() -> Self {
    DiscriminationNet{ automaton: None, registry: Vec::new() }
  }

  /// A net preloaded with `patterns`, in order. Convenience for the common case of registering a fixed, known
  /// set of patterns up front.
  pub fn with_patterns(patterns: impl IntoIterator<Item = (Expression, L)>) -> Result<Self, MatchError> {
    let mut net = Self::new();
    for (pattern, label) in patterns {
      net.add(&pattern, label)?;
    }
    Ok(net)
  }

  /// Registers `pattern` under `label`, returning its dense index in registration order.
  pub fn add(&mut self, pattern: &Expression, label: L) -> Result<usize, MatchError> {
    let flatterm = FlatTerm::from_expression(pattern);
    Automaton::check_balanced(flatterm.atoms())?;
    let index = self.registry.len();
    self.registry.push(PatternEntry{ pattern: Some(pattern.clone()), label });
    self.merge_flatterm(flatterm, index);
    Ok(index)
  }

  /// Registers an already-flattened pattern with no corresponding `Expression` (used internally by the
  /// sequence matcher, which flattens a *slice* of operands rather than one whole expression).
  pub(crate) fn add_flatterm(&mut self, flatterm: FlatTerm, label: L) -> usize {
    let index = self.registry.len();
    self.registry.push(PatternEntry{ pattern: None, label });
    self.merge_flatterm(flatterm, index);
    index
  }

  fn merge_flatterm(&mut self, flatterm: FlatTerm, index: usize) {
    let is_syntactic = flatterm.is_syntactic() || flatterm.len() <= 1;
    #[cfg(feature = "tracing-logs")]
    synmatch_abs::log::debug!(pattern_index = index, is_syntactic, "compiling pattern into its own automaton");

    let pattern_automaton = if is_syntactic {
      nfa::build_nfa(&flatterm, index)
    } else {
      dfa::determinize(&nfa::build_nfa(&flatterm, index))
    };

    self.automaton = Some(match self.automaton.take() {
      Some(existing) => {
        #[cfg(feature = "tracing-logs")]
        synmatch_abs::log::trace!(pattern_index = index, "merging into existing net via product construction");
        product::product(&existing, &pattern_automaton)
      }
      None => pattern_automaton,
    });
  }

  pub(crate) fn matching_indices(
    &self,
    subject: &FlatTerm,
    mode: MatchMode,
    first_hit: bool,
  ) -> Result<synmatch_abs::PatternSet, MatchError> {
    match &self.automaton {
      Some(automaton) => drive(automaton, subject, mode, first_hit),
      None => Ok(synmatch_abs::PatternSet::new()),
    }
  }

  /// Matches `subject` (which must be ground — no wildcards) against every registered pattern, returning the
  /// label and extracted substitution for each one that accepts. A pattern whose automaton-level candidate
  /// fails substitution extraction (shape mismatch the net's syntactic view couldn't distinguish) or whose
  /// attached constraints don't hold is silently skipped, matching "no match" rather than raising an error;
  /// only a malformed `subject` itself raises.
  pub fn match_expression<'a>(
    &'a self,
    subject: &'a Expression,
  ) -> Result<impl Iterator<Item = (&'a L, Substitution)> + 'a, MatchError> {
    let flatterm = FlatTerm::from_expression(subject);
    let indices: Vec<usize> = self.matching_indices(&flatterm, MatchMode::LastState, false)?.iter().collect();

    Ok(indices.into_iter().filter_map(move |index| {
      let entry = &self.registry[index];
      let pattern = entry.pattern.as_ref()?;
      let mut substitution = Substitution::new();
      if !substitution.extract_substitution(subject, pattern) {
        return None;
      }
      if let Some(constraint) = pattern.combined_constraint() {
        use crate::api::constraint::Constraint;
        if !constraint.evaluate(&substitution) {
          return None;
        }
      }
      Some((&entry.label, substitution))
    }))
  }

  pub fn len(&self) -> usize {
    self.registry.len()
  }

  pub fn is_empty(&self) -> bool {
    self.registry.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::symbol::{Arity, Symbol};
  use crate::api::expression::Wildcard;

  fn sym(name: &str) -> Expression {
    Expression::Symbol(Symbol::leaf(name))
  }

  #[test]
  fn disjoint_patterns_each_match_their_own_subject_only() {
    let mut net = DiscriminationNet::new();
    net.add(&sym("a"), "rule-a").unwrap();
    net.add(&sym("b"), "rule-b").unwrap();

    let matches: Vec<_> = net.match_expression(&sym("a")).unwrap().collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(*matches[0].0, "rule-a");
  }

  #[test]
  fn a_pattern_with_a_variable_binds_it() {
    let mut net = DiscriminationNet::new();
    let pattern = Expression::variable("x", Expression::Wildcard(Wildcard::blank()));
    net.add(&pattern, "identity").unwrap();

    let matches: Vec<_> = net.match_expression(&sym("a")).unwrap().collect();
    assert_eq!(matches.len(), 1);
    let (_, substitution) = &matches[0];
    assert!(substitution.get("x").is_some());
  }

  #[test]
  fn operations_with_different_heads_do_not_cross_match() {
    let mut net = DiscriminationNet::new();
    let f = Symbol::operation("f", Arity::exactly(1));
    let g = Symbol::operation("g", Arity::exactly(1));
    net.add(&Expression::Operation(f.clone(), vec![sym("a")]), "f-rule").unwrap();
    net.add(&Expression::Operation(g.clone(), vec![sym("a")]), "g-rule").unwrap();

    let subject = Expression::Operation(g, vec![sym("a")]);
    let matches: Vec<_> = net.match_expression(&subject).unwrap().collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(*matches[0].0, "g-rule");
  }

  #[test]
  fn non_ground_subject_raises() {
    let mut net = DiscriminationNet::new();
    net.add(&sym("a"), ()).unwrap();
    let bogus = Expression::Wildcard(Wildcard::blank());
    assert!(net.match_expression(&bogus).is_err());
  }

  #[test]
  fn symbol_wildcard_matches_a_ground_symbol_in_its_category_or_a_subcategory() {
    use crate::api::symbol::Category;

    let number = Category::new("Number");
    let integer = Category::with_parent("Integer", &number);
    let one = Symbol::leaf_with_category("1", integer.clone());
    let half = Symbol::leaf_with_category("1/2", number.clone());
    let unrelated = Symbol::leaf("x");

    let mut net = DiscriminationNet::new();
    net.add(&Expression::SymbolWildcard(number), "is-a-number").unwrap();

    assert_eq!(net.match_expression(&Expression::Symbol(one)).unwrap().count(), 1);
    assert_eq!(net.match_expression(&Expression::Symbol(half)).unwrap().count(), 1);
    assert_eq!(net.match_expression(&Expression::Symbol(unrelated)).unwrap().count(), 0);
  }

  #[test]
  fn symbol_category_does_not_shadow_a_more_specific_exact_symbol_match() {
    let number = crate::api::symbol::Category::new("Number");
    let one = Symbol::leaf_with_category("1", number.clone());

    let mut net = DiscriminationNet::new();
    net.add(&sym("1"), "exact").unwrap();
    net.add(&Expression::SymbolWildcard(number), "category").unwrap();

    let mut labels: Vec<&str> =
      net.match_expression(&Expression::Symbol(one)).unwrap().map(|(label, _)| *label).collect();
    labels.sort_unstable();
    assert_eq!(labels, vec!["category", "exact"]);
  }
}
