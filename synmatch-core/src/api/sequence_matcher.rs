/*!

`SequenceMatcher` specializes the discrimination net to patterns of the shape `f(x*, s_1, .., s_n, y*)`: a
non-commutative operation flanked on both sides by a star (unbounded, min-0) sequence wildcard, with an
arbitrary number of fixed syntactic operands `s_1, .., s_n` in between. All patterns registered to one matcher
must share the same outer head `f`.

Matching works by sliding the fixed middle across the subject's operand list: for every start offset `i`, the
operands from `i` onward are flattened and fed (in first-hit mode) to an internal `DiscriminationNet` built from
every pattern's fused middle section. A hit there is only a *candidate* — it means some pattern's middle section
is a prefix of what's left starting at `i`, nothing more — so each candidate still goes through full
`extract_substitution` against the actual middle operands before the endpoints are bound and the match is
yielded. This mirrors `DiscriminationNet::match_expression`'s own candidate-then-confirm structure: the net
narrows, the expression-level match confirms.

*/

use synmatch_abs::IString;

use crate::api::constraint::Constraint;
use crate::api::error::MatchError;
use crate::api::expression::Expression;
use crate::api::net::DiscriminationNet;
use crate::api::substitution::Substitution;
use crate::core::automaton::driver::MatchMode;
use crate::core::flatterm::FlatTerm;

struct PatternEntry {
  pattern   : Expression,
  first_name: Option<IString>,
  last_name : Option<IString>,
}

/// A many-to-one matcher for patterns sharing one non-commutative outer operation and star-wildcard endpoints.
pub struct SequenceMatcher {
  net     : DiscriminationNet<usize>,
  patterns: Vec<PatternEntry>,
  /// The outer head every registered pattern shares. Fixed by the first call to `add` and checked against on
  /// every subsequent one.
  operation: Option<IString>,
}

impl Default for SequenceMatcher {
  fn default() -> Self {
    Self::new()
  }
}

impl SequenceMatcher {
  pub fn new() -> Self {
    SequenceMatcher{ net: DiscriminationNet::new(), patterns: Vec::new(), operation: None }
  }

  /// A matcher preloaded with `patterns`, in order. All must share the same outer head.
  pub fn with_patterns(patterns: impl IntoIterator<Item = Expression>) -> Result<Self, MatchError> {
    let mut matcher = Self::new();
    for pattern in patterns {
      matcher.add(&pattern)?;
    }
    Ok(matcher)
  }

  /// Registers `pattern`, returning its dense index in registration order.
  ///
  /// # Errors
  /// - [`MatchError::ShapeError`] if `pattern` is not an operation, is commutative, has fewer than three
  ///   operands, or either endpoint operand is not a (possibly named) star wildcard.
  /// - [`MatchError::HeadMismatch`] if a pattern was already registered under a different outer head.
  pub fn add(&mut self, pattern: &Expression) -> Result<usize, MatchError> {
    let (head, operands) = match pattern {
      Expression::Operation(head, operands) => (head, operands),
      _ => return Err(MatchError::ShapeError("sequence-matcher pattern must be an operation".to_string())),
    };
    if head.is_commutative() {
      return Err(MatchError::ShapeError(format!(
        "sequence-matcher pattern's outer operation `{head}` must not be commutative"
      )));
    }
    if operands.len() < 3 {
      return Err(MatchError::ShapeError(format!(
        "sequence-matcher pattern needs at least 3 operands, got {}",
        operands.len()
      )));
    }

    match &self.operation {
      None => self.operation = Some(head.name.clone()),
      Some(established) if *established != head.name => {
        return Err(MatchError::HeadMismatch(format!(
          "expected outer head `{established}`, got `{}`",
          head.name
        )));
      }
      _ => {}
    }

    let first_name = Self::star_wildcard_name(&operands[0])?;
    let last_name = Self::star_wildcard_name(&operands[operands.len() - 1])?;

    let index = self.patterns.len();
    let middle: Vec<FlatTerm> = operands[1..operands.len() - 1].iter().map(FlatTerm::from_expression).collect();
    self.net.add_flatterm(FlatTerm::merged(&middle), index);
    self.patterns.push(PatternEntry{ pattern: pattern.clone(), first_name, last_name });

    #[cfg(feature = "tracing-logs")]
    synmatch_abs::log::debug!(pattern_index = index, head = %head, middle_len = middle.len(), "registered sequence-matcher pattern");

    Ok(index)
  }

  /// If `operand` is a (possibly variable-wrapped) star wildcard, its binding name, if any. `Err` otherwise.
  fn star_wildcard_name(operand: &Expression) -> Result<Option<IString>, MatchError> {
    let (name, inner) = match operand {
      Expression::Variable{ name, inner, .. } => (Some(name.clone()), inner.as_ref()),
      other => (None, other),
    };
    match inner {
      Expression::Wildcard(w) if !w.fixed_size && w.min_count == 0 => Ok(name),
      other => Err(MatchError::ShapeError(format!(
        "expected a star (unbounded, zero-or-more) wildcard at the pattern endpoint, got {other:?}"
      ))),
    }
  }

  /// Whether `pattern` has the shape this matcher accepts: a non-commutative operation with at least 3
  /// operands whose first and last are each a star wildcard. Does not check the outer head against any
  /// matcher instance's established operation.
  pub fn can_match(pattern: &Expression) -> bool {
    let Expression::Operation(head, operands) = pattern else { return false };
    if head.is_commutative() || operands.len() < 3 {
      return false;
    }
    Self::star_wildcard_name(&operands[0]).is_ok() && Self::star_wildcard_name(&operands[operands.len() - 1]).is_ok()
  }

  pub fn len(&self) -> usize {
    self.patterns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }

  /// Matches `subject` against every registered pattern. `subject` must be a ground operation with the same
  /// head every registered pattern shares; if it isn't, the empty iterator is returned rather than an error
  /// (mirroring `DiscriminationNet`'s "no match is never an error" rule).
  pub fn match_expression<'a>(
    &'a self,
    subject: &'a Expression,
  ) -> Result<impl Iterator<Item = (&'a Expression, Substitution)> + 'a, MatchError> {
    let mut results = Vec::new();

    let operands = match subject {
      Expression::Operation(head, operands) if self.operation.as_ref() == Some(&head.name) => operands,
      _ => return Ok(results.into_iter()),
    };

    let flatterms: Vec<FlatTerm> = operands.iter().map(FlatTerm::from_expression).collect();

    for start in 0..flatterms.len() {
      let window = FlatTerm::merged(&flatterms[start..]);
      let candidates = self.net.matching_indices(&window, MatchMode::LastState, true)?;

      for index in candidates.iter() {
        let entry = &self.patterns[index];
        let Expression::Operation(_, pattern_operands) = &entry.pattern else {
          unreachable!("sequence-matcher registry only ever holds operation patterns")
        };
        let middle = &pattern_operands[1..pattern_operands.len() - 1];

        if start + middle.len() > operands.len() {
          continue;
        }
        let subject_middle = &operands[start..start + middle.len()];

        let mut substitution = Substitution::new();
        let middle_matches = subject_middle
          .iter()
          .zip(middle)
          .all(|(subject_operand, pattern_operand)| substitution.extract_substitution(subject_operand, pattern_operand));
        if !middle_matches {
          continue;
        }

        if let Some(name) = &entry.first_name {
          if !substitution.try_bind_sequence(name.clone(), operands[..start].to_vec()) {
            continue;
          }
        }
        if let Some(name) = &entry.last_name {
          if !substitution.try_bind_sequence(name.clone(), operands[start + middle.len()..].to_vec()) {
            continue;
          }
        }

        if let Some(constraint) = entry.pattern.combined_constraint() {
          if !constraint.evaluate(&substitution) {
            continue;
          }
        }

        results.push((&entry.pattern, substitution));
      }
    }

    Ok(results.into_iter())
  }
}
