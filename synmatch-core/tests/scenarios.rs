//! End-to-end scenarios straight from the discrimination net's testable-properties table: a handful of small
//! pattern sets run against a subject, checked against the exact set of patterns expected to accept.

use synmatch_core::api::{Arity, DiscriminationNet, Expression, SequenceMatcher, Substitution, Symbol, Wildcard};

fn sym(name: &str) -> Expression {
  Expression::Symbol(Symbol::leaf(name))
}

fn op(head: Symbol, operands: Vec<Expression>) -> Expression {
  Expression::Operation(head, operands)
}

fn f(arity: Arity) -> Symbol {
  Symbol::operation("f", arity)
}

fn labels(matches: &[(&&'static str, Substitution)]) -> Vec<&'static str> {
  let mut labels: Vec<&'static str> = matches.iter().map(|(label, _)| **label).collect();
  labels.sort_unstable();
  labels
}

#[test]
fn scenario_1_single_pattern_matches_identical_subject() {
  let mut net = DiscriminationNet::new();
  net.add(&op(f(Arity::exactly(2)), vec![sym("a"), sym("b")]), "p1").unwrap();

  let subject = op(f(Arity::exactly(2)), vec![sym("a"), sym("b")]);
  let matches: Vec<_> = net.match_expression(&subject).unwrap().collect();
  assert_eq!(labels(&matches), vec!["p1"]);
}

#[test]
fn scenario_2_more_specific_pattern_shadows_the_wildcard_one() {
  let mut net = DiscriminationNet::new();
  net.add(&op(f(Arity::exactly(2)), vec![sym("a"), sym("b")]), "p1").unwrap();
  net.add(
    &op(f(Arity::exactly(2)), vec![sym("a"), Expression::Wildcard(Wildcard::blank())]),
    "p2",
  )
  .unwrap();

  let subject = op(f(Arity::exactly(2)), vec![sym("a"), sym("c")]);
  let matches: Vec<_> = net.match_expression(&subject).unwrap().collect();
  assert_eq!(labels(&matches), vec!["p2"]);
}

#[test]
fn scenario_3_sequence_wildcard_absorbs_the_remaining_operands() {
  let mut net = DiscriminationNet::new();
  net.add(
    &op(f(Arity::at_least(1)), vec![sym("a"), Expression::Wildcard(Wildcard::sequence())]),
    "p1",
  )
  .unwrap();

  let subject = op(f(Arity::at_least(1)), vec![sym("a"), sym("b"), sym("c")]);
  let matches: Vec<_> = net.match_expression(&subject).unwrap().collect();
  assert_eq!(labels(&matches), vec!["p1"]);
}

#[test]
fn scenario_4_fused_blanks_and_a_ground_pattern_both_accept() {
  let mut net = DiscriminationNet::new();
  // f(_, _): two adjacent blanks fuse at flattening time into one Wildcard(min_count: 2, fixed_size: true).
  net.add(
    &op(
      f(Arity::exactly(2)),
      vec![Expression::Wildcard(Wildcard::blank()), Expression::Wildcard(Wildcard::blank())],
    ),
    "p1",
  )
  .unwrap();
  net.add(&op(f(Arity::exactly(2)), vec![sym("a"), sym("b")]), "p2").unwrap();

  let subject = op(f(Arity::exactly(2)), vec![sym("a"), sym("b")]);
  let matches: Vec<_> = net.match_expression(&subject).unwrap().collect();
  assert_eq!(labels(&matches), vec!["p1", "p2"]);
}

#[test]
fn scenario_5_sequence_matcher_binds_prefix_and_suffix() {
  let star = |name: &str| Expression::variable(name, Expression::Wildcard(Wildcard::null_sequence()));
  let pattern = op(f(Arity::at_least(0)), vec![star("prefix"), sym("b"), star("suffix")]);

  let mut matcher = SequenceMatcher::new();
  matcher.add(&pattern).unwrap();

  let subject = op(f(Arity::at_least(0)), vec![sym("a"), sym("b"), sym("c")]);
  let matches: Vec<_> = matcher.match_expression(&subject).unwrap().collect();
  assert_eq!(matches.len(), 1);

  let (_, substitution) = &matches[0];
  match substitution.get("prefix") {
    Some(synmatch_core::api::Binding::Sequence(values)) => assert_eq!(values.len(), 1),
    other => panic!("unexpected prefix binding: {other:?}"),
  }
  match substitution.get("suffix") {
    Some(synmatch_core::api::Binding::Sequence(values)) => assert_eq!(values.len(), 1),
    other => panic!("unexpected suffix binding: {other:?}"),
  }
}

#[test]
fn adding_patterns_in_either_order_accepts_the_same_set() {
  // add(p1); add(p2) must accept the same language as add(p2); add(p1) — the product construction is
  // symmetric in what it accepts, even though the two resulting automata are built differently.
  let p1 = op(f(Arity::exactly(2)), vec![sym("a"), sym("b")]);
  let p2 = op(f(Arity::exactly(2)), vec![sym("a"), Expression::Wildcard(Wildcard::blank())]);
  let subjects = [
    op(f(Arity::exactly(2)), vec![sym("a"), sym("b")]),
    op(f(Arity::exactly(2)), vec![sym("a"), sym("c")]),
    op(f(Arity::exactly(2)), vec![sym("x"), sym("y")]),
  ];

  let mut forward = DiscriminationNet::new();
  forward.add(&p1, "p1").unwrap();
  forward.add(&p2, "p2").unwrap();

  let mut backward = DiscriminationNet::new();
  backward.add(&p2, "p2").unwrap();
  backward.add(&p1, "p1").unwrap();

  for subject in &subjects {
    let forward_labels = labels(&forward.match_expression(subject).unwrap().collect::<Vec<_>>());
    let backward_labels = labels(&backward.match_expression(subject).unwrap().collect::<Vec<_>>());
    assert_eq!(forward_labels, backward_labels, "mismatch for subject {subject:?}");
  }
}

#[test]
fn scenario_6_wrong_arity_pattern_does_not_shadow_the_correct_one() {
  let mut net = DiscriminationNet::new();
  net.add(&op(f(Arity::exactly(1)), vec![sym("a")]), "p1").unwrap();
  net.add(
    &op(f(Arity::at_least(1)), vec![sym("a"), Expression::Wildcard(Wildcard::sequence())]),
    "p2",
  )
  .unwrap();

  let subject = op(f(Arity::at_least(1)), vec![sym("a"), sym("b")]);
  let matches: Vec<_> = net.match_expression(&subject).unwrap().collect();
  assert_eq!(labels(&matches), vec!["p2"]);
}
