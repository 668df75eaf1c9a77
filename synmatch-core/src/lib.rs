/*!

`synmatch-core` is a deterministic many-to-one discrimination net for syntactic tree pattern matching: given a
set of patterns built from the expression algebra in [`api::expression`], it builds a single automaton that
reports every pattern matching a subject expression in time proportional to the subject's size, independent of
how many patterns are registered.

The two public entry points are [`api::DiscriminationNet`], the general-purpose many-to-one matcher, and
[`api::SequenceMatcher`], a specialization for patterns of the shape `f(x*, s1, .., sn, y*)` that slides a fixed
middle across a subject's operands. Everything else — the flattened term representation, the per-pattern NFA
builder, determinization, and the product construction that merges patterns into one net — lives under `core`
and is not part of the public API.

*/

pub mod api;
mod core;
