/*!

The public API of the library: the expression algebra a host program builds patterns and subjects out of
(`Symbol`, `Expression`, `Arity`, `Category`), the bindings produced by a successful match (`Substitution`),
user-supplied predicates (`Constraint`), the two matcher engines (`DiscriminationNet`, `SequenceMatcher`), and
the error type they return.

*/

pub mod symbol;
pub mod expression;
pub mod substitution;
pub mod constraint;
pub mod error;
pub mod net;
pub mod sequence_matcher;

pub use symbol::{Arity, Category, Symbol, SymbolAttribute, SymbolAttributes};
pub use expression::{Expression, Wildcard};
pub use substitution::{Binding, Substitution};
pub use constraint::{Constraint, ConstraintFn, MultiConstraint};
pub use error::MatchError;
pub use net::DiscriminationNet;
pub use sequence_matcher::SequenceMatcher;
