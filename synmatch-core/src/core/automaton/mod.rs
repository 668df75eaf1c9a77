/*!

The automaton machinery behind a discrimination net: a dense, arena-owned state graph (`state`), the per-pattern
NFA builder (`nfa`), NFA-to-DFA determinization (`dfa`), the product construction that merges one pattern's DFA
into the net built from all previous patterns (`product`), and the driver that walks a subject's `FlatTerm`
through the finished net (`driver`).

*/

pub(crate) mod dfa;
pub(crate) mod driver;
pub(crate) mod nfa;
pub(crate) mod product;
pub(crate) mod state;

pub(crate) use driver::{drive, MatchMode};
pub(crate) use state::{Automaton, StateId};
