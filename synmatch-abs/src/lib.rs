#![allow(unused)]
/*!

Types/type aliases that abstract over the implementing backing type.

# Background and Motivation

A motivating example is the `IString` type, an interned string type. A number of external crates could provide this
functionality. This module redirects to whatever chosen implementation we want. To use the
[`string_cache` crate](https://crates.io/crates/string_cache), we just define `IString` as an alias for
`string_cache::DefaultAtom`:

```ignore
pub use string_cache::DefaultAtom as IString;
```

For types or infrastructure with very different backing implementations, we define an abstraction layer over the
implementation. For example, the `log` module could use any of a number of logging frameworks or even a bespoke
solution for its implementation. However, its (crate) public interface consists only of `init_logging()` and the
macros `critical!`, `error!`, `warning!`, `info!`, `debug!`, and `trace!`. The (private) backing implementation is
encapsulated in the `log` module.

*/

mod index_set;
mod pattern_set;
pub mod log;

// region Hashing data structures
use std::collections::HashSet as StdHashSet;
use std::collections::HashMap as StdHashMap;
pub use std::collections::HashSet;
pub use std::collections::HashMap;

// For vectors that are expected to have few or zero elements.
pub use smallvec::{SmallVec, smallvec};

/// A `Set` is a hash set. Useful when you need membership testing without caring about order.
pub type Set<T> = StdHashSet<T>;
// endregion

// Logging
pub use tracing;

// Interned string. Use `DefaultAtom` for a global cache that can be used across threads.
pub use string_cache::DefaultAtom as IString;

// region Items meant to be used only internally

pub use index_set::IndexSet;

// An insertion-order-stable set of small natural numbers, used for pattern-index payloads.
pub use pattern_set::PatternSet;

// endregion
