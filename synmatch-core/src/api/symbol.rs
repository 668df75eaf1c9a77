/*!

Definitions related to symbols. A `Symbol` is a name to which additional information is attached: its arity (for
operation heads), a category for symbol-wildcard matching, and the theory attributes (`Commutative`, `Associative`)
that determine whether a pattern built from it is syntactic.

Symbol identity is its `name`: two `Symbol` values with the same name compare equal and hash equal regardless of
their arity/attributes/category, mirroring how a host program looks symbols up by name from a single declaration
table rather than by structural comparison.

*/

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use enumflags2::{bitflags, BitFlags};
use synmatch_abs::IString;

/// The number of operands an operation symbol accepts.
///
/// `fixed_size: true` means exactly `min_count` operands; `false` means `min_count` or more (a variadic/associative
/// operator).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Arity {
  pub min_count : usize,
  pub fixed_size: bool,
}

impl Arity {
  /// A leaf symbol: no operands at all.
  pub const NONE: Arity = Arity{ min_count: 0, fixed_size: true };

  pub const fn exactly(n: usize) -> Self {
    Arity{ min_count: n, fixed_size: true }
  }

  pub const fn at_least(n: usize) -> Self {
    Arity{ min_count: n, fixed_size: false }
  }
}

/// A nominal category used by symbol-wildcards (`SymbolWildcard`) to match any ground symbol whose category is
/// `c` or a declared subcategory of `c`. The ancestor chain is captured at construction time, so checking
/// "is-a" is a cheap linear scan with no separate hierarchy table to thread through the matcher.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Category {
  name     : IString,
  ancestors: Rc<[IString]>,
}

impl Category {
  pub fn new(name: impl Into<IString>) -> Self {
    Category{ name: name.into(), ancestors: Rc::from([]) }
  }

  /// Declares `name` as an immediate subcategory of `parent`.
  pub fn with_parent(name: impl Into<IString>, parent: &Category) -> Self {
    let mut ancestors = Vec::with_capacity(parent.ancestors.len() + 1);
    ancestors.push(parent.name.clone());
    ancestors.extend(parent.ancestors.iter().cloned());
    Category{ name: name.into(), ancestors: Rc::from(ancestors) }
  }

  pub fn name(&self) -> &IString {
    &self.name
  }

  /// Whether `self` is `other` or a declared subcategory of `other`.
  pub fn is_or_subcategory_of(&self, other: &Category) -> bool {
    self.name == other.name || self.ancestors.iter().any(|a| *a == other.name)
  }
}

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolAttribute {
  Commutative,
  Associative,
}

pub type SymbolAttributes = BitFlags<SymbolAttribute>;

#[derive(Clone, Debug)]
pub struct Symbol {
  pub name      : IString,
  pub category  : Option<Category>,
  pub arity     : Arity,
  pub attributes: SymbolAttributes,
}

impl Symbol {
  /// A ground leaf symbol with no category.
  pub fn leaf(name: impl Into<IString>) -> Self {
    Symbol{ name: name.into(), category: None, arity: Arity::NONE, attributes: SymbolAttributes::empty() }
  }

  /// A ground leaf symbol belonging to `category`, matchable by a `SymbolWildcard` over that category.
  pub fn leaf_with_category(name: impl Into<IString>, category: Category) -> Self {
    Symbol{ name: name.into(), category: Some(category), arity: Arity::NONE, attributes: SymbolAttributes::empty() }
  }

  /// An operation head with the given arity.
  pub fn operation(name: impl Into<IString>, arity: Arity) -> Self {
    Symbol{ name: name.into(), category: None, arity, attributes: SymbolAttributes::empty() }
  }

  #[inline(always)]
  pub fn with_commutative(mut self) -> Self {
    self.attributes |= SymbolAttribute::Commutative;
    self
  }

  #[inline(always)]
  pub fn with_associative(mut self) -> Self {
    self.attributes |= SymbolAttribute::Associative;
    self
  }

  #[inline(always)]
  pub fn is_commutative(&self) -> bool {
    self.attributes.contains(SymbolAttribute::Commutative)
  }

  #[inline(always)]
  pub fn is_associative(&self) -> bool {
    self.attributes.contains(SymbolAttribute::Associative)
  }
}

impl PartialEq for Symbol {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
  }
}
impl Eq for Symbol {}

impl Hash for Symbol {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name.hash(state);
  }
}

impl std::fmt::Display for Symbol {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn symbol_identity_ignores_attributes() {
    let a = Symbol::operation("f", Arity::exactly(2));
    let b = Symbol::operation("f", Arity::at_least(0)).with_commutative();
    assert_eq!(a, b);
  }

  #[test]
  fn category_hierarchy_walks_ancestors() {
    let number = Category::new("Number");
    let integer = Category::with_parent("Integer", &number);
    let even = Category::with_parent("Even", &integer);

    assert!(even.is_or_subcategory_of(&even));
    assert!(even.is_or_subcategory_of(&integer));
    assert!(even.is_or_subcategory_of(&number));
    assert!(!integer.is_or_subcategory_of(&even));
  }
}
