//! Dependency values and dependency lists.
//!
//! A dependency list decides whether two requests refer to the same
//! computation. Lists match when they have the same length and every element
//! compares equal to the element at the same position. Elements are
//! type-erased: two elements are equal only if they have the same concrete
//! type and that type's `PartialEq` says so. Use [`ByAddress`] when a value
//! should be compared by identity instead.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Object-safe equality over a type-erased dependency value.
trait DepValue: Any + Send + Sync {
  fn dyn_eq(&self, other: &dyn DepValue) -> bool;
  fn as_any(&self) -> &dyn Any;
  fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T> DepValue for T
where
  T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
  fn dyn_eq(&self, other: &dyn DepValue) -> bool {
    other
      .as_any()
      .downcast_ref::<T>()
      .map_or(false, |other| self == other)
  }

  fn as_any(&self) -> &dyn Any {
    self
  }

  fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

/// A single element of a dependency list.
#[derive(Clone)]
pub struct Dep(Arc<dyn DepValue>);

impl Dep {
  /// Wraps a value compared with its own `PartialEq`.
  ///
  /// Passing a `Dep` returns it unchanged, so a list built from `Dep`s matches
  /// the same list built from the plain values.
  pub fn new<T>(value: T) -> Self
  where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
  {
    if let Some(dep) = (&value as &dyn Any).downcast_ref::<Dep>() {
      return dep.clone();
    }
    Self(Arc::new(value))
  }

  /// Wraps a shared value compared by the address of its allocation.
  pub fn by_address<T: Send + Sync + 'static>(value: &Arc<T>) -> Self {
    Self::new(ByAddress::new(value))
  }

  /// Returns the wrapped value if it is a `T`.
  pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
    self.0.as_any().downcast_ref::<T>()
  }
}

impl PartialEq for Dep {
  fn eq(&self, other: &Self) -> bool {
    self.0.dyn_eq(&*other.0)
  }
}

impl fmt::Debug for Dep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt_value(f)
  }
}

/// Identity comparison for shared values.
///
/// Two `ByAddress` are equal when they point at the same allocation, no
/// matter what the pointee's contents are. The wrapper keeps the allocation
/// alive so its address cannot be reused while the dependency exists.
#[derive(Clone)]
pub struct ByAddress(Arc<dyn Any + Send + Sync>);

impl ByAddress {
  pub fn new<T: Send + Sync + 'static>(value: &Arc<T>) -> Self {
    let erased: Arc<dyn Any + Send + Sync> = value.clone();
    Self(erased)
  }

  fn addr(&self) -> *const () {
    Arc::as_ptr(&self.0) as *const ()
  }
}

impl PartialEq for ByAddress {
  fn eq(&self, other: &Self) -> bool {
    std::ptr::eq(self.addr(), other.addr())
  }
}

impl fmt::Debug for ByAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ByAddress({:p})", self.addr())
  }
}

/// An ordered dependency list.
#[derive(Clone, Default)]
pub struct Deps(Vec<Dep>);

impl Deps {
  /// An empty list. It matches only other empty lists.
  pub fn empty() -> Self {
    Self(Vec::new())
  }

  pub fn from_vec(deps: Vec<Dep>) -> Self {
    Self(deps)
  }

  /// Appends one element, consuming and returning the list.
  pub fn with<T>(mut self, value: T) -> Self
  where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
  {
    self.0.push(Dep::new(value));
    self
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Dep> {
    self.0.iter()
  }

  /// Length first, then pairwise; stops at the first mismatch.
  #[inline]
  pub fn matches(&self, other: &Deps) -> bool {
    self.0.len() == other.0.len() && self.0.iter().zip(other.0.iter()).all(|(a, b)| a == b)
  }
}

impl PartialEq for Deps {
  fn eq(&self, other: &Self) -> bool {
    self.matches(other)
  }
}

impl fmt::Debug for Deps {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.0.iter()).finish()
  }
}

impl<T, const N: usize> From<[T; N]> for Deps
where
  T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
  fn from(values: [T; N]) -> Self {
    Self(values.into_iter().map(Dep::new).collect())
  }
}

impl<T> From<Vec<T>> for Deps
where
  T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
  fn from(values: Vec<T>) -> Self {
    Self(values.into_iter().map(Dep::new).collect())
  }
}

impl FromIterator<Dep> for Deps {
  fn from_iter<I: IntoIterator<Item = Dep>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl<'a> IntoIterator for &'a Deps {
  type Item = &'a Dep;
  type IntoIter = std::slice::Iter<'a, Dep>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}

/// Builds a [`Deps`] from heterogeneous values.
///
/// # Examples
///
/// ```
/// use paper_suspense::deps;
///
/// let a = deps![1, "doc", 2.5];
/// let b = deps![1, "doc", 2.5];
/// assert!(a.matches(&b));
/// assert!(!a.matches(&deps![1, "doc"]));
/// ```
#[macro_export]
macro_rules! deps {
  () => {
    $crate::Deps::empty()
  };
  ($($value:expr),+ $(,)?) => {
    $crate::Deps::from_vec(vec![$($crate::Dep::new($value)),+])
  };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn equal_values_in_distinct_lists_match() {
    let a = Deps::from([1, 2]);
    let b = Deps::from(vec![1, 2]);
    assert!(a.matches(&b));
  }

  #[test]
  fn shared_prefix_is_not_a_match() {
    let short = Deps::from([1, 2]);
    let long = Deps::from([1, 2, 3]);
    assert!(!short.matches(&long));
    assert!(!long.matches(&short));
  }

  #[test]
  fn different_types_never_match() {
    // 1i32 and 1i64 look alike but are distinct dependency values.
    assert!(!deps![1i32].matches(&deps![1i64]));
    assert!(!deps!["a"].matches(&deps![String::from("a")]));
  }

  #[test]
  fn nan_is_not_equal_to_itself() {
    assert!(!deps![f64::NAN].matches(&deps![f64::NAN]));
  }

  #[test]
  fn by_address_uses_identity() {
    let first = Arc::new(String::from("page"));
    let twin = Arc::new(String::from("page"));

    assert!(deps![ByAddress::new(&first)].matches(&deps![ByAddress::new(&first.clone())]));
    assert!(!deps![ByAddress::new(&first)].matches(&deps![ByAddress::new(&twin)]));
    assert!(Deps::empty().with(1).matches(&Deps::from_vec(vec![Dep::new(1)])));
  }

  #[test]
  fn wrapped_deps_are_not_wrapped_twice() {
    let plain = Deps::from([1]);
    assert!(Deps::from(vec![Dep::new(1)]).matches(&plain));
    assert!(Deps::from_vec(vec![Dep::new(1)]).matches(&plain));
    assert!(Deps::from([Dep::new(1)]).matches(&plain));
    assert!(deps![Dep::new(1)].matches(&plain));
    assert!(Dep::new(Dep::new(1)) == Dep::new(1));
    assert_eq!(Dep::new(Dep::new(1)).downcast_ref::<i32>(), Some(&1));

    let doc = Arc::new(String::from("page"));
    let mixed = || vec![Dep::by_address(&doc), Dep::new(1)];
    assert!(Deps::from(mixed()).matches(&Deps::from_vec(mixed())));
    assert!(deps![Dep::by_address(&doc), 1].matches(&Deps::from_vec(mixed())));
  }

  #[test]
  fn empty_lists_match_each_other() {
    assert!(deps![].matches(&Deps::empty()));
    assert!(!deps![].matches(&deps![0u8]));
  }

  #[test]
  fn debug_lists_elements() {
    assert_eq!(format!("{:?}", deps![7, "x"]), r#"[7, "x"]"#);
    assert_eq!(
      deps![7, "x"].iter().next().and_then(|d| d.downcast_ref::<i32>()),
      Some(&7)
    );
  }
}
