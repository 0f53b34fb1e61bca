pub mod activation;
pub mod points;
pub mod schedule;

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

pub use activation::{ActivationState, Transition};
pub use points::{POINT_BUDGET, choosable_points_total, validate_points};
pub use schedule::{DayOfWeek, LookupError, TermKind};

/// Look up `key` in `map`, returning `None` instead of failing when it is absent.
pub fn get_element<'a, K, V, Q>(map: &'a HashMap<K, V>, key: &Q) -> Option<&'a V>
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ?Sized,
{
    map.get(key)
}
