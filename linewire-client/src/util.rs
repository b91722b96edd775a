//! Small helpers shared by the client layers.

use rand::Rng;
use serde_json::{Map, Value};

/// Copies every key of each source into `target`; later sources win.
///
/// Mutates and returns `target`. Values are cloned, nested objects are not merged.
pub fn shallow_merge<'a, 'b, I>(
    target: &'a mut Map<String, Value>,
    sources: I,
) -> &'a mut Map<String, Value>
where
    I: IntoIterator<Item = &'b Map<String, Value>>,
{
    for source in sources {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    target
}

/// Shuffles `items` in place into a uniformly random order.
pub fn permute<T>(items: &mut [T]) -> &mut [T] {
    permute_with(items, &mut rand::thread_rng())
}

/// Backward Fisher-Yates shuffle with a caller-supplied generator.
pub fn permute_with<'a, T, R: Rng + ?Sized>(items: &'a mut [T], rng: &mut R) -> &'a mut [T] {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
    items
}
