//! Route de-duplication by `(target, via)` key.

use std::collections::HashSet;

/// Split `items` into unique entries (first occurrence of each key, input
/// order kept) and the later duplicates.
pub fn de_duplicate_by_key<T, F>(items: &[T], key: F) -> (Vec<(String, &T)>, Vec<&T>)
where
    F: Fn(&T) -> String,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(items.len());
    let mut duplicates = Vec::new();

    for item in items {
        let k = key(item);
        if seen.insert(k.clone()) {
            unique.push((k, item));
        } else {
            duplicates.push(item);
        }
    }

    (unique, duplicates)
}
