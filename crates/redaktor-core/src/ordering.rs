//! Ordering primitives
//!
//! Pages and elements keep their insertion order. The only reordering
//! primitive the repository accepts is a swap of two positions; a drag to an
//! arbitrary index is expanded into adjacent swaps with [`swap_steps`].

/// Anything addressed by a string id inside an ordered list
pub trait Identified {
    fn id(&self) -> &str;
}

/// Index of the item with `id`, by linear scan
pub fn position_of<T: Identified>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Swap the items identified by `first` and `second`
///
/// On failure returns the id that could not be found and leaves `items`
/// untouched.
pub fn swap_by_id<T: Identified>(items: &mut [T], first: &str, second: &str) -> Result<(), String> {
    let first_index = position_of(items, first).ok_or_else(|| first.to_string())?;
    let second_index = position_of(items, second).ok_or_else(|| second.to_string())?;
    items.swap(first_index, second_index);
    Ok(())
}

/// Adjacent swaps that move the item at `from` to `to`
///
/// Applying the pairs in order with `slice::swap` shifts everything in
/// between by one slot, matching a drag-and-drop move.
pub fn swap_steps(from: usize, to: usize) -> Vec<(usize, usize)> {
    if from <= to {
        (from..to).map(|i| (i, i + 1)).collect()
    } else {
        (to..from).rev().map(|i| (i + 1, i)).collect()
    }
}
