/// Keep the elements of `values` whose mask entry is `true`, in order.
///
/// The two slices are walked in lockstep, so a shorter mask truncates.
pub fn filter_with_mask<T: Copy>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask.iter())
        .filter(|(_, &keep)| keep)
        .map(|(&v, _)| v)
        .collect()
}

/// Same as [`filter_with_mask`] with the mask inverted.
pub fn filter_with_inverted_mask<T: Copy>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask.iter())
        .filter(|(_, &keep)| !keep)
        .map(|(&v, _)| v)
        .collect()
}

/// Check that an optional per-element array has exactly `expected` entries.
pub fn has_length<T>(values: Option<&[T]>, expected: usize) -> bool {
    values.map_or(true, |v| v.len() == expected)
}
