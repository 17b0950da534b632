use crate::error::{Axis, GatherError, GatherResult};

/// Expand a sparse list of selected positions into a dense lookup table of
/// `array_len` entries.
///
/// Returns `Ok(None)` when there is nothing to expand: no list, an empty list,
/// or an empty array with an empty list. A non-empty list against an empty
/// array is always out of range. A `None` table contributes nothing to the selection,
/// which is not the same as an all-false table.
///
/// # Arguments
///
/// * `selection` - positions into the coordinate array, duplicates allowed
/// * `array_len` - length of the coordinate array the positions refer to
/// * `axis` - axis the list belongs to, used for error reporting
///
/// # Errors
///
/// Any position outside `[0, array_len)` yields
/// [`GatherError::IndexOutOfRange`].
pub fn expand_selection_indices(
    selection: Option<&[i64]>,
    array_len: usize,
    axis: Axis,
) -> GatherResult<Option<Vec<bool>>> {
    let selection = match selection {
        Some(sel) if !sel.is_empty() => sel,
        _ => return Ok(None),
    };

    if let Some(&index) = selection
        .iter()
        .find(|&&index| usize::try_from(index).map_or(true, |i| i >= array_len))
    {
        return Err(GatherError::IndexOutOfRange { axis, index, len: array_len });
    }

    let mut lookup = vec![false; array_len];
    for &index in selection {
        lookup[index as usize] = true;
    }
    Ok(Some(lookup))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_marks_listed_positions() {
        let lookup = expand_selection_indices(Some(&[1, 3, 3][..]), 5, Axis::Index).unwrap();
        assert_eq!(lookup, Some(vec![false, true, false, true, false]));
    }

    #[test]
    fn test_absent_or_empty_is_none() {
        assert_eq!(expand_selection_indices(None, 5, Axis::Index).unwrap(), None);
        assert_eq!(expand_selection_indices(Some(&[][..]), 5, Axis::Index).unwrap(), None);
        assert_eq!(expand_selection_indices(Some(&[][..]), 0, Axis::Value).unwrap(), None);
    }

    #[test]
    fn test_any_index_into_empty_array_is_an_error() {
        let err = expand_selection_indices(Some(&[0][..]), 0, Axis::Value).unwrap_err();
        assert_eq!(err, GatherError::IndexOutOfRange { axis: Axis::Value, index: 0, len: 0 });
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let err = expand_selection_indices(Some(&[100][..]), 5, Axis::Index).unwrap_err();
        assert_eq!(err, GatherError::IndexOutOfRange { axis: Axis::Index, index: 100, len: 5 });

        // one past the end
        assert!(expand_selection_indices(Some(&[0, 5][..]), 5, Axis::Value).is_err());
    }

    #[test]
    fn test_negative_index_is_an_error() {
        let err = expand_selection_indices(Some(&[-1][..]), 5, Axis::Value).unwrap_err();
        assert_eq!(err, GatherError::IndexOutOfRange { axis: Axis::Value, index: -1, len: 5 });
    }
}
