//! Alignment helpers.

/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two; zero is treated as one.
///
/// # Examples
///
/// ```
/// use hb_utils::num::align_up;
///
/// assert_eq!(align_up(40, 16), 48);
/// assert_eq!(align_up(40, 8), 40);
/// assert_eq!(align_up(7, 0), 7);
/// ```
#[inline]
pub const fn align_up(value: usize, align: usize) -> usize {
    if align <= 1 {
        return value;
    }
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Returns the number of bytes needed to move `value` onto an `align` boundary.
#[inline]
pub const fn padding_for(value: usize, align: usize) -> usize {
    align_up(value, align) - value
}

#[cfg(test)]
mod tests {
    use super::{align_up, padding_for};

    #[test]
    fn rounding() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(1, 4), 4);
        assert_eq!(align_up(33, 32), 64);
        assert_eq!(align_up(5, 1), 5);
    }

    #[test]
    fn padding() {
        assert_eq!(padding_for(40, 16), 8);
        assert_eq!(padding_for(40, 4), 0);
        assert_eq!(padding_for(40, 64), 24);
    }
}
