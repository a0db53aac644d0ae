/// Returns whether id `a` was issued after id `b`, treating the u16 space as
/// a circle.
/// id_more_recent(2, 1) will return true
/// id_more_recent(1, 65535) will return true
/// id_more_recent(1, 1) will return false
pub fn id_more_recent(a: u16, b: u16) -> bool {
    a != b && a.wrapping_sub(b) < 32768
}

/// Returns whether id `a` was issued before id `b`.
pub fn id_less_recent(a: u16, b: u16) -> bool {
    id_more_recent(b, a)
}

/// Signed distance travelled going from `a` to `b` around the u16 circle.
///
/// # Examples
/// ```
/// # use fathom_shared::wrapping_diff;
/// assert_eq!(wrapping_diff(1, 2), 1);
/// assert_eq!(wrapping_diff(2, 1), -1);
/// assert_eq!(wrapping_diff(65535, 0), 1);
/// assert_eq!(wrapping_diff(0, 65535), -1);
/// ```
pub fn wrapping_diff(a: u16, b: u16) -> i16 {
    b.wrapping_sub(a) as i16
}
