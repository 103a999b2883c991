/// Maps a possibly out-of-range coordinate onto `[0, len - 1]` by
/// replicating the edge sample.
///
/// Returns `None` only when `len == 0`, since there is no edge to replicate.
#[inline]
pub fn clamp_index(i: isize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if i < 0 {
        Some(0)
    } else {
        Some((i as usize).min(len - 1))
    }
}
