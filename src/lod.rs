/// Positions (into the active list) picked when thinning `active` items down
/// to at most `max_count`.
///
/// Uniform stride: the i-th pick is `floor(i * active / max_count)`. Computed
/// in integer arithmetic so the same inputs always pick the same positions.
pub fn stride_indices(active: usize, max_count: usize) -> impl Iterator<Item = usize> {
    let take = active.min(max_count);
    let thinning = active > max_count;
    (0..take).map(move |i| {
        if thinning {
            // u128 keeps i * active from overflowing on huge pools
            ((i as u128 * active as u128) / max_count as u128) as usize
        } else {
            i
        }
    })
}

/// Thin `items` to at most `max_count` using [`stride_indices`]
pub fn sample<T: Copy>(items: &[T], max_count: usize) -> Vec<T> {
    stride_indices(items.len(), max_count)
        .map(|i| items[i])
        .collect()
}
