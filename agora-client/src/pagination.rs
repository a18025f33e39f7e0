//! Client-side pagination over fully loaded collections.

/// Number of pages needed for `len` items; at least one even when empty.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size).max(1)
}

/// The visible window for a 1-based `page`. Page 0 and pages past the end
/// are empty, never a panic.
pub fn window<T: Clone>(items: &[T], page: usize, page_size: usize) -> Vec<T> {
    if page < 1 {
        return Vec::new();
    }
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    if start >= items.len() {
        return Vec::new();
    }
    items[start..end].to_vec()
}
