//! Cursor pagination over an append-only comment sequence.
//!
//! Cursors are comment ids. An unknown cursor (stale, or from another post)
//! restarts at the beginning instead of failing.

use crate::models::{Comment, CommentPage};

/// Index the page starts at for the given cursor.
pub fn start_index(all: &[Comment], after: Option<&str>) -> usize {
    match after {
        Some(cursor) => all
            .iter()
            .position(|c| c.id == cursor)
            .map(|i| i + 1)
            .unwrap_or(0),
        None => 0,
    }
}

/// Slice `[start, start + first)` out of a snapshot of a post's comments.
///
/// `next_cursor` is only set when the page is non-empty and stops short of
/// the end of `all`.
pub fn paginate(all: &[Comment], first: usize, after: Option<&str>) -> CommentPage {
    let start = start_index(all, after);
    let end = start.saturating_add(first).min(all.len());

    let items = all[start..end].to_vec();
    let next_cursor = match items.last() {
        Some(last) if end < all.len() => Some(last.id.clone()),
        _ => None,
    };

    CommentPage { items, next_cursor }
}
