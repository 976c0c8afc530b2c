//! Splits an ordered list into pages with distinct capacities.
//!
//! Screens that show connector details can hold a different number of rows
//! depending on whether they are the only page, the first page (which carries
//! a header), a middle page, or the last page (which carries the footer
//! actions). [`paginate`] lays items out so that:
//!
//! - a list that fits on a single page stays on one page,
//! - otherwise the first page is full (`max_first`), every middle page is full
//!   (`max_other`), and the last page holds the remaining `1..=max_last` items.
//!
//! Concatenating the pages always reproduces the input.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page size {name} must be at least 1")]
    InvalidPageSize { name: &'static str },

    /// Only possible when `max_other > max_last`: the items left after the
    /// first page cannot be split into full middle pages and a last page of
    /// `1..=max_last` items.
    #[error("{len} items cannot be split into pages of {max_first}, {max_other}.. and 1..={max_last}")]
    NoValidLastPage {
        len: usize,
        max_first: usize,
        max_other: usize,
        max_last: usize,
    },
}

/// Like [`paginate`] but borrows: returns sub-slices of `items`.
///
/// # Errors
///
/// - [`PaginationError::InvalidPageSize`] if any page size is zero.
/// - [`PaginationError::NoValidLastPage`] if the list needs more than one
///   page and its length cannot be laid out with the given sizes. Empty lists
///   and lists that fit on a single page never fail.
pub fn paginate_slices<T>(
    items: &[T],
    max_single: usize,
    max_first: usize,
    max_other: usize,
    max_last: usize,
) -> Result<Vec<&[T]>, PaginationError> {
    for (name, value) in [
        ("max_single", max_single),
        ("max_first", max_first),
        ("max_other", max_other),
        ("max_last", max_last),
    ] {
        if value == 0 {
            return Err(PaginationError::InvalidPageSize { name });
        }
    }
    if items.is_empty() {
        return Ok(Vec::new());
    }
    // No room for a non-empty last page after a full first page: the first
    // page is the only one.
    if items.len() <= max_single || items.len() <= max_first {
        return Ok(vec![items]);
    }

    let mut pages = vec![&items[..max_first]];
    let mut rest = &items[max_first..];
    while rest.len() > max_last {
        if rest.len() <= max_other {
            return Err(PaginationError::NoValidLastPage {
                len: items.len(),
                max_first,
                max_other,
                max_last,
            });
        }
        let (page, tail) = rest.split_at(max_other);
        pages.push(page);
        rest = tail;
    }
    pages.push(rest);

    Ok(pages)
}

/// Paginates `items` into owned pages.
///
/// `paginate(&[0..=6], 6, 5, 4, 5)` yields pages of sizes `[5, 2]`.
///
/// # Errors
///
/// See [`paginate_slices`].
pub fn paginate<T: Clone>(
    items: &[T],
    max_single: usize,
    max_first: usize,
    max_other: usize,
    max_last: usize,
) -> Result<Vec<Vec<T>>, PaginationError> {
    Ok(
        paginate_slices(items, max_single, max_first, max_other, max_last)?
            .into_iter()
            .map(<[T]>::to_vec)
            .collect(),
    )
}
