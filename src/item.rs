/// One entry of the gallery: opaque renderable content plus an optional caption.
///
/// Items are identified by their position in the gallery, never by value, so two
/// visually identical items are still distinct.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem<C> {
    pub content: C,
    pub caption: Option<String>,
}

impl<C> GalleryItem<C> {
    /// Blank captions are treated as missing.
    pub fn new(content: C, caption: Option<String>) -> Self {
        let caption = caption
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());
        Self { content, caption }
    }

    pub fn without_caption(content: C) -> Self {
        Self {
            content,
            caption: None,
        }
    }
}

/// Reduce any integer onto `[0, len)`. Returns 0 for an empty range.
#[inline]
pub fn wrap_index(idx: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    idx.rem_euclid(len as i64) as usize
}

/// Shortest signed distance from `from` to `to` on a ring of `len` items.
///
/// Ties (exactly half way round) resolve forward.
pub fn cyclic_delta(from: usize, to: usize, len: usize) -> i64 {
    if len == 0 {
        return 0;
    }
    let len_i = len as i64;
    let forward = (to as i64 - from as i64).rem_euclid(len_i);
    if forward * 2 > len_i {
        forward - len_i
    } else {
        forward
    }
}
