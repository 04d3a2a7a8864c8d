//! Everything the launcher shows is derived from one number, the panel's
//! horizontal scroll offset. These are the pure functions doing the deriving.

/// Horizontal position of slot `index`.
pub fn slot_x(index: usize, page_gap: f32) -> f32 {
	index as f32 * page_gap
}

/// Offset of the last slot, i.e. the furthest the panel can rest.
pub fn max_scroll(page_gap: f32, page_count: usize) -> f32 {
	slot_x(page_count.saturating_sub(1), page_gap)
}

/// Page shown at `scroll_x`: the slot whose center is nearest, clamped to
/// `[0, page_count - 1]` for any offset, overscroll included.
pub fn page_index(scroll_x: f32, page_gap: f32, page_count: usize) -> usize {
	if page_count == 0 || page_gap <= 0.0 {
		return 0;
	}
	let raw = ((scroll_x + page_gap / 2.0) / page_gap).floor();
	let last = (page_count - 1) as f32;
	// NaN falls through the clamp and casts to 0
	raw.clamp(0.0, last) as usize
}

/// Slot `step` pages away from `current`, if there is one.
pub fn neighbor(current: usize, step: isize, page_count: usize) -> Option<usize> {
	current
		.checked_add_signed(step)
		.filter(|&target| target < page_count)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFade {
	pub left: f32,
	pub right: f32,
}

/// Opacity of the previous/next affordances. Dim within half a page of the
/// first or last slot, computed from the raw offset rather than the page index.
pub fn edge_fade(scroll_x: f32, page_gap: f32, page_count: usize, low: f32, high: f32) -> EdgeFade {
	let half = page_gap / 2.0;
	let left = if scroll_x <= half { low } else { high };
	let right = if scroll_x >= max_scroll(page_gap, page_count) - half {
		low
	} else {
		high
	};
	EdgeFade { left, right }
}
