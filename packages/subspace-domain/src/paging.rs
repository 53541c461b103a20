use serde::Serialize;

/// A page request after clamping. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
	pub page: usize,
	pub page_size: usize,
}
impl PageRequest {
	/// Missing values take the defaults; the page is raised to 1 and the size is clamped into
	/// `1..=max_size`.
	pub fn clamped(
		page: Option<i64>,
		page_size: Option<i64>,
		default_size: usize,
		max_size: usize,
	) -> Self {
		let page = page.map(to_usize).unwrap_or(1).max(1);
		let page_size = page_size.map(to_usize).unwrap_or(default_size).clamp(1, max_size.max(1));

		Self { page, page_size }
	}

	pub fn offset(&self) -> usize {
		(self.page - 1).saturating_mul(self.page_size)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
	pub total_count: usize,
	pub page: usize,
	pub page_size: usize,
	pub total_pages: usize,
}
impl PageMeta {
	pub fn new(total_count: usize, request: PageRequest) -> Self {
		Self {
			total_count,
			page: request.page,
			page_size: request.page_size,
			total_pages: total_count.div_ceil(request.page_size),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
	pub meta: PageMeta,
	pub items: Vec<T>,
}
impl<T> Page<T> {
	pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
		Page { meta: self.meta, items: self.items.into_iter().map(f).collect() }
	}
}

/// Offset slicing. A page past the end is empty, not an error.
pub fn paginate<T>(items: impl IntoIterator<Item = T>, request: PageRequest) -> Page<T> {
	let items: Vec<T> = items.into_iter().collect();
	let meta = PageMeta::new(items.len(), request);
	let items = items.into_iter().skip(request.offset()).take(request.page_size).collect();

	Page { meta, items }
}

/// Clamps an optional count or limit into `min..=max`, using `default` when absent.
pub fn clamp_limit(requested: Option<i64>, default: usize, min: usize, max: usize) -> usize {
	requested.map(to_usize).unwrap_or(default).clamp(min, max)
}

fn to_usize(raw: i64) -> usize {
	usize::try_from(raw.max(0)).unwrap_or(usize::MAX)
}
