/// Largest page a listing endpoint will return.
pub const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Turns 1-based `page` and `limit` query values into `(limit, offset)`.
/// Missing or zero values take the defaults; `limit` is capped.
pub fn page_bounds(page: Option<u32>, limit: Option<u32>) -> (i64, i64) {
    let page = page.filter(|p| *p > 0).unwrap_or(1);
    let limit = limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);

    let limit = i64::from(limit);
    (limit, (i64::from(page) - 1) * limit)
}
