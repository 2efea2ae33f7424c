use url::Url;

use crate::app::Result;

/// Every `device_count`-th element starting at `device_id - 1`.
///
/// Taking all shards for `1..=device_count` yields each element exactly once.
/// Out-of-range ids produce an empty shard.
pub fn shard<T: Clone>(items: &[T], device_id: usize, device_count: usize) -> Vec<T> {
    if device_count == 0 || device_id == 0 || device_id > device_count {
        return Vec::new();
    }
    items
        .iter()
        .skip(device_id - 1)
        .step_by(device_count)
        .cloned()
        .collect()
}

/// Drop everything from the first `?` on.
pub fn strip_query(href: &str) -> &str {
    href.split_once('?').map_or(href, |(base, _)| base)
}

/// Resolve `href` against the page it was found on and strip the query.
pub fn normalize_link(page_url: &Url, href: &str) -> Result<String> {
    let absolute = page_url.join(href.trim())?;
    Ok(strip_query(absolute.as_str()).to_string())
}

/// Search result page URLs for `first..=last`, each with a `page=N` parameter.
pub fn search_pages(base_url: &str, first: u32, last: u32) -> Result<Vec<String>> {
    let base = Url::parse(base_url)?;
    Ok((first..=last)
        .map(|n| {
            let mut url = base.clone();
            url.query_pairs_mut().append_pair("page", &n.to_string());
            url.to_string()
        })
        .collect())
}
