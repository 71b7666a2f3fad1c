use url::Url;

/// Largest page the store will return for one listing request.
pub const MAX_BATCH_LIMIT: u32 = 10_000;

/// Page size for a listing.
///
/// Anything that is not a positive number, or that exceeds
/// [`MAX_BATCH_LIMIT`], is replaced by the maximum.
pub fn clamp_batch_limit(requested: Option<i64>) -> u32 {
    match requested {
        Some(limit) if limit > 0 && limit <= i64::from(MAX_BATCH_LIMIT) => limit as u32,
        _ => MAX_BATCH_LIMIT,
    }
}

/// `<collection>?format=json&limit=<limit>[&marker=<marker>]`.
///
/// The marker is query-escaped; any query already on `collection` is
/// replaced.
pub fn listing_url(collection: &Url, limit: u32, marker: Option<&str>) -> Url {
    let mut url = collection.clone();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair("format", "json");
        query.append_pair("limit", &limit.to_string());
        if let Some(marker) = marker {
            query.append_pair("marker", marker);
        }
    }
    url
}
