use crate::{
    error::Error,
    spotify::gateway::Gateway,
    types::{TrackObject, TrackSearchResponse},
};

/// Resolves a free-text query to the catalog's best match, or `None` when
/// the search comes back empty. Rate limiting is absorbed by the gateway;
/// any other upstream failure propagates so the caller can decide whether
/// the track is dropped.
pub async fn first_track_match(
    gateway: &Gateway,
    query: &str,
) -> Result<Option<TrackObject>, Error> {
    let path = format!("/search?q={}&type=track&limit=1", urlencode(query));
    let response: TrackSearchResponse = gateway.get_json(&path).await?;
    Ok(response.tracks.items.into_iter().next())
}

/// Minimal percent-encoding for the query component: everything outside the
/// RFC 3986 unreserved set is escaped, spaces included.
fn urlencode(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
