//! Route labels for request metrics.

use actix_web::HttpRequest;

/// Label identifying the route that served `req`
///
/// Uses the matched resource pattern, so `/api/variables/{name}` stays one
/// label regardless of the variable addressed. Unmatched requests share
/// `/unknown`.
pub fn route_label(req: &HttpRequest) -> String {
    req.match_pattern()
        .unwrap_or_else(|| "/unknown".to_string())
}
