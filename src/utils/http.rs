//! Request inspection helpers for the admin API.

use actix_web::HttpRequest;

/// Client address of the request, if known
///
/// Honors the first entry of `X-Forwarded-For` or `X-Real-IP` before falling
/// back to the peer address, without the port.
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    for header_name in ["X-Forwarded-For", "X-Real-IP"] {
        let forwarded = req
            .headers()
            .get(header_name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_forwarded_header_wins() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.9, 10.0.0.1"))
            .peer_addr("127.0.0.1:5000".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_peer_address_without_port() {
        let req = TestRequest::default()
            .peer_addr("192.0.2.4:41000".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req).as_deref(), Some("192.0.2.4"));
    }

    #[test]
    fn test_no_address_available() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(client_ip(&req), None);
    }
}
