//! Derivation of the account key a connection is counted against.

use crate::error::Result;
use crate::models::{AccountKey, ConnectionHandle, SecurityContext};

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Build the account key for a security context
///
/// Precedence: the proxy user verbatim; else `'priv_user'@'priv_host'` when
/// either is set; else `'user'@'host'`, using the IP when the host is empty.
pub fn make_key(context: &SecurityContext) -> AccountKey {
    if let Some(proxy_user) = non_empty(&context.proxy_user) {
        return AccountKey::new(proxy_user);
    }

    let priv_user = non_empty(&context.priv_user);
    let priv_host = non_empty(&context.priv_host);
    if priv_user.is_some() || priv_host.is_some() {
        return AccountKey::from_parts(priv_user.unwrap_or(""), priv_host.unwrap_or(""));
    }

    let user = non_empty(&context.user).unwrap_or("");
    let host = non_empty(&context.host)
        .or_else(|| non_empty(&context.ip))
        .unwrap_or("");
    AccountKey::from_parts(user, host)
}

/// Build the account key of the connection behind `handle`
pub fn key_for_connection(handle: &dyn ConnectionHandle) -> Result<AccountKey> {
    let context = handle.security_context()?;
    Ok(make_key(&context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectionControlError;
    use crate::models::Connection;

    #[test]
    fn test_proxy_user_is_used_verbatim() {
        let context = SecurityContext::new("u", "h")
            .with_proxy_user(Some("'proxied'@'%'".to_string()))
            .with_priv_user(Some("p".to_string()));
        assert_eq!(make_key(&context).as_str(), "'proxied'@'%'");
    }

    #[test]
    fn test_priv_user_and_host_take_precedence_over_login_user() {
        let context = SecurityContext::new("login", "client.example")
            .with_priv_user(Some("app".to_string()))
            .with_priv_host(Some("%.example".to_string()));
        assert_eq!(make_key(&context).as_str(), "'app'@'%.example'");

        let host_only = SecurityContext::new("login", "client.example")
            .with_priv_host(Some("localhost".to_string()));
        assert_eq!(make_key(&host_only).as_str(), "''@'localhost'");
    }

    #[test]
    fn test_empty_proxy_user_is_ignored() {
        let context = SecurityContext::new("u", "h").with_proxy_user(Some(String::new()));
        assert_eq!(make_key(&context).as_str(), "'u'@'h'");
    }

    #[test]
    fn test_ip_is_used_when_host_is_missing() {
        let context = SecurityContext::default()
            .with_user(Some("u".to_string()))
            .with_host(Some(String::new()))
            .with_ip(Some("192.0.2.7".to_string()));
        assert_eq!(make_key(&context).as_str(), "'u'@'192.0.2.7'");

        let anonymous = SecurityContext::default().with_ip(Some("192.0.2.7".to_string()));
        assert_eq!(make_key(&anonymous).as_str(), "''@'192.0.2.7'");

        assert_eq!(make_key(&SecurityContext::default()).as_str(), "''@''");
    }

    #[test]
    fn test_missing_security_context_is_an_error() {
        let conn = Connection::without_security_context();
        assert_eq!(
            key_for_connection(&conn),
            Err(ConnectionControlError::MissingSecurityContext)
        );

        let conn = Connection::new(SecurityContext::new("u", "h"));
        assert_eq!(key_for_connection(&conn).unwrap().as_str(), "'u'@'h'");
    }
}
