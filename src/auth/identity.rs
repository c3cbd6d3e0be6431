//! # Identity Resolution
//!
//! Turns request metadata into the value stored in and compared against a
//! table's owner column. Resolvers are pluggable; plain closures work too.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtConfig, JwtManager};
use crate::value::SqlValue;

/// Resolves the caller's identity from request metadata
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, request: &Parts) -> AuthResult<SqlValue>;
}

impl<F> IdentityResolver for F
where
    F: Fn(&Parts) -> AuthResult<SqlValue> + Send + Sync,
{
    fn resolve(&self, request: &Parts) -> AuthResult<SqlValue> {
        self(request)
    }
}

/// Every request is anonymous; owner-scoped tables are unreachable
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl IdentityResolver for Anonymous {
    fn resolve(&self, _request: &Parts) -> AuthResult<SqlValue> {
        Err(AuthError::AuthenticationRequired)
    }
}

/// Identity taken verbatim from a request header.
///
/// Only sensible behind a proxy that sets the header itself.
#[derive(Debug, Clone)]
pub struct HeaderIdentity {
    header: HeaderName,
}

impl HeaderIdentity {
    pub fn new(header: &str) -> AuthResult<Self> {
        let header = HeaderName::from_bytes(header.as_bytes())
            .map_err(|_| AuthError::InvalidHeaderName(header.to_string()))?;
        Ok(Self { header })
    }
}

impl IdentityResolver for HeaderIdentity {
    fn resolve(&self, request: &Parts) -> AuthResult<SqlValue> {
        let value = request
            .headers
            .get(&self.header)
            .ok_or(AuthError::AuthenticationRequired)?;
        let text = value
            .to_str()
            .map_err(|_| AuthError::MalformedCredential(self.header.to_string()))?;
        Ok(SqlValue::Text(text.trim().to_string()))
    }
}

/// Identity from the `sub` claim of an `Authorization: Bearer` token
#[derive(Clone)]
pub struct BearerIdentity {
    jwt: JwtManager,
}

impl BearerIdentity {
    pub fn new(jwt: JwtManager) -> Self {
        Self { jwt }
    }
}

impl IdentityResolver for BearerIdentity {
    fn resolve(&self, request: &Parts) -> AuthResult<SqlValue> {
        let auth = request
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::AuthenticationRequired)?
            .to_str()
            .map_err(|_| AuthError::MalformedCredential(AUTHORIZATION.to_string()))?;
        let token = auth
            .strip_prefix("Bearer ")
            .ok_or(AuthError::AuthenticationRequired)?;
        let claims = self.jwt.validate_token(token.trim())?;
        Ok(SqlValue::Text(claims.sub))
    }
}

/// Identity section of the configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IdentityConfig {
    #[default]
    None,
    Header {
        header: String,
    },
    Jwt(JwtConfig),
}

impl IdentityConfig {
    /// Build the configured resolver
    pub fn build(&self) -> AuthResult<Arc<dyn IdentityResolver>> {
        Ok(match self {
            IdentityConfig::None => Arc::new(Anonymous),
            IdentityConfig::Header { header } => Arc::new(HeaderIdentity::new(header)?),
            IdentityConfig::Jwt(config) => Arc::new(BearerIdentity::new(JwtManager::new(config.clone()))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/letters");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: &Parts| -> AuthResult<SqlValue> { Ok(SqlValue::Integer(1)) };
        assert_eq!(resolver.resolve(&parts(&[])).unwrap(), SqlValue::Integer(1));
    }

    #[test]
    fn test_anonymous_never_resolves() {
        assert_eq!(
            Anonymous.resolve(&parts(&[])),
            Err(AuthError::AuthenticationRequired)
        );
    }

    #[test]
    fn test_header_identity() {
        let resolver = HeaderIdentity::new("x-user-id").unwrap();
        assert_eq!(
            resolver.resolve(&parts(&[("x-user-id", "42")])).unwrap(),
            SqlValue::Text("42".into())
        );
        assert_eq!(
            resolver.resolve(&parts(&[])),
            Err(AuthError::AuthenticationRequired)
        );
        assert!(HeaderIdentity::new("bad header").is_err());
    }

    #[test]
    fn test_bearer_identity() {
        let jwt = JwtManager::new(JwtConfig::new("secret"));
        let token = jwt.issue_token("user-9").unwrap();
        let resolver = BearerIdentity::new(jwt);

        let header = format!("Bearer {}", token);
        assert_eq!(
            resolver.resolve(&parts(&[("authorization", &header)])).unwrap(),
            SqlValue::Text("user-9".into())
        );
        assert_eq!(
            resolver.resolve(&parts(&[("authorization", "Basic abc")])),
            Err(AuthError::AuthenticationRequired)
        );
        assert_eq!(
            resolver.resolve(&parts(&[("authorization", "Bearer nope")])),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn test_identity_config() {
        let config: IdentityConfig =
            serde_json::from_value(serde_json::json!({"type": "header", "header": "x-user"}))
                .unwrap();
        assert!(config.build().is_ok());

        let config: IdentityConfig =
            serde_json::from_value(serde_json::json!({"type": "jwt", "secret": "s"})).unwrap();
        assert!(matches!(config, IdentityConfig::Jwt(ref jwt) if jwt.token_ttl_secs == 900));

        let config: IdentityConfig = serde_json::from_value(serde_json::json!({"type": "none"})).unwrap();
        assert!(matches!(config, IdentityConfig::None));
    }
}
