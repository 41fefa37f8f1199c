use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::errors::{LmsError, Result};

// CMS（Strapi users-permissions）签发的令牌载荷
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CmsClaims {
    pub id: i64,    // 用户 ID
    pub iat: usize, // 签发时间
    pub exp: usize, // 过期时间
}

/// 本地校验 CMS 令牌
///
/// 配置了 `backend.cms.jwt_secret` 时，中间件先在本地拒绝伪造或过期的令牌，
/// 避免每个请求都去 CMS 询问。未配置时完全依赖 CMS。
pub struct CmsTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl CmsTokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn from_config() -> Option<Self> {
        AppConfig::get().cms_jwt_secret().map(Self::new)
    }

    pub fn verify(&self, token: &str) -> Result<CmsClaims> {
        decode::<CmsClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| LmsError::authentication(format!("Invalid token: {e}")))
    }
}

// 以 CMS 相同的格式签发令牌（内存后端使用）
pub fn issue_token(secret: &str, user_id: i64, ttl: chrono::Duration) -> Result<String> {
    let now = chrono::Utc::now();
    let claims = CmsClaims {
        id: user_id,
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| LmsError::authentication(format!("Failed to issue token: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let token = issue_token("secret", 42, chrono::Duration::minutes(5)).unwrap();
        let claims = CmsTokenVerifier::new("secret").verify(&token).unwrap();
        assert_eq!(claims.id, 42);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token("secret", 42, chrono::Duration::minutes(5)).unwrap();
        let err = CmsTokenVerifier::new("other").verify(&token).unwrap_err();
        assert_eq!(err.code(), "E004");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = issue_token("secret", 42, chrono::Duration::hours(-2)).unwrap();
        assert!(CmsTokenVerifier::new("secret").verify(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(CmsTokenVerifier::new("secret").verify("not-a-jwt").is_err());
    }
}
