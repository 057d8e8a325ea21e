//! Moving a signed-in session from one front-end to another.
//!
//! Two formats exist. The legacy blob is `{token, user}` JSON in base64,
//! passed as `?auth=` on redirects. The handoff token is a short-lived,
//! single-use JWT passed as `?handoff=` and exchanged server-side for a
//! fresh session token.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::database::UserRepository;
use crate::models::UserSummary;
use crate::services::auth_service::{generate_jwt, parse_object_id, verify_token, AuthResponse, TokenKeys};
use crate::utils::error::ApiError;

const HANDOFF_PURPOSE: &str = "handoff";

/// Legacy `?auth=` payload
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LegacyHandoff {
    pub token: String,
    pub user: UserSummary,
}

#[cfg(test)]
pub fn encode_legacy(handoff: &LegacyHandoff) -> Result<String, ApiError> {
    let json = serde_json::to_vec(handoff)
        .map_err(|e| ApiError::internal("Server error encoding handoff", e))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json))
}

/// Accepts the blob raw or percent-encoded, in either base64 alphabet,
/// with or without padding
pub fn decode_legacy(raw: &str) -> Result<LegacyHandoff, String> {
    let unescaped = urlencoding::decode(raw.trim()).map_err(|e| format!("Invalid handoff: {}", e))?;
    let normalized: String = unescaped
        .chars()
        .filter(|c| *c != '=' && !c.is_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let bytes = STANDARD_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| format!("Invalid handoff encoding: {}", e))?;

    serde_json::from_slice(&bytes).map_err(|e| format!("Invalid handoff payload: {}", e))
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HandoffClaims {
    pub sub: String,
    pub purpose: String,
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct HandoffRequest {
    /// Front-end URL to redirect to; its origin must be allow-listed
    pub target: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HandoffResponse {
    pub success: bool,
    pub handoff: String,
    pub expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// `handoff` is the signed token; `auth` is a legacy blob from a
/// front-end that still speaks `?auth=`
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct RedeemRequest {
    #[serde(default)]
    pub handoff: String,
    pub auth: Option<String>,
}

/// Redeemed handoff ids, kept until their token would have expired anyway
#[derive(Debug, Default)]
pub struct HandoffLedger {
    redeemed: Mutex<HashMap<String, usize>>,
}

impl HandoffLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `jti`; false when it was already redeemed
    pub fn claim(&self, jti: &str, exp: usize, now: usize) -> bool {
        let mut redeemed = match self.redeemed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        redeemed.retain(|_, expires| *expires >= now);

        if redeemed.contains_key(jti) {
            return false;
        }
        redeemed.insert(jti.to_string(), exp);
        true
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.redeemed.lock().map(|r| r.len()).unwrap_or_default()
    }
}

pub fn issue_handoff_token(keys: &TokenKeys, ttl_secs: i64, user_id: &str) -> Result<(String, HandoffClaims), ApiError> {
    let now = Utc::now().timestamp();
    let claims = HandoffClaims {
        sub: user_id.to_string(),
        purpose: HANDOFF_PURPOSE.to_string(),
        jti: uuid::Uuid::new_v4().to_string(),
        iat: now as usize,
        exp: (now + ttl_secs) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(keys.secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal("Server error generating handoff", e))?;

    Ok((token, claims))
}

/// Signature, expiry (no leeway) and purpose. Session tokens don't pass.
pub fn verify_handoff_token(keys: &TokenKeys, token: &str) -> Result<HandoffClaims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let claims = decode::<HandoffClaims>(
        token,
        &DecodingKey::from_secret(keys.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| format!("Invalid handoff: {}", e))?
    .claims;

    if claims.purpose != HANDOFF_PURPOSE {
        return Err("Invalid handoff: wrong purpose".to_string());
    }
    Ok(claims)
}

/// `target` must parse as a URL whose origin is listed. An empty list
/// allows no redirect targets.
pub fn check_target(target: &str, allowed_origins: &[String]) -> Result<String, ApiError> {
    let invalid = || ApiError::Validation(format!("Redirect target '{}' is not allowed", target));

    let url = reqwest::Url::parse(target.trim()).map_err(|_| invalid())?;
    let origin = url.origin().ascii_serialization();

    if allowed_origins.iter().any(|allowed| *allowed == origin) {
        Ok(url.to_string())
    } else {
        Err(invalid())
    }
}

pub fn redirect_url(target: &str, handoff: &str) -> String {
    let separator = if target.contains('?') { '&' } else { '?' };
    format!("{}{}handoff={}", target, separator, urlencoding::encode(handoff))
}

pub fn create_handoff(
    keys: &TokenKeys,
    ttl_secs: i64,
    allowed_origins: &[String],
    user_id: &str,
    request: &HandoffRequest,
) -> Result<HandoffResponse, ApiError> {
    let target = match request.target.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(target) => Some(check_target(target, allowed_origins)?),
        None => None,
    };

    let (handoff, claims) = issue_handoff_token(keys, ttl_secs, user_id)?;

    Ok(HandoffResponse {
        success: true,
        redirect_url: target.map(|t| redirect_url(&t, &handoff)),
        expires_at: claims.exp as i64 * 1000,
        handoff,
    })
}

/// Exchanges a handoff token for a session token. The id is spent before
/// the user lookup, so a failed redeem can't be retried with the same token.
pub async fn redeem_handoff(
    users: &dyn UserRepository,
    keys: &TokenKeys,
    ledger: &HandoffLedger,
    request: &RedeemRequest,
) -> Result<AuthResponse, ApiError> {
    if request.handoff.trim().is_empty() {
        return match request.auth.as_deref().filter(|a| !a.trim().is_empty()) {
            Some(blob) => redeem_legacy(users, keys, blob).await,
            None => Err(ApiError::Validation("Missing handoff token".to_string())),
        };
    }

    let claims = verify_handoff_token(keys, request.handoff.trim()).map_err(|e| {
        log::warn!("⚠️  Handoff rejected: {}", e);
        ApiError::Authentication("Not authorized, handoff failed".to_string())
    })?;

    if !ledger.claim(&claims.jti, claims.exp, Utc::now().timestamp() as usize) {
        log::warn!("⚠️  Handoff replay for user {}", claims.sub);
        return Err(ApiError::Authentication(
            "Not authorized, handoff already used".to_string(),
        ));
    }

    session_for(users, keys, &claims.sub).await
}

/// The blob's embedded session token must still verify; its `user` part is
/// ignored in favour of the stored account.
async fn redeem_legacy(users: &dyn UserRepository, keys: &TokenKeys, blob: &str) -> Result<AuthResponse, ApiError> {
    let legacy = decode_legacy(blob).map_err(|e| {
        log::warn!("⚠️  Legacy handoff rejected: {}", e);
        ApiError::Validation("Invalid handoff".to_string())
    })?;

    let claims = verify_token(keys, &legacy.token).map_err(|e| {
        log::warn!("⚠️  Legacy handoff token rejected: {}", e);
        ApiError::Authentication("Not authorized, token failed".to_string())
    })?;

    session_for(users, keys, &claims.id).await
}

async fn session_for(users: &dyn UserRepository, keys: &TokenKeys, user_id: &str) -> Result<AuthResponse, ApiError> {
    let id = parse_object_id(user_id, "user")?;
    let user = users
        .find_by_id(&id)
        .await
        .map_err(|e| ApiError::from_store("Server error redeeming handoff", e))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let token = generate_jwt(keys, &user.id_hex(), user.role)?;

    Ok(AuthResponse {
        success: true,
        token,
        user: UserSummary::from(&user),
    })
}
