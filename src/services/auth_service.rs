use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::UserRepository;
use crate::models::{Avatar, Role, User, UserProfile, UserSummary};
use crate::utils::error::ApiError;

/// Session token claims: `{id, role}` plus timestamps
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub id: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Identity nested under `user` by some issuers
#[derive(Debug, Deserialize)]
struct NestedIdentity {
    #[serde(alias = "_id")]
    id: String,
    role: Role,
}

/// Accepts both `{id, role}` and `{user: {id, role}}` token bodies
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default, alias = "_id")]
    id: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    user: Option<NestedIdentity>,
    #[serde(default)]
    iat: usize,
    exp: usize,
}

// Request/Response structures
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub full_name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub full_name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6))]
    pub password: String,
    /// Only "Admin" is honoured; anything else creates a Customer
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub count: usize,
    pub users: Vec<UserProfile>,
}

/// Signing settings shared by every surface
#[derive(Debug, Clone)]
pub struct TokenKeys {
    pub secret: String,
    pub expires_days: i64,
}

impl TokenKeys {
    pub fn new(secret: impl Into<String>, expires_days: i64) -> Self {
        Self {
            secret: secret.into(),
            expires_days,
        }
    }
}

pub fn generate_jwt(keys: &TokenKeys, user_id: &str, role: Role) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        id: user_id.to_string(),
        role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(keys.expires_days)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(keys.secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal("Server error generating token", e))
}

/// Verifies signature and expiry. The role is whatever the token says;
/// a role change after issue is not seen until the token is replaced.
pub fn verify_token(keys: &TokenKeys, token: &str) -> Result<Claims, String> {
    let raw = decode::<RawClaims>(
        token,
        &DecodingKey::from_secret(keys.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| format!("Invalid token: {}", e))?
    .claims;

    let (id, role) = match (raw.user, raw.id, raw.role) {
        (Some(nested), _, _) => (nested.id, nested.role),
        (None, Some(id), Some(role)) => (id, role),
        _ => return Err("Invalid token: missing identity".to_string()),
    };

    Ok(Claims {
        id,
        role,
        iat: raw.iat,
        exp: raw.exp,
    })
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    hash(password, cost).map_err(|e| ApiError::internal("Server error hashing password", e))
}

pub fn parse_object_id(id: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id.trim()).map_err(|_| ApiError::Validation(format!("Invalid {} ID", what)))
}

/// Field checks shared by register and coordinator creation
pub fn check_registration(request: &RegisterRequest) -> Result<(), ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))
}

fn validation_message(errors: &validator::ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
    fields.sort_unstable();
    let fields: Vec<String> = fields.into_iter().map(camel_case).collect();
    format!("Missing or invalid fields: {}", fields.join(", "))
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Inserts a new account after the duplicate-email check
async fn create_account(
    users: &dyn UserRepository,
    full_name: &str,
    email: &str,
    password: &str,
    role: Role,
    avatar: Option<Avatar>,
    bcrypt_cost: u32,
) -> Result<User, ApiError> {
    let existing = users
        .find_by_email(email)
        .await
        .map_err(|e| ApiError::from_store("Server error creating user", e))?;
    if existing.is_some() {
        return Err(ApiError::Validation("User already exists".to_string()));
    }

    let mut user = User::new(full_name, email, hash_password(password, bcrypt_cost)?, role);
    user.avatar = avatar;

    users
        .insert(user)
        .await
        .map_err(|e| ApiError::from_store("Server error creating user", e))
}

/// Self-registration. The role is always Customer.
pub async fn register(
    users: &dyn UserRepository,
    keys: &TokenKeys,
    bcrypt_cost: u32,
    request: &RegisterRequest,
) -> Result<AuthResponse, ApiError> {
    check_registration(request)?;

    let user = create_account(
        users,
        &request.full_name,
        &request.email,
        &request.password,
        Role::Customer,
        None,
        bcrypt_cost,
    )
    .await?;

    let token = generate_jwt(keys, &user.id_hex(), user.role)?;

    Ok(AuthResponse {
        success: true,
        token,
        user: UserSummary::from(&user),
    })
}

/// Unknown email and wrong password fail identically
pub async fn login(
    users: &dyn UserRepository,
    keys: &TokenKeys,
    request: &LoginRequest,
) -> Result<AuthResponse, ApiError> {
    let invalid = || ApiError::Validation("Invalid Credentials".to_string());

    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(invalid());
    }

    let user = users
        .find_by_email(&request.email)
        .await
        .map_err(|e| ApiError::from_store("Server Error during login", e))?
        .ok_or_else(invalid)?;

    let valid = verify(&request.password, &user.password).unwrap_or(false);
    if !valid {
        return Err(invalid());
    }

    let token = generate_jwt(keys, &user.id_hex(), user.role)?;

    Ok(AuthResponse {
        success: true,
        token,
        user: UserSummary::from(&user),
    })
}

/// Admin-created account: Admin when asked for, Customer otherwise
pub async fn create_user(
    users: &dyn UserRepository,
    bcrypt_cost: u32,
    request: &CreateUserRequest,
) -> Result<UserResponse, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;

    let role = match request.role.as_deref().map(str::trim) {
        Some("Admin") => Role::Admin,
        _ => Role::Customer,
    };

    let user = create_account(
        users,
        &request.full_name,
        &request.email,
        &request.password,
        role,
        None,
        bcrypt_cost,
    )
    .await?;

    Ok(UserResponse {
        success: true,
        user: UserSummary::from(&user),
    })
}

/// Coordinator account. The avatar, when present, was already uploaded.
pub async fn create_coordinator(
    users: &dyn UserRepository,
    bcrypt_cost: u32,
    request: &RegisterRequest,
    avatar: Option<Avatar>,
) -> Result<UserResponse, ApiError> {
    check_registration(request)?;

    let user = create_account(
        users,
        &request.full_name,
        &request.email,
        &request.password,
        Role::Coordinator,
        avatar,
        bcrypt_cost,
    )
    .await?;

    Ok(UserResponse {
        success: true,
        user: UserSummary::from(&user),
    })
}

pub async fn get_profile(users: &dyn UserRepository, user_id: &str) -> Result<ProfileResponse, ApiError> {
    let id = parse_object_id(user_id, "user")?;
    let user = users
        .find_by_id(&id)
        .await
        .map_err(|e| ApiError::from_store("Server Error fetching user profile", e))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ProfileResponse {
        success: true,
        user: UserProfile::from(&user),
    })
}

pub async fn list_users(users: &dyn UserRepository) -> Result<UserListResponse, ApiError> {
    let all = users
        .list()
        .await
        .map_err(|e| ApiError::from_store("Server Error fetching all users", e))?;

    let users: Vec<UserProfile> = all.iter().map(UserProfile::from).collect();
    Ok(UserListResponse {
        success: true,
        count: users.len(),
        users,
    })
}

/// One-way promotion; no audit trail is kept
pub async fn assign_coordinator(users: &dyn UserRepository, user_id: &str) -> Result<UserResponse, ApiError> {
    let id = parse_object_id(user_id, "user")?;
    let user = users
        .set_role(&id, Role::Coordinator)
        .await
        .map_err(|e| ApiError::from_store("Server error assigning role", e))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(UserResponse {
        success: true,
        user: UserSummary::from(&user),
    })
}
