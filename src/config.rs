use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryConfig {
    /// Parses `cloudinary://<api_key>:<api_secret>@<cloud_name>`
    pub fn from_url(url: &str) -> Option<Self> {
        let rest = url.trim().strip_prefix("cloudinary://")?;
        let (credentials, cloud_name) = rest.rsplit_once('@')?;
        let (api_key, api_secret) = credentials.split_once(':')?;

        if api_key.is_empty() || api_secret.is_empty() || cloud_name.is_empty() {
            return None;
        }

        Some(CloudinaryConfig {
            cloud_name: cloud_name.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_days: i64,
    pub bcrypt_cost: u32,
    pub handoff_ttl_secs: i64,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
    pub cloudinary: Option<CloudinaryConfig>,
    pub upload_timeout_secs: u64,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let cloudinary = match optional("CLOUDINARY_URL") {
            Some(url) => Some(
                CloudinaryConfig::from_url(&url).ok_or(ConfigError::Invalid {
                    name: "CLOUDINARY_URL",
                    value: "<redacted>".to_string(),
                })?,
            ),
            None => match (
                optional("CLOUDINARY_CLOUD_NAME"),
                optional("CLOUDINARY_API_KEY"),
                optional("CLOUDINARY_API_SECRET"),
            ) {
                (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                    cloud_name,
                    api_key,
                    api_secret,
                }),
                _ => None,
            },
        };

        let admin_seed = match (
            optional("ADMIN_FULLNAME"),
            optional("ADMIN_EMAIL"),
            optional("ADMIN_PASSWORD"),
        ) {
            (Some(full_name), Some(email), Some(password)) => Some(AdminSeed {
                full_name,
                email,
                password,
            }),
            _ => None,
        };

        Ok(Config {
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed("PORT", 5002)?,
            database_url,
            jwt_secret,
            jwt_expires_days: parsed("JWT_EXPIRES_DAYS", 7)?,
            bcrypt_cost: parsed("BCRYPT_COST", 10)?,
            handoff_ttl_secs: parsed("HANDOFF_TTL_SECS", 60)?,
            allowed_origins: parse_origins(&optional("ALLOWED_ORIGINS").unwrap_or_default()),
            cloudinary,
            upload_timeout_secs: parsed("UPLOAD_TIMEOUT_SECS", 30)?,
            admin_seed,
        })
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
