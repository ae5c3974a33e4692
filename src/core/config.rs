use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub classifier: ClassifierConfig,
    pub storage: StorageConfig,
    pub sms_opt_in: SmsOptInConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Vision-language model used as the classification gate
#[derive(Clone)]
pub struct ClassifierConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

// Keep the API key out of logs
impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Which blob backend stores uploaded images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDriver {
    Local,
    S3,
}

impl std::str::FromStr for StorageDriver {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "" | "local" => Ok(Self::Local),
            "s3" | "blob" | "minio" => Ok(Self::S3),
            other => Err(format!(
                "Invalid STORAGE_DRIVER '{}': expected 'local' or 's3'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub driver: StorageDriver,
    /// Root directory for the local backend; also served under `/uploads`
    pub upload_dir: PathBuf,
    /// Only present when `driver` is `S3`
    pub s3: Option<S3Config>,
}

/// S3/MinIO-compatible remote blob storage
#[derive(Clone)]
pub struct S3Config {
    pub endpoint: String,
    /// Base used to build public object URLs (defaults to `endpoint`)
    pub public_endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("public_endpoint", &self.public_endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key", &"***")
            .field("secret_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SmsOptInConfig {
    /// How long `sendSMS = true` survives before reverting
    pub window: Duration,
    /// Re-arm expiries for opted-in volunteers when the process starts
    pub rearm_on_startup: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            classifier: ClassifierConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            sms_opt_in: SmsOptInConfig::from_env()?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", name)),
        _ => Ok(default),
    }
}

fn parse_bool_env(name: &str, default: bool) -> Result<bool, String> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("{} must be a boolean", name)),
        },
        Err(_) => Ok(default),
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_env("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_env("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_env(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_env("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_env("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = non_empty_env("SWAGGER_USERNAME");
        let password = non_empty_env("SWAGGER_PASSWORD");
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Fire Guard API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "1.0.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API for uploading and analyzing fire images".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl ClassifierConfig {
    const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";
    const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";
    const DEFAULT_TIMEOUT_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let api_key = non_empty_env("GEMINI_API_KEY")
            .or_else(|| non_empty_env("GOOGLE_API_KEY"))
            .ok_or_else(|| {
                "GEMINI_API_KEY (or GOOGLE_API_KEY) environment variable is required".to_string()
            })?;

        let model = non_empty_env("GEMINI_MODEL").unwrap_or_else(|| Self::DEFAULT_MODEL.into());
        let base_url = non_empty_env("GEMINI_BASE_URL")
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();
        let timeout_secs = parse_env("GEMINI_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let driver = env::var("STORAGE_DRIVER")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<StorageDriver>()?;

        let upload_dir = PathBuf::from(
            non_empty_env("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()),
        );

        let s3 = match driver {
            StorageDriver::S3 => Some(S3Config::from_env()?),
            StorageDriver::Local => None,
        };

        Ok(Self {
            driver,
            upload_dir,
            s3,
        })
    }
}

impl S3Config {
    pub fn from_env() -> Result<Self, String> {
        let endpoint = non_empty_env("S3_ENDPOINT")
            .unwrap_or_else(|| "http://localhost:9000".to_string())
            .trim_end_matches('/')
            .to_string();
        let public_endpoint = non_empty_env("S3_PUBLIC_ENDPOINT")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| endpoint.clone());
        let region = non_empty_env("S3_REGION").unwrap_or_else(|| "us-east-1".to_string());
        let bucket = non_empty_env("S3_BUCKET").unwrap_or_else(|| "fire-guard-uploads".to_string());

        let access_key = non_empty_env("S3_ACCESS_KEY").ok_or_else(|| {
            "S3_ACCESS_KEY environment variable is required when STORAGE_DRIVER=s3".to_string()
        })?;
        let secret_key = non_empty_env("S3_SECRET_KEY").ok_or_else(|| {
            "S3_SECRET_KEY environment variable is required when STORAGE_DRIVER=s3".to_string()
        })?;

        Ok(Self {
            endpoint,
            public_endpoint,
            region,
            bucket,
            access_key,
            secret_key,
        })
    }
}

impl SmsOptInConfig {
    const DEFAULT_WINDOW_SECS: u64 = 24 * 60 * 60;

    pub fn from_env() -> Result<Self, String> {
        let window_secs = parse_env("SMS_OPT_IN_WINDOW_SECS", Self::DEFAULT_WINDOW_SECS)?;
        if window_secs == 0 {
            return Err("SMS_OPT_IN_WINDOW_SECS must be greater than zero".to_string());
        }

        Ok(Self {
            window: Duration::from_secs(window_secs),
            rearm_on_startup: parse_bool_env("SMS_REARM_ON_STARTUP", false)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_driver_parsing() {
        assert_eq!("local".parse::<StorageDriver>(), Ok(StorageDriver::Local));
        assert_eq!("".parse::<StorageDriver>(), Ok(StorageDriver::Local));
        assert_eq!("S3".parse::<StorageDriver>(), Ok(StorageDriver::S3));
        assert_eq!("blob".parse::<StorageDriver>(), Ok(StorageDriver::S3));
        assert!("ftp".parse::<StorageDriver>().is_err());
    }

    #[test]
    fn test_classifier_config_debug_hides_key() {
        let config = ClassifierConfig {
            api_key: "super-secret".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://example.test".to_string(),
            timeout: Duration::from_secs(5),
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("gemini-2.5-flash"));
    }
}
