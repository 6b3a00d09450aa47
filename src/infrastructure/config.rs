use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// JWT signing settings
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: chrono::Duration,
}

/// Cover image processing settings
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_width: u32,
    pub jpeg_quality: u8,
    pub max_bytes: usize,
}

/// Sliding-window limits for the auth routes
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub jwt: JwtConfig,
    pub uploads: UploadConfig,
    pub rate_limit: RateLimitConfig,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            if cfg!(debug_assertions) {
                "secret".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://shelfmate.db?mode=rwc".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            jwt: JwtConfig {
                secret,
                expires_in: chrono::Duration::hours(
                    parsed("JWT_EXPIRES_HOURS").unwrap_or(24) as i64,
                ),
            },
            uploads: UploadConfig {
                dir: lookup("UPLOADS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("public/uploads")),
                max_width: parsed("COVER_MAX_WIDTH").unwrap_or(800) as u32,
                jpeg_quality: parsed("COVER_JPEG_QUALITY").unwrap_or(80).clamp(1, 100) as u8,
                max_bytes: parsed("MAX_UPLOAD_BYTES").unwrap_or(10 * 1024 * 1024) as usize,
            },
            rate_limit: RateLimitConfig {
                max_requests: parsed("RATE_LIMIT_MAX").unwrap_or(10) as usize,
                window: Duration::from_secs(parsed("RATE_LIMIT_WINDOW_SECS").unwrap_or(60)),
            },
            seed_demo: lookup("SEED_DEMO").is_some(),
        }
    }

    /// Defaults suitable for tests: in-memory database, uploads under `uploads_dir`
    pub fn for_tests(uploads_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::from_lookup(|key| match key {
            "JWT_SECRET" => Some("test-secret".to_string()),
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            _ => None,
        });
        config.uploads.dir = uploads_dir.into();
        config
    }
}
