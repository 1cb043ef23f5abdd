/// API server configuration
///
/// Everything comes from environment variables, with a `.env` file picked
/// up in development. Only `DATABASE_URL` and `JWT_SECRET` are required;
/// the rest have defaults suitable for local work.
///
/// | Variable                   | Default                              |
/// |----------------------------|--------------------------------------|
/// | `API_HOST`                 | `0.0.0.0`                            |
/// | `API_PORT`                 | `4000`                               |
/// | `DATABASE_URL`             | required                             |
/// | `DATABASE_MAX_CONNECTIONS` | `10`                                 |
/// | `JWT_SECRET`               | required, at least 32 characters     |
/// | `FRONTEND_URL`             | `http://localhost:5173`              |
/// | `MAIL_API_URL`             | unset, disables outgoing email       |
/// | `MAIL_API_TOKEN`           | unset                                |
/// | `MAIL_FROM`                | `Workroom <no-reply@workroom.dev>`   |
use std::env;

use anyhow::{anyhow, bail};

/// Full server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,

    /// Origin allowed by CORS and the base for links in emails.
    /// `"*"` disables origin checks for local development.
    pub frontend_url: String,

    /// Outgoing email settings; `None` disables delivery
    pub mail: Option<MailConfig>,
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session token settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

/// HTTP mail provider settings
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_token: String,
    pub from_address: String,
}

impl Config {
    /// Loads configuration from the environment
    ///
    /// # Errors
    ///
    /// Fails if a required variable is missing, a numeric variable does
    /// not parse, or the JWT secret is shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow!("API_PORT must be a valid port number"))?;

        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL must be set"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .map_err(|_| anyhow!("DATABASE_MAX_CONNECTIONS must be a number"))?;

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| anyhow!("JWT_SECRET must be set"))?;
        if jwt_secret.len() < 32 {
            bail!("JWT_SECRET must be at least 32 characters");
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let mail = match (env::var("MAIL_API_URL"), env::var("MAIL_API_TOKEN")) {
            (Ok(api_url), Ok(api_token)) => Some(MailConfig {
                api_url,
                api_token,
                from_address: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "Workroom <no-reply@workroom.dev>".to_string()),
            }),
            _ => None,
        };

        Ok(Config {
            api: ApiConfig { host, port },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            frontend_url,
            mail,
        })
    }

    /// The address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 4000,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/workroom".to_string(),
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: "a-test-secret-of-sufficient-length".to_string(),
            },
            frontend_url: "http://localhost:5173".to_string(),
            mail: None,
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:4000");
    }

    #[test]
    fn test_mail_is_optional() {
        assert!(test_config().mail.is_none());
    }
}
