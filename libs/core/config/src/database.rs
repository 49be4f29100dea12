use crate::{env_or_default, env_parse_or_default, env_required, ConfigError, FromEnv};
use std::fmt;

/// Connection settings for the relational store, assembled from discrete `DB_*` variables
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// Session `client_encoding`
    pub charset: String,
    /// Session `TimeZone`
    pub timezone: String,
}

impl DatabaseConfig {
    /// Render a PostgreSQL connection URL. Credentials are percent-encoded and
    /// session settings are passed through the `options` startup parameter.
    pub fn url(&self) -> String {
        let options = format!(
            "-c client_encoding={} -c TimeZone={}",
            self.charset, self.timezone
        );

        format!(
            "postgres://{}:{}@{}:{}/{}?options={}",
            urlencoding::encode(&self.user),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            self.name,
            urlencoding::encode(&options),
        )
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("charset", &self.charset)
            .field("timezone", &self.timezone)
            .finish()
    }
}

impl FromEnv for DatabaseConfig {
    /// Requires DB_USER, DB_PASSWORD, DB_HOST and DB_NAME.
    /// DB_PORT defaults to 5432, DB_CHARSET to UTF8, DB_LOC to UTC.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            user: env_required("DB_USER")?,
            password: env_required("DB_PASSWORD")?,
            host: env_required("DB_HOST")?,
            port: env_parse_or_default("DB_PORT", "5432")?,
            name: env_required("DB_NAME")?,
            charset: env_or_default("DB_CHARSET", "UTF8"),
            timezone: env_or_default("DB_LOC", "UTC"),
        })
    }
}
