use config::ConfigError;

/// Refresh tokens live for 60 days; this is not configurable.
pub const REFRESH_TOKEN_EXPIRY_SECONDS: i64 = 60 * 24 * 60 * 60;
pub const DEFAULT_ACCESS_TOKEN_EXPIRY_SECONDS: i64 = 60 * 60;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub polka: PolkaSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// `dev` enables the admin reset endpoint
    pub platform: String,
}

impl ApplicationSettings {
    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Access token signing settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64, // seconds
}

impl JwtSettings {
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_expiry)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(REFRESH_TOKEN_EXPIRY_SECONDS)
    }
}

/// Settings for the payment provider webhook
#[derive(serde::Deserialize, Clone)]
pub struct PolkaSettings {
    pub api_key: String,
}

/// Loads settings from `configuration.yaml` (optional) overlaid by `APP_*`
/// environment variables, e.g. `APP_JWT__SECRET`.
///
/// Fails if no signing secret is configured.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8080)?
        .set_default("application.platform", "prod")?
        .set_default("jwt.access_token_expiry", DEFAULT_ACCESS_TOKEN_EXPIRY_SECONDS)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.jwt.secret.trim().is_empty() {
        return Err(ConfigError::Message("jwt.secret must be set".to_string()));
    }
    if settings.jwt.access_token_expiry <= 0 {
        return Err(ConfigError::Message(
            "jwt.access_token_expiry must be positive".to_string(),
        ));
    }
    // An access token never outlives the refresh token that renews it
    if settings.jwt.access_token_expiry > REFRESH_TOKEN_EXPIRY_SECONDS {
        return Err(ConfigError::Message(format!(
            "jwt.access_token_expiry must not exceed {} seconds",
            REFRESH_TOKEN_EXPIRY_SECONDS
        )));
    }
    Ok(())
}
