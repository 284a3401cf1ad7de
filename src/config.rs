use anyhow::{anyhow, Context};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mongodb_uri = env::var("MONGODB_URI").context("MONGODB_URI must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.len() < 16 {
            return Err(anyhow!("JWT_SECRET must be at least 16 characters"));
        }
        let app_url =
            env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(4000);

        Ok(AppConfig {
            mongodb_uri,
            app_url,
            jwt_secret,
            port,
        })
    }
}
