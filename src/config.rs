use std::env;

use anyhow::Context;

pub struct Config {
    pub database_url: String,
    pub mirror_url: String,
    pub mirror_key: anyhow::Result<String>,
    pub storage_bucket: String,
    pub ai_endpoint: String,
    pub ai_key: anyhow::Result<String>,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv::dotenv().ok();
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./studyshelf.db".to_string()),
            mirror_url: env::var("MIRROR_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            mirror_key: env::var("MIRROR_KEY").with_context(|| "Please set MIRROR_KEY"),
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "materials".to_string()),
            ai_endpoint: env::var("AI_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8090/v1/generate".to_string()),
            ai_key: env::var("AI_KEY").with_context(|| "Please set AI_KEY"),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        })
    }
}
