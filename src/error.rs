use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("corrupt collection {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("mirror rejected {table}: {status}")]
    Rejected { table: String, status: u16 },

    #[error("malformed mirror payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AiError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("generation rejected: {status}")]
    Rejected { status: u16 },

    #[error("unusable generation output: {0}")]
    Malformed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("document load failed: {0}")]
    Load(String),

    #[error("page {0} out of range")]
    PageOutOfRange(u32),

    #[error("render canceled")]
    Canceled,

    #[error("render failed: {0}")]
    Render(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("sign-out failed: {0}")]
    SignOut(String),
}
