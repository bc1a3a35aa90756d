use std::{str::FromStr, sync::Arc};

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};
use tracing::{info, warn};

use crate::{
    config::{AppConfig, AppEnv},
    users::{
        in_memory::InMemoryUserRepository,
        repo::{PgUserRepository, UserRepository},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Picks the Postgres repository when `DATABASE_URL` is set, else the
    /// in-memory one. Migrations run before the pool is handed out.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let users: Arc<dyn UserRepository> = match &config.database_url {
            Some(url) => {
                let db = connect(url, config.env).await?;
                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;
                info!("using postgres user repository");
                Arc::new(PgUserRepository::new(db))
            }
            None => {
                if config.env != AppEnv::Test {
                    warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
                }
                Arc::new(InMemoryUserRepository::new())
            }
        };

        Ok(Self::from_parts(users, config))
    }

    pub fn from_parts(users: Arc<dyn UserRepository>, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }
}

async fn connect(url: &str, env: AppEnv) -> anyhow::Result<PgPool> {
    let mut options = PgConnectOptions::from_str(url).context("parse DATABASE_URL")?;
    if env != AppEnv::Dev {
        options = options.disable_statement_logging();
    }
    PgPoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("connect to database")
}
