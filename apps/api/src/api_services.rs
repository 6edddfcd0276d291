//! Composition of adapters into [`AppState`].

mod email;
mod sessions;

pub use sessions::build_postgres_session_layer;
#[cfg(test)]
pub use sessions::session_layer;

use std::sync::Arc;

use attenthive_application::{
    AccessService, ActorResolver, CareLogRepository, CareLogService, EmailService,
    MembershipRepository, MembershipService, PasswordHasher, RateLimitRepository,
    RateLimitService, RecipientRepository, RecipientService, UserRepository, UserService,
};
use attenthive_core::AppError;
use attenthive_infrastructure::{
    Argon2PasswordHasher, PostgresCareLogRepository, PostgresMembershipRepository,
    PostgresRateLimitRepository, PostgresRecipientRepository, PostgresUserRepository,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

/// Storage adapters behind every application port.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub recipients: Arc<dyn RecipientRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub care_logs: Arc<dyn CareLogRepository>,
    pub rate_limits: Arc<dyn RateLimitRepository>,
}

impl Repositories {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            recipients: Arc::new(PostgresRecipientRepository::new(pool.clone())),
            memberships: Arc::new(PostgresMembershipRepository::new(pool.clone())),
            care_logs: Arc::new(PostgresCareLogRepository::new(pool.clone())),
            rate_limits: Arc::new(PostgresRateLimitRepository::new(pool.clone())),
        }
    }
}

/// Opens the connection pool and applies pending migrations.
pub async fn connect_and_migrate(config: &ApiConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    let migrator = sqlx::migrate!("../../crates/infrastructure/migrations");
    migrator
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;
    info!(
        migrations = migrator.iter().count(),
        "database schema is up to date"
    );

    Ok(pool)
}

pub fn build_app_state(config: &ApiConfig, pool: &PgPool) -> Result<AppState, AppError> {
    let email_service = email::build_email_service(config)?;

    let mut state = assemble_state(
        Repositories::postgres(pool),
        email_service,
        Arc::new(Argon2PasswordHasher::new()),
        config.frontend_url.as_str(),
        config.bootstrap_token.as_str(),
    );
    state.trusted_proxies = Arc::new(config.trusted_proxies.clone());

    Ok(state)
}

pub fn assemble_state(
    repositories: Repositories,
    email_service: Arc<dyn EmailService>,
    password_hasher: Arc<dyn PasswordHasher>,
    frontend_url: &str,
    bootstrap_token: &str,
) -> AppState {
    let access_service = AccessService::new(repositories.recipients.clone());

    AppState {
        actor_resolver: ActorResolver::new(repositories.users.clone()),
        user_service: UserService::new(repositories.users.clone(), password_hasher),
        membership_service: MembershipService::new(
            repositories.recipients.clone(),
            repositories.memberships,
            repositories.users,
            email_service,
            frontend_url,
        ),
        recipient_service: RecipientService::new(repositories.recipients, access_service.clone()),
        care_log_service: CareLogService::new(repositories.care_logs, access_service),
        rate_limit_service: RateLimitService::new(repositories.rate_limits),
        frontend_url: frontend_url.to_owned(),
        bootstrap_token: bootstrap_token.to_owned(),
        trusted_proxies: Arc::default(),
    }
}
