//! Application state - shared across all handlers.

use std::sync::Arc;

use async_trait::async_trait;

use folio_core::domain::{AllowedEmail, Role};
use folio_core::ports::{
    AllowedEmailRepository, AuthError, BaseRepository, CategoryRepository, IdentityVerifier,
    PostRepository, ProfileRepository, TokenService, VerifiedIdentity,
};
use folio_infra::auth::{GoogleIdentityVerifier, JwtTokenService};
use folio_infra::database::{
    InMemoryAllowedEmailRepository, InMemoryCategoryRepository, InMemoryPostRepository,
    InMemoryProfileRepository,
};

#[cfg(feature = "postgres")]
use folio_infra::database::{
    DatabaseConnections, PostgresAllowedEmailRepository, PostgresCategoryRepository,
    PostgresPostRepository, PostgresProfileRepository,
};

use crate::config::{AppConfig, SiteConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub allowed_emails: Arc<dyn AllowedEmailRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub site: SiteConfig,
}

/// Rejects every sign-in when no OAuth client is configured.
pub struct DisabledIdentityVerifier;

#[async_trait]
impl IdentityVerifier for DisabledIdentityVerifier {
    async fn verify(&self, _id_token: &str) -> Result<VerifiedIdentity, AuthError> {
        Err(AuthError::ProviderUnavailable(
            "Google sign-in is not configured".to_string(),
        ))
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
        let identity: Arc<dyn IdentityVerifier> = match &config.google {
            Some(google) => Arc::new(GoogleIdentityVerifier::new(google.clone())),
            None => {
                tracing::warn!("GOOGLE_CLIENT_ID not set. Admin sign-in is disabled.");
                Arc::new(DisabledIdentityVerifier)
            }
        };

        #[cfg(feature = "postgres")]
        let state = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let conn = connections.main;
                    Self {
                        posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                        categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
                        profiles: Arc::new(PostgresProfileRepository::new(conn.clone())),
                        allowed_emails: Arc::new(PostgresAllowedEmailRepository::new(conn)),
                        tokens,
                        identity,
                        site: config.site.clone(),
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory(tokens, identity, config.site.clone())
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory(tokens, identity, config.site.clone())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Self::in_memory(tokens, identity, config.site.clone())
        };

        if let Some(email) = &config.master_email {
            state.seed_master(email).await;
        }

        tracing::info!("Application state initialized");
        state
    }

    /// State backed by in-memory repositories.
    pub fn in_memory(
        tokens: Arc<dyn TokenService>,
        identity: Arc<dyn IdentityVerifier>,
        site: SiteConfig,
    ) -> Self {
        Self {
            posts: Arc::new(InMemoryPostRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            profiles: Arc::new(InMemoryProfileRepository::new()),
            allowed_emails: Arc::new(InMemoryAllowedEmailRepository::new()),
            tokens,
            identity,
            site,
        }
    }

    /// Make sure `email` may sign in as master. Existing entries are kept.
    pub async fn seed_master(&self, email: &str) {
        let entry = AllowedEmail::invite(email, Role::Master, None);
        match self.allowed_emails.find_by_id(entry.email.clone()).await {
            Ok(Some(_)) => {}
            Ok(None) => match self.allowed_emails.save(entry).await {
                Ok(saved) => tracing::info!(email = %saved.email, "Seeded master allow-list entry"),
                Err(e) => tracing::error!(error = %e, "Failed to seed master allow-list entry"),
            },
            Err(e) => tracing::error!(error = %e, "Failed to read allow-list"),
        }
    }
}
