use std::path::Path;

use anyhow::Context;
use arbor_config::ArborConfig;
use arbor_core::ids::UserIdentifier;
use arbor_db::service::ArborService;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: ArborService,
    pub config: ArborConfig,
    user_override: Option<String>,
}

impl AppContext {
    /// Open the flow store named by `--db`, or by `store.path`.
    pub async fn init(config: ArborConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let db_path = flags.db.clone().unwrap_or_else(|| config.store.path.clone());

        if db_path != ":memory:"
            && let Some(parent) = Path::new(&db_path).parent().filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory {}", parent.display())
            })?;
        }

        let service = ArborService::new_local(&db_path)
            .await
            .with_context(|| format!("failed to open flow store at {db_path}"))?;

        Ok(Self {
            service,
            config,
            user_override: flags.user.clone(),
        })
    }

    /// The identifier written to the usage log: `--user`, then `general.user`.
    pub fn user(&self) -> anyhow::Result<UserIdentifier> {
        let raw = match &self.user_override {
            Some(user) => user.as_str(),
            None => self
                .config
                .general
                .require_user()
                .context("pass --user or set ARBOR_GENERAL__USER")?,
        };
        Ok(UserIdentifier::parse(raw)?)
    }

    /// Result limit: command flag, then `general.default_limit`.
    pub const fn limit(&self, flags: &GlobalFlags) -> u32 {
        match flags.limit {
            Some(limit) => limit,
            None => self.config.general.default_limit,
        }
    }
}
