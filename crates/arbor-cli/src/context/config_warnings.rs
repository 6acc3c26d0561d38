use arbor_config::{ArborConfig, StoreConfig};

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &ArborConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &ArborConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if config.store.path == StoreConfig::default().path && has_single_underscore(&env_keys, "STORE") {
        warnings.push(
            "Store path is the default while ARBOR_STORE_* env vars exist. Use double underscores (example: ARBOR_STORE__PATH)."
                .to_string(),
        );
    }

    if !config.general.has_user() && has_single_underscore(&env_keys, "GENERAL") {
        warnings.push(
            "No user configured while ARBOR_GENERAL_* env vars exist. Use double underscores (example: ARBOR_GENERAL__USER)."
                .to_string(),
        );
    }

    if config.import.delimiter.is_empty() && has_single_underscore(&env_keys, "IMPORT") {
        warnings.push(
            "Import delimiter is auto-detected while ARBOR_IMPORT_* env vars exist. Use double underscores (example: ARBOR_IMPORT__DELIMITER)."
                .to_string(),
        );
    }

    warnings
}

/// `ARBOR_<SECTION>_X` but not `ARBOR_<SECTION>__X`.
fn has_single_underscore(keys: &[String], section: &str) -> bool {
    let prefix = format!("ARBOR_{section}_");
    keys.iter()
        .filter_map(|key| key.strip_prefix(&prefix))
        .any(|rest| !rest.starts_with('_'))
}
