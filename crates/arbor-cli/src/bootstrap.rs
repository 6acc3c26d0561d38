use arbor_config::ArborConfig;

/// Load layered configuration, including a `.env` in the working directory.
pub fn load_config() -> anyhow::Result<ArborConfig> {
    ArborConfig::load_with_dotenv().map_err(anyhow::Error::from)
}
