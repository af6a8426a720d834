use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result. A missing file yields
    /// the default configuration so the server can start with zero
    /// setup.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read,
    /// environment variable expansion fails, TOML parsing fails, or
    /// validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded = crate::env::expand_env(&raw)
            .map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded)
            .map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the model id is empty, the timeout is zero,
    /// or the payload budget is zero
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.flux.model.trim().is_empty() {
            anyhow::bail!("flux.model must not be empty");
        }

        if self.flux.timeout_secs == 0 {
            anyhow::bail!("flux.timeout_secs must be greater than 0");
        }

        if self.flux.payload_budget_bytes == 0 {
            anyhow::bail!("flux.payload_budget_bytes must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use crate::Config;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.flux.model, "black-forest-labs/FLUX.1-schnell");
        assert_eq!(config.flux.timeout_secs, 120);
        assert_eq!(config.flux.payload_budget_bytes, 750_000);
    }

    #[test]
    fn loads_overrides_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fluxgate.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[flux]\nmodel = \"black-forest-labs/FLUX.1-dev\"\ntimeout_secs = 30\n\n[server]\nwork_dir = \"/tmp/fluxgate-test\"\n"
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.flux.model, "black-forest-labs/FLUX.1-dev");
        assert_eq!(config.flux.timeout_secs, 30);
        assert_eq!(
            config.server.work_dir,
            std::path::PathBuf::from("/tmp/fluxgate-test")
        );
    }

    #[test]
    fn zero_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fluxgate.toml");
        std::fs::write(&path, "[flux]\ntimeout_secs = 0\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fluxgate.toml");
        std::fs::write(&path, "[flux]\nretries = 3\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
