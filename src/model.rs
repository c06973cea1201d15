use std::fs::OpenOptions;
use std::io::prelude::*;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::CLIENT_NAME;

const CONFIG_NAME: &str = "config.toml";

#[derive(Debug, Default, Clone)]
pub(crate) struct ConfigFile {
    conf: Conf,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub(crate) struct Conf {
    pub(crate) firefly: FireflyOpts,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub(crate) struct FireflyOpts {
    pub(crate) base_url: String,
    pub(crate) access_token: String,
    /// Forwarded as the X-Trace-ID header on every request when set.
    #[serde(default)]
    pub(crate) x_trace_id: Option<String>,
}

impl ConfigFile {
    pub(crate) fn default_config_path() -> Result<std::path::PathBuf> {
        Ok(dirs::config_dir()
            .unwrap_or(std::env::current_dir()?)
            .join(CLIENT_NAME)
            .join(CONFIG_NAME))
    }

    pub(crate) fn read(path: Option<&str>) -> Result<Self> {
        let p = match path {
            Some(p) => p.into(),
            None => ConfigFile::default_config_path()?,
        };

        let mut fd = OpenOptions::new().read(true).open(&p).map_err(|e| {
            match e.kind() {
                std::io::ErrorKind::NotFound => {
                    let ctx = format!("no configuration file found at: {:?}", p);
                    anyhow::Error::new(e).context(ctx)
                },
                _ => {
                    let ctx = format!("Failed to read configuration {}: {}.", p.display(), e);
                    anyhow::Error::new(e).context(ctx)
                },
            }
        })?;
        let mut content = String::new();
        fd.read_to_string(&mut content)?;

        let config: Conf = toml::from_str(&content)?;
        Ok(ConfigFile { conf: config })
    }

    pub(crate) fn config(&self) -> &Conf {
        &self.conf
    }
}
