use std::{fs, io, path::Path, time::Duration};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use shared::{
    domain::{Network, ObjectId, PackageId},
    protocol::CallTarget,
};
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "mood_board.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub network: Network,
    pub package_id: Option<PackageId>,
    pub board_id: Option<ObjectId>,
    pub bridge_url: Option<Url>,
    pub bridge_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: Network::default(),
            package_id: None,
            board_id: None,
            bridge_url: None,
            bridge_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    network: Option<Network>,
    package_id: Option<PackageId>,
    board_id: Option<ObjectId>,
    bridge_url: Option<String>,
    bridge_timeout_secs: Option<u64>,
}

impl Settings {
    /// The call target and board every vote is sent to.
    pub fn vote_target(&self) -> Result<(CallTarget, ObjectId)> {
        let package = self.package_id.clone().ok_or_else(|| {
            anyhow!("package id is not configured; set package_id, APP__PACKAGE_ID or --package-id")
        })?;
        let board = self.board_id.clone().ok_or_else(|| {
            anyhow!("board id is not configured; set board_id, APP__BOARD_ID or --board-id")
        })?;
        Ok((CallTarget::submit_mood(package), board))
    }
}

/// Defaults, then the TOML file if present, then `APP__*` variables.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.network {
        settings.network = v;
    }
    if let Some(v) = file_cfg.package_id {
        settings.package_id = Some(v);
    }
    if let Some(v) = file_cfg.board_id {
        settings.board_id = Some(v);
    }
    if let Some(v) = file_cfg.bridge_url {
        settings.bridge_url = Some(parse_bridge_url(&v)?);
    }
    if let Some(v) = file_cfg.bridge_timeout_secs {
        settings.bridge_timeout = Duration::from_secs(v);
    }

    Ok(())
}

fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(v) = lookup("APP__NETWORK") {
        settings.network = v.parse::<Network>().context("APP__NETWORK")?;
    }
    if let Some(v) = lookup("APP__PACKAGE_ID") {
        settings.package_id = Some(v.parse::<PackageId>().context("APP__PACKAGE_ID")?);
    }
    if let Some(v) = lookup("APP__BOARD_ID") {
        settings.board_id = Some(v.parse::<ObjectId>().context("APP__BOARD_ID")?);
    }
    if let Some(v) = lookup("APP__BRIDGE_URL") {
        settings.bridge_url = if v.trim().is_empty() {
            None
        } else {
            Some(parse_bridge_url(&v).context("APP__BRIDGE_URL")?)
        };
    }
    if let Some(v) = lookup("APP__BRIDGE_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.bridge_timeout = Duration::from_secs(parsed);
        }
    }

    Ok(())
}

pub fn parse_bridge_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid bridge url '{raw}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!("bridge url must be http or https, got '{other}'")),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
