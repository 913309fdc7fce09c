use std::{
    env, fs,
    path::{Path, PathBuf},
};

use cca_sim_core::{AuctionParameters, EmissionTemplate, ScheduledBid};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SCENARIO_PATH: &str = "scenario.toml";
const DEFAULT_OWNER_ENV: &str = "CCA_DEFAULT_OWNER";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScenarioFile {
    pub auction: AuctionParameters,
    pub default_owner: Option<String>,
    #[serde(default)]
    pub bids: Vec<BidEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BidEntry {
    pub block: u64,
    pub max_price: Decimal,
    pub amount: Decimal,
    pub owner: Option<String>,
}

/// Auction parameters and bids ready for replay.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub parameters: AuctionParameters,
    pub bids: Vec<ScheduledBid>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScenarioOverrides {
    pub required_raise: Option<Decimal>,
    pub template: Option<EmissionTemplate>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse toml at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum BidError {
    #[error("bid #{index} has no owner: set `owner`, `default_owner` or {DEFAULT_OWNER_ENV}")]
    MissingOwner { index: usize },
}

pub fn read_file(path: impl AsRef<Path>) -> Result<String, ConfigError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<ScenarioFile, ConfigError> {
    let path = path.as_ref();
    let contents = read_file(path)?;
    let scenario: ScenarioFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(scenario)
}

/// Applies overrides and resolves every bid's owner: the bid's own, then
/// the file's `default_owner`, then `CCA_DEFAULT_OWNER`.
pub fn resolve_scenario(
    file: &ScenarioFile,
    overrides: ScenarioOverrides,
) -> Result<Scenario, BidError> {
    let mut parameters = file.auction.clone();
    if let Some(required) = overrides.required_raise {
        parameters.required_currency_raised = required;
    }
    if let Some(template) = overrides.template {
        template.apply(&mut parameters);
    }

    let default_owner = file.default_owner.clone().or_else(owner_from_env);
    let bids = file
        .bids
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let owner = entry
                .owner
                .clone()
                .or_else(|| default_owner.clone())
                .ok_or(BidError::MissingOwner { index })?;
            Ok(ScheduledBid::new(
                entry.block,
                entry.max_price,
                entry.amount,
                owner,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Scenario { parameters, bids })
}

fn owner_from_env() -> Option<String> {
    env::var(DEFAULT_OWNER_ENV)
        .ok()
        .filter(|owner| !owner.trim().is_empty())
}
