use std::fmt;

use cca_sim_core::{PresetScenario, presets};
use eyre::{Result, eyre};

use crate::config::Scenario;

impl From<PresetScenario> for Scenario {
    fn from(preset: PresetScenario) -> Self {
        Self {
            parameters: preset.parameters,
            bids: preset.bids,
        }
    }
}

pub fn scenario(key: &str) -> Result<Scenario> {
    presets::preset(key)
        .map(Scenario::from)
        .ok_or_else(|| eyre!("unknown preset `{key}`, run `cca-sim preset` to list them"))
}

/// One line per bundled scenario.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresetList;

impl fmt::Display for PresetList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for preset in presets::presets() {
            writeln!(
                f,
                "{:<16} {:<16} {:>3} bids  {}",
                preset.key,
                preset.name,
                preset.bids.len(),
                preset.description
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_preset() {
        let listing = PresetList.to_string();

        assert_eq!(listing.lines().count(), presets::presets().len());
        assert!(listing.contains("hot_auction"));
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(scenario("partial_fill").is_ok());
        assert!(scenario("nope").is_err());
    }
}
