use std::fmt;

use cca_sim_core::{EmissionTemplate, MPS_TOTAL};
use rust_decimal::Decimal;

pub fn parse(key: &str) -> Result<EmissionTemplate, String> {
    EmissionTemplate::from_key(key).ok_or_else(|| {
        let keys: Vec<_> = EmissionTemplate::ALL.iter().map(|t| t.key()).collect();
        format!("unknown template `{key}`, expected one of {}", keys.join(", "))
    })
}

/// Every emission template with its steps and share of the supply.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateList;

impl fmt::Display for TemplateList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for template in EmissionTemplate::ALL {
            writeln!(f, "{:<14} {}", template.key(), template.description())?;
            for step in template.steps() {
                let share = Decimal::from(step.emission()) / Decimal::from(MPS_TOTAL)
                    * Decimal::ONE_HUNDRED;
                writeln!(
                    f,
                    "  {:>9} mps x {:>6} blocks  ({}%)",
                    step.mps,
                    step.block_delta,
                    share.round_dp(2).normalize()
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys_only() {
        assert_eq!(parse("back_loaded"), Ok(EmissionTemplate::BackLoaded));
        assert!(parse("sideways").is_err());
    }

    #[test]
    fn listing_shows_step_shares() {
        let listing = TemplateList.to_string();

        assert!(listing.contains("front_loaded"));
        assert!(listing.contains("(95%)"));
    }

    struct Full;

    impl fmt::Write for Full {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn write_failures_reach_the_caller() {
        use std::fmt::Write;

        let mut out = Full;
        assert_eq!(write!(out, "{}", TemplateList), Err(fmt::Error));
        assert_eq!(
            write!(out, "{}", crate::commands::preset::PresetList),
            Err(fmt::Error)
        );
    }
}
