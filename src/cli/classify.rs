//! Classify command implementation

use crate::confidence::{ConfidenceClassifier, ProtectiveParams};
use crate::config::Config;
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Continuation probability in [0, 1]
    pub probability: Decimal,
}

impl ClassifyArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        println!("{}", self.render(config)?);
        Ok(())
    }

    fn render(&self, config: &Config) -> anyhow::Result<String> {
        if self.probability < Decimal::ZERO || self.probability > Decimal::ONE {
            anyhow::bail!("probability must be within [0, 1], got {}", self.probability);
        }
        let classifier = ConfidenceClassifier::new(config.confidence)?;
        let tier = classifier.classify(self.probability);

        let mut out = format!("Probability:  {}\nTier:         {}", self.probability, tier);
        match (tier.scaling(), ProtectiveParams::for_tier(tier, &config.protection)) {
            (Some(factors), Some(params)) => {
                out.push_str(&format!(
                    "\nMultipliers:  SL x{} / TP x{}\nStop loss:    {} pips\nTake profit:  {} pips ({}R)",
                    factors.stop_loss,
                    factors.take_profit,
                    params.stop_loss_pips,
                    params.take_profit_pips,
                    params.take_profit_ratio,
                ));
            }
            _ => out.push_str("\nNot tradeable"),
        }
        Ok(out)
    }
}
