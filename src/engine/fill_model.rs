//! Probabilistic fill model: seeded Bernoulli trials deciding whether a
//! marketable limit/stop order actually fills this pass, and whether a fill
//! slips off its nominal price. Deterministic given the same seed and the
//! same sequence of draws (spec §4.4).

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FillModelConfig {
    /// Probability [0, 1] that a marketable limit order actually fills this pass.
    pub prob_fill_on_limit: f64,
    /// Probability [0, 1] that a triggered stop order actually fills this pass.
    pub prob_fill_on_stop: f64,
    /// Probability [0, 1] that a fill slips from its nominal book-walk price.
    pub prob_slippage: f64,
    pub seed: u64,
}

impl Default for FillModelConfig {
    fn default() -> Self {
        Self {
            prob_fill_on_limit: 1.0,
            prob_fill_on_stop: 1.0,
            prob_slippage: 0.0,
            seed: 0,
        }
    }
}

/// Seeded, replay-stable Bernoulli fill model.
#[derive(Debug, Clone)]
pub struct FillModel {
    config: FillModelConfig,
    rng: ChaCha8Rng,
}

impl FillModel {
    pub fn new(config: FillModelConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &FillModelConfig {
        &self.config
    }

    /// Re-seed and restart the draw sequence from the beginning (used by
    /// `Engine::reset`, so repeated replays from the same seed draw the same
    /// sequence of outcomes).
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
    }

    pub fn is_limit_filled(&mut self) -> bool {
        self.rng.gen::<f64>() < self.config.prob_fill_on_limit
    }

    pub fn is_stop_filled(&mut self) -> bool {
        self.rng.gen::<f64>() < self.config.prob_fill_on_stop
    }

    pub fn is_slipped(&mut self) -> bool {
        self.rng.gen::<f64>() < self.config.prob_slippage
    }
}
