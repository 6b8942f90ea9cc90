//! Loot Generation
//!
//! Decides how many loot items appear on a map during a tick. The chance of
//! new loot grows with the time elapsed since loot last appeared, and the
//! number spawned is bounded by how far the loot count lags behind the
//! number of dogs.

use std::fmt;
use std::time::Duration;

use crate::config::LootGeneratorConfig;

/// Source of uniform numbers in `[0, 1]` used to scale the spawn chance.
pub type RandomSource = Box<dyn FnMut() -> f64 + Send>;

/// Stochastic loot spawner for one session.
pub struct LootGenerator {
    base_interval: Duration,
    probability: f64,
    time_without_loot: Duration,
    random: RandomSource,
}

impl LootGenerator {
    /// Creates a generator that, over one `base_interval`, spawns loot with
    /// the given `probability`.
    ///
    /// The default random source always yields `1.0`, so the generator
    /// spawns the expected amount.
    pub fn new(base_interval: Duration, probability: f64) -> Self {
        Self {
            base_interval,
            probability: probability.clamp(0.0, 1.0),
            time_without_loot: Duration::ZERO,
            random: Box::new(|| 1.0),
        }
    }

    pub fn from_config(config: &LootGeneratorConfig) -> Self {
        Self::new(config.base_interval(), config.probability)
    }

    /// Replaces the random source.
    pub fn with_random_source(mut self, random: impl FnMut() -> f64 + Send + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    /// Returns how many items to spawn after `elapsed` more time, given the
    /// current loot count and the number of dogs on the map.
    pub fn generate(&mut self, elapsed: Duration, loot_count: usize, looter_count: usize) -> usize {
        self.time_without_loot += elapsed;

        let shortage = looter_count.saturating_sub(loot_count);
        if shortage == 0 {
            return 0;
        }

        let ratio = if self.base_interval.is_zero() {
            f64::INFINITY
        } else {
            self.time_without_loot.as_secs_f64() / self.base_interval.as_secs_f64()
        };
        let chance = 1.0 - (1.0 - self.probability).powf(ratio);
        let probability = (chance * (self.random)()).clamp(0.0, 1.0);
        let generated = (shortage as f64 * probability).round() as usize;

        if generated > 0 {
            self.time_without_loot = Duration::ZERO;
        }
        generated
    }

    /// Time accumulated since loot was last produced.
    pub fn time_without_loot(&self) -> Duration {
        self.time_without_loot
    }

    pub fn set_time_without_loot(&mut self, time: Duration) {
        self.time_without_loot = time;
    }
}

impl fmt::Debug for LootGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LootGenerator")
            .field("base_interval", &self.base_interval)
            .field("probability", &self.probability)
            .field("time_without_loot", &self.time_without_loot)
            .finish_non_exhaustive()
    }
}
