use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]. Using
/// values that are not in this bound may result
/// in odd behaviours and/or incorrect programs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Size of the population.
    pub size: NonZeroUsize,
    /// Initial genetic distance threshold, beyond which
    /// genomes are considered as belonging to
    /// different species. Adjusted every generation
    /// to steer the species count towards
    /// [`target_species`](PopulationConfig::target_species).
    pub distance_threshold: f64,
    /// Desired amount of species in the population.
    pub target_species: usize,
    /// Top % of each species which survives the cull
    /// and may take part in reproduction.
    pub survival_threshold: f64,
    /// Chance that an offspring will be the result
    /// of crossover (as opposed to cloning a survivor).
    pub crossover_chance: f64,
    /// Minimum member count (before culling) for a species'
    /// best survivor to be copied unchanged to the next generation.
    pub elitism_min_size: usize,
    /// Number of generations without a mean fitness increase
    /// before a species is considered _stagnated_.
    pub stagnation_window: usize,
    /// Multiplier applied to the offspring quota
    /// of stagnated species.
    pub stagnation_penalty: f64,
    /// Number of evaluation threads. If `None`, the available
    /// parallelism of the machine is used.
    pub worker_threads: Option<NonZeroUsize>,
    /// Seed for the population's random number generator.
    /// If `None`, the generator is seeded from entropy.
    pub seed: Option<u64>,
}

impl PopulationConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, empty, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::populations::PopulationConfig;
    ///
    /// let cfg1 = PopulationConfig::zero();
    ///
    /// let cfg2 = PopulationConfig {
    ///     // Specify some values here...
    ///     stagnation_penalty: 0.5,
    ///     // Default the rest...
    ///     ..PopulationConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            // SAFETY: 1 is a valid NonZeroUsize. Replace this with
            // NonZeroUsize::new(1).unwrap() once const Option::unwrap
            // becomes stable.
            size: unsafe { NonZeroUsize::new_unchecked(1) },
            distance_threshold: 0.0,
            target_species: 0,
            survival_threshold: 0.0,
            crossover_chance: 0.0,
            elitism_min_size: 0,
            stagnation_window: 0,
            stagnation_penalty: 0.0,
            worker_threads: None,
            seed: None,
        }
    }
}

impl Default for PopulationConfig {
    /// The standard experiment constants: 150 genomes
    /// aiming for 20 species, keeping the top 20% of each.
    fn default() -> PopulationConfig {
        PopulationConfig {
            // SAFETY: 150 is a valid NonZeroUsize.
            size: unsafe { NonZeroUsize::new_unchecked(150) },
            distance_threshold: 3.0,
            target_species: 20,
            survival_threshold: 0.2,
            crossover_chance: 0.8,
            elitism_min_size: 5,
            stagnation_window: 10,
            stagnation_penalty: 0.5,
            worker_threads: None,
            seed: None,
        }
    }
}
