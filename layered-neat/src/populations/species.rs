use crate::genomics::Genome;

use serde::{Deserialize, Serialize};

/// Species are groups of reproductively compatible
/// (within the population's current distance threshold)
/// genomes. Membership is determined by the compatibility
/// distance to a _representative_, which is re-chosen at
/// random among the members every generation.
///
/// Genomes refer to their species by index, so a species
/// only tracks how many members it holds. Its log of mean
/// member fitness is used to detect stagnation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    pub(super) representative: Genome,
    pub(super) member_count: usize,
    pub(super) offspring_quota: usize,
    pub(super) fitness_history: Vec<f64>,
}

impl Species {
    /// Creates a new, empty species with the
    /// specified representative.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, Genome, History};
    /// use layered_neat::populations::Species;
    ///
    /// let config = GeneticConfig::zero();
    /// let mut history = History::new(&config);
    /// let species = Species::new(Genome::new(&config, &mut history));
    ///
    /// assert_eq!(species.member_count(), 0);
    /// assert!(species.fitness_history().is_empty());
    /// ```
    pub fn new(representative: Genome) -> Species {
        Species {
            representative,
            member_count: 0,
            offspring_quota: 0,
            fitness_history: vec![],
        }
    }

    /// Returns the species' representative.
    pub fn representative(&self) -> &Genome {
        &self.representative
    }

    /// Returns the number of genomes assigned to the
    /// species in the latest speciation.
    pub fn member_count(&self) -> usize {
        self.member_count
    }

    /// Returns the number of offspring allotted to
    /// the species in the latest generation.
    pub fn offspring_quota(&self) -> usize {
        self.offspring_quota
    }

    /// Returns the mean raw fitness of the species'
    /// members, one entry per generation it has lived.
    pub fn fitness_history(&self) -> &[f64] {
        &self.fitness_history
    }

    /// Returns whether the species' mean fitness has failed
    /// to exceed the value recorded `window` generations ago
    /// at any point since. A species younger than `window + 1`
    /// generations is never stagnant.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, Genome, History};
    /// use layered_neat::populations::Species;
    ///
    /// let config = GeneticConfig::zero();
    /// let mut history = History::new(&config);
    /// let species = Species::new(Genome::new(&config, &mut history));
    ///
    /// assert!(!species.is_stagnant(10));
    /// ```
    pub fn is_stagnant(&self, window: usize) -> bool {
        let log = &self.fitness_history;
        if log.len() <= window {
            return false;
        }
        let (before, recent) = log.split_at(log.len() - window);
        let baseline = before[before.len() - 1];
        recent.iter().all(|&fitness| fitness <= baseline)
    }
}
