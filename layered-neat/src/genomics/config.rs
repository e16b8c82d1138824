use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for genome generation,
/// mutation and inter-genome operations.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]. Using
/// values that are not in this bound may result
/// in odd behaviours and/or incorrect programs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Number of inputs in a genome. A bias input,
    /// if desired, must be counted here and fed by
    /// the evaluator.
    pub input_count: NonZeroUsize,
    /// Number of outputs in a genome.
    pub output_count: NonZeroUsize,
    /// Magnitude of the bound on the uniform distribution
    /// used for initial and reset gene weights.
    pub weight_bound: f64,
    /// Magnitude of the bound on the uniform distribution
    /// used to perturb gene weights.
    pub weight_mutation_power: f64,
    /// Chance of weight mutation taking place during
    /// a call to [`Genome::mutate`].
    ///
    /// [`Genome::mutate`]: crate::genomics::Genome::mutate
    pub weight_mutation_chance: f64,
    /// Chance of a single gene's weight being perturbed
    /// during weight mutation, instead of being replaced.
    pub weight_nudge_chance: f64,
    /// Chance of a node addition mutation taking place during
    /// a call to [`Genome::mutate`].
    ///
    /// [`Genome::mutate`]: crate::genomics::Genome::mutate
    pub node_addition_mutation_chance: f64,
    /// Chance of a gene addition mutation being attempted during
    /// a call to [`Genome::mutate`].
    ///
    /// [`Genome::mutate`]: crate::genomics::Genome::mutate
    pub gene_addition_mutation_chance: f64,
    /// Chance that a gene disabled in either parent
    /// is disabled in the child during crossover.
    pub disabled_inheritance_chance: f64,
    /// Weight of disjoint genes in compatibility distance.
    pub disjoint_gene_factor: f64,
    /// Weight of excess genes in compatibility distance.
    pub excess_gene_factor: f64,
    /// Weight of the average common gene weight difference
    /// in compatibility distance.
    pub common_weight_factor: f64,
}

impl GeneticConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to fill in unused values during
    /// configuration instantiation.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::GeneticConfig;
    ///
    /// let cfg1 = GeneticConfig::zero();
    ///
    /// let cfg2 = GeneticConfig {
    ///     // Specify some values here...
    ///     weight_bound: 1.0,
    ///     node_addition_mutation_chance: 1.0,
    ///     // Default the rest...
    ///     ..GeneticConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            // SAFETY: 1 is a valid NonZeroUsize.
            input_count: unsafe { NonZeroUsize::new_unchecked(1) },
            output_count: unsafe { NonZeroUsize::new_unchecked(1) },
            weight_bound: 0.0,
            weight_mutation_power: 0.0,
            weight_mutation_chance: 0.0,
            weight_nudge_chance: 0.0,
            node_addition_mutation_chance: 0.0,
            gene_addition_mutation_chance: 0.0,
            disabled_inheritance_chance: 0.0,
            disjoint_gene_factor: 0.0,
            excess_gene_factor: 0.0,
            common_weight_factor: 0.0,
        }
    }
}

impl Default for GeneticConfig {
    /// The standard experiment configuration: three inputs
    /// (two signals plus bias), one output, and the classic
    /// NEAT mutation rates and distance coefficients.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::GeneticConfig;
    ///
    /// let config = GeneticConfig::default();
    /// assert_eq!(config.input_count.get(), 3);
    /// assert_eq!(config.disjoint_gene_factor, 2.0);
    /// ```
    fn default() -> GeneticConfig {
        GeneticConfig {
            // SAFETY: 3 and 1 are valid NonZeroUsizes.
            input_count: unsafe { NonZeroUsize::new_unchecked(3) },
            output_count: unsafe { NonZeroUsize::new_unchecked(1) },
            weight_bound: 1.0,
            weight_mutation_power: 1.0,
            weight_mutation_chance: 0.8,
            weight_nudge_chance: 0.98,
            node_addition_mutation_chance: 0.03,
            gene_addition_mutation_chance: 0.05,
            disabled_inheritance_chance: 0.75,
            disjoint_gene_factor: 2.0,
            excess_gene_factor: 2.0,
            common_weight_factor: 1.2,
        }
    }
}
