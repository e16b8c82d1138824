use crate::genomics::GeneticConfig;
use crate::{Innovation, NodeId};

use rand::Rng;
use serde::{Deserialize, Serialize};

use std::fmt;

/// Genes are the connections of a genome's network.
/// They are identified structurally by their endpoints,
/// and historically by their innovation number, which
/// is shared by every gene with the same endpoints in
/// an evolutionary run.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Gene {
    innovation: Innovation,
    source: NodeId,
    target: NodeId,
    weight: f64,
    enabled: bool,
    recursive: bool,
    #[serde(skip)]
    pub(super) value: f64,
}

impl Gene {
    /// Returns a new enabled, non-recursive gene with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::Gene;
    ///
    /// let gene = Gene::new(42, 3, 9, 2.0);
    /// assert!(gene.enabled());
    /// assert!(!gene.recursive());
    /// ```
    pub fn new(innovation: Innovation, source: NodeId, target: NodeId, weight: f64) -> Gene {
        Gene {
            innovation,
            source,
            target,
            weight,
            enabled: true,
            recursive: false,
            value: 0.0,
        }
    }

    /// Returns a random weight, uniformly distributed
    /// over the range ±[`weight_bound`].
    ///
    /// [`weight_bound`]: crate::genomics::GeneticConfig::weight_bound
    pub(super) fn random_weight(config: &GeneticConfig, rng: &mut impl Rng) -> f64 {
        rng.gen_range(-config.weight_bound..=config.weight_bound)
    }

    /// Replaces the gene's weight with a value drawn
    /// uniformly from ±[`weight_bound`].
    ///
    /// [`weight_bound`]: crate::genomics::GeneticConfig::weight_bound
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{Gene, GeneticConfig};
    ///
    /// let mut gene = Gene::new(42, 3, 9, 20.0);
    ///
    /// gene.randomize_weight(
    ///     &GeneticConfig {
    ///         weight_bound: 5.0,
    ///         ..GeneticConfig::zero()
    ///     },
    ///     &mut rand::thread_rng(),
    /// );
    ///
    /// assert!(gene.weight().abs() <= 5.0);
    /// ```
    pub fn randomize_weight(&mut self, config: &GeneticConfig, rng: &mut impl Rng) {
        self.weight = Self::random_weight(config, rng);
    }

    /// Nudges the gene's weight by a random amount drawn
    /// uniformly from ±[`weight_mutation_power`]. The result
    /// is not clamped.
    ///
    /// [`weight_mutation_power`]: crate::genomics::GeneticConfig::weight_mutation_power
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{Gene, GeneticConfig};
    ///
    /// let mut gene = Gene::new(42, 3, 9, 3.0);
    ///
    /// gene.nudge_weight(
    ///     &GeneticConfig {
    ///         weight_mutation_power: 2.5,
    ///         ..GeneticConfig::zero()
    ///     },
    ///     &mut rand::thread_rng(),
    /// );
    ///
    /// assert!((gene.weight() - 3.0).abs() <= 2.5);
    /// ```
    pub fn nudge_weight(&mut self, config: &GeneticConfig, rng: &mut impl Rng) {
        self.weight +=
            rng.gen_range(-config.weight_mutation_power..=config.weight_mutation_power);
    }

    /// Returns the gene's innovation number.
    pub fn innovation(&self) -> Innovation {
        self.innovation
    }

    /// Returns the gene's source node.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Returns the gene's target node.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Returns the gene's endpoints, as `(source, target)`.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::Gene;
    ///
    /// let gene = Gene::new(42, 3, 9, 2.0);
    /// assert_eq!(gene.endpoints(), (3, 9));
    /// ```
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.source, self.target)
    }

    /// Returns the gene's weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Sets the gene's weight.
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Returns whether the gene is enabled. Disabled
    /// genes carry no signal and take no part in layering.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables the gene.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns whether the gene is a feedback connection.
    /// Recursive genes deliver their signal one
    /// evaluation late and take no part in layering.
    pub fn recursive(&self) -> bool {
        self.recursive
    }

    /// Marks the gene as recursive or not.
    pub fn set_recursive(&mut self, recursive: bool) {
        self.recursive = recursive;
    }

    /// Returns the signal propagated through the
    /// gene during the last evaluation.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether the gene takes part in topological
    /// placement of its target.
    pub(super) fn is_feedforward(&self) -> bool {
        self.enabled && !self.recursive
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>4}] {:>4} -> {:<4} {:>+9.4}{}{}",
            self.innovation,
            self.source,
            self.target,
            self.weight,
            if self.enabled { "" } else { " (disabled)" },
            if self.recursive { " (recursive)" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_weights_stay_in_bound() {
        let config = GeneticConfig {
            weight_bound: 0.5,
            ..GeneticConfig::zero()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut gene = Gene::new(0, 0, 1, 100.0);
        for _ in 0..1000 {
            gene.randomize_weight(&config, &mut rng);
            assert!(gene.weight().abs() <= 0.5);
        }
    }

    #[test]
    fn nudged_weights_stay_near_previous() {
        let config = GeneticConfig {
            weight_mutation_power: 0.25,
            ..GeneticConfig::zero()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let mut gene = Gene::new(0, 0, 1, 0.0);
        for _ in 0..1000 {
            let previous = gene.weight();
            gene.nudge_weight(&config, &mut rng);
            assert!((gene.weight() - previous).abs() <= 0.25);
        }
    }

    #[test]
    fn zero_bound_yields_zero_weight() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut gene = Gene::new(0, 0, 1, 3.0);
        gene.randomize_weight(&GeneticConfig::zero(), &mut rng);
        assert_eq!(gene.weight(), 0.0);
    }

    #[test]
    fn feedforward_requires_enabled_and_non_recursive() {
        let mut gene = Gene::new(0, 0, 1, 1.0);
        assert!(gene.is_feedforward());
        gene.set_recursive(true);
        assert!(!gene.is_feedforward());
        gene.set_recursive(false);
        gene.set_enabled(false);
        assert!(!gene.is_feedforward());
    }

    #[test]
    fn value_is_not_serialized() {
        let mut gene = Gene::new(3, 0, 1, 1.5);
        gene.value = 9.0;
        let restored: Gene = serde_json::from_str(&serde_json::to_string(&gene).unwrap()).unwrap();
        assert_eq!(restored.value(), 0.0);
        assert_eq!(restored.weight(), 1.5);
        assert_eq!(restored.innovation(), 3);
    }
}
