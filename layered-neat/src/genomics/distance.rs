use super::{DistanceError, GeneticConfig, Genome};
use crate::Innovation;

impl Genome {
    /// Calculates the _compatibility distance_ between `self`
    /// and `other`, weighting disjoint genes, excess genes and
    /// the average weight difference of matching genes as
    /// specified in `config`.
    ///
    /// Genes are aligned by innovation number. A gene present
    /// in only one genome is disjoint if its innovation number
    /// is lower than the other genome's highest, and excess
    /// otherwise. Disjoint and excess counts are normalised by
    /// the size of the larger genome.
    ///
    /// # Errors
    /// Returns an error if the genomes share no genes, as the
    /// average weight difference is then undefined.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{Gene, GeneticConfig, Genome};
    ///
    /// let config = GeneticConfig {
    ///     disjoint_gene_factor: 1.0,
    ///     excess_gene_factor: 2.0,
    ///     common_weight_factor: 0.5,
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// let genome1 = Genome::from_genes(
    ///     vec![
    ///         Gene::new(0, 0, 1, 1.0),
    ///         Gene::new(1, 0, 2, 1.0),
    ///         Gene::new(2, 2, 1, 1.0),
    ///         Gene::new(5, 2, 2, 1.0),
    ///     ],
    ///     1,
    ///     1,
    /// );
    /// let genome2 = Genome::from_genes(
    ///     vec![
    ///         Gene::new(0, 0, 1, -1.0),
    ///         Gene::new(3, 0, 3, 1.0),
    ///         Gene::new(4, 3, 1, 1.0),
    ///     ],
    ///     1,
    ///     1,
    /// );
    ///
    /// // One match (weight difference 2), genes 1, 2, 3 and 4 are disjoint, gene 5 is excess.
    /// let distance = genome1.compatibility_distance(&genome2, &config).unwrap();
    /// assert_eq!(distance, 1.0 * 4.0 / 4.0 + 2.0 * 1.0 / 4.0 + 0.5 * 2.0);
    /// ```
    pub fn compatibility_distance(
        &self,
        other: &Genome,
        config: &GeneticConfig,
    ) -> Result<f64, DistanceError> {
        let first = self.innovations_and_weights();
        let second = other.innovations_and_weights();
        let (first_max, second_max) = match (first.last(), second.last()) {
            (Some(&(a, _)), Some(&(b, _))) => (a, b),
            _ => return Err(DistanceError::EmptyAlignmentWindow),
        };

        let mut matching = 0usize;
        let mut weight_difference = 0.0;
        let mut disjoint = 0usize;
        let mut excess = 0usize;
        let mut classify = |innovation: Innovation, other_max: Innovation| {
            if innovation < other_max {
                disjoint += 1;
            } else {
                excess += 1;
            }
        };

        let (mut i, mut j) = (0, 0);
        while i < first.len() && j < second.len() {
            let ((a, weight_a), (b, weight_b)) = (first[i], second[j]);
            if a == b {
                matching += 1;
                weight_difference += (weight_a - weight_b).abs();
                i += 1;
                j += 1;
            } else if a < b {
                classify(a, second_max);
                i += 1;
            } else {
                classify(b, first_max);
                j += 1;
            }
        }
        first[i..].iter().for_each(|&(a, _)| classify(a, second_max));
        second[j..].iter().for_each(|&(b, _)| classify(b, first_max));

        if matching == 0 {
            return Err(DistanceError::EmptyAlignmentWindow);
        }

        let size = first.len().max(second.len()) as f64;
        Ok(config.disjoint_gene_factor * disjoint as f64 / size
            + config.excess_gene_factor * excess as f64 / size
            + config.common_weight_factor * weight_difference / matching as f64)
    }

    /// Returns whether `other` is within `threshold` of
    /// `self`. Genomes whose distance is undefined are
    /// never compatible.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, Genome, History};
    ///
    /// let config = GeneticConfig::default();
    /// let mut history = History::new(&config);
    /// let genome = Genome::new(&config, &mut history);
    ///
    /// assert!(genome.is_compatible(&genome, &config, 0.0));
    /// ```
    pub fn is_compatible(&self, other: &Genome, config: &GeneticConfig, threshold: f64) -> bool {
        matches!(
            self.compatibility_distance(other, config),
            Ok(distance) if distance <= threshold
        )
    }

    /// Innovation-sorted `(innovation, weight)` pairs.
    fn innovations_and_weights(&self) -> Vec<(Innovation, f64)> {
        let mut pairs: Vec<_> = self
            .genes
            .iter()
            .map(|g| (g.innovation(), g.weight()))
            .collect();
        pairs.sort_unstable_by_key(|&(innovation, _)| innovation);
        pairs
    }
}
