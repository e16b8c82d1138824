use super::{Gene, GeneticConfig, Genome};
use crate::Innovation;

use ahash::RandomState;
use rand::Rng;

use std::collections::HashMap;

impl Genome {
    /// Mates `self` with `other`, producing a child genome.
    ///
    /// Genes are aligned by innovation number. Matching genes
    /// are inherited from either parent with equal probability,
    /// while disjoint and excess genes are inherited only from
    /// the fitter parent (chosen at random if both are equally
    /// fit). A gene disabled in either parent is disabled in the
    /// child with probability [`disabled_inheritance_chance`],
    /// and enabled otherwise.
    ///
    /// The child's nodes are rebuilt from its genes, and
    /// its fitness is reset.
    ///
    /// [`disabled_inheritance_chance`]: GeneticConfig::disabled_inheritance_chance
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, Genome, History};
    ///
    /// let config = GeneticConfig {
    ///     weight_bound: 1.0,
    ///     ..GeneticConfig::default()
    /// };
    /// let mut rng = rand::thread_rng();
    /// let mut history = History::new(&config);
    ///
    /// let mut fitter = Genome::random(&config, &mut history, &mut rng);
    /// fitter.mutate_add_node(&mut history, &mut rng).unwrap();
    /// fitter.set_fitness(10.0);
    /// let weaker = Genome::random(&config, &mut history, &mut rng);
    ///
    /// let child = fitter.crossover(&weaker, &config, &mut rng);
    ///
    /// // All structure comes from the fitter parent.
    /// assert_eq!(child.genes().len(), fitter.genes().len());
    /// assert_eq!(child.hidden_node_count(), 1);
    /// ```
    pub fn crossover(&self, other: &Genome, config: &GeneticConfig, rng: &mut impl Rng) -> Genome {
        let (fitter, weaker) = if self.fitness > other.fitness {
            (self, other)
        } else if other.fitness > self.fitness {
            (other, self)
        } else if rng.gen::<bool>() {
            (self, other)
        } else {
            (other, self)
        };

        let weaker_genes: HashMap<Innovation, &Gene, RandomState> = weaker
            .genes
            .iter()
            .map(|g| (g.innovation(), g))
            .collect();

        let mut genes = Vec::with_capacity(fitter.genes.len());
        for gene in &fitter.genes {
            let (mut child_gene, disabled) = match weaker_genes.get(&gene.innovation()) {
                Some(&matching) => {
                    let disabled = !gene.enabled() || !matching.enabled();
                    let inherited = if rng.gen::<bool>() { gene } else { matching };
                    (inherited.clone(), disabled)
                }
                None => (gene.clone(), !gene.enabled()),
            };
            if disabled {
                child_gene.set_enabled(rng.gen::<f64>() >= config.disabled_inheritance_chance);
            }
            genes.push(child_gene);
        }
        genes.sort_unstable_by_key(Gene::innovation);

        Genome::from_genes(genes, fitter.input_count, fitter.output_count)
    }
}
