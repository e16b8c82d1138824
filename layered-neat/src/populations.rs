//! A Population is a collection of genomes.
//! These are grouped into species, which are
//! evolved using one [`Evaluator`] per genome
//! as the source of selective pressure.
mod config;
mod errors;
mod evaluation;
mod logging;
mod offspring;
mod species;

use crate::genomics::{GeneticConfig, Genome, History};
pub use config::PopulationConfig;
pub use errors::PopulationError;
pub use evaluation::{Evaluator, ParallelEvaluator};
pub use logging::GenerationLog;
use offspring::{allot_offspring, OffspringFactory};
pub use species::Species;

use rand::prelude::{SeedableRng, SliceRandom};
use rand::rngs::StdRng;

/// Amount the distance threshold moves per
/// species of difference from the target count.
const THRESHOLD_STEP: f64 = 0.1;
const MIN_DISTANCE_THRESHOLD: f64 = 0.5;
const MAX_DISTANCE_THRESHOLD: f64 = 100.0;

/// A population of genomes, each paired with its own evaluator.
///
/// Genomes are stored in a single pool, and refer to their
/// species by index. A generation consists of a call to
/// [`evaluate`](Population::evaluate) followed by one to
/// [`produce_next_generation`](Population::produce_next_generation).
pub struct Population<E> {
    genomes: Vec<Genome>,
    evaluators: Vec<E>,
    species: Vec<Species>,
    history: History,
    generation: usize,
    distance_threshold: f64,
    population_config: PopulationConfig,
    genetic_config: GeneticConfig,
    workers: ParallelEvaluator,
    rng: StdRng,
}

impl<E: Evaluator> Population<E> {
    /// Creates a new population of randomly weighted, fully
    /// connected genomes, pairing the `i`th genome with
    /// the `i`th evaluator.
    ///
    /// # Errors
    /// Returns an error if the number of evaluators differs
    /// from the configured population size, or if the
    /// evaluation worker pool cannot be started.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::GeneticConfig;
    /// use layered_neat::populations::{Evaluator, Population, PopulationConfig};
    /// use std::num::NonZeroUsize;
    ///
    /// struct Constant;
    ///
    /// impl Evaluator for Constant {
    ///     fn inputs(&mut self) -> &[f64] {
    ///         &[1.0, 0.5, 0.25]
    ///     }
    ///     fn update(&mut self, _outputs: &[f64]) {}
    ///     fn fitness(&self) -> f64 {
    ///         1.0
    ///     }
    ///     fn reset(&mut self) {}
    /// }
    ///
    /// let pop_config = PopulationConfig {
    ///     size: NonZeroUsize::new(20).unwrap(),
    ///     ..PopulationConfig::default()
    /// };
    /// let evaluators = (0..20).map(|_| Constant).collect();
    /// let population = Population::new(pop_config, GeneticConfig::default(), evaluators).unwrap();
    ///
    /// assert_eq!(population.genomes().len(), 20);
    /// ```
    pub fn new(
        population_config: PopulationConfig,
        genetic_config: GeneticConfig,
        evaluators: Vec<E>,
    ) -> Result<Population<E>, PopulationError> {
        let size = population_config.size.get();
        if evaluators.len() != size {
            return Err(PopulationError::EvaluatorCountMismatch {
                genomes: size,
                evaluators: evaluators.len(),
            });
        }
        let workers = ParallelEvaluator::new(population_config.worker_threads)?;
        let mut rng = match population_config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut history = History::new(&genetic_config);
        let genomes = (0..size)
            .map(|_| Genome::random(&genetic_config, &mut history, &mut rng))
            .collect();

        Ok(Population {
            genomes,
            evaluators,
            species: vec![],
            history,
            generation: 0,
            distance_threshold: population_config.distance_threshold,
            population_config,
            genetic_config,
            workers,
            rng,
        })
    }

    /// Drives every genome with its evaluator for `steps`
    /// steps across the worker pool, storing the
    /// resulting fitnesses. Blocks until all workers finish.
    ///
    /// # Errors
    /// Returns an error if an evaluator supplies the
    /// wrong number of inputs.
    ///
    /// # Panics
    /// Panics if an evaluator reports a negative or NaN fitness.
    pub fn evaluate(&mut self, steps: usize) -> Result<(), PopulationError> {
        self.workers
            .evaluate(&mut self.genomes, &mut self.evaluators, steps)?;
        Ok(())
    }

    /// Same as [`evaluate`](Population::evaluate), but runs
    /// every evaluator on the calling thread.
    pub fn evaluate_sequential(&mut self, steps: usize) -> Result<(), PopulationError> {
        evaluation::evaluate_sequential(&mut self.genomes, &mut self.evaluators, steps)?;
        Ok(())
    }

    /// Replaces the evaluated population with its offspring.
    ///
    /// Genomes are speciated against the current representatives
    /// (adjusting the distance threshold towards the target
    /// species count), new representatives are drawn, fitness
    /// is shared within each species and species' fitness logs
    /// are updated. Offspring are then allotted per species,
    /// the worst of each species culled, and the survivors bred.
    /// Any shortfall is filled with fresh random genomes. Every
    /// offspring starts with cleared network state, and all
    /// evaluators are reset.
    ///
    /// Returns a summary of the population as it was evaluated.
    ///
    /// # Panics
    /// Panics if any genome's fitness is NaN.
    pub fn produce_next_generation(&mut self) -> GenerationLog {
        self.speciate();
        let members = self.members();
        self.choose_representatives(&members);
        self.share_fitness();
        self.record_species_fitness(&members);

        let log = self.summarize();
        log::info!(
            "generation {}: max fitness {:.4}, mean fitness {:.4}, {} species",
            log.generation,
            log.max_fitness,
            log.mean_fitness,
            log.species_count
        );

        self.assign_offspring_quotas(&members);
        let survivors = self.cull(&members);
        let mut offspring = OffspringFactory::new(
            &self.genomes,
            &mut self.history,
            &self.genetic_config,
            &self.population_config,
            &mut self.rng,
        )
        .generate_offspring(&self.species, &survivors);
        self.backfill(&mut offspring);
        offspring.iter_mut().for_each(Genome::reset_state);

        self.genomes = offspring;
        self.evaluators.iter_mut().for_each(Evaluator::reset);
        self.generation += 1;
        log
    }

    /// Evaluates the population for `steps` steps, then
    /// produces the next generation.
    ///
    /// # Errors
    /// Returns an error if evaluation fails, in which
    /// case no new generation is produced.
    pub fn run_generation(&mut self, steps: usize) -> Result<GenerationLog, PopulationError> {
        self.evaluate(steps)?;
        Ok(self.produce_next_generation())
    }

    /// Assigns every genome to the first species whose
    /// representative is within the distance threshold,
    /// founding a new species if none is. Species left
    /// without members are removed, after which the
    /// threshold is nudged towards the target species count.
    fn speciate(&mut self) {
        for species in &mut self.species {
            species.member_count = 0;
        }
        for genome in &mut self.genomes {
            let compatible = self.species.iter().position(|s| {
                genome.is_compatible(
                    &s.representative,
                    &self.genetic_config,
                    self.distance_threshold,
                )
            });
            let index = match compatible {
                Some(index) => index,
                None => {
                    self.species.push(Species::new(genome.clone()));
                    self.species.len() - 1
                }
            };
            genome.species = index;
            self.species[index].member_count += 1;
        }

        let mut remapped = Vec::with_capacity(self.species.len());
        let mut surviving = 0;
        for species in &self.species {
            remapped.push(surviving);
            if species.member_count > 0 {
                surviving += 1;
            }
        }
        if surviving < self.species.len() {
            log::debug!("{} species went extinct", self.species.len() - surviving);
        }
        self.species.retain(|s| s.member_count > 0);
        for genome in &mut self.genomes {
            genome.species = remapped[genome.species];
        }

        let error = self.population_config.target_species as f64 - self.species.len() as f64;
        self.distance_threshold = (self.distance_threshold - THRESHOLD_STEP * error)
            .clamp(MIN_DISTANCE_THRESHOLD, MAX_DISTANCE_THRESHOLD);
        log::debug!(
            "{} species, distance threshold now {:.2}",
            self.species.len(),
            self.distance_threshold
        );
    }

    /// Indices of each species' members in the genome pool.
    fn members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![vec![]; self.species.len()];
        for (index, genome) in self.genomes.iter().enumerate() {
            members[genome.species].push(index);
        }
        members
    }

    fn choose_representatives(&mut self, members: &[Vec<usize>]) {
        for (species, members) in self.species.iter_mut().zip(members) {
            let &chosen = members
                .choose(&mut self.rng)
                .unwrap_or_else(|| panic!("species without members survived speciation"));
            species.representative = self.genomes[chosen].clone();
        }
    }

    /// Divides each genome's fitness by its species' size.
    fn share_fitness(&mut self) {
        for genome in &mut self.genomes {
            genome.shared_fitness = genome.fitness / self.species[genome.species].member_count as f64;
        }
    }

    /// Appends each species' mean raw fitness to its log.
    fn record_species_fitness(&mut self, members: &[Vec<usize>]) {
        for (species, members) in self.species.iter_mut().zip(members) {
            let total: f64 = members.iter().map(|&i| self.genomes[i].fitness).sum();
            species.fitness_history.push(total / members.len() as f64);
        }
    }

    fn assign_offspring_quotas(&mut self, members: &[Vec<usize>]) {
        let shared_fitness_sums: Vec<f64> = members
            .iter()
            .map(|m| m.iter().map(|&i| self.genomes[i].shared_fitness).sum())
            .collect();
        let member_counts: Vec<usize> = self.species.iter().map(Species::member_count).collect();
        let window = self.population_config.stagnation_window;
        let stagnant: Vec<bool> = self.species.iter().map(|s| s.is_stagnant(window)).collect();

        let quotas = allot_offspring(
            &shared_fitness_sums,
            &member_counts,
            &stagnant,
            self.population_config.size.get(),
            self.population_config.stagnation_penalty,
            &mut self.rng,
        );
        for (species, quota) in self.species.iter_mut().zip(quotas) {
            species.offspring_quota = quota;
        }
        log::debug!(
            "offspring quotas: {:?}",
            self.species.iter().map(Species::offspring_quota).collect::<Vec<_>>()
        );
    }

    /// Returns the members of each species allowed to
    /// reproduce, in decreasing order of shared fitness.
    fn cull(&self, members: &[Vec<usize>]) -> Vec<Vec<usize>> {
        let discard_fraction = 1.0 - self.population_config.survival_threshold;
        members
            .iter()
            .map(|members| {
                let mut survivors = members.clone();
                survivors.sort_by(|&a, &b| {
                    self.genomes[b]
                        .shared_fitness
                        .partial_cmp(&self.genomes[a].shared_fitness)
                        .unwrap_or_else(|| panic!("invalid genome fitnesses detected (NaN)"))
                });
                let discarded = (survivors.len() as f64 * discard_fraction) as usize;
                survivors.truncate(survivors.len().saturating_sub(discarded));
                survivors
            })
            .collect()
    }

    /// Tops up `offspring` with random genomes
    /// until it reaches the population size.
    fn backfill(&mut self, offspring: &mut Vec<Genome>) {
        let size = self.population_config.size.get();
        if offspring.len() < size {
            log::debug!("backfilling {} random genomes", size - offspring.len());
        }
        while offspring.len() < size {
            offspring.push(Genome::random(
                &self.genetic_config,
                &mut self.history,
                &mut self.rng,
            ));
        }
    }

    fn summarize(&self) -> GenerationLog {
        let size = self.genomes.len() as f64;
        GenerationLog {
            generation: self.generation,
            mean_fitness: self.genomes.iter().map(Genome::fitness).sum::<f64>() / size,
            mean_hidden_nodes: self
                .genomes
                .iter()
                .map(|g| g.hidden_node_count() as f64)
                .sum::<f64>()
                / size,
            species_count: self.species.len(),
            distance_threshold: self.distance_threshold,
            max_fitness: self.champion().fitness(),
            gene_count: self.history.len(),
        }
    }

    /// Returns the best performing genome of the
    /// latest evaluation.
    ///
    /// # Panics
    /// Panics if any genome's fitness is NaN.
    pub fn champion(&self) -> &Genome {
        self.genomes
            .iter()
            .max_by(|g1, g2| {
                g1.fitness()
                    .partial_cmp(&g2.fitness())
                    .unwrap_or_else(|| panic!("invalid genome fitnesses detected (NaN)"))
            })
            .expect("empty population has no champion")
    }

    /// Returns all current genomes.
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Returns the species found in the latest speciation.
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Returns the evaluators, in the order of
    /// the genomes they are paired with.
    pub fn evaluators(&self) -> &[E] {
        &self.evaluators
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the population's innovation history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns the current compatibility distance threshold.
    pub fn distance_threshold(&self) -> f64 {
        self.distance_threshold
    }
}
