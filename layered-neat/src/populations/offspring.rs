use super::{PopulationConfig, Species};
use crate::genomics::{GeneticConfig, Genome, History};

use rand::prelude::{Rng, SliceRandom};

/// Allots the number of offspring each species will
/// breed, so that the quotas add up to `size`.
///
/// Each species receives offspring in proportion to the
/// sum of its members' shared fitness, relative to the
/// population average. If the average is not positive
/// (e.g., every genome scored 0), quotas follow member
/// counts instead. Stagnant species have their quota
/// scaled by `stagnation_penalty`. Any rounding surplus
/// or deficit is then settled one offspring at a time on
/// randomly chosen species holding a nonzero quota.
pub(super) fn allot_offspring(
    shared_fitness_sums: &[f64],
    member_counts: &[usize],
    stagnant: &[bool],
    size: usize,
    stagnation_penalty: f64,
    rng: &mut impl Rng,
) -> Vec<usize> {
    let average = shared_fitness_sums.iter().sum::<f64>() / size as f64;
    let mut quotas: Vec<usize> = if average > 0.0 && average.is_finite() {
        shared_fitness_sums
            .iter()
            .map(|sum| (sum / average).round() as usize)
            .collect()
    } else {
        let members: usize = member_counts.iter().sum();
        member_counts
            .iter()
            .map(|&count| (count as f64 * size as f64 / members as f64).round() as usize)
            .collect()
    };

    for (quota, &is_stagnant) in quotas.iter_mut().zip(stagnant) {
        if is_stagnant {
            *quota = (*quota as f64 * stagnation_penalty).round() as usize;
        }
    }

    let mut total: usize = quotas.iter().sum();
    while total != size {
        let eligible: Vec<usize> = (0..quotas.len()).filter(|&i| quotas[i] > 0).collect();
        if total < size {
            let species = match eligible.choose(rng) {
                Some(&i) => i,
                None => rng.gen_range(0..quotas.len()),
            };
            quotas[species] += 1;
            total += 1;
        } else {
            // A surplus implies some quota is nonzero.
            let &species = eligible
                .choose(rng)
                .unwrap_or_else(|| panic!("offspring surplus with all quotas at zero"));
            quotas[species] -= 1;
            total -= 1;
        }
    }
    quotas
}

/// Auxiliary type for offspring generation.
/// Handles all the tasks of breeding a population's
/// offspring according to the specified configs
/// and allotted quotas.
pub(super) struct OffspringFactory<'a, R> {
    genomes: &'a [Genome],
    history: &'a mut History,
    genetic_config: &'a GeneticConfig,
    population_config: &'a PopulationConfig,
    rng: &'a mut R,
}

impl<'a, R: Rng> OffspringFactory<'a, R> {
    pub(super) fn new(
        genomes: &'a [Genome],
        history: &'a mut History,
        genetic_config: &'a GeneticConfig,
        population_config: &'a PopulationConfig,
        rng: &'a mut R,
    ) -> OffspringFactory<'a, R> {
        OffspringFactory {
            genomes,
            history,
            genetic_config,
            population_config,
            rng,
        }
    }

    /// Breeds each species' allotted offspring from its
    /// `survivors` (indices into the genome pool, best first).
    ///
    /// Species large enough for elitism pass on their best
    /// survivor unchanged, counted against their quota. Every
    /// other child is either the crossover of two survivors
    /// or a copy of one, and is mutated before being added.
    pub(super) fn generate_offspring(
        &mut self,
        species: &[Species],
        survivors: &[Vec<usize>],
    ) -> Vec<Genome> {
        let mut offspring = Vec::with_capacity(self.population_config.size.get());
        for (current, survivors) in species.iter().zip(survivors) {
            let mut quota = current.offspring_quota;
            if quota == 0 || survivors.is_empty() {
                continue;
            }
            if current.member_count >= self.population_config.elitism_min_size {
                offspring.push(self.genomes[survivors[0]].clone());
                quota -= 1;
            }
            for _ in 0..quota {
                let mut child = self.breed(survivors);
                child.mutate(self.history, self.genetic_config, self.rng);
                offspring.push(child);
            }
        }
        offspring
    }

    /// Produces a single unmutated child from
    /// a species' surviving members.
    fn breed(&mut self, survivors: &[usize]) -> Genome {
        let genomes = self.genomes;
        let parent1 = &genomes[self.choose_parent(survivors)];
        if self.rng.gen::<f64>() < self.population_config.crossover_chance {
            let parent2 = &genomes[self.choose_parent(survivors)];
            parent1.crossover(parent2, self.genetic_config, self.rng)
        } else {
            parent1.clone()
        }
    }

    fn choose_parent(&mut self, survivors: &[usize]) -> usize {
        *survivors
            .choose(self.rng)
            .unwrap_or_else(|| panic!("no eligible parents among survivors"))
    }
}
