use layered_neat::genomics::{GeneticConfig, Genome};
use layered_neat::populations::{Evaluator, Population, PopulationConfig};

use tracing_subscriber::EnvFilter;

use std::error::Error;
use std::num::NonZeroUsize;

/// Bias, first operand, second operand; expected output.
static CASES: [([f64; 3], f64); 4] = [
    ([1.0, 0.0, 0.0], 0.0),
    ([1.0, 0.0, 1.0], 1.0),
    ([1.0, 1.0, 0.0], 1.0),
    ([1.0, 1.0, 1.0], 0.0),
];

const POPULATION_SIZE: usize = 150;
const GENERATION_LIMIT: usize = 500;
const ERROR_MARGIN: f64 = 0.5;

/// Feeds the four XOR cases in order, scoring
/// `1 - error²` per case.
#[derive(Debug, Default)]
struct XorEvaluator {
    step: usize,
    fitness: f64,
}

impl Evaluator for XorEvaluator {
    fn inputs(&mut self) -> &[f64] {
        &CASES[self.step % CASES.len()].0
    }

    fn update(&mut self, outputs: &[f64]) {
        let expected = CASES[self.step % CASES.len()].1;
        self.fitness += 1.0 - (expected - outputs[0]).powi(2);
        self.step += 1;
    }

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn reset(&mut self) {
        *self = XorEvaluator::default();
    }
}

/// Whether `genome` classifies every case within the error margin.
fn solves_xor(genome: &Genome) -> bool {
    let mut genome = genome.clone();
    genome.reset_state();
    CASES.iter().all(|(inputs, expected)| match genome.evaluate(inputs) {
        Ok(outputs) => (outputs[0] - expected).abs() < ERROR_MARGIN,
        Err(_) => false,
    })
}

/// Evolves a population until its champion solves XOR, returning
/// the generation it was found in along with the champion.
fn run(
    population_config: &PopulationConfig,
    genetic_config: &GeneticConfig,
) -> Result<Option<(usize, Genome)>, Box<dyn Error>> {
    let evaluators = (0..population_config.size.get())
        .map(|_| XorEvaluator::default())
        .collect();
    let mut population = Population::new(
        population_config.clone(),
        genetic_config.clone(),
        evaluators,
    )?;

    println!("{}", layered_neat::populations::GenerationLog::header());
    for _ in 0..GENERATION_LIMIT {
        population.evaluate(CASES.len())?;
        if solves_xor(population.champion()) {
            return Ok(Some((population.generation(), population.champion().clone())));
        }
        println!("{}", population.produce_next_generation());
    }
    Ok(None)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let runs: usize = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 1,
    };

    let genetic_config = GeneticConfig::default();
    let population_config = PopulationConfig {
        size: NonZeroUsize::new(POPULATION_SIZE).ok_or("population size must be nonzero")?,
        ..PopulationConfig::default()
    };

    let mut solved_generations = vec![];
    for run_index in 0..runs {
        match run(&population_config, &genetic_config)? {
            Some((generation, champion)) => {
                log::info!("run {} solved XOR in generation {}", run_index, generation);
                println!("{}", champion);
                println!(
                    "{}",
                    ron::ser::to_string_pretty(&champion, ron::ser::PrettyConfig::new())?
                );
                solved_generations.push(generation);
            }
            None => log::warn!(
                "run {} failed to solve XOR within {} generations",
                run_index,
                GENERATION_LIMIT
            ),
        }
    }

    if runs > 1 {
        let mean = solved_generations.iter().sum::<usize>() as f64
            / solved_generations.len().max(1) as f64;
        println!(
            "{} of {} runs solved XOR, in {:.1} generations on average",
            solved_generations.len(),
            runs,
            mean
        );
    }
    Ok(())
}
