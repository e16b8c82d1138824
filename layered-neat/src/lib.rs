//! An implementation of NeuroEvolution of Augmenting Topologies,
//! following the 2002 paper: <http://nn.cs.utexas.edu/keyword?stanley:ec02>
//!
//! Genomes directly encode layered networks which may contain
//! feedback connections. Each generation, every genome is driven
//! by its own [`Evaluator`] (in parallel, across a worker pool),
//! after which the population is speciated, fitness is shared,
//! offspring are allotted per species, and a new generation is bred.
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade;
//! install any compatible logger to see per-generation summaries.
//!
//! [`Evaluator`]: crate::populations::Evaluator
//!
//! # Example usage: Evolution of an XOR gate
//! ```
//! use layered_neat::genomics::GeneticConfig;
//! use layered_neat::populations::{Evaluator, Population, PopulationConfig};
//! use std::num::NonZeroUsize;
//!
//! static CASES: [([f64; 3], f64); 4] = [
//!     ([1.0, 0.0, 0.0], 0.0),
//!     ([1.0, 0.0, 1.0], 1.0),
//!     ([1.0, 1.0, 0.0], 1.0),
//!     ([1.0, 1.0, 1.0], 0.0),
//! ];
//!
//! #[derive(Default)]
//! struct Xor {
//!     step: usize,
//!     fitness: f64,
//! }
//!
//! impl Evaluator for Xor {
//!     fn inputs(&mut self) -> &[f64] {
//!         &CASES[self.step % 4].0
//!     }
//!
//!     fn update(&mut self, outputs: &[f64]) {
//!         let expected = CASES[self.step % 4].1;
//!         self.fitness += 1.0 - (expected - outputs[0]).powi(2);
//!         self.step += 1;
//!     }
//!
//!     fn fitness(&self) -> f64 {
//!         self.fitness
//!     }
//!
//!     fn reset(&mut self) {
//!         *self = Xor::default();
//!     }
//! }
//!
//! let population_config = PopulationConfig {
//!     size: NonZeroUsize::new(50).unwrap(),
//!     ..PopulationConfig::default()
//! };
//! let evaluators = (0..50).map(|_| Xor::default()).collect();
//! let mut population =
//!     Population::new(population_config, GeneticConfig::default(), evaluators).unwrap();
//!
//! for _ in 0..10 {
//!     population.evaluate(4).unwrap();
//!     let log = population.produce_next_generation();
//!     println!("{}", log);
//! }
//! assert_eq!(population.generation(), 10);
//! ```

pub mod genomics;
pub mod populations;

/// Historical marking of a gene.
pub type Innovation = u32;

/// Identifier of a node within a genome.
pub type NodeId = u32;
