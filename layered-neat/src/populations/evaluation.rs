use crate::genomics::{EvaluationError, Genome};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use std::num::NonZeroUsize;

/// Worker count used when the machine's
/// parallelism cannot be queried.
const FALLBACK_WORKER_THREADS: usize = 8;

/// A task environment which drives a single genome
/// for a number of steps and scores its behaviour.
///
/// Each step, the genome is fed [`inputs`](Evaluator::inputs),
/// and its outputs are handed back through
/// [`update`](Evaluator::update). Once all steps are done,
/// [`fitness`](Evaluator::fitness) is read as the genome's
/// score, and must be non-negative.
///
/// Every genome of a population owns one evaluator,
/// which is [`reset`](Evaluator::reset) before the
/// next generation is evaluated.
pub trait Evaluator: Send {
    /// Returns the inputs for the current step.
    fn inputs(&mut self) -> &[f64];
    /// Advances the environment using the genome's outputs.
    fn update(&mut self, outputs: &[f64]);
    /// Returns the score accumulated so far.
    fn fitness(&self) -> f64;
    /// Restores the environment to its initial state.
    fn reset(&mut self);
}

/// Drives `genome` with `evaluator` for `steps` steps,
/// storing the resulting fitness in the genome.
///
/// # Panics
/// Panics if the evaluator reports a negative or NaN fitness.
fn run_evaluator<E: Evaluator>(
    genome: &mut Genome,
    evaluator: &mut E,
    steps: usize,
) -> Result<(), EvaluationError> {
    for _ in 0..steps {
        let outputs = genome.evaluate(evaluator.inputs())?;
        evaluator.update(outputs);
    }
    let fitness = evaluator.fitness();
    assert!(
        fitness >= 0.0,
        "evaluator reported an invalid fitness ({})",
        fitness
    );
    genome.set_fitness(fitness);
    Ok(())
}

/// Evaluates each genome with its paired evaluator,
/// one after the other on the calling thread.
pub(super) fn evaluate_sequential<E: Evaluator>(
    genomes: &mut [Genome],
    evaluators: &mut [E],
    steps: usize,
) -> Result<(), EvaluationError> {
    genomes
        .iter_mut()
        .zip(evaluators)
        .try_for_each(|(genome, evaluator)| run_evaluator(genome, evaluator, steps))
}

/// Evaluates a population across a fixed pool of worker threads.
///
/// The population is split into one contiguous slice per
/// worker; each worker drives its genomes sequentially, so
/// every evaluator is only ever touched by a single thread.
pub struct ParallelEvaluator {
    workers: ThreadPool,
}

impl ParallelEvaluator {
    /// Starts a pool of `threads` workers, or one per
    /// available core if `None`.
    ///
    /// # Errors
    /// Returns an error if the worker threads cannot be spawned.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::populations::ParallelEvaluator;
    /// use std::num::NonZeroUsize;
    ///
    /// let evaluator = ParallelEvaluator::new(NonZeroUsize::new(2)).unwrap();
    /// assert_eq!(evaluator.thread_count(), 2);
    /// ```
    pub fn new(threads: Option<NonZeroUsize>) -> Result<ParallelEvaluator, rayon::ThreadPoolBuildError> {
        let threads = threads.map(NonZeroUsize::get).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(FALLBACK_WORKER_THREADS)
        });
        log::debug!("starting {} evaluation workers", threads);
        let workers = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("evaluation-worker-{}", i))
            .build()?;
        Ok(ParallelEvaluator { workers })
    }

    /// Returns the number of worker threads in the pool.
    pub fn thread_count(&self) -> usize {
        self.workers.current_num_threads()
    }

    /// Drives every genome with the evaluator at the same
    /// index for `steps` steps, storing the resulting fitnesses.
    /// Returns once all workers have finished.
    ///
    /// # Errors
    /// Returns the first evaluation error encountered, if any.
    /// Genomes in other slices may still have been evaluated.
    ///
    /// # Panics
    /// Panics if the slices differ in length, or if an
    /// evaluator reports a negative or NaN fitness.
    pub fn evaluate<E: Evaluator>(
        &self,
        genomes: &mut [Genome],
        evaluators: &mut [E],
        steps: usize,
    ) -> Result<(), EvaluationError> {
        assert_eq!(
            genomes.len(),
            evaluators.len(),
            "every genome needs exactly one evaluator"
        );
        if genomes.is_empty() {
            return Ok(());
        }
        let threads = self.thread_count();
        let chunk_size = (genomes.len() + threads - 1) / threads;
        self.workers.install(|| {
            genomes
                .par_chunks_mut(chunk_size)
                .zip(evaluators.par_chunks_mut(chunk_size))
                .try_for_each(|(genomes, evaluators)| {
                    evaluate_sequential(genomes, evaluators, steps)
                })
        })
    }
}
