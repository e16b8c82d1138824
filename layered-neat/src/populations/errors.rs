use crate::genomics::EvaluationError;

use std::error::Error;
use std::fmt;

/// Errors raised while building or evaluating a population.
#[derive(Debug)]
pub enum PopulationError {
    /// The number of evaluators handed to the population
    /// differs from its size.
    EvaluatorCountMismatch { genomes: usize, evaluators: usize },
    /// An evaluator fed a genome the wrong number of inputs.
    Evaluation(EvaluationError),
    /// The evaluation worker pool could not be started.
    WorkerPool(rayon::ThreadPoolBuildError),
}

impl fmt::Display for PopulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EvaluatorCountMismatch {
                genomes,
                evaluators,
            } => write!(
                f,
                "population of {} genomes was given {} evaluators",
                genomes, evaluators
            ),
            Self::Evaluation(e) => write!(f, "genome evaluation failed: {}", e),
            Self::WorkerPool(e) => write!(f, "could not build evaluation worker pool: {}", e),
        }
    }
}

impl Error for PopulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EvaluatorCountMismatch { .. } => None,
            Self::Evaluation(e) => Some(e),
            Self::WorkerPool(e) => Some(e),
        }
    }
}

impl From<EvaluationError> for PopulationError {
    fn from(e: EvaluationError) -> Self {
        Self::Evaluation(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for PopulationError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::WorkerPool(e)
    }
}
