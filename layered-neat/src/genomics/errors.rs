use crate::NodeId;

use std::error::Error;
use std::fmt;

/// An error type indicating a network was
/// evaluated with an input vector of the wrong size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationError {
    /// The input vector's length does not
    /// match the genome's input count.
    InvalidInputSize { expected: usize, actual: usize },
}

/// An error type indicating the compatibility
/// distance between two genomes is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceError {
    /// The genomes share no innovation numbers,
    /// so the average weight difference has
    /// no matching genes to average over.
    EmptyAlignmentWindow,
}

/// An error type indicating why a gene
/// could not be added to a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneAdditionError {
    /// The gene's target is an input node.
    InputTarget(NodeId),
    /// Both of the gene's endpoints are output nodes.
    OutputPair(NodeId, NodeId),
    /// A gene between the same endpoints already exists.
    DuplicateGene(NodeId, NodeId),
    /// One of the endpoints is not a node in the genome.
    UnknownNode(NodeId),
}

/// An error type indicating a failure
/// to carry out a node addition mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAdditionError {
    /// The genome has no enabled gene to split.
    NoEnabledGenes,
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInputSize { expected, actual } => write!(
                f,
                "network evaluated with {} inputs, expected {}",
                actual, expected
            ),
        }
    }
}

impl fmt::Display for DistanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAlignmentWindow => {
                write!(f, "compatibility distance between genomes with no matching genes")
            }
        }
    }
}

impl fmt::Display for GeneAdditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputTarget(id) => write!(f, "gene insertion targeting input node {}", id),
            Self::OutputPair(input, output) => write!(
                f,
                "gene insertion between output nodes {} -> {}",
                input, output
            ),
            Self::DuplicateGene(input, output) => write!(
                f,
                "duplicate gene insertion between endpoints {} -> {}",
                input, output
            ),
            Self::UnknownNode(id) => write!(f, "gene insertion with nonexistant endpoint {}", id),
        }
    }
}

impl fmt::Display for NodeAdditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEnabledGenes => write!(f, "node mutation on genome without enabled genes"),
        }
    }
}

impl Error for EvaluationError {}
impl Error for DistanceError {}
impl Error for GeneAdditionError {}
impl Error for NodeAdditionError {}
