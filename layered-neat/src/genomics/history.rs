use crate::genomics::GeneticConfig;
use crate::{Innovation, NodeId};

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use std::collections::hash_map::{Entry, HashMap};

/// A `History` keeps track of gene innovations in a
/// population, in order to make sure structurally identical
/// genes are assigned the same innovation numbers.
///
/// Genes are identified by their `(source, target)`
/// endpoints. The record is append-only: once an endpoint
/// pair has been assigned a number, every genome created
/// under the same history reuses it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    gene_innovations: HashMap<(NodeId, NodeId), Innovation, RandomState>,
    gene_endpoints: Vec<(NodeId, NodeId)>,
}

impl History {
    /// Creates a new History using the specified configuration.
    ///
    /// Initially generated genes are given the innovation number
    /// `o + i ⨯ output_count`, where `i` is the ID of their
    /// source input node and `o` is the index of their target
    /// output node. Thus, innovation numbers assigned
    /// to mutations start at `input_count ⨯ output_count`.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, History};
    /// use std::num::NonZeroUsize;
    ///
    /// let history = History::new(&GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     ..GeneticConfig::zero()
    /// });
    ///
    /// assert_eq!(history.len(), 3 * 2);
    /// // Input 1 to the second output (node 4).
    /// assert_eq!(history.get(1, 4), Some(3));
    /// ```
    pub fn new(config: &GeneticConfig) -> History {
        let input_count = config.input_count.get() as NodeId;
        let output_count = config.output_count.get() as NodeId;
        let mut history = History::default();
        for i in 0..input_count {
            for o in 0..output_count {
                history.innovation(i, input_count + o);
            }
        }
        history
    }

    /// Returns the innovation number of the gene between
    /// `source` and `target`, assigning the next available
    /// number if the pair has never been seen before.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, History};
    ///
    /// let mut history = History::new(&GeneticConfig::zero());
    ///
    /// let innovation = history.innovation(1, 2);
    /// assert_eq!(innovation, 1);
    /// // The same pair is always given the same number...
    /// assert_eq!(history.innovation(1, 2), innovation);
    /// // ...and a new pair a new one.
    /// assert_eq!(history.innovation(2, 1), 2);
    /// ```
    pub fn innovation(&mut self, source: NodeId, target: NodeId) -> Innovation {
        match self.gene_innovations.entry((source, target)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let innovation = self.gene_endpoints.len() as Innovation;
                self.gene_endpoints.push((source, target));
                *entry.insert(innovation)
            }
        }
    }

    /// Returns the innovation number previously assigned
    /// to the gene between `source` and `target`, if any.
    pub fn get(&self, source: NodeId, target: NodeId) -> Option<Innovation> {
        self.gene_innovations.get(&(source, target)).copied()
    }

    /// Returns the endpoints of the gene with the
    /// specified innovation number, if it exists.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, History};
    ///
    /// let history = History::new(&GeneticConfig::zero());
    ///
    /// assert_eq!(history.endpoints(0), Some((0, 1)));
    /// assert_eq!(history.endpoints(1), None);
    /// ```
    pub fn endpoints(&self, innovation: Innovation) -> Option<(NodeId, NodeId)> {
        self.gene_endpoints.get(innovation as usize).copied()
    }

    /// Returns the total number of distinct genes
    /// ever registered.
    pub fn len(&self) -> usize {
        self.gene_endpoints.len()
    }

    /// Returns `true` if no gene has been registered.
    pub fn is_empty(&self) -> bool {
        self.gene_endpoints.is_empty()
    }

    /// Returns an iterator over the complete record of
    /// gene innovations, in the format
    /// `((source, target), innovation)`, in order
    /// of increasing innovation number.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, History};
    ///
    /// let history = History::new(&GeneticConfig::zero());
    ///
    /// for ((source, target), gene) in history.gene_innovation_history() {
    ///     println!("gene innovation with id {} from node {} to node {}",
    ///         gene, source, target);
    /// }
    /// ```
    pub fn gene_innovation_history(
        &self,
    ) -> impl Iterator<Item = ((NodeId, NodeId), Innovation)> + '_ {
        self.gene_endpoints
            .iter()
            .enumerate()
            .map(|(innovation, endpoints)| (*endpoints, innovation as Innovation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    #[test]
    fn initial_innovations_follow_io_layout() {
        let config = GeneticConfig {
            input_count: NonZeroUsize::new(4).unwrap(),
            output_count: NonZeroUsize::new(3).unwrap(),
            ..GeneticConfig::zero()
        };
        let history = History::new(&config);
        for i in 0..4 {
            for o in 0..3 {
                assert_eq!(history.get(i, 4 + o), Some(o + i * 3));
            }
        }
        assert_eq!(history.len(), 12);
    }

    #[test]
    fn innovations_are_stable_and_dense() {
        let mut history = History::new(&GeneticConfig::zero());
        let a = history.innovation(0, 7);
        let b = history.innovation(7, 1);
        let c = history.innovation(0, 7);
        assert_eq!(a, c);
        assert_eq!(b, a + 1);
        assert_eq!(history.len(), 3);
        assert_eq!(history.endpoints(b), Some((7, 1)));
    }

    #[test]
    fn direction_matters() {
        let mut history = History::default();
        assert_ne!(history.innovation(1, 2), history.innovation(2, 1));
    }

    #[test]
    fn record_is_ordered() {
        let mut history = History::new(&GeneticConfig::zero());
        history.innovation(1, 1);
        history.innovation(2, 1);
        let record: Vec<_> = history.gene_innovation_history().collect();
        assert_eq!(record, vec![((0, 1), 0), ((1, 1), 1), ((2, 1), 2)]);
    }
}
