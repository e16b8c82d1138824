//! Genomes are the focus of evolution in NEAT.
//! They are a collection of genes and nodes that directly
//! encode a layered, possibly recurrent neural network.
//! Genomes can be progressively mutated, thus adding
//! complexity and functionality, and mated through
//! historically aligned crossover.

mod config;
mod crossover;
mod distance;
mod errors;
mod genes;
mod history;
mod nodes;

pub use config::GeneticConfig;
pub use errors::*;
pub use genes::Gene;
pub use history::History;
pub use nodes::{activation, Node};

use crate::{Innovation, NodeId};

use rand::prelude::{IteratorRandom, Rng};
use serde::{Deserialize, Serialize};

use std::fmt;

/// A mutable collection of genes and nodes, which
/// doubles as the network it encodes.
///
/// Node IDs `[0, input_count)` are inputs, placed in
/// layer 0, and `[input_count, input_count + output_count)`
/// are outputs, all placed in the genome's last layer.
/// Higher IDs are hidden nodes, created only by node
/// addition mutations.
///
/// Suports Serde for convenient genome saving and loading.
/// Transient evaluation state is not serialized.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Genome {
    genes: Vec<Gene>,
    // Always sorted by ID.
    nodes: Vec<Node>,
    input_count: usize,
    output_count: usize,
    next_node_id: NodeId,
    max_layer: u32,
    pub(crate) fitness: f64,
    #[serde(skip)]
    pub(crate) shared_fitness: f64,
    #[serde(skip)]
    pub(crate) species: usize,
    #[serde(skip)]
    outputs: Vec<f64>,
}

impl Genome {
    /// Creates a new genome with every input connected
    /// to every output through a zero-weighted gene.
    /// Gene innovation numbers are taken from `history`.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, Genome, History};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(2).unwrap(),
    ///     output_count: NonZeroUsize::new(1).unwrap(),
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut history = History::new(&config);
    /// let mut genome = Genome::new(&config, &mut history);
    ///
    /// assert_eq!(genome.genes().len(), 2 * 1);
    /// assert_eq!(genome.nodes().len(), 2 + 1);
    ///
    /// // The logistic of 0.
    /// assert_eq!(genome.evaluate(&[0.0, 0.0]).unwrap(), &[0.5]);
    /// ```
    pub fn new(config: &GeneticConfig, history: &mut History) -> Genome {
        Self::fully_connected(config, history, || 0.0)
    }

    /// Creates a new genome with every input connected
    /// to every output, with weights drawn uniformly from
    /// ±[`weight_bound`].
    ///
    /// [`weight_bound`]: GeneticConfig::weight_bound
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, Genome, History};
    ///
    /// let config = GeneticConfig::default();
    /// let mut history = History::new(&config);
    /// let genome = Genome::random(&config, &mut history, &mut rand::thread_rng());
    ///
    /// assert!(genome.genes().iter().all(|g| g.weight().abs() <= config.weight_bound));
    /// ```
    pub fn random(config: &GeneticConfig, history: &mut History, rng: &mut impl Rng) -> Genome {
        Self::fully_connected(config, history, || Gene::random_weight(config, rng))
    }

    fn fully_connected(
        config: &GeneticConfig,
        history: &mut History,
        mut weight: impl FnMut() -> f64,
    ) -> Genome {
        let input_count = config.input_count.get();
        let output_count = config.output_count.get();
        let inputs: Vec<NodeId> = (0..input_count as NodeId).collect();
        let outputs = input_count as NodeId..(input_count + output_count) as NodeId;

        let mut genes = Vec::with_capacity(input_count * output_count);
        for &i in &inputs {
            for o in outputs.clone() {
                genes.push(Gene::new(history.innovation(i, o), i, o, weight()));
            }
        }

        let nodes = inputs
            .iter()
            .map(|&i| Node::new(i, vec![]))
            .chain(outputs.map(|o| Node::new(o, inputs.clone())))
            .collect();

        let mut genome = Genome {
            genes,
            nodes,
            input_count,
            output_count,
            next_node_id: (input_count + output_count) as NodeId,
            max_layer: 0,
            fitness: 0.0,
            shared_fitness: 0.0,
            species: 0,
            outputs: Vec::with_capacity(output_count),
        };
        genome.configure_layers();
        genome
    }

    /// Rebuilds a genome from a list of genes. The node set
    /// is made up of all input and output nodes plus every
    /// gene endpoint, and the genome is layered anew.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{Gene, Genome};
    ///
    /// // One input (0), one output (1), and a hidden node (2) in between.
    /// let genome = Genome::from_genes(
    ///     vec![Gene::new(1, 0, 2, 1.0), Gene::new(2, 2, 1, 0.5)],
    ///     1,
    ///     1,
    /// );
    ///
    /// assert_eq!(genome.nodes().len(), 3);
    /// assert_eq!(genome.hidden_node_count(), 1);
    /// assert_eq!(genome.max_layer(), 2);
    /// ```
    pub fn from_genes(mut genes: Vec<Gene>, input_count: usize, output_count: usize) -> Genome {
        let io_count = (input_count + output_count) as NodeId;
        let mut ids: Vec<NodeId> = (0..io_count)
            .chain(genes.iter().flat_map(|g| [g.source(), g.target()]))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let nodes = ids
            .iter()
            .map(|&id| {
                Node::new(
                    id,
                    genes
                        .iter()
                        .filter(|g| g.target() == id)
                        .map(Gene::source)
                        .collect(),
                )
            })
            .collect();
        genes.iter_mut().for_each(|g| g.value = 0.0);

        let mut genome = Genome {
            genes,
            nodes,
            input_count,
            output_count,
            next_node_id: ids.last().map_or(io_count, |max| (max + 1).max(io_count)),
            max_layer: 0,
            fitness: 0.0,
            shared_fitness: 0.0,
            species: 0,
            outputs: Vec::with_capacity(output_count),
        };
        genome.configure_layers();
        genome
    }

    /// Recomputes every node's layer.
    ///
    /// Starting from the inputs, hidden nodes are placed
    /// in successive layers once every node feeding them
    /// through an enabled, non-recursive gene has been
    /// placed. Outputs, together with any hidden node that
    /// could not be placed (i.e. one fed by an output), go
    /// into the final layer.
    ///
    /// This is done automatically after every structural
    /// change, and is idempotent.
    pub fn configure_layers(&mut self) {
        let io_count = self.input_count + self.output_count;
        for node in self.nodes[io_count..].iter_mut() {
            node.back_inputs = self
                .genes
                .iter()
                .filter(|g| g.target() == node.id() && g.is_feedforward())
                .map(Gene::source)
                .collect();
        }

        let mut ready = vec![false; self.nodes.len()];
        ready[..self.input_count].iter_mut().for_each(|r| *r = true);

        let mut layer = 1;
        loop {
            let staged: Vec<usize> = (io_count..self.nodes.len())
                .filter(|&i| !ready[i])
                .filter(|&i| {
                    self.nodes[i]
                        .back_inputs
                        .iter()
                        .all(|&id| ready[node_index(&self.nodes, id)])
                })
                .collect();
            if staged.is_empty() {
                break;
            }
            for i in staged {
                self.nodes[i].set_layer(layer);
                ready[i] = true;
            }
            layer += 1;
        }

        for (node, placed) in self.nodes.iter_mut().zip(ready) {
            if (node.id() as usize) < self.input_count {
                node.set_layer(0);
            } else if !placed {
                node.set_layer(layer);
            }
        }
        self.max_layer = layer;
    }

    /// Feeds `inputs` forward through the network,
    /// layer by layer, and returns the output node values.
    ///
    /// Recursive genes deliver the value their source
    /// had during the previous evaluation.
    ///
    /// # Errors
    /// Returns an error if `inputs` is not
    /// exactly [`input_count`] long.
    ///
    /// [`input_count`]: GeneticConfig::input_count
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{activation, Gene, Genome};
    ///
    /// let mut genome = Genome::from_genes(
    ///     vec![Gene::new(0, 0, 2, 1.0), Gene::new(1, 1, 2, -2.0)],
    ///     2,
    ///     1,
    /// );
    ///
    /// assert_eq!(
    ///     genome.evaluate(&[0.5, 0.25]).unwrap(),
    ///     &[activation(0.5 * 1.0 + 0.25 * -2.0)],
    /// );
    /// assert!(genome.evaluate(&[1.0]).is_err());
    /// ```
    pub fn evaluate(&mut self, inputs: &[f64]) -> Result<&[f64], EvaluationError> {
        if inputs.len() != self.input_count {
            return Err(EvaluationError::InvalidInputSize {
                expected: self.input_count,
                actual: inputs.len(),
            });
        }

        for (node, input) in self.nodes.iter_mut().zip(inputs) {
            node.value = *input;
        }

        for layer in 0..=self.max_layer {
            let nodes = &self.nodes;
            for gene in self.genes.iter_mut() {
                let source = &nodes[node_index(nodes, gene.source())];
                if source.layer() == layer {
                    gene.value = if gene.enabled() {
                        gene.weight() * source.value
                    } else {
                        0.0
                    };
                }
            }

            if layer < self.max_layer {
                let genes = &self.genes;
                for node in self.nodes.iter_mut().filter(|n| n.layer() == layer + 1) {
                    let sum = genes
                        .iter()
                        .filter(|g| g.target() == node.id())
                        .map(|g| g.value)
                        .sum::<f64>();
                    node.activate(sum);
                }
            }
        }

        self.outputs.clear();
        self.outputs.extend(
            self.nodes[self.input_count..self.input_count + self.output_count]
                .iter()
                .map(Node::value),
        );
        Ok(&self.outputs)
    }

    /// Induces a _node mutation_ in the genome: a randomly
    /// chosen enabled gene is disabled and split in two by a
    /// new hidden node. The input gene has a weight of 1,
    /// and the output gene inherits the split gene's weight
    /// and recursiveness.
    ///
    /// If successful, returns the input gene, new node and
    /// output gene, in that order.
    ///
    /// # Errors
    /// Returns an error if the genome has no enabled genes.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, Genome, History};
    ///
    /// let config = GeneticConfig::zero();
    /// let mut history = History::new(&config);
    /// let mut genome = Genome::new(&config, &mut history);
    ///
    /// let (input, node, output) = genome
    ///     .mutate_add_node(&mut history, &mut rand::thread_rng())
    ///     .unwrap();
    /// assert_eq!((input.source(), input.target()), (0, node.id()));
    /// assert_eq!((output.source(), output.target()), (node.id(), 1));
    ///
    /// // The split gene is disabled.
    /// assert!(!genome.genes()[0].enabled());
    /// assert_eq!(genome.genes().len(), 3);
    /// ```
    pub fn mutate_add_node(
        &mut self,
        history: &mut History,
        rng: &mut impl Rng,
    ) -> Result<(&Gene, &Node, &Gene), NodeAdditionError> {
        let split = (0..self.genes.len())
            .filter(|&i| self.genes[i].enabled())
            .choose(rng)
            .ok_or(NodeAdditionError::NoEnabledGenes)?;

        let split_gene = &mut self.genes[split];
        split_gene.set_enabled(false);
        let (source, target) = split_gene.endpoints();
        let (weight, recursive) = (split_gene.weight(), split_gene.recursive());

        let new_node = self.next_node_id;
        self.next_node_id += 1;

        let input_gene = Gene::new(history.innovation(source, new_node), source, new_node, 1.0);
        let mut output_gene =
            Gene::new(history.innovation(new_node, target), new_node, target, weight);
        output_gene.set_recursive(recursive);
        self.genes.push(input_gene);
        self.genes.push(output_gene);

        // New IDs are always the highest, so the order is kept.
        self.nodes.push(Node::new(new_node, vec![source]));
        let target_index = node_index(&self.nodes, target);
        self.nodes[target_index].add_input(new_node);

        self.configure_layers();

        let gene_count = self.genes.len();
        Ok((
            &self.genes[gene_count - 2],
            &self.nodes[self.nodes.len() - 1],
            &self.genes[gene_count - 1],
        ))
    }

    /// Induces a _gene mutation_ in the genome, between
    /// two nodes chosen uniformly at random, with a weight
    /// drawn uniformly from ±[`weight_bound`]. See
    /// [`add_connection`] for the conditions under which
    /// the attempt is rejected.
    ///
    /// [`weight_bound`]: GeneticConfig::weight_bound
    /// [`add_connection`]: Genome::add_connection
    ///
    /// # Errors
    /// Returns an error if the chosen pair cannot be
    /// connected. The genome is left unchanged.
    pub fn mutate_add_connection(
        &mut self,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut impl Rng,
    ) -> Result<&Gene, GeneAdditionError> {
        let source = self.nodes[rng.gen_range(0..self.nodes.len())].id();
        let target = self.nodes[rng.gen_range(0..self.nodes.len())].id();
        let weight = Gene::random_weight(config, rng);
        self.add_connection(source, target, weight, history)
    }

    /// Adds a gene between `source` and `target` with the
    /// specified weight, taking its innovation number from
    /// `history`, and re-layers the genome.
    ///
    /// The gene is made recursive if it is a self-loop, if
    /// its source lies in a later layer than its target, or
    /// if the reverse gene exists and is not itself recursive.
    ///
    /// # Errors
    /// Returns an error, leaving the genome unchanged, if
    /// either endpoint is not in the genome, the target is an
    /// input node, both endpoints are output nodes, or the
    /// genome already has a gene between the same endpoints.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneAdditionError, GeneticConfig, Genome, History};
    ///
    /// let config = GeneticConfig::zero();
    /// let mut history = History::new(&config);
    /// let mut genome = Genome::new(&config, &mut history);
    ///
    /// // Output to input: rejected.
    /// assert_eq!(
    ///     genome.add_connection(1, 0, 1.0, &mut history),
    ///     Err(GeneAdditionError::InputTarget(0)),
    /// );
    /// // Input to output: already present.
    /// assert!(genome.add_connection(0, 1, 1.0, &mut history).is_err());
    /// assert_eq!(genome.genes().len(), 1);
    /// ```
    pub fn add_connection(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f64,
        history: &mut History,
    ) -> Result<&Gene, GeneAdditionError> {
        let source_index = find_node(&self.nodes, source).ok_or(GeneAdditionError::UnknownNode(source))?;
        let target_index = find_node(&self.nodes, target).ok_or(GeneAdditionError::UnknownNode(target))?;

        if self.is_input(target) {
            return Err(GeneAdditionError::InputTarget(target));
        }
        if self.is_output(source) && self.is_output(target) {
            return Err(GeneAdditionError::OutputPair(source, target));
        }
        if self.gene_between(source, target).is_some() {
            return Err(GeneAdditionError::DuplicateGene(source, target));
        }

        let recursive = if source == target {
            true
        } else if self.nodes[source_index].layer() > self.nodes[target_index].layer() {
            true
        } else if let Some(reverse) = self.gene_between(target, source) {
            !reverse.recursive()
        } else {
            false
        };

        let mut gene = Gene::new(history.innovation(source, target), source, target, weight);
        gene.set_recursive(recursive);
        self.genes.push(gene);
        self.nodes[target_index].add_input(source);

        self.configure_layers();

        Ok(&self.genes[self.genes.len() - 1])
    }

    /// Mutates every gene's weight: with probability
    /// [`weight_nudge_chance`] the weight is perturbed
    /// by up to ±[`weight_mutation_power`], otherwise it is
    /// replaced by a value within ±[`weight_bound`].
    ///
    /// [`weight_nudge_chance`]: GeneticConfig::weight_nudge_chance
    /// [`weight_mutation_power`]: GeneticConfig::weight_mutation_power
    /// [`weight_bound`]: GeneticConfig::weight_bound
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, Genome, History};
    ///
    /// let config = GeneticConfig {
    ///     weight_nudge_chance: 1.0,
    ///     weight_mutation_power: 0.5,
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut history = History::new(&config);
    /// let mut genome = Genome::new(&config, &mut history);
    ///
    /// genome.mutate_weights(&config, &mut rand::thread_rng());
    ///
    /// // Initial weights are 0, so nudged weights stay within the power.
    /// assert!(genome.genes().iter().all(|g| g.weight().abs() <= 0.5));
    /// ```
    pub fn mutate_weights(&mut self, config: &GeneticConfig, rng: &mut impl Rng) {
        for gene in self.genes.iter_mut() {
            if rng.gen::<f64>() < config.weight_nudge_chance {
                gene.nudge_weight(config, rng);
            } else {
                gene.randomize_weight(config, rng);
            }
        }
    }

    /// Performs all mutations on the genome, each with its
    /// configured probability: at most one node addition,
    /// at most one gene addition attempt, then weight mutation.
    pub fn mutate(&mut self, history: &mut History, config: &GeneticConfig, rng: &mut impl Rng) {
        if rng.gen::<f64>() < config.node_addition_mutation_chance {
            if let Err(e) = self.mutate_add_node(history, rng) {
                log::trace!("node mutation skipped: {}", e);
            }
        }
        if rng.gen::<f64>() < config.gene_addition_mutation_chance {
            if let Err(e) = self.mutate_add_connection(history, config, rng) {
                log::trace!("gene mutation rejected: {}", e);
            }
        }
        if rng.gen::<f64>() < config.weight_mutation_chance {
            self.mutate_weights(config, rng);
        }
    }

    /// Clears the values carried over between evaluations
    /// by nodes and recursive genes, so that the next
    /// evaluation behaves as on a freshly built network.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::{GeneticConfig, Genome, History};
    ///
    /// let config = GeneticConfig::default();
    /// let mut history = History::new(&config);
    /// let mut genome = Genome::random(&config, &mut history, &mut rand::thread_rng());
    ///
    /// genome.evaluate(&[1.0, 0.5, 0.5]).unwrap();
    /// genome.reset_state();
    /// assert!(genome.nodes().iter().all(|n| n.value() == 0.0));
    /// ```
    pub fn reset_state(&mut self) {
        self.nodes.iter_mut().for_each(|n| n.value = 0.0);
        self.genes.iter_mut().for_each(|g| g.value = 0.0);
        self.outputs.clear();
    }

    /// Returns the gene between `source` and `target`, if any.
    pub fn gene_between(&self, source: NodeId, target: NodeId) -> Option<&Gene> {
        self.genes
            .iter()
            .find(|g| g.source() == source && g.target() == target)
    }

    /// Returns the gene with the specified innovation number, if any.
    pub fn gene(&self, innovation: Innovation) -> Option<&Gene> {
        self.genes.iter().find(|g| g.innovation() == innovation)
    }

    /// Returns the node with the specified ID, if any.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        find_node(&self.nodes, id).map(|i| &self.nodes[i])
    }

    fn is_input(&self, id: NodeId) -> bool {
        (id as usize) < self.input_count
    }

    fn is_output(&self, id: NodeId) -> bool {
        (self.input_count..self.input_count + self.output_count).contains(&(id as usize))
    }

    /// Returns the genome's genes, in order of creation.
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Returns the genome's nodes, in order of increasing ID.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the number of network inputs.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Returns the number of network outputs.
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Returns the layer the output nodes are placed in.
    pub fn max_layer(&self) -> u32 {
        self.max_layer
    }

    /// Returns the number of hidden nodes in the genome.
    pub fn hidden_node_count(&self) -> usize {
        self.nodes.len() - self.input_count - self.output_count
    }

    /// Returns the ID the next hidden node will be given.
    pub fn next_node_id(&self) -> NodeId {
        self.next_node_id
    }

    /// Sets the genome's raw fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Returns the genome's raw fitness.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Returns the genome's fitness as shared with
    /// the rest of its species.
    pub fn shared_fitness(&self) -> f64 {
        self.shared_fitness
    }

    /// Returns the index of the species the genome was
    /// assigned to in the last speciation.
    pub fn species(&self) -> usize {
        self.species
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Genome ({} inputs, {} outputs, {} hidden, {} layers, fitness {})",
            self.input_count,
            self.output_count,
            self.hidden_node_count(),
            self.max_layer + 1,
            self.fitness
        )?;
        for gene in &self.genes {
            writeln!(f, "  {}", gene)?;
        }
        Ok(())
    }
}

/// Position of node `id` in an ID-sorted node list.
fn find_node(nodes: &[Node], id: NodeId) -> Option<usize> {
    nodes.binary_search_by_key(&id, Node::id).ok()
}

/// Position of node `id`, which must be present.
fn node_index(nodes: &[Node], id: NodeId) -> usize {
    find_node(nodes, id).unwrap_or_else(|| panic!("gene endpoint {} missing from genome", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::num::NonZeroUsize;

    fn config(inputs: usize, outputs: usize) -> GeneticConfig {
        GeneticConfig {
            input_count: NonZeroUsize::new(inputs).unwrap(),
            output_count: NonZeroUsize::new(outputs).unwrap(),
            weight_bound: 1.0,
            weight_mutation_power: 0.5,
            ..GeneticConfig::zero()
        }
    }

    /// Grows a genome using only operations that cannot
    /// create recursive genes.
    fn feedforward_genome(seed: u64) -> Genome {
        let config = config(3, 2);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut history = History::new(&config);
        let mut genome = Genome::random(&config, &mut history, &mut rng);
        for _ in 0..25 {
            if rng.gen::<bool>() {
                genome.mutate_add_node(&mut history, &mut rng).unwrap();
            } else {
                let hidden: Vec<(NodeId, u32)> = genome.nodes()[5..]
                    .iter()
                    .map(|n| (n.id(), n.layer()))
                    .collect();
                let (source, source_layer) = if hidden.is_empty() || rng.gen::<bool>() {
                    (rng.gen_range(0..3), 0)
                } else {
                    hidden[rng.gen_range(0..hidden.len())]
                };
                // Hidden targets must lie strictly deeper than the source.
                let deeper: Vec<NodeId> = hidden
                    .iter()
                    .filter(|&&(_, layer)| layer > source_layer)
                    .map(|&(id, _)| id)
                    .collect();
                let target = if deeper.is_empty() || rng.gen_bool(0.3) {
                    rng.gen_range(3..5)
                } else {
                    deeper[rng.gen_range(0..deeper.len())]
                };
                let _ = genome.add_connection(source, target, rng.gen_range(-1.0..1.0), &mut history);
            }
        }
        genome
    }

    #[test]
    fn new_fully_connected() {
        for input_count in 1..6 {
            for output_count in 1..6 {
                let config = config(input_count, output_count);
                let mut history = History::new(&config);
                let genome = Genome::new(&config, &mut history);

                assert_eq!(genome.genes.len(), input_count * output_count);
                assert_eq!(genome.nodes.len(), input_count + output_count);
                assert_eq!(genome.max_layer, 1);
                for gene in &genome.genes {
                    assert_eq!(
                        gene.innovation(),
                        gene.source() * output_count as NodeId
                            + (gene.target() - input_count as NodeId)
                    );
                    assert_eq!(gene.weight(), 0.0);
                }
                for node in &genome.nodes[input_count..] {
                    assert_eq!(node.layer(), 1);
                    assert_eq!(node.inputs().len(), input_count);
                }
            }
        }
    }

    #[test]
    fn all_zero_network_outputs_half() {
        let config = config(2, 1);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        assert_eq!(genome.evaluate(&[0.0, 0.0]).unwrap(), &[0.5]);
    }

    #[test]
    fn evaluate_wrong_input_size() {
        let config = config(2, 1);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        assert_eq!(
            genome.evaluate(&[0.0; 3]),
            Err(EvaluationError::InvalidInputSize {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        for seed in 0..20 {
            let mut genome = feedforward_genome(seed);
            let first = genome.evaluate(&[0.3, -0.7, 1.0]).unwrap().to_vec();
            for _ in 0..5 {
                assert_eq!(genome.evaluate(&[0.3, -0.7, 1.0]).unwrap(), first.as_slice());
            }
        }
    }

    #[test]
    fn evaluate_through_hidden_node() {
        let mut genome = Genome::from_genes(
            vec![
                Gene::new(0, 0, 1, 0.5),
                Gene::new(1, 0, 2, 2.0),
                Gene::new(2, 2, 1, -1.0),
            ],
            1,
            1,
        );
        let hidden = activation(0.8 * 2.0);
        let expected = activation(0.8 * 0.5 + hidden * -1.0);
        assert_eq!(genome.evaluate(&[0.8]).unwrap(), &[expected]);
    }

    #[test]
    fn disabled_genes_carry_nothing() {
        let mut genome = Genome::from_genes(vec![Gene::new(0, 0, 1, 3.0)], 1, 1);
        genome.genes[0].set_enabled(false);
        assert_eq!(genome.evaluate(&[1.0]).unwrap(), &[0.5]);
    }

    #[test]
    fn split_gene_stops_contributing() {
        let config = config(1, 1);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        genome.genes[0].set_weight(3.0);
        genome.mutate_add_node(&mut history, &mut StdRng::seed_from_u64(0)).unwrap();

        // The input stays listed as an input of the output node,
        // but only the path through the new node carries a value.
        assert!(genome.node(1).unwrap().inputs().contains(&0));
        let expected = activation(3.0 * activation(1.0));
        assert_eq!(genome.evaluate(&[1.0]).unwrap(), &[expected]);
    }

    #[test]
    fn reset_state_matches_fresh_network() {
        let config = config(1, 1);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        genome.genes[0].set_weight(0.5);
        genome.mutate_add_node(&mut history, &mut StdRng::seed_from_u64(0)).unwrap();
        genome.add_connection(1, 2, 1.0, &mut history).unwrap();

        let mut fresh = genome.clone();
        let expected = fresh.evaluate(&[1.0]).unwrap().to_vec();

        genome.evaluate(&[1.0]).unwrap();
        let mut carried = genome.clone();
        assert_ne!(carried.evaluate(&[1.0]).unwrap(), expected.as_slice());

        genome.reset_state();
        assert!(genome.genes.iter().all(|g| g.value() == 0.0));
        assert_eq!(genome.evaluate(&[1.0]).unwrap(), expected.as_slice());
    }

    #[test]
    fn recursive_genes_deliver_previous_value() {
        let config = config(1, 1);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        genome.genes[0].set_weight(0.5);
        genome.mutate_add_node(&mut history, &mut StdRng::seed_from_u64(0)).unwrap();
        // Output 1 back into hidden node 2.
        let gene = genome.add_connection(1, 2, 1.0, &mut history).unwrap();
        assert!(gene.recursive());

        let hidden = activation(1.0);
        let first_output = activation(0.5 * hidden);
        assert_eq!(genome.evaluate(&[1.0]).unwrap(), &[first_output]);

        let hidden = activation(1.0 + first_output);
        let second_output = activation(0.5 * hidden);
        assert_eq!(genome.evaluate(&[1.0]).unwrap(), &[second_output]);
    }

    #[test]
    fn layering_is_topological() {
        for seed in 0..50 {
            let genome = feedforward_genome(seed);
            assert!(genome.genes.iter().all(|g| !g.recursive()));
            for gene in genome.genes.iter().filter(|g| g.enabled()) {
                let source = genome.node(gene.source()).unwrap();
                let target = genome.node(gene.target()).unwrap();
                assert!(
                    source.layer() < target.layer(),
                    "gene {} violates layer order in {}",
                    gene,
                    genome
                );
            }
            for node in &genome.nodes {
                if genome.is_input(node.id()) {
                    assert_eq!(node.layer(), 0);
                } else if genome.is_output(node.id()) {
                    assert_eq!(node.layer(), genome.max_layer);
                } else {
                    assert!(node.layer() > 0 && node.layer() < genome.max_layer);
                }
            }
        }
    }

    #[test]
    fn layering_is_idempotent() {
        for seed in 0..20 {
            let mut genome = feedforward_genome(seed);
            let layers: Vec<u32> = genome.nodes.iter().map(Node::layer).collect();
            let max_layer = genome.max_layer;
            genome.configure_layers();
            assert_eq!(genome.nodes.iter().map(Node::layer).collect::<Vec<_>>(), layers);
            assert_eq!(genome.max_layer, max_layer);
        }
    }

    #[test]
    fn nodes_fed_by_outputs_go_to_last_layer() {
        // Output 1 feeds hidden node 2, which is itself not fed by anything else.
        let genome = Genome::from_genes(
            vec![Gene::new(0, 0, 1, 1.0), Gene::new(5, 1, 2, 1.0)],
            1,
            1,
        );
        assert_eq!(genome.max_layer, 1);
        assert_eq!(genome.node(2).unwrap().layer(), 1);
    }

    #[test]
    fn output_to_input_connection_rejected() {
        let config = config(2, 1);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        assert_eq!(
            genome.add_connection(2, 0, 1.0, &mut history),
            Err(GeneAdditionError::InputTarget(0))
        );
        assert_eq!(genome.genes.len(), 2);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn output_pair_connection_rejected() {
        let config = config(1, 2);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        assert_eq!(
            genome.add_connection(1, 2, 1.0, &mut history),
            Err(GeneAdditionError::OutputPair(1, 2))
        );
        assert_eq!(
            genome.add_connection(1, 1, 1.0, &mut history),
            Err(GeneAdditionError::OutputPair(1, 1))
        );
        assert_eq!(
            genome.add_connection(0, 9, 1.0, &mut history),
            Err(GeneAdditionError::UnknownNode(9))
        );
    }

    #[test]
    fn mutated_connections_never_target_inputs() {
        let config = config(2, 2);
        let mut rng = StdRng::seed_from_u64(3);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        for _ in 0..200 {
            let before = genome.genes.len();
            let added = genome
                .mutate_add_connection(&mut history, &config, &mut rng)
                .is_ok();
            assert_eq!(genome.genes.len(), before + added as usize);
        }
        assert!(genome.genes.iter().all(|g| !genome.is_input(g.target())));
    }

    #[test]
    fn self_loop_is_recursive() {
        let config = config(1, 1);
        let mut rng = StdRng::seed_from_u64(0);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        let node = genome.mutate_add_node(&mut history, &mut rng).unwrap().1.id();
        assert!(genome.add_connection(node, node, 1.0, &mut history).unwrap().recursive());
    }

    #[test]
    fn reverse_gene_toggles_recursion() {
        // Hidden nodes 2 and 3 share a layer, with a disabled gene 2 -> 3.
        let mut genes = vec![
            Gene::new(0, 0, 2, 1.0),
            Gene::new(1, 0, 3, 1.0),
            Gene::new(2, 2, 1, 1.0),
            Gene::new(3, 3, 1, 1.0),
            Gene::new(4, 2, 3, 1.0),
        ];
        genes[4].set_enabled(false);
        let mut history = History::default();

        let mut genome = Genome::from_genes(genes.clone(), 1, 1);
        assert_eq!(genome.node(2).unwrap().layer(), genome.node(3).unwrap().layer());
        assert!(genome.add_connection(3, 2, 1.0, &mut history).unwrap().recursive());

        genes[4].set_enabled(true);
        genes[4].set_recursive(true);
        let mut genome = Genome::from_genes(genes, 1, 1);
        assert_eq!(genome.node(2).unwrap().layer(), genome.node(3).unwrap().layer());
        assert!(!genome.add_connection(3, 2, 1.0, &mut history).unwrap().recursive());
        assert!(genome.node(2).unwrap().layer() > genome.node(3).unwrap().layer());
    }

    #[test]
    fn add_node_splits_gene() {
        let config = config(1, 1);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        genome.genes[0].set_weight(0.75);

        let (input, node, output) = genome
            .mutate_add_node(&mut history, &mut StdRng::seed_from_u64(1))
            .unwrap();
        let (input, node, output) = (input.clone(), node.clone(), output.clone());

        assert_eq!(node.id(), 2);
        assert_eq!(node.inputs(), &[0]);
        assert_eq!(input.weight(), 1.0);
        assert!(input.enabled() && !input.recursive());
        assert_eq!(output.weight(), 0.75);
        assert!(output.enabled());
        assert!(!genome.genes[0].enabled());
        assert_eq!(genome.genes.len(), 3);
        assert_eq!(genome.nodes.len(), 3);
        assert_eq!(genome.node(1).unwrap().inputs(), &[0, 2]);
        assert_eq!(genome.node(2).unwrap().layer(), 1);
        assert_eq!(genome.max_layer, 2);
        assert_eq!(genome.next_node_id, 3);
    }

    #[test]
    fn add_node_without_enabled_genes() {
        let config = config(1, 1);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        genome.genes[0].set_enabled(false);
        assert_eq!(
            genome
                .mutate_add_node(&mut history, &mut StdRng::seed_from_u64(0))
                .unwrap_err(),
            NodeAdditionError::NoEnabledGenes
        );
    }

    #[test]
    fn split_recursive_gene_stays_recursive() {
        let config = config(1, 1);
        let mut rng = StdRng::seed_from_u64(0);
        let mut history = History::new(&config);
        let mut genome = Genome::new(&config, &mut history);
        let hidden = genome.mutate_add_node(&mut history, &mut rng).unwrap().1.id();
        genome.add_connection(1, hidden, 1.0, &mut history).unwrap();
        genome.genes.iter_mut().for_each(|g| g.set_enabled(g.recursive()));

        let (input, _, output) = genome.mutate_add_node(&mut history, &mut rng).unwrap();
        assert!(!input.recursive());
        assert!(output.recursive());
    }

    #[test]
    fn identical_structure_gets_identical_innovations() {
        let config = config(2, 1);
        let mut rng = StdRng::seed_from_u64(5);
        let mut history = History::new(&config);
        let mut genomes = vec![];
        for weight in [1.0, -1.0] {
            let mut genome = Genome::new(&config, &mut history);
            // Only 0 -> 2 can be split.
            genome.genes[1].set_enabled(false);
            let node = genome.mutate_add_node(&mut history, &mut rng).unwrap().1.id();
            assert_eq!(node, 3);
            genome.add_connection(1, node, weight, &mut history).unwrap();
            genomes.push(genome);
        }

        let innovations = |g: &Genome| g.genes().iter().map(Gene::innovation).collect::<Vec<_>>();
        assert_eq!(innovations(&genomes[0]), innovations(&genomes[1]));
        assert_eq!(innovations(&genomes[0]), vec![0, 1, 2, 3, 4]);

        let fresh = genomes[0]
            .add_connection(3, 3, 1.0, &mut history)
            .unwrap()
            .innovation();
        assert_eq!(fresh, 5);
        assert_eq!(history.len(), 6);
    }

    #[test]
    fn mutate_with_zero_chances_changes_nothing() {
        let config = config(2, 2);
        let mut rng = StdRng::seed_from_u64(9);
        let mut history = History::new(&config);
        let mut genome = Genome::random(&config, &mut history, &mut rng);
        let before = genome.clone();
        genome.mutate(&mut history, &config, &mut rng);
        assert_eq!(genome, before);
    }

    #[test]
    fn mutate_with_certain_chances_grows() {
        let config = GeneticConfig {
            node_addition_mutation_chance: 1.0,
            weight_mutation_chance: 1.0,
            ..config(2, 2)
        };
        let mut rng = StdRng::seed_from_u64(9);
        let mut history = History::new(&config);
        let mut genome = Genome::random(&config, &mut history, &mut rng);
        for i in 1..10 {
            genome.mutate(&mut history, &config, &mut rng);
            assert_eq!(genome.hidden_node_count(), i);
        }
    }

    #[test]
    fn serde_keeps_structure() {
        let mut genome = feedforward_genome(4);
        let output = genome.evaluate(&[1.0, 0.5, -0.5]).unwrap().to_vec();
        let mut restored: Genome =
            serde_json::from_str(&serde_json::to_string(&genome).unwrap()).unwrap();
        assert_eq!(restored.genes().len(), genome.genes().len());
        assert_eq!(
            restored.nodes().iter().map(Node::layer).collect::<Vec<_>>(),
            genome.nodes().iter().map(Node::layer).collect::<Vec<_>>()
        );
        let restored_output = restored.evaluate(&[1.0, 0.5, -0.5]).unwrap();
        for (a, b) in restored_output.iter().zip(&output) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn from_genes_rebuilds_inputs() {
        let genome = feedforward_genome(8);
        let rebuilt = Genome::from_genes(genome.genes.clone(), 3, 2);
        assert_eq!(rebuilt.next_node_id, genome.next_node_id);
        for (a, b) in rebuilt.nodes.iter().zip(&genome.nodes) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.layer(), b.layer());
            let mut a_inputs = a.inputs().to_vec();
            let mut b_inputs = b.inputs().to_vec();
            a_inputs.sort_unstable();
            b_inputs.sort_unstable();
            assert_eq!(a_inputs, b_inputs);
        }
    }
}
