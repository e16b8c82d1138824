use crate::NodeId;

use serde::{Deserialize, Serialize};

/// Nodes are the vertices of a genome's network.
///
/// A node's structural inputs are the sources of every
/// gene targeting it, enabled or not. Its layer and
/// back-inputs are derived from the genome's genes, and
/// are recomputed after every structural change.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    layer: u32,
    inputs: Vec<NodeId>,
    #[serde(skip)]
    pub(super) back_inputs: Vec<NodeId>,
    #[serde(skip)]
    pub(super) value: f64,
}

impl Node {
    /// Creates a new node in layer 0 with the
    /// specified structural inputs.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::genomics::Node;
    ///
    /// let node = Node::new(5, vec![0, 1]);
    /// assert_eq!(node.inputs(), &[0, 1]);
    /// ```
    pub fn new(id: NodeId, inputs: Vec<NodeId>) -> Node {
        Node {
            id,
            layer: 0,
            inputs,
            back_inputs: vec![],
            value: 0.0,
        }
    }

    /// Returns the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the layer the node was placed in by
    /// the last layering pass. Inputs are always in
    /// layer 0, outputs in the genome's last layer.
    pub fn layer(&self) -> u32 {
        self.layer
    }

    pub(super) fn set_layer(&mut self, layer: u32) {
        self.layer = layer;
    }

    /// Returns the IDs of the nodes with a gene
    /// targeting this one.
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub(super) fn add_input(&mut self, input: NodeId) {
        self.inputs.push(input);
    }

    /// Returns the subset of the node's inputs connected
    /// through enabled, non-recursive genes, as of the
    /// last layering pass.
    pub fn back_inputs(&self) -> &[NodeId] {
        &self.back_inputs
    }

    /// Returns the node's activation as of the last evaluation.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Stores the activated weighted input sum as the node's value.
    pub(super) fn activate(&mut self, input: f64) {
        self.value = activation(input);
    }
}

/// Steepened logistic function, `1 / (1 + e^(-4.9x))`.
///
/// # Examples
/// ```
/// use layered_neat::genomics::activation;
///
/// assert_eq!(activation(0.0), 0.5);
/// assert!(activation(5.0) > 0.99);
/// ```
pub fn activation(x: f64) -> f64 {
    1.0 / (1.0 + (-4.9 * x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_is_symmetric_about_half() {
        for i in -20..=20 {
            let x = i as f64 / 10.0;
            assert!((activation(x) + activation(-x) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn activate_stores_value() {
        let mut node = Node::new(2, vec![0]);
        node.activate(0.0);
        assert_eq!(node.value(), 0.5);
    }

    #[test]
    fn derived_state_is_not_serialized() {
        let mut node = Node::new(4, vec![0, 1]);
        node.set_layer(2);
        node.back_inputs = vec![0];
        node.value = 0.7;
        let restored: Node = serde_json::from_str(&serde_json::to_string(&node).unwrap()).unwrap();
        assert_eq!(restored.layer(), 2);
        assert_eq!(restored.inputs(), &[0, 1]);
        assert!(restored.back_inputs().is_empty());
        assert_eq!(restored.value(), 0.0);
    }
}
