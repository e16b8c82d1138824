use serde::{Deserialize, Serialize};

use std::fmt;

/// A snapshot of a population, taken after its
/// genomes have been evaluated and before they are
/// replaced by their offspring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationLog {
    pub generation: usize,
    pub mean_fitness: f64,
    pub mean_hidden_nodes: f64,
    pub species_count: usize,
    pub distance_threshold: f64,
    pub max_fitness: f64,
    /// Total number of distinct genes ever registered.
    pub gene_count: usize,
}

impl GenerationLog {
    /// Returns the tab-separated column names
    /// matching the [`Display`](fmt::Display) output.
    ///
    /// # Examples
    /// ```
    /// use layered_neat::populations::GenerationLog;
    ///
    /// println!("{}", GenerationLog::header());
    /// assert_eq!(GenerationLog::header().split('\t').count(), 7);
    /// ```
    pub fn header() -> &'static str {
        "generation\tmean_fitness\tmean_hidden_nodes\tspecies\tthreshold\tmax_fitness\tgenes"
    }
}

impl fmt::Display for GenerationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{:.6}\t{:.3}\t{}\t{:.2}\t{:.6}\t{}",
            self.generation,
            self.mean_fitness,
            self.mean_hidden_nodes,
            self.species_count,
            self.distance_threshold,
            self.max_fitness,
            self.gene_count
        )
    }
}
