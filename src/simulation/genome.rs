//! Genome: a network's flat parameter vector plus the fitness it earned.

use super::error::{Result, ShapeContext, SimulationError};

/// Unit of selection. Fitness starts at 0 and is reset every generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    genes: Vec<f64>,
    /// Accumulated score; unvalidated and may go negative.
    pub fitness: f64,
}

impl Genome {
    /// Wraps a parameter vector with zero fitness.
    pub fn new(genes: Vec<f64>) -> Self {
        Self { genes, fitness: 0.0 }
    }

    /// Read-only view of the genes.
    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the genome carries no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Deep copy of the genes; never aliases internal storage.
    pub fn copy_genes(&self) -> Vec<f64> {
        self.genes.clone()
    }

    /// Swaps in a new gene vector of the same length.
    pub fn replace_genes(&mut self, genes: Vec<f64>) -> Result<()> {
        if genes.len() != self.genes.len() {
            return Err(SimulationError::shape(
                ShapeContext::Parameters,
                self.genes.len(),
                genes.len(),
            ));
        }
        self.genes = genes;
        Ok(())
    }
}
