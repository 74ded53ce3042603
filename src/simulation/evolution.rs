//! Generational evolution: elitism, crossover and mutation.
//!
//! [`EvolutionEngine::evolve`] maps a population to a new one of the same size.
//! The two fittest genomes survive unchanged and every other slot is replaced by
//! a child bred from one of them.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{Result, SimulationError};
use super::genome::Genome;

/// Smallest population [`EvolutionEngine::evolve`] accepts.
pub const MIN_EVOLVABLE_POPULATION: usize = 2;

/// Probabilities and ranges of the genetic operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    /// Probability that crossover happens at all for a child.
    pub cross_over_rate: f64,
    /// Per-gene probability of taking the elite's gene during crossover.
    pub swap_prob: f64,
    /// Probability that a child skips mutation entirely.
    pub skip_mutation: f64,
    /// Per-gene mutation probability.
    pub mutation_prob: f64,
    /// Width of the uniform perturbation, centred on zero.
    pub mutation_range: f64,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            cross_over_rate: 0.75,
            swap_prob: 0.75,
            skip_mutation: 0.15,
            mutation_prob: 0.1,
            mutation_range: 1.0,
        }
    }
}

impl EvolutionParams {
    /// Half the mutation range; perturbations fall in `[-shift, +shift)`.
    pub fn mutation_shift(&self) -> f64 {
        self.mutation_range / 2.0
    }

    /// Rejects probabilities outside `[0, 1]` and negative ranges.
    pub fn validate(&self) -> Result<()> {
        let probabilities = [
            ("cross_over_rate", self.cross_over_rate),
            ("swap_prob", self.swap_prob),
            ("skip_mutation", self.skip_mutation),
            ("mutation_prob", self.mutation_prob),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        if !(self.mutation_range >= 0.0 && self.mutation_range.is_finite()) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "mutation_range must be finite and non-negative, got {}",
                self.mutation_range
            )));
        }
        Ok(())
    }
}

/// Indices of the two elites picked by [`select_elites`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elites {
    /// Fittest genome.
    pub best1: usize,
    /// Runner-up.
    pub best2: usize,
}

/// Picks the two fittest genomes in one pass.
///
/// Both thresholds start at 0 and only a strictly greater fitness displaces an
/// elite, so earlier genomes win ties and slots 0 and 1 stay the elites when no
/// fitness is positive. The two indices are always distinct.
pub fn select_elites(population: &[Genome]) -> Result<Elites> {
    if population.len() < MIN_EVOLVABLE_POPULATION {
        return Err(SimulationError::InvalidConfiguration(format!(
            "population of {} is too small to evolve, need at least {MIN_EVOLVABLE_POPULATION}",
            population.len()
        )));
    }

    let mut elites = Elites { best1: 0, best2: 1 };
    let mut best_fitness1 = 0.0;
    let mut best_fitness2 = 0.0;

    for (idx, genome) in population.iter().enumerate() {
        if genome.fitness > best_fitness1 {
            // the seed in slot 0 may be promoted to itself
            if idx != elites.best1 {
                elites.best2 = elites.best1;
            }
            best_fitness2 = best_fitness1;
            elites.best1 = idx;
            best_fitness1 = genome.fitness;
        } else if genome.fitness > best_fitness2 && idx != elites.best1 {
            elites.best2 = idx;
            best_fitness2 = genome.fitness;
        }
    }

    Ok(elites)
}

/// Applies selection, crossover and mutation with a fixed set of parameters.
#[derive(Debug, Clone, Default)]
pub struct EvolutionEngine {
    params: EvolutionParams,
}

impl EvolutionEngine {
    /// Creates an engine with the given operator parameters.
    pub fn new(params: EvolutionParams) -> Self {
        Self { params }
    }

    /// Operator parameters.
    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    /// Produces the next population.
    ///
    /// The result holds the `P - 2` mutated children in their prior relative
    /// order followed by `best1` and `best2`. Elites are moved, not copied, so
    /// their genes and fitness are untouched. Children never share storage with
    /// a parent.
    pub fn evolve<R: Rng + ?Sized>(
        &self,
        mut population: Vec<Genome>,
        rng: &mut R,
    ) -> Result<Vec<Genome>> {
        let elites = select_elites(&population)?;

        let (hi, lo) = if elites.best1 > elites.best2 {
            (elites.best1, elites.best2)
        } else {
            (elites.best2, elites.best1)
        };
        let removed_hi = population.remove(hi);
        let removed_lo = population.remove(lo);
        let (best1, best2) = if hi == elites.best1 {
            (removed_hi, removed_lo)
        } else {
            (removed_lo, removed_hi)
        };

        let children: Vec<Genome> = population
            .iter()
            .enumerate()
            .map(|(i, genome)| {
                let elite = if i % 2 == 0 { &best1 } else { &best2 };
                self.crossover(genome, elite, rng)
            })
            .collect();

        let mut next: Vec<Genome> = children
            .into_iter()
            .map(|child| self.mutate(child, rng))
            .collect();

        next.push(best1);
        next.push(best2);
        Ok(next)
    }

    /// Breeds one child from `parent`, pulling genes from `elite`.
    ///
    /// The child starts as a copy of `parent`. With probability `cross_over_rate`
    /// each gene is replaced by the elite's with probability `swap_prob`. The elite
    /// is only read.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        parent: &Genome,
        elite: &Genome,
        rng: &mut R,
    ) -> Genome {
        let mut genes = parent.copy_genes();
        if rng.random::<f64>() < self.params.cross_over_rate {
            for (gene, &elite_gene) in genes.iter_mut().zip(elite.genes()) {
                if rng.random::<f64>() < self.params.swap_prob {
                    *gene = elite_gene;
                }
            }
        }
        Genome::new(genes)
    }

    /// Perturbs a child's genes.
    ///
    /// With probability `skip_mutation` the child is returned untouched; otherwise
    /// each gene gains a value from `[-shift, +shift)` with probability
    /// `mutation_prob`.
    pub fn mutate<R: Rng + ?Sized>(&self, genome: Genome, rng: &mut R) -> Genome {
        if rng.random::<f64>() < self.params.skip_mutation {
            return genome;
        }
        let shift = self.params.mutation_shift();
        let fitness = genome.fitness;
        let mut genes = genome.copy_genes();
        for gene in &mut genes {
            if rng.random::<f64>() < self.params.mutation_prob {
                *gene += rng.random::<f64>() * self.params.mutation_range - shift;
            }
        }
        let mut mutated = Genome::new(genes);
        mutated.fitness = fitness;
        mutated
    }
}
