use std::cmp::Ordering;

use rand::Rng;

use super::registry::Gene;
use super::timetable::Timetable;
use crate::error::GaError;

/// A candidate schedule: one chromosome and its cached fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    chromosome: Vec<Gene>,
    fitness: Option<f64>,
}

impl Individual {
    /// Wraps an explicit chromosome, e.g. a crossover offspring.
    pub fn from_chromosome(chromosome: Vec<Gene>) -> Self {
        Self {
            chromosome,
            fitness: None,
        }
    }

    /// Creates an individual whose every gene is drawn independently and
    /// uniformly from the legal values of its role.
    pub fn random<R>(timetable: &Timetable<'_>, rng: &mut R) -> Result<Self, GaError>
    where
        R: Rng + ?Sized,
    {
        let chromosome = (0..timetable.chromosome_len())
            .map(|position| timetable.random_gene(position, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_chromosome(chromosome))
    }

    pub fn chromosome(&self) -> &[Gene] {
        &self.chromosome
    }

    pub fn len(&self) -> usize {
        self.chromosome.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosome.is_empty()
    }

    /// Returns the gene at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is outside the chromosome.
    pub fn gene(&self, position: usize) -> Gene {
        assert!(
            position < self.chromosome.len(),
            "gene position {position} out of range for chromosome of length {}",
            self.chromosome.len()
        );
        self.chromosome[position]
    }

    /// Overwrites the gene at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is outside the chromosome.
    pub fn set_gene(&mut self, position: usize, gene: Gene) {
        assert!(
            position < self.chromosome.len(),
            "gene position {position} out of range for chromosome of length {}",
            self.chromosome.len()
        );
        self.chromosome[position] = gene;
    }

    /// Fitness from the last evaluation, `None` if never evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Orders by fitness, unevaluated individuals last.
    pub(crate) fn cmp_fitness(&self, other: &Self) -> Ordering {
        let key = |ind: &Self| ind.fitness.unwrap_or(f64::NEG_INFINITY);
        key(self).total_cmp(&key(other))
    }

    /// Uniform crossover: each gene comes from `self` or `other` on a fair coin.
    pub fn crossover<R>(&self, other: &Individual, rng: &mut R) -> Result<Individual, GaError>
    where
        R: Rng + ?Sized,
    {
        if self.len() != other.len() {
            return Err(GaError::ChromosomeLength {
                expected: self.len(),
                actual: other.len(),
            });
        }

        let chromosome = self
            .chromosome
            .iter()
            .zip(&other.chromosome)
            .map(|(&a, &b)| if rng.random_bool(0.5) { a } else { b })
            .collect();
        Ok(Individual::from_chromosome(chromosome))
    }
}
