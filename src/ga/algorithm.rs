//! Genetic operators for timetable chromosomes.
//!
//! [`GeneticAlgorithm`] owns the run parameters and implements one generation
//! as three passes over a [`Population`]:
//!
//! 1. **Crossover** - members are visited best first. The top `elitism_count`
//!    ranks are carried over unchanged; every other rank is replaced, with
//!    probability `crossover_rate`, by a uniform crossover of itself and a
//!    tournament-selected partner.
//! 2. **Mutation** - again best first, ranks below the elite each have every
//!    gene replaced with probability `mutation_rate` by the matching gene of a
//!    freshly generated random individual.
//! 3. **Evaluation** - every member is decoded into its own session buffer and
//!    scored as `1 / (1 + clashes)`.
//!
//! Elite ranks are `0..elitism_count` in both crossover and mutation.
//!
//! All randomness comes from the `rng` argument, so a seeded generator makes a
//! run reproducible.

use rand::{seq::IndexedRandom, Rng};
use serde::{Deserialize, Serialize};

use super::individual::Individual;
use super::population::Population;
use super::timetable::Timetable;
use crate::error::GaError;

/// Run parameters, deserialized from requests with these defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaParameters {
    /// Number of individuals per generation (search breadth)
    pub population_size: usize,
    /// Per-gene replacement probability (exploration vs. exploitation)
    pub mutation_rate: f64,
    /// Per-member recombination probability
    pub crossover_rate: f64,
    /// Number of top-ranked members protected each generation
    pub elitism_count: usize,
    /// Tournament size for parent selection (larger = stronger pressure)
    pub tournament_size: usize,
    /// Generation budget; the run stops once the counter exceeds it
    pub max_generations: usize,
    /// Seed for a reproducible run, entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for GaParameters {
    fn default() -> Self {
        Self {
            population_size: 100,
            mutation_rate: 0.01,
            crossover_rate: 0.9,
            elitism_count: 2,
            tournament_size: 5,
            max_generations: 1000,
            seed: None,
        }
    }
}

impl GaParameters {
    pub fn validate(&self) -> Result<(), GaError> {
        if self.population_size == 0 {
            return Err(GaError::InvalidParameter(
                "population_size must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(GaError::InvalidParameter(format!(
                "mutation_rate {} is outside [0, 1]",
                self.mutation_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(GaError::InvalidParameter(format!(
                "crossover_rate {} is outside [0, 1]",
                self.crossover_rate
            )));
        }
        if self.elitism_count > self.population_size {
            return Err(GaError::InvalidParameter(format!(
                "elitism_count {} exceeds population_size {}",
                self.elitism_count, self.population_size
            )));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(GaError::InvalidParameter(format!(
                "tournament_size {} must be in 1..={}",
                self.tournament_size, self.population_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    params: GaParameters,
}

impl GeneticAlgorithm {
    pub fn new(params: GaParameters) -> Result<Self, GaError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &GaParameters {
        &self.params
    }

    pub fn init_population<R>(
        &self,
        timetable: &Timetable<'_>,
        rng: &mut R,
    ) -> Result<Population, GaError>
    where
        R: Rng + ?Sized,
    {
        Population::random(self.params.population_size, timetable, rng)
    }

    /// Scores `individual` from a full decode and caches the result.
    pub fn calc_fitness(
        &self,
        individual: &mut Individual,
        timetable: &Timetable<'_>,
    ) -> Result<f64, GaError> {
        let sessions = timetable.decode(individual.chromosome())?;
        let clashes = timetable.count_clashes(&sessions)?;
        let fitness = 1.0 / f64::from(clashes + 1);
        individual.set_fitness(fitness);
        Ok(fitness)
    }

    /// Scores every member and records the fitness sum on the population.
    ///
    /// Each member is decoded into its own session buffer and only reads the
    /// timetable, so members could be scored on separate workers.
    pub fn evaluate_population(
        &self,
        population: &mut Population,
        timetable: &Timetable<'_>,
    ) -> Result<(), GaError> {
        let mut population_fitness = 0.0;
        for individual in population.iter_mut() {
            population_fitness += self.calc_fitness(individual, timetable)?;
        }
        population.set_population_fitness(population_fitness);
        Ok(())
    }

    pub fn is_generation_budget_exhausted(&self, generation: usize) -> bool {
        generation > self.params.max_generations
    }

    /// True once the best member has no clashes.
    pub fn is_solution_found(&self, population: &Population) -> bool {
        population
            .fittest(0)
            .and_then(Individual::fitness)
            .is_some_and(|fitness| fitness == 1.0)
    }

    /// Tournament selection over a read-only view of `population`.
    ///
    /// Samples `tournament_size` distinct members and returns the fittest; the
    /// first sampled member wins ties. Returns `None` for an empty population.
    pub fn select_parent<'p, R>(
        &self,
        population: &'p Population,
        rng: &mut R,
    ) -> Option<&'p Individual>
    where
        R: Rng + ?Sized,
    {
        population
            .individuals()
            .choose_multiple(rng, self.params.tournament_size)
            .reduce(|best, candidate| {
                if candidate.cmp_fitness(best).is_gt() {
                    candidate
                } else {
                    best
                }
            })
    }

    /// Builds the next generation, ordered by the current ranking.
    pub fn crossover_population<R>(
        &self,
        population: &Population,
        rng: &mut R,
    ) -> Result<Population, GaError>
    where
        R: Rng + ?Sized,
    {
        let mut next = Population::with_capacity(population.len());

        for (rank, index) in population.ranking().into_iter().enumerate() {
            let parent1 = &population.individuals()[index];

            if rank < self.params.elitism_count
                || rng.random::<f64>() >= self.params.crossover_rate
            {
                next.push(parent1.clone());
                continue;
            }

            let parent2 = self.select_parent(population, rng).unwrap_or(parent1);
            next.push(parent1.crossover(parent2, rng)?);
        }

        Ok(next)
    }

    /// Mutates every non-elite member in place.
    pub fn mutate_population<R>(
        &self,
        population: &mut Population,
        timetable: &Timetable<'_>,
        rng: &mut R,
    ) -> Result<(), GaError>
    where
        R: Rng + ?Sized,
    {
        let ranking = population.ranking();

        for index in ranking.into_iter().skip(self.params.elitism_count) {
            let donor = Individual::random(timetable, rng)?;
            let Some(individual) = population.get_mut(index) else {
                continue;
            };
            if individual.len() != donor.len() {
                return Err(GaError::ChromosomeLength {
                    expected: donor.len(),
                    actual: individual.len(),
                });
            }
            for position in 0..individual.len() {
                if rng.random::<f64>() < self.params.mutation_rate {
                    individual.set_gene(position, donor.gene(position));
                }
            }
        }

        Ok(())
    }
}
