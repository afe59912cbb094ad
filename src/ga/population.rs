use rand::{seq::SliceRandom, Rng};

use super::individual::Individual;
use super::timetable::Timetable;
use crate::error::GaError;

/// An ordered collection of individuals evaluated together.
#[derive(Debug, Clone, Default)]
pub struct Population {
    individuals: Vec<Individual>,
    population_fitness: f64,
}

impl Population {
    /// Creates `size` random individuals against `timetable`.
    pub fn random<R>(
        size: usize,
        timetable: &Timetable<'_>,
        rng: &mut R,
    ) -> Result<Self, GaError>
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..size)
            .map(|_| Individual::random(timetable, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_individuals(individuals))
    }

    /// An empty population with room for `capacity` members.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            individuals: Vec::with_capacity(capacity),
            population_fitness: 0.0,
        }
    }

    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self {
            individuals,
            population_fitness: 0.0,
        }
    }

    pub fn push(&mut self, individual: Individual) {
        self.individuals.push(individual);
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual> {
        self.individuals.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Individual> {
        self.individuals.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Individual> {
        self.individuals.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Individual> {
        self.individuals.get_mut(index)
    }

    /// Replaces the member at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the population.
    pub fn set(&mut self, index: usize, individual: Individual) {
        self.individuals[index] = individual;
    }

    /// Member indices ordered by fitness, best first.
    ///
    /// The sort is stable, so members with equal fitness keep their current
    /// relative order. Unevaluated members come last.
    pub fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.individuals.len()).collect();
        order.sort_by(|&a, &b| self.individuals[b].cmp_fitness(&self.individuals[a]));
        order
    }

    /// Returns the member with the `rank`-th highest fitness (0 = best).
    pub fn fittest(&self, rank: usize) -> Option<&Individual> {
        self.ranking()
            .get(rank)
            .map(|&index| &self.individuals[index])
    }

    /// Randomly permutes the members in place.
    pub fn shuffle<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.individuals.shuffle(rng);
    }

    /// Sum of member fitness from the last evaluation, kept for reporting.
    pub fn population_fitness(&self) -> f64 {
        self.population_fitness
    }

    pub fn set_population_fitness(&mut self, fitness: f64) {
        self.population_fitness = fitness;
    }
}
