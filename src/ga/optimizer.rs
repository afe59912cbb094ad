use std::time::Instant;

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::sync::{broadcast, watch};

use super::algorithm::{GaParameters, GeneticAlgorithm};
use super::individual::Individual;
use super::population::Population;
use super::registry::Registry;
use super::timetable::{ClashReport, ScheduledSession, Timetable};
use crate::error::GaError;
use crate::models::OptimizationStatus;

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Generation counter when the loop ended.
    pub generations: usize,
    pub best: Individual,
    pub fitness: f64,
    pub clashes: u32,
    pub sessions: Vec<ScheduledSession>,
    pub conflicts: ClashReport,
    /// True when the run ended on a stop signal.
    pub stopped: bool,
}

/// State of a run between generations.
#[derive(Debug)]
struct Evolution {
    population: Population,
    generation: usize,
}

/// Drives the generational loop for one registry.
pub struct Optimizer<'r> {
    ga: GeneticAlgorithm,
    timetable: Timetable<'r>,
}

impl<'r> Optimizer<'r> {
    pub fn new(registry: &'r Registry, params: GaParameters) -> Result<Self, GaError> {
        let ga = GeneticAlgorithm::new(params)?;
        let timetable = Timetable::new(registry)?;
        Ok(Self { ga, timetable })
    }

    /// Random source for a run: seeded from the parameters if a seed is set.
    pub fn rng(&self) -> StdRng {
        match self.ga.params().seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Runs to completion on the current thread.
    pub fn run<R>(&self, rng: &mut R) -> Result<Outcome, GaError>
    where
        R: Rng + ?Sized,
    {
        let mut evolution = self.start(rng)?;
        while !self.is_finished(&evolution) {
            self.advance(&mut evolution, rng)?;
        }
        self.finish(evolution, false)
    }

    /// Runs the loop inside an async task, publishing progress after every
    /// generation and stopping early when `stop_rx` turns true.
    pub async fn optimize<R>(
        &self,
        rng: &mut R,
        status_tx: Option<broadcast::Sender<OptimizationStatus>>,
        stop_rx: Option<watch::Receiver<bool>>,
    ) -> Result<Outcome, GaError>
    where
        R: Rng + ?Sized,
    {
        let start_time = Instant::now();
        let mut evolution = self.start(rng)?;
        let mut stopped = false;

        while !self.is_finished(&evolution) {
            if let Some(rx) = &stop_rx {
                if *rx.borrow() {
                    warn!("Optimization stopped at generation {}", evolution.generation);
                    stopped = true;
                    break;
                }
            }

            self.advance(&mut evolution, rng)?;

            if let Some(tx) = &status_tx {
                // ignore if no receivers
                let _ = tx.send(self.status(&evolution, &start_time, false));
            }

            tokio::task::yield_now().await;
        }

        if let Some(tx) = &status_tx {
            let _ = tx.send(self.status(&evolution, &start_time, true));
        }

        self.finish(evolution, stopped)
    }

    fn start<R>(&self, rng: &mut R) -> Result<Evolution, GaError>
    where
        R: Rng + ?Sized,
    {
        let params = self.ga.params();
        info!(
            "Starting GA optimization: population {}, sessions {}, max generations {}",
            params.population_size,
            self.timetable.session_count(),
            params.max_generations
        );

        let mut population = self.ga.init_population(&self.timetable, rng)?;
        self.ga.evaluate_population(&mut population, &self.timetable)?;
        Ok(Evolution {
            population,
            generation: 1,
        })
    }

    fn is_finished(&self, evolution: &Evolution) -> bool {
        self.ga.is_generation_budget_exhausted(evolution.generation)
            || self.ga.is_solution_found(&evolution.population)
    }

    fn advance<R>(&self, evolution: &mut Evolution, rng: &mut R) -> Result<(), GaError>
    where
        R: Rng + ?Sized,
    {
        let mut population = self.ga.crossover_population(&evolution.population, rng)?;
        self.ga
            .mutate_population(&mut population, &self.timetable, rng)?;
        self.ga.evaluate_population(&mut population, &self.timetable)?;
        evolution.population = population;
        evolution.generation += 1;

        debug!(
            "generation {}: best fitness {:.4}, population fitness {:.4}",
            evolution.generation,
            best_fitness(&evolution.population),
            evolution.population.population_fitness()
        );
        Ok(())
    }

    fn status(
        &self,
        evolution: &Evolution,
        start_time: &Instant,
        is_finished: bool,
    ) -> OptimizationStatus {
        let best_fitness = best_fitness(&evolution.population);
        OptimizationStatus {
            generation: evolution.generation,
            elapsed_time: start_time.elapsed(),
            best_fitness,
            population_fitness: evolution.population.population_fitness(),
            best_clashes: clashes_for(best_fitness),
            is_finished,
        }
    }

    fn finish(&self, evolution: Evolution, stopped: bool) -> Result<Outcome, GaError> {
        let best = evolution
            .population
            .fittest(0)
            .cloned()
            .ok_or(GaError::EmptyPopulation)?;
        let sessions = self.timetable.decode(best.chromosome())?;
        let conflicts = self.timetable.clash_report(&sessions)?;
        let fitness = best_fitness(&evolution.population);

        info!(
            "Optimization completed after {} generations - best fitness: {:.6}, clashes: {}",
            evolution.generation, fitness, conflicts.total_clashes
        );

        Ok(Outcome {
            generations: evolution.generation,
            best,
            fitness,
            clashes: conflicts.total_clashes,
            sessions,
            conflicts,
            stopped,
        })
    }
}

fn best_fitness(population: &Population) -> f64 {
    population
        .fittest(0)
        .and_then(Individual::fitness)
        .unwrap_or(0.0)
}

// inverse of 1 / (1 + clashes)
fn clashes_for(fitness: f64) -> u32 {
    if fitness > 0.0 {
        (1.0 / fitness - 1.0).round() as u32
    } else {
        0
    }
}
