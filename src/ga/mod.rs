//! Genetic-algorithm timetabling core.
//!
//! Leaves first: [`registry`] holds the reference data, [`timetable`] decodes
//! chromosomes and counts clashes, [`individual`] and [`population`] hold
//! candidate schedules, [`algorithm`] implements the genetic operators and
//! [`optimizer`] drives the generational loop.

pub mod algorithm;
pub mod individual;
pub mod optimizer;
pub mod population;
pub mod registry;
pub mod timetable;

pub use algorithm::{GaParameters, GeneticAlgorithm};
pub use individual::Individual;
pub use optimizer::{Optimizer, Outcome};
pub use population::Population;
pub use registry::{Gene, Registry};
pub use timetable::{ClashReport, ScheduledSession, Timetable};
