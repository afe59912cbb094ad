use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ga::optimizer::Outcome;
use crate::ga::registry::{ClassGroup, Course, Registry, Room, Teacher, TimeSlot};
use crate::ga::timetable::{ClashReport, ScheduledSession};
use crate::ga::GaParameters;

/// Reference data posted with an optimization request.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RegistryRequest {
    pub rooms: Vec<Room>,
    pub teachers: Vec<Teacher>,
    pub courses: Vec<Course>,
    pub class_groups: Vec<ClassGroup>,
    pub timeslots: Vec<TimeSlot>,
}

impl RegistryRequest {
    pub fn into_registry(self) -> Registry {
        let mut registry = Registry::new();
        for room in self.rooms {
            registry.add_room(room.id, room.label, room.capacity);
        }
        for teacher in self.teachers {
            registry.add_teacher(teacher.id, teacher.label);
        }
        for course in self.courses {
            registry.add_course(course.id, course.code, course.label, &course.teacher_ids);
        }
        for group in self.class_groups {
            registry.add_class_group(group.id, group.label, group.size, &group.course_ids);
        }
        for slot in self.timeslots {
            registry.add_timeslot(slot.id, slot.label);
        }
        registry
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OptimizationRequest {
    /// Falls back to the bundled demo data when absent.
    #[serde(default)]
    pub registry: Option<RegistryRequest>,
    #[serde(default)]
    pub parameters: GaParameters,
}

/// One scheduled session with labels resolved for display.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SessionView {
    pub session_id: usize,
    pub class_group_id: u32,
    pub class_group: String,
    pub course_id: u32,
    pub course: String,
    pub room_id: u32,
    pub room: String,
    pub teacher_id: u32,
    pub teacher: String,
    pub timeslot_id: u32,
    pub timeslot: String,
}

impl SessionView {
    pub fn resolve(session: &ScheduledSession, registry: &Registry) -> Self {
        SessionView {
            session_id: session.id,
            class_group_id: session.class_group_id,
            class_group: registry
                .class_group(session.class_group_id)
                .map(|g| g.label.clone())
                .unwrap_or_default(),
            course_id: session.course_id,
            course: registry
                .course(session.course_id)
                .map(|c| c.label.clone())
                .unwrap_or_default(),
            room_id: session.room_id,
            room: registry
                .room(session.room_id)
                .map(|r| r.label.clone())
                .unwrap_or_default(),
            teacher_id: session.teacher_id,
            teacher: registry
                .teacher(session.teacher_id)
                .map(|t| t.label.clone())
                .unwrap_or_default(),
            timeslot_id: session.timeslot_id,
            timeslot: registry
                .timeslot(session.timeslot_id)
                .map(|t| t.label.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct OptimizationResponse {
    pub success: bool,
    pub generations: usize,
    pub fitness: f64,
    pub clashes: u32,
    pub stopped: bool,
    pub conflicts: ClashReport,
    pub schedule: Vec<SessionView>,
}

impl OptimizationResponse {
    pub fn new(outcome: &Outcome, registry: &Registry) -> Self {
        OptimizationResponse {
            success: true,
            generations: outcome.generations,
            fitness: outcome.fitness,
            clashes: outcome.clashes,
            stopped: outcome.stopped,
            conflicts: outcome.conflicts.clone(),
            schedule: outcome
                .sessions
                .iter()
                .map(|session| SessionView::resolve(session, registry))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct OptimizationStatus {
    pub generation: usize,
    pub elapsed_time: Duration,
    pub best_fitness: f64,
    pub population_fitness: f64,
    pub best_clashes: u32,
    pub is_finished: bool,
}
