//! Chromosome decoding and hard-constraint evaluation.
//!
//! A chromosome is read as consecutive `(timeslot, room, teacher)` triples, one
//! triple per session. Sessions are enumerated by walking the registry's class
//! groups in registration order and, inside each group, its courses in order.
//!
//! # Clash counting
//!
//! For every session A, [`Timetable::count_clashes`] adds one clash for each of:
//!
//! - the room's capacity is smaller than A's class group,
//! - some other session uses the same room in the same timeslot,
//! - some other session uses the same teacher in the same timeslot.
//!
//! The two double-booking checks stop at the first co-occupant, and every
//! session runs its own pass. A conflict between two sessions is therefore
//! counted once from each side and contributes 2 to the total. Fitness values
//! produced by [`GeneticAlgorithm`](super::algorithm::GeneticAlgorithm) are
//! calibrated against this scale.
//!
//! The scan is quadratic in the number of sessions and dominates the cost of a
//! generation.

use rand::{seq::IndexedRandom, Rng};
use serde::Serialize;

use super::registry::{
    ClassGroupId, CourseId, Gene, Registry, RoomId, TeacherId, TimeSlotId,
};
use crate::error::{Category, GaError};

/// Number of genes encoding one session.
pub const GENES_PER_SESSION: usize = 3;

/// One (class group, course) assignment decoded from a chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledSession {
    /// Position of the session in decode order.
    pub id: usize,
    pub class_group_id: ClassGroupId,
    pub course_id: CourseId,
    pub room_id: RoomId,
    pub teacher_id: TeacherId,
    pub timeslot_id: TimeSlotId,
}

/// Which constraints a decoded schedule violates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClashReport {
    /// Sessions placed in a room too small for their class group.
    pub capacity_violations: Vec<usize>,
    /// Session pairs sharing a room in the same timeslot.
    pub room_conflicts: Vec<(usize, usize)>,
    /// Session pairs sharing a teacher in the same timeslot.
    pub teacher_conflicts: Vec<(usize, usize)>,
    /// Clash count under the per-session scoring convention.
    pub total_clashes: u32,
}

#[derive(Debug, Clone)]
struct SessionSlot {
    class_group_id: ClassGroupId,
    course_id: CourseId,
    teacher_ids: Vec<TeacherId>,
}

/// Decoder and evaluator bound to a validated registry.
#[derive(Debug, Clone)]
pub struct Timetable<'r> {
    registry: &'r Registry,
    slots: Vec<SessionSlot>,
}

impl<'r> Timetable<'r> {
    /// Validates the registry for a run and fixes the session layout.
    ///
    /// Fails when a category needed to build genes is empty, when a class group
    /// refers to an unknown course, or when a course has no registered
    /// qualified teacher.
    pub fn new(registry: &'r Registry) -> Result<Self, GaError> {
        if registry.rooms().is_empty() {
            return Err(GaError::EmptyRegistry(Category::Rooms));
        }
        if registry.timeslots().is_empty() {
            return Err(GaError::EmptyRegistry(Category::Timeslots));
        }
        if registry.teachers().is_empty() {
            return Err(GaError::EmptyRegistry(Category::Teachers));
        }
        if registry.class_groups().is_empty() {
            return Err(GaError::EmptyRegistry(Category::ClassGroups));
        }

        let mut slots = Vec::with_capacity(registry.session_count());
        for group in registry.class_groups() {
            for &course_id in &group.course_ids {
                let course = registry.course(course_id).ok_or(GaError::UnknownCourse {
                    group: group.id,
                    course: course_id,
                })?;
                if course.teacher_ids.is_empty() {
                    return Err(GaError::NoQualifiedTeacher(course_id));
                }
                if let Some(&teacher) = course
                    .teacher_ids
                    .iter()
                    .find(|&&id| registry.teacher(id).is_none())
                {
                    return Err(GaError::UnknownTeacher {
                        course: course_id,
                        teacher,
                    });
                }
                slots.push(SessionSlot {
                    class_group_id: group.id,
                    course_id,
                    teacher_ids: course.teacher_ids.clone(),
                });
            }
        }

        Ok(Self { registry, slots })
    }

    pub fn session_count(&self) -> usize {
        self.slots.len()
    }

    pub fn chromosome_len(&self) -> usize {
        self.slots.len() * GENES_PER_SESSION
    }

    /// Draws a legal value for the gene at `position`.
    ///
    /// Timeslot and room genes come from the registered sets; teacher genes come
    /// from the qualified teachers of the session's course.
    pub fn random_gene<R>(&self, position: usize, rng: &mut R) -> Result<Gene, GaError>
    where
        R: Rng + ?Sized,
    {
        let slot = &self.slots[position / GENES_PER_SESSION];
        match position % GENES_PER_SESSION {
            0 => Ok(self.registry.random_timeslot(rng)?.id),
            1 => Ok(self.registry.random_room(rng)?.id),
            _ => slot
                .teacher_ids
                .choose(rng)
                .copied()
                .ok_or(GaError::NoQualifiedTeacher(slot.course_id)),
        }
    }

    /// Turns a chromosome into a fresh list of sessions.
    ///
    /// Genes are copied verbatim; no lookup or range repair happens here.
    pub fn decode(&self, chromosome: &[Gene]) -> Result<Vec<ScheduledSession>, GaError> {
        if chromosome.len() != self.chromosome_len() {
            return Err(GaError::ChromosomeLength {
                expected: self.chromosome_len(),
                actual: chromosome.len(),
            });
        }

        let sessions = self
            .slots
            .iter()
            .zip(chromosome.chunks_exact(GENES_PER_SESSION))
            .enumerate()
            .map(|(id, (slot, genes))| ScheduledSession {
                id,
                class_group_id: slot.class_group_id,
                course_id: slot.course_id,
                timeslot_id: genes[0],
                room_id: genes[1],
                teacher_id: genes[2],
            })
            .collect();
        Ok(sessions)
    }

    /// Counts hard-constraint violations; see the module docs for the scale.
    pub fn count_clashes(&self, sessions: &[ScheduledSession]) -> Result<u32, GaError> {
        let mut clashes = 0;

        for a in sessions {
            if self.exceeds_capacity(a)? {
                clashes += 1;
            }
            if sessions.iter().any(|b| shares_room(a, b)) {
                clashes += 1;
            }
            if sessions.iter().any(|b| shares_teacher(a, b)) {
                clashes += 1;
            }
        }

        Ok(clashes)
    }

    pub fn clash_report(&self, sessions: &[ScheduledSession]) -> Result<ClashReport, GaError> {
        let mut report = ClashReport {
            total_clashes: self.count_clashes(sessions)?,
            ..ClashReport::default()
        };

        for (i, a) in sessions.iter().enumerate() {
            if self.exceeds_capacity(a)? {
                report.capacity_violations.push(a.id);
            }
            for b in &sessions[i + 1..] {
                if shares_room(a, b) {
                    report.room_conflicts.push((a.id, b.id));
                }
                if shares_teacher(a, b) {
                    report.teacher_conflicts.push((a.id, b.id));
                }
            }
        }

        Ok(report)
    }

    fn exceeds_capacity(&self, session: &ScheduledSession) -> Result<bool, GaError> {
        let room = self
            .registry
            .room(session.room_id)
            .ok_or(GaError::InvalidGene {
                position: session.id * GENES_PER_SESSION + 1,
                gene: session.room_id,
                role: "room",
            })?;
        let group = self
            .registry
            .class_group(session.class_group_id)
            .ok_or(GaError::UnknownClassGroup(session.class_group_id))?;
        Ok(room.capacity < group.size)
    }
}

#[inline]
fn shares_room(a: &ScheduledSession, b: &ScheduledSession) -> bool {
    a.id != b.id && a.room_id == b.room_id && a.timeslot_id == b.timeslot_id
}

#[inline]
fn shares_teacher(a: &ScheduledSession, b: &ScheduledSession) -> bool {
    a.id != b.id && a.teacher_id == b.teacher_id && a.timeslot_id == b.timeslot_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_registry() -> Registry {
        let mut registry = Registry::new();
        registry.add_room(1, "A1", 15);
        registry.add_room(2, "B1", 30);
        registry.add_timeslot(1, "Mon 9:00 - 11:00");
        registry.add_timeslot(2, "Mon 11:00 - 13:00");
        registry.add_teacher(1, "T1");
        registry.add_teacher(2, "T2");
        registry.add_course(10, "cs1", "Computing", &[1, 2]);
        registry.add_course(20, "ma1", "Maths", &[2]);
        registry.add_class_group(100, "G1", 10, &[10, 20]);
        registry.add_class_group(200, "G2", 25, &[20]);
        registry
    }

    #[test]
    fn test_decode_follows_registration_order() {
        let registry = sample_registry();
        let timetable = Timetable::new(&registry).unwrap();
        assert_eq!(timetable.chromosome_len(), 9);

        let sessions = timetable.decode(&[1, 1, 1, 2, 1, 2, 1, 2, 2]).unwrap();
        let keys: Vec<_> = sessions
            .iter()
            .map(|s| (s.id, s.class_group_id, s.course_id))
            .collect();
        assert_eq!(keys, vec![(0, 100, 10), (1, 100, 20), (2, 200, 20)]);
        assert_eq!(sessions[1].timeslot_id, 2);
        assert_eq!(sessions[1].room_id, 1);
        assert_eq!(sessions[1].teacher_id, 2);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let registry = sample_registry();
        let timetable = Timetable::new(&registry).unwrap();
        assert_eq!(
            timetable.decode(&[1, 1, 1]),
            Err(GaError::ChromosomeLength {
                expected: 9,
                actual: 3
            })
        );
    }

    #[test]
    fn test_conflict_free_schedule() {
        let registry = sample_registry();
        let timetable = Timetable::new(&registry).unwrap();
        // G1 cs1 @1 in A1 by T1, G1 ma1 @2 in A1 by T2, G2 ma1 @1 in B1 by T2
        let sessions = timetable.decode(&[1, 1, 1, 2, 1, 2, 1, 2, 2]).unwrap();
        assert_eq!(timetable.count_clashes(&sessions), Ok(0));
    }

    #[test]
    fn test_room_double_booking_counts_twice() {
        let registry = sample_registry();
        let timetable = Timetable::new(&registry).unwrap();
        // G1 cs1 and G2 ma1 share room B1 at timeslot 1 with different teachers
        let sessions = timetable.decode(&[1, 2, 1, 2, 1, 2, 1, 2, 2]).unwrap();
        assert_eq!(timetable.count_clashes(&sessions), Ok(2));

        let report = timetable.clash_report(&sessions).unwrap();
        assert_eq!(report.room_conflicts, vec![(0, 2)]);
        assert!(report.teacher_conflicts.is_empty());
        assert_eq!(report.total_clashes, 2);
    }

    #[test]
    fn test_teacher_double_booking_counts_twice() {
        let registry = sample_registry();
        let timetable = Timetable::new(&registry).unwrap();
        // G1 ma1 and G2 ma1 both taught by T2 at timeslot 1 in different rooms
        let sessions = timetable.decode(&[2, 1, 1, 1, 1, 2, 1, 2, 2]).unwrap();
        assert_eq!(timetable.count_clashes(&sessions), Ok(2));
    }

    #[test]
    fn test_capacity_violation_counted_per_session() {
        let registry = sample_registry();
        let timetable = Timetable::new(&registry).unwrap();
        // G2 (25 students) in A1 (capacity 15)
        let sessions = timetable.decode(&[1, 1, 1, 2, 1, 2, 1, 1, 2]).unwrap();
        let report = timetable.clash_report(&sessions).unwrap();
        assert_eq!(report.capacity_violations, vec![2]);
        // G2 also shares A1 with G1 cs1 at timeslot 1
        assert_eq!(report.total_clashes, 3);
    }

    #[test]
    fn test_three_way_booking_stops_at_first_co_occupant() {
        let mut registry = sample_registry();
        registry.add_room(3, "C1", 100);
        let timetable = Timetable::new(&registry).unwrap();
        // all three sessions in C1 at timeslot 1, taught by T1, T2, T2
        let sessions = timetable.decode(&[1, 3, 1, 1, 3, 2, 1, 3, 2]).unwrap();
        // room: 1 per session = 3, teacher: sessions 1 and 2 share T2 = 2
        assert_eq!(timetable.count_clashes(&sessions), Ok(5));
    }

    #[test]
    fn test_single_session_never_clashes_with_itself() {
        let mut registry = Registry::new();
        registry.add_room(1, "A1", 10);
        registry.add_timeslot(1, "Mon");
        registry.add_teacher(1, "T1");
        registry.add_course(1, "c1", "C1", &[1]);
        registry.add_class_group(1, "G1", 10, &[1]);
        let timetable = Timetable::new(&registry).unwrap();

        let sessions = timetable.decode(&[1, 1, 1]).unwrap();
        assert_eq!(timetable.count_clashes(&sessions), Ok(0));
    }

    #[test]
    fn test_unregistered_room_gene_is_reported() {
        let registry = sample_registry();
        let timetable = Timetable::new(&registry).unwrap();
        let sessions = timetable.decode(&[1, 7, 1, 2, 1, 2, 1, 2, 2]).unwrap();
        assert_eq!(
            timetable.count_clashes(&sessions),
            Err(GaError::InvalidGene {
                position: 1,
                gene: 7,
                role: "room"
            })
        );
    }

    #[test]
    fn test_random_genes_respect_roles() {
        let registry = sample_registry();
        let timetable = Timetable::new(&registry).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            for position in 0..timetable.chromosome_len() {
                let gene = timetable.random_gene(position, &mut rng).unwrap();
                match (position / GENES_PER_SESSION, position % GENES_PER_SESSION) {
                    (_, 0) => assert!(registry.timeslot(gene).is_some()),
                    (_, 1) => assert!(registry.room(gene).is_some()),
                    (0, _) => assert!(gene == 1 || gene == 2),
                    _ => assert_eq!(gene, 2),
                }
            }
        }
    }

    #[test]
    fn test_new_rejects_incomplete_registry() {
        let mut registry = sample_registry();
        registry.add_course(30, "ph1", "Physics", &[]);
        registry.add_class_group(300, "G3", 5, &[30]);
        assert_eq!(
            Timetable::new(&registry).err(),
            Some(GaError::NoQualifiedTeacher(30))
        );

        let mut registry = sample_registry();
        registry.add_class_group(300, "G3", 5, &[99]);
        assert_eq!(
            Timetable::new(&registry).err(),
            Some(GaError::UnknownCourse {
                group: 300,
                course: 99
            })
        );

        let mut registry = Registry::new();
        registry.add_room(1, "A1", 10);
        registry.add_timeslot(1, "Mon");
        assert_eq!(
            Timetable::new(&registry).err(),
            Some(GaError::EmptyRegistry(Category::Teachers))
        );
    }
}
