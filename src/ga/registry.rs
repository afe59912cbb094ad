use hashbrown::HashMap;
use rand::{seq::IndexedRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::error::{Category, GaError};

/// A single chromosome value. Genes are used verbatim as registry keys.
pub type Gene = u32;

pub type RoomId = u32;
pub type TeacherId = u32;
pub type CourseId = u32;
pub type ClassGroupId = u32;
pub type TimeSlotId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub label: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub label: String,
    /// Teachers qualified to teach this course.
    pub teacher_ids: Vec<TeacherId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassGroup {
    pub id: ClassGroupId,
    pub label: String,
    /// Number of students, compared against room capacity.
    pub size: u32,
    pub course_ids: Vec<CourseId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    pub label: String,
}

/// Entities of one category in registration order, indexed by id.
#[derive(Debug, Clone)]
struct Entries<T> {
    items: Vec<T>,
    index: HashMap<u32, usize>,
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Entries<T> {
    // a replaced entity keeps its original position
    fn insert(&mut self, id: u32, item: T) {
        match self.index.get(&id) {
            Some(&pos) => self.items[pos] = item,
            None => {
                self.index.insert(id, self.items.len());
                self.items.push(item);
            }
        }
    }

    fn get(&self, id: u32) -> Option<&T> {
        self.index.get(&id).map(|&pos| &self.items[pos])
    }
}

/// Reference data for one scheduling problem.
///
/// The registry is built once before a run and only read afterwards. The GA
/// borrows it through [`Timetable`](super::timetable::Timetable); nothing in the
/// algorithm writes to it.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rooms: Entries<Room>,
    teachers: Entries<Teacher>,
    courses: Entries<Course>,
    class_groups: Entries<ClassGroup>,
    timeslots: Entries<TimeSlot>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_room(&mut self, id: RoomId, label: impl Into<String>, capacity: u32) {
        let label = label.into();
        self.rooms.insert(id, Room { id, label, capacity });
    }

    pub fn add_teacher(&mut self, id: TeacherId, label: impl Into<String>) {
        let label = label.into();
        self.teachers.insert(id, Teacher { id, label });
    }

    pub fn add_course(
        &mut self,
        id: CourseId,
        code: impl Into<String>,
        label: impl Into<String>,
        teacher_ids: &[TeacherId],
    ) {
        self.courses.insert(
            id,
            Course {
                id,
                code: code.into(),
                label: label.into(),
                teacher_ids: teacher_ids.to_vec(),
            },
        );
    }

    pub fn add_class_group(
        &mut self,
        id: ClassGroupId,
        label: impl Into<String>,
        size: u32,
        course_ids: &[CourseId],
    ) {
        self.class_groups.insert(
            id,
            ClassGroup {
                id,
                label: label.into(),
                size,
                course_ids: course_ids.to_vec(),
            },
        );
    }

    pub fn add_timeslot(&mut self, id: TimeSlotId, label: impl Into<String>) {
        let label = label.into();
        self.timeslots.insert(id, TimeSlot { id, label });
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn teacher(&self, id: TeacherId) -> Option<&Teacher> {
        self.teachers.get(id)
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.get(id)
    }

    pub fn class_group(&self, id: ClassGroupId) -> Option<&ClassGroup> {
        self.class_groups.get(id)
    }

    pub fn timeslot(&self, id: TimeSlotId) -> Option<&TimeSlot> {
        self.timeslots.get(id)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms.items
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers.items
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses.items
    }

    /// Class groups in registration order, the order the decoder walks them.
    pub fn class_groups(&self) -> &[ClassGroup] {
        &self.class_groups.items
    }

    pub fn timeslots(&self) -> &[TimeSlot] {
        &self.timeslots.items
    }

    /// Number of (class group, course) sessions that need scheduling.
    pub fn session_count(&self) -> usize {
        self.class_groups
            .items
            .iter()
            .map(|group| group.course_ids.len())
            .sum()
    }

    /// Picks a registered room uniformly at random.
    pub fn random_room<R>(&self, rng: &mut R) -> Result<&Room, GaError>
    where
        R: Rng + ?Sized,
    {
        self.rooms
            .items
            .choose(rng)
            .ok_or(GaError::EmptyRegistry(Category::Rooms))
    }

    /// Picks a registered timeslot uniformly at random.
    pub fn random_timeslot<R>(&self, rng: &mut R) -> Result<&TimeSlot, GaError>
    where
        R: Rng + ?Sized,
    {
        self.timeslots
            .items
            .choose(rng)
            .ok_or(GaError::EmptyRegistry(Category::Timeslots))
    }
}
