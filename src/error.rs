use crate::ga::registry::{ClassGroupId, CourseId, Gene, TeacherId};

/// Registry category names used in configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Rooms,
    Teachers,
    Timeslots,
    ClassGroups,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Rooms => "rooms",
            Category::Teachers => "teachers",
            Category::Timeslots => "timeslots",
            Category::ClassGroups => "class groups",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GaError {
    #[error("registry has no {0}")]
    EmptyRegistry(Category),
    #[error("class group {group} takes unregistered course {course}")]
    UnknownCourse { group: ClassGroupId, course: CourseId },
    #[error("class group {0} is not registered")]
    UnknownClassGroup(ClassGroupId),
    #[error("course {course} names unregistered teacher {teacher}")]
    UnknownTeacher { course: CourseId, teacher: TeacherId },
    #[error("course {0} has no qualified teachers")]
    NoQualifiedTeacher(CourseId),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("population has no members")]
    EmptyPopulation,
    #[error("chromosome length {actual} does not match expected length {expected}")]
    ChromosomeLength { expected: usize, actual: usize },
    #[error("gene {gene} at position {position} is not a registered {role} id")]
    InvalidGene {
        position: usize,
        gene: Gene,
        role: &'static str,
    },
}
