//! Sample reference data used when a request carries no registry.

use crate::ga::Registry;

pub fn registry() -> Registry {
    let mut registry = Registry::new();

    registry.add_room(1, "Hall A1", 15);
    registry.add_room(2, "Hall B1", 30);
    registry.add_room(4, "Hall D1", 20);
    registry.add_room(5, "Hall F1", 25);

    let days = ["Mon", "Tue", "Wed", "Thu", "Fri"];
    let hours = ["9:00 - 11:00", "11:00 - 13:00", "13:00 - 15:00"];
    let mut id = 1;
    for day in days {
        for hour in hours {
            registry.add_timeslot(id, format!("{day} {hour}"));
            id += 1;
        }
    }

    registry.add_teacher(1, "Dr Li");
    registry.add_teacher(2, "Dr Zhang");
    registry.add_teacher(3, "Dr Xie");
    registry.add_teacher(4, "Dr Cheng");

    registry.add_course(1, "cs1", "Computer Science", &[1, 2]);
    registry.add_course(2, "en1", "English", &[1, 3]);
    registry.add_course(3, "ma1", "Mathematics", &[1, 2]);
    registry.add_course(4, "ph1", "Physics", &[3, 4]);
    registry.add_course(5, "hi1", "History", &[4]);
    registry.add_course(6, "dr1", "Drawing", &[1, 4]);

    registry.add_class_group(1, "Software Engineering 2018", 10, &[1, 3, 4]);
    registry.add_class_group(2, "E-Commerce 2018", 30, &[2, 3, 5, 6]);
    registry.add_class_group(3, "Logistics 2018", 18, &[3, 4, 5]);
    registry.add_class_group(4, "Computer Science 2018", 25, &[1, 4]);

    registry
}
