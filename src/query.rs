use crate::data::{RoomId, RoomReport, Section, Week, Weekday};
use serde::{Deserialize, Serialize};

/// A "which rooms are free from this section on" lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeRoomQuery {
    pub week: Week,
    pub weekday: Weekday,
    pub section: Section,
    pub building: Option<String>,
    pub floor: Option<String>,
}

/// A classroom that is free starting at the queried section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FreeRoom {
    pub building: String,
    pub floor: String,
    pub room_id: RoomId,
    pub max_continuous: usize,
    pub free_sections: Vec<String>,
}

/// Classrooms with at least one free section from `query.section` onward, in
/// report order. Sections count only while they stay consecutive.
pub fn find_free_rooms(report: &[RoomReport], query: &FreeRoomQuery) -> Vec<FreeRoom> {
    report
        .iter()
        .filter(|room| room.is_class_room)
        .filter(|room| query.building.as_ref().is_none_or(|b| *b == room.building))
        .filter(|room| query.floor.as_ref().is_none_or(|f| *f == room.floor))
        .filter_map(|room| {
            let free_sections: Vec<String> = Section::ALL[query.section.index()..]
                .iter()
                .take_while(|&&section| is_slot_free(room, query.week, query.weekday, section))
                .map(|section| section.code().to_string())
                .collect();
            (!free_sections.is_empty()).then(|| FreeRoom {
                building: room.building.clone(),
                floor: room.floor.clone(),
                room_id: room.room_id.clone(),
                max_continuous: free_sections.len(),
                free_sections,
            })
        })
        .collect()
}

/// A slot missing from the report counts as busy.
pub fn is_slot_free(room: &RoomReport, week: Week, weekday: Weekday, section: Section) -> bool {
    room.free_time
        .iter()
        .filter(|s| s.section == section.code())
        .flat_map(|s| &s.weeks)
        .find(|slot| slot.week == week && slot.week_day == weekday.label())
        .is_some_and(|slot| slot.is_free)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::AvailabilityGrid;
    use crate::weeks::WeekSet;

    fn room(building: &str, floor: &str, id: u32, is_class_room: bool, grid: &AvailabilityGrid) -> RoomReport {
        RoomReport {
            building: building.to_string(),
            floor: floor.to_string(),
            room_id: RoomId::Number(id),
            is_class_room,
            free_time: grid.to_report(),
        }
    }

    fn query(section: Section) -> FreeRoomQuery {
        FreeRoomQuery {
            week: 3,
            weekday: Weekday::Tuesday,
            section,
            building: None,
            floor: None,
        }
    }

    #[test]
    fn counts_consecutive_free_sections() {
        let mut grid = AvailabilityGrid::new();
        let week3: WeekSet = [3].into_iter().collect();
        grid.mark_occupied(Weekday::Tuesday, Section::Fourth, &week3);
        let report = vec![room("7号楼A区", "三楼", 303, true, &grid)];

        let free = find_free_rooms(&report, &query(Section::Second));
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].max_continuous, 2);
        assert_eq!(free[0].free_sections, vec!["0304", "0506"]);

        assert!(find_free_rooms(&report, &query(Section::Fourth)).is_empty());
        assert_eq!(find_free_rooms(&report, &query(Section::Fifth))[0].max_continuous, 1);
    }

    #[test]
    fn skips_non_classrooms_and_applies_filters() {
        let grid = AvailabilityGrid::new();
        let report = vec![
            room("7号楼A区", "三楼", 303, true, &grid),
            room("7号楼A区", "一楼", 101, true, &grid),
            room("9号楼", "二楼", 205, true, &grid),
            room("9号楼", "二楼", 206, false, &grid),
        ];
        assert_eq!(find_free_rooms(&report, &query(Section::First)).len(), 3);

        let mut q = query(Section::First);
        q.building = Some("7号楼A区".to_string());
        assert_eq!(find_free_rooms(&report, &q).len(), 2);
        q.floor = Some("三楼".to_string());
        let free = find_free_rooms(&report, &q);
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].room_id, RoomId::Number(303));
        assert_eq!(free[0].max_continuous, 5);
    }

    #[test]
    fn missing_slots_count_as_busy() {
        let mut report = room("9号楼", "二楼", 205, true, &AvailabilityGrid::new());
        report.free_time.clear();
        assert!(!is_slot_free(&report, 1, Weekday::Monday, Section::First));
    }
}
