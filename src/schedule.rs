//! Weekly schedule grid derivation.
//!
//! Projects the caller's enrolled courses onto a fixed 14-period × 7-day
//! occupancy grid. The grid is rebuilt from scratch on every projection;
//! nothing is updated incrementally.

use serde::Serialize;

use crate::timeslot::{
    expand_periods, resolve_period, resolve_weekday_number, PERIOD_COUNT, WEEKDAY_COUNT,
};
use crate::types::{EnrollmentRecord, EnrollmentStatus};

/// One occupied slot on the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleCell {
    pub name: String,
    pub classroom: String,
    pub id: i64,
    pub enrollment_id: i64,
}

/// The derived weekly grid plus the aggregate credit total.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleGrid {
    /// `cells[period - 1][weekday - 1]`, periods 1..=14, weekdays 1..=7
    cells: Vec<Vec<Option<ScheduleCell>>>,
    pub total_credits: f64,
}

impl ScheduleGrid {
    fn empty() -> Self {
        Self {
            cells: vec![vec![None; WEEKDAY_COUNT]; PERIOD_COUNT],
            total_credits: 0.0,
        }
    }

    /// Cell at (period 1..=14, weekday 1..=7); out-of-range is empty.
    pub fn cell(&self, period: u32, weekday: u8) -> Option<&ScheduleCell> {
        let p = period.checked_sub(1)? as usize;
        let w = weekday.checked_sub(1)? as usize;
        self.cells.get(p)?.get(w)?.as_ref()
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|c| c.is_some())
            .count()
    }

    /// One grid row (all 7 weekdays) for a period, for rendering.
    pub fn row(&self, period: u32) -> &[Option<ScheduleCell>] {
        &self.cells[period as usize - 1]
    }
}

/// Derives the schedule grid from enrollment records.
///
/// Only `enrolled` records are placed; favorites are ignored entirely,
/// including their credits. Per record, weekday and period resolve through
/// the structured-first rules in [`crate::timeslot`]; records with no time
/// placement are omitted from the grid but still counted toward the credit
/// total. Collisions are resolved last-write-wins in iteration order, with
/// no conflict detection.
pub fn project(records: &[EnrollmentRecord]) -> ScheduleGrid {
    let mut grid = ScheduleGrid::empty();

    for record in records {
        if record.status != EnrollmentStatus::Enrolled {
            continue;
        }
        let course = &record.course;

        let weekday = resolve_weekday_number(course);
        let period = resolve_period(course);

        if let (Some(weekday), Some(period)) = (weekday, period) {
            for p in expand_periods(&period) {
                // values outside the timetable are silently dropped here
                if (1..=PERIOD_COUNT as u32).contains(&p) {
                    grid.cells[p as usize - 1][weekday as usize - 1] = Some(ScheduleCell {
                        name: course.course_name.clone().unwrap_or_default(),
                        classroom: course.classroom.clone().unwrap_or_default(),
                        id: course.id,
                        enrollment_id: record.enrollment_id,
                    });
                }
            }
        }

        grid.total_credits += course.credit_value();
    }

    grid
}
