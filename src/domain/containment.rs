//! Temporal containment checks
//!
//! Tasks must sit inside their requirement's dates, requirements inside their
//! project's dates, and requirements under one project must not overlap each
//! other. Records without dates impose (and are subject to) no constraint.

use super::interval::DateRange;
use super::record::{Requirement, Task};

/// Anything that may carry a calendar-date range
pub trait Dated {
    fn date_range(&self) -> Option<DateRange>;
}

impl Dated for Task {
    fn date_range(&self) -> Option<DateRange> {
        Some(self.interval.date_range())
    }
}

impl Dated for Requirement {
    fn date_range(&self) -> Option<DateRange> {
        self.range
    }
}

/// Returns true if `child` lies within `parent`, or if there is no parent range
pub fn within_parent(child: &DateRange, parent: Option<&DateRange>) -> bool {
    parent.map_or(true, |parent| parent.contains(child))
}

/// Returns the first sibling whose dates overlap `proposed`
pub fn first_overlapping_sibling<'a, T: Dated + 'a>(
    proposed: &DateRange,
    siblings: impl IntoIterator<Item = &'a T>,
) -> Option<&'a T> {
    siblings
        .into_iter()
        .find(|s| s.date_range().is_some_and(|range| proposed.overlaps(&range)))
}

/// Returns the first existing child that would fall outside `proposed`
pub fn first_child_outside<'a, T: Dated + 'a>(
    proposed: &DateRange,
    children: impl IntoIterator<Item = &'a T>,
) -> Option<&'a T> {
    children
        .into_iter()
        .find(|c| c.date_range().is_some_and(|range| !within_parent(&range, Some(proposed))))
}
