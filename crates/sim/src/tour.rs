//! Greedy nearest-neighbour tour length, used as the "ideal" path baseline
//! for the path-efficiency ratio. Deliberately approximate: the ratio is only
//! comparable across runs if every run uses the same greedy baseline.

use glam::Vec2;

/// Visit order (goal indices) and total Euclidean length of a greedy tour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GreedyTour {
    pub order: Vec<usize>,
    pub length: f32,
}

/// Build a greedy tour from `start` over `(index, position)` pairs.
///
/// Each hop jumps to the closest unvisited goal from the current endpoint.
/// Ties go to the goal encountered first in iteration order.
pub fn plan_greedy_tour<I>(start: Vec2, goals: I) -> GreedyTour
where
    I: IntoIterator<Item = (usize, Vec2)>,
{
    let mut remaining: Vec<(usize, Vec2)> = goals.into_iter().collect();
    let mut tour = GreedyTour {
        order: Vec::with_capacity(remaining.len()),
        length: 0.0,
    };
    let mut cursor = start;

    while !remaining.is_empty() {
        let mut nearest = 0;
        let mut nearest_dist = f32::INFINITY;
        for (slot, (_, position)) in remaining.iter().enumerate() {
            let dist = position.distance(cursor);
            if dist < nearest_dist {
                nearest_dist = dist;
                nearest = slot;
            }
        }

        // `remove` keeps the iteration order of the rest intact for tie-breaks.
        let (index, position) = remaining.remove(nearest);
        tour.order.push(index);
        tour.length += nearest_dist;
        cursor = position;
    }

    tour
}

/// Length of the greedy tour from `start` through every position.
pub fn estimate_shortest_tour(start: Vec2, goals: &[Vec2]) -> f32 {
    plan_greedy_tour(start, goals.iter().copied().enumerate()).length
}
