use glam::Vec2;
use hoverseek_shared::*;
use rand::Rng;

/// Goal positions and their active/consumed status for one arena.
#[derive(Debug, Clone)]
pub struct GoalRegistry {
    goals: Vec<Goal>,
}

impl GoalRegistry {
    /// `count` active goals, all at the origin until placed.
    pub fn new(count: usize) -> Self {
        Self::from_positions((0..count).map(|_| Vec2::ZERO))
    }

    pub fn from_positions(positions: impl IntoIterator<Item = Vec2>) -> Self {
        let goals = positions
            .into_iter()
            .enumerate()
            .map(|(index, position)| Goal {
                index,
                position,
                active: true,
            })
            .collect();
        Self { goals }
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn get(&self, index: usize) -> Option<&Goal> {
        self.goals.get(index)
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.goals.get(index).is_some_and(|g| g.active)
    }

    pub fn active_count(&self) -> usize {
        self.goals.iter().filter(|g| g.active).count()
    }

    /// Active goals in index order.
    pub fn active(&self) -> impl Iterator<Item = &Goal> + '_ {
        self.goals.iter().filter(|g| g.active)
    }

    /// Nearest active goal to `position`. The lowest index wins ties.
    pub fn nearest_active_goal(&self, position: Vec2) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for goal in self.active() {
            let dist = goal.position.distance(position);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((goal.index, dist));
            }
        }
        best
    }

    pub fn reset_all_active(&mut self) {
        for goal in &mut self.goals {
            goal.active = true;
        }
    }

    /// Mark a goal consumed. Returns whether anything changed.
    pub fn deactivate(&mut self, index: usize) -> bool {
        match self.goals.get_mut(index) {
            Some(goal) if goal.active => {
                goal.active = false;
                true
            }
            _ => false,
        }
    }

    /// Replace goal positions, keeping indices. Extra positions add goals,
    /// missing ones drop trailing goals.
    pub fn place(&mut self, positions: &[Vec2]) {
        self.goals.truncate(positions.len());
        for (index, &position) in positions.iter().enumerate() {
            match self.goals.get_mut(index) {
                Some(goal) => goal.position = position,
                None => self.goals.push(Goal {
                    index,
                    position,
                    active: true,
                }),
            }
        }
    }
}

pub(crate) fn sample<R: Rng>(rng: &mut R, range: (f32, f32)) -> f32 {
    if range.1 > range.0 {
        rng.gen_range(range.0..range.1)
    } else {
        range.0
    }
}
