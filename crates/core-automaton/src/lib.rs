//! Automaton data model: position, heading, mode, and the parent/child
//! bookkeeping needed by the parameterized-instruction join protocol.
//!
//! Automata live in an [`AutomatonArena`] rather than owning each other
//! directly or via `Rc`: a parent holds the [`AutomatonId`]s of its
//! children, and steps/join logic (in `core-registry`/`core-world`) look
//! children up in the shared arena.

use core_grid::{Direction, Grid, Position, Rotation, Value};

/// Stable index into an [`AutomatonArena`]. Automata are never removed from
/// the arena (only from the world's live list), so indices stay valid for
/// the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AutomatonId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomatonState {
    Normal,
    Reading,
    Waiting,
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralTarget {
    Str,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsecutiveBehavior {
    Overwrite,
    Concat,
}

#[derive(Debug, Clone)]
pub struct Automaton {
    pub position: Position,
    pub direction: Direction,
    pub state: AutomatonState,
    pub literal: Option<(LiteralTarget, ConsecutiveBehavior)>,
    pub retval: Value,
    pub retcache: String,
    pub ignore_next: bool,
    pub children: Vec<AutomatonId>,
}

impl Automaton {
    fn new(position: Position, direction: Direction) -> Self {
        Self {
            position,
            direction,
            state: AutomatonState::Normal,
            literal: None,
            retval: Value::Str(String::new()),
            retcache: String::new(),
            ignore_next: false,
            children: Vec::new(),
        }
    }

    pub fn is_halted(&self) -> bool {
        self.state == AutomatonState::Halted
    }

    pub fn turn(&mut self, rotation: Rotation) {
        self.direction = self.direction.turned(rotation);
    }

    /// Apply one step of movement along `direction` (defaulting to the
    /// automaton's current heading). Halts the automaton if the resulting
    /// position falls outside the grid, preserving the source's `>`
    /// (rather than `>=`) tolerance on the high edge of each axis.
    pub fn move_dir(&mut self, grid: &Grid, direction: Option<Direction>) {
        let direction = direction.unwrap_or(self.direction);
        let (dr, dc) = direction.delta();
        let (row, col) = self.position;
        self.position = (row + dr, col + dc);
        if !grid.in_bounds_tolerant(self.position) {
            self.state = AutomatonState::Halted;
        }
    }

    pub fn start_literal(&mut self, target: LiteralTarget, behavior: ConsecutiveBehavior) {
        self.state = AutomatonState::Reading;
        self.literal = Some((target, behavior));
        self.retcache.clear();
    }
}

/// Owns every automaton ever created during a run. Indices are stable and
/// never reused, so `AutomatonId`s remain valid even after the holder
/// halts and drops out of the world's live list.
#[derive(Debug, Default)]
pub struct AutomatonArena {
    slots: Vec<Automaton>,
}

impl AutomatonArena {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Creates the root automaton at (0, 0) facing right.
    pub fn spawn_root(&mut self) -> AutomatonId {
        self.insert(Automaton::new((0, 0), Direction::Right))
    }

    /// Creates a child at the parent's current position/heading and records
    /// it as one of the parent's children.
    pub fn spawn_child(&mut self, parent: AutomatonId) -> AutomatonId {
        let (position, direction) = {
            let p = self.get(parent);
            (p.position, p.direction)
        };
        let child = self.insert(Automaton::new(position, direction));
        self.get_mut(parent).children.push(child);
        child
    }

    fn insert(&mut self, automaton: Automaton) -> AutomatonId {
        let id = AutomatonId(self.slots.len());
        self.slots.push(automaton);
        id
    }

    pub fn get(&self, id: AutomatonId) -> &Automaton {
        &self.slots[id.0]
    }

    pub fn get_mut(&mut self, id: AutomatonId) -> &mut Automaton {
        &mut self.slots[id.0]
    }

    pub fn all_children_halted(&self, id: AutomatonId) -> bool {
        self.get(id)
            .children
            .iter()
            .all(|c| self.get(*c).is_halted())
    }

    /// Collects and clears the ordered return values of `id`'s children,
    /// consumed once by the join half of a parameterized instruction.
    pub fn take_child_retvals(&mut self, id: AutomatonId) -> Vec<Value> {
        let children = std::mem::take(&mut self.get_mut(id).children);
        children.into_iter().map(|c| self.get(c).retval.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_child_inherits_position_and_direction() {
        let mut arena = AutomatonArena::new();
        let root = arena.spawn_root();
        arena.get_mut(root).position = (2, 3);
        arena.get_mut(root).direction = Direction::Up;
        let child = arena.spawn_child(root);
        assert_eq!(arena.get(child).position, (2, 3));
        assert_eq!(arena.get(child).direction, Direction::Up);
        assert_eq!(arena.get(root).children, vec![child]);
    }

    #[test]
    fn take_child_retvals_clears_children() {
        let mut arena = AutomatonArena::new();
        let root = arena.spawn_root();
        let c1 = arena.spawn_child(root);
        let c2 = arena.spawn_child(root);
        arena.get_mut(c1).retval = Value::Int(2);
        arena.get_mut(c2).retval = Value::Int(3);
        let vals = arena.take_child_retvals(root);
        assert_eq!(vals, vec![Value::Int(2), Value::Int(3)]);
        assert!(arena.get(root).children.is_empty());
    }

    #[test]
    fn move_dir_halts_out_of_bounds() {
        let grid = Grid::from_text("ab\ncd");
        let mut a = Automaton::new((0, 1), Direction::Right);
        a.move_dir(&grid, None);
        assert_eq!(a.position, (0, 2));
        assert_eq!(a.state, AutomatonState::Normal);
        a.move_dir(&grid, None);
        assert_eq!(a.state, AutomatonState::Halted);
    }
}
