use qlearn::env::{full_action_range, DiscreteStateSpace, Environment};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;

/// A corridor of `len` cells, the agent starts at a random cell and must reach the right end.
/// Every step costs 1.
pub struct Corridor {
    len: usize,
    pos: usize,
    rng: StdRng,
}

impl Corridor {
    pub fn new(len: usize, seed: u64) -> Self {
        Self {
            len,
            pos: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn walk(&mut self, action: usize) -> Option<usize> {
        match action {
            LEFT => self.pos = self.pos.saturating_sub(1),
            RIGHT => self.pos += 1,
            _ => panic!("Invalid action: {action}"),
        }
        (self.pos + 1 < self.len).then_some(self.pos)
    }
}

impl Environment for Corridor {
    type State = usize;

    fn legal_actions(&self, _state: &usize) -> Vec<usize> {
        full_action_range(2)
    }

    fn action_space_size(&self) -> usize {
        2
    }

    fn step(&mut self, action: usize) -> (Option<usize>, f32) {
        (self.walk(action), -1.0)
    }

    fn reset(&mut self) -> usize {
        self.pos = self.rng.gen_range(0..self.len - 1);
        self.pos
    }
}

impl DiscreteStateSpace for Corridor {
    fn state_space_size(&self) -> usize {
        self.len
    }
}

/// The same corridor observed as a position in `[0, 1]`
pub struct ContinuousCorridor(pub Corridor);

impl ContinuousCorridor {
    fn observe(&self, pos: usize) -> Vec<f32> {
        vec![pos as f32 / (self.0.len - 1) as f32]
    }
}

impl Environment for ContinuousCorridor {
    type State = Vec<f32>;

    fn legal_actions(&self, _state: &Vec<f32>) -> Vec<usize> {
        full_action_range(2)
    }

    fn action_space_size(&self) -> usize {
        2
    }

    fn step(&mut self, action: usize) -> (Option<Vec<f32>>, f32) {
        let (next, reward) = self.0.step(action);
        (next.map(|pos| self.observe(pos)), reward)
    }

    fn reset(&mut self) -> Vec<f32> {
        let pos = self.0.reset();
        self.observe(pos)
    }
}
