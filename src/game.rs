use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GameConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Cell offset for one step. `y` grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub cols: i32,
    pub rows: i32,
}

impl Grid {
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.cols && pos.y >= 0 && pos.y < self.rows
    }

    pub fn cell_count(&self) -> usize {
        (self.cols.max(0) as usize) * (self.rows.max(0) as usize)
    }

    /// Row-major iteration over every cell.
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |y| (0..cols).map(move |x| Position::new(x, y)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    NotStarted,
    Running,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfHit,
}

/// Inputs to the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Start,
    Reset,
    Turn(Direction),
    Tick,
}

/// What a single [`Action`] did to the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Ignored,
    Turned,
    Started,
    Restarted,
    Moved,
    Ate { score: u32, new_best: bool },
    GameOver(Collision),
    /// The snake covers the whole board; there is nowhere left for food.
    BoardFilled,
}

pub const INITIAL_DIRECTION: Direction = Direction::Right;
pub const INITIAL_HEAD_X: i32 = 5;
pub const INITIAL_LENGTH: i32 = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub config: GameConfig,
    /// Head first, tail last.
    pub snake: VecDeque<Position>,
    /// `None` only once the board is full.
    pub food: Option<Position>,
    pub active_direction: Direction,
    pub pending_direction: Direction,
    pub score: u32,
    pub high_score: u32,
    pub round: RoundState,
}

impl GameState {
    pub fn new<R: Rng + ?Sized>(config: GameConfig, high_score: u32, rng: &mut R) -> Self {
        let snake = initial_snake(&config.grid());
        let mut state = Self {
            config,
            snake,
            food: None,
            active_direction: INITIAL_DIRECTION,
            pending_direction: INITIAL_DIRECTION,
            score: 0,
            high_score,
            round: RoundState::NotStarted,
        };
        state.food = state.spawn_food(rng);
        state
    }

    pub fn grid(&self) -> Grid {
        self.config.grid()
    }

    pub fn head(&self) -> Position {
        // The body is never emptied: ticks only pop after a push.
        self.snake[0]
    }

    pub fn is_running(&self) -> bool {
        self.round == RoundState::Running
    }

    /// Cells not covered by the snake, row-major.
    pub fn free_cells(&self) -> Vec<Position> {
        self.grid()
            .cells()
            .filter(|cell| !self.snake.contains(cell))
            .collect()
    }

    /// Uniform pick among the free cells; `None` when the board is full.
    pub fn spawn_food<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        self.free_cells().choose(rng).copied()
    }

    /// Dispatches one action. Collisions are ordinary outcomes, never errors.
    pub fn apply<R: Rng + ?Sized>(&mut self, action: Action, rng: &mut R) -> GameEvent {
        match action {
            Action::Start => self.start(),
            Action::Reset => self.reset(rng),
            Action::Turn(dir) => self.request_direction(dir),
            Action::Tick => self.tick(rng),
        }
    }

    /// Buffers a turn for the next tick.
    ///
    /// The reversal check is against the direction latched at the last tick,
    /// so several requests inside one tick overwrite each other and the last
    /// valid one wins.
    pub fn request_direction(&mut self, dir: Direction) -> GameEvent {
        if !self.is_running() || dir == self.active_direction.opposite() {
            return GameEvent::Ignored;
        }
        self.pending_direction = dir;
        GameEvent::Turned
    }

    pub fn start(&mut self) -> GameEvent {
        if self.round != RoundState::NotStarted {
            return GameEvent::Ignored;
        }
        self.round = RoundState::Running;
        log::info!("Round started");
        GameEvent::Started
    }

    /// Back to the opening position with a fresh food cell. Allowed from any
    /// round state, including mid-round.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GameEvent {
        self.snake = initial_snake(&self.grid());
        self.active_direction = INITIAL_DIRECTION;
        self.pending_direction = INITIAL_DIRECTION;
        self.score = 0;
        self.round = RoundState::Running;
        self.food = self.spawn_food(rng);
        log::info!("Round reset");
        GameEvent::Restarted
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GameEvent {
        if !self.is_running() {
            return GameEvent::Ignored;
        }

        self.active_direction = self.pending_direction;
        let new_head = self.head().step(self.active_direction);

        // Nothing is committed on a collision.
        if !self.grid().contains(new_head) {
            return self.end_round(Collision::Wall);
        }
        if self.snake.contains(&new_head) {
            return self.end_round(Collision::SelfHit);
        }

        self.snake.push_front(new_head);

        if self.food != Some(new_head) {
            self.snake.pop_back();
            return GameEvent::Moved;
        }

        self.score = self.score.saturating_add(self.config.points_per_food);
        let new_best = self.score > self.high_score;
        if new_best {
            self.high_score = self.score;
        }
        log::debug!("Ate food at {:?}, score {}", new_head, self.score);

        self.food = self.spawn_food(rng);
        if self.food.is_none() {
            self.round = RoundState::Ended;
            log::info!("Board filled with score {}", self.score);
            return GameEvent::BoardFilled;
        }

        GameEvent::Ate {
            score: self.score,
            new_best,
        }
    }

    fn end_round(&mut self, collision: Collision) -> GameEvent {
        self.round = RoundState::Ended;
        log::info!("Game over ({:?}) with score {}", collision, self.score);
        GameEvent::GameOver(collision)
    }
}

/// Pure form of [`GameState::apply`]: returns the successor state and leaves
/// the input untouched.
pub fn transition<R: Rng + ?Sized>(
    state: &GameState,
    action: Action,
    rng: &mut R,
) -> (GameState, GameEvent) {
    let mut next = state.clone();
    let event = next.apply(action, rng);
    (next, event)
}

/// Three cells heading right, head at `(5, rows / 2)`.
pub fn initial_snake(grid: &Grid) -> VecDeque<Position> {
    let y = grid.rows / 2;
    (0..INITIAL_LENGTH)
        .map(|i| Position::new(INITIAL_HEAD_X - i, y))
        .collect()
}
