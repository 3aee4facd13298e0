use rand::Rng;

use crate::config::GameConfig;
use crate::game::{Action, Direction, GameEvent, GameState, RoundState};
use crate::input::Command;
use crate::scheduler::TickScheduler;
use crate::storage::HighScoreStore;

type Subscriber = Box<dyn FnMut(&GameState, GameEvent)>;

/// A game session: the state machine plus its injected high-score store,
/// random source and tick clock.
///
/// Subscribers see the state after every change. They cannot reach back in.
pub struct Simulation<S, R> {
    state: GameState,
    store: S,
    rng: R,
    scheduler: TickScheduler,
    suspended: bool,
    subscribers: Vec<Subscriber>,
}

impl<S: HighScoreStore, R: Rng> Simulation<S, R> {
    pub fn new(config: GameConfig, store: S, mut rng: R) -> Self {
        let high_score = store.load();
        log::info!("Loaded high score {}", high_score);
        let scheduler = TickScheduler::new(config.tick_ms);
        let state = GameState::new(config, high_score, &mut rng);
        Self {
            state,
            store,
            rng,
            scheduler,
            suspended: false,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&GameState, GameEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn start(&mut self) -> GameEvent {
        self.apply(Action::Start)
    }

    pub fn reset(&mut self) -> GameEvent {
        self.apply(Action::Reset)
    }

    pub fn request_direction(&mut self, dir: Direction) -> GameEvent {
        self.apply(Action::Turn(dir))
    }

    pub fn tick(&mut self) -> GameEvent {
        self.apply(Action::Tick)
    }

    pub fn apply(&mut self, action: Action) -> GameEvent {
        let previous_best = self.state.high_score;
        let event = self.state.apply(action, &mut self.rng);

        if self.state.high_score > previous_best {
            self.store.save(self.state.high_score);
        }

        match event {
            GameEvent::Started | GameEvent::Restarted => {
                if !self.suspended {
                    self.scheduler.start();
                }
            }
            _ if self.state.round != RoundState::Running => self.scheduler.stop(),
            _ => {}
        }

        if event != GameEvent::Ignored {
            for subscriber in &mut self.subscribers {
                subscriber(&self.state, event);
            }
        }
        event
    }

    /// Routes a queued input command.
    pub fn handle(&mut self, command: Command) -> GameEvent {
        match command {
            Command::Suspend => {
                self.suspended = true;
                self.scheduler.stop();
                GameEvent::Ignored
            }
            Command::Resume => {
                self.suspended = false;
                if self.state.is_running() && !self.scheduler.is_running() {
                    self.scheduler.start();
                }
                GameEvent::Ignored
            }
            other => match other.to_action(self.state.round) {
                Some(action) => self.apply(action),
                None => GameEvent::Ignored,
            },
        }
    }

    /// Feeds elapsed frame time to the clock and runs every tick that is due.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        let due = self.scheduler.advance(dt_ms);
        let mut ran = 0;
        for _ in 0..due {
            if !self.scheduler.is_running() {
                break;
            }
            self.tick();
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Collision, Position};
    use crate::storage::MemoryStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(store: MemoryStore) -> Simulation<MemoryStore, ChaCha8Rng> {
        Simulation::new(GameConfig::default(), store, ChaCha8Rng::seed_from_u64(3))
    }

    fn place_food_ahead(sim: &mut Simulation<MemoryStore, ChaCha8Rng>) {
        let ahead = sim.state.head().step(sim.state.active_direction);
        sim.state.food = Some(ahead);
    }

    #[test]
    fn test_loads_high_score_at_construction() {
        let sim = session(MemoryStore::with_value(120));
        assert_eq!(sim.state().high_score, 120);
        assert_eq!(sim.state().round, RoundState::NotStarted);
        assert!(!sim.is_ticking());
    }

    #[test]
    fn test_start_begins_ticking() {
        let mut sim = session(MemoryStore::default());
        assert_eq!(sim.advance(500.0), 0);
        sim.start();
        assert!(sim.is_ticking());
        assert_eq!(sim.advance(110.0), 1);
        assert_eq!(sim.state().head(), Position::new(6, 10));
    }

    #[test]
    fn test_new_best_is_persisted_once_per_increase() {
        let store = MemoryStore::default();
        let mut sim = session(store.clone());
        sim.start();

        place_food_ahead(&mut sim);
        assert_eq!(
            sim.tick(),
            GameEvent::Ate {
                score: 10,
                new_best: true
            }
        );
        assert_eq!(store.value(), 10);
        assert_eq!(store.writes(), 1);

        sim.state.food = Some(Position::new(0, 0));
        sim.tick();
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_no_write_below_existing_best() {
        let store = MemoryStore::with_value(100);
        let mut sim = session(store.clone());
        sim.start();
        place_food_ahead(&mut sim);
        sim.tick();
        assert_eq!(sim.state().score, 10);
        assert_eq!(sim.state().high_score, 100);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_high_score_survives_reset_and_reload() {
        let store = MemoryStore::default();
        let mut sim = session(store.clone());
        sim.start();
        place_food_ahead(&mut sim);
        sim.tick();
        sim.reset();
        assert_eq!(sim.state().score, 0);
        assert_eq!(sim.state().high_score, 10);

        let reloaded = session(store);
        assert_eq!(reloaded.state().high_score, 10);
    }

    #[test]
    fn test_collision_stops_the_clock() {
        let mut sim = session(MemoryStore::default());
        sim.start();
        sim.request_direction(Direction::Up);

        // Head starts at y = 10; eleven ticks reach y = -1.
        let mut ran = 0;
        for _ in 0..20 {
            ran += sim.advance(110.0);
        }
        assert_eq!(ran, 11);
        assert_eq!(sim.state().round, RoundState::Ended);
        assert!(!sim.is_ticking());
        assert_eq!(sim.advance(10_000.0), 0);
    }

    #[test]
    fn test_no_ticks_after_game_over_within_one_frame() {
        let mut sim = session(MemoryStore::default());
        sim.start();
        sim.request_direction(Direction::Up);
        let mut ran = 0;
        // Several ticks fall due per frame; the run stops at the wall.
        for _ in 0..5 {
            ran += sim.advance(500.0);
        }
        assert_eq!(ran, 11);
        assert_eq!(sim.state().head(), Position::new(5, 0));
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let seen: Rc<RefCell<Vec<GameEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let mut sim = session(MemoryStore::default());
        let log = seen.clone();
        sim.subscribe(move |_, event| log.borrow_mut().push(event));

        sim.start();
        sim.state.food = Some(Position::new(19, 19));
        sim.request_direction(Direction::Left); // reversal, dropped
        sim.request_direction(Direction::Up);
        sim.tick();
        sim.state.snake = [(5, 0), (5, 1), (5, 2)]
            .iter()
            .map(|&(x, y)| Position::new(x, y))
            .collect();
        sim.tick();

        assert_eq!(
            *seen.borrow(),
            vec![
                GameEvent::Started,
                GameEvent::Turned,
                GameEvent::Moved,
                GameEvent::GameOver(Collision::Wall),
            ]
        );
    }

    #[test]
    fn test_suspend_and_resume() {
        let mut sim = session(MemoryStore::default());
        sim.handle(Command::Primary);
        assert_eq!(sim.state().round, RoundState::Running);

        sim.handle(Command::Suspend);
        assert_eq!(sim.advance(110.0), 0);

        sim.handle(Command::Resume);
        assert_eq!(sim.advance(110.0), 1);
    }

    #[test]
    fn test_resume_does_not_restart_ended_round() {
        let mut sim = session(MemoryStore::default());
        sim.handle(Command::Primary);
        sim.state.snake = [(0, 5), (1, 5)]
            .iter()
            .map(|&(x, y)| Position::new(x, y))
            .collect();
        sim.state.active_direction = Direction::Left;
        sim.state.pending_direction = Direction::Left;
        sim.tick();
        assert_eq!(sim.state().round, RoundState::Ended);

        sim.handle(Command::Resume);
        assert!(!sim.is_ticking());
        assert_eq!(sim.advance(110.0), 0);
    }

    #[test]
    fn test_primary_plays_again_after_game_over() {
        let mut sim = session(MemoryStore::default());
        sim.handle(Command::Primary);
        sim.request_direction(Direction::Up);
        for _ in 0..11 {
            sim.tick();
        }
        assert_eq!(sim.state().round, RoundState::Ended);

        assert_eq!(sim.handle(Command::Primary), GameEvent::Restarted);
        assert!(sim.is_ticking());
        assert_eq!(sim.state().head(), Position::new(5, 10));
    }
}
