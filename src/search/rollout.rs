//! Rollouts: cheap simulations from a leaf to estimate its value.

use rand::RngCore;

use crate::policy::DefaultPolicy;
use crate::world::{Agent, World};

/// Final state of a rollout.
#[derive(Clone, Debug)]
pub struct Playout<W> {
    /// Simulated world after the last tick.
    pub world: W,
    /// Number of ticks simulated.
    pub ticks: u32,
    /// Whether the protagonist was caught at any point.
    pub captured: bool,
}

/// Simulates up to `max_steps` ticks from `start`, every agent driven by
/// `policy`.
///
/// Stops early when the protagonist is caught, or when the pill count or the
/// power pill count equals its total. The comparison is an equality: a world
/// in which nothing has been eaten yet is not simulated at all.
pub fn play_out<W: World, P: DefaultPolicy>(
    start: &W,
    policy: &P,
    max_steps: u32,
    rng: &mut dyn RngCore,
) -> Playout<W> {
    let lives = start.lives_remaining();
    let mut world = start.clone();
    let mut ticks = 0;
    let mut captured = false;
    while ticks < max_steps
        && !captured
        && world.active_pills() != world.total_pills()
        && world.active_power_pills() != world.total_power_pills()
    {
        let moves = policy.moves(&world, rng);
        world.advance(&moves);
        ticks += 1;
        captured = world.was_captured(Agent::Protagonist);
    }
    captured |= world.lives_remaining() < lives;
    Playout {
        world,
        ticks,
        captured,
    }
}

/// Outcomes of every rollout of a single decision, with running minimums.
///
/// Coordination rewards are relative to everything seen so far during the
/// same decision, so the history must start empty for each one.
#[derive(Clone, Debug)]
pub struct RewardHistory {
    samples: Vec<(i32, u32)>,
    min_score: i32,
    min_time: u32,
}

impl Default for RewardHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl RewardHistory {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
            min_score: i32::MAX,
            min_time: u32::MAX,
        }
    }

    /// Appends the score and elapsed ticks of a rollout's final state.
    pub fn record(&mut self, score: i32, time: u32) {
        self.samples.push((score, time));
        self.min_score = self.min_score.min(score);
        self.min_time = self.min_time.min(time);
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recorded `(score, time)` pairs, oldest first.
    #[must_use]
    pub fn samples(&self) -> &[(i32, u32)] {
        &self.samples
    }

    /// Lowest recorded score, `None` while empty.
    #[must_use]
    pub fn min_score(&self) -> Option<i32> {
        (!self.is_empty()).then_some(self.min_score)
    }

    /// Lowest recorded time, `None` while empty.
    #[must_use]
    pub fn min_time(&self) -> Option<u32> {
        (!self.is_empty()).then_some(self.min_time)
    }

    /// Weighted sum of the reciprocals of every recorded score and time,
    /// each offset by `penalty` and scaled by the respective minimum:
    ///
    /// `alpha * min_score * Σ 1/(score + penalty) + (1 - alpha) * min_time * Σ 1/(time + penalty)`
    ///
    /// Terms whose offset value is not positive are skipped. Zero while
    /// empty.
    #[must_use]
    pub fn weighted_reciprocals(&self, penalty: f64, alpha: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let mut scores = 0.0;
        let mut times = 0.0;
        for (score, time) in &self.samples {
            let score = f64::from(*score) + penalty;
            if score > 0.0 {
                scores += score.recip();
            }
            let time = f64::from(*time) + penalty;
            if time > 0.0 {
                times += time.recip();
            }
        }
        let score_term = alpha * f64::from(self.min_score) * scores;
        (1.0 - alpha).mul_add(f64::from(self.min_time) * times, score_term)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::maze::MazeWorld;
    use crate::policy::StarterPolicy;
    use crate::world::{JointAction, Move};

    /// Sends the protagonist right, whatever happens.
    struct Charge;

    impl DefaultPolicy for Charge {
        fn moves<W: World>(&self, _world: &W, _rng: &mut dyn RngCore) -> JointAction {
            [(Agent::Protagonist, Move::Right)].into_iter().collect()
        }
    }

    fn mid_game(input: &str, eaten: &[(usize, usize)]) -> MazeWorld {
        let mut world = MazeWorld::try_from(input).expect("valid maze");
        for (row, column) in eaten {
            world.consume(world.node_at(*row, *column).unwrap());
        }
        world
    }

    #[test]
    fn capture_ends_rollout() {
        let world = mid_game(
            "
            #########
            #M.....B#
            #########
            #PISo   #
            #########
            ",
            &[(1, 2), (3, 4)],
        );
        let mut rng = StdRng::seed_from_u64(1);
        let playout = play_out(&world, &Charge, 20, &mut rng);
        // Blinky walks left into the protagonist on the third tick.
        assert_eq!(playout.ticks, 3);
        assert!(playout.captured);
        assert_eq!(playout.world.lives_remaining(), world.lives_remaining() - 1);
    }

    #[test]
    fn step_cap() {
        let world = mid_game(
            "
            ##############
            #M...........#
            #.##########.#
            #............#
            ##############
            #PISBo       #
            ##############
            ",
            &[(1, 2), (5, 5)],
        );
        let mut rng = StdRng::seed_from_u64(1);
        let playout = play_out(&world, &StarterPolicy, 20, &mut rng);
        assert_eq!(playout.ticks, 20);
        assert!(!playout.captured);
        assert_eq!(playout.world.elapsed_ticks(), 20);
        assert!(playout.world.score() > world.score());
    }

    #[test]
    fn untouched_world_is_not_simulated() {
        let world = MazeWorld::try_from(
            "
            #########
            #M....o.#
            #########
            #BPIS   #
            #########
            ",
        )
        .expect("valid maze");
        let mut rng = StdRng::seed_from_u64(1);
        let playout = play_out(&world, &StarterPolicy, 20, &mut rng);
        assert_eq!(playout.ticks, 0);
        assert!(!playout.captured);
        assert_eq!(playout.world.elapsed_ticks(), 0);
    }

    #[test]
    fn history() {
        let mut history = RewardHistory::default();
        assert!(history.is_empty());
        assert_eq!(history.min_score(), None);
        assert!(history.weighted_reciprocals(0.0, 0.1).abs() < f64::EPSILON);

        history.record(200, 10);
        history.record(100, 20);
        assert_eq!(history.len(), 2);
        assert_eq!(history.samples(), &[(200, 10), (100, 20)]);
        assert_eq!(history.min_score(), Some(100));
        assert_eq!(history.min_time(), Some(10));

        // 0.1 * 100 * (1/200 + 1/100) + 0.9 * 10 * (1/10 + 1/20)
        let expected = 0.1 * 100.0 * 0.015 + 0.9 * 10.0 * 0.15;
        assert!((history.weighted_reciprocals(0.0, 0.1) - expected).abs() < 1e-12);

        // 0.1 * 100 * (1/250 + 1/150) + 0.9 * 10 * (1/60 + 1/70)
        let expected = 0.1 * 100.0 * (1.0 / 250.0 + 1.0 / 150.0)
            + 0.9 * 10.0 * (1.0 / 60.0 + 1.0 / 70.0);
        assert!((history.weighted_reciprocals(50.0, 0.1) - expected).abs() < 1e-12);
    }

    #[test]
    fn non_positive_terms_are_skipped() {
        let mut history = RewardHistory::new();
        history.record(0, 0);
        assert!(history.weighted_reciprocals(0.0, 0.1).abs() < f64::EPSILON);
        history.record(10, 5);
        // Minimums are zero now, so everything cancels out.
        assert!(history.weighted_reciprocals(0.0, 0.1).abs() < f64::EPSILON);
        assert!(history.weighted_reciprocals(25.0, 0.1).is_finite());
    }
}
