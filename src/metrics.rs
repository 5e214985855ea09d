//! Evaluation metrics for the warehouse environment.
//!
//! Runs a policy for several episodes and aggregates task throughput,
//! reward and travel.

use std::fmt;

use crate::env::WarehouseEnv;
use crate::error::SimError;
use crate::policy::Policy;
use crate::tracker::Transition;

/// Aggregated evaluation metrics over multiple episodes.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    /// Mean team reward (sum over robots) per episode.
    pub mean_team_reward: f64,
    pub mean_pickups: f64,
    pub mean_deliveries: f64,
    pub mean_episode_length: f64,
    /// Mean distance travelled per robot per episode.
    pub mean_distance_per_robot: f64,
    /// Steps in which at least one robot was held by the motion controller.
    pub clamped_steps: u32,
    pub n_episodes: usize,
}

#[derive(Debug, Default)]
struct EpisodeStats {
    team_reward: f64,
    pickups: u32,
    deliveries: u32,
    steps: u32,
    distance: f64,
    clamped_steps: u32,
}

impl EvaluationMetrics {
    /// Evaluates a policy over `n_episodes` episodes.
    ///
    /// # Arguments
    ///
    /// * `env` - Environment to run; it is reset before every episode
    /// * `policy` - Policy supplying the actions
    /// * `n_episodes` - Number of episodes to run
    ///
    /// # Errors
    ///
    /// Propagates reset failures and any step error caused by the policy
    /// returning a malformed action vector.
    pub fn evaluate(
        env: &mut WarehouseEnv,
        policy: &mut dyn Policy,
        n_episodes: usize,
    ) -> Result<Self, SimError> {
        let mut all_stats = Vec::with_capacity(n_episodes);

        for _ in 0..n_episodes {
            let mut obs = env.reset()?;
            let mut stats = EpisodeStats::default();

            loop {
                let actions = policy.select_actions(&obs);
                let result = env.step(&actions)?;

                stats.team_reward += result.team_reward();
                stats.distance += result.info.distances.iter().sum::<f64>();
                for t in &result.info.transitions {
                    match t {
                        Transition::Loaded { .. } => stats.pickups += 1,
                        Transition::Delivered { .. } => stats.deliveries += 1,
                        Transition::None => {}
                    }
                }
                if result.info.clamped.iter().any(|c| *c) {
                    stats.clamped_steps += 1;
                }
                stats.steps = result.step;
                obs = result.observations;

                if result.done {
                    break;
                }
            }

            all_stats.push(stats);
        }

        let robots = env.n_robots().max(1) as f64;

        Ok(Self {
            mean_team_reward: mean_of(&all_stats, |s| s.team_reward),
            mean_pickups: mean_of(&all_stats, |s| s.pickups as f64),
            mean_deliveries: mean_of(&all_stats, |s| s.deliveries as f64),
            mean_episode_length: mean_of(&all_stats, |s| s.steps as f64),
            mean_distance_per_robot: mean_of(&all_stats, |s| s.distance) / robots,
            clamped_steps: all_stats.iter().map(|s| s.clamped_steps).sum(),
            n_episodes,
        })
    }
}

fn mean_of(stats: &[EpisodeStats], f: impl Fn(&EpisodeStats) -> f64) -> f64 {
    stats.iter().map(f).sum::<f64>() / stats.len().max(1) as f64
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Evaluation Metrics ({} episodes) ===",
            self.n_episodes
        )?;
        writeln!(f, "  Mean team reward:        {:.2}", self.mean_team_reward)?;
        writeln!(f, "  Mean pickups:            {:.1}", self.mean_pickups)?;
        writeln!(f, "  Mean deliveries:         {:.1}", self.mean_deliveries)?;
        writeln!(f, "  Mean episode length:     {:.1}", self.mean_episode_length)?;
        writeln!(
            f,
            "  Mean distance / robot:   {:.2}",
            self.mean_distance_per_robot
        )?;
        writeln!(f, "  Clamped steps:           {}", self.clamped_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WarehouseConfig;
    use crate::policy::RandomPolicy;

    #[test]
    fn evaluate_completes() {
        let config = WarehouseConfig {
            horizon: 10,
            ..WarehouseConfig::default()
        };
        let mut env = WarehouseEnv::new(config, 42).unwrap();
        let mut policy = RandomPolicy::new(0);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 3).unwrap();
        assert_eq!(metrics.n_episodes, 3);
        assert!((metrics.mean_episode_length - 10.0).abs() < 1e-12);
        assert_eq!(metrics.clamped_steps, 0);
        assert!(metrics.to_string().contains("3 episodes"));
    }

    struct AlwaysWrongLength;

    impl Policy for AlwaysWrongLength {
        fn select_actions(&mut self, _observations: &[crate::observation::Observation]) -> Vec<usize> {
            vec![4]
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn malformed_actions_surface_as_errors() {
        let mut env = WarehouseEnv::new(WarehouseConfig::default(), 1).unwrap();
        let err = EvaluationMetrics::evaluate(&mut env, &mut AlwaysWrongLength, 1).unwrap_err();
        assert!(matches!(err, SimError::Step(_)));
    }
}
