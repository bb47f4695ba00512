//! The Glicko-2 algorithm, an improvement on Glicko with an added volatility parameter.
//!
//! Developed by Mark Glickman as an improvement on Glicko.
//!
//! Every player carries a rating, a rating deviation (RD) and a volatility.
//! The volatility measures how erratic a player's results have been and decides how fast the deviation
//! grows back between rating periods. How fast the volatility itself may change is bounded by the
//! system constant `tau`, which has no universal default and must be picked per application.
//!
//! # Quickstart
//!
//! ```rust
//! use skillrank::{
//!     Outcomes,
//!     glicko2::{Glicko2Config, Glicko2Rating},
//! };
//!
//! // A new player starts at 1500 with a deviation of 350 and a volatility of 0.06.
//! let mut player = Glicko2Rating::new();
//!
//! // Or with stored values.
//! let opponent = Glicko2Rating {
//!     rating: 1640.0,
//!     deviation: 90.0,
//!     volatility: 0.059,
//!     skill: None,
//! };
//!
//! // Glickman recommends a tau between 0.3 and 1.2.
//! let config = Glicko2Config::new(0.5)?;
//!
//! player.update(&[opponent], &[Outcomes::WIN], &config)?;
//!
//! assert!(player.rating > 1500.0);
//! assert!(player.deviation < 350.0);
//! # Ok::<(), skillrank::RatingError>(())
//! ```
//!
//! # More Information
//! - [Glicko-2 paper (PDF)](http://www.glicko.net/glicko/glicko2.pdf)
//! - [Original Glicko paper (PDF)](http://www.glicko.net/glicko/glicko.pdf)
//! - [Illinois algorithm Wikipedia](https://en.wikipedia.org/wiki/Regula_falsi#The_Illinois_algorithm)

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand::Rng;
use std::f64::consts::{LN_10, PI};
use std::ops::RangeInclusive;
use tracing::{debug, error, trace, warn};

use crate::{
    Outcomes, Rating, RatingError, RatingPeriodSystem, RatingSystem, SolverStage, stats,
};

/// Ratio between the Glicko scale and the internal Glicko-2 scale.
pub const SCALING_FACTOR: f64 = 173.7178;
/// Glicko rating that maps to zero on the internal Glicko-2 scale.
pub const BASE_RATING: f64 = 1500.0;
/// Logistic scale used by [`Glicko2Rating::true_expected_outcome`] when none is given.
pub const DEFAULT_SKILL_SCALE: f64 = 350.0;
/// Coverage `1 - alpha` of [`Glicko2Rating::confidence_interval`] when no alpha is given.
pub const DEFAULT_ALPHA: f64 = 0.05;

const RECOMMENDED_TAU: RangeInclusive<f64> = 0.3..=1.2;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// The Glicko-2 rating of a player.
///
/// The default rating is 1500.0.
/// The default deviation is 350.0.
/// The default volatility is 0.06.
pub struct Glicko2Rating {
    /// The player's Glicko-2 rating number, by default 1500.0.
    pub rating: f64,
    /// The player's Glicko-2 rating deviation (RD), by default 350.0.
    pub deviation: f64,
    /// The player's Glicko-2 volatility, by default 0.06.
    pub volatility: f64,
    /// Hidden "true" skill of the player, only used to evaluate the rating system in simulations.
    /// Never read by the update.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub skill: Option<f64>,
}

impl Glicko2Rating {
    #[must_use]
    /// Initialise a new `Glicko2Rating` with a rating of 1500, a deviation of 350, a volatility of 0.06 and no skill.
    pub const fn new() -> Self {
        Self {
            rating: BASE_RATING,
            deviation: 350.0,
            volatility: 0.06,
            skill: None,
        }
    }

    #[must_use]
    /// Attaches a known hidden skill.
    pub const fn with_skill(mut self, skill: f64) -> Self {
        self.skill = Some(skill);
        self
    }

    /// Attaches a hidden skill drawn from a normal distribution centred on the rating with a spread of the deviation.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidParameter`] if the rating is not finite or the deviation is not positive.
    ///
    /// # Examples
    /// ```rust
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use skillrank::glicko2::Glicko2Rating;
    ///
    /// let mut rng = ChaCha8Rng::seed_from_u64(2024);
    /// let player = Glicko2Rating::new().sample_skill(&mut rng)?;
    ///
    /// assert!(player.skill.is_some());
    /// # Ok::<(), skillrank::RatingError>(())
    /// ```
    pub fn sample_skill<R: Rng + ?Sized>(mut self, rng: &mut R) -> Result<Self, RatingError> {
        self.skill = Some(stats::sample_normal(self.rating, self.deviation, rng)?);
        Ok(self)
    }

    /// Updates this rating in place from a rating period against `opponents` with the matching `outcomes`.
    ///
    /// The outcomes are from the perspective of this player. Opponents are only read.
    /// Nothing is written unless the whole update succeeds.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidParameter`] if `opponents` is empty, the lengths differ, or a rating is invalid,
    /// and [`RatingError::NumericNonconvergence`] if the volatility cannot be solved.
    pub fn update(
        &mut self,
        opponents: &[Self],
        outcomes: &[Outcomes],
        config: &Glicko2Config,
    ) -> Result<(), RatingError> {
        if opponents.len() != outcomes.len() {
            return Err(RatingError::invalid(format!(
                "got {} opponents but {} outcomes",
                opponents.len(),
                outcomes.len()
            )));
        }

        let results: Vec<(Self, Outcomes)> = opponents
            .iter()
            .copied()
            .zip(outcomes.iter().copied())
            .collect();

        *self = glicko2_rating_period(self, &results, config)?;
        Ok(())
    }

    /// Updates this rating in place from a single game.
    ///
    /// # Errors
    /// Same as [`Glicko2Rating::update`].
    pub fn update_single(
        &mut self,
        opponent: &Self,
        outcome: Outcomes,
        config: &Glicko2Config,
    ) -> Result<(), RatingError> {
        self.update(std::slice::from_ref(opponent), &[outcome], config)
    }

    #[must_use]
    /// Expected outcome of `player_one` against `player_two`, see [`expected_score`].
    pub fn expected_outcome(player_one: &Self, player_two: &Self) -> f64 {
        expected_score(player_one, player_two).0
    }

    /// Two-sided confidence interval of the rating with coverage `1 - alpha`.
    ///
    /// `None` gives the 95% interval.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidParameter`] unless `0 < alpha < 1`.
    ///
    /// # Examples
    /// ```rust
    /// # use assert_eq_float::assert_eq_float;
    /// use skillrank::glicko2::Glicko2Rating;
    ///
    /// let player = Glicko2Rating {
    ///     rating: 1500.0,
    ///     deviation: 30.0,
    ///     ..Default::default()
    /// };
    ///
    /// let (low, high) = player.confidence_interval(None)?;
    ///
    /// assert_eq_float!(low.round(), 1441.0);
    /// assert_eq_float!(high.round(), 1559.0);
    /// # Ok::<(), skillrank::RatingError>(())
    /// ```
    pub fn confidence_interval(&self, alpha: Option<f64>) -> Result<(f64, f64), RatingError> {
        let alpha = alpha.unwrap_or(DEFAULT_ALPHA);
        if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(RatingError::invalid(format!(
                "alpha must be within (0, 1), got {alpha}"
            )));
        }
        let z = stats::normal_quantile(1.0 - alpha / 2.0)?;

        Ok((
            z.mul_add(-self.deviation, self.rating),
            z.mul_add(self.deviation, self.rating),
        ))
    }

    /// Expected outcome of `player_one` against `player_two` from their hidden skills,
    /// as a logistic CDF of the skill difference with the given `scale` (`None` means 350).
    ///
    /// Only meaningful when a ground truth skill is tracked for evaluation.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidParameter`] if either player has no skill or the scale is not positive.
    pub fn true_expected_outcome(
        player_one: &Self,
        player_two: &Self,
        scale: Option<f64>,
    ) -> Result<f64, RatingError> {
        let scale = scale.unwrap_or(DEFAULT_SKILL_SCALE);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RatingError::invalid(format!(
                "scale must be positive, got {scale}"
            )));
        }
        let (Some(skill_one), Some(skill_two)) = (player_one.skill, player_two.skill) else {
            return Err(RatingError::invalid("both players need a hidden skill"));
        };

        Ok(stats::logistic_cdf(skill_one - skill_two, scale))
    }

    fn validate(&self, who: &str) -> Result<(), RatingError> {
        if !self.rating.is_finite() {
            return Err(RatingError::invalid(format!(
                "{who} rating must be finite, got {}",
                self.rating
            )));
        }
        if !self.deviation.is_finite() || self.deviation <= 0.0 {
            return Err(RatingError::invalid(format!(
                "{who} deviation must be positive, got {}",
                self.deviation
            )));
        }
        if !self.volatility.is_finite() || self.volatility <= 0.0 {
            return Err(RatingError::invalid(format!(
                "{who} volatility must be positive, got {}",
                self.volatility
            )));
        }
        Ok(())
    }

    fn to_internal(self) -> (f64, f64) {
        (
            (self.rating - BASE_RATING) / SCALING_FACTOR,
            self.deviation / SCALING_FACTOR,
        )
    }
}

impl Default for Glicko2Rating {
    fn default() -> Self {
        Self::new()
    }
}

impl Rating for Glicko2Rating {
    fn rating(&self) -> f64 {
        self.rating
    }
    fn uncertainty(&self) -> f64 {
        self.deviation
    }
    fn new(rating: Option<f64>, uncertainty: Option<f64>) -> Self {
        Self {
            rating: rating.unwrap_or(BASE_RATING),
            deviation: uncertainty.unwrap_or(350.0),
            ..Self::default()
        }
    }
}

impl From<(f64, f64, f64)> for Glicko2Rating {
    fn from((r, d, v): (f64, f64, f64)) -> Self {
        Self {
            rating: r,
            deviation: d,
            volatility: v,
            skill: None,
        }
    }
}

impl From<(f64, f64)> for Glicko2Rating {
    fn from((r, d): (f64, f64)) -> Self {
        Self {
            rating: r,
            deviation: d,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// Constants used in the Glicko-2 calculations.
///
/// There is deliberately no `Default`: the system constant `tau` depends on the application.
pub struct Glicko2Config {
    /// The system constant, bounding how much the volatility can change over time.
    /// Glickman recommends a value between 0.3 and 1.2.
    pub tau: f64,
    /// Bracket width at which the volatility solver stops, by default 0.000_001.
    pub convergence_tolerance: f64,
    /// Upper bound on the iterations of each solver stage, by default 10_000.
    pub max_iterations: usize,
}

impl Glicko2Config {
    /// Default bracket width at which the volatility solver stops.
    pub const DEFAULT_CONVERGENCE_TOLERANCE: f64 = 0.000_001;
    /// Default iteration bound of each solver stage.
    pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

    /// Initialise a new `Glicko2Config` with the given `tau`, a convergence tolerance of `0.000_001`
    /// and at most `10_000` iterations per solver stage.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidParameter`] if `tau` is not positive.
    pub fn new(tau: f64) -> Result<Self, RatingError> {
        let config = Self {
            tau,
            convergence_tolerance: Self::DEFAULT_CONVERGENCE_TOLERANCE,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        };
        config.validate()?;
        if !RECOMMENDED_TAU.contains(&tau) {
            warn!("tau {tau} is outside the recommended range of 0.3 to 1.2");
        }
        Ok(config)
    }

    /// Checks every field is inside its domain.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<(), RatingError> {
        if !self.tau.is_finite() || self.tau <= 0.0 {
            return Err(RatingError::invalid(format!(
                "tau must be positive, got {}",
                self.tau
            )));
        }
        if !self.convergence_tolerance.is_finite() || self.convergence_tolerance <= 0.0 {
            return Err(RatingError::invalid(format!(
                "convergence tolerance must be positive, got {}",
                self.convergence_tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(RatingError::invalid("max iterations must be at least 1"));
        }
        Ok(())
    }
}

/// Struct to calculate ratings and expected score for [`Glicko2Rating`]
pub struct Glicko2 {
    config: Glicko2Config,
}

impl RatingSystem for Glicko2 {
    type RATING = Glicko2Rating;
    type CONFIG = Glicko2Config;

    fn new(config: Self::CONFIG) -> Self {
        Self { config }
    }

    fn rate(
        &self,
        player_one: &Glicko2Rating,
        player_two: &Glicko2Rating,
        outcome: &Outcomes,
    ) -> Result<(Glicko2Rating, Glicko2Rating), RatingError> {
        glicko2(player_one, player_two, outcome, &self.config)
    }

    fn expected_score(
        &self,
        player_one: &Glicko2Rating,
        player_two: &Glicko2Rating,
    ) -> Result<(f64, f64), RatingError> {
        Ok(expected_score(player_one, player_two))
    }
}

impl RatingPeriodSystem for Glicko2 {
    type RATING = Glicko2Rating;
    type CONFIG = Glicko2Config;

    fn new(config: Self::CONFIG) -> Self {
        Self { config }
    }

    fn rate(
        &self,
        player: &Glicko2Rating,
        results: &[(Glicko2Rating, Outcomes)],
    ) -> Result<Glicko2Rating, RatingError> {
        glicko2_rating_period(player, results, &self.config)
    }

    fn expected_score(&self, player: &Glicko2Rating, opponents: &[Glicko2Rating]) -> Vec<f64> {
        expected_score_rating_period(player, opponents)
    }
}

/// Calculates the [`Glicko2Rating`]s of two players based on their old ratings, deviations, volatilities, and the outcome of the game.
///
/// Each player is rated as if the game were a rating period of its own, against the other player's rating from before the game.
///
/// The outcome of the match is in the perspective of `player_one`.
/// This means [`Outcomes::WIN`] is a win for `player_one` and [`Outcomes::LOSS`] is a win for `player_two`.
///
/// # Errors
/// Same as [`glicko2_rating_period`].
///
/// # Examples
/// ```rust
/// use skillrank::{
///     Outcomes,
///     glicko2::{Glicko2Config, Glicko2Rating, glicko2},
/// };
///
/// let player_one = Glicko2Rating::new();
/// let player_two = Glicko2Rating::new();
///
/// let (new_one, new_two) = glicko2(
///     &player_one,
///     &player_two,
///     &Outcomes::WIN,
///     &Glicko2Config::new(0.5)?,
/// )?;
///
/// assert!(new_one.rating > 1500.0);
/// assert!(new_two.rating < 1500.0);
/// assert!((new_one.rating - 1500.0 - (1500.0 - new_two.rating)).abs() < 1e-6);
/// # Ok::<(), skillrank::RatingError>(())
/// ```
pub fn glicko2(
    player_one: &Glicko2Rating,
    player_two: &Glicko2Rating,
    outcome: &Outcomes,
    config: &Glicko2Config,
) -> Result<(Glicko2Rating, Glicko2Rating), RatingError> {
    let new_one = glicko2_rating_period(player_one, &[(*player_two, *outcome)], config)?;
    let new_two = glicko2_rating_period(player_two, &[(*player_one, outcome.reverse())], config)?;

    Ok((new_one, new_two))
}

/// Calculates a [`Glicko2Rating`] from a full rating period.
///
/// Takes in a player as a [`Glicko2Rating`] and their results as a Slice of tuples containing the opponent as a [`Glicko2Rating`],
/// the outcome of the game as an [`Outcome`](Outcomes), and a [`Glicko2Config`].
///
/// The outcome of each game is in the perspective of the player.
/// The player's hidden skill is carried over unchanged.
///
/// # Errors
/// Returns [`RatingError::InvalidParameter`] if `results` is empty or any rating or the config is invalid,
/// and [`RatingError::NumericNonconvergence`] if the new volatility cannot be solved within `config.max_iterations`.
///
/// # Examples
/// ```rust
/// use approx::assert_abs_diff_eq;
/// use skillrank::{
///     Outcomes,
///     glicko2::{Glicko2Config, Glicko2Rating, glicko2_rating_period},
/// };
///
/// // The worked example from Glickman's paper.
/// let player = Glicko2Rating::from((1500.0, 200.0));
/// let results = [
///     (Glicko2Rating::from((1400.0, 30.0)), Outcomes::WIN),
///     (Glicko2Rating::from((1550.0, 100.0)), Outcomes::LOSS),
///     (Glicko2Rating::from((1700.0, 300.0)), Outcomes::LOSS),
/// ];
///
/// let new_player = glicko2_rating_period(&player, &results, &Glicko2Config::new(0.5)?)?;
///
/// assert_abs_diff_eq!(new_player.rating, 1464.05, epsilon = 0.01);
/// assert_abs_diff_eq!(new_player.deviation, 151.52, epsilon = 0.01);
/// assert_abs_diff_eq!(new_player.volatility, 0.05999, epsilon = 0.00001);
/// # Ok::<(), skillrank::RatingError>(())
/// ```
pub fn glicko2_rating_period(
    player: &Glicko2Rating,
    results: &[(Glicko2Rating, Outcomes)],
    config: &Glicko2Config,
) -> Result<Glicko2Rating, RatingError> {
    config.validate()?;
    player.validate("player")?;
    if results.is_empty() {
        return Err(RatingError::invalid(
            "a rating period needs at least one opponent",
        ));
    }
    for (index, (opponent, _)) in results.iter().enumerate() {
        opponent.validate(&format!("opponent {index}"))?;
    }

    let (mu, phi) = player.to_internal();

    // (g(phi_j), E_j, s_j) per game.
    let games: Vec<(f64, f64, f64)> = results
        .iter()
        .map(|(opponent, outcome)| {
            let (opponent_mu, opponent_phi) = opponent.to_internal();
            let g = g_value(opponent_phi);
            (g, e_value(mu, opponent_mu, g), outcome.to_chess_points())
        })
        .collect();

    let v = games
        .iter()
        .map(|&(g, e, _)| g.powi(2) * e * (1.0 - e))
        .sum::<f64>()
        .recip();
    if !v.is_finite() {
        return Err(RatingError::invalid(
            "opponents are too far from the player to carry any information",
        ));
    }

    let score_sum: f64 = games.iter().map(|&(g, e, s)| g * (s - e)).sum();
    let delta = v * score_sum;

    let new_volatility = new_volatility(player.volatility, phi, v, delta, config)
        .inspect_err(|err| error!("Glicko-2 volatility solver failed: {err}"))?;

    let phi_star = phi.hypot(new_volatility);
    let new_phi = (phi_star.powi(2).recip() + v.recip()).sqrt().recip();
    let new_mu = new_phi.powi(2).mul_add(score_sum, mu);

    Ok(Glicko2Rating {
        rating: new_mu.mul_add(SCALING_FACTOR, BASE_RATING),
        deviation: new_phi * SCALING_FACTOR,
        volatility: new_volatility,
        skill: player.skill,
    })
}

#[must_use]
/// Calculates the expected outcome of two players with the logistic formula of the original Glicko paper.
///
/// Works on the Glicko scale directly and folds both deviations into one.
/// Returns the probability of victory for each player as an [`f64`] between 1.0 and 0.0.
///
/// # Examples
/// ```rust
/// # use assert_eq_float::assert_eq_float;
/// use skillrank::glicko2::{Glicko2Rating, expected_score};
///
/// let player_one = Glicko2Rating::from((1400.0, 80.0));
/// let player_two = Glicko2Rating::from((1500.0, 150.0));
///
/// let (exp_one, exp_two) = expected_score(&player_one, &player_two);
///
/// assert_eq_float!(exp_one + exp_two, 1.0);
/// assert_eq_float!((exp_one * 1000.0).round(), 376.0);
/// ```
pub fn expected_score(player_one: &Glicko2Rating, player_two: &Glicko2Rating) -> (f64, f64) {
    let q = LN_10 / 400.0;
    let combined_deviation = player_one.deviation.hypot(player_two.deviation);
    let g = (3.0 * q.powi(2) * combined_deviation.powi(2) / PI.powi(2) + 1.0)
        .sqrt()
        .recip();

    let exp_one = (10_f64.powf(-g * (player_one.rating - player_two.rating) / 400.0) + 1.0).recip();

    (exp_one, 1.0 - exp_one)
}

#[must_use]
/// Calculates the expected outcome of a player in a rating period or tournament.
///
/// Returns the probability of victory for each match as a Vec of [`f64`] between 1.0 and 0.0 from the perspective of the player.
pub fn expected_score_rating_period(player: &Glicko2Rating, opponents: &[Glicko2Rating]) -> Vec<f64> {
    opponents
        .iter()
        .map(|o| expected_score(player, o).0)
        .collect()
}

#[must_use]
/// Widens the deviation of a player who did not compete during a rating period.
///
/// Only the deviation changes, to `sqrt(phi^2 + sigma^2)` on the internal scale.
///
/// # Examples
/// ```rust
/// use skillrank::glicko2::{Glicko2Rating, decay_deviation};
///
/// let player = Glicko2Rating::from((1800.0, 60.0, 0.06));
/// let idle = decay_deviation(&player);
///
/// assert!(idle.deviation > player.deviation);
/// assert!((idle.rating - player.rating).abs() < f64::EPSILON);
/// ```
pub fn decay_deviation(player: &Glicko2Rating) -> Glicko2Rating {
    let phi = player.deviation / SCALING_FACTOR;

    Glicko2Rating {
        deviation: phi.hypot(player.volatility) * SCALING_FACTOR,
        ..*player
    }
}

fn g_value(phi: f64) -> f64 {
    (3.0 * phi.powi(2) / PI.powi(2) + 1.0).sqrt().recip()
}

fn e_value(mu: f64, opponent_mu: f64, g: f64) -> f64 {
    ((-g * (mu - opponent_mu)).exp() + 1.0).recip()
}

/// Solves `f(x) = 0` for `x = ln(sigma'^2)` and returns `sigma'`.
fn new_volatility(
    volatility: f64,
    phi: f64,
    v: f64,
    delta: f64,
    config: &Glicko2Config,
) -> Result<f64, RatingError> {
    let tau = config.tau;
    let ln_variance = volatility.powi(2).ln();
    let delta_sq = delta.powi(2);
    let phi_sq = phi.powi(2);

    let f = |x: f64| {
        let ex = x.exp();
        ex * (delta_sq - phi_sq - v - ex) / (2.0 * (phi_sq + v + ex).powi(2))
            - (x - ln_variance) / tau.powi(2)
    };

    let mut point_a = ln_variance;
    let mut point_b = if delta_sq > phi_sq + v {
        (delta_sq - phi_sq - v).ln()
    } else {
        bracket_below(&f, ln_variance, tau, config.max_iterations)?
    };

    let mut value_a = f(point_a);
    let mut value_b = f(point_b);
    if !value_a.is_finite() || !value_b.is_finite() {
        return Err(RatingError::NumericNonconvergence {
            stage: SolverStage::Bracket,
            iterations: 0,
        });
    }

    let mut iterations = 0;
    while (point_b - point_a).abs() > config.convergence_tolerance {
        if iterations >= config.max_iterations {
            return Err(RatingError::NumericNonconvergence {
                stage: SolverStage::Illinois,
                iterations,
            });
        }
        iterations += 1;

        let point_c = point_a + (point_a - point_b) * value_a / (value_b - value_a);
        let value_c = f(point_c);
        if !point_c.is_finite() || !value_c.is_finite() {
            return Err(RatingError::NumericNonconvergence {
                stage: SolverStage::Illinois,
                iterations,
            });
        }

        if value_c * value_b < 0.0 {
            point_a = point_b;
            value_a = value_b;
        } else {
            value_a /= 2.0;
        }
        point_b = point_c;
        value_b = value_c;

        trace!("illinois step {iterations}: A = {point_a}, B = {point_b}");
    }

    debug!("volatility converged after {iterations} illinois iterations");
    Ok((point_a / 2.0).exp())
}

/// Steps down from `ln_variance` in multiples of `tau` until `f` is no longer negative.
fn bracket_below(
    f: impl Fn(f64) -> f64,
    ln_variance: f64,
    tau: f64,
    max_iterations: usize,
) -> Result<f64, RatingError> {
    for k in 1..=max_iterations {
        let candidate = (k as f64).mul_add(-tau, ln_variance);
        let value = f(candidate);
        if !value.is_finite() {
            return Err(RatingError::NumericNonconvergence {
                stage: SolverStage::Bracket,
                iterations: k,
            });
        }
        if value >= 0.0 {
            return Ok(candidate);
        }
    }

    Err(RatingError::NumericNonconvergence {
        stage: SolverStage::Bracket,
        iterations: max_iterations,
    })
}
