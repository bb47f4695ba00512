//! A Bayesian approximation method for online ranking, using the Bradley-Terry model with full pairing.
//!
//! Developed by Ruby C. Weng and Chih-Jen Lin, this is Algorithm 1 of their paper.
//! It rates any number of teams of any size from a single ranking of the teams, ties included.
//!
//! Every player is a normal belief over their skill, stored as a mean `rating` and a `variance`.
//! A team is the sum of its players: the team mean is the sum of player means, the team variance the sum of player variances.
//! Each team is compared against every other team, and the resulting shift is split between the team's players
//! in proportion to how much of the team variance each of them holds.
//!
//! Win probabilities follow the Bradley-Terry model, a logistic link on the difference of team means.
//!
//! # Quickstart
//!
//! ```rust
//! use skillrank::{
//!     MultiTeamOutcome,
//!     weng_lin::{WengLinConfig, WengLinRating, weng_lin_multi_team},
//! };
//!
//! // Initialise a new player rating with a rating of 25 and a variance of (25/3)² ≈ 69.44.
//! let player_one = WengLinRating::new();
//!
//! // Or with stored values, as (rating, variance).
//! let player_two = WengLinRating::from((31.2, 4.41));
//! let player_three = WengLinRating::from((22.0, 16.0));
//!
//! // A smaller beta makes the same rating gap more decisive.
//! let config = WengLinConfig {
//!     beta: 25.0 / 12.0,
//!     ..Default::default()
//! };
//!
//! // Team one takes the first place, team two the second.
//! let new_teams = weng_lin_multi_team(
//!     &[
//!         (&[player_one][..], MultiTeamOutcome::new(1)),
//!         (&[player_two, player_three][..], MultiTeamOutcome::new(2)),
//!     ],
//!     &config,
//! )?;
//!
//! assert!(new_teams[0][0].rating > player_one.rating);
//! assert!(new_teams[1][0].rating < player_two.rating);
//! # Ok::<(), skillrank::RatingError>(())
//! ```
//!
//! # References
//! - Weng, Lin: *A Bayesian Approximation Method for Online Ranking*, JMLR 12 (2011),
//!   <https://jmlr.csail.mit.edu/papers/volume12/weng11a/weng11a.pdf>
//! - <https://en.wikipedia.org/wiki/Bradley–Terry_model>

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    MultiTeamOutcome, MultiTeamRatingSystem, Outcomes, Rating, RatingError, RatingSystem,
    TeamRatingSystem,
};
use std::cmp::Ordering;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// The Weng-Lin rating of a player.
///
/// The default rating is 25.0.
/// The default variance is (25/3)² ≈ 69.44.
pub struct WengLinRating {
    /// The rating value (mu) of the WengLinRating, by default 25.0.
    pub rating: f64,
    /// The variance (sigma²) of the WengLinRating, by default (25/3)² ≈ 69.44.
    pub variance: f64,
}

impl WengLinRating {
    #[must_use]
    /// Initialise a new WengLinRating with a rating of 25.0, and a variance of (25/3)² ≈ 69.44.
    pub const fn new() -> Self {
        Self {
            rating: 25.0,
            variance: (25.0 / 3.0) * (25.0 / 3.0),
        }
    }
}

impl Default for WengLinRating {
    fn default() -> Self {
        Self::new()
    }
}

impl Rating for WengLinRating {
    fn rating(&self) -> f64 {
        self.rating
    }
    /// The standard deviation, the square root of the variance.
    fn uncertainty(&self) -> f64 {
        self.variance.sqrt()
    }
    fn new(rating: Option<f64>, uncertainty: Option<f64>) -> Self {
        Self {
            rating: rating.unwrap_or(25.0),
            variance: uncertainty.map_or_else(|| Self::default().variance, |u| u * u),
        }
    }
}

impl From<(f64, f64)> for WengLinRating {
    /// Builds a rating from a `(rating, variance)` pair.
    fn from((r, v): (f64, f64)) -> Self {
        Self {
            rating: r,
            variance: v,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
/// Constants used in the Weng-Lin calculations.
pub struct WengLinConfig {
    /// Performance noise of a single player, on the rating scale. By default 25 / 6 ≈ `4.167`.
    /// Lower it for games decided mostly by skill, raise it for games with a lot of luck.
    pub beta: f64,
    /// The lower bound of the factor a variance is multiplied with in one update.
    /// Keeps variances positive however lopsided the match.
    /// By default set to 0.000_1.
    pub kappa: f64,
}

impl WengLinConfig {
    #[must_use]
    /// Initialise a new `WengLinConfig` with a beta value of 25 / 6 ≈ `4.167`
    /// and a kappa of `0.000_1`.
    pub const fn new() -> Self {
        Self {
            beta: 25.0 / 6.0,
            kappa: 0.000_1,
        }
    }

    /// Checks every field is inside its domain.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidParameter`] if `beta` or `kappa` is not positive.
    pub fn validate(&self) -> Result<(), RatingError> {
        if !self.beta.is_finite() || self.beta <= 0.0 {
            return Err(RatingError::invalid(format!(
                "beta must be positive, got {}",
                self.beta
            )));
        }
        if !self.kappa.is_finite() || self.kappa <= 0.0 {
            return Err(RatingError::invalid(format!(
                "kappa must be positive, got {}",
                self.kappa
            )));
        }
        Ok(())
    }
}

impl Default for WengLinConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Struct to calculate ratings and expected score for [`WengLinRating`]
pub struct WengLin {
    config: WengLinConfig,
}

impl RatingSystem for WengLin {
    type RATING = WengLinRating;
    type CONFIG = WengLinConfig;

    fn new(config: Self::CONFIG) -> Self {
        Self { config }
    }

    fn rate(
        &self,
        player_one: &WengLinRating,
        player_two: &WengLinRating,
        outcome: &Outcomes,
    ) -> Result<(WengLinRating, WengLinRating), RatingError> {
        weng_lin(player_one, player_two, outcome, &self.config)
    }

    fn expected_score(
        &self,
        player_one: &WengLinRating,
        player_two: &WengLinRating,
    ) -> Result<(f64, f64), RatingError> {
        expected_score(player_one, player_two, &self.config)
    }
}

impl TeamRatingSystem for WengLin {
    type RATING = WengLinRating;
    type CONFIG = WengLinConfig;

    fn new(config: Self::CONFIG) -> Self {
        Self { config }
    }

    fn rate(
        &self,
        team_one: &[WengLinRating],
        team_two: &[WengLinRating],
        outcome: &Outcomes,
    ) -> Result<(Vec<WengLinRating>, Vec<WengLinRating>), RatingError> {
        weng_lin_two_teams(team_one, team_two, outcome, &self.config)
    }

    fn expected_score(
        &self,
        team_one: &[WengLinRating],
        team_two: &[WengLinRating],
    ) -> Result<(f64, f64), RatingError> {
        expected_score_two_teams(team_one, team_two, &self.config)
    }
}

impl MultiTeamRatingSystem for WengLin {
    type RATING = WengLinRating;
    type CONFIG = WengLinConfig;

    fn new(config: Self::CONFIG) -> Self {
        Self { config }
    }

    fn rate(
        &self,
        teams_and_ranks: &[(&[Self::RATING], MultiTeamOutcome)],
    ) -> Result<Vec<Vec<WengLinRating>>, RatingError> {
        weng_lin_multi_team(teams_and_ranks, &self.config)
    }

    fn expected_score(&self, teams: &[&[Self::RATING]]) -> Result<Vec<f64>, RatingError> {
        expected_score_multi_team(teams, &self.config)
    }
}

/// Calculates the [`WengLinRating`]s of two players based on their old ratings, variances, and the outcome of the game.
///
/// The outcome of the match is in the perspective of `player_one`.
/// This means [`Outcomes::WIN`] is a win for `player_one` and [`Outcomes::LOSS`] is a win for `player_two`.
///
/// Similar to [`weng_lin_two_teams`] with teams of one.
///
/// # Errors
/// Same as [`weng_lin_multi_team`].
///
/// # Examples
/// ```rust
/// # use assert_eq_float::assert_eq_float;
/// use skillrank::{
///     Outcomes,
///     weng_lin::{WengLinConfig, WengLinRating, weng_lin},
/// };
///
/// let (new_one, new_two) = weng_lin(
///     &WengLinRating::new(),
///     &WengLinRating::new(),
///     &Outcomes::WIN,
///     &WengLinConfig::new(),
/// )?;
///
/// assert_eq_float!((new_one.rating * 100.0).round(), 2764.0);
/// assert_eq_float!((new_two.rating * 100.0).round(), 2236.0);
/// assert_eq_float!((new_one.variance * 100.0).round(), 6505.0);
/// # Ok::<(), skillrank::RatingError>(())
/// ```
pub fn weng_lin(
    player_one: &WengLinRating,
    player_two: &WengLinRating,
    outcome: &Outcomes,
    config: &WengLinConfig,
) -> Result<(WengLinRating, WengLinRating), RatingError> {
    let (team_one, team_two) = weng_lin_two_teams(
        std::slice::from_ref(player_one),
        std::slice::from_ref(player_two),
        outcome,
        config,
    )?;

    Ok((team_one[0], team_two[0]))
}

/// Calculates the [`WengLinRating`]s of two teams based on their players' ratings, variances, and the outcome of the game.
///
/// The outcome of the match is in the perspective of `team_one`.
/// This means [`Outcomes::WIN`] is a win for `team_one` and [`Outcomes::LOSS`] is a win for `team_two`.
///
/// # Errors
/// Same as [`weng_lin_multi_team`].
pub fn weng_lin_two_teams(
    team_one: &[WengLinRating],
    team_two: &[WengLinRating],
    outcome: &Outcomes,
    config: &WengLinConfig,
) -> Result<(Vec<WengLinRating>, Vec<WengLinRating>), RatingError> {
    let (rank_one, rank_two) = match outcome {
        Outcomes::WIN => (1, 2),
        Outcomes::DRAW => (1, 1),
        Outcomes::LOSS => (2, 1),
    };

    let mut new_teams = weng_lin_multi_team(
        &[
            (team_one, MultiTeamOutcome::new(rank_one)),
            (team_two, MultiTeamOutcome::new(rank_two)),
        ],
        config,
    )?
    .into_iter();

    match (new_teams.next(), new_teams.next()) {
        (Some(new_one), Some(new_two)) => Ok((new_one, new_two)),
        _ => Err(RatingError::invalid("expected two rated teams")),
    }
}

/// Calculates the [`WengLinRating`]s of several teams from their ranks, same as [`weng_lin_multi_team`],
/// but with the teams and their ranks in two parallel slices.
///
/// # Errors
/// Returns [`RatingError::InvalidParameter`] if `teams` and `ranks` differ in length,
/// otherwise the same as [`weng_lin_multi_team`].
///
/// # Examples
/// ```rust
/// # use assert_eq_float::assert_eq_float;
/// use skillrank::{
///     MultiTeamOutcome,
///     weng_lin::{WengLinConfig, WengLinRating, weng_lin_update},
/// };
///
/// let players = [WengLinRating::from((25.0, 25.0 / 9.0)); 2];
///
/// let new_teams = weng_lin_update(
///     &[&players[..1], &players[1..]],
///     &[MultiTeamOutcome::new(1), MultiTeamOutcome::new(2)],
///     &WengLinConfig::new(),
/// )?;
///
/// assert_eq_float!((new_teams[0][0].rating * 100.0).round(), 2522.0);
/// assert_eq_float!((new_teams[1][0].rating * 100.0).round(), 2478.0);
/// # Ok::<(), skillrank::RatingError>(())
/// ```
pub fn weng_lin_update(
    teams: &[&[WengLinRating]],
    ranks: &[MultiTeamOutcome],
    config: &WengLinConfig,
) -> Result<Vec<Vec<WengLinRating>>, RatingError> {
    if teams.len() != ranks.len() {
        return Err(RatingError::invalid(format!(
            "got {} teams but {} ranks",
            teams.len(),
            ranks.len()
        )));
    }

    let teams_and_ranks: Vec<(&[WengLinRating], MultiTeamOutcome)> =
        teams.iter().copied().zip(ranks.iter().copied()).collect();

    weng_lin_multi_team(&teams_and_ranks, config)
}

/// Calculates the [`WengLinRating`] of several teams based on their ratings, variances, and ranks of the teams.
///
/// Takes in a slice, which contains tuples of teams, which are just slices of [`WengLinRating`]s,
/// as well the rank of the team as an [`MultiTeamOutcome`] and a [`WengLinConfig`].
///
/// Teams sharing a rank drew with each other.
///
/// Returns new ratings and variances of players in the teams in the same order.
/// The input teams are not modified.
///
/// # Errors
/// Returns [`RatingError::InvalidParameter`] if there are fewer than two teams, the config is invalid,
/// a player has a non-finite rating or a non-positive variance, or a team's sums overflow,
/// and [`RatingError::DegenerateInput`] if a team is empty.
///
/// # Examples
/// ```rust
/// # use assert_eq_float::assert_eq_float;
/// use skillrank::{
///     MultiTeamOutcome,
///     weng_lin::{WengLinConfig, WengLinRating, weng_lin_multi_team},
/// };
///
/// let team_one = vec![
///     WengLinRating::new(),
///     WengLinRating {
///         rating: 30.0,
///         variance: 1.44,
///     },
/// ];
/// let team_two = vec![WengLinRating {
///     rating: 27.0,
///     variance: 9.0,
/// }];
/// let team_three = vec![
///     WengLinRating::from((20.0, 16.0)),
///     WengLinRating::from((21.0, 16.0)),
/// ];
///
/// // The lone player of team two beat both pairs.
/// let placements = [
///     (&team_one[..], MultiTeamOutcome::new(2)),
///     (&team_two[..], MultiTeamOutcome::new(1)),
///     (&team_three[..], MultiTeamOutcome::new(3)),
/// ];
///
/// let new_teams = weng_lin_multi_team(&placements, &WengLinConfig::new())?;
///
/// assert_eq!(new_teams.iter().map(Vec::len).collect::<Vec<_>>(), [2, 1, 2]);
///
/// assert_eq_float!((new_teams[0][0].rating * 100.0).round(), 2033.0);
/// assert_eq_float!((new_teams[0][1].rating * 100.0).round(), 2990.0);
/// assert_eq_float!((new_teams[0][0].variance * 100.0).round(), 6285.0);
///
/// assert_eq_float!((new_teams[1][0].rating * 100.0).round(), 2865.0);
///
/// assert_eq_float!((new_teams[2][0].rating * 100.0).round(), 1815.0);
/// assert_eq_float!((new_teams[2][1].rating * 100.0).round(), 1915.0);
/// # Ok::<(), skillrank::RatingError>(())
/// ```
pub fn weng_lin_multi_team(
    teams_and_ranks: &[(&[WengLinRating], MultiTeamOutcome)],
    config: &WengLinConfig,
) -> Result<Vec<Vec<WengLinRating>>, RatingError> {
    config.validate()?;
    let (teams_ratings, teams_variances) =
        team_aggregates(teams_and_ranks.iter().map(|(team, _)| *team))?;

    let mut new_teams = Vec::with_capacity(teams_and_ranks.len());
    for (i, (team_one, rank_one)) in teams_and_ranks.iter().enumerate() {
        let mut omega = 0.0;
        let mut large_delta = 0.0;

        for (q, (_, rank_two)) in teams_and_ranks.iter().enumerate() {
            if i == q {
                continue;
            }

            let c = c_value(teams_variances[i], teams_variances[q], config.beta);
            let (p_iq, p_qi) = p_value(teams_ratings[i], teams_ratings[q], c);
            let score = match rank_two.cmp(rank_one) {
                Ordering::Greater => 1.0,
                Ordering::Equal => 0.5,
                Ordering::Less => 0.0,
            };

            omega += small_delta(teams_variances[i], c, p_iq, score);
            large_delta += eta(
                teams_variances[i],
                c,
                p_iq,
                p_qi,
                gamma(teams_variances[i], c),
            );
        }

        let new_team = team_one
            .iter()
            .map(|player| WengLinRating {
                rating: new_rating(player, teams_variances[i], omega),
                variance: new_variance(player, teams_variances[i], large_delta, config.kappa),
            })
            .collect();
        new_teams.push(new_team);
    }

    Ok(new_teams)
}

/// Win probabilities of two players, summing to 1.
///
/// # Errors
/// Same as [`expected_score_multi_team`].
pub fn expected_score(
    player_one: &WengLinRating,
    player_two: &WengLinRating,
    config: &WengLinConfig,
) -> Result<(f64, f64), RatingError> {
    expected_score_two_teams(
        std::slice::from_ref(player_one),
        std::slice::from_ref(player_two),
        config,
    )
}

/// Win probabilities of two teams, summing to 1.
///
/// # Errors
/// Same as [`expected_score_multi_team`].
///
/// # Examples
/// ```rust
/// # use assert_eq_float::assert_eq_float;
/// use skillrank::weng_lin::{WengLinConfig, WengLinRating, expected_score_two_teams};
///
/// let (exp_one, exp_two) = expected_score_two_teams(
///     &[WengLinRating::from((31.0, 2.0))],
///     &[WengLinRating::new()],
///     &WengLinConfig::new(),
/// )?;
///
/// assert_eq_float!((exp_one * 100.0).round(), 64.0);
/// assert_eq_float!((exp_two * 100.0).round(), 36.0);
/// # Ok::<(), skillrank::RatingError>(())
/// ```
pub fn expected_score_two_teams(
    team_one: &[WengLinRating],
    team_two: &[WengLinRating],
    config: &WengLinConfig,
) -> Result<(f64, f64), RatingError> {
    let exp = expected_score_multi_team(&[team_one, team_two], config)?;

    Ok((exp[0], exp[1]))
}

/// Calculates the expected outcome of multiple teams based on the Bradley-Terry model.
///
/// Every team is scored by the product of its pairwise win probabilities against all other teams,
/// and the scores are normalised to sum to 1.
///
/// The result is in the order of `teams`.
///
/// # Errors
/// Returns [`RatingError::InvalidParameter`] if there are fewer than two teams or a rating is invalid,
/// and [`RatingError::DegenerateInput`] if a team is empty.
///
/// # Examples
/// ```rust
/// # use assert_eq_float::assert_eq_float;
/// use skillrank::weng_lin::{WengLinConfig, WengLinRating, expected_score_multi_team};
///
/// let team_one = vec![WengLinRating::new(), WengLinRating::from((30.0, 1.44))];
/// let team_two = vec![WengLinRating::from((27.0, 9.0))];
/// let team_three = vec![
///     WengLinRating::from((20.0, 16.0)),
///     WengLinRating::from((21.0, 16.0)),
/// ];
///
/// let exp = expected_score_multi_team(&[&team_one, &team_two, &team_three], &WengLinConfig::new())?;
///
/// assert_eq_float!(((exp[0] + exp[1] + exp[2]) * 1000.0).round(), 1000.0);
/// assert_eq_float!((exp[0] * 10000.0).round(), 7770.0);
/// assert_eq_float!((exp[1] * 10000.0).round(), 123.0);
/// assert_eq_float!((exp[2] * 10000.0).round(), 2106.0);
/// # Ok::<(), skillrank::RatingError>(())
/// ```
pub fn expected_score_multi_team(
    teams: &[&[WengLinRating]],
    config: &WengLinConfig,
) -> Result<Vec<f64>, RatingError> {
    config.validate()?;
    let (ratings, variances) = team_aggregates(teams.iter().copied())?;

    let mut exps = Vec::with_capacity(ratings.len());
    for i in 0..ratings.len() {
        let mut product = 1.0;
        for q in 0..ratings.len() {
            if i == q {
                continue;
            }
            let c = c_value(variances[i], variances[q], config.beta);
            product *= p_value(ratings[i], ratings[q], c).0;
        }
        exps.push(product);
    }

    let sum: f64 = exps.iter().sum();
    for exp in &mut exps {
        *exp /= sum;
    }

    Ok(exps)
}

/// Sums the ratings and variances of every team, rejecting anything the update cannot divide by.
fn team_aggregates<'a>(
    teams: impl ExactSizeIterator<Item = &'a [WengLinRating]>,
) -> Result<(Vec<f64>, Vec<f64>), RatingError> {
    if teams.len() < 2 {
        return Err(RatingError::invalid(format!(
            "at least two teams are needed, got {}",
            teams.len()
        )));
    }

    let mut ratings = Vec::with_capacity(teams.len());
    let mut variances = Vec::with_capacity(teams.len());

    for (index, team) in teams.enumerate() {
        if team.is_empty() {
            return Err(RatingError::DegenerateInput { team: index });
        }
        for player in team {
            if !player.rating.is_finite() {
                return Err(RatingError::invalid(format!(
                    "team {index} has a player with rating {}",
                    player.rating
                )));
            }
            if !player.variance.is_finite() || player.variance <= 0.0 {
                return Err(RatingError::invalid(format!(
                    "team {index} has a player with variance {}",
                    player.variance
                )));
            }
        }

        let team_rating: f64 = team.iter().map(|p| p.rating).sum();
        let team_variance: f64 = team.iter().map(|p| p.variance).sum();
        if !team_rating.is_finite() || !team_variance.is_finite() {
            return Err(RatingError::invalid(format!(
                "team {index} sums to rating {team_rating} with variance {team_variance}"
            )));
        }

        ratings.push(team_rating);
        variances.push(team_variance);
    }

    Ok((ratings, variances))
}

fn c_value(team_variance_one: f64, team_variance_two: f64, beta: f64) -> f64 {
    2.0f64
        .mul_add(beta.powi(2), team_variance_one + team_variance_two)
        .sqrt()
}

/// Win probabilities of either side, each evaluated from its own ratio.
/// Both exponents are shifted by the larger rating so they cannot overflow.
fn p_value(rating_one: f64, rating_two: f64, c_value: f64) -> (f64, f64) {
    let shift = rating_one.max(rating_two);
    let e1 = ((rating_one - shift) / c_value).exp();
    let e2 = ((rating_two - shift) / c_value).exp();

    let exp_one = e1 / (e1 + e2);
    let exp_two = e2 / (e2 + e1);

    (exp_one, exp_two)
}

fn small_delta(team_variance: f64, c_value: f64, p_value: f64, score: f64) -> f64 {
    (team_variance / c_value) * (score - p_value)
}

fn gamma(team_variance: f64, c_value: f64) -> f64 {
    team_variance.sqrt() / c_value
}

fn eta(team_variance: f64, c_value: f64, p_iq: f64, p_qi: f64, gamma: f64) -> f64 {
    gamma * (team_variance / c_value.powi(2)) * p_iq * p_qi
}

fn new_rating(player: &WengLinRating, team_variance: f64, omega: f64) -> f64 {
    (player.variance / team_variance).mul_add(omega, player.rating)
}

fn new_variance(player: &WengLinRating, team_variance: f64, large_delta: f64, kappa: f64) -> f64 {
    let factor = (player.variance / team_variance)
        .mul_add(-large_delta, 1.0)
        .max(kappa);
    player.variance * factor
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use assert_eq_float::assert_eq_float;
    use proptest::prelude::*;

    fn rookie() -> WengLinRating {
        WengLinRating::from((25.0, 25.0 / 9.0))
    }

    fn ranks(ranks: &[usize]) -> Vec<MultiTeamOutcome> {
        ranks.iter().copied().map(MultiTeamOutcome::new).collect()
    }

    #[test]
    fn test_probs() {
        let exp =
            expected_score_multi_team(&[&[rookie()], &[rookie()]], &WengLinConfig::new()).unwrap();

        assert_eq!(exp.len(), 2);
        assert_eq_float!(exp[0], 0.5);
        assert_eq_float!(exp[1], 0.5);
    }

    #[test]
    fn test_probs_ordering() {
        let strong = [WengLinRating::from((32.0, 4.0))];
        let middle = [WengLinRating::from((25.0, 4.0))];
        let weak = [WengLinRating::from((14.0, 4.0))];

        let exp =
            expected_score_multi_team(&[&middle, &weak, &strong], &WengLinConfig::new()).unwrap();

        assert_abs_diff_eq!(exp.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(exp[2] > exp[0]);
        assert!(exp[0] > exp[1]);
    }

    #[test]
    fn test_probs_large_ratings() {
        let exp = expected_score_multi_team(
            &[
                &[WengLinRating::from((5000.0, 1.0))],
                &[WengLinRating::from((4000.0, 1.0))],
            ],
            &WengLinConfig::new(),
        )
        .unwrap();

        assert!(exp.iter().all(|p| p.is_finite()));
        assert_abs_diff_eq!(exp[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_update() {
        let new_teams = weng_lin_update(
            &[&[rookie()], &[rookie()]],
            &ranks(&[1, 2]),
            &WengLinConfig::new(),
        )
        .unwrap();

        assert!(new_teams[0][0].rating > new_teams[1][0].rating);
        assert_abs_diff_eq!(new_teams[0][0].rating, 25.218_844, epsilon = 1e-6);
        assert_abs_diff_eq!(new_teams[0][0].variance, 2.765_200, epsilon = 1e-6);
        assert_abs_diff_eq!(new_teams[1][0].rating, 24.781_156, epsilon = 1e-6);
    }

    #[test]
    fn test_update_all_tied() {
        let teams = [[rookie()], [rookie()], [rookie()]];
        let new_teams = weng_lin_update(
            &[&teams[0], &teams[1], &teams[2]],
            &ranks(&[2, 2, 2]),
            &WengLinConfig::new(),
        )
        .unwrap();

        for team in &new_teams {
            assert_eq!(team[0].rating, 25.0);
            assert!(team[0].variance < rookie().variance);
            assert!(team[0].variance > 0.0);
        }
    }

    #[test]
    fn test_update_splits_by_variance() {
        let team = [
            WengLinRating::from((25.0, 1.0)),
            WengLinRating::from((25.0, 9.0)),
        ];
        let opponents = [WengLinRating::from((50.0, 10.0))];

        let (new_team, new_opponents) =
            weng_lin_two_teams(&team, &opponents, &Outcomes::WIN, &WengLinConfig::new()).unwrap();

        let settled_gain = new_team[0].rating - team[0].rating;
        let unsettled_gain = new_team[1].rating - team[1].rating;

        assert!(settled_gain > 0.0);
        assert_abs_diff_eq!(unsettled_gain, 9.0 * settled_gain, epsilon = 1e-9);
        assert!(new_opponents[0].rating < opponents[0].rating);
    }

    #[test]
    fn test_kappa_floor() {
        let config = WengLinConfig::new();
        let wide = [WengLinRating::from((25.0, 1.0e6))];
        let field: Vec<&[WengLinRating]> = vec![&wide[..]; 20];
        let ranks: Vec<MultiTeamOutcome> = (1..=20).map(MultiTeamOutcome::new).collect();

        let new_teams = weng_lin_update(&field, &ranks, &config).unwrap();

        for team in &new_teams {
            assert_abs_diff_eq!(team[0].variance, 1.0e6 * config.kappa, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_repeated_updates_stay_above_kappa() {
        let config = WengLinConfig::new();
        let mut teams = vec![vec![rookie()]; 4];

        for round in 0..200 {
            let order: Vec<MultiTeamOutcome> = (0..4)
                .map(|team| MultiTeamOutcome::new((team + round) % 4))
                .collect();
            let refs: Vec<&[WengLinRating]> = teams.iter().map(Vec::as_slice).collect();
            teams = weng_lin_update(&refs, &order, &config).unwrap();
        }

        for team in &teams {
            assert!(team[0].variance > config.kappa);
            assert!(team[0].rating.is_finite());
        }
    }

    #[test]
    fn test_zero_variance_player_rejected() {
        let team = [
            WengLinRating::from((40.0, 0.0)),
            WengLinRating::from((20.0, 4.0)),
        ];

        let result = weng_lin_update(
            &[&team, &[WengLinRating::new()]],
            &ranks(&[1, 2]),
            &WengLinConfig::new(),
        );

        assert!(matches!(result, Err(RatingError::InvalidParameter { .. })));
        assert!(
            weng_lin_two_teams(&team, &[rookie()], &Outcomes::LOSS, &WengLinConfig::new())
                .is_err()
        );
    }

    #[test]
    fn test_team_sum_overflow_rejected() {
        let config = WengLinConfig::new();
        let huge = [
            WengLinRating::from((1.0e308, 1.0)),
            WengLinRating::from((1.0e308, 1.0)),
        ];
        let wide = [
            WengLinRating::from((25.0, 1.0e308)),
            WengLinRating::from((25.0, 1.0e308)),
        ];

        assert!(matches!(
            weng_lin_update(&[&huge, &[rookie()]], &ranks(&[1, 2]), &config),
            Err(RatingError::InvalidParameter { .. })
        ));
        assert!(matches!(
            expected_score_multi_team(&[&huge, &huge], &config),
            Err(RatingError::InvalidParameter { .. })
        ));
        assert!(matches!(
            weng_lin_update(&[&[rookie()], &wide], &ranks(&[1, 2]), &config),
            Err(RatingError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_invalid_inputs() {
        let config = WengLinConfig::new();
        let team = [rookie()];

        assert!(matches!(
            weng_lin_update(&[&team], &ranks(&[1]), &config),
            Err(RatingError::InvalidParameter { .. })
        ));
        assert!(matches!(
            weng_lin_update(&[&team, &team], &ranks(&[1]), &config),
            Err(RatingError::InvalidParameter { .. })
        ));
        assert!(matches!(
            weng_lin_update(&[&team, &[]], &ranks(&[1, 2]), &config),
            Err(RatingError::DegenerateInput { team: 1 })
        ));
        assert!(matches!(
            weng_lin_update(
                &[&[WengLinRating::from((25.0, 0.0))], &team],
                &ranks(&[1, 2]),
                &config
            ),
            Err(RatingError::InvalidParameter { .. })
        ));
        assert!(matches!(
            weng_lin_update(
                &[&team, &[WengLinRating::from((25.0, -1.0))]],
                &ranks(&[1, 2]),
                &config
            ),
            Err(RatingError::InvalidParameter { .. })
        ));
        assert!(matches!(
            expected_score_multi_team(&[&team, &[WengLinRating::from((f64::NAN, 1.0))]], &config),
            Err(RatingError::InvalidParameter { .. })
        ));
        assert!(expected_score_multi_team(&[&team], &config).is_err());

        let broken = WengLinConfig {
            beta: 0.0,
            ..Default::default()
        };
        assert!(weng_lin_update(&[&team, &team], &ranks(&[1, 2]), &broken).is_err());
        let broken = WengLinConfig {
            kappa: -1.0,
            ..Default::default()
        };
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_one_vs_one() {
        let config = WengLinConfig::new();
        let (winner, loser) =
            weng_lin(&WengLinRating::new(), &WengLinRating::new(), &Outcomes::WIN, &config).unwrap();
        let (drawn_one, drawn_two) =
            weng_lin(&WengLinRating::new(), &WengLinRating::new(), &Outcomes::DRAW, &config)
                .unwrap();

        assert_abs_diff_eq!(winner.rating, 27.635_231, epsilon = 1e-6);
        assert_abs_diff_eq!(loser.rating, 22.364_769, epsilon = 1e-6);
        assert_eq_float!(drawn_one.rating, 25.0);
        assert_eq_float!(drawn_two.rating, 25.0);

        let (exp_one, exp_two) =
            expected_score(&WengLinRating::new(), &WengLinRating::new(), &config).unwrap();
        assert_eq_float!(exp_one, exp_two);
    }

    #[test]
    fn test_rating_systems() {
        let config = WengLinConfig::new();
        let one: WengLin = RatingSystem::new(config);
        let team: WengLin = TeamRatingSystem::new(config);
        let multi: WengLin = MultiTeamRatingSystem::new(config);

        let (a, b) =
            RatingSystem::rate(&one, &rookie(), &rookie(), &Outcomes::LOSS).unwrap();
        assert!(a.rating < b.rating);

        let (team_a, team_b) =
            TeamRatingSystem::rate(&team, &[rookie(), rookie()], &[rookie()], &Outcomes::WIN)
                .unwrap();
        assert_eq!(team_a.len(), 2);
        assert_eq!(team_b.len(), 1);
        assert!(team_a[0].rating > 25.0);

        let rated = MultiTeamRatingSystem::rate(
            &multi,
            &[
                (&[rookie()][..], MultiTeamOutcome::new(1)),
                (&[rookie()][..], MultiTeamOutcome::new(2)),
            ],
        )
        .unwrap();
        assert!(rated[0][0].rating > rated[1][0].rating);

        let exp = MultiTeamRatingSystem::expected_score(&multi, &[&[rookie()], &[rookie()]]).unwrap();
        assert_eq_float!(exp[0], 0.5);
        let (exp_a, _) = TeamRatingSystem::expected_score(&team, &[rookie()], &[rookie()]).unwrap();
        assert_eq_float!(exp_a, 0.5);
        let (exp_a, _) = RatingSystem::expected_score(&one, &rookie(), &rookie()).unwrap();
        assert_eq_float!(exp_a, 0.5);
    }

    #[test]
    fn test_rating_trait() {
        let rating: WengLinRating = Rating::new(Some(30.0), Some(2.0));
        assert_eq_float!(rating.rating(), 30.0);
        assert_eq_float!(rating.variance, 4.0);
        assert_eq_float!(rating.uncertainty(), 2.0);

        let default: WengLinRating = Rating::new(None, None);
        assert_eq!(default, WengLinRating::new());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json() {
        let config: WengLinConfig = serde_json::from_str(r#"{ "beta": 4.0 }"#).unwrap();

        assert_eq_float!(config.beta, 4.0);
        assert_eq_float!(config.kappa, 0.000_1);
    }

    proptest! {
        #[test]
        fn prop_update_keeps_shape_and_positive_variance(
            players in prop::collection::vec((0.0f64..50.0, 0.1f64..100.0), 2..8),
            seed_ranks in prop::collection::vec(1usize..4, 8),
        ) {
            let config = WengLinConfig::new();
            let players: Vec<WengLinRating> = players.into_iter().map(WengLinRating::from).collect();
            let (first, rest) = players.split_at(1);
            let teams: Vec<&[WengLinRating]> = vec![first, rest];
            let outcome = ranks(&seed_ranks[..2]);

            let new_teams = weng_lin_update(&teams, &outcome, &config).unwrap();

            prop_assert_eq!(new_teams.len(), teams.len());
            for (new_team, team) in new_teams.iter().zip(&teams) {
                prop_assert_eq!(new_team.len(), team.len());
                for (new_player, player) in new_team.iter().zip(team.iter()) {
                    prop_assert!(new_player.variance > 0.0);
                    prop_assert!(new_player.variance <= player.variance);
                    prop_assert!(new_player.variance >= player.variance * config.kappa);
                }
            }
        }

        #[test]
        fn prop_probs_sum_to_one(
            teams in prop::collection::vec((0.0f64..50.0, 0.1f64..100.0), 2..10),
        ) {
            let teams: Vec<[WengLinRating; 1]> =
                teams.into_iter().map(|t| [WengLinRating::from(t)]).collect();
            let refs: Vec<&[WengLinRating]> = teams.iter().map(|t| &t[..]).collect();

            let exp = expected_score_multi_team(&refs, &WengLinConfig::new()).unwrap();

            prop_assert!((exp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            prop_assert!(exp.iter().all(|p| *p > 0.0 && *p < 1.0));
        }
    }
}
