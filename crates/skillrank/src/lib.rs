#![deny(
    missing_docs,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    // `WengLinRating` in `weng_lin`, `Glicko2Config` in `glicko2`
    clippy::module_name_repetitions,
    // Glicko-2, Weng-Lin, Bradley-Terry
    clippy::doc_markdown,
    // game and team counts are far below 2^52
    clippy::cast_precision_loss,
)]
#![doc = include_str!("../README.md")]

#[cfg(feature = "serde")]
use serde::de::DeserializeOwned;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod glicko2;
pub mod stats;
pub mod weng_lin;

pub use error::{RatingError, SolverStage};

/// Result of a game between two sides, read from the first side.
///
/// `WIN` means side one won, `LOSS` means side two won.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Outcomes {
    /// Side one won.
    WIN,
    /// Side two won.
    LOSS,
    /// Neither side won.
    DRAW,
}

impl Outcomes {
    #[must_use]
    /// The score side one gets for this result: 1 for a win, 0.5 for a draw, 0 for a loss.
    pub const fn to_chess_points(self) -> f64 {
        match self {
            Self::WIN => 1.0,
            Self::DRAW => 0.5,
            Self::LOSS => 0.0,
        }
    }

    #[must_use]
    /// The same result read from side two.
    pub const fn reverse(self) -> Self {
        match self {
            Self::WIN => Self::LOSS,
            Self::DRAW => Self::DRAW,
            Self::LOSS => Self::WIN,
        }
    }
}

impl TryFrom<f64> for Outcomes {
    type Error = RatingError;

    /// Accepts exactly `1.0`, `0.5` and `0.0`.
    #[allow(clippy::float_cmp)]
    fn try_from(points: f64) -> Result<Self, Self::Error> {
        if points == 1.0 {
            Ok(Self::WIN)
        } else if points == 0.5 {
            Ok(Self::DRAW)
        } else if points == 0.0 {
            Ok(Self::LOSS)
        } else {
            Err(RatingError::invalid(format!(
                "outcome must be 1.0, 0.5 or 0.0, got {points}"
            )))
        }
    }
}

/// Placement of one team in a game between any number of teams.
///
/// Rank 1 is first place and larger ranks place lower. Tied teams share a rank,
/// and ranks need not be contiguous: four teams finishing first, second, and
/// tied for third can be ranked `1, 2, 3, 3` or `1, 2, 4, 4`.
///
/// Ranks are whole numbers. Fractional placements only matter through their order,
/// so map them to integers by sorting before rating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MultiTeamOutcome(usize);

impl MultiTeamOutcome {
    #[must_use]
    #[inline]
    /// Wraps a placement.
    pub const fn new(rank: usize) -> Self {
        Self(rank)
    }

    #[must_use]
    #[inline]
    /// The wrapped placement.
    pub const fn rank(self) -> usize {
        self.0
    }
}

impl From<usize> for MultiTeamOutcome {
    #[inline]
    fn from(rank: usize) -> Self {
        Self::new(rank)
    }
}

impl From<MultiTeamOutcome> for usize {
    #[inline]
    fn from(outcome: MultiTeamOutcome) -> Self {
        outcome.rank()
    }
}

/// A skill estimate with its uncertainty.
///
/// Glicko-2 ratings live around 1500 and Weng-Lin ratings around 25, so values
/// are not comparable across systems. Pass `None` to [`Rating::new`] to get a system's defaults.
pub trait Rating {
    /// The point estimate of skill.
    fn rating(&self) -> f64;
    /// The spread of the estimate, as a standard deviation on the [`Rating::rating`] scale.
    fn uncertainty(&self) -> f64;
    /// Builds a rating, using the system default for each `None`.
    fn new(rating: Option<f64>, uncertainty: Option<f64>) -> Self;
}

#[cfg(feature = "serde")]
/// What a rating system needs from its rating type.
pub trait SystemRating: Rating + Copy + std::fmt::Debug + DeserializeOwned + Serialize {}
#[cfg(feature = "serde")]
impl<T> SystemRating for T where T: Rating + Copy + std::fmt::Debug + DeserializeOwned + Serialize {}

#[cfg(not(feature = "serde"))]
/// What a rating system needs from its rating type.
pub trait SystemRating: Rating + Copy + std::fmt::Debug {}
#[cfg(not(feature = "serde"))]
impl<T> SystemRating for T where T: Rating + Copy + std::fmt::Debug {}

/// One player against one player.
///
/// Only covers rating and prediction. Extras such as confidence intervals
/// or deviation decay are free functions of each system's module.
pub trait RatingSystem {
    /// The per-player rating.
    type RATING: SystemRating;
    /// The system constants.
    type CONFIG;
    /// Builds the system from its constants.
    fn new(config: Self::CONFIG) -> Self;
    /// Rates both players after one game, `outcome` read from `player_one`.
    ///
    /// # Errors
    /// Returns a [`RatingError`] if either rating is invalid or the update fails numerically.
    fn rate(
        &self,
        player_one: &Self::RATING,
        player_two: &Self::RATING,
        outcome: &Outcomes,
    ) -> Result<(Self::RATING, Self::RATING), RatingError>;
    /// Win probabilities of both players, each between 0.0 and 1.0.
    ///
    /// # Errors
    /// Returns a [`RatingError`] if either rating is invalid.
    fn expected_score(
        &self,
        player_one: &Self::RATING,
        player_two: &Self::RATING,
    ) -> Result<(f64, f64), RatingError>;
}

/// One player against every opponent met during a rating period.
pub trait RatingPeriodSystem {
    /// The per-player rating.
    type RATING: SystemRating;
    /// The system constants.
    type CONFIG;
    /// Builds the system from its constants.
    fn new(config: Self::CONFIG) -> Self;
    /// Rates `player` after the games in `results`, each outcome read from `player`.
    ///
    /// # Errors
    /// Returns a [`RatingError`] if `results` is empty, a rating is invalid or the update fails numerically.
    fn rate(
        &self,
        player: &Self::RATING,
        results: &[(Self::RATING, Outcomes)],
    ) -> Result<Self::RATING, RatingError>;
    /// Win probability of `player` against each opponent, in order.
    fn expected_score(&self, player: &Self::RATING, opponents: &[Self::RATING]) -> Vec<f64>;
}

/// One team against one team.
pub trait TeamRatingSystem {
    /// The per-player rating.
    type RATING: SystemRating;
    /// The system constants.
    type CONFIG;
    /// Builds the system from its constants.
    fn new(config: Self::CONFIG) -> Self;
    /// Rates every player of both teams after one game, `outcome` read from `team_one`.
    ///
    /// # Errors
    /// Returns a [`RatingError`] if a team is empty or holds an invalid rating.
    fn rate(
        &self,
        team_one: &[Self::RATING],
        team_two: &[Self::RATING],
        outcome: &Outcomes,
    ) -> Result<(Vec<Self::RATING>, Vec<Self::RATING>), RatingError>;
    /// Win probabilities of both teams, each between 0.0 and 1.0.
    ///
    /// # Errors
    /// Returns a [`RatingError`] if a team is empty or holds an invalid rating.
    fn expected_score(
        &self,
        team_one: &[Self::RATING],
        team_two: &[Self::RATING],
    ) -> Result<(f64, f64), RatingError>;
}

/// Any number of ranked teams in one game.
pub trait MultiTeamRatingSystem {
    /// The per-player rating.
    type RATING: SystemRating;
    /// The system constants.
    type CONFIG;
    /// Builds the system from its constants.
    fn new(config: Self::CONFIG) -> Self;
    /// Rates every player of every team from the teams' placements.
    /// The result has the shape of the input.
    ///
    /// # Errors
    /// Returns a [`RatingError`] if there are fewer than two teams, a team is empty or holds an invalid rating.
    fn rate(
        &self,
        teams_and_ranks: &[(&[Self::RATING], MultiTeamOutcome)],
    ) -> Result<Vec<Vec<Self::RATING>>, RatingError>;
    /// Probability of each team finishing first. The probabilities sum to 1.
    ///
    /// # Errors
    /// Returns a [`RatingError`] if there are fewer than two teams, a team is empty or holds an invalid rating.
    fn expected_score(&self, teams: &[&[Self::RATING]]) -> Result<Vec<f64>, RatingError>;
}
