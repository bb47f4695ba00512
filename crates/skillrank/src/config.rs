//! Loading engine constants from the environment.
//!
//! | key                             | field                              | default    |
//! |---------------------------------|------------------------------------|------------|
//! | `GLICKO2_TAU`                   | [`Glicko2Config::tau`]             | none       |
//! | `GLICKO2_CONVERGENCE_TOLERANCE` | [`Glicko2Config::convergence_tolerance`] | `0.000_001` |
//! | `GLICKO2_MAX_ITERATIONS`        | [`Glicko2Config::max_iterations`]  | `10_000`   |
//! | `WENG_LIN_BETA`                 | [`WengLinConfig::beta`]            | `25 / 6`   |
//! | `WENG_LIN_KAPPA`                | [`WengLinConfig::kappa`]           | `0.000_1`  |
//!
//! Glicko-2 has no sensible default `tau`, so without `GLICKO2_TAU` no Glicko-2 config is built.

use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{RatingError, glicko2::Glicko2Config, weng_lin::WengLinConfig};

/// Failure to build a [`RatingsConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The `.env` file exists but could not be read.
    #[error("Failed to load .env: {0}")]
    Dotenv(#[from] dotenv::Error),
    /// A key was set to something that does not parse as a number.
    #[error("`{key}` is not a number: `{value}`")]
    InvalidNumber {
        /// The environment key.
        key: &'static str,
        /// Its raw value.
        value: String,
    },
    /// The values parsed but do not form a valid config.
    #[error(transparent)]
    Rating(#[from] RatingError),
}

/// Constants of both rating engines.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RatingsConfig {
    /// Glicko-2 constants, `None` unless a `tau` was given.
    pub glicko2: Option<Glicko2Config>,
    /// Weng-Lin constants.
    #[cfg_attr(feature = "serde", serde(default))]
    pub weng_lin: WengLinConfig,
}

impl RatingsConfig {
    /// Reads the config from the process environment, after loading a `.env` file if there is one.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the `.env` file is unreadable, a value does not parse,
    /// or the resulting constants are invalid.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenv::dotenv() {
            if !err.not_found() {
                return Err(err.into());
            }
            debug!(".env not found. Using the process environment only.");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for missing keys.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if a value does not parse or the resulting constants are invalid.
    ///
    /// # Examples
    /// ```rust
    /// use std::collections::HashMap;
    /// use skillrank::config::RatingsConfig;
    ///
    /// let env = HashMap::from([("GLICKO2_TAU", "0.5"), ("WENG_LIN_BETA", "3.0")]);
    /// let config = RatingsConfig::from_lookup(|key| env.get(key).map(ToString::to_string))?;
    ///
    /// assert_eq!(config.glicko2.map(|c| c.tau), Some(0.5));
    /// assert_eq!(config.weng_lin.beta, 3.0);
    /// # Ok::<(), skillrank::config::ConfigError>(())
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let glicko2 = match parse::<f64, _>(&lookup, "GLICKO2_TAU")? {
            Some(tau) => {
                let mut config = Glicko2Config::new(tau)?;
                if let Some(tolerance) = parse(&lookup, "GLICKO2_CONVERGENCE_TOLERANCE")? {
                    config.convergence_tolerance = tolerance;
                }
                if let Some(max_iterations) = parse(&lookup, "GLICKO2_MAX_ITERATIONS")? {
                    config.max_iterations = max_iterations;
                }
                config.validate()?;
                Some(config)
            }
            None => {
                debug!("`GLICKO2_TAU` not found. Glicko-2 stays unconfigured.");
                None
            }
        };

        let mut weng_lin = WengLinConfig::new();
        match parse(&lookup, "WENG_LIN_BETA")? {
            Some(beta) => weng_lin.beta = beta,
            None => debug!("`WENG_LIN_BETA` not found. Using default."),
        }
        match parse(&lookup, "WENG_LIN_KAPPA")? {
            Some(kappa) => weng_lin.kappa = kappa,
            None => debug!("`WENG_LIN_KAPPA` not found. Using default."),
        }
        weng_lin.validate()?;

        Ok(Self { glicko2, weng_lin })
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { key, value })
        })
        .transpose()
}
