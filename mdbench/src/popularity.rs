//! Popularity-weighted selection of existing entities.
//!
//! Real metadata stores see skewed access: a few contexts (say, the production pipeline) are
//! touched far more often than the rest. A [`PopularitySampler`] models this by picking an index
//! out of a population with a skew controlled by a single concentration parameter.
//!
//! The [`DirichletSampler`] assigns every member of the population a popularity drawn from a
//! symmetric Dirichlet distribution. Large concentrations yield near-uniform popularity, small
//! concentrations let a handful of members dominate. The [`UniformSampler`] ignores the
//! concentration altogether.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::weighted::WeightedIndex;
use rand_distr::{Distribution, Gamma};

use crate::error::{Result, WorkloadError};

/// Picks indices out of a population of a given size.
pub trait PopularitySampler: fmt::Debug + Send {
    /// Returns an index in `0..population_size`.
    ///
    /// Fails with [`WorkloadError::EmptyPopulation`] if `population_size` is zero.
    fn sample(&mut self, population_size: usize, concentration: f64) -> Result<usize>;
}

/// Selects every member of the population with equal probability.
#[derive(Debug)]
pub struct UniformSampler {
    rng: SmallRng,
}

impl UniformSampler {
    /// Creates a sampler with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl PopularitySampler for UniformSampler {
    fn sample(&mut self, population_size: usize, _concentration: f64) -> Result<usize> {
        if population_size == 0 {
            return Err(WorkloadError::EmptyPopulation);
        }
        Ok(self.rng.random_range(0..population_size))
    }
}

/// Selects members of the population according to Dirichlet-distributed popularity.
///
/// The popularity of each member depends only on the seed, the population size and the
/// concentration, so the same members stay hot across calls. Popularity tables are memoized per
/// population size and concentration.
pub struct DirichletSampler {
    seed: u64,
    rng: SmallRng,
    popularity: HashMap<(usize, u64), WeightedIndex<f64>>,
}

impl DirichletSampler {
    /// Creates a sampler with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
            popularity: HashMap::new(),
        }
    }
}

impl fmt::Debug for DirichletSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirichletSampler")
            .field("seed", &self.seed)
            .field("tables", &self.popularity.len())
            .finish()
    }
}

impl PopularitySampler for DirichletSampler {
    fn sample(&mut self, population_size: usize, concentration: f64) -> Result<usize> {
        if population_size == 0 {
            return Err(WorkloadError::EmptyPopulation);
        }

        let weights = match self.popularity.entry((population_size, concentration.to_bits())) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(dirichlet_popularity(self.seed, population_size, concentration)?)
            }
        };

        Ok(weights.sample(&mut self.rng))
    }
}

/// Draws one point from a symmetric Dirichlet distribution of dimension `size`.
///
/// The `Gamma(concentration, 1)` variates are scaled by their maximum and serve as weights, the
/// final normalization is left to [`WeightedIndex`].
fn dirichlet_popularity(seed: u64, size: usize, concentration: f64) -> Result<WeightedIndex<f64>> {
    if !(concentration.is_finite() && concentration > 0.0) {
        return Err(WorkloadError::InvalidConfig(format!(
            "concentration must be a positive number, got {concentration}"
        )));
    }

    let gamma = Gamma::new(concentration, 1.0).map_err(|err| {
        WorkloadError::InvalidConfig(format!("concentration {concentration}: {err}"))
    })?;

    let table_seed = seed ^ (size as u64).rotate_left(32) ^ concentration.to_bits();
    let mut rng = SmallRng::seed_from_u64(table_seed);
    let mut weights: Vec<f64> = (0..size).map(|_| gamma.sample(&mut rng)).collect();

    let max = weights.iter().copied().fold(0.0, f64::max);
    if weights.iter().any(|w| !w.is_finite()) {
        // huge concentrations overflow the variates, in the limit popularity is uniform
        weights.fill(1.0);
    } else if max > 0.0 {
        // keeps the sum finite for large concentrations
        weights.iter_mut().for_each(|w| *w /= max);
    } else {
        // tiny concentrations underflow every variate, in the limit one member takes all mass
        weights.fill(0.0);
        weights[rng.random_range(0..size)] = 1.0;
    }

    WeightedIndex::new(&weights)
        .map_err(|err| WorkloadError::InvalidConfig(format!("popularity weights: {err}")))
}
