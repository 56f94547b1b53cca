use std::fmt;

use glam::DVec3;

use crate::api::config::SelectorConfig;
use crate::api::types::{RawStar, StarRecord};
use crate::core::catalog::Catalog;

/// The procedural star generator behind the gateway.
///
/// Implementations must be pure functions of their seed and arguments:
/// the same region with the same seed yields the same stars in the same order.
pub trait StarGenerator {
    /// Stars within `radius` of `center`, nearest first, at most `max_stars`.
    fn nearby_stars(&self, center: DVec3, radius: f64, max_stars: usize) -> Vec<RawStar>;

    /// Coarse galaxy-wide sample of at most `max_stars` stars.
    fn galactic_structure(&self, max_stars: usize) -> Vec<RawStar>;

    /// Galaxy radius in light-years.
    fn galaxy_radius(&self) -> f64;

    /// Rough total star count for display purposes.
    fn estimated_total_stars(&self) -> u64 {
        0
    }
}

/// Why a gateway query produced no data. Absorbed into an empty catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    /// No generator has been installed yet.
    GeneratorUnavailable,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::GeneratorUnavailable => write!(f, "star generator is not initialized"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Catalog-producing front for a [`StarGenerator`].
///
/// Clamps query radii, caps result sizes, resolves loosely-typed generator
/// output into [`StarRecord`]s and stamps every snapshot with a fresh epoch.
/// Failures never escape: an unavailable generator yields an empty catalog.
pub struct GeneratorGateway<G> {
    generator: Option<G>,
    max_query_radius: f64,
    local_max_stars: usize,
    next_epoch: u64,
    reported_unavailable: bool,
}

impl<G: StarGenerator> GeneratorGateway<G> {
    pub fn new(generator: G, config: &SelectorConfig) -> Self {
        Self::with_generator(Some(generator), config)
    }

    /// A gateway with no generator installed. Every query returns empty.
    pub fn uninitialized(config: &SelectorConfig) -> Self {
        Self::with_generator(None, config)
    }

    fn with_generator(generator: Option<G>, config: &SelectorConfig) -> Self {
        Self {
            generator,
            max_query_radius: config.max_query_radius_ly,
            local_max_stars: config.local_max_stars,
            next_epoch: 1,
            reported_unavailable: false,
        }
    }

    /// Install or replace the generator (e.g. on reseed).
    pub fn set_generator(&mut self, generator: G) {
        self.generator = Some(generator);
        self.reported_unavailable = false;
    }

    pub fn is_available(&self) -> bool {
        self.generator.is_some()
    }

    /// The radius a Local query will actually use.
    pub fn clamp_radius(&self, radius: f64) -> f64 {
        radius.max(0.0).min(self.max_query_radius)
    }

    /// Galaxy radius in light-years, or 0.0 if no generator is installed.
    pub fn galaxy_radius(&self) -> f64 {
        self.generator.as_ref().map_or(0.0, |g| g.galaxy_radius())
    }

    pub fn estimated_total_stars(&self) -> u64 {
        self.generator.as_ref().map_or(0, |g| g.estimated_total_stars())
    }

    /// Stars around `center`. Radius is clamped to the configured maximum.
    pub fn query_region(&mut self, center: DVec3, radius: f64) -> Catalog {
        let clamped = self.clamp_radius(radius);
        let result = self.try_query_region(center, clamped);
        if clamped < radius {
            log::debug!("query radius {} ly clamped to {} ly", radius, clamped);
        }
        self.snapshot(result)
    }

    /// Galaxy-wide structural sample.
    pub fn query_structure(&mut self, max_stars: usize) -> Catalog {
        let result = match &self.generator {
            Some(generator) => Ok(resolve(generator.galactic_structure(max_stars), max_stars)),
            None => Err(GatewayError::GeneratorUnavailable),
        };
        self.snapshot(result)
    }

    fn try_query_region(
        &self,
        center: DVec3,
        radius: f64,
    ) -> Result<Vec<StarRecord>, GatewayError> {
        let generator = self.generator.as_ref().ok_or(GatewayError::GeneratorUnavailable)?;
        if !center.is_finite() {
            return Ok(Vec::new());
        }
        let raw = generator.nearby_stars(center, radius, self.local_max_stars);
        Ok(resolve(raw, self.local_max_stars))
    }

    fn snapshot(&mut self, result: Result<Vec<StarRecord>, GatewayError>) -> Catalog {
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        match result {
            Ok(stars) => Catalog::new(epoch, stars),
            Err(err) => {
                if !self.reported_unavailable {
                    log::warn!("{}; returning empty catalog", err);
                    self.reported_unavailable = true;
                }
                Catalog::empty(epoch)
            }
        }
    }
}

fn resolve(raw: Vec<RawStar>, cap: usize) -> Vec<StarRecord> {
    raw.into_iter()
        .filter(|s| s.position.iter().all(|c| c.is_finite()))
        .take(cap)
        .map(RawStar::into_record)
        .collect()
}
