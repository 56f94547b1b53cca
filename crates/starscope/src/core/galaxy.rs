//! Built-in procedural generator: an exponential disk with logarithmic
//! spiral arms, sampled per cubic cell so any region can be regenerated
//! independently and identically.

use std::f64::consts::TAU;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::api::types::{RawStar, StarType};
use crate::core::gateway::StarGenerator;
use crate::core::rng::{hash_keys, Rng};

/// Relative abundance of each star type, in `StarType::ALL` order.
const TYPE_WEIGHTS: [f64; 10] = [
    0.000_03, 0.001_3, 0.006, 0.03, 0.076, 0.121, 0.715, 0.05, 0.000_5, 0.000_1,
];

/// Shape of the generated galaxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyParams {
    /// Outer disk radius in light-years.
    pub radius: f64,
    /// Radial exponential scale length.
    pub scale_length: f64,
    /// Vertical exponential scale height.
    pub scale_height: f64,
    /// Stars per cubic light-year at the galactic center.
    pub core_density: f64,
    /// Edge of the cubic sampling cells used for local queries.
    pub cell_size_ly: f64,
    /// Number of spiral arms in the structural sample.
    pub arms: u32,
    /// Arm pitch angle in degrees.
    pub arm_pitch_deg: f64,
    /// Angular scatter around an arm, in radians.
    pub arm_spread: f64,
}

impl Default for GalaxyParams {
    fn default() -> Self {
        Self {
            radius: 50_000.0,
            scale_length: 12_000.0,
            scale_height: 1_000.0,
            core_density: 0.035,
            cell_size_ly: 10.0,
            arms: 4,
            arm_pitch_deg: 12.0,
            arm_spread: 0.35,
        }
    }
}

impl GalaxyParams {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Deterministic galaxy generator keyed by a seed.
#[derive(Debug, Clone)]
pub struct ProceduralGalaxy {
    seed: u64,
    params: GalaxyParams,
}

impl ProceduralGalaxy {
    pub fn new(seed: u64) -> Self {
        Self::with_params(seed, GalaxyParams::default())
    }

    pub fn with_params(seed: u64, mut params: GalaxyParams) -> Self {
        if !(params.cell_size_ly > 0.0) {
            params.cell_size_ly = GalaxyParams::default().cell_size_ly;
        }
        Self { seed, params }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn params(&self) -> &GalaxyParams {
        &self.params
    }

    /// Stellar density (stars per cubic ly) at a galaxy-frame position.
    pub fn density_at(&self, p: DVec3) -> f64 {
        let r = (p.x * p.x + p.z * p.z).sqrt();
        if r > self.params.radius {
            return 0.0;
        }
        self.params.core_density
            * (-r / self.params.scale_length).exp()
            * (-p.y.abs() / self.params.scale_height).exp()
    }

    fn cell_stars(
        &self,
        cell: [i64; 3],
        out: &mut Vec<(f64, RawStar)>,
        center: DVec3,
        radius: f64,
    ) {
        let size = self.params.cell_size_ly;
        let min = DVec3::new(cell[0] as f64, cell[1] as f64, cell[2] as f64) * size;
        let expected = self.density_at(min + DVec3::splat(size * 0.5)) * size * size * size;
        let mut rng = Rng::new(hash_keys(self.seed, &cell));
        let count = rng.poisson(expected);
        for slot in 0..count {
            let position = min + DVec3::new(rng.next_f64(), rng.next_f64(), rng.next_f64()) * size;
            let star = sample_star(
                &mut rng,
                hash_keys(self.seed, &[cell[0], cell[1], cell[2], slot as i64]),
                position,
            );
            let distance = position.distance(center);
            if distance <= radius {
                out.push((distance, star));
            }
        }
    }
}

impl StarGenerator for ProceduralGalaxy {
    fn nearby_stars(&self, center: DVec3, radius: f64, max_stars: usize) -> Vec<RawStar> {
        let size = self.params.cell_size_ly;
        let lo = ((center - DVec3::splat(radius)) / size).floor();
        let hi = ((center + DVec3::splat(radius)) / size).floor();
        let mut found = Vec::new();
        for x in lo.x as i64..=hi.x as i64 {
            for y in lo.y as i64..=hi.y as i64 {
                for z in lo.z as i64..=hi.z as i64 {
                    self.cell_stars([x, y, z], &mut found, center, radius);
                }
            }
        }
        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.id.cmp(&b.1.id)));
        found.truncate(max_stars);
        found.into_iter().map(|(_, star)| star).collect()
    }

    fn galactic_structure(&self, max_stars: usize) -> Vec<RawStar> {
        let params = &self.params;
        let mut rng = Rng::new(hash_keys(self.seed, &[i64::MIN]));
        let arms = params.arms.max(1) as f64;
        let pitch = params.arm_pitch_deg.to_radians().tan().max(1e-3);
        let mut stars = Vec::with_capacity(max_stars);
        for i in 0..max_stars {
            let r = rng.exponential(params.scale_length).min(params.radius);
            let arm = (rng.next_f64() * arms).floor();
            let spiral = (r.max(1.0) / params.scale_length).ln() / pitch;
            let theta = spiral + arm * TAU / arms + rng.range(-1.0, 1.0) * params.arm_spread;
            let sign = if rng.next_f64() < 0.5 { -1.0 } else { 1.0 };
            let y = sign * rng.exponential(params.scale_height);
            let position = DVec3::new(r * theta.cos(), y, r * theta.sin());
            stars.push(sample_star(
                &mut rng,
                hash_keys(self.seed, &[i64::MIN, i as i64]),
                position,
            ));
        }
        stars
    }

    fn galaxy_radius(&self) -> f64 {
        self.params.radius
    }

    fn estimated_total_stars(&self) -> u64 {
        // Infinite exponential disk integral, truncation ignored.
        let p = &self.params;
        (p.core_density * TAU * p.scale_length * p.scale_length * 2.0 * p.scale_height) as u64
    }
}

fn sample_type(rng: &mut Rng) -> StarType {
    let total: f64 = TYPE_WEIGHTS.iter().sum();
    let mut pick = rng.next_f64() * total;
    for (weight, star_type) in TYPE_WEIGHTS.iter().zip(StarType::ALL) {
        if pick < *weight {
            return star_type;
        }
        pick -= weight;
    }
    StarType::M
}

fn sample_star(rng: &mut Rng, id: u64, position: DVec3) -> RawStar {
    let star_type = sample_type(rng);
    RawStar {
        id,
        position: position.to_array(),
        luminosity: Some(star_type.nominal_luminosity() * rng.range(0.5, 1.5)),
        temperature: Some(star_type.nominal_temperature() * rng.range(0.9, 1.1)),
        mass: Some(star_type.nominal_mass() * rng.range(0.8, 1.2)),
        star_type: Some(star_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUN: DVec3 = DVec3::new(26_000.0, 0.0, 0.0);

    #[test]
    fn nearby_is_deterministic_for_seed() {
        let a = ProceduralGalaxy::new(42).nearby_stars(SUN, 16.0, 10_000);
        let b = ProceduralGalaxy::new(42).nearby_stars(SUN, 16.0, 10_000);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = ProceduralGalaxy::new(1).nearby_stars(SUN, 16.0, 10_000);
        let b = ProceduralGalaxy::new(2).nearby_stars(SUN, 16.0, 10_000);
        assert_ne!(a, b);
    }

    #[test]
    fn nearby_respects_radius_order_and_cap() {
        let galaxy = ProceduralGalaxy::new(5);
        let stars = galaxy.nearby_stars(SUN, 16.0, 10_000);
        let mut last = 0.0;
        for s in &stars {
            let d = DVec3::from_array(s.position).distance(SUN);
            assert!(d <= 16.0);
            assert!(d >= last);
            last = d;
        }
        let capped = galaxy.nearby_stars(SUN, 16.0, 3);
        assert_eq!(capped.len(), 3.min(stars.len()));
        assert_eq!(&capped[..], &stars[..capped.len()]);
    }

    #[test]
    fn overlapping_regions_agree_on_shared_stars() {
        let galaxy = ProceduralGalaxy::new(9);
        let wide = galaxy.nearby_stars(SUN, 16.0, 10_000);
        let narrow = galaxy.nearby_stars(SUN + DVec3::X * 3.0, 8.0, 10_000);
        for star in &narrow {
            assert!(wide.iter().any(|w| w.id == star.id && w.position == star.position));
        }
    }

    #[test]
    fn structure_stays_inside_galaxy() {
        let galaxy = ProceduralGalaxy::new(3);
        let stars = galaxy.galactic_structure(2_000);
        assert_eq!(stars.len(), 2_000);
        for s in &stars {
            let p = DVec3::from_array(s.position);
            assert!((p.x * p.x + p.z * p.z).sqrt() <= galaxy.galaxy_radius() + 1e-6);
        }
        assert_eq!(stars, galaxy.galactic_structure(2_000));
    }

    #[test]
    fn density_vanishes_outside_disk() {
        let galaxy = ProceduralGalaxy::new(1);
        assert_eq!(galaxy.density_at(DVec3::new(60_000.0, 0.0, 0.0)), 0.0);
        assert!(galaxy.density_at(DVec3::ZERO) > galaxy.density_at(SUN));
    }
}
