use serde::{Deserialize, Serialize};

/// Externally supplied tuning for the selector. Every field has a default,
/// so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Settle displacement (ly) from the last Local query center that forces a requery.
    pub refresh_distance_ly: f64,
    /// Seconds the camera must stay still before a settle (default: 0.3).
    pub debounce_secs: f64,
    /// Pick grid cell size in pixels (default: 32).
    pub cell_size_px: f64,
    /// Default point-pick radius in pixels.
    pub pick_threshold_px: f64,
    /// Base threshold for ray picks, scaled by distance from the ray origin.
    pub ray_threshold: f64,
    /// Requested radius for Local queries.
    pub local_radius_ly: f64,
    /// Hard cap applied by the gateway to Local query radii.
    pub max_query_radius_ly: f64,
    /// Maximum number of stars in a Local snapshot.
    pub local_max_stars: usize,
    /// Maximum number of stars in the Structural snapshot.
    pub structural_max_stars: usize,
    /// Per-frame translation (ly) that counts as motion.
    pub position_epsilon_ly: f64,
    /// Per-frame `1 - |q0·q1|` that counts as rotation.
    pub rotation_epsilon: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            refresh_distance_ly: 2.0,
            debounce_secs: 0.3,
            cell_size_px: 32.0,
            pick_threshold_px: 12.0,
            ray_threshold: 1.0,
            local_radius_ly: 16.0,
            max_query_radius_ly: 16.0,
            local_max_stars: 10_000,
            structural_max_stars: 200_000,
            position_epsilon_ly: 1e-6,
            rotation_epsilon: 1e-6,
        }
    }
}

impl SelectorConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }

    /// Replace values that would break the grid, the pickers or the debounce
    /// timer with their defaults. Applied on load and by every selector.
    pub fn sanitize(&mut self) {
        let defaults = Self::default();
        if !(self.cell_size_px > 0.0 && self.cell_size_px.is_finite()) {
            log::warn!(
                "cell_size_px {} is not a positive finite size, using {}",
                self.cell_size_px,
                defaults.cell_size_px
            );
            self.cell_size_px = defaults.cell_size_px;
        }
        if !(self.pick_threshold_px > 0.0 && self.pick_threshold_px.is_finite()) {
            log::warn!(
                "pick_threshold_px {} is not a positive finite radius, using {}",
                self.pick_threshold_px,
                defaults.pick_threshold_px
            );
            self.pick_threshold_px = defaults.pick_threshold_px;
        }
        if !(self.ray_threshold > 0.0 && self.ray_threshold.is_finite()) {
            log::warn!(
                "ray_threshold {} is not a positive finite value, using {}",
                self.ray_threshold,
                defaults.ray_threshold
            );
            self.ray_threshold = defaults.ray_threshold;
        }
        if !(self.debounce_secs >= 0.0) {
            self.debounce_secs = defaults.debounce_secs;
        }
        if !(self.max_query_radius_ly > 0.0) {
            self.max_query_radius_ly = defaults.max_query_radius_ly;
        }
        self.refresh_distance_ly = self.refresh_distance_ly.max(0.0);
    }
}
