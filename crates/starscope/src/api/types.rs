use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Stable identifier for a star, unique within one generator seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarId(pub u64);

/// Spectral or exotic class of a star.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StarType {
    O,
    B,
    A,
    F,
    G,
    K,
    M,
    WhiteDwarf,
    NeutronStar,
    BlackHole,
}

impl StarType {
    pub const ALL: [StarType; 10] = [
        StarType::O,
        StarType::B,
        StarType::A,
        StarType::F,
        StarType::G,
        StarType::K,
        StarType::M,
        StarType::WhiteDwarf,
        StarType::NeutronStar,
        StarType::BlackHole,
    ];

    /// Name handed to list views and the renderer.
    pub fn name(self) -> &'static str {
        match self {
            StarType::O => "O",
            StarType::B => "B",
            StarType::A => "A",
            StarType::F => "F",
            StarType::G => "G",
            StarType::K => "K",
            StarType::M => "M",
            StarType::WhiteDwarf => "WhiteDwarf",
            StarType::NeutronStar => "NeutronStar",
            StarType::BlackHole => "BlackHole",
        }
    }

    /// Typical luminosity in solar units.
    pub fn nominal_luminosity(self) -> f64 {
        match self {
            StarType::O => 100_000.0,
            StarType::B => 1_000.0,
            StarType::A => 20.0,
            StarType::F => 3.0,
            StarType::G => 1.0,
            StarType::K => 0.3,
            StarType::M => 0.02,
            StarType::WhiteDwarf => 0.005,
            StarType::NeutronStar => 0.001,
            StarType::BlackHole => 0.000_1,
        }
    }

    /// Typical surface temperature in Kelvin.
    pub fn nominal_temperature(self) -> f64 {
        match self {
            StarType::O => 35_000.0,
            StarType::B => 18_000.0,
            StarType::A => 8_500.0,
            StarType::F => 6_700.0,
            StarType::G => 5_700.0,
            StarType::K => 4_500.0,
            StarType::M => 3_200.0,
            StarType::WhiteDwarf => 12_000.0,
            StarType::NeutronStar => 600_000.0,
            StarType::BlackHole => 10.0,
        }
    }

    /// Typical mass in solar masses.
    pub fn nominal_mass(self) -> f64 {
        match self {
            StarType::O => 30.0,
            StarType::B => 8.0,
            StarType::A => 2.0,
            StarType::F => 1.3,
            StarType::G => 1.0,
            StarType::K => 0.7,
            StarType::M => 0.3,
            StarType::WhiteDwarf => 0.6,
            StarType::NeutronStar => 1.4,
            StarType::BlackHole => 10.0,
        }
    }
}

/// A fully-typed star produced by the generator gateway. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarRecord {
    pub id: StarId,
    /// Galaxy-frame position in light-years.
    pub position: DVec3,
    /// Solar luminosities, always positive.
    pub luminosity: f64,
    /// Kelvin, always positive.
    pub temperature: f64,
    /// Solar masses.
    pub mass: f64,
    pub star_type: StarType,
}

/// A star as the generator hands it over. Attributes may be missing; the
/// gateway fills them from the star type before anything reaches the
/// picking core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawStar {
    pub id: u64,
    pub position: [f64; 3],
    #[serde(default)]
    pub luminosity: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub mass: Option<f64>,
    #[serde(default)]
    pub star_type: Option<StarType>,
}

impl RawStar {
    /// Resolve missing or non-physical attributes against the star type.
    /// An unknown type falls back to a main-sequence G star.
    pub fn into_record(self) -> StarRecord {
        let star_type = self.star_type.unwrap_or(StarType::G);
        let positive_or = |value: Option<f64>, fallback: f64| match value {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => fallback,
        };
        StarRecord {
            id: StarId(self.id),
            position: DVec3::from_array(self.position),
            luminosity: positive_or(self.luminosity, star_type.nominal_luminosity()),
            temperature: positive_or(self.temperature, star_type.nominal_temperature()),
            mass: positive_or(self.mass, star_type.nominal_mass()),
            star_type,
        }
    }
}

/// Which of the two live catalogs an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CatalogTag {
    Structural,
    Local,
}

impl CatalogTag {
    /// Evaluation order for point picks: Local entries win over Structural.
    pub const PICK_PRIORITY: [CatalogTag; 2] = [CatalogTag::Local, CatalogTag::Structural];
}

/// Notification emitted by the selector for list-style consumers.
/// Drained once per frame by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// The Structural catalog was (re)loaded.
    StructureLoaded { epoch: u64, count: usize },
    /// The Local catalog was replaced wholesale.
    LocalReplaced { epoch: u64, count: usize },
    /// The pick grid was rebuilt against the current camera.
    GridRebuilt { entries: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_star_fills_missing_fields_from_type() {
        let raw = RawStar {
            id: 7,
            position: [1.0, 2.0, 3.0],
            luminosity: None,
            temperature: Some(-5.0),
            mass: Some(0.4),
            star_type: Some(StarType::M),
        };
        let star = raw.into_record();
        assert_eq!(star.id, StarId(7));
        assert_eq!(star.position, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(star.luminosity, StarType::M.nominal_luminosity());
        assert_eq!(star.temperature, StarType::M.nominal_temperature());
        assert_eq!(star.mass, 0.4);
    }

    #[test]
    fn raw_star_parses_from_loose_json() {
        let json = r#"{ "id": 3, "position": [0.0, 0.0, 1.5] }"#;
        let raw: RawStar = serde_json::from_str(json).unwrap();
        let star = raw.into_record();
        assert_eq!(star.star_type, StarType::G);
        assert!(star.luminosity > 0.0);
    }

    #[test]
    fn local_is_picked_first() {
        assert_eq!(CatalogTag::PICK_PRIORITY[0], CatalogTag::Local);
    }
}
