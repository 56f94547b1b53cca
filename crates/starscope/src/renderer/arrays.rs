use crate::core::catalog::Catalog;

/// Parallel per-star arrays handed to the point-cloud renderer after each
/// catalog replacement. Positions are narrowed to f32.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarArrays {
    /// Epoch of the catalog these arrays were built from.
    pub epoch: u64,
    pub positions: Vec<[f32; 3]>,
    pub luminosities: Vec<f32>,
    pub temperatures: Vec<f32>,
    pub masses: Vec<f32>,
    pub ids: Vec<u64>,
    pub star_types: Vec<&'static str>,
}

impl StarArrays {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let n = catalog.len();
        let mut arrays = Self {
            epoch: catalog.epoch(),
            positions: Vec::with_capacity(n),
            luminosities: Vec::with_capacity(n),
            temperatures: Vec::with_capacity(n),
            masses: Vec::with_capacity(n),
            ids: Vec::with_capacity(n),
            star_types: Vec::with_capacity(n),
        };
        for star in catalog.iter() {
            arrays.positions.push(star.position.as_vec3().to_array());
            arrays.luminosities.push(star.luminosity as f32);
            arrays.temperatures.push(star.temperature as f32);
            arrays.masses.push(star.mass as f32);
            arrays.ids.push(star.id.0);
            arrays.star_types.push(star.star_type.name());
        }
        arrays
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Flat xyz floats for GPU upload.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw pointer to position data for SharedArrayBuffer reads.
    pub fn positions_ptr(&self) -> *const f32 {
        self.positions.as_ptr() as *const f32
    }

    pub fn luminosities_ptr(&self) -> *const f32 {
        self.luminosities.as_ptr()
    }

    pub fn temperatures_ptr(&self) -> *const f32 {
        self.temperatures.as_ptr()
    }

    pub fn masses_ptr(&self) -> *const f32 {
        self.masses.as_ptr()
    }

    /// Star ids as little-endian `u64`s; read with a `BigUint64Array` view.
    pub fn ids_ptr(&self) -> *const u64 {
        self.ids.as_ptr()
    }
}
