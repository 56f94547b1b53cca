pub mod geometry;
pub mod pick_grid;
pub mod point_pick;
pub mod ray_pick;
pub mod refresh;
