pub mod geology;
pub mod world;

pub use world::WorldSnapshot;
