// src/physics/geology/mod.rs

pub mod crust;
pub mod fusion;
pub mod plate;
pub mod seam;

pub use self::crust::{CrustMeshFuser, CrustMeshSource, CrustVertex, FibonacciMeshSampler, MeshSeed};
pub use self::fusion::{FusionConfig, FusionError, FusionResult, PlateFusion};
pub use self::plate::{
    CrustKind, EulerPole, FeatureKind, Landmass, MotionSnapshot, ObjectId, PaintRegion, Plate,
    PlateEvent, PlateId, PlatePolygon, PointFeature, Provenance,
};
pub use self::seam::{SeamFeatureEmitter, SeamMarkerPass};
