// ./src/lib.rs
//! Plattenfusions-Engine des Tektonik-Editors.
//!
//! Verschmilzt zwei unabhängig entstandene Platten zu einer neuen Platte:
//! pol- und nahtsichere Vereinigung der Umriss-Ringe, isostatisch
//! re-äquilibrierte Fusion der Krusten-Meshes und Bogenlängen-genaue
//! Marker entlang der Fusionsnaht. Reine Zustandstransformation über
//! einem Welt-Schnappschuss; Rendering, Export und Bewegungs-Playback
//! sind externe Mitspieler.

// Eigene Module deklarieren
pub mod math;
pub mod physics;

// Öffentliche API
pub mod prelude {
    pub use crate::math::geometry::polygon::safe_boolean::{
        BooleanFailure, SafeBoolean, SafeBooleanOutcome, SafeFrame,
    };
    pub use crate::math::geometry::sphere::frame::{GeoCoord, SphericalFrame};
    pub use crate::physics::geology::{
        CrustKind, CrustMeshFuser, CrustMeshSource, CrustVertex, FeatureKind,
        FibonacciMeshSampler, FusionConfig, FusionError, FusionResult, Landmass, MeshSeed,
        MotionSnapshot, ObjectId, PaintRegion, Plate, PlateEvent, PlateFusion, PlateId,
        PlatePolygon, PointFeature, Provenance, SeamFeatureEmitter, SeamMarkerPass,
    };
    pub use crate::physics::world::WorldSnapshot;
}
