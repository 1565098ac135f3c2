// src/math/geometry/mod.rs

// Deklaration der Haupt-Geometriemodule
pub mod polygon;
pub mod sphere;

// Re-Exporte für einen schnellen Zugriff auf die Kern-Geometrietypen,
// falls man nicht das gesamte `math::prelude` importieren möchte.
pub use self::polygon::{BooleanFailure, SafeBoolean, SafeBooleanOutcome, SafeFrame};
pub use self::sphere::{GeoCoord, SamplingPatterns, SphericalFrame};
