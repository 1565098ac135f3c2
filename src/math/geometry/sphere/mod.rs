// src/math/geometry/sphere/mod.rs

// Deklaration der Untermodule für Kugel-spezifische Funktionalität
pub mod frame;
pub mod sampling;

// Re-Exporte für den einfachen Zugriff auf die wichtigsten Kugel-Elemente
pub use self::frame::{GeoCoord, SphericalFrame};
pub use self::sampling::SamplingPatterns;
