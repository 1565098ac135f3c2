// src/math/geometry/sphere/frame.rs

use crate::math::utils::*;
use nalgebra::{Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// Geografische Koordinate in Grad.
/// Längengrad in [-180, 180], Breitengrad in [-90, 90]; an den API-Grenzen
/// wird immer in Grad gerechnet, intern in Radiant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    /// Längengrad in Grad
    pub lon: f32,
    /// Breitengrad in Grad
    pub lat: f32,
}

impl GeoCoord {
    pub fn new(lon: f32, lat: f32) -> Self {
        Self { lon, lat }
    }
}

/// Koordinaten- und Vektor-Operationen auf der Einheitskugel.
///
/// Achsenkonvention: Die Y-Achse ist die Rotationsachse der Kugel (zeigt zum
/// Nordpol). Die X-Achse geht durch den Punkt (lat=0, lon=0), die Z-Achse
/// durch (lat=0, lon=90 Grad Ost).
pub struct SphericalFrame;

impl SphericalFrame {
    /// Konvertiert eine geografische Koordinate in einen Einheitsvektor.
    pub fn to_vector(coord: GeoCoord) -> Vector3<f32> {
        let lat_rad = angles::deg_to_rad(coord.lat);
        let lon_rad = angles::deg_to_rad(coord.lon);
        let cos_lat = lat_rad.cos();

        Vector3::new(
            cos_lat * lon_rad.cos(),
            lat_rad.sin(),
            cos_lat * lon_rad.sin(),
        )
    }

    /// Konvertiert einen Vektor (auf oder nahe der Kugeloberfläche) zurück
    /// in eine geografische Koordinate.
    pub fn to_coord(vector: &Vector3<f32>) -> GeoCoord {
        // Normalisieren eliminiert den Radius-Faktor; asin/atan2 erwarten
        // einen Einheitsvektor. Der Nullvektor ist hier Aufgabe des Aufrufers.
        let v = vector.normalize();
        let lat_rad = v.y.clamp(-1.0, 1.0).asin();
        let lon_rad = v.z.atan2(v.x);

        GeoCoord::new(angles::rad_to_deg(lon_rad), angles::rad_to_deg(lat_rad))
    }

    /// Rotiert einen Vektor um eine Achse um `angle_rad` (Rodrigues-Rotation).
    /// Eine Achse nahe dem Nullvektor lässt den Punkt unverändert.
    pub fn rotate(point: Vector3<f32>, axis: Vector3<f32>, angle_rad: f32) -> Vector3<f32> {
        if axis.norm_squared() < constants::EPSILON_SQUARED {
            log::warn!("rotation axis is near zero, skipping rotation");
            return point;
        }
        let unit_axis = Unit::new_normalize(axis);
        let rotation = Rotation3::from_axis_angle(&unit_axis, angle_rad);
        rotation * point
    }

    /// Skalarprodukt zweier Vektoren.
    pub fn dot(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
        a.dot(b)
    }

    /// Kreuzprodukt zweier Vektoren.
    pub fn cross(a: &Vector3<f32>, b: &Vector3<f32>) -> Vector3<f32> {
        a.cross(b)
    }

    /// Großkreis-Abstand zweier Koordinaten in Radiant (Haversine-Formel).
    pub fn great_circle_distance(a: GeoCoord, b: GeoCoord) -> f32 {
        let lat_a = angles::deg_to_rad(a.lat);
        let lat_b = angles::deg_to_rad(b.lat);
        let dlat = lat_b - lat_a;
        let dlon = angles::deg_to_rad(b.lon - a.lon);

        let h = (dlat * 0.5).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (dlon * 0.5).sin().powi(2);

        2.0 * h.sqrt().atan2((1.0 - h).sqrt())
    }

    /// Sphärischer Schwerpunkt: Mittel der Einheitsvektoren, renormalisiert.
    /// Gibt `None` zurück, wenn das Mittel (nahezu) in den Ursprung kollabiert,
    /// also bei antipodal-symmetrischen Eingaben oder leerer Eingabe.
    pub fn centroid_vector<'a, I>(coords: I) -> Option<Vector3<f32>>
    where
        I: IntoIterator<Item = &'a GeoCoord>,
    {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for coord in coords {
            sum += Self::to_vector(*coord);
            count += 1;
        }
        if count == 0 {
            return None;
        }

        let mean = sum / count as f32;
        if mean.norm_squared() < constants::EPSILON_SQUARED {
            return None;
        }
        Some(mean.normalize())
    }

    /// Sphärischer Schwerpunkt als geografische Koordinate.
    pub fn centroid<'a, I>(coords: I) -> Option<GeoCoord>
    where
        I: IntoIterator<Item = &'a GeoCoord>,
    {
        Self::centroid_vector(coords).map(|v| Self::to_coord(&v))
    }
}
