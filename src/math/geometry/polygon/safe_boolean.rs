// src/math/geometry/polygon/safe_boolean.rs

use crate::math::geometry::sphere::frame::{GeoCoord, SphericalFrame};
use crate::math::utils::*;
use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use nalgebra::{Rotation3, Unit, Vector3};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Winkel, unterhalb dessen die Safe-Frame-Rotation als Identität behandelt
/// wird (≈ 0,06 Grad).
pub const ALIGN_EPSILON_RAD: f32 = 1.0e-3;

/// Grund, aus dem eine Boolean-Operation auf den additiven Fallback
/// ausgewichen ist. "Kein Überlapp" ist KEIN Fehler und taucht hier nicht
/// auf; der Fallback wird nur bei echten Operator-Problemen gewählt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanFailure {
    /// Der planare Operator ist mit einem Panic ausgestiegen.
    OperatorPanic,
    /// Der Operator hat kein einziges brauchbares Ringergebnis geliefert.
    EmptyResult,
}

/// Ergebnis einer abgesicherten Boolean-Operation.
/// `degraded = Some(..)` markiert, dass das Ergebnis aus dem Fallback stammt.
#[derive(Debug, Clone)]
pub struct SafeBooleanOutcome {
    pub rings: Vec<Vec<GeoCoord>>,
    pub degraded: Option<BooleanFailure>,
}

/// Temporärer Rotations-Rahmen, der alle Eingabe-Vertices sicher um den
/// Koordinatenursprung (0°, 0°) bündelt. Innerhalb des Rahmens liegt kein
/// Vertex nahe einem Pol oder der ±180°-Naht, planare Algorithmen arbeiten
/// also auf unverzerrt zusammenhängenden Koordinaten.
#[derive(Debug, Clone, Copy)]
pub struct SafeFrame {
    rotation: Option<Rotation3<f32>>,
}

impl SafeFrame {
    /// Identitäts-Rahmen (keine Rotation).
    pub fn identity() -> Self {
        Self { rotation: None }
    }

    /// Baut den Rahmen aus dem sphärischen Schwerpunkt aller Koordinaten.
    pub fn from_coords<'a, I>(coords: I) -> Self
    where
        I: IntoIterator<Item = &'a GeoCoord>,
    {
        let target = Vector3::x(); // Einheitsvektor von (lon=0, lat=0)

        // Antipodal-symmetrische Eingaben haben keinen Schwerpunkt; dann ist
        // jede Rotation so gut wie keine.
        let Some(centroid) = SphericalFrame::centroid_vector(coords) else {
            return Self::identity();
        };

        let angle = centroid.dot(&target).clamp(-1.0, 1.0).acos();
        if angle < ALIGN_EPSILON_RAD {
            return Self::identity();
        }

        // Achse senkrecht zu Schwerpunkt und Ziel. Kollabiert sie (Schwerpunkt
        // antipodal zum Ziel), tut es jede zum Schwerpunkt senkrechte Achse.
        let mut axis = centroid.cross(&target);
        if axis.norm_squared() < constants::EPSILON_SQUARED {
            axis = Vector3::y();
        }

        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle);
        Self {
            rotation: Some(rotation),
        }
    }

    /// Sammelrahmen über mehrere Ringlisten.
    pub fn from_ring_sets(ring_sets: &[&[Vec<GeoCoord>]]) -> Self {
        Self::from_coords(
            ring_sets
                .iter()
                .flat_map(|rings| rings.iter())
                .flat_map(|ring| ring.iter()),
        )
    }

    /// Rotiert eine Koordinate in den Rahmen und liefert sie als planaren
    /// Punkt (x = Längengrad, y = Breitengrad, beides Grad).
    pub fn to_plane(&self, coord: GeoCoord) -> Coord<f32> {
        let vector = SphericalFrame::to_vector(coord);
        self.vector_to_plane(&vector)
    }

    /// Wie `to_plane`, aber direkt für einen Kugel-Vektor.
    pub fn vector_to_plane(&self, vector: &Vector3<f32>) -> Coord<f32> {
        let rotated = match self.rotation {
            Some(rotation) => rotation * vector,
            None => *vector,
        };
        let coord = SphericalFrame::to_coord(&rotated);
        Coord {
            x: coord.lon,
            y: coord.lat,
        }
    }

    /// Kehrt die Rotation um: planarer Punkt zurück in Weltkoordinaten.
    pub fn from_plane(&self, point: Coord<f32>) -> GeoCoord {
        let coord = GeoCoord::new(point.x, point.y);
        match self.rotation {
            Some(rotation) => {
                let vector = rotation.inverse() * SphericalFrame::to_vector(coord);
                SphericalFrame::to_coord(&vector)
            }
            None => coord,
        }
    }

    /// Baut aus Ringlisten ein planares MultiPolygon im Rahmen.
    /// Ringe mit weniger als 3 Punkten werden verworfen; der planare Backend
    /// schließt jeden Ring selbst (erster Punkt wird dupliziert).
    pub fn planar_rings(&self, rings: &[Vec<GeoCoord>]) -> MultiPolygon<f32> {
        let polygons = rings
            .iter()
            .filter(|ring| ring.len() >= 3)
            .map(|ring| {
                let exterior: Vec<Coord<f32>> =
                    ring.iter().map(|&coord| self.to_plane(coord)).collect();
                Polygon::new(LineString::from(exterior), vec![])
            })
            .collect::<Vec<_>>();
        MultiPolygon::new(polygons)
    }

    /// Liest die Ringe eines planaren Ergebnisses zurück in Weltkoordinaten.
    /// Der Schließ-Duplikat-Vertex wird entfernt, Ringe mit weniger als
    /// 3 verbleibenden Punkten verworfen. Es werden nur Außenringe gelesen;
    /// Löcher kennt das Plattenmodell nicht.
    pub fn world_rings(&self, planar: &MultiPolygon<f32>) -> Vec<Vec<GeoCoord>> {
        planar
            .0
            .iter()
            .filter_map(|polygon| {
                let mut points = polygon.exterior().0.clone();
                if points.len() > 1 && points.first() == points.last() {
                    points.pop();
                }
                if points.len() < 3 {
                    return None;
                }
                Some(
                    points
                        .into_iter()
                        .map(|point| self.from_plane(point))
                        .collect(),
                )
            })
            .collect()
    }
}

/// Abgesicherte Boolean-Operationen auf Ringlisten zweier Platten.
pub struct SafeBoolean;

impl SafeBoolean {
    /// Vereinigung beider Ringlisten zur minimalen Ringmenge über der
    /// kombinierten Fläche. Schlägt der planare Operator fehl, wird additiv
    /// auf die unveränderte Konkatenation beider Eingaben zurückgefallen;
    /// die Operation liefert also immer ein Ergebnis.
    pub fn union(rings_a: &[Vec<GeoCoord>], rings_b: &[Vec<GeoCoord>]) -> SafeBooleanOutcome {
        let frame = SafeFrame::from_ring_sets(&[rings_a, rings_b]);
        let planar_a = frame.planar_rings(rings_a);
        let planar_b = frame.planar_rings(rings_b);

        // Ohne einen einzigen brauchbaren Eingabe-Ring hat der Operator
        // nichts zu vereinigen
        if planar_a.0.is_empty() && planar_b.0.is_empty() {
            return Self::concat_fallback(rings_a, rings_b, BooleanFailure::EmptyResult);
        }

        let result = catch_unwind(AssertUnwindSafe(|| planar_a.union(&planar_b)));

        match result {
            Ok(unioned) => {
                let rings = frame.world_rings(&unioned);
                if rings.is_empty() {
                    Self::concat_fallback(rings_a, rings_b, BooleanFailure::EmptyResult)
                } else {
                    SafeBooleanOutcome {
                        rings,
                        degraded: None,
                    }
                }
            }
            Err(_) => Self::concat_fallback(rings_a, rings_b, BooleanFailure::OperatorPanic),
        }
    }

    /// Schnittmenge beider Ringlisten. Eine leere Schnittmenge ist hier ein
    /// legitimes Ergebnis (kein Überlapp) und KEIN Degradationsfall; nur ein
    /// Operator-Panic wird als solcher markiert.
    pub fn intersection(
        rings_a: &[Vec<GeoCoord>],
        rings_b: &[Vec<GeoCoord>],
    ) -> SafeBooleanOutcome {
        let frame = SafeFrame::from_ring_sets(&[rings_a, rings_b]);
        let planar_a = frame.planar_rings(rings_a);
        let planar_b = frame.planar_rings(rings_b);

        // Eine leere Seite kann nichts schneiden
        if planar_a.0.is_empty() || planar_b.0.is_empty() {
            return SafeBooleanOutcome {
                rings: Vec::new(),
                degraded: None,
            };
        }

        let result = catch_unwind(AssertUnwindSafe(|| planar_a.intersection(&planar_b)));

        match result {
            Ok(clipped) => SafeBooleanOutcome {
                rings: frame.world_rings(&clipped),
                degraded: None,
            },
            Err(_) => SafeBooleanOutcome {
                rings: Vec::new(),
                degraded: Some(BooleanFailure::OperatorPanic),
            },
        }
    }

    fn concat_fallback(
        rings_a: &[Vec<GeoCoord>],
        rings_b: &[Vec<GeoCoord>],
        reason: BooleanFailure,
    ) -> SafeBooleanOutcome {
        let rings = rings_a
            .iter()
            .chain(rings_b.iter())
            .filter(|ring| ring.len() >= 3)
            .cloned()
            .collect();
        SafeBooleanOutcome {
            rings,
            degraded: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(lon0: f32, lat0: f32, size: f32) -> Vec<GeoCoord> {
        vec![
            GeoCoord::new(lon0, lat0),
            GeoCoord::new(lon0 + size, lat0),
            GeoCoord::new(lon0 + size, lat0 + size),
            GeoCoord::new(lon0, lat0 + size),
        ]
    }

    // Shoelace-Fläche in Grad² (nur für Testvergleiche)
    fn ring_area(ring: &[GeoCoord]) -> f32 {
        let mut area = 0.0;
        for i in 0..ring.len() {
            let j = (i + 1) % ring.len();
            area += ring[i].lon * ring[j].lat - ring[j].lon * ring[i].lat;
        }
        (area * 0.5).abs()
    }

    #[test]
    fn test_safe_frame_roundtrip_near_pole() {
        let cluster = [
            GeoCoord::new(100.0, 82.0),
            GeoCoord::new(140.0, 84.0),
            GeoCoord::new(-160.0, 86.0),
            GeoCoord::new(60.0, 88.0),
        ];
        let frame = SafeFrame::from_coords(cluster.iter());

        for coord in cluster {
            let back = frame.from_plane(frame.to_plane(coord));
            let separation = SphericalFrame::great_circle_distance(coord, back);
            assert!(
                separation < 1e-4,
                "Roundtrip-Abweichung {} rad bei {:?}",
                separation,
                coord
            );
        }
    }

    #[test]
    fn test_safe_frame_clusters_pole_ring_at_origin() {
        let cluster = [
            GeoCoord::new(0.0, 85.0),
            GeoCoord::new(90.0, 85.0),
            GeoCoord::new(180.0, 85.0),
            GeoCoord::new(-90.0, 85.0),
        ];
        let frame = SafeFrame::from_coords(cluster.iter());

        for coord in cluster {
            let planar = frame.to_plane(coord);
            assert!(
                planar.x.abs() < 20.0 && planar.y.abs() < 20.0,
                "Vertex nicht am Ursprung gebündelt: {:?}",
                planar
            );
        }
    }

    #[test]
    fn test_union_of_disjoint_squares_keeps_two_rings() {
        let a = vec![square(0.0, 0.0, 1.0)];
        let b = vec![square(5.0, 0.0, 1.0)];

        let outcome = SafeBoolean::union(&a, &b);
        assert!(outcome.degraded.is_none());
        assert_eq!(outcome.rings.len(), 2);
        for ring in &outcome.rings {
            assert!(
                ring.len() == 4 || ring.len() == 5,
                "unerwartete Vertexzahl: {}",
                ring.len()
            );
        }
    }

    #[test]
    fn test_union_of_overlapping_squares_is_single_ring() {
        let a = vec![square(0.0, 0.0, 2.0)];
        let b = vec![square(1.0, 0.0, 2.0)];

        let outcome = SafeBoolean::union(&a, &b);
        assert!(outcome.degraded.is_none());
        assert_eq!(outcome.rings.len(), 1);

        let area = ring_area(&outcome.rings[0]);
        let input_area = ring_area(&a[0]);
        // Fläche muss zwischen der größeren Eingabe und der Summe liegen
        assert!(area > input_area * 0.99, "Fläche zu klein: {}", area);
        assert!(area < input_area * 2.0, "Fläche zu groß: {}", area);
    }

    #[test]
    fn test_union_across_antimeridian() {
        let a = vec![vec![
            GeoCoord::new(178.0, -1.0),
            GeoCoord::new(179.5, -1.0),
            GeoCoord::new(179.5, 1.0),
            GeoCoord::new(178.0, 1.0),
        ]];
        let b = vec![vec![
            GeoCoord::new(179.0, -1.0),
            GeoCoord::new(-179.0, -1.0),
            GeoCoord::new(-179.0, 1.0),
            GeoCoord::new(179.0, 1.0),
        ]];

        let outcome = SafeBoolean::union(&a, &b);
        assert!(outcome.degraded.is_none());
        assert_eq!(
            outcome.rings.len(),
            1,
            "Naht-überspannende Union muss einen Ring ergeben"
        );
    }

    #[test]
    fn test_intersection_of_disjoint_squares_is_empty() {
        let a = vec![square(0.0, 0.0, 1.0)];
        let b = vec![square(10.0, 10.0, 1.0)];

        let outcome = SafeBoolean::intersection(&a, &b);
        assert!(outcome.rings.is_empty());
        assert!(outcome.degraded.is_none(), "kein Überlapp ist kein Fehler");
    }

    #[test]
    fn test_intersection_of_overlapping_squares() {
        let a = vec![square(0.0, 0.0, 2.0)];
        let b = vec![square(1.0, 1.0, 2.0)];

        let outcome = SafeBoolean::intersection(&a, &b);
        assert!(outcome.degraded.is_none());
        assert_eq!(outcome.rings.len(), 1);

        let area = ring_area(&outcome.rings[0]);
        assert!(
            comparison::nearly_equal_eps(area, 1.0, 0.05),
            "Schnittfläche sollte ≈1 Grad² sein: {}",
            area
        );
    }

    #[test]
    fn test_union_of_empty_inputs_degrades() {
        let outcome = SafeBoolean::union(&[], &[]);
        assert!(outcome.rings.is_empty());
        assert_eq!(outcome.degraded, Some(BooleanFailure::EmptyResult));
    }
}
