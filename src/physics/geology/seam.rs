// src/physics/geology/seam.rs

use crate::math::geometry::polygon::safe_boolean::SafeBoolean;
use crate::math::geometry::sphere::frame::{GeoCoord, SphericalFrame};
use crate::math::utils::*;
use serde::{Deserialize, Serialize};

use super::plate::{FeatureKind, ObjectId, PointFeature, Provenance};

/// Anteil des Intervalls, ab dem der letzte Naht-Punkt noch einen eigenen
/// Schlussmarker bekommt. Verhindert lange unmarkierte Endstücke, ohne
/// Beinahe-Duplikate am Ende zu erzeugen.
const TAIL_FRACTION: f32 = 0.3;

/// Ein Marker-Durchlauf entlang der Naht: Feature-Typ plus Abstand.
/// Mehrere Durchläufe über dieselbe Naht sind zulässig, z.B. Schwächezonen
/// grob und Gebirgskeime in einem dichteren zweiten Lauf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeamMarkerPass {
    pub kind: FeatureKind,
    /// Abstand in planaren Koordinaten-Einheiten (Grad)
    pub interval: f32,
}

/// Platziert Punkt-Features entlang der Fusionsnaht zweier Platten.
pub struct SeamFeatureEmitter;

impl SeamFeatureEmitter {
    /// Bestimmt die Naht beider Ringmengen.
    ///
    /// Überlappen sich die Platten, bilden die Randvertices der Schnittmenge
    /// (in Durchlaufreihenfolge, Ring geschlossen) je eine Polylinie. Ist die
    /// Schnittmenge leer, degeneriert die Naht zur Brücke zwischen dem global
    /// nächsten Vertex-Paar beider Platten.
    pub fn seam_paths(
        rings_a: &[Vec<GeoCoord>],
        rings_b: &[Vec<GeoCoord>],
    ) -> Vec<Vec<GeoCoord>> {
        let intersection = SafeBoolean::intersection(rings_a, rings_b);
        if let Some(reason) = intersection.degraded {
            log::warn!("seam intersection degraded, using bridge fallback: {reason:?}");
        }

        if !intersection.rings.is_empty() {
            return intersection
                .rings
                .into_iter()
                .map(|ring| {
                    let mut path = ring;
                    if let Some(&first) = path.first() {
                        path.push(first); // Ring für den Lauf schließen
                    }
                    path
                })
                .collect();
        }

        match Self::closest_vertex_pair(rings_a, rings_b) {
            Some((from, to)) => vec![vec![from, to]],
            None => Vec::new(),
        }
    }

    /// Global nächstes Vertex-Paar (erschöpfende Paarsuche, Großkreis-Metrik).
    fn closest_vertex_pair(
        rings_a: &[Vec<GeoCoord>],
        rings_b: &[Vec<GeoCoord>],
    ) -> Option<(GeoCoord, GeoCoord)> {
        let mut best: Option<(GeoCoord, GeoCoord, f32)> = None;
        for &vertex_a in rings_a.iter().flatten() {
            for &vertex_b in rings_b.iter().flatten() {
                let distance = SphericalFrame::great_circle_distance(vertex_a, vertex_b);
                if best.is_none_or(|(_, _, best_distance)| distance < best_distance) {
                    best = Some((vertex_a, vertex_b, distance));
                }
            }
        }
        best.map(|(a, b, _)| (a, b))
    }

    /// Läuft eine Naht-Polylinie ab und emittiert alle `interval` Einheiten
    /// einen Marker mit Herkunftsvermerk.
    pub fn emit_markers(
        path: &[GeoCoord],
        pass: &SeamMarkerPass,
        plate_a: &str,
        plate_b: &str,
        time: f32,
    ) -> Vec<PointFeature> {
        Self::walk(path, pass.interval)
            .into_iter()
            .map(|position| PointFeature {
                id: ObjectId::random(),
                kind: pass.kind,
                position,
                provenance: Some(Provenance {
                    fused_from: [plate_a.to_string(), plate_b.to_string()],
                    fused_at: time,
                }),
            })
            .collect()
    }

    /// Bogenlängen-Lauf: Marker am ersten Naht-Punkt, danach alle `interval`
    /// Einheiten entlang des kumulierten Pfads (lineare Interpolation im
    /// jeweiligen Segment, Restdistanz wird über Segmentgrenzen mitgeführt).
    /// Liegt der letzte Marker weiter als `TAIL_FRACTION * interval` vom
    /// Naht-Ende entfernt, kommt genau dort ein Schlussmarker hinzu.
    fn walk(path: &[GeoCoord], interval: f32) -> Vec<GeoCoord> {
        let Some(&start) = path.first() else {
            return Vec::new();
        };
        if interval <= constants::EPSILON {
            log::warn!("seam marker interval must be positive, skipping walk");
            return vec![start];
        }

        let mut markers = vec![start];
        let mut since_last = 0.0f32;

        for pair in path.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let length = Self::planar_distance(from, to);
            if length < constants::EPSILON {
                continue;
            }

            let mut consumed = 0.0f32;
            while since_last + (length - consumed) >= interval {
                consumed += interval - since_last;
                let t = consumed / length;
                markers.push(GeoCoord::new(
                    comparison::lerp(from.lon, to.lon, t),
                    comparison::lerp(from.lat, to.lat, t),
                ));
                since_last = 0.0;
            }
            since_last += length - consumed;
        }

        if let (Some(&last), Some(&end)) = (markers.last(), path.last()) {
            if Self::planar_distance(last, end) > TAIL_FRACTION * interval {
                markers.push(end);
            }
        }

        markers
    }

    /// Planare Distanz in Koordinaten-Einheiten (Grad), konsistent zu den
    /// gespeicherten Ringkoordinaten.
    fn planar_distance(a: GeoCoord, b: GeoCoord) -> f32 {
        let dlon = b.lon - a.lon;
        let dlat = b.lat - a.lat;
        (dlon * dlon + dlat * dlat).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path(length: f32) -> Vec<GeoCoord> {
        vec![GeoCoord::new(0.0, 0.0), GeoCoord::new(length, 0.0)]
    }

    fn square(lon0: f32, lat0: f32, size: f32) -> Vec<GeoCoord> {
        vec![
            GeoCoord::new(lon0, lat0),
            GeoCoord::new(lon0 + size, lat0),
            GeoCoord::new(lon0 + size, lat0 + size),
            GeoCoord::new(lon0, lat0 + size),
        ]
    }

    #[test]
    fn test_walk_places_marker_every_unit() {
        let markers = SeamFeatureEmitter::walk(&straight_path(10.0), 1.0);
        // Beide Endpunkte plus jeder volle Schritt dazwischen
        assert_eq!(markers.len(), 11);
        for (i, marker) in markers.iter().enumerate() {
            assert!(
                comparison::nearly_equal_eps(marker.lon, i as f32, 1e-4),
                "Marker {} an {}",
                i,
                marker.lon
            );
        }
    }

    #[test]
    fn test_walk_short_tail_gets_no_extra_marker() {
        // Reststück 0.2 < 0.3 * Intervall
        let markers = SeamFeatureEmitter::walk(&straight_path(10.2), 1.0);
        assert_eq!(markers.len(), 11);
    }

    #[test]
    fn test_walk_long_tail_gets_final_marker() {
        // Reststück 0.5 > 0.3 * Intervall -> Schlussmarker exakt am Ende
        let markers = SeamFeatureEmitter::walk(&straight_path(10.5), 1.0);
        assert_eq!(markers.len(), 12);
        assert!(comparison::nearly_equal_eps(
            markers.last().unwrap().lon,
            10.5,
            1e-4
        ));
    }

    #[test]
    fn test_walk_carries_distance_across_segments() {
        let path = vec![
            GeoCoord::new(0.0, 0.0),
            GeoCoord::new(0.6, 0.0),
            GeoCoord::new(1.2, 0.0),
        ];
        let markers = SeamFeatureEmitter::walk(&path, 1.0);
        // Start + ein Marker bei kumuliert 1.0 (0.4 ins zweite Segment)
        assert_eq!(markers.len(), 2);
        assert!(comparison::nearly_equal_eps(markers[1].lon, 1.0, 1e-4));
    }

    #[test]
    fn test_walk_zero_length_path() {
        let point = GeoCoord::new(3.0, 4.0);
        let markers = SeamFeatureEmitter::walk(&[point, point], 1.0);
        assert_eq!(markers.len(), 1);
    }

    #[test]
    fn test_seam_of_overlapping_plates_is_closed_ring_walk() {
        let a = vec![square(0.0, 0.0, 2.0)];
        let b = vec![square(1.0, 1.0, 2.0)];

        let paths = SeamFeatureEmitter::seam_paths(&a, &b);
        assert_eq!(paths.len(), 1);

        let path = &paths[0];
        assert!(path.len() >= 4);
        assert_eq!(path.first(), path.last(), "Ring muss geschlossen laufen");
    }

    #[test]
    fn test_seam_of_disjoint_plates_is_closest_bridge() {
        let a = vec![square(0.0, 0.0, 1.0)];
        let b = vec![square(5.0, 0.0, 1.0)];

        let paths = SeamFeatureEmitter::seam_paths(&a, &b);
        assert_eq!(paths.len(), 1);

        let bridge = &paths[0];
        assert_eq!(bridge.len(), 2);
        // Das nächste Paar liegt auf den zugewandten Kanten
        assert!(comparison::nearly_equal_eps(bridge[0].lon, 1.0, 1e-3));
        assert!(comparison::nearly_equal_eps(bridge[1].lon, 5.0, 1e-3));
    }

    #[test]
    fn test_emit_markers_carry_provenance() {
        let pass = SeamMarkerPass {
            kind: FeatureKind::Weakness,
            interval: 1.0,
        };
        let markers =
            SeamFeatureEmitter::emit_markers(&straight_path(3.0), &pass, "Laurasia", "Gondwana", 7.5);

        assert_eq!(markers.len(), 4);
        for marker in &markers {
            assert_eq!(marker.kind, FeatureKind::Weakness);
            let provenance = marker.provenance.as_ref().unwrap();
            assert_eq!(provenance.fused_from[0], "Laurasia");
            assert_eq!(provenance.fused_from[1], "Gondwana");
            assert!(comparison::nearly_equal(provenance.fused_at, 7.5));
        }
    }
}
