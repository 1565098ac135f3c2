// src/physics/geology/crust.rs

use crate::math::geometry::polygon::safe_boolean::SafeFrame;
use crate::math::geometry::sphere::frame::{GeoCoord, SphericalFrame};
use crate::math::geometry::sphere::sampling::SamplingPatterns;
use crate::math::utils::*;
use geo::Contains;
use serde::{Deserialize, Serialize};

use super::plate::{CrustKind, Plate, PlatePolygon};

/// Attribut-Stützpunkt eines Krusten-Meshes.
/// Das Mesh ist eine reine Punktwolke; der Fusionsalgorithmus benötigt
/// keinerlei Adjazenz-Struktur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrustVertex {
    pub position: GeoCoord,
    /// Oberflächenhöhe in Meter-Äquivalent
    pub elevation: f32,
    /// Krustenmächtigkeit in km-Äquivalent
    pub thickness: f32,
    /// Sedimentlast, immer >= 0
    pub sediment: f32,
    pub oceanic: bool,
}

impl CrustVertex {
    /// Frischer Stützpunkt mit den Gleichgewichts-Defaults seiner Klasse.
    pub fn default_for(position: GeoCoord, kind: CrustKind) -> Self {
        let oceanic = kind.is_oceanic();
        Self {
            position,
            elevation: isostasy::base_elevation(oceanic),
            thickness: isostasy::reference_thickness(oceanic),
            sediment: 0.0,
            oceanic,
        }
    }
}

/// Vereinfachtes Isostasie-Gleichgewicht: verknüpft Krustenmächtigkeit und
/// Dichte mit der Oberflächenhöhe. Eine Gleichgewichts-Heuristik, keine
/// geodynamische Simulation.
pub mod isostasy {
    pub const MANTLE_DENSITY: f32 = 3.3;
    pub const CONTINENTAL_DENSITY: f32 = 2.7;
    pub const OCEANIC_DENSITY: f32 = 3.0;
    pub const CONTINENTAL_REFERENCE_THICKNESS_KM: f32 = 35.0;
    pub const OCEANIC_REFERENCE_THICKNESS_KM: f32 = 7.0;
    pub const CONTINENTAL_BASE_ELEVATION_M: f32 = 800.0;
    pub const OCEANIC_BASE_ELEVATION_M: f32 = -2500.0;

    pub fn density(oceanic: bool) -> f32 {
        if oceanic { OCEANIC_DENSITY } else { CONTINENTAL_DENSITY }
    }

    pub fn reference_thickness(oceanic: bool) -> f32 {
        if oceanic {
            OCEANIC_REFERENCE_THICKNESS_KM
        } else {
            CONTINENTAL_REFERENCE_THICKNESS_KM
        }
    }

    pub fn base_elevation(oceanic: bool) -> f32 {
        if oceanic {
            OCEANIC_BASE_ELEVATION_M
        } else {
            CONTINENTAL_BASE_ELEVATION_M
        }
    }

    /// Gleichgewichtshöhe für eine gegebene Mächtigkeit.
    /// Referenzmächtigkeit ergibt exakt die Basishöhe der Klasse.
    pub fn equilibrium_elevation(thickness_km: f32, oceanic: bool) -> f32 {
        base_elevation(oceanic)
            + (thickness_km - reference_thickness(oceanic))
                * (1.0 - density(oceanic) / MANTLE_DENSITY)
                * 1000.0
    }
}

/// Stützpunkt, wie ihn der Mesh-Generator liefert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshSeed {
    pub position: GeoCoord,
}

/// Externer Mesh-Generator-Kontrakt: gleichmäßig verteilte Stützpunkte über
/// einem Footprint. Deterministisch und frei von Seiteneffekten für gleiche
/// Eingaben.
pub trait CrustMeshSource {
    fn generate_mesh(&self, footprint: &[PlatePolygon], resolution: usize) -> Vec<MeshSeed>;
}

/// Standard-Generator: tastet die Kugel mit einer Fibonacci-Spirale ab und
/// behält die Punkte, die im Footprint liegen. `resolution` ist die globale
/// Stützpunktzahl; der Footprint erhält den auf ihn entfallenden Anteil.
#[derive(Debug, Default)]
pub struct FibonacciMeshSampler;

impl CrustMeshSource for FibonacciMeshSampler {
    fn generate_mesh(&self, footprint: &[PlatePolygon], resolution: usize) -> Vec<MeshSeed> {
        let rings: Vec<Vec<GeoCoord>> = footprint
            .iter()
            .filter(|polygon| polygon.points.len() >= 3)
            .map(|polygon| polygon.points.clone())
            .collect();
        if rings.is_empty() {
            return Vec::new();
        }

        // Enthaltensein wird im Safe-Frame des Footprints getestet, damit
        // Ringe über Pol oder Datumsgrenze nicht zerreißen.
        let frame = SafeFrame::from_ring_sets(&[&rings]);
        let planar = frame.planar_rings(&rings);

        SamplingPatterns::fibonacci_sphere(resolution)
            .into_iter()
            .filter_map(|vector| {
                let point = geo::Point::from(frame.vector_to_plane(&vector));
                if planar.0.iter().any(|polygon| polygon.contains(&point)) {
                    Some(MeshSeed {
                        position: SphericalFrame::to_coord(&vector),
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Baut das Attribut-Mesh einer fusionierten Platte aus den Meshes der
/// beiden Eltern. Wird nur aufgerufen, wenn mindestens ein Elternteil ein
/// Mesh trägt.
pub struct CrustMeshFuser<'a> {
    source: &'a dyn CrustMeshSource,
    resolution: usize,
}

impl<'a> CrustMeshFuser<'a> {
    pub fn new(source: &'a dyn CrustMeshSource, resolution: usize) -> Self {
        Self { source, resolution }
    }

    /// Erzeugt das neue Mesh über dem fusionierten Footprint.
    /// `None`, wenn der Generator keine Stützpunkte geliefert hat.
    ///
    /// Die Nachbarsuche ist Brute-Force, O(V_neu × (V_A + V_B));
    /// bei Editor-Meshgrößen (Hunderte bis wenige Tausend Stützpunkte) ist
    /// das der dominante, aber akzeptable Kostenblock. Jenseits davon wäre
    /// ein räumlicher Index nötig.
    pub fn fuse(
        &self,
        footprint: &[PlatePolygon],
        parent_a: &Plate,
        parent_b: &Plate,
    ) -> Option<Vec<CrustVertex>> {
        let fused_kind = CrustKind::fused(parent_a.kind, parent_b.kind);

        let seeds = self.source.generate_mesh(footprint, self.resolution);
        if seeds.is_empty() {
            return None;
        }

        let mesh_a = parent_a.mesh.as_deref();
        let mesh_b = parent_b.mesh.as_deref();

        Some(
            seeds
                .iter()
                .map(|seed| Self::blend_vertex(seed.position, mesh_a, mesh_b, fused_kind))
                .collect(),
        )
    }

    /// Mischt die Attribute eines Stützpunkts aus den nächstgelegenen
    /// Vertices beider Eltern-Meshes.
    fn blend_vertex(
        position: GeoCoord,
        mesh_a: Option<&[CrustVertex]>,
        mesh_b: Option<&[CrustVertex]>,
        fused_kind: CrustKind,
    ) -> CrustVertex {
        match (
            Self::nearest(mesh_a, position),
            Self::nearest(mesh_b, position),
        ) {
            // Kein Elternteil trägt etwas bei: Klassen-Defaults behalten
            (None, None) => CrustVertex::default_for(position, fused_kind),

            // Genau ein Elternteil: Attribute unverändert übernehmen.
            // Die Elevation ist dort bereits konsistent; eine Neuberechnung
            // würde nur Drift einschleppen.
            (Some((vertex, _)), None) | (None, Some((vertex, _))) => CrustVertex {
                position,
                elevation: vertex.elevation,
                thickness: vertex.thickness,
                sediment: vertex.sediment,
                oceanic: vertex.oceanic,
            },

            // Beide Eltern: inverse Distanzgewichtung für Mächtigkeit und
            // Sediment. Die Elevation wird NICHT interpoliert, sondern aus
            // der gemischten Mächtigkeit isostatisch neu abgeleitet; direkte
            // Mischung erzeugt Höhenspitzen an Kollisionsnähten.
            (Some((vertex_a, dist_a)), Some((vertex_b, dist_b))) => {
                let weight_a = 1.0 / (dist_a + constants::EPSILON);
                let weight_b = 1.0 / (dist_b + constants::EPSILON);
                let weight_sum = weight_a + weight_b;

                let thickness = (Self::thickness_or_default(vertex_a) * weight_a
                    + Self::thickness_or_default(vertex_b) * weight_b)
                    / weight_sum;
                let sediment =
                    ((vertex_a.sediment * weight_a + vertex_b.sediment * weight_b) / weight_sum)
                        .max(0.0);
                let oceanic = vertex_a.oceanic && vertex_b.oceanic;

                CrustVertex {
                    position,
                    elevation: isostasy::equilibrium_elevation(thickness, oceanic),
                    thickness,
                    sediment,
                    oceanic,
                }
            }
        }
    }

    /// Nächster Vertex im Eltern-Mesh (Großkreis-Metrik), Brute-Force.
    fn nearest(
        mesh: Option<&[CrustVertex]>,
        position: GeoCoord,
    ) -> Option<(&CrustVertex, f32)> {
        let mut best: Option<(&CrustVertex, f32)> = None;
        for vertex in mesh?.iter() {
            let distance = SphericalFrame::great_circle_distance(position, vertex.position);
            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((vertex, distance)),
            }
        }
        best
    }

    /// Mächtigkeit eines Quell-Vertex; nicht gesetzte Werte (<= 0 oder nicht
    /// endlich) werden durch den Klassen-Default ersetzt.
    fn thickness_or_default(vertex: &CrustVertex) -> f32 {
        if vertex.thickness.is_finite() && vertex.thickness > 0.0 {
            vertex.thickness
        } else {
            isostasy::reference_thickness(vertex.oceanic)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn continental_vertex(lon: f32, lat: f32, thickness: f32) -> CrustVertex {
        CrustVertex {
            position: GeoCoord::new(lon, lat),
            elevation: isostasy::equilibrium_elevation(thickness, false),
            thickness,
            sediment: 0.0,
            oceanic: false,
        }
    }

    fn plate_with_mesh(name: &str, kind: CrustKind, mesh: Vec<CrustVertex>) -> Plate {
        let mut plate = Plate::new(name, kind, 0.0);
        plate.mesh = Some(mesh);
        plate
    }

    /// Generator-Stub mit festen Stützpunkten
    struct FixedSource(Vec<MeshSeed>);

    impl CrustMeshSource for FixedSource {
        fn generate_mesh(&self, _footprint: &[PlatePolygon], _resolution: usize) -> Vec<MeshSeed> {
            self.0.clone()
        }
    }

    #[test]
    fn test_isostasy_baselines() {
        // Referenzmächtigkeit ergibt exakt die Basishöhe
        assert_relative_eq!(isostasy::equilibrium_elevation(35.0, false), 800.0);
        assert_relative_eq!(isostasy::equilibrium_elevation(7.0, true), -2500.0);
    }

    #[test]
    fn test_isostasy_uplift_for_thick_crust() {
        let elevation = isostasy::equilibrium_elevation(45.0, false);
        // 10 km Übermächtigkeit, (1 - 2.7/3.3) * 1000 m pro km
        let expected = 800.0 + 10.0 * (1.0 - 2.7 / 3.3) * 1000.0;
        assert_relative_eq!(elevation, expected, epsilon = 0.5);
    }

    #[test]
    fn test_blend_equidistant_is_unweighted_average() {
        let parent_a = plate_with_mesh(
            "A",
            CrustKind::Continental,
            vec![continental_vertex(-1.0, 0.0, 40.0)],
        );
        let parent_b = plate_with_mesh(
            "B",
            CrustKind::Continental,
            vec![continental_vertex(1.0, 0.0, 30.0)],
        );

        let source = FixedSource(vec![MeshSeed {
            position: GeoCoord::new(0.0, 0.0),
        }]);
        let fuser = CrustMeshFuser::new(&source, 0);
        let mesh = fuser.fuse(&[], &parent_a, &parent_b).unwrap();

        assert_eq!(mesh.len(), 1);
        assert_relative_eq!(mesh[0].thickness, 35.0, epsilon = 1e-3);
        // 35 km kontinental ist die Referenzmächtigkeit -> Basishöhe
        assert_relative_eq!(mesh[0].elevation, 800.0, epsilon = 1.0);
        assert!(!mesh[0].oceanic);
    }

    #[test]
    fn test_single_parent_copies_attributes_verbatim() {
        let mut odd_vertex = continental_vertex(10.0, 10.0, 50.0);
        odd_vertex.elevation = 1234.5; // absichtlich NICHT im Gleichgewicht
        odd_vertex.sediment = 3.25;

        let parent_a = plate_with_mesh("A", CrustKind::Continental, vec![odd_vertex.clone()]);
        let parent_b = Plate::new("B", CrustKind::Continental, 0.0); // kein Mesh

        let source = FixedSource(vec![MeshSeed {
            position: GeoCoord::new(12.0, 9.0),
        }]);
        let fuser = CrustMeshFuser::new(&source, 0);
        let mesh = fuser.fuse(&[], &parent_a, &parent_b).unwrap();

        // Keine Neuberechnung, keine Mischung
        assert_relative_eq!(mesh[0].elevation, 1234.5);
        assert_relative_eq!(mesh[0].thickness, 50.0);
        assert_relative_eq!(mesh[0].sediment, 3.25);
    }

    #[test]
    fn test_blended_vertex_is_oceanic_only_if_both_are() {
        let oceanic_vertex = CrustVertex {
            position: GeoCoord::new(-1.0, 0.0),
            elevation: -2500.0,
            thickness: 7.0,
            sediment: 0.0,
            oceanic: true,
        };
        let parent_a = plate_with_mesh("A", CrustKind::Oceanic, vec![oceanic_vertex]);
        let parent_b = plate_with_mesh(
            "B",
            CrustKind::Continental,
            vec![continental_vertex(1.0, 0.0, 35.0)],
        );

        let source = FixedSource(vec![MeshSeed {
            position: GeoCoord::new(0.0, 0.0),
        }]);
        let fuser = CrustMeshFuser::new(&source, 0);
        let mesh = fuser.fuse(&[], &parent_a, &parent_b).unwrap();

        assert!(!mesh[0].oceanic);
    }

    #[test]
    fn test_unset_thickness_falls_back_to_class_default() {
        let mut vertex_a = continental_vertex(-1.0, 0.0, 35.0);
        vertex_a.thickness = 0.0; // "nicht gesetzt"
        let parent_a = plate_with_mesh("A", CrustKind::Continental, vec![vertex_a]);
        let parent_b = plate_with_mesh(
            "B",
            CrustKind::Continental,
            vec![continental_vertex(1.0, 0.0, 35.0)],
        );

        let source = FixedSource(vec![MeshSeed {
            position: GeoCoord::new(0.0, 0.0),
        }]);
        let fuser = CrustMeshFuser::new(&source, 0);
        let mesh = fuser.fuse(&[], &parent_a, &parent_b).unwrap();

        assert_relative_eq!(mesh[0].thickness, 35.0, epsilon = 1e-3);
    }

    #[test]
    fn test_empty_generation_yields_no_mesh() {
        let parent_a = plate_with_mesh("A", CrustKind::Continental, vec![]);
        let parent_b = Plate::new("B", CrustKind::Continental, 0.0);

        let source = FixedSource(Vec::new());
        let fuser = CrustMeshFuser::new(&source, 0);
        assert!(fuser.fuse(&[], &parent_a, &parent_b).is_none());
    }

    #[test]
    fn test_fibonacci_sampler_stays_inside_footprint() {
        let footprint = vec![PlatePolygon::from_ring(vec![
            GeoCoord::new(-10.0, -10.0),
            GeoCoord::new(10.0, -10.0),
            GeoCoord::new(10.0, 10.0),
            GeoCoord::new(-10.0, 10.0),
        ])];

        let seeds = FibonacciMeshSampler.generate_mesh(&footprint, 2048);
        assert!(!seeds.is_empty(), "Footprint sollte Stützpunkte erhalten");

        for seed in &seeds {
            assert!(
                seed.position.lon.abs() <= 10.5 && seed.position.lat.abs() <= 10.5,
                "Stützpunkt außerhalb des Footprints: {:?}",
                seed.position
            );
        }
    }
}
