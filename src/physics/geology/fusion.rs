// src/physics/geology/fusion.rs

use crate::math::geometry::polygon::safe_boolean::SafeBoolean;
use crate::math::geometry::sphere::frame::{GeoCoord, SphericalFrame};
use crate::physics::world::WorldSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::crust::{CrustMeshFuser, CrustMeshSource, FibonacciMeshSampler};
use super::plate::{
    CrustKind, EulerPole, FeatureKind, Landmass, MotionSnapshot, ObjectId, PaintRegion, Plate,
    PlateId, PlatePolygon, PointFeature,
};
use super::seam::{SeamFeatureEmitter, SeamMarkerPass};

/// Fehler, die eine Fusion abbrechen. Geometrie- und Mesh-Degenerationen
/// tauchen hier nicht auf; sie werden lokal abgefangen und degradieren zu
/// einem Best-Effort-Ergebnis statt den Edit zu blockieren.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionError {
    #[error("plate {0} does not exist in the world snapshot")]
    NotFound(PlateId),

    #[error("cannot fuse plate {0} with itself")]
    SelfFusion(PlateId),
}

pub type FusionResult<T> = Result<T, FusionError>;

/// Konfiguration einer Plattenfusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Naht-Marker überhaupt erzeugen?
    pub emit_seam_markers: bool,
    /// Marker-Durchläufe entlang der Naht, in dieser Reihenfolge
    pub seam_passes: Vec<SeamMarkerPass>,
    /// Globale Stützpunktzahl für die Mesh-Neuerzeugung
    pub mesh_resolution: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            emit_seam_markers: true,
            seam_passes: vec![
                SeamMarkerPass {
                    kind: FeatureKind::Weakness,
                    interval: 2.0,
                },
                // dichterer zweiter Lauf mit anderem Feature-Typ
                SeamMarkerPass {
                    kind: FeatureKind::MountainSeed,
                    interval: 0.8,
                },
            ],
            mesh_resolution: 2048,
        }
    }
}

/// Verschmilzt zwei unabhängig entstandene Platten zu einer neuen Platte.
///
/// Die Operation ist eine reine Zustandstransformation: sie erhält einen
/// unveränderlichen Welt-Schnappschuss und liefert einen neuen zurück
/// (oder einen typisierten Fehler). Sie rendert nichts, persistiert nichts
/// und läuft synchron in einem Aufruf durch.
pub struct PlateFusion {
    config: FusionConfig,
    mesh_source: Box<dyn CrustMeshSource>,
}

impl Default for PlateFusion {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}

impl PlateFusion {
    pub fn new(config: FusionConfig) -> Self {
        Self {
            config,
            mesh_source: Box::new(FibonacciMeshSampler),
        }
    }

    /// Ersetzt den Mesh-Generator (z.B. durch den des Editors).
    pub fn with_mesh_source(mut self, source: Box<dyn CrustMeshSource>) -> Self {
        self.mesh_source = source;
        self
    }

    /// Fusioniert die Platten `id_a` und `id_b` im Schnappschuss `world`.
    ///
    /// Genau eine neue Platte entsteht; die Eltern werden zum Fusionszeitpunkt
    /// stillgelegt (nie gelöscht) und bleiben als Historie im Arena-Index.
    pub fn fuse(
        &self,
        world: &WorldSnapshot,
        id_a: PlateId,
        id_b: PlateId,
    ) -> FusionResult<WorldSnapshot> {
        let plate_a = world.plate(id_a).ok_or(FusionError::NotFound(id_a))?;
        let plate_b = world.plate(id_b).ok_or(FusionError::NotFound(id_b))?;
        if id_a == id_b {
            return Err(FusionError::SelfFusion(id_a));
        }

        let now = world.time;
        let rings_a: Vec<Vec<GeoCoord>> =
            plate_a.polygons.iter().map(|p| p.points.clone()).collect();
        let rings_b: Vec<Vec<GeoCoord>> =
            plate_b.polygons.iter().map(|p| p.points.clone()).collect();

        // 1. Footprint vereinigen (poln- und nahtsicher)
        let union = SafeBoolean::union(&rings_a, &rings_b);
        if let Some(reason) = union.degraded {
            log::warn!(
                "polygon union of '{}' and '{}' degraded to additive fallback: {reason:?}",
                plate_a.name,
                plate_b.name
            );
        }
        let polygons: Vec<PlatePolygon> = union
            .rings
            .into_iter()
            .map(PlatePolygon::from_ring)
            .collect();

        // 2. Krusten-Mesh neu aufbauen, falls mindestens ein Elternteil eines trägt
        let mesh = if plate_a.mesh.is_some() || plate_b.mesh.is_some() {
            let fuser = CrustMeshFuser::new(self.mesh_source.as_ref(), self.config.mesh_resolution);
            let fused = fuser.fuse(&polygons, plate_a, plate_b);
            if fused.is_none() {
                log::debug!(
                    "mesh generation produced no vertices, fusion of '{}' and '{}' carries no mesh",
                    plate_a.name,
                    plate_b.name
                );
            }
            fused
        } else {
            None
        };

        // 3. Schwerpunkt aus den vereinigten Ringen
        let centroid = SphericalFrame::centroid(
            polygons.iter().flat_map(|polygon| polygon.points.iter()),
        )
        .unwrap_or_else(|| {
            log::debug!("degenerate fused footprint, centroid falls back to origin");
            GeoCoord::new(0.0, 0.0)
        });

        // 4. Features: Bestand beider Eltern plus Naht-Marker
        let mut features: Vec<PointFeature> = plate_a
            .features
            .iter()
            .chain(plate_b.features.iter())
            .cloned()
            .collect();
        if self.config.emit_seam_markers && !self.config.seam_passes.is_empty() {
            let seam_paths = SeamFeatureEmitter::seam_paths(&rings_a, &rings_b);
            for pass in &self.config.seam_passes {
                for path in &seam_paths {
                    features.extend(SeamFeatureEmitter::emit_markers(
                        path,
                        pass,
                        &plate_a.name,
                        &plate_b.name,
                        now,
                    ));
                }
            }
        }

        // 5. Annotationen und Landmassen neu verankern: frische Ids und
        // Geburtszeit = Fusionszeit, damit sich keine Bewegungs-Historie
        // gegen eine stillgelegte Elternplatte aufsummiert.
        let paint: Vec<PaintRegion> = plate_a
            .paint
            .iter()
            .chain(plate_b.paint.iter())
            .map(|region| PaintRegion {
                id: ObjectId::random(),
                label: region.label.clone(),
                points: region.points.clone(),
                birth_time: now,
            })
            .collect();
        let landmasses: Vec<Landmass> = plate_a
            .landmasses
            .iter()
            .chain(plate_b.landmasses.iter())
            .map(|landmass| Landmass {
                id: ObjectId::random(),
                name: landmass.name.clone(),
                outline: landmass.outline.clone(),
                birth_time: now,
            })
            .collect();

        // 6. Neue Platte zusammensetzen, Lebenslauf beginnt mit genau einem
        // Bewegungs-Keyframe zum Fusionszeitpunkt.
        let fused_plate = Plate {
            id: PlateId::random(),
            name: format!("{}+{}", plate_a.name, plate_b.name),
            kind: CrustKind::fused(plate_a.kind, plate_b.kind),
            motion: vec![MotionSnapshot {
                time: now,
                // Bewegung weist der Editor neu zu; die Fusion startet ruhend
                pole: EulerPole::stationary(),
                polygons: polygons.clone(),
                features: features.clone(),
            }],
            polygons,
            features,
            mesh,
            paint,
            landmasses,
            events: Vec::new(),
            birth_time: now,
            death_time: None,
            parent_plate_ids: Some([id_a, id_b]),
            centroid,
        };
        let fused_id = fused_plate.id;

        // 7./8. Eltern in-place stilllegen, neue Platte anhängen, Auswahl
        // auf die neue Platte umbiegen. Der Eingabe-Schnappschuss bleibt
        // unangetastet.
        let name_a = plate_a.name.clone();
        let name_b = plate_b.name.clone();

        let mut next = world.clone();
        if let Some(parent) = next.plates.get_mut(&id_a) {
            parent.retire_into_fusion(now, &name_b);
        }
        if let Some(parent) = next.plates.get_mut(&id_b) {
            parent.retire_into_fusion(now, &name_a);
        }
        next.plates.insert(fused_id, fused_plate);
        next.selected = Some(fused_id);

        Ok(next)
    }
}
