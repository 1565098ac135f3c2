// src/physics/geology/plate.rs

use crate::math::geometry::sphere::frame::GeoCoord;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identität einer Platte im Welt-Arena-Index.
/// 128 Bit Zufall, kollisionsresistent; es gibt keinen geteilten Zähler.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlateId(u128);

impl PlateId {
    /// Erzeugt eine neue zufällige Platten-Id.
    pub fn random() -> Self {
        Self(rand::rng().random())
    }
}

impl fmt::Display for PlateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Identität für Geometrie-Objekte einer Platte (Ringe, Features,
/// Annotationen, Landmassen). Gleiche Konstruktion wie `PlateId`, aber ein
/// eigener Typ, damit sich die Namensräume nicht vermischen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ObjectId(u128);

impl ObjectId {
    pub fn random() -> Self {
        Self(rand::rng().random())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Geschlossener Umriss-Ring einer Platte.
/// Invariante: mindestens 3 Punkte; der erste Punkt schließt den Ring
/// implizit und wird NICHT doppelt gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatePolygon {
    pub id: ObjectId,
    pub points: Vec<GeoCoord>,
    pub closed: bool,
}

impl PlatePolygon {
    /// Erstellt einen geschlossenen Ring mit frischer Id.
    pub fn from_ring(points: Vec<GeoCoord>) -> Self {
        Self {
            id: ObjectId::random(),
            points,
            closed: true,
        }
    }
}

/// Typen von Punkt-Features, exhaustiv gematcht.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Strukturelle Schwächezone (z.B. entlang einer Fusionsnaht)
    Weakness,
    /// Keimzelle für spätere Gebirgsbildung
    MountainSeed,
    Volcano,
    Hotspot,
}

/// Herkunftsvermerk eines Features, das aus einer Plattenfusion stammt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Namen der beiden verschmolzenen Platten
    pub fused_from: [String; 2],
    /// Simulationszeit der Fusion
    pub fused_at: f32,
}

/// Punkt-Feature auf einer Platte.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointFeature {
    pub id: ObjectId,
    pub kind: FeatureKind,
    pub position: GeoCoord,
    pub provenance: Option<Provenance>,
}

/// Euler-Pol: Rotationsachse (als geografische Koordinate) plus Winkelrate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EulerPole {
    pub pole: GeoCoord,
    pub rate_deg_per_myr: f32,
}

impl EulerPole {
    /// Bewegungsloser Deskriptor (Rate null).
    pub fn stationary() -> Self {
        Self {
            pole: GeoCoord::new(0.0, 90.0),
            rate_deg_per_myr: 0.0,
        }
    }
}

/// Bewegungs-Keyframe: ab `time` gültige Rotation plus eingefrorene Kopie
/// von Umriss und Features zu diesem Zeitpunkt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionSnapshot {
    pub time: f32,
    pub pole: EulerPole,
    pub polygons: Vec<PlatePolygon>,
    pub features: Vec<PointFeature>,
}

/// Gemalte Annotation, die auf einer Platte mitgeführt wird.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaintRegion {
    pub id: ObjectId,
    pub label: String,
    pub points: Vec<GeoCoord>,
    pub birth_time: f32,
}

/// Sub-Landmasse einer Platte.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landmass {
    pub id: ObjectId,
    pub name: String,
    pub outline: Vec<GeoCoord>,
    pub birth_time: f32,
}

/// Lebenszyklus-Ereignisse einer Platte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlateEvent {
    /// Die Platte wurde mit `partner` zu einer neuen Platte verschmolzen.
    Fusion { partner: String, time: f32 },
}

/// Krusten-Klassifikation einer Platte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrustKind {
    Oceanic,
    Continental,
}

impl CrustKind {
    pub fn is_oceanic(self) -> bool {
        matches!(self, CrustKind::Oceanic)
    }

    /// Klassifikation einer aus zwei Eltern entstandenen Platte:
    /// ozeanisch nur, wenn beide Eltern ozeanisch sind.
    pub fn fused(a: CrustKind, b: CrustKind) -> CrustKind {
        if a.is_oceanic() && b.is_oceanic() {
            CrustKind::Oceanic
        } else {
            CrustKind::Continental
        }
    }
}

/// Tektonische Platte.
///
/// Platten bilden über `parent_plate_ids` einen gerichteten azyklischen
/// Abstammungsgraphen; referenziert wird ausschließlich über Ids, nie über
/// eingebettete Objekte. Geometrie gehört exklusiv genau einer Platte.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plate {
    pub id: PlateId,
    pub name: String,
    pub kind: CrustKind,
    pub polygons: Vec<PlatePolygon>,
    pub features: Vec<PointFeature>,
    /// Attribut-Mesh (Punktwolke, keine Adjazenz)
    pub mesh: Option<Vec<super::crust::CrustVertex>>,
    pub paint: Vec<PaintRegion>,
    pub landmasses: Vec<Landmass>,
    pub motion: Vec<MotionSnapshot>,
    pub events: Vec<PlateEvent>,
    pub birth_time: f32,
    pub death_time: Option<f32>,
    pub parent_plate_ids: Option<[PlateId; 2]>,
    pub centroid: GeoCoord,
}

impl Plate {
    /// Minimaler Konstruktor für eine frisch geborene Platte ohne Mesh,
    /// Features oder Bewegung.
    pub fn new(name: impl Into<String>, kind: CrustKind, birth_time: f32) -> Self {
        Self {
            id: PlateId::random(),
            name: name.into(),
            kind,
            polygons: Vec::new(),
            features: Vec::new(),
            mesh: None,
            paint: Vec::new(),
            landmasses: Vec::new(),
            motion: Vec::new(),
            events: Vec::new(),
            birth_time,
            death_time: None,
            parent_plate_ids: None,
            centroid: GeoCoord::new(0.0, 0.0),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.death_time.is_none()
    }

    /// Legt die Platte zum Zeitpunkt `time` still: Todeszeit setzen, Mesh
    /// räumen (verhindert veraltete Interaktion mit der Nachfolger-Platte)
    /// und das Fusions-Ereignis protokollieren. Der Datensatz selbst bleibt
    /// für Historie und Timeline erhalten.
    pub fn retire_into_fusion(&mut self, time: f32, partner: &str) {
        self.death_time = Some(time);
        self.mesh = None;
        self.events.push(PlateEvent::Fusion {
            partner: partner.to_string(),
            time,
        });
    }

    /// Alle Umriss-Vertices der Platte.
    pub fn ring_points(&self) -> impl Iterator<Item = &GeoCoord> {
        self.polygons.iter().flat_map(|polygon| polygon.points.iter())
    }
}
