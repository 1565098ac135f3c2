// src/physics/world.rs

use crate::physics::geology::plate::{Plate, PlateId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Welt-Schnappschuss des Editors: alle Platten (lebend wie stillgelegt)
/// in einem Id-indizierten Arena-Index plus aktuelle Simulationszeit.
///
/// Der Abstammungsgraph der Platten ist ein DAG über `parent_plate_ids`;
/// Kanten bestehen ausschließlich aus Ids, nie aus eingebetteten Referenzen.
/// Operationen auf dem Schnappschuss liefern immer einen NEUEN Schnappschuss
/// zurück und mutieren die Eingabe nicht (Undo/Redo bleibt trivial).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Aktuelle Simulationszeit (Ma)
    pub time: f32,
    pub plates: BTreeMap<PlateId, Plate>,
    /// Im Editor ausgewählte Platte
    pub selected: Option<PlateId>,
}

impl WorldSnapshot {
    pub fn new(time: f32) -> Self {
        Self {
            time,
            plates: BTreeMap::new(),
            selected: None,
        }
    }

    pub fn plate(&self, id: PlateId) -> Option<&Plate> {
        self.plates.get(&id)
    }

    /// Fügt eine Platte ein und gibt ihre Id zurück.
    pub fn insert_plate(&mut self, plate: Plate) -> PlateId {
        let id = plate.id;
        self.plates.insert(id, plate);
        id
    }

    /// Alle noch lebenden Platten.
    pub fn live_plates(&self) -> impl Iterator<Item = &Plate> {
        self.plates.values().filter(|plate| plate.is_alive())
    }
}
