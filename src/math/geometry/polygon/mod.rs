// src/math/geometry/polygon/mod.rs

pub mod safe_boolean;

pub use self::safe_boolean::{
    ALIGN_EPSILON_RAD, BooleanFailure, SafeBoolean, SafeBooleanOutcome, SafeFrame,
};
