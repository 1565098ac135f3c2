pub mod geometry;
pub mod utils;

// Öffentliche API
pub mod prelude {
    pub use super::{
        geometry::{
            polygon::safe_boolean::{BooleanFailure, SafeBoolean, SafeBooleanOutcome, SafeFrame},
            sphere::{frame::*, sampling::*},
        },
        utils::{angles, comparison, constants},
    };
}
