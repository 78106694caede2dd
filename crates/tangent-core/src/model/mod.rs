// ── Domain model ──
//
// Identity and value types shared by every engine component.

pub mod entity_id;
pub mod value;

pub use entity_id::EntityId;
pub use value::{Configuration, ParseValueError, TangentValue, ValueKind};
