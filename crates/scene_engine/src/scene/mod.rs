//! Scene graph and components
//!
//! Objects live in a slotmap arena and reference each other by stable
//! [`ObjectKey`] handles: children are owned through the arena, parent
//! links are plain keys, so reparenting can never create dangling pointers
//! or reference cycles.
//!
//! Per-frame flow is two strictly ordered phases: [`Scene::update`] runs
//! every component's update (and applies the transform writes they queue),
//! then [`Scene::draw`] reads the cached world matrices and submits to the
//! render backend.

pub mod component;
pub mod factory;
pub mod mesh;
pub mod object;
pub mod serialization;
pub mod transform;

pub use component::{Component, DrawContext, RotatingComponent, UpdateContext};
pub use factory::ComponentFactory;
pub use mesh::{MeshComponent, MeshPrimitive};
pub use object::{ObjectKey, Scene, SceneObject};
pub use serialization::{ComponentRecord, ObjectRecord, SceneRecord};
pub use transform::{Transform, TransformComponent};

use thiserror::Error;

/// Scene graph errors
///
/// Raised only at the serialization and factory boundaries; the per-frame
/// core never fails, it degrades (missing transforms become identity,
/// missing channels leave bones rigid).
#[derive(Error, Debug)]
pub enum SceneError {
    /// IO error reading or writing a scene file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Component state could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// No constructor registered for a component type tag
    #[error("Unknown component type: {0}")]
    UnknownComponent(String),
}
