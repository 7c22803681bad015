//! # Scene Engine
//!
//! A scene-graph and skeletal-animation core for real-time 3D rendering.
//!
//! ## Features
//!
//! - **Scene Graph**: Named objects with polymorphic components and
//!   cached, invalidation-driven world-transform propagation
//! - **Skeletal Animation**: Keyframed bone channels evaluated against an
//!   imported bone hierarchy into a per-primitive skinning palette
//! - **Serialization**: RON round-tripping of authored scene state through
//!   a name-keyed component factory
//! - **Backend Agnostic**: Rendering is an interface boundary; the engine
//!   hands the backend world matrices and matrix palettes, nothing more
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() {
//!     let mut scene = Scene::new();
//!     let rig = scene.create_object("rig", None);
//!     scene.add_component(rig, Box::new(TransformComponent::new()));
//!     scene.add_component(rig, Box::new(RotatingComponent::new(45.0)));
//!
//!     let mut backend = RecordingBackend::new();
//!     loop {
//!         scene.update(1.0 / 60.0);
//!         scene.draw(&mut backend);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod animation;
pub mod assets;
pub mod config;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        animation::{Animator, AnimationClip, AnimationChannel, BonesInfo, Skeleton},
        assets::{ImportedBone, ImportedClip, ImportedNode},
        config::{Config, ConfigError, EngineConfig},
        foundation::{
            math::{Mat4, Quat, Vec3},
            time::Timer,
        },
        render::{RecordingBackend, RenderBackend},
        scene::{
            ComponentFactory, MeshComponent, ObjectKey, RotatingComponent, Scene, SceneError,
            SceneObject, TransformComponent,
        },
    };
}
