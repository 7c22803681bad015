//! Scene persistence
//!
//! Scene files are RON. Objects serialize to nested [`ObjectRecord`]s;
//! each component contributes a type-tagged [`ComponentRecord`] whose
//! payload is an untyped RON value, so applications can add component
//! types without touching the file format. Only authored state is
//! persisted; derived caches (world matrices, skinning palettes) are
//! rebuilt after loading.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::scene::factory::ComponentFactory;
use crate::scene::object::{ObjectKey, Scene};
use crate::scene::SceneError;

/// Saved state of a transform component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRecord {
    /// Local position
    pub position: [f32; 3],
    /// Local rotation as Euler angles in degrees
    pub rotation: [f32; 3],
    /// Local scale
    pub scale: [f32; 3],
}

/// Saved state of a rotating component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotatingRecord {
    /// Rotation rate in degrees per second
    pub degrees_per_second: f32,
}

/// Saved state of a mesh component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshRecord {
    /// Source asset identifier; geometry and clips re-resolve from it
    pub asset: String,
    /// Active clip name
    pub active_clip: Option<String>,
    /// Playback speed multiplier
    pub playback_speed: f32,
}

/// One type-tagged component in a scene file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Factory type tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Component-defined payload
    pub data: ron::Value,
}

/// One scene object with its components and children
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Object name
    pub name: String,
    /// Components in attach order
    pub components: Vec<ComponentRecord>,
    /// Child objects in attach order
    pub children: Vec<ObjectRecord>,
}

/// A whole scene file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneRecord {
    /// Scene name
    pub name: String,
    /// Root objects in creation order
    pub objects: Vec<ObjectRecord>,
}

/// Convert any serializable value into an untyped RON payload
pub fn to_value<T: Serialize>(value: &T) -> Result<ron::Value, SceneError> {
    let text = ron::to_string(value).map_err(|e| SceneError::Serialize(e.to_string()))?;
    ron::from_str(&text).map_err(|e| SceneError::Parse(e.to_string()))
}

/// Convert an untyped RON payload back into a typed value
pub fn from_value<T: DeserializeOwned>(value: &ron::Value) -> Result<T, SceneError> {
    value
        .clone()
        .into_rust()
        .map_err(|e| SceneError::Parse(e.to_string()))
}

impl Scene {
    /// Serialize one object and its subtree
    pub fn save_object(&self, key: ObjectKey) -> Result<ObjectRecord, SceneError> {
        let obj = self
            .object(key)
            .ok_or_else(|| SceneError::Serialize("object no longer exists".to_string()))?;
        let mut components = Vec::with_capacity(obj.component_count());
        for component in &obj.components {
            components.push(ComponentRecord {
                kind: component.type_name().to_string(),
                data: component.save()?,
            });
        }
        let mut children = Vec::with_capacity(obj.children().len());
        for &child in obj.children() {
            children.push(self.save_object(child)?);
        }
        Ok(ObjectRecord {
            name: obj.name.clone(),
            components,
            children,
        })
    }

    /// Serialize the whole scene
    pub fn save(&self, name: &str) -> Result<SceneRecord, SceneError> {
        let mut objects = Vec::with_capacity(self.roots().len());
        for &root in self.roots() {
            objects.push(self.save_object(root)?);
        }
        Ok(SceneRecord {
            name: name.to_string(),
            objects,
        })
    }

    /// Rebuild one object subtree from its record
    ///
    /// Component types the factory does not know are logged and skipped so
    /// a newer scene file still loads into an older application.
    pub fn load_object(
        &mut self,
        record: &ObjectRecord,
        parent: Option<ObjectKey>,
        factory: &ComponentFactory,
    ) -> Result<ObjectKey, SceneError> {
        let key = self.create_object(&record.name, parent);
        for component_record in &record.components {
            match factory.create(&component_record.kind) {
                Ok(mut component) => {
                    component.load(&component_record.data)?;
                    self.add_component(key, component);
                }
                Err(SceneError::UnknownComponent(kind)) => {
                    log::warn!("skipping unknown component type '{kind}' on '{}'", record.name);
                }
                Err(e) => return Err(e),
            }
        }
        for child in &record.children {
            self.load_object(child, Some(key), factory)?;
        }
        Ok(key)
    }

    /// Rebuild a whole scene from its record
    pub fn load(record: &SceneRecord, factory: &ComponentFactory) -> Result<Self, SceneError> {
        let mut scene = Self::new();
        for object in &record.objects {
            scene.load_object(object, None, factory)?;
        }
        Ok(scene)
    }
}

/// Write a scene record to a RON file
pub fn save_scene_file(record: &SceneRecord, path: impl AsRef<Path>) -> Result<(), SceneError> {
    let contents = ron::ser::to_string_pretty(record, ron::ser::PrettyConfig::default())
        .map_err(|e| SceneError::Serialize(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Read a scene record from a RON file
pub fn load_scene_file(path: impl AsRef<Path>) -> Result<SceneRecord, SceneError> {
    let contents = std::fs::read_to_string(path)?;
    ron::from_str(&contents).map_err(|e| SceneError::Parse(e.to_string()))
}
