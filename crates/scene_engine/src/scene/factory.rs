//! Name-keyed component factory
//!
//! Maps the string type tag stored in scene files to a zero-argument
//! constructor, so deserialization can instantiate the right component
//! variant before handing it its saved data. Applications register their
//! own component types alongside the built-ins.

use std::collections::HashMap;

use crate::scene::component::{Component, RotatingComponent};
use crate::scene::mesh::MeshComponent;
use crate::scene::transform::TransformComponent;
use crate::scene::SceneError;

/// Zero-argument component constructor
pub type ComponentConstructor = fn() -> Box<dyn Component>;

/// Registry of component constructors keyed by type tag
pub struct ComponentFactory {
    constructors: HashMap<String, ComponentConstructor>,
}

impl Default for ComponentFactory {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ComponentFactory {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Create a registry with the engine's built-in components registered
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register("TransformComponent", || Box::new(TransformComponent::new()));
        factory.register("MeshComponent", || Box::new(MeshComponent::new()));
        factory.register("RotatingComponent", || Box::new(RotatingComponent::default()));
        factory
    }

    /// Register a constructor for `type_name`, replacing any existing one
    pub fn register(&mut self, type_name: impl Into<String>, constructor: ComponentConstructor) {
        self.constructors.insert(type_name.into(), constructor);
    }

    /// Instantiate a component by type tag
    pub fn create(&self, type_name: &str) -> Result<Box<dyn Component>, SceneError> {
        self.constructors
            .get(type_name)
            .map(|constructor| constructor())
            .ok_or_else(|| SceneError::UnknownComponent(type_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let factory = ComponentFactory::with_builtins();
        for tag in ["TransformComponent", "MeshComponent", "RotatingComponent"] {
            let component = factory.create(tag).unwrap();
            assert_eq!(component.type_name(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let factory = ComponentFactory::with_builtins();
        assert!(matches!(
            factory.create("PhysicsComponent"),
            Err(SceneError::UnknownComponent(_))
        ));
    }

    #[test]
    fn test_custom_registration() {
        let mut factory = ComponentFactory::new();
        factory.register("RotatingComponent", || {
            Box::new(RotatingComponent::new(5.0))
        });
        let component = factory.create("RotatingComponent").unwrap();
        assert_eq!(component.type_name(), "RotatingComponent");
    }
}
