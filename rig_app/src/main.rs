//! Headless skinned-rig demo
//!
//! Builds a small scene around a procedurally authored two-bone rig,
//! runs a fixed-timestep frame loop against a recording backend, and
//! round-trips the scene through its RON save format.

use std::sync::Arc;

use scene_engine::assets::{
    build_bones_info, build_clip, build_skeleton, ImportedBone, ImportedChannel, ImportedClip,
    ImportedNode, VertexWeight,
};
use scene_engine::foundation::logging;
use scene_engine::foundation::math::{Mat4, Vec3};
use scene_engine::foundation::time::Timer;
use scene_engine::prelude::*;
use scene_engine::scene::mesh::MeshPrimitive;
use scene_engine::scene::serialization::{load_scene_file, save_scene_file};

const FRAME_DT: f32 = 1.0 / 60.0;
const DEMO_SECONDS: f32 = 4.0;

/// Author the rig a model importer would normally hand over
fn authored_rig() -> (ImportedNode, Vec<ImportedBone>, ImportedClip) {
    let mut root = ImportedNode::new("Root", Mat4::identity());
    root.children.push(ImportedNode::new(
        "Arm",
        Mat4::new_translation(&Vec3::new(0.0, 1.0, 0.0)),
    ));

    let bones = vec![
        ImportedBone {
            name: "Root".to_string(),
            offset: Mat4::identity(),
            weights: vec![
                VertexWeight { vertex: 0, weight: 1.0 },
                VertexWeight { vertex: 1, weight: 0.4 },
            ],
        },
        ImportedBone {
            name: "Arm".to_string(),
            offset: Mat4::new_translation(&Vec3::new(0.0, -1.0, 0.0)),
            weights: vec![
                VertexWeight { vertex: 1, weight: 0.6 },
                VertexWeight { vertex: 2, weight: 1.0 },
                VertexWeight { vertex: 3, weight: 1.0 },
            ],
        },
    ];

    let clip = ImportedClip {
        name: "wave".to_string(),
        duration: 50.0,
        ticks_per_second: 25.0,
        channels: vec![ImportedChannel {
            target: "Arm".to_string(),
            position_keys: vec![
                (0.0, Vec3::new(0.0, 1.0, 0.0)),
                (25.0, Vec3::new(1.0, 1.0, 0.0)),
                (50.0, Vec3::new(0.0, 1.0, 0.0)),
            ],
            ..ImportedChannel::default()
        }],
    };

    (root, bones, clip)
}

fn build_scene() -> Scene {
    let (root_node, bones, clip) = authored_rig();
    let skeleton = Arc::new(build_skeleton(&root_node));

    let mut primitive = MeshPrimitive::new(4, 6);
    primitive.bones = build_bones_info(4, &bones);

    let mut mesh = MeshComponent::new();
    mesh.asset = "rigs/wave_arm.glb".to_string();
    mesh.set_skeleton(skeleton);
    mesh.primitives.push(primitive);
    mesh.add_clip(build_clip(&clip));

    let mut scene = Scene::new();
    let pivot = scene.create_object("pivot", None);
    scene.add_component(pivot, Box::new(TransformComponent::new()));
    scene.add_component(pivot, Box::new(RotatingComponent::new(45.0)));

    let rig = scene.create_object("rig", Some(pivot));
    scene.add_component(rig, Box::new(TransformComponent::new()));
    scene.add_component(rig, Box::new(mesh));
    scene.set_position(rig, Vec3::new(0.0, 0.0, -3.0));

    scene
}

fn run() -> Result<(), SceneError> {
    let config = EngineConfig::load_or_default("rig_app.toml");
    if let Err(e) = config.validate() {
        log::warn!("ignoring invalid config: {e}");
    }

    let mut scene = build_scene();
    let mut backend = RecordingBackend::new();
    let mut timer = Timer::new().with_max_delta(0.1);

    log::info!(
        "running {} object(s) for {DEMO_SECONDS}s at fixed {FRAME_DT}s steps",
        scene.len()
    );

    let mut elapsed = 0.0;
    while elapsed < DEMO_SECONDS {
        timer.tick();
        scene.update(FRAME_DT);
        backend.clear();
        scene.draw(&mut backend);
        elapsed += FRAME_DT;

        if timer.frame_count() % 60 == 0 {
            let palette_bones: usize = backend.draws.iter().map(|d| d.palette.len()).sum();
            log::info!(
                "t={elapsed:.2}s draws={} palette_bones={palette_bones}",
                backend.draws.len()
            );
        }
    }

    let record = scene.save("wave_demo")?;
    let path = std::env::temp_dir().join("rig_demo_scene.ron");
    save_scene_file(&record, &path)?;
    log::info!("saved scene to {}", path.display());

    let reloaded = load_scene_file(&path)?;
    let factory = ComponentFactory::with_builtins();
    let restored = Scene::load(&reloaded, &factory)?;
    log::info!(
        "reloaded '{}' with {} object(s)",
        reloaded.name,
        restored.len()
    );

    Ok(())
}

fn main() {
    logging::init();
    if let Err(e) = run() {
        log::error!("demo failed: {e}");
        std::process::exit(1);
    }
}
