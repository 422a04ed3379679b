//! Offscreen rendering on a real adapter
//!
//! Run with `cargo test --features gpu-tests`.
#![cfg(feature = "gpu-tests")]

use std::path::Path;

use boardview::{RenderConfig, RenderEngine, SceneManager, SceneManifest};

const RED_BOX: &str = r#"{
    "lighting": { "use_lighting": false },
    "parts": [
        {
            "name": "block",
            "primitive": "box",
            "transform": { "scale": [4, 4, 4] },
            "surface": { "kind": "color", "rgba": [1, 0, 0, 1] }
        }
    ]
}"#;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_unlit_box_covers_the_center() {
    init_logger();
    let config = RenderConfig::default().with_size(64, 48);
    let mut engine = pollster::block_on(RenderEngine::new_headless(&config)).unwrap();
    let mut scene = SceneManager::new(SceneManifest::from_json_str(RED_BOX).unwrap(), &config);

    scene.prepare_scene(&mut engine, Path::new("assets")).unwrap();
    let stats = engine.render(&mut scene).unwrap();
    assert_eq!(stats.draw_calls, 1);

    let image = engine.read_frame().unwrap();
    assert_eq!(image.dimensions(), (64, 48));
    assert_eq!(image.get_pixel(32, 24).0, [255, 0, 0, 255]);

    let corner = image.get_pixel(0, 0).0;
    assert!(corner[0] < 128, "corner should show the clear color, got {:?}", corner);
}

#[test]
fn test_builtin_board_renders_without_textures() {
    init_logger();
    let config = RenderConfig::default().with_size(160, 90);
    let image = boardview::render_builtin(&config, Path::new("does-not-exist")).unwrap();

    assert_eq!(image.dimensions(), (160, 90));
    let first = *image.get_pixel(0, 0);
    assert!(image.pixels().any(|pixel| *pixel != first));
}

fn side_lit_box(shininess: f32) -> String {
    format!(
        r#"{{
            "materials": [
                {{ "tag": "gloss", "diffuse_color": [0, 0, 0], "specular_color": [0.5, 0.5, 0.5], "shininess": {} }}
            ],
            "lighting": {{
                "use_lighting": true,
                "directional": {{
                    "direction": [1, 0, 0],
                    "ambient": [0, 0, 0],
                    "diffuse": [0, 0, 0],
                    "specular": [1, 1, 1]
                }}
            }},
            "parts": [
                {{
                    "name": "block",
                    "primitive": "box",
                    "transform": {{ "scale": [4, 4, 4] }},
                    "material": "gloss",
                    "surface": {{ "kind": "color", "rgba": [1, 1, 1, 1] }}
                }}
            ]
        }}"#,
        shininess
    )
}

fn center_red(shininess: f32) -> u8 {
    let mut config = RenderConfig::default().with_size(64, 48);
    config.camera.eye = [0.0, 0.0, 10.0];
    let mut engine = pollster::block_on(RenderEngine::new_headless(&config)).unwrap();
    let manifest = SceneManifest::from_json_str(&side_lit_box(shininess)).unwrap();
    let mut scene = SceneManager::new(manifest, &config);

    scene.prepare_scene(&mut engine, Path::new("assets")).unwrap();
    engine.render(&mut scene).unwrap();
    engine.read_frame().unwrap().get_pixel(32, 24).0[0]
}

#[test]
fn test_zero_shininess_gives_flat_specular() {
    init_logger();
    // Grazing light: the reflection is perpendicular to the view ray
    assert!(center_red(1.0) < 16);
    assert!(center_red(0.0) > 128);
}
