//! Slot demo
//!
//! Drives the engine without a window: loading screen, reel scene with
//! randomised stops, a portrait resize and an editor snapshot dump.

mod scenes;

use scenes::{LoadingScene, ReelScene, SYMBOLS};
use slot_engine::foundation::logging;
use slot_engine::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const FRAME_MS: f32 = 1000.0 / 60.0;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    log::info!("Starting slot demo");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            EngineConfig::load_from_file(&path)?
        }
        None => EngineConfig::default(),
    };

    let loader = Arc::new(MemoryAssetLoader::new().with_latency(Duration::from_millis(20)));
    for symbol in SYMBOLS {
        loader.insert_texture(format!("symbols/{symbol}.png"), 128, 128);
    }
    loader.insert_texture("ui/logo.png", 512, 128);

    let surface = HeadlessSurface::new(1920.0, 1080.0);
    let mut engine = Engine::new(config, surface, loader)?;
    engine.init(&MountPoint::new("slot-demo")).await?;

    if let Some(viewport) = engine.viewport_mut() {
        viewport.on_orientation_change(|o| log::info!("Orientation is now {:?}", o));
        viewport.on_device_type_change(|d| log::info!("Device type is now {:?}", d));
    }

    let symbols = SYMBOLS.iter().fold(AssetBundle::new("symbols"), |bundle, symbol| {
        bundle.with_entry(AssetEntry::new(*symbol, format!("symbols/{symbol}.png")).with_kind("texture"))
    });
    engine.assets().register_bundle(symbols);
    engine
        .assets()
        .register_bundle(AssetBundle::new("ui").with_asset("logo", "ui/logo.png"));

    let display = engine.display().clone();
    engine.add_scene(LoadingScene::new(&display))?;
    engine.switch_scene(LoadingScene::NAME);

    let mut reported = Vec::new();
    {
        let mut on_progress = |p: f32| reported.push(p);
        engine
            .assets()
            .load_bundles(&["ui", "symbols"], Some(&mut on_progress))
            .await?;
    }
    for progress in reported {
        if let Some(loading) = engine.scenes_mut().get_scene_as_mut::<LoadingScene>(LoadingScene::NAME) {
            loading.set_progress(progress);
        }
        engine.surface_mut().push_frame(FRAME_MS);
        engine.pump()?;
    }

    engine.add_scene(ReelScene::new(&display, 0.5))?;
    engine.switch_scene(ReelScene::NAME);

    for frame in 0..240 {
        if frame == 120 {
            log::info!("Rotating the device");
            engine.surface_mut().set_window_size(390.0, 844.0);
        }
        engine.surface_mut().push_frame(FRAME_MS);
        engine.pump()?;
    }

    if let Some(reels) = engine.scenes().get_scene_as::<ReelScene>(ReelScene::NAME) {
        log::info!("{} spins, {} wins", reels.spins(), reels.wins());
    }
    if let Some(logo) = engine.entities().find_by_name("logo") {
        log::info!("Logo rotated to {:.2} rad", logo.rotation());
    }
    log::info!(
        "{} frames at {:.1} fps, {} entities, {} nodes drawn",
        engine.clock().frame_count(),
        engine.clock().fps(),
        engine.entities().entity_count(),
        engine.surface().last_visible_nodes()
    );

    println!("{}", engine.snapshot().to_ron()?);

    engine.destroy();
    Ok(())
}
