use anyhow::Context;
use reefmap::constants::SITES_SOURCE_ID;
use reefmap::prelude::*;
use serde_json::{json, Map};
use std::path::Path;

/// Headless map driver.
///
/// Usage: `reefmap-app [annotations.json] [config.json]`
///
/// Loads dive sites (or synthesises a demo set), runs the core against an
/// in-memory surface and replays a scripted session: primary style failure,
/// offline fallback, a cluster tap, a site tap, a bounce, heatmap and
/// terrain toggles and a theme switch. Every host notification is logged.
/// Runs until the script is done or Ctrl-C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    reefmap::init_logging();

    let mut args = std::env::args().skip(1);
    let annotations = match args.next() {
        Some(path) => load_annotations(Path::new(&path))?,
        None => demo_sites(),
    };
    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            MapConfig::from_json(&text).with_context(|| format!("parsing config {}", path))?
        }
        None => MapConfig::default(),
    };

    let resolver = StaticResolver::new()
        .with(config.style.vector_style.clone(), "https://styles.reefmap.dev/underwater.json")
        .with(config.style.offline_style.clone(), "file:///bundle/underwater-offline.json")
        .with(config.style.daylight_style.clone(), "https://styles.reefmap.dev/daylight.json");

    let (mut core, events) = MapCoreBuilder::new()
        .with_config(config)
        .with_resolver(resolver)
        .build(MemorySurface::new())?;

    log::info!("driving {} annotations", annotations.len());
    let first_ids: Vec<String> = annotations.iter().take(3).map(|a| a.id.clone()).collect();
    let first_site = annotations.first().cloned();
    let heatmap: Vec<HeatmapPoint> = annotations
        .iter()
        .enumerate()
        .map(|(i, a)| HeatmapPoint::new(a.coordinate, (i % 40) as u32 + 1))
        .collect();

    let bounds = LatLngBounds::from_coords(-11.0, 112.0, -5.0, 120.0);
    core.surface_mut().set_visible_region(bounds, 5.0);

    core.start();
    core.set_annotations(annotations);
    core.pump();

    // The demo URLs do not exist, so play the surface's part.
    core.dispatch(SurfaceEvent::StyleLoadFailed {
        reason: "primary style unreachable".to_string(),
    });
    core.dispatch(SurfaceEvent::StyleLoaded);
    core.pump();
    log::info!(
        "style state {:?}, {} features on the map",
        core.style_state(),
        core.surface()
            .source_feature_count(SITES_SOURCE_ID)
            .unwrap_or(0)
    );

    core.surface_mut()
        .set_rendered_features(vec![cluster_at(LatLng::new(-8.4, 115.2), 17)]);
    core.dispatch(SurfaceEvent::Tapped {
        point: ScreenPoint::new(200.0, 320.0),
    });
    core.dispatch(SurfaceEvent::RegionChanged);

    if let Some(site) = first_site {
        core.surface_mut()
            .set_rendered_features(vec![Feature::from_annotation(&site, 0)]);
        core.dispatch(SurfaceEvent::Tapped {
            point: ScreenPoint::new(180.0, 300.0),
        });
    }
    core.bounce_markers(first_ids);

    let handle = core.handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(800)).await;
        handle.set_heatmap(heatmap, true);
        handle.set_terrain(true, 0.6);
        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.set_style_mode(StyleMode::Daylight);
        handle.set_layer_settings(LayerSettings {
            color_by_difficulty: false,
            ..LayerSettings::default()
        });
    });

    let deadline = tokio::time::sleep(Duration::from_secs(3));
    tokio::pin!(deadline);
    let mut frames = 0usize;
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted");
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(16)) => {
                core.pump();
                for event in events.try_iter() {
                    match event {
                        MapEvent::MarkerFrame(_) => frames += 1,
                        other => log::info!("event: {:?}", other),
                    }
                }
            }
        }
    }

    let stats = core.rebuild_stats();
    log::info!(
        "done: {} marker frames, {} rebuilds ({} superseded), style {:?}",
        frames,
        stats.executed,
        stats.superseded,
        core.style_state()
    );
    Ok(())
}

fn load_annotations(path: &Path) -> anyhow::Result<Vec<Annotation>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading annotations {}", path.display()))?;
    let annotations: Vec<Annotation> = serde_json::from_str(&text)
        .with_context(|| format!("parsing annotations {}", path.display()))?;
    Ok(annotations)
}

/// A grid of sites around Bali cycling through every status and difficulty
fn demo_sites() -> Vec<Annotation> {
    let statuses = SiteStatus::ALL;
    let difficulties = Difficulty::ALL;
    (0..60)
        .map(|i| {
            let lat = -8.0 - (i / 10) as f64 * 0.15;
            let lng = 114.5 + (i % 10) as f64 * 0.12;
            Annotation::site(format!("demo-{:02}", i), LatLng::new(lat, lng))
                .with_status(statuses[i % statuses.len()])
                .with_difficulty(difficulties[i % difficulties.len()])
        })
        .collect()
}

fn cluster_at(coordinate: LatLng, count: u64) -> Feature {
    let mut properties = Map::new();
    properties.insert("cluster".into(), json!(true));
    properties.insert("point_count".into(), json!(count));
    Feature::point(coordinate, properties)
}
