mod common;

use common::*;
use reefmap::constants::{
    CLUSTER_LAYER_ID, GLOW_LOGGED_LAYER_ID, GLOW_SAVED_LAYER_ID, HEATMAP_LAYER_ID,
    SELECTION_LAYER_ID, SITES_SOURCE_ID,
};
use reefmap::core::camera::zoom_to_distance;
use reefmap::layers::composer::{GLOW_LAYERS, OVERLAY_LAYER_IDS};
use reefmap::prelude::*;
use serde_json::{json, Map, Value};

/// Host-facing behaviour of the map core: data sync, camera, viewport, taps
/// and marker animations
#[cfg(test)]
mod map_interaction_tests {
    use super::*;

    fn cluster_feature(count: u64) -> Feature {
        let mut properties = Map::new();
        properties.insert("cluster".into(), Value::Bool(true));
        properties.insert("point_count".into(), json!(count));
        Feature::point(LatLng::new(-8.5, 115.3), properties)
    }

    fn tap(h: &mut Harness) {
        h.core.dispatch(SurfaceEvent::Tapped {
            point: ScreenPoint::new(120.0, 240.0),
        });
    }

    #[test]
    fn test_rapid_updates_rebuild_once_with_last_list() {
        let mut h = ready_harness(sites(2));
        let before = h.core.rebuild_stats();

        h.core.set_annotations(sites(5));
        h.core.set_annotations(sites(7));
        h.core.set_annotations(sites(3));
        h.core.pump();

        let stats = h.core.rebuild_stats();
        assert_eq!(stats.executed, before.executed + 1);
        assert_eq!(stats.superseded, before.superseded + 2);
        assert_eq!(
            h.surface().source_feature_ids(SITES_SOURCE_ID),
            vec!["site-0", "site-1", "site-2"]
        );
    }

    #[test]
    fn test_feature_order_follows_host_list() {
        let mut list = sites(3);
        list.reverse();
        let h = ready_harness(list);
        assert_eq!(
            h.surface().source_feature_ids(SITES_SOURCE_ID),
            vec!["site-2", "site-1", "site-0"]
        );
    }

    #[test]
    fn test_empty_list_clears_overlays() {
        let mut h = ready_harness(sites(4));
        h.core.set_annotations(Vec::new());
        h.core.pump();

        assert_eq!(h.surface().source_feature_count(SITES_SOURCE_ID), Some(0));
        for id in OVERLAY_LAYER_IDS {
            assert!(!h.surface().layer_ids().contains(&id), "{} still present", id);
        }

        h.core.set_annotations(sites(1));
        h.core.pump();
        assert_eq!(h.surface().layer_ids().len(), OVERLAY_LAYER_IDS.len());
    }

    #[test]
    fn test_hiding_glows_only_touches_glow_layers() {
        let mut h = ready_harness(sites(4));
        h.core.set_layer_settings(LayerSettings {
            show_status_glows: false,
            ..LayerSettings::default()
        });

        for id in OVERLAY_LAYER_IDS {
            let is_glow = GLOW_LAYERS.iter().any(|(glow, _)| *glow == id);
            assert_eq!(h.surface().is_layer_visible(id), Some(!is_glow), "{}", id);
        }
        assert_eq!(h.surface().source_feature_count(SITES_SOURCE_ID), Some(4));
    }

    #[test]
    fn test_settings_survive_rebuild() {
        let mut h = ready_harness(sites(2));
        h.core.set_layer_settings(LayerSettings {
            show_clusters: false,
            ..LayerSettings::default()
        });
        h.core.set_annotations(sites(6));
        h.core.pump();

        assert_eq!(h.surface().is_layer_visible(CLUSTER_LAYER_ID), Some(false));
        assert_eq!(h.surface().is_layer_visible(GLOW_SAVED_LAYER_ID), Some(true));
    }

    #[test]
    fn test_camera_within_epsilon_is_not_reapplied() {
        let mut h = ready_harness(sites(1));
        let camera = Camera::new(LatLng::new(-8.34, 115.51), 9.0);

        h.core.set_camera(Some(camera), false);
        h.core.set_camera(
            Some(Camera::new(LatLng::new(-8.3405, 115.5104), 9.05)),
            true,
        );
        assert_eq!(h.surface().camera_calls(), 1);

        h.core.set_camera(Some(Camera::new(LatLng::new(-8.34, 115.51), 9.2)), true);
        assert_eq!(h.surface().camera_calls(), 2);

        h.core.set_camera(None, true);
        assert_eq!(h.surface().camera_calls(), 2);
    }

    #[test]
    fn test_camera_uses_native_distance() {
        let mut h = ready_harness(sites(1));
        h.core
            .set_camera(Some(Camera::new(LatLng::new(10.0, 20.0), 4.0).with_bearing(-90.0)), false);

        let native = h.surface().camera().unwrap();
        let base = CameraConfig::default().base_distance_m;
        assert!((native.distance - zoom_to_distance(4.0, base)).abs() < 1e-6);
        assert_eq!(native.heading, 270.0);
    }

    #[test]
    fn test_invalid_camera_is_ignored() {
        let mut h = ready_harness(sites(1));
        h.core
            .set_camera(Some(Camera::new(LatLng::new(f64::NAN, 20.0), 4.0)), false);
        assert_eq!(h.surface().camera_calls(), 0);
    }

    #[test]
    fn test_repeated_over_zoom_camera_applied_once() {
        let mut h = ready_harness(sites(1));
        let camera = Camera::new(LatLng::new(-8.34, 115.51), 23.0);
        for _ in 0..3 {
            h.core.set_camera(Some(camera), false);
        }
        assert_eq!(h.surface().camera_calls(), 1);

        let native = h.surface().camera().unwrap();
        let base = CameraConfig::default().base_distance_m;
        assert!((native.distance - zoom_to_distance(22.0, base)).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_pitch_or_bearing_is_ignored() {
        let mut h = ready_harness(sites(1));
        let center = LatLng::new(-8.34, 115.51);
        for _ in 0..2 {
            h.core
                .set_camera(Some(Camera::new(center, 9.0).with_pitch(f64::NAN)), false);
            h.core
                .set_camera(Some(Camera::new(center, 9.0).with_bearing(f64::NAN)), false);
            h.core
                .set_camera(Some(Camera::new(center, 9.0).with_pitch(120.0)), false);
        }
        assert_eq!(h.surface().camera_calls(), 0);

        h.core.set_camera(Some(Camera::new(center, 9.0).with_pitch(45.0)), false);
        assert_eq!(h.surface().camera_calls(), 1);
    }

    #[test]
    fn test_viewport_threshold() {
        let mut h = ready_harness(sites(1));
        h.events();

        // small drift: below both thresholds
        h.core
            .surface_mut()
            .set_visible_region(LatLngBounds::from_coords(-9.95, 110.02, 0.03, 125.04), 5.01);
        h.core.dispatch(SurfaceEvent::RegionChanged);
        assert!(h.notifications().is_empty());

        // one edge moved by half a degree
        let moved = LatLngBounds::from_coords(-9.5, 110.0, 0.0, 125.0);
        h.core.surface_mut().set_visible_region(moved, 5.0);
        h.core.dispatch(SurfaceEvent::RegionChanged);
        let events = h.notifications();
        assert_eq!(events, vec![MapEvent::RegionChange(Viewport::new(moved, 5.0))]);

        // zoom only
        h.core.surface_mut().set_visible_region(moved, 5.2);
        h.core.dispatch(SurfaceEvent::RegionChanged);
        assert_eq!(h.notifications().len(), 1);
        assert_eq!(h.core.last_viewport().map(|v| v.zoom), Some(5.2));
    }

    #[test]
    fn test_cluster_tap_zooms_in() {
        let mut h = ready_harness(sites(20));
        h.core
            .surface_mut()
            .set_visible_region(LatLngBounds::from_coords(-20.0, 100.0, 10.0, 140.0), 3.0);
        h.core.surface_mut().set_rendered_features(vec![cluster_feature(12)]);
        h.events();

        tap(&mut h);

        let events = h.notifications();
        assert_eq!(
            events[0],
            MapEvent::ClusterTap {
                coordinate: LatLng::new(-8.5, 115.3),
                count: 12,
            }
        );
        let native = h.surface().camera().unwrap();
        let base = CameraConfig::default().base_distance_m;
        assert!((native.distance - zoom_to_distance(6.0, base)).abs() < 1e-6);
        assert_eq!(native.center, LatLng::new(-8.5, 115.3));
    }

    #[test]
    fn test_cluster_tap_at_max_zoom_does_not_move() {
        let mut h = ready_harness(sites(20));
        h.core
            .surface_mut()
            .set_visible_region(LatLngBounds::from_coords(-8.6, 115.2, -8.4, 115.4), 15.0);
        h.core.surface_mut().set_rendered_features(vec![cluster_feature(3)]);

        tap(&mut h);
        assert_eq!(h.surface().camera_calls(), 0);
        assert!(h
            .notifications()
            .iter()
            .any(|e| matches!(e, MapEvent::ClusterTap { count: 3, .. })));
    }

    #[test]
    fn test_site_tap_selects_and_pulses() {
        let list = vec![Annotation::site("blue-corner", LatLng::new(7.13, 134.22))
            .with_status(SiteStatus::Logged)
            .with_difficulty(Difficulty::Advanced)];
        let mut h = ready_harness(list.clone());
        let feature = Feature::from_annotation(&list[0], 0);
        h.core.surface_mut().set_rendered_features(vec![feature]);
        h.events();

        let tapped_at = Instant::now();
        tap(&mut h);

        assert_eq!(
            h.notifications(),
            vec![
                MapEvent::Select {
                    id: "blue-corner".to_string()
                },
                MapEvent::Haptic
            ]
        );
        assert_eq!(h.scheduler.active_tickers(), 1);
        assert_eq!(h.core.animations().selection_target(), Some("blue-corner"));

        h.core.tick_animations_at(tapped_at + Duration::from_secs(2));
        let frames: Vec<MapEvent> = h.events();
        assert_eq!(
            frames.last(),
            Some(&MapEvent::MarkerFrame(MarkerFrame {
                site_id: "blue-corner".to_string(),
                scale: 1.2,
                offset: 0.0,
            }))
        );
        assert!(!h.core.animations().is_active());
        assert_eq!(h.scheduler.active_tickers(), 0);
    }

    #[test]
    fn test_tap_on_empty_map_emits_nothing() {
        let mut h = ready_harness(sites(3));
        h.events();
        tap(&mut h);
        assert!(h.notifications().is_empty());
        assert_eq!(h.scheduler.active_tickers(), 0);
    }

    #[test]
    fn test_tap_before_style_ready_is_ignored() {
        let mut h = harness();
        h.core.start();
        h.core.surface_mut().set_rendered_features(vec![cluster_feature(4)]);
        tap(&mut h);
        assert!(h.notifications().is_empty());
    }

    #[test]
    fn test_frames_arrive_through_the_ticker() {
        let mut h = ready_harness(sites(3));
        h.events();
        h.core
            .bounce_markers(vec!["site-0".to_string(), "site-1".to_string()]);
        assert_eq!(h.notifications(), vec![MapEvent::Haptic]);

        h.scheduler.advance(Duration::from_millis(50));
        assert!(h.core.pump() >= 1);
        assert!(h.events().iter().all(MapEvent::is_frame));

        h.core.cancel_animations();
        assert_eq!(h.scheduler.active_tickers(), 0);
        assert!(!h.core.animations().is_active());
    }

    #[test]
    fn test_bounce_completes_every_marker() {
        let mut h = ready_harness(sites(3));
        let started = Instant::now();
        h.core.bounce_markers(vec![
            "site-0".to_string(),
            "site-1".to_string(),
            "site-2".to_string(),
        ]);

        h.core.tick_animations_at(started + Duration::from_secs(5));
        assert_eq!(h.core.animations().bounce_completed(), 3);
        assert!(!h.core.animations().is_active());
    }

    #[test]
    fn test_heatmap_hides_marker_overlays() {
        let mut h = ready_harness(sites(4));
        let points = vec![
            HeatmapPoint::new(LatLng::new(-8.1, 115.0), 12),
            HeatmapPoint::new(LatLng::new(-8.2, 115.1), 3),
        ];

        h.core.set_heatmap(points.clone(), true);
        assert_eq!(h.surface().layer_ids().last(), Some(&HEATMAP_LAYER_ID));
        for id in OVERLAY_LAYER_IDS {
            assert_eq!(h.surface().is_layer_visible(id), Some(false), "{}", id);
        }

        h.core.set_heatmap(points, false);
        assert!(!h.surface().layer_ids().contains(&HEATMAP_LAYER_ID));
        assert_eq!(h.surface().is_layer_visible(GLOW_LOGGED_LAYER_ID), Some(true));
        assert_eq!(h.surface().is_layer_visible(SELECTION_LAYER_ID), Some(true));
    }

    #[test]
    fn test_handle_posts_from_another_thread() {
        let mut h = ready_harness(sites(1));
        let handle = h.core.handle();

        std::thread::spawn(move || {
            handle.set_annotations(sites(9));
            handle.set_layer_settings(LayerSettings {
                color_by_difficulty: false,
                ..LayerSettings::default()
            });
        })
        .join()
        .unwrap();

        assert!(h.core.pump() >= 2);
        assert_eq!(h.surface().source_feature_count(SITES_SOURCE_ID), Some(9));
        assert!(!h.core.layer_settings().color_by_difficulty);
    }
}
