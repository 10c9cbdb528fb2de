use std::time::Duration;

use framemark::{
    AnnotationStore, CaptureOpts, InMemoryStore, OverlayPipeline, OverlayState, OverlayStyle,
    Position, Scale, Shape, ShapeKind, StandardRenderer, StyleRegistry, ViewportBox,
    ViewportTracker, capture_and_submit,
    error::FramemarkResult,
    overlay::{OverlayObject, ShapeRenderer},
};
use kurbo::Rect;
use uuid::Uuid;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn drawn_rect(left: f64, top: f64) -> Shape {
    let mut s = Shape::new(ShapeKind::Rect);
    s.set_position(Position::new(left, top));
    s.set_scale(Scale::IDENTITY);
    s.width = Some(100.0);
    s.height = Some(100.0);
    s.stroke = Some("#2D9CDB".to_owned());
    s.stroke_width = Some(2.0);
    s
}

fn opts(project_id: Uuid) -> CaptureOpts {
    CaptureOpts {
        project_id,
        timestamp_ms: 12_500,
        comment: Some("logo drifts off the safe area".to_owned()),
    }
}

#[tokio::test]
async fn capture_store_and_redisplay_round_trip() {
    let store = InMemoryStore::new();
    let project = Uuid::new_v4();

    // Author draws on a 1920x1080 rendering of the video.
    let tracker = ViewportTracker::new();
    tracker.measure(
        Rect::new(0.0, 0.0, 1920.0, 1080.0),
        Rect::new(0.0, 0.0, 1920.0, 1080.0),
    );
    let record = capture_and_submit(
        &store,
        &[drawn_rect(960.0, 540.0)],
        tracker.current(),
        &opts(project),
    )
    .await
    .unwrap();

    let stored = &record.canvas_data.objects[0];
    assert!((stored.left.unwrap() - 640.0).abs() < 1e-9);
    assert!((stored.top.unwrap() - 360.0).abs() < 1e-9);
    assert!((stored.scale_x.unwrap() - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(stored.width, Some(100.0));
    assert_eq!(record.canvas_data.original_width, 1920.0);

    // A different reviewer loads it over a 640x360 rendering.
    let listed = store.list(project).await.unwrap();
    assert_eq!(listed.len(), 1);

    let styles = StyleRegistry::new();
    let pipeline = OverlayPipeline::new(StandardRenderer, &styles);
    assert!(styles.active());

    pipeline.select(Some(listed[0].clone()));
    pipeline.set_viewport(Some(ViewportBox::new(0.0, 0.0, 640.0, 360.0)));
    let OverlayState::Loaded(scene) = pipeline.rebuild().await.unwrap() else {
        panic!("expected a loaded overlay");
    };

    let shown = &scene.objects[0].shape;
    assert!((shown.left.unwrap() - 320.0).abs() < 1e-9);
    assert!((shown.top.unwrap() - 180.0).abs() < 1e-9);
    assert!((shown.scale_x.unwrap() - 1.0 / 3.0).abs() < 1e-9);

    // The overlay is display chrome, never an editing surface.
    assert!(!scene.pointer_events);
    assert!(!scene.objects[0].selectable);
    assert!(scene.info.is_some(), "comment gets an info affordance");

    drop(pipeline);
    assert!(!styles.active(), "chrome released with the last overlay");
}

#[tokio::test]
async fn redisplay_at_capture_size_reproduces_the_drawing() {
    let store = InMemoryStore::new();
    let project = Uuid::new_v4();
    let record = capture_and_submit(
        &store,
        &[drawn_rect(960.0, 540.0)],
        Some(ViewportBox::new(0.0, 0.0, 1280.0, 720.0)),
        &opts(project),
    )
    .await
    .unwrap();

    let styles = StyleRegistry::new();
    let pipeline = OverlayPipeline::new(StandardRenderer, &styles);
    pipeline.select(Some(record));
    pipeline.set_viewport(Some(ViewportBox::new(0.0, 0.0, 1280.0, 720.0)));
    let OverlayState::Loaded(scene) = pipeline.rebuild().await.unwrap() else {
        panic!("expected a loaded overlay");
    };
    let shown = &scene.objects[0].shape;
    assert!((shown.left.unwrap() - 960.0).abs() < 1e-9);
    assert!((shown.top.unwrap() - 540.0).abs() < 1e-9);
    assert!((shown.scale_x.unwrap() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn custom_style_is_forced_without_touching_the_record() {
    let store = InMemoryStore::new();
    let project = Uuid::new_v4();
    let record = capture_and_submit(
        &store,
        &[drawn_rect(100.0, 100.0)],
        Some(ViewportBox::new(0.0, 0.0, 1280.0, 720.0)),
        &opts(project),
    )
    .await
    .unwrap();
    let authored = record.canvas_data.objects[0].clone();

    let styles = StyleRegistry::new();
    let pipeline = OverlayPipeline::new(StandardRenderer, &styles).with_style(OverlayStyle {
        stroke: "#00FF88".to_owned(),
        stroke_width: 5.0,
        fill: "rgba(0, 255, 136, 0.15)".to_owned(),
        opacity: 1.0,
    });
    pipeline.select(Some(record.clone()));
    pipeline.set_viewport(Some(ViewportBox::new(0.0, 0.0, 1280.0, 720.0)));
    let OverlayState::Loaded(scene) = pipeline.rebuild().await.unwrap() else {
        panic!("expected a loaded overlay");
    };
    assert_eq!(scene.objects[0].stroke, "#00FF88");
    assert_eq!(scene.objects[0].stroke_width, 5.0);
    assert_eq!(record.canvas_data.objects[0], authored);
    assert_eq!(scene.objects[0].shape.stroke.as_deref(), Some("#2D9CDB"));
}

/// Renderer that takes a fixed time per shape, to let a newer rebuild
/// overtake an older one.
struct DelayRenderer {
    per_shape: Duration,
}

impl ShapeRenderer for DelayRenderer {
    async fn instantiate(&self, shape: &Shape) -> FramemarkResult<OverlayObject> {
        tokio::time::sleep(self.per_shape).await;
        StandardRenderer.instantiate(shape).await
    }
}

#[tokio::test]
async fn later_selection_wins_even_when_its_rebuild_finishes_first() {
    init_tracing();
    let store = InMemoryStore::new();
    let project = Uuid::new_v4();
    let viewport = ViewportBox::new(0.0, 0.0, 1280.0, 720.0);

    let slow_record = capture_and_submit(
        &store,
        &[
            drawn_rect(100.0, 100.0),
            drawn_rect(200.0, 200.0),
            drawn_rect(300.0, 300.0),
            drawn_rect(400.0, 400.0),
        ],
        Some(viewport),
        &opts(project),
    )
    .await
    .unwrap();
    let fast_record = capture_and_submit(
        &store,
        &[drawn_rect(500.0, 500.0)],
        Some(viewport),
        &opts(project),
    )
    .await
    .unwrap();

    let styles = StyleRegistry::new();
    let pipeline = OverlayPipeline::new(
        DelayRenderer {
            per_shape: Duration::from_millis(20),
        },
        &styles,
    );
    pipeline.select(Some(slow_record));
    pipeline.set_viewport(Some(viewport));

    // The user switches selection while the first rebuild is in flight. The
    // second rebuild finishes first; the first must be discarded when it
    // eventually completes.
    let (first, second) = tokio::join!(pipeline.rebuild(), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        pipeline.select(Some(fast_record));
        pipeline.rebuild().await
    });
    first.unwrap();
    second.unwrap();

    let OverlayState::Loaded(scene) = pipeline.state() else {
        panic!("expected a loaded overlay");
    };
    assert_eq!(scene.objects.len(), 1);
    assert!((scene.objects[0].shape.left.unwrap() - 500.0).abs() < 1e-9);
}

#[tokio::test]
async fn tracker_readiness_gates_the_overlay() {
    let store = InMemoryStore::new();
    let project = Uuid::new_v4();
    let record = capture_and_submit(
        &store,
        &[drawn_rect(640.0, 360.0)],
        Some(ViewportBox::new(0.0, 0.0, 1280.0, 720.0)),
        &opts(project),
    )
    .await
    .unwrap();

    let tracker = ViewportTracker::new();
    let mut watch = tracker.watch();
    let styles = StyleRegistry::new();
    let pipeline = OverlayPipeline::new(StandardRenderer, &styles);
    pipeline.select(Some(record));

    // First paint reports a zero-size box; the overlay must keep waiting.
    tracker.measure(Rect::new(0.0, 0.0, 0.0, 0.0), Rect::new(0.0, 0.0, 0.0, 0.0));
    pipeline.set_viewport(tracker.current());
    assert_eq!(pipeline.rebuild().await.unwrap(), OverlayState::Waiting);

    let (ready, ()) = tokio::join!(watch.ready(), async {
        tracker.measure(
            Rect::new(160.0, 90.0, 800.0, 450.0),
            Rect::new(160.0, 90.0, 800.0, 450.0),
        );
    });
    pipeline.set_viewport(ready);
    let OverlayState::Loaded(scene) = pipeline.rebuild().await.unwrap() else {
        panic!("expected a loaded overlay");
    };
    assert_eq!(scene.frame, ViewportBox::new(0.0, 0.0, 640.0, 360.0));
}
