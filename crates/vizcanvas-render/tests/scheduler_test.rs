use serde_json::json;
use vizcanvas_core::{Timestamp, VizConfig, VizResult};
use vizcanvas_render::{DrawOp, FrameHost, FrameScheduler, Painted, PlaybackState, RecordingSurface};

/// Host that never fires on its own; the test calls `on_frame` directly.
#[derive(Default)]
struct ManualHost {
    next: i32,
    live: Option<i32>,
    cancelled: usize,
}

impl FrameHost for ManualHost {
    fn request_frame(&mut self) -> VizResult<i32> {
        assert!(self.live.is_none(), "at most one refresh may be pending");
        self.next += 1;
        self.live = Some(self.next);
        Ok(self.next)
    }

    fn cancel_frame(&mut self, handle: i32) {
        assert_eq!(self.live, Some(handle));
        self.live = None;
        self.cancelled += 1;
    }
}

impl ManualHost {
    fn fire(&mut self) {
        self.live = None;
    }
}

fn run(scheduler: &mut FrameScheduler, host: &mut ManualHost, surface: &mut RecordingSurface, times: &[f64]) {
    for t in times {
        host.fire();
        surface.take_ops();
        scheduler
            .on_frame(surface, host, Timestamp::from_millis(*t))
            .expect("frame should schedule");
    }
}

fn translated_x(ops: &[DrawOp]) -> Option<f64> {
    ops.iter().find_map(|op| match op {
        DrawOp::Translate { dx, .. } => Some(*dx),
        _ => None,
    })
}

#[test]
fn test_animation_progresses_over_frames() {
    let mut scheduler = FrameScheduler::new(&VizConfig::default());
    let mut host = ManualHost::default();
    let mut surface = RecordingSurface::new(400.0, 300.0);
    scheduler.attach(&mut host).unwrap();
    scheduler.load_payload(&json!({
        "duration": 4000,
        "layers": [{"type": "rect", "props": {"x": 0, "y": 10},
                    "animations": [{"property": "x", "start": 0, "end": 1000, "from": 0, "to": 100}]}]
    }));

    // 100 ms steps, so the clamp never kicks in.
    let times: Vec<f64> = (0..=5).map(|i| i as f64 * 100.0).collect();
    run(&mut scheduler, &mut host, &mut surface, &times);
    assert_eq!(scheduler.elapsed().as_millis(), 500.0);
    assert_eq!(translated_x(surface.ops()), Some(50.0));
}

#[test]
fn test_pause_freezes_the_picture() {
    let mut scheduler = FrameScheduler::new(&VizConfig::default());
    let mut host = ManualHost::default();
    let mut surface = RecordingSurface::new(400.0, 300.0);
    scheduler.attach(&mut host).unwrap();
    scheduler.load_scene(Some(vizcanvas_ir::sample_scene()));
    run(&mut scheduler, &mut host, &mut surface, &[0.0, 50.0, 100.0]);
    scheduler.toggle_play();
    run(&mut scheduler, &mut host, &mut surface, &[150.0]);
    let before = surface.ops().to_vec();
    run(&mut scheduler, &mut host, &mut surface, &[200.0, 250.0]);
    assert_eq!(surface.ops(), before.as_slice());
    assert_eq!(scheduler.status_line(), "Status: Visualization | Playing: No");
}

#[test]
fn test_payload_replacement_sequence() {
    let mut scheduler = FrameScheduler::new(&VizConfig::default());
    let mut host = ManualHost::default();
    let mut surface = RecordingSurface::new(400.0, 300.0);
    scheduler.attach(&mut host).unwrap();

    let payloads = [
        (json!(null), true),
        (json!([{"type": "circle", "r": 5}]), false),
        (json!(42), true),
        (json!("```json\n{\"duration\":1,\"layers\":[]}\n```"), false),
        (json!({}), true),
    ];
    let mut t = 0.0;
    for (payload, expect_demo) in payloads {
        scheduler.load_payload(&payload);
        run(&mut scheduler, &mut host, &mut surface, &[t]);
        assert_eq!(scheduler.using_demo(), expect_demo, "payload {payload}");
        t += 16.0;
    }
}

#[test]
fn test_detach_then_frames_are_inert() {
    let mut scheduler = FrameScheduler::new(&VizConfig::default());
    let mut host = ManualHost::default();
    let mut surface = RecordingSurface::new(400.0, 300.0);
    scheduler.attach(&mut host).unwrap();
    run(&mut scheduler, &mut host, &mut surface, &[0.0]);
    scheduler.detach(&mut host);
    assert_eq!(host.cancelled, 1);
    assert_eq!(scheduler.state(), PlaybackState::Idle);

    surface.take_ops();
    let stats = scheduler
        .on_frame(&mut surface, &mut host, Timestamp::from_millis(16.0))
        .unwrap();
    assert_eq!(stats.painted, None);
    assert!(host.live.is_none(), "no refresh requested after detach");
    assert!(surface.ops().is_empty());
}

#[test]
fn test_demo_painted_until_payload_arrives() {
    let mut scheduler = FrameScheduler::new(&VizConfig::default());
    let mut host = ManualHost::default();
    let mut surface = RecordingSurface::new(400.0, 300.0);
    scheduler.attach(&mut host).unwrap();
    host.fire();
    let stats = scheduler
        .on_frame(&mut surface, &mut host, Timestamp::from_millis(0.0))
        .unwrap();
    assert_eq!(stats.painted, Some(Painted::Demo));
    assert!(surface
        .ops()
        .contains(&DrawOp::FillText { text: "Demo Animation".into(), x: 200.0, y: 240.0 }));
}
