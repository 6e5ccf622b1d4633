//! End-to-end tests driving the full pipeline with synthetic hand frames


use hand_interaction::{
    emitter::{CollectingSink, OutboundEvent},
    gesture::GestureKind,
    interaction::TriggerStrategy,
    landmarks::{HandFrame, InvertMode},
    mapper::{InteractionPoint, PixelPoint},
    pipeline::{ControlCommand, InteractionPipeline},
    source::{FrameSequence, HandPoseSource, ReplaySource, TimedFrame},
    Error, Result,
};
use std::io::Cursor;
use tempfile::tempdir;
use test_helpers::{
    empty_frame, fist, frame_with, ms, open_palm, pinch, test_config, thumbs_up, with_confidence,
    with_index_tip_at,
};

fn run(pipeline: &mut InteractionPipeline, frames: Vec<TimedFrame>) -> CollectingSink {
    let mut source = FrameSequence::new(frames);
    let mut sink = CollectingSink::new();
    pipeline.run(&mut source, &mut sink).unwrap();
    sink
}

#[test]
fn test_scenario_a_calibration_maps_center() {
    let mut config = test_config();
    config.calibration.frame_width = 600.0;
    config.calibration.frame_height = 500.0;
    config.mapping.filter = "none".to_string();
    config.interaction.emit_touch = true;
    let mut pipeline = InteractionPipeline::new(config).unwrap();

    let corners = [(100.0, 100.0), (500.0, 100.0), (500.0, 400.0), (100.0, 400.0)];
    let mut first = empty_frame(0);
    for (x, y) in corners {
        first = first.with_command(ControlCommand::CalibrationPoint(PixelPoint::new(x, y)));
    }
    // index tip at camera pixel (300, 250)
    let pose = with_index_tip_at(&open_palm(), 0.5, 0.5);
    let sink = run(&mut pipeline, vec![first, frame_with(pose, 33)]);

    assert!(pipeline.calibration().is_calibrated());
    assert!(sink.events.contains(&OutboundEvent::CalibrationEnd));

    let touch = sink
        .events
        .iter()
        .find_map(|e| match e {
            OutboundEvent::Touch { x, y, .. } => Some((*x, *y)),
            _ => None,
        })
        .unwrap();
    assert!((touch.0 - 0.5).abs() < 1e-6);
    assert!((touch.1 - 0.5).abs() < 1e-6);
}

#[test]
fn test_scenario_b_dwell_emits_one_click() {
    let mut pipeline = InteractionPipeline::new(test_config()).unwrap();
    let pose = with_index_tip_at(&open_palm(), 0.5, 0.5);
    let frames = (0..=400).step_by(50).map(|t| frame_with(pose.clone(), t)).collect();

    let clicks = run(&mut pipeline, frames).clicks();
    assert_eq!(clicks.len(), 1);
    assert!((clicks[0].x - 0.5).abs() < 1e-9);
    assert!((clicks[0].y - 0.5).abs() < 1e-9);
    assert!((clicks[0].timestamp - 0.4).abs() < 1e-9);
    assert_eq!(clicks[0].trigger, TriggerStrategy::Dwell);
}

#[test]
fn test_scenario_b_with_jitter_inside_radius() {
    let mut pipeline = InteractionPipeline::new(test_config()).unwrap();
    let frames = (0..=500u64)
        .step_by(50)
        .map(|t| {
            let jitter = if (t / 50) % 2 == 0 { 0.004 } else { -0.004 };
            frame_with(with_index_tip_at(&open_palm(), 0.5 + jitter, 0.5), t)
        })
        .collect();
    assert_eq!(run(&mut pipeline, frames).clicks().len(), 1);
}

#[test]
fn test_fist_never_dwells() {
    let mut pipeline = InteractionPipeline::new(test_config()).unwrap();
    let pose = with_index_tip_at(&fist(), 0.5, 0.5);
    let frames = (0..=2000).step_by(100).map(|t| frame_with(pose.clone(), t)).collect();
    assert!(run(&mut pipeline, frames).clicks().is_empty());
}

fn tap_frames(second_tap_ms: u64) -> Vec<TimedFrame> {
    let pose = with_index_tip_at(&open_palm(), 0.4, 0.6);
    let mut frames = vec![frame_with(pose.clone(), 0), empty_frame(100)];
    let mut t = 200;
    while t < second_tap_ms {
        frames.push(empty_frame(t));
        t += 100;
    }
    frames.push(frame_with(pose, second_tap_ms));
    frames
}

#[test]
fn test_scenario_c_double_tap() {
    let mut config = test_config();
    config.interaction.strategy = TriggerStrategy::DoubleTap;

    let mut pipeline = InteractionPipeline::new(config.clone()).unwrap();
    let clicks = run(&mut pipeline, tap_frames(200)).clicks();
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].trigger, TriggerStrategy::DoubleTap);
    assert!((clicks[0].x - 0.4).abs() < 1e-9);

    let mut pipeline = InteractionPipeline::new(config).unwrap();
    assert!(run(&mut pipeline, tap_frames(800)).clicks().is_empty());
}

#[test]
fn test_pinch_strategy() {
    let mut config = test_config();
    config.interaction.strategy = TriggerStrategy::Pinch;
    let mut pipeline = InteractionPipeline::new(config).unwrap();

    let closed = pinch();
    let open = open_palm();
    let frames = vec![
        frame_with(closed.clone(), 0),
        frame_with(closed.clone(), 100),
        frame_with(open, 200),
        frame_with(closed.clone(), 300),
        frame_with(closed, 700),
    ];
    let clicks = run(&mut pipeline, frames).clicks();
    let times: Vec<f64> = clicks.iter().map(|c| c.timestamp).collect();
    assert_eq!(times.len(), 2);
    assert!((times[0] - 0.0).abs() < 1e-9);
    assert!((times[1] - 0.7).abs() < 1e-9);
}

#[test]
fn test_proximity_with_manual_lock() {
    let mut config = test_config();
    config.interaction.strategy = TriggerStrategy::Proximity;
    config.interaction.qualifying_gesture = GestureKind::Present;
    let mut pipeline = InteractionPipeline::new(config).unwrap();

    let pose = with_index_tip_at(&fist(), 0.5, 0.5);
    let frames = vec![
        frame_with(pose.clone(), 0),
        frame_with(pose.clone(), 100)
            .with_command(ControlCommand::LockTarget(PixelPoint::new(330.0, 250.0))),
        frame_with(pose, 200),
    ];
    let clicks = run(&mut pipeline, frames).clicks();
    assert_eq!(clicks.len(), 1);
    assert!((clicks[0].timestamp - 0.1).abs() < 1e-9);
    assert!(pipeline.locator().is_locked());
}

#[test]
fn test_mirror_flips_position() {
    let mut config = test_config();
    config.hands.invert = InvertMode::X;
    config.mapping.filter = "none".to_string();
    let mut pipeline = InteractionPipeline::new(config).unwrap();

    let pose = with_index_tip_at(&open_palm(), 0.25, 0.5);
    let outcome = pipeline.process_frame(&HandFrame::new(vec![pose]), None, ms(0));
    let position = outcome.position.unwrap();
    assert!((position.x - 0.75).abs() < 1e-9);
}

#[test]
fn test_interaction_point_choice() {
    let mut config = test_config();
    config.mapping.filter = "none".to_string();
    config.mapping.interaction_point = InteractionPoint::Wrist;
    let mut pipeline = InteractionPipeline::new(config).unwrap();

    // open palm wrist sits 0.35 below the index tip
    let pose = with_index_tip_at(&open_palm(), 0.5, 0.4);
    let outcome = pipeline.process_frame(&HandFrame::new(vec![pose]), None, ms(0));
    assert!((outcome.position.unwrap().y - 0.75).abs() < 1e-9);
}

#[test]
fn test_no_clicks_while_calibrating() {
    let mut pipeline = InteractionPipeline::new(test_config()).unwrap();
    let pose = with_index_tip_at(&open_palm(), 0.5, 0.5);
    let mut frames: Vec<TimedFrame> = (0..=600)
        .step_by(50)
        .map(|t| frame_with(pose.clone(), t))
        .collect();
    frames[0] = frames[0].clone().with_command(ControlCommand::StartCalibration);

    let sink = run(&mut pipeline, frames);
    assert!(sink.clicks().is_empty());
    assert_eq!(sink.events, vec![OutboundEvent::CalibrationStart]);
}

#[test]
fn test_reset_calibration_falls_back_to_camera() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("calibration.json");
    let mut config = test_config();
    config.calibration.artifact_path = Some(path.clone());

    let mut pipeline = InteractionPipeline::new(config.clone()).unwrap();
    for (x, y) in [(100.0, 80.0), (540.0, 90.0), (560.0, 400.0), (90.0, 410.0)] {
        pipeline.submit(ControlCommand::CalibrationPoint(PixelPoint::new(x, y)));
    }
    pipeline.process_frame(&HandFrame::empty(), None, ms(0));
    assert!(path.exists());

    let mut reloaded = InteractionPipeline::new(config).unwrap();
    assert!(reloaded.calibration().is_calibrated());
    reloaded.submit(ControlCommand::ResetCalibration);
    let outcome = reloaded.process_frame(&HandFrame::empty(), None, ms(0));
    assert_eq!(outcome.events, vec![OutboundEvent::CalibrationStart]);
    assert!(!reloaded.calibration().is_calibrated());
    assert!(!path.exists());
}

#[test]
fn test_reset_calibration_restarts_collection() {
    let mut pipeline = InteractionPipeline::new(test_config()).unwrap();
    let mut first = empty_frame(0);
    for (x, y) in [(100.0, 80.0), (540.0, 90.0), (560.0, 400.0), (90.0, 410.0)] {
        first = first.with_command(ControlCommand::CalibrationPoint(PixelPoint::new(x, y)));
    }
    let frames = vec![
        first,
        empty_frame(33).with_command(ControlCommand::ResetCalibration),
    ];
    let sink = run(&mut pipeline, frames);

    assert_eq!(sink.events.last(), Some(&OutboundEvent::CalibrationStart));
    assert!(pipeline.is_calibrating());
    assert!(!pipeline.calibration().is_calibrated());
}

#[test]
fn test_second_hand_can_qualify() {
    let mut config = test_config();
    config.hands.max_hands = 2;
    config.interaction.qualifying_gesture = GestureKind::ThumbsUp;

    // the open palm is more confident, so it is listed first
    let palm = with_index_tip_at(&open_palm(), 0.3, 0.3);
    let thumb = with_confidence(&with_index_tip_at(&thumbs_up(4), 0.6, 0.6), 0.9);
    let clicks_for = |config| {
        let mut pipeline = InteractionPipeline::new(config).unwrap();
        let frames = (0..=400)
            .step_by(50)
            .map(|t| TimedFrame::new(ms(t), HandFrame::new(vec![palm.clone(), thumb.clone()])))
            .collect();
        run(&mut pipeline, frames).clicks()
    };

    let clicks = clicks_for(config.clone());
    assert_eq!(clicks.len(), 1);
    assert!((clicks[0].x - 0.6).abs() < 1e-9);
    assert!((clicks[0].y - 0.6).abs() < 1e-9);

    // capped at one hand only the palm is seen
    config.hands.max_hands = 1;
    assert!(clicks_for(config).is_empty());
}

#[test]
fn test_quit_stops_run() {
    let mut pipeline = InteractionPipeline::new(test_config()).unwrap();
    let frames = vec![
        empty_frame(0),
        empty_frame(33).with_command(ControlCommand::Quit),
        empty_frame(66),
    ];
    let mut source = FrameSequence::new(frames);
    let summary = pipeline.run(&mut source, &mut CollectingSink::new()).unwrap();
    assert_eq!(summary.frames, 2);
    assert_eq!(source.len(), 1);
}

struct FailingSource;

impl HandPoseSource for FailingSource {
    fn next_frame(&mut self) -> Result<Option<TimedFrame>> {
        Err(Error::FrameAcquisition("camera unplugged".to_string()))
    }
}

#[test]
fn test_source_failure_terminates_run() {
    let mut pipeline = InteractionPipeline::new(test_config()).unwrap();
    let result = pipeline.run(&mut FailingSource, &mut CollectingSink::new());
    assert!(matches!(result, Err(Error::FrameAcquisition(_))));
}

#[test]
fn test_replay_drives_pipeline() {
    let pose = with_index_tip_at(&open_palm(), 0.5, 0.5);
    let hand = serde_json::to_string(&pose).unwrap();
    let text: String = (0..=8)
        .map(|i| format!("{{\"t\": {}, \"hands\": [{hand}]}}\n", f64::from(i) * 0.05))
        .collect();

    let mut pipeline = InteractionPipeline::new(test_config()).unwrap();
    let mut source = ReplaySource::new(Cursor::new(text));
    let mut sink = CollectingSink::new();
    let summary = pipeline.run(&mut source, &mut sink).unwrap();
    assert_eq!(summary.frames, 9);
    assert_eq!(summary.clicks, 1);
}
