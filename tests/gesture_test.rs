//! Tests for the geometric gesture classifier


use hand_interaction::{
    gesture::{GestureClassifier, GestureConfig, GestureKind},
    landmarks::{HandFrame, InvertMode},
};
use test_helpers::{fist, open_palm, pinch, thumbs_up, with_confidence};

#[test]
fn test_thumbs_up_all_fingers_curled() {
    let classifier = GestureClassifier::default();
    let verdict = classifier.thumbs_up(&thumbs_up(4));
    assert!(verdict.detected);
    assert!((verdict.confidence - 1.0).abs() < 1e-9);
}

#[test]
fn test_thumbs_up_exactly_at_threshold() {
    // 0.4 + 2 * 0.15
    let classifier = GestureClassifier::default();
    let verdict = classifier.thumbs_up(&thumbs_up(2));
    assert!((verdict.confidence - 0.7).abs() < 1e-9);
    assert!(verdict.detected);
}

#[test]
fn test_thumbs_up_below_threshold() {
    // thumb raised but only the index folded: 0.4 + 0.15
    let classifier = GestureClassifier::default();
    let verdict = classifier.thumbs_up(&thumbs_up(1));
    assert!((verdict.confidence - 0.55).abs() < 1e-9);
    assert!(!verdict.detected);

    // thumb raised, nothing folded
    let verdict = classifier.thumbs_up(&thumbs_up(0));
    assert!((verdict.confidence - 0.4).abs() < 1e-9);
    assert!(!verdict.detected);
}

#[test]
fn test_thumbs_up_three_fingers_curled() {
    let classifier = GestureClassifier::default();
    let verdict = classifier.thumbs_up(&thumbs_up(3));
    assert!((verdict.confidence - 0.85).abs() < 1e-9);
    assert!(verdict.detected);
}

#[test]
fn test_classify_every_hand() {
    let classifier = GestureClassifier::default();
    let frame = HandFrame::new(vec![open_palm(), thumbs_up(4)]);
    let reports = classifier.classify_hands(&frame);
    assert_eq!(reports.len(), 2);
    assert!(!reports[0].thumbs_up.detected);
    assert!(reports[1].thumbs_up.detected);
    assert!(classifier.classify_hands(&HandFrame::empty()).is_empty());
}

#[test]
fn test_fist_is_not_thumbs_up_or_open() {
    let classifier = GestureClassifier::default();
    let report = classifier.classify(&fist());
    assert!(!report.thumbs_up.detected);
    assert!(!report.open_hand.detected);
    assert!((report.thumbs_up.confidence - 0.6).abs() < 1e-9);
}

#[test]
fn test_open_palm() {
    let classifier = GestureClassifier::default();
    let report = classifier.classify(&open_palm());
    assert!(report.open_hand.detected);
    assert!(!report.pinch.detected);
    assert!(!report.thumbs_up.detected);
    assert!(report.present.detected);
    assert_eq!(report.dominant().kind, GestureKind::OpenHand);
}

#[test]
fn test_pinch_detection() {
    let classifier = GestureClassifier::default();
    let verdict = classifier.pinch(&pinch());
    assert!(verdict.detected);
    assert!(verdict.confidence > 0.5);
    assert!(!classifier.pinch(&open_palm()).detected);
}

#[test]
fn test_absent_frame() {
    let classifier = GestureClassifier::default();
    let report = classifier.classify_frame(&HandFrame::empty());
    assert!(!report.present.detected);
    assert!(!report.within_reach);
    assert_eq!(report.dominant().kind, GestureKind::None);
}

#[test]
fn test_low_confidence_hand_dropped() {
    let classifier = GestureClassifier::default();
    let frame = HandFrame::new(vec![with_confidence(&open_palm(), 0.5)]);
    let prepared = frame.prepared(0.7, 1, InvertMode::None);
    assert!(!classifier.classify_frame(&prepared).present.detected);
}

#[test]
fn test_mirror_keeps_gestures() {
    let classifier = GestureClassifier::default();
    let mirrored = open_palm().inverted(InvertMode::X);
    assert!(classifier.open_hand(&mirrored).detected);
    assert!(classifier.thumbs_up(&thumbs_up(4).inverted(InvertMode::X)).detected);
}

#[test]
fn test_hand_span_gate() {
    let classifier = GestureClassifier::new(GestureConfig {
        min_hand_span: 0.12,
        ..GestureConfig::default()
    });
    // wrist to middle base is 0.18 in the synthetic palm
    assert!(classifier.classify(&open_palm()).within_reach);

    let far = GestureClassifier::new(GestureConfig {
        min_hand_span: 0.3,
        ..GestureConfig::default()
    });
    assert!(!far.classify(&open_palm()).within_reach);
}
