use super::*;
use crate::encode::Container;

#[test]
fn happy_path_transitions_are_legal() {
    let mut run = ExportRun::new(RunId(1), &ProjectConfig::default()).unwrap();
    run.transition(ExportState::Decoding).unwrap();
    run.transition(ExportState::Rendering { frame: 0, total: 3 }).unwrap();
    run.transition(ExportState::Rendering { frame: 1, total: 3 }).unwrap();
    run.transition(ExportState::Rendering { frame: 2, total: 3 }).unwrap();
    run.transition(ExportState::Encoding).unwrap();
    run.transition(ExportState::Completed(VideoAsset::new(vec![1], Container::Mp4)))
        .unwrap();
    assert_eq!(run.video().unwrap().bytes(), &[1]);
}

#[test]
fn frames_cannot_repeat_skip_backwards_or_end_early() {
    let rendering = |frame| ExportState::Rendering { frame, total: 5 };
    assert!(!rendering(2).can_transition_to(&rendering(2)));
    assert!(!rendering(2).can_transition_to(&rendering(1)));
    assert!(!rendering(1).can_transition_to(&rendering(3)));
    assert!(!rendering(0).can_transition_to(&rendering(4)));
    assert!(rendering(1).can_transition_to(&rendering(2)));
    assert!(!rendering(4).can_transition_to(&rendering(5)));
    assert!(!rendering(3).can_transition_to(&ExportState::Encoding));
    assert!(rendering(4).can_transition_to(&ExportState::Encoding));
    assert!(!ExportState::Idle.can_transition_to(&rendering(0)));
    assert!(
        !ExportState::Decoding.can_transition_to(&ExportState::Rendering { frame: 0, total: 0 })
    );
}

#[test]
fn terminal_states_are_final() {
    let mut run = ExportRun::new(RunId(2), &ProjectConfig::default()).unwrap();
    run.transition(ExportState::Decoding).unwrap();
    run.fail(&VizError::Cancelled);
    assert_eq!(run.state(), &ExportState::Failed(FailureReason::Cancelled));

    run.fail(&VizError::encode("late"));
    assert_eq!(run.state(), &ExportState::Failed(FailureReason::Cancelled));
    assert!(run.transition(ExportState::Decoding).is_err());
}

#[test]
fn progress_is_monotonic_and_bounded() {
    let mut p = ProgressTracker::default();
    assert_eq!(p.advance(0), Some(0));
    assert_eq!(p.advance(0), None);
    assert_eq!(p.advance(40), Some(40));
    assert_eq!(p.advance(30), None);
    assert_eq!(p.value(), 40);
    assert_eq!(p.advance(250), Some(100));
}

#[test]
fn rendering_progress_spans_20_to_90() {
    assert_eq!(rendering_progress(0, 150), 20);
    assert_eq!(rendering_progress(75, 150), 55);
    assert_eq!(rendering_progress(149, 150), 90);
    assert_eq!(rendering_progress(150, 150), 90);
}

#[test]
fn cancel_token_is_shared() {
    let run = ExportRun::new(RunId(3), &ProjectConfig::default()).unwrap();
    let token = run.cancel_token();
    assert!(!run.is_cancelled());
    token.cancel();
    assert!(run.is_cancelled());
}

#[test]
fn settings_are_snapshotted() {
    let mut cfg = ProjectConfig::default();
    cfg.visualizer.bar_spacing = 4.0;
    let run = ExportRun::new(RunId(4), &cfg).unwrap();
    cfg.visualizer.bar_spacing = 9.0;
    assert_eq!(run.visualizer().bar_spacing, 4.0);
}

#[test]
fn closures_observe_progress() {
    let mut seen = Vec::new();
    {
        let mut obs = |p: u8| seen.push(p);
        let obs: &mut dyn ProgressObserver = &mut obs;
        obs.on_progress(10);
        obs.on_state(&ExportState::Encoding);
        obs.on_progress(90);
    }
    assert_eq!(seen, vec![10, 90]);
}
