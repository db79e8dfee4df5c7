use crate::kernel::error::Error;
use crate::kernel::phase::{KernelPhase, PhaseHandle};

#[test]
fn test_phase_order() {
    let mut phase = KernelPhase::NotStarted;
    let mut seen = vec![phase];
    while let Some(next) = phase.next() {
        assert!(next > phase);
        seen.push(next);
        phase = next;
    }
    assert_eq!(
        seen,
        vec![
            KernelPhase::NotStarted,
            KernelPhase::Preparing,
            KernelPhase::Initialising,
            KernelPhase::Running,
            KernelPhase::ShuttingDown,
            KernelPhase::Stopped,
        ]
    );
}

#[test]
fn test_mutation_window() {
    assert!(KernelPhase::NotStarted.allows_mutation());
    assert!(KernelPhase::Preparing.allows_mutation());
    assert!(KernelPhase::Initialising.allows_mutation());
    assert!(!KernelPhase::Running.allows_mutation());
    assert!(!KernelPhase::ShuttingDown.allows_mutation());
    assert!(!KernelPhase::Stopped.allows_mutation());
}

#[test]
fn test_display() {
    assert_eq!(KernelPhase::NotStarted.to_string(), "NOT_STARTED");
    assert_eq!(KernelPhase::Initialising.to_string(), "INITIALISING");
    assert_eq!(KernelPhase::ShuttingDown.to_string(), "SHUTTING_DOWN");
}

#[test]
fn test_handle_advances_one_step() {
    let handle = PhaseHandle::new();
    let observer = handle.clone();
    assert_eq!(handle.get(), KernelPhase::NotStarted);

    let previous = handle.advance(KernelPhase::Preparing).unwrap();
    assert_eq!(previous, KernelPhase::NotStarted);
    assert_eq!(observer.get(), KernelPhase::Preparing);
}

#[test]
fn test_handle_rejects_skips_and_regressions() {
    let handle = PhaseHandle::new();
    let err = handle.advance(KernelPhase::Running).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidPhaseTransition { from: KernelPhase::NotStarted, to: KernelPhase::Running }
    ));

    handle.advance(KernelPhase::Preparing).unwrap();
    assert!(handle.advance(KernelPhase::NotStarted).is_err());
    assert!(handle.advance(KernelPhase::Preparing).is_err());
    assert_eq!(handle.get(), KernelPhase::Preparing);
}
