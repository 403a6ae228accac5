use log::LevelFilter;
use rig_anim::diagnostics::{self, DEFAULT_CAPACITY};

// The process logger can only be installed once, so the global sink is
// exercised by this single test.
#[test]
fn test_global_sink_lifecycle() {
    let sink = diagnostics::init(None, DEFAULT_CAPACITY).unwrap();
    log::set_max_level(LevelFilter::Warn);
    assert_eq!(sink.capacity(), DEFAULT_CAPACITY);

    log::warn!(target: "diag_test", "captured warning");
    assert!(
        diagnostics::recent()
            .iter()
            .any(|r| r.target == "diag_test" && r.message == "captured warning")
    );

    diagnostics::teardown();
    assert!(
        !diagnostics::recent()
            .iter()
            .any(|r| r.target == "diag_test")
    );
    log::warn!(target: "diag_test", "dropped");
    assert!(!diagnostics::recent().iter().any(|r| r.target == "diag_test"));

    // re-init resumes capture on the installed sink
    diagnostics::init(None, 10).unwrap();
    log::warn!(target: "diag_test", "again");
    assert!(diagnostics::recent().iter().any(|r| r.message == "again"));
}
