// SPDX-License-Identifier: GPL-3.0-only

//! Runs `run_flash` against a stand-in script without elevation.

use flash_sys::{LaunchOptions, RelayEvent, run_flash};
use flash_types::{Credential, FlashInvocation, FlashOutcome};
use std::path::Path;
use std::time::{Duration, Instant};

fn options() -> LaunchOptions {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    LaunchOptions {
        script: fixtures.join("flash_cordatus.sh"),
        working_dir: fixtures,
        elevate: false,
        stop_udisks: false,
    }
}

fn invocation(product: &str) -> FlashInvocation {
    FlashInvocation {
        product: product.to_string(),
        module: "AGX Orin".to_string(),
        jetpack: "6.2".to_string(),
        storage: "nvme".to_string(),
        keep_files: false,
        username: "jetson".to_string(),
        credential: Credential::new("unused"),
    }
}

fn collect(product: &str) -> (FlashOutcome, Vec<RelayEvent>) {
    let mut events = Vec::new();
    let outcome = run_flash(&invocation(product), &options(), |event| events.push(event));
    (outcome, events)
}

#[test]
fn relays_progress_then_log_lines() {
    let (outcome, events) = collect("devkit");
    assert_eq!(outcome, FlashOutcome::Succeeded);

    let progress: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            RelayEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![10, 55, 100]);

    let output: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            RelayEvent::Output(line) => Some(line.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        output,
        vec![
            "Flashing devkit AGX Orin 6.2 nvme keep=False user=jetson",
            "Downloading has been finished!",
            "Writing image 45% done",
            "warning on stderr",
        ]
    );

    let errors = events
        .iter()
        .filter(|e| matches!(e, RelayEvent::Error(_)))
        .count();
    assert_eq!(errors, 1, "the unparsable progress line");

    assert!(matches!(events.first(), Some(RelayEvent::Notice(cmd)) if cmd.starts_with("$ bash ")));
    assert!(events.iter().any(|e| matches!(e, RelayEvent::Started(_))));
    assert!(matches!(
        events.last(),
        Some(RelayEvent::Finished(FlashOutcome::Succeeded))
    ));
}

#[test]
fn exit_code_is_reported() {
    let (outcome, events) = collect("fail");
    assert_eq!(outcome, FlashOutcome::Failed { code: Some(3) });
    assert!(events.iter().any(
        |e| matches!(e, RelayEvent::Error(line) if line == "Flash failed (exit code 3)")
    ));
}

#[test]
fn missing_script_still_finishes() {
    let mut options = options();
    options.script = options.working_dir.join("missing.sh");
    let mut events = Vec::new();
    let outcome = run_flash(&invocation("devkit"), &options, |e| events.push(e));

    assert_eq!(outcome, FlashOutcome::Failed { code: None });
    assert!(!events.iter().any(|e| matches!(e, RelayEvent::Started(_))));
    assert!(matches!(
        events.last(),
        Some(RelayEvent::Finished(FlashOutcome::Failed { code: None }))
    ));
}

/// Runs `product`, cancelling 300 ms after the script starts.
fn run_and_cancel(product: &str) -> (FlashOutcome, Vec<RelayEvent>, Duration) {
    let started = Instant::now();
    let mut events = Vec::new();
    let outcome = run_flash(&invocation(product), &options(), |event| {
        if let RelayEvent::Started(handle) = &event {
            let handle = handle.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(300));
                handle.cancel();
            });
        }
        events.push(event);
    });
    (outcome, events, started.elapsed())
}

#[test]
fn cancel_stops_a_running_flash() {
    let (outcome, events, elapsed) = run_and_cancel("slow");

    assert_eq!(outcome, FlashOutcome::Cancelled);
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
    assert!(events.iter().any(
        |e| matches!(e, RelayEvent::Error(line) if line == "Flash cancelled")
    ));
}

#[test]
fn cancel_reaches_foreground_children_of_the_script() {
    let (outcome, events, elapsed) = run_and_cancel("child");

    assert_eq!(outcome, FlashOutcome::Cancelled);
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
    assert!(!events.iter().any(
        |e| matches!(e, RelayEvent::Output(line) if line == "child finished")
    ));
}
