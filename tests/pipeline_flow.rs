//! End-to-end pipeline tests: partial hypotheses in, fingerprints out.

use speechseal::pipeline::Pipeline;
use speechseal::pipeline::sink::{CollectingDisplay, DisplayOp};
use std::time::Duration;

/// Replays a realistic partial-hypothesis session: every revision repeats the
/// confirmed prefix, so each word confirms exactly one revision after it first
/// appears.
fn speak(pipeline: &Pipeline, words: &[&str]) {
    let input = pipeline.input();
    let mut partial = String::new();
    for word in words {
        if !partial.is_empty() {
            partial.push(' ');
        }
        partial.push_str(word);
        input.put_text(&partial);
        input.put_text(&partial);
    }
}

#[test]
fn seven_confirmed_words_produce_one_fingerprint() {
    let display = CollectingDisplay::new();
    let mut pipeline = Pipeline::new(display.clone());
    pipeline.start();

    speak(
        &pipeline,
        &["the", "quick", "brown", "fox", "jumps", "over", "dogs"],
    );

    assert!(pipeline.drain(Duration::from_secs(2)));
    pipeline.stop();

    let fragments = display.fragments();
    assert_eq!(fragments.len(), 1);

    // Only positions 4-6 of the window are hashed; words 0-3 never reach the
    // display in any form.
    let fingerprint = &fragments[0];
    assert!(fingerprint.starts_with("jumps over dogs: "));
    for hidden in ["the", "quick", "brown", "fox"] {
        assert!(!fingerprint.contains(hidden), "leaked word: {}", hidden);
    }
}

#[test]
fn identical_sessions_fingerprint_identically() {
    let words = ["a", "b", "c", "d", "e", "f", "g"];

    let first_display = CollectingDisplay::new();
    let mut first = Pipeline::new(first_display.clone());
    first.start();
    speak(&first, &words);
    assert!(first.drain(Duration::from_secs(2)));
    first.stop();

    let second_display = CollectingDisplay::new();
    let mut second = Pipeline::new(second_display.clone());
    second.start();
    second.input().reset();
    speak(&second, &words);
    assert!(second.drain(Duration::from_secs(2)));
    second.stop();

    let first_fragments = first_display.fragments();
    let second_fragments = second_display.fragments();
    assert_eq!(first_fragments.len(), 1);
    assert_eq!(first_fragments, second_fragments);
}

#[test]
fn corrections_do_not_pollute_the_fingerprint() {
    let display = CollectingDisplay::new();
    let mut pipeline = Pipeline::new(display.clone());
    pipeline.start();

    let input = pipeline.input();
    // "cab" gets revised to "cat" before it can confirm.
    input.put_text("the");
    input.put_text("the cab");
    input.put_text("the cat");
    input.put_text("the cat");
    // Five more confirmed words fill the window.
    let mut partial = "the cat".to_string();
    for word in ["w2", "w3", "w4", "w5", "w6"] {
        partial.push(' ');
        partial.push_str(word);
        input.put_text(&partial);
        input.put_text(&partial);
    }

    assert!(pipeline.drain(Duration::from_secs(2)));
    pipeline.stop();

    let fragments = display.fragments();
    assert_eq!(fragments.len(), 1);
    assert!(!fragments[0].contains("cab"));
}

#[test]
fn sentence_boundaries_and_errors_render_between_fingerprints() {
    let display = CollectingDisplay::new();
    let mut pipeline = Pipeline::new(display.clone());
    pipeline.start();

    let input = pipeline.input();
    speak(&pipeline, &["w0", "w1", "w2"]);
    input.signal_end_of_sentence();
    input.signal_error("Timeout");

    assert!(pipeline.drain(Duration::from_secs(2)));
    pipeline.stop();

    let ops = display.ops();
    assert!(ops.contains(&DisplayOp::Line(String::new())));
    assert!(ops.contains(&DisplayOp::Line("Error: Timeout".to_string())));
    // Three confirmed words are not enough for a fingerprint.
    assert!(display.fragments().is_empty());
}

#[test]
fn reset_clears_the_display_and_all_stage_state() {
    let display = CollectingDisplay::new();
    let mut pipeline = Pipeline::new(display.clone());
    pipeline.start();

    let input = pipeline.input();
    speak(&pipeline, &["x0", "x1", "x2", "x3"]);
    input.reset();

    // A fresh window after reset: the old four confirmed words must not count.
    speak(&pipeline, &["y0", "y1", "y2", "y3", "y4", "y5", "y6"]);

    assert!(pipeline.drain(Duration::from_secs(2)));
    pipeline.stop();

    let fragments = display.fragments();
    assert_eq!(fragments.len(), 1);
    assert!(fragments[0].starts_with("y4 y5 y6: "));
    assert!(display.ops().contains(&DisplayOp::Clear));
}
