//! Exit status of the `deck2video` binary for argument errors.
//!
//! None of these reach the network or ffmpeg: parsing fails first.

#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn deck2video(args: &[&str]) -> Output {
    let dir = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_deck2video"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("DECK2VIDEO_DPI")
        .output()
        .unwrap()
}

#[test]
fn no_arguments_exits_one() {
    let out = deck2video(&[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn two_inputs_exit_one() {
    let out = deck2video(&["a.pptx", "b.pptx"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn out_of_range_dpi_exits_one() {
    let out = deck2video(&["--dpi", "5", "talk.pdf"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn help_exits_zero() {
    let out = deck2video(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("deck2video"));
}
