#![no_main]

//! Fuzz target for factory naming
//!
//! Class and file names must be stable, identifier-safe and end in the
//! factory suffix for any class identifier.

use dependency_compiler::{build_class_name, build_file_name};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|class: &str| {
    let name = build_class_name(class);
    assert_eq!(name, build_class_name(class));
    assert!(name.ends_with("Factory"));
    assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    assert!(!name.starts_with(|c: char| c.is_ascii_digit()));

    let file = build_file_name(class);
    assert_eq!(file, build_file_name(class));
    assert!(file.ends_with("Factory.rs"));
    assert!(!file.starts_with('/'));
    assert!(!file.contains("//"));
    assert!(file.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.')));
});
