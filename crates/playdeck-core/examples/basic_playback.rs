//! Basic playback example
//!
//! Demonstrates the Playdeck catalog, options, and state machine types.
//!
//! Run with: cargo run -p playdeck-core --example basic_playback

use playdeck_core::{
    format_time, probe, EnvironmentCapabilities, FormatTag, MediaSource, PlayerOptions,
    PlayerState, SourceCatalog,
};

fn main() {
    println!("Playdeck Core - Basic Playback Example");
    println!("======================================\n");

    // Pick a backend the way an embedder would at startup
    let caps = EnvironmentCapabilities {
        streaming_element: true,
        plugin: true,
    };
    println!("Backend probe: {}\n", probe(&caps).unwrap());

    // Build a two-source catalog
    let catalog = SourceCatalog::new()
        .with_source(
            "standard",
            MediaSource::new("Standard")
                .with_format(FormatTag::Mp4, "media/standard.mp4")
                .with_format(FormatTag::WebM, "media/standard.webm"),
        )
        .with_source(
            "hd",
            MediaSource::new("HD")
                .with_format(FormatTag::Mp4, "media/hd.mp4"),
        )
        .with_default("standard");

    println!("Catalog:");
    for name in catalog.names() {
        let source = catalog.get(name).unwrap();
        println!("  - {} ({} formats)", source.label, source.formats.len());
    }
    println!("  default: {}\n", catalog.default_entry().unwrap().0);

    let options = PlayerOptions::default();
    println!("Controls: {:?}", options.controls);
    println!("Load timeout: {:?}\n", options.load_timeout);

    // Demonstrate state transitions
    println!("Player State Transitions:");
    println!("--------------------------");

    let transitions = [
        (PlayerState::Idle, PlayerState::Loading),
        (PlayerState::Loading, PlayerState::Ready),
        (PlayerState::Ready, PlayerState::Playing),
        (PlayerState::Playing, PlayerState::Paused),
        (PlayerState::Paused, PlayerState::Playing),
        (PlayerState::Playing, PlayerState::Seeking),
        (PlayerState::Seeking, PlayerState::Playing),
        (PlayerState::Playing, PlayerState::Ended),
        (PlayerState::Ended, PlayerState::Playing),
        (PlayerState::Idle, PlayerState::Playing),
        (PlayerState::Error, PlayerState::Playing),
    ];

    for (from, to) in transitions {
        let symbol = if from.can_transition_to(to) { "✓" } else { "✗" };
        println!("  {} {} -> {}", symbol, from, to);
    }
    println!();

    // Time display never rolls minutes into hours
    println!("Time display:");
    for secs in [9.0, 125.0, 3600.0] {
        println!("  {:>6}s -> {}", secs, format_time(secs));
    }

    println!("\nExample complete!");
}
