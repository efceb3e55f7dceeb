//! Integration tests for ambient sound playback.

use formacad_core::sound::{catalog, find, synth};
use formacad_core::{AmbientPlayer, MemoryAudioBackend, SoundType};

fn player() -> AmbientPlayer<MemoryAudioBackend> {
    AmbientPlayer::with_seed(MemoryAudioBackend::new(22_050), 42)
}

#[test]
fn switching_sounds_keeps_a_single_source() {
    let mut p = player();
    let rain = find("light-rain").unwrap();
    let wind = find("soft-wind").unwrap();

    p.toggle_sound(rain);
    let rain_source = p.active_source().unwrap();
    p.toggle_sound(wind);

    assert!(p.is_playing());
    assert_eq!(p.current_sound().map(|s| s.id), Some("soft-wind"));
    assert!(p.backend().was_disconnected(rain_source));
    assert_eq!(p.backend().active_sources(), 1);
}

#[test]
fn toggling_the_same_sound_twice_stops_it() {
    let mut p = player();
    let static_noise = find("warm-static").unwrap();
    p.toggle_sound(static_noise);
    p.toggle_sound(static_noise);

    assert!(!p.is_playing());
    assert!(p.current_sound().is_none());
    assert_eq!(p.backend().active_sources(), 0);
}

#[test]
fn volume_changes_apply_live() {
    let mut p = player();
    p.play_sound(find("deep-focus").unwrap());
    let before = p.active_source().unwrap();

    p.change_volume(0.7);

    let after = p.active_source().unwrap();
    assert_eq!(before, after);
    assert!((p.backend().source(after).unwrap().gain - 0.7).abs() < f32::EPSILON);
    assert!(p.state().is_playing);
}

#[test]
fn volume_persists_for_next_sound() {
    let mut p = player();
    p.change_volume(0.3);
    p.play_sound(find("soft-wind").unwrap());
    p.play_sound(find("light-rain").unwrap());
    let src = p.active_source().unwrap();
    assert!((p.backend().source(src).unwrap().gain - 0.3).abs() < f32::EPSILON);
}

#[test]
fn every_catalog_sound_synthesizes_within_bounds() {
    let mut p = player();
    for sound in catalog() {
        p.play_sound(sound);
        let src = p.active_source().unwrap();
        let buffer = &p.backend().source(src).unwrap().buffer;
        assert_eq!(buffer.len(), 44_100);
        let ceiling = match sound.sound_type {
            SoundType::WhiteNoise => synth::WHITE_GAIN,
            SoundType::BrownNoise => synth::BROWN_GAIN,
            SoundType::Rain => synth::RAIN_GAIN * (1.0 + synth::RAIN_DEPTH),
        };
        assert!(synth::peak(buffer) <= ceiling + 1e-6, "{} exceeds {ceiling}", sound.id);
        assert!(synth::rms(buffer) > 0.0);
    }
}

#[test]
fn dropping_the_player_is_clean_after_failures() {
    let mut p = player();
    p.backend_mut().fail_context_creation("blocked before user gesture");
    p.play_sound(find("soft-wind").unwrap());
    assert!(!p.state().is_playing);

    p.backend_mut().clear_failures();
    p.play_sound(find("soft-wind").unwrap());
    assert!(p.state().is_playing);
    drop(p);
}
