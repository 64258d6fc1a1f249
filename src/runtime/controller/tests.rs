use std::fs;
use std::time::Duration;

use serde_json::{Value, json};
use tempfile::tempdir;

use super::*;
use crate::audio::OutputEvent;
use crate::config::LibrarySettings;
use crate::player::UNKNOWN_DURATION_LIMIT;
use crate::server::ControlError;
use crate::testing::{Call, MockOutput, library, track};

fn controller() -> (Controller<MockOutput>, MockOutput) {
    controller_with(library())
}

fn controller_with(library: Library) -> (Controller<MockOutput>, MockOutput) {
    let out = MockOutput::default();
    let player = Player::new(out.clone(), 1.0, LoopMode::NoLoop);
    out.clear_calls();
    (Controller::new(player, library, 2), out)
}

fn data(resp: &ApiResponse) -> &Value {
    resp.data.as_ref().expect("response carries data")
}

fn current_id(c: &Controller<MockOutput>) -> Option<String> {
    c.player().current().map(|t| t.id.clone())
}

/// Let the player see the `Loaded` event of the track it just started.
fn settle(c: &mut Controller<MockOutput>) {
    c.tick();
}

#[test]
fn status_of_idle_player() {
    let (mut c, _out) = controller();
    let resp = c.handle(ApiCommand::Status);
    assert!(resp.success);
    let d = data(&resp);
    assert_eq!(d["is_playing"], json!(false));
    assert_eq!(d["current_track"], Value::Null);
    assert_eq!(d["volume"], json!(100));
    assert_eq!(d["queue_length"], json!(0));
    assert_eq!(d["repeat_mode"], json!("no-loop"));
    assert_eq!(d["state"], json!("stopped"));
}

#[test]
fn play_starts_first_track_and_refuses_while_playing() {
    let (mut c, out) = controller();

    let resp = c.handle(ApiCommand::Play);
    assert!(resp.success);
    assert_eq!(data(&resp)["track"], json!("Alpha.mp3"));
    assert_eq!(out.calls(), vec![Call::Load("Alpha.mp3".into()), Call::Play]);

    let again = c.handle(ApiCommand::Play);
    assert!(!again.success);
    assert_eq!(again.message, "Music is already playing");
}

#[test]
fn play_prefers_queue_front_and_resumes_paused_track() {
    let (mut c, out) = controller();
    c.handle(ApiCommand::QueueAdd("Gamma.mp3".into()));

    c.handle(ApiCommand::Play);
    assert_eq!(current_id(&c).as_deref(), Some("Gamma.mp3"));
    assert!(c.queue().is_empty());

    c.handle(ApiCommand::Pause);
    out.clear_calls();
    let resp = c.handle(ApiCommand::Play);
    assert_eq!(resp.message, "Playback resumed");
    assert_eq!(out.calls(), vec![Call::Play]);
}

#[test]
fn play_on_empty_library_is_refused() {
    let (mut c, _out) = controller_with(Library::from_tracks("/music", Vec::new()));
    let resp = c.handle(ApiCommand::Play);
    assert!(!resp.success);
    assert_eq!(resp.message, "No music files available");
}

#[test]
fn resume_and_pause_report_player_errors() {
    let (mut c, _out) = controller();
    assert_eq!(c.handle(ApiCommand::Resume).message, "No track loaded");
    assert_eq!(c.handle(ApiCommand::Pause).message, "Music is already paused");

    c.handle(ApiCommand::Play);
    assert_eq!(c.handle(ApiCommand::Resume).message, "Music is already playing");
    assert!(c.handle(ApiCommand::Pause).success);
    assert_eq!(data(&c.handle(ApiCommand::Toggle))["state"], json!("playing"));
}

#[test]
fn skip_walks_library_and_stops_at_the_end() {
    let (mut c, _out) = controller();
    c.handle(ApiCommand::Play);

    assert_eq!(data(&c.handle(ApiCommand::Skip))["track"], json!("Beta.mp3"));
    assert_eq!(data(&c.handle(ApiCommand::Skip))["track"], json!("Gamma.mp3"));

    let end = c.handle(ApiCommand::Skip);
    assert!(!end.success);
    assert_eq!(end.message, "Reached end of playlist");
    assert_eq!(current_id(&c).as_deref(), Some("Gamma.mp3"));
}

#[test]
fn skip_and_previous_wrap_under_loop_all() {
    let (mut c, _out) = controller();
    assert_eq!(
        data(&c.handle(ApiCommand::CycleLoop))["repeat_mode"],
        json!("loop-all")
    );

    c.handle(ApiCommand::QueueAdd("Gamma.mp3".into()));
    c.handle(ApiCommand::Play);
    assert_eq!(data(&c.handle(ApiCommand::Skip))["track"], json!("Alpha.mp3"));
    assert_eq!(data(&c.handle(ApiCommand::Previous))["track"], json!("Gamma.mp3"));
}

#[test]
fn previous_at_start_is_refused_without_loop() {
    let (mut c, _out) = controller();
    c.handle(ApiCommand::Play);
    let resp = c.handle(ApiCommand::Previous);
    assert!(!resp.success);
    assert_eq!(resp.message, "Reached start of playlist");

    c.handle(ApiCommand::Skip);
    assert_eq!(data(&c.handle(ApiCommand::Previous))["track"], json!("Alpha.mp3"));
}

#[test]
fn skip_takes_queue_before_library() {
    let (mut c, _out) = controller();
    c.handle(ApiCommand::Play);
    c.handle(ApiCommand::QueueAdd("Gamma.mp3".into()));
    assert_eq!(data(&c.handle(ApiCommand::Skip))["track"], json!("Gamma.mp3"));
    assert!(c.queue().is_empty());
}

#[test]
fn queue_add_falls_back_to_top_search_result() {
    let (mut c, _out) = controller();

    let resp = c.handle(ApiCommand::QueueAdd("the band".into()));
    assert!(resp.success);
    assert_eq!(resp.message, "Added top search result 'Beta.mp3' to queue");

    let none = c.handle(ApiCommand::QueueAdd("zzz".into()));
    assert!(!none.success);
    assert_eq!(none.message, "No tracks found matching the query");
    assert_eq!(c.queue().len(), 1);
}

#[test]
fn queue_list_remove_and_clear() {
    let (mut c, _out) = controller();
    c.handle(ApiCommand::QueueAdd("Alpha.mp3".into()));
    c.handle(ApiCommand::QueueAdd("Beta.mp3".into()));

    let list = c.handle(ApiCommand::QueueList);
    assert_eq!(
        data(&list)["queue"],
        json!([{ "index": 0, "track": "Alpha.mp3" }, { "index": 1, "track": "Beta.mp3" }])
    );
    assert_eq!(data(&list)["total_tracks"], json!(2));

    let bad = c.handle(ApiCommand::QueueRemove(5));
    assert!(!bad.success);
    assert_eq!(bad.message, "Invalid index 5. Queue has 2 tracks");

    let removed = c.handle(ApiCommand::QueueRemove(0));
    assert_eq!(removed.message, "Removed 'Alpha.mp3' from queue");
    assert_eq!(data(&removed)["queue_length"], json!(1));

    assert!(c.handle(ApiCommand::QueueClear).success);
    assert!(c.queue().is_empty());
}

#[test]
fn stop_clears_queue_only_when_asked() {
    let (mut c, out) = controller();
    c.handle(ApiCommand::Play);
    c.handle(ApiCommand::QueueAdd("Beta.mp3".into()));

    c.handle(ApiCommand::Stop { clear_queue: false });
    assert_eq!(c.queue().len(), 1);
    assert_eq!(c.player().playback(), PlaybackState::Stopped);
    assert_eq!(out.count(&Call::Stop), 1);

    let resp = c.handle(ApiCommand::Stop { clear_queue: true });
    assert_eq!(resp.message, "Playback stopped and queue cleared");
    assert!(c.queue().is_empty());
}

#[test]
fn set_volume_clamps_percent() {
    let (mut c, out) = controller();
    assert_eq!(data(&c.handle(ApiCommand::SetVolume(150)))["volume"], json!(100));
    assert_eq!(data(&c.handle(ApiCommand::SetVolume(-3)))["volume"], json!(0));
    let resp = c.handle(ApiCommand::SetVolume(40));
    assert_eq!(resp.message, "Volume set to 40%");
    assert_eq!(
        out.calls(),
        vec![Call::SetVolume(1.0), Call::SetVolume(0.0), Call::SetVolume(0.4)]
    );
    assert_eq!(data(&c.handle(ApiCommand::Status))["volume"], json!(40));
}

#[test]
fn seek_requires_a_track_and_clamps_position() {
    let (mut c, _out) = controller();
    assert_eq!(c.handle(ApiCommand::Seek(10.0)).message, "No track loaded");

    c.handle(ApiCommand::Play);
    assert_eq!(data(&c.handle(ApiCommand::Seek(30.0)))["position"], json!(30.0));
    assert_eq!(data(&c.handle(ApiCommand::Seek(-4.0)))["position"], json!(0.0));
    assert_eq!(data(&c.handle(ApiCommand::Seek(f64::NAN)))["position"], json!(0.0));
    assert_eq!(data(&c.handle(ApiCommand::Seek(1e12)))["position"], json!(180.0));
    assert_eq!(
        data(&c.handle(ApiCommand::Seek(f64::INFINITY)))["position"],
        json!(180.0)
    );
}

#[test]
fn seek_far_past_unknown_length_is_capped() {
    let mut untimed = track("Drone", None, 0);
    untimed.duration = None;
    let (mut c, out) = controller_with(Library::from_tracks("/music", vec![untimed]));
    c.handle(ApiCommand::Play);
    settle(&mut c);
    out.clear_calls();

    let resp = c.handle(ApiCommand::Seek(1e300));
    assert!(resp.success, "{}", resp.message);
    assert_eq!(
        data(&resp)["position"],
        json!(UNKNOWN_DURATION_LIMIT.as_secs_f64())
    );
    assert_eq!(out.calls(), vec![Call::Seek(UNKNOWN_DURATION_LIMIT)]);
}

#[test]
fn search_is_limited_to_max_results() {
    let (mut c, _out) = controller();

    let all = c.handle(ApiCommand::Search(String::new()));
    assert_eq!(data(&all)["results"], json!(["Alpha.mp3", "Beta.mp3"]));

    let one = c.handle(ApiCommand::Search("GAM".into()));
    assert_eq!(one.message, "Found 1 matching tracks");
    assert_eq!(data(&one)["results"], json!(["Gamma.mp3"]));
    assert_eq!(c.player().state().search, "GAM");
}

#[test]
fn current_reports_track_and_progress() {
    let (mut c, out) = controller();
    c.handle(ApiCommand::QueueAdd("Beta.mp3".into()));
    c.handle(ApiCommand::Play);
    settle(&mut c);
    out.push_event(OutputEvent::TimeUpdate(Duration::from_secs(42)));
    c.tick();

    let d = c.handle(ApiCommand::Current).data.expect("data");
    assert_eq!(d["track"], json!("Beta.mp3"));
    assert_eq!(d["artist"], json!("The Band"));
    assert_eq!(d["progress"], json!(42));
    assert_eq!(d["duration"], json!(200));
    assert_eq!(d["state"], json!("playing"));
}

#[test]
fn tracks_lists_every_library_id() {
    let (mut c, _out) = controller();
    let resp = c.handle(ApiCommand::Tracks);
    assert_eq!(
        data(&resp)["tracks"],
        json!(["Alpha.mp3", "Beta.mp3", "Gamma.mp3"])
    );
}

#[test]
fn end_of_track_advances_through_queue_then_library() {
    let (mut c, out) = controller();
    c.handle(ApiCommand::Play);
    c.handle(ApiCommand::QueueAdd("Gamma.mp3".into()));
    settle(&mut c);

    out.push_event(OutputEvent::Ended);
    c.tick();
    assert_eq!(current_id(&c).as_deref(), Some("Gamma.mp3"));
    assert!(c.player().state().playing);
    settle(&mut c);

    // Gamma is last in the library.
    out.push_event(OutputEvent::Ended);
    c.tick();
    assert_eq!(c.player().playback(), PlaybackState::Stopped);
}

#[test]
fn quick_skips_do_not_apply_previous_track_events() {
    let (mut c, out) = controller();
    assert_eq!(data(&c.handle(ApiCommand::Skip))["track"], json!("Alpha.mp3"));
    out.push_event(OutputEvent::TimeUpdate(Duration::from_secs(7)));
    out.push_event(OutputEvent::Ended);
    assert_eq!(data(&c.handle(ApiCommand::Skip))["track"], json!("Beta.mp3"));

    c.tick();
    assert_eq!(current_id(&c).as_deref(), Some("Beta.mp3"));
    assert!(c.player().state().playing);
    assert_eq!(c.player().state().elapsed, Duration::ZERO);
    assert_eq!(c.player().state().duration, Some(Duration::from_secs(200)));
}

#[test]
fn end_of_track_wraps_under_loop_all() {
    let (mut c, out) = controller();
    c.handle(ApiCommand::CycleLoop);
    c.handle(ApiCommand::QueueAdd("Gamma.mp3".into()));
    c.handle(ApiCommand::Play);
    settle(&mut c);

    out.push_event(OutputEvent::Ended);
    c.tick();
    assert_eq!(current_id(&c).as_deref(), Some("Alpha.mp3"));
}

#[test]
fn end_of_track_repeats_under_loop_one() {
    let (mut c, out) = controller();
    c.handle(ApiCommand::CycleLoop);
    c.handle(ApiCommand::CycleLoop);
    c.handle(ApiCommand::QueueAdd("Gamma.mp3".into()));
    c.handle(ApiCommand::Play);
    settle(&mut c);

    out.push_event(OutputEvent::Ended);
    c.tick();
    assert_eq!(current_id(&c).as_deref(), Some("Gamma.mp3"));
    assert_eq!(out.count(&Call::Load("Gamma.mp3".into())), 2);

    // Manual skip still moves on.
    c.handle(ApiCommand::CycleLoop);
    c.handle(ApiCommand::CycleLoop);
    assert_eq!(data(&c.handle(ApiCommand::Skip))["track"], json!("Alpha.mp3"));
}

#[test]
fn library_delete_removes_file_queue_entry_and_stops_playback() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp3"), b"").unwrap();
    fs::write(dir.path().join("b.mp3"), b"").unwrap();
    let library = Library::open(dir.path(), LibrarySettings::default());
    let (mut c, _out) = controller_with(library);

    c.handle(ApiCommand::Play);
    assert_eq!(current_id(&c).as_deref(), Some("a.mp3"));
    c.handle(ApiCommand::QueueAdd("a.mp3".into()));
    c.handle(ApiCommand::QueueAdd("b.mp3".into()));

    let resp = c.handle(ApiCommand::LibraryDelete("a.mp3".into()));
    assert!(resp.success, "{}", resp.message);
    assert_eq!(data(&resp)["tracks_count"], json!(1));
    assert!(!dir.path().join("a.mp3").exists());
    assert_eq!(c.queue().iter().collect::<Vec<_>>(), vec!["b.mp3"]);
    assert_eq!(c.player().playback(), PlaybackState::Stopped);

    let missing = c.handle(ApiCommand::LibraryDelete("zzz.mp3".into()));
    assert!(!missing.success);
    assert!(missing.message.starts_with("Failed to delete 'zzz.mp3'"));
}

#[test]
fn downloaded_file_is_picked_up_and_enqueued() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp3"), b"").unwrap();
    let library = Library::open(dir.path(), LibrarySettings::default());
    let (mut c, _out) = controller_with(library);

    let fetched = dir.path().join("clip.mp3");
    fs::write(&fetched, b"").unwrap();
    let resp = c.handle(ApiCommand::Downloaded {
        path: fetched,
        enqueue: true,
    });
    assert!(resp.success, "{}", resp.message);
    assert_eq!(resp.message, "Downloaded and added 'clip.mp3' to queue");
    assert_eq!(c.library().len(), 2);

    let notes = dir.path().join("notes.txt");
    fs::write(&notes, b"").unwrap();
    let bad = c.handle(ApiCommand::Downloaded {
        path: notes,
        enqueue: false,
    });
    assert!(!bad.success);
}

#[test]
fn spawned_controller_answers_through_handle() {
    let (c, _out) = controller();
    let (handle, _join) = c.spawn(Duration::from_millis(5), Duration::from_secs(2));

    let resp = handle.request(ApiCommand::Play).unwrap();
    assert!(resp.success);
    let status = handle.request(ApiCommand::Status).unwrap();
    assert_eq!(data(&status)["current_track"], json!("Alpha.mp3"));
}

#[test]
fn detached_handle_is_unavailable() {
    let handle = ControlHandle::detached();
    assert_eq!(
        handle.request(ApiCommand::Status),
        Err(ControlError::Unavailable)
    );
}
