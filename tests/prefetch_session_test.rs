use std::collections::HashSet;
use std::path::PathBuf;

use gallerat::gallery::{
    Command, Entry, LoadCompletion, LoadError, Navigator, Session, SharedCache, completion_handler,
};
use gallerat::test_utils::test_helpers::{RecordingDispatcher, numbered_paths, stub_picture};

fn session(len: usize, steps: usize) -> Session<RecordingDispatcher> {
    Session::new(
        numbered_paths(len),
        steps,
        SharedCache::new(),
        RecordingDispatcher::new(),
    )
}

fn complete_ok(cache: &SharedCache, pos: usize) {
    let handler = completion_handler(cache.clone());
    handler(LoadCompletion {
        pos,
        path: PathBuf::from(format!("{pos:03}.jpg")),
        result: Ok(stub_picture(pos as u32)),
    });
}

#[test]
fn scenario_a_window_at_start() {
    let mut s = session(5, 2);
    s.set_index(0);
    assert_eq!(s.navigator().window(), vec![0, 1, 2]);
    assert_eq!(s.dispatcher().positions(), vec![0, 1, 2]);
}

#[test]
fn scenario_b_forward_window() {
    let mut nav = Navigator::new(5, 2);
    nav.set(1);
    nav.advance();
    assert_eq!(nav.window(), vec![2, 3, 4, 0, 1]);
}

#[test]
fn scenario_c_backward_window() {
    let mut nav = Navigator::new(5, 2);
    nav.set(3);
    nav.retreat();
    assert_eq!(nav.window(), vec![2, 0, 1, 3, 4]);
}

#[test]
fn scenario_d_prefetched_picture_shows_without_new_dispatch() {
    let mut s = session(5, 2);
    s.set_index(1);
    assert!(s.dispatcher().positions().contains(&3));

    complete_ok(s.cache(), 3);
    assert_eq!(
        s.cache().get(3),
        Entry::Ready(std::sync::Arc::new(stub_picture(3)))
    );

    s.set_index(3);
    match s.current_payload() {
        Entry::Ready(picture) => assert_eq!(*picture, stub_picture(3)),
        other => panic!("expected ready picture, got {other:?}"),
    }
    // Only 4 is new in the window [3, 4, 1, 2]
    assert_eq!(s.dispatcher().positions(), vec![1, 2, 3, 0, 4]);
}

#[test]
fn scenario_e_empty_collection() {
    let mut s = session(0, 2);
    s.set_index(0);
    s.advance();
    s.retreat();
    s.apply(Command::GoTo(3));
    assert_eq!(s.current_payload(), Entry::Absent);
    assert_eq!(s.dispatcher().count(), 0);
    assert_eq!(s.tick(), None);
}

#[test]
fn forward_walk_never_dispatches_a_position_twice() {
    let mut s = session(100, 2);
    s.set_index(0);
    let mut touched: HashSet<usize> = s.navigator().window().into_iter().collect();

    for _ in 0..50 {
        s.advance();
        touched.extend(s.navigator().window());
    }

    let dispatched = s.dispatcher().positions();
    let unique: HashSet<usize> = dispatched.iter().copied().collect();
    assert_eq!(unique.len(), dispatched.len(), "duplicate dispatch");
    assert!(dispatched.len() <= touched.len());
    assert_eq!(s.current(), 50);
}

#[test]
fn back_and_forth_walk_never_dispatches_a_position_twice() {
    let mut s = session(30, 3);
    s.set_index(10);
    for step in 0..60 {
        if step % 7 < 4 {
            s.advance();
        } else {
            s.retreat();
        }
        assert!(s.current() < 30);
    }
    let dispatched = s.dispatcher().positions();
    let unique: HashSet<usize> = dispatched.iter().copied().collect();
    assert_eq!(unique.len(), dispatched.len());
}

#[test]
fn completions_in_any_order_land_in_their_own_slots() {
    let mut s = session(10, 0);
    for pos in [1, 2, 3] {
        s.set_index(pos);
    }
    assert_eq!(s.dispatcher().positions(), vec![1, 2, 3]);

    for pos in [3, 1, 2] {
        complete_ok(s.cache(), pos);
    }

    for pos in [1, 2, 3] {
        match s.cache().get(pos) {
            Entry::Ready(picture) => assert_eq!(*picture, stub_picture(pos as u32)),
            other => panic!("position {pos}: {other:?}"),
        }
    }
}

#[test]
fn completion_for_position_left_behind_is_kept() {
    let mut s = session(20, 1);
    s.set_index(0);
    s.set_index(15);
    complete_ok(s.cache(), 1);
    assert!(matches!(s.cache().get(1), Entry::Ready(_)));

    s.set_index(1);
    assert!(matches!(s.current_payload(), Entry::Ready(_)));
}

#[test]
fn failed_load_is_settled_and_not_retried() {
    let mut s = session(4, 1);
    s.set_index(0);
    let handler = completion_handler(s.cache().clone());
    let error = LoadError::Decode {
        path: PathBuf::from("000.jpg"),
        detail: "corrupt".to_string(),
    };
    handler(LoadCompletion {
        pos: 0,
        path: PathBuf::from("000.jpg"),
        result: Err(error.clone()),
    });

    assert_eq!(s.current_payload(), Entry::Failed(error));
    s.advance();
    s.retreat();
    assert_eq!(
        s.dispatcher().positions().iter().filter(|&&p| p == 0).count(),
        1
    );
}

#[test]
fn pending_positions_match_outstanding_requests() {
    let mut s = session(50, 2);
    s.set_index(10);
    s.advance();
    s.apply(Command::GoTo(40));
    s.retreat();

    let outstanding: HashSet<usize> = s.dispatcher().positions().into_iter().collect();
    let guard = s.cache().lock();
    assert_eq!(guard.pending_count(), outstanding.len());
    for pos in outstanding {
        assert_eq!(guard.get(pos), Entry::Pending);
    }
}
