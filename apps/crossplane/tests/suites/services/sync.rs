use std::sync::Arc;
use std::time::Duration;

use crossplane::adapters::MemorySnapshotStore;
use crossplane::domain::{seed_cells, Cell, ChangeOrigin, Coord, GridStore, Letter};
use crossplane::repos::SnapshotStore;
use crossplane::services::play;
use crossplane::{BootstrapOutcome, SyncReconciler};
use time::OffsetDateTime;
use tokio::sync::Notify;
use tokio::time::sleep;

use crate::support::flaky_store::FlakyStore;
use crate::support::state::{session, TEST_DEBOUNCE};
use crate::support::validator::ScriptedValidator;

fn letter(c: char) -> Letter {
    Letter::parse(c).unwrap()
}

fn cell(x: i32, y: i32, c: char) -> Cell {
    Cell::confirmed(Coord::new(x, y), letter(c))
}

fn reconciler(store: Arc<dyn SnapshotStore>) -> (Arc<GridStore>, Arc<SyncReconciler>) {
    let grid = Arc::new(GridStore::new());
    let sync = Arc::new(SyncReconciler::new(grid.clone(), store, TEST_DEBOUNCE));
    (grid, sync)
}

#[tokio::test(start_paused = true)]
async fn bootstrap_adopts_a_non_empty_remote_grid() {
    let remote = vec![cell(0, 2, 'H'), cell(1, 2, 'I')];
    let store = MemorySnapshotStore::with_cells(&remote).unwrap();
    let (grid, sync) = reconciler(Arc::new(store.clone()));

    assert_eq!(sync.bootstrap().await, BootstrapOutcome::Adopted { cells: 2 });
    assert!(grid.same_contents(&remote));
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn bootstrap_seeds_and_publishes_an_empty_remote_grid() {
    let store = MemorySnapshotStore::new();
    let (grid, sync) = reconciler(Arc::new(store.clone()));

    assert_eq!(sync.bootstrap().await, BootstrapOutcome::Seeded);
    assert!(grid.same_contents(&seed_cells()));
    assert_eq!(store.save_count(), 1);
    let remote = store.load().await.unwrap();
    assert!(grid.same_contents(&remote));
}

#[tokio::test(start_paused = true)]
async fn unreadable_remote_grid_plays_offline_without_writing() {
    let store = Arc::new(FlakyStore::new(MemorySnapshotStore::new()).failing_load());
    let (grid, sync) = reconciler(store.clone());

    assert_eq!(sync.bootstrap().await, BootstrapOutcome::SeededOffline);
    assert!(grid.same_contents(&seed_cells()));

    let handle = sync.start().await;
    sleep(TEST_DEBOUNCE * 3).await;
    assert_eq!(store.save_attempts(), 0);
    handle.shutdown().await;
    assert_eq!(store.save_attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn seed_push_failure_is_retried_by_the_push_loop() {
    let store = Arc::new(FlakyStore::new(MemorySnapshotStore::new()).failing_saves(1));
    let (_grid, sync) = reconciler(store.clone());

    assert_eq!(sync.bootstrap().await, BootstrapOutcome::Seeded);
    assert_eq!(store.inner().save_count(), 0);

    let handle = sync.start().await;
    sleep(TEST_DEBOUNCE + Duration::from_millis(100)).await;
    assert_eq!(store.save_attempts(), 2);
    assert_eq!(store.inner().save_count(), 1);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn burst_of_local_changes_is_pushed_once() {
    let store = MemorySnapshotStore::with_cells(&seed_cells()).unwrap();
    let (grid, sync) = reconciler(Arc::new(store.clone()));
    sync.bootstrap().await;
    let handle = sync.start().await;

    grid.place(Coord::new(6, 0), letter('S'), true);
    sleep(Duration::from_millis(100)).await;
    grid.place(Coord::new(1, 1), letter('A'), true);
    sleep(Duration::from_millis(100)).await;
    grid.place(Coord::new(1, 2), letter('D'), true);

    // Last change at t=200ms, so the push is due at t=1200ms.
    sleep(Duration::from_millis(900)).await;
    assert_eq!(store.save_count(), 0);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.load().await.unwrap().len(), 13);

    handle.shutdown().await;
    assert_eq!(store.save_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_push_is_retried_after_another_debounce() {
    let store = Arc::new(
        FlakyStore::new(MemorySnapshotStore::with_cells(&seed_cells()).unwrap()).failing_saves(1),
    );
    let (grid, sync) = reconciler(store.clone());
    sync.bootstrap().await;
    let handle = sync.start().await;

    grid.place(Coord::new(6, 0), letter('S'), true);
    sleep(TEST_DEBOUNCE + Duration::from_millis(100)).await;
    assert_eq!(store.save_attempts(), 1);
    assert_eq!(store.inner().save_count(), 0);

    sleep(TEST_DEBOUNCE).await;
    assert_eq!(store.save_attempts(), 2);
    assert_eq!(store.inner().save_count(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn remote_snapshot_cancels_a_scheduled_push() {
    let store = MemorySnapshotStore::with_cells(&seed_cells()).unwrap();
    let (grid, sync) = reconciler(Arc::new(store.clone()));
    sync.bootstrap().await;
    let handle = sync.start().await;
    tokio::task::yield_now().await;

    grid.place(Coord::new(6, 0), letter('S'), true);
    sleep(Duration::from_millis(100)).await;

    // Another client writes first.
    let other = vec![cell(0, 2, 'H'), cell(1, 2, 'I')];
    store.save(&other).await.unwrap();
    sleep(TEST_DEBOUNCE * 3).await;

    assert!(grid.same_contents(&other));
    assert_eq!(store.save_count(), 1);
    assert!(grid.same_contents(&store.load().await.unwrap()));

    handle.shutdown().await;
    assert_eq!(store.save_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn ingest_is_idempotent() {
    let (grid, sync) = reconciler(Arc::new(MemorySnapshotStore::new()));
    let snapshot = vec![cell(0, 2, 'H'), cell(1, 2, 'I')];

    assert!(sync.ingest(snapshot.clone()));
    let version = grid.version();

    let mut reordered = snapshot.clone();
    reordered.reverse();
    assert!(!sync.ingest(reordered));
    assert!(!sync.ingest(snapshot));
    assert_eq!(grid.version(), version);
}

#[tokio::test(start_paused = true)]
async fn echo_of_a_seen_snapshot_does_not_undo_local_edits() {
    let store = MemorySnapshotStore::with_cells(&seed_cells()).unwrap();
    let (grid, sync) = reconciler(Arc::new(store.clone()));
    sync.bootstrap().await;

    grid.place(Coord::new(6, 0), letter('S'), true);
    assert!(!sync.ingest(seed_cells()));
    assert!(grid.contains(Coord::new(6, 0)));
}

#[tokio::test(start_paused = true)]
async fn own_echo_before_the_save_ack_keeps_newer_local_edits() {
    let gate = Arc::new(Notify::new());
    let (store, mut echoes) =
        FlakyStore::new(MemorySnapshotStore::new()).echoing_before_ack(gate.clone());
    let store = Arc::new(store);
    let (grid, sync) = reconciler(store.clone());
    grid.replace_all(seed_cells(), ChangeOrigin::Bootstrap);

    grid.place(Coord::new(6, 0), letter('S'), true);
    let push = tokio::spawn({
        let sync = sync.clone();
        async move { sync.push_now().await }
    });
    let echo = echoes.recv().await.unwrap();
    assert_eq!(echo.len(), 11);

    // Committed while the first push is still waiting on the store.
    grid.place(Coord::new(1, 1), letter('A'), true);
    assert!(!sync.ingest(echo));
    assert_eq!(grid.letter_at(Coord::new(1, 1)), Some(letter('A')));

    gate.notify_one();
    push.await.unwrap().unwrap();
    assert_eq!(store.inner().load().await.unwrap().len(), 11);
    assert_eq!(grid.confirmed_count(), 12);
}

#[tokio::test(start_paused = true)]
async fn remote_pull_leaves_the_players_input_alone() {
    let shared = MemorySnapshotStore::new();
    let alice = session(Arc::new(shared.clone()), Arc::new(ScriptedValidator::accepting())).await;
    assert!(alice.is_live().await);
    sleep(Duration::from_millis(10)).await;

    let now = OffsetDateTime::now_utc();
    play::select_cell(&alice, Coord::new(2, 1)).unwrap();
    play::toggle_direction(&alice);
    assert_eq!(play::type_letters(&alice, "ab").unwrap(), 2);
    let before = play::view(&alice, now);
    assert_eq!(before.pending.len(), 2);

    // Another client writes a grid that differs from ours.
    let mut remote = seed_cells();
    remote.push(cell(-3, 3, 'Z'));
    shared.save(&remote).await.unwrap();
    sleep(Duration::from_millis(10)).await;
    assert!(alice.grid.same_contents(&remote));

    let after = play::view(&alice, now);
    assert_eq!(after.pending, before.pending);
    assert_eq!(after.selected, before.selected);
    assert_eq!(after.direction, before.direction);
    assert_eq!(after.confirmed_cells, 11);

    alice.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_flushes_a_scheduled_push() {
    let store = MemorySnapshotStore::with_cells(&seed_cells()).unwrap();
    let (grid, sync) = reconciler(Arc::new(store.clone()));
    sync.bootstrap().await;
    let handle = sync.start().await;
    assert!(handle.is_live());

    grid.place(Coord::new(6, 0), letter('S'), true);
    handle.shutdown().await;

    assert_eq!(store.save_count(), 1);
    assert_eq!(store.load().await.unwrap().len(), 11);
}

#[tokio::test(start_paused = true)]
async fn failed_subscription_keeps_pushing() {
    let store = Arc::new(
        FlakyStore::new(MemorySnapshotStore::with_cells(&seed_cells()).unwrap())
            .failing_subscribe(),
    );
    let (grid, sync) = reconciler(store.clone());
    sync.bootstrap().await;
    let handle = sync.start().await;
    assert!(!handle.is_live());

    grid.place(Coord::new(6, 0), letter('S'), true);
    sleep(TEST_DEBOUNCE * 2).await;
    assert_eq!(store.inner().save_count(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn two_sessions_converge_through_a_shared_store() {
    let shared = MemorySnapshotStore::new();
    let alice = session(Arc::new(shared.clone()), Arc::new(ScriptedValidator::accepting())).await;
    let bob = session(Arc::new(shared.clone()), Arc::new(ScriptedValidator::accepting())).await;
    assert_eq!(alice.bootstrap, BootstrapOutcome::Seeded);
    assert!(matches!(bob.bootstrap, BootstrapOutcome::Adopted { cells: 10 }));
    assert!(alice.is_live().await);
    sleep(Duration::from_millis(10)).await;

    let now = OffsetDateTime::now_utc();
    play::select_cell(&alice, Coord::new(6, 0)).unwrap();
    play::type_letters(&alice, "s").unwrap();
    assert!(play::submit_word(&alice, now).await.is_accepted());

    sleep(TEST_DEBOUNCE * 2).await;
    assert_eq!(
        bob.grid.letter_at(Coord::new(6, 0)).map(Letter::as_char),
        Some('S')
    );

    play::select_cell(&bob, Coord::new(3, -1)).unwrap();
    play::toggle_direction(&bob);
    // The A is already on the grid; typing it just moves the cursor on.
    assert_eq!(play::type_letters(&bob, "bat").unwrap(), 3);
    assert_eq!(play::view(&bob, now).pending.len(), 2);
    let outcome = play::submit_word(&bob, now).await;
    assert!(outcome.is_accepted(), "{outcome:?}");

    sleep(TEST_DEBOUNCE * 2).await;
    assert!(alice.grid.same_contents(&bob.grid.cells()));
    assert_eq!(alice.grid.confirmed_count(), 13);

    alice.shutdown().await;
    bob.shutdown().await;
}
