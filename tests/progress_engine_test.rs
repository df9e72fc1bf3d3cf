//! Integration tests for the progress update engine

mod common;

use common::{create_achievement, create_test_manager, open_manager, register_badges};
use learnquest::config::BadgePolicy;
use learnquest::progress::{ProgressEvent, ProgressManager, ProgressUpdate};
use learnquest::{ErrorKind, ProgressError};

/// XP, badge names and (achievement, progress, level) rows of a user
fn snapshot(manager: &ProgressManager, user: &str) -> (i64, Vec<String>, Vec<(i64, i64, i64)>) {
    let query = manager.query();
    let xp = query.get_xp(user).expect("xp");
    let badges = query
        .get_badges(user)
        .expect("badges")
        .into_iter()
        .map(|b| b.name)
        .collect();
    let achievements = query
        .get_achievements(user)
        .expect("achievements")
        .into_iter()
        .map(|a| (a.achievement_id, a.progress, a.level))
        .collect();
    (xp, badges, achievements)
}

#[test]
fn test_starter_badge_scenario() {
    let (_dir, manager) = create_test_manager(BadgePolicy::Required);
    register_badges(&manager, &["starter"]);
    let engine = manager.engine();
    let update = ProgressUpdate::new("u1").xp(50).badge("starter");

    let outcome = engine.apply_progress(&update).expect("first apply");
    assert_eq!(outcome.xp_total, 50);
    assert_eq!(manager.query().get_xp("u1").unwrap(), 50);
    assert_eq!(snapshot(&manager, "u1").1, vec!["starter"]);

    let err = engine.apply_progress(&update).unwrap_err();
    assert!(matches!(err, ProgressError::UserHasBadge { ref badge, .. } if badge == "starter"));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(manager.query().get_xp("u1").unwrap(), 50);
}

#[test]
fn test_empty_badge_list_rejected() {
    let (_dir, manager) = create_test_manager(BadgePolicy::Required);
    let streak = create_achievement(&manager, "Streak", &[20, 40]);

    let err = manager
        .engine()
        .apply_progress(&ProgressUpdate::new("u1").xp(10).achievement(streak, 5))
        .unwrap_err();
    assert!(matches!(err, ProgressError::BadgeNotProvided));
    assert_eq!(snapshot(&manager, "u1"), (0, vec![], vec![]));
}

#[test]
fn test_level_placement_through_engine() {
    let (_dir, manager) = create_test_manager(BadgePolicy::Required);
    register_badges(&manager, &["b1", "b2", "b3"]);
    let streak = create_achievement(&manager, "Streak", &[20, 40, 60, 80]);
    let empty = create_achievement(&manager, "Empty", &[]);
    let engine = manager.engine();

    engine
        .apply_progress(&ProgressUpdate::new("u1").badge("b1").achievement(streak, 10).achievement(empty, 7))
        .expect("first");
    let (_, _, rows) = snapshot(&manager, "u1");
    assert_eq!(rows, vec![(streak, 10, 1), (empty, 7, 0)]);

    engine
        .apply_progress(&ProgressUpdate::new("u1").badge("b2").achievement(streak, 60))
        .expect("second");
    assert_eq!(snapshot(&manager, "u1").2[0], (streak, 70, 4));

    let outcome = engine
        .apply_progress(&ProgressUpdate::new("u1").badge("b3").achievement(streak, 10))
        .expect("third");
    assert_eq!(snapshot(&manager, "u1").2[0], (streak, 80, 4));
    assert_eq!(outcome.level_changes().count(), 0);
}

#[test]
fn test_failure_at_each_step_leaves_state_unchanged() {
    let (_dir, manager) = create_test_manager(BadgePolicy::Required);
    register_badges(&manager, &["starter", "second", "third"]);
    let streak = create_achievement(&manager, "Streak", &[20, 40]);
    let engine = manager.engine();

    engine
        .apply_progress(&ProgressUpdate::new("u1").xp(50).badge("starter").achievement(streak, 15))
        .expect("baseline");
    let before = snapshot(&manager, "u1");

    // Badge step: unknown badge after a valid one
    let err = engine
        .apply_progress(&ProgressUpdate::new("u1").xp(5).badge("second").badge("ghost"))
        .unwrap_err();
    assert!(matches!(err, ProgressError::BadgeNotExists(_)));
    assert_eq!(snapshot(&manager, "u1"), before);

    // Achievement step: unknown achievement after a valid delta
    let err = engine
        .apply_progress(
            &ProgressUpdate::new("u1")
                .xp(5)
                .badge("second")
                .achievement(streak, 10)
                .achievement(9999, 1),
        )
        .unwrap_err();
    assert!(matches!(err, ProgressError::AchievementNotFound(9999)));
    assert_eq!(snapshot(&manager, "u1"), before);

    // Achievement step: progress would go negative
    let err = engine
        .apply_progress(&ProgressUpdate::new("u1").xp(5).badge("third").achievement(streak, -20))
        .unwrap_err();
    assert!(matches!(err, ProgressError::NegativeProgress { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(snapshot(&manager, "u1"), before);

    // Nothing rolled back stays half-applied: a valid retry succeeds
    engine
        .apply_progress(&ProgressUpdate::new("u1").xp(5).badge("second").achievement(streak, 10))
        .expect("retry");
    assert_eq!(snapshot(&manager, "u1").0, 55);
}

#[test]
fn test_negative_delta_checked_against_stored_progress() {
    let (_dir, manager) = create_test_manager(BadgePolicy::Optional);
    let streak = create_achievement(&manager, "Streak", &[20, 40]);
    let engine = manager.engine();

    engine
        .apply_progress(&ProgressUpdate::new("u1").achievement(streak, 25))
        .expect("earn");
    let outcome = engine
        .apply_progress(&ProgressUpdate::new("u1").achievement(streak, -10))
        .expect("partial revoke");
    assert_eq!(outcome.level_changes().collect::<Vec<_>>(), vec![(streak, 2, 1)]);
    assert_eq!(snapshot(&manager, "u1").2, vec![(streak, 15, 1)]);

    let err = engine
        .apply_progress(&ProgressUpdate::new("u1").achievement(streak, -16))
        .unwrap_err();
    assert!(matches!(err, ProgressError::NegativeProgress { achievement_id } if achievement_id == streak));
    assert_eq!(snapshot(&manager, "u1").2, vec![(streak, 15, 1)]);

    let err = engine
        .apply_progress(&ProgressUpdate::new("u2").achievement(streak, -1))
        .unwrap_err();
    assert!(matches!(err, ProgressError::NegativeProgress { .. }));
    assert_eq!(snapshot(&manager, "u2"), (0, vec![], vec![]));
}

#[test]
fn test_soft_deleted_achievement_rejected() {
    let (_dir, manager) = create_test_manager(BadgePolicy::Required);
    register_badges(&manager, &["starter"]);
    let old = create_achievement(&manager, "Old", &[10]);
    manager.catalog().soft_delete(old).expect("soft delete");

    let err = manager
        .engine()
        .apply_progress(&ProgressUpdate::new("u1").badge("starter").achievement(old, 1))
        .unwrap_err();
    assert!(matches!(err, ProgressError::AchievementNotFound(id) if id == old));
    assert_eq!(snapshot(&manager, "u1"), (0, vec![], vec![]));
}

#[test]
fn test_optional_policy_allows_xp_only_updates() {
    let (_dir, manager) = create_test_manager(BadgePolicy::Optional);
    let streak = create_achievement(&manager, "Streak", &[20, 40]);
    let engine = manager.engine();

    let outcome = engine
        .apply_progress(&ProgressUpdate::new("u1").xp(30))
        .expect("xp only");
    assert_eq!(outcome.events, vec![ProgressEvent::XpAwarded { amount: 30, total: 30 }]);

    let outcome = engine
        .apply_progress(&ProgressUpdate::new("u1").achievement(streak, 25))
        .expect("achievement only");
    assert_eq!(outcome.xp_total, 30);
    assert_eq!(snapshot(&manager, "u1"), (30, vec![], vec![(streak, 25, 2)]));

    let err = engine.apply_progress(&ProgressUpdate::new("u1")).unwrap_err();
    assert!(matches!(err, ProgressError::EmptyUpdate(ref user) if user == "u1"));
}

#[test]
fn test_leaderboard_ranks() {
    let (_dir, manager) = create_test_manager(BadgePolicy::Optional);
    let engine = manager.engine();
    for (user, xp) in [("ana", 120), ("bo", 300), ("cy", 50), ("di", 300)] {
        engine
            .apply_progress(&ProgressUpdate::new(user).xp(xp))
            .expect("apply");
    }

    let board = manager.query().get_xp_leaderboard(3).expect("leaderboard");
    assert_eq!(board.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(board.iter().map(|e| e.xp).collect::<Vec<_>>(), vec![300, 300, 120]);
    assert_eq!(board[2].user_id, "ana");

    let mut top_two: Vec<&str> = board[..2].iter().map(|e| e.user_id.as_str()).collect();
    top_two.sort();
    assert_eq!(top_two, vec!["bo", "di"]);
}

#[test]
fn test_concurrent_updates_sum_progress() {
    let (_dir, manager) = create_test_manager(BadgePolicy::Optional);
    let streak = create_achievement(&manager, "Streak", &[20, 40, 60, 80]);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = manager.engine();
            std::thread::spawn(move || {
                engine
                    .apply_progress(&ProgressUpdate::new("u1").xp(1).achievement(streak, 10))
                    .expect("apply")
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(snapshot(&manager, "u1"), (8, vec![], vec![(streak, 80, 4)]));
}

#[test]
fn test_concurrent_updates_across_connections() {
    let (dir, manager) = create_test_manager(BadgePolicy::Optional);
    let streak = create_achievement(&manager, "Streak", &[20, 40, 60, 80]);
    let db_path = dir.path().join("progress.db");

    let others: Vec<_> = (0..8)
        .map(|_| open_manager(&db_path, BadgePolicy::Optional))
        .collect();
    let handles: Vec<_> = others
        .into_iter()
        .map(|other| {
            std::thread::spawn(move || {
                other
                    .engine()
                    .apply_progress(&ProgressUpdate::new("u1").xp(1).achievement(streak, 10))
                    .expect("apply")
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(snapshot(&manager, "u1"), (8, vec![], vec![(streak, 80, 4)]));
}
