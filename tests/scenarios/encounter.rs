//! Encounter lifecycle scenarios
//!
//! Start, rounds, removal of the fallen and the end of the fight

use std::collections::HashMap;

use skirmish::combat::{CombatStats, EncounterPhase, SeededRng, Status};

use crate::harness::{MaxRng, ScriptedRng, TestArena};

fn fighter() -> CombatStats {
    CombatStats::new(30, 10, 20, 8)
}

fn goblin() -> CombatStats {
    CombatStats::new(10, 5, 15, 5)
}

/// Test: A lone player beats a passive goblin in two rounds, then the fight ends
#[tokio::test]
async fn test_lone_player_kills_goblin() {
    let arena = TestArena::new();
    let (alice, out) = arena.player("Alice", fighter());
    let gob = arena.mobile("goblin", "Goblin", goblin(), false);
    let scheduler = arena.scheduler(MaxRng);

    let mut encounter = scheduler.new_encounter();
    encounter.add_player(alice.clone());
    encounter.add_mobile(gob.clone());
    let shared = scheduler.start_encounter(encounter).await.unwrap();

    assert_eq!(alice.lock().status, Status::Fighting);
    assert_eq!(gob.lock().status, Status::Fighting);
    assert!(!shared.lock().is_aggro());

    // Round 1: 9 damage leaves the goblin on 1, it answers for 6
    let report = scheduler.tick().await;
    assert_eq!(report.rounds, 1);
    assert_eq!(gob.lock().stats.hit_points, 1);
    assert_eq!(alice.lock().stats.hit_points, 24);

    // Round 2: the goblin dies before it can swing
    let report = scheduler.tick().await;
    assert_eq!(report.rounds, 1);
    assert!(gob.lock().stats.hit_points <= 0);
    assert_eq!(gob.lock().status, Status::Dead);
    assert_eq!(alice.lock().stats.hit_points, 24);
    assert!(shared.lock().mobiles().is_empty());
    assert!(out.text().contains("You killed Goblin!!!"));

    // Tick 3: nothing left to fight
    let report = scheduler.tick().await;
    assert_eq!(report.rounds, 0);
    assert_eq!(report.ended, vec![shared.lock().id()]);
    assert_eq!(shared.lock().phase(), EncounterPhase::Ended);
    assert_eq!(alice.lock().status, Status::Standing);
    assert_eq!(scheduler.active_count().await, 0);

    assert_eq!(arena.hooks.deaths(), vec!["goblin".to_string()]);
    assert_eq!(
        arena.hooks.experience(),
        vec![("alice".to_string(), 9), ("alice".to_string(), 9)]
    );
}

/// Test: Hit points only ever go down and every fight eventually ends
#[tokio::test]
async fn test_random_fight_runs_to_completion() {
    let arena = TestArena::new();
    let (alice, _) = arena.player("Alice", CombatStats::new(60, 8, 12, 4));
    let (bob, _) = arena.player("Bob", CombatStats::new(60, 8, 12, 4));
    let wolf = arena.mobile("wolf", "Wolf", CombatStats::new(40, 6, 10, 3), true);
    let rat = arena.mobile("rat", "Rat", CombatStats::new(15, 4, 8, 2), false);
    let scheduler = arena.scheduler(SeededRng::from_seed(2024));

    let mut encounter = scheduler.new_encounter();
    encounter.add_player(alice.clone());
    encounter.add_player(bob.clone());
    encounter.add_mobile(wolf.clone());
    encounter.add_mobile(rat.clone());
    scheduler.start_encounter(encounter).await.unwrap();

    let mut last: HashMap<&str, i32> = HashMap::new();
    let mut ticks = 0;
    while scheduler.active_count().await > 0 {
        ticks += 1;
        assert!(ticks < 500, "fight never ended");
        scheduler.tick().await;

        let now = [
            ("alice", alice.lock().stats.hit_points),
            ("bob", bob.lock().stats.hit_points),
            ("wolf", wolf.lock().stats.hit_points),
            ("rat", rat.lock().stats.hit_points),
        ];
        for (key, hp) in now {
            if let Some(prev) = last.insert(key, hp) {
                assert!(hp <= prev, "{} healed from {} to {}", key, prev, hp);
                // largest damage roll is 4, two attackers per side
                assert!(prev - hp <= 10, "{} took {} in one round", key, prev - hp);
            }
        }
    }

    let players_down = alice.lock().stats.hit_points <= 0 && bob.lock().stats.hit_points <= 0;
    let mobiles_down = wolf.lock().stats.hit_points <= 0 && rat.lock().stats.hit_points <= 0;
    assert!(players_down || mobiles_down);
}

/// Test: A player who disconnects between rounds hears nothing more
#[tokio::test]
async fn test_removed_player_leaves_fight() {
    let arena = TestArena::new();
    let (alice, alice_out) = arena.player("Alice", fighter());
    let (bob, bob_out) = arena.player("Bob", fighter());
    let gob = arena.mobile("goblin", "Goblin", CombatStats::new(200, 5, 15, 0), false);
    let scheduler = arena.scheduler(MaxRng);

    let mut encounter = scheduler.new_encounter();
    encounter.add_player(alice.clone());
    encounter.add_player(bob.clone());
    encounter.add_mobile(gob);
    let shared = scheduler.start_encounter(encounter).await.unwrap();

    scheduler.tick().await;
    assert!(alice_out.take().contains("Bob "));
    assert!(bob_out.take().contains("Alice "));

    assert!(scheduler.remove_combatant("alice").await);
    assert_eq!(alice.lock().status, Status::Standing);
    assert_eq!(shared.lock().initiative_order(), vec!["bob".to_string()]);

    scheduler.tick().await;
    let text = bob_out.take();
    assert!(text.contains("for 9 damage"), "{}", text);
    assert!(!text.contains("Alice"), "{}", text);
    // no longer a fighter, but still in the room: only bystander text
    let alice_text = alice_out.take();
    assert!(!alice_text.contains("damage"), "{}", alice_text);
    assert!(alice_text.contains("Bob is fighting Goblin!"), "{}", alice_text);
}

/// Test: A player felled mid-round is not targeted again and is dropped only after delivery
#[tokio::test]
async fn test_fallen_player_not_targeted_again() {
    let arena = TestArena::new();
    let (alice, alice_out) = arena.player("Alice", CombatStats::new(20, 10, 20, 8).with_hit_points(1));
    let (bob, bob_out) = arena.player("Bob", fighter());
    let wolf = arena.mobile("wolf", "Wolf", CombatStats::new(50, 1, 15, 5), true);
    let rat = arena.mobile("rat", "Rat", CombatStats::new(50, 1, 15, 2), true);

    // Wolf: target 0 (Alice), to-hit 15, damage 5, verb 0
    // Rat: asks for target 1, but only Bob is left standing; to-hit 15, damage 2, verb 0
    // Bob: every remaining draw is 0
    let scheduler = arena.scheduler(ScriptedRng::new(&[0, 15, 5, 0, 1, 15, 2, 0]));

    let mut encounter = scheduler.new_encounter();
    encounter.add_player(alice.clone());
    encounter.add_player(bob.clone());
    encounter.add_mobile(wolf.clone());
    encounter.add_mobile(rat.clone());
    let shared = scheduler.start_encounter(encounter).await.unwrap();

    let report = scheduler.tick().await;
    assert_eq!(report.rounds, 1);

    assert_eq!(alice.lock().stats.hit_points, -5);
    assert_eq!(alice.lock().status, Status::MortallyWounded);
    assert_eq!(bob.lock().stats.hit_points, 27);
    assert_eq!(wolf.lock().stats.hit_points, 49);
    assert_eq!(rat.lock().stats.hit_points, 50);

    // Alice still hears the whole round she fell in
    assert_eq!(
        alice_out.take(),
        "Wolf annihilates you for 6 damage!\n\
         You are MORTALLY WOUNDED!!!\n\
         Rat dents Bob.\n\
         Bob nicks Wolf.\n"
    );
    assert_eq!(
        bob_out.take(),
        "Wolf annihilates Alice.\n\
         Alice is MORTALLY WOUNDED!!!\n\
         Rat dents you for 3 damage!\n\
         You nick Wolf for 1 damage!\n"
    );

    // then dropped from the fight; mortally wounded is not a final death
    assert_eq!(shared.lock().initiative_order(), vec!["bob".to_string()]);
    assert!(arena.hooks.deaths().is_empty());
    assert!(shared.lock().is_fighting());
}

/// Test: Ending every encounter at shutdown puts fighters back on their feet
#[tokio::test]
async fn test_end_all_on_shutdown() {
    let arena = TestArena::new();
    let (alice, _) = arena.player("Alice", fighter());
    let gob = arena.mobile("goblin", "Goblin", CombatStats::new(200, 5, 15, 0), true);
    let scheduler = arena.scheduler(MaxRng);

    let shared = scheduler
        .on_room_entry(alice.clone(), &*arena.room)
        .await
        .unwrap()
        .unwrap();
    scheduler.tick().await;

    assert_eq!(scheduler.end_all().await, 1);
    assert_eq!(shared.lock().phase(), EncounterPhase::Ended);
    assert_eq!(alice.lock().status, Status::Standing);
    assert_eq!(gob.lock().status, Status::Standing);
    assert_eq!(scheduler.active_count().await, 0);
}
