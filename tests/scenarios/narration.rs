//! Narration scenarios
//!
//! Who reads which line once a round has been rendered

use skirmish::combat::{CombatStats, RESPAWN_NOTICE};

use crate::harness::{MaxRng, TestArena};

/// Test: Each fighter reads their own swing first-person and the other's third-person
#[tokio::test]
async fn test_group_narration_between_two_players() {
    let arena = TestArena::new();
    let (alice, alice_out) = arena.player("Alice", CombatStats::new(30, 10, 20, 8));
    let (bob, bob_out) = arena.player("Bob", CombatStats::new(30, 10, 20, 2));
    let (_carol, carol_out) = arena.player("Carol", CombatStats::new(30, 10, 20, 2));
    let gob = arena.mobile("goblin", "Goblin", CombatStats::new(100, 5, 15, 0), true);
    let scheduler = arena.scheduler(MaxRng);

    let mut encounter = scheduler.new_encounter();
    encounter.add_player(alice);
    encounter.add_player(bob);
    encounter.add_mobile(gob);
    scheduler.start_encounter(encounter).await.unwrap();
    scheduler.tick().await;

    // the aggressive goblin swings first, at Bob
    assert_eq!(
        alice_out.text(),
        "You nick Goblin for 9 damage!\n\
         Goblin barely hits Bob.\n\
         Bob nicks Goblin.\n"
    );
    assert_eq!(
        bob_out.text(),
        "Alice nicks Goblin.\n\
         Goblin barely hits you for 1 damage!\n\
         You nick Goblin for 3 damage!\n"
    );
    assert_eq!(
        carol_out.text(),
        "Goblin is fighting Bob!\n\
         Alice is fighting Goblin!\n\
         Bob is fighting Goblin!\n"
    );
}

/// Test: One delivery per fighter per round, bystanders once
#[tokio::test]
async fn test_one_delivery_per_round() {
    let arena = TestArena::new();
    let (alice, alice_out) = arena.player("Alice", CombatStats::new(30, 10, 20, 8));
    let (bob, bob_out) = arena.player("Bob", CombatStats::new(30, 10, 20, 2));
    let (_carol, carol_out) = arena.player("Carol", CombatStats::new(30, 10, 20, 2));
    let gob = arena.mobile("goblin", "Goblin", CombatStats::new(100, 5, 15, 0), false);
    let scheduler = arena.scheduler(MaxRng);

    let mut encounter = scheduler.new_encounter();
    encounter.add_player(alice);
    encounter.add_player(bob);
    encounter.add_mobile(gob);
    scheduler.start_encounter(encounter).await.unwrap();

    scheduler.tick().await;
    scheduler.tick().await;
    assert_eq!(alice_out.deliveries(), 2);
    assert_eq!(bob_out.deliveries(), 2);
    assert_eq!(carol_out.deliveries(), 2);
}

/// Test: The killer reads "You killed", everyone else reads "is DEAD"
#[tokio::test]
async fn test_killing_blow() {
    let arena = TestArena::new();
    let (alice, alice_out) = arena.player("Alice", CombatStats::new(30, 10, 20, 8));
    let (bob, bob_out) = arena.player("Bob", CombatStats::new(30, 10, 20, 2));
    let (_carol, carol_out) = arena.player("Carol", CombatStats::new(30, 10, 20, 2));
    let gob = arena.mobile("goblin", "Goblin", CombatStats::new(5, 5, 15, 5), false);
    let scheduler = arena.scheduler(MaxRng);

    let mut encounter = scheduler.new_encounter();
    encounter.add_player(alice);
    encounter.add_player(bob);
    encounter.add_mobile(gob);
    let shared = scheduler.start_encounter(encounter).await.unwrap();
    scheduler.tick().await;

    assert_eq!(
        alice_out.text(),
        "You eviscerate Goblin for 9 damage!\nYou killed Goblin!!!\n"
    );
    assert_eq!(bob_out.text(), "Alice eviscerates Goblin.\nGoblin is DEAD!!!\n");
    assert!(!bob_out.text().contains("You killed"));
    assert_eq!(carol_out.text(), "Alice is fighting Goblin!\nGoblin is DEAD!!!\n");

    // gone from the mob set before the next tick
    assert!(!shared.lock().contains_mobile("goblin"));
    let report = scheduler.tick().await;
    assert_eq!(report.ended.len(), 1);
    assert_eq!(arena.hooks.deaths(), vec!["goblin".to_string()]);
}

/// Test: A destroyed player is told they respawned; the others see them fall
#[tokio::test]
async fn test_player_death_narration() {
    let arena = TestArena::new();
    let (bob, bob_out) = arena.player("Bob", CombatStats::new(40, 10, 20, 2));
    let (alice, alice_out) = arena.player("Alice", CombatStats::new(20, 10, 20, 8).with_hit_points(1));
    let (_carol, carol_out) = arena.player("Carol", CombatStats::new(30, 10, 20, 2));
    let ogre = arena.mobile("ogre", "Ogre", CombatStats::new(60, 5, 30, 30), true);
    let scheduler = arena.scheduler(MaxRng);

    let mut encounter = scheduler.new_encounter();
    encounter.add_player(bob);
    encounter.add_player(alice.clone());
    encounter.add_mobile(ogre);
    let shared = scheduler.start_encounter(encounter).await.unwrap();
    scheduler.tick().await;

    let alice_text = alice_out.text();
    assert!(alice_text.contains("Ogre eviscerates you for 31 damage!\n"), "{}", alice_text);
    assert!(alice_text.contains(&format!("You are DEAD!!!{}\n", RESPAWN_NOTICE)), "{}", alice_text);
    assert!(alice_text.contains("Bob barely hits Ogre.\n"), "{}", alice_text);

    assert_eq!(
        bob_out.text(),
        "You barely hit Ogre for 3 damage!\n\
         Ogre eviscerates Alice.\n\
         Alice is DEAD!!!\n"
    );
    assert!(carol_out.text().contains("Alice is DEAD!!!\n"));

    assert_eq!(shared.lock().initiative_order(), vec!["bob".to_string()]);
    assert_eq!(arena.hooks.deaths(), vec!["alice".to_string()]);
    // the fallen player never swung
    assert_eq!(arena.hooks.experience(), vec![("bob".to_string(), 3)]);
}
