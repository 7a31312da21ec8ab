use hideous_truths::{
    GameConfig, GameWorld, PlayerIntent,
    save::SaveError,
};

fn temp_save(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("hideous-truths-{}-{name}.json", std::process::id()))
}

fn played_world() -> GameWorld {
    let mut world = GameWorld::new_game(GameConfig::default(), 777);
    for intent in [
        PlayerIntent::MoveOrAttack { dx: 1, dy: 0 },
        PlayerIntent::MoveOrAttack { dx: 0, dy: 1 },
        PlayerIntent::Wait,
    ] {
        world.apply_intent(intent);
    }
    world
}

#[test]
fn save_and_load_round_trip() {
    let world = played_world();
    let path = temp_save("round-trip");
    world.save_to_path(&path).unwrap();
    let loaded = GameWorld::load_from_path(&path, 1).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(*loaded.map(), *world.map());
    assert_eq!(loaded.depth(), world.depth());
    assert_eq!(loaded.phase(), world.phase());
    assert_eq!(loaded.player_level(), world.player_level());
    assert_eq!(loaded.objects().len(), world.objects().len());
    for (old, new) in world.objects().iter().zip(loaded.objects()) {
        assert_eq!(world.name(*old), loaded.name(*new));
        assert_eq!(world.position(*old), loaded.position(*new));
        assert_eq!(world.fighter(*old), loaded.fighter(*new));
        assert_eq!(world.ai(*old), loaded.ai(*new));
        assert_eq!(world.item(*old), loaded.item(*new));
    }
    assert_eq!(loaded.inventory_labels(), world.inventory_labels());

    let texts = |w: &GameWorld| w.messages().into_iter().map(|l| l.text).collect::<Vec<_>>();
    assert_eq!(texts(&loaded), texts(&world));
}

#[test]
fn player_and_stairs_resolve_into_the_object_list() {
    let world = played_world();
    let loaded = GameWorld::restore(world.snapshot().unwrap(), 1).unwrap();
    let player_slot = world.objects().iter().position(|e| *e == world.player());
    let stairs_slot = world.objects().iter().position(|e| *e == world.stairs());
    assert_eq!(
        loaded.objects().iter().position(|e| *e == loaded.player()),
        player_slot
    );
    assert_eq!(
        loaded.objects().iter().position(|e| *e == loaded.stairs()),
        stairs_slot
    );
    assert_eq!(
        loaded
            .objects()
            .iter()
            .filter(|e| loaded.name(**e) == "player")
            .count(),
        1
    );
}

#[test]
fn loaded_game_keeps_playing() {
    let world = played_world();
    let mut loaded = GameWorld::restore(world.snapshot().unwrap(), 9).unwrap();
    let player = loaded.player();
    assert!(loaded.is_visible(loaded.player_point()));
    assert_eq!(loaded.power(player), world.power(world.player()));
    loaded.apply_intent(PlayerIntent::Wait);
    loaded.apply_intent(PlayerIntent::UseItem { index: 0 });
    assert_eq!(loaded.power(player), world.power(world.player()) - 2);
}

#[test]
fn missing_save_reports_not_found() {
    let path = temp_save("missing");
    let _ = std::fs::remove_file(&path);
    let err = GameWorld::load_from_path(&path, 1).err();
    assert!(matches!(err, Some(SaveError::NotFound(_))));
}

#[test]
fn garbage_save_is_a_json_error() {
    let path = temp_save("garbage");
    std::fs::write(&path, "{ not json").unwrap();
    let err = GameWorld::load_from_path(&path, 1).err();
    let _ = std::fs::remove_file(&path);
    assert!(matches!(err, Some(SaveError::Json(_))));
}
