use std::sync::Arc;

use async_trait::async_trait;
use combat_core::{
    AttackDeclaration, AttackKind, CombatEvent, CombatState, DefenseKind, EncounterOutcome,
    EntityId, PlayerCommand,
};
use combat_runtime::{
    AutoPlayer, ControllerKind, EncounterRunner, Event, HostEvent, PlayerController,
    RuntimeConfig, RuntimeError, Scenario, ScriptedPlayer, TimedEffects, Topic, WeaponCatalog,
};
use tokio::sync::broadcast;

const DUEL: &str = r#"
Scenario(
    name: "alley duel",
    seed: 1234,
    map: (width: 30, height: 5),
    combatants: [
        (id: 0, name: "hero", controller: Player, position: (x: 1, y: 2, z: 0),
         main_hand: Some((weapon: 2))),
        (id: 7, name: "raider", team: 2, controller: Npc, position: (x: 4, y: 2, z: 0),
         main_hand: Some((weapon: 2))),
    ],
)
"#;

const STANDOFF: &str = r#"
Scenario(
    name: "standoff",
    map: (width: 30, height: 3),
    combatants: [
        (id: 0, name: "hero", controller: Player, position: (x: 0, y: 1, z: 0),
         main_hand: Some((weapon: 2))),
        (id: 7, name: "raider", team: 2, controller: Npc, position: (x: 29, y: 1, z: 0)),
    ],
)
"#;

fn config(max_rounds: u32) -> RuntimeConfig {
    RuntimeConfig {
        event_buffer_size: 1 << 16,
        max_rounds: Some(max_rounds),
        ..RuntimeConfig::default()
    }
}

fn runner(
    text: &str,
    config: RuntimeConfig,
    player: impl PlayerController + 'static,
) -> EncounterRunner {
    let scenario = Scenario::from_ron_str(text).expect("scenario parses");
    EncounterRunner::from_scenario(&scenario, config, TimedEffects::instant(), player)
}

fn auto_player() -> AutoPlayer {
    AutoPlayer::new(Arc::new(WeaponCatalog::standard()))
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

struct BrokenController;

#[async_trait]
impl PlayerController for BrokenController {
    async fn next_command(
        &self,
        _actor: EntityId,
        _state: &CombatState,
    ) -> combat_runtime::Result<PlayerCommand> {
        Err(RuntimeError::controller(ControllerKind::Command, "input device unplugged"))
    }

    async fn choose_defense(
        &self,
        _defender: EntityId,
        _attacker: EntityId,
        _attack: AttackKind,
        _state: &CombatState,
    ) -> combat_runtime::Result<DefenseKind> {
        Err(RuntimeError::controller(ControllerKind::Defense, "input device unplugged"))
    }
}

#[tokio::test]
async fn knife_duel_runs_to_an_outcome() {
    let mut runner = runner(DUEL, config(40), auto_player());
    let mut turns = runner.subscribe(Topic::Turn).unwrap();
    let mut host = runner.subscribe(Topic::Host).unwrap();

    let outcome = runner
        .run(&[EntityId::PLAYER, EntityId(7)])
        .await
        .expect("encounter completes");

    let turn_events = drain(&mut turns);
    assert!(matches!(
        turn_events.first(),
        Some(Event::Combat(CombatEvent::EncounterStarted { .. }))
    ));
    assert!(turn_events.iter().any(|e| matches!(
        e,
        Event::Combat(CombatEvent::EncounterEnded { .. })
    )));

    let host_events = drain(&mut host);
    assert!(matches!(
        host_events.last(),
        Some(Event::Host(HostEvent::EncounterFinished { outcome: reported, .. }))
            if *reported == outcome
    ));
    assert!(!runner.state().encounter.is_active());
}

#[tokio::test]
async fn same_seed_replays_the_same_encounter() {
    async fn play() -> Vec<Event> {
        let mut runner = runner(DUEL, config(20), auto_player());
        let mut combat = runner.subscribe(Topic::Combat).unwrap();
        runner
            .run(&[EntityId::PLAYER, EntityId(7)])
            .await
            .expect("encounter completes");
        drain(&mut combat)
    }

    let first = play().await;
    let second = play().await;
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn broken_controller_forfeits_turns_instead_of_ending_the_fight() {
    let mut runner = runner(STANDOFF, config(2), BrokenController);
    let mut turns = runner.subscribe(Topic::Turn).unwrap();
    let mut host = runner.subscribe(Topic::Host).unwrap();

    let outcome = runner
        .run(&[EntityId::PLAYER, EntityId(7)])
        .await
        .expect("controller failures are absorbed");
    assert_eq!(outcome, EncounterOutcome::Ended);

    assert!(drain(&mut host).iter().any(|e| matches!(
        e,
        Event::Host(HostEvent::ControllerFailed { actor, .. }) if *actor == EntityId::PLAYER
    )));
    assert!(drain(&mut turns).contains(&Event::Combat(CombatEvent::TurnEnded {
        actor: EntityId::PLAYER,
        forfeited: true,
    })));
}

#[tokio::test]
async fn repeated_refusals_end_the_players_turn() {
    let stab = PlayerCommand::Attack(AttackDeclaration::at(EntityId(7)));
    let player = ScriptedPlayer::new([stab, stab, stab], []);
    let mut runner = runner(STANDOFF, config(2), player);
    let mut combat = runner.subscribe(Topic::Combat).unwrap();
    let mut host = runner.subscribe(Topic::Host).unwrap();

    runner
        .run(&[EntityId::PLAYER, EntityId(7)])
        .await
        .expect("refusals are absorbed");

    let refusals = drain(&mut combat)
        .into_iter()
        .filter(|e| {
            matches!(e, Event::Combat(CombatEvent::Rejected { actor, .. }) if actor.is_player())
        })
        .count();
    assert_eq!(refusals, 3);
    assert!(drain(&mut host).contains(&Event::Host(HostEvent::RejectionLimit {
        actor: EntityId::PLAYER,
        rejections: 3,
    })));
}

#[tokio::test]
async fn lone_player_wins_immediately() {
    let mut runner = runner(STANDOFF, config(5), auto_player());
    let outcome = runner.run(&[EntityId::PLAYER]).await.unwrap();
    assert_eq!(outcome, EncounterOutcome::Victory);
}

#[tokio::test]
async fn exploration_follows_a_finished_encounter() {
    let mut runner = runner(STANDOFF, config(5), auto_player());
    let outcome = runner.run(&[EntityId(7)]).await.unwrap();
    assert_eq!(outcome, EncounterOutcome::Ended);

    assert!(runner.explore_step(EntityId(7)).is_ok());
}

#[tokio::test]
async fn scenario_file_on_disk_drives_a_runner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("duel.ron");
    std::fs::write(&path, DUEL).unwrap();

    let scenario = Scenario::load(&path).unwrap();
    let mut runner = EncounterRunner::from_scenario(
        &scenario,
        config(10),
        TimedEffects::instant(),
        auto_player(),
    );
    let outcome = runner.run(&scenario.participants()).await.unwrap();
    assert!(matches!(
        outcome,
        EncounterOutcome::Victory | EncounterOutcome::Defeat | EncounterOutcome::Ended
    ));
}

#[tokio::test]
async fn bundled_warehouse_demo_plays_out() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/warehouse.ron");
    let scenario = Scenario::load(path).unwrap();
    assert_eq!(scenario.participants().len(), 5);

    let mut runner = EncounterRunner::from_scenario(
        &scenario,
        config(20),
        TimedEffects::instant(),
        auto_player(),
    );
    assert!(runner.run(&scenario.participants()).await.is_ok());
}
