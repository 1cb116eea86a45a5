mod common;

use common::*;
use pogo_battle_sim::battle_log::LogEntry;
use pogo_battle_sim::data::GameData;
use pogo_battle_sim::event::{EventKind, EventName};
use pogo_battle_sim::formulas::{cp_from_base, BaseStats, Ivs};
use pogo_battle_sim::model::{BattleConfig, Role};
use pogo_battle_sim::{BattleOptions, ConfigError, InvariantKind, SimError, World};
use serde_json::json;

fn run<'d>(config: &BattleConfig, data: &'d GameData) -> World<'d> {
    let mut world = World::new(config, data, BattleOptions::default()).expect("world should build");
    world.battle().expect("battle should finish");
    world
}

fn entries<'a>(world: &'a World<'_>, player: usize, name: EventName) -> Vec<&'a LogEntry> {
    world
        .log()
        .iter()
        .filter(|e| e.player == player && e.name == name)
        .collect()
}

#[test]
fn raid_attackers_fire_charged_move_once_energy_allows() {
    let data = flat_data();
    let perfect = || {
        let base = mon("Striker", "Jab", "Blast");
        let base = with(base, "atkiv", json!(15));
        let base = with(base, "defiv", json!(15));
        with(base, "stmiv", json!(15))
    };
    let config = config(
        "raid",
        20_000,
        vec![
            player("0", vec![party(false, vec![perfect()])]),
            player("0", vec![party(false, vec![perfect()])]),
            player("1", vec![party(false, vec![raid_boss("Tank", "Poke", "Nudge")])]),
        ],
    );
    let world = run(&config, &data);

    for attacker in 0..2 {
        let charged: Vec<_> = entries(&world, attacker, EventName::Damage)
            .into_iter()
            .filter(|e| e.value == "Blast")
            .collect();
        assert!(!charged.is_empty());
        // Five Jabs of 10 energy, each 1000ms plus 25ms lag, then 100ms charged lag.
        let t_action = charged[0].t - 1500;
        assert_eq!(t_action, 8225);
        assert!((t_action - 3000 - 5 * 1000).abs() <= 1000);

        let fast: Vec<_> = entries(&world, attacker, EventName::Damage)
            .into_iter()
            .filter(|e| e.value == "Jab")
            .map(|e| e.t)
            .take(5)
            .collect();
        assert_eq!(fast, vec![3525, 4550, 5575, 6600, 7625]);
    }
    assert!(world.pokemon(2).unwrap().hp < world.pokemon(2).unwrap().max_hp);
}

#[test]
fn gym_defender_knockout_resets_the_clock() {
    let data = flat_data();
    let defender = with(mon("Paper", "Poke", "Nudge"), "role", json!("gd"));
    let config = config(
        "gym",
        0,
        vec![
            player("0", vec![party(false, vec![mon("Striker", "Slam", "Blast")])]),
            player("1", vec![party(false, vec![defender])]),
        ],
    );
    let world = run(&config, &data);

    let defender = world.pokemon(1).unwrap();
    assert_eq!(defender.max_hp, 14);
    assert!(!defender.is_alive());
    assert_eq!(world.defeated_team(), Some("1"));
    assert_eq!(world.t(), 0);
    assert_eq!(world.battle_duration_ms(), 325);

    let hits = entries(&world, 0, EventName::Damage);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].t, 3325);
    assert_eq!(hits[0].rival_hp, vec![None, Some(0)]);

    let stats = world.statistics();
    assert_eq!(stats.general_stat.battle_result, 1);
    assert_eq!(stats.general_stat.tdo, 14);
    assert_eq!(stats.general_stat.tdo_percent, 100.0);
    assert!((stats.general_stat.duration - 0.325).abs() < 1e-9);
    assert_eq!(stats.pokemon_stats[0][0][0].duration, 0.325);
    assert_eq!(stats.pokemon_stats[1][0][0].num_of_deaths, 1);
    assert_eq!(stats.player_stats[0].name, "Player 1");
}

#[test]
fn simultaneous_pvp_charged_moves_are_serialized() {
    let data = flat_data();
    let config = config(
        "pvp",
        60_000,
        vec![
            player("0", vec![party(false, vec![mon("Tank", "Jab", "Blast")])]),
            player("1", vec![party(false, vec![mon("Tank", "Jab", "Blast")])]),
        ],
    );
    let world = run(&config, &data);
    let minigame = data.settings.minigame_duration_ms;

    let charged: Vec<&LogEntry> = world
        .log()
        .iter()
        .filter(|e| e.name == EventName::Damage && e.value == "Blast")
        .collect();
    assert!(charged.len() >= 2);
    let (first, second) = (charged[0], charged[1]);
    assert_ne!(first.player, second.player);
    assert_eq!(second.t - first.t, minigame);

    let start = first.t - minigame / 2;
    assert_eq!(start, 8000);
    let between: Vec<i64> = world
        .log()
        .iter()
        .filter(|e| e.name == EventName::Damage && e.t > start && e.t < start + 2 * minigame)
        .map(|e| e.t)
        .collect();
    assert_eq!(between, vec![first.t, second.t]);
}

#[test]
fn pvp_shield_code_tanks_then_shields() {
    let data = flat_data();
    let shielder = with(mon("Tank", "Poke", "Blast"), "strategy2", json!("1,0"));
    let config = config(
        "pvp",
        36_000,
        vec![
            player("0", vec![party(false, vec![mon("Tank", "Jab", "Blast")])]),
            player("1", vec![party(false, vec![shielder])]),
        ],
    );
    let world = run(&config, &data);

    let decisions: Vec<(i64, EventName)> = world
        .log()
        .iter()
        .filter(|e| e.player == 1 && matches!(e.name, EventName::Protect | EventName::Nothing))
        .map(|e| (e.t, e.name))
        .collect();
    assert_eq!(
        decisions,
        vec![(8000, EventName::Nothing), (23_000, EventName::Protect)]
    );
    assert_eq!(world.players()[1].protect_shields_left, 1);
    assert_eq!(world.pokemon(1).unwrap().num_charged_attacks, 0);
    assert_eq!(world.pokemon(0).unwrap().num_charged_attacks, 2);
}

#[test]
fn pvp_damage_uses_attack_bonus_and_grants_no_energy() {
    let mut data = flat_data();
    data.settings.energy_delta_per_health_lost = 0.5;
    let config = config(
        "pvp",
        10_000,
        vec![
            player("0", vec![party(false, vec![mon("Tank", "Jab", "Blast")])]),
            player("1", vec![party(false, vec![mon("Tank", "Poke", "Blast")])]),
        ],
    );
    let world = run(&config, &data);
    let jab = entries(&world, 0, EventName::Damage);
    assert!(!jab.is_empty());
    // floor(0.5 * 5 * 1.3) + 1
    let target = world.pokemon(1).unwrap();
    assert_eq!(target.max_hp - target.hp, 4 * jab.len() as i32);
    assert_eq!(target.energy, 0);
    assert_eq!(world.pokemon(0).unwrap().fast_move_lag_ms, 0);
}

#[test]
fn same_seed_gives_same_battle() {
    let data = flat_data();
    let config = config(
        "raid",
        60_000,
        vec![
            player("0", vec![party(false, vec![mon("Striker", "Jab", "Blast")])]),
            player("1", vec![party(false, vec![raid_boss("Tank", "Jab", "Blast")])]),
        ],
    );
    let options = BattleOptions {
        seed: 99,
        ..BattleOptions::default()
    };
    let mut a = World::new(&config, &data, options).unwrap();
    let mut b = World::new(&config, &data, options).unwrap();
    a.battle().unwrap();
    b.battle().unwrap();
    assert!(!a.log().is_empty());
    assert_eq!(a.log(), b.log());

    let first = a.log().to_vec();
    a.init();
    a.battle().unwrap();
    assert_eq!(a.log(), first.as_slice());
}

#[test]
fn immortal_boss_without_time_limit_hits_event_cap() {
    let data = flat_data();
    let boss = with(raid_boss("Tank", "Poke", "Nudge"), "immortal", json!(true));
    let config = config(
        "raid",
        0,
        vec![
            player("0", vec![party(true, vec![mon("Tank", "Jab", "Blast")])]),
            player("1", vec![party(false, vec![boss])]),
        ],
    );
    let options = BattleOptions {
        seed: 1,
        max_events: 500,
    };
    let mut world = World::new(&config, &data, options).unwrap();
    let result = world.battle();
    assert!(matches!(
        result,
        Err(SimError::EventCapExceeded { limit: 500, .. })
    ));
    assert!(world.pokemon(1).unwrap().is_alive());
}

#[test]
fn fainted_attacker_is_revived_after_relobby_delay() {
    let data = flat_data();
    let config = config(
        "raid",
        40_000,
        vec![
            player("0", vec![party(true, vec![mon("Paper", "Jab", "Blast")])]),
            player("1", vec![party(false, vec![raid_boss("Brute", "Crush", "Nudge")])]),
        ],
    );
    let world = run(&config, &data);

    let knockouts: Vec<i64> = entries(&world, 1, EventName::Damage)
        .into_iter()
        .filter(|e| e.rival_hp[0].is_some_and(|hp| hp <= 0))
        .map(|e| e.t)
        .collect();
    let enters: Vec<(i64, String)> = entries(&world, 0, EventName::Enter)
        .into_iter()
        .map(|e| (e.t, e.value.clone()))
        .collect();
    assert_eq!(knockouts[0], 4000);
    assert_eq!(enters[0], (3000, "0".to_string()));
    // rejoin + item menu + one revive
    assert_eq!(enters[1], (4000 + 10_000 + 5800 + 800, "0".to_string()));
    assert!(world.pokemon(0).unwrap().deaths >= 1);
    assert_eq!(world.defeated_team(), None);
}

#[test]
fn next_party_enters_after_rejoin_then_team_is_defeated() {
    let data = flat_data();
    let config = config(
        "raid",
        120_000,
        vec![
            player(
                "0",
                vec![
                    party(false, vec![mon("Paper", "Jab", "Blast")]),
                    party(false, vec![mon("Paper", "Jab", "Blast")]),
                ],
            ),
            player("1", vec![party(false, vec![raid_boss("Brute", "Crush", "Nudge")])]),
        ],
    );
    let world = run(&config, &data);

    let enters: Vec<(i64, String)> = entries(&world, 0, EventName::Enter)
        .into_iter()
        .map(|e| (e.t, e.value.clone()))
        .collect();
    assert_eq!(enters[0], (3000, "0".to_string()));
    assert_eq!(enters[1], (14_000, "1".to_string()));
    assert_eq!(world.defeated_team(), Some("0"));
    let stats = world.statistics();
    assert_eq!(stats.general_stat.battle_result, 0);
    assert_eq!(stats.general_stat.num_of_deaths, 2);
    assert_eq!(stats.party_stats[0].len(), 2);
}

#[test]
fn copies_expand_into_separate_members() {
    let data = flat_data();
    let copies = with(mon("Paper", "Jab", "Blast"), "copies", json!(3));
    let config = config(
        "raid",
        30_000,
        vec![
            player("0", vec![party(false, vec![copies])]),
            player("1", vec![party(false, vec![raid_boss("Brute", "Crush", "Nudge")])]),
        ],
    );
    let world = World::new(&config, &data, BattleOptions::default()).unwrap();
    assert_eq!(world.all_pokemon().len(), 4);
    assert_eq!(world.players()[0].parties[0].members, vec![0, 1, 2]);
    assert_eq!(world.players()[1].parties[0].members, vec![3]);
    assert_eq!(world.pending_events().count(), 2);
}

#[test]
fn scheduled_switch_is_validated_and_applied() {
    let data = flat_data();
    let config = config(
        "raid",
        30_000,
        vec![
            player(
                "0",
                vec![party(
                    false,
                    vec![mon("Striker", "Jab", "Blast"), mon("Tank", "Jab", "Blast")],
                )],
            ),
            player("1", vec![party(false, vec![raid_boss("Tank", "Poke", "Nudge")])]),
        ],
    );
    let mut world = World::new(&config, &data, BattleOptions::default()).unwrap();
    let invalid = |result: Result<(), SimError>| {
        matches!(
            result,
            Err(SimError::Invariant {
                kind: InvariantKind::InvalidSwitch(_),
                ..
            })
        )
    };
    assert!(invalid(world.schedule_switch(0, 0, 5000)));
    assert!(invalid(world.schedule_switch(0, 2, 5000)));
    assert!(invalid(world.schedule_switch(0, 1, 1000)));
    assert!(invalid(world.schedule_switch(7, 1, 5000)));
    world.schedule_switch(0, 1, 5000).unwrap();
    world.battle().unwrap();

    let switches = entries(&world, 0, EventName::Switch);
    assert_eq!(switches.len(), 1);
    assert_eq!(switches[0].t, 5000);
    assert_eq!(switches[0].value, "1");
    assert_eq!(world.players()[0].head(), 1);
    assert_eq!(world.pokemon(0).unwrap().active_duration_ms, 2000);
    assert_eq!(world.players()[0].switching_cooldown_expiration, 65_000);
}

#[test]
fn switch_scheduled_before_a_faint_is_dropped() {
    let data = flat_data();
    let config = config(
        "raid",
        30_000,
        vec![
            player(
                "0",
                vec![party(
                    false,
                    vec![mon("Paper", "Jab", "Blast"), mon("Tank", "Jab", "Blast")],
                )],
            ),
            player("1", vec![party(false, vec![raid_boss("Brute", "Crush", "Nudge")])]),
        ],
    );
    let mut world = World::new(&config, &data, BattleOptions::default()).unwrap();
    world.schedule_switch(0, 1, 5000).unwrap();

    // Paper faints at 4000 and Tank enters at 5000, on the switch's tick.
    while world.t() <= 5000 && world.step().unwrap() {}
    let tank_frees = world
        .pending_events()
        .filter(|e| e.subject == 1 && matches!(e.kind, EventKind::Free))
        .count();
    assert_eq!(tank_frees, 1);

    world.battle().unwrap();
    assert!(entries(&world, 0, EventName::Switch).is_empty());
    let enters: Vec<(i64, String)> = entries(&world, 0, EventName::Enter)
        .into_iter()
        .map(|e| (e.t, e.value.clone()))
        .collect();
    assert_eq!(enters[..2], [(3000, "0".to_string()), (5000, "1".to_string())]);
    assert_eq!(world.players()[0].head(), 1);
    assert_eq!(world.pokemon(0).unwrap().active_duration_ms, 1000);

    let hits: Vec<i64> = entries(&world, 0, EventName::Damage)
        .into_iter()
        .map(|e| e.t)
        .filter(|&t| t > 5000)
        .collect();
    assert!(!hits.is_empty());
    assert!(hits.windows(2).all(|w| w[1] - w[0] >= 1000));
}

#[test]
fn dodger_reads_boss_broadcasts_and_softens_hits() {
    let data = flat_data();
    let dodger = with(mon("Tank", "Jab", "Blast"), "strategy", json!("strat3"));
    let config = config(
        "raid",
        60_000,
        vec![
            player("0", vec![party(false, vec![dodger])]),
            player("1", vec![party(false, vec![raid_boss("Brute", "Crush", "Nudge")])]),
        ],
    );
    let world = run(&config, &data);
    let settings = &data.settings;

    let dodges: Vec<i64> = entries(&world, 0, EventName::Dodge)
        .into_iter()
        .map(|e| e.t)
        .collect();
    assert!(!dodges.is_empty());

    let mut hp = world.pokemon(0).unwrap().max_hp;
    let mut hits = Vec::new();
    for entry in entries(&world, 1, EventName::Damage) {
        let Some(after) = entry.rival_hp[0] else { continue };
        if after <= 0 {
            break;
        }
        if entry.value == "Crush" {
            hits.push((entry.t, hp - after));
        }
        hp = after;
    }
    let full = hits.iter().map(|&(_, dmg)| dmg).max().unwrap();
    let softened =
        ((full as f64 * (1.0 - settings.dodge_damage_reduction_percent)).floor() as i32).max(1);
    assert!(softened < full);
    assert_eq!(hits[0].1, full);

    let dodged: Vec<i64> = hits
        .iter()
        .filter(|&&(_, dmg)| dmg == softened)
        .map(|&(t, _)| t)
        .collect();
    assert!(!dodged.is_empty());
    assert!(hits.iter().all(|&(_, dmg)| dmg == full || dmg == softened));
    for t in dodged {
        assert!(dodges
            .iter()
            .any(|&d| d <= t && t < d + settings.dodge_window_ms));
    }
}

#[test]
fn friendship_bonus_is_copied_onto_every_member() {
    let data = flat_data();
    let mut friends = player(
        "0",
        vec![party(false, vec![with(mon("Paper", "Jab", "Blast"), "copies", json!(2))])],
    );
    friends["friend"] = json!("best");
    let mut explicit = player("0", vec![party(false, vec![mon("Striker", "Jab", "Blast")])]);
    explicit["fab"] = json!(1.25);
    let config = config(
        "raid",
        30_000,
        vec![
            friends,
            explicit,
            player("1", vec![party(false, vec![raid_boss("Tank", "Poke", "Nudge")])]),
        ],
    );
    let world = World::new(&config, &data, BattleOptions::default()).unwrap();
    let bonus = |id| world.pokemon(id).unwrap().stats.friend_bonus;
    assert_eq!(bonus(0), 1.1);
    assert_eq!(bonus(1), 1.1);
    assert_eq!(bonus(2), 1.25);
    assert_eq!(bonus(3), 1.0);
}

#[test]
fn original_role_codes_build_immortal_bosses_and_cp_attackers() {
    let data = flat_data();
    let levels = &data.levels;
    let paper = BaseStats {
        atk: 100.0,
        def: 100.0,
        stm: 10.0,
    };
    let cp = cp_from_base(&paper, Ivs::uniform(15), levels.cpm(20.0).unwrap());
    let attacker = json!({
        "name": "Paper", "role": "a_basic", "cp": cp, "fmove": "Jab", "cmove": "Blast",
    });
    let boss = with(raid_boss("Tank", "Poke", "Nudge"), "role", json!("RB"));
    let config = config(
        "raid",
        30_000,
        vec![
            player("0", vec![party(false, vec![attacker])]),
            player("1", vec![party(false, vec![boss])]),
        ],
    );
    let world = World::new(&config, &data, BattleOptions::default()).unwrap();
    let attacker = world.pokemon(0).unwrap();
    assert_eq!(attacker.role, Role::Attacker);
    assert!(attacker.level.is_some_and(|level| level <= 20.0));
    assert!(!attacker.immortal);
    let boss = world.pokemon(1).unwrap();
    assert_eq!(boss.role, Role::RaidBoss);
    assert!(boss.immortal);
}

#[test]
fn bad_configs_fail_before_the_battle_starts() {
    let data = flat_data();
    let build = |players| World::new(&config("raid", 0, players), &data, BattleOptions::default()).err();

    assert!(matches!(build(vec![]), Some(SimError::Config(ConfigError::NoPlayers))));
    assert!(matches!(
        build(vec![player("0", vec![party(false, vec![mon("Missingno", "Jab", "Blast")])])]),
        Some(SimError::Config(ConfigError::UnknownSpecies(_)))
    ));
    assert!(matches!(
        build(vec![player("0", vec![party(false, vec![mon("Paper", "Jab", "Hyper Beam")])])]),
        Some(SimError::Config(ConfigError::UnknownChargedMove(_)))
    ));
    assert!(matches!(
        build(vec![player("0", vec![party(false, vec![])])]),
        Some(SimError::Config(ConfigError::EmptyParty { player: 0, party: 0 }))
    ));
    assert!(matches!(
        build(vec![player("0", vec![])]),
        Some(SimError::Config(ConfigError::NoParties { player: 0 }))
    ));
    let mut friendly = player("0", vec![party(false, vec![mon("Paper", "Jab", "Blast")])]);
    friendly["friend"] = json!("bestest");
    assert!(matches!(
        build(vec![friendly]),
        Some(SimError::Config(ConfigError::UnknownFriendship(_)))
    ));
    let no_cp = with(mon("Paper", "Jab", "Blast"), "level", json!(null));
    let no_cp = with(no_cp, "cp", json!(5));
    assert!(matches!(
        build(vec![player("0", vec![party(false, vec![no_cp])])]),
        Some(SimError::Config(ConfigError::NoLevelForCp { cp: 5, .. }))
    ));
}
