//! Campaign flow integration tests through the command interface

use std::sync::Arc;

use dcc_sim::core::commands::CampaignCommand;
use dcc_sim::core::components::{Aircraft, FlightGroup, Package};
use dcc_sim::core::data::DataStore;
use dcc_sim::core::enums::{AiSkill, Coalition, FlightGroupState, QueryKey, Task};
use dcc_sim::core::events::{CampaignEvent, MissionState};
use dcc_sim::engine::{CommandOutcome, EngineConfig};
use dcc_sim::serialization::SaveData;
use dcc_sim::{CampaignEngine, CampaignError};

fn engine(seed: u64) -> CampaignEngine {
    let data = Arc::new(DataStore::builtin().expect("builtin data store"));
    CampaignEngine::new(
        EngineConfig {
            seed,
            ..Default::default()
        },
        data,
    )
}

fn activate(engine: &mut CampaignEngine) {
    let command: CampaignCommand = serde_json::from_str(
        r#"{
            "type": "Activate",
            "blue_faction": "USA 1977",
            "red_faction": "Russia 1984",
            "scenario": "Operation Clear Field"
        }"#,
    )
    .unwrap();
    assert_eq!(engine.handle_command(command).unwrap(), CommandOutcome::Done);
}

#[test]
fn test_full_round() {
    let mut engine = engine(2024);
    activate(&mut engine);
    assert_eq!(engine.meta().ai_skill, AiSkill::Good);

    // Pick the first blue flight group that has not started and fly it.
    let timer = engine.timer();
    let state = engine.state().unwrap();
    let blue = state.faction(Coalition::Blue).unwrap();
    let (package_end, fg) = blue
        .packages
        .iter()
        .flat_map(|p| p.flight_groups.iter().map(move |fg| (p.end_time, fg)))
        .filter(|(_, fg)| fg.start_time > timer)
        .min_by(|a, b| a.1.start_time.total_cmp(&b.1.start_time))
        .map(|(end, fg)| (end, fg.clone()))
        .expect("a planned blue flight group");
    assert_eq!(fg.state, FlightGroupState::Planned);

    engine
        .handle_command(CampaignCommand::SelectFlightGroup {
            flight_group_id: Some(fg.id),
        })
        .unwrap();
    engine
        .handle_command(CampaignCommand::SetClient {
            flight_group_id: fg.id,
            count: 1,
        })
        .unwrap();

    while !engine.meta().paused {
        engine
            .handle_command(CampaignCommand::Tick { multiplier: 60.0 })
            .unwrap();
    }
    assert_eq!(engine.timer(), fg.start_time);

    let CommandOutcome::MissionId { mission_id } = engine
        .handle_command(CampaignCommand::GenerateMissionId)
        .unwrap()
    else {
        panic!("expected a mission id");
    };
    assert_eq!(mission_id.len(), 36);

    // The mission comes back with one enemy aircraft shot down.
    let victim = engine.world().query(Coalition::Red, QueryKey::AircraftIdle)[0];
    let report = MissionState {
        mission_id: Some(mission_id),
        time: package_end,
        killed_aircrafts: vec![victim],
        ..Default::default()
    };
    let outcome = engine
        .handle_command(CampaignCommand::SubmitMissionState { report })
        .unwrap();
    assert_eq!(outcome, CommandOutcome::MissionApplied { skipped: 0 });
    assert!(!engine.world().contains(victim));
    assert_eq!(engine.timer(), package_end);

    // The client package has landed and is gone.
    let client_package = engine
        .world()
        .iter::<Package>()
        .into_iter()
        .find(|(_, p)| p.flight_group_ids.contains(&fg.id));
    assert!(client_package.is_none());
    assert!(engine
        .drain_events()
        .iter()
        .any(|e| matches!(e, CampaignEvent::PackageCompleted { coalition: Coalition::Blue, .. })));

    let CommandOutcome::Saved { save } = engine
        .handle_command(CampaignCommand::SaveCampaignRound)
        .unwrap()
    else {
        panic!("expected save data");
    };
    assert_eq!(save.campaign.round, 1);
    assert!(engine.world().query_mismatches().is_empty());
}

#[test]
fn test_save_file_resumes_campaign() {
    let mut engine = engine(77);
    activate(&mut engine);
    for _ in 0..6 {
        engine.tick(300.0).unwrap();
        engine.resume();
    }
    let save = engine.save_campaign_round().unwrap();
    let json = serde_json::to_string_pretty(&save).unwrap();

    let parsed: SaveData = serde_json::from_str(&json).unwrap();
    let data = Arc::new(DataStore::builtin().unwrap());
    let mut resumed = CampaignEngine::restore(EngineConfig::default(), data, &parsed).unwrap();
    assert_eq!(resumed.timer(), engine.timer());
    assert_eq!(resumed.meta().round, 1);
    assert_eq!(resumed.world().len(), engine.world().len());

    // The restored campaign keeps running and stays consistent.
    for _ in 0..6 {
        resumed.tick(300.0).unwrap();
        resumed.resume();
    }
    assert!(resumed.world().query_mismatches().is_empty());
    for (_, fg) in resumed.world().iter::<FlightGroup>() {
        for id in &fg.aircraft_ids {
            assert!(resumed.world().get::<Aircraft>(*id).is_ok());
        }
    }
}

#[test]
fn test_commands_round_trip_as_json() {
    let commands = vec![
        CampaignCommand::Tick { multiplier: 10.0 },
        CampaignCommand::GeneratePackage {
            coalition: Coalition::Red,
            task: Task::Cas,
        },
        CampaignCommand::SkipToNextDay,
    ];
    let mut engine = engine(5);
    activate(&mut engine);
    for command in commands {
        let json = serde_json::to_string(&command).unwrap();
        let parsed: CampaignCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, command);
        engine.handle_command(parsed).unwrap();
    }
    assert!(engine.meta().next_day);
}

#[test]
fn test_inactive_engine_rejects_mission_flow() {
    let mut engine = engine(1);
    let err = engine
        .handle_command(CampaignCommand::SubmitMissionState {
            report: MissionState::default(),
        })
        .unwrap_err();
    assert!(matches!(err, CampaignError::Inactive));
    assert!(!err.is_logic_error());

    let state = engine.state().unwrap();
    assert!(!state.active);
    assert!(state.blue_faction.is_none());
}
