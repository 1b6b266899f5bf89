#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::commands::CampaignCommand;
    use crate::components::*;
    use crate::config::CampaignConfig;
    use crate::data::{DataStore, DataStoreError};
    use crate::enums::*;
    use crate::events::MissionState;
    use crate::types::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_task_wire_names() {
        assert_eq!(
            serde_json::to_string(&Task::Strike).unwrap(),
            "\"Pinpoint Strike\""
        );
        assert_eq!(
            serde_json::to_string(&Task::AirAssault).unwrap(),
            "\"Air Assault\""
        );
        for task in Task::ALL {
            let json = serde_json::to_string(&task).unwrap();
            assert_eq!(json, format!("\"{}\"", task.as_str()));
            let back: Task = serde_json::from_str(&json).unwrap();
            assert_eq!(task, back);
        }
    }

    #[test]
    fn test_query_key_wire_names() {
        assert_eq!(
            serde_json::to_string(&QueryKey::AircraftIdle).unwrap(),
            "\"aircrafts-idle\""
        );
        assert_eq!(
            serde_json::to_string(&QueryKey::GroundGroupsOnTarget).unwrap(),
            "\"groundGroups-on target\""
        );
        for key in QueryKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            let back: QueryKey = serde_json::from_str(&json).unwrap();
            assert_eq!(key, back);
        }
    }

    #[test]
    fn test_entity_type_rejects_unknown() {
        assert_eq!(
            serde_json::from_str::<EntityType>("\"SAM\"").unwrap(),
            EntityType::Sam
        );
        assert!(serde_json::from_str::<EntityType>("\"Submarine\"").is_err());
    }

    #[test]
    fn test_coalition_opposite() {
        assert_eq!(Coalition::Blue.opposite(), Coalition::Red);
        assert_eq!(Coalition::Red.opposite(), Coalition::Blue);
        assert_eq!(Coalition::Neutral.opposite(), Coalition::Neutral);
        assert_eq!(serde_json::to_string(&Coalition::Red).unwrap(), "\"red\"");
    }

    #[test]
    fn test_heading_conventions() {
        let origin = Position::new(0.0, 0.0);
        assert!((origin.heading_to(&Position::new(1000.0, 0.0)) - 0.0).abs() < EPS);
        assert!((origin.heading_to(&Position::new(0.0, 1000.0)) - 90.0).abs() < EPS);
        assert!((origin.heading_to(&Position::new(-1000.0, 0.0)) - 180.0).abs() < EPS);
        assert!((origin.heading_to(&Position::new(0.0, -1000.0)) - 270.0).abs() < EPS);
    }

    #[test]
    fn test_offset_and_distance() {
        let origin = Position::new(100.0, 200.0);
        let moved = origin.offset(90.0, 5000.0);
        assert!((moved.x - 100.0).abs() < EPS);
        assert!((moved.y - 5200.0).abs() < EPS);
        assert!((origin.distance_to(&moved) - 5000.0).abs() < EPS);

        let back = moved.offset(add_heading(90.0, 180.0), 5000.0);
        assert!(back.distance_to(&origin) < EPS);
    }

    #[test]
    fn test_normalize_heading() {
        assert!((normalize_heading(-90.0) - 270.0).abs() < EPS);
        assert!((normalize_heading(720.0) - 0.0).abs() < EPS);
        assert!((add_heading(350.0, 20.0) - 10.0).abs() < EPS);
    }

    #[test]
    fn test_step_toward_snaps_without_overshoot() {
        let start = Position::new(0.0, 0.0);
        let target = Position::new(0.0, 100.0);

        let (p, arrived) = start.step_toward(&target, 40.0);
        assert!(!arrived);
        assert!((p.y - 40.0).abs() < EPS);

        let (p, arrived) = p.step_toward(&target, 80.0);
        assert!(arrived);
        assert_eq!(p, target);
    }

    #[test]
    fn test_travel_time() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(17_000.0, 0.0);
        assert!((travel_time(&a, &b, 170.0) - 100.0).abs() < EPS);
        assert_eq!(travel_time(&a, &b, 0.0), 0.0);
    }

    #[test]
    fn test_day_and_night_helpers() {
        let nine = hours(9.0);
        assert_eq!(day_of(nine), 0);
        assert!((hour_of_day(nine) - 9.0).abs() < EPS);
        assert!(!is_night(nine, 20.0, 6.0));
        assert!(is_night(hours(21.0), 20.0, 6.0));
        assert!(is_night(hours(24.0 + 3.0), 20.0, 6.0));
        assert!((next_day_at(hours(22.0), 6.0) - hours(30.0)).abs() < EPS);
        assert!((next_day_at(hours(24.0 + 1.0), 6.0) - hours(54.0)).abs() < EPS);
    }

    #[test]
    fn test_builtin_config_matches_default() {
        let builtin = CampaignConfig::builtin().unwrap();
        assert_eq!(builtin, CampaignConfig::default());
        assert_eq!(builtin.package_quota(Task::Strike, Coalition::Blue), 4);
        assert_eq!(builtin.package_quota(Task::Strike, Coalition::Red), 3);
        assert_eq!(builtin.package_quota(Task::Strike, Coalition::Neutral), 0);
        assert_eq!(builtin.max_distance(Task::Csar), 30_000.0);
        assert_eq!(builtin.flight_group_size(Task::Awacs), 1);
    }

    #[test]
    fn test_builtin_data_store_loads() {
        let store = DataStore::builtin().unwrap();
        assert!(store.faction("USA 1977").is_ok());
        assert!(store.faction("Russia 1984").is_ok());
        assert!(matches!(
            store.faction("Atlantis 2050"),
            Err(DataStoreError::UnknownFaction(_))
        ));
        let scenario = store.scenario(None).unwrap();
        for name in scenario
            .blue
            .airdrome_names
            .iter()
            .chain(scenario.red.airdrome_names.iter())
        {
            assert!(store.airdrome(name).is_ok(), "missing airdrome {name}");
        }
        for faction in &store.factions {
            for types in faction.aircraft_types.values() {
                for t in types {
                    assert!(store.aircraft(t).is_ok(), "missing aircraft {t}");
                }
            }
        }
    }

    #[test]
    fn test_every_builtin_loadout_resolves() {
        let store = DataStore::builtin().unwrap();
        for name in store.aircraft.keys() {
            for task in Task::ALL {
                let loadout = store.resolve_loadout(name, task).unwrap();
                assert!(loadout.task == task.as_str() || loadout.task == "default");
            }
        }
    }

    #[test]
    fn test_loadout_prefers_task_then_default() {
        let store = DataStore::builtin().unwrap();
        let cap = store.resolve_loadout("F-14A", Task::Cap).unwrap();
        assert_eq!(cap.task, "CAP");
        assert_eq!(cap.a2a_weapons().get("AIM-54A"), Some(&2));
        assert!((cap.a2a_range() - 130_000.0).abs() < EPS);

        let fallback = store.resolve_loadout("F-14A", Task::Strike).unwrap();
        assert_eq!(fallback.task, "default");
    }

    #[test]
    fn test_loadout_missing_is_configuration_error() {
        let mut store = DataStore::builtin().unwrap();
        if let Some(def) = store.aircraft.get_mut("E-3A") {
            def.loadouts.clear();
        }
        assert!(matches!(
            store.resolve_loadout("E-3A", Task::Awacs),
            Err(DataStoreError::MissingLoadout { .. })
        ));
        assert!(matches!(
            store.resolve_loadout("B-2A", Task::Strike),
            Err(DataStoreError::UnknownAircraft(_))
        ));
    }

    #[test]
    fn test_loadout_unknown_launcher_is_configuration_error() {
        let mut store = DataStore::builtin().unwrap();
        store.launchers.remove("{AIM-9L}");
        assert!(matches!(
            store.resolve_loadout("F-14A", Task::Cap),
            Err(DataStoreError::UnknownLauncher { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_weapon() {
        let mut store = DataStore::builtin().unwrap();
        store.weapons.remove("AIM-9L");
        assert!(matches!(
            store.validate(),
            Err(DataStoreError::UnknownWeapon { .. })
        ));
    }

    #[test]
    fn test_record_queries_follow_state() {
        let aircraft = Aircraft {
            aircraft_type: "F-4E".into(),
            home_base_id: EntityId(1),
            flight_group_id: None,
            call_sign: None,
            name: None,
            onboard_number: 12,
            is_client: false,
            loadout: None,
            alive: true,
        };
        let idle = EntityRecord::Aircraft(aircraft.clone());
        assert_eq!(idle.queries(), vec![QueryKey::Aircraft, QueryKey::AircraftIdle]);

        let tasked = EntityRecord::Aircraft(Aircraft {
            flight_group_id: Some(EntityId(9)),
            ..aircraft
        });
        assert_eq!(
            tasked.queries(),
            vec![QueryKey::Aircraft, QueryKey::AircraftInUse]
        );
    }

    #[test]
    fn test_record_value_rejects_unknown_field() {
        let base = HomeBase {
            name: "Kutaisi".into(),
            position: Position::new(1.0, 2.0),
            aircraft_ids: vec![EntityId(4)],
        };
        let mut value = EntityRecord::Airdrome(base.clone()).to_value().unwrap();
        let back = EntityRecord::from_value(EntityType::Airdrome, value.clone()).unwrap();
        assert_eq!(back, EntityRecord::Airdrome(base));

        value
            .as_object_mut()
            .unwrap()
            .insert("runwayHeading".into(), serde_json::json!(70));
        assert!(EntityRecord::from_value(EntityType::Airdrome, value).is_err());
    }

    #[test]
    fn test_flight_group_task_tagging() {
        let mut task = FlightGroupTask::Csar {
            target: Some(EntityId(7)),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["kind"], "CSAR");
        assert_eq!(json["target"], 7);
        assert_eq!(task.task(), Task::Csar);
        assert_eq!(task.target_id(), Some(EntityId(7)));

        task.clear_target();
        assert_eq!(task.target_id(), None);
    }

    #[test]
    fn test_command_serde() {
        let cmd = CampaignCommand::Activate {
            blue_faction: "USA 1977".into(),
            red_faction: "Russia 1984".into(),
            ai_skill: AiSkill::Excellent,
            hardcore: true,
            scenario: None,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let back: CampaignCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, back);

        let tick: CampaignCommand =
            serde_json::from_str(r#"{"type":"Tick","multiplier":60.0}"#).unwrap();
        assert_eq!(tick, CampaignCommand::Tick { multiplier: 60.0 });
    }

    #[test]
    fn test_mission_state_defaults() {
        let report: MissionState = serde_json::from_str(r#"{"time": 36000.0}"#).unwrap();
        assert_eq!(report.time, 36_000.0);
        assert!(report.killed_aircrafts.is_empty());
        assert!(report.mission_id.is_none());

        let bad = serde_json::from_str::<MissionState>(r#"{"time": 1.0, "score": 3}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_incoming_map_uses_coalition_keys() {
        let objective = Objective {
            name: "Oni".into(),
            position: Position::default(),
            deployment_timer: 0.0,
            deployment_delay: 1800.0,
            structure_ids: vec![],
            sam_ids: vec![],
            incoming_ground_groups: BTreeMap::from([(Coalition::Red, EntityId(3))]),
        };
        let json = serde_json::to_value(&objective).unwrap();
        assert_eq!(json["incomingGroundGroups"]["red"], 3);
    }
}
