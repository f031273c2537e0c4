use speculate2::speculate;

speculate! {
    use chrono::{NaiveDate, Utc};
    use habit_core::*;

    fn setup() -> HabitService {
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate test database");
        HabitService::new(db)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn habit_input(name: &str) -> HabitInput {
        HabitInput {
            name: Some(name.to_string()),
            frequency: Some("daily".to_string()),
            category: None,
            start_date: Some("2024-01-01".to_string()),
        }
    }

    fn create_habit(service: &HabitService, name: &str) -> Habit {
        service
            .create_habit(&habit_input(name))
            .expect("Failed to create habit")
    }

    fn count_rows(service: &HabitService, table: &str, habit_id: i64) -> i64 {
        service
            .database()
            .with_connection(|conn| {
                Ok(conn.query_row(
                    &format!("SELECT COUNT(*) FROM {} WHERE habit_id = ?1", table),
                    [habit_id],
                    |row| row.get(0),
                )?)
            })
            .unwrap()
    }

    describe "habit management" {
        describe "create_habit" {
            it "applies default frequency and category" {
                let service = setup();
                let habit = service
                    .create_habit(&HabitInput {
                        name: Some("Read".into()),
                        start_date: Some("2024-01-01".into()),
                        ..Default::default()
                    })
                    .unwrap();

                assert_eq!(habit.frequency, Frequency::Daily);
                assert_eq!(habit.category, Category::Health);
                assert_eq!(habit.start_date, date("2024-01-01"));
                assert!(habit.checkins.is_empty());
                assert!(habit.notes.is_empty());
            }

            it "trims the name" {
                let service = setup();
                let habit = create_habit(&service, "  Run  ");
                assert_eq!(habit.name, "Run");
            }

            it "rejects a missing name" {
                let service = setup();
                let mut input = habit_input("x");
                input.name = None;

                let err = service.create_habit(&input).unwrap_err();
                assert!(matches!(err, HabitError::Validation { field: "name", .. }));
            }

            it "rejects names longer than 100 characters" {
                let service = setup();
                let err = service.create_habit(&habit_input(&"a".repeat(101))).unwrap_err();
                assert!(matches!(err, HabitError::Validation { field: "name", .. }));
                assert!(service.create_habit(&habit_input(&"a".repeat(100))).is_ok());
            }

            it "rejects unknown frequency and category values" {
                let service = setup();
                let mut input = habit_input("Run");
                input.frequency = Some("hourly".into());
                assert!(matches!(
                    service.create_habit(&input).unwrap_err(),
                    HabitError::Validation { field: "frequency", .. }
                ));

                let mut input = habit_input("Run");
                input.category = Some("hobbies".into());
                assert!(matches!(
                    service.create_habit(&input).unwrap_err(),
                    HabitError::Validation { field: "category", .. }
                ));
            }

            it "accepts both spellings of mental health" {
                let service = setup();
                for spelling in ["mental_health", "mental health"] {
                    let mut input = habit_input("Meditate");
                    input.category = Some(spelling.into());
                    let habit = service.create_habit(&input).unwrap();
                    assert_eq!(habit.category, Category::MentalHealth);
                }
            }

            it "requires a parseable start date" {
                let service = setup();
                let mut input = habit_input("Run");
                input.start_date = Some("next tuesday".into());
                assert!(matches!(
                    service.create_habit(&input).unwrap_err(),
                    HabitError::Validation { field: "start_date", .. }
                ));

                input.start_date = None;
                assert!(matches!(
                    service.create_habit(&input).unwrap_err(),
                    HabitError::Validation { field: "start_date", .. }
                ));
            }
        }

        describe "list_habits" {
            it "returns habits in creation order" {
                let service = setup();
                let first = create_habit(&service, "Run");
                let second = create_habit(&service, "Read");

                let habits = service.list_habits(&HabitFilter::default()).unwrap();
                let ids: Vec<i64> = habits.iter().map(|h| h.id).collect();
                assert_eq!(ids, vec![first.id, second.id]);
            }

            it "filters by category and name" {
                let service = setup();
                let mut input = habit_input("Morning run");
                input.category = Some("fitness".into());
                service.create_habit(&input).unwrap();
                create_habit(&service, "Evening reading");

                let fitness = service
                    .list_habits(&HabitFilter {
                        category: Some(Category::Fitness),
                        ..Default::default()
                    })
                    .unwrap();
                assert_eq!(fitness.len(), 1);
                assert_eq!(fitness[0].name, "Morning run");

                let searched = service
                    .list_habits(&HabitFilter {
                        search: Some("READ".into()),
                        ..Default::default()
                    })
                    .unwrap();
                assert_eq!(searched.len(), 1);
                assert_eq!(searched[0].name, "Evening reading");
            }
        }

        describe "updates" {
            it "patch changes only the given fields" {
                let service = setup();
                let habit = create_habit(&service, "Run");

                let patched = service
                    .patch_habit(habit.id, &HabitInput {
                        frequency: Some("weekly".into()),
                        ..Default::default()
                    })
                    .unwrap();

                assert_eq!(patched.name, "Run");
                assert_eq!(patched.frequency, Frequency::Weekly);
                assert_eq!(patched.created_at, habit.created_at);
            }

            it "replace requires a complete definition" {
                let service = setup();
                let habit = create_habit(&service, "Run");

                let err = service
                    .replace_habit(habit.id, &HabitInput {
                        name: Some("Swim".into()),
                        ..Default::default()
                    })
                    .unwrap_err();
                assert!(matches!(err, HabitError::Validation { field: "start_date", .. }));

                let replaced = service.replace_habit(habit.id, &habit_input("Swim")).unwrap();
                assert_eq!(replaced.name, "Swim");
            }

            it "reports missing habits" {
                let service = setup();
                assert!(matches!(
                    service.patch_habit(42, &HabitInput::default()).unwrap_err(),
                    HabitError::NotFound(42)
                ));
                assert!(matches!(service.get_habit(42).unwrap_err(), HabitError::NotFound(42)));
            }
        }

        describe "delete_habit" {
            it "removes all checkins and notes of the habit" {
                let service = setup();
                let habit = create_habit(&service, "Run");
                let other = create_habit(&service, "Read");

                for day in ["2024-01-02", "2024-01-03", "2024-01-04"] {
                    service.toggle_checkin(habit.id, &CheckInInput::for_date(day)).unwrap();
                }
                service.add_note(habit.id, &NoteInput::new("felt good")).unwrap();
                service.add_note(habit.id, &NoteInput::new("rainy")).unwrap();
                service.toggle_checkin(other.id, &CheckInInput::for_date("2024-01-02")).unwrap();

                service.delete_habit(habit.id).unwrap();

                assert_eq!(count_rows(&service, "checkins", habit.id), 0);
                assert_eq!(count_rows(&service, "notes", habit.id), 0);
                assert_eq!(count_rows(&service, "checkins", other.id), 1);
                assert!(matches!(service.get_habit(habit.id).unwrap_err(), HabitError::NotFound(_)));
            }

            it "fails for a missing habit" {
                let service = setup();
                assert!(matches!(service.delete_habit(7).unwrap_err(), HabitError::NotFound(7)));
            }
        }
    }

    describe "toggle_checkin" {
        it "creates then removes the checkin for a day" {
            let service = setup();
            let habit = create_habit(&service, "Run");
            let input = CheckInInput::for_date("2024-01-02");

            let first = service.toggle_checkin(habit.id, &input).unwrap();
            match &first {
                CheckInToggle::Created(checkin) => assert_eq!(checkin.date, date("2024-01-02")),
                CheckInToggle::Removed => panic!("expected a created check-in"),
            }
            assert_eq!(service.get_habit(habit.id).unwrap().checkins.len(), 1);

            let second = service.toggle_checkin(habit.id, &input).unwrap();
            assert_eq!(second, CheckInToggle::Removed);
            assert!(service.get_habit(habit.id).unwrap().checkins.is_empty());
        }

        it "leaves other days untouched" {
            let service = setup();
            let habit = create_habit(&service, "Run");
            service.toggle_checkin(habit.id, &CheckInInput::for_date("2024-01-02")).unwrap();

            for _ in 0..2 {
                service.toggle_checkin(habit.id, &CheckInInput::for_date("2024-01-03")).unwrap();
            }

            let dates: Vec<NaiveDate> = service
                .get_habit(habit.id)
                .unwrap()
                .checkins
                .iter()
                .map(|c| c.date)
                .collect();
            assert_eq!(dates, vec![date("2024-01-02")]);
        }

        it "accepts dates before the start date and in the future" {
            let service = setup();
            let habit = create_habit(&service, "Run");
            for day in ["2023-06-01", "2999-12-31"] {
                let toggle = service.toggle_checkin(habit.id, &CheckInInput::for_date(day)).unwrap();
                assert!(toggle.is_checked());
            }
        }

        it "fails with not found for a missing habit" {
            let service = setup();
            let err = service
                .toggle_checkin(99, &CheckInInput::for_date("2024-01-02"))
                .unwrap_err();
            assert!(matches!(err, HabitError::NotFound(99)));

            let stray = service
                .database()
                .with_connection(|conn| {
                    Ok(conn.query_row("SELECT COUNT(*) FROM checkins", [], |row| row.get::<_, i64>(0))?)
                })
                .unwrap();
            assert_eq!(stray, 0);
        }

        it "requires a date whether or not the habit exists" {
            let service = setup();
            let habit = create_habit(&service, "Run");

            for id in [habit.id, 12345] {
                let err = service.toggle_checkin(id, &CheckInInput::default()).unwrap_err();
                assert!(matches!(err, HabitError::Validation { field: "date", .. }));
                assert_eq!(err.to_string(), "date is required");
            }
        }

        it "rejects malformed dates" {
            let service = setup();
            let habit = create_habit(&service, "Run");
            let err = service
                .toggle_checkin(habit.id, &CheckInInput::for_date("2024-13-01"))
                .unwrap_err();
            assert!(matches!(err, HabitError::Validation { field: "date", .. }));
        }
    }

    describe "checkin storage" {
        it "refuses a second checkin for the same habit and day" {
            let service = setup();
            let habit = create_habit(&service, "Run");
            let day = date("2024-01-02");

            let result = service.database().with_connection(|conn| {
                CheckIn::insert(conn, habit.id, day)?;
                CheckIn::insert(conn, habit.id, day)
            });

            assert!(matches!(result.unwrap_err(), HabitError::ConstraintViolation(_)));
            let count = service
                .database()
                .with_connection(|conn| CheckIn::count_by_habit(conn, habit.id))
                .unwrap();
            assert_eq!(count, 1);
        }
    }

    describe "add_note" {
        it "stores the trimmed text dated today" {
            let service = setup();
            let habit = create_habit(&service, "Run");

            let note = service.add_note(habit.id, &NoteInput::new("  ok  ")).unwrap();

            assert_eq!(note.text, "ok");
            assert_eq!(note.date, note.created_at.date_naive());
            assert!(note.date <= Utc::now().date_naive());
            assert_eq!(service.get_habit(habit.id).unwrap().notes, vec![note]);
        }

        it "rejects whitespace only text" {
            let service = setup();
            let habit = create_habit(&service, "Run");

            let err = service.add_note(habit.id, &NoteInput::new("   ")).unwrap_err();
            assert!(matches!(err, HabitError::Validation { field: "text", .. }));
            assert_eq!(err.to_string(), "note text is required");
            assert!(service.get_habit(habit.id).unwrap().notes.is_empty());
        }

        it "fails with not found for a missing habit" {
            let service = setup();
            assert!(matches!(
                service.add_note(5, &NoteInput::new("hello")).unwrap_err(),
                HabitError::NotFound(5)
            ));
        }
    }

    describe "habit_stats" {
        it "reports streak and success figures" {
            let service = setup();
            let habit = create_habit(&service, "Run");
            // 2024-01-08 is a Monday.
            for day in ["2024-01-08", "2024-01-09", "2024-01-10", "2024-01-01"] {
                service.toggle_checkin(habit.id, &CheckInInput::for_date(day)).unwrap();
            }

            let stats = service.habit_stats(habit.id, date("2024-01-10")).unwrap();

            assert_eq!(stats.current_streak, 3);
            assert_eq!(stats.total_checkins, 4);
            assert_eq!(stats.success_rate, 40);
            assert_eq!(stats.best_day.as_deref(), Some("Monday"));
        }
    }

    describe "concurrency" {
        it "never splits identical toggles across connections" {
            const THREADS: usize = 8;
            const TOGGLES_PER_THREAD: usize = 25;

            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("habits.db");
            let db = Database::open(&path).unwrap();
            db.migrate().unwrap();
            let habit_id = create_habit(&HabitService::new(db.clone()), "Run").id;

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let path = path.clone();
                    std::thread::spawn(move || {
                        let service = HabitService::new(Database::open(&path).unwrap());
                        let input = CheckInInput::for_date("2024-01-02");
                        (0..TOGGLES_PER_THREAD)
                            .filter_map(|_| service.toggle_checkin(habit_id, &input).err())
                            .map(|e| e.to_string())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let errors: Vec<String> = handles
                .into_iter()
                .flat_map(|h| h.join().expect("toggle thread panicked"))
                .collect();

            assert!(errors.is_empty(), "toggle errors: {:?}", errors);
            let remaining = db
                .with_connection(|conn| CheckIn::count_by_habit(conn, habit_id))
                .unwrap();
            assert_eq!(remaining, 0);
        }

        it "alternates state when toggles interleave through one handle" {
            let service = setup();
            let habit_id = create_habit(&service, "Run").id;
            let input = CheckInInput::for_date("2024-01-02");

            let handles: Vec<_> = (0..3)
                .map(|_| {
                    let service = service.clone();
                    let input = input.clone();
                    std::thread::spawn(move || service.toggle_checkin(habit_id, &input).unwrap())
                })
                .collect();
            let created = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|toggle| toggle.is_checked())
                .count();

            // Three toggles from an empty start: on, off, on.
            assert_eq!(created, 2);
            assert_eq!(service.get_habit(habit_id).unwrap().checkins.len(), 1);
        }
    }

    describe "persistence" {
        it "keeps habits across reopen" {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("data").join("habits.db");

            let id = {
                let db = Database::open(&path).unwrap();
                db.migrate().unwrap();
                let service = HabitService::new(db);
                let habit = create_habit(&service, "Run");
                service.toggle_checkin(habit.id, &CheckInInput::for_date("2024-01-02")).unwrap();
                habit.id
            };

            let db = Database::open(&path).unwrap();
            db.migrate().unwrap();
            let habit = HabitService::new(db).get_habit(id).unwrap();
            assert_eq!(habit.name, "Run");
            assert_eq!(habit.checkins.len(), 1);
        }
    }

    describe "serialization" {
        it "omits back references to the habit" {
            let service = setup();
            let habit = create_habit(&service, "Run");
            service.toggle_checkin(habit.id, &CheckInInput::for_date("2024-01-02")).unwrap();
            service.add_note(habit.id, &NoteInput::new("ok")).unwrap();

            let json = serde_json::to_value(service.get_habit(habit.id).unwrap()).unwrap();

            assert_eq!(json["frequency"], "daily");
            assert_eq!(json["start_date"], "2024-01-01");
            assert_eq!(json["checkins"][0]["date"], "2024-01-02");
            assert!(json["checkins"][0].get("habit_id").is_none());
            assert!(json["notes"][0].get("habit_id").is_none());
            assert_eq!(json["notes"][0]["text"], "ok");
        }

        it "exposes only id text and date for notes" {
            let service = setup();
            let habit = create_habit(&service, "Run");
            service.add_note(habit.id, &NoteInput::new("ok")).unwrap();

            let json = serde_json::to_value(service.get_habit(habit.id).unwrap()).unwrap();

            assert!(json.get("created_at").is_none());
            let mut keys: Vec<&str> = json["notes"][0]
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect();
            keys.sort_unstable();
            assert_eq!(keys, vec!["date", "id", "text"]);
        }
    }
}
