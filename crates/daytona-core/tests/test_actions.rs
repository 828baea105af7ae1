mod common;

use common::Fixture;
use daytona_core::model::EntityKind;
use daytona_core::{ActionError, ActionOutcome, Caller, ValidationError};
use serde_json::json;
use std::path::PathBuf;

#[test]
fn save_test_writes_one_argument_row_per_framework_argument() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &["threads", "duration", "rate"]);
    let ids = fx.argument_ids(fid);

    let outcome = fx
        .run(
            &Caller::user("bob"),
            "save_test",
            json!({
                "framework_id": fid.to_string(),
                "title": "smoke",
                "priority": "3",
                "argument_values": { ids[0].to_string(): "8", ids[2].to_string(): 100 },
                "perf_delay": 5,
                "perf_duration": 30,
            }),
        )
        .unwrap();
    let test_id = match outcome {
        ActionOutcome::Test(t) => {
            assert!(t.new);
            assert!(!t.running);
            assert_eq!(t.framework_id, fid);
            assert_eq!(t.title.as_deref(), Some("smoke"));
            t.test_id
        }
        other => panic!("unexpected outcome: {other:?}"),
    };

    let conn = fx.raw();
    let (username, status, priority): (String, String, i64) = conn.query_row(
        "SELECT username, end_status, priority FROM tests WHERE test_id = ?1",
        [test_id],
        |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
    )?;
    assert_eq!(username, "bob");
    assert_eq!(status, "new");
    assert_eq!(priority, 3);

    let mut stmt = conn.prepare(
        "SELECT framework_arg_id, argument_value FROM test_arguments
         WHERE test_id = ?1 ORDER BY framework_arg_id",
    )?;
    let values = stmt
        .query_map([test_id], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, Option<String>>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(
        values,
        vec![
            (ids[0], Some("8".to_string())),
            (ids[1], None),
            (ids[2], Some("100".to_string())),
        ]
    );
    assert_eq!(fx.rows("scheduler_queue"), 0);
    Ok(())
}

#[test]
fn host_lists_resolve_against_framework_types() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &[]);
    let test_id = fx.test(
        "alice",
        fid,
        json!({ "execution": "h1, h2,,", "statistics": "s1", "reserved": "r1" }),
    );

    let conn = fx.raw();
    let mut stmt = conn.prepare(
        "SELECT t.name, a.hostname FROM host_associations a
         JOIN host_association_types t ON t.host_association_type_id = a.host_association_type_id
         WHERE a.test_id = ?1 ORDER BY t.name, a.hostname",
    )?;
    let hosts = stmt
        .query_map([test_id], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    // No reserved association type exists on the framework, so r1 is dropped.
    assert_eq!(
        hosts,
        vec![
            ("execution".to_string(), "h1".to_string()),
            ("execution".to_string(), "h2".to_string()),
            ("statistics".to_string(), "s1".to_string()),
        ]
    );

    // Editing replaces the whole set.
    fx.run(
        &Caller::user("alice"),
        "save_test",
        json!({
            "framework_id": fid, "test_id": test_id, "execution": "h3",
            "perf_delay": 5, "perf_duration": 30,
        }),
    )
    .unwrap();
    assert_eq!(
        fx.count(&format!("SELECT COUNT(*) FROM host_associations WHERE test_id = {test_id}")),
        1
    );
    Ok(())
}

#[test]
fn profiler_rows_follow_presence_flags() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &[]);
    let test_id = fx.test(
        "alice",
        fid,
        json!({
            "strace": "on", "strace_process": "nginx", "strace_delay": 1, "strace_duration": 10,
            "perf": true, "perf_process": "java",
        }),
    );
    let profiler_rows = |fx: &Fixture| -> Vec<(String, Option<String>, i64, i64)> {
        let conn = fx.raw();
        let mut stmt = conn
            .prepare(
                "SELECT profiler, processname, delay, duration FROM profiler_configs
                 WHERE test_id = ?1 ORDER BY profiler",
            )
            .unwrap();
        let rows = stmt
            .query_map([test_id], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        rows
    };
    assert_eq!(
        profiler_rows(&fx),
        vec![
            ("PERF".to_string(), Some("java".to_string()), 5, 30),
            ("STRACE".to_string(), Some("nginx".to_string()), 1, 10),
        ]
    );

    // Edit without either flag: tracing row goes, sampling row stays without a process.
    fx.run(
        &Caller::user("alice"),
        "save_test",
        json!({ "framework_id": fid, "test_id": test_id, "perf_delay": 7, "perf_duration": 60 }),
    )
    .unwrap();
    assert_eq!(
        profiler_rows(&fx),
        vec![("PERF".to_string(), None, 7, 60)]
    );

    // An edited test that lost its sampling row gets it back.
    fx.raw()
        .execute("DELETE FROM profiler_configs WHERE test_id = ?1", [test_id])?;
    fx.run(
        &Caller::user("alice"),
        "save_test",
        json!({ "framework_id": fid, "test_id": test_id, "perf_delay": 1, "perf_duration": 2 }),
    )
    .unwrap();
    assert_eq!(profiler_rows(&fx), vec![("PERF".to_string(), None, 1, 2)]);
    Ok(())
}

#[test]
fn missing_profiler_fields_abort_before_any_write() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &["a"]);
    let before = fx.dump();

    let err = fx
        .run(
            &Caller::user("alice"),
            "save_test",
            json!({ "framework_id": fid, "strace": true, "strace_process": "nginx", "perf_delay": 1, "perf_duration": 1 }),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Some values missing for STRACE configuration: 'strace_delay' is required"
    );

    let err = fx
        .run(&Caller::user("alice"), "save_test", json!({ "framework_id": fid }))
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::MissingConfigField { profiler: "PERF", .. })
    ));
    assert_eq!(fx.dump(), before);
    Ok(())
}

#[test]
fn save_test_validates_framework_reference() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let err = fx
        .run(
            &Caller::user("alice"),
            "save_test",
            json!({ "perf_delay": 1, "perf_duration": 1 }),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::MissingField("framework_id"))
    ));

    let err = fx
        .run(
            &Caller::user("alice"),
            "save_test",
            json!({ "framework_id": "abc", "perf_delay": 1, "perf_duration": 1 }),
        )
        .unwrap_err();
    assert!(matches!(err, ActionError::Validation(ValidationError::Malformed(_))));

    let err = fx
        .run(
            &Caller::user("alice"),
            "save_test",
            json!({ "framework_id": 31, "perf_delay": 1, "perf_duration": 1 }),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::NotFound { entity: EntityKind::Framework, id: 31 }
    ));
    assert_eq!(fx.rows("tests"), 0);
    Ok(())
}

#[test]
fn test_cannot_move_between_frameworks() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let first = fx.framework("alice", "first", &["a"]);
    let second = fx.framework("alice", "second", &["b"]);
    let test_id = fx.test("alice", first, json!({}));
    let before = fx.dump();

    let err = fx
        .run(
            &Caller::user("alice"),
            "save_test",
            json!({ "framework_id": second, "test_id": test_id, "perf_delay": 1, "perf_duration": 1 }),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::FrameworkChanged { .. })
    ));
    assert_eq!(fx.dump(), before);
    Ok(())
}

#[test]
fn non_owner_cannot_edit_or_delete_test() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &["a"]);
    let test_id = fx.test("bob", fid, json!({}));
    let before = fx.dump();

    let err = fx
        .run(
            &Caller::user("mallory"),
            "save_test",
            json!({ "framework_id": fid, "test_id": test_id, "title": "mine", "perf_delay": 1, "perf_duration": 1 }),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::Unauthorized { entity: EntityKind::Test, ref owner } if owner == "bob"
    ));
    assert_eq!(
        err.to_string(),
        "You are not an administrator or the test owner (bob)"
    );

    let err = fx
        .run(&Caller::user("mallory"), "delete_test", json!({ "test_id": test_id }))
        .unwrap_err();
    assert_eq!(err.code(), "E_UNAUTHORIZED");
    assert_eq!(fx.dump(), before);

    // The framework owner is not the test owner either.
    let err = fx
        .run(&Caller::user("alice"), "delete_test", json!({ "test_id": test_id }))
        .unwrap_err();
    assert_eq!(err.code(), "E_UNAUTHORIZED");
    Ok(())
}

#[test]
fn edit_resets_run_times_and_converts_imported_tests() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &["a"]);
    let test_id = fx.test("alice", fid, json!({}));
    {
        let conn = fx.raw();
        conn.execute(
            "UPDATE tests SET end_status = 'imported', start_time = 'x', end_time = 'y' WHERE test_id = ?1",
            [test_id],
        )?;
        conn.execute(
            "INSERT INTO imported_test_arguments (test_id, argument_name, argument_value) VALUES (?1, 'old', '1')",
            [test_id],
        )?;
    }

    fx.run(
        &Caller::user("alice"),
        "save_test",
        json!({ "framework_id": fid, "test_id": test_id, "perf_delay": 1, "perf_duration": 1 }),
    )
    .unwrap();

    let (status, start, end): (String, Option<String>, Option<String>) = fx.raw().query_row(
        "SELECT end_status, start_time, end_time FROM tests WHERE test_id = ?1",
        [test_id],
        |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
    )?;
    assert_eq!(status, "new");
    assert!(!fx.dispatcher.store().test_by_id(test_id)?.unwrap().is_imported());
    assert_eq!(start, None);
    assert_eq!(end, None);
    assert_eq!(fx.rows("imported_test_arguments"), 0);
    assert_eq!(fx.rows("test_arguments"), 1);
    Ok(())
}

#[test]
fn save_run_test_enqueues_in_the_same_transaction() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &["a"]);

    let outcome = fx
        .run(
            &Caller::user("alice"),
            "save_run_test",
            json!({ "framework_id": fid, "perf_delay": 1, "perf_duration": 1 }),
        )
        .unwrap();
    let test_id = match outcome {
        ActionOutcome::Test(t) => {
            assert!(t.running);
            assert!(t.new);
            t.test_id
        }
        other => panic!("unexpected outcome: {other:?}"),
    };

    let (state, pid): (String, i64) = fx.raw().query_row(
        "SELECT state, pid FROM scheduler_queue WHERE test_id = ?1",
        [test_id],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    assert_eq!(state, "scheduled");
    assert_eq!(pid, 0);
    assert_eq!(
        fx.count(&format!("SELECT COUNT(*) FROM tests WHERE test_id = {test_id} AND end_status = 'scheduled'")),
        1
    );

    // Rescheduling an already pending test leaves one queue entry.
    fx.run(
        &Caller::user("alice"),
        "save_run_test",
        json!({ "framework_id": fid, "test_id": test_id, "perf_delay": 1, "perf_duration": 1 }),
    )
    .unwrap();
    assert_eq!(fx.rows("scheduler_queue"), 1);

    // A failed schedule leaves neither a test nor a queue row behind.
    let before = fx.dump();
    let err = fx
        .run(
            &Caller::user("mallory"),
            "save_run_test",
            json!({ "framework_id": fid, "test_id": test_id, "perf_delay": 1, "perf_duration": 1 }),
        )
        .unwrap_err();
    assert_eq!(err.code(), "E_UNAUTHORIZED");
    assert_eq!(fx.dump(), before);
    Ok(())
}

#[test]
fn edit_after_framework_gains_argument_writes_every_argument() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &["a", "b", "c"]);
    let ids = fx.argument_ids(fid);
    let test_id = fx.test(
        "alice",
        fid,
        json!({ "argument_values": { ids[0].to_string(): "1", ids[1].to_string(): "2", ids[2].to_string(): "3" } }),
    );

    fx.run(
        &Caller::user("alice"),
        "save_framework",
        json!({
            "framework_id": fid,
            "name": "loadtest",
            "execution_script_location": "scripts/run.sh",
            "arguments": [
                { "id": ids[0], "name": "a" },
                { "id": ids[1], "name": "b" },
                { "id": ids[2], "name": "c" },
                { "name": "d" },
            ],
        }),
    )
    .unwrap();
    let all = fx.argument_ids(fid);
    assert_eq!(all.len(), 4);

    fx.run(
        &Caller::user("alice"),
        "save_test",
        json!({
            "framework_id": fid,
            "test_id": test_id,
            "perf_delay": 5,
            "perf_duration": 30,
            "argument_values": { all[1].to_string(): "20", all[3].to_string(): "40" },
        }),
    )
    .unwrap();

    let conn = fx.raw();
    let mut stmt = conn.prepare(
        "SELECT framework_arg_id, argument_value FROM test_arguments
         WHERE test_id = ?1 ORDER BY framework_arg_id",
    )?;
    let values = stmt
        .query_map([test_id], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, Option<String>>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(
        values,
        vec![
            (all[0], None),
            (all[1], Some("20".to_string())),
            (all[2], None),
            (all[3], Some("40".to_string())),
        ]
    );
    Ok(())
}

#[test]
fn failed_enqueue_rolls_back_the_test_write() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &["a"]);
    let existing = fx.test("alice", fid, json!({ "title": "before" }));
    fx.raw().execute_batch(
        "CREATE TRIGGER queue_down BEFORE INSERT ON scheduler_queue
         BEGIN SELECT RAISE(ABORT, 'queue down'); END;",
    )?;
    let before = fx.dump();

    let err = fx
        .run(
            &Caller::user("alice"),
            "save_run_test",
            json!({ "framework_id": fid, "title": "fresh", "perf_delay": 1, "perf_duration": 1 }),
        )
        .unwrap_err();
    assert!(matches!(err, ActionError::Store(_)), "{err:?}");
    assert_eq!(err.code(), "E_STORE");
    assert_eq!(fx.rows("tests"), 1);
    assert_eq!(fx.rows("scheduler_queue"), 0);

    let err = fx
        .run(
            &Caller::user("alice"),
            "save_run_test",
            json!({ "framework_id": fid, "test_id": existing, "title": "after", "perf_delay": 1, "perf_duration": 1 }),
        )
        .unwrap_err();
    assert_eq!(err.code(), "E_STORE");
    assert_eq!(fx.dump(), before);
    Ok(())
}

#[test]
fn delete_test_cascades_and_removes_log_dir() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &["a", "b"]);
    let keep = fx.test("alice", fid, json!({ "execution": "h1" }));
    let test_id = fx.test(
        "alice",
        fid,
        json!({
            "execution": "h1", "statistics": "s1",
            "strace": true, "strace_process": "p", "strace_delay": 0, "strace_duration": 1,
        }),
    );
    fx.run(
        &Caller::user("alice"),
        "save_run_test",
        json!({ "framework_id": fid, "test_id": test_id, "perf_delay": 1, "perf_duration": 1 }),
    )
    .unwrap();

    let outcome = fx
        .run(&Caller::user("alice"), "delete_test", json!({ "test_id": test_id }))
        .unwrap();
    assert!(matches!(outcome, ActionOutcome::Test(ref t) if t.deleted && t.test_id == test_id));

    for table in [
        "tests",
        "test_arguments",
        "imported_test_arguments",
        "host_associations",
        "profiler_configs",
        "scheduler_queue",
    ] {
        assert_eq!(
            fx.count(&format!("SELECT COUNT(*) FROM {table} WHERE test_id = {test_id}")),
            0,
            "{table}"
        );
    }
    assert_eq!(
        fx.count(&format!("SELECT COUNT(*) FROM test_arguments WHERE test_id = {keep}")),
        2
    );
    assert_eq!(fx.rows("framework_arguments"), 2);
    assert_eq!(
        fx.removed_dirs(),
        vec![PathBuf::from("loadtest").join(test_id.to_string())]
    );

    let err = fx
        .run(&Caller::user("alice"), "delete_test", json!({ "test_id": test_id }))
        .unwrap_err();
    assert!(matches!(err, ActionError::NotFound { entity: EntityKind::Test, .. }));
    Ok(())
}

#[test]
fn bulk_delete_is_all_or_nothing() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &["a"]);
    let t1 = fx.test("alice", fid, json!({}));
    let t2 = fx.test("alice", fid, json!({}));
    let foreign = fx.test("bob", fid, json!({}));
    let before = fx.dump();

    let err = fx
        .run(
            &Caller::user("alice"),
            "delete_tests",
            json!({ "test_ids": [t1, 9999, t2] }),
        )
        .unwrap_err();
    assert!(matches!(err, ActionError::NotFound { id: 9999, .. }));
    assert_eq!(fx.dump(), before);

    let err = fx
        .run(
            &Caller::user("alice"),
            "delete_tests",
            json!({ "test_ids": [t1, foreign] }),
        )
        .unwrap_err();
    assert_eq!(err.code(), "E_UNAUTHORIZED");
    assert_eq!(fx.dump(), before);

    let err = fx
        .run(&Caller::user("alice"), "delete_tests", json!({ "test_ids": [t1, "x"] }))
        .unwrap_err();
    assert_eq!(err.code(), "E_VALIDATION");
    assert!(fx.removed_dirs().is_empty());
    Ok(())
}

#[test]
fn bulk_delete_reports_every_deleted_test() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let fid = fx.framework("alice", "loadtest", &["a"]);
    let t1 = fx.test("alice", fid, json!({}));
    let t2 = fx.test("alice", fid, json!({}));
    let t3 = fx.test("alice", fid, json!({}));

    let outcome = fx
        .run(
            &Caller::user("alice"),
            "delete_tests",
            json!({ "test_ids": [t1.to_string(), t2, t1] }),
        )
        .unwrap();
    match outcome {
        ActionOutcome::Tests(deleted) => {
            let ids: Vec<i64> = deleted.iter().map(|d| d.test_id).collect();
            assert_eq!(ids, vec![t1, t2]);
            assert!(deleted.iter().all(|d| d.deleted && d.framework_id == fid));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(fx.rows("tests"), 1);
    assert_eq!(
        fx.count(&format!("SELECT COUNT(*) FROM tests WHERE test_id = {t3}")),
        1
    );
    assert_eq!(fx.removed_dirs().len(), 2);

    let err = fx
        .run(&Caller::user("alice"), "delete_tests", json!({ "test_ids": [] }))
        .unwrap_err();
    assert_eq!(err.to_string(), "No tests defined");
    Ok(())
}
