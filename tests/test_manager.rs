//! Tests for `swipecard::manager` command execution (no hardware needed).
use swipecard::manager::spawn_shell;

#[test]
fn test_spawned_command_is_reaped_with_status() {
    let handle = spawn_shell("exit 3", &[]).unwrap();
    let status = handle.join().unwrap().unwrap();
    assert_eq!(status.code(), Some(3));
}

#[test]
fn test_spawned_command_sees_environment() {
    let env = [
        ("SWIPECARD_ROW", "4".to_string()),
        ("SWIPECARD_ACTION", "Delete".to_string()),
    ];
    let handle = spawn_shell(
        r#"test "$SWIPECARD_ROW" = 4 && test "$SWIPECARD_ACTION" = Delete"#,
        &env,
    )
    .unwrap();
    assert!(handle.join().unwrap().unwrap().success());
}

#[test]
fn test_many_commands_all_complete() {
    let handles: Vec<_> = (0..20).map(|_| spawn_shell("true", &[]).unwrap()).collect();
    for handle in handles {
        assert!(handle.join().unwrap().unwrap().success());
    }
}
