use serde_json::json;
use with_core::*;

#[test]
fn test_exec_request_serialization() {
    let request = ExecRequest {
        cmd: vec!["/bin/sh".to_string(), "-i".to_string()],
        namespace: Specification::from_json(json!({"bin": {"ls": "/bin/ls"}})).unwrap(),
        dry_run: false,
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        json!({
            "cmd": ["/bin/sh", "-i"],
            "namespace": {"bin": {"ls": "/bin/ls"}},
            "dry_run": false
        })
    );

    let back: ExecRequest = serde_json::from_value(value).unwrap();
    assert_eq!(back, request);
}

#[test]
fn test_specification_last_insert_wins() {
    let mut spec = Specification::new();
    spec.insert("bin", Node::leaf("/old"));
    let previous = spec.insert("bin", Node::leaf("/new"));

    assert_eq!(previous, Some(Node::leaf("/old")));
    assert_eq!(spec.len(), 1);
    assert_eq!(spec.get("bin").and_then(Node::as_leaf), Some("/new"));
}

#[test]
fn test_native_metadata_is_tagged_at_ingestion() {
    let entries =
        TreeEntry::parse_native(r#"[{"from": "lib.ro", "to": "x"}, {"from": "lib", "to": "/lib"}]"#)
            .unwrap();

    assert_eq!(
        entries[0],
        TreeEntry::Metadata {
            tag: "ro".to_string()
        }
    );
    assert!(!entries[1].is_metadata());
}

#[test]
fn test_error_messages() {
    let err = Error::ProfileNotFound {
        name: "nope".to_string(),
    };
    assert_eq!(err.to_string(), "Profile not found: nope");

    let err = Error::Config {
        path: "/etc/withrc".into(),
        message: "bad".to_string(),
    };
    assert!(err.to_string().contains("/etc/withrc"));
}
