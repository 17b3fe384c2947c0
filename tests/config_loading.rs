//! Loading configuration documents from disk and turning them into a working
//! security manager.

use std::io::Write;

use anyhow::Result;
use tempfile::{tempdir, NamedTempFile};

use rolegate::config::{SecurityConfig, AUTH_MANAGER_ENV, CONFIG_PATH_ENV};
use rolegate::identity::{IdentityRequest, USER_ID_HEADER};
use rolegate::security::{Action, ResourceType, SecurityManager, TaggedResource};

const DOC: &str = r#"{
  "auth_manager": "static",
  "users": { "alice": ["a-reader"], "bob": [] },
  "permissions": [
    { "name": "read-from-any-A",
      "resources": [{ "type": "A", "name_patterns": [], "required_tags": {} }],
      "actions": ["read"],
      "policies": [{ "kind": "role_based", "roles": ["a-reader"] }],
      "decision_strategy": "unanimous" }
  ]
}"#;

fn write_doc(text: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn document_on_disk_drives_decisions() -> Result<()> {
    let file = write_doc(DOC)?;
    let cfg = SecurityConfig::from_path(file.path())?;
    let sm = SecurityManager::new(cfg.build_permissions()?);
    let provider = cfg.identity_provider()?;

    let a = TaggedResource::new("a", ResourceType::A);
    let alice = sm.bind_request(provider.as_ref(), &IdentityRequest::new().with_header(USER_ID_HEADER, "alice"))?;
    assert!(alice.check(&a, &[Action::Read]).allow);

    let bob = sm.bind_request(provider.as_ref(), &IdentityRequest::new().with_header(USER_ID_HEADER, "bob"))?;
    assert!(!bob.check(&a, &[Action::Read]).allow);

    let err = sm
        .bind_request(provider.as_ref(), &IdentityRequest::new().with_header(USER_ID_HEADER, "mallory"))
        .unwrap_err();
    assert_eq!(err.code_str(), "unauthenticated");
    Ok(())
}

#[test]
fn missing_file_is_config_error() -> Result<()> {
    let dir = tempdir()?;
    let err = SecurityConfig::from_path(dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code_str(), "config_error");
    assert_eq!(err.http_status(), 400);
    Ok(())
}

#[test]
fn unknown_resource_type_fails_at_startup() -> Result<()> {
    let file = write_doc(&DOC.replace(r#""type": "A""#, r#""type": "C""#))?;
    let cfg = SecurityConfig::from_path(file.path())?;
    let err = cfg.build_permissions().unwrap_err();
    assert_eq!(err.code_str(), "unknown_configuration");
    assert!(err.message().contains("read-from-any-A"));
    Ok(())
}

#[test]
fn unknown_action_fails_at_startup() -> Result<()> {
    let file = write_doc(&DOC.replace(r#"["read"]"#, r#"["read", "delete"]"#))?;
    let err = SecurityConfig::from_path(file.path())?.build_permissions().unwrap_err();
    assert_eq!(err.code_str(), "unknown_configuration");
    Ok(())
}

#[test]
fn lookup_reads_path_and_auth_override() -> Result<()> {
    let file = write_doc(DOC)?;
    let path = file.path().to_string_lossy().to_string();
    let cfg = SecurityConfig::from_lookup(|key| match key {
        k if k == CONFIG_PATH_ENV => Some(path.clone()),
        k if k == AUTH_MANAGER_ENV => Some("header".to_string()),
        _ => None,
    })?;
    assert_eq!(cfg.auth_manager, "header");
    assert_eq!(cfg.permissions.len(), 1);
    Ok(())
}

#[test]
fn serialized_sample_loads_back() -> Result<()> {
    let text = serde_json::to_string_pretty(&SecurityConfig::sample())?;
    let file = write_doc(&text)?;
    let cfg = SecurityConfig::from_path(file.path())?;
    assert_eq!(cfg, SecurityConfig::sample());
    assert_eq!(cfg.build_permissions()?.len(), 3);
    Ok(())
}
