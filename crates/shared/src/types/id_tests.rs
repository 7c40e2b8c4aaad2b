use super::*;
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_new_ids_are_unique() {
    let ids: HashSet<PayrunId> = (0..64).map(|_| PayrunId::new()).collect();
    assert_eq!(ids.len(), 64);
}

#[test]
fn test_ids_are_time_ordered() {
    let first = LeaveRequestId::new();
    let second = LeaveRequestId::new();
    assert!(first.into_inner() <= second.into_inner());
}

#[test]
fn test_from_uuid_round_trip() {
    let uuid = Uuid::new_v4();
    assert_eq!(UserId::from_uuid(uuid).into_inner(), uuid);
}

#[test]
fn test_display_matches_uuid() {
    let uuid = Uuid::new_v4();
    assert_eq!(PayslipId::from_uuid(uuid).to_string(), uuid.to_string());
}

#[test]
fn test_parse_from_str() {
    let uuid = Uuid::new_v4();
    let id = AuditEventId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.into_inner(), uuid);
    assert!(UserId::from_str("not-a-uuid").is_err());
}

#[test]
fn test_serde_is_transparent() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_string(&UserId::from_uuid(uuid)).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));
}
