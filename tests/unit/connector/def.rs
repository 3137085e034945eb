use super::*;
use crate::geometry::anchor::{AnchorX, AnchorY};

#[test]
fn json_defaults_fill_optional_fields() {
    let def: ConnectorDef =
        serde_json::from_str(r#"{"id":"a-b","from":"a","to":"b"}"#).unwrap();
    assert_eq!(def, ConnectorDef::new("a-b", "a", "b"));
    assert!(def.with_arrow);
    assert!(def.via.is_empty());
}

#[test]
fn builder_sets_every_field() {
    let def = ConnectorDef::new("b-c", "b", "c")
        .step(2)
        .delay(0.3)
        .anchors(Anchor::BOTTOM, Anchor::TOP)
        .via(Waypoint::branch(0.5))
        .without_arrow();
    assert_eq!(def.step_index, 2);
    assert_eq!(def.delay, 0.3);
    assert_eq!(def.start_anchor, Anchor::new(AnchorX::Center, AnchorY::Bottom));
    assert_eq!(def.end_anchor.y, AnchorY::Top);
    assert_eq!(def.via, vec![Waypoint::branch(0.5)]);
    assert!(!def.with_arrow);
}

#[test]
fn rejects_negative_delay_and_bad_ratio() {
    assert!(ConnectorDef::new("x", "a", "b").delay(-1.0).validate().is_err());
    assert!(
        ConnectorDef::new("x", "a", "b")
            .delay(f64::INFINITY)
            .validate()
            .is_err()
    );
    let err = ConnectorDef::new("x", "a", "b")
        .via(Waypoint::elbow(2.0))
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("connector 'x'"));
}

#[test]
fn rejects_blank_ids() {
    assert!(ConnectorDef::new(" ", "a", "b").validate().is_err());
    assert!(ConnectorDef::new("x", "", "b").validate().is_err());
}
