use super::*;
use crate::test_support::record;
use serde_json::json;

#[test]
fn snake_case_aliases_win_over_camel_case() {
    let event = normalize(&record(json!({
        "id": "fallback",
        "event_id": "E1",
        "bizStep": "camel",
        "biz_step": "packing",
        "bizLocation": "camel-loc",
        "biz_location": "urn:loc:1",
    })));

    assert_eq!(event.event_id.as_deref(), Some("E1"));
    assert_eq!(event.biz_step.as_deref(), Some("packing"));
    assert_eq!(event.biz_location.as_deref(), Some("urn:loc:1"));
}

#[test]
fn camel_case_and_short_aliases_are_read_when_alone() {
    let event = normalize(&record(json!({
        "id": 17,
        "type": "ObjectEvent",
        "eventTime": "2024-05-01T00:00:00Z",
        "readPoint": { "id": "urn:epc:id:sgln:0614141.00777.0" },
        "epcList": ["urn:epc:1", "urn:epc:2", "urn:epc:1"],
    })));

    assert_eq!(event.event_id.as_deref(), Some("17"));
    assert_eq!(event.event_type.as_deref(), Some("ObjectEvent"));
    assert_eq!(event.event_time.as_deref(), Some("2024-05-01T00:00:00Z"));
    assert_eq!(
        event.read_point.as_deref(),
        Some("urn:epc:id:sgln:0614141.00777.0")
    );
    assert_eq!(event.epc_list.len(), 2);
}

#[test]
fn owner_role_resolves_in_declared_order() {
    let event = normalize(&record(json!({
        "batch_owner_role": "BRAND",
        "event_owner_role": "SUPPLIER",
    })));
    assert_eq!(event.owner_role.as_deref(), Some("SUPPLIER"));

    let event = normalize(&record(json!({
        "owner_role": "",
        "batch_owner_role": "BRAND",
    })));
    assert_eq!(event.owner_role.as_deref(), Some("BRAND"));
}

#[test]
fn passport_prefers_ilmd_then_top_level_then_extensions() {
    let all = normalize(&record(json!({
        "ilmd": { "dpp": { "from": "ilmd" } },
        "dpp": { "from": "top" },
        "extensions": { "dpp": { "from": "extensions" } },
    })));
    assert_eq!(
        all.passport_fragment.and_then(|p| p.get("from").cloned()),
        Some(json!("ilmd"))
    );

    let top_and_extensions = normalize(&record(json!({
        "dpp": { "from": "top" },
        "extensions": { "dpp": { "from": "extensions" } },
    })));
    assert_eq!(
        top_and_extensions
            .passport_fragment
            .and_then(|p| p.get("from").cloned()),
        Some(json!("top"))
    );

    let no_ilmd = normalize(&record(json!({
        "ilmd": { "lot": "L-9" },
        "dpp": null,
        "extensions": { "dpp": { "from": "extensions" } },
    })));
    assert_eq!(
        no_ilmd.passport_fragment.and_then(|p| p.get("from").cloned()),
        Some(json!("extensions"))
    );
}

#[test]
fn malformed_fields_are_absent() {
    let event = normalize(&record(json!({
        "event_id": true,
        "biz_step": ["packing"],
        "epc_list": 5,
        "extensions": "nope",
        "dpp": 3,
    })));

    assert_eq!(event, NormalizedEvent::default());
}

#[test]
fn empty_record_normalizes_to_default() {
    assert_eq!(normalize(&record(json!({}))), NormalizedEvent::default());
}

#[test]
fn normalize_is_idempotent_through_raw_projection() {
    let first = normalize(&record(json!({
        "id": 99,
        "eventType": "TransformationEvent",
        "action": "ADD",
        "bizStep": "urn:epcglobal:cbv:bizstep:commissioning",
        "disposition": "active",
        "eventTime": "2024-02-02T12:00:00Z",
        "readPoint": { "id": "urn:rp" },
        "bizLocation": "urn:bl",
        "epcList": ["b", "a"],
        "ilmd": { "dpp": { "environmental_impact": { "co2": "1,2" } } },
        "extensions": { "note": "x", "dpp": { "ignored": true } },
        "event_owner_role": "MANUFACTURER_LEVEL_2",
    })));

    let second = normalize(&first.to_raw());

    assert_eq!(second, first);
}

#[test]
fn absorb_overwrites_present_scalars_and_unions_sets() {
    let mut base = normalize(&record(json!({
        "event_id": "E1",
        "biz_step": "packing",
        "epc_list": ["a", "b"],
        "extensions": { "k1": 1, "shared": "old" },
        "dpp": { "materials": ["wool"], "grade": "A" },
    })));
    let later = normalize(&record(json!({
        "event_id": "E1",
        "owner_role": "SUPPLIER",
        "epc_list": ["b", "c"],
        "extensions": { "shared": "new" },
        "dpp": { "grade": "B" },
    })));

    base.absorb(later);

    assert_eq!(base.biz_step.as_deref(), Some("packing"));
    assert_eq!(base.owner_role.as_deref(), Some("SUPPLIER"));
    assert_eq!(
        base.epc_list.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );
    assert_eq!(base.extensions.get("k1"), Some(&json!(1)));
    assert_eq!(base.extensions.get("shared"), Some(&json!("new")));

    let passport = base.passport_fragment.expect("passport should survive merge");
    assert_eq!(passport.get("materials"), Some(&json!(["wool"])));
    assert_eq!(passport.get("grade"), Some(&json!("B")));
}

#[test]
fn absorb_adopts_passport_when_missing() {
    let mut base = normalize(&record(json!({ "event_id": "E1" })));
    base.absorb(normalize(&record(json!({ "event_id": "E1", "dpp": { "a": 1 } }))));

    assert_eq!(
        base.passport_fragment.map(Value::from),
        Some(json!({ "a": 1 }))
    );
}
