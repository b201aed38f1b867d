use crate::{
    batch::BatchInput,
    error::ErrorKind,
    obs::CounterSink,
    prelude::*,
    test_support::records,
    tier::TierLabels,
};
use serde_json::{Value, json};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn garment_batch() -> Value {
    json!({
        "batch_id": "LOT-2024-017",
        "anchor_status": "CONFIRMED",
        "events": [
            {
                "event_id": "harvest-1",
                "event_type": "ObjectEvent",
                "biz_step": "urn:epcglobal:cbv:bizstep:harvesting",
                "event_time": "2024-03-01T06:00:00Z",
                "epc_list": ["urn:epc:id:sgtin:1.1.1"],
            },
            {
                "id": "ship-1",
                "bizStep": "shipping",
                "eventTime": "2024-03-05T10:00:00+01:00",
                "owner_role": "SUPPLIER_LEVEL_2",
                "epcList": ["urn:epc:id:sgtin:1.1.1", "urn:epc:id:sgtin:1.1.2"],
                "traceability": [
                    {
                        "event_id": "sew-1",
                        "event_time": "2024-03-10T08:00:00Z",
                        "event_owner_role": "MANUFACTURER",
                        "ilmd": {
                            "dpp": {
                                "environmental_impact": { "energy": "12,5" },
                                "circularity": { "reusability": 10 },
                            }
                        },
                    }
                ],
            },
            {
                "event_time": "2024-03-12T00:00:00Z",
                "batch_owner_role": "BRAND",
                "disposition": "sellable",
            },
            { "biz_step": "inspecting" },
        ],
        "passport_events": [
            {
                "event_id": "harvest-1",
                "owner_role": "FARM_LEVEL_1",
                "dpp": {
                    "environmental_impact": { "co2": "3,2", "water": "140" },
                    "circularity": { "recycled_content": "0", "waste_reduction": 5 },
                },
            }
        ],
        "batch_passport": {
            "dpp": "{\"environmental_impact\": {\"co2\": 99, \"energy\": 1}, \"brand\": \"Acme\"}"
        },
    })
}

#[test]
fn full_batch_reconstruction() {
    let input = BatchInput::from_value(&garment_batch()).expect("batch should parse");
    let view = reconstruct(&input);

    assert_eq!(view.batch_id.as_deref(), Some("LOT-2024-017"));
    assert_eq!(view.anchor_status.as_deref(), Some("CONFIRMED"));
    assert!(view.diagnostics.is_empty());

    let keys: Vec<TierKey> = view.groups.iter().map(|g| g.key).collect();
    assert_eq!(
        keys,
        vec![
            TierKey::Farm,
            TierKey::Supplier,
            TierKey::Manufacturer,
            TierKey::Brand,
            TierKey::Unknown,
        ]
    );

    // harvest-1 merged with its passport duplicate: role evidence now FARM
    let farm = &view.groups[0].events;
    assert_eq!(farm.len(), 1);
    assert_eq!(farm[0].owner_role.as_deref(), Some("FARM_LEVEL_1"));
    assert!(farm[0].passport_fragment.is_some());

    let displayed: Vec<Option<&str>> = view
        .events()
        .map(|event| event.event_id.as_deref())
        .collect();
    assert_eq!(
        displayed,
        vec![Some("harvest-1"), Some("ship-1"), Some("sew-1"), None, None]
    );

    // earliest fragment (harvest-1) is primary; energy falls through to
    // sew-1, not to the batch passport
    assert!(close(view.stats.co2, 3.2));
    assert!(close(view.stats.water, 140.0));
    assert!(close(view.stats.energy, 12.5));
    assert!(close(view.stats.circularity_score, 15.0));
    assert_eq!(view.stats.event_count(), 5);

    let brand = &view.tier_stats[&TierKey::Brand];
    assert!(close(brand.co2, 99.0));
    assert!(close(brand.energy, 1.0));

    let passport = view.passport.expect("consolidated passport");
    assert_eq!(passport.get("brand"), Some(&json!("Acme")));

    assert_eq!(view.summary.event_count, 5);
    assert_eq!(view.summary.epc_count, 2);
    assert_eq!(
        view.summary.first_event_time.as_deref(),
        Some("2024-03-01T06:00:00Z")
    );
    assert_eq!(
        view.summary.last_event_time.as_deref(),
        Some("2024-03-12T00:00:00Z")
    );
}

#[test]
fn undecodable_batch_passport_is_a_diagnostic_not_a_failure() {
    let input = BatchInput::new(records(json!([{ "id": "E1", "owner_role": "BRAND" }])))
        .with_batch_passport(json!("{broken"));
    let sink = CounterSink::new();

    let view = reconstruct_with(&input, &ViewOptions::default(), &sink);

    assert_eq!(view.diagnostics.len(), 1);
    assert_eq!(view.diagnostics[0].kind(), ErrorKind::PassportDecodeError);
    assert_eq!(view.diagnostics[0].path(), Some("batch_passport"));
    assert_eq!(view.stats.co2, 0.0);
    assert!(view.passport.is_none());
    assert_eq!(sink.report().passport_decode_failures, 1);
}

#[test]
fn passport_fallback_to_batch_level() {
    let events = merge_all(&[records(json!([{ "id": "E1" }, { "id": "E2" }]))]);
    let batch = decode_batch_passport(&json!({ "environmental_impact": { "co2": "1,5" } }))
        .expect("decode")
        .expect("passport");

    let stats = aggregate(&events, Some(&batch));

    assert!(close(stats.co2, 1.5));
}

#[test]
fn empty_batch_reconstructs_to_empty_view() {
    assert!(merge_all(&[]).is_empty());
    assert!(group_by_tier(&[]).is_empty());

    let view = reconstruct(&BatchInput::default());

    assert!(view.groups.is_empty());
    assert!(view.events().next().is_none());
    assert!(view.tier_stats.is_empty());
    assert_eq!(view.stats, AggregateStats::default());
    assert!(view.stats.tier_counts.values().all(|n| *n == 0));
    assert_eq!(view.summary, Default::default());
}

#[test]
fn options_control_labels_and_per_tier_stats() {
    let input = BatchInput::new(records(json!([{ "id": "E1", "owner_role": "FARM" }])));
    let options = ViewOptions {
        labels: TierLabels::default().with_label(TierKey::Farm, "Grower"),
        per_tier_stats: false,
    };

    let view = reconstruct_with(&input, &options, &CounterSink::new());

    assert_eq!(view.groups[0].label, "Grower");
    assert!(view.tier_stats.is_empty());
}

#[test]
fn sink_sees_every_stage() {
    let input = BatchInput::from_value(&garment_batch()).expect("batch should parse");
    let sink = CounterSink::new();

    let _ = reconstruct_with(&input, &ViewOptions::default(), &sink);
    let report = sink.report();

    assert_eq!(report.records_normalized, 6);
    assert_eq!(report.events_merged, 1);
    assert_eq!(report.unidentified_events, 2);
    assert_eq!(report.classified_by_role, 4);
    assert_eq!(report.tiers.values().sum::<u64>(), 5);
    // batch scope plus five tier scopes
    assert_eq!(
        report.passport_from_event + report.passport_from_batch + report.passport_absent,
        6
    );
}

#[test]
fn view_serializes_with_screaming_tier_keys() {
    let input = BatchInput::new(records(json!([{ "id": "E1", "owner_role": "BRAND" }])));
    let value = serde_json::to_value(reconstruct(&input)).expect("view should serialize");

    assert_eq!(value["groups"][0]["key"], json!("BRAND"));
    assert_eq!(value["stats"]["tier_counts"]["FARM"], json!(0));
}
