use crate::{
    event::{NormalizedEvent, RawEventRecord},
    field::{self, first_object, first_present, first_text},
    passport::Passport,
};
use serde_json::{Map, Value};

/// Map one raw record onto the canonical event shape.
///
/// Total and side-effect free. Each field resolves through its alias list;
/// shapes that cannot be read are treated as absent.
#[must_use]
pub fn normalize(raw: &RawEventRecord) -> NormalizedEvent {
    let record = raw.as_map();

    NormalizedEvent {
        event_id: first_text(record, field::EVENT_ID),
        event_type: first_text(record, field::EVENT_TYPE),
        action: first_text(record, field::ACTION),
        biz_step: first_text(record, field::BIZ_STEP),
        disposition: first_text(record, field::DISPOSITION),
        event_time: first_text(record, field::EVENT_TIME),
        read_point: first_text(record, field::READ_POINT),
        biz_location: first_text(record, field::BIZ_LOCATION),
        epc_list: first_present(record, field::EPC_LIST)
            .map(|value| field::text_list(value).collect())
            .unwrap_or_default(),
        passport_fragment: resolve_passport(record),
        extensions: first_object(record, field::EXTENSIONS)
            .cloned()
            .unwrap_or_default(),
        owner_role: first_text(record, field::OWNER_ROLE),
    }
}

// ilmd.dpp, then dpp, then extensions.dpp; the first readable fragment wins
fn resolve_passport(record: &Map<String, Value>) -> Option<Passport> {
    let nested = |container: field::Aliases| {
        first_object(record, container).and_then(|map| first_present(map, field::PASSPORT))
    };

    [
        nested(field::ILMD),
        first_present(record, field::PASSPORT),
        nested(field::EXTENSIONS),
    ]
    .into_iter()
    .flatten()
    .find_map(Passport::from_fragment)
}
