//! Merges the extractor outputs into one ordered [`Record`].

use gsd_idl_models::{
    CASSETTE_SLOTS_KEY, DUMMY_WAFERS_KEY, DocumentId, HEADER_KEY_COUNT, IDL_KEY,
    KEYS_PER_TABLE_FIELD, MATERIAL_ID_KEY, NO_DUMMIES, NO_MATCH, RUN_TYPE_KEY, Record,
};

use crate::header::Header;
use crate::table::TableStats;

/// Builds a record in fixed order: identifier, header fields, scalar
/// fields, then table fields. Missing scalars become [`NO_MATCH`], a
/// missing dummy count becomes [`NO_DUMMIES`], and a table field without
/// stats contributes no keys.
#[must_use]
pub fn assemble<'a>(
    id: DocumentId,
    header: &Header,
    scalars: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
    tables: impl IntoIterator<Item = (&'a str, Option<TableStats<'a>>)>,
) -> Record {
    let scalars = scalars.into_iter();
    let tables = tables.into_iter();
    let mut record = Record::with_capacity(
        1 + HEADER_KEY_COUNT + scalars.size_hint().0 + KEYS_PER_TABLE_FIELD * tables.size_hint().0,
    );

    record.insert(IDL_KEY, id.to_string());
    record.insert(MATERIAL_ID_KEY, header.material_id.as_str());
    record.insert(CASSETTE_SLOTS_KEY, header.cassette_slots.as_str());
    record.insert(
        DUMMY_WAFERS_KEY,
        header.dummy_wafers.as_deref().unwrap_or(NO_DUMMIES),
    );
    record.insert(RUN_TYPE_KEY, header.run_type.to_string());

    for (label, value) in scalars {
        record.insert(label, value.unwrap_or(NO_MATCH));
    }

    for (label, stats) in tables {
        if let Some(stats) = stats {
            for (key, value) in stats.entries(label) {
                record.insert(key, value);
            }
        }
    }

    record
}
