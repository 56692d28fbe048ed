//! Property-based test generators using proptest.
//!
//! Generated objects always satisfy what `put` requires: a runtime with a
//! well-formed group key and unique, slash-free record uids.

use proptest::prelude::*;
use udmf_core::{
    AppItem, ApplicationDefined, DataStatus, DetailValue, FileRef, Form, Html, Link, PixelMap,
    PlainText, Privilege, RecordValue, Runtime, SystemDefined, Text, UdDetails, UnifiedData,
    UnifiedKey, UnifiedRecord,
};

/// Strategy for a single key segment (no `/`).
pub fn segment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9._-]{1,16}").expect("Invalid regex")
}

/// Strategy for record uids.
pub fn uid_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{1,12}").expect("Invalid regex")
}

/// Strategy for a well-formed unified key.
pub fn unified_key_strategy() -> impl Strategy<Value = UnifiedKey> {
    (
        prop_oneof![Just("drag".to_string()), Just("DataHub".to_string())],
        segment_strategy(),
        segment_strategy(),
    )
        .prop_map(|(intention, bundle, group)| UnifiedKey::new(intention, bundle, group))
}

/// Strategy for details values.
pub fn detail_value_strategy() -> impl Strategy<Value = DetailValue> {
    prop_oneof![
        any::<i32>().prop_map(DetailValue::Int),
        any::<i64>().prop_map(DetailValue::Long),
        any::<bool>().prop_map(DetailValue::Bool),
        ".{0,16}".prop_map(DetailValue::Text),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(DetailValue::Bytes),
    ]
}

/// Strategy for details maps.
pub fn details_strategy() -> impl Strategy<Value = UdDetails> {
    prop::collection::btree_map("[a-z]{1,8}", detail_value_strategy(), 0..4)
}

fn text() -> impl Strategy<Value = String> {
    ".{0,32}"
}

fn bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

fn file_ref() -> impl Strategy<Value = FileRef> {
    (details_strategy(), text()).prop_map(|(details, uri)| FileRef { details, uri })
}

/// Strategy covering every record kind.
pub fn record_value_strategy() -> impl Strategy<Value = RecordValue> {
    prop_oneof![general_record_strategy(), system_record_strategy()]
}

fn general_record_strategy() -> impl Strategy<Value = RecordValue> {
    prop_oneof![
        details_strategy().prop_map(|details| RecordValue::Text(Text { details })),
        (details_strategy(), text(), text()).prop_map(|(details, content, abstract_text)| {
            RecordValue::PlainText(PlainText {
                details,
                content,
                abstract_text,
            })
        }),
        (details_strategy(), text(), text()).prop_map(|(details, html_content, plain_content)| {
            RecordValue::Html(Html {
                details,
                html_content,
                plain_content,
            })
        }),
        (details_strategy(), text(), text()).prop_map(|(details, url, description)| {
            RecordValue::Hyperlink(Link {
                details,
                url,
                description,
            })
        }),
        file_ref().prop_map(RecordValue::File),
        file_ref().prop_map(RecordValue::Image),
        file_ref().prop_map(RecordValue::Video),
        file_ref().prop_map(RecordValue::Audio),
        file_ref().prop_map(RecordValue::Folder),
    ]
}

fn system_record_strategy() -> impl Strategy<Value = RecordValue> {
    prop_oneof![
        details_strategy()
            .prop_map(|details| RecordValue::SystemDefinedRecord(SystemDefined { details })),
        (details_strategy(), any::<i32>(), text(), text(), text(), text()).prop_map(
            |(details, form_id, form_name, bundle_name, ability_name, module)| {
                RecordValue::SystemDefinedForm(Form {
                    details,
                    form_id,
                    form_name,
                    bundle_name,
                    ability_name,
                    module,
                })
            }
        ),
        (details_strategy(), text(), text(), text(), text(), text(), text()).prop_map(
            |(details, app_id, app_name, app_icon_id, app_label_id, bundle_name, ability_name)| {
                RecordValue::SystemDefinedAppItem(AppItem {
                    details,
                    app_id,
                    app_name,
                    app_icon_id,
                    app_label_id,
                    bundle_name,
                    ability_name,
                })
            }
        ),
        (details_strategy(), bytes()).prop_map(|(details, raw_data)| {
            RecordValue::SystemDefinedPixelMap(PixelMap { details, raw_data })
        }),
        ("[a-z.]{1,16}", bytes()).prop_map(|(application_defined_type, raw_data)| {
            RecordValue::ApplicationDefined(ApplicationDefined {
                application_defined_type,
                raw_data,
            })
        }),
    ]
}

/// Strategy for runtime blocks.
pub fn runtime_strategy() -> impl Strategy<Value = Runtime> {
    (
        unified_key_strategy(),
        any::<bool>(),
        prop::collection::vec(
            (any::<u32>(), "[a-z.]{0,12}", "[a-z.]{0,12}").prop_map(
                |(token_id, read_permission, write_permission)| Privilege {
                    token_id,
                    read_permission,
                    write_permission,
                },
            ),
            0..3,
        ),
        any::<i64>(),
        segment_strategy(),
        prop_oneof![
            Just(DataStatus::Working),
            Just(DataStatus::History),
            Just(DataStatus::Deleted),
        ],
        any::<i32>(),
    )
        .prop_map(
            |(key, is_private, privileges, create_time, device_id, data_status, data_version)| {
                Runtime {
                    source_package: key.bundle_name.clone(),
                    create_package: key.bundle_name.clone(),
                    key,
                    is_private,
                    privileges,
                    create_time,
                    last_modified_time: create_time,
                    device_id,
                    data_status,
                    data_version,
                    ..Runtime::default()
                }
            },
        )
}

/// Strategy for whole objects with 1 to `max_records` records.
///
/// Uids are unique within the object and drawn at random, so their key
/// order rarely matches insertion order.
pub fn unified_data_strategy(max_records: usize) -> impl Strategy<Value = UnifiedData> {
    let max_records = max_records.max(1);
    (
        runtime_strategy(),
        prop::collection::vec(record_value_strategy(), 1..=max_records),
    )
        .prop_flat_map(|(runtime, values)| {
            let n = values.len();
            (
                Just(runtime),
                Just(values),
                prop::collection::hash_set(uid_strategy(), n..=n),
            )
        })
        .prop_map(|(mut runtime, values, uids)| {
            runtime.record_total_num = u32::try_from(values.len()).unwrap_or(u32::MAX);
            let mut data = UnifiedData::new(runtime);
            for (uid, value) in uids.into_iter().zip(values) {
                data.add_record(UnifiedRecord::with_uid(uid, value));
            }
            data
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    proptest! {
        #[test]
        fn generated_keys_are_group_keys(key in unified_key_strategy()) {
            prop_assert!(key.is_valid());
        }

        #[test]
        fn generated_data_is_storable(data in unified_data_strategy(6)) {
            let runtime = data.runtime().unwrap();
            prop_assert!(runtime.key.is_valid());
            prop_assert!(!data.records.is_empty());

            let uids: HashSet<&str> = data.records.iter().map(|r| r.uid.as_str()).collect();
            prop_assert_eq!(uids.len(), data.records.len());
            prop_assert!(uids.iter().all(|uid| !uid.contains('/')));
        }
    }
}
