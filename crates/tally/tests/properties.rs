// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use proptest::prelude::*;
use tally::flatten::flatten_records;
use tally::inference::{FALLBACK_LABEL_KEY, FALLBACK_MAGNITUDE_KEY};
use tally::{export_csv, parse_csv_export, ChartDataBuilder, FieldMap, FieldValue, KeyOverrides};

fn scalar() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Null),
        any::<bool>().prop_map(FieldValue::Bool),
        (-4_000_000i64..4_000_000).prop_map(|n| FieldValue::Number(n as f64 / 4.0)),
        "[a-zA-Z ,\"\\\\]{0,12}".prop_map(FieldValue::Text),
    ]
}

fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn value() -> impl Strategy<Value = FieldValue> {
    scalar().prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(FieldValue::List),
            prop::collection::vec((key(), inner), 0..4)
                .prop_map(|pairs| FieldValue::Map(pairs.into_iter().collect())),
        ]
    })
}

fn flat_record() -> impl Strategy<Value = FieldMap> {
    prop::collection::vec((key(), scalar()), 0..6).prop_map(|pairs| pairs.into_iter().collect())
}

fn uniform_rows() -> impl Strategy<Value = Vec<FieldValue>> {
    prop::collection::btree_set(key(), 1..5).prop_flat_map(|keys| {
        let keys: Vec<String> = keys.into_iter().collect();
        let row = prop::collection::vec(scalar().prop_filter("null", |v| *v != FieldValue::Null), keys.len())
            .prop_map(move |values| {
                FieldValue::Map(keys.iter().cloned().zip(values).collect())
            });
        prop::collection::vec(row, 1..6)
    })
}

proptest! {
    #[test]
    fn test_flatten_preserves_length(records in prop::collection::vec(value(), 0..8)) {
        prop_assert_eq!(flatten_records(&records).len(), records.len());
    }

    #[test]
    fn test_flatten_is_identity_on_flat_records(records in prop::collection::vec(flat_record(), 0..6)) {
        let input: Vec<FieldValue> = records.iter().cloned().map(FieldValue::Map).collect();
        prop_assert_eq!(flatten_records(&input), records);
    }

    #[test]
    fn test_inferred_keys_come_from_sample(records in prop::collection::vec(value(), 0..6)) {
        let chart = ChartDataBuilder::new().build(&records, &KeyOverrides::none());
        let sample_keys: Vec<&String> = chart.rows.first().map(|row| row.record.keys().collect()).unwrap_or_default();
        let magnitude = &chart.roles.magnitude_key;
        let label = &chart.roles.label_key;
        prop_assert!(magnitude == FALLBACK_MAGNITUDE_KEY || sample_keys.contains(&magnitude));
        prop_assert!(label == FALLBACK_LABEL_KEY || sample_keys.contains(&label));
    }

    #[test]
    fn test_total_and_average(records in prop::collection::vec(value(), 0..8)) {
        let chart = ChartDataBuilder::new().build(&records, &KeyOverrides::none());
        let stats = chart.stats();
        let total: f64 = chart.rows.iter().map(|row| row.magnitude).sum();
        prop_assert_eq!(stats.total, total);
        if chart.rows.is_empty() {
            prop_assert_eq!(stats.average, 0.0);
        } else {
            prop_assert_eq!(stats.average, total / chart.rows.len() as f64);
        }
        prop_assert_eq!(stats.count, chart.rows.len());
    }

    #[test]
    fn test_export_reparses_to_field_values(records in uniform_rows()) {
        let chart = ChartDataBuilder::new().build(&records, &KeyOverrides::none());
        let export = export_csv(&chart.rows, None).unwrap();
        let parsed = parse_csv_export(&export.content).unwrap();
        let expected: Vec<FieldMap> = chart.rows.iter().map(|row| row.fields()).collect();
        prop_assert_eq!(parsed, expected);
    }
}
