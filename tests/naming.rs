use std::collections::HashSet;

use csvquery::{
    config::TableNaming,
    naming::dedupe_column_names,
    query::choose_table_names,
};
use proptest::prelude::*;

fn header_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop_oneof!["[a-cA-C]", "[a-cA-C][2-3]", Just(String::new())], 0..12)
}

proptest! {
    #[test]
    fn renamed_headers_are_unique_and_only_gain_digits(headers in header_strategy()) {
        let renamed = dedupe_column_names(headers.clone(), true).expect("rename never fails");
        prop_assert_eq!(renamed.len(), headers.len());

        let distinct: HashSet<_> = renamed.iter().map(|n| n.to_ascii_lowercase()).collect();
        prop_assert_eq!(distinct.len(), renamed.len());

        for (original, name) in headers.iter().zip(&renamed) {
            prop_assert!(name.starts_with(original.as_str()));
            let suffix = &name[original.len()..];
            prop_assert!(suffix.is_empty() || suffix.parse::<u64>().is_ok_and(|n| n >= 2));
        }
    }

    #[test]
    fn distinct_headers_are_left_alone(headers in prop::collection::hash_set("[a-z]{1,6}", 0..10)) {
        let headers: Vec<String> = headers.into_iter().collect();
        let renamed = dedupe_column_names(headers.clone(), true).expect("rename never fails");
        prop_assert_eq!(&renamed, &headers);
        let kept = dedupe_column_names(headers.clone(), false).expect("no duplicates");
        prop_assert_eq!(kept, headers);
    }

    #[test]
    fn table_names_are_unique_for_any_file_list(
        stems in prop::collection::vec("[a-bA-B]{1,2}", 1..8),
        generic in any::<bool>(),
    ) {
        let files: Vec<String> = stems.iter().map(|s| format!("/data/{s}.csv")).collect();
        let policy = if generic { TableNaming::Generic } else { TableNaming::ByFilename };
        let names = choose_table_names(&files, policy);
        prop_assert_eq!(names.len(), files.len());
        let distinct: HashSet<_> = names.iter().map(|n| n.to_ascii_lowercase()).collect();
        prop_assert_eq!(distinct.len(), names.len());
        if !generic {
            prop_assert_eq!(&names[0], &stems[0]);
        } else {
            prop_assert_eq!(names[0].as_str(), "csv");
        }
    }
}
