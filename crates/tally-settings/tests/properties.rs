//! Property tests for settings validation.

use proptest::prelude::*;
use tally_settings::{ExportSettings, LangSettings, ModuleSettings};

proptest! {
    #[test]
    fn positive_top_is_accepted(top in 1usize..10_000) {
        let s = LangSettings { top: Some(top), ..Default::default() };
        prop_assert!(s.validate().is_ok());
    }

    #[test]
    fn positive_depth_is_accepted(depth in 1usize..64, roots in prop::collection::vec("[a-z]{1,8}", 0..4)) {
        let s = ModuleSettings { module_depth: depth, module_roots: roots, ..Default::default() };
        prop_assert!(s.validate().is_ok());
    }

    #[test]
    fn export_settings_serde_round_trip(min_code in 0usize..1000, max_rows in proptest::option::of(1usize..1000)) {
        let s = ExportSettings { min_code, max_rows, ..Default::default() };
        let json = serde_json::to_string(&s).unwrap();
        let back: ExportSettings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, s);
    }
}
