#![no_main]
use libfuzzer_sys::fuzz_target;
use tally_module_key::{OTHER_KEY, ROOT_KEY, module_key, normalize_path};

/// Max input size to prevent pathological parse times
const MAX_INPUT_SIZE: usize = 4 * 1024;

fn segments(key: &str) -> usize {
    if key == ROOT_KEY || key == OTHER_KEY {
        0
    } else {
        key.split('/').count()
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_SIZE {
        return;
    }
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let no_roots: Vec<String> = Vec::new();
    let roots = vec!["crates".to_string(), "packages".to_string()];

    for roots in [&no_roots, &roots] {
        let key1 = module_key(s, roots, 1);
        let key2 = module_key(s, roots, 2);
        let key10 = module_key(s, roots, 10);

        for key in [&key1, &key2, &key10] {
            assert!(!key.is_empty(), "module key must not be empty");
            assert!(!key.contains('\\'), "module key must not contain backslashes: {key:?}");
        }

        // Deeper keys extend shallower ones.
        assert!(segments(&key1) <= segments(&key2));
        assert!(segments(&key2) <= segments(&key10));
        if segments(&key1) > 0 {
            assert!(key2.starts_with(&key1), "{key2:?} should extend {key1:?}");
        }

        assert_eq!(key2, module_key(s, roots, 2), "module key must be deterministic");
    }

    let once = normalize_path(s);
    assert_eq!(once, normalize_path(&once), "normalize_path must be idempotent");
});
