#![no_main]

use libfuzzer_sys::fuzz_target;
use tsannotate::{AnnotateOptions, preprocess, rewrite};

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    // Inference is much slower than parsing
    if source.len() > 10_000 {
        return;
    }

    let Ok(once) = rewrite(source) else {
        // Failed input passes through the hook untouched
        assert_eq!(preprocess(source, &AnnotateOptions::default()), source);
        return;
    };
    // A second pass finds nothing left to annotate
    if let Ok(twice) = rewrite(&once) {
        assert_eq!(twice, once);
    }
});
