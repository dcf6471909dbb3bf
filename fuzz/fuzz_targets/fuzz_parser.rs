#![no_main]

use libfuzzer_sys::fuzz_target;
use tsannotate::parser::Parser;
use tsannotate::string_dict::StringDict;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    if source.len() > 100_000 {
        return;
    }

    let mut dict = StringDict::new();
    let _ = Parser::new(source, &mut dict).parse_program();
});
