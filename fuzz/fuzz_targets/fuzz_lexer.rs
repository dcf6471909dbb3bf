#![no_main]

use libfuzzer_sys::fuzz_target;
use tsannotate::lexer::{Lexer, TokenKind};
use tsannotate::string_dict::StringDict;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    if source.len() > 100_000 {
        return;
    }

    let mut dict = StringDict::new();
    let mut lexer = Lexer::new(source, &mut dict);
    loop {
        let token = lexer.next_token();
        // Spans must land on char boundaries; the serializer splices there.
        assert!(source.get(token.span.start..token.span.end).is_some());
        if matches!(token.kind, TokenKind::Eof) {
            break;
        }
    }
});
