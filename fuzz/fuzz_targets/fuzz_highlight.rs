#![no_main]

use arbitrary::Arbitrary;
use arcview::highlight::{escape_html, render_content};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    content: &'a str,
    query: Option<&'a str>,
}

fuzz_target!(|input: Input<'_>| {
    let rendered = render_content(input.content, input.query);

    let mut spans = 0;
    for block in &rendered.blocks {
        let html = block.to_html();
        // Raw markup from the transcript must never survive escaping
        assert!(!html.contains("<script"));
        spans += block.span_count();
    }
    assert_eq!(spans, rendered.span_count);

    let escaped = escape_html(input.content);
    assert!(!escaped.contains('<'));
});
