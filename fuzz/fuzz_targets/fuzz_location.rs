#![no_main]

use arcview::router::Location;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing never fails, and its canonical fragment is a fixed point
    let canonical = Location::parse(&Location::parse(data).to_fragment());
    assert_eq!(Location::parse(&canonical.to_fragment()), canonical);

    let carried = Location::detail(7, Some(data.to_string()));
    assert_eq!(Location::parse(&carried.to_fragment()), carried);
});
