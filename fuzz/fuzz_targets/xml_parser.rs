#![no_main]
use libfuzzer_sys::fuzz_target;
use xml2json::{XmlConfig, XmlParser};

fuzz_target!(|data: &[u8]| {
    let mut parser = XmlParser::with_config(data, XmlConfig::new(64, 1 << 16));
    let _ = parser.parse();
});
