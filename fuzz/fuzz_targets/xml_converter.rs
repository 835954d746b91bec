#![no_main]
use libfuzzer_sys::fuzz_target;
use xml2json::{ConvertOptions, FormatConfig, XmlConfig, xml_to_json};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let options = ConvertOptions::default()
            .with_xml_config(XmlConfig::new(64, 1 << 16))
            .with_region("US");
        let _ = xml_to_json(s, &options, &FormatConfig::compact());
    }
});
