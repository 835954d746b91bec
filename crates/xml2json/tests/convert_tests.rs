use xml2json::{
    ATTRIBUTES_KEY, ConvertOptions, FormatConfig, Object, Value, XmlConfig, XmlContent,
    XmlElement, convert_element, convert_node, convert_xml, convert_xml_with_options,
    from_xml_str, xml_to_json,
};

fn root_of(xml: &str) -> Result<Value, xml2json::Error> {
    let doc = from_xml_str(xml)?;
    Ok(convert_element(&doc.root))
}

fn strings(items: &[&str]) -> Value {
    Value::from(items.iter().map(|s| Value::from(*s)).collect::<Vec<_>>())
}

#[test]
fn test_text_nodes_trim() {
    assert_eq!(
        convert_node(&XmlContent::Text("\n\t value  ".to_string())),
        Value::from("value")
    );
    assert_eq!(
        convert_node(&XmlContent::Text("   ".to_string())),
        Value::from("")
    );
}

#[test]
fn test_empty_element_is_empty_object() -> Result<(), xml2json::Error> {
    assert_eq!(root_of("<e/>")?, Value::Object(Object::new()));
    assert_eq!(root_of("<e>  \n  </e>")?, Value::Object(Object::new()));
    Ok(())
}

#[test]
fn test_attributes_without_children() -> Result<(), xml2json::Error> {
    let value = root_of(r#"<e id="1" type="a"/>"#)?;
    let attrs = value
        .as_object()
        .and_then(|o| o.get(ATTRIBUTES_KEY))
        .and_then(Value::as_object);
    assert_eq!(attrs.map(Object::len), Some(2));
    assert_eq!(attrs.and_then(|a| a.get("id")), Some(&Value::from("1")));
    assert_eq!(attrs.and_then(|a| a.get("type")), Some(&Value::from("a")));
    assert_eq!(value.as_object().map(Object::len), Some(1));
    Ok(())
}

#[test]
fn test_repeated_items_keep_order() -> Result<(), xml2json::Error> {
    let value = root_of("<list><item>a</item><item>b</item><item>c</item></list>")?;
    assert_eq!(
        value.as_object().and_then(|o| o.get("item")),
        Some(&strings(&["a", "b", "c"]))
    );
    Ok(())
}

#[test]
fn test_crlf_documents_convert_like_lf() -> Result<(), xml2json::Error> {
    let crlf = root_of("<note>\r\n  <body>line one\r\nline two</body>\r\n  <tag kind=\"a\r\nb\"/>\r\n</note>")?;
    let lf = root_of("<note>\n  <body>line one\nline two</body>\n  <tag kind=\"a b\"/>\n</note>")?;
    assert_eq!(crlf, lf);
    assert_eq!(
        crlf.as_object().and_then(|o| o.get("body")),
        Some(&Value::from("line one\nline two"))
    );
    Ok(())
}

#[test]
fn test_single_item_is_bare() -> Result<(), xml2json::Error> {
    let value = root_of("<list><item>a</item></list>")?;
    assert_eq!(
        value.as_object().and_then(|o| o.get("item")),
        Some(&Value::from("a"))
    );
    Ok(())
}

#[test]
fn test_leaf_text_discards_attributes() -> Result<(), xml2json::Error> {
    let value = root_of(r#"<root><a id="1">hello</a><a id="2">world</a></root>"#)?;
    let mut expected = Object::new();
    expected.insert("a", strings(&["hello", "world"]));
    assert_eq!(value, Value::Object(expected));
    Ok(())
}

#[test]
fn test_mixed_content_keeps_only_first_text() -> Result<(), xml2json::Error> {
    let value = root_of("<p><b>bold</b> tail <i>lost</i> more</p>")?;
    assert_eq!(value, Value::from("tail"));
    Ok(())
}

#[test]
fn test_nested_repeats() -> Result<(), xml2json::Error> {
    let xml = "<r><g><v>1</v><v>2</v></g><g><v>3</v></g></r>";
    let value = root_of(xml)?;
    let groups = value
        .as_object()
        .and_then(|o| o.get("g"))
        .and_then(Value::as_array);
    assert_eq!(groups.map(|g| g.len()), Some(2));
    let first = groups
        .and_then(|g| g.get(0))
        .and_then(Value::as_object)
        .and_then(|o| o.get("v"));
    assert_eq!(first, Some(&strings(&["1", "2"])));
    let second = groups
        .and_then(|g| g.get(1))
        .and_then(Value::as_object)
        .and_then(|o| o.get("v"));
    assert_eq!(second, Some(&Value::from("3")));
    Ok(())
}

#[test]
fn test_key_order_follows_first_occurrence() -> Result<(), xml2json::Error> {
    let value = root_of("<r><b/><a/><b/><c/></r>")?;
    let keys: Vec<_> = value
        .as_object()
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(keys, vec!["b", "a", "c"]);
    Ok(())
}

#[test]
fn test_deep_nesting_without_limits() -> Result<(), xml2json::Error> {
    let depth = 500;
    let xml = format!("{}x{}", "<n>".repeat(depth), "</n>".repeat(depth));
    let options = ConvertOptions::default().with_xml_config(XmlConfig::unlimited());
    let result = convert_xml_with_options(&xml, &options)?;

    let mut current = result.get("n");
    let mut levels = 1;
    while let Some(Value::Object(obj)) = current {
        current = obj.get("n");
        levels += 1;
    }
    assert_eq!(levels, depth);
    assert_eq!(current, Some(&Value::from("x")));
    Ok(())
}

#[test]
fn test_default_depth_limit_is_reported() {
    let xml = format!("{}{}", "<n>".repeat(200), "</n>".repeat(200));
    let err = convert_xml(&xml, None).err();
    assert!(err.is_some_and(|e| !e.is_parse_failure()));
}

#[test]
fn test_handbuilt_tree() {
    let tree = XmlElement::new("order")
        .with_attribute("id", "42")
        .with_child(XmlElement::new("line").with_text("x"))
        .with_text("   ")
        .with_child(XmlElement::new("line").with_child(XmlElement::new("sku")));
    let value = convert_element(&tree);

    let mut attrs = Object::new();
    attrs.insert("id", "42");
    let mut second = Object::new();
    second.insert("sku", Object::new());
    let mut expected = Object::new();
    expected.insert(ATTRIBUTES_KEY, attrs);
    expected.insert("line", vec![Value::from("x"), Value::Object(second)]);
    assert_eq!(value, Value::Object(expected));
}

#[test]
fn test_pretty_json_end_to_end() -> Result<(), xml2json::Error> {
    let text = xml_to_json(
        r#"<root><a id="1">hello</a><a id="2">world</a></root>"#,
        &ConvertOptions::default().with_region("US"),
        &FormatConfig::pretty(),
    )?;
    let expected = r#"{
  "root": {
    "a": [
      "hello",
      "world"
    ]
  },
  "metadata": {
    "countryCode": "US"
  }
}"#;
    assert_eq!(text, expected);
    Ok(())
}

#[test]
fn test_parse_failure_has_no_partial_result() {
    let err = xml_to_json("<root><open></root>", &ConvertOptions::default(), &FormatConfig::default())
        .err();
    let message = err.map(|e| e.to_string()).unwrap_or_default();
    assert!(message.contains("mismatched closing tag"), "{message}");
}
