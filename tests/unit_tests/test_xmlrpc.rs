// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use mds_client_rs::master::{
    value::{Value, encode_method_call},
    xml::{MethodResponse, parse_method_response},
};

#[test]
fn method_call_encoding_and_escaping() {
    let xml = encode_method_call(
        "lookupService",
        &[Value::string("/ROSNODE"), Value::string("/a<b>&'\"")],
    );
    assert!(xml.starts_with("<?xml version=\"1.0\"?><methodCall>"));
    assert!(xml.contains("<methodName>lookupService</methodName>"));
    assert!(xml.contains("<value><string>/ROSNODE</string></value>"));
    assert!(xml.contains("/a&lt;b&gt;&amp;&apos;&quot;"));
    assert!(xml.ends_with("</params></methodCall>"));
}

#[test]
fn parses_the_master_triple() {
    let doc = r#"<?xml version="1.0"?>
<methodResponse><params><param><value><array><data>
  <value><int>1</int></value>
  <value><string>ok</string></value>
  <value><string>rosrpc://127.0.0.1:55555</string></value>
</data></array></value></param></params></methodResponse>"#;
    let parsed = parse_method_response(doc).expect("parse");
    let MethodResponse::Ok(Value::Array(triple)) = parsed else {
        panic!("expected an array response");
    };
    assert_eq!(triple[0], Value::Int(1));
    assert_eq!(triple[1], Value::Str("ok".to_string()));
    assert_eq!(triple[2], Value::Str("rosrpc://127.0.0.1:55555".to_string()));
}

#[test]
fn parses_every_scalar_kind() {
    let doc = "<methodResponse><params><param><value><array><data>\
               <value><i4>-7</i4></value>\
               <value><double>2.5</double></value>\
               <value><boolean>1</boolean></value>\
               <value><boolean>0</boolean></value>\
               <value>bare text</value>\
               </data></array></value></param></params></methodResponse>";
    let MethodResponse::Ok(Value::Array(items)) =
        parse_method_response(doc).expect("parse")
    else {
        panic!("expected array");
    };
    assert_eq!(items[0], Value::Int(-7));
    assert_eq!(items[1], Value::Double(2.5));
    assert_eq!(items[2], Value::Bool(true));
    assert_eq!(items[3], Value::Bool(false));
    assert_eq!(items[4], Value::Str("bare text".to_string()));
}

#[test]
fn parses_structs_and_entities() {
    let doc = "<methodResponse><params><param>\
               <value><struct><member><name>msg</name>\
               <value><string>a &amp;&lt; b</string></value>\
               </member></struct></value>\
               </param></params></methodResponse>";
    let MethodResponse::Ok(Value::Struct(members)) =
        parse_method_response(doc).expect("parse")
    else {
        panic!("expected struct");
    };
    assert_eq!(members[0].0, "msg");
    assert_eq!(members[0].1, Value::Str("a &< b".to_string()));
}

#[test]
fn fault_is_surfaced_with_its_struct() {
    let doc = "<methodResponse><fault><value><struct>\
               <member><name>faultCode</name><value><int>-1</int></value></member>\
               <member><name>faultString</name><value><string>who are you</string></value></member>\
               </struct></value></fault></methodResponse>";
    let MethodResponse::Fault(fault) = parse_method_response(doc).expect("parse") else {
        panic!("expected fault");
    };
    let json = fault.to_json().to_string();
    assert!(json.contains("\"faultCode\":-1"));
    assert!(json.contains("who are you"));
}

#[test]
fn rejects_documents_outside_the_subset() {
    parse_method_response("<methodResponse><params><param>\
        <value><base64>AAAA</base64></value>\
        </param></params></methodResponse>")
        .expect_err("base64 is outside the supported grammar");
    parse_method_response("<notxmlrpc/>").expect_err("not a method response");
    parse_method_response("<methodResponse><params><param>\
        <value><string>a &unknown; b</string></value>\
        </param></params></methodResponse>")
        .expect_err("unknown entity");
}
