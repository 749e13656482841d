mod common;

use std::path::{Path, PathBuf};

use serde_json::Value;

use casparse::{
    peripheral::parse_cas_impl::{run_with_args, Args},
    testlib::{assert_json_eq, assert_re, write_encrypted_pdf_stub},
    util::{date::parse_standard_date, rw::WriteHandle},
};

use common::{run_test, NonAutoCreatingTestDir};

const CAMS_STATEMENT: &str = "./tests/data/cas/detailed_cams.txt";

fn args(filepath: &Path) -> Args {
    Args {
        filepath: filepath.to_path_buf(),
        password: String::new(),
        pretty: false,
        compact: false,
        debug: false,
    }
}

fn run_and_get_output(args: Args) -> (Result<(), ()>, String, String) {
    let (out_w, out_b) = WriteHandle::string_buff_write_handle();
    let (err_w, err_b) = WriteHandle::string_buff_write_handle();
    let res = run_with_args(args, out_w, err_w);
    let out = out_b.borrow_mut().export_string();
    let err = err_b.borrow_mut().export_string();
    (res, out, err)
}

fn assert_failed_with(args: Args) -> String {
    let (res, out, err) = run_and_get_output(args);
    assert_eq!(res, Err(()));
    assert_eq!(out, "");
    assert!(err.ends_with("}\n"), "{err}");
    let v: Value = serde_json::from_str(&err).unwrap();
    let obj = v.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    obj["error"].as_str().unwrap().to_string()
}

fn num(v: &Value) -> f64 {
    v.as_f64().unwrap_or_else(|| panic!("{v} is not a number"))
}

#[test]
fn test_parse_cams_statement() {
    let (res, out, err) = run_and_get_output(args(Path::new(CAMS_STATEMENT)));
    assert_eq!(err, "");
    assert_eq!(res, Ok(()));
    assert!(out.ends_with("}\n"));
    assert!(
        out.starts_with(
            "{\"statement_period\": {\"from\": \"2023-04-01\", \"to\": \"2024-03-31\"}, \
             \"file_type\": \"CAMS\", \"cas_type\": \"DETAILED\", "
        ),
        "{out}"
    );
    // Single line, apart from the trailing newline
    assert_eq!(out.trim_end().lines().count(), 1);

    let v: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["investor_info"]["name"], "PRIYA SHARMA");
    assert_eq!(v["investor_info"]["email"], "priya.sharma@example.com");
    assert_eq!(v["investor_info"]["mobile"], "+919800011122");
    assert_eq!(
        v["investor_info"]["address"],
        "FLAT 4B, LAKE VIEW APARTMENTS\nINDIRANAGAR\nBENGALURU 560038 KARNATAKA INDIA"
    );

    let folios = v["folios"].as_array().unwrap();
    assert_eq!(folios.len(), 2);

    let axis = &folios[0];
    assert_eq!(axis["folio"], "91012345678 / 0");
    assert_eq!(axis["amc"], "Axis Mutual Fund");
    assert_eq!(axis["PAN"], "ABCPS1234K");
    assert_eq!(axis["KYC"], "OK");
    let elss = &axis["schemes"][0];
    assert_eq!(elss["scheme"], "Axis ELSS Tax Saver Fund - Direct Growth");
    assert_eq!(elss["isin"], "INF846K01EW2");
    assert_eq!(elss["rta"], "KFINTECH");
    assert_eq!(num(&elss["close"]), 25.5);
    assert_eq!(num(&elss["close_calculated"]), 25.5);
    assert_eq!(elss["valuation"]["date"], "2024-03-31");
    assert_eq!(num(&elss["valuation"]["value"]), 2170.65);

    let txs = elss["transactions"].as_array().unwrap();
    let types: Vec<&str> = txs.iter().map(|t| t["type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["PURCHASE", "PURCHASE_SIP", "STAMP_DUTY_TAX", "REDEMPTION"]);
    assert_eq!(txs[1]["date"], "2024-02-15");
    assert_eq!(num(&txs[0]["amount"]), 1000.0);
    assert_eq!(num(&txs[3]["amount"]), -520.0);
    assert_eq!(num(&txs[3]["units"]), -5.0);
    assert!(txs[2]["units"].is_null());

    // Continues past the page break
    let icici = &folios[1];
    assert_eq!(icici["amc"], "ICICI Prudential Mutual Fund");
    let bluechip = &icici["schemes"][0];
    assert_eq!(bluechip["scheme"], "ICICI Prudential Bluechip Fund - IDCW");
    assert_eq!(bluechip["advisor"], "ARN-12345");
    assert_eq!(bluechip["rta"], "CAMS");
    assert_eq!(num(&bluechip["close_calculated"]), 101.234);
    let txs = bluechip["transactions"].as_array().unwrap();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0]["type"], "MISC");
    assert_eq!(txs[1]["type"], "DIVIDEND_REINVEST");
    assert_eq!(num(&txs[1]["dividend_rate"]), 0.5);
}

#[test]
fn test_dates_reparse() {
    let (_, out, _) = run_and_get_output(args(Path::new(CAMS_STATEMENT)));
    let v: Value = serde_json::from_str(&out).unwrap();

    let from = v["statement_period"]["from"].as_str().unwrap();
    assert_eq!(
        parse_standard_date(from).unwrap(),
        time::macros::date!(2023-04-01)
    );
    for folio in v["folios"].as_array().unwrap() {
        for scheme in folio["schemes"].as_array().unwrap() {
            for tx in scheme["transactions"].as_array().unwrap() {
                let d = tx["date"].as_str().unwrap();
                assert!(parse_standard_date(d).is_ok(), "{d}");
            }
        }
    }
}

#[test]
fn test_output_styles() {
    let mut a = args(Path::new(CAMS_STATEMENT));
    a.compact = true;
    let (res, compact, _) = run_and_get_output(a);
    assert!(res.is_ok());
    assert!(compact.starts_with("{\"statement_period\":{\"from\":\"2023-04-01\",\"to\":"));

    let mut a = args(Path::new(CAMS_STATEMENT));
    a.pretty = true;
    let (res, pretty, _) = run_and_get_output(a);
    assert!(res.is_ok());
    assert!(pretty.starts_with("{\n  \"statement_period\": {\n    \"from\": \"2023-04-01\","));

    let (_, spaced, _) = run_and_get_output(args(Path::new(CAMS_STATEMENT)));

    // Same document, whatever the layout
    assert_json_eq(&compact, &spaced);
    assert_json_eq(&pretty, &spaced);
}

#[test]
fn test_idempotent() {
    let (_, out1, _) = run_and_get_output(args(Path::new(CAMS_STATEMENT)));
    let (_, out2, _) = run_and_get_output(args(Path::new(CAMS_STATEMENT)));
    assert_ne!(out1, "");
    assert_eq!(out1, out2);
}

#[test]
fn test_missing_file() {
    let cases = vec!["./tests/data/cas/missing.pdf", "./tests/data/cas/missing.txt"];
    for path in cases {
        run_test(path, || {
            let msg = assert_failed_with(args(Path::new(path)));
            assert_re(r"^Unable to read \./tests/data/cas/missing\.(pdf|txt): ", &msg);
        });
    }
}

#[test]
fn test_unparseable_files() {
    let dir = NonAutoCreatingTestDir::new();

    let not_pdf = dir.write_file("statement.pdf", b"This is not a PDF");
    let msg = assert_failed_with(args(&not_pdf));
    assert!(msg.starts_with("Unable to load PDF "), "{msg}");

    let summary = dir.write_file(
        "summary.txt",
        b"Consolidated Account Summary\nCAMSCASWS-1\n01-Apr-2023 To 31-Mar-2024\n",
    );
    let msg = assert_failed_with(args(&summary));
    assert_eq!(
        msg,
        format!(
            "Failed to parse {}: Summary statements are not supported. \
             A detailed statement is required",
            summary.display()
        )
    );
}

fn write_hello_pdf(path: &PathBuf) {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal("Hello")]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id =
        doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn test_unencrypted_pdf_is_not_a_statement() {
    let dir = NonAutoCreatingTestDir::new();
    let path = dir.write_file("hello.pdf", b"");
    write_hello_pdf(&path);

    let mut a = args(&path);
    // Ignored for unencrypted documents
    a.password = "not-needed".to_string();
    let msg = assert_failed_with(a);
    assert_eq!(
        msg,
        format!("Failed to parse {}: Unable to determine CAS type", path.display())
    );
}

#[test]
fn test_encrypted_pdf() {
    let dir = NonAutoCreatingTestDir::new();

    // RC4: lopdf rejects the password
    let rc4 = dir.write_file("rc4.pdf", b"");
    write_encrypted_pdf_stub(&rc4, 1, 2);
    let mut a = args(&rc4);
    a.password = "ABCDE1234F".to_string();
    let msg = assert_failed_with(a);
    assert_eq!(msg, format!("Incorrect Password: unable to decrypt {}", rc4.display()));

    // AES: lopdf cannot decrypt it at all, whatever the password
    let aes = dir.write_file("aes.pdf", b"");
    write_encrypted_pdf_stub(&aes, 4, 4);
    let mut a = args(&aes);
    a.password = "ABCDE1234F".to_string();
    let msg = assert_failed_with(a);
    assert!(msg.starts_with(&format!("Unable to decrypt {}: ", aes.display())), "{msg}");
}
