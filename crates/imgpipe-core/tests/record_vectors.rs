//! Register payload vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use imgpipe_core::model::{ImageRecord, ImageStatus};

use vector_loader::load;

#[test]
fn record_vectors() {
    let files = [
        "record_full.json",
        "record_missing_fields.json",
        "record_unknown_status.json",
        "record_malformed.json",
        "record_wrong_type.json",
        "record_empty.json",
        "record_null.json",
        "record_trailing.json",
        "record_two_values.json",
    ];

    for f in files {
        let v = load(f);
        let res = ImageRecord::from_json(v.payload.as_bytes());

        match (&v.expect, &v.expect_error) {
            (Some(expect), None) => {
                let rec = res.unwrap_or_else(|e| panic!("{}: unexpected error {e}", v.description));
                let got = serde_json::to_value(&rec).unwrap();
                assert_eq!(&got, expect, "{}", v.description);
            }
            (None, Some(ee)) => {
                let err = res.expect_err(&v.description);
                assert_eq!(err.client_code().as_str(), ee.code, "{}", v.description);
            }
            _ => panic!("{f}: vector must set exactly one of expect / expect_error"),
        }
    }
}

#[test]
fn known_statuses_map_to_variants() {
    let rec = ImageRecord::from_json(br#"{"id":1,"img_status":"Processed"}"#).unwrap();
    assert_eq!(rec.status, ImageStatus::Processed);

    let rec = ImageRecord::from_json(br#"{"id":1,"img_status":"processing"}"#).unwrap();
    assert_eq!(rec.status, ImageStatus::Other("processing".into()));
}

#[test]
fn encode_uses_wire_field_names() {
    let rec = ImageRecord::new(1, "JPEG", "1920x1080", ImageStatus::Processing);
    let s = serde_json::to_string(&rec).unwrap();
    assert_eq!(
        s,
        r#"{"id":1,"format":"JPEG","resolution":"1920x1080","img_status":"Processing"}"#
    );
}
