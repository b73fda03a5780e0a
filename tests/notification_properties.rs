//! Property tests for the verification engine.

use std::collections::BTreeMap;

use proptest::prelude::*;
use secrecy::SecretString;

use mycard_notify::domain::notification::{
    Channel, InboundPayload, NotificationError, NotificationParser, SignatureComputer,
    SignaturePurpose, TrustContext,
};

const APP_ID: &str = "APP1";
const FAC_KEY: &str = "property_fac_key";

fn context() -> TrustContext {
    TrustContext::new(
        APP_ID,
        Some(SecretString::new(FAC_KEY.to_string())),
        ["220.130.127.125", "218.32.37.148"],
    )
}

fn signer() -> SignatureComputer {
    SignatureComputer::from_context(&context())
}

fn field_map(pairs: &[(&str, String)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

proptest! {
    #[test]
    fn non_empty_data_always_selects_notify(
        data in "[ -~]{1,40}",
        other in "[a-z0-9]{0,10}",
        ip in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
    ) {
        let payload = InboundPayload::from_fields(
            field_map(&[("DATA", data), ("ReturnCode", other.clone()), ("Hash", other)]),
            ip,
        );
        prop_assert_eq!(NotificationParser::select_channel(&payload), Channel::Notify);
    }

    #[test]
    fn missing_data_always_selects_return(
        code in "[0-9]{0,2}",
        seq in "[A-Z0-9]{0,12}",
    ) {
        let payload = InboundPayload::from_fields(
            field_map(&[("ReturnCode", code), ("FacTradeSeq", seq), ("DATA", String::new())]),
            "203.0.113.9",
        );
        prop_assert_eq!(NotificationParser::select_channel(&payload), Channel::Return);
    }

    #[test]
    fn accepted_result_matches_selected_channel(
        seqs in prop::collection::vec("[A-Z0-9]{1,10}", 1..5),
    ) {
        let data = serde_json::json!({
            "ReturnCode": "1",
            "ReturnMsg": "OK",
            "FacServiceId": APP_ID,
            "FacTradeSeq": seqs.clone(),
        });
        let payload = InboundPayload::from_fields(
            field_map(&[("DATA", data.to_string())]),
            "218.32.37.148",
        );

        let result = NotificationParser::new(context()).parse(&payload).unwrap();
        prop_assert_eq!(result.channel, NotificationParser::select_channel(&payload));
        prop_assert_eq!(&result.transaction_id, seqs.last().unwrap());
    }

    #[test]
    fn failed_return_code_echoes_processor_message(
        code in "[02-9]",
        message in "[A-Za-z ]{1,30}",
    ) {
        let payload = InboundPayload::from_fields(
            field_map(&[
                ("ReturnCode", code),
                ("ReturnMsg", message.clone()),
                ("PayResult", "3".to_string()),
                ("FacTradeSeq", "ORDER-1".to_string()),
            ]),
            "203.0.113.9",
        );

        let err = NotificationParser::new(context()).parse(&payload).unwrap_err();
        prop_assert_eq!(err, NotificationError::ProcessorRejected(message));
    }

    #[test]
    fn failed_pay_result_echoes_message_regardless_of_signature(
        pay_result in "[0-24-9]|[1-9][0-9]{1,2}",
        message in "[A-Za-z ]{1,30}",
        hash in prop::option::of("[0-9a-f]{0,64}"),
    ) {
        let mut fields = vec![
            ("ReturnCode", "1".to_string()),
            ("ReturnMsg", message.clone()),
            ("PayResult", pay_result),
            ("FacTradeSeq", "ORDER-1".to_string()),
        ];
        if let Some(hash) = hash {
            fields.push(("Hash", hash));
        }
        let payload = InboundPayload::from_fields(field_map(&fields), "203.0.113.9");

        let err = NotificationParser::new(context()).parse(&payload).unwrap_err();
        prop_assert_eq!(err, NotificationError::ProcessorRejected(message));
    }

    #[test]
    fn signature_is_deterministic_lowercase_hex(
        seq in "[A-Za-z0-9 /&+]{1,20}",
        amount in "[0-9]{1,6}",
    ) {
        let fields = field_map(&[
            ("ReturnCode", "1".to_string()),
            ("PayResult", "3".to_string()),
            ("FacTradeSeq", seq),
            ("Amount", amount),
        ]);

        let first = signer().compute_signature(&fields, SignaturePurpose::ReturnHash).unwrap();
        let second = signer().compute_signature(&fields, SignaturePurpose::ReturnHash).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), 64);
        prop_assert!(first.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        prop_assert!(signer()
            .verify(&fields, SignaturePurpose::ReturnHash, &first.to_uppercase())
            .unwrap());
    }

    #[test]
    fn changing_a_signed_field_breaks_the_signature(
        original in "[a-z0-9]{1,12}",
        replacement in "[a-z0-9]{1,12}",
    ) {
        prop_assume!(original != replacement);

        let mut fields = field_map(&[
            ("ReturnCode", "1".to_string()),
            ("PayResult", "3".to_string()),
            ("FacTradeSeq", "ORDER-1".to_string()),
            ("MyCardTradeNo", original),
        ]);
        let hash = signer().compute_signature(&fields, SignaturePurpose::ReturnHash).unwrap();

        fields.insert("MyCardTradeNo".to_string(), replacement);
        prop_assert!(!signer()
            .verify(&fields, SignaturePurpose::ReturnHash, &hash)
            .unwrap());
    }
}
