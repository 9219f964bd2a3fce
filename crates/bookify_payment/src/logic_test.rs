#[cfg(test)]
mod tests {
    use crate::error::PaymentError;
    use crate::logic::{test_webhook_signature, verify_webhook_signature, WebhookPayload};

    const SECRET: &str = "sk_test_0123456789abcdef";

    fn sample_body() -> Vec<u8> {
        serde_json::json!({
            "event": "charge.success",
            "data": {
                "reference": "tx-42",
                "amount": 5000,
                "status": "success",
                "metadata": {
                    "appointment_id": "appt-42",
                    "tenant_id": "tenant-1"
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn valid_signature_passes_verification() {
        let body = sample_body();
        let signature = test_webhook_signature(SECRET, &body);

        assert!(verify_webhook_signature(SECRET, &body, Some(&signature)).is_ok());
        // Hex casing must not matter
        assert!(verify_webhook_signature(SECRET, &body, Some(&signature.to_uppercase())).is_ok());
    }

    #[test]
    fn tampered_body_or_missing_header_fails_verification() {
        let body = sample_body();
        let signature = test_webhook_signature(SECRET, &body);

        let mut tampered = body.clone();
        tampered[0] ^= 1;
        assert!(matches!(
            verify_webhook_signature(SECRET, &tampered, Some(&signature)),
            Err(PaymentError::WebhookSignatureError)
        ));
        assert!(matches!(
            verify_webhook_signature(SECRET, &body, None),
            Err(PaymentError::WebhookSignatureError)
        ));
        assert!(matches!(
            verify_webhook_signature(SECRET, &body, Some("not-hex")),
            Err(PaymentError::WebhookSignatureError)
        ));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let body = sample_body();
        let signature = test_webhook_signature("sk_test_other", &body);

        assert!(matches!(
            verify_webhook_signature(SECRET, &body, Some(&signature)),
            Err(PaymentError::WebhookSignatureError)
        ));
    }

    #[test]
    fn webhook_payload_exposes_appointment_metadata() {
        let payload: WebhookPayload = serde_json::from_slice(&sample_body()).unwrap();

        assert_eq!(payload.event.as_deref(), Some("charge.success"));
        assert_eq!(payload.appointment_id(), Some("appt-42"));
        assert_eq!(payload.tenant_id(), Some("tenant-1"));
        let data = payload.data.unwrap();
        assert_eq!(data.reference.as_deref(), Some("tx-42"));
        assert_eq!(data.amount, Some(5000));
    }

    #[test]
    fn payload_without_metadata_resolves_to_none() {
        let body = serde_json::json!({
            "event": "charge.success",
            "data": { "reference": "tx-7", "amount": 100, "status": "success" }
        })
        .to_string();
        let payload: WebhookPayload = serde_json::from_str(&body).unwrap();

        assert_eq!(payload.appointment_id(), None);
        assert_eq!(payload.tenant_id(), None);
    }
}
