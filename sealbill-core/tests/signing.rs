mod common;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use proptest::prelude::*;
use sealbill_core::invoice::sign::{self, ClaimsVerifier, VerificationError};
use sealbill_core::invoice::{LineItem, PaymentMethod, PaymentStatus, SignedClaims};
use std::sync::LazyLock;

static KEYS: LazyLock<common::KeyPair> = LazyLock::new(common::key_pair);

#[test]
fn sign_then_verify_returns_identical_claims() {
    let keys = common::key_pair();
    let signed = common::sign(common::dummy_finalized_invoice(), &keys);

    let claims = sign::verify(signed.token(), &keys.public_pem).expect("verify token");
    assert_eq!(&claims, signed.claims());
    assert_eq!(claims.iss, "Acme SAS (552 100 554)");
    assert_eq!(claims.sub, "Jane Doe");
    assert_eq!(claims.reference, "INV-2024-001");
    assert_eq!(claims.currency, "EUR");
    assert_eq!(claims.quantity, 2);
    assert_eq!(claims.line_count, 1);
    assert!((claims.amount - 240.0).abs() < 1e-9);
    assert_eq!(claims.payment_status, PaymentStatus::Unpaid);
}

#[test]
fn free_functions_sign_with_pem_keys() {
    let keys = common::key_pair();
    let claims = common::dummy_finalized_invoice().claims();
    let token = sign::sign(&claims, &keys.private_pem).expect("sign claims");
    assert_eq!(token.split('.').count(), 3);
    assert_eq!(sign::verify(&token, &keys.public_pem).expect("verify"), claims);
}

#[test]
fn paid_status_survives_round_trip() {
    let keys = common::key_pair();
    let invoice = common::builder()
        .line_item(LineItem::new("Widget", 2, 100.0, 0.2))
        .payment(PaymentStatus::Paid(PaymentMethod::BankTransfer))
        .build()
        .expect("build");
    let signed = common::sign(invoice, &keys);

    let claims = sign::verify(signed.token(), &keys.public_pem).expect("verify");
    assert_eq!(
        claims.payment_status,
        PaymentStatus::Paid(PaymentMethod::BankTransfer)
    );
}

#[test]
fn empty_invoice_signs_with_zero_totals() {
    let keys = common::key_pair();
    let invoice = common::builder().build().expect("empty invoice builds");
    let signed = common::sign(invoice, &keys);

    let claims = sign::verify(signed.token(), &keys.public_pem).expect("verify");
    assert_eq!(claims.amount, 0.0);
    assert_eq!(claims.quantity, 0);
    assert_eq!(claims.line_count, 0);
}

#[test]
fn changing_any_character_breaks_verification() {
    let keys = common::key_pair();
    let signed = common::sign(common::dummy_finalized_invoice(), &keys);
    let verifier = ClaimsVerifier::from_pem(&keys.public_pem).expect("verifier");
    let token = signed.token();

    for (index, original) in token.char_indices() {
        let replacement = if original == 'A' { 'B' } else { 'A' };
        let mut tampered = String::with_capacity(token.len());
        tampered.push_str(&token[..index]);
        tampered.push(replacement);
        tampered.push_str(&token[index + original.len_utf8()..]);

        assert!(
            verifier.verify(&tampered).is_err(),
            "tampered token verified (position {index})"
        );
    }
}

#[test]
fn flipped_signature_byte_is_an_invalid_signature() {
    let keys = common::key_pair();
    let signed = common::sign(common::dummy_finalized_invoice(), &keys);
    let token = signed.token();

    let signature_start = token.rfind('.').expect("three segments") + 1;
    let index = signature_start + 10;
    let original = token.as_bytes()[index];
    let replacement = if original == b'A' { 'B' } else { 'A' };
    let tampered = format!("{}{}{}", &token[..index], replacement, &token[index + 1..]);

    assert!(matches!(
        sign::verify(&tampered, &keys.public_pem),
        Err(VerificationError::InvalidSignature)
    ));
}

#[test]
fn token_from_another_key_is_rejected() {
    let keys = common::key_pair();
    let other = common::key_pair();
    let signed = common::sign(common::dummy_finalized_invoice(), &keys);

    assert!(matches!(
        sign::verify(signed.token(), &other.public_pem),
        Err(VerificationError::InvalidSignature)
    ));
}

#[test]
fn hmac_token_keyed_with_public_key_is_refused() {
    let keys = common::key_pair();
    let claims = common::dummy_finalized_invoice().claims();
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(keys.public_pem.as_bytes()),
    )
    .expect("forge hs256 token");

    match sign::verify(&forged, &keys.public_pem) {
        Err(VerificationError::AlgorithmMismatch { expected, found }) => {
            assert_eq!(expected, "ES256");
            assert_eq!(found, "HS256");
        }
        other => panic!("expected AlgorithmMismatch, got {other:?}"),
    }
}

#[test]
fn verify_invoice_detects_diverging_amount() {
    let keys = common::key_pair();
    let signed = common::sign(common::dummy_finalized_invoice(), &keys);
    let verifier = ClaimsVerifier::from_pem(&keys.public_pem).expect("verifier");

    verifier
        .verify_invoice(signed.token(), signed.finalized())
        .expect("matching invoice");

    let other = common::builder()
        .line_item(LineItem::new("Widget", 3, 100.0, 0.2))
        .build()
        .expect("build");
    match verifier.verify_invoice(signed.token(), &other) {
        Err(VerificationError::ClaimsMismatch { field }) => assert_eq!(field, "amt"),
        other => panic!("expected ClaimsMismatch, got {other:?}"),
    }
}

#[test]
fn signer_verifier_pair_matches_pem_keys() {
    let keys = common::key_pair();
    let signer = common::signer(&keys);
    assert_eq!(signer.verifying_key(), keys.signing_key.verifying_key());

    let signed = signer
        .sign(common::dummy_finalized_invoice())
        .expect("sign invoice");
    let verifier = signer.verifier().expect("verifier");
    assert_eq!(
        &verifier.verify(signed.token()).expect("verify"),
        signed.claims()
    );
}

#[test]
fn amount_keeps_every_bit_through_the_token() {
    let mut claims = common::dummy_finalized_invoice().claims();
    claims.amount = 103_985_170.119_069_77;

    let token = sign::sign(&claims, &KEYS.private_pem).expect("sign");
    let verified = sign::verify(&token, &KEYS.public_pem).expect("verify");
    assert_eq!(verified.amount.to_bits(), claims.amount.to_bits());
    assert_eq!(verified, claims);
}

fn payment_strategy() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Unpaid),
        Just(PaymentStatus::Paid(PaymentMethod::Cash)),
        Just(PaymentStatus::Paid(PaymentMethod::Card)),
        Just(PaymentStatus::Paid(PaymentMethod::BankTransfer)),
        Just(PaymentStatus::Paid(PaymentMethod::Check)),
        "x_[a-z]{1,10}".prop_map(|tag| PaymentStatus::Paid(PaymentMethod::Other(tag))),
    ]
}

fn claims_strategy() -> impl Strategy<Value = SignedClaims> {
    (
        ("\\PC{0,32}", "\\PC{0,32}", "[A-Z]{3}", "\\PC{1,24}"),
        (0i64..4_102_444_800, 0i64..4_102_444_800),
        (0.0f64..1e12, 0i64..i64::MAX, 0usize..10_000),
        payment_strategy(),
    )
        .prop_map(
            |((iss, sub, currency, reference), (iat, due_date), (amount, quantity, line_count), payment_status)| {
                SignedClaims {
                    iss,
                    sub,
                    iat,
                    due_date,
                    amount,
                    currency,
                    quantity,
                    line_count,
                    reference,
                    payment_status,
                }
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    /// Any claim set comes back from its token field for field.
    #[test]
    fn verify_returns_exactly_what_was_signed(claims in claims_strategy()) {
        let token = sign::sign(&claims, &KEYS.private_pem).expect("sign");
        let verified = sign::verify(&token, &KEYS.public_pem).expect("verify");
        prop_assert_eq!(verified.amount.to_bits(), claims.amount.to_bits());
        prop_assert_eq!(verified, claims);
    }
}
