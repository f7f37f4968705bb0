use chrono::{TimeZone, Utc};
use p256::ecdsa::SigningKey;
use p256::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use sealbill_core::invoice::{
    Address, Client, FinalizedInvoice, InvoiceBuilder, LineItem, Party, RequiredInvoiceFields,
    SellerRole, SignedInvoice,
};
use sealbill_core::invoice::sign::InvoiceSigner;

#[allow(dead_code)]
pub struct KeyPair {
    pub signing_key: SigningKey,
    pub private_pem: String,
    pub public_pem: String,
}

#[allow(dead_code)]
pub fn key_pair() -> KeyPair {
    let signing_key = SigningKey::random(&mut rand_core::OsRng);
    let private_pem = signing_key
        .to_pkcs8_pem(LineEnding::LF)
        .expect("private pem")
        .to_string();
    let public_pem = signing_key
        .verifying_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("public pem");
    KeyPair {
        signing_key,
        private_pem,
        public_pem,
    }
}

#[allow(dead_code)]
pub fn signer(keys: &KeyPair) -> InvoiceSigner {
    InvoiceSigner::from_pem(&keys.private_pem).expect("signer")
}

#[allow(dead_code)]
pub fn dummy_seller() -> Party<SellerRole> {
    Party::<SellerRole>::new(
        "Acme SAS",
        "billing@acme.test",
        Address::new("1 rue de la Paix", "Paris", None, "75002"),
        "552 100 554",
        Some("FR40303265045".into()),
    )
}

#[allow(dead_code)]
pub fn dummy_client() -> Client {
    Client::person(
        "Jane Doe",
        Some(Address::new("12 High Street", "London", None, "N1 9GU")),
    )
}

#[allow(dead_code)]
pub fn required_fields() -> RequiredInvoiceFields {
    RequiredInvoiceFields {
        seller: dummy_seller(),
        client: dummy_client(),
        issue_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        due_date: Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
        currency: "EUR".into(),
        reference: "INV-2024-001".into(),
    }
}

#[allow(dead_code)]
pub fn builder() -> InvoiceBuilder {
    InvoiceBuilder::new(required_fields())
}

/// One line: 2 x 100.00 at 20%.
#[allow(dead_code)]
pub fn dummy_finalized_invoice() -> FinalizedInvoice {
    builder()
        .line_item(LineItem::new("Widget", 2, 100.0, 0.2))
        .build()
        .expect("build dummy invoice")
}

#[allow(dead_code)]
pub fn sign(invoice: FinalizedInvoice, keys: &KeyPair) -> SignedInvoice {
    invoice.sign(&signer(keys)).expect("sign invoice")
}
