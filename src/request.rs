//! Request target construction.
//!
//! The service accepts three URL shapes, chosen by [`OperationRequest::mode`]:
//!
//! | Mode | Target |
//! |---|---|
//! | [`DispatchMode::Query`] | `<base>/<method>/<apiId>?<params>` |
//! | [`DispatchMode::Bare`] | `<base>/<method>` |
//! | [`DispatchMode::Signed`] | `<base>/<method>/<apiId>?sign=<sign>` |
//!
//! The three shapes are not interchangeable on the server side.

use crate::signer::Signer;
use crate::types::{
    format_amount, DispatchMode, OperationRequest, PaymentLink, PaymentLinkRequest,
    DEFAULT_LINK_DESCRIPTION,
};
use std::time::Instant;
use url::form_urlencoded;

/// Builds the full target URL for an API call.
///
/// # Examples
///
/// ```
/// use anypay_rs::request::build_target;
/// use anypay_rs::types::OperationRequest;
///
/// let target = build_target(
///     &OperationRequest::signed("balance", "abc"),
///     "https://anypay.io/api",
///     "A1",
/// );
/// assert_eq!(target, "https://anypay.io/api/balance/A1?sign=abc");
/// ```
pub fn build_target(request: &OperationRequest, base_url: &str, api_id: &str) -> String {
    match (request.mode(), &request.params, &request.sign) {
        (DispatchMode::Query, Some(params), _) => format!(
            "{}/{}/{}?{}",
            base_url,
            request.method,
            api_id,
            encode_query(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        ),
        (DispatchMode::Signed, _, Some(sign)) => {
            format!("{}/{}/{}?sign={}", base_url, request.method, api_id, sign)
        }
        _ => format!("{}/{}", base_url, request.method),
    }
}

/// Builds a merchant payment link without touching the network.
///
/// Query keys appear as `merchant_id, amount, pay_id, currency, desc`, then the
/// caller's extra parameters, then `sign`. An extra parameter named like a
/// fixed key replaces that key's value in place. `sign` is always the computed
/// digest and appears once, last.
pub fn build_payment_link(
    merchant_url: &str,
    link: &PaymentLinkRequest,
    signer: &Signer<'_>,
) -> PaymentLink {
    let start = Instant::now();

    let amount = format_amount(link.amount);
    let sign = signer.payment_link(link);
    let desc = link.desc.as_deref().unwrap_or(DEFAULT_LINK_DESCRIPTION);

    let mut pairs = vec![
        ("merchant_id", link.merchant.as_str()),
        ("amount", amount.as_str()),
        ("pay_id", link.pay_id.as_str()),
        ("currency", link.currency.as_str()),
        ("desc", desc),
    ];
    for (key, value) in &link.params {
        if key == "sign" {
            continue;
        }
        match pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value.as_str(),
            None => pairs.push((key.as_str(), value.as_str())),
        }
    }
    pairs.push(("sign", sign.as_str()));

    PaymentLink {
        url: format!("{}?{}", merchant_url, encode_query(pairs)),
        elapsed: start.elapsed(),
    }
}

fn encode_query<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Credentials;

    const BASE: &str = "https://anypay.io/api";

    #[test]
    fn test_signed_target() {
        let request = OperationRequest::signed("rates", "deadbeef");
        assert_eq!(
            build_target(&request, BASE, "A1"),
            "https://anypay.io/api/rates/A1?sign=deadbeef"
        );
    }

    #[test]
    fn test_query_target_keeps_param_order() {
        let request = OperationRequest::with_params(
            "payments",
            vec![
                ("sign".to_string(), "abc".to_string()),
                ("project_id".to_string(), "42".to_string()),
                ("offset".to_string(), "10".to_string()),
            ],
        );
        assert_eq!(
            build_target(&request, BASE, "A1"),
            "https://anypay.io/api/payments/A1?sign=abc&project_id=42&offset=10"
        );
    }

    #[test]
    fn test_query_target_encodes_values() {
        let request = OperationRequest::with_params(
            "create-payout",
            vec![("status_url".to_string(), "https://x.io/a b".to_string())],
        );
        assert_eq!(
            build_target(&request, BASE, "A1"),
            "https://anypay.io/api/create-payout/A1?status_url=https%3A%2F%2Fx.io%2Fa+b"
        );
    }

    #[test]
    fn test_bare_target() {
        assert_eq!(
            build_target(&OperationRequest::bare("balance"), BASE, "A1"),
            "https://anypay.io/api/balance"
        );
    }

    #[test]
    fn test_params_win_over_sign() {
        let request = OperationRequest {
            method: "commissions".to_string(),
            params: Some(vec![("project_id".to_string(), "1".to_string())]),
            sign: Some("never-used".to_string()),
        };
        let target = build_target(&request, BASE, "A1");
        assert_eq!(target, "https://anypay.io/api/commissions/A1?project_id=1");
        assert!(!target.contains("never-used"));
    }

    #[test]
    fn test_payment_link_layout() {
        let creds = Credentials::new("A1", "K1", "S").unwrap();
        let link = PaymentLinkRequest::new("5", 100.0, "RUB", "p1").with_param("foo", "bar");
        let built = build_payment_link("https://anypay.io/merchant", &link, &Signer::new(&creds));

        assert_eq!(
            built.url,
            "https://anypay.io/merchant?merchant_id=5&amount=100&pay_id=p1&currency=RUB\
             &desc=use+module+anypay.io&foo=bar&sign=4408751da17175e47a109ef17206feaa"
        );
    }

    #[test]
    fn test_payment_link_extra_overrides_fixed_key_in_place() {
        let creds = Credentials::new("A1", "K1", "S").unwrap();
        let link = PaymentLinkRequest::new("5", 100.0, "RUB", "p1")
            .with_param("desc", "Order 7")
            .with_param("foo", "bar");
        let built = build_payment_link("https://anypay.io/merchant", &link, &Signer::new(&creds));

        assert_eq!(built.url.matches("desc=").count(), 1);
        assert_eq!(
            built.url,
            "https://anypay.io/merchant?merchant_id=5&amount=100&pay_id=p1&currency=RUB\
             &desc=Order+7&foo=bar&sign=4408751da17175e47a109ef17206feaa"
        );
    }

    #[test]
    fn test_payment_link_ignores_caller_sign() {
        let creds = Credentials::new("A1", "K1", "S").unwrap();
        let link = PaymentLinkRequest::new("5", 100.0, "RUB", "p1")
            .with_param("sign", "forged")
            .with_param("foo", "bar")
            .with_param("foo", "baz");
        let built = build_payment_link("https://anypay.io/merchant", &link, &Signer::new(&creds));

        assert!(!built.url.contains("forged"));
        assert_eq!(built.url.matches("sign=").count(), 1);
        assert!(built.url.ends_with("&foo=baz&sign=4408751da17175e47a109ef17206feaa"));
    }

    #[test]
    fn test_payment_link_custom_desc() {
        let creds = Credentials::new("A1", "K1", "S").unwrap();
        let link = PaymentLinkRequest::new("5", 100.0, "RUB", "p1")
            .with_param("foo", "bar")
            .with_desc("Order #7");
        let built = build_payment_link("https://anypay.io/merchant", &link, &Signer::new(&creds));
        assert!(built.url.contains("&desc=Order+%237&"));
    }
}
