use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Number;

/// Characters `encodeURIComponent` leaves untouched besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Build a WhatsApp deep link asking about a product.
///
/// Only the ASCII digits of `phone` are kept. A product without a price is
/// quoted as `N/A`.
#[must_use]
pub fn build_whatsapp_link(
    phone: &str,
    name: &str,
    price: Option<&Number>,
    page_url: &str,
) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let price = price.map_or_else(|| "N/A".to_string(), ToString::to_string);
    let message =
        format!("Hello! I'm interested in \"{name}\" priced at ₹{price}. Link: {page_url}");
    format!(
        "https://wa.me/{digits}?text={}",
        utf8_percent_encode(&message, URI_COMPONENT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_keeps_only_phone_digits() {
        let link = build_whatsapp_link("+91 98711-71608", "Kite", Some(&Number::from(150)), "");
        assert!(link.starts_with("https://wa.me/919871171608?text="), "{link}");
    }

    #[test]
    fn message_is_uri_component_encoded() {
        let link = build_whatsapp_link(
            "919871171608",
            "Blue Dump Truck (Large)",
            Some(&Number::from(1299)),
            "https://toybazaar.example/toys/blue-dump-truck?ref=a&b=1",
        );
        assert_eq!(
            link,
            "https://wa.me/919871171608?text=Hello!%20I'm%20interested%20in%20%22Blue%20Dump%20Truck%20(Large)%22%20priced%20at%20%E2%82%B91299.%20Link%3A%20https%3A%2F%2Ftoybazaar.example%2Ftoys%2Fblue-dump-truck%3Fref%3Da%26b%3D1"
        );
    }

    #[test]
    fn fractional_price_is_rendered_as_is() {
        let price = Number::from_f64(99.5).unwrap();
        let link = build_whatsapp_link("1", "Ball", Some(&price), "x");
        assert!(link.contains("%E2%82%B999.5."), "{link}");
    }

    #[test]
    fn missing_price_is_quoted_as_not_available() {
        let link = build_whatsapp_link("1", "Ball", None, "x");
        assert!(link.contains("%E2%82%B9N%2FA."), "{link}");
    }
}
