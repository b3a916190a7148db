/// Static carrier code → tracking URL template table.
///
/// Templates carry a single `{tracking}` placeholder. Codes are matched after
/// normalization (lowercase, spaces and dashes folded to `_`), so the free-text
/// carrier names stored on orders ("FedEx", "Canada Post") resolve too.
pub struct CarrierDirectory;

const PLACEHOLDER: &str = "{tracking}";

const TEMPLATES: &[(&str, &str)] = &[
    ("ups", "https://www.ups.com/track?tracknum={tracking}"),
    ("usps", "https://tools.usps.com/go/TrackConfirmAction?tLabels={tracking}"),
    ("fedex", "https://www.fedex.com/fedextrack/?trknbr={tracking}"),
    ("dhl", "https://www.dhl.com/en/express/tracking.html?AWB={tracking}"),
    ("dhl_express", "https://www.dhl.com/en/express/tracking.html?AWB={tracking}"),
    ("dhl_ecommerce", "https://webtrack.dhlecs.com/orders?trackingNumber={tracking}"),
    ("ontrac", "https://www.ontrac.com/tracking/?number={tracking}"),
    ("lasership", "https://www.lasership.com/track/{tracking}"),
    ("amazon", "https://track.amazon.com/tracking/{tracking}"),
    ("canada_post", "https://www.canadapost-postescanada.ca/track-reperage/en#/search?searchFor={tracking}"),
    ("royal_mail", "https://www.royalmail.com/track-your-item#/tracking-results/{tracking}"),
    ("australia_post", "https://auspost.com.au/mypost/track/#/details/{tracking}"),
    ("purolator", "https://www.purolator.com/en/shipping/tracker?pin={tracking}"),
];

impl CarrierDirectory {
    /// Template for a carrier, if the carrier is known.
    pub fn template(carrier: &str) -> Option<&'static str> {
        let code = normalize(carrier);
        TEMPLATES
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, template)| *template)
    }

    /// Tracking URL for a carrier/tracking-number pair.
    ///
    /// `None` for unknown carriers or a blank tracking number.
    pub fn tracking_url(carrier: &str, tracking_number: &str) -> Option<String> {
        let tracking_number = tracking_number.trim();
        if tracking_number.is_empty() {
            return None;
        }
        Self::template(carrier).map(|template| template.replace(PLACEHOLDER, tracking_number))
    }

    pub fn is_known(carrier: &str) -> bool {
        Self::template(carrier).is_some()
    }
}

fn normalize(carrier: &str) -> String {
    carrier
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
