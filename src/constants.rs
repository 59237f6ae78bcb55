/// Mobile-money network operators accepted for giving.
pub const PROVIDER_MTN: &str = "mtn";
pub const PROVIDER_VODAFONE: &str = "vodafone";
pub const PROVIDER_AIRTELTIGO: &str = "airteltigo";

/// Header carrying the payment gateway's shared webhook secret.
pub const DEFAULT_WEBHOOK_HEADER: &str = "verif-hash";

/// Prefix for giving references generated by this service.
pub const GIVING_REF_PREFIX: &str = "PH-GIVE";

/// Default ISO currency when a request does not name one.
pub const DEFAULT_CURRENCY: &str = "GHS";

pub fn known_provider(name: &str) -> bool {
    matches!(name, PROVIDER_MTN | PROVIDER_VODAFONE | PROVIDER_AIRTELTIGO)
}
