// Alex Core - Validation & Speech Library
// Pure validators and text helpers behind the voice-sales agent.
// Exposed to the CLI, the HTTP server, and tests.

pub mod bank;
pub mod brands;     // Card brand rules as data
pub mod card;
pub mod config;
pub mod logging;
pub mod pricing;
pub mod session;    // Injected keep-alive store
pub mod speech;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use bank::{validate_bank, BankInput, BankValidationResult};
pub use brands::{BrandDefinition, BrandRules, BrandSpec, CardBrand};
pub use card::{
    luhn_valid, validate_card, validate_card_at, validate_card_with, CardInput,
    CardValidationResult,
};
pub use config::ServerConfig;
pub use pricing::{price_bundle, BundleItem, BundlePriceResult};
pub use session::{should_keep_alive, InMemoryKeepAlive, KeepAliveStore};
pub use speech::{
    articulate_digits, expand_state_abbrev, sanitize_speech, speak_amount, speak_card_ending,
    speak_reasons,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Keep only ASCII digits: "4111-1111 1111" → "411111111111"
pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}
