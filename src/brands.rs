// 🏷️ Card Brand Rules - Rules as Data
// Priority-ordered prefix patterns + per-network length/CVV specs

use anyhow::{anyhow, Context as AnyhowContext, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CARD BRAND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Discover,
    Amex,
}

impl CardBrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::Mastercard => "mastercard",
            CardBrand::Discover => "discover",
            CardBrand::Amex => "amex",
        }
    }

    /// Name the agent reads back to the caller
    pub fn display_name(&self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::Discover => "Discover",
            CardBrand::Amex => "American Express",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardBrand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect();

        match normalized.as_str() {
            "visa" => Ok(CardBrand::Visa),
            "mastercard" | "mc" => Ok(CardBrand::Mastercard),
            "discover" => Ok(CardBrand::Discover),
            "amex" | "americanexpress" => Ok(CardBrand::Amex),
            _ => Err(anyhow!("unknown card brand: {}", s)),
        }
    }
}

// ============================================================================
// BRAND DEFINITION (serializable form)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandDefinition {
    pub brand: CardBrand,

    /// Anchored regex over the normalized digit string
    pub pattern: String,

    pub allowed_lengths: Vec<usize>,

    pub cvv_length: usize,

    /// Priority (higher = tried first during inference)
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    0
}

// ============================================================================
// BRAND SPEC (compiled)
// ============================================================================

#[derive(Debug, Clone)]
pub struct BrandSpec {
    pub brand: CardBrand,
    pub prefix: Regex,
    pub allowed_lengths: Vec<usize>,
    pub cvv_length: usize,
    pub priority: i32,
}

impl BrandSpec {
    pub fn compile(def: &BrandDefinition) -> Result<Self> {
        let prefix = Regex::new(&def.pattern)
            .with_context(|| format!("Invalid prefix pattern for {}: {}", def.brand, def.pattern))?;

        Ok(BrandSpec {
            brand: def.brand,
            prefix,
            allowed_lengths: def.allowed_lengths.clone(),
            cvv_length: def.cvv_length,
            priority: def.priority,
        })
    }

    pub fn matches_prefix(&self, digits: &str) -> bool {
        self.prefix.is_match(digits)
    }

    pub fn allows_length(&self, len: usize) -> bool {
        self.allowed_lengths.contains(&len)
    }
}

// ============================================================================
// STANDARD TABLE
// ============================================================================

const MASTERCARD_PATTERN: &str = r"^(5[1-5]|222[1-9]|22[3-9]\d|2[3-6]\d{2}|27[01]\d|2720)";
const DISCOVER_PATTERN: &str = r"^(6011|65|64[4-9])";

fn standard_definitions() -> Vec<BrandDefinition> {
    vec![
        BrandDefinition {
            brand: CardBrand::Amex,
            pattern: r"^3[47]".to_string(),
            allowed_lengths: vec![15],
            cvv_length: 4,
            priority: 40,
        },
        BrandDefinition {
            brand: CardBrand::Visa,
            pattern: r"^4".to_string(),
            allowed_lengths: vec![13, 16, 19],
            cvv_length: 3,
            priority: 30,
        },
        BrandDefinition {
            brand: CardBrand::Mastercard,
            pattern: MASTERCARD_PATTERN.to_string(),
            allowed_lengths: vec![16],
            cvv_length: 3,
            priority: 20,
        },
        BrandDefinition {
            brand: CardBrand::Discover,
            pattern: DISCOVER_PATTERN.to_string(),
            allowed_lengths: vec![16, 19],
            cvv_length: 3,
            priority: 10,
        },
    ]
}

lazy_static! {
    static ref STANDARD_RULES: BrandRules = BrandRules::from_definitions(standard_definitions())
        .expect("standard brand patterns are valid regexes");
}

// ============================================================================
// BRAND RULES
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct BrandRules {
    specs: Vec<BrandSpec>,
}

impl BrandRules {
    /// Create an empty rule set
    pub fn new() -> Self {
        BrandRules { specs: Vec::new() }
    }

    /// Amex, Visa, Mastercard, Discover - in that inference order
    pub fn standard() -> &'static BrandRules {
        &STANDARD_RULES
    }

    pub fn from_definitions(defs: Vec<BrandDefinition>) -> Result<Self> {
        let mut specs = defs
            .iter()
            .map(BrandSpec::compile)
            .collect::<Result<Vec<_>>>()?;

        // Stable sort keeps table order for equal priorities
        specs.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(BrandRules { specs })
    }

    /// Load definitions from a JSON array
    pub fn from_json(json: &str) -> Result<Self> {
        let defs: Vec<BrandDefinition> =
            serde_json::from_str(json).context("Failed to parse brand rules JSON")?;

        BrandRules::from_definitions(defs)
    }

    pub fn add_spec(&mut self, spec: BrandSpec) {
        self.specs.push(spec);
        self.specs.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// First spec whose prefix matches wins
    pub fn infer(&self, digits: &str) -> Option<&BrandSpec> {
        self.specs.iter().find(|spec| spec.matches_prefix(digits))
    }

    pub fn spec_for(&self, brand: CardBrand) -> Option<&BrandSpec> {
        self.specs.iter().find(|spec| spec.brand == brand)
    }

    pub fn rule_count(&self) -> usize {
        self.specs.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================
