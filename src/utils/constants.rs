//! Constants Module - Single Source of Truth
//!
//! Every threshold, normalization divisor and well-known address used by
//! the scoring pipeline is defined here. Other modules import from this
//! file instead of repeating literals.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "ChainGuard";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version string reported by the inference model
pub const MODEL_VERSION: &str = "2.1.0";

// ============================================
// NETWORK TOPOLOGY
// ============================================

/// Width of the feature vector fed into the network
pub const INPUT_WIDTH: usize = 10;

/// Hidden layer widths, in evaluation order
pub const HIDDEN_WIDTHS: [usize; 3] = [64, 32, 16];

/// Width of the output layer
pub const OUTPUT_WIDTH: usize = 1;

/// Number of trailing filler slots in the feature vector
pub const FILLER_SLOTS: usize = 4;

/// Weight init range, lower bound (inclusive)
pub const WEIGHT_INIT_MIN: f64 = -0.1;
/// Weight init range, upper bound (exclusive)
pub const WEIGHT_INIT_MAX: f64 = 0.1;
/// Bias init range, upper bound (exclusive); lower bound is 0
pub const BIAS_INIT_MAX: f64 = 0.1;

/// Confidence never drops below this floor
pub const MIN_CONFIDENCE: f64 = 0.5;

// ============================================
// FEATURE NORMALIZATION
// ============================================

pub const AMOUNT_SCALE: f64 = 1_000_000.0;
pub const RECIPIENT_AGE_SCALE: f64 = 365.0;
pub const PROGRAM_INTERACTION_SCALE: f64 = 10.0;
pub const GAS_PRICE_SCALE: f64 = 10_000.0;
pub const COMPLEXITY_SCALE: f64 = 100.0;

/// Complexity weight per instruction
pub const COMPLEXITY_INSTRUCTION_WEIGHT: f64 = 0.3;
/// Complexity weight per distinct account
pub const COMPLEXITY_ACCOUNT_WEIGHT: f64 = 0.7;

// ============================================
// RULE OVERLAY
// ============================================

/// Blacklist hit floors the risk score here
pub const BLACKLIST_RISK_FLOOR: f64 = 0.95;

/// Transfers above this many lamports are suspicious
pub const SUSPICIOUS_AMOUNT_LIMIT: f64 = 1_000_000.0;
pub const SUSPICIOUS_AMOUNT_PENALTY: f64 = 0.20;

/// Unknown recipients younger than this (days) are flagged
pub const MIN_RECIPIENT_AGE_DAYS: u32 = 7;
pub const UNKNOWN_RECIPIENT_PENALTY: f64 = 0.15;

/// More instructions than this look like a flash loan bundle
pub const MAX_PROGRAM_INTERACTIONS: u32 = 5;
pub const FLASH_LOAN_PENALTY: f64 = 0.25;

/// Honeypot payload marker and minimum payload length (exclusive)
pub const HONEYPOT_MARKER: [u8; 2] = [0xDE, 0xAD];
pub const HONEYPOT_MIN_PAYLOAD_LEN: usize = 100;
pub const HONEYPOT_RISK_FLOOR: f64 = 0.90;

// ============================================
// RECOMMENDATION THRESHOLDS
// ============================================

/// Scores strictly above this are critical
pub const CRITICAL_RISK_THRESHOLD: f64 = 0.8;
/// Scores strictly above this (and not critical) warrant a warning
pub const WARNING_RISK_THRESHOLD: f64 = 0.5;

// ============================================
// SEED BLACKLIST
// ============================================

/// Addresses loaded into the blacklist at startup
pub const SEED_BLACKLIST: [&str; 3] = [
    "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
    "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin",
    "HEvSKofvBgfaexv23kMabbYqxasxU3mQ4ibBMEmJWHny",
];

// ============================================
// SOLANA PROGRAMS
// ============================================

/// System Program ID
pub const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

/// Token Program ID
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Associated Token Program ID
pub const ASSOCIATED_TOKEN_PROGRAM: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// System Program `Transfer` instruction tag
pub const SYSTEM_TRANSFER_TAG: u32 = 2;

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Get a human name for a well-known program
pub fn get_program_name(program_id: &str) -> Option<&'static str> {
    match program_id {
        SYSTEM_PROGRAM => Some("System Program"),
        TOKEN_PROGRAM => Some("SPL Token"),
        ASSOCIATED_TOKEN_PROGRAM => Some("Associated Token"),
        _ => None,
    }
}

// ============================================
// RPC CONSTANTS
// ============================================

/// Public Solana mainnet endpoint used when SOLANA_RPC_URL is unset
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default timeout for RPC requests (seconds)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Page size used when walking an account's signature history
pub const SIGNATURE_PAGE_LIMIT: u64 = 1000;

/// Seconds per day, for account age conversion
pub const SECONDS_PER_DAY: i64 = 86_400;
