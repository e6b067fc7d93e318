//! Recommendation Synthesizer
//!
//! Maps (threats, risk score) to ordered advisory strings.
//! Pure: the same input always yields the same list.

use crate::models::types::{RiskLevel, ThreatCategory};

pub const SAFE_ADVISORY: &str = "Transaction appears safe";

/// Build the advisory list for a verdict
///
/// Order: risk-level advisories, then per-category advisories in category
/// declaration order (not detection order), then the safe fallback if empty.
pub fn recommend(threats: &[ThreatCategory], risk_score: f64) -> Vec<String> {
    let mut recommendations: Vec<String> = match RiskLevel::from_score(risk_score) {
        RiskLevel::Critical => vec![
            "CRITICAL: Do not proceed with this transaction".to_string(),
            "Contact support if you believe this is an error".to_string(),
        ],
        RiskLevel::Elevated => vec![
            "WARNING: High risk detected, proceed with caution".to_string(),
            "Verify recipient address manually".to_string(),
        ],
        RiskLevel::Safe => Vec::new(),
    };

    recommendations.extend(
        ThreatCategory::ALL
            .iter()
            .filter(|category| threats.contains(category))
            .flat_map(|category| category.advisories().iter().map(|a| a.to_string())),
    );

    if recommendations.is_empty() {
        recommendations.push(SAFE_ADVISORY.to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_fallback() {
        assert_eq!(recommend(&[], 0.3), vec![SAFE_ADVISORY]);
        // Categories without advisories still fall back to safe
        assert_eq!(
            recommend(&[ThreatCategory::UnknownRecipient], 0.5),
            vec![SAFE_ADVISORY]
        );
    }

    #[test]
    fn test_critical_with_blacklist_hit() {
        let recs = recommend(&[ThreatCategory::MaliciousContract], 0.95);
        assert_eq!(
            recs,
            vec![
                "CRITICAL: Do not proceed with this transaction",
                "Contact support if you believe this is an error",
                "Interacting with known malicious contract",
            ]
        );
    }

    #[test]
    fn test_warning_band_boundaries() {
        let recs = recommend(&[], 0.8);
        assert_eq!(recs[0], "WARNING: High risk detected, proceed with caution");
        assert_eq!(recs[1], "Verify recipient address manually");
        assert_eq!(recommend(&[], 0.5), vec![SAFE_ADVISORY]);
    }

    #[test]
    fn test_category_order_is_declaration_order() {
        let detected = [
            ThreatCategory::FlashLoanAttack,
            ThreatCategory::Honeypot,
            ThreatCategory::MaliciousContract,
        ];
        let recs = recommend(&detected, 1.0);
        assert_eq!(
            &recs[2..],
            &[
                "Interacting with known malicious contract",
                "Potential honeypot detected - tokens may not be sellable",
                "Complex transaction pattern detected",
                "Ensure you understand all program interactions",
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let threats = [ThreatCategory::Honeypot, ThreatCategory::SuspiciousAmount];
        assert_eq!(recommend(&threats, 0.9), recommend(&threats, 0.9));
    }

    #[test]
    fn test_every_category_has_table_entry() {
        let with_advice: Vec<_> = ThreatCategory::ALL
            .iter()
            .filter(|c| !c.advisories().is_empty())
            .collect();
        assert_eq!(with_advice.len(), 3);
    }
}
