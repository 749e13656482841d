use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;

use crate::util::decimal::{is_negative, is_positive, parse_large_decimal};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TransactionType {
    Purchase,
    PurchaseSip,
    Redemption,
    SwitchIn,
    SwitchInMerger,
    SwitchOut,
    SwitchOutMerger,
    DividendPayout,
    DividendReinvest,
    Segregation,
    StampDutyTax,
    TdsTax,
    SttTax,
    Reversal,
    Misc,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "PURCHASE",
            TransactionType::PurchaseSip => "PURCHASE_SIP",
            TransactionType::Redemption => "REDEMPTION",
            TransactionType::SwitchIn => "SWITCH_IN",
            TransactionType::SwitchInMerger => "SWITCH_IN_MERGER",
            TransactionType::SwitchOut => "SWITCH_OUT",
            TransactionType::SwitchOutMerger => "SWITCH_OUT_MERGER",
            TransactionType::DividendPayout => "DIVIDEND_PAYOUT",
            TransactionType::DividendReinvest => "DIVIDEND_REINVEST",
            TransactionType::Segregation => "SEGREGATION",
            TransactionType::StampDutyTax => "STAMP_DUTY_TAX",
            TransactionType::TdsTax => "TDS_TAX",
            TransactionType::SttTax => "STT_TAX",
            TransactionType::Reversal => "REVERSAL",
            TransactionType::Misc => "MISC",
        }
    }
}

lazy_static! {
    static ref DIVIDEND_RE: Regex = RegexBuilder::new(r"\b(?:div|dividend|idcw)\b")
        .case_insensitive(true)
        .build()
        .unwrap();

    static ref SIP_RE: Regex = RegexBuilder::new(r"\bsip\b|systematic")
        .case_insensitive(true)
        .build()
        .unwrap();

    // eg. "IDCW Paid @ Rs.0.25 per unit", "Div. Reinvested @ Rs. 1.5"
    static ref DIVIDEND_RATE_RE: Regex = RegexBuilder::new(
        r"\b(?:div|dividend|idcw)\b.*?@\s*rs\.?\s*(\d[\d,]*(?:\.\d+)?)")
        .case_insensitive(true)
        .build()
        .unwrap();
}

/// Decides the type of a transaction from its description and whether units
/// were bought, sold, or not involved at all (None).
pub fn get_transaction_type(description: &str, units: Option<Decimal>) -> TransactionType {
    let desc = description.to_lowercase();
    let is_dividend = DIVIDEND_RE.is_match(&desc);

    match units {
        Some(u) if is_positive(&u) => {
            if desc.contains("switch") {
                if desc.contains("merger") {
                    TransactionType::SwitchInMerger
                } else {
                    TransactionType::SwitchIn
                }
            } else if SIP_RE.is_match(&desc) {
                TransactionType::PurchaseSip
            } else if is_dividend {
                TransactionType::DividendReinvest
            } else if desc.contains("segregat") {
                TransactionType::Segregation
            } else {
                TransactionType::Purchase
            }
        }
        Some(u) if is_negative(&u) => {
            if desc.contains("reversal") {
                TransactionType::Reversal
            } else if desc.contains("switch") {
                if desc.contains("merger") {
                    TransactionType::SwitchOutMerger
                } else {
                    TransactionType::SwitchOut
                }
            } else {
                TransactionType::Redemption
            }
        }
        // No units, or a zero unit entry
        _ => {
            if desc.contains("stt") {
                TransactionType::SttTax
            } else if desc.contains("stamp") {
                TransactionType::StampDutyTax
            } else if desc.contains("tds") {
                TransactionType::TdsTax
            } else if is_dividend {
                TransactionType::DividendPayout
            } else {
                TransactionType::Misc
            }
        }
    }
}

/// Finds the per-unit dividend in descriptions like
/// "IDCW Reinvestment @ Rs.0.25 per unit"
pub fn get_dividend_rate(description: &str) -> Option<Decimal> {
    DIVIDEND_RATE_RE
        .captures(description)
        .and_then(|m| parse_large_decimal(m.get(1).unwrap().as_str()).ok())
}
