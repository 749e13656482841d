use lazy_static::lazy_static;
use regex::{Captures, Regex, RegexBuilder};
use rust_decimal::Decimal;

use super::model::{CasData, CasType, FileType, InvestorInfo, StatementPeriod};
use crate::util::{
    basic::SError, date::parse_statement_date, decimal::parse_large_decimal,
};

fn ci_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap()
}

lazy_static! {
    static ref STATEMENT_PERIOD_RE: Regex = ci_re(
        r"(?P<from>\d{2}-[a-z]{3}-\d{4})\s+to\s+(?P<to>\d{2}-[a-z]{3}-\d{4})");

    static ref DETAILED_RE: Regex = ci_re(r"Consolidated\s+Account\s+Statement");
    static ref SUMMARY_RE: Regex = ci_re(r"Consolidated\s+Account\s+Summary");
    static ref DEPOSITORY_RE: Regex = ci_re(
        r"NSDL\s+Consolidated|National\s+Securities\s+Depository|Central\s+Depository\s+Services");

    static ref EMAIL_RE: Regex = ci_re(r"^\s*Email\s+Id\s*:\s*(?P<email>\S+)");
    static ref MOBILE_RE: Regex = ci_re(r"^(?P<pre>.*?)\s*Mobile\s*:\s*(?P<mobile>\+?\d[\d \-]*\d)");
}

/// Which registrar produced the statement. Both use the same layout.
pub fn detect_file_type(text: &str) -> FileType {
    if text.contains("CAMSCASWS") {
        FileType::Cams
    } else if text.contains("KFINCASWS") {
        FileType::Kfintech
    } else {
        FileType::Unknown
    }
}

pub fn detect_cas_type(text: &str) -> Result<CasType, SError> {
    // Registrar statements can mention the depositories in their fine print.
    if detect_file_type(text) == FileType::Unknown && DEPOSITORY_RE.is_match(text) {
        Err("NSDL/CDSL depository statements are not supported".to_string())
    } else if DETAILED_RE.is_match(text) {
        Ok(CasType::Detailed)
    } else if SUMMARY_RE.is_match(text) {
        Ok(CasType::Summary)
    } else {
        Err("Unable to determine CAS type".to_string())
    }
}

pub fn parse_statement_period(text: &str) -> Result<StatementPeriod, SError> {
    let m = STATEMENT_PERIOD_RE
        .captures(text)
        .ok_or("Unable to find statement period")?;
    Ok(StatementPeriod {
        from: parse_statement_date(&m["from"])?,
        to: parse_statement_date(&m["to"])?,
    })
}

/// Investor details are in the statement header, like:
///
/// Email Id: someone@example.com
/// SOME ONE
/// 12 SOME ROAD
/// SOME CITY 560001
/// Mobile: +919876543210
///
/// The lines between the name and the mobile number are the address.
pub fn parse_investor_info(text: &str) -> Result<InvestorInfo, SError> {
    enum State {
        LookingForEmail,
        LookingForName,
        GatheringAddress,
    }

    let mut state = State::LookingForEmail;
    let mut info = InvestorInfo::default();
    let mut address_lines = Vec::<&str>::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match state {
            State::LookingForEmail => {
                if let Some(m) = EMAIL_RE.captures(line) {
                    info.email = m["email"].to_string();
                    state = State::LookingForName;
                }
            }
            State::LookingForName => {
                info.name = line.to_string();
                state = State::GatheringAddress;
            }
            State::GatheringAddress => {
                if let Some(m) = MOBILE_RE.captures(line) {
                    let pre = m.name("pre").unwrap().as_str().trim();
                    if !pre.is_empty() {
                        address_lines.push(pre);
                    }
                    info.mobile = m["mobile"].to_string();
                    info.address = address_lines.join("\n");
                    return Ok(info);
                }
                address_lines.push(line);
            }
        }
    }

    Err(match state {
        State::LookingForEmail => "Unable to find investor email",
        _ => "Unable to find investor mobile number",
    }
    .to_string())
}

fn dec_group(m: &Captures, name: &str) -> Result<Decimal, SError> {
    let s = m.name(name).unwrap().as_str();
    parse_large_decimal(s)
        .map_err(|e| format!("Unable to parse {} from \"{}\": {}", name, s, e))
}

fn opt_dec_group(m: &Captures, name: &str) -> Result<Option<Decimal>, SError> {
    match m.name(name) {
        Some(_) => dec_group(m, name).map(Some),
        None => Ok(None),
    }
}

mod sm {
    use lazy_static::lazy_static;
    use regex::Regex;
    use rust_decimal::Decimal;

    use super::{ci_re, dec_group, opt_dec_group};
    use crate::cas::model::{Folio, Scheme, SchemeValuation, Transaction};
    use crate::cas::txtype::{get_dividend_rate, get_transaction_type};
    use crate::util::{basic::SError, date::parse_statement_date};

    // Amounts and units. Negatives are usually in parentheses.
    const NUM: &str = r"\(?-?\d[\d,]*\.\d+\)?";
    // Balances may or may not have a fractional part
    const BAL: &str = r"\(?-?\d[\d,]*(?:\.\d+)?\)?";
    const DATE: &str = r"\d{2}-[a-z]{3}-\d{4}";

    lazy_static! {
        // The period line repeated at the top of each page. Transaction
        // descriptions can contain a period too (SIP registrations), so this
        // must be the whole line.
        static ref PERIOD_HEADER_RE: Regex = ci_re(
            &format!(r"^\s*{DATE}\s+to\s+{DATE}\s*$"));

        // eg. "Axis Mutual Fund"
        static ref AMC_RE: Regex = ci_re(
            r"^\s*(?P<amc>[a-z].*?\s(?:Mutual\s+Fund|Asset\s+Management(?:\s+Co(?:mpany|\.)?)?(?:\s+(?:Ltd\.?|Limited))?))\s*$");

        // eg. "Folio No: 91012345678 / 0   PAN: ABCDE1234F   KYC: OK   PAN: OK"
        static ref FOLIO_RE: Regex = ci_re(
            r"Folio\s+No\s*:\s*(?P<folio>\d[\d\s/]*?)\s*(?:PAN\b|KYC\b|$)");
        static ref PAN_RE: Regex = ci_re(r"\bPAN\s*:\s*(?P<pan>[a-z]{5}\d{4}[a-z])");
        static ref KYC_RE: Regex = ci_re(r"\bKYC\s*:\s*(?P<kyc>NOT\s+OK|OK)");
        static ref PANKYC_RE: Regex = ci_re(
            r"\bKYC\s*:\s*(?:NOT\s+OK|OK)\s+PAN\s*:\s*(?P<pankyc>NOT\s+OK|OK)");

        // eg. "J75D-Axis ELSS Fund - Direct Growth - ISIN: INF846K01EW2(Advisor: DIRECT) Registrar : KFINTECH"
        static ref SCHEME_RE: Regex = ci_re(
            r"^\s*(?P<code>[a-z0-9]+)\s*-\s*(?P<name>\S.*?)\s*-?\s*ISIN\s*:\s*(?P<isin>[a-z]{2}[a-z0-9]{9}\d)(?:\s*\(\s*Advisor\s*:\s*(?P<advisor>[^)]*?)\s*\))?");
        static ref REGISTRAR_RE: Regex = ci_re(r"\bRegistrar\s*:\s*(?P<rta>\S+)");

        static ref OPEN_UNITS_RE: Regex = ci_re(
            &format!(r"Opening\s+Unit\s+Balance\s*:\s*(?P<units>{BAL})"));
        static ref CLOSE_UNITS_RE: Regex = ci_re(
            &format!(r"Closing\s+Unit\s+Balance\s*:\s*(?P<units>{BAL})"));
        static ref NAV_RE: Regex = ci_re(
            &format!(r"\bNAV\s+on\s+(?P<date>{DATE})\s*:\s*(?:INR|Rs\.?)\s*(?P<nav>{BAL})"));
        static ref COST_RE: Regex = ci_re(
            &format!(r"Total\s+Cost\s+Value\s*:\s*(?P<cost>{BAL})"));
        static ref VALUE_RE: Regex = ci_re(
            &format!(r"(?:Market\s+Value|Valuation)\s+on\s+(?P<date>{DATE})\s*:\s*(?:INR|Rs\.?)\s*(?P<value>{BAL})"));

        // Date Description Amount Units NAV Balance
        static ref TX_FULL_RE: Regex = ci_re(&format!(
            r"^\s*(?P<date>{DATE})\s+(?P<desc>\S.*?)\s+(?P<amount>{NUM})\s+(?P<units>{NUM})\s+(?P<nav>{NUM})\s+(?P<balance>{NUM})\s*$"));
        // Date Description Amount (taxes, payouts)
        static ref TX_AMOUNT_RE: Regex = ci_re(&format!(
            r"^\s*(?P<date>{DATE})\s+(?P<desc>\S.*?)\s+(?P<amount>{NUM})\s*$"));
        // Date Description (notices, like address changes)
        static ref TX_DESC_RE: Regex = ci_re(&format!(
            r"^\s*(?P<date>{DATE})\s+(?P<desc>\S.*?)\s*$"));
    }

    /// Parses the body of a detailed statement, one line at a time.
    ///
    /// Folios are started by a "Folio No:" line, and belong to the AMC whose
    /// name was last seen. Schemes are started by their name/ISIN line, and
    /// everything after that (balances, valuation, transactions) belongs to
    /// that scheme until the next scheme or folio.
    pub struct DetailedParseSm {
        pub folios: Vec<Folio>,

        current_amc: String,
        current_scheme: Option<Scheme>,
    }

    impl DetailedParseSm {
        pub fn new() -> Self {
            DetailedParseSm {
                folios: Vec::new(),
                current_amc: String::new(),
                current_scheme: None,
            }
        }

        pub fn parse_line(&mut self, line: &str) -> Result<(), SError> {
            if line.trim().is_empty() {
                return Ok(());
            }

            // Repeated page headers
            if PERIOD_HEADER_RE.is_match(line) {
                return Ok(());
            }

            if let Some(m) = AMC_RE.captures(line) {
                self.current_amc = m["amc"].trim().to_string();
                return Ok(());
            }

            if let Some(m) = FOLIO_RE.captures(line) {
                self.gather_folio_line(line, m["folio"].trim());
                return Ok(());
            }

            if let Some(m) = SCHEME_RE.captures(line) {
                self.finalize_scheme();
                if self.folios.is_empty() {
                    return Err(format!(
                        "Found scheme \"{}\" before any folio",
                        m["name"].trim()
                    ));
                }
                self.current_scheme = Some(Scheme {
                    scheme: m["name"].trim().to_string(),
                    isin: m["isin"].to_uppercase(),
                    advisor: m.name("advisor").map(|a| a.as_str().to_string()),
                    rta_code: m["code"].to_string(),
                    rta: None,
                    open: Decimal::ZERO,
                    close: Decimal::ZERO,
                    close_calculated: Decimal::ZERO,
                    valuation: SchemeValuation::default(),
                    transactions: Vec::new(),
                });
                // The registrar is sometimes on the same line
                self.gather_scheme_details(line)?;
                return Ok(());
            }

            if self.current_scheme.is_some() {
                self.gather_scheme_details(line)?;
                self.gather_transaction(line)?;
            } else {
                tracing::trace!("Ignoring line outside of scheme: {line}");
            }
            Ok(())
        }

        /// Finalizes the last scheme and returns all folios.
        pub fn finish(mut self) -> Vec<Folio> {
            self.finalize_scheme();
            self.folios
        }

        fn gather_folio_line(&mut self, line: &str, folio_num: &str) {
            // Folios continue across pages, where the folio line is repeated.
            if let Some(f) = self.folios.last() {
                if f.folio == folio_num {
                    return;
                }
            }
            self.finalize_scheme();
            tracing::debug!("New folio {folio_num} ({})", self.current_amc);
            self.folios.push(Folio {
                folio: folio_num.to_string(),
                amc: self.current_amc.clone(),
                pan: PAN_RE.captures(line).map(|m| m["pan"].to_uppercase()),
                kyc: KYC_RE.captures(line).map(|m| m["kyc"].to_uppercase()),
                pan_kyc: PANKYC_RE
                    .captures(line)
                    .map(|m| m["pankyc"].to_uppercase()),
                schemes: Vec::new(),
            });
        }

        /// Balance, valuation and registrar details. Several of these can
        /// be on one line.
        fn gather_scheme_details(&mut self, line: &str) -> Result<(), SError> {
            let scheme = match self.current_scheme.as_mut() {
                Some(s) => s,
                None => return Ok(()),
            };

            if let Some(m) = REGISTRAR_RE.captures(line) {
                scheme.rta = Some(m["rta"].to_string());
            }
            if let Some(m) = OPEN_UNITS_RE.captures(line) {
                scheme.open = dec_group(&m, "units")?;
            }
            if let Some(m) = CLOSE_UNITS_RE.captures(line) {
                scheme.close = dec_group(&m, "units")?;
            }
            if let Some(m) = NAV_RE.captures(line) {
                scheme.valuation.date = Some(parse_statement_date(&m["date"])?);
                scheme.valuation.nav = Some(dec_group(&m, "nav")?);
            }
            if let Some(m) = COST_RE.captures(line) {
                scheme.valuation.cost = Some(dec_group(&m, "cost")?);
            }
            if let Some(m) = VALUE_RE.captures(line) {
                scheme.valuation.date = Some(parse_statement_date(&m["date"])?);
                scheme.valuation.value = Some(dec_group(&m, "value")?);
            }
            Ok(())
        }

        fn gather_transaction(&mut self, line: &str) -> Result<(), SError> {
            let scheme = match self.current_scheme.as_mut() {
                Some(s) => s,
                None => return Ok(()),
            };

            let m = match TX_FULL_RE
                .captures(line)
                .or_else(|| TX_AMOUNT_RE.captures(line))
                .or_else(|| TX_DESC_RE.captures(line))
            {
                Some(m) => m,
                None => return Ok(()),
            };

            let description = m["desc"].trim().to_string();
            let units = opt_dec_group(&m, "units")?;
            let tx = Transaction {
                date: parse_statement_date(&m["date"])?,
                amount: opt_dec_group(&m, "amount")?,
                units,
                nav: opt_dec_group(&m, "nav")?,
                balance: opt_dec_group(&m, "balance")?,
                tx_type: get_transaction_type(&description, units),
                dividend_rate: get_dividend_rate(&description),
                description,
            };
            tracing::trace!("Transaction: {tx:?}");
            scheme.transactions.push(tx);
            Ok(())
        }

        /// Computes the closing balance from the transactions, and files
        /// the scheme under the current folio.
        fn finalize_scheme(&mut self) {
            let mut scheme = match self.current_scheme.take() {
                Some(s) => s,
                None => return,
            };

            scheme.close_calculated = scheme.open
                + scheme
                    .transactions
                    .iter()
                    .filter_map(|t| t.units)
                    .sum::<Decimal>();
            if scheme.close_calculated != scheme.close {
                tracing::warn!(
                    "Closing balance mismatch for {}: statement has {}, \
                     transactions add up to {}",
                    scheme.scheme,
                    scheme.close,
                    scheme.close_calculated
                );
            }

            // A scheme is only ever started once there is a folio.
            if let Some(folio) = self.folios.last_mut() {
                folio.schemes.push(scheme);
            }
        }
    }
}

/// Parses the full text of a detailed CAS.
pub fn parse_cas_text(text: &str) -> Result<CasData, SError> {
    let cas_type = detect_cas_type(text)?;
    if cas_type == CasType::Summary {
        return Err(
            "Summary statements are not supported. A detailed statement is required"
                .to_string(),
        );
    }
    let file_type = detect_file_type(text);
    tracing::debug!("Parsing {} {} statement", file_type.as_str(), cas_type.as_str());

    let statement_period = parse_statement_period(text)?;
    let investor_info = parse_investor_info(text)?;

    let mut sm = sm::DetailedParseSm::new();
    for (i, line) in text.lines().enumerate() {
        sm.parse_line(line).map_err(|e| format!("Line {}: {}", i + 1, e))?;
    }

    Ok(CasData {
        statement_period,
        file_type,
        cas_type,
        investor_info,
        folios: sm.finish(),
    })
}

// MARK: tests
