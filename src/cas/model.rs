use rust_decimal::Decimal;
use time::Date;

use super::{
    txtype::TransactionType,
    value::{CasMap, CasValue},
};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum FileType {
    Cams,
    Kfintech,
    Unknown,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Cams => "CAMS",
            FileType::Kfintech => "KFINTECH",
            FileType::Unknown => "UNKNOWN",
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CasType {
    Detailed,
    Summary,
}

impl CasType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CasType::Detailed => "DETAILED",
            CasType::Summary => "SUMMARY",
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct StatementPeriod {
    pub from: Date,
    pub to: Date,
}

#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct InvestorInfo {
    pub name: String,
    pub email: String,
    // Lines joined with '\n'
    pub address: String,
    pub mobile: String,
}

#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct SchemeValuation {
    pub date: Option<Date>,
    pub nav: Option<Decimal>,
    pub value: Option<Decimal>,
    pub cost: Option<Decimal>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Transaction {
    pub date: Date,
    pub description: String,
    pub amount: Option<Decimal>,
    pub units: Option<Decimal>,
    pub nav: Option<Decimal>,
    pub balance: Option<Decimal>,
    pub tx_type: TransactionType,
    // Per-unit payout, for dividend/IDCW entries
    pub dividend_rate: Option<Decimal>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Scheme {
    pub scheme: String,
    pub isin: String,
    pub advisor: Option<String>,
    // The registrar's code for the scheme, which prefixes the scheme name.
    pub rta_code: String,
    pub rta: Option<String>,
    pub open: Decimal,
    pub close: Decimal,
    pub close_calculated: Decimal,
    pub valuation: SchemeValuation,
    pub transactions: Vec<Transaction>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Folio {
    pub folio: String,
    pub amc: String,
    pub pan: Option<String>,
    pub kyc: Option<String>,
    pub pan_kyc: Option<String>,
    pub schemes: Vec<Scheme>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct CasData {
    pub statement_period: StatementPeriod,
    pub file_type: FileType,
    pub cas_type: CasType,
    pub investor_info: InvestorInfo,
    pub folios: Vec<Folio>,
}

// MARK: CasValue conversions
//
// Key names and their order here are what ends up in the JSON output.

impl From<StatementPeriod> for CasValue {
    fn from(p: StatementPeriod) -> Self {
        CasMap::new().with("from", p.from).with("to", p.to).into()
    }
}

impl From<InvestorInfo> for CasValue {
    fn from(i: InvestorInfo) -> Self {
        CasMap::new()
            .with("name", i.name)
            .with("email", i.email)
            .with("address", i.address)
            .with("mobile", i.mobile)
            .into()
    }
}

impl From<SchemeValuation> for CasValue {
    fn from(v: SchemeValuation) -> Self {
        CasMap::new()
            .with("date", v.date)
            .with("nav", v.nav)
            .with("value", v.value)
            .with("cost", v.cost)
            .into()
    }
}

impl From<Transaction> for CasValue {
    fn from(t: Transaction) -> Self {
        CasMap::new()
            .with("date", t.date)
            .with("description", t.description)
            .with("amount", t.amount)
            .with("units", t.units)
            .with("nav", t.nav)
            .with("balance", t.balance)
            .with("type", t.tx_type.as_str())
            .with("dividend_rate", t.dividend_rate)
            .into()
    }
}

impl From<Scheme> for CasValue {
    fn from(s: Scheme) -> Self {
        CasMap::new()
            .with("scheme", s.scheme)
            .with("isin", s.isin)
            .with("advisor", s.advisor)
            .with("rta_code", s.rta_code)
            .with("rta", s.rta)
            .with("open", s.open)
            .with("close", s.close)
            .with("close_calculated", s.close_calculated)
            .with("valuation", s.valuation)
            .with("transactions", s.transactions)
            .into()
    }
}

impl From<Folio> for CasValue {
    fn from(f: Folio) -> Self {
        CasMap::new()
            .with("folio", f.folio)
            .with("amc", f.amc)
            .with("PAN", f.pan)
            .with("KYC", f.kyc)
            .with("PANKYC", f.pan_kyc)
            .with("schemes", f.schemes)
            .into()
    }
}

impl From<CasData> for CasValue {
    fn from(d: CasData) -> Self {
        CasMap::new()
            .with("statement_period", d.statement_period)
            .with("file_type", d.file_type.as_str())
            .with("cas_type", d.cas_type.as_str())
            .with("investor_info", d.investor_info)
            .with("folios", d.folios)
            .into()
    }
}
