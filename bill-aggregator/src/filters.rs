use crate::types::BillRecord;
use regex::Regex;
use std::sync::OnceLock;

fn search_term_regex() -> &'static Regex {
    static SEARCH_TERM: OnceLock<Regex> = OnceLock::new();
    SEARCH_TERM.get_or_init(|| Regex::new(r"(?i)^(H|S)?(B|R|JR)?(\d+)?$").unwrap())
}

/// Filter bills by chamber using the bill-number prefix: "House" matches
/// `HB`, `HR`, `HJR`, ..., "Senate" matches the `S` prefixes. Unknown
/// chamber labels match nothing. Input order is preserved.
pub fn filter_by_chamber<'a>(chamber: &str, bills: &'a [BillRecord]) -> Vec<&'a BillRecord> {
    let pattern = match chamber {
        "House" => Regex::new(r"^H[A-Z]+").unwrap(),
        "Senate" => Regex::new(r"^S[A-Z]+").unwrap(),
        _ => return Vec::new(),
    };

    bills
        .iter()
        .filter(|bill| pattern.is_match(&bill.bill_number))
        .collect()
}

/// Filter bills by type using the bill-number prefix: "Bill" matches
/// `[HS]B`, "Resolution" matches `[HS]R`, "Joint Resolution" matches
/// `[HS]JR`. Unknown labels match nothing. The three prefixes are
/// disjoint: `HJR1` is a joint resolution only, not a resolution.
pub fn filter_by_type<'a>(bill_type: &str, bills: &'a [BillRecord]) -> Vec<&'a BillRecord> {
    let pattern = match bill_type {
        "Bill" => Regex::new(r"^[HS]B").unwrap(),
        "Resolution" => Regex::new(r"^[HS]R").unwrap(),
        "Joint Resolution" => Regex::new(r"^[HS]JR").unwrap(),
        _ => return Vec::new(),
    };

    bills
        .iter()
        .filter(|bill| pattern.is_match(&bill.bill_number))
        .collect()
}

/// Search bills by a full or partial bill number such as "HB100", "SJR20"
/// or "200". The term decomposes into an optional chamber letter, optional
/// type letters and an optional digit string; any omitted component is a
/// wildcard. Digits match as a substring of the whole bill number, so
/// "200" finds SB2001 as well as HB200. Terms that do not decompose
/// return nothing.
pub fn search_by_bill_number<'a>(search_term: &str, bills: &'a [BillRecord]) -> Vec<&'a BillRecord> {
    let captures = match search_term_regex().captures(search_term) {
        Some(captures) => captures,
        None => return Vec::new(),
    };

    let chamber = captures.get(1).map(|m| m.as_str().to_uppercase());
    let bill_type = captures.get(2).map(|m| m.as_str().to_uppercase());
    let digits = captures.get(3).map(|m| m.as_str());

    bills
        .iter()
        .filter(|bill| {
            let number = bill.bill_number.as_str();

            let chamber_ok = match &chamber {
                Some(prefix) => number.starts_with(prefix.as_str()),
                None => true,
            };
            // The type letters follow the single chamber letter
            let type_ok = match &bill_type {
                Some(prefix) => number
                    .get(1..)
                    .map(|rest| rest.starts_with(prefix.as_str()))
                    .unwrap_or(false),
                None => true,
            };
            let digits_ok = match digits {
                Some(digits) => number.contains(digits),
                None => true,
            };

            chamber_ok && type_ok && digits_ok
        })
        .collect()
}
