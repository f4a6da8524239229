/// A bill summary as it appears in a digest e-mail: the number, the title,
/// and a frontend detail URL built from the numeric LegiScan id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillSummary {
    pub bill_number: String,
    pub title: String,
    pub url: String,
}

/// All matches for one saved keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatches {
    pub keyword: String,
    pub bills: Vec<BillSummary>,
}

/// Who a digest is addressed to. The id is carried as a string so the
/// unsubscribe/profile links can be built without a storage dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
}

/// One user's digest for a single aggregation run: the recipient plus one
/// section per keyword that matched anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDigest {
    pub recipient: Recipient,
    pub sections: Vec<KeywordMatches>,
}

// Object style note:
// These types cross the crate boundary between aggregation and mail
// dispatch. They carry only what a formatted e-mail needs; storage ids and
// raw API payloads stay on the aggregator side.
