use email_digest::format_digest_email;
use interfaces::defs::{BillSummary, KeywordMatches, Recipient, UserDigest};

fn sample_digest() -> UserDigest {
    UserDigest {
        recipient: Recipient {
            user_id: "7b7f5dc6-8f7a-4f43-9e6b-0a4be95d2c01".to_string(),
            email: "alex@example.org".to_string(),
            full_name: "Alex Doe".to_string(),
        },
        sections: vec![
            KeywordMatches {
                keyword: "education".to_string(),
                bills: vec![
                    BillSummary {
                        bill_number: "HB1001".to_string(),
                        title: "School Funding Act".to_string(),
                        url: "http://localhost:3000/bill/184390".to_string(),
                    },
                    BillSummary {
                        bill_number: "SB200".to_string(),
                        title: "Teacher Pay & Benefits".to_string(),
                        url: "http://localhost:3000/bill/184412".to_string(),
                    },
                ],
            },
            KeywordMatches {
                keyword: "water rights".to_string(),
                bills: vec![BillSummary {
                    bill_number: "SJR4001".to_string(),
                    title: "Interstate Water Compact".to_string(),
                    url: "http://localhost:3000/bill/184501".to_string(),
                }],
            },
        ],
    }
}

#[test]
fn subject_is_daily_bill_digest() {
    let (subject, _) = format_digest_email(&sample_digest(), "http://localhost:3000");
    assert_eq!(subject, "Your Daily Bill Digest");
}

#[test]
fn body_contains_every_keyword_section_and_bill_link() {
    let (_, body) = format_digest_email(&sample_digest(), "http://localhost:3000");

    assert!(body.contains("Hello Alex Doe"));
    assert!(body.contains("Keyword: education"));
    assert!(body.contains("Keyword: water rights"));
    assert!(body.contains("href=\"http://localhost:3000/bill/184390\""));
    assert!(body.contains("HB1001"));
    assert!(body.contains("SJR4001"));
}

#[test]
fn body_links_profile_and_unsubscribe_for_recipient() {
    let (_, body) = format_digest_email(&sample_digest(), "http://localhost:3000");

    assert!(body.contains("http://localhost:3000/profile/7b7f5dc6-8f7a-4f43-9e6b-0a4be95d2c01"));
    assert!(body.contains("http://localhost:3000/unsubscribe/7b7f5dc6-8f7a-4f43-9e6b-0a4be95d2c01"));
}

#[test]
fn html_in_bill_titles_is_escaped() {
    let mut digest = sample_digest();
    digest.sections[0].bills[0].title = "Funding <script>alert(1)</script> & more".to_string();

    let (_, body) = format_digest_email(&digest, "http://localhost:3000");
    assert!(body.contains("Funding &lt;script&gt;alert(1)&lt;/script&gt; &amp; more"));
    assert!(!body.contains("<script>"));
}
