use interfaces::defs::UserDigest;

const DIGEST_SUBJECT: &str = "Your Daily Bill Digest";

/// Generate the (subject, HTML body) pair for a user's digest e-mail.
///
/// The body carries a greeting, one section per keyword with the matching
/// bills linked to their frontend detail pages, and an unsubscribe/profile
/// footer. Callers are expected to skip users whose digest has no sections.
pub fn format_digest_email(digest: &UserDigest, frontend_base_url: &str) -> (String, String) {
    let mut body = String::new();

    body.push_str("<html><body>\n");
    body.push_str(&format!(
        "<p>Hello {},</p>\n",
        escape_html(&digest.recipient.full_name)
    ));
    body.push_str("<p>New bills matched your saved keywords today:</p>\n");

    for section in &digest.sections {
        body.push_str(&format!(
            "<h3>Keyword: {}</h3>\n<ul>\n",
            escape_html(&section.keyword)
        ));
        for bill in &section.bills {
            body.push_str(&format!(
                "<li><a href=\"{}\">{}</a> &mdash; {}</li>\n",
                bill.url,
                escape_html(&bill.bill_number),
                escape_html(&bill.title)
            ));
        }
        body.push_str("</ul>\n");
    }

    body.push_str(&format!(
        "<p><a href=\"{base}/profile/{id}\">Manage your keywords</a> | \
         <a href=\"{base}/unsubscribe/{id}\">Unsubscribe</a></p>\n",
        base = frontend_base_url,
        id = digest.recipient.user_id,
    ));
    body.push_str("</body></html>\n");

    (DIGEST_SUBJECT.to_string(), body)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
