//! Email message

use crate::domain::communication::requests::NormalizedEmailRequest;

/// The body of an outgoing message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmailBody {
    /// A `text/html` body
    Html(String),

    /// A `text/plain` body
    Plain(String),
}

/// A message ready for the transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Primary recipients, joined with `", "`
    pub to: String,

    /// Carbon-copy recipients, if any
    pub cc: Option<String>,

    /// Blind carbon-copy recipients, if any
    pub bcc: Option<String>,

    /// The subject of the email
    pub subject: String,

    /// The body of the email
    pub body: EmailBody,
}

impl From<NormalizedEmailRequest> for OutgoingEmail {
    fn from(request: NormalizedEmailRequest) -> Self {
        let body = if request.is_html {
            EmailBody::Html(request.body)
        } else {
            EmailBody::Plain(request.body)
        };

        Self {
            to: request.to.join(", "),
            cc: join_non_empty(&request.cc),
            bcc: join_non_empty(&request.bcc),
            subject: request.subject,
            body,
        }
    }
}

fn join_non_empty(addresses: &[String]) -> Option<String> {
    (!addresses.is_empty()).then(|| addresses.join(", "))
}

/// Receipt for a message the transport accepted
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SentEmail {
    /// The `Message-ID` assigned to the message
    pub message_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(is_html: bool, cc: Vec<&str>, bcc: Vec<&str>) -> NormalizedEmailRequest {
        NormalizedEmailRequest {
            to: vec!["a@x.com".to_string(), "b@x.com".to_string()],
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
            is_html,
            cc: cc.into_iter().map(String::from).collect(),
            bcc: bcc.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_joins_recipients_and_omits_empty_lists() {
        let email = OutgoingEmail::from(normalized(false, vec![], vec!["c@x.com", "d@x.com"]));

        assert_eq!(email.to, "a@x.com, b@x.com");
        assert_eq!(email.cc, None);
        assert_eq!(email.bcc.as_deref(), Some("c@x.com, d@x.com"));
    }

    #[test]
    fn test_routes_body_by_content_type() {
        let plain = OutgoingEmail::from(normalized(false, vec![], vec![]));
        let html = OutgoingEmail::from(normalized(true, vec![], vec![]));

        assert_eq!(plain.body, EmailBody::Plain("Hello".to_string()));
        assert_eq!(html.body, EmailBody::Html("Hello".to_string()));
    }
}
