//! Recipient allow list

use std::collections::HashSet;

use super::AdmissionError;

/// A closed set of permitted recipient addresses, compared case-insensitively.
///
/// An empty list disables the guard and every recipient is admitted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowList(HashSet<String>);

impl AllowList {
    /// Create an allow list from individual addresses.
    ///
    /// Addresses are trimmed and lower-cased; blank entries are ignored.
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            addresses
                .into_iter()
                .map(|address| address.as_ref().trim().to_lowercase())
                .filter(|address| !address.is_empty())
                .collect(),
        )
    }

    /// Parse a comma-separated list of addresses
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Whether the guard is active
    pub fn is_enabled(&self) -> bool {
        !self.0.is_empty()
    }

    /// Number of distinct permitted addresses
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks every recipient against the list.
    ///
    /// # Returns
    /// - [`Ok`] if the list is disabled or every recipient is permitted.
    /// - [`Err`] with [`AdmissionError::RecipientsNotAllowed`] naming each rejected
    ///   address in its original casing and input order.
    pub fn enforce<'a, I>(&self, recipients: I) -> Result<(), AdmissionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if !self.is_enabled() {
            return Ok(());
        }

        let rejected: Vec<String> = recipients
            .into_iter()
            .filter(|recipient| !self.0.contains(&recipient.to_lowercase()))
            .map(str::to_string)
            .collect();

        if rejected.is_empty() {
            Ok(())
        } else {
            Err(AdmissionError::RecipientsNotAllowed(rejected))
        }
    }
}
