use std::fmt::Display;

/// A request for one page of an organization's repository listing
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct PageRequest {
    /// The organization name.
    pub(crate) organization: String,

    /// The number of repositories per page.
    pub(crate) per_page: u16,

    /// The URL of the page, as given by the previous page. `None` for the first page.
    pub(crate) url: Option<String>,
}

impl PageRequest {
    /// Creates the request for the first page of the listing.
    pub fn first(organization: &str, per_page: u16) -> Self {
        Self {
            organization: organization.to_string(),
            per_page,
            url: None,
        }
    }

    /// Creates the request for the page at the given URL.
    pub fn next(&self, url: &str) -> Self {
        Self {
            organization: self.organization.clone(),
            per_page: self.per_page,
            url: Some(url.to_string()),
        }
    }

    /// Retrieves the organization name.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    #[cfg(test)]
    /// Creates a dummy `PageRequest` for testing purposes.
    pub(crate) fn dummy() -> Self {
        Self::first("acme", 100)
    }
}

impl Display for PageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PageRequest: organization={}, per_page={}, url={:?}",
            self.organization, self.per_page, self.url
        )
    }
}
