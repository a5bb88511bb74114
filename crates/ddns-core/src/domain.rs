//! Domain name splitting
//!
//! The provider addresses a record as a host record (RR) relative to a
//! registered top domain. The top domain is always the last two labels of
//! the FQDN; everything before it is the host record.

/// Host record used by the provider for the zone apex
pub const APEX_HOST_RECORD: &str = "@";

/// An FQDN split into the provider's host record and top domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParts {
    /// Subdomain label(s), e.g. "www" or "sub.example"
    pub host_record: String,
    /// Registered domain, e.g. "example.com"
    pub top_domain: String,
}

/// Split an FQDN into host record and top domain
///
/// - `"www.example.com"` → (`"www"`, `"example.com"`)
/// - `"sub.example.co.uk"` → (`"sub.example"`, `"co.uk"`)
/// - `"example.com"` → (`"@"`, `"example.com"`)
///
/// A trailing root dot is ignored. Names with fewer than two labels or with
/// empty labels are rejected.
pub fn split_domain(fqdn: &str) -> crate::Result<DomainParts> {
    let name = fqdn.trim().trim_end_matches('.');
    let labels: Vec<&str> = name.split('.').collect();

    if labels.iter().any(|label| label.is_empty()) {
        return Err(crate::Error::config(format!(
            "Domain name has an empty label: '{fqdn}'"
        )));
    }
    if labels.len() < 2 {
        return Err(crate::Error::config(format!(
            "Domain name needs at least two labels: '{fqdn}'"
        )));
    }

    let split_at = labels.len() - 2;
    let host_record = if split_at == 0 {
        APEX_HOST_RECORD.to_string()
    } else {
        labels[..split_at].join(".")
    };

    Ok(DomainParts {
        host_record,
        top_domain: labels[split_at..].join("."),
    })
}
