//! Registrable-domain extraction from request lines.
//!
//! Source lines are URL-ish (`https://secure.bank.example/login`). The
//! domain tally wants them reduced to a public-suffix-aware registrable
//! domain, keeping the subdomain when one is present:
//! `sub.domain.suffix` if there is a subdomain, else `domain.suffix`,
//! else the bare host.

/// Extract the registrable domain from a request line, subdomain included.
///
/// Returns `None` when no host can be found at all.
pub fn registrable_domain(source_line: &str) -> Option<String> {
    let host = extract_host(source_line)?;

    // IP addresses tally as themselves.
    if host.parse::<std::net::IpAddr>().is_ok() {
        return Some(host);
    }

    match psl::domain_str(&host) {
        // Subdomain present: keep the full host.
        Some(domain) if host.len() > domain.len() => Some(host),
        Some(domain) => Some(domain.to_string()),
        // No recognizable suffix: fall back to the bare host.
        None => Some(host),
    }
}

/// Pull the host out of a URL-ish line: strip scheme, userinfo, port, and
/// anything from the path onward.
fn extract_host(line: &str) -> Option<String> {
    let rest = match line.find("://") {
        Some(idx) => &line[idx + 3..],
        None => line,
    };

    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .rsplit('@')
        .next()
        .unwrap_or("");

    let host = authority.split(':').next().unwrap_or("").trim();
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_subdomain_when_present() {
        assert_eq!(
            registrable_domain("https://secure.targetbank.com/login").as_deref(),
            Some("secure.targetbank.com")
        );
    }

    #[test]
    fn reduces_to_domain_and_suffix_without_subdomain() {
        assert_eq!(
            registrable_domain("http://example.org/basket?id=1").as_deref(),
            Some("example.org")
        );
    }

    #[test]
    fn bare_host_without_known_suffix() {
        assert_eq!(
            registrable_domain("http://localhost:8080/admin").as_deref(),
            Some("localhost")
        );
    }

    #[test]
    fn ip_address_tallies_as_itself() {
        assert_eq!(
            registrable_domain("http://192.168.0.12/panel").as_deref(),
            Some("192.168.0.12")
        );
    }

    #[test]
    fn strips_userinfo_and_port() {
        assert_eq!(
            registrable_domain("https://bob:pw@shop.example.co.uk:8443/cart").as_deref(),
            Some("shop.example.co.uk")
        );
    }

    #[test]
    fn empty_line_yields_none() {
        assert_eq!(registrable_domain(""), None);
        assert_eq!(registrable_domain("https:///path-only"), None);
    }
}
