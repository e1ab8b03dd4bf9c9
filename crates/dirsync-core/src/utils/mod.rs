//! Distinguished name helpers

/// Split a DN into its RDN components on unescaped commas, trimming
/// surrounding whitespace. Escapes are kept as-is in the output.
pub fn split_dn(dn: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in dn.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ',' => {
                parts.push(dn[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let last = dn[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }

    parts
}

/// Values of the `OU=` components of a DN, in DN order (most specific first)
pub fn org_units(dn: &str) -> Vec<String> {
    split_dn(dn)
        .into_iter()
        .filter_map(|rdn| {
            let (attr, value) = rdn.split_once('=')?;
            if attr.trim().eq_ignore_ascii_case("OU") {
                Some(unescape_dn_value(value.trim()))
            } else {
                None
            }
        })
        .collect()
}

/// Remove backslash escapes from an RDN value (`Sales\, East` -> `Sales, East`)
pub fn unescape_dn_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_dn() {
        assert_eq!(
            split_dn("CN=x, OU=Taipei,OU=Sales ,DC=corp"),
            vec!["CN=x", "OU=Taipei", "OU=Sales", "DC=corp"]
        );
        assert_eq!(split_dn("CN=Doe\\, John,DC=corp"), vec!["CN=Doe\\, John", "DC=corp"]);
        assert!(split_dn("").is_empty());
    }

    #[test]
    fn test_org_units_order_and_count() {
        let dn = "CN=x,OU=Taipei,OU=Sales,OU=Asia,DC=corp,DC=com";
        let ous = org_units(dn);
        assert_eq!(ous, vec!["Taipei", "Sales", "Asia"]);
        assert_eq!(ous.len(), dn.matches("OU=").count());
    }

    #[test]
    fn test_org_units_case_and_escapes() {
        assert_eq!(
            org_units("cn=x,ou=R\\, D,ou=Eng,dc=corp"),
            vec!["R, D", "Eng"]
        );
        assert!(org_units("CN=x,DC=corp,DC=com").is_empty());
        assert!(org_units("").is_empty());
    }
}
