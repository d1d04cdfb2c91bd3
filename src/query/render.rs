//! Terminal rendering of query results.

use super::LeakRecord;

fn field<'a>(leak: &'a LeakRecord, key: &str) -> &'a str {
    leak.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn address(leak: &LeakRecord) -> String {
    format!("{}@{}", field(leak, "email"), field(leak, "domain"))
}

/// Format leaks as an aligned two-column table.
///
/// The address column is padded to the longest reconstructed
/// `login@domain` across the whole set, computed before any row is
/// rendered.
pub fn format_table(leaks: &[LeakRecord]) -> String {
    let addresses: Vec<String> = leaks.iter().map(address).collect();
    let width = addresses.iter().map(String::len).max().unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("{:<width$} | Password\n", "Email"));
    for (addr, leak) in addresses.iter().zip(leaks) {
        out.push_str(&format!("{addr:<width$} | {}\n", field(leak, "password")));
    }
    out
}
