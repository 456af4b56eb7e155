use crate::ledger::Address;

/// Format a percentage with one decimal place.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Shorten an address to its first 6 and last 4 hex characters, e.g. `0xabcd...1234`.
pub fn short_address(address: &Address) -> String {
    let hex = address.to_hex();
    format!("{}...{}", &hex[..6], &hex[hex.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_display_values() {
        assert_eq!(format_percent(27.5), "27.5%");
        assert_eq!(format_percent(8.333_333), "8.3%");

        let mut bytes = [0u8; 20];
        bytes[0] = 0xab;
        bytes[19] = 0x12;
        assert_eq!(short_address(&Address(bytes)), "0xab00...0012");
    }
}
